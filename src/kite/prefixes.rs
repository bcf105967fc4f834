//! KITE keyword and name layout.
//!
//! A KITE request name is `<rv-prefix>/32=KITE/<producer-suffix>/<params-digest>`.

use crate::core::{ExtractError, KITE_KEYWORD_TYPE, KITE_KEYWORD_VALUE};
use crate::encoding::{Component, Name};

/// The `32=KITE` keyword component.
pub fn kite_keyword() -> Component {
    Component::new(KITE_KEYWORD_TYPE, KITE_KEYWORD_VALUE)
}

/// Split a KITE request name into `(rv_prefix, producer_suffix)`.
///
/// The first occurrence of the keyword separates the two parts. The last
/// component is taken to be the parameters digest and is excluded from the
/// producer suffix.
pub fn extract_prefixes(name: &Name) -> Result<(Name, Name), ExtractError> {
    let pos = match name.position(&kite_keyword()) {
        Some(0) => return Err(ExtractError::MissingRvPrefix),
        Some(pos) => pos,
        None => return Err(ExtractError::MissingKeyword),
    };

    // excludes rv prefix, keyword and digest
    let suffix_len = name.len().saturating_sub(pos + 2);
    if suffix_len == 0 {
        return Err(ExtractError::MissingProducerSuffix);
    }
    Ok((name.prefix(pos), name.sub_name(pos + 1, suffix_len)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::KITE_KEYWORD_WIRE;

    fn name(uri: &str) -> Name {
        uri.parse().unwrap()
    }

    #[test]
    fn test_keyword_wire() {
        let mut wire = Vec::new();
        kite_keyword().encode_into(&mut wire);
        assert_eq!(wire, KITE_KEYWORD_WIRE);
        assert_eq!(kite_keyword().to_string(), "32=KITE");
    }

    #[test]
    fn test_keyword_exact_match() {
        // case and type both matter
        assert_ne!(Component::new(KITE_KEYWORD_TYPE, b"kite".to_vec()), kite_keyword());
        assert_ne!(Component::generic(b"KITE".to_vec()), kite_keyword());
        assert_eq!(
            extract_prefixes(&name("/rv/KITE/alice/x")),
            Err(ExtractError::MissingKeyword)
        );
    }

    #[test]
    fn test_extract() {
        let (rv, suffix) = extract_prefixes(&name("/rv/32=KITE/alice/d")).unwrap();
        assert_eq!(rv, name("/rv"));
        assert_eq!(suffix, name("/alice"));

        let (rv, suffix) = extract_prefixes(&name("/a/b/32=KITE/c/d/e/digest")).unwrap();
        assert_eq!(rv, name("/a/b"));
        assert_eq!(suffix, name("/c/d/e"));
    }

    #[test]
    fn test_extract_uses_first_keyword() {
        let (rv, suffix) = extract_prefixes(&name("/rv/32=KITE/x/32=KITE/y/d")).unwrap();
        assert_eq!(rv, name("/rv"));
        assert_eq!(suffix, name("/x/32=KITE/y"));
    }

    #[test]
    fn test_extract_failures() {
        assert_eq!(
            extract_prefixes(&name("/32=KITE/alice/d")),
            Err(ExtractError::MissingRvPrefix)
        );
        assert_eq!(
            extract_prefixes(&name("/rv/alice/d")),
            Err(ExtractError::MissingKeyword)
        );
        assert_eq!(extract_prefixes(&Name::new()), Err(ExtractError::MissingKeyword));
        // keyword last or second to last
        assert_eq!(
            extract_prefixes(&name("/rv/32=KITE")),
            Err(ExtractError::MissingProducerSuffix)
        );
        assert_eq!(
            extract_prefixes(&name("/rv/32=KITE/d")),
            Err(ExtractError::MissingProducerSuffix)
        );
    }
}
