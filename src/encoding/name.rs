//! Hierarchical NDN names.
//!
//! A [`Name`] is an ordered sequence of typed, opaque [`Component`]s. Names
//! compare component-wise by type and bytes; the URI form is only a
//! presentation and never used for equality.

use std::fmt::{self, Write as _};
use std::str::FromStr;

use super::tlv::{decode_non_negative_integer, encode_non_negative_integer, parse_elements, Block};
use crate::core::{
    NameError, TlvError, TLV_GENERIC_NAME_COMPONENT, TLV_IMPLICIT_SHA256_DIGEST_COMPONENT,
    TLV_KEYWORD_NAME_COMPONENT, TLV_NAME, TLV_PARAMETERS_SHA256_DIGEST_COMPONENT,
    TLV_SEGMENT_NAME_COMPONENT, TLV_VERSION_NAME_COMPONENT,
};

/// SHA-256 digest size carried by digest components.
const DIGEST_SIZE: usize = 32;

/// A single name component.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Component {
    typ: u64,
    value: Vec<u8>,
}

impl Component {
    /// Create a component of an arbitrary type.
    pub fn new(typ: u64, value: impl Into<Vec<u8>>) -> Self {
        Self {
            typ,
            value: value.into(),
        }
    }

    /// Create a GenericNameComponent.
    pub fn generic(value: impl Into<Vec<u8>>) -> Self {
        Self::new(TLV_GENERIC_NAME_COMPONENT, value)
    }

    /// Create a KeywordNameComponent.
    pub fn keyword(value: impl Into<Vec<u8>>) -> Self {
        Self::new(TLV_KEYWORD_NAME_COMPONENT, value)
    }

    /// Create a SegmentNameComponent.
    pub fn segment(n: u64) -> Self {
        Self::new(TLV_SEGMENT_NAME_COMPONENT, encode_non_negative_integer(n))
    }

    /// Create a VersionNameComponent.
    pub fn version(n: u64) -> Self {
        Self::new(TLV_VERSION_NAME_COMPONENT, encode_non_negative_integer(n))
    }

    /// Create a ParametersSha256DigestComponent.
    pub fn parameters_digest(digest: [u8; DIGEST_SIZE]) -> Self {
        Self::new(TLV_PARAMETERS_SHA256_DIGEST_COMPONENT, digest.to_vec())
    }

    /// Component type.
    pub fn typ(&self) -> u64 {
        self.typ
    }

    /// Component value.
    pub fn value(&self) -> &[u8] {
        &self.value
    }

    /// Check if this is a GenericNameComponent.
    pub fn is_generic(&self) -> bool {
        self.typ == TLV_GENERIC_NAME_COMPONENT
    }

    /// Check if this is a ParametersSha256DigestComponent.
    pub fn is_parameters_digest(&self) -> bool {
        self.typ == TLV_PARAMETERS_SHA256_DIGEST_COMPONENT
    }

    /// Decode the value of a segment component.
    pub fn to_segment(&self) -> Option<u64> {
        self.number_of_type(TLV_SEGMENT_NAME_COMPONENT)
    }

    /// Decode the value of a version component.
    pub fn to_version(&self) -> Option<u64> {
        self.number_of_type(TLV_VERSION_NAME_COMPONENT)
    }

    fn number_of_type(&self, typ: u64) -> Option<u64> {
        if self.typ != typ {
            return None;
        }
        decode_non_negative_integer(&self.value).ok()
    }

    /// Convert to a TLV element.
    pub fn to_block(&self) -> Block {
        Block::new(self.typ, self.value.clone())
    }

    /// Append the wire encoding.
    pub fn encode_into(&self, buf: &mut Vec<u8>) {
        self.to_block().encode_into(buf);
    }

    /// Interpret a TLV element as a name component.
    pub fn from_block(block: Block) -> Result<Self, TlvError> {
        let typ = block.typ();
        if typ == 0 || typ > 0xFFFF {
            return Err(TlvError::InvalidValue {
                typ,
                reason: "component type out of range",
            });
        }
        let digest_typed = typ == TLV_IMPLICIT_SHA256_DIGEST_COMPONENT
            || typ == TLV_PARAMETERS_SHA256_DIGEST_COMPONENT;
        if digest_typed && block.value().len() != DIGEST_SIZE {
            return Err(TlvError::InvalidValue {
                typ,
                reason: "digest component must be 32 bytes",
            });
        }
        Ok(Self::new(typ, block.into_value()))
    }

    fn parse_uri(s: &str) -> Result<Self, NameError> {
        let (typ, text) = match s.split_once('=') {
            Some(("sha256digest", digest)) => {
                return Ok(Self::new(
                    TLV_IMPLICIT_SHA256_DIGEST_COMPONENT,
                    parse_digest(digest, s)?,
                ));
            }
            Some(("params-sha256", digest)) => {
                return Ok(Self::new(
                    TLV_PARAMETERS_SHA256_DIGEST_COMPONENT,
                    parse_digest(digest, s)?,
                ));
            }
            Some(("seg", n)) => return Ok(Self::segment(parse_number(n, s)?)),
            Some(("v", n)) => return Ok(Self::version(parse_number(n, s)?)),
            Some((t, rest)) if t.bytes().all(|b| b.is_ascii_digit()) => {
                let typ: u64 = t.parse().map_err(|_| NameError::InvalidType(s.to_string()))?;
                if typ == 0 || typ > 0xFFFF {
                    return Err(NameError::InvalidType(s.to_string()));
                }
                (typ, rest)
            }
            _ => (TLV_GENERIC_NAME_COMPONENT, s),
        };

        let value = unescape(text)?;
        if !value.is_empty() && value.iter().all(|b| *b == b'.') {
            if value.len() < 3 {
                return Err(NameError::IllegalComponent(s.to_string()));
            }
            return Ok(Self::new(typ, value[3..].to_vec()));
        }
        Ok(Self::new(typ, value))
    }
}

impl From<&str> for Component {
    fn from(s: &str) -> Self {
        Self::generic(s.as_bytes())
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.typ {
            TLV_IMPLICIT_SHA256_DIGEST_COMPONENT => {
                return write!(f, "sha256digest={}", hex::encode(&self.value));
            }
            TLV_PARAMETERS_SHA256_DIGEST_COMPONENT => {
                return write!(f, "params-sha256={}", hex::encode(&self.value));
            }
            TLV_SEGMENT_NAME_COMPONENT | TLV_VERSION_NAME_COMPONENT => {
                if let Ok(n) = decode_non_negative_integer(&self.value) {
                    let label = if self.typ == TLV_SEGMENT_NAME_COMPONENT {
                        "seg"
                    } else {
                        "v"
                    };
                    return write!(f, "{label}={n}");
                }
                write!(f, "{}=", self.typ)?;
            }
            TLV_GENERIC_NAME_COMPONENT => {}
            typ => write!(f, "{typ}=")?,
        }
        write_escaped(f, &self.value)
    }
}

/// A hierarchical name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Name {
    components: Vec<Component>,
}

impl Name {
    /// Create an empty name (`/`).
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a name from components.
    pub fn from_components(components: impl IntoIterator<Item = Component>) -> Self {
        Self {
            components: components.into_iter().collect(),
        }
    }

    /// Number of components.
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Check if this is the empty name.
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Component at `index`.
    pub fn get(&self, index: usize) -> Option<&Component> {
        self.components.get(index)
    }

    /// Last component.
    pub fn last(&self) -> Option<&Component> {
        self.components.last()
    }

    /// All components.
    pub fn components(&self) -> &[Component] {
        &self.components
    }

    /// Iterate over components.
    pub fn iter(&self) -> std::slice::Iter<'_, Component> {
        self.components.iter()
    }

    /// The first `n` components (all of them if `n` exceeds the length).
    pub fn prefix(&self, n: usize) -> Name {
        Self::from_components(self.components.iter().take(n).cloned())
    }

    /// Up to `len` components starting at `offset`.
    pub fn sub_name(&self, offset: usize, len: usize) -> Name {
        Self::from_components(self.components.iter().skip(offset).take(len).cloned())
    }

    /// Index of the first component equal to `component`.
    pub fn position(&self, component: &Component) -> Option<usize> {
        self.components.iter().position(|c| c == component)
    }

    /// Check whether this name is a prefix of (or equal to) `other`.
    pub fn is_prefix_of(&self, other: &Name) -> bool {
        self.len() <= other.len() && self.components[..] == other.components[..self.len()]
    }

    /// Append a component.
    pub fn push(&mut self, component: impl Into<Component>) -> &mut Self {
        self.components.push(component.into());
        self
    }

    /// Append all components of `other`.
    pub fn append_name(&mut self, other: &Name) -> &mut Self {
        self.components.extend(other.components.iter().cloned());
        self
    }

    /// Builder-style append.
    pub fn with(mut self, component: impl Into<Component>) -> Self {
        self.push(component);
        self
    }

    /// The concatenation `self ++ other`.
    pub fn concat(&self, other: &Name) -> Name {
        let mut out = self.clone();
        out.append_name(other);
        out
    }

    pub(crate) fn retain(&mut self, keep: impl FnMut(&Component) -> bool) {
        self.components.retain(keep);
    }

    /// Convert to a Name TLV element.
    pub fn to_block(&self) -> Block {
        Block::new(TLV_NAME, self.encode_components())
    }

    /// Concatenated encodings of the components (the Name TLV-VALUE).
    pub fn encode_components(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        for c in &self.components {
            c.encode_into(&mut buf);
        }
        buf
    }

    /// Wire encoding of the Name TLV.
    pub fn encode(&self) -> Vec<u8> {
        self.to_block().encode()
    }

    /// Interpret a Name TLV element.
    pub fn from_block(block: &Block) -> Result<Self, TlvError> {
        block.expect_type(TLV_NAME)?;
        let components = parse_elements(block.value())?
            .into_iter()
            .map(Component::from_block)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { components })
    }

    /// Decode a Name TLV from its wire encoding.
    pub fn decode(wire: &[u8]) -> Result<Self, TlvError> {
        Self::from_block(&Block::decode(wire)?)
    }
}

impl<'a> IntoIterator for &'a Name {
    type Item = &'a Component;
    type IntoIter = std::slice::Iter<'a, Component>;

    fn into_iter(self) -> Self::IntoIter {
        self.components.iter()
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.components.is_empty() {
            return f.write_char('/');
        }
        for c in &self.components {
            f.write_char('/')?;
            fmt::Display::fmt(c, f)?;
        }
        Ok(())
    }
}

impl FromStr for Name {
    type Err = NameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let s = s.strip_prefix("ndn:").unwrap_or(s);
        let components = s
            .split('/')
            .filter(|part| !part.is_empty())
            .map(Component::parse_uri)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { components })
    }
}

fn is_unreserved(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'-' | b'.' | b'_' | b'~')
}

fn write_escaped(f: &mut fmt::Formatter<'_>, value: &[u8]) -> fmt::Result {
    if value.iter().all(|b| *b == b'.') {
        // all-period values gain three extra periods so they stay unambiguous
        f.write_str("...")?;
        for _ in value {
            f.write_char('.')?;
        }
        return Ok(());
    }
    for &b in value {
        if is_unreserved(b) {
            f.write_char(char::from(b))?;
        } else {
            write!(f, "%{b:02X}")?;
        }
    }
    Ok(())
}

fn unescape(s: &str) -> Result<Vec<u8>, NameError> {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let mut b = [0u8; 1];
            bytes
                .get(i + 1..i + 3)
                .and_then(|pair| hex::decode_to_slice(pair, &mut b).ok())
                .ok_or_else(|| NameError::InvalidEscape(s.to_string()))?;
            out.push(b[0]);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    Ok(out)
}

fn parse_digest(digest: &str, component: &str) -> Result<Vec<u8>, NameError> {
    let mut value = vec![0u8; DIGEST_SIZE];
    hex::decode_to_slice(digest, &mut value)
        .map_err(|_| NameError::InvalidDigest(component.to_string()))?;
    Ok(value)
}

/// Decimal number of a `seg=` or `v=` component; signs are not accepted.
fn parse_number(n: &str, component: &str) -> Result<u64, NameError> {
    if n.is_empty() || !n.bytes().all(|b| b.is_ascii_digit()) {
        return Err(NameError::InvalidType(component.to_string()));
    }
    n.parse()
        .map_err(|_| NameError::InvalidType(component.to_string()))
}
