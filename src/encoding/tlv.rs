//! NDN TLV primitives.
//!
//! Implements VAR-NUMBER and NonNegativeInteger encoding and a minimal
//! [`Block`] type for nested TLV elements:
//!
//! ```text
//! +-----------------+-------------------+-------------------+
//! | TLV-TYPE        | TLV-LENGTH        | TLV-VALUE         |
//! | VAR-NUMBER      | VAR-NUMBER        | TLV-LENGTH bytes  |
//! +-----------------+-------------------+-------------------+
//! ```
//!
//! VAR-NUMBER: values below 253 take one byte; 253, 254 and 255 introduce a
//! big-endian 2, 4 and 8 byte number respectively.

use crate::core::TlvError;

/// Number of bytes needed to encode `n` as a VAR-NUMBER.
pub fn var_number_size(n: u64) -> usize {
    match n {
        0..=252 => 1,
        253..=0xFFFF => 3,
        0x1_0000..=0xFFFF_FFFF => 5,
        _ => 9,
    }
}

/// Append `n` as a VAR-NUMBER.
pub fn write_var_number(buf: &mut Vec<u8>, n: u64) {
    match n {
        0..=252 => buf.push(n as u8),
        253..=0xFFFF => {
            buf.push(253);
            buf.extend_from_slice(&(n as u16).to_be_bytes());
        }
        0x1_0000..=0xFFFF_FFFF => {
            buf.push(254);
            buf.extend_from_slice(&(n as u32).to_be_bytes());
        }
        _ => {
            buf.push(255);
            buf.extend_from_slice(&n.to_be_bytes());
        }
    }
}

/// Read a VAR-NUMBER starting at `*pos`, advancing `pos` past it.
pub fn read_var_number(buf: &[u8], pos: &mut usize) -> Result<u64, TlvError> {
    let first = *buf.get(*pos).ok_or(TlvError::UnexpectedEof)?;
    let width = match first {
        0..=252 => {
            *pos += 1;
            return Ok(u64::from(first));
        }
        253 => 2,
        254 => 4,
        255 => 8,
    };
    let start = *pos + 1;
    let bytes = buf
        .get(start..start + width)
        .ok_or(TlvError::UnexpectedEof)?;
    *pos = start + width;
    Ok(bytes.iter().fold(0u64, |acc, b| (acc << 8) | u64::from(*b)))
}

/// Encode `n` as a NonNegativeInteger using the shortest of 1, 2, 4 or 8 bytes.
pub fn encode_non_negative_integer(n: u64) -> Vec<u8> {
    if n <= 0xFF {
        vec![n as u8]
    } else if n <= 0xFFFF {
        (n as u16).to_be_bytes().to_vec()
    } else if n <= 0xFFFF_FFFF {
        (n as u32).to_be_bytes().to_vec()
    } else {
        n.to_be_bytes().to_vec()
    }
}

/// Decode a NonNegativeInteger value.
pub fn decode_non_negative_integer(value: &[u8]) -> Result<u64, TlvError> {
    match value.len() {
        1 | 2 | 4 | 8 => Ok(value.iter().fold(0u64, |acc, b| (acc << 8) | u64::from(*b))),
        len => Err(TlvError::InvalidNonNegativeInteger(len)),
    }
}

/// Check whether an element type is critical.
///
/// Unrecognized critical elements must cause a decode failure; unrecognized
/// non-critical elements are ignored.
pub fn is_critical(typ: u64) -> bool {
    typ <= 31 || typ % 2 == 1
}

/// A single TLV element.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Block {
    typ: u64,
    value: Vec<u8>,
}

impl Block {
    /// Create an element from its type and raw value.
    pub fn new(typ: u64, value: Vec<u8>) -> Self {
        Self { typ, value }
    }

    /// Create an element with an empty value.
    pub fn empty(typ: u64) -> Self {
        Self::new(typ, Vec::new())
    }

    /// Create a NonNegativeInteger element.
    pub fn from_non_negative_integer(typ: u64, n: u64) -> Self {
        Self::new(typ, encode_non_negative_integer(n))
    }

    /// Create an element whose value is the concatenation of `children`.
    pub fn nested<'a>(typ: u64, children: impl IntoIterator<Item = &'a Block>) -> Self {
        let mut value = Vec::new();
        for child in children {
            child.encode_into(&mut value);
        }
        Self::new(typ, value)
    }

    /// Element type.
    pub fn typ(&self) -> u64 {
        self.typ
    }

    /// Element value.
    pub fn value(&self) -> &[u8] {
        &self.value
    }

    /// Consume the element, returning its value.
    pub fn into_value(self) -> Vec<u8> {
        self.value
    }

    /// Interpret the value as a NonNegativeInteger.
    pub fn read_non_negative_integer(&self) -> Result<u64, TlvError> {
        decode_non_negative_integer(&self.value)
    }

    /// Total encoded size.
    pub fn encoded_len(&self) -> usize {
        var_number_size(self.typ) + var_number_size(self.value.len() as u64) + self.value.len()
    }

    /// Append the wire encoding.
    pub fn encode_into(&self, buf: &mut Vec<u8>) {
        write_var_number(buf, self.typ);
        write_var_number(buf, self.value.len() as u64);
        buf.extend_from_slice(&self.value);
    }

    /// Wire encoding.
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.encoded_len());
        self.encode_into(&mut buf);
        buf
    }

    /// Read one element starting at `*pos`, advancing `pos` past it.
    pub fn read_from(buf: &[u8], pos: &mut usize) -> Result<Self, TlvError> {
        let typ = read_var_number(buf, pos)?;
        let len = read_var_number(buf, pos)?;
        let len = usize::try_from(len).map_err(|_| TlvError::InvalidVarNumber)?;
        let end = pos.checked_add(len).ok_or(TlvError::UnexpectedEof)?;
        let value = buf.get(*pos..end).ok_or(TlvError::UnexpectedEof)?;
        *pos = end;
        Ok(Self::new(typ, value.to_vec()))
    }

    /// Decode exactly one element occupying all of `wire`.
    pub fn decode(wire: &[u8]) -> Result<Self, TlvError> {
        let mut pos = 0;
        let block = Self::read_from(wire, &mut pos)?;
        if pos != wire.len() {
            return Err(TlvError::TrailingBytes(wire.len() - pos));
        }
        Ok(block)
    }

    /// Decode an element and require it to be of type `typ`.
    pub fn decode_expecting(wire: &[u8], typ: u64) -> Result<Self, TlvError> {
        let block = Self::decode(wire)?;
        block.expect_type(typ)?;
        Ok(block)
    }

    /// Fail unless this element is of type `typ`.
    pub fn expect_type(&self, typ: u64) -> Result<(), TlvError> {
        if self.typ != typ {
            return Err(TlvError::UnexpectedType {
                expected: typ,
                actual: self.typ,
            });
        }
        Ok(())
    }

    /// Parse the value as a sequence of sub-elements.
    pub fn elements(&self) -> Result<Vec<Block>, TlvError> {
        parse_elements(&self.value)
    }

    /// Find the first sub-element of type `typ`.
    pub fn find(&self, typ: u64) -> Result<Option<Block>, TlvError> {
        Ok(self.elements()?.into_iter().find(|b| b.typ == typ))
    }
}

/// Parse a buffer holding zero or more consecutive elements.
pub fn parse_elements(buf: &[u8]) -> Result<Vec<Block>, TlvError> {
    let mut pos = 0;
    let mut out = Vec::new();
    while pos < buf.len() {
        out.push(Block::read_from(buf, &mut pos)?);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_var_number_forms() {
        let cases: [(u64, &[u8]); 5] = [
            (0, &[0x00]),
            (252, &[0xFC]),
            (253, &[0xFD, 0x00, 0xFD]),
            (0x1_0000, &[0xFE, 0x00, 0x01, 0x00, 0x00]),
            (0x1_0000_0000, &[0xFF, 0, 0, 0, 0x01, 0, 0, 0, 0]),
        ];

        for (n, wire) in cases {
            let mut buf = Vec::new();
            write_var_number(&mut buf, n);
            assert_eq!(buf, wire, "encoding {n}");
            assert_eq!(var_number_size(n), wire.len());

            let mut pos = 0;
            assert_eq!(read_var_number(wire, &mut pos).unwrap(), n);
            assert_eq!(pos, wire.len());
        }
    }

    #[test]
    fn test_var_number_truncated() {
        let mut pos = 0;
        assert_eq!(
            read_var_number(&[0xFD, 0x01], &mut pos),
            Err(TlvError::UnexpectedEof)
        );
        let mut pos = 0;
        assert_eq!(read_var_number(&[], &mut pos), Err(TlvError::UnexpectedEof));
    }

    #[test]
    fn test_non_negative_integer() {
        assert_eq!(encode_non_negative_integer(0), vec![0x00]);
        assert_eq!(encode_non_negative_integer(1000), vec![0x03, 0xE8]);
        assert_eq!(encode_non_negative_integer(0x1_0000).len(), 4);
        assert_eq!(encode_non_negative_integer(u64::MAX).len(), 8);

        assert_eq!(decode_non_negative_integer(&[0x03, 0xE8]), Ok(1000));
        assert_eq!(
            decode_non_negative_integer(&[0x00, 0x00, 0x01]),
            Err(TlvError::InvalidNonNegativeInteger(3))
        );
        assert_eq!(
            decode_non_negative_integer(&[]),
            Err(TlvError::InvalidNonNegativeInteger(0))
        );
    }

    #[test]
    fn test_block_decode() {
        let wire = [0x08, 0x02, 0x72, 0x76];
        let block = Block::decode(&wire).unwrap();
        assert_eq!(block.typ(), 0x08);
        assert_eq!(block.value(), b"rv");
        assert_eq!(block.encode(), wire);
    }

    #[test]
    fn test_block_decode_rejects_bad_input() {
        assert_eq!(
            Block::decode(&[0x08, 0x05, 0x72]),
            Err(TlvError::UnexpectedEof)
        );
        assert_eq!(
            Block::decode(&[0x08, 0x00, 0xAA]),
            Err(TlvError::TrailingBytes(1))
        );
        assert_eq!(
            Block::decode_expecting(&[0x08, 0x00], 0x07),
            Err(TlvError::UnexpectedType {
                expected: 0x07,
                actual: 0x08
            })
        );
    }

    #[test]
    fn test_nested_and_find() {
        let inner = Block::from_non_negative_integer(0x6d, 1000);
        let outer = Block::nested(0x24, [&inner]);
        assert_eq!(outer.value(), &[0x6d, 0x02, 0x03, 0xE8]);

        let found = outer.find(0x6d).unwrap().unwrap();
        assert_eq!(found.read_non_negative_integer(), Ok(1000));
        assert!(outer.find(0x6e).unwrap().is_none());
    }

    #[test]
    fn test_criticality() {
        assert!(is_critical(0x07));
        assert!(is_critical(31));
        assert!(is_critical(0x6d + 2));
        assert!(!is_critical(0x6d - 1));
        assert!(!is_critical(32));
    }
}
