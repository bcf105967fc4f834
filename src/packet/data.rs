//! Data packet.
//!
//! Wire format:
//! ```text
//! Data = DATA-TYPE TLV-LENGTH
//!          Name
//!          [MetaInfo]          ; ContentType, FreshnessPeriod, FinalBlockId
//!          [Content]
//!          SignatureInfo
//!          SignatureValue
//! ```

use std::time::Duration;

use crate::core::{
    PacketError, TlvError, TLV_CONTENT, TLV_CONTENT_TYPE, TLV_DATA, TLV_FINAL_BLOCK_ID,
    TLV_FRESHNESS_PERIOD, TLV_META_INFO, TLV_NAME, TLV_SIGNATURE_INFO, TLV_SIGNATURE_VALUE,
};
use crate::encoding::tlv::{is_critical, Block};
use crate::encoding::Name;

use super::SignatureInfo;

/// ContentType values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ContentType {
    /// Opaque payload.
    #[default]
    Blob,
    /// Link object.
    Link,
    /// Public key.
    Key,
    /// Application-level negative acknowledgment.
    Nack,
    /// Manifest.
    Manifest,
    /// Prefix announcement.
    PrefixAnn,
    /// KITE acknowledgment.
    KiteAck,
    /// Any other value.
    Other(u64),
}

impl ContentType {
    /// Parse from the numeric value.
    pub fn from_u64(value: u64) -> Self {
        match value {
            0 => Self::Blob,
            1 => Self::Link,
            2 => Self::Key,
            3 => Self::Nack,
            4 => Self::Manifest,
            5 => Self::PrefixAnn,
            6 => Self::KiteAck,
            other => Self::Other(other),
        }
    }

    /// Numeric value.
    pub fn as_u64(self) -> u64 {
        match self {
            Self::Blob => 0,
            Self::Link => 1,
            Self::Key => 2,
            Self::Nack => 3,
            Self::Manifest => 4,
            Self::PrefixAnn => 5,
            Self::KiteAck => 6,
            Self::Other(other) => other,
        }
    }
}

/// A Data packet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Data {
    name: Name,
    content_type: ContentType,
    freshness_period: Option<Duration>,
    content: Vec<u8>,
    signature_info: Option<SignatureInfo>,
    signature_value: Option<Vec<u8>>,
}

impl Data {
    /// Create an unsigned Data packet with empty Blob content.
    pub fn new(name: Name) -> Self {
        Self {
            name,
            content_type: ContentType::Blob,
            freshness_period: None,
            content: Vec::new(),
            signature_info: None,
            signature_value: None,
        }
    }

    /// Data name.
    pub fn name(&self) -> &Name {
        &self.name
    }

    /// ContentType.
    pub fn content_type(&self) -> ContentType {
        self.content_type
    }

    /// Set the ContentType.
    pub fn set_content_type(&mut self, content_type: ContentType) -> &mut Self {
        self.content_type = content_type;
        self
    }

    /// FreshnessPeriod, if set.
    pub fn freshness_period(&self) -> Option<Duration> {
        self.freshness_period
    }

    /// Set the FreshnessPeriod.
    pub fn set_freshness_period(&mut self, period: Option<Duration>) -> &mut Self {
        self.freshness_period = period;
        self
    }

    /// Content value.
    pub fn content(&self) -> &[u8] {
        &self.content
    }

    /// Set the content value.
    pub fn set_content(&mut self, content: Vec<u8>) -> &mut Self {
        self.content = content;
        self
    }

    /// Check if the packet carries a signature.
    pub fn is_signed(&self) -> bool {
        self.signature_info.is_some() && self.signature_value.is_some()
    }

    /// Signature info, if present.
    pub fn signature_info(&self) -> Option<&SignatureInfo> {
        self.signature_info.as_ref()
    }

    /// Signature value, if present.
    pub fn signature_value(&self) -> Option<&[u8]> {
        self.signature_value.as_deref()
    }

    /// Attach signature info, clearing any previous signature value.
    pub fn set_signature_info(&mut self, info: SignatureInfo) -> &mut Self {
        self.signature_info = Some(info);
        self.signature_value = None;
        self
    }

    /// Attach the signature value.
    pub fn set_signature_value(&mut self, value: Vec<u8>) -> &mut Self {
        self.signature_value = Some(value);
        self
    }

    fn meta_info(&self) -> Option<Block> {
        let mut children = Vec::new();
        if self.content_type != ContentType::Blob {
            children.push(Block::from_non_negative_integer(
                TLV_CONTENT_TYPE,
                self.content_type.as_u64(),
            ));
        }
        if let Some(period) = self.freshness_period {
            let ms = u64::try_from(period.as_millis()).unwrap_or(u64::MAX);
            children.push(Block::from_non_negative_integer(TLV_FRESHNESS_PERIOD, ms));
        }
        (!children.is_empty()).then(|| Block::nested(TLV_META_INFO, &children))
    }

    fn unsigned_elements(&self) -> Vec<Block> {
        let mut children = vec![self.name.to_block()];
        children.extend(self.meta_info());
        children.push(Block::new(TLV_CONTENT, self.content.clone()));
        if let Some(info) = &self.signature_info {
            children.push(info.to_block(TLV_SIGNATURE_INFO));
        }
        children
    }

    /// Bytes covered by the signature: Name through SignatureInfo.
    pub fn signed_portion(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        for block in self.unsigned_elements() {
            block.encode_into(&mut buf);
        }
        buf
    }

    /// Convert to a Data TLV element.
    pub fn to_block(&self) -> Block {
        let mut children = self.unsigned_elements();
        if let Some(value) = &self.signature_value {
            children.push(Block::new(TLV_SIGNATURE_VALUE, value.clone()));
        }
        Block::nested(TLV_DATA, &children)
    }

    /// Wire encoding.
    pub fn encode(&self) -> Vec<u8> {
        self.to_block().encode()
    }

    /// Decode from wire encoding.
    pub fn decode(wire: &[u8]) -> Result<Self, PacketError> {
        Self::from_block(&Block::decode(wire)?)
    }

    /// Interpret a Data TLV element. Both SignatureInfo and SignatureValue are required.
    pub fn from_block(block: &Block) -> Result<Self, PacketError> {
        block.expect_type(TLV_DATA)?;
        let mut elements = block.elements()?.into_iter();
        let name_block = elements.next().ok_or(TlvError::MissingElement(TLV_NAME))?;
        let mut data = Self::new(Name::from_block(&name_block)?);

        for element in elements {
            match element.typ() {
                TLV_META_INFO => data.decode_meta_info(&element)?,
                TLV_CONTENT => data.content = element.into_value(),
                TLV_SIGNATURE_INFO => data.signature_info = Some(SignatureInfo::from_block(&element)?),
                TLV_SIGNATURE_VALUE => data.signature_value = Some(element.into_value()),
                typ if is_critical(typ) => return Err(TlvError::UnrecognizedCritical(typ).into()),
                _ => {}
            }
        }

        if data.signature_info.is_none() {
            return Err(TlvError::MissingElement(TLV_SIGNATURE_INFO).into());
        }
        if data.signature_value.is_none() {
            return Err(TlvError::MissingElement(TLV_SIGNATURE_VALUE).into());
        }
        Ok(data)
    }

    fn decode_meta_info(&mut self, block: &Block) -> Result<(), TlvError> {
        for element in block.elements()? {
            match element.typ() {
                TLV_CONTENT_TYPE => {
                    self.content_type = ContentType::from_u64(element.read_non_negative_integer()?);
                }
                TLV_FRESHNESS_PERIOD => {
                    let ms = element.read_non_negative_integer()?;
                    self.freshness_period = Some(Duration::from_millis(ms));
                }
                TLV_FINAL_BLOCK_ID => {}
                typ if is_critical(typ) => return Err(TlvError::UnrecognizedCritical(typ)),
                _ => {}
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signed(mut data: Data) -> Data {
        data.set_signature_info(SignatureInfo::new(0));
        data.set_signature_value(vec![0; 32]);
        data
    }

    #[test]
    fn test_content_type_values() {
        for value in 0..8 {
            assert_eq!(ContentType::from_u64(value).as_u64(), value);
        }
        assert_eq!(ContentType::from_u64(6), ContentType::KiteAck);
        assert_eq!(ContentType::from_u64(1024), ContentType::Other(1024));
    }

    #[test]
    fn test_encode_decode() {
        let mut data = Data::new("/rv/32=KITE/alice".parse().unwrap());
        data.set_content_type(ContentType::KiteAck)
            .set_freshness_period(Some(Duration::from_secs(1)))
            .set_content(b"payload".to_vec());
        let data = signed(data);

        let decoded = Data::decode(&data.encode()).unwrap();
        assert_eq!(decoded, data);
        assert!(decoded.is_signed());
    }

    #[test]
    fn test_blob_omits_meta_info() {
        let data = signed(Data::new("/a".parse().unwrap()));
        let wire = data.encode();
        assert!(Block::decode(&wire).unwrap().find(TLV_META_INFO).unwrap().is_none());
        assert_eq!(Data::decode(&wire).unwrap().content_type(), ContentType::Blob);
    }

    #[test]
    fn test_decode_requires_signature() {
        let unsigned = Data::new("/a".parse().unwrap());
        assert_eq!(
            Data::decode(&unsigned.encode()),
            Err(PacketError::Tlv(TlvError::MissingElement(TLV_SIGNATURE_INFO)))
        );
    }

    #[test]
    fn test_signed_portion_excludes_value() {
        let data = signed(Data::new("/a".parse().unwrap()));
        let portion = data.signed_portion();
        let wire = data.encode();
        // outer TL (2 bytes) + signed portion + SignatureValue TLV (34 bytes)
        assert_eq!(wire.len(), 2 + portion.len() + 34);
        assert_eq!(&wire[2..2 + portion.len()], portion.as_slice());
    }
}
