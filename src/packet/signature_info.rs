//! Signature metadata shared by signed Interests and Data.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::core::{
    PacketError, TlvError, TLV_INTEREST_SIGNATURE_INFO, TLV_KEY_LOCATOR, TLV_NAME,
    TLV_SIGNATURE_INFO, TLV_SIGNATURE_NONCE, TLV_SIGNATURE_SEQ_NUM, TLV_SIGNATURE_TIME,
    TLV_SIGNATURE_TYPE,
};
use crate::encoding::tlv::{is_critical, Block};
use crate::encoding::Name;

/// SignatureInfo / InterestSignatureInfo contents.
///
/// Nonce, time and sequence number are only meaningful for signed Interests,
/// where they provide replay resistance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureInfo {
    /// SignatureType value.
    pub signature_type: u64,
    /// Name of the signing key, if any.
    pub key_locator: Option<Name>,
    /// Random SignatureNonce bytes.
    pub nonce: Option<Vec<u8>>,
    /// SignatureTime, millisecond precision.
    pub time: Option<SystemTime>,
    /// SignatureSeqNum.
    pub seq_num: Option<u64>,
}

impl SignatureInfo {
    /// Create signature info of the given type with no optional fields.
    pub fn new(signature_type: u64) -> Self {
        Self {
            signature_type,
            key_locator: None,
            nonce: None,
            time: None,
            seq_num: None,
        }
    }

    /// Encode as an element of type `outer` (SignatureInfo or InterestSignatureInfo).
    pub fn to_block(&self, outer: u64) -> Block {
        let mut children = vec![Block::from_non_negative_integer(
            TLV_SIGNATURE_TYPE,
            self.signature_type,
        )];
        if let Some(key) = &self.key_locator {
            children.push(Block::nested(TLV_KEY_LOCATOR, [&key.to_block()]));
        }
        // replay-protection fields only exist in the Interest variant
        if outer == TLV_INTEREST_SIGNATURE_INFO {
            if let Some(nonce) = &self.nonce {
                children.push(Block::new(TLV_SIGNATURE_NONCE, nonce.clone()));
            }
            if let Some(time) = self.time {
                children.push(Block::from_non_negative_integer(
                    TLV_SIGNATURE_TIME,
                    to_unix_millis(time),
                ));
            }
            if let Some(seq) = self.seq_num {
                children.push(Block::from_non_negative_integer(TLV_SIGNATURE_SEQ_NUM, seq));
            }
        }
        Block::nested(outer, &children)
    }

    /// Decode from a SignatureInfo or InterestSignatureInfo element.
    pub fn from_block(block: &Block) -> Result<Self, PacketError> {
        let outer = block.typ();
        if outer != TLV_SIGNATURE_INFO && outer != TLV_INTEREST_SIGNATURE_INFO {
            return Err(TlvError::UnexpectedType {
                expected: TLV_SIGNATURE_INFO,
                actual: outer,
            }
            .into());
        }

        let mut elements = block.elements()?.into_iter();
        let first = elements
            .next()
            .ok_or(TlvError::MissingElement(TLV_SIGNATURE_TYPE))?;
        first.expect_type(TLV_SIGNATURE_TYPE)?;
        let mut info = Self::new(first.read_non_negative_integer()?);

        for element in elements {
            match element.typ() {
                TLV_KEY_LOCATOR => {
                    // KeyDigest locators carry no name; keep only Name locators
                    if let Some(name) = element.find(TLV_NAME)? {
                        info.key_locator = Some(Name::from_block(&name)?);
                    }
                }
                TLV_SIGNATURE_NONCE => info.nonce = Some(element.into_value()),
                TLV_SIGNATURE_TIME => {
                    let ms = element.read_non_negative_integer()?;
                    info.time = Some(from_unix_millis(ms)?);
                }
                TLV_SIGNATURE_SEQ_NUM => info.seq_num = Some(element.read_non_negative_integer()?),
                typ if is_critical(typ) => return Err(TlvError::UnrecognizedCritical(typ).into()),
                _ => {}
            }
        }
        Ok(info)
    }
}

/// Milliseconds since the Unix epoch, saturating at zero for earlier times.
pub fn to_unix_millis(time: SystemTime) -> u64 {
    time.duration_since(UNIX_EPOCH)
        .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or(0)
}

/// Time point `ms` milliseconds after the Unix epoch.
pub fn from_unix_millis(ms: u64) -> Result<SystemTime, PacketError> {
    UNIX_EPOCH
        .checked_add(Duration::from_millis(ms))
        .ok_or(PacketError::TimeOutOfRange)
}
