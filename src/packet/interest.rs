//! Interest packet.
//!
//! Wire format (NDN packet format v0.3):
//! ```text
//! Interest = INTEREST-TYPE TLV-LENGTH
//!              Name
//!              [CanBePrefix]
//!              [MustBeFresh]
//!              [ForwardingHint]          ; skipped on decode
//!              [Nonce]
//!              [InterestLifetime]
//!              [HopLimit]
//!              [ApplicationParameters
//!                [InterestSignatureInfo
//!                 InterestSignatureValue]]
//! ```
//!
//! When ApplicationParameters are present the name ends with a
//! ParametersSha256DigestComponent computed over everything from
//! ApplicationParameters to the end of the packet.

use std::time::Duration;

use rand::{rngs::OsRng, RngCore};
use sha2::{Digest, Sha256};

use crate::core::{
    PacketError, TlvError, INTEREST_NONCE_SIZE, TLV_APPLICATION_PARAMETERS, TLV_CAN_BE_PREFIX,
    TLV_FORWARDING_HINT, TLV_HOP_LIMIT, TLV_INTEREST, TLV_INTEREST_LIFETIME,
    TLV_INTEREST_SIGNATURE_INFO, TLV_INTEREST_SIGNATURE_VALUE, TLV_MUST_BE_FRESH, TLV_NAME,
    TLV_NONCE,
};
use crate::encoding::tlv::{is_critical, Block};
use crate::encoding::{Component, Name};

use super::SignatureInfo;

/// An Interest packet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interest {
    name: Name,
    can_be_prefix: bool,
    must_be_fresh: bool,
    nonce: [u8; INTEREST_NONCE_SIZE],
    lifetime: Option<Duration>,
    hop_limit: Option<u8>,
    application_parameters: Option<Vec<u8>>,
    signature_info: Option<SignatureInfo>,
    signature_value: Option<Vec<u8>>,
}

impl Interest {
    /// Create an Interest for `name` with a random nonce.
    pub fn new(name: Name) -> Self {
        Self {
            name,
            can_be_prefix: false,
            must_be_fresh: false,
            nonce: random_nonce(),
            lifetime: None,
            hop_limit: None,
            application_parameters: None,
            signature_info: None,
            signature_value: None,
        }
    }

    /// Interest name.
    pub fn name(&self) -> &Name {
        &self.name
    }

    /// CanBePrefix flag.
    pub fn can_be_prefix(&self) -> bool {
        self.can_be_prefix
    }

    /// Set the CanBePrefix flag.
    pub fn set_can_be_prefix(&mut self, can_be_prefix: bool) -> &mut Self {
        self.can_be_prefix = can_be_prefix;
        self
    }

    /// MustBeFresh flag.
    pub fn must_be_fresh(&self) -> bool {
        self.must_be_fresh
    }

    /// Set the MustBeFresh flag.
    pub fn set_must_be_fresh(&mut self, must_be_fresh: bool) -> &mut Self {
        self.must_be_fresh = must_be_fresh;
        self
    }

    /// Interest nonce.
    pub fn nonce(&self) -> [u8; INTEREST_NONCE_SIZE] {
        self.nonce
    }

    /// Set the Interest nonce.
    pub fn set_nonce(&mut self, nonce: [u8; INTEREST_NONCE_SIZE]) -> &mut Self {
        self.nonce = nonce;
        self
    }

    /// InterestLifetime, if set.
    pub fn lifetime(&self) -> Option<Duration> {
        self.lifetime
    }

    /// Set the InterestLifetime.
    pub fn set_lifetime(&mut self, lifetime: Option<Duration>) -> &mut Self {
        self.lifetime = lifetime;
        self
    }

    /// HopLimit, if set.
    pub fn hop_limit(&self) -> Option<u8> {
        self.hop_limit
    }

    /// Set the HopLimit.
    pub fn set_hop_limit(&mut self, hop_limit: Option<u8>) -> &mut Self {
        self.hop_limit = hop_limit;
        self
    }

    /// ApplicationParameters value, if present.
    pub fn application_parameters(&self) -> Option<&[u8]> {
        self.application_parameters.as_deref()
    }

    /// Check if ApplicationParameters are present.
    pub fn has_application_parameters(&self) -> bool {
        self.application_parameters.is_some()
    }

    /// Set the ApplicationParameters value and refresh the digest component.
    pub fn set_application_parameters(&mut self, value: Vec<u8>) -> &mut Self {
        self.application_parameters = Some(value);
        self.update_parameters_digest();
        self
    }

    /// Set ApplicationParameters from an element.
    ///
    /// An ApplicationParameters element is used as is; any other element
    /// becomes the sole content of the parameters.
    pub fn set_application_parameters_block(&mut self, block: &Block) -> &mut Self {
        let value = if block.typ() == TLV_APPLICATION_PARAMETERS {
            block.value().to_vec()
        } else {
            block.encode()
        };
        self.set_application_parameters(value)
    }

    /// Check if the Interest carries a v0.3 signature.
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
    ///
    /// Empty ApplicationParameters are added if none are present, since the
    /// signature lives inside the parameters section.
    pub fn set_signature_info(&mut self, info: SignatureInfo) -> &mut Self {
        if self.application_parameters.is_none() {
            self.application_parameters = Some(Vec::new());
        }
        self.signature_info = Some(info);
        self.signature_value = None;
        self.update_parameters_digest();
        self
    }

    /// Attach the signature value and refresh the digest component.
    pub fn set_signature_value(&mut self, value: Vec<u8>) -> &mut Self {
        self.signature_value = Some(value);
        self.update_parameters_digest();
        self
    }

    /// Bytes covered by the signature.
    ///
    /// Name components other than the parameters digest, followed by
    /// ApplicationParameters and InterestSignatureInfo.
    pub fn signed_portion(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        for c in self.name.iter().filter(|c| !c.is_parameters_digest()) {
            c.encode_into(&mut buf);
        }
        if let Some(params) = &self.application_parameters {
            Block::new(TLV_APPLICATION_PARAMETERS, params.clone()).encode_into(&mut buf);
        }
        if let Some(info) = &self.signature_info {
            info.to_block(TLV_INTEREST_SIGNATURE_INFO).encode_into(&mut buf);
        }
        buf
    }

    /// SHA-256 over ApplicationParameters through the end of the packet.
    fn compute_parameters_digest(&self) -> Option<[u8; 32]> {
        let params = self.application_parameters.as_ref()?;
        let mut hasher = Sha256::new();
        hasher.update(Block::new(TLV_APPLICATION_PARAMETERS, params.clone()).encode());
        if let Some(info) = &self.signature_info {
            hasher.update(info.to_block(TLV_INTEREST_SIGNATURE_INFO).encode());
        }
        if let Some(value) = &self.signature_value {
            hasher.update(Block::new(TLV_INTEREST_SIGNATURE_VALUE, value.clone()).encode());
        }
        Some(hasher.finalize().into())
    }

    /// Keeps a single digest component as the last name component.
    fn update_parameters_digest(&mut self) {
        self.name.retain(|c| !c.is_parameters_digest());
        if let Some(digest) = self.compute_parameters_digest() {
            self.name.push(Component::parameters_digest(digest));
        }
    }

    /// Check whether the digest component matches the parameters.
    ///
    /// Interests without parameters are valid when they carry no digest component.
    pub fn is_parameters_digest_valid(&self) -> bool {
        let mut digests = self.name.iter().filter(|c| c.is_parameters_digest());
        match (self.compute_parameters_digest(), digests.next(), digests.next()) {
            (None, None, _) => true,
            (Some(expected), Some(actual), None) => actual.value() == expected.as_slice(),
            _ => false,
        }
    }

    /// Convert to an Interest TLV element.
    pub fn to_block(&self) -> Block {
        let mut children = vec![self.name.to_block()];
        if self.can_be_prefix {
            children.push(Block::empty(TLV_CAN_BE_PREFIX));
        }
        if self.must_be_fresh {
            children.push(Block::empty(TLV_MUST_BE_FRESH));
        }
        children.push(Block::new(TLV_NONCE, self.nonce.to_vec()));
        if let Some(lifetime) = self.lifetime {
            let ms = u64::try_from(lifetime.as_millis()).unwrap_or(u64::MAX);
            children.push(Block::from_non_negative_integer(TLV_INTEREST_LIFETIME, ms));
        }
        if let Some(hop_limit) = self.hop_limit {
            children.push(Block::new(TLV_HOP_LIMIT, vec![hop_limit]));
        }
        if let Some(params) = &self.application_parameters {
            children.push(Block::new(TLV_APPLICATION_PARAMETERS, params.clone()));
        }
        if let Some(info) = &self.signature_info {
            children.push(info.to_block(TLV_INTEREST_SIGNATURE_INFO));
        }
        if let Some(value) = &self.signature_value {
            children.push(Block::new(TLV_INTEREST_SIGNATURE_VALUE, value.clone()));
        }
        Block::nested(TLV_INTEREST, &children)
    }

    /// Wire encoding.
    pub fn encode(&self) -> Vec<u8> {
        self.to_block().encode()
    }

    /// Decode from wire encoding.
    pub fn decode(wire: &[u8]) -> Result<Self, PacketError> {
        Self::from_block(&Block::decode(wire)?)
    }

    /// Interpret an Interest TLV element.
    ///
    /// Input is treated as untrusted: every element is validated and the
    /// parameters/signature layout is checked before the value is returned.
    pub fn from_block(block: &Block) -> Result<Self, PacketError> {
        block.expect_type(TLV_INTEREST)?;
        let mut elements = block.elements()?.into_iter();
        let name_block = elements.next().ok_or(TlvError::MissingElement(TLV_NAME))?;
        let mut interest = Self::new(Name::from_block(&name_block)?);

        for element in elements {
            match element.typ() {
                TLV_CAN_BE_PREFIX => interest.can_be_prefix = true,
                TLV_MUST_BE_FRESH => interest.must_be_fresh = true,
                TLV_FORWARDING_HINT => {}
                TLV_NONCE => {
                    let len = element.value().len();
                    interest.nonce = element
                        .value()
                        .try_into()
                        .map_err(|_| PacketError::InvalidNonce(len))?;
                }
                TLV_INTEREST_LIFETIME => {
                    let ms = element.read_non_negative_integer()?;
                    interest.lifetime = Some(Duration::from_millis(ms));
                }
                TLV_HOP_LIMIT => match element.value() {
                    [hop] => interest.hop_limit = Some(*hop),
                    _ => {
                        return Err(TlvError::InvalidValue {
                            typ: TLV_HOP_LIMIT,
                            reason: "HopLimit must be one byte",
                        }
                        .into());
                    }
                },
                TLV_APPLICATION_PARAMETERS => {
                    interest.application_parameters = Some(element.into_value());
                }
                TLV_INTEREST_SIGNATURE_INFO => {
                    interest.signature_info = Some(SignatureInfo::from_block(&element)?);
                }
                TLV_INTEREST_SIGNATURE_VALUE => {
                    interest.signature_value = Some(element.into_value());
                }
                typ if is_critical(typ) => return Err(TlvError::UnrecognizedCritical(typ).into()),
                _ => {}
            }
        }

        if interest.signature_info.is_some() && interest.application_parameters.is_none() {
            return Err(PacketError::SignatureWithoutParameters);
        }
        if interest.signature_value.is_some() && interest.signature_info.is_none() {
            return Err(TlvError::MissingElement(TLV_INTEREST_SIGNATURE_INFO).into());
        }
        let digests = interest
            .name
            .iter()
            .filter(|c| c.is_parameters_digest())
            .count();
        let digest_placed = match interest.application_parameters {
            Some(_) => {
                digests == 1
                    && interest
                        .name
                        .last()
                        .is_some_and(Component::is_parameters_digest)
            }
            None => digests == 0,
        };
        if !digest_placed {
            return Err(TlvError::InvalidValue {
                typ: TLV_NAME,
                reason: "ApplicationParameters require one ParametersSha256DigestComponent, placed last",
            }
            .into());
        }
        Ok(interest)
    }
}

fn random_nonce() -> [u8; INTEREST_NONCE_SIZE] {
    let mut nonce = [0u8; INTEREST_NONCE_SIZE];
    OsRng.fill_bytes(&mut nonce);
    nonce
}
