//! KITE request: a signed Interest from a producer to its rendezvous node.

use std::time::{Duration, SystemTime};

use crate::core::{MalformedNameCause, RequestError, TLV_EXPIRATION_PERIOD};
use crate::encoding::tlv::{parse_elements, Block};
use crate::encoding::Name;
use crate::packet::Interest;
use crate::security::{
    InterestSigner, PacketSigner, SignedInterestFlags, SignedInterestFormat, SigningInfo,
};

use super::{extract_prefixes, kite_keyword, Ack};

/// A KITE request.
///
/// Built either by setting the prefixes and calling
/// [`make_interest`](Self::make_interest), or by [`decode`](Self::decode)
/// on a received Interest. Nonce and timestamp are only known after one of
/// those two operations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Request {
    rv_prefix: Name,
    producer_suffix: Name,
    nonce: Option<Vec<u8>>,
    timestamp: Option<SystemTime>,
    expiration: Option<Duration>,
}

impl Request {
    /// Create an empty request.
    pub fn new() -> Self {
        Self::default()
    }

    /// Populate this request from a received Interest.
    ///
    /// On error the request is left unchanged.
    pub fn decode(&mut self, interest: &Interest) -> Result<(), RequestError> {
        let decoded = Self::parse(interest).inspect_err(|e| {
            tracing::debug!(name = %interest.name(), error = %e, "rejected KITE request");
        })?;
        *self = decoded;
        Ok(())
    }

    fn parse(interest: &Interest) -> Result<Self, RequestError> {
        let info = match interest.signature_info() {
            Some(info) if interest.is_signed() => info,
            _ => return Err(RequestError::NotSigned),
        };
        let (Some(nonce), Some(timestamp)) = (&info.nonce, info.time) else {
            return Err(RequestError::MissingNonceOrTimestamp);
        };
        let (rv_prefix, producer_suffix) = extract_prefixes(interest.name())
            .map_err(|e| RequestError::MalformedName(MalformedNameCause::new(e)))?;

        // a signed Interest always carries parameters
        debug_assert!(interest.has_application_parameters());
        let params = interest.application_parameters().unwrap_or_default();
        let elements = parse_elements(params).map_err(RequestError::MalformedParameters)?;
        let expiration = elements
            .iter()
            .find(|e| e.typ() == TLV_EXPIRATION_PERIOD)
            .map(Block::read_non_negative_integer)
            .transpose()
            .map_err(RequestError::MalformedParameters)?
            .map(Duration::from_millis);

        Ok(Self {
            rv_prefix,
            producer_suffix,
            nonce: Some(nonce.clone()),
            timestamp: Some(timestamp),
            expiration,
        })
    }

    /// Build and sign the request Interest.
    ///
    /// The Interest is named `<rv-prefix>/32=KITE/<producer-suffix>` plus the
    /// parameters digest, and is signed with a nonce and a timestamp, which
    /// are recorded on this request.
    pub fn make_interest<S: PacketSigner + ?Sized>(
        &mut self,
        signer: &mut InterestSigner<'_, S>,
        si: &SigningInfo,
    ) -> Result<Interest, RequestError> {
        if self.rv_prefix.is_empty() {
            return Err(RequestError::RvPrefixNotSet);
        }
        if self.producer_suffix.is_empty() {
            return Err(RequestError::ProducerSuffixNotSet);
        }

        let mut name = self.rv_prefix.clone();
        name.push(kite_keyword()).append_name(&self.producer_suffix);
        let mut interest = Interest::new(name);
        interest.set_can_be_prefix(false);
        if let Some(expiration) = self.expiration {
            let ms = u64::try_from(expiration.as_millis()).unwrap_or(u64::MAX);
            interest.set_application_parameters_block(&Block::from_non_negative_integer(
                TLV_EXPIRATION_PERIOD,
                ms,
            ));
        }

        if si.signed_interest_format() != SignedInterestFormat::V03 {
            return Err(RequestError::WrongSignatureFormat);
        }
        signer.make_signed_interest(
            &mut interest,
            si,
            SignedInterestFlags::WANT_NONCE | SignedInterestFlags::WANT_TIME,
        )?;

        if let Some(info) = interest.signature_info() {
            self.nonce = info.nonce.clone();
            self.timestamp = info.time;
        }
        tracing::debug!(name = %interest.name(), "made KITE request");
        Ok(interest)
    }

    /// Rendezvous prefix.
    pub fn rv_prefix(&self) -> &Name {
        &self.rv_prefix
    }

    /// Producer suffix.
    pub fn producer_suffix(&self) -> &Name {
        &self.producer_suffix
    }

    /// Rendezvous prefix followed by the producer suffix.
    pub fn producer_prefix(&self) -> Name {
        self.rv_prefix.concat(&self.producer_suffix)
    }

    /// Signature nonce of the last encoded or decoded Interest.
    pub fn nonce(&self) -> Option<&[u8]> {
        self.nonce.as_deref()
    }

    /// Signature time of the last encoded or decoded Interest.
    pub fn timestamp(&self) -> Option<SystemTime> {
        self.timestamp
    }

    /// Requested expiration period.
    pub fn expiration(&self) -> Option<Duration> {
        self.expiration
    }

    /// Set the rendezvous prefix.
    pub fn set_rv_prefix(&mut self, rv_prefix: Name) -> &mut Self {
        self.rv_prefix = rv_prefix;
        self
    }

    /// Set the producer suffix.
    pub fn set_producer_suffix(&mut self, producer_suffix: Name) -> &mut Self {
        self.producer_suffix = producer_suffix;
        self
    }

    /// Set the expiration period in milliseconds. Negative values are rejected.
    pub fn set_expiration(&mut self, expiration_ms: i64) -> Result<&mut Self, RequestError> {
        let ms = u64::try_from(expiration_ms)
            .map_err(|_| RequestError::NegativeExpiration(expiration_ms))?;
        self.expiration = Some(Duration::from_millis(ms));
        Ok(self)
    }

    /// Check if `ack` announces this request's producer prefix.
    ///
    /// An ack without a prefix announcement never matches.
    pub fn can_match(&self, ack: &Ack) -> bool {
        ack.prefix_announcement()
            .is_some_and(|pa| pa.announced_name() == &self.producer_prefix())
    }
}
