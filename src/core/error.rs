//! Error types for the KITE protocol and its packet primitives.

use thiserror::Error;

/// Errors raised while decoding TLV-encoded input.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TlvError {
    /// Input ended before the element was complete.
    #[error("unexpected end of input")]
    UnexpectedEof,

    /// A VAR-NUMBER length does not fit in `usize`.
    #[error("invalid VAR-NUMBER encoding")]
    InvalidVarNumber,

    /// A NonNegativeInteger had a length other than 1, 2, 4 or 8.
    #[error("invalid NonNegativeInteger length: {0}")]
    InvalidNonNegativeInteger(usize),

    /// A different element type was found than the one expected.
    #[error("unexpected TLV type: expected {expected}, got {actual}")]
    UnexpectedType {
        /// Expected TLV type.
        expected: u64,
        /// Actual TLV type.
        actual: u64,
    },

    /// A required element is absent.
    #[error("missing required element of type {0}")]
    MissingElement(u64),

    /// An unrecognized critical element was present.
    #[error("unrecognized critical element of type {0}")]
    UnrecognizedCritical(u64),

    /// Bytes remained after a complete element.
    #[error("{0} trailing bytes after element")]
    TrailingBytes(usize),

    /// An element carried an invalid value.
    #[error("invalid value for element of type {typ}: {reason}")]
    InvalidValue {
        /// TLV type of the offending element.
        typ: u64,
        /// What was wrong with it.
        reason: &'static str,
    },
}

/// Errors raised while parsing a name from its URI representation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NameError {
    /// Percent-escape sequence was truncated or not hexadecimal.
    #[error("invalid percent-escape in component {0:?}")]
    InvalidEscape(String),

    /// Component type prefix (`T=`) was not a valid number.
    #[error("invalid component type in {0:?}")]
    InvalidType(String),

    /// Digest component was not 32 bytes of hexadecimal.
    #[error("invalid digest component {0:?}")]
    InvalidDigest(String),

    /// Component consisting of one or two periods only.
    #[error("illegal component {0:?}")]
    IllegalComponent(String),
}

/// Errors raised by KITE prefix extraction.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ExtractError {
    /// The keyword is the first component.
    #[error("missing RV prefix")]
    MissingRvPrefix,

    /// The keyword does not occur in the name.
    #[error("missing \"KITE\" keyword")]
    MissingKeyword,

    /// Nothing lies between the keyword and the trailing digest component.
    #[error("missing producer suffix")]
    MissingProducerSuffix,
}

/// Errors raised while signing or verifying packets.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SignError {
    /// The requested signed Interest format cannot be produced.
    #[error("unsupported signed Interest format: {0}")]
    UnsupportedFormat(&'static str),

    /// No key is known for the requested identity.
    #[error("unknown identity: {0}")]
    UnknownIdentity(String),
}

/// Errors raised while decoding an Interest or Data packet.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PacketError {
    /// Malformed TLV structure.
    #[error("malformed TLV")]
    Tlv(#[from] TlvError),

    /// Signature time does not fit in a system time point.
    #[error("signature time out of range")]
    TimeOutOfRange,

    /// The Interest nonce had the wrong size.
    #[error("invalid Interest nonce length: {0}")]
    InvalidNonce(usize),

    /// Signature info present without ApplicationParameters.
    #[error("InterestSignatureInfo without ApplicationParameters")]
    SignatureWithoutParameters,
}

/// Errors raised by prefix announcement encoding and decoding.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PrefixAnnouncementError {
    /// Data name does not end with `32=PA/<version>/<segment>`.
    #[error("Data is not a prefix announcement: wrong name structure")]
    WrongName,

    /// Data ContentType is not PrefixAnn.
    #[error("Data is not a prefix announcement: ContentType is {0}")]
    WrongContentType(u64),

    /// Content is not a valid announcement payload.
    #[error("invalid prefix announcement content")]
    Content(#[from] TlvError),

    /// Expiration period required for encoding.
    #[error("expiration period not set")]
    ExpirationNotSet,

    /// Signing failed.
    #[error("signing failed")]
    Sign(#[from] SignError),
}

/// Cause of [`RequestError::MalformedName`].
///
/// Opaque: only its message and source chain are observable.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error(transparent)]
pub struct MalformedNameCause(ExtractError);

impl MalformedNameCause {
    pub(crate) fn new(err: ExtractError) -> Self {
        Self(err)
    }
}

/// Errors raised by [`Request`](crate::kite::Request) operations.
#[derive(Debug, Error)]
pub enum RequestError {
    /// The Interest carries no signature.
    #[error("not signed")]
    NotSigned,

    /// The signature info lacks a nonce or a timestamp.
    #[error("missing nonce or timestamp")]
    MissingNonceOrTimestamp,

    /// The Interest name does not follow the KITE request layout.
    #[error("name is in the wrong format")]
    MalformedName(#[source] MalformedNameCause),

    /// ApplicationParameters could not be interpreted.
    #[error("malformed application parameters")]
    MalformedParameters(#[source] TlvError),

    /// RV prefix is empty.
    #[error("RV prefix not set")]
    RvPrefixNotSet,

    /// Producer suffix is empty.
    #[error("producer suffix not set")]
    ProducerSuffixNotSet,

    /// Expiration period is negative.
    #[error("negative expiration period: {0} ms")]
    NegativeExpiration(i64),

    /// Signing parameters do not request the v0.3 signed Interest format.
    #[error("signed Interest format is not v0.3")]
    WrongSignatureFormat,

    /// Signing failed.
    #[error("signing failed")]
    Sign(#[from] SignError),
}

impl RequestError {
    /// Check if this error stems from malformed (possibly adversarial) input.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            RequestError::NotSigned
                | RequestError::MissingNonceOrTimestamp
                | RequestError::MalformedName(_)
                | RequestError::MalformedParameters(_)
        )
    }

    /// Check if this error indicates local misuse of the API.
    pub fn is_usage(&self) -> bool {
        matches!(
            self,
            RequestError::RvPrefixNotSet
                | RequestError::ProducerSuffixNotSet
                | RequestError::NegativeExpiration(_)
                | RequestError::WrongSignatureFormat
        )
    }
}

/// Errors raised by [`Ack`](crate::kite::Ack) operations.
#[derive(Debug, Error)]
pub enum AckError {
    /// The Data ContentType does not mark a KITE acknowledgment.
    #[error("not a KITE acknowledgment, ContentType is {0}")]
    NotAKiteAck(u64),

    /// The content does not hold a valid prefix announcement.
    #[error("no valid prefix announcement")]
    NoValidPrefixAnnouncement(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// No prefix announcement is held.
    #[error("prefix announcement not set")]
    PrefixAnnouncementNotSet,

    /// The request name does not follow the KITE request layout.
    #[error("request name is in the wrong format")]
    MalformedRequestName(#[source] ExtractError),

    /// The announced name differs from the producer prefix of the request.
    #[error("producer prefix mismatch")]
    ProducerPrefixMismatch,

    /// Encoding the prefix announcement failed.
    #[error("prefix announcement encoding failed")]
    PrefixAnnouncement(#[source] PrefixAnnouncementError),

    /// Signing failed.
    #[error("signing failed")]
    Sign(#[from] SignError),
}

impl AckError {
    /// Check if this error stems from malformed (possibly adversarial) input.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            AckError::NotAKiteAck(_) | AckError::NoValidPrefixAnnouncement(_)
        )
    }

    /// Check if this error indicates local misuse of the API.
    pub fn is_usage(&self) -> bool {
        matches!(
            self,
            AckError::PrefixAnnouncementNotSet
                | AckError::MalformedRequestName(_)
                | AckError::ProducerPrefixMismatch
        )
    }
}

/// Invalid [`RttOptions`](crate::timing::RttOptions).
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RttConfigError {
    /// Alpha outside `[0, 1]`.
    #[error("alpha must be within [0, 1], got {0}")]
    Alpha(f64),

    /// Beta outside `[0, 1]`.
    #[error("beta must be within [0, 1], got {0}")]
    Beta(f64),

    /// Negative or non-finite variance multiplier.
    #[error("k must be non-negative, got {0}")]
    K(f64),

    /// Minimum RTO greater than maximum RTO.
    #[error("min RTO ({min:?}) exceeds max RTO ({max:?})")]
    RtoBounds {
        /// Configured minimum.
        min: std::time::Duration,
        /// Configured maximum.
        max: std::time::Duration,
    },

    /// Backoff multiplier below one or non-finite.
    #[error("RTO backoff multiplier must be at least 1, got {0}")]
    BackoffMultiplier(f64),
}

/// Top-level errors.
#[derive(Debug, Error)]
pub enum KiteError {
    /// TLV error.
    #[error(transparent)]
    Tlv(#[from] TlvError),

    /// Name error.
    #[error(transparent)]
    Name(#[from] NameError),

    /// Packet error.
    #[error(transparent)]
    Packet(#[from] PacketError),

    /// Prefix extraction error.
    #[error(transparent)]
    Extract(#[from] ExtractError),

    /// Request error.
    #[error(transparent)]
    Request(#[from] RequestError),

    /// Ack error.
    #[error(transparent)]
    Ack(#[from] AckError),

    /// Prefix announcement error.
    #[error(transparent)]
    PrefixAnnouncement(#[from] PrefixAnnouncementError),

    /// Signing error.
    #[error(transparent)]
    Sign(#[from] SignError),

    /// Configuration error.
    #[error(transparent)]
    Config(#[from] RttConfigError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_error_taxonomy() {
        assert!(RequestError::NotSigned.is_structural());
        assert!(RequestError::MissingNonceOrTimestamp.is_structural());
        assert!(
            RequestError::MalformedName(MalformedNameCause::new(ExtractError::MissingKeyword))
                .is_structural()
        );
        assert!(RequestError::MalformedParameters(TlvError::UnexpectedEof).is_structural());

        assert!(RequestError::RvPrefixNotSet.is_usage());
        assert!(RequestError::ProducerSuffixNotSet.is_usage());
        assert!(RequestError::NegativeExpiration(-1).is_usage());
        assert!(RequestError::WrongSignatureFormat.is_usage());

        assert!(!RequestError::NotSigned.is_usage());
        assert!(!RequestError::RvPrefixNotSet.is_structural());
    }

    #[test]
    fn test_ack_error_taxonomy() {
        assert!(AckError::NotAKiteAck(0).is_structural());
        assert!(AckError::NoValidPrefixAnnouncement(Box::new(TlvError::UnexpectedEof)).is_structural());

        assert!(AckError::PrefixAnnouncementNotSet.is_usage());
        assert!(AckError::ProducerPrefixMismatch.is_usage());
        assert!(AckError::MalformedRequestName(ExtractError::MissingRvPrefix).is_usage());

        assert!(!AckError::NotAKiteAck(0).is_usage());
    }

    #[test]
    fn test_malformed_name_keeps_source() {
        use std::error::Error as _;

        let err =
            RequestError::MalformedName(MalformedNameCause::new(ExtractError::MissingProducerSuffix));
        assert_eq!(err.to_string(), "name is in the wrong format");
        let source = err.source().map(|s| s.to_string());
        assert_eq!(source.as_deref(), Some("missing producer suffix"));
    }

    #[test]
    fn test_ack_errors_report_cause_once() {
        use std::error::Error as _;

        let err = AckError::MalformedRequestName(ExtractError::MissingKeyword);
        assert_eq!(err.to_string(), "request name is in the wrong format");
        assert!(err.source().is_some());

        let err = AckError::PrefixAnnouncement(PrefixAnnouncementError::ExpirationNotSet);
        assert_eq!(err.to_string(), "prefix announcement encoding failed");
        assert_eq!(
            err.source().map(|s| s.to_string()),
            Some(PrefixAnnouncementError::ExpirationNotSet.to_string())
        );
    }
}
