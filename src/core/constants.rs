//! Protocol constants for NDN packets and the KITE protocol.
//!
//! These values are fixed by the NDN packet format and KITE and MUST NOT be changed.

use std::time::Duration;

// =============================================================================
// KITE (rendezvous indirection)
// =============================================================================

/// TLV type of the KITE keyword name component.
pub const KITE_KEYWORD_TYPE: u64 = 32;

/// Value of the KITE keyword name component.
pub const KITE_KEYWORD_VALUE: &[u8] = b"KITE";

/// Wire encoding of the KITE keyword component (`32=KITE`).
pub const KITE_KEYWORD_WIRE: [u8; 6] = [0x20, 0x04, 0x4b, 0x49, 0x54, 0x45];

/// Value of the prefix announcement keyword component (`32=PA`).
pub const PREFIX_ANN_KEYWORD_VALUE: &[u8] = b"PA";

// =============================================================================
// PACKET TYPES
// =============================================================================

/// Interest packet.
pub const TLV_INTEREST: u64 = 0x05;

/// Data packet.
pub const TLV_DATA: u64 = 0x06;

// =============================================================================
// NAME AND COMPONENT TYPES
// =============================================================================

/// Name.
pub const TLV_NAME: u64 = 0x07;

/// ImplicitSha256DigestComponent.
pub const TLV_IMPLICIT_SHA256_DIGEST_COMPONENT: u64 = 0x01;

/// ParametersSha256DigestComponent.
pub const TLV_PARAMETERS_SHA256_DIGEST_COMPONENT: u64 = 0x02;

/// GenericNameComponent.
pub const TLV_GENERIC_NAME_COMPONENT: u64 = 0x08;

/// KeywordNameComponent.
pub const TLV_KEYWORD_NAME_COMPONENT: u64 = 0x20;

/// SegmentNameComponent.
pub const TLV_SEGMENT_NAME_COMPONENT: u64 = 0x32;

/// VersionNameComponent.
pub const TLV_VERSION_NAME_COMPONENT: u64 = 0x36;

// =============================================================================
// INTEREST ELEMENTS
// =============================================================================

/// CanBePrefix.
pub const TLV_CAN_BE_PREFIX: u64 = 0x21;

/// MustBeFresh.
pub const TLV_MUST_BE_FRESH: u64 = 0x12;

/// ForwardingHint.
pub const TLV_FORWARDING_HINT: u64 = 0x1e;

/// Nonce.
pub const TLV_NONCE: u64 = 0x0a;

/// InterestLifetime.
pub const TLV_INTEREST_LIFETIME: u64 = 0x0c;

/// HopLimit.
pub const TLV_HOP_LIMIT: u64 = 0x22;

/// ApplicationParameters.
pub const TLV_APPLICATION_PARAMETERS: u64 = 0x24;

/// InterestSignatureInfo.
pub const TLV_INTEREST_SIGNATURE_INFO: u64 = 0x2c;

/// InterestSignatureValue.
pub const TLV_INTEREST_SIGNATURE_VALUE: u64 = 0x2e;

/// Interest nonce size in bytes.
pub const INTEREST_NONCE_SIZE: usize = 4;

// =============================================================================
// DATA ELEMENTS
// =============================================================================

/// MetaInfo.
pub const TLV_META_INFO: u64 = 0x14;

/// Content.
pub const TLV_CONTENT: u64 = 0x15;

/// SignatureInfo.
pub const TLV_SIGNATURE_INFO: u64 = 0x16;

/// SignatureValue.
pub const TLV_SIGNATURE_VALUE: u64 = 0x17;

/// ContentType.
pub const TLV_CONTENT_TYPE: u64 = 0x18;

/// FreshnessPeriod.
pub const TLV_FRESHNESS_PERIOD: u64 = 0x19;

/// FinalBlockId.
pub const TLV_FINAL_BLOCK_ID: u64 = 0x1a;

// =============================================================================
// SIGNATURE ELEMENTS
// =============================================================================

/// SignatureType.
pub const TLV_SIGNATURE_TYPE: u64 = 0x1b;

/// KeyLocator.
pub const TLV_KEY_LOCATOR: u64 = 0x1c;

/// KeyDigest.
pub const TLV_KEY_DIGEST: u64 = 0x1d;

/// SignatureNonce.
pub const TLV_SIGNATURE_NONCE: u64 = 0x26;

/// SignatureTime.
pub const TLV_SIGNATURE_TIME: u64 = 0x28;

/// SignatureSeqNum.
pub const TLV_SIGNATURE_SEQ_NUM: u64 = 0x2a;

/// SignatureType value: DigestSha256.
pub const SIGNATURE_DIGEST_SHA256: u64 = 0;

/// SignatureType value: SignatureEd25519.
pub const SIGNATURE_ED25519: u64 = 5;

/// SignatureNonce size generated by the Interest signer.
pub const SIGNATURE_NONCE_SIZE: usize = 8;

// =============================================================================
// CONTROL PARAMETERS
// =============================================================================

/// ExpirationPeriod (NFD control parameter, reused by KITE and prefix announcements).
pub const TLV_EXPIRATION_PERIOD: u64 = 0x6d;

/// ValidityPeriod.
pub const TLV_VALIDITY_PERIOD: u64 = 0xfd;

// =============================================================================
// PREFIX ANNOUNCEMENT
// =============================================================================

/// Freshness period of a prefix announcement Data packet.
pub const PREFIX_ANN_FRESHNESS: Duration = Duration::from_secs(1);

// =============================================================================
// RTT ESTIMATION DEFAULTS
// =============================================================================

/// Gain for the smoothed RTT (1/8).
pub const DEFAULT_RTT_ALPHA: f64 = 0.125;

/// Gain for the RTT variance (1/4).
pub const DEFAULT_RTT_BETA: f64 = 0.25;

/// Variance multiplier in the RTO formula.
pub const DEFAULT_RTO_K: f64 = 4.0;

/// Retransmission timeout before the first RTT sample.
pub const DEFAULT_INITIAL_RTO: Duration = Duration::from_secs(1);

/// Lower bound on the retransmission timeout.
pub const DEFAULT_MIN_RTO: Duration = Duration::from_millis(200);

/// Upper bound on the retransmission timeout.
pub const DEFAULT_MAX_RTO: Duration = Duration::from_secs(60);

/// Factor applied to the RTO on each backoff.
pub const DEFAULT_RTO_BACKOFF_MULTIPLIER: f64 = 2.0;
