//! Packet signing.
//!
//! [`KeyChain`] holds identity keys and implements [`PacketSigner`];
//! [`InterestSigner`] adds nonce, timestamp and sequence number fields to
//! signed Interests.

mod interest_signer;
mod key_chain;
mod signing_info;

pub use interest_signer::{InterestSigner, SignedInterestFlags};
pub use key_chain::{KeyChain, PacketSigner};
pub use signing_info::{SignedInterestFormat, SignerType, SigningInfo};
