//! Signed Interest construction with replay-protection fields.

use std::ops::BitOr;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use rand::{rngs::OsRng, RngCore};

use crate::core::{SignError, SIGNATURE_NONCE_SIZE};
use crate::packet::{Interest, SignatureInfo};

use super::{PacketSigner, SignedInterestFormat, SigningInfo};

/// Selects which replay-protection fields go into InterestSignatureInfo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SignedInterestFlags(u8);

impl SignedInterestFlags {
    /// No fields.
    pub const NONE: Self = Self(0);
    /// Random SignatureNonce.
    pub const WANT_NONCE: Self = Self(0x01);
    /// SignatureTime, strictly increasing per signer.
    pub const WANT_TIME: Self = Self(0x02);
    /// SignatureSeqNum, incremented per signed Interest.
    pub const WANT_SEQ_NUM: Self = Self(0x04);

    /// Check if every bit of `other` is set.
    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Raw bits.
    pub fn bits(self) -> u8 {
        self.0
    }
}

impl BitOr for SignedInterestFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// Signs Interests in the v0.3 format, keeping timestamp and sequence
/// number state across calls.
#[derive(Debug)]
pub struct InterestSigner<'a, S: PacketSigner + ?Sized> {
    signer: &'a S,
    last_timestamp: SystemTime,
    last_seq_num: Option<u64>,
}

impl<'a, S: PacketSigner + ?Sized> InterestSigner<'a, S> {
    /// Create a signer backed by `signer`.
    pub fn new(signer: &'a S) -> Self {
        Self {
            signer,
            last_timestamp: UNIX_EPOCH,
            last_seq_num: None,
        }
    }

    /// Underlying packet signer.
    pub fn signer(&self) -> &'a S {
        self.signer
    }

    /// Sign `interest` in place with the fields selected by `flags`.
    pub fn make_signed_interest(
        &mut self,
        interest: &mut Interest,
        si: &SigningInfo,
        flags: SignedInterestFlags,
    ) -> Result<(), SignError> {
        if si.signed_interest_format() != SignedInterestFormat::V03 {
            return Err(SignError::UnsupportedFormat(si.signed_interest_format().label()));
        }

        // signature type and key locator are filled in by the packet signer
        let mut info = SignatureInfo::new(0);
        if flags.contains(SignedInterestFlags::WANT_NONCE) {
            let mut nonce = vec![0u8; SIGNATURE_NONCE_SIZE];
            OsRng.fill_bytes(&mut nonce);
            info.nonce = Some(nonce);
        }
        if flags.contains(SignedInterestFlags::WANT_TIME) {
            info.time = Some(self.fresh_timestamp());
        }
        if flags.contains(SignedInterestFlags::WANT_SEQ_NUM) {
            let seq = self.last_seq_num.map_or(0, |n| n.wrapping_add(1));
            self.last_seq_num = Some(seq);
            info.seq_num = Some(seq);
        }

        self.signer.sign_interest(interest, info, si)?;
        tracing::trace!(name = %interest.name(), "signed interest");
        Ok(())
    }

    /// Current time truncated to milliseconds, bumped past the previous one.
    fn fresh_timestamp(&mut self) -> SystemTime {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();
        let mut timestamp = UNIX_EPOCH + Duration::from_millis(now.as_millis() as u64);
        if timestamp <= self.last_timestamp {
            timestamp = self.last_timestamp + Duration::from_millis(1);
        }
        self.last_timestamp = timestamp;
        timestamp
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::SIGNATURE_DIGEST_SHA256;
    use crate::security::KeyChain;

    fn interest() -> Interest {
        Interest::new("/rv/32=KITE/alice".parse().unwrap())
    }

    #[test]
    fn test_flags() {
        let flags = SignedInterestFlags::WANT_NONCE | SignedInterestFlags::WANT_TIME;
        assert!(flags.contains(SignedInterestFlags::WANT_NONCE));
        assert!(flags.contains(SignedInterestFlags::WANT_TIME));
        assert!(!flags.contains(SignedInterestFlags::WANT_SEQ_NUM));
        assert_eq!(flags.bits(), 0x03);
        assert!(SignedInterestFlags::default().contains(SignedInterestFlags::NONE));
    }

    #[test]
    fn test_nonce_and_time() {
        let key_chain = KeyChain::new();
        let mut signer = InterestSigner::new(&key_chain);
        let mut interest = interest();
        signer
            .make_signed_interest(
                &mut interest,
                &SigningInfo::sha256(),
                SignedInterestFlags::WANT_NONCE | SignedInterestFlags::WANT_TIME,
            )
            .unwrap();

        let info = interest.signature_info().unwrap();
        assert_eq!(info.signature_type, SIGNATURE_DIGEST_SHA256);
        assert_eq!(info.nonce.as_ref().map(Vec::len), Some(SIGNATURE_NONCE_SIZE));
        assert!(info.time.is_some());
        assert!(info.seq_num.is_none());
        assert!(key_chain.verify_interest(&interest));
    }

    #[test]
    fn test_timestamps_strictly_increase() {
        let key_chain = KeyChain::new();
        let mut signer = InterestSigner::new(&key_chain);
        let mut previous = None;
        for _ in 0..5 {
            let mut interest = interest();
            signer
                .make_signed_interest(
                    &mut interest,
                    &SigningInfo::sha256(),
                    SignedInterestFlags::WANT_TIME,
                )
                .unwrap();
            let time = interest.signature_info().unwrap().time.unwrap();
            if let Some(prev) = previous {
                assert!(time > prev);
            }
            previous = Some(time);
        }
    }

    #[test]
    fn test_seq_num_increments() {
        let key_chain = KeyChain::new();
        let mut signer = InterestSigner::new(&key_chain);
        let seqs: Vec<_> = (0..3)
            .map(|_| {
                let mut interest = interest();
                signer
                    .make_signed_interest(
                        &mut interest,
                        &SigningInfo::sha256(),
                        SignedInterestFlags::WANT_SEQ_NUM,
                    )
                    .unwrap();
                interest.signature_info().unwrap().seq_num.unwrap()
            })
            .collect();
        assert_eq!(seqs, vec![0, 1, 2]);
    }

    #[test]
    fn test_v02_rejected() {
        let key_chain = KeyChain::new();
        let mut signer = InterestSigner::new(&key_chain);
        let si = SigningInfo::sha256().with_signed_interest_format(SignedInterestFormat::V02);
        let mut interest = interest();
        assert_eq!(
            signer.make_signed_interest(&mut interest, &si, SignedInterestFlags::WANT_NONCE),
            Err(SignError::UnsupportedFormat("v0.2"))
        );
        assert!(!interest.is_signed());
    }
}
