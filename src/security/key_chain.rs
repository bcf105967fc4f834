//! Key storage, packet signing and signature verification.

use std::collections::HashMap;

use ed25519_dalek::{Signature, Signer as _, SigningKey, Verifier as _};
use rand::{rngs::OsRng, RngCore};
use sha2::{Digest, Sha256};
use zeroize::Zeroize;

use crate::core::{SignError, SIGNATURE_DIGEST_SHA256, SIGNATURE_ED25519};
use crate::encoding::{Component, Name};
use crate::packet::{Data, Interest, SignatureInfo};

use super::{SignedInterestFormat, SignerType, SigningInfo};

/// Something that can sign Data and v0.3 signed Interests.
pub trait PacketSigner {
    /// Sign `data` in place, replacing any existing signature.
    fn sign_data(&self, data: &mut Data, si: &SigningInfo) -> Result<(), SignError>;

    /// Sign `interest` in place.
    ///
    /// `info` carries the replay-protection fields (nonce, time, sequence
    /// number) chosen by the caller; the signer fills in the signature type
    /// and key locator. The parameters digest component is refreshed.
    fn sign_interest(
        &self,
        interest: &mut Interest,
        info: SignatureInfo,
        si: &SigningInfo,
    ) -> Result<(), SignError>;
}

struct IdentityKey {
    key_name: Name,
    signing_key: SigningKey,
}

/// In-memory key chain holding Ed25519 identity keys.
///
/// DigestSha256 signing needs no key and is always available.
#[derive(Default)]
pub struct KeyChain {
    identities: HashMap<Name, IdentityKey>,
}

impl std::fmt::Debug for KeyChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyChain")
            .field("identities", &self.identities.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl KeyChain {
    /// Create an empty key chain.
    pub fn new() -> Self {
        Self::default()
    }

    /// Generate a key for `identity`, replacing any previous one.
    ///
    /// Returns the key name `<identity>/KEY/<key-id>`.
    pub fn create_identity(&mut self, identity: Name) -> Name {
        let mut secret = [0u8; 32];
        OsRng.fill_bytes(&mut secret);
        let mut key_id = [0u8; 8];
        OsRng.fill_bytes(&mut key_id);

        let signing_key = SigningKey::from_bytes(&secret);
        secret.zeroize();

        let key_name = identity
            .clone()
            .with("KEY")
            .with(Component::generic(key_id.to_vec()));
        tracing::debug!(identity = %identity, key = %key_name, "created identity key");
        self.identities.insert(
            identity,
            IdentityKey {
                key_name: key_name.clone(),
                signing_key,
            },
        );
        key_name
    }

    /// Key name of `identity`, if known.
    pub fn key_name(&self, identity: &Name) -> Option<&Name> {
        self.identities.get(identity).map(|k| &k.key_name)
    }

    fn signature_info_for(&self, si: &SigningInfo) -> Result<(SignatureInfo, Option<&SigningKey>), SignError> {
        match si.signer() {
            SignerType::Sha256 => Ok((SignatureInfo::new(SIGNATURE_DIGEST_SHA256), None)),
            SignerType::Identity(identity) => {
                let key = self
                    .identities
                    .get(identity)
                    .ok_or_else(|| SignError::UnknownIdentity(identity.to_string()))?;
                let mut info = SignatureInfo::new(SIGNATURE_ED25519);
                info.key_locator = Some(key.key_name.clone());
                Ok((info, Some(&key.signing_key)))
            }
        }
    }

    fn find_key(&self, key_name: &Name) -> Option<&SigningKey> {
        self.identities
            .values()
            .find(|k| &k.key_name == key_name)
            .map(|k| &k.signing_key)
    }

    fn verify_bytes(&self, info: &SignatureInfo, signed: &[u8], value: &[u8]) -> bool {
        match info.signature_type {
            SIGNATURE_DIGEST_SHA256 => Sha256::digest(signed).as_slice() == value,
            SIGNATURE_ED25519 => {
                let Some(key) = info.key_locator.as_ref().and_then(|n| self.find_key(n)) else {
                    return false;
                };
                let Ok(signature) = Signature::from_slice(value) else {
                    return false;
                };
                key.verifying_key().verify(signed, &signature).is_ok()
            }
            _ => false,
        }
    }

    /// Verify a Data signature against keys held by this key chain.
    pub fn verify_data(&self, data: &Data) -> bool {
        match (data.signature_info(), data.signature_value()) {
            (Some(info), Some(value)) => self.verify_bytes(info, &data.signed_portion(), value),
            _ => false,
        }
    }

    /// Verify a v0.3 signed Interest, including its parameters digest.
    pub fn verify_interest(&self, interest: &Interest) -> bool {
        if !interest.is_parameters_digest_valid() {
            return false;
        }
        match (interest.signature_info(), interest.signature_value()) {
            (Some(info), Some(value)) => {
                self.verify_bytes(info, &interest.signed_portion(), value)
            }
            _ => false,
        }
    }
}

fn sign_bytes(key: Option<&SigningKey>, bytes: &[u8]) -> Vec<u8> {
    match key {
        Some(key) => key.sign(bytes).to_bytes().to_vec(),
        None => Sha256::digest(bytes).to_vec(),
    }
}

impl PacketSigner for KeyChain {
    fn sign_data(&self, data: &mut Data, si: &SigningInfo) -> Result<(), SignError> {
        let (info, key) = self.signature_info_for(si)?;
        data.set_signature_info(info);
        let value = sign_bytes(key, &data.signed_portion());
        data.set_signature_value(value);
        Ok(())
    }

    fn sign_interest(
        &self,
        interest: &mut Interest,
        mut info: SignatureInfo,
        si: &SigningInfo,
    ) -> Result<(), SignError> {
        if si.signed_interest_format() != SignedInterestFormat::V03 {
            return Err(SignError::UnsupportedFormat(si.signed_interest_format().label()));
        }
        let (base, key) = self.signature_info_for(si)?;
        info.signature_type = base.signature_type;
        info.key_locator = base.key_locator;
        interest.set_signature_info(info);
        let value = sign_bytes(key, &interest.signed_portion());
        interest.set_signature_value(value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity() -> Name {
        "/alice".parse().unwrap()
    }

    #[test]
    fn test_sha256_data_signature() {
        let key_chain = KeyChain::new();
        let mut data = Data::new("/a/b".parse().unwrap());
        data.set_content(b"hello".to_vec());

        key_chain.sign_data(&mut data, &SigningInfo::sha256()).unwrap();
        assert!(data.is_signed());
        assert_eq!(data.signature_value().unwrap().len(), 32);
        assert!(key_chain.verify_data(&data));

        data.set_content(b"tampered".to_vec());
        assert!(!key_chain.verify_data(&data));
    }

    #[test]
    fn test_ed25519_data_signature() {
        let mut key_chain = KeyChain::new();
        let key_name = key_chain.create_identity(identity());
        assert_eq!(key_chain.key_name(&identity()), Some(&key_name));
        assert!(identity().is_prefix_of(&key_name));

        let mut data = Data::new("/a".parse().unwrap());
        key_chain
            .sign_data(&mut data, &SigningInfo::identity(identity()))
            .unwrap();

        let info = data.signature_info().unwrap();
        assert_eq!(info.signature_type, SIGNATURE_ED25519);
        assert_eq!(info.key_locator.as_ref(), Some(&key_name));
        assert_eq!(data.signature_value().unwrap().len(), 64);
        assert!(key_chain.verify_data(&data));

        // a different key chain does not hold the key
        assert!(!KeyChain::new().verify_data(&data));
    }

    #[test]
    fn test_unknown_identity() {
        let key_chain = KeyChain::new();
        let mut data = Data::new("/a".parse().unwrap());
        assert_eq!(
            key_chain.sign_data(&mut data, &SigningInfo::identity(identity())),
            Err(SignError::UnknownIdentity("/alice".to_string()))
        );
    }

    #[test]
    fn test_interest_signature() {
        let mut key_chain = KeyChain::new();
        key_chain.create_identity(identity());

        let mut interest = Interest::new("/rv/x".parse().unwrap());
        let mut info = SignatureInfo::new(0);
        info.nonce = Some(vec![1; 8]);
        key_chain
            .sign_interest(&mut interest, info, &SigningInfo::identity(identity()))
            .unwrap();

        assert!(interest.is_signed());
        assert!(interest.is_parameters_digest_valid());
        assert!(key_chain.verify_interest(&interest));

        let decoded = Interest::decode(&interest.encode()).unwrap();
        assert!(key_chain.verify_interest(&decoded));
    }

    #[test]
    fn test_interest_v02_rejected() {
        let key_chain = KeyChain::new();
        let mut interest = Interest::new("/a".parse().unwrap());
        let si = SigningInfo::sha256().with_signed_interest_format(SignedInterestFormat::V02);
        assert_eq!(
            key_chain.sign_interest(&mut interest, SignatureInfo::new(0), &si),
            Err(SignError::UnsupportedFormat("v0.2"))
        );
        assert!(!interest.is_signed());
    }
}
