//! Signing parameters.

use crate::encoding::Name;

/// Signed Interest layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SignedInterestFormat {
    /// Legacy format: signature info and value appended as name components.
    V02,
    /// Signature info and value carried after ApplicationParameters.
    #[default]
    V03,
}

impl SignedInterestFormat {
    /// Human-readable version label.
    pub fn label(self) -> &'static str {
        match self {
            Self::V02 => "v0.2",
            Self::V03 => "v0.3",
        }
    }
}

/// Which key signs a packet.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SignerType {
    /// DigestSha256: integrity only, no key.
    #[default]
    Sha256,
    /// The default key of an identity held by the key chain.
    Identity(Name),
}

/// Parameters for a signing operation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SigningInfo {
    signer: SignerType,
    signed_interest_format: SignedInterestFormat,
}

impl SigningInfo {
    /// DigestSha256 signing, v0.3 signed Interests.
    pub fn sha256() -> Self {
        Self::default()
    }

    /// Sign with the key of `identity`.
    pub fn identity(identity: Name) -> Self {
        Self {
            signer: SignerType::Identity(identity),
            signed_interest_format: SignedInterestFormat::default(),
        }
    }

    /// Selected signer.
    pub fn signer(&self) -> &SignerType {
        &self.signer
    }

    /// Requested signed Interest format.
    pub fn signed_interest_format(&self) -> SignedInterestFormat {
        self.signed_interest_format
    }

    /// Set the signed Interest format.
    pub fn set_signed_interest_format(&mut self, format: SignedInterestFormat) -> &mut Self {
        self.signed_interest_format = format;
        self
    }

    /// Builder-style variant of [`set_signed_interest_format`](Self::set_signed_interest_format).
    pub fn with_signed_interest_format(mut self, format: SignedInterestFormat) -> Self {
        self.signed_interest_format = format;
        self
    }
}
