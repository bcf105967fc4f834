//! Prefix announcement object.
//!
//! A prefix announcement is a Data packet named
//! `/<announced-name>/32=PA/<version>/<segment>` with ContentType PrefixAnn.
//! Its content holds an ExpirationPeriod and an optional ValidityPeriod.

use std::time::{Duration, SystemTime};

use crate::core::{
    PrefixAnnouncementError, TlvError, PREFIX_ANN_FRESHNESS, PREFIX_ANN_KEYWORD_VALUE,
    TLV_EXPIRATION_PERIOD, TLV_VALIDITY_PERIOD,
};
use crate::encoding::tlv::{is_critical, parse_elements, Block};
use crate::encoding::{Component, Name};
use crate::security::{PacketSigner, SigningInfo};

use super::{to_unix_millis, ContentType, Data};

/// A prefix announcement, possibly backed by a signed Data packet.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PrefixAnnouncement {
    announced_name: Name,
    expiration: Option<Duration>,
    data: Option<Data>,
}

/// The `32=PA` keyword component.
pub fn prefix_announcement_keyword() -> Component {
    Component::keyword(PREFIX_ANN_KEYWORD_VALUE)
}

impl PrefixAnnouncement {
    /// Create an empty, unsigned announcement.
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode an announcement from a Data packet.
    pub fn from_data(data: Data) -> Result<Self, PrefixAnnouncementError> {
        let name = data.name();
        let len = name.len();
        if len < 3 || name.get(len - 3) != Some(&prefix_announcement_keyword()) {
            return Err(PrefixAnnouncementError::WrongName);
        }
        let announced_name = name.prefix(len - 3);
        if data.content_type() != ContentType::PrefixAnn {
            return Err(PrefixAnnouncementError::WrongContentType(
                data.content_type().as_u64(),
            ));
        }

        let mut expiration = None;
        for element in parse_elements(data.content())? {
            match element.typ() {
                TLV_EXPIRATION_PERIOD => {
                    expiration = Some(Duration::from_millis(element.read_non_negative_integer()?));
                }
                // validity is checked by the trust layer, not here
                TLV_VALIDITY_PERIOD => {}
                typ if is_critical(typ) => return Err(TlvError::UnrecognizedCritical(typ).into()),
                _ => {}
            }
        }
        let expiration = expiration.ok_or(TlvError::MissingElement(TLV_EXPIRATION_PERIOD))?;

        Ok(Self {
            announced_name,
            expiration: Some(expiration),
            data: Some(data),
        })
    }

    /// Announced name.
    pub fn announced_name(&self) -> &Name {
        &self.announced_name
    }

    /// Set the announced name, discarding any cached Data.
    pub fn set_announced_name(&mut self, name: Name) -> &mut Self {
        self.announced_name = name;
        self.data = None;
        self
    }

    /// Expiration period.
    pub fn expiration(&self) -> Option<Duration> {
        self.expiration
    }

    /// Set the expiration period, discarding any cached Data.
    pub fn set_expiration(&mut self, expiration: Duration) -> &mut Self {
        self.expiration = Some(expiration);
        self.data = None;
        self
    }

    /// Check if a signed Data packet backs this announcement.
    pub fn is_signed(&self) -> bool {
        self.data.as_ref().is_some_and(Data::is_signed)
    }

    /// Backing Data packet, if any.
    pub fn data(&self) -> Option<&Data> {
        self.data.as_ref()
    }

    /// Produce the signed Data form.
    ///
    /// A previously decoded or signed Data packet is returned as is.
    /// Otherwise a new packet is built and signed; `version` defaults to the
    /// current time in milliseconds.
    pub fn to_data<S: PacketSigner + ?Sized>(
        &self,
        signer: &S,
        si: &SigningInfo,
        version: Option<u64>,
    ) -> Result<Data, PrefixAnnouncementError> {
        if let Some(data) = &self.data {
            return Ok(data.clone());
        }
        let expiration = self
            .expiration
            .ok_or(PrefixAnnouncementError::ExpirationNotSet)?;
        let version = version.unwrap_or_else(|| to_unix_millis(SystemTime::now()));

        let name = self
            .announced_name
            .clone()
            .with(prefix_announcement_keyword())
            .with(Component::version(version))
            .with(Component::segment(0));
        let expiration_ms = u64::try_from(expiration.as_millis()).unwrap_or(u64::MAX);

        let mut data = Data::new(name);
        data.set_content_type(ContentType::PrefixAnn)
            .set_freshness_period(Some(PREFIX_ANN_FRESHNESS))
            .set_content(Block::from_non_negative_integer(TLV_EXPIRATION_PERIOD, expiration_ms).encode());
        signer.sign_data(&mut data, si)?;
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::security::KeyChain;

    fn announcement() -> PrefixAnnouncement {
        let mut pa = PrefixAnnouncement::new();
        pa.set_announced_name("/rv/alice".parse().unwrap())
            .set_expiration(Duration::from_secs(3600));
        pa
    }

    #[test]
    fn test_to_data_layout() {
        let key_chain = KeyChain::new();
        let data = announcement()
            .to_data(&key_chain, &SigningInfo::sha256(), Some(5))
            .unwrap();

        assert_eq!(data.name().to_string(), "/rv/alice/32=PA/v=5/seg=0");
        assert_eq!(data.content_type(), ContentType::PrefixAnn);
        assert_eq!(data.freshness_period(), Some(Duration::from_secs(1)));
        assert_eq!(hex::encode(data.content()), "6d040036ee80");
        assert!(key_chain.verify_data(&data));
    }

    #[test]
    fn test_round_trip() {
        let key_chain = KeyChain::new();
        let data = announcement()
            .to_data(&key_chain, &SigningInfo::sha256(), None)
            .unwrap();
        let decoded = PrefixAnnouncement::from_data(Data::decode(&data.encode()).unwrap()).unwrap();

        assert_eq!(decoded.announced_name(), &"/rv/alice".parse().unwrap());
        assert_eq!(decoded.expiration(), Some(Duration::from_secs(3600)));
        assert!(decoded.is_signed());
        // a decoded announcement reuses its Data
        assert_eq!(
            decoded.to_data(&key_chain, &SigningInfo::sha256(), Some(1)).unwrap(),
            data
        );
    }

    #[test]
    fn test_expiration_required() {
        let mut pa = PrefixAnnouncement::new();
        pa.set_announced_name("/a".parse().unwrap());
        assert_eq!(
            pa.to_data(&KeyChain::new(), &SigningInfo::sha256(), None),
            Err(PrefixAnnouncementError::ExpirationNotSet)
        );
    }

    #[test]
    fn test_from_data_rejects_wrong_name() {
        let mut data = Data::new("/rv/alice/v=1/seg=0".parse().unwrap());
        data.set_content_type(ContentType::PrefixAnn);
        assert_eq!(
            PrefixAnnouncement::from_data(data),
            Err(PrefixAnnouncementError::WrongName)
        );
        assert_eq!(
            PrefixAnnouncement::from_data(Data::new("/32=PA".parse().unwrap())),
            Err(PrefixAnnouncementError::WrongName)
        );
    }

    #[test]
    fn test_from_data_rejects_wrong_content_type() {
        let data = Data::new("/a/32=PA/v=1/seg=0".parse().unwrap());
        assert_eq!(
            PrefixAnnouncement::from_data(data),
            Err(PrefixAnnouncementError::WrongContentType(0))
        );
    }

    #[test]
    fn test_from_data_content() {
        let mut data = Data::new("/a/32=PA/v=1/seg=0".parse().unwrap());
        data.set_content_type(ContentType::PrefixAnn);
        assert_eq!(
            PrefixAnnouncement::from_data(data.clone()),
            Err(PrefixAnnouncementError::Content(TlvError::MissingElement(
                TLV_EXPIRATION_PERIOD
            )))
        );

        // ExpirationPeriod 1000 ms followed by an opaque ValidityPeriod
        data.set_content(hex::decode("6d0203e8fd0400000000").unwrap());
        let pa = PrefixAnnouncement::from_data(data).unwrap();
        assert_eq!(pa.expiration(), Some(Duration::from_millis(1000)));
        assert_eq!(pa.announced_name(), &"/a".parse().unwrap());
    }

    #[test]
    fn test_setters_discard_cached_data() {
        let key_chain = KeyChain::new();
        let data = announcement()
            .to_data(&key_chain, &SigningInfo::sha256(), Some(1))
            .unwrap();
        let mut pa = PrefixAnnouncement::from_data(data).unwrap();
        pa.set_announced_name("/rv/bob".parse().unwrap());
        assert!(!pa.is_signed());
        let data = pa.to_data(&key_chain, &SigningInfo::sha256(), Some(2)).unwrap();
        assert_eq!(data.name().prefix(2), "/rv/bob".parse().unwrap());
    }
}
