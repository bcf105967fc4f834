//! KITE acknowledgment: the rendezvous node's reply carrying a prefix announcement.

use crate::core::{AckError, PacketError, TlvError, TLV_DATA};
use crate::encoding::tlv::{is_critical, parse_elements, Block};
use crate::packet::{ContentType, Data, Interest, PrefixAnnouncement};
use crate::security::{PacketSigner, SigningInfo};

use super::extract_prefixes;

/// A KITE acknowledgment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ack {
    prefix_announcement: Option<PrefixAnnouncement>,
}

impl Ack {
    /// Create an ack holding no announcement.
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode an ack from a received Data packet.
    ///
    /// The content must hold an encoded prefix announcement Data. Other
    /// non-critical elements next to it are ignored.
    pub fn from_data(data: &Data) -> Result<Self, AckError> {
        Self::parse(data).inspect_err(|e| {
            tracing::debug!(name = %data.name(), error = %e, "rejected KITE ack");
        })
    }

    fn parse(data: &Data) -> Result<Self, AckError> {
        if data.content_type() != ContentType::KiteAck {
            return Err(AckError::NotAKiteAck(data.content_type().as_u64()));
        }
        let inner = announcement_block(data.content())
            .map_err(PacketError::from)
            .and_then(|block| Data::from_block(&block))
            .map_err(|e| AckError::NoValidPrefixAnnouncement(Box::new(e)))?;
        let prefix_announcement = PrefixAnnouncement::from_data(inner)
            .map_err(|e| AckError::NoValidPrefixAnnouncement(Box::new(e)))?;
        Ok(Self {
            prefix_announcement: Some(prefix_announcement),
        })
    }

    /// Build and sign the ack answering `interest`.
    ///
    /// The producer prefix is recovered from the request name and must equal
    /// the announced name. An unsigned announcement is signed with the same
    /// signer and signing parameters as the ack.
    pub fn make_data<S: PacketSigner + ?Sized>(
        &self,
        interest: &Interest,
        signer: &S,
        si: &SigningInfo,
    ) -> Result<Data, AckError> {
        let prefix_announcement = self
            .prefix_announcement
            .as_ref()
            .ok_or(AckError::PrefixAnnouncementNotSet)?;

        let (rv_prefix, producer_suffix) =
            extract_prefixes(interest.name()).map_err(AckError::MalformedRequestName)?;
        if &rv_prefix.concat(&producer_suffix) != prefix_announcement.announced_name() {
            return Err(AckError::ProducerPrefixMismatch);
        }

        let announcement = prefix_announcement
            .to_data(signer, si, None)
            .map_err(AckError::PrefixAnnouncement)?;
        let mut data = Data::new(interest.name().clone());
        data.set_content_type(ContentType::KiteAck)
            .set_content(announcement.encode());
        signer.sign_data(&mut data, si)?;

        tracing::debug!(name = %data.name(), "made KITE ack");
        Ok(data)
    }

    /// Held prefix announcement.
    pub fn prefix_announcement(&self) -> Option<&PrefixAnnouncement> {
        self.prefix_announcement.as_ref()
    }

    /// Set the prefix announcement; it may be unsigned.
    pub fn set_prefix_announcement(&mut self, prefix_announcement: PrefixAnnouncement) -> &mut Self {
        self.prefix_announcement = Some(prefix_announcement);
        self
    }
}

/// First Data element of the ack content.
fn announcement_block(content: &[u8]) -> Result<Block, TlvError> {
    let mut found = None;
    for element in parse_elements(content)? {
        match element.typ() {
            TLV_DATA if found.is_none() => found = Some(element),
            TLV_DATA => {}
            typ if is_critical(typ) => return Err(TlvError::UnrecognizedCritical(typ)),
            _ => {}
        }
    }
    found.ok_or(TlvError::MissingElement(TLV_DATA))
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::core::{ExtractError, PrefixAnnouncementError};
    use crate::encoding::Name;
    use crate::kite::Request;
    use crate::security::{InterestSigner, KeyChain};

    fn announcement(name: &str) -> PrefixAnnouncement {
        let mut pa = PrefixAnnouncement::new();
        pa.set_announced_name(name.parse().unwrap())
            .set_expiration(Duration::from_secs(60));
        pa
    }

    fn request_interest(key_chain: &KeyChain) -> (Request, Interest) {
        let mut signer = InterestSigner::new(key_chain);
        let mut req = Request::new();
        req.set_rv_prefix("/rv".parse().unwrap())
            .set_producer_suffix("/alice".parse().unwrap());
        let interest = req.make_interest(&mut signer, &SigningInfo::sha256()).unwrap();
        (req, interest)
    }

    #[test]
    fn test_make_data_and_match() {
        let mut key_chain = KeyChain::new();
        let identity: Name = "/rv".parse().unwrap();
        key_chain.create_identity(identity.clone());
        let si = SigningInfo::identity(identity);

        let (req, interest) = request_interest(&key_chain);
        let mut ack = Ack::new();
        ack.set_prefix_announcement(announcement("/rv/alice"));
        let data = ack.make_data(&interest, &key_chain, &si).unwrap();

        assert_eq!(data.name(), interest.name());
        assert_eq!(data.content_type(), ContentType::KiteAck);
        assert!(key_chain.verify_data(&data));

        let received = Ack::from_data(&Data::decode(&data.encode()).unwrap()).unwrap();
        let pa = received.prefix_announcement().unwrap();
        assert!(pa.is_signed());
        assert!(key_chain.verify_data(pa.data().unwrap()));
        assert_eq!(pa.expiration(), Some(Duration::from_secs(60)));
        assert!(req.can_match(&received));
    }

    #[test]
    fn test_can_match() {
        let req = {
            let mut req = Request::new();
            req.set_rv_prefix("/rv".parse().unwrap())
                .set_producer_suffix("/alice".parse().unwrap());
            req
        };
        assert!(!req.can_match(&Ack::new()));

        let mut ack = Ack::new();
        ack.set_prefix_announcement(announcement("/rv/bob"));
        assert!(!req.can_match(&ack));
        ack.set_prefix_announcement(announcement("/rv/alice"));
        assert!(req.can_match(&ack));
    }

    #[test]
    fn test_make_data_usage_errors() {
        let key_chain = KeyChain::new();
        let si = SigningInfo::sha256();
        let (_, interest) = request_interest(&key_chain);

        let err = Ack::new().make_data(&interest, &key_chain, &si).unwrap_err();
        assert!(matches!(err, AckError::PrefixAnnouncementNotSet));
        assert!(err.is_usage());

        let mut ack = Ack::new();
        ack.set_prefix_announcement(announcement("/rv/bob"));
        assert!(matches!(
            ack.make_data(&interest, &key_chain, &si),
            Err(AckError::ProducerPrefixMismatch)
        ));

        let plain = Interest::new("/rv/alice".parse().unwrap());
        assert!(matches!(
            ack.make_data(&plain, &key_chain, &si),
            Err(AckError::MalformedRequestName(ExtractError::MissingKeyword))
        ));

        let mut no_expiration = PrefixAnnouncement::new();
        no_expiration.set_announced_name("/rv/alice".parse().unwrap());
        ack.set_prefix_announcement(no_expiration);
        assert!(matches!(
            ack.make_data(&interest, &key_chain, &si),
            Err(AckError::PrefixAnnouncement(PrefixAnnouncementError::ExpirationNotSet))
        ));
    }

    #[test]
    fn test_from_data_not_an_ack() {
        let mut data = Data::new("/rv/32=KITE/alice".parse().unwrap());
        data.set_content_type(ContentType::Blob);
        let err = Ack::from_data(&data).unwrap_err();
        assert!(matches!(err, AckError::NotAKiteAck(0)));
        assert!(err.is_structural());
    }

    #[test]
    fn test_from_data_invalid_announcement() {
        let mut data = Data::new("/rv/32=KITE/alice".parse().unwrap());
        data.set_content_type(ContentType::KiteAck);
        assert!(matches!(
            Ack::from_data(&data),
            Err(AckError::NoValidPrefixAnnouncement(_))
        ));

        data.set_content(vec![0x06, 0x05, 0x01]);
        assert!(matches!(
            Ack::from_data(&data),
            Err(AckError::NoValidPrefixAnnouncement(_))
        ));

        // a signed Data that is not an announcement
        let key_chain = KeyChain::new();
        let mut inner = Data::new("/not/an/announcement".parse().unwrap());
        key_chain.sign_data(&mut inner, &SigningInfo::sha256()).unwrap();
        data.set_content(inner.encode());
        let err = Ack::from_data(&data).unwrap_err();
        assert!(matches!(err, AckError::NoValidPrefixAnnouncement(_)));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_from_data_ignores_extra_elements() {
        let key_chain = KeyChain::new();
        let si = SigningInfo::sha256();
        let (req, interest) = request_interest(&key_chain);
        let mut ack = Ack::new();
        ack.set_prefix_announcement(announcement("/rv/alice"));
        let data = ack.make_data(&interest, &key_chain, &si).unwrap();

        let mut content = data.content().to_vec();
        content.extend_from_slice(&[0xfc, 0x00]);
        let mut extended = data.clone();
        extended.set_content(content.clone());
        let received = Ack::from_data(&extended).unwrap();
        assert!(req.can_match(&received));

        // an unknown critical element is still rejected
        content.extend_from_slice(&[0x03, 0x00]);
        extended.set_content(content);
        assert!(matches!(
            Ack::from_data(&extended),
            Err(AckError::NoValidPrefixAnnouncement(_))
        ));
    }
}
