//! # ndn-kite
//!
//! **KITE**: rendezvous-based producer mobility for Named Data Networking.
//!
//! A mobile producer keeps itself reachable under a stable prefix owned by a
//! rendezvous (RV) node. It periodically sends a signed KITE request to the
//! RV node; the RV node answers with a KITE ack carrying a prefix
//! announcement that points the stable prefix at the producer's current
//! location. This crate provides:
//!
//! - **Requests**: build and parse signed request Interests
//!   (`<rv-prefix>/32=KITE/<producer-suffix>`)
//! - **Acks**: build and parse acknowledgment Data carrying a prefix announcement
//! - **RTT estimation**: RFC 6298 RTO computation with exponential backoff
//!   for the refresh/retry scheduler
//! - **Primitives**: the TLV, name, packet and signing pieces the above need
//!
//! ## Feature Flags
//!
//! - `channel` (default): deliver RTT measurements over a tokio mpsc channel
//! - `serde`: serde derives for [`RttOptions`](timing::RttOptions)
//!
//! ## Modules
//!
//! - [`core`]: Constants and error types
//! - [`encoding`]: TLV and names
//! - [`packet`]: Interest, Data, prefix announcements
//! - [`security`]: Key chain and signed Interests
//! - [`kite`]: KITE request and ack
//! - [`timing`]: RTT estimation
//!
//! ## Example Usage
//!
//! ```rust
//! use ndn_kite::prelude::*;
//! use std::time::Duration;
//!
//! let key_chain = KeyChain::new();
//! let si = SigningInfo::sha256();
//!
//! // producer side
//! let mut signer = InterestSigner::new(&key_chain);
//! let mut request = Request::new();
//! request
//!     .set_rv_prefix("/rv".parse().unwrap())
//!     .set_producer_suffix("/alice".parse().unwrap());
//! let interest = request.make_interest(&mut signer, &si).unwrap();
//!
//! // RV side
//! let mut received = Request::new();
//! received.decode(&interest).unwrap();
//! let mut announcement = PrefixAnnouncement::new();
//! announcement
//!     .set_announced_name(received.producer_prefix())
//!     .set_expiration(Duration::from_secs(3600));
//! let mut ack = Ack::new();
//! ack.set_prefix_announcement(announcement);
//! let data = ack.make_data(&interest, &key_chain, &si).unwrap();
//!
//! // producer side again
//! let ack = Ack::from_data(&data).unwrap();
//! assert!(request.can_match(&ack));
//!
//! let mut rtt = RttEstimator::new(RttOptions::default()).unwrap();
//! rtt.add_sample(Duration::from_millis(100));
//! assert_eq!(rtt.rto(), Duration::from_millis(300));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod core;

pub mod encoding;

pub mod packet;

pub mod security;

pub mod kite;

pub mod timing;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::core::*;

    pub use crate::encoding::{Block, Component, Name};

    pub use crate::packet::{ContentType, Data, Interest, PrefixAnnouncement, SignatureInfo};

    pub use crate::security::{
        InterestSigner, KeyChain, PacketSigner, SignedInterestFlags, SignedInterestFormat,
        SigningInfo,
    };

    pub use crate::kite::{extract_prefixes, kite_keyword, Ack, Request};

    pub use crate::timing::{MeasurementSink, RttEstimator, RttMeasurement, RttOptions};
}

// Re-export commonly used items at crate root
pub use crate::core::{AckError, ExtractError, KiteError, RequestError, RttConfigError};
pub use encoding::Name;
pub use kite::{Ack, Request};
pub use timing::{RttEstimator, RttOptions};
