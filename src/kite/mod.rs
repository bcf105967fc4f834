//! KITE rendezvous protocol.
//!
//! A mobile producer sends a signed [`Request`] to a rendezvous (RV) node
//! under a stable prefix. The RV node answers with an [`Ack`] carrying a
//! prefix announcement for `<rv-prefix>/<producer-suffix>`, which lets
//! consumers reach the producer at its current location.

mod ack;
mod prefixes;
mod request;

pub use ack::Ack;
pub use prefixes::{extract_prefixes, kite_keyword};
pub use request::Request;
