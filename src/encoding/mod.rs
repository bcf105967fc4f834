//! NDN encoding primitives: TLV elements and names.

mod name;
pub mod tlv;

pub use name::{Component, Name};
pub use tlv::Block;
