//! Network packets: Interest, Data and the prefix announcement object.

mod data;
mod interest;
mod prefix_announcement;
mod signature_info;

pub use data::{ContentType, Data};
pub use interest::Interest;
pub use prefix_announcement::{prefix_announcement_keyword, PrefixAnnouncement};
pub use signature_info::{from_unix_millis, to_unix_millis, SignatureInfo};
