//! Round-trip time estimation for request retransmission.
//!
//! The estimator performs no I/O; the owning retry scheduler feeds it samples
//! and reads back the RTO to wait before retransmitting.

mod estimator;
mod sink;

pub use estimator::{RttEstimator, RttOptions};
pub use sink::{FnSink, MeasurementSink, RttMeasurement};
