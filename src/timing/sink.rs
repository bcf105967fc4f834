//! Observers notified on every RTT measurement.

use std::time::Duration;

/// One RTT measurement and the estimator state it produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RttMeasurement {
    /// Measured round-trip time.
    pub rtt: Duration,
    /// Smoothed RTT after the update.
    pub smoothed_rtt: Duration,
    /// RTT variation after the update.
    pub rtt_variation: Duration,
    /// Retransmission timeout after the update.
    pub rto: Duration,
    /// Segment number the sample belongs to, if any.
    pub segment: Option<u64>,
}

/// Receives measurements synchronously, once per
/// [`RttEstimator::add_measurement`](super::RttEstimator::add_measurement).
pub trait MeasurementSink: Send {
    /// Handle a measurement.
    fn on_measurement(&mut self, measurement: &RttMeasurement);
}

/// Adapts a closure into a [`MeasurementSink`].
pub struct FnSink<F>(F);

impl<F> FnSink<F>
where
    F: FnMut(&RttMeasurement) + Send,
{
    /// Wrap `callback`.
    pub fn new(callback: F) -> Self {
        Self(callback)
    }
}

impl<F> MeasurementSink for FnSink<F>
where
    F: FnMut(&RttMeasurement) + Send,
{
    fn on_measurement(&mut self, measurement: &RttMeasurement) {
        (self.0)(measurement)
    }
}

/// Forwards measurements into a tokio channel. A closed receiver is ignored.
#[cfg(feature = "channel")]
#[cfg_attr(docsrs, doc(cfg(feature = "channel")))]
impl MeasurementSink for tokio::sync::mpsc::UnboundedSender<RttMeasurement> {
    fn on_measurement(&mut self, measurement: &RttMeasurement) {
        if self.send(*measurement).is_err() {
            tracing::trace!("measurement receiver closed");
        }
    }
}
