//! RTT estimation.
//!
//! Implements the RFC 6298 algorithm, with the EWMA gains divided by the
//! number of samples expected in the current round.

use std::fmt;
use std::num::NonZeroUsize;
use std::time::Duration;

use crate::core::{
    RttConfigError, DEFAULT_INITIAL_RTO, DEFAULT_MAX_RTO, DEFAULT_MIN_RTO,
    DEFAULT_RTO_BACKOFF_MULTIPLIER, DEFAULT_RTO_K, DEFAULT_RTT_ALPHA, DEFAULT_RTT_BETA,
};

use super::{FnSink, MeasurementSink, RttMeasurement};

/// Estimator parameters.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RttOptions {
    /// Gain for the smoothed RTT, within `[0, 1]`.
    pub alpha: f64,
    /// Gain for the RTT variation, within `[0, 1]`.
    pub beta: f64,
    /// Variation multiplier in the RTO formula.
    pub k: f64,
    /// RTO before the first measurement.
    pub initial_rto: Duration,
    /// Lower RTO bound.
    pub min_rto: Duration,
    /// Upper RTO bound.
    pub max_rto: Duration,
    /// Factor applied by [`RttEstimator::backoff_rto`], at least 1.
    pub rto_backoff_multiplier: f64,
}

impl Default for RttOptions {
    fn default() -> Self {
        Self {
            alpha: DEFAULT_RTT_ALPHA,
            beta: DEFAULT_RTT_BETA,
            k: DEFAULT_RTO_K,
            initial_rto: DEFAULT_INITIAL_RTO,
            min_rto: DEFAULT_MIN_RTO,
            max_rto: DEFAULT_MAX_RTO,
            rto_backoff_multiplier: DEFAULT_RTO_BACKOFF_MULTIPLIER,
        }
    }
}

impl RttOptions {
    /// Check parameter ranges.
    pub fn validate(&self) -> Result<(), RttConfigError> {
        if !(0.0..=1.0).contains(&self.alpha) {
            return Err(RttConfigError::Alpha(self.alpha));
        }
        if !(0.0..=1.0).contains(&self.beta) {
            return Err(RttConfigError::Beta(self.beta));
        }
        if !(self.k >= 0.0 && self.k.is_finite()) {
            return Err(RttConfigError::K(self.k));
        }
        if self.min_rto > self.max_rto {
            return Err(RttConfigError::RtoBounds {
                min: self.min_rto,
                max: self.max_rto,
            });
        }
        if !(self.rto_backoff_multiplier >= 1.0 && self.rto_backoff_multiplier.is_finite()) {
            return Err(RttConfigError::BackoffMultiplier(self.rto_backoff_multiplier));
        }
        Ok(())
    }
}

/// RTT estimator for one request flow.
///
/// Keeps the smoothed RTT and RTT variation, computes the retransmission
/// timeout, and tracks min/max/average RTT. The RTO stays within
/// `[min_rto, max_rto]` after every measurement and backoff.
pub struct RttEstimator {
    options: RttOptions,
    smoothed_rtt: Duration,
    rtt_variation: Duration,
    rto: Duration,
    min_rtt: Option<Duration>,
    max_rtt: Option<Duration>,
    avg_rtt: Duration,
    sample_count: u64,
    sink: Option<Box<dyn MeasurementSink>>,
}

impl fmt::Debug for RttEstimator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RttEstimator")
            .field("options", &self.options)
            .field("smoothed_rtt", &self.smoothed_rtt)
            .field("rtt_variation", &self.rtt_variation)
            .field("rto", &self.rto)
            .field("sample_count", &self.sample_count)
            .field("has_sink", &self.sink.is_some())
            .finish()
    }
}

impl RttEstimator {
    /// Create an estimator with validated options.
    pub fn new(options: RttOptions) -> Result<Self, RttConfigError> {
        options.validate()?;
        Ok(Self {
            rto: options.initial_rto,
            options,
            smoothed_rtt: Duration::ZERO,
            rtt_variation: Duration::ZERO,
            min_rtt: None,
            max_rtt: None,
            avg_rtt: Duration::ZERO,
            sample_count: 0,
            sink: None,
        })
    }

    /// Create an estimator that reports every measurement to `sink`.
    pub fn with_sink(
        options: RttOptions,
        sink: impl MeasurementSink + 'static,
    ) -> Result<Self, RttConfigError> {
        let mut estimator = Self::new(options)?;
        estimator.sink = Some(Box::new(sink));
        Ok(estimator)
    }

    /// Create an estimator that calls `callback` on every measurement.
    pub fn with_callback<F>(options: RttOptions, callback: F) -> Result<Self, RttConfigError>
    where
        F: FnMut(&RttMeasurement) + Send + 'static,
    {
        Self::with_sink(options, FnSink::new(callback))
    }

    /// Record an RTT sample.
    ///
    /// `expected_samples` is the number of samples expected in this round;
    /// the gains are divided by it.
    pub fn add_measurement(
        &mut self,
        rtt: Duration,
        expected_samples: NonZeroUsize,
        segment: Option<u64>,
    ) {
        if self.sample_count == 0 {
            self.smoothed_rtt = rtt;
            self.rtt_variation = rtt / 2;
        } else {
            let n = expected_samples.get() as f64;
            let alpha = self.options.alpha / n;
            let beta = self.options.beta / n;
            let srtt = nanos(self.smoothed_rtt);
            let sample = nanos(rtt);
            let rttvar = (1.0 - beta) * nanos(self.rtt_variation) + beta * (srtt - sample).abs();
            self.rtt_variation = from_nanos(rttvar);
            self.smoothed_rtt = from_nanos((1.0 - alpha) * srtt + alpha * sample);
        }
        let rto = nanos(self.smoothed_rtt) + self.options.k * nanos(self.rtt_variation);
        self.rto = self.clamp(from_nanos(rto));

        let measurement = RttMeasurement {
            rtt,
            smoothed_rtt: self.smoothed_rtt,
            rtt_variation: self.rtt_variation,
            rto: self.rto,
            segment,
        };
        tracing::trace!(
            rtt = ?rtt,
            srtt = ?self.smoothed_rtt,
            rttvar = ?self.rtt_variation,
            rto = ?self.rto,
            segment,
            "rtt measurement"
        );
        if let Some(sink) = self.sink.as_mut() {
            sink.on_measurement(&measurement);
        }

        let count = u128::from(self.sample_count);
        let avg = (count * self.avg_rtt.as_nanos() + rtt.as_nanos()) / (count + 1);
        self.avg_rtt = duration_from_u128(avg);
        self.min_rtt = Some(self.min_rtt.map_or(rtt, |m| m.min(rtt)));
        self.max_rtt = Some(self.max_rtt.map_or(rtt, |m| m.max(rtt)));
        self.sample_count += 1;
    }

    /// Record a single-sample measurement with no segment number.
    pub fn add_sample(&mut self, rtt: Duration) {
        self.add_measurement(rtt, NonZeroUsize::MIN, None);
    }

    /// Multiply the RTO by the backoff multiplier, saturating at `max_rto`.
    pub fn backoff_rto(&mut self) -> Duration {
        let backed_off = nanos(self.rto) * self.options.rto_backoff_multiplier;
        self.rto = self.clamp(from_nanos(backed_off));
        tracing::trace!(rto = ?self.rto, "rto backoff");
        self.rto
    }

    fn clamp(&self, rto: Duration) -> Duration {
        rto.clamp(self.options.min_rto, self.options.max_rto)
    }

    /// Current retransmission timeout.
    pub fn rto(&self) -> Duration {
        self.rto
    }

    /// Smoothed RTT; zero before the first sample.
    pub fn smoothed_rtt(&self) -> Duration {
        self.smoothed_rtt
    }

    /// RTT variation; zero before the first sample.
    pub fn rtt_variation(&self) -> Duration {
        self.rtt_variation
    }

    /// Smallest observed RTT.
    pub fn min_rtt(&self) -> Option<Duration> {
        self.min_rtt
    }

    /// Largest observed RTT.
    pub fn max_rtt(&self) -> Option<Duration> {
        self.max_rtt
    }

    /// Running average of observed RTTs.
    pub fn avg_rtt(&self) -> Duration {
        self.avg_rtt
    }

    /// Number of samples recorded.
    pub fn sample_count(&self) -> u64 {
        self.sample_count
    }

    /// Options the estimator was built with.
    pub fn options(&self) -> &RttOptions {
        &self.options
    }
}

fn nanos(d: Duration) -> f64 {
    d.as_nanos() as f64
}

// truncates toward zero; saturates on overflow
fn from_nanos(ns: f64) -> Duration {
    duration_from_u128(ns as u128)
}

fn duration_from_u128(ns: u128) -> Duration {
    const NANOS_PER_SEC: u128 = 1_000_000_000;
    match u64::try_from(ns / NANOS_PER_SEC) {
        Ok(secs) => Duration::new(secs, (ns % NANOS_PER_SEC) as u32),
        Err(_) => Duration::MAX,
    }
}
