use std::time::Duration;

use crate::connection::connection_config::ConnectionConfig;

/// Smoothed round-trip time, used to decide when an unacknowledged packet
/// counts as lost
pub struct RttEstimator {
    smoothed_rtt: f32,
    deviation: f32,
    timeout: f32,
    rtt_weight: f32,
    deviation_weight: f32,
    backoff: f32,
}

impl RttEstimator {
    pub fn new(config: &ConnectionConfig) -> Self {
        let initial = config.initial_timeout.as_secs_f32();
        Self {
            smoothed_rtt: initial,
            deviation: initial,
            timeout: initial,
            rtt_weight: config.rtt_weight,
            deviation_weight: config.deviation_weight,
            backoff: config.timeout_backoff,
        }
    }

    /// Fold one measured round trip into the estimate
    pub fn record_sample(&mut self, sample: Duration) {
        let sample = sample.as_secs_f32();
        self.smoothed_rtt = (1.0 - self.rtt_weight) * self.smoothed_rtt + self.rtt_weight * sample;
        self.deviation = (1.0 - self.deviation_weight) * self.deviation
            + self.deviation_weight * (sample - self.smoothed_rtt).abs();
        self.timeout = self.smoothed_rtt + 4.0 * self.deviation;
    }

    /// Lengthen the timeout after packets timed out
    pub fn back_off(&mut self) {
        self.timeout *= self.backoff;
    }

    pub fn smoothed_rtt(&self) -> Duration {
        Duration::from_secs_f32(self.smoothed_rtt)
    }

    pub fn deviation(&self) -> Duration {
        Duration::from_secs_f32(self.deviation)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs_f32(self.timeout)
    }
}
