//! Run diagnostics: clocks, duration serialization, and timing breakdowns.
//!
//! Duration measurements use [`std::time::Duration`] (platform-agnostic).
//! Timestamps come from a [`Clock`]; [`SystemClock`] is backed by the
//! `web-time` crate, which uses `performance.now()` on WASM and
//! `std::time::Instant` on native. Tests substitute a deterministic clock.
//!
//! Durations are serialized as fractional seconds (`f64`) for JSON
//! compatibility, since `std::time::Duration` does not implement serde
//! traits.

use std::time::Duration;

use crate::result::MultiMethodRun;

/// Serde support for `std::time::Duration` as fractional seconds.
pub mod duration_serde {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize a `Duration` as fractional seconds (`f64`).
    ///
    /// # Errors
    ///
    /// Propagates serializer errors.
    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        duration.as_secs_f64().serialize(serializer)
    }

    /// Deserialize a `Duration` from fractional seconds (`f64`).
    ///
    /// # Errors
    ///
    /// Fails for negative, non-finite, or overflowing values.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(|_| {
            serde::de::Error::custom(
                "duration seconds must be finite, non-negative, and representable as a Duration",
            )
        })
    }
}

/// Source of monotonic timestamps.
pub trait Clock {
    /// Opaque timestamp type.
    type Instant;

    /// Current timestamp.
    fn now(&self) -> Self::Instant;

    /// Time elapsed since `since`.
    fn elapsed(&self, since: &Self::Instant) -> Duration;
}

/// [`Clock`] backed by [`web_time::Instant`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    type Instant = web_time::Instant;

    fn now(&self) -> web_time::Instant {
        web_time::Instant::now()
    }

    fn elapsed(&self, since: &web_time::Instant) -> Duration {
        since.elapsed()
    }
}

impl MultiMethodRun {
    /// Format per-method timings as a human-readable table.
    #[must_use]
    pub fn timing_report(&self) -> String {
        let mut lines = Vec::new();

        lines.push(format!("Analysis Timing Report\n{}", "=".repeat(60)));
        if let Some(session) = self.session_id() {
            lines.push(format!("Session: {session}"));
        }
        lines.push(format!(
            "Total duration: {:.3}ms",
            duration_ms(self.total_duration()),
        ));
        lines.push(String::new());

        lines.push(format!(
            "{:<12} {:>10} {:>10}  {:<10} {}",
            "Method", "Duration", "% Total", "Verdict", "Regions"
        ));
        lines.push("-".repeat(60));

        let total_ms = duration_ms(self.total_duration());
        for result in self.results() {
            let ms = duration_ms(result.duration);
            let pct = if total_ms > 0.0 {
                ms / total_ms * 100.0
            } else {
                0.0
            };
            let regions = result
                .metrics
                .num_differences()
                .map_or_else(|| "N/A".to_string(), |n| n.to_string());
            lines.push(format!(
                "{:<12} {ms:>8.3}ms {pct:>9.1}%  {:<10} {regions}",
                result.method.id(),
                result.verdict.label(),
            ));
        }

        lines.join("\n")
    }
}

/// Convert a `Duration` to milliseconds as `f64`.
fn duration_ms(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}
