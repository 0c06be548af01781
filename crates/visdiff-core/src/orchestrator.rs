//! Multi-method runs over a single reference/test pair.

use std::time::Duration;

use crate::diagnostics::{Clock, SystemClock};
use crate::method::dispatch;
use crate::result::MultiMethodRun;
use crate::types::{AnalysisConfig, AnalysisError, MethodKind, RgbImage};

/// Runs an ordered list of methods against the same image pair.
///
/// Methods run sequentially in the order given. The first failure aborts
/// the run and no partial results are returned.
#[derive(Debug, Clone, Default)]
pub struct Orchestrator {
    config: AnalysisConfig,
    session_id: Option<String>,
}

impl Orchestrator {
    /// Create an orchestrator that applies `config` to every method.
    #[must_use]
    pub const fn new(config: AnalysisConfig) -> Self {
        Self {
            config,
            session_id: None,
        }
    }

    /// Tag the produced run with a session identifier.
    #[must_use]
    pub fn with_session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    /// The configuration applied to every method.
    #[must_use]
    pub const fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Run `methods` using the system clock.
    ///
    /// # Errors
    ///
    /// Returns the first [`AnalysisError`] any method produces.
    pub fn run(
        &self,
        reference: &RgbImage,
        test: &RgbImage,
        methods: &[MethodKind],
    ) -> Result<MultiMethodRun, AnalysisError> {
        self.run_with_clock(reference, test, methods, &SystemClock)
    }

    /// Run `methods`, timing each one with `clock`.
    ///
    /// The run's total duration is the sum of the per-method durations.
    ///
    /// # Errors
    ///
    /// Returns the first [`AnalysisError`] any method produces.
    pub fn run_with_clock<C: Clock>(
        &self,
        reference: &RgbImage,
        test: &RgbImage,
        methods: &[MethodKind],
        clock: &C,
    ) -> Result<MultiMethodRun, AnalysisError> {
        let mut results = Vec::with_capacity(methods.len());
        let mut total_duration = Duration::ZERO;

        for &method in methods {
            let result = dispatch(reference, test, method, &self.config, clock)?;
            tracing::info!(
                method = method.id(),
                duration_ms = result.duration.as_secs_f64() * 1000.0,
                verdict = %result.verdict,
                "method finished"
            );
            total_duration += result.duration;
            results.push(result);
        }

        Ok(MultiMethodRun::new(
            self.session_id.clone(),
            results,
            total_duration,
        ))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::cell::Cell;

    use image::Rgb;

    use super::*;

    /// Clock that advances by a fixed step on every `now()` call.
    struct StepClock {
        ticks: Cell<u64>,
        step_ms: u64,
    }

    impl StepClock {
        const fn new(step_ms: u64) -> Self {
            Self {
                ticks: Cell::new(0),
                step_ms,
            }
        }
    }

    impl Clock for StepClock {
        type Instant = u64;

        fn now(&self) -> u64 {
            let t = self.ticks.get();
            self.ticks.set(t + 1);
            t
        }

        fn elapsed(&self, since: &u64) -> Duration {
            let t = self.ticks.get();
            self.ticks.set(t + 1);
            Duration::from_millis((t - since) * self.step_ms)
        }
    }

    fn pair() -> (RgbImage, RgbImage) {
        let reference = RgbImage::from_pixel(24, 24, Rgb([255, 255, 255]));
        let mut test = reference.clone();
        for y in 8..14 {
            for x in 8..14 {
                test.put_pixel(x, y, Rgb([0, 0, 0]));
            }
        }
        (reference, test)
    }

    #[test]
    fn runs_methods_in_given_order() {
        let (reference, test) = pair();
        let methods = [MethodKind::Ssim, MethodKind::AbsDiff, MethodKind::Histogram];
        let run = Orchestrator::default()
            .run(&reference, &test, &methods)
            .unwrap();
        let order: Vec<MethodKind> = run.results().iter().map(|r| r.method).collect();
        assert_eq!(order, methods);
    }

    #[test]
    fn total_is_sum_of_method_durations() {
        let (reference, test) = pair();
        let run = Orchestrator::default()
            .run_with_clock(&reference, &test, &MethodKind::ALL, &StepClock::new(5))
            .unwrap();
        assert_eq!(run.results().len(), 3);
        for result in run.results() {
            assert_eq!(result.duration, Duration::from_millis(5));
        }
        assert_eq!(run.total_duration(), Duration::from_millis(15));
    }

    #[test]
    fn total_bounds_hold_with_system_clock() {
        let (reference, test) = pair();
        let run = Orchestrator::default()
            .run(&reference, &test, &MethodKind::ALL)
            .unwrap();
        let sum: Duration = run.results().iter().map(|r| r.duration).sum();
        let max = run.results().iter().map(|r| r.duration).max().unwrap();
        assert_eq!(run.total_duration(), sum);
        assert!(run.total_duration() >= max);
    }

    #[test]
    fn empty_method_list_gives_empty_run() {
        let (reference, test) = pair();
        let run = Orchestrator::default().run(&reference, &test, &[]).unwrap();
        assert!(run.results().is_empty());
        assert_eq!(run.total_duration(), Duration::ZERO);
    }

    #[test]
    fn session_id_is_attached() {
        let (reference, test) = pair();
        let run = Orchestrator::new(AnalysisConfig::default())
            .with_session("01J0000000000000000000000")
            .run(&reference, &test, &[MethodKind::Histogram])
            .unwrap();
        assert_eq!(run.session_id(), Some("01J0000000000000000000000"));
    }

    #[test]
    fn failure_aborts_the_run() {
        // 5x5 images are too small for the 7x7 SSIM window.
        let reference = RgbImage::from_pixel(5, 5, Rgb([0, 0, 0]));
        let test = reference.clone();
        let err = Orchestrator::default()
            .run(&reference, &test, &MethodKind::ALL)
            .unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidInput(_)));
    }
}
