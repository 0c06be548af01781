//! Qualitative classification of method metrics.
//!
//! | method    | metric                | OK     | ATTENTION   | DANGER |
//! |-----------|-----------------------|--------|-------------|--------|
//! | histogram | histogram_correlation | > 0.98 | 0.90..=0.98 | < 0.90 |
//! | ssim      | ssim_index            | > 0.98 | 0.90..=0.98 | < 0.90 |
//! | absdiff   | difference_percentage | < 2    | 2..=10      | > 10   |
//!
//! Classification is advisory: anything it cannot interpret becomes
//! [`Verdict::Unavailable`] rather than an error.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::result::Metrics;
use crate::types::MethodKind;

/// Similarity above which histogram and SSIM scores are OK.
pub const SIMILARITY_OK_ABOVE: f64 = 0.98;
/// Similarity below which histogram and SSIM scores are DANGER.
pub const SIMILARITY_DANGER_BELOW: f64 = 0.90;
/// Difference percentage below which AbsDiff is OK.
pub const DIFFERENCE_OK_BELOW: f64 = 2.0;
/// Difference percentage above which AbsDiff is DANGER.
pub const DIFFERENCE_DANGER_ABOVE: f64 = 10.0;

/// Three-tier verdict, plus a placeholder when no verdict applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Verdict {
    /// Images match within tolerance.
    Ok,
    /// Noticeable divergence worth a look.
    Attention,
    /// Significant divergence.
    Danger,
    /// The metric needed for classification is missing or not a number.
    Unavailable,
}

impl Verdict {
    /// Label used in reports.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::Attention => "ATTENTION",
            Self::Danger => "DANGER",
            Self::Unavailable => "N/A",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Classify a method's metrics.
///
/// Returns [`Verdict::Unavailable`] when `metrics` belongs to another
/// method or its key metric is not finite.
#[must_use]
pub fn classify(method: MethodKind, metrics: &Metrics) -> Verdict {
    match (method, metrics) {
        (MethodKind::Histogram, Metrics::Histogram(m)) => similarity(m.histogram_correlation),
        (MethodKind::Ssim, Metrics::Ssim(m)) => similarity(m.ssim_index),
        (MethodKind::AbsDiff, Metrics::AbsDiff(m)) => difference(m.difference_percentage),
        _ => Verdict::Unavailable,
    }
}

/// Classify using an external method identifier.
///
/// Unrecognized identifiers yield [`Verdict::Unavailable`].
#[must_use]
pub fn classify_by_name(method: &str, metrics: &Metrics) -> Verdict {
    method
        .parse::<MethodKind>()
        .map_or(Verdict::Unavailable, |kind| classify(kind, metrics))
}

fn similarity(score: f64) -> Verdict {
    if !score.is_finite() {
        Verdict::Unavailable
    } else if score > SIMILARITY_OK_ABOVE {
        Verdict::Ok
    } else if score >= SIMILARITY_DANGER_BELOW {
        Verdict::Attention
    } else {
        Verdict::Danger
    }
}

fn difference(percentage: f64) -> Verdict {
    if !percentage.is_finite() {
        Verdict::Unavailable
    } else if percentage < DIFFERENCE_OK_BELOW {
        Verdict::Ok
    } else if percentage <= DIFFERENCE_DANGER_ABOVE {
        Verdict::Attention
    } else {
        Verdict::Danger
    }
}
