use serde::{Deserialize, Serialize};

/// Allowed deviation between an actual transaction and a projected
/// occurrence for the pair to be considered a candidate match. Applied
/// uniformly; there is no per-rule override.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct MatchingTolerances {
    /// Relative amount tolerance, e.g. 0.02 for 2%.
    pub amount_tolerance_percent: f64,
    /// Absolute currency floor, so small amounts keep a workable band.
    pub amount_tolerance_absolute: f64,
    /// Calendar-day distance allowed between the dates, in either direction.
    pub date_tolerance_days: i64,
}

impl Default for MatchingTolerances {
    fn default() -> Self {
        Self {
            amount_tolerance_percent: 0.02,
            amount_tolerance_absolute: 1.0,
            date_tolerance_days: 3,
        }
    }
}
