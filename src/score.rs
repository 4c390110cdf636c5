//! Keyword priority scoring.
//!
//! Volume sets the base magnitude on a log10 scale; positive sustained
//! growth multiplies it.
//!
//! # Formula
//!
//! ```text
//! volume_score   = log10(max(search_volume, 1))
//! growth_score   = max(sustained_growth_score, 0)
//! priority_score = volume_score × (1 + growth_score × 10)
//! ```
//!
//! Absent signals count as `0`. Negative growth never penalizes.

/// Multiplier applied to positive sustained growth.
pub const GROWTH_AMPLIFIER: f64 = 10.0;

/// Log-scaled volume. Volumes below 1 (including absent) score `0`.
pub fn volume_score(search_volume: Option<f64>) -> f64 {
    search_volume.unwrap_or(0.0).max(1.0).log10()
}

/// Growth bonus, floored at zero.
pub fn growth_score(sustained_growth_score: Option<f64>) -> f64 {
    sustained_growth_score.unwrap_or(0.0).max(0.0)
}

/// Compute the priority score for one keyword.
///
/// # Example
///
/// ```rust
/// use keyword_tiers::score::priority_score;
///
/// let score = priority_score(Some(1000.0), Some(0.5));
/// assert!((score - 18.0).abs() < 1e-9);
/// ```
pub fn priority_score(search_volume: Option<f64>, sustained_growth_score: Option<f64>) -> f64 {
    volume_score(search_volume) * (1.0 + growth_score(sustained_growth_score) * GROWTH_AMPLIFIER)
}
