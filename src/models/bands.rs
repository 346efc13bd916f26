//! Pure display derivations computed from snapshot fields.

use ratatui::style::Color;

use super::status::TestStatus;
use crate::ui::theme;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoverageBand {
    High,
    Medium,
    Low,
    Unmeasured,
}

impl CoverageBand {
    pub fn label(&self) -> &'static str {
        match self {
            CoverageBand::High => "high",
            CoverageBand::Medium => "medium",
            CoverageBand::Low => "low",
            CoverageBand::Unmeasured => "n/a",
        }
    }

    pub fn color(&self) -> Color {
        match self {
            CoverageBand::High => theme::GREEN,
            CoverageBand::Medium => theme::YELLOW,
            CoverageBand::Low => theme::RED,
            CoverageBand::Unmeasured => theme::OVERLAY0,
        }
    }
}

/// Classify a coverage percentage. A value of 0 means the package was not
/// measured; NaN and negative values are treated the same way.
pub fn coverage_band(pct: f64) -> CoverageBand {
    if pct >= 80.0 {
        CoverageBand::High
    } else if pct >= 50.0 {
        CoverageBand::Medium
    } else if pct > 0.0 {
        CoverageBand::Low
    } else {
        CoverageBand::Unmeasured
    }
}

/// Fraction of passed tests, `0.0` for an empty run. Not clamped: a producer
/// reporting more passes than tests yields a ratio above 1.
pub fn success_rate(total: usize, passed: usize) -> f64 {
    if total > 0 {
        passed as f64 / total as f64
    } else {
        0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusGlyph {
    Pass,
    Fail,
}

impl StatusGlyph {
    pub fn icon(&self) -> &'static str {
        match self {
            StatusGlyph::Pass => "✔",
            StatusGlyph::Fail => "✘",
        }
    }

    pub fn color(&self) -> Color {
        match self {
            StatusGlyph::Pass => theme::GREEN,
            StatusGlyph::Fail => theme::RED,
        }
    }
}

/// Map a reported status to its glyph. Anything other than PASS fails
/// closed, skipped tests included.
pub fn status_glyph(status: TestStatus) -> StatusGlyph {
    match status {
        TestStatus::Pass => StatusGlyph::Pass,
        TestStatus::Fail | TestStatus::Skip | TestStatus::Unknown => StatusGlyph::Fail,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coverage_band_boundaries() {
        assert_eq!(coverage_band(0.0), CoverageBand::Unmeasured);
        assert_eq!(coverage_band(0.1), CoverageBand::Low);
        assert_eq!(coverage_band(49.99), CoverageBand::Low);
        assert_eq!(coverage_band(50.0), CoverageBand::Medium);
        assert_eq!(coverage_band(79.9), CoverageBand::Medium);
        assert_eq!(coverage_band(80.0), CoverageBand::High);
        assert_eq!(coverage_band(100.0), CoverageBand::High);
    }

    #[test]
    fn test_coverage_band_out_of_range() {
        assert_eq!(coverage_band(-5.0), CoverageBand::Unmeasured);
        assert_eq!(coverage_band(f64::NAN), CoverageBand::Unmeasured);
        assert_eq!(coverage_band(140.0), CoverageBand::High);
    }

    #[test]
    fn test_success_rate() {
        assert_eq!(success_rate(0, 0), 0.0);
        assert_eq!(success_rate(0, 3), 0.0);
        assert_eq!(success_rate(10, 7), 0.7);
        assert_eq!(success_rate(4, 4), 1.0);
    }

    #[test]
    fn test_success_rate_tolerates_inconsistent_counts() {
        assert_eq!(success_rate(2, 4), 2.0);
    }

    #[test]
    fn test_status_glyph_fails_closed() {
        assert_eq!(status_glyph(TestStatus::Pass), StatusGlyph::Pass);
        assert_eq!(status_glyph(TestStatus::Fail), StatusGlyph::Fail);
        assert_eq!(status_glyph(TestStatus::Skip), StatusGlyph::Fail);
        assert_eq!(status_glyph(TestStatus::Unknown), StatusGlyph::Fail);
    }
}
