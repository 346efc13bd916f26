pub mod bands;
pub mod snapshot;
pub mod status;

pub use bands::{CoverageBand, StatusGlyph, coverage_band, status_glyph, success_rate};
pub use snapshot::{PackageResult, ResultSnapshot, TestCase, TestCounts, TrendPoint};
pub use status::TestStatus;
