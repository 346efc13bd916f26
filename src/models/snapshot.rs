use std::collections::BTreeMap;

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::bands::{StatusGlyph, status_glyph};
use super::status::TestStatus;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestCase {
    pub name: String,
    #[serde(default)]
    pub duration: f64,
    #[serde(default)]
    pub status: TestStatus,
    /// Output lines captured by the engine for this test.
    #[serde(default, deserialize_with = "null_as_default")]
    pub output: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackageResult {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub duration: f64,
    #[serde(default)]
    pub status: TestStatus,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tests: Vec<TestCase>,
    /// Percentage in 0–100; 0 means coverage was not measured.
    #[serde(default)]
    pub coverage: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TestCounts {
    pub passed: usize,
    pub failed: usize,
}

impl PackageResult {
    /// Tally the package's tests by glyph, so anything but PASS counts as a failure.
    pub fn counts(&self) -> TestCounts {
        self.tests
            .iter()
            .fold(TestCounts::default(), |mut acc, t| {
                match status_glyph(t.status) {
                    StatusGlyph::Pass => acc.passed += 1,
                    StatusGlyph::Fail => acc.failed += 1,
                }
                acc
            })
    }
}

/// One complete result set for a test run, replaced wholesale on every update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultSnapshot {
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub total_tests: usize,
    #[serde(default)]
    pub passed_tests: usize,
    #[serde(default)]
    pub failed_tests: usize,
    #[serde(default)]
    pub skipped_tests: usize,
    #[serde(default)]
    pub duration: f64,
    #[serde(default)]
    pub success: bool,
    /// Keyed by package name; a `BTreeMap` keeps iteration lexicographic.
    #[serde(default, deserialize_with = "null_as_default")]
    pub packages: BTreeMap<String, PackageResult>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub issues: Vec<String>,
}

impl ResultSnapshot {
    /// Parse a `/api/results/latest` body. An empty body or a JSON `null`
    /// is the "no run yet" answer and yields `Ok(None)`.
    pub fn from_json(body: &str) -> Result<Option<Self>, serde_json::Error> {
        let body = body.trim();
        if body.is_empty() {
            return Ok(None);
        }
        let parsed: Option<Self> = serde_json::from_str(body)?;
        Ok(parsed.map(Self::normalized))
    }

    fn normalized(mut self) -> Self {
        for (key, package) in &mut self.packages {
            if package.name.is_empty() {
                package.name = key.clone();
            }
        }
        self
    }

    /// Packages in display order (lexicographic by name).
    pub fn sorted_packages(&self) -> Vec<&PackageResult> {
        self.packages.values().collect()
    }

    pub fn package(&self, name: &str) -> Option<&PackageResult> {
        self.packages.get(name)
    }

    /// Mean coverage across measured packages, `None` if nothing was measured.
    pub fn average_coverage(&self) -> Option<f64> {
        let measured: Vec<f64> = self
            .packages
            .values()
            .map(|p| p.coverage)
            .filter(|c| *c > 0.0)
            .collect();
        if measured.is_empty() {
            None
        } else {
            Some(measured.iter().sum::<f64>() / measured.len() as f64)
        }
    }

    /// Local wall-clock time of the run, as shown in the trend axis.
    pub fn time_label(&self) -> String {
        self.timestamp
            .with_timezone(&Local)
            .format("%H:%M:%S")
            .to_string()
    }

    pub fn trend_point(&self) -> TrendPoint {
        TrendPoint {
            label: self.time_label(),
            pass: self.passed_tests,
            fail: self.failed_tests,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrendPoint {
    pub label: String,
    pub pass: usize,
    pub fail: usize,
}

/// The engine encodes empty collections as `null`.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
