use serde::{Deserialize, Serialize};

/// Status string as emitted by the test engine. Anything outside the known
/// set lands in `Unknown` instead of failing the whole snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TestStatus {
    Pass,
    Fail,
    Skip,
    #[default]
    #[serde(other)]
    Unknown,
}
