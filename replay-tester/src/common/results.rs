use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Outcome of one replay suite on one browser, after retries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteResult {
    pub suite: String,
    pub browser: String,
    pub passed: bool,
    pub attempts: u32,
    pub rounds: u32,
    pub scenarios_executed: u64,
    pub shoe_changes: u32,
    /// Shoe changes where the reset input never appeared.
    #[serde(default)]
    pub skipped_resets: u32,
    /// The page had neither a start nor a stop control.
    pub aborted: bool,
    pub failures: Vec<String>,
    #[serde(with = "duration_serde")]
    pub duration: Duration,
}

/// Outcome of one backend API flow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowResult {
    pub flow: String,
    pub passed: bool,
    pub detail: String,
    pub requests: Vec<RequestTiming>,
    #[serde(with = "duration_serde")]
    pub duration: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestTiming {
    pub method: String,
    pub url: String,
    pub status: Option<u16>,
    pub ms: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunReport {
    pub suites: Vec<SuiteResult>,
    pub api: Vec<FlowResult>,
}

impl RunReport {
    pub fn is_empty(&self) -> bool {
        self.suites.is_empty() && self.api.is_empty()
    }

    pub fn any_failed(&self) -> bool {
        self.suites.iter().any(|s| !s.passed) || self.api.iter().any(|f| !f.passed)
    }
}

mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_millis().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u128::deserialize(deserializer)?;
        Ok(Duration::from_millis(u64::try_from(millis).unwrap_or(0)))
    }
}
