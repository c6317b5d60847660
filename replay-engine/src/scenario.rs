//! Scenario model: one console result code plus the optional banker/player
//! hand values typed after it.

use rand::Rng;
use rand::seq::SliceRandom;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;
use thiserror::Error;

fn is_result_code(code: &str) -> bool {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"^[0-9]{1,3}$").ok())
        .as_ref()
        .is_some_and(|pattern| pattern.is_match(code))
}

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("result code must be 1-3 digits (got {0:?})")]
    InvalidResultCode(String),
    #[error("hand value must be between 0 and {max} (got {value})", max = HandValue::MAX)]
    HandOutOfRange { value: u8 },
    #[error("scenario {result} sets only one of banker/player")]
    PartialHands { result: String },
    #[error("scenario table is empty")]
    EmptyTable,
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Outcome category code understood by the console, e.g. `1` or `146`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ResultCode(String);

impl ResultCode {
    /// Parse a user-supplied code.
    ///
    /// # Errors
    ///
    /// Returns [`ScenarioError::InvalidResultCode`] unless the input is 1-3 ASCII digits.
    pub fn parse(raw: &str) -> Result<Self, ScenarioError> {
        let trimmed = raw.trim();
        if is_result_code(trimmed) {
            Ok(Self(trimmed.to_string()))
        } else {
            Err(ScenarioError::InvalidResultCode(raw.to_string()))
        }
    }

    pub(crate) fn from_static(code: &'static str) -> Self {
        debug_assert!(is_result_code(code), "bad built-in code {code}");
        Self(code.to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ResultCode {
    type Error = ScenarioError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ResultCode> for String {
    fn from(code: ResultCode) -> Self {
        code.0
    }
}

impl fmt::Display for ResultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Point total of one side, `0..=10` (baccarat tables stop at 9).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct HandValue(u8);

impl HandValue {
    pub const MAX: u8 = 10;

    /// # Errors
    ///
    /// Returns [`ScenarioError::HandOutOfRange`] above [`HandValue::MAX`].
    pub fn new(value: u8) -> Result<Self, ScenarioError> {
        if value <= Self::MAX {
            Ok(Self(value))
        } else {
            Err(ScenarioError::HandOutOfRange { value })
        }
    }

    pub(crate) const fn from_static(value: u8) -> Self {
        debug_assert!(value <= Self::MAX);
        Self(value)
    }

    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }

    /// Digits typed into the console for this value.
    #[must_use]
    pub fn digits(self) -> String {
        self.0.to_string()
    }
}

impl TryFrom<u8> for HandValue {
    type Error = ScenarioError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<HandValue> for u8 {
    fn from(value: HandValue) -> Self {
        value.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Hands {
    pub banker: HandValue,
    pub player: HandValue,
}

/// One input fed to the console. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "ScenarioRecord", into = "ScenarioRecord")]
pub struct Scenario {
    result: ResultCode,
    hands: Option<Hands>,
}

impl Scenario {
    /// # Errors
    ///
    /// Fails when the code or either hand value is out of range.
    pub fn new(result: &str, banker: u8, player: u8) -> Result<Self, ScenarioError> {
        Ok(Self {
            result: ResultCode::parse(result)?,
            hands: Some(Hands {
                banker: HandValue::new(banker)?,
                player: HandValue::new(player)?,
            }),
        })
    }

    /// # Errors
    ///
    /// Fails when the code is not 1-3 digits.
    pub fn result_only(result: &str) -> Result<Self, ScenarioError> {
        Ok(Self {
            result: ResultCode::parse(result)?,
            hands: None,
        })
    }

    pub(crate) fn with_hands(result: ResultCode, banker: HandValue, player: HandValue) -> Self {
        Self {
            result,
            hands: Some(Hands { banker, player }),
        }
    }

    pub(crate) fn bare(result: ResultCode) -> Self {
        Self {
            result,
            hands: None,
        }
    }

    #[must_use]
    pub const fn result(&self) -> &ResultCode {
        &self.result
    }

    #[must_use]
    pub const fn hands(&self) -> Option<Hands> {
        self.hands
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.hands {
            Some(Hands { banker, player }) => write!(
                f,
                "result={}, banker={}, player={}",
                self.result,
                banker.get(),
                player.get()
            ),
            None => write!(f, "result={}", self.result),
        }
    }
}

/// Wire shape: `{"result":"1","banker":1,"player":0}` or `{"result":"14"}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ScenarioRecord {
    result: ResultCode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    banker: Option<HandValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    player: Option<HandValue>,
}

impl TryFrom<ScenarioRecord> for Scenario {
    type Error = ScenarioError;

    fn try_from(record: ScenarioRecord) -> Result<Self, Self::Error> {
        match (record.banker, record.player) {
            (Some(banker), Some(player)) => Ok(Self::with_hands(record.result, banker, player)),
            (None, None) => Ok(Self::bare(record.result)),
            _ => Err(ScenarioError::PartialHands {
                result: record.result.to_string(),
            }),
        }
    }
}

impl From<Scenario> for ScenarioRecord {
    fn from(scenario: Scenario) -> Self {
        Self {
            result: scenario.result,
            banker: scenario.hands.map(|h| h.banker),
            player: scenario.hands.map(|h| h.player),
        }
    }
}

/// Ordered, read-only list of scenarios for one run.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScenarioTable {
    scenarios: Vec<Scenario>,
}

impl ScenarioTable {
    #[must_use]
    pub const fn new(scenarios: Vec<Scenario>) -> Self {
        Self { scenarios }
    }

    /// Load a table from a JSON array of scenario records.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed, a record is invalid, or
    /// the array is empty.
    pub fn from_json(json: &str) -> Result<Self, ScenarioError> {
        let table: Self = serde_json::from_str(json)?;
        if table.is_empty() {
            return Err(ScenarioError::EmptyTable);
        }
        Ok(table)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.scenarios.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scenarios.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Scenario> {
        self.scenarios.iter()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Scenario] {
        &self.scenarios
    }

    /// A freshly shuffled copy; the table itself is never reordered.
    #[must_use]
    pub fn shuffled<R: Rng + ?Sized>(&self, rng: &mut R) -> Self {
        let mut scenarios = self.scenarios.clone();
        scenarios.shuffle(rng);
        Self { scenarios }
    }
}

impl<'a> IntoIterator for &'a ScenarioTable {
    type Item = &'a Scenario;
    type IntoIter = std::slice::Iter<'a, Scenario>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl FromIterator<Scenario> for ScenarioTable {
    fn from_iter<I: IntoIterator<Item = Scenario>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
