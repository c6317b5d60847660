//! Niu niu table: every hand type crossed with every banker/player point
//! total, minus the combinations a hand type cannot produce.

use crate::scenario::{HandValue, ResultCode, Scenario, ScenarioError, ScenarioTable};

/// Console codes for the special niu niu hands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NiuNiuCodes {
    pub five_tigers: ResultCode,
    pub five_small: ResultCode,
    pub bomb: ResultCode,
    pub niu_niu: ResultCode,
    pub no_niu: ResultCode,
}

impl Default for NiuNiuCodes {
    fn default() -> Self {
        Self {
            five_tigers: ResultCode::from_static("88"),
            five_small: ResultCode::from_static("89"),
            bomb: ResultCode::from_static("87"),
            niu_niu: ResultCode::from_static("99"),
            no_niu: ResultCode::from_static("00"),
        }
    }
}

/// Returns `true` when `(banker, player)` must be skipped for a hand type.
pub type Exclusion = fn(banker: u8, player: u8) -> bool;

/// A hand type and the combinations it excludes.
#[derive(Debug, Clone)]
pub struct HandFamily {
    pub code: ResultCode,
    pub exclude: Option<Exclusion>,
}

impl HandFamily {
    /// # Errors
    ///
    /// Returns [`ScenarioError::InvalidResultCode`] unless `code` is 1-3 digits.
    pub fn new(code: &str, exclude: Option<Exclusion>) -> Result<Self, ScenarioError> {
        Ok(Self {
            code: ResultCode::parse(code)?,
            exclude,
        })
    }

    const fn open(code: ResultCode) -> Self {
        Self {
            code,
            exclude: None,
        }
    }
}

fn five_tigers_excluded(banker: u8, player: u8) -> bool {
    banker < HandValue::MAX && player < HandValue::MAX
}

fn five_small_excluded(banker: u8, player: u8) -> bool {
    banker > 5 && player > 5
}

fn bomb_excluded(banker: u8, player: u8) -> bool {
    banker == player && banker != HandValue::MAX
}

const NIU_CODES: [&str; 9] = ["9", "8", "7", "6", "5", "4", "3", "2", "1"];

/// Hand types in generation order: the five specials, then niu 9 down to 1.
#[must_use]
pub fn hand_families(codes: &NiuNiuCodes) -> Vec<HandFamily> {
    let mut families = vec![
        HandFamily {
            code: codes.five_tigers.clone(),
            exclude: Some(five_tigers_excluded),
        },
        HandFamily {
            code: codes.five_small.clone(),
            exclude: Some(five_small_excluded),
        },
        HandFamily {
            code: codes.bomb.clone(),
            exclude: Some(bomb_excluded),
        },
        HandFamily::open(codes.niu_niu.clone()),
        HandFamily::open(codes.no_niu.clone()),
    ];
    families.extend(
        NIU_CODES
            .into_iter()
            .map(|code| HandFamily::open(ResultCode::from_static(code))),
    );
    families
}

/// Cross each family with the full `0..=10` grid, banker-major.
#[must_use]
pub fn generate(families: &[HandFamily]) -> ScenarioTable {
    let mut scenarios = Vec::new();
    for family in families {
        for banker in 0..=HandValue::MAX {
            for player in 0..=HandValue::MAX {
                if family.exclude.is_some_and(|skip| skip(banker, player)) {
                    continue;
                }
                scenarios.push(Scenario::with_hands(
                    family.code.clone(),
                    HandValue::from_static(banker),
                    HandValue::from_static(player),
                ));
            }
        }
    }
    ScenarioTable::new(scenarios)
}

#[must_use]
pub fn niu_niu() -> ScenarioTable {
    generate(&hand_families(&NiuNiuCodes::default()))
}
