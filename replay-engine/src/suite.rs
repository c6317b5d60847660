//! The shipped replay suites: which table goes to which console, how many
//! rounds, in what order.

use serde::Serialize;

use crate::controller::RoundOrder;
use crate::error::ConfigError;
use crate::pacing::Pacing;
use crate::replay::ReplayPlan;
use crate::tables::TableId;

pub const DEFAULT_ROUNDS: u32 = 500;

pub const BACCARAT_ROUTE: &str = "#/longhu-baccarat-display";
pub const NIU_NIU_ROUTE: &str = "#/niu-niu-display";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PacingProfile {
    Baccarat,
    NiuNiu,
}

impl PacingProfile {
    #[must_use]
    pub fn pacing(self) -> Pacing {
        match self {
            Self::Baccarat => Pacing::baccarat(),
            Self::NiuNiu => Pacing::niu_niu(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderPolicy {
    Fixed,
    Shuffled,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct Suite {
    pub key: &'static str,
    pub name: &'static str,
    pub route: &'static str,
    /// Environment variable holding the round count.
    pub rounds_env: &'static str,
    pub table: TableId,
    pub order: OrderPolicy,
    pub pacing: PacingProfile,
}

const SUITES: &[Suite] = &[
    Suite {
        key: "baccarat-banker",
        name: "Baccarat banker",
        route: BACCARAT_ROUTE,
        rounds_env: "BACCARAT_ROUND",
        table: TableId::BaccaratBanker,
        order: OrderPolicy::Fixed,
        pacing: PacingProfile::Baccarat,
    },
    Suite {
        key: "dt-banker",
        name: "Dragon tiger banker",
        route: BACCARAT_ROUTE,
        rounds_env: "DT_BACCARAT_ROUND",
        table: TableId::DtBanker,
        order: OrderPolicy::Fixed,
        pacing: PacingProfile::Baccarat,
    },
    Suite {
        key: "dt-player",
        name: "Dragon tiger player",
        route: BACCARAT_ROUTE,
        rounds_env: "DT_BACCARAT_ROUND",
        table: TableId::DtPlayer,
        order: OrderPolicy::Fixed,
        pacing: PacingProfile::Baccarat,
    },
    Suite {
        key: "dt-tie",
        name: "Dragon tiger tie",
        route: BACCARAT_ROUTE,
        rounds_env: "DT_BACCARAT_ROUND",
        table: TableId::DtTie,
        order: OrderPolicy::Fixed,
        pacing: PacingProfile::Baccarat,
    },
    Suite {
        key: "dt-big-tiger",
        name: "Dragon tiger big tiger",
        route: BACCARAT_ROUTE,
        rounds_env: "DT_BACCARAT_ROUND",
        table: TableId::DtBigTiger,
        order: OrderPolicy::Fixed,
        pacing: PacingProfile::Baccarat,
    },
    Suite {
        key: "dt-all",
        name: "Dragon tiger all results",
        route: BACCARAT_ROUTE,
        rounds_env: "DT_BACCARAT_ROUND",
        table: TableId::DtAll,
        order: OrderPolicy::Shuffled,
        pacing: PacingProfile::Baccarat,
    },
    Suite {
        key: "niu-niu",
        name: "Niu niu",
        route: NIU_NIU_ROUTE,
        rounds_env: "NIU_NIU_ROUND",
        table: TableId::NiuNiu,
        order: OrderPolicy::Fixed,
        pacing: PacingProfile::NiuNiu,
    },
];

#[must_use]
pub const fn suites() -> &'static [Suite] {
    SUITES
}

/// Look a suite up by key. Underscores and case are ignored.
///
/// # Errors
///
/// [`ConfigError::UnknownSuite`] when nothing matches.
pub fn find_suite(key: &str) -> Result<&'static Suite, ConfigError> {
    let wanted = key.trim().to_ascii_lowercase().replace('_', "-");
    SUITES
        .iter()
        .find(|suite| suite.key == wanted)
        .ok_or_else(|| ConfigError::UnknownSuite(key.to_string()))
}

/// Round count for a suite: the explicit value wins, then the environment
/// variable, then [`DEFAULT_ROUNDS`]. Zero is allowed.
///
/// # Errors
///
/// [`ConfigError::InvalidRounds`] when the variable is set but is not a
/// non-negative integer.
pub fn resolve_rounds<F>(explicit: Option<u32>, env_var: &str, lookup: F) -> Result<u32, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(rounds) = explicit {
        return Ok(rounds);
    }
    match lookup(env_var) {
        None => Ok(DEFAULT_ROUNDS),
        Some(raw) if raw.trim().is_empty() => Ok(DEFAULT_ROUNDS),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidRounds {
                var: env_var.to_string(),
                value: raw,
            }),
    }
}

impl Suite {
    /// Console URL for this suite under `base_url`.
    #[must_use]
    pub fn url(&self, base_url: &str) -> String {
        format!("{}/{}", base_url.trim_end_matches('/'), self.route)
    }

    #[must_use]
    pub fn round_order(&self, seed: u64) -> RoundOrder {
        match self.order {
            OrderPolicy::Fixed => RoundOrder::Fixed,
            OrderPolicy::Shuffled => RoundOrder::Shuffled { seed },
        }
    }

    #[must_use]
    pub fn plan(&self, base_url: &str, rounds: u32, seed: u64) -> ReplayPlan {
        ReplayPlan::new(self.url(base_url), rounds)
            .with_order(self.round_order(seed))
            .with_pacing(self.pacing.pacing())
    }
}
