//! Built-in scenario tables.
//!
//! Tables are generated on first use and shared read-only for the rest of
//! the process.

pub mod baccarat;
pub mod niu_niu;

use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

use crate::scenario::ScenarioTable;

pub use baccarat::{baccarat_banker, dt_all, dt_banker, dt_big_tiger, dt_player, dt_tie};
pub use niu_niu::{HandFamily, NiuNiuCodes, niu_niu};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TableId {
    BaccaratBanker,
    DtBanker,
    DtPlayer,
    DtTie,
    DtBigTiger,
    DtAll,
    NiuNiu,
}

impl TableId {
    pub const ALL: [Self; 7] = [
        Self::BaccaratBanker,
        Self::DtBanker,
        Self::DtPlayer,
        Self::DtTie,
        Self::DtBigTiger,
        Self::DtAll,
        Self::NiuNiu,
    ];

    /// The shared instance of this table.
    #[must_use]
    pub fn table(self) -> &'static ScenarioTable {
        static TABLES: [OnceLock<ScenarioTable>; 7] = [const { OnceLock::new() }; 7];
        TABLES[self as usize].get_or_init(|| self.generate())
    }

    /// Build a fresh copy, bypassing the shared instance.
    #[must_use]
    pub fn generate(self) -> ScenarioTable {
        match self {
            Self::BaccaratBanker => baccarat_banker(),
            Self::DtBanker => dt_banker(),
            Self::DtPlayer => dt_player(),
            Self::DtTie => dt_tie(),
            Self::DtBigTiger => dt_big_tiger(),
            Self::DtAll => dt_all(),
            Self::NiuNiu => niu_niu(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shared_tables_match_fresh_generation() {
        for id in TableId::ALL {
            assert_eq!(id.table(), &id.generate(), "{id:?}");
            assert!(!id.table().is_empty(), "{id:?}");
        }
    }
}
