//! Baccarat and dragon-tiger tables.
//!
//! Each outcome family is a base code plus its pair variants (`4` banker
//! pair, `6` player pair, `46` both), crossed with a fixed list of hands
//! that produce that outcome.

use crate::scenario::{HandValue, ResultCode, Scenario, ScenarioTable};

type Hand = (u8, u8);

const BANKER_CODES: [&str; 4] = ["1", "14", "16", "146"];
const PLAYER_CODES: [&str; 4] = ["3", "34", "36", "346"];
const TIE_CODES: [&str; 4] = ["2", "24", "26", "246"];
const BIG_TIGER_CODES: [&str; 4] = ["7", "74", "76", "746"];

const BANKER_HANDS: [Hand; 9] = [
    (1, 0),
    (2, 1),
    (3, 2),
    (4, 3),
    (5, 4),
    (7, 5),
    (7, 6),
    (8, 7),
    (9, 8),
];

const PLAYER_HANDS: [Hand; 9] = [
    (0, 1),
    (1, 2),
    (2, 3),
    (3, 4),
    (4, 5),
    (5, 6),
    (6, 8),
    (7, 8),
    (8, 9),
];

// Six is reserved for the tiger tie.
const TIE_HANDS: [Hand; 9] = [
    (0, 0),
    (1, 1),
    (2, 2),
    (3, 3),
    (4, 4),
    (5, 5),
    (7, 7),
    (8, 8),
    (9, 9),
];

const TIGER_HANDS: [Hand; 6] = [(6, 0), (6, 1), (6, 2), (6, 3), (6, 4), (6, 5)];
const DRAGON_HANDS: [Hand; 6] = [(0, 7), (1, 7), (2, 7), (3, 7), (4, 7), (5, 7)];

fn scenario(code: &'static str, (banker, player): Hand) -> Scenario {
    Scenario::with_hands(
        ResultCode::from_static(code),
        HandValue::from_static(banker),
        HandValue::from_static(player),
    )
}

fn family(codes: &[&'static str], hands: &[Hand]) -> impl Iterator<Item = Scenario> {
    codes
        .iter()
        .flat_map(move |&code| hands.iter().map(move |&hand| scenario(code, hand)))
}

/// Classic baccarat banker flow: the result code is the whole input.
#[must_use]
pub fn baccarat_banker() -> ScenarioTable {
    BANKER_CODES
        .into_iter()
        .map(|code| Scenario::bare(ResultCode::from_static(code)))
        .collect()
}

#[must_use]
pub fn dt_banker() -> ScenarioTable {
    family(&BANKER_CODES, &BANKER_HANDS).collect()
}

#[must_use]
pub fn dt_player() -> ScenarioTable {
    family(&PLAYER_CODES, &PLAYER_HANDS).collect()
}

#[must_use]
pub fn dt_tie() -> ScenarioTable {
    family(&TIE_CODES, &TIE_HANDS).collect()
}

#[must_use]
pub fn dt_big_tiger() -> ScenarioTable {
    family(&BIG_TIGER_CODES, &TIGER_HANDS).collect()
}

/// One entry per base outcome, no pair variants. Run shuffled.
#[must_use]
pub fn dt_all() -> ScenarioTable {
    family(&["5"], &DRAGON_HANDS) // small dragon
        .chain(family(&["9"], &DRAGON_HANDS)) // big dragon
        .chain(family(&["7"], &TIGER_HANDS)) // big tiger
        .chain(family(&["0"], &TIGER_HANDS)) // small tiger
        .chain(family(&["99"], &[(6, 7)]))
        .chain(family(&["8"], &[(6, 6)])) // tiger tie
        .chain(family(&["2"], &TIE_HANDS))
        .chain(family(&["3"], &PLAYER_HANDS))
        .chain(family(&["1"], &BANKER_HANDS))
        .collect()
}
