use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use replay_engine::tables::niu_niu::{generate, hand_families};
use replay_engine::tables::{HandFamily, NiuNiuCodes, dt_all, niu_niu};
use replay_engine::{ResultCode, Scenario, ScenarioTable, TableId, find_suite, suites};
use std::hash::Hasher;
use twox_hash::XxHash64;

fn fingerprint(table: &ScenarioTable) -> u64 {
    let mut hasher = XxHash64::with_seed(0);
    hasher.write(serde_json::to_string(table).unwrap().as_bytes());
    hasher.finish()
}

fn sort_key(scenario: &Scenario) -> (String, Option<(u8, u8)>) {
    (
        scenario.result().to_string(),
        scenario
            .hands()
            .map(|hands| (hands.banker.get(), hands.player.get())),
    )
}

fn sorted(table: &ScenarioTable) -> Vec<(String, Option<(u8, u8)>)> {
    let mut keys: Vec<_> = table.iter().map(sort_key).collect();
    keys.sort();
    keys
}

#[test]
fn niu_niu_results_come_from_configured_families() {
    let families: Vec<_> = hand_families(&NiuNiuCodes::default())
        .into_iter()
        .map(|family| family.code)
        .collect();
    for scenario in &niu_niu() {
        assert!(
            families.contains(scenario.result()),
            "unexpected code in {scenario}"
        );
        let hands = scenario.hands().unwrap();
        assert!(hands.banker.get() <= 10 && hands.player.get() <= 10);
    }
}

#[test]
fn niu_niu_exclusions_hold() {
    for scenario in &niu_niu() {
        let hands = scenario.hands().unwrap();
        let (banker, player) = (hands.banker.get(), hands.player.get());
        match scenario.result().as_str() {
            "88" => assert!(banker == 10 || player == 10, "{scenario}"),
            "89" => assert!(banker <= 5 || player <= 5, "{scenario}"),
            "87" => assert!(banker != player || banker == 10, "{scenario}"),
            _ => {}
        }
    }
}

#[test]
fn regeneration_is_identical() {
    for id in TableId::ALL {
        assert_eq!(fingerprint(&id.generate()), fingerprint(&id.generate()), "{id:?}");
        assert_eq!(fingerprint(&id.generate()), fingerprint(id.table()), "{id:?}");
    }
}

#[test]
fn shuffled_table_is_a_permutation() {
    let table = dt_all();
    let mut rng = ChaCha8Rng::seed_from_u64(2024);
    let shuffled = table.shuffled(&mut rng);

    assert_eq!(shuffled.len(), table.len());
    assert_eq!(sorted(&shuffled), sorted(&table));
    assert_ne!(shuffled, table, "53 scenarios should not shuffle to the same order");
    assert_eq!(table, dt_all(), "source table must not be reordered");
}

#[test]
fn custom_family_list_drives_generation() {
    let families = hand_families(&NiuNiuCodes {
        no_niu: ResultCode::parse("01").unwrap(),
        ..NiuNiuCodes::default()
    });
    let table = generate(&families);
    assert_eq!(table.len(), niu_niu().len());
    assert!(table.iter().any(|s| s.result().as_str() == "01"));
    assert!(table.iter().all(|s| s.result().as_str() != "00"));
}

#[test]
fn custom_families_reject_malformed_codes() {
    assert!(HandFamily::new("abcd", None).is_err());
    assert!(ResultCode::parse("1000").is_err());
    let family = HandFamily::new("7", Some(|banker, _| banker > 0)).unwrap();
    let table = generate(&[family]);
    assert_eq!(table.len(), 11);
    assert!(table.iter().all(|s| s.result().as_str() == "7"));
}

#[test]
fn json_tables_load_with_the_same_rules() {
    let table =
        ScenarioTable::from_json(r#"[{"result":"1","banker":1,"player":0},{"result":"14"}]"#)
            .unwrap();
    assert_eq!(table.len(), 2);
    assert!(table.as_slice()[1].hands().is_none());

    assert!(ScenarioTable::from_json(r#"[{"result":"1","banker":11,"player":0}]"#).is_err());
    assert!(ScenarioTable::from_json(r#"[{"result":"1","banker":1}]"#).is_err());
    assert!(ScenarioTable::from_json("[]").is_err());
}

#[test]
fn every_suite_points_at_a_non_empty_table() {
    for suite in suites() {
        assert!(!suite.table.table().is_empty(), "{}", suite.key);
        assert_eq!(find_suite(suite.key).unwrap().key, suite.key);
    }
}
