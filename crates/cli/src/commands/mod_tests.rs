// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn parse_key_val_splits_on_first_equals() {
    assert_eq!(
        parse_key_val("KEY=a=b"),
        Ok(("KEY".to_string(), "a=b".to_string()))
    );
    assert_eq!(
        parse_key_val("EMPTY="),
        Ok(("EMPTY".to_string(), String::new()))
    );
}

#[test]
fn parse_key_val_rejects_malformed_pairs() {
    assert!(parse_key_val("novalue").is_err());
    assert!(parse_key_val("=value").is_err());
}

#[test]
fn env_overrides_last_value_wins() {
    let env = env_overrides(vec![
        ("A".to_string(), "1".to_string()),
        ("A".to_string(), "2".to_string()),
    ]);
    assert_eq!(env.get("A").map(String::as_str), Some("2"));
}

#[test]
fn working_dir_prefers_flag() {
    assert_eq!(
        working_dir(Some(PathBuf::from("/srv"))).unwrap(),
        PathBuf::from("/srv")
    );
    assert_eq!(
        working_dir(None).unwrap(),
        std::env::current_dir().unwrap()
    );
}
