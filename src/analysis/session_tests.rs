use super::*;
use crate::core::config::NamingStrategy;
use crate::lang::common::DiscoveredLiteral;
use proptest::prelude::*;
use std::path::{Path, PathBuf};

fn text(s: &str) -> LiteralValue {
    LiteralValue::Text(s.to_string())
}

fn literal(file: &str, line: usize, value: LiteralValue) -> DiscoveredLiteral {
    DiscoveredLiteral {
        value,
        occurrence: Occurrence {
            filepath: file.to_string(),
            lineno: line,
            col_offset: 4,
            end_lineno: line,
            end_col_offset: 12,
            definition_of: None,
            is_regex_arg: false,
        },
    }
}

fn defining(file: &str, line: usize, value: LiteralValue, name: &str) -> DiscoveredLiteral {
    let mut literal = literal(file, line, value);
    literal.occurrence.definition_of = Some(name.to_string());
    literal
}

fn scanned(file: &str, literals: Vec<DiscoveredLiteral>, names: &[&str]) -> ScannedFile {
    ScannedFile {
        path: PathBuf::from(file),
        literals,
        top_level_names: names.iter().map(|n| n.to_string()).collect(),
        imported_names: BTreeSet::new(),
    }
}

fn config() -> ExtractionConfig {
    ExtractionConfig::with_root("/p")
}

fn run(
    config: ExtractionConfig,
    existing: ConstantIndex,
    files: Vec<ScannedFile>,
) -> (Report, SessionSummary) {
    let mut session = ExtractionSession::new(config, existing);
    for file in files {
        session.add_file(file);
    }
    session.finish()
}

#[test]
fn test_values_below_threshold_are_dropped() {
    let (report, summary) = run(
        config(),
        ConstantIndex::default(),
        vec![scanned(
            "/p/a.py",
            vec![literal("/p/a.py", 1, text("once only")), literal("/p/a.py", 2, text("twice")), literal("/p/a.py", 3, text("twice"))],
            &[],
        )],
    );
    assert_eq!(report.len(), 1);
    assert!(report.contains("TWICE"));
    assert_eq!(summary.below_threshold, 1);
    assert_eq!(summary.distinct_values, 2);
    assert_eq!(summary.occurrences, 3);
}

#[test]
fn test_value_in_two_files_is_global() {
    let (report, _) = run(
        config(),
        ConstantIndex::default(),
        vec![
            scanned("/p/a.py", vec![literal("/p/a.py", 1, text("Shared String"))], &[]),
            scanned("/p/b.py", vec![literal("/p/b.py", 3, text("Shared String"))], &[]),
        ],
    );
    assert_eq!(report.len(), 1);
    let entry = report.get("SHARED_STRING").unwrap();
    assert_eq!(entry.scope, Scope::Global);
    assert!(entry.is_new);
    assert_eq!(entry.source_path.as_deref(), Some("/p/constants.py"));
    assert_eq!(entry.occurrences.len(), 2);
}

#[test]
fn test_single_file_value_is_local_unless_forced_global() {
    let files = || {
        vec![scanned(
            "/p/a.py",
            vec![literal("/p/a.py", 1, text("token")), literal("/p/a.py", 2, text("token"))],
            &[],
        )]
    };
    let (report, _) = run(config(), ConstantIndex::default(), files());
    let entry = report.get("TOKEN").unwrap();
    assert_eq!(entry.scope, Scope::Local);
    assert_eq!(entry.source_path.as_deref(), Some("/p/a.py"));

    let mut forced = config();
    forced.use_local_scope = false;
    let (report, _) = run(forced, ConstantIndex::default(), files());
    assert_eq!(report.get("TOKEN").unwrap().scope, Scope::Global);
}

#[test]
fn test_generic_names_follow_frequency_then_discovery_order() {
    let mut generic = config();
    generic.naming = NamingStrategy::Generic;
    let (report, _) = run(
        generic,
        ConstantIndex::default(),
        vec![scanned(
            "/p/a.py",
            vec![
                literal("/p/a.py", 1, text("first")),
                literal("/p/a.py", 2, text("first")),
                literal("/p/a.py", 3, LiteralValue::Int(86400)),
                literal("/p/a.py", 4, LiteralValue::Int(86400)),
                literal("/p/a.py", 5, LiteralValue::Int(86400)),
                literal("/p/a.py", 6, text("second")),
                literal("/p/a.py", 7, text("second")),
            ],
            &[],
        )],
    );
    let ordered: Vec<(String, LiteralValue)> = report
        .iter()
        .map(|(name, entry)| (name.clone(), entry.value.clone()))
        .collect();
    assert_eq!(
        ordered,
        vec![
            ("CONST_1".to_string(), LiteralValue::Int(86400)),
            ("CONST_2".to_string(), text("first")),
            ("CONST_3".to_string(), text("second")),
        ]
    );
}

#[test]
fn test_name_collisions_get_numeric_suffix() {
    // "user id" and "user-id" both derive USER_ID.
    let (report, _) = run(
        config(),
        ConstantIndex::default(),
        vec![scanned(
            "/p/a.py",
            vec![
                literal("/p/a.py", 1, text("user id")),
                literal("/p/a.py", 2, text("user id")),
                literal("/p/a.py", 3, text("user-id")),
                literal("/p/a.py", 4, text("user-id")),
            ],
            &[],
        )],
    );
    assert_eq!(report.get("USER_ID").unwrap().value, text("user id"));
    assert_eq!(report.get("USER_ID_2").unwrap().value, text("user-id"));
}

#[test]
fn test_names_bound_in_file_are_avoided() {
    let (report, _) = run(
        config(),
        ConstantIndex::default(),
        vec![scanned(
            "/p/a.py",
            vec![literal("/p/a.py", 1, text("token")), literal("/p/a.py", 2, text("token"))],
            &["TOKEN"],
        )],
    );
    assert!(report.contains("TOKEN_2"));
    assert!(!report.contains("TOKEN"));
}

#[test]
fn test_existing_constant_is_reused() {
    let mut existing = ConstantIndex::default();
    existing.bind("API_HOST".into(), Some(&text("api.example.com")), Path::new("/p/constants.py"));
    let (report, summary) = run(
        config(),
        existing,
        vec![scanned(
            "/p/a.py",
            vec![literal("/p/a.py", 1, text("api.example.com")), literal("/p/a.py", 2, text("api.example.com"))],
            &[],
        )],
    );
    let entry = report.get("API_HOST").unwrap();
    assert!(!entry.is_new);
    assert_eq!(entry.scope, Scope::Global);
    assert_eq!(entry.source_path.as_deref(), Some("/p/constants.py"));
    assert_eq!(summary.reused, 1);
    assert_eq!(summary.new_definitions, 0);
}

#[test]
fn test_reuse_skips_files_that_bind_the_name_themselves() {
    let mut existing = ConstantIndex::default();
    existing.bind("MODE".into(), Some(&text("turbo")), Path::new("/p/constants.py"));
    let mut importing = scanned("/p/b.py", vec![literal("/p/b.py", 2, text("turbo"))], &["MODE"]);
    importing.imported_names.insert("MODE".to_string());
    let (report, _) = run(
        config(),
        existing,
        vec![
            scanned("/p/a.py", vec![literal("/p/a.py", 4, text("turbo"))], &["MODE"]),
            importing,
        ],
    );
    let files: Vec<&str> = report
        .get("MODE")
        .unwrap()
        .occurrences
        .iter()
        .map(|o| o.filepath.as_str())
        .collect();
    assert_eq!(files, vec!["/p/b.py"]);
}

#[test]
fn test_local_existing_definition_is_not_new() {
    let mut single = config();
    single.min_count = 1;
    let (report, summary) = run(
        single,
        ConstantIndex::default(),
        vec![scanned(
            "/p/a.py",
            vec![defining("/p/a.py", 1, text("magic"), "MAGIC")],
            &["MAGIC"],
        )],
    );
    let entry = report.get("MAGIC").unwrap();
    assert!(!entry.is_new);
    assert_eq!(entry.scope, Scope::Local);
    assert_eq!(summary.new_definitions, 0);
}

#[test]
fn test_promoted_definition_keeps_its_name_and_is_new() {
    let (report, _) = run(
        config(),
        ConstantIndex::default(),
        vec![
            scanned("/p/a.py", vec![defining("/p/a.py", 1, text("str1"), "STR1")], &["STR1"]),
            scanned("/p/b.py", vec![literal("/p/b.py", 1, text("str1"))], &[]),
        ],
    );
    let entry = report.get("STR1").unwrap();
    assert!(entry.is_new);
    assert_eq!(entry.scope, Scope::Global);
    assert_eq!(entry.source_path.as_deref(), Some("/p/constants.py"));
}

#[test]
fn test_store_names_are_reserved() {
    let mut existing = ConstantIndex::default();
    existing.bind("TOKEN".into(), None, Path::new("/p/constants.py"));
    let (report, _) = run(
        config(),
        existing,
        vec![
            scanned("/p/a.py", vec![literal("/p/a.py", 1, text("token"))], &[]),
            scanned("/p/b.py", vec![literal("/p/b.py", 1, text("token"))], &[]),
        ],
    );
    assert!(report.contains("TOKEN_2"));
}

#[test]
fn test_local_definition_never_takes_a_store_name() {
    let mut existing = ConstantIndex::default();
    existing.bind("MAGIC".into(), Some(&text("magic value")), Path::new("/p/constants.py"));
    let (report, summary) = run(
        config(),
        existing,
        vec![
            scanned(
                "/p/a.py",
                vec![
                    defining("/p/a.py", 1, text("magic"), "MAGIC"),
                    literal("/p/a.py", 2, text("magic")),
                    literal("/p/a.py", 3, text("magic")),
                ],
                &["MAGIC"],
            ),
            scanned(
                "/p/b.py",
                vec![
                    literal("/p/b.py", 1, text("magic value")),
                    literal("/p/b.py", 2, text("magic value")),
                ],
                &[],
            ),
        ],
    );
    assert_eq!(report.len(), 2);
    let reused = report.get("MAGIC").unwrap();
    assert_eq!(reused.value, text("magic value"));
    assert!(!reused.is_new);
    let local = report.get("MAGIC_2").unwrap();
    assert_eq!(local.value, text("magic"));
    assert_eq!(local.scope, Scope::Local);
    assert!(local.is_new);
    assert_eq!(local.occurrences.len(), 3);
    assert_eq!(summary.reused, 1);
    assert_eq!(summary.new_definitions, 1);
}

proptest! {
    #[test]
    fn prop_one_entry_per_group_over_threshold(counts in prop::collection::vec(1usize..5, 1..12)) {
        let literals: Vec<DiscoveredLiteral> = counts
            .iter()
            .enumerate()
            .flat_map(|(i, count)| {
                (0..*count).map(move |line| literal("/p/a.py", line + 1, LiteralValue::Int(1000 + i as i64)))
            })
            .collect();
        let expected = counts.iter().filter(|c| **c >= 2).count();
        let (report, summary) = run(config(), ConstantIndex::default(), vec![scanned("/p/a.py", literals, &[])]);
        prop_assert_eq!(report.len(), expected);
        prop_assert_eq!(summary.below_threshold, counts.len() - expected);
    }
}
