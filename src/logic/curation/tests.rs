use std::io::Write;

use super::*;
use crate::logic::evidence::Side;

#[test]
fn test_catalog_sides_are_case_sensitive() {
    let json = r#"{"data": [
        {"name": "JEI", "side": "Client", "modId": "JEI"},
        {"name": "Spark", "side": " Server ", "modId": "spark"},
        {"name": "Lib", "side": "Universal", "modId": "lib"},
        {"name": "Odd", "side": "client", "modId": "odd"},
        {"name": "Blank", "side": "", "modId": "blank"},
        {"name": "NoId", "side": "Client", "modId": "  "}
    ]}"#;
    let entries = parse_curated(json).unwrap();
    assert_eq!(entries.len(), 5);
    let store = CurationStore::from_entries(entries);
    assert_eq!(store.side_of("jei"), Some(Side::ClientOnly));
    assert_eq!(store.side_of("spark"), Some(Side::ServerOnly));
    assert_eq!(store.side_of("lib"), Some(Side::Universal));
    assert_eq!(store.side_of("odd"), Some(Side::Unknown));
    assert_eq!(store.side_of("blank"), Some(Side::Unknown));
    assert_eq!(store.get("jei").unwrap().confidence, CATALOG_CONFIDENCE);
}

#[test]
fn test_rich_list_ids_and_summary() {
    let json = r#"[
        {"mod_name": "Just Enough Items", "page_url": "https://modrinth.com/mod/JEI/",
         "source": "modrinth", "classification": "client_only", "confidence": 0.97,
         "reason": [{"label": "env", "snippet": "client required"}, {"label": "tag", "snippet": "qol"}],
         "scanned_at": "2024-05-01T10:00:00Z"},
        {"mod_name": "Simple Backups (Fork)", "classification": "SERVER_ONLY", "confidence": 0.8},
        {"classification": "UNIVERSAL"}
    ]"#;
    let entries = parse_curated(json).unwrap();
    assert_eq!(entries.len(), 2);

    assert_eq!(entries[0].mod_id, "jei");
    assert_eq!(entries[0].side, Side::ClientOnly);
    assert_eq!(entries[0].summary, "env: client required; tag: qol");
    assert_eq!(entries[0].scanned_at.as_deref(), Some("2024-05-01T10:00:00Z"));

    assert_eq!(entries[1].mod_id, "simple_backups_fork");
    assert_eq!(entries[1].side, Side::ServerOnly);
    assert_eq!(entries[1].summary, "No specific reason provided");
}

#[test]
fn test_rich_unknown_classification() {
    let entries = parse_curated(r#"[{"mod_name": "x1", "classification": "both"}]"#).unwrap();
    assert_eq!(entries[0].side, Side::Unknown);
}

#[test]
fn test_unrecognised_shape() {
    assert!(matches!(parse_curated(r#"{"mods": []}"#), Err(CurationError::UnknownFormat)));
    assert!(matches!(parse_curated("nope"), Err(CurationError::Parse(_))));
}

#[test]
fn test_slugify() {
    assert_eq!(slugify("Create: Steam 'n' Rails"), "create_steam_n_rails");
    assert_eq!(slugify("__A__b__"), "a_b");
    assert_eq!(slugify("!!!"), "");
}

#[test]
fn test_load_missing_file_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    let store = CurationStore::load(&dir.path().join("absent.json"));
    assert!(store.is_empty());
}

#[test]
fn test_load_invalid_file_uses_fallback() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "[{{ broken").unwrap();
    let store = CurationStore::load(file.path());
    assert_eq!(store.len(), 2);
    assert_eq!(store.side_of("sodium"), Some(Side::ClientOnly));
    assert_eq!(store.get("jei").unwrap().source, FALLBACK_SOURCE);
}

#[test]
fn test_load_valid_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, r#"{{"data": [{{"name": "Chunky", "side": "Server", "modId": "chunky"}}]}}"#).unwrap();
    let store = CurationStore::load(file.path());
    assert_eq!(store.len(), 1);
    assert_eq!(store.side_of("CHUNKY"), Some(Side::ServerOnly));
}

#[test]
fn test_runtime_overrides() {
    let store = CurationStore::builtin_fallback();
    store.add_override("Sodium", Side::Universal, "tested on server");
    let entry = store.get("sodium").unwrap();
    assert_eq!(entry.side, Side::Universal);
    assert_eq!(entry.confidence, 1.0);
    assert_eq!(entry.source, RUNTIME_OVERRIDE_SOURCE);

    assert!(store.remove_override("SODIUM").is_some());
    assert!(!store.contains("sodium"));
    assert!(store.remove_override("sodium").is_none());
}

#[test]
fn test_summary_counts() {
    let store = CurationStore::builtin_fallback();
    store.add_override("spark", Side::ServerOnly, "profiler");
    let by_side = store.counts_by_side();
    assert_eq!(by_side.get("CLIENT_ONLY"), Some(&2));
    assert_eq!(by_side.get("SERVER_ONLY"), Some(&1));
    assert_eq!(store.counts_by_source().get(FALLBACK_SOURCE), Some(&2));
    assert!((store.average_confidence() - (0.95 + 0.99 + 1.0) / 3.0).abs() < 1e-9);

    let signal = store.get("jei").unwrap().to_signal();
    assert_eq!(signal.side, Side::ClientOnly);
    assert_eq!(signal.confidence, 0.95);
}
