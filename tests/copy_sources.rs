//! Cross-backend copy fidelity: any conforming source copies into any
//! conforming destination, across backend types and layout modes, because
//! the two sides exchange logical names rather than backend paths.

mod common;

use std::sync::Arc;

use tempfile::tempdir;

use fsource::{
    DataKey, DfsClient, DfsFileSource, Dimension, FileSource, KeyMapper, LayoutMode,
    LocalFileSource, MemDfsClient,
};

fn region_date_mapper() -> KeyMapper {
    KeyMapper::new([Dimension::new("region"), Dimension::new("date")]).unwrap()
}

#[test]
fn keyed_artifacts_cross_layout_and_backend() {
    let td = tempdir().unwrap();
    let mapper = region_date_mapper();

    // Hierarchical local source with two keyed artifacts.
    let src = LocalFileSource::new(td.path().join("hier"), LayoutMode::Hierarchical);
    src.ensure_exists().unwrap();
    let key_us = DataKey::from_pairs([("region", "us"), ("date", "2020")]).unwrap();
    let key_eu = DataKey::from_pairs([("region", "eu"), ("date", "2020")]).unwrap();
    src.add_bytes(&mapper.name_for(&key_us).unwrap(), b"A").unwrap();
    src.add_bytes(&mapper.name_for(&key_eu).unwrap(), b"B").unwrap();

    // Listing yields identifiers recoverable back to exactly those keys.
    let names = src.list_all_names().unwrap();
    assert_eq!(names.len(), 2);
    let keys: Vec<DataKey> = names
        .iter()
        .map(|n| mapper.key_for(n).expect("recover key"))
        .collect();
    assert!(keys.contains(&key_us));
    assert!(keys.contains(&key_eu));

    // Copy into a flat-mode remote source: names re-render with the flat
    // delimiter, bytes are identical.
    let client = Arc::new(MemDfsClient::new("copyfid"));
    let dest = DfsFileSource::new(client.clone(), "/pipelines/out", LayoutMode::Flat);
    let stats = dest.copy_from(&src, false).unwrap();
    assert_eq!(stats.copied, 2);
    assert_eq!(stats.bytes, 2);

    assert_eq!(dest.list_all_names().unwrap(), vec!["eu_2020", "us_2020"]);
    assert_eq!(dest.get_bytes("us_2020").unwrap(), b"A");
    assert_eq!(dest.get_bytes("eu_2020").unwrap(), b"B");

    // The flat rendering is literal: one file per artifact under the root.
    assert!(client.get_status("/pipelines/out/us_2020").unwrap().is_some());
    assert!(client.get_status("/pipelines/out/eu_2020").unwrap().is_some());
}

#[test]
fn remote_hierarchical_to_local_flat() {
    let td = tempdir().unwrap();
    let client = Arc::new(MemDfsClient::new("copyback"));
    let src = DfsFileSource::new(client, "/data/in", LayoutMode::Hierarchical);
    common::SourceBattery::populate(&src);

    let dest = LocalFileSource::new(td.path().join("flat-out"), LayoutMode::Flat);
    let stats = dest.copy_from(&src, true).unwrap();
    assert_eq!(stats.copied, common::FIXTURE.len());
    common::assert_holds_fixture(&dest);

    // Flat destination stores each artifact as a single root-level file.
    for (name, _) in common::FIXTURE {
        assert!(dest.root().join(name).is_file(), "missing flat file {name}");
    }
}

#[test]
fn local_to_local_relayout() {
    let td = tempdir().unwrap();
    let input = common::seeded_input_source(td.path());

    let dest = LocalFileSource::new(td.path().join("relaid"), LayoutMode::Hierarchical);
    dest.copy_from(&input, false).unwrap();
    common::assert_holds_fixture(&dest);

    // Hierarchical destination nests one directory per dimension.
    assert!(dest.root().join("us").join("2020").is_file());
}

#[test]
fn copy_without_overwrite_skips_existing() {
    let td = tempdir().unwrap();
    let input = common::seeded_input_source(td.path());

    let dest = LocalFileSource::new(td.path().join("dest"), LayoutMode::Flat);
    dest.ensure_exists().unwrap();
    let (existing_name, _) = common::FIXTURE[0];
    dest.add_bytes(existing_name, b"pre-existing").unwrap();

    let stats = dest.copy_from(&input, false).unwrap();
    assert_eq!(stats.skipped, 1);
    assert_eq!(stats.copied, common::FIXTURE.len() - 1);

    // The pre-existing destination entry was left untouched.
    assert_eq!(dest.get_bytes(existing_name).unwrap(), b"pre-existing");
}

#[test]
fn copy_with_overwrite_replaces_existing() {
    let td = tempdir().unwrap();
    let input = common::seeded_input_source(td.path());

    let dest = LocalFileSource::new(td.path().join("dest"), LayoutMode::Flat);
    dest.ensure_exists().unwrap();
    let (existing_name, content) = common::FIXTURE[0];
    dest.add_bytes(existing_name, b"stale").unwrap();

    let stats = dest.copy_from(&input, true).unwrap();
    assert_eq!(stats.skipped, 0);
    assert_eq!(stats.copied, common::FIXTURE.len());
    assert_eq!(dest.get_bytes(existing_name).unwrap(), content);
}

#[test]
fn copy_from_missing_source_root_is_not_found() {
    let td = tempdir().unwrap();
    let src = LocalFileSource::new(td.path().join("never"), LayoutMode::Flat);
    let dest = LocalFileSource::new(td.path().join("dest"), LayoutMode::Flat);
    let err = dest.copy_from(&src, true).unwrap_err();
    assert!(err.is_not_found(), "expected NotFound, got {err:?}");
}

#[test]
fn copy_creates_destination_root() {
    let td = tempdir().unwrap();
    let input = common::seeded_input_source(td.path());
    let dest = LocalFileSource::new(td.path().join("implicit"), LayoutMode::Flat);

    // No ensure_exists on the destination; copy_from creates the root.
    dest.copy_from(&input, false).unwrap();
    common::assert_holds_fixture(&dest);
}
