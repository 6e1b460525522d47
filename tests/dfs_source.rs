//! Conformance battery runs for the distributed-filesystem backend over the
//! in-process client handle. The checks are the same battery the local
//! backend passes; nothing here may depend on backend-specific behavior.

mod common;

use std::sync::Arc;
use std::thread;

use tempfile::tempdir;

use common::SourceBattery;
use fsource::{DfsFileSource, FileSource, LayoutMode, MemDfsClient};

fn client() -> Arc<MemDfsClient> {
    Arc::new(MemDfsClient::new("conformance"))
}

fn flat_src(client: &Arc<MemDfsClient>) -> DfsFileSource {
    DfsFileSource::new(client.clone(), "/test/sources/flat", LayoutMode::Flat)
}

fn hier_src(client: &Arc<MemDfsClient>) -> DfsFileSource {
    DfsFileSource::new(client.clone(), "/test/sources/hier", LayoutMode::Hierarchical)
}

#[test]
fn file_list() {
    let c = client();
    SourceBattery::check_file_list(&flat_src(&c));
    SourceBattery::check_file_list(&hier_src(&c));
}

#[test]
fn file_list_no_root() {
    let c = client();
    let src = DfsFileSource::new(c, "/test/sources/bad", LayoutMode::Flat);
    let err = src.list_all_names().unwrap_err();
    assert!(err.is_not_found(), "expected NotFound, got {err:?}");
}

#[test]
fn empty_root_lists_empty_not_error() {
    let c = client();
    let src = flat_src(&c);
    src.ensure_exists().unwrap();
    assert_eq!(src.list_all_names().unwrap(), Vec::<String>::new());
}

#[test]
fn get_bytes() {
    let c = client();
    SourceBattery::check_get_bytes(&flat_src(&c));
    SourceBattery::check_get_bytes(&hier_src(&c));
}

#[test]
fn get_file_size() {
    let c = client();
    SourceBattery::check_get_size(&flat_src(&c));
    SourceBattery::check_get_size(&hier_src(&c));
}

#[test]
fn file_exists() {
    let c = client();
    SourceBattery::check_exists(&flat_src(&c));
    SourceBattery::check_exists(&hier_src(&c));
}

#[test]
fn get_only_if_exists() {
    let c = client();
    SourceBattery::check_only_if_exists(&flat_src(&c));
    SourceBattery::check_only_if_exists(&hier_src(&c));
}

#[test]
fn get_by_stream() {
    let c = client();
    SourceBattery::check_get_by_stream(&flat_src(&c));
    SourceBattery::check_get_by_stream(&hier_src(&c));
}

#[test]
fn add_by_stream() {
    let c = client();
    SourceBattery::check_add_by_stream(&flat_src(&c));
    SourceBattery::check_add_by_stream(&hier_src(&c));
}

#[test]
fn add_by_writer() {
    let c = client();
    SourceBattery::check_add_by_writer(&flat_src(&c));
    SourceBattery::check_add_by_writer(&hier_src(&c));
}

#[test]
fn clear() {
    let c = client();
    SourceBattery::check_clear(&flat_src(&c));
    SourceBattery::check_clear(&hier_src(&c));
}

#[test]
fn existence_transitions() {
    let c = client();
    SourceBattery::check_existence_transitions(&flat_src(&c));
    SourceBattery::check_existence_transitions(&hier_src(&c));
}

#[test]
fn invalid_names_rejected() {
    let c = client();
    SourceBattery::check_invalid_names(&flat_src(&c));
}

#[test]
fn ensure_exists_race_leaves_one_root() {
    let c = client();
    let src = hier_src(&c);
    thread::scope(|scope| {
        for _ in 0..8 {
            let src = src.clone();
            scope.spawn(move || src.ensure_exists().expect("racing ensure_exists"));
        }
    });
    assert_eq!(src.list_all_names().unwrap(), Vec::<String>::new());
}

#[test]
fn two_sources_share_one_namespace() {
    let c = client();
    let writer_side = flat_src(&c);
    let reader_side = flat_src(&c);
    writer_side.ensure_exists().unwrap();
    writer_side.add_bytes("shared_entry", b"visible").unwrap();
    assert_eq!(reader_side.get_bytes("shared_entry").unwrap(), b"visible");
}

#[test]
fn copy_from_canonical_input() {
    let td = tempdir().unwrap();
    let input = common::seeded_input_source(td.path());

    let c = client();
    for dest in [&flat_src(&c) as &dyn FileSource, &hier_src(&c)] {
        let stats = dest.copy_from(&input, true).expect("copy_from");
        assert_eq!(stats.copied, common::FIXTURE.len());
        common::assert_holds_fixture(dest);
    }
}
