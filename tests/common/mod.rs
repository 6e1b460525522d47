//! Backend-agnostic conformance battery.
//!
//! Every backend must pass the same checks with identical externally
//! observable behavior, so a test file for a backend only decides how to
//! construct instances; the battery drives the contract.

#![allow(dead_code)]

use std::io::{Cursor, Read, Write};
use std::path::Path;

use fsource::{FileSource, LayoutMode, LocalFileSource, SourceError};

/// Canonical fixture entries, two dimensions (region, date), pre-sorted by
/// canonical name.
pub const FIXTURE: &[(&str, &[u8])] = &[
    ("eu_2020", b"euro bytes"),
    ("us_2020", b"us bytes"),
    ("us_2021", b"more us bytes"),
];

const ABSENT: &str = "zz_9999";

/// Drives the shared behavioral checks against one FileSource instance.
pub struct SourceBattery;

impl SourceBattery {
    /// Reset the source to exactly the fixture contents.
    pub fn populate(src: &dyn FileSource) {
        src.ensure_exists().expect("ensure_exists");
        src.clear().expect("clear before populate");
        for (name, content) in FIXTURE {
            src.add_bytes(name, content).expect("add fixture entry");
        }
    }

    pub fn check_file_list(src: &dyn FileSource) {
        Self::populate(src);
        let names = src.list_all_names().expect("list_all_names");
        let expected: Vec<&str> = FIXTURE.iter().map(|(n, _)| *n).collect();
        assert_eq!(names, expected, "listing mismatch for {}", src.describe());
    }

    pub fn check_get_bytes(src: &dyn FileSource) {
        Self::populate(src);
        for (name, content) in FIXTURE {
            let got = src.get_bytes(name).expect("get_bytes");
            assert_eq!(&got, content, "byte mismatch for '{name}'");
        }
        let err = src.get_bytes(ABSENT).unwrap_err();
        assert!(err.is_not_found(), "expected NotFound, got {err:?}");
    }

    pub fn check_get_size(src: &dyn FileSource) {
        Self::populate(src);
        for (name, content) in FIXTURE {
            let size = src.size(name).expect("size");
            assert_eq!(size, content.len() as u64, "size mismatch for '{name}'");
        }
        let err = src.size(ABSENT).unwrap_err();
        assert!(err.is_not_found(), "expected NotFound, got {err:?}");
    }

    pub fn check_exists(src: &dyn FileSource) {
        Self::populate(src);
        for (name, _) in FIXTURE {
            assert!(src.exists(name).expect("exists"), "'{name}' should exist");
        }
        assert!(!src.exists(ABSENT).expect("exists on absent"));
    }

    pub fn check_only_if_exists(src: &dyn FileSource) {
        Self::populate(src);
        let (name, content) = &FIXTURE[0];
        let got = src
            .get_bytes_if_exists(name)
            .expect("get_bytes_if_exists present");
        assert_eq!(got.as_deref(), Some(*content));

        // Absence is an explicit None, never an error.
        assert_eq!(src.get_bytes_if_exists(ABSENT).expect("absent"), None);
        assert!(src
            .open_reader_if_exists(ABSENT)
            .expect("open_reader_if_exists absent")
            .is_none());
    }

    pub fn check_get_by_stream(src: &dyn FileSource) {
        Self::populate(src);
        for (name, content) in FIXTURE {
            let mut reader = src.open_reader(name).expect("open_reader");
            let mut got = Vec::new();
            reader.read_to_end(&mut got).expect("read stream");
            assert_eq!(&got, content, "stream bytes mismatch for '{name}'");
        }
        let err = match src.open_reader(ABSENT) {
            Ok(_) => panic!("expected error opening absent"),
            Err(e) => e,
        };
        assert!(err.is_not_found(), "expected NotFound, got {err:?}");
    }

    pub fn check_add_by_stream(src: &dyn FileSource) {
        Self::populate(src);
        let payload = b"streamed payload".to_vec();
        let written = src
            .add_from_reader("in_stream", &mut Cursor::new(payload.clone()))
            .expect("add_from_reader");
        assert_eq!(written, payload.len() as u64);
        assert_eq!(src.get_bytes("in_stream").expect("read back"), payload);
    }

    pub fn check_add_by_writer(src: &dyn FileSource) {
        Self::populate(src);
        {
            let mut writer = src.open_writer("out_stream").expect("open_writer");
            writer.write_all(b"first half, ").expect("write");
            writer.write_all(b"second half").expect("write");
            writer.flush().expect("flush");
        }
        assert_eq!(
            src.get_bytes("out_stream").expect("read back"),
            b"first half, second half"
        );

        // A second writer replaces the whole artifact.
        {
            let mut writer = src.open_writer("out_stream").expect("reopen writer");
            writer.write_all(b"replacement").expect("write");
            writer.flush().expect("flush");
        }
        assert_eq!(src.get_bytes("out_stream").expect("read back"), b"replacement");
    }

    pub fn check_clear(src: &dyn FileSource) {
        Self::populate(src);
        src.clear().expect("clear");
        assert_eq!(src.list_all_names().expect("list after clear"), Vec::<String>::new());
        for (name, _) in FIXTURE {
            assert!(!src.exists(name).expect("exists after clear"));
        }
        // The root container survives: writes work without ensure_exists.
        src.add_bytes("post_clear", b"still here").expect("add after clear");
        assert_eq!(src.list_all_names().expect("list").len(), 1);
    }

    pub fn check_existence_transitions(src: &dyn FileSource) {
        src.ensure_exists().expect("ensure_exists");
        src.clear().expect("clear");
        assert!(!src.exists("fresh_name").expect("exists before add"));
        src.add_bytes("fresh_name", b"v1").expect("add");
        assert!(src.exists("fresh_name").expect("exists after add"));
        src.clear().expect("clear again");
        assert!(!src.exists("fresh_name").expect("exists after clear"));
    }

    pub fn check_invalid_names(src: &dyn FileSource) {
        src.ensure_exists().expect("ensure_exists");
        for bad in ["", "a/b", "..", ".hidden", "a__b"] {
            let err = src.add_bytes(bad, b"x").unwrap_err();
            assert!(
                matches!(err, SourceError::InvalidKey { .. }),
                "expected InvalidKey for {bad:?}, got {err:?}"
            );
        }
    }

    /// Run every check against one instance.
    pub fn run_all(src: &dyn FileSource) {
        Self::check_file_list(src);
        Self::check_get_bytes(src);
        Self::check_get_size(src);
        Self::check_exists(src);
        Self::check_only_if_exists(src);
        Self::check_get_by_stream(src);
        Self::check_add_by_stream(src);
        Self::check_add_by_writer(src);
        Self::check_clear(src);
        Self::check_existence_transitions(src);
        Self::check_invalid_names(src);
    }
}

/// One canonical input source used by every cross-backend copy check:
/// a hierarchical local tree seeded with the fixture.
pub fn seeded_input_source(dir: &Path) -> LocalFileSource {
    let src = LocalFileSource::new(dir.join("copy-input"), LayoutMode::Hierarchical);
    SourceBattery::populate(&src);
    src
}

/// Verify a copy destination holds exactly the fixture.
pub fn assert_holds_fixture(src: &dyn FileSource) {
    let names = src.list_all_names().expect("list destination");
    let expected: Vec<&str> = FIXTURE.iter().map(|(n, _)| *n).collect();
    assert_eq!(names, expected, "destination listing mismatch");
    for (name, content) in FIXTURE {
        assert_eq!(
            src.get_bytes(name).expect("destination bytes"),
            *content,
            "destination byte mismatch for '{name}'"
        );
    }
}
