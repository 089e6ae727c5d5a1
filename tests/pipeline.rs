//! End-to-end: files on disk → records → group → composed table → stats.

use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use rusty_spectra::data::config::OutputConfig;
use rusty_spectra::data::read_spec::ReadSpec;
use rusty_spectra::data::{ParseError, Record, RecordStore, SpectError};

const SENTINEL: &str = ">>>>>Begin Spectral Data<<<<<";

fn write_spectrum(dir: &Path, name: &str, rows: &[(f64, f64)]) -> PathBuf {
    let mut text = String::from("Data from ");
    text.push_str(name);
    text.push_str("\nIntegration Time (sec): 1.000000E-1\n");
    text.push_str(SENTINEL);
    text.push('\n');
    for (wl, v) in rows {
        text.push_str(&format!("{wl}\t{v}\n"));
    }
    let path = dir.join(name);
    fs::write(&path, text).unwrap();
    path
}

#[test]
fn loads_metadata_and_rows_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sample.txt");
    fs::write(&path, "first\nsecond\nBEGIN\n1\t10\n2\t20\n3\t30\n").unwrap();

    let spec = ReadSpec::default().with_sentinel("BEGIN\n");
    let record = Record::from_file(&path, &spec).unwrap();
    assert_eq!(record.metadata_lines().len(), 2);
    assert_eq!(record.len(), 3);
    assert_eq!(record.source(), Some(path.as_path()));
}

#[test]
fn malformed_row_produces_no_record() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.txt");
    fs::write(&path, "BEGIN\n1\t10\n2\n").unwrap();

    let spec = ReadSpec::default().with_sentinel("BEGIN");
    let mut record = Record::with_source(&path);
    let err = record.load(&spec).unwrap_err();
    match err {
        SpectError::Parse { path: p, source } => {
            assert_eq!(p, path);
            assert_eq!(source, ParseError::RowShape { line: 3, found: 1 });
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(!record.is_loaded());
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = Record::from_file(dir.path().join("nope.txt"), &ReadSpec::default()).unwrap_err();
    assert!(matches!(err, SpectError::Io { .. }));
}

#[test]
fn group_from_files_composes_common_wavelengths() {
    let dir = tempfile::tempdir().unwrap();
    let a = write_spectrum(dir.path(), "a.txt", &[(1.0, 1.0), (2.0, 2.0), (3.0, 3.0)]);
    let b = write_spectrum(dir.path(), "b.txt", &[(2.0, 4.0), (3.0, 6.0), (4.0, 8.0)]);
    let c = write_spectrum(dir.path(), "c.txt", &[(1.0, 0.0), (2.0, 0.0), (3.0, 0.0), (4.0, 0.0)]);

    let store = RecordStore::from_files(
        &[(a, None), (b, Some("B".to_string())), (c, None)],
        &ReadSpec::default(),
        "Trio",
        OutputConfig::in_dir(dir.path()),
    )
    .unwrap();

    let composed = store.compose().unwrap();
    assert_eq!(composed.keys(), [2.0, 3.0]);
    assert_eq!(composed.width(), 3);

    let stats = store.stats().unwrap();
    assert_eq!(stats.min, vec![0.0, 0.0]);
    assert_eq!(stats.max, vec![4.0, 6.0]);
    assert_eq!(stats.mean, vec![2.0, 3.0]);
    assert!((stats.std[0] - 2.0).abs() < 1e-12);

    assert_eq!(store.record(1).unwrap().borrow().legend_name(), "B");
    assert_eq!(store.record(0).unwrap().borrow().legend_name(), "a");
}

#[test]
fn single_record_stats_have_undefined_std() {
    let record = Record::from_columns(vec![1.0], vec![5.0]).unwrap().into_shared();
    let store = RecordStore::with_records(vec![record], "One", OutputConfig::default());
    let row = store.stats().unwrap().row(0).unwrap();
    assert_eq!((row.min, row.max, row.mean), (5.0, 5.0, 5.0));
    assert!(row.std.is_nan());
}

#[test]
fn reload_from_disk_invalidates_parent_and_subgroups() {
    let dir = tempfile::tempdir().unwrap();
    let a = write_spectrum(dir.path(), "a.txt", &[(1.0, 1.0), (2.0, 2.0)]);
    let b = write_spectrum(dir.path(), "b.txt", &[(1.0, 3.0), (2.0, 4.0)]);
    let spec = ReadSpec::default();

    let store = RecordStore::from_files(
        &[(a.clone(), None), (b, None)],
        &spec,
        "Pair",
        OutputConfig::default(),
    )
    .unwrap();
    let subs = store.subgroup(&[vec![0], vec![0, 1]]).unwrap();
    let before = store.stats().unwrap();
    for sub in &subs {
        sub.stats().unwrap();
    }

    write_spectrum(dir.path(), "a.txt", &[(1.0, 11.0), (2.0, 12.0)]);
    store.record(0).unwrap().borrow_mut().load(&spec).unwrap();

    assert!(!store.is_stats());
    assert!(subs.iter().all(|s| !s.is_composed()));
    let after = store.stats().unwrap();
    assert!(!Rc::ptr_eq(&before, &after));
    assert_eq!(after.mean, vec![7.0, 8.0]);
    assert_eq!(subs[0].compose().unwrap().column("Exp_0").unwrap().values, vec![11.0, 12.0]);
}

#[test]
fn group_from_definition_file() {
    let dir = tempfile::tempdir().unwrap();
    for i in 1..=3 {
        write_spectrum(dir.path(), &format!("run_{i}.txt"), &[(500.0, i as f64), (501.0, 2.0 * i as f64)]);
    }
    let def_path = dir.path().join("group.json");
    fs::write(
        &def_path,
        r#"{
            "runs": {"sourceFile": "run_{}.txt", "outputPath": "out", "name": "Run {}", "range": [1, 3]}
        }"#,
    )
    .unwrap();

    let store = RecordStore::from_definition(&def_path, "Runs", OutputConfig::default()).unwrap();
    assert_eq!(store.len(), 3);
    assert_eq!(store.record(2).unwrap().borrow().name(), Some("Run 3"));
    assert_eq!(store.stats().unwrap().mean, vec![2.0, 4.0]);
}
