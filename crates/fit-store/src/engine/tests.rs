use super::*;
use crate::codec::DecodeLimits;
use fit_core::digest::hash_buffer;
use fit_core::types::BlobRange;
use tempfile::{tempdir, TempDir};

struct Workspace {
    _dir: TempDir,
    root: Utf8PathBuf,
    store_path: Utf8PathBuf,
}

impl Workspace {
    fn new() -> Self {
        let dir = tempdir().unwrap();
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
        let store_path = root.join("test.fit");
        Self {
            _dir: dir,
            root,
            store_path,
        }
    }

    fn create(&self) -> SnapshotEngine {
        SnapshotEngine::create(&self.store_path, StoreOptions::default()).unwrap()
    }

    fn reopen(&self) -> SnapshotEngine {
        SnapshotEngine::open(&self.store_path, StoreOptions::default()).unwrap()
    }

    fn write(&self, name: &str, content: &[u8]) {
        let path = self.root.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    fn read(&self, name: &str) -> Vec<u8> {
        fs::read(self.root.join(name)).unwrap()
    }

    fn remove(&self, name: &str) {
        fs::remove_file(self.root.join(name)).unwrap();
    }
}

fn saved(outcome: SaveOutcome) -> SaveReport {
    match outcome {
        SaveOutcome::Saved(report) => report,
        SaveOutcome::NothingTracked => panic!("expected a snapshot to be saved"),
    }
}

fn kinds(report: &SaveReport) -> Vec<(&str, ChangeKind)> {
    report
        .changes
        .iter()
        .map(|change| (change.path.as_str(), change.kind))
        .collect()
}

fn path(p: &str) -> RecordPath {
    RecordPath::new(p).unwrap()
}

#[test]
fn test_create_persists_empty_store() {
    let ws = Workspace::new();
    let engine = ws.create();
    assert_eq!(engine.state(), EngineState::Persisted);
    assert_eq!(engine.root(), ws.root.as_path());

    let reopened = ws.reopen();
    assert_eq!(reopened.state(), EngineState::Loaded);
    assert_eq!(reopened.store(), &Store::new());
}

#[test]
fn test_create_refuses_existing_file() {
    let ws = Workspace::new();
    ws.create();
    let err = SnapshotEngine::create(&ws.store_path, StoreOptions::default()).unwrap_err();
    assert!(matches!(err, FitError::StoreExists { .. }));
}

#[test]
fn test_open_missing_store_is_io_error() {
    let ws = Workspace::new();
    let err = SnapshotEngine::open(&ws.store_path, StoreOptions::default()).unwrap_err();
    assert!(matches!(err, FitError::Io { .. }));
}

#[test]
fn test_track_does_not_read_file() {
    let ws = Workspace::new();
    let mut engine = ws.create();
    engine.track("not-yet-written.txt").unwrap();

    let reopened = ws.reopen();
    let tracked = reopened.list_tracking();
    assert_eq!(tracked.len(), 1);
    assert_eq!(tracked[0], FileRecord::tracked(path("not-yet-written.txt")));
    assert!(tracked[0].digest.is_empty());
}

#[test]
fn test_track_twice_fails() {
    let ws = Workspace::new();
    let mut engine = ws.create();
    engine.track("a.txt").unwrap();
    let err = engine.track("a.txt").unwrap_err();
    assert!(matches!(err, FitError::AlreadyTracked { .. }));
    assert_eq!(ws.reopen().list_tracking().len(), 1);
}

#[test]
fn test_track_rejects_escaping_paths() {
    let ws = Workspace::new();
    let mut engine = ws.create();
    for bad in ["", "../outside.txt", "/etc/passwd", "dir/../../x"] {
        let err = engine.track(bad).unwrap_err();
        assert!(matches!(err, FitError::InvalidPath { .. }), "{:?} was accepted", bad);
    }
    assert!(engine.list_tracking().is_empty());
}

#[test]
fn test_untrack_unknown_fails() {
    let ws = Workspace::new();
    let mut engine = ws.create();
    engine.track("a.txt").unwrap();
    let err = engine.untrack("b.txt").unwrap_err();
    assert!(matches!(err, FitError::NotTracked { .. }));

    engine.untrack("a.txt").unwrap();
    assert!(ws.reopen().list_tracking().is_empty());
}

#[test]
fn test_save_with_nothing_tracked_creates_no_snapshot() {
    let ws = Workspace::new();
    let mut engine = ws.create();
    assert_eq!(engine.save().unwrap(), SaveOutcome::NothingTracked);
    assert!(ws.reopen().store().snapshots().is_empty());
}

#[test]
fn test_first_save_stores_content() {
    let ws = Workspace::new();
    ws.write("a.txt", b"hello");
    let mut engine = ws.create();
    engine.track("a.txt").unwrap();

    let report = saved(engine.save().unwrap());
    assert_eq!(report.snapshot_index, 0);
    assert_eq!(kinds(&report), [("a.txt", ChangeKind::New)]);
    assert!(report.has_changes());

    let engine = ws.reopen();
    let snapshot = &engine.store().snapshots()[0];
    let record = &snapshot.records()[0];
    assert_eq!(record.range, BlobRange::new(0, 5));
    assert_eq!(record.digest, hash_buffer(b"hello"));
    assert_eq!(engine.store().blob().read(record.range).unwrap(), b"hello");

    // Tracking record mirrors the saved one
    assert_eq!(&engine.list_tracking()[0], record);
}

#[test]
fn test_saving_twice_without_changes() {
    let ws = Workspace::new();
    ws.write("a.txt", b"hello");
    ws.write("b.txt", b"other");
    let mut engine = ws.create();
    engine.track("a.txt").unwrap();
    engine.track("b.txt").unwrap();

    saved(engine.save().unwrap());
    let blob_len = engine.store().blob().len();
    let second = saved(engine.save().unwrap());

    assert!(!second.has_changes());
    assert_eq!(second.count(ChangeKind::Unchanged), 2);
    assert_eq!(engine.store().blob().len(), blob_len);

    let snapshots = engine.store().snapshots();
    assert_eq!(snapshots.len(), 2);
    assert_eq!(snapshots[0], snapshots[1]);
}

#[test]
fn test_changed_file_appends_and_keeps_history() {
    let ws = Workspace::new();
    ws.write("a.txt", b"hello");
    let mut engine = ws.create();
    engine.track("a.txt").unwrap();
    saved(engine.save().unwrap());

    ws.write("a.txt", b"world!");
    let report = saved(engine.save().unwrap());
    assert_eq!(kinds(&report), [("a.txt", ChangeKind::Changed)]);

    let engine = ws.reopen();
    let snapshots = engine.store().snapshots();
    let old = &snapshots[0].records()[0];
    let new = &snapshots[1].records()[0];
    assert_eq!(new.range, BlobRange::new(5, 6));
    assert_ne!(new.digest, old.digest);
    assert_eq!(engine.store().blob().read(old.range).unwrap(), b"hello");
    assert_eq!(engine.store().blob().read(new.range).unwrap(), b"world!");
}

#[test]
fn test_deleted_file_is_dropped() {
    let ws = Workspace::new();
    ws.write("a.txt", b"hello");
    ws.write("b.txt", b"stays");
    let mut engine = ws.create();
    engine.track("a.txt").unwrap();
    engine.track("b.txt").unwrap();
    saved(engine.save().unwrap());

    ws.remove("a.txt");
    let report = saved(engine.save().unwrap());
    assert_eq!(
        kinds(&report),
        [("a.txt", ChangeKind::Deleted), ("b.txt", ChangeKind::Unchanged)]
    );
    assert!(report.has_changes());

    let engine = ws.reopen();
    let tracked: Vec<_> = engine.list_tracking().iter().map(|r| r.path.as_str()).collect();
    assert_eq!(tracked, ["b.txt"]);

    let snapshots = engine.store().snapshots();
    assert_eq!(snapshots[0].len(), 2);
    assert_eq!(snapshots[1].len(), 1);
    assert!(snapshots[1].find(&path("a.txt")).is_none());
}

#[test]
fn test_save_of_unreadable_path_aborts_without_mutation() {
    let ws = Workspace::new();
    ws.write("a.txt", b"hello");
    fs::create_dir(ws.root.join("dir")).unwrap();
    let mut engine = ws.create();
    engine.track("a.txt").unwrap();
    engine.track("dir").unwrap();

    let err = engine.save().unwrap_err();
    assert!(matches!(err, FitError::Io { .. }));
    assert!(engine.store().blob().is_empty());
    assert!(engine.store().snapshots().is_empty());
}

#[test]
fn test_file_under_replaced_directory_is_deleted() {
    let ws = Workspace::new();
    ws.write("dir/a.txt", b"hello");
    ws.write("b.txt", b"stays");
    let mut engine = ws.create();
    engine.track("dir/a.txt").unwrap();
    engine.track("b.txt").unwrap();
    saved(engine.save().unwrap());

    fs::remove_dir_all(ws.root.join("dir")).unwrap();
    ws.write("dir", b"now a plain file");
    let report = saved(engine.save().unwrap());
    assert_eq!(
        kinds(&report),
        [("dir/a.txt", ChangeKind::Deleted), ("b.txt", ChangeKind::Unchanged)]
    );

    let reopened = ws.reopen();
    let tracked: Vec<_> = reopened.list_tracking().iter().map(|r| r.path.as_str()).collect();
    assert_eq!(tracked, ["b.txt"]);
}

#[test]
fn test_save_refuses_to_exceed_blob_limit() {
    let ws = Workspace::new();
    ws.write("a.txt", b"hello");
    let options = StoreOptions {
        limits: DecodeLimits { max_blob_bytes: 8 },
        ..StoreOptions::default()
    };
    let mut engine = SnapshotEngine::create(&ws.store_path, options.clone()).unwrap();
    engine.track("a.txt").unwrap();
    saved(engine.save().unwrap());

    ws.write("a.txt", b"world!");
    let err = engine.save().unwrap_err();
    assert!(matches!(err, FitError::BlobLimitExceeded { size: 11, limit: 8 }));
    assert_eq!(engine.store().blob().len(), 5);
    assert_eq!(engine.store().snapshots().len(), 1);

    let reopened = SnapshotEngine::open(&ws.store_path, options).unwrap();
    assert_eq!(reopened.store(), engine.store());
}

#[test]
fn test_save_at_exact_blob_limit_reopens() {
    let ws = Workspace::new();
    ws.write("a.txt", b"hello");
    let options = StoreOptions {
        limits: DecodeLimits { max_blob_bytes: 5 },
        ..StoreOptions::default()
    };
    let mut engine = SnapshotEngine::create(&ws.store_path, options.clone()).unwrap();
    engine.track("a.txt").unwrap();
    saved(engine.save().unwrap());

    let reopened = SnapshotEngine::open(&ws.store_path, options).unwrap();
    assert_eq!(reopened.store().blob().as_bytes(), b"hello");
}

#[test]
fn test_load_latest_and_by_index() {
    let ws = Workspace::new();
    ws.write("a.txt", b"hello");
    let mut engine = ws.create();
    engine.track("a.txt").unwrap();
    saved(engine.save().unwrap());
    ws.write("a.txt", b"world!");
    saved(engine.save().unwrap());

    ws.write("a.txt", b"scratch");
    let report = engine.load(SnapshotSelector::Latest).unwrap();
    assert_eq!(report.snapshot_index, 1);
    assert_eq!(ws.read("a.txt"), b"world!");

    let report = engine.load(SnapshotSelector::Index(0)).unwrap();
    assert_eq!(report.restored, [path("a.txt")]);
    assert_eq!(ws.read("a.txt"), b"hello");

    // Loading leaves the store untouched
    assert_eq!(ws.reopen().store(), engine.store());
}

#[test]
fn test_load_creates_parent_directories() {
    let ws = Workspace::new();
    ws.write("nested/deep/file.txt", b"content");
    let mut engine = ws.create();
    engine.track("nested/deep/file.txt").unwrap();
    saved(engine.save().unwrap());

    fs::remove_dir_all(ws.root.join("nested")).unwrap();
    engine.load(SnapshotSelector::Latest).unwrap();
    assert_eq!(ws.read("nested/deep/file.txt"), b"content");
}

#[test]
fn test_load_selector_errors() {
    let ws = Workspace::new();
    let mut engine = ws.create();
    assert!(matches!(
        engine.load(SnapshotSelector::Latest),
        Err(FitError::NoSnapshots)
    ));

    ws.write("a.txt", b"hello");
    engine.track("a.txt").unwrap();
    saved(engine.save().unwrap());
    assert!(matches!(
        engine.load(SnapshotSelector::Index(1)),
        Err(FitError::SnapshotOutOfRange { index: 1, count: 1 })
    ));
}

#[test]
fn test_list_snapshots_flags_latest() {
    let ws = Workspace::new();
    ws.write("a.txt", b"hello");
    let mut engine = ws.create();
    assert!(engine.list_snapshots().is_empty());

    engine.track("a.txt").unwrap();
    saved(engine.save().unwrap());
    saved(engine.save().unwrap());

    let listed = engine.list_snapshots();
    let flags: Vec<_> = listed.iter().map(|s| (s.index, s.latest)).collect();
    assert_eq!(flags, [(0, false), (1, true)]);
    assert_eq!(listed[1].records[0].path.as_str(), "a.txt");
}

#[test]
fn test_verify_detects_corruption() {
    let ws = Workspace::new();
    ws.write("a.txt", b"hello");
    let mut engine = ws.create();
    engine.track("a.txt").unwrap();
    saved(engine.save().unwrap());
    assert!(engine.verify().is_clean());

    // Flip the stored bytes on disk: the blob is the tail of the file
    let mut bytes = fs::read(&ws.store_path).unwrap();
    let last = bytes.len() - 1;
    bytes[last] ^= 0xff;
    fs::write(&ws.store_path, bytes).unwrap();

    let report = ws.reopen().verify();
    assert_eq!(report.records_checked, 1);
    assert!(matches!(
        report.issues.as_slice(),
        [VerifyIssue::DigestMismatch { snapshot_index: 0, .. }]
    ));
}

#[test]
fn test_verify_reports_out_of_bounds() {
    let record = FileRecord::stored(path("a.txt"), hash_buffer(b"x"), BlobRange::new(10, 1));
    let store = Store::from_parts(
        vec![fit_core::types::Snapshot::from_records(vec![record])],
        Default::default(),
        Default::default(),
    );
    let ws = Workspace::new();
    store.save_file(&ws.store_path, &StoreOptions::default()).unwrap();

    let engine = ws.reopen();
    let report = engine.verify();
    assert!(matches!(
        report.issues.as_slice(),
        [VerifyIssue::OutOfBounds { blob_len: 0, .. }]
    ));
    assert!(matches!(
        engine.load(SnapshotSelector::Latest),
        Err(FitError::BlobOutOfBounds { .. })
    ));
}

#[test]
fn test_store_relative_to_working_directory_name() {
    let ws = Workspace::new();
    let nested = ws.root.join("sub").join("inner.fit");
    fs::create_dir_all(ws.root.join("sub")).unwrap();
    ws.write("sub/file.txt", b"data");

    let mut engine = SnapshotEngine::create(&nested, StoreOptions::default()).unwrap();
    engine.track("file.txt").unwrap();
    let report = saved(engine.save().unwrap());
    assert_eq!(kinds(&report), [("file.txt", ChangeKind::New)]);
}

#[test]
fn test_decode_limits_apply_on_open() {
    let ws = Workspace::new();
    ws.write("a.txt", b"hello");
    let mut engine = ws.create();
    engine.track("a.txt").unwrap();
    saved(engine.save().unwrap());

    let options = StoreOptions {
        limits: DecodeLimits { max_blob_bytes: 2 },
        ..StoreOptions::default()
    };
    let err = SnapshotEngine::open(&ws.store_path, options).unwrap_err();
    assert!(matches!(err, FitError::Format { .. }));
}

mod property_tests {
    use super::*;
    use proptest::prelude::*;

    #[derive(Debug, Clone)]
    enum Step {
        Write(usize, Vec<u8>),
        Remove(usize),
        Track(usize),
        Untrack(usize),
        Save,
    }

    const NAMES: [&str; 3] = ["a.txt", "b.txt", "dir/c.txt"];

    fn step() -> impl Strategy<Value = Step> {
        prop_oneof![
            (0..NAMES.len(), prop::collection::vec(any::<u8>(), 0..16))
                .prop_map(|(i, content)| Step::Write(i, content)),
            (0..NAMES.len()).prop_map(Step::Remove),
            (0..NAMES.len()).prop_map(Step::Track),
            (0..NAMES.len()).prop_map(Step::Untrack),
            Just(Step::Save),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn persisted_store_matches_memory(steps in prop::collection::vec(step(), 1..24)) {
            let ws = Workspace::new();
            let mut engine = ws.create();

            for step in steps {
                match step {
                    Step::Write(i, content) => ws.write(NAMES[i], &content),
                    Step::Remove(i) => {
                        let _ = fs::remove_file(ws.root.join(NAMES[i]));
                    },
                    Step::Track(i) => {
                        let _ = engine.track(NAMES[i]);
                    },
                    Step::Untrack(i) => {
                        let _ = engine.untrack(NAMES[i]);
                    },
                    Step::Save => {
                        engine.save().unwrap();
                    },
                }
            }

            let reopened = ws.reopen();
            prop_assert_eq!(reopened.store(), engine.store());
            prop_assert!(reopened.verify().is_clean());
        }
    }
}
