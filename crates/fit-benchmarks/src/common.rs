//! Common utilities for benchmarks

use camino::{Utf8Path, Utf8PathBuf};
use criterion::Criterion;
use fit_store::{SnapshotEngine, StoreOptions};
use pprof::criterion::{Output, PProfProfiler};
use tempfile::TempDir;

/// Configure criterion with flamegraph profiling support
pub fn criterion_config() -> Criterion {
    Criterion::default()
        .warm_up_time(std::time::Duration::from_secs(3))
        .measurement_time(std::time::Duration::from_secs(10))
        .sample_size(100)
        .with_profiler(PProfProfiler::new(100, Output::Flamegraph(None)))
}

/// Deterministic, poorly compressible test content
pub fn create_test_content(size: usize) -> Vec<u8> {
    let mut state = 0x2545_f491_u32;
    (0..size)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            state as u8
        })
        .collect()
}

/// A fresh store whose directory holds `file_count` tracked files
pub struct BenchStore {
    pub dir: TempDir,
    pub root: Utf8PathBuf,
    pub engine: SnapshotEngine,
    pub files: Vec<String>,
}

impl BenchStore {
    pub fn new(file_count: usize, file_size: usize) -> Self {
        let dir = tempfile::tempdir().expect("create bench directory");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("UTF-8 temp path");
        let mut engine = SnapshotEngine::create(root.join("bench.fit"), StoreOptions::default())
            .expect("create bench store");

        let mut files = Vec::with_capacity(file_count);
        for i in 0..file_count {
            let name = format!("file_{:04}.bin", i);
            let mut content = create_test_content(file_size);
            content.extend_from_slice(name.as_bytes());
            std::fs::write(root.join(&name), content).expect("write bench file");
            engine.track(&name).expect("track bench file");
            files.push(name);
        }

        Self {
            dir,
            root,
            engine,
            files,
        }
    }
}

/// Rewrite every `stride`-th file so the next save sees it as changed
pub fn rewrite_files(root: &Utf8Path, files: &[String], stride: usize, generation: u64) {
    for name in files.iter().step_by(stride.max(1)) {
        let mut content = create_test_content(64);
        content.extend_from_slice(&generation.to_le_bytes());
        std::fs::write(root.join(name), content).expect("rewrite bench file");
    }
}
