//! Unit tests for CLI commands.

use super::*;
use fit_core::digest::hash_buffer;
use fit_core::error::FitError;
use std::fs;
use tempfile::TempDir;

/// Create a test command context in a temporary directory
fn create_test_context() -> (TempDir, CommandContext) {
    let temp_dir = tempfile::tempdir().unwrap();
    let cwd = Utf8PathBuf::from_path_buf(temp_dir.path().to_path_buf()).unwrap();
    let ctx = CommandContext {
        cwd,
        output: OutputHandler::captured(),
        config: FitConfig::default(),
    };
    (temp_dir, ctx)
}

fn store() -> &'static Utf8Path {
    Utf8Path::new("notes.fit")
}

fn write(ctx: &CommandContext, name: &str, content: &str) {
    let path = ctx.cwd.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

fn run(ctx: &CommandContext, command: Commands) -> FitResult<()> {
    dispatch_command(command, ctx)
}

#[test]
fn test_create_appends_extension() {
    let (_dir, ctx) = create_test_context();
    create::execute(Utf8Path::new("notes"), &ctx).unwrap();

    assert!(ctx.cwd.join("notes.fit").is_file());
    assert_eq!(
        ctx.output.lines(),
        ["✓ Successfully created the notes.fit file store."]
    );
}

#[test]
fn test_create_uses_configured_extension() {
    let (_dir, mut ctx) = create_test_context();
    ctx.config.extension = "snap".to_string();
    create::execute(Utf8Path::new("notes"), &ctx).unwrap();
    assert!(ctx.cwd.join("notes.snap").is_file());
}

#[test]
fn test_create_always_appends_extension() {
    let (_dir, ctx) = create_test_context();
    create::execute(Utf8Path::new("notes.fit"), &ctx).unwrap();
    assert!(ctx.cwd.join("notes.fit.fit").is_file());
    assert!(!ctx.cwd.join("notes.fit").exists());
}

#[test]
fn test_create_refuses_existing_store() {
    let (_dir, ctx) = create_test_context();
    create::execute(Utf8Path::new("notes"), &ctx).unwrap();
    let err = create::execute(Utf8Path::new("notes"), &ctx).unwrap_err();
    assert!(matches!(err, FitError::StoreExists { .. }));
    assert_eq!(err.exit_code(), 2);
}

#[test]
fn test_commands_on_missing_store_fail_with_io() {
    let (_dir, ctx) = create_test_context();
    let err = tracklist::execute(store(), &ctx).unwrap_err();
    assert!(matches!(err, FitError::Io { .. }));
    assert_eq!(err.exit_code(), 1);
}

#[test]
fn test_track_and_tracklist() {
    let (_dir, ctx) = create_test_context();
    create::execute(Utf8Path::new("notes"), &ctx).unwrap();
    track::execute(store(), "a.txt", &ctx).unwrap();

    let err = track::execute(store(), "a.txt", &ctx).unwrap_err();
    assert!(matches!(err, FitError::AlreadyTracked { .. }));

    tracklist::execute(store(), &ctx).unwrap();
    let lines = ctx.output.lines();
    assert!(lines[1].starts_with("The file [a.txt] is now being tracked by the store ["));
    assert_eq!(lines.last().unwrap(), "[0] a.txt []");
}

#[test]
fn test_untrack_messages() {
    let (_dir, ctx) = create_test_context();
    create::execute(Utf8Path::new("notes"), &ctx).unwrap();
    track::execute(store(), "a.txt", &ctx).unwrap();
    untrack::execute(store(), "a.txt", &ctx).unwrap();
    assert_eq!(
        ctx.output.lines().last().unwrap(),
        "Removing [a.txt] from the tracking list."
    );

    let err = untrack::execute(store(), "a.txt", &ctx).unwrap_err();
    assert!(matches!(err, FitError::NotTracked { .. }));
}

#[test]
fn test_save_report_lines() {
    let (_dir, ctx) = create_test_context();
    create::execute(Utf8Path::new("notes"), &ctx).unwrap();
    write(&ctx, "a.txt", "hello");
    write(&ctx, "b.txt", "bye");
    track::execute(store(), "a.txt", &ctx).unwrap();
    track::execute(store(), "b.txt", &ctx).unwrap();

    save::execute(store(), &ctx).unwrap();
    let lines = ctx.output.lines();
    assert!(lines.contains(&" - A new file [*a.txt] has been added to the store.".to_string()));
    assert_eq!(lines.last().unwrap(), "✓ Saved snapshot [0] to the file store.");

    write(&ctx, "a.txt", "world!");
    fs::remove_file(ctx.cwd.join("b.txt")).unwrap();
    save::execute(store(), &ctx).unwrap();
    let lines = ctx.output.lines();
    assert!(lines.iter().any(|l| l.starts_with(" - A file [*a.txt] has changed")));
    assert!(lines
        .iter()
        .any(|l| l.contains("[b.txt] has been renamed or deleted")));
    assert_eq!(lines.last().unwrap(), "✓ Saved snapshot [1] to the file store.");
}

#[test]
fn test_save_without_changes() {
    let (_dir, ctx) = create_test_context();
    create::execute(Utf8Path::new("notes"), &ctx).unwrap();
    write(&ctx, "a.txt", "hello");
    track::execute(store(), "a.txt", &ctx).unwrap();
    save::execute(store(), &ctx).unwrap();
    save::execute(store(), &ctx).unwrap();

    let lines = ctx.output.lines();
    let tail = &lines[lines.len() - 2..];
    assert_eq!(tail[0], "No files have changes since the last snapshot.");
    assert_eq!(tail[1], "✓ Saved snapshot [1] to the file store.");
}

#[test]
fn test_save_with_nothing_tracked() {
    let (_dir, ctx) = create_test_context();
    create::execute(Utf8Path::new("notes"), &ctx).unwrap();
    save::execute(store(), &ctx).unwrap();
    assert!(ctx
        .output
        .lines()
        .last()
        .unwrap()
        .contains("There are no currently tracked files"));

    snaps::execute(store(), &ctx).unwrap();
    assert_eq!(
        ctx.output.lines().last().unwrap(),
        "There are no saved snapshots to look at."
    );
}

#[test]
fn test_snaps_listing() {
    let (_dir, ctx) = create_test_context();
    create::execute(Utf8Path::new("notes"), &ctx).unwrap();
    write(&ctx, "a.txt", "hello");
    track::execute(store(), "a.txt", &ctx).unwrap();
    save::execute(store(), &ctx).unwrap();
    write(&ctx, "a.txt", "world!");
    save::execute(store(), &ctx).unwrap();

    let before = ctx.output.lines().len();
    snaps::execute(store(), &ctx).unwrap();
    let lines = ctx.output.lines()[before..].to_vec();
    assert_eq!(
        lines,
        [
            "------ notes.fit | Snapshot [0] ------".to_string(),
            format!(" - [a.txt] [{}]", hash_buffer(b"hello")),
            String::new(),
            "------ notes.fit | Snapshot [1] [LATEST] ------".to_string(),
            format!(" - [a.txt] [{}]", hash_buffer(b"world!")),
            String::new(),
        ]
    );
}

#[test]
fn test_load_latest_and_index() {
    let (_dir, ctx) = create_test_context();
    create::execute(Utf8Path::new("notes"), &ctx).unwrap();
    write(&ctx, "docs/a.txt", "hello");
    track::execute(store(), "docs/a.txt", &ctx).unwrap();
    save::execute(store(), &ctx).unwrap();
    write(&ctx, "docs/a.txt", "world!");
    save::execute(store(), &ctx).unwrap();

    load::execute(store(), Some(0), &ctx).unwrap();
    assert_eq!(fs::read_to_string(ctx.cwd.join("docs/a.txt")).unwrap(), "hello");
    assert_eq!(
        ctx.output.lines().last().unwrap(),
        "✓ Successfully loaded snapshot 0"
    );

    load::execute(store(), None, &ctx).unwrap();
    assert_eq!(fs::read_to_string(ctx.cwd.join("docs/a.txt")).unwrap(), "world!");

    let err = load::execute(store(), Some(5), &ctx).unwrap_err();
    assert!(matches!(err, FitError::SnapshotOutOfRange { index: 5, count: 2 }));
}

#[test]
fn test_verify_clean_and_corrupt() {
    let (_dir, ctx) = create_test_context();
    create::execute(Utf8Path::new("notes"), &ctx).unwrap();
    write(&ctx, "a.txt", "hello");
    track::execute(store(), "a.txt", &ctx).unwrap();
    save::execute(store(), &ctx).unwrap();

    verify::execute(store(), &ctx).unwrap();
    assert_eq!(
        ctx.output.lines().last().unwrap(),
        "✓ Verified 1 record(s) across 1 snapshot(s)."
    );

    let path = ctx.cwd.join("notes.fit");
    let mut bytes = fs::read(&path).unwrap();
    let last = bytes.len() - 1;
    bytes[last] ^= 0x20;
    fs::write(&path, bytes).unwrap();

    let before = ctx.output.lines().len();
    let err = verify::execute(store(), &ctx).unwrap_err();
    assert_eq!(err.exit_code(), 3);
    let issues = ctx.output.lines()[before..].to_vec();
    assert_eq!(issues.len(), 1);
    assert!(issues[0].starts_with("✗ "));
    assert!(issues[0].contains("a.txt"));
}

#[test]
fn test_dispatch_routes_commands() {
    let (_dir, ctx) = create_test_context();
    run(
        &ctx,
        Commands::Create {
            name: "notes".into(),
            extension: None,
        },
    )
    .unwrap();
    let err = run(
        &ctx,
        Commands::Track {
            store: store().to_path_buf(),
            path: "../escape.txt".to_string(),
        },
    )
    .unwrap_err();
    assert!(matches!(err, FitError::InvalidPath { .. }));
}

#[test]
fn test_store_options_follow_config() {
    let (_dir, mut ctx) = create_test_context();
    ctx.config.atomic_writes = false;
    ctx.config.max_blob_bytes = 16;
    let options = ctx.store_options();
    assert!(!options.atomic_writes);
    assert_eq!(options.limits.max_blob_bytes, 16);
}
