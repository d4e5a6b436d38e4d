use anyhow::Result;
use blazefox::services::fs::ops::{DiskFileOps, FileOps};
use blazefox::{Operation, OperationLog};
use std::fs;
use tempfile::tempdir;

#[test]
fn test_full_session_workflow() -> Result<()> {
    blazefox::core::telemetry::logging::init_logging();
    let temp_root = tempdir()?;
    let work = temp_root.path().join("work");
    fs::create_dir_all(&work)?;

    let fs_ops = DiskFileOps::new(temp_root.path().join("backups"))?;
    let mut log = OperationLog::new();

    // A short interactive session: copy a file, move another, delete a third.
    let report = work.join("report.txt");
    let notes = work.join("notes.txt");
    let scratch = work.join("scratch.txt");
    fs::write(&report, "quarterly numbers")?;
    fs::write(&notes, "meeting notes")?;
    fs::write(&scratch, "temporary")?;

    let report_copy = work.join("report-copy.txt");
    fs_ops.copy(&report, &report_copy)?;
    log.record(Operation::copy(&report, &report_copy))?;

    let archived_notes = work.join("archive").join("notes.txt");
    fs_ops.move_path(&notes, &archived_notes)?;
    log.record(Operation::move_to(&notes, &archived_notes))?;

    let backup = fs_ops.delete(&scratch)?;
    log.record(Operation::delete(&scratch, &backup))?;

    assert_eq!(log.len(), 3);
    assert_eq!(log.cursor(), 3);

    // Unwind the whole session.
    while log.can_undo() {
        log.undo(&fs_ops)?;
    }
    assert_eq!(log.cursor(), 0);
    assert!(!report_copy.exists());
    assert_eq!(fs::read_to_string(&notes)?, "meeting notes");
    assert!(!archived_notes.exists());
    assert_eq!(fs::read_to_string(&scratch)?, "temporary");

    // And replay it.
    while log.can_redo() {
        log.redo(&fs_ops)?;
    }
    assert_eq!(log.cursor(), 3);
    assert_eq!(fs::read_to_string(&report_copy)?, "quarterly numbers");
    assert_eq!(fs::read_to_string(&archived_notes)?, "meeting notes");
    assert!(!scratch.exists());
    Ok(())
}

#[test]
fn test_stale_undo_leaves_session_recoverable() -> Result<()> {
    let temp_root = tempdir()?;
    let work = temp_root.path().join("work");
    fs::create_dir_all(&work)?;

    let fs_ops = DiskFileOps::new(temp_root.path().join("backups"))?;
    let mut log = OperationLog::new();

    let original = work.join("draft.txt");
    let copy = work.join("draft-copy.txt");
    fs::write(&original, "draft")?;
    fs_ops.copy(&original, &copy)?;
    log.record(Operation::copy(&original, &copy))?;

    // An external program removes the copy; undo must refuse without
    // corrupting the log.
    fs::remove_file(&copy)?;
    assert!(log.undo(&fs_ops).is_err());
    assert_eq!(log.cursor(), 1);

    // The user resolves the situation by clearing the history and moving on.
    log.clear();
    assert!(log.is_empty());

    let renamed = fs_ops.rename(&original, std::ffi::OsStr::new("final.txt"))?;
    log.record(Operation::rename(&original, &renamed))?;
    log.undo(&fs_ops)?;
    assert!(original.exists());
    Ok(())
}
