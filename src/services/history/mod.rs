use std::fs;
use std::io::Write;
use std::path::Path;

use serde::Serialize;

use crate::core::errors::{Error, Result};
use crate::models::operation::{OpKind, Operation};
use crate::services::fs::ops::FileOps;

/// Replayable, reversible history of completed file actions.
///
/// Entries before the cursor are applied and undoable; entries at or after
/// the cursor are reverted and redoable. Recording a new operation after an
/// undo discards the redo branch (classic linear history). The log itself
/// never touches the file system on `record` or `clear`; undo and redo
/// mutate it only through the supplied [`FileOps`].
///
/// Single interactive session by contract: callers running file work off the
/// main thread must serialize access themselves.
#[derive(Default)]
pub struct OperationLog {
    entries: Vec<Operation>,
    cursor: usize,
    next_seq: u64,
}

/// Snapshot of the log written by [`OperationLog::write_summary`].
#[derive(Serialize)]
struct Summary<'a> {
    cursor: usize,
    entries: &'a [Operation],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PathState {
    Missing,
    File,
    Dir,
}

fn probe(path: &Path) -> PathState {
    match fs::symlink_metadata(path) {
        Ok(md) if md.is_dir() => PathState::Dir,
        Ok(_) => PathState::File,
        Err(_) => PathState::Missing,
    }
}

/// Undo precondition: the inverse action's target must still exist, with the
/// same file-vs-directory type it had when recorded.
fn expect_present(path: &Path, want_dir: Option<bool>) -> Result<()> {
    let stale = |reason| Error::StaleOperation {
        path: path.to_path_buf(),
        reason,
    };
    match (probe(path), want_dir) {
        (PathState::Missing, _) => Err(stale("target no longer exists")),
        (PathState::Dir, Some(false)) => Err(stale("target changed from file to directory")),
        (PathState::File, Some(true)) => Err(stale("target changed from directory to file")),
        _ => Ok(()),
    }
}

/// Undo precondition: the path the inverse action writes to must be free.
fn expect_absent(path: &Path) -> Result<()> {
    if probe(path) == PathState::Missing {
        Ok(())
    } else {
        Err(Error::StaleOperation {
            path: path.to_path_buf(),
            reason: "path is unexpectedly occupied",
        })
    }
}

/// Redo precondition: the forward action's input must exist again.
fn require_for_redo(path: &Path) -> Result<()> {
    if probe(path) == PathState::Missing {
        Err(Error::Conflict(path.to_path_buf()))
    } else {
        Ok(())
    }
}

/// Redo precondition: the forward destination must not have been taken.
fn require_free_for_redo(path: &Path) -> Result<()> {
    if probe(path) == PathState::Missing {
        Ok(())
    } else {
        Err(Error::Conflict(path.to_path_buf()))
    }
}

impl OperationLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a completed operation at the cursor, discarding any redo
    /// branch, and returns the sequence number assigned to it.
    ///
    /// The caller must already have performed the forward action; `record`
    /// only validates the operation's shape and snapshots the type of its
    /// result for later staleness checks.
    pub fn record(&mut self, op: Operation) -> Result<u64> {
        op.validate()?;

        if self.cursor < self.entries.len() {
            tracing::debug!(
                "discarding {} redoable entries past the cursor",
                self.entries.len() - self.cursor
            );
            self.entries.truncate(self.cursor);
        }

        let mut op = op;
        op.seq = self.next_seq;
        self.next_seq += 1;
        op.applied = true;
        op.target_is_dir = match op.forward_result_path().map(probe) {
            Some(PathState::File) => Some(false),
            Some(PathState::Dir) => Some(true),
            _ => None,
        };

        tracing::debug!("recorded {} op #{}", op.kind.as_str(), op.seq);
        let seq = op.seq;
        self.entries.push(op);
        self.cursor = self.entries.len();
        Ok(seq)
    }

    /// Reverses the most recent applied operation.
    ///
    /// Verifies against the live file system that the inverse action is
    /// still safe; any mismatch fails with [`Error::StaleOperation`] and
    /// leaves the log untouched for manual resolution. On success the
    /// cursor moves back and the reversed operation is returned for UI
    /// feedback.
    pub fn undo(&mut self, fs_ops: &dyn FileOps) -> Result<Operation> {
        if self.cursor == 0 {
            return Err(Error::NothingToUndo);
        }

        let entry = &self.entries[self.cursor - 1];
        let mut reversed = match entry.kind {
            OpKind::Copy => {
                let dest = entry.dest()?;
                expect_present(dest, entry.target_is_dir)?;
                let backup = fs_ops.delete(dest)?;
                Operation::delete(dest, backup)
            }
            OpKind::Move => {
                let dest = entry.dest()?;
                expect_present(dest, entry.target_is_dir)?;
                expect_absent(&entry.source_path)?;
                fs_ops.move_path(dest, &entry.source_path)?;
                Operation::move_to(dest, &entry.source_path)
            }
            OpKind::Delete => {
                let backup = entry.backup()?;
                expect_present(backup, entry.target_is_dir)?;
                expect_absent(&entry.source_path)?;
                fs_ops.move_path(backup, &entry.source_path)?;
                Operation::move_to(backup, &entry.source_path)
            }
            OpKind::Rename => {
                let dest = entry.dest()?;
                let old_name = entry
                    .source_path
                    .file_name()
                    .ok_or(Error::InvalidOperation("rename source has no file name"))?;
                expect_present(dest, entry.target_is_dir)?;
                expect_absent(&entry.source_path)?;
                fs_ops.rename(dest, old_name)?;
                Operation::rename(dest, &entry.source_path)
            }
        };

        self.cursor -= 1;
        let entry = &mut self.entries[self.cursor];
        entry.applied = false;
        reversed.seq = entry.seq;
        tracing::info!("undid {} op #{}", entry.kind.as_str(), entry.seq);
        Ok(reversed)
    }

    /// Re-applies the operation at the cursor.
    ///
    /// Re-verifies the forward preconditions; any mismatch fails with
    /// [`Error::Conflict`] and leaves the log untouched. A re-applied
    /// delete refreshes the entry's backup path.
    pub fn redo(&mut self, fs_ops: &dyn FileOps) -> Result<Operation> {
        if self.cursor == self.entries.len() {
            return Err(Error::NothingToRedo);
        }

        let entry = &self.entries[self.cursor];
        let mut new_backup = None;
        match entry.kind {
            OpKind::Copy => {
                let dest = entry.dest()?;
                require_for_redo(&entry.source_path)?;
                require_free_for_redo(dest)?;
                fs_ops.copy(&entry.source_path, dest)?;
            }
            OpKind::Move => {
                let dest = entry.dest()?;
                require_for_redo(&entry.source_path)?;
                require_free_for_redo(dest)?;
                fs_ops.move_path(&entry.source_path, dest)?;
            }
            OpKind::Delete => {
                require_for_redo(&entry.source_path)?;
                new_backup = Some(fs_ops.delete(&entry.source_path)?);
            }
            OpKind::Rename => {
                let dest = entry.dest()?;
                let new_name = dest
                    .file_name()
                    .ok_or(Error::InvalidOperation("rename target has no file name"))?;
                require_for_redo(&entry.source_path)?;
                require_free_for_redo(dest)?;
                fs_ops.rename(&entry.source_path, new_name)?;
            }
        }

        let entry = &mut self.entries[self.cursor];
        if let Some(backup) = new_backup {
            entry.backup_path = Some(backup);
        }
        entry.applied = true;
        self.cursor += 1;
        tracing::info!("redid {} op #{}", entry.kind.as_str(), entry.seq);
        Ok(entry.clone())
    }

    /// Empties the log. Irreversible; the file system is not touched.
    pub fn clear(&mut self) {
        tracing::debug!("cleared {} entries", self.entries.len());
        self.entries.clear();
        self.cursor = 0;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor < self.entries.len()
    }

    pub fn entries(&self) -> &[Operation] {
        &self.entries
    }

    /// Writes a JSON report of the current history, for user-facing summary
    /// exports. This is not a persistence format.
    pub fn write_summary<W: Write>(&self, writer: W) -> Result<()> {
        let summary = Summary {
            cursor: self.cursor,
            entries: &self.entries,
        };
        serde_json::to_writer_pretty(writer, &summary)
            .map_err(|e| Error::Other(format!("failed to write summary: {e}")))
    }
}
