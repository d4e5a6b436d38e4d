use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::core::errors::{Error, Result};

/// The kind of a completed file action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OpKind {
    Copy,
    Move,
    Delete,
    Rename,
}

impl OpKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OpKind::Copy => "copy",
            OpKind::Move => "move",
            OpKind::Delete => "delete",
            OpKind::Rename => "rename",
        }
    }
}

/// A single completed, reversible file action.
///
/// An `Operation` describes an action that has already been performed on the
/// file system; recording one in the log never touches the disk. `seq` is an
/// insertion-order sequence number assigned by the log, and `applied` tracks
/// whether the forward effect is currently in effect.
#[derive(Debug, Clone, Serialize)]
pub struct Operation {
    pub kind: OpKind,
    pub source_path: PathBuf,
    pub dest_path: Option<PathBuf>,
    pub backup_path: Option<PathBuf>,
    pub seq: u64,
    pub applied: bool,
    /// File-vs-directory type of the forward result, captured at record time.
    pub target_is_dir: Option<bool>,
}

impl Operation {
    fn new(kind: OpKind, source_path: PathBuf) -> Self {
        Self {
            kind,
            source_path,
            dest_path: None,
            backup_path: None,
            seq: 0,
            applied: false,
            target_is_dir: None,
        }
    }

    /// A copy of `src` that now exists at `dst`.
    pub fn copy(src: impl Into<PathBuf>, dst: impl Into<PathBuf>) -> Self {
        let mut op = Self::new(OpKind::Copy, src.into());
        op.dest_path = Some(dst.into());
        op
    }

    /// A move of `src` to `dst`.
    pub fn move_to(src: impl Into<PathBuf>, dst: impl Into<PathBuf>) -> Self {
        let mut op = Self::new(OpKind::Move, src.into());
        op.dest_path = Some(dst.into());
        op
    }

    /// A deletion of `path` whose contents were saved at `backup`.
    pub fn delete(path: impl Into<PathBuf>, backup: impl Into<PathBuf>) -> Self {
        let mut op = Self::new(OpKind::Delete, path.into());
        op.backup_path = Some(backup.into());
        op
    }

    /// A rename of `from` to the sibling path `to`.
    pub fn rename(from: impl Into<PathBuf>, to: impl Into<PathBuf>) -> Self {
        let mut op = Self::new(OpKind::Rename, from.into());
        op.dest_path = Some(to.into());
        op
    }

    /// Checks that the paths required by this operation's kind are present.
    pub(crate) fn validate(&self) -> Result<()> {
        match self.kind {
            OpKind::Copy if self.dest_path.is_none() => {
                Err(Error::InvalidOperation("copy requires a destination path"))
            }
            OpKind::Move if self.dest_path.is_none() => {
                Err(Error::InvalidOperation("move requires a destination path"))
            }
            OpKind::Delete if self.backup_path.is_none() => {
                Err(Error::InvalidOperation("delete requires a backup path"))
            }
            OpKind::Rename if self.dest_path.is_none() => {
                Err(Error::InvalidOperation("rename requires the renamed path"))
            }
            OpKind::Rename if self.source_path.file_name().is_none() => {
                Err(Error::InvalidOperation("rename source has no file name"))
            }
            _ => Ok(()),
        }
    }

    /// The path where the forward effect of this operation lives.
    pub(crate) fn forward_result_path(&self) -> Option<&Path> {
        match self.kind {
            OpKind::Copy | OpKind::Move | OpKind::Rename => self.dest_path.as_deref(),
            OpKind::Delete => self.backup_path.as_deref(),
        }
    }

    pub(crate) fn dest(&self) -> Result<&Path> {
        self.dest_path
            .as_deref()
            .ok_or(Error::InvalidOperation("missing destination path"))
    }

    pub(crate) fn backup(&self) -> Result<&Path> {
        self.backup_path
            .as_deref()
            .ok_or(Error::InvalidOperation("missing backup path"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_rejects_move_without_destination() {
        let op = Operation::new(OpKind::Move, PathBuf::from("/a"));
        assert!(matches!(op.validate(), Err(Error::InvalidOperation(_))));
    }

    #[test]
    fn validate_rejects_delete_without_backup() {
        let op = Operation::new(OpKind::Delete, PathBuf::from("/a"));
        assert!(matches!(op.validate(), Err(Error::InvalidOperation(_))));
    }

    #[test]
    fn validate_accepts_well_formed_operations() {
        assert!(Operation::copy("/a", "/b").validate().is_ok());
        assert!(Operation::move_to("/a", "/b").validate().is_ok());
        assert!(Operation::delete("/a", "/tmp/a.bak").validate().is_ok());
        assert!(Operation::rename("/dir/a", "/dir/b").validate().is_ok());
    }
}
