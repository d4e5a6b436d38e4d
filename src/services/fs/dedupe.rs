use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use sha2::{Digest, Sha256};
use walkdir::WalkDir;

pub const DEFAULT_CHUNK_SIZE: usize = 1 << 20;

/// Content hash used to confirm that two same-size files are identical.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashAlgo {
    Blake3,
    Sha256,
}

impl HashAlgo {
    pub fn as_str(&self) -> &'static str {
        match self {
            HashAlgo::Blake3 => "blake3",
            HashAlgo::Sha256 => "sha256",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ScanOptions {
    pub algo: HashAlgo,
    pub recurse: bool,
    pub chunk_size: usize,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            algo: HashAlgo::Blake3,
            recurse: false,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

/// Files with identical size and content digest.
#[derive(Debug, Clone, Serialize)]
pub struct DuplicateGroup {
    pub size: u64,
    pub digest: String,
    pub paths: Vec<PathBuf>,
}

/// Scans `root` for duplicate files by direct size+hash comparison.
///
/// Files are bucketed by size first; only same-size candidates are hashed.
/// Returned groups always contain at least two paths and are ordered by
/// size descending so the largest wins show up first.
pub fn find_duplicates(root: &Path, options: &ScanOptions) -> Result<Vec<DuplicateGroup>> {
    let mut walker = WalkDir::new(root);
    if !options.recurse {
        walker = walker.max_depth(1);
    }

    let mut by_size: HashMap<u64, Vec<PathBuf>> = HashMap::new();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                tracing::warn!("walk error under {:?}: {}", root, err);
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let size = match entry.metadata() {
            Ok(md) => md.len(),
            Err(err) => {
                tracing::warn!("failed to stat {:?}: {}", entry.path(), err);
                continue;
            }
        };
        by_size.entry(size).or_default().push(entry.into_path());
    }

    let mut groups = Vec::new();
    for (size, candidates) in by_size {
        if candidates.len() < 2 {
            continue;
        }
        let mut by_digest: HashMap<String, Vec<PathBuf>> = HashMap::new();
        for path in candidates {
            match hash_file(&path, options.algo, options.chunk_size) {
                Ok(digest) => by_digest.entry(digest).or_default().push(path),
                Err(err) => tracing::warn!("failed to hash {:?}: {}", path, err),
            }
        }
        for (digest, mut paths) in by_digest {
            if paths.len() < 2 {
                continue;
            }
            paths.sort();
            groups.push(DuplicateGroup { size, digest, paths });
        }
    }

    groups.sort_by(|a, b| b.size.cmp(&a.size).then_with(|| a.digest.cmp(&b.digest)));
    tracing::debug!(
        "duplicate scan of {:?} found {} group(s) using {}",
        root,
        groups.len(),
        options.algo.as_str()
    );
    Ok(groups)
}

/// Hashes a file's content in `chunk_size` reads.
pub fn hash_file(path: &Path, algo: HashAlgo, chunk_size: usize) -> Result<String> {
    let mut file =
        File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let mut buf = vec![0u8; chunk_size.max(1)];
    match algo {
        HashAlgo::Blake3 => {
            let mut hasher = blake3::Hasher::new();
            loop {
                let n = file.read(&mut buf)?;
                if n == 0 {
                    break;
                }
                hasher.update(&buf[..n]);
            }
            Ok(hasher.finalize().to_hex().to_string())
        }
        HashAlgo::Sha256 => {
            let mut hasher = Sha256::new();
            loop {
                let n = file.read(&mut buf)?;
                if n == 0 {
                    break;
                }
                hasher.update(&buf[..n]);
            }
            Ok(hex::encode(hasher.finalize()))
        }
    }
}
