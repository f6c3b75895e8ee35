use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use std::time::SystemTime;

use sha2::{Digest, Sha256};

use crate::metadata::ComponentMetadata;

/// Per-process cache of parsed metadata files.
///
/// Two-tier re-validation on every lookup:
/// 1. **Stat check** (mtime + size): no read needed.
/// 2. **Content hash**: the file is read and hashed; a matching digest
///    means the parsed record is still current and the stat is refreshed.
///
/// Anything else is a miss and the caller re-parses. Entries are never
/// trusted without one of the two checks, so a file edited between two
/// protocol requests is always picked up.
#[derive(Default)]
pub struct MetadataCache {
    entries: RwLock<HashMap<PathBuf, CacheEntry>>,
}

#[derive(Clone)]
struct CacheEntry {
    stat: FileStat,
    content_hash: String,
    metadata: ComponentMetadata,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct FileStat {
    mtime_secs: u64,
    mtime_nanos: u32,
    size: u64,
}

impl FileStat {
    fn of(meta: &std::fs::Metadata) -> Self {
        let (mtime_secs, mtime_nanos) = systemtime_to_parts(meta.modified().ok());
        Self {
            mtime_secs,
            mtime_nanos,
            size: meta.len(),
        }
    }
}

pub enum CacheLookup {
    /// mtime and size unchanged; the file was not read.
    StatHit(ComponentMetadata),
    /// The file was read and its digest matched the cached one.
    ContentHit(ComponentMetadata),
    /// Not cached or changed. Carries the bytes that were read.
    Miss(Vec<u8>),
}

impl MetadataCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Re-validate the cached record for `path`. I/O errors (file missing,
    /// unreadable) are returned to the caller.
    pub fn lookup(&self, path: &Path) -> io::Result<CacheLookup> {
        let stat = FileStat::of(&std::fs::metadata(path)?);

        let cached = self.read_entries().get(path).cloned();
        let Some(entry) = cached else {
            return std::fs::read(path).map(CacheLookup::Miss);
        };

        if entry.stat == stat {
            return Ok(CacheLookup::StatHit(entry.metadata));
        }

        let content = std::fs::read(path)?;
        if compute_content_hash(&content) != entry.content_hash {
            return Ok(CacheLookup::Miss(content));
        }

        // Content unchanged: refresh the stat so the next lookup is a stat hit.
        let mut entries = self.write_entries();
        if let Some(e) = entries.get_mut(path) {
            e.stat = stat;
        }
        Ok(CacheLookup::ContentHit(entry.metadata))
    }

    /// Record a freshly parsed file.
    pub fn put(&self, path: &Path, content: &[u8], metadata: &ComponentMetadata) {
        let stat = match std::fs::metadata(path) {
            Ok(m) => FileStat::of(&m),
            Err(_) => FileStat {
                mtime_secs: 0,
                mtime_nanos: 0,
                size: content.len() as u64,
            },
        };
        self.write_entries().insert(
            path.to_path_buf(),
            CacheEntry {
                stat,
                content_hash: compute_content_hash(content),
                metadata: metadata.clone(),
            },
        );
    }

    pub fn invalidate(&self, path: &Path) {
        self.write_entries().remove(path);
    }

    pub fn len(&self) -> usize {
        self.read_entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn read_entries(&self) -> std::sync::RwLockReadGuard<'_, HashMap<PathBuf, CacheEntry>> {
        self.entries.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_entries(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<PathBuf, CacheEntry>> {
        self.entries.write().unwrap_or_else(|e| e.into_inner())
    }
}

fn systemtime_to_parts(time: Option<SystemTime>) -> (u64, u32) {
    match time.map(|t| t.duration_since(SystemTime::UNIX_EPOCH)) {
        Some(Ok(d)) => (d.as_secs(), d.subsec_nanos()),
        _ => (0, 0),
    }
}

/// SHA-256 of file content, hex encoded.
pub fn compute_content_hash(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    format!("{:x}", hasher.finalize())
}
