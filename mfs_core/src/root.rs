//! Root pointers and the root publisher.
//!
//! A root pointer is the one mutable slot of a namespace: it names the id of
//! the namespace's current top-level directory. [`publish`] is the only code
//! path that moves it, and it only moves it from the root the caller read.

use crate::error::{Error, Result};
use crate::hash::ContentId;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fs;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};
use tracing::{info, warn};

/// Storage for a single root pointer.
#[async_trait]
pub trait RootStore: Send + Sync {
    /// The current root id, or `None` for a namespace that was never published.
    async fn get(&self) -> Result<Option<ContentId>>;

    /// Replace the root with `new` if it still equals `expected`.
    ///
    /// Fails with `Conflict` when another writer moved the pointer first.
    /// With `flush` unset the write may be buffered by the OS; the pointer
    /// can then revert to an earlier value after a crash.
    async fn compare_and_set(
        &self,
        expected: Option<&ContentId>,
        new: &ContentId,
        flush: bool,
    ) -> Result<()>;
}

/// Swap the namespace root from `previous` to `new_root`.
pub async fn publish(
    roots: &dyn RootStore,
    previous: &ContentId,
    new_root: &ContentId,
    flush: bool,
) -> Result<()> {
    roots.compare_and_set(Some(previous), new_root, flush).await?;
    info!(previous = %previous, root = %new_root, flush, "published root");
    Ok(())
}

/// A root pointer kept in the file `{root}/roots/{namespace}`.
///
/// The pointer file holds a single id and is replaced atomically. Every
/// published id is also appended to `{root}/history/{namespace}`, which
/// nothing on the read path consults.
#[derive(Debug, Clone)]
pub struct FileRootStore {
    path: PathBuf,
    history: PathBuf,
    lock: Arc<Mutex<()>>,
}

/// Locks shared by every `FileRootStore` in the process that points at the
/// same pointer file.
fn pointer_lock(path: &Path) -> Arc<Mutex<()>> {
    static LOCKS: OnceLock<Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>> = OnceLock::new();
    let mut locks = LOCKS.get_or_init(Default::default).lock();
    Arc::clone(locks.entry(path.to_path_buf()).or_default())
}

impl FileRootStore {
    /// Open (or prepare) the pointer for `namespace` under `root`.
    pub fn new<P: AsRef<Path>>(root: P, namespace: &str) -> Result<Self> {
        // Validate name - no path traversal
        if namespace.contains("..") || namespace.contains('/') || namespace.contains('\\') {
            return Err(Error::invalid_params(format!(
                "Invalid namespace: {} (must not contain .. or path separators)",
                namespace
            )));
        }

        if namespace.is_empty() {
            return Err(Error::invalid_params("Namespace cannot be empty"));
        }

        let root = root.as_ref();
        let roots_dir = root.join("roots");
        let history_dir = root.join("history");
        fs::create_dir_all(&roots_dir)?;
        fs::create_dir_all(&history_dir)?;

        let path = fs::canonicalize(&roots_dir)?.join(namespace);
        Ok(Self {
            lock: pointer_lock(&path),
            history: history_dir.join(namespace),
            path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn history_path(&self) -> &Path {
        &self.history
    }

    /// Every id ever published, oldest first.
    pub fn history(&self) -> Result<Vec<ContentId>> {
        read_history(&self.history)
    }
}

fn read_pointer(path: &Path) -> Result<Option<ContentId>> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    ContentId::from_hex(content.trim()).map(Some).map_err(|_| {
        Error::store_unavailable(format!("{}: invalid root pointer", path.display()))
    })
}

fn write_pointer(path: &Path, id: &ContentId, flush: bool) -> Result<()> {
    let dir = path
        .parent()
        .ok_or_else(|| Error::store_unavailable("root pointer has no parent directory"))?;

    let mut temp = tempfile::NamedTempFile::new_in(dir)?;
    temp.write_all(format!("{}\n", id.to_hex()).as_bytes())?;
    temp.flush()?;
    if flush {
        temp.as_file().sync_all()?;
    }
    temp.persist(path)?;
    Ok(())
}

fn read_history(path: &Path) -> Result<Vec<ContentId>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let content = fs::read_to_string(path)?;
    let mut ids = Vec::new();

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        // A torn line from an unflushed append is skipped
        if let Ok(id) = ContentId::from_hex(line) {
            ids.push(id);
        }
    }

    Ok(ids)
}

fn append_history(path: &Path, id: &ContentId, flush: bool) -> Result<()> {
    let mut file = fs::OpenOptions::new()
        .create(true)
        .read(true)
        .append(true)
        .open(path)?;

    // Start on a fresh line if the last append was torn
    let mut line = String::new();
    if file.metadata()?.len() > 0 {
        let mut last = [0u8; 1];
        file.seek(SeekFrom::End(-1))?;
        file.read_exact(&mut last)?;
        if last[0] != b'\n' {
            line.push('\n');
        }
    }
    line.push_str(&id.to_hex());
    line.push('\n');

    file.write_all(line.as_bytes())?;
    if flush {
        file.sync_all()?;
    }
    Ok(())
}

fn sync_pointer(path: &Path) -> Result<()> {
    fs::File::open(path)?.sync_all()?;
    Ok(())
}

#[async_trait]
impl RootStore for FileRootStore {
    async fn get(&self) -> Result<Option<ContentId>> {
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || read_pointer(&path)).await?
    }

    async fn compare_and_set(
        &self,
        expected: Option<&ContentId>,
        new: &ContentId,
        flush: bool,
    ) -> Result<()> {
        let store = self.clone();
        let expected = expected.copied();
        let new = *new;

        tokio::task::spawn_blocking(move || {
            let _guard = store.lock.lock();
            let current = read_pointer(&store.path)?;
            if current != expected {
                return Err(Error::conflict(expected.as_ref(), current.as_ref()));
            }
            if current == Some(new) {
                return if flush { sync_pointer(&store.path) } else { Ok(()) };
            }

            write_pointer(&store.path, &new, flush)?;
            if let Err(e) = append_history(&store.history, &new, flush) {
                warn!(root = %new, error = %e, "failed to record root history");
            }
            Ok(())
        })
        .await?
    }
}

/// An in-memory root pointer.
#[derive(Debug, Default)]
pub struct MemoryRootStore {
    current: Mutex<Option<ContentId>>,
}

impl MemoryRootStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RootStore for MemoryRootStore {
    async fn get(&self) -> Result<Option<ContentId>> {
        Ok(*self.current.lock())
    }

    async fn compare_and_set(
        &self,
        expected: Option<&ContentId>,
        new: &ContentId,
        _flush: bool,
    ) -> Result<()> {
        let mut current = self.current.lock();
        if current.as_ref() != expected {
            return Err(Error::conflict(expected, current.as_ref()));
        }
        *current = Some(*new);
        Ok(())
    }
}
