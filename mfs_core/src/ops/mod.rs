//! The mutable namespace and the operations on it.
//!
//! Mutating operations on one [`Mfs`] are serialized by a lock on the handle.
//! Each runs against a private working root and publishes at most once, at
//! the very end; a failure anywhere before that leaves the namespace root
//! exactly as it was.
//!
//! Publishing is a compare-and-set against the root the operation started
//! from. When another handle on the same namespace got there first, the
//! operation is replayed on top of the new root.

mod cp;
mod mkdir;
mod mv;
mod options;
mod read;
mod rm;
mod session;
mod write;

pub use options::{Options, WriteOptions};
pub use read::StatInfo;

use crate::codec::HashConfig;
use crate::config::MfsConfig;
use crate::error::{Error, ErrorKind, Result};
use crate::hash::ContentId;
use crate::node::{DagNode, Link};
use crate::root::{FileRootStore, MemoryRootStore, RootStore, publish};
use crate::store::{BlockStore, FsBlockStore, MemoryBlockStore, put_node};
use options::Settings;
use session::Session;
use std::fs;
use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Name of the root pointer used by [`Mfs::init`] and [`Mfs::open`].
pub const DEFAULT_NAMESPACE: &str = "local";

/// How many times an operation is replayed after losing a publish race.
const MAX_PUBLISH_ATTEMPTS: usize = 64;

/// A mutable file namespace over a block store.
pub struct Mfs {
    blocks: Arc<dyn BlockStore>,
    roots: Arc<dyn RootStore>,
    config: MfsConfig,
    lock: Mutex<()>,
}

impl std::fmt::Debug for Mfs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mfs").field("config", &self.config).finish()
    }
}

impl Mfs {
    /// Attach to a namespace, publishing an empty root directory if the
    /// pointer has never been set.
    pub async fn new(
        blocks: Arc<dyn BlockStore>,
        roots: Arc<dyn RootStore>,
        config: MfsConfig,
    ) -> Result<Self> {
        let hash = config.hash_config()?;

        if roots.get().await?.is_none() {
            let empty = put_node(blocks.as_ref(), &DagNode::empty_directory(), hash).await?;
            match roots.compare_and_set(None, &empty.id, config.flush).await {
                Ok(()) => info!(root = %empty.id, "initialized empty namespace"),
                Err(e) if e.kind() == ErrorKind::Conflict => {
                    debug!("namespace was initialized by another handle")
                }
                Err(e) => return Err(e),
            }
        }

        Ok(Self {
            blocks,
            roots,
            config,
            lock: Mutex::new(()),
        })
    }

    /// A namespace held entirely in memory.
    pub async fn in_memory(config: MfsConfig) -> Result<Self> {
        Self::new(
            Arc::new(MemoryBlockStore::new()),
            Arc::new(MemoryRootStore::new()),
            config,
        )
        .await
    }

    /// Create an on-disk namespace at `root`.
    ///
    /// Lays out:
    /// - `config` with the namespace defaults
    /// - `blocks/` for node blocks
    /// - `roots/local` for the root pointer
    /// - `history/local` for every root ever published
    pub async fn init<P: AsRef<Path>>(root: P, config: MfsConfig) -> Result<Self> {
        let root = root.as_ref();
        config.hash_config()?;

        fs::create_dir_all(root)?;
        fs::write(root.join("config"), config.to_file_string())?;

        let blocks = FsBlockStore::init(root)?;
        let roots = FileRootStore::new(root, DEFAULT_NAMESPACE)?;
        Self::new(Arc::new(blocks), Arc::new(roots), config).await
    }

    /// Open an on-disk namespace created by [`Mfs::init`].
    pub async fn open<P: AsRef<Path>>(root: P) -> Result<Self> {
        let root = root.as_ref();
        if !root.exists() {
            return Err(Error::store_unavailable(format!(
                "{}: directory does not exist",
                root.display()
            )));
        }

        let config_path = root.join("config");
        if !config_path.exists() {
            return Err(Error::store_unavailable(format!(
                "{}: config file not found",
                root.display()
            )));
        }
        let config = MfsConfig::parse(&fs::read_to_string(&config_path)?)?;

        let blocks = FsBlockStore::open(root)?;
        let roots = FileRootStore::new(root, DEFAULT_NAMESPACE)?;
        Self::new(Arc::new(blocks), Arc::new(roots), config).await
    }

    pub fn config(&self) -> &MfsConfig {
        &self.config
    }

    pub fn blocks(&self) -> &dyn BlockStore {
        self.blocks.as_ref()
    }

    /// The currently published root id.
    pub async fn root(&self) -> Result<ContentId> {
        self.roots
            .get()
            .await?
            .ok_or_else(|| Error::store_unavailable("root pointer is unset"))
    }

    /// Store a file node holding `data` without linking it anywhere.
    pub async fn add_bytes(&self, data: &[u8], hash: Option<HashConfig>) -> Result<Link> {
        let hash = match hash {
            Some(hash) => hash,
            None => self.config.hash_config()?,
        };
        let encoded = put_node(
            self.blocks.as_ref(),
            &DagNode::File {
                data: data.to_vec(),
            },
            hash,
        )
        .await?;
        Ok(Link {
            name: String::new(),
            id: encoded.id,
            size: encoded.size,
        })
    }

    /// Copy one or more sources to `destination`.
    ///
    /// With several sources, `destination` is (or becomes, with
    /// `parents`) a directory that receives each source under its own name.
    pub async fn cp(
        &self,
        sources: &[&str],
        destination: &str,
        options: &Options,
    ) -> Result<ContentId> {
        self.mutate(options, Op::Cp { sources, destination })
            .await
            .map_err(|e| e.within("cp", destination))
    }

    /// Move sources to `destination`: copy, then unlink the originals.
    pub async fn mv(
        &self,
        sources: &[&str],
        destination: &str,
        options: &Options,
    ) -> Result<ContentId> {
        self.mutate(options, Op::Mv { sources, destination })
            .await
            .map_err(|e| e.within("mv", destination))
    }

    pub async fn mkdir(&self, path: &str, options: &Options) -> Result<ContentId> {
        self.mutate(options, Op::Mkdir { path })
            .await
            .map_err(|e| e.within("mkdir", path))
    }

    pub async fn rm(&self, paths: &[&str], options: &Options) -> Result<ContentId> {
        self.mutate(options, Op::Rm { paths })
            .await
            .map_err(|e| e.within("rm", paths.join(" ")))
    }

    /// Write `content` into the file at `path`.
    pub async fn write(
        &self,
        path: &str,
        content: &[u8],
        options: &WriteOptions,
    ) -> Result<ContentId> {
        self.mutate(
            &options.options,
            Op::Write {
                path,
                content,
                options,
            },
        )
        .await
        .map_err(|e| e.within("write", path))
    }

    pub async fn stat(&self, path: &str) -> Result<StatInfo> {
        let root = self.snapshot().await?;
        read::stat(self.blocks.as_ref(), &root, path)
            .await
            .map_err(|e| e.within("stat", path))
    }

    /// Entries of the directory at `path`, sorted by name.
    pub async fn ls(&self, path: &str) -> Result<Vec<Link>> {
        let root = self.snapshot().await?;
        read::list(self.blocks.as_ref(), &root, path)
            .await
            .map_err(|e| e.within("ls", path))
    }

    /// Contents of the file at `path`.
    pub async fn read(&self, path: &str) -> Result<Vec<u8>> {
        let root = self.snapshot().await?;
        read::read_file(self.blocks.as_ref(), &root, path)
            .await
            .map_err(|e| e.within("read", path))
    }

    /// Sync the root pointer and return the id currently at `path`.
    pub async fn flush(&self, path: &str) -> Result<ContentId> {
        let _guard = self.lock.lock().await;
        let flushed = async {
            let mut attempt = 1;
            let root = loop {
                let root = self.root().await?;
                match self.roots.compare_and_set(Some(&root), &root, true).await {
                    Ok(()) => break root,
                    Err(e) if e.kind() == ErrorKind::Conflict && attempt < MAX_PUBLISH_ATTEMPTS => {
                        attempt += 1;
                    }
                    Err(e) => return Err(e),
                }
            };
            read::id_at(self.blocks.as_ref(), &root, path).await
        };
        flushed.await.map_err(|e| e.within("flush", path))
    }

    /// Root seen by a read-only operation.
    async fn snapshot(&self) -> Result<ContentId> {
        let _guard = self.lock.lock().await;
        self.root().await
    }

    /// Run one mutating operation under the handle lock and publish its
    /// result.
    ///
    /// The deadline applies to each attempt's preparation, never to a
    /// publish.
    async fn mutate(&self, options: &Options, op: Op<'_>) -> Result<ContentId> {
        let settings = Settings::resolve(&self.config, options)?;

        let _guard = self.lock.lock().await;
        let mut attempt = 1;
        loop {
            let previous = self.root().await?;
            let mut session = Session::new(self.blocks.as_ref(), previous, settings.link);
            within_deadline(settings.deadline, prepare(&mut session, op, &settings)).await?;

            if !session.changed() {
                debug!(root = %previous, "operation left the root unchanged");
                return Ok(previous);
            }

            match publish(
                self.roots.as_ref(),
                &session.original,
                &session.root,
                settings.flush,
            )
            .await
            {
                Ok(()) => return Ok(session.root),
                Err(e) if e.kind() == ErrorKind::Conflict && attempt < MAX_PUBLISH_ATTEMPTS => {
                    debug!(attempt, error = %e, "root moved during the operation, replaying");
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// Apply `op` to the session's working root.
async fn prepare(session: &mut Session<'_>, op: Op<'_>, settings: &Settings) -> Result<()> {
    match op {
        Op::Cp {
            sources,
            destination,
        } => cp::copy(session, sources, destination, settings)
            .await
            .map(|_| ()),
        Op::Mv {
            sources,
            destination,
        } => mv::move_entries(session, sources, destination, settings).await,
        Op::Mkdir { path } => mkdir::make_directory(session, path, settings).await,
        Op::Rm { paths } => rm::remove(session, paths, settings).await,
        Op::Write {
            path,
            content,
            options,
        } => write::write_file(session, path, content, options, settings).await,
    }
}

/// A mutating operation and its arguments.
#[derive(Clone, Copy)]
enum Op<'r> {
    Cp {
        sources: &'r [&'r str],
        destination: &'r str,
    },
    Mv {
        sources: &'r [&'r str],
        destination: &'r str,
    },
    Mkdir {
        path: &'r str,
    },
    Rm {
        paths: &'r [&'r str],
    },
    Write {
        path: &'r str,
        content: &'r [u8],
        options: &'r WriteOptions,
    },
}

/// Await `fut`, failing with `Timeout` once `deadline` passes.
async fn within_deadline<T>(
    deadline: Option<Duration>,
    fut: impl Future<Output = Result<T>>,
) -> Result<T> {
    match deadline {
        Some(deadline) => tokio::time::timeout(deadline, fut)
            .await
            .map_err(|_| Error::Timeout {
                millis: deadline.as_millis(),
            })?,
        None => fut.await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::node::NodeKind;
    use tempfile::TempDir;

    async fn mfs() -> Mfs {
        Mfs::in_memory(MfsConfig::default()).await.unwrap()
    }

    async fn write_new(mfs: &Mfs, path: &str, content: &[u8]) {
        let options = WriteOptions {
            create: true,
            ..WriteOptions::default()
        };
        mfs.write(path, content, &options).await.unwrap();
    }

    #[tokio::test]
    async fn test_new_namespace_is_empty_directory() {
        let mfs = mfs().await;
        let stat = mfs.stat("/").await.unwrap();
        assert_eq!(stat.kind, NodeKind::Directory);
        assert_eq!(stat.entries, Some(0));
        assert!(mfs.ls("/").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_copy_single_file() {
        let mfs = mfs().await;
        write_new(&mfs, "/src", b"hello").await;
        let src = mfs.stat("/src").await.unwrap();

        mfs.cp(&["/src"], "/dst", &Options::default()).await.unwrap();

        let dst = mfs.stat("/dst").await.unwrap();
        assert_eq!(dst.id, src.id);
        assert_eq!(dst.cumulative_size, src.cumulative_size);
        assert_eq!(mfs.read("/dst").await.unwrap(), b"hello");
    }

    #[tokio::test]
    async fn test_copy_directory_shares_id() {
        let mfs = mfs().await;
        mfs.mkdir("/a", &Options::default()).await.unwrap();
        for name in ["one", "two", "three"] {
            write_new(&mfs, &format!("/a/{}", name), name.as_bytes()).await;
        }

        let before = mfs.root().await.unwrap();
        let after = mfs.cp(&["/a"], "/b", &Options::default()).await.unwrap();
        assert_ne!(before, after);

        let a = mfs.stat("/a").await.unwrap();
        let b = mfs.stat("/b").await.unwrap();
        assert_eq!(a.id, b.id);
        let names: Vec<String> = mfs.ls("/b").await.unwrap().into_iter().map(|l| l.name).collect();
        assert_eq!(names, vec!["one", "three", "two"]);
    }

    #[tokio::test]
    async fn test_copy_into_existing_directory_keeps_name() {
        let mfs = mfs().await;
        write_new(&mfs, "/f", b"data").await;
        mfs.mkdir("/dir", &Options::default()).await.unwrap();

        mfs.cp(&["/f"], "/dir", &Options::default()).await.unwrap();
        assert_eq!(mfs.read("/dir/f").await.unwrap(), b"data");
    }

    #[tokio::test]
    async fn test_multi_source_requires_parents() {
        let mfs = mfs().await;
        write_new(&mfs, "/x", b"x").await;
        write_new(&mfs, "/y", b"y").await;
        write_new(&mfs, "/z", b"z").await;
        let before = mfs.root().await.unwrap();

        let err = mfs
            .cp(&["/x", "/y", "/z"], "/out/deep", &Options::default())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidParams);
        assert_eq!(mfs.root().await.unwrap(), before);

        mfs.cp(&["/x", "/y", "/z"], "/out/deep", &Options::parents())
            .await
            .unwrap();
        assert_eq!(mfs.ls("/out/deep").await.unwrap().len(), 3);
        assert_eq!(mfs.read("/out/deep/x").await.unwrap(), b"x");
        assert_eq!(mfs.read("/out/deep/z").await.unwrap(), b"z");
    }

    #[tokio::test]
    async fn test_collision_on_later_source_leaves_root() {
        let mfs = mfs().await;
        mfs.mkdir("/p", &Options::default()).await.unwrap();
        mfs.mkdir("/q", &Options::default()).await.unwrap();
        write_new(&mfs, "/p/one", b"1").await;
        write_new(&mfs, "/p/two", b"2").await;
        write_new(&mfs, "/q/two", b"different").await;
        mfs.mkdir("/dest", &Options::default()).await.unwrap();
        let before = mfs.root().await.unwrap();

        let err = mfs
            .cp(&["/p/one", "/q/two", "/p/two"], "/dest", &Options::default())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AlreadyExists);
        assert_eq!(mfs.root().await.unwrap(), before);
        assert!(mfs.ls("/dest").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failed_parent_creation_publishes_nothing() {
        let mfs = mfs().await;
        mfs.mkdir("/p", &Options::default()).await.unwrap();
        mfs.mkdir("/q", &Options::default()).await.unwrap();
        write_new(&mfs, "/p/same", b"from p").await;
        write_new(&mfs, "/q/same", b"from q").await;
        let before = mfs.root().await.unwrap();

        // `/fresh/dir` is created inside the working root, then the second
        // `same` collides with the first
        let err = mfs
            .cp(&["/p/same", "/q/same"], "/fresh/dir", &Options::parents())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AlreadyExists);
        assert_eq!(mfs.root().await.unwrap(), before);
        assert_eq!(
            mfs.stat("/fresh").await.unwrap_err().kind(),
            ErrorKind::NotFound
        );
    }

    #[tokio::test]
    async fn test_missing_source() {
        let mfs = mfs().await;
        let err = mfs
            .cp(&["/nope"], "/dst", &Options::default())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert!(err.to_string().starts_with("cp /dst"));
    }

    #[tokio::test]
    async fn test_copy_from_reference() {
        let mfs = mfs().await;
        let file = mfs.add_bytes(b"outside", None).await.unwrap();
        let source = format!("/ipfs/{}", file.id);

        mfs.cp(&[source.as_str()], "/inside", &Options::default())
            .await
            .unwrap();
        assert_eq!(mfs.read("/inside").await.unwrap(), b"outside");
    }

    #[tokio::test]
    async fn test_reference_destination_rejected() {
        let mfs = mfs().await;
        write_new(&mfs, "/f", b"f").await;
        let root = mfs.root().await.unwrap();
        let dest = format!("/ipfs/{}/g", root);

        let err = mfs
            .cp(&["/f"], &dest, &Options::default())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidParams);
    }

    #[tokio::test]
    async fn test_concurrent_writes_are_not_lost() {
        let mfs = Arc::new(mfs().await);
        let mut handles = Vec::new();
        for i in 0..16 {
            let mfs = Arc::clone(&mfs);
            handles.push(tokio::spawn(async move {
                let options = WriteOptions {
                    create: true,
                    options: Options::parents(),
                    ..WriteOptions::default()
                };
                mfs.write(&format!("/dir/file-{}", i), format!("{}", i).as_bytes(), &options)
                    .await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(mfs.ls("/dir").await.unwrap().len(), 16);
        assert_eq!(mfs.read("/dir/file-7").await.unwrap(), b"7");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_two_disk_handles_keep_every_write() {
        let temp = TempDir::new().unwrap();
        Mfs::init(temp.path(), MfsConfig::default()).await.unwrap();
        let first = Arc::new(Mfs::open(temp.path()).await.unwrap());
        let second = Arc::new(Mfs::open(temp.path()).await.unwrap());

        let mut handles = Vec::new();
        for i in 0..20 {
            let mfs = if i % 2 == 0 {
                Arc::clone(&first)
            } else {
                Arc::clone(&second)
            };
            handles.push(tokio::spawn(async move {
                let options = WriteOptions {
                    create: true,
                    ..WriteOptions::default()
                };
                mfs.write(&format!("/f{}", i), format!("{}", i).as_bytes(), &options)
                    .await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let reopened = Mfs::open(temp.path()).await.unwrap();
        assert_eq!(reopened.ls("/").await.unwrap().len(), 20);
        assert_eq!(reopened.read("/f13").await.unwrap(), b"13");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_handles_sharing_stores_replay_lost_races() {
        let blocks: Arc<dyn BlockStore> = Arc::new(MemoryBlockStore::new());
        let roots: Arc<dyn RootStore> = Arc::new(MemoryRootStore::new());
        let first = Arc::new(
            Mfs::new(Arc::clone(&blocks), Arc::clone(&roots), MfsConfig::default())
                .await
                .unwrap(),
        );
        let second = Arc::new(
            Mfs::new(Arc::clone(&blocks), Arc::clone(&roots), MfsConfig::default())
                .await
                .unwrap(),
        );

        let mut handles = Vec::new();
        for i in 0..20 {
            let mfs = Arc::clone(if i % 2 == 0 { &first } else { &second });
            handles.push(tokio::spawn(async move {
                mfs.mkdir(&format!("/d{}", i), &Options::default()).await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(first.ls("/").await.unwrap().len(), 20);
        assert_eq!(first.root().await.unwrap(), second.root().await.unwrap());
    }

    /// A block store whose reads take a while.
    struct SlowStore {
        inner: MemoryBlockStore,
        delay: Duration,
    }

    #[async_trait::async_trait]
    impl BlockStore for SlowStore {
        async fn get(&self, id: &ContentId) -> Result<Vec<u8>> {
            tokio::time::sleep(self.delay).await;
            self.inner.get(id).await
        }

        async fn put(&self, id: &ContentId, bytes: &[u8]) -> Result<()> {
            self.inner.put(id, bytes).await
        }

        async fn has(&self, id: &ContentId) -> Result<bool> {
            self.inner.has(id).await
        }
    }

    #[tokio::test]
    async fn test_deadline_exceeded() {
        let blocks = Arc::new(SlowStore {
            inner: MemoryBlockStore::new(),
            delay: Duration::from_millis(200),
        });
        let mfs = Mfs::new(blocks, Arc::new(MemoryRootStore::new()), MfsConfig::default())
            .await
            .unwrap();
        let before = mfs.root().await.unwrap();
        let options = Options {
            deadline: Some(Duration::from_millis(10)),
            ..Options::default()
        };

        let err = mfs.mkdir("/slow", &options).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Timeout);
        assert_eq!(mfs.root().await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_unchanged_root_not_republished() {
        let mfs = mfs().await;
        mfs.mkdir("/a", &Options::default()).await.unwrap();
        let before = mfs.root().await.unwrap();
        let after = mfs.mkdir("/a", &Options::parents()).await.unwrap();
        assert_eq!(before, after);
    }

    #[tokio::test]
    async fn test_on_disk_namespace_survives_reopen() {
        let temp = TempDir::new().unwrap();
        let root = {
            let mfs = Mfs::init(temp.path(), MfsConfig::default()).await.unwrap();
            let options = WriteOptions {
                create: true,
                options: Options::parents(),
                ..WriteOptions::default()
            };
            mfs.write("/docs/readme", b"persisted", &options)
                .await
                .unwrap();
            mfs.root().await.unwrap()
        };

        assert!(temp.path().join("config").exists());
        assert!(temp.path().join("roots").join(DEFAULT_NAMESPACE).exists());

        let reopened = Mfs::open(temp.path()).await.unwrap();
        assert_eq!(reopened.root().await.unwrap(), root);
        assert_eq!(reopened.read("/docs/readme").await.unwrap(), b"persisted");

        let history = FileRootStore::new(temp.path(), DEFAULT_NAMESPACE)
            .unwrap()
            .history()
            .unwrap();
        assert_eq!(history.last(), Some(&root));
        assert_eq!(history.len(), 2);
    }

    #[tokio::test]
    async fn test_open_missing_store() {
        let temp = TempDir::new().unwrap();
        let err = Mfs::open(temp.path().join("nope")).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::StoreUnavailable);
    }

    #[tokio::test]
    async fn test_flush_returns_id() {
        let mfs = mfs().await;
        write_new(&mfs, "/f", b"flushed").await;
        let id = mfs.flush("/f").await.unwrap();
        assert_eq!(id, mfs.stat("/f").await.unwrap().id);
        assert_eq!(mfs.flush("/").await.unwrap(), mfs.root().await.unwrap());
        assert_eq!(
            mfs.flush("/missing").await.unwrap_err().kind(),
            ErrorKind::NotFound
        );
    }

    #[tokio::test]
    async fn test_sharding_through_namespace() {
        let config = MfsConfig {
            shard_split_threshold: 4,
            ..MfsConfig::default()
        };
        let mfs = Mfs::in_memory(config).await.unwrap();
        for i in 0..10 {
            let options = WriteOptions {
                create: true,
                options: Options::parents(),
                ..WriteOptions::default()
            };
            mfs.write(&format!("/big/f{:02}", i), b"x", &options)
                .await
                .unwrap();
        }

        assert_eq!(
            mfs.stat("/big").await.unwrap().kind,
            NodeKind::ShardedDirectory
        );
        let names: Vec<String> = mfs.ls("/big").await.unwrap().into_iter().map(|l| l.name).collect();
        let expected: Vec<String> = (0..10).map(|i| format!("f{:02}", i)).collect();
        assert_eq!(names, expected);

        mfs.rm(&["/big/f03"], &Options::default()).await.unwrap();
        assert_eq!(mfs.ls("/big").await.unwrap().len(), 9);
        assert_eq!(mfs.read("/big/f04").await.unwrap(), b"x");
    }
}
