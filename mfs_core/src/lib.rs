//! # MFS Core
//!
//! A mutable file tree over a content-addressed block store.
//!
//! Every file and directory is an immutable node named by the hash of its
//! encoding. The only mutable state is a namespace's root pointer: each
//! operation builds new nodes from the changed entry up to a new root and
//! then publishes that root in one step.
//!
//! ## Features
//!
//! - Content ids over SHA2-256 or BLAKE3
//! - Flat directories that split into a hash-sharded tree past a threshold
//! - `cp`, `mv`, `mkdir`, `rm`, `write`, `stat`, `ls`, `read` and `flush`
//! - Reference paths (`/ipfs/<id>/...`) as copy sources
//! - Serialized mutations per namespace with all-or-nothing publishing
//!
//! ## Example
//!
//! ```no_run
//! use mfs_core::{Mfs, MfsConfig, Options, WriteOptions};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mfs = Mfs::init("./my-mfs", MfsConfig::default()).await?;
//!
//! let create = WriteOptions {
//!     create: true,
//!     options: Options::parents(),
//!     ..WriteOptions::default()
//! };
//! mfs.write("/docs/readme", b"hello", &create).await?;
//!
//! // Copies share structure: `/backup` gets the same id as `/docs`
//! mfs.cp(&["/docs"], "/backup", &Options::default()).await?;
//!
//! for entry in mfs.ls("/").await? {
//!     println!("{} {}", entry.id, entry.name);
//! }
//! # Ok(())
//! # }
//! ```

mod block;
mod codec;
mod config;
mod error;
mod hash;
mod link;
pub mod logging;
mod node;
mod ops;
mod resolve;
mod root;
mod shard;
mod store;
mod trail;
mod update;

pub use codec::{Encoded, HashConfig};
pub use config::{DEFAULT_SHARD_SPLIT_THRESHOLD, MfsConfig};
pub use error::{Error, ErrorKind, Result};
pub use hash::{Algorithm, CidVersion, ContentId};
pub use link::{LinkOptions, Mutated, add_link, rm_link};
pub use node::{DagNode, Link, NodeKind, ShardNode, Slot};
pub use ops::{DEFAULT_NAMESPACE, Mfs, Options, StatInfo, WriteOptions};
pub use resolve::{MfsPath, PathDescriptor, PathSource, resolve};
pub use root::{FileRootStore, MemoryRootStore, RootStore, publish};
pub use shard::{DirectoryLayout, ShardTree, layout, slot_index};
pub use store::{BlockStore, FsBlockStore, MemoryBlockStore, load_node, put_node};
pub use trail::{TrailFrame, build_trail};
pub use update::update_tree;
