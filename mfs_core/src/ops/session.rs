//! A working root private to one mutating operation.
//!
//! Every step of an operation (implicit parent creation included) moves the
//! session's working root forward; nothing becomes visible until the owning
//! [`crate::Mfs`] publishes the final root.

use crate::error::{Error, Result};
use crate::hash::ContentId;
use crate::link::{LinkOptions, Mutated, add_link, rm_link};
use crate::node::{DagNode, Link};
use crate::resolve::{MfsPath, PathDescriptor, resolve};
use crate::store::{BlockStore, load_node};
use crate::trail::{TrailFrame, build_trail};
use crate::update::update_tree;
use tracing::debug;

pub(crate) struct Session<'a> {
    pub store: &'a dyn BlockStore,
    /// Root observed when the session began.
    pub original: ContentId,
    /// Root including every change made so far.
    pub root: ContentId,
    pub link: LinkOptions,
}

impl<'a> Session<'a> {
    pub fn new(store: &'a dyn BlockStore, root: ContentId, link: LinkOptions) -> Self {
        Self {
            store,
            original: root,
            root,
            link,
        }
    }

    pub fn changed(&self) -> bool {
        self.root != self.original
    }

    pub async fn resolve(&self, path: &MfsPath) -> Result<PathDescriptor> {
        resolve(self.store, &self.root, path).await
    }

    pub async fn load(&self, id: &ContentId) -> Result<DagNode> {
        load_node(self.store, id).await
    }

    /// Link `entries` into the directory at `dir`.
    ///
    /// Missing directories along `dir` are created when `parents` is set and
    /// rejected with `InvalidParams` otherwise.
    pub async fn link_into(
        &mut self,
        dir: &MfsPath,
        entries: Vec<Link>,
        overwrite: bool,
        parents: bool,
    ) -> Result<()> {
        if !dir.is_namespace() {
            return Err(Error::invalid_params(format!(
                "{} is not in the mutable namespace",
                dir
            )));
        }

        let options = LinkOptions {
            overwrite,
            ..self.link
        };

        let mut trail = build_trail(self.store, &self.root, &dir.segments).await?;
        let missing = dir.segments[trail.len() - 1..].to_vec();
        let Some(last) = trail.pop() else {
            return Err(Error::invalid_params("empty trail"));
        };

        if !last.node.kind().is_directory() {
            return Err(Error::not_a_directory(
                MfsPath {
                    source: dir.source,
                    segments: dir.segments[..trail.len()].to_vec(),
                }
                .to_string(),
            ));
        }

        let mutated = if missing.is_empty() {
            self.add_all(&last.node, entries, &options).await?
        } else {
            if !parents {
                return Err(Error::invalid_params(format!(
                    "{} does not exist, pass parents to create intermediate directories",
                    dir
                )));
            }
            debug!(dir = %dir, missing = missing.len(), "creating intermediate directories");

            // Innermost directory first, then wrap it once per missing level
            let mut child = self
                .add_all(&DagNode::empty_directory(), entries, &options)
                .await?;
            for name in missing[1..].iter().rev() {
                let link = Link::new(name.as_str(), child.id, child.size)?;
                child = add_link(self.store, &DagNode::empty_directory(), link, &options).await?;
            }

            let link = Link::new(missing[0].as_str(), child.id, child.size)?;
            add_link(self.store, &last.node, link, &options).await?
        };

        trail.push(TrailFrame::from_mutated(last.name, mutated));
        self.root = update_tree(self.store, trail, &self.link).await?;
        Ok(())
    }

    async fn add_all(
        &self,
        dir: &DagNode,
        entries: Vec<Link>,
        options: &LinkOptions,
    ) -> Result<Mutated> {
        let mut node = dir.clone();
        let mut last = None;
        for entry in entries {
            let mutated = add_link(self.store, &node, entry, options).await?;
            node = mutated.node.clone();
            last = Some(mutated);
        }

        match last {
            Some(mutated) => Ok(mutated),
            None => Err(Error::invalid_params("nothing to link")),
        }
    }

    /// Remove the entry at `path` from its parent directory.
    pub async fn unlink(&mut self, path: &MfsPath) -> Result<()> {
        let Some(parent) = path.parent() else {
            return Err(Error::invalid_params("cannot remove the root"));
        };
        if !path.is_namespace() {
            return Err(Error::invalid_params(format!(
                "{} is not in the mutable namespace",
                path
            )));
        }

        let mut trail = build_trail(self.store, &self.root, &parent.segments).await?;
        if trail.len() != parent.segments.len() + 1 {
            return Err(Error::not_found(path.to_string()));
        }
        let Some(last) = trail.pop() else {
            return Err(Error::not_found(path.to_string()));
        };

        let mutated = rm_link(self.store, &last.node, path.name(), &self.link).await?;
        trail.push(TrailFrame::from_mutated(last.name, mutated));
        self.root = update_tree(self.store, trail, &self.link).await?;
        Ok(())
    }
}
