//! Propagating a changed directory up to a new root.

use crate::error::{Error, Result};
use crate::hash::ContentId;
use crate::link::{LinkOptions, add_link};
use crate::node::Link;
use crate::store::BlockStore;
use crate::trail::TrailFrame;
use tracing::debug;

/// Fold the last frame of `trail` upward, returning the new root id.
///
/// The last frame must already hold the mutated directory. Each ancestor is
/// re-linked to its changed child with exactly one `add_link` call, deepest
/// first. Intermediate ids are only ever stored, never published.
pub async fn update_tree(
    store: &dyn BlockStore,
    mut trail: Vec<TrailFrame>,
    options: &LinkOptions,
) -> Result<ContentId> {
    let options = LinkOptions {
        overwrite: true,
        ..*options
    };

    let mut child = trail
        .pop()
        .ok_or_else(|| Error::invalid_params("cannot update an empty trail"))?;

    while let Some(parent) = trail.pop() {
        let link = Link::new(child.name.as_str(), child.id, child.size)?;
        let mutated = add_link(store, &parent.node, link, &options).await?;
        let dir = if parent.name.is_empty() {
            "/"
        } else {
            parent.name.as_str()
        };
        debug!(
            dir,
            old = %parent.id,
            new = %mutated.id,
            "updated ancestor"
        );
        child = TrailFrame::from_mutated(parent.name, mutated);
    }

    Ok(child.id)
}
