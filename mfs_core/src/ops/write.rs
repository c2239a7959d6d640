use super::options::{Settings, WriteOptions};
use super::session::Session;
use crate::error::{Error, Result};
use crate::node::{DagNode, Link};
use crate::resolve::MfsPath;
use crate::store::put_node;

/// Largest file a write may produce. File nodes are held in one block.
const MAX_FILE_SIZE: u64 = 1 << 30;

pub(super) async fn write_file(
    session: &mut Session<'_>,
    path: &str,
    content: &[u8],
    options: &WriteOptions,
    settings: &Settings,
) -> Result<()> {
    let path = MfsPath::parse(path)?;
    if !path.is_namespace() {
        return Err(Error::invalid_params(format!(
            "cannot write to a reference path: {}",
            path
        )));
    }
    let Some(parent) = path.parent() else {
        return Err(Error::invalid_params("/ is not a file"));
    };

    let offset = checked_offset(options.offset, content.len())?;

    let desc = session.resolve(&path).await?;
    let existing = match desc.id {
        Some(id) => match session.load(&id).await? {
            DagNode::File { data } => data,
            _ => return Err(Error::invalid_params(format!("{} is not a file", path))),
        },
        None if options.create => Vec::new(),
        None => return Err(Error::not_found(path.to_string())),
    };

    let data = splice(existing, content, offset, options.truncate)?;
    let encoded = put_node(session.store, &DagNode::File { data }, settings.link.hash).await?;

    let link = Link::new(path.name(), encoded.id, encoded.size)?;
    session
        .link_into(&parent, vec![link], true, settings.parents)
        .await
}

/// Reject a write that would end past [`MAX_FILE_SIZE`].
fn checked_offset(offset: u64, len: usize) -> Result<usize> {
    let end = u64::try_from(len)
        .ok()
        .and_then(|len| offset.checked_add(len))
        .filter(|end| *end <= MAX_FILE_SIZE);
    match end {
        Some(_) => usize::try_from(offset)
            .map_err(|_| Error::invalid_params(format!("offset too large: {}", offset))),
        None => Err(Error::invalid_params(format!(
            "write of {} bytes at offset {} exceeds the {} byte file limit",
            len, offset, MAX_FILE_SIZE
        ))),
    }
}

/// Overlay `content` onto `data` at `offset`, zero-filling any gap.
fn splice(mut data: Vec<u8>, content: &[u8], offset: usize, truncate: bool) -> Result<Vec<u8>> {
    let end = offset
        .checked_add(content.len())
        .ok_or_else(|| Error::invalid_params(format!("offset too large: {}", offset)))?;
    if data.len() < end {
        data.resize(end, 0);
    }
    data[offset..end].copy_from_slice(content);
    if truncate {
        data.truncate(end);
    }
    Ok(data)
}
