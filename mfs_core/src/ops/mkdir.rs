use super::options::Settings;
use super::session::Session;
use crate::error::{Error, Result};
use crate::node::{DagNode, Link};
use crate::resolve::MfsPath;
use crate::store::put_node;

pub(super) async fn make_directory(
    session: &mut Session<'_>,
    path: &str,
    settings: &Settings,
) -> Result<()> {
    let path = MfsPath::parse(path)?;
    if !path.is_namespace() {
        return Err(Error::invalid_params(format!(
            "cannot create a directory in a reference path: {}",
            path
        )));
    }

    let desc = session.resolve(&path).await?;
    if desc.exists {
        // With parents an existing directory is fine, like `mkdir -p`
        if settings.parents && desc.is_directory() {
            return Ok(());
        }
        return Err(Error::already_exists(path.to_string()));
    }

    let Some(parent) = path.parent() else {
        return Err(Error::already_exists("/"));
    };

    let empty = put_node(session.store, &DagNode::empty_directory(), settings.link.hash).await?;
    let link = Link::new(path.name(), empty.id, empty.size)?;

    session
        .link_into(&parent, vec![link], false, settings.parents)
        .await
}

#[cfg(test)]
mod tests {
    use crate::config::MfsConfig;
    use crate::error::ErrorKind;
    use crate::node::NodeKind;
    use crate::ops::{Mfs, Options};

    #[tokio::test]
    async fn test_mkdir_nested_requires_parents() {
        let mfs = Mfs::in_memory(MfsConfig::default()).await.unwrap();
        let err = mfs.mkdir("/a/b/c", &Options::default()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidParams);

        mfs.mkdir("/a/b/c", &Options::parents()).await.unwrap();
        for path in ["/a", "/a/b", "/a/b/c"] {
            assert_eq!(mfs.stat(path).await.unwrap().kind, NodeKind::Directory);
        }
    }

    #[tokio::test]
    async fn test_mkdir_existing() {
        let mfs = Mfs::in_memory(MfsConfig::default()).await.unwrap();
        mfs.mkdir("/a", &Options::default()).await.unwrap();

        let err = mfs.mkdir("/a", &Options::default()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AlreadyExists);
        assert_eq!(
            mfs.mkdir("/", &Options::default()).await.unwrap_err().kind(),
            ErrorKind::AlreadyExists
        );
        assert!(mfs.mkdir("/a", &Options::parents()).await.is_ok());
    }

    #[tokio::test]
    async fn test_mkdir_blake3_cid_v1() {
        let mfs = Mfs::in_memory(MfsConfig::default()).await.unwrap();
        let options = Options {
            hash_alg: Some(crate::hash::Algorithm::Blake3),
            cid_version: Some(crate::hash::CidVersion::V1),
            ..Options::default()
        };
        mfs.mkdir("/b3", &options).await.unwrap();
        let stat = mfs.stat("/b3").await.unwrap();
        assert_eq!(stat.id.algorithm(), crate::hash::Algorithm::Blake3);
    }
}
