use super::options::Settings;
use super::session::Session;
use crate::error::{Error, Result};
use crate::resolve::MfsPath;
use tracing::debug;

pub(super) async fn remove(
    session: &mut Session<'_>,
    paths: &[&str],
    settings: &Settings,
) -> Result<()> {
    if paths.is_empty() {
        return Err(Error::invalid_params("Please supply at least one path"));
    }

    for path in paths {
        let path = MfsPath::parse(path)?;
        if !path.is_namespace() {
            return Err(Error::invalid_params(format!(
                "cannot remove from a reference path: {}",
                path
            )));
        }
        if path.is_root() {
            return Err(Error::invalid_params("cannot remove the root"));
        }

        let desc = session.resolve(&path).await?;
        if !desc.exists {
            return Err(Error::not_found(path.to_string()));
        }
        if desc.is_directory() && !settings.recursive {
            return Err(Error::invalid_params(format!(
                "{} is a directory, use recursive to remove it",
                path
            )));
        }

        debug!(path = %path, "unlinking");
        session.unlink(&path).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::config::MfsConfig;
    use crate::error::ErrorKind;
    use crate::ops::{Mfs, Options, WriteOptions};

    async fn fixture() -> Mfs {
        let mfs = Mfs::in_memory(MfsConfig::default()).await.unwrap();
        let options = WriteOptions {
            create: true,
            options: Options::parents(),
            ..WriteOptions::default()
        };
        mfs.write("/d/f", b"f", &options).await.unwrap();
        mfs.write("/g", b"g", &options).await.unwrap();
        mfs
    }

    #[tokio::test]
    async fn test_rm_file() {
        let mfs = fixture().await;
        mfs.rm(&["/g"], &Options::default()).await.unwrap();
        assert_eq!(mfs.stat("/g").await.unwrap_err().kind(), ErrorKind::NotFound);
        assert!(mfs.stat("/d/f").await.is_ok());
    }

    #[tokio::test]
    async fn test_rm_directory_needs_recursive() {
        let mfs = fixture().await;
        let err = mfs.rm(&["/d"], &Options::default()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidParams);

        mfs.rm(&["/d"], &Options::recursive()).await.unwrap();
        assert_eq!(mfs.ls("/").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_rm_root_and_missing() {
        let mfs = fixture().await;
        let before = mfs.root().await.unwrap();
        assert_eq!(
            mfs.rm(&["/"], &Options::recursive()).await.unwrap_err().kind(),
            ErrorKind::InvalidParams
        );
        assert_eq!(
            mfs.rm(&["/g", "/nope"], &Options::default())
                .await
                .unwrap_err()
                .kind(),
            ErrorKind::NotFound
        );
        // the first path was removed only in the abandoned working root
        assert_eq!(mfs.root().await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_rm_restores_previous_root() {
        let mfs = Mfs::in_memory(MfsConfig::default()).await.unwrap();
        let empty = mfs.root().await.unwrap();
        mfs.mkdir("/tmp", &Options::default()).await.unwrap();
        let after = mfs.rm(&["/tmp"], &Options::recursive()).await.unwrap();
        assert_eq!(after, empty);
    }
}
