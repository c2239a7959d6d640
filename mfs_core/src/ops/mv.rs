use super::cp::copy;
use super::options::Settings;
use super::session::Session;
use crate::error::{Error, Result};
use crate::resolve::MfsPath;

/// Copy the sources, then unlink each one that actually moved.
pub(super) async fn move_entries(
    session: &mut Session<'_>,
    sources: &[&str],
    destination: &str,
    settings: &Settings,
) -> Result<()> {
    let dest = MfsPath::parse(destination)?;

    let mut paths = Vec::with_capacity(sources.len());
    for source in sources {
        let path = MfsPath::parse(source)?;
        if !path.is_namespace() {
            return Err(Error::invalid_params(format!(
                "cannot move a reference path: {}",
                path
            )));
        }
        if path.is_root() {
            return Err(Error::invalid_params("cannot move the root"));
        }
        if dest.starts_with(&path) {
            return Err(Error::invalid_params(format!(
                "cannot move {} into itself",
                path
            )));
        }
        paths.push(path);
    }

    let targets = copy(session, sources, destination, settings).await?;

    for (path, target) in paths.iter().zip(&targets) {
        if path != target {
            session.unlink(path).await?;
        }
    }
    Ok(())
}
