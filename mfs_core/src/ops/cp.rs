use super::options::Settings;
use super::session::Session;
use crate::error::{Error, Result};
use crate::node::Link;
use crate::resolve::{MfsPath, PathDescriptor, PathSource};
use tracing::debug;

/// A resolved copy source.
struct Source {
    path: MfsPath,
    desc: PathDescriptor,
}

impl Source {
    /// Name used when linking into an existing directory.
    fn default_name(&self) -> String {
        match self.path.source {
            PathSource::Reference(id) if self.path.is_root() => id.to_string(),
            _ => self.desc.name.clone(),
        }
    }

    fn link(&self, name: &str) -> Result<Link> {
        if name.is_empty() {
            return Err(Error::invalid_params(format!(
                "{} has no name to copy under",
                self.path
            )));
        }
        match (self.desc.id, self.desc.size) {
            (Some(id), Some(size)) => Link::new(name, id, size),
            _ => Err(Error::not_found(self.path.to_string())),
        }
    }
}

/// Link every source into the working root; returns the path each one
/// landed at, in source order.
pub(super) async fn copy(
    session: &mut Session<'_>,
    sources: &[&str],
    destination: &str,
    settings: &Settings,
) -> Result<Vec<MfsPath>> {
    if sources.is_empty() {
        return Err(Error::invalid_params("Please supply at least one source"));
    }

    let destination = MfsPath::parse(destination)?;
    if !destination.is_namespace() {
        return Err(Error::invalid_params(format!(
            "cannot copy into a reference path: {}",
            destination
        )));
    }

    let mut resolved = Vec::with_capacity(sources.len());
    for source in sources {
        let path = MfsPath::parse(source)?;
        let desc = session.resolve(&path).await?;
        if !desc.exists {
            return Err(Error::not_found(path.to_string()));
        }
        resolved.push(Source { path, desc });
    }

    let dest = session.resolve(&destination).await?;

    // Pick the directory to link into and each source's name there
    let (dir, names): (MfsPath, Vec<String>) = if dest.exists && dest.is_directory() {
        let names = resolved.iter().map(Source::default_name).collect();
        (destination, names)
    } else if dest.exists {
        if resolved.len() > 1 {
            return Err(Error::already_exists(destination.to_string()));
        }
        let Some(parent) = destination.parent() else {
            return Err(Error::already_exists(destination.to_string()));
        };
        (parent, vec![destination.name().to_string()])
    } else if resolved.len() > 1 {
        if !settings.parents {
            return Err(Error::invalid_params(format!(
                "{} did not exist and more than one source was given, pass parents to create it",
                destination
            )));
        }
        let names = resolved.iter().map(Source::default_name).collect();
        (destination, names)
    } else {
        let Some(parent) = destination.parent() else {
            return Err(Error::invalid_params("cannot copy over the root"));
        };
        (parent, vec![destination.name().to_string()])
    };

    let mut entries = Vec::with_capacity(resolved.len());
    let mut targets = Vec::with_capacity(resolved.len());
    for (source, name) in resolved.iter().zip(&names) {
        entries.push(source.link(name)?);
        targets.push(dir.join(name));
    }

    debug!(dir = %dir, count = entries.len(), "copying entries");
    session
        .link_into(&dir, entries, false, settings.parents)
        .await?;
    Ok(targets)
}
