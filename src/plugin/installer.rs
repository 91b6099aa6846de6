use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::store::ArtifactStore;
use crate::console::Console;
use crate::error::PluginError;

/// Places a plugin binary into the managed directory.
///
/// A relative (or absent) source path means the binary is expected to be in
/// place already; only the existence check runs. Overwriting an installed
/// binary asks for confirmation, defaulting to yes.
pub struct PluginInstaller<'a> {
    store: &'a ArtifactStore,
}

impl<'a> PluginInstaller<'a> {
    pub fn new(store: &'a ArtifactStore) -> Self {
        Self { store }
    }

    pub fn install(
        &self,
        name: &str,
        source: Option<&Path>,
        console: &mut dyn Console,
    ) -> Result<PathBuf, PluginError> {
        debug!("creating plugin directory");
        self.store.ensure_dir()?;

        let destination = self.store.binary_path(name);

        if let Some(source) = source.filter(|path| path.is_absolute()) {
            // Copying a file onto itself truncates it; the installed binary
            // is already in place, so there is nothing to do.
            if source == destination {
                debug!("source is the installed binary for '{name}', skipping copy");
            } else if destination.exists() {
                let reply =
                    console.prompt("The plugin is already installed, overwrite [Yn]?", "Y");
                if reply.is_empty() || reply.eq_ignore_ascii_case("y") {
                    copy(source, &destination)?;
                    info!("plugin binary overwritten for '{name}'");
                }
            } else {
                copy(source, &destination)?;
                info!("copied plugin binary for '{name}'");
            }
        }

        if !destination.exists() {
            return Err(PluginError::ArtifactMissing(destination));
        }

        Ok(destination)
    }
}

fn copy(from: &Path, to: &Path) -> Result<(), PluginError> {
    fs::copy(from, to)
        .map(|_| ())
        .map_err(|source| PluginError::Copy {
            from: from.to_path_buf(),
            to: to.to_path_buf(),
            source,
        })
}
