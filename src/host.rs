use std::collections::BTreeMap;
use std::process;

use anyhow::{Context, Result};
use clap::Command;
use tracing::{debug, info};

use crate::console::Console;
use crate::plugin::loader::LoadedPlugin;
use crate::plugin::store::ArtifactStore;

/// The host CLI: its own builtin commands plus every loaded plugin's command
/// tree registered as a top-level subcommand.
///
/// Dispatching a plugin subcommand forwards the remaining argv to the
/// installed binary as a child process; the host never loads foreign code
/// into its own process image.
pub struct HostCli {
    root: Command,
    store: ArtifactStore,
    plugins: BTreeMap<String, LoadedPlugin>,
}

impl HostCli {
    pub fn new(store: ArtifactStore) -> Self {
        let root = Command::new("pylon")
            .about("A pluggable command-line host")
            .version(env!("CARGO_PKG_VERSION"))
            .arg_required_else_help(true)
            .subcommand(Command::new("plugins").about("List installed plugins"));

        Self {
            root,
            store,
            plugins: BTreeMap::new(),
        }
    }

    /// Attach one loaded plugin as a named top-level subcommand.
    pub fn register(&mut self, plugin: LoadedPlugin) {
        debug!("registering plugin command '{}'", plugin.name);
        self.root = self.root.clone().subcommand(plugin.command.clone());
        self.plugins.insert(plugin.name.clone(), plugin);
    }

    pub fn register_all(&mut self, plugins: impl IntoIterator<Item = LoadedPlugin>) {
        for plugin in plugins {
            self.register(plugin);
        }
    }

    pub fn plugin_count(&self) -> usize {
        self.plugins.len()
    }

    /// Run one invocation. Plugin subcommands bypass host-side argument
    /// parsing entirely: the plugin binary re-parses its own argv, so the
    /// host forwards the raw tail, hidden subcommands included.
    pub fn run(&mut self, argv: &[String], console: &mut dyn Console) -> Result<i32> {
        if let Some(name) = argv.get(1) {
            if self.plugins.contains_key(name.as_str()) {
                return self.forward(name, &argv[2..]);
            }
        }

        let matches = match self.root.clone().try_get_matches_from(argv) {
            Ok(matches) => matches,
            Err(err) => {
                err.print()?;
                return Ok(err.exit_code());
            }
        };

        match matches.subcommand() {
            Some(("plugins", _)) => {
                for line in self.plugin_listing() {
                    console.out(&line);
                }
                Ok(0)
            }
            _ => Ok(0),
        }
    }

    /// Spawn the managed binary with the remaining argv and propagate its
    /// exit code.
    fn forward(&self, name: &str, args: &[String]) -> Result<i32> {
        let binary = self.store.binary_path(name);
        info!("forwarding to plugin '{name}' ({})", binary.display());

        let status = process::Command::new(&binary)
            .args(args)
            .status()
            .with_context(|| format!("failed to run plugin binary {}", binary.display()))?;

        Ok(status.code().unwrap_or(1))
    }

    /// One row per installed binary, described or not, plus loaded plugins
    /// whose command surface registered this run.
    pub fn plugin_listing(&self) -> Vec<String> {
        let installed = self.store.installed_binaries();
        if installed.is_empty() {
            return vec!["plugins: none installed".to_string()];
        }

        installed
            .into_iter()
            .map(|(name, path)| {
                let status = if self.plugins.contains_key(&name) {
                    "loaded"
                } else {
                    "undescribed"
                };
                format!("plugin {name} [{status}] ({})", path.display())
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugin::installer::tests::ScriptedConsole;
    use crate::plugin::introspect::introspect;
    use crate::plugin::loader::PluginLoader;
    use std::fs;

    fn fixture() -> (tempfile::TempDir, ArtifactStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());
        store.ensure_dir().unwrap();
        (dir, store)
    }

    fn install_described(store: &ArtifactStore, name: &str) {
        fs::write(store.binary_path(name), b"bin").unwrap();
        introspect(
            &Command::new(name.to_string()).subcommand(Command::new("run")),
            name,
        )
            .write_to(&store.definition_path(name))
            .unwrap();
    }

    #[test]
    fn loaded_plugins_become_subcommands() {
        let (_dir, store) = fixture();
        install_described(&store, "demo");

        let loaded = PluginLoader::new(&store).load_all();
        let mut host = HostCli::new(store);
        host.register_all(loaded);

        assert_eq!(host.plugin_count(), 1);
        assert!(
            host.root
                .get_subcommands()
                .any(|sub| sub.get_name() == "demo")
        );
    }

    #[test]
    fn plugins_listing_marks_undescribed_binaries() {
        let (_dir, store) = fixture();
        install_described(&store, "demo");
        fs::write(store.binary_path("mystery"), b"bin").unwrap();

        let loaded = PluginLoader::new(&store).load_all();
        let mut host = HostCli::new(store);
        host.register_all(loaded);

        let listing = host.plugin_listing();
        assert_eq!(listing.len(), 2);
        assert!(listing[0].starts_with("plugin demo [loaded]"));
        assert!(listing[1].starts_with("plugin mystery [undescribed]"));
    }

    #[test]
    fn plugins_subcommand_prints_the_listing() {
        let (_dir, store) = fixture();
        let mut host = HostCli::new(store);

        let mut console = ScriptedConsole::new(&[]);
        let argv = vec!["pylon".to_string(), "plugins".to_string()];
        let code = host.run(&argv, &mut console).unwrap();

        assert_eq!(code, 0);
        assert_eq!(console.lines, ["plugins: none installed"]);
    }

    #[test]
    fn unknown_subcommand_fails_with_nonzero_exit() {
        let (_dir, store) = fixture();
        let mut host = HostCli::new(store);

        let mut console = ScriptedConsole::new(&[]);
        let argv = vec!["pylon".to_string(), "nope".to_string()];
        let code = host.run(&argv, &mut console).unwrap();
        assert_ne!(code, 0);
    }
}
