use std::path::PathBuf;

use clap::{Arg, ArgAction, Command};
use tracing::{debug, warn};

use super::definition::{CommandNode, OptionDef, PluginDefinition};
use super::store::ArtifactStore;
use crate::error::PluginError;

/// One plugin ready to attach to the host dispatcher.
#[derive(Debug, Clone)]
pub struct LoadedPlugin {
    pub name: String,
    pub command: Command,
    pub binary: PathBuf,
}

/// Scans the managed directory at host startup and rebuilds each plugin's
/// command tree from its persisted definition.
///
/// A broken plugin (missing or corrupt definition, name mismatch) is skipped
/// with a warning; the rest still load. Startup is never aborted here.
pub struct PluginLoader<'a> {
    store: &'a ArtifactStore,
}

impl<'a> PluginLoader<'a> {
    pub fn new(store: &'a ArtifactStore) -> Self {
        Self { store }
    }

    pub fn load_all(&self) -> Vec<LoadedPlugin> {
        let mut loaded = Vec::new();

        for (name, binary) in self.store.installed_binaries() {
            match self.load_one(&name) {
                Ok(command) => {
                    debug!("loaded plugin '{name}'");
                    loaded.push(LoadedPlugin {
                        name,
                        command,
                        binary,
                    });
                }
                Err(err) => {
                    warn!("skipping plugin '{name}': {err}");
                }
            }
        }

        loaded
    }

    fn load_one(&self, name: &str) -> Result<Command, PluginError> {
        let path = self.store.definition_path(name);
        let definition = PluginDefinition::read_from(&path)?;

        if definition.name != name {
            return Err(PluginError::NameMismatch {
                path,
                found: definition.name,
                expected: name.to_string(),
            });
        }

        Ok(build_command(&definition.commands))
    }
}

/// Rebuild a dispatcher command tree from a persisted definition. Inverse of
/// introspection for everything the definition records.
pub fn build_command(node: &CommandNode) -> Command {
    let mut command = Command::new(node.name.clone());

    if let Some(description) = &node.description {
        command = command.about(description.clone());
    }

    for option in &node.options {
        if let Some(arg) = build_arg(option) {
            command = command.arg(arg);
        }
    }

    for child in &node.children {
        command = command.subcommand(build_command(child));
    }

    command
}

fn build_arg(option: &OptionDef) -> Option<Arg> {
    let first = option.names.first()?;
    let id = first.trim_start_matches('-').to_string();
    let mut arg = Arg::new(id);

    for name in &option.names {
        if let Some(long) = name.strip_prefix("--") {
            arg = arg.long(long.to_string());
        } else if let Some(short) = name.strip_prefix('-') {
            if let Some(ch) = short.chars().next() {
                arg = arg.short(ch);
            }
        }
        // A bare name is a positional; nothing to set beyond the id.
    }

    arg = match (option.arity.min, option.arity.max) {
        (0, Some(0)) => arg.action(ArgAction::SetTrue),
        (min, Some(max)) => arg.num_args(min..=max),
        (min, None) => arg.num_args(min..),
    };

    if let Some(help) = &option.help {
        arg = arg.help(help.clone());
    }

    Some(arg)
}
