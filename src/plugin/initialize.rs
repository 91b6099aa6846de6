use std::path::Path;

use anyhow::Result;
use clap::Command;
use tracing::info;

use super::installer::PluginInstaller;
use super::introspect::introspect;
use super::store::ArtifactStore;
use crate::console::Console;

/// Executes a subcommand of the plugin's own command tree, as if the user
/// had typed `<plugin> <args…>`.
pub trait Dispatcher {
    fn execute(&mut self, args: &[String]) -> Result<i32>;
}

/// The `initialize` operation every plugin exposes as a hidden subcommand.
///
/// Linear pipeline: ensure directory → install binary → verify binary →
/// generate definition → maybe hand off to `configure`. Fatal failures abort
/// with the error surfaced verbatim; there are no retries.
pub struct InitializeCommand<'a> {
    store: &'a ArtifactStore,
    console: &'a mut dyn Console,
}

impl<'a> InitializeCommand<'a> {
    pub fn new(store: &'a ArtifactStore, console: &'a mut dyn Console) -> Self {
        Self { store, console }
    }

    /// `root` is the plugin's top-level command; its name is the plugin name.
    pub fn run(
        &mut self,
        root: &Command,
        plugin_path: Option<&Path>,
        dispatcher: &mut dyn Dispatcher,
    ) -> Result<()> {
        let name = root.get_name().to_string();
        self.console.out(&format!("Initializing plugin '{name}'"));

        PluginInstaller::new(self.store).install(&name, plugin_path, &mut *self.console)?;

        info!("generating plugin definition for '{name}'");
        self.console
            .out(&format!("Generating plugin definition for '{name}'"));
        let definition = introspect(root, &name);
        definition.write_to(&self.store.definition_path(&name))?;

        if has_configure(root) {
            dispatcher.execute(&["configure".to_string()])?;
        } else {
            self.console.out(&format!(
                "Plugin configuration is no longer performed implicitly during 'initialize'; \
                 it moved to 'configure'. Plugin '{name}' does not declare a 'configure' \
                 subcommand."
            ));
        }

        Ok(())
    }
}

fn has_configure(root: &Command) -> bool {
    root.get_subcommands()
        .any(|sub| sub.get_name() == "configure")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PluginError;
    use crate::plugin::definition::PluginDefinition;
    use crate::plugin::installer::tests::ScriptedConsole;
    use std::fs;
    use std::path::PathBuf;

    /// Dispatcher fake that records calls and whether the definition file
    /// existed at hand-off time.
    struct RecordingDispatcher {
        definition_path: PathBuf,
        calls: Vec<Vec<String>>,
        definition_present_at_call: bool,
    }

    impl RecordingDispatcher {
        fn new(definition_path: PathBuf) -> Self {
            Self {
                definition_path,
                calls: Vec::new(),
                definition_present_at_call: false,
            }
        }
    }

    impl Dispatcher for RecordingDispatcher {
        fn execute(&mut self, args: &[String]) -> Result<i32> {
            self.definition_present_at_call = self.definition_path.exists();
            self.calls.push(args.to_vec());
            Ok(0)
        }
    }

    fn fixture() -> (tempfile::TempDir, ArtifactStore, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path().join("plugins"));
        let source = dir.path().join("demo-src");
        fs::write(&source, b"plugin binary").unwrap();
        (dir, store, source)
    }

    fn plugin_command(with_configure: bool) -> Command {
        let mut root = Command::new("demo")
            .about("Demo plugin")
            .subcommand(Command::new("sync"))
            .subcommand(Command::new("initialize").hide(true));
        if with_configure {
            root = root.subcommand(Command::new("configure"));
        }
        root
    }

    #[test]
    fn initialize_writes_definition_and_hands_off_to_configure() {
        let (_dir, store, source) = fixture();
        let mut console = ScriptedConsole::new(&[]);
        let mut dispatcher = RecordingDispatcher::new(store.definition_path("demo"));

        InitializeCommand::new(&store, &mut console)
            .run(&plugin_command(true), Some(&source), &mut dispatcher)
            .unwrap();

        let definition = PluginDefinition::read_from(&store.definition_path("demo")).unwrap();
        assert_eq!(definition.name, "demo");
        assert_eq!(definition.commands.node_count(), 3); // demo, sync, configure

        assert_eq!(dispatcher.calls, vec![vec!["configure".to_string()]]);
        assert!(dispatcher.definition_present_at_call);
    }

    #[test]
    fn without_configure_an_informational_message_is_emitted() {
        let (_dir, store, source) = fixture();
        let mut console = ScriptedConsole::new(&[]);
        let mut dispatcher = RecordingDispatcher::new(store.definition_path("demo"));

        InitializeCommand::new(&store, &mut console)
            .run(&plugin_command(false), Some(&source), &mut dispatcher)
            .unwrap();

        assert!(dispatcher.calls.is_empty());
        assert!(
            console
                .lines
                .iter()
                .any(|line| line.contains("does not declare a 'configure' subcommand"))
        );
    }

    #[test]
    fn missing_binary_aborts_before_the_definition_is_written() {
        let (_dir, store, _source) = fixture();
        let mut console = ScriptedConsole::new(&[]);
        let mut dispatcher = RecordingDispatcher::new(store.definition_path("demo"));

        let err = InitializeCommand::new(&store, &mut console)
            .run(&plugin_command(true), None, &mut dispatcher)
            .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<PluginError>(),
            Some(PluginError::ArtifactMissing(_))
        ));
        assert!(!store.definition_path("demo").exists());
        assert!(dispatcher.calls.is_empty());
    }

    #[test]
    fn reinitialize_overwrites_the_definition() {
        let (_dir, store, source) = fixture();
        let mut console = ScriptedConsole::new(&["y"]);
        let mut dispatcher = RecordingDispatcher::new(store.definition_path("demo"));

        let mut command = InitializeCommand::new(&store, &mut console);
        command
            .run(&plugin_command(false), Some(&source), &mut dispatcher)
            .unwrap();
        command
            .run(&plugin_command(true), Some(&source), &mut dispatcher)
            .unwrap();

        let definition = PluginDefinition::read_from(&store.definition_path("demo")).unwrap();
        assert_eq!(definition.commands.node_count(), 3);
    }
}
