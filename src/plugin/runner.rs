use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::{Result, bail};
use clap::{Arg, ArgMatches, Command};

use super::initialize::{Dispatcher, InitializeCommand};
use super::store::ArtifactStore;
use crate::console::{Console, StdConsole};

pub type Handler = Box<dyn FnMut(&ArgMatches) -> Result<()>>;

/// Plugin-side entry point: the half of the ABI a plugin binary embeds.
///
/// Wraps the plugin's top-level command, attaches the mandatory hidden
/// `initialize` subcommand, and routes matched subcommands to registered
/// handlers. Also acts as the dispatcher for the `configure` hand-off.
pub struct PluginRunner {
    command: Command,
    handlers: HashMap<String, Handler>,
    store: ArtifactStore,
}

impl PluginRunner {
    pub fn new(command: Command, store: ArtifactStore) -> Self {
        let command = command.subcommand(
            Command::new("initialize").hide(true).arg(
                Arg::new("plugin-path")
                    .value_name("path to plugin")
                    .num_args(0..=1),
            ),
        );

        Self {
            command,
            handlers: HashMap::new(),
            store,
        }
    }

    /// Register the handler for one subcommand by name.
    pub fn handle(
        mut self,
        name: impl Into<String>,
        handler: impl FnMut(&ArgMatches) -> Result<()> + 'static,
    ) -> Self {
        self.handlers.insert(name.into(), Box::new(handler));
        self
    }

    pub fn run(&mut self) -> Result<i32> {
        let mut console = StdConsole;
        self.run_from(std::env::args(), &mut console)
    }

    pub fn run_from(
        &mut self,
        argv: impl IntoIterator<Item = String>,
        console: &mut dyn Console,
    ) -> Result<i32> {
        let matches = match self.command.clone().try_get_matches_from(argv) {
            Ok(matches) => matches,
            Err(err) => {
                err.print()?;
                return Ok(err.exit_code());
            }
        };

        match matches.subcommand() {
            Some(("initialize", sub)) => {
                let plugin_path = sub.get_one::<String>("plugin-path").map(PathBuf::from);
                let root = self.command.clone();
                let mut dispatcher = HandlerDispatch {
                    command: &root,
                    handlers: &mut self.handlers,
                };

                InitializeCommand::new(&self.store, console).run(
                    &root,
                    plugin_path.as_deref(),
                    &mut dispatcher,
                )?;
                Ok(0)
            }
            Some((name, sub)) => match self.handlers.get_mut(name) {
                Some(handler) => {
                    handler(sub)?;
                    Ok(0)
                }
                None => bail!("no handler registered for subcommand '{name}'"),
            },
            None => {
                self.command.print_help()?;
                Ok(2)
            }
        }
    }
}

/// Dispatches back into the plugin's own handlers, as if the user had typed
/// `<plugin> <args…>`.
struct HandlerDispatch<'a> {
    command: &'a Command,
    handlers: &'a mut HashMap<String, Handler>,
}

impl Dispatcher for HandlerDispatch<'_> {
    fn execute(&mut self, args: &[String]) -> Result<i32> {
        let Some(name) = args.first() else {
            bail!("cannot dispatch an empty command line");
        };

        let mut argv = vec![self.command.get_name().to_string()];
        argv.extend(args.iter().cloned());
        let matches = self.command.clone().try_get_matches_from(argv)?;

        let sub = matches
            .subcommand_matches(name)
            .cloned()
            .unwrap_or_default();

        match self.handlers.get_mut(name.as_str()) {
            Some(handler) => {
                handler(&sub)?;
                Ok(0)
            }
            None => bail!("no handler registered for subcommand '{name}'"),
        }
    }
}
