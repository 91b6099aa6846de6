use clap::Command;

use super::definition::{Arity, CommandNode, OptionDef, PluginDefinition};

/// Narrow capability for walking a command tree. The introspector depends
/// only on this, not on the dispatcher's internal representation.
pub trait Introspectable {
    fn name(&self) -> String;
    fn description(&self) -> Option<String>;
    fn options(&self) -> Vec<OptionDef>;
    fn children(&self) -> Vec<&Self>;
}

impl Introspectable for Command {
    fn name(&self) -> String {
        self.get_name().to_string()
    }

    fn description(&self) -> Option<String> {
        self.get_about().map(|about| about.to_string())
    }

    fn options(&self) -> Vec<OptionDef> {
        self.get_arguments()
            .filter(|arg| !arg.is_hide_set())
            .map(|arg| {
                let mut names = Vec::new();
                if let Some(long) = arg.get_long() {
                    names.push(format!("--{long}"));
                }
                if let Some(short) = arg.get_short() {
                    names.push(format!("-{short}"));
                }
                if names.is_empty() {
                    // Positional: keep the bare id.
                    names.push(arg.get_id().to_string());
                }

                let arity = match arg.get_num_args() {
                    Some(range) => Arity {
                        min: range.min_values(),
                        max: match range.max_values() {
                            usize::MAX => None,
                            max => Some(max),
                        },
                    },
                    None if arg.get_action().takes_values() => Arity {
                        min: 1,
                        max: Some(1),
                    },
                    None => Arity::default(),
                };

                OptionDef {
                    names,
                    arity,
                    help: arg.get_help().map(|help| help.to_string()),
                }
            })
            .collect()
    }

    fn children(&self) -> Vec<&Self> {
        // Hidden subcommands (like the mandatory `initialize`) stay out of
        // the persisted definition.
        self.get_subcommands()
            .filter(|sub| !sub.is_hide_set())
            .collect()
    }
}

/// Walk `root` depth-first, preserving declaration order, into a serializable
/// plugin definition. Pure transformation: no I/O, deterministic.
pub fn introspect<T: Introspectable + ?Sized>(root: &T, plugin_name: &str) -> PluginDefinition {
    PluginDefinition {
        name: plugin_name.to_string(),
        commands: walk(root),
    }
}

fn walk<T: Introspectable + ?Sized>(node: &T) -> CommandNode {
    CommandNode {
        name: node.name(),
        description: node.description(),
        options: node.options(),
        children: node.children().into_iter().map(walk).collect(),
    }
}
