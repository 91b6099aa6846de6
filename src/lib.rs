//! Pylon: a pluggable command-line host.
//!
//! Plugins are independently distributed binaries living in one managed
//! directory. Each exposes a hidden `initialize` subcommand (implemented by
//! [`plugin::PluginRunner`]) that installs the binary, introspects the
//! plugin's command tree, and persists it as a `.plugin` definition. At host
//! startup [`plugin::PluginLoader`] rebuilds those trees and registers them
//! as first-class subcommands; invoking one forwards to the plugin binary as
//! a child process.

pub mod config;
pub mod console;
pub mod error;
pub mod host;
pub mod plugin;
