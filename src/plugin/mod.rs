pub mod definition;
pub mod initialize;
pub mod installer;
pub mod introspect;
pub mod loader;
pub mod runner;
pub mod store;

pub use definition::{CommandNode, OptionDef, PluginDefinition};
pub use initialize::{Dispatcher, InitializeCommand};
pub use installer::PluginInstaller;
pub use introspect::{Introspectable, introspect};
pub use loader::{LoadedPlugin, PluginLoader};
pub use runner::PluginRunner;
pub use store::{ArtifactStore, BINARY_EXTENSION};
