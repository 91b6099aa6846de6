use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Failures raised by the plugin lifecycle and loader.
#[derive(Debug, Error)]
pub enum PluginError {
    /// The destination binary is absent after the install step. Fatal for
    /// `initialize`; the definition file is never written in this case.
    #[error("plugin binary does not exist: {}", .0.display())]
    ArtifactMissing(PathBuf),

    #[error("cannot create plugin directory {}: {source}", .path.display())]
    DirectoryCreation {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot copy plugin binary {} -> {}: {source}", .from.display(), .to.display())]
    Copy {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The definition file could not be written. The write is atomic-or-absent:
    /// a failure never leaves a partial file at the definition path.
    #[error("cannot write plugin definition {}: {source}", .path.display())]
    Serialization {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot read plugin definition {}: {source}", .path.display())]
    DefinitionRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid plugin definition {}: {source}", .path.display())]
    DefinitionParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("plugin definition {} names '{found}', expected '{expected}'", .path.display())]
    NameMismatch {
        path: PathBuf,
        found: String,
        expected: String,
    },
}
