use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::PluginError;

/// Persisted description of one plugin's command surface, stored as JSON at
/// `<managed dir>/<name>.plugin`. `name` equals the installed binary's stem;
/// a definition with no corresponding binary is orphaned and ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginDefinition {
    pub name: String,
    pub commands: CommandNode,
}

/// One command or subcommand. Sibling names are unique; child order is
/// declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandNode {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<OptionDef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<CommandNode>,
}

/// Flag/option metadata. `names` keeps the dashed spellings for named options
/// (`--force`, `-f`) and the bare value name for positionals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionDef {
    pub names: Vec<String>,
    #[serde(default)]
    pub arity: Arity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,
}

/// Value arity of one option. `max: None` means unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Arity {
    pub min: usize,
    pub max: Option<usize>,
}

impl Default for Arity {
    fn default() -> Self {
        // A plain flag takes no values.
        Self {
            min: 0,
            max: Some(0),
        }
    }
}

impl CommandNode {
    pub fn node_count(&self) -> usize {
        1 + self
            .children
            .iter()
            .map(CommandNode::node_count)
            .sum::<usize>()
    }
}

impl PluginDefinition {
    pub fn read_from(path: &Path) -> Result<Self, PluginError> {
        let raw = fs::read_to_string(path).map_err(|source| PluginError::DefinitionRead {
            path: path.to_path_buf(),
            source,
        })?;

        serde_json::from_str(&raw).map_err(|source| PluginError::DefinitionParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Atomic-or-absent write: serialize into a temp file next to `path`,
    /// then rename over the destination. A failure never leaves a partial
    /// file committed at `path`.
    pub fn write_to(&self, path: &Path) -> Result<(), PluginError> {
        let serialization = |source| PluginError::Serialization {
            path: path.to_path_buf(),
            source,
        };

        let bytes = serde_json::to_vec_pretty(self)
            .map_err(std::io::Error::from)
            .map_err(serialization)?;

        let tmp = path.with_extension("plugin.tmp");
        fs::write(&tmp, bytes).map_err(serialization)?;

        if let Err(source) = fs::rename(&tmp, path) {
            let _ = fs::remove_file(&tmp);
            return Err(serialization(source));
        }

        Ok(())
    }
}
