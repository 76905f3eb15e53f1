use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Editor configuration. Unknown keys are ignored when parsing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EditorOptions {
    /// Placed between cell contents when merging or reading selected text
    pub join_separator: String,
    /// Content of cells created by split and insert operations
    pub new_cell_content: String,
}

impl Default for EditorOptions {
    fn default() -> Self {
        Self {
            join_separator: ",".to_string(),
            new_cell_content: String::new(),
        }
    }
}

impl EditorOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_join_separator(mut self, separator: impl Into<String>) -> Self {
        self.join_separator = separator.into();
        self
    }

    pub fn with_new_cell_content(mut self, content: impl Into<String>) -> Self {
        self.new_cell_content = content.into();
        self
    }
}
