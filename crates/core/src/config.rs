use serde::Deserialize;
use std::path::PathBuf;

fn default_main_name() -> String {
    "report".to_string()
}

fn default_max_section_depth() -> usize {
    6
}

fn default_split_budget() -> usize {
    256 * 1024
}

/// Per-document settings.
///
/// Every field has a default, so `{}` is a valid JSON configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentConfig {
    /// Base name of the main output unit.
    #[serde(default = "default_main_name")]
    pub main_name: String,
    /// Directory to write units into. Output is kept in memory when unset.
    #[serde(default)]
    pub base_path: Option<PathBuf>,
    /// Deepest allowed section nesting; top-level sections are depth 1.
    #[serde(default = "default_max_section_depth")]
    pub max_section_depth: usize,
    /// Soft byte budget per unit for drivers that split their output.
    #[serde(default = "default_split_budget")]
    pub html_split_budget: usize,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            main_name: default_main_name(),
            base_path: None,
            max_section_depth: default_max_section_depth(),
            html_split_budget: default_split_budget(),
        }
    }
}

impl DocumentConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_json_yields_defaults() {
        let config = DocumentConfig::from_json("{}").unwrap();
        assert_eq!(config, DocumentConfig::default());
        assert_eq!(config.main_name, "report");
        assert_eq!(config.max_section_depth, 6);
    }

    #[test]
    fn test_partial_override() {
        let config =
            DocumentConfig::from_json(r#"{"mainName":"paper","basePath":"out","htmlSplitBudget":1024}"#)
                .unwrap();
        assert_eq!(config.main_name, "paper");
        assert_eq!(config.base_path, Some(PathBuf::from("out")));
        assert_eq!(config.html_split_budget, 1024);
        assert_eq!(config.max_section_depth, 6);
    }
}
