//! Parser configuration
//!
//! Department-specific policy that the source sheets hard-code: which
//! departments get lab-run annotation and which ones write room numbers in
//! parentheses. Loaded by the CLI from `config.toml`; the engine only
//! receives the deserialized value.

use crate::error::{ParseError, Result};
use serde::{Deserialize, Serialize};

/// Lab-department entry meaning "every department".
pub const ALL_DEPARTMENTS: &str = "*";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParserConfig {
    /// Departments whose entries are checked for multi-slot lab runs
    #[serde(default = "default_lab_departments")]
    pub lab_departments: Vec<String>,

    /// Value written to `lab_annotation_source` on annotated entries
    #[serde(default = "default_lab_annotation_source")]
    pub lab_annotation_source: String,

    /// Departments whose "(Room 14)" style mentions are trusted
    #[serde(default = "default_paren_room_departments")]
    pub paren_room_departments: Vec<String>,

    /// Duration given to labs detected only by the word "Lab"
    #[serde(default = "default_keyword_lab_hours")]
    pub keyword_lab_hours: u32,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            lab_departments: default_lab_departments(),
            lab_annotation_source: default_lab_annotation_source(),
            paren_room_departments: default_paren_room_departments(),
            keyword_lab_hours: default_keyword_lab_hours(),
        }
    }
}

impl ParserConfig {
    pub fn validate(&self) -> Result<()> {
        if let Some(pos) = self.lab_departments.iter().position(|d| d.trim().is_empty()) {
            return Err(ParseError::Config(format!(
                "lab_departments[{pos}] is an empty department name"
            )));
        }
        if let Some(pos) = self.paren_room_departments.iter().position(|d| d.trim().is_empty()) {
            return Err(ParseError::Config(format!(
                "paren_room_departments[{pos}] is an empty department name"
            )));
        }
        if self.keyword_lab_hours == 0 {
            return Err(ParseError::Config("keyword_lab_hours must be at least 1".to_string()));
        }
        Ok(())
    }

    /// Whether lab runs are annotated for `department`.
    pub fn is_lab_department(&self, department: &str) -> bool {
        self.lab_departments
            .iter()
            .any(|d| d.trim() == ALL_DEPARTMENTS || crate::departments::same_department(d, department))
    }
}

fn default_lab_departments() -> Vec<String> {
    vec![crate::departments::CS_IT.to_string()]
}
fn default_lab_annotation_source() -> String { "auto:lab-detection/v1".to_string() }
fn default_paren_room_departments() -> Vec<String> {
    ["EDUCATION", "PSYCHOLOGY", "SSISS", "SISS", "BIO TECHNOLOGY", "BIOTECH", "BIOTECHNOLOGY", "URDU"]
        .iter()
        .map(|d| d.to_string())
        .collect()
}
fn default_keyword_lab_hours() -> u32 { 3 }

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        let config = ParserConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.is_lab_department("CS & IT"));
        assert!(config.is_lab_department("cs and it"));
        assert!(!config.is_lab_department("PHYSICS"));
    }

    #[test]
    fn test_wildcard_lab_department() {
        let config = ParserConfig {
            lab_departments: vec!["*".to_string()],
            ..ParserConfig::default()
        };
        assert!(config.is_lab_department("PHYSICS"));
    }

    #[test]
    fn test_rejects_empty_names_and_zero_hours() {
        let config = ParserConfig {
            lab_departments: vec!["CS & IT".to_string(), " ".to_string()],
            ..ParserConfig::default()
        };
        assert!(matches!(config.validate(), Err(ParseError::Config(msg)) if msg.contains("lab_departments[1]")));

        let config = ParserConfig {
            keyword_lab_hours: 0,
            ..ParserConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let config: ParserConfig = serde_json::from_str(r#"{"keyword_lab_hours": 2}"#).unwrap();
        assert_eq!(config.keyword_lab_hours, 2);
        assert_eq!(config.lab_departments, vec!["CS & IT"]);
        assert_eq!(config.lab_annotation_source, "auto:lab-detection/v1");
    }
}
