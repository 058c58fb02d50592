//! Requirement value types
//!
//! The semantic domains a configuration requirement can resolve to, and the
//! resource handles that typed input references resolve into.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Value domain produced by a requirement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueType {
    String,
    Integer,
    Float,
    Boolean,
    StringList,
    FileInput,
    TableInput,
    RelationalInput,
    DatabaseConnection,
}

impl ValueType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueType::String => "string",
            ValueType::Integer => "integer",
            ValueType::Float => "float",
            ValueType::Boolean => "boolean",
            ValueType::StringList => "string_list",
            ValueType::FileInput => "file_input",
            ValueType::TableInput => "table_input",
            ValueType::RelationalInput => "relational_input",
            ValueType::DatabaseConnection => "database_connection",
        }
    }

    /// True for value types that reference an externally managed resource
    pub fn is_reference(&self) -> bool {
        matches!(
            self,
            ValueType::FileInput
                | ValueType::TableInput
                | ValueType::RelationalInput
                | ValueType::DatabaseConnection
        )
    }
}

impl std::fmt::Display for ValueType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ========== Resource Handles ==========

fn default_separator() -> char {
    ','
}

fn default_quote() -> char {
    '"'
}

fn default_true() -> bool {
    true
}

/// Parsing options for a delimited text file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CsvOptions {
    #[serde(default = "default_separator")]
    pub separator: char,
    #[serde(default = "default_quote")]
    pub quote_char: char,
    /// First (non-skipped) line holds column names
    #[serde(default = "default_true")]
    pub header: bool,
    #[serde(default)]
    pub skip_lines: usize,
    /// Field content treated as a missing value
    #[serde(default)]
    pub null_value: String,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            separator: default_separator(),
            quote_char: default_quote(),
            header: true,
            skip_lines: 0,
            null_value: String::new(),
        }
    }
}

/// A registered file, resolved together with the caller's parsing options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileInput {
    pub file_name: String,
    pub path: PathBuf,
    #[serde(default)]
    pub options: CsvOptions,
}

/// Database product behind a connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DbSystem {
    Postgresql,
    Mysql,
    Sqlite,
    Oracle,
    Db2,
    Hana,
}

/// A registered database connection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseConnection {
    pub identifier: String,
    pub url: String,
    pub system: DbSystem,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

/// A table reachable through a registered connection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableInput {
    pub connection: DatabaseConnection,
    pub table_name: String,
}

/// Row-oriented input an algorithm can iterate, backed by a file or a table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "lowercase")]
pub enum RelationalInput {
    File(FileInput),
    Table(TableInput),
}

impl RelationalInput {
    /// Name used when reporting results against this input
    pub fn relation_name(&self) -> &str {
        match self {
            RelationalInput::File(f) => &f.file_name,
            RelationalInput::Table(t) => &t.table_name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_csv_options_defaults_from_empty_object() {
        let options: CsvOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(options, CsvOptions::default());
        assert_eq!(options.separator, ',');
        assert!(options.header);
    }

    #[test]
    fn test_reference_value_types() {
        assert!(ValueType::FileInput.is_reference());
        assert!(ValueType::DatabaseConnection.is_reference());
        assert!(!ValueType::StringList.is_reference());
        assert_eq!(ValueType::RelationalInput.to_string(), "relational_input");
    }

    #[test]
    fn test_relational_input_tagged_by_source() {
        let input = RelationalInput::File(FileInput {
            file_name: "people.csv".to_string(),
            path: PathBuf::from("/data/people.csv"),
            options: CsvOptions::default(),
        });
        let json = serde_json::to_value(&input).unwrap();
        assert_eq!(json["source"], "file");
        assert_eq!(json["fileName"], "people.csv");
        assert_eq!(input.relation_name(), "people.csv");
    }
}
