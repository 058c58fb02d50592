//! Configuration values
//!
//! The resolved, algorithm-facing result of building one requirement. One
//! variant per requirement variant; the `type` tag names it on the wire.

use prism_core::{DatabaseConnection, FileInput, RelationalInput, TableInput, ValueType};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ConfigurationValue {
    #[serde(rename = "ConfigurationValueString")]
    String { identifier: String, values: Vec<String> },
    #[serde(rename = "ConfigurationValueInteger")]
    Integer { identifier: String, values: Vec<i64> },
    #[serde(rename = "ConfigurationValueFloat")]
    Float { identifier: String, values: Vec<f64> },
    #[serde(rename = "ConfigurationValueBoolean")]
    Boolean { identifier: String, values: Vec<bool> },
    #[serde(rename = "ConfigurationValueRadioBox")]
    RadioBox { identifier: String, values: Vec<String> },
    #[serde(rename = "ConfigurationValueCheckBox")]
    CheckBox { identifier: String, values: Vec<Vec<String>> },
    #[serde(rename = "ConfigurationValueList")]
    List { identifier: String, values: Vec<String> },
    #[serde(rename = "ConfigurationValueFileInput")]
    FileInput { identifier: String, values: Vec<FileInput> },
    #[serde(rename = "ConfigurationValueTableInput")]
    TableInput { identifier: String, values: Vec<TableInput> },
    #[serde(rename = "ConfigurationValueRelationalInput")]
    RelationalInput { identifier: String, values: Vec<RelationalInput> },
    #[serde(rename = "ConfigurationValueDatabaseConnection")]
    DatabaseConnection { identifier: String, values: Vec<DatabaseConnection> },
}

impl ConfigurationValue {
    pub fn identifier(&self) -> &str {
        match self {
            ConfigurationValue::String { identifier, .. }
            | ConfigurationValue::Integer { identifier, .. }
            | ConfigurationValue::Float { identifier, .. }
            | ConfigurationValue::Boolean { identifier, .. }
            | ConfigurationValue::RadioBox { identifier, .. }
            | ConfigurationValue::CheckBox { identifier, .. }
            | ConfigurationValue::List { identifier, .. }
            | ConfigurationValue::FileInput { identifier, .. }
            | ConfigurationValue::TableInput { identifier, .. }
            | ConfigurationValue::RelationalInput { identifier, .. }
            | ConfigurationValue::DatabaseConnection { identifier, .. } => identifier,
        }
    }

    pub fn value_type(&self) -> ValueType {
        match self {
            ConfigurationValue::String { .. }
            | ConfigurationValue::RadioBox { .. }
            | ConfigurationValue::List { .. } => ValueType::String,
            ConfigurationValue::Integer { .. } => ValueType::Integer,
            ConfigurationValue::Float { .. } => ValueType::Float,
            ConfigurationValue::Boolean { .. } => ValueType::Boolean,
            ConfigurationValue::CheckBox { .. } => ValueType::StringList,
            ConfigurationValue::FileInput { .. } => ValueType::FileInput,
            ConfigurationValue::TableInput { .. } => ValueType::TableInput,
            ConfigurationValue::RelationalInput { .. } => ValueType::RelationalInput,
            ConfigurationValue::DatabaseConnection { .. } => ValueType::DatabaseConnection,
        }
    }

    /// Number of resolved slots
    pub fn len(&self) -> usize {
        match self {
            ConfigurationValue::String { values, .. }
            | ConfigurationValue::RadioBox { values, .. }
            | ConfigurationValue::List { values, .. } => values.len(),
            ConfigurationValue::Integer { values, .. } => values.len(),
            ConfigurationValue::Float { values, .. } => values.len(),
            ConfigurationValue::Boolean { values, .. } => values.len(),
            ConfigurationValue::CheckBox { values, .. } => values.len(),
            ConfigurationValue::FileInput { values, .. } => values.len(),
            ConfigurationValue::TableInput { values, .. } => values.len(),
            ConfigurationValue::RelationalInput { values, .. } => values.len(),
            ConfigurationValue::DatabaseConnection { values, .. } => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // ========== Safe Accessors (never panic) ==========

    /// String-valued payloads: plain strings, radio box selections and lists
    pub fn as_strings(&self) -> Option<&[String]> {
        match self {
            ConfigurationValue::String { values, .. }
            | ConfigurationValue::RadioBox { values, .. }
            | ConfigurationValue::List { values, .. } => Some(values.as_slice()),
            _ => None,
        }
    }

    pub fn as_integers(&self) -> Option<&[i64]> {
        match self {
            ConfigurationValue::Integer { values, .. } => Some(values.as_slice()),
            _ => None,
        }
    }

    pub fn as_floats(&self) -> Option<&[f64]> {
        match self {
            ConfigurationValue::Float { values, .. } => Some(values.as_slice()),
            _ => None,
        }
    }

    pub fn as_booleans(&self) -> Option<&[bool]> {
        match self {
            ConfigurationValue::Boolean { values, .. } => Some(values.as_slice()),
            _ => None,
        }
    }

    pub fn as_selections(&self) -> Option<&[Vec<String>]> {
        match self {
            ConfigurationValue::CheckBox { values, .. } => Some(values.as_slice()),
            _ => None,
        }
    }

    pub fn as_file_inputs(&self) -> Option<&[FileInput]> {
        match self {
            ConfigurationValue::FileInput { values, .. } => Some(values.as_slice()),
            _ => None,
        }
    }

    pub fn as_table_inputs(&self) -> Option<&[TableInput]> {
        match self {
            ConfigurationValue::TableInput { values, .. } => Some(values.as_slice()),
            _ => None,
        }
    }

    pub fn as_relational_inputs(&self) -> Option<&[RelationalInput]> {
        match self {
            ConfigurationValue::RelationalInput { values, .. } => Some(values.as_slice()),
            _ => None,
        }
    }

    pub fn as_database_connections(&self) -> Option<&[DatabaseConnection]> {
        match self {
            ConfigurationValue::DatabaseConnection { values, .. } => Some(values.as_slice()),
            _ => None,
        }
    }
}
