//! Configuration settings
//!
//! A setting is one raw, caller-supplied value for one slot of a requirement.
//! `ConfigurationSetting` is the tagged wire form; each requirement variant
//! converts it into its own typed setting through `FromSetting`.

use prism_core::CsvOptions;
use serde::{Deserialize, Serialize};

/// Reference to a registered file plus the options used to parse it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileInputSetting {
    pub file_name: String,
    #[serde(flatten)]
    pub options: CsvOptions,
}

impl FileInputSetting {
    pub fn new(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            options: CsvOptions::default(),
        }
    }

    pub fn with_options(mut self, options: CsvOptions) -> Self {
        self.options = options;
        self
    }
}

/// Reference to a table behind a registered connection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableInputSetting {
    pub connection: String,
    pub table: String,
}

/// Reference to a registered database connection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseConnectionSetting {
    pub connection: String,
}

/// A relational input is either a file or a table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "lowercase")]
pub enum RelationalInputSetting {
    File(FileInputSetting),
    Table(TableInputSetting),
}

/// Raw setting as exchanged with callers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ConfigurationSetting {
    #[serde(rename = "ConfigurationSettingString")]
    String { value: String },
    #[serde(rename = "ConfigurationSettingInteger")]
    Integer { value: i64 },
    #[serde(rename = "ConfigurationSettingFloat")]
    Float { value: f64 },
    #[serde(rename = "ConfigurationSettingBoolean")]
    Boolean { value: bool },
    #[serde(rename = "ConfigurationSettingRadioBox", rename_all = "camelCase")]
    RadioBox { selected_value: String },
    #[serde(rename = "ConfigurationSettingCheckBox", rename_all = "camelCase")]
    CheckBox { selected_values: Vec<String> },
    #[serde(rename = "ConfigurationSettingFileInput")]
    FileInput(FileInputSetting),
    #[serde(rename = "ConfigurationSettingTableInput")]
    TableInput(TableInputSetting),
    #[serde(rename = "ConfigurationSettingDatabaseConnection")]
    DatabaseConnection(DatabaseConnectionSetting),
}

impl ConfigurationSetting {
    pub fn string(value: impl Into<String>) -> Self {
        Self::String { value: value.into() }
    }

    pub fn integer(value: i64) -> Self {
        Self::Integer { value }
    }

    pub fn float(value: f64) -> Self {
        Self::Float { value }
    }

    pub fn boolean(value: bool) -> Self {
        Self::Boolean { value }
    }

    pub fn radio_box(selected_value: impl Into<String>) -> Self {
        Self::RadioBox {
            selected_value: selected_value.into(),
        }
    }

    pub fn check_box<I, S>(selected_values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::CheckBox {
            selected_values: selected_values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn file(file_name: impl Into<String>) -> Self {
        Self::FileInput(FileInputSetting::new(file_name))
    }

    pub fn table(connection: impl Into<String>, table: impl Into<String>) -> Self {
        Self::TableInput(TableInputSetting {
            connection: connection.into(),
            table: table.into(),
        })
    }

    pub fn connection(connection: impl Into<String>) -> Self {
        Self::DatabaseConnection(DatabaseConnectionSetting {
            connection: connection.into(),
        })
    }

    /// Wire discriminator of this setting
    pub fn kind(&self) -> &'static str {
        match self {
            ConfigurationSetting::String { .. } => "ConfigurationSettingString",
            ConfigurationSetting::Integer { .. } => "ConfigurationSettingInteger",
            ConfigurationSetting::Float { .. } => "ConfigurationSettingFloat",
            ConfigurationSetting::Boolean { .. } => "ConfigurationSettingBoolean",
            ConfigurationSetting::RadioBox { .. } => "ConfigurationSettingRadioBox",
            ConfigurationSetting::CheckBox { .. } => "ConfigurationSettingCheckBox",
            ConfigurationSetting::FileInput(_) => "ConfigurationSettingFileInput",
            ConfigurationSetting::TableInput(_) => "ConfigurationSettingTableInput",
            ConfigurationSetting::DatabaseConnection(_) => "ConfigurationSettingDatabaseConnection",
        }
    }
}

/// Conversion from the wire form into a variant's typed setting
pub trait FromSetting: Sized {
    /// Human-readable name of the accepted setting kind(s)
    const EXPECTED: &'static str;

    fn from_setting(setting: ConfigurationSetting) -> Option<Self>;
}

impl FromSetting for String {
    const EXPECTED: &'static str = "ConfigurationSettingString";

    fn from_setting(setting: ConfigurationSetting) -> Option<Self> {
        match setting {
            ConfigurationSetting::String { value } => Some(value),
            ConfigurationSetting::RadioBox { selected_value } => Some(selected_value),
            _ => None,
        }
    }
}

impl FromSetting for i64 {
    const EXPECTED: &'static str = "ConfigurationSettingInteger";

    fn from_setting(setting: ConfigurationSetting) -> Option<Self> {
        match setting {
            ConfigurationSetting::Integer { value } => Some(value),
            _ => None,
        }
    }
}

const MAX_EXACT_INTEGER: u64 = 1 << 53;

impl FromSetting for f64 {
    const EXPECTED: &'static str = "ConfigurationSettingFloat";

    fn from_setting(setting: ConfigurationSetting) -> Option<Self> {
        match setting {
            ConfigurationSetting::Float { value } => Some(value),
            // Only integers a double represents exactly
            ConfigurationSetting::Integer { value } if value.unsigned_abs() <= MAX_EXACT_INTEGER => {
                Some(value as f64)
            }
            _ => None,
        }
    }
}

impl FromSetting for bool {
    const EXPECTED: &'static str = "ConfigurationSettingBoolean";

    fn from_setting(setting: ConfigurationSetting) -> Option<Self> {
        match setting {
            ConfigurationSetting::Boolean { value } => Some(value),
            _ => None,
        }
    }
}

impl FromSetting for Vec<String> {
    const EXPECTED: &'static str = "ConfigurationSettingCheckBox";

    fn from_setting(setting: ConfigurationSetting) -> Option<Self> {
        match setting {
            ConfigurationSetting::CheckBox { selected_values } => Some(selected_values),
            _ => None,
        }
    }
}

impl FromSetting for FileInputSetting {
    const EXPECTED: &'static str = "ConfigurationSettingFileInput";

    fn from_setting(setting: ConfigurationSetting) -> Option<Self> {
        match setting {
            ConfigurationSetting::FileInput(s) => Some(s),
            _ => None,
        }
    }
}

impl FromSetting for TableInputSetting {
    const EXPECTED: &'static str = "ConfigurationSettingTableInput";

    fn from_setting(setting: ConfigurationSetting) -> Option<Self> {
        match setting {
            ConfigurationSetting::TableInput(s) => Some(s),
            _ => None,
        }
    }
}

impl FromSetting for DatabaseConnectionSetting {
    const EXPECTED: &'static str = "ConfigurationSettingDatabaseConnection";

    fn from_setting(setting: ConfigurationSetting) -> Option<Self> {
        match setting {
            ConfigurationSetting::DatabaseConnection(s) => Some(s),
            _ => None,
        }
    }
}

impl FromSetting for RelationalInputSetting {
    const EXPECTED: &'static str = "ConfigurationSettingFileInput or ConfigurationSettingTableInput";

    fn from_setting(setting: ConfigurationSetting) -> Option<Self> {
        match setting {
            ConfigurationSetting::FileInput(s) => Some(RelationalInputSetting::File(s)),
            ConfigurationSetting::TableInput(s) => Some(RelationalInputSetting::Table(s)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_discriminator() {
        let json = serde_json::to_value(ConfigurationSetting::radio_box("fast")).unwrap();
        assert_eq!(json["type"], "ConfigurationSettingRadioBox");
        assert_eq!(json["selectedValue"], "fast");
    }

    #[test]
    fn test_file_setting_options_are_optional() {
        let setting: ConfigurationSetting = serde_json::from_str(
            r#"{"type": "ConfigurationSettingFileInput", "fileName": "a.csv", "separator": ";"}"#,
        )
        .unwrap();
        match setting {
            ConfigurationSetting::FileInput(f) => {
                assert_eq!(f.file_name, "a.csv");
                assert_eq!(f.options.separator, ';');
                assert_eq!(f.options.quote_char, '"');
                assert!(f.options.header);
            }
            other => panic!("unexpected setting {:?}", other),
        }
    }

    #[test]
    fn test_from_setting_rejects_other_kinds() {
        assert_eq!(bool::from_setting(ConfigurationSetting::boolean(true)), Some(true));
        assert_eq!(bool::from_setting(ConfigurationSetting::string("true")), None);
        assert_eq!(f64::from_setting(ConfigurationSetting::integer(2)), Some(2.0));
        assert_eq!(
            String::from_setting(ConfigurationSetting::radio_box("fast")).as_deref(),
            Some("fast")
        );
    }

    #[test]
    fn test_integer_setting_as_float() {
        assert_eq!(f64::from_setting(ConfigurationSetting::integer(3)), Some(3.0));
        assert_eq!(
            f64::from_setting(ConfigurationSetting::integer(-(1 << 53))),
            Some(-9_007_199_254_740_992.0)
        );
        assert_eq!(f64::from_setting(ConfigurationSetting::integer((1 << 53) + 1)), None);
        assert_eq!(f64::from_setting(ConfigurationSetting::integer(i64::MIN)), None);
    }

    #[test]
    fn test_relational_setting_accepts_file_and_table() {
        assert!(matches!(
            RelationalInputSetting::from_setting(ConfigurationSetting::file("a.csv")),
            Some(RelationalInputSetting::File(_))
        ));
        assert!(matches!(
            RelationalInputSetting::from_setting(ConfigurationSetting::table("pg", "orders")),
            Some(RelationalInputSetting::Table(_))
        ));
        assert!(RelationalInputSetting::from_setting(ConfigurationSetting::connection("pg")).is_none());
    }
}
