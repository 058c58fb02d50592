//! Configuration factory
//!
//! One resolution operation per requirement variant. Requirements call the
//! operation matching their own type from `Requirement::build`; adding a
//! variant means adding one operation here and one `build` there.

use crate::requirement::{
    BooleanRequirement, CheckBoxRequirement, DatabaseConnectionRequirement, FileInputRequirement,
    FloatRequirement, IntegerRequirement, ListRequirement, RadioBoxRequirement,
    RelationalInputRequirement, Requirement, StringRequirement, TableInputRequirement,
};
use crate::setting::{FileInputSetting, RelationalInputSetting, TableInputSetting};
use crate::{ConfigurationValue, ResourceRegistry};
use prism_core::{ConfigurationError, DatabaseConnection, FileInput, RelationalInput, TableInput};
use std::sync::Arc;
use tracing::debug;

type BuildResult = Result<ConfigurationValue, ConfigurationError>;

/// Turns a requirement with assigned settings into a configuration value
pub trait ConfigurationFactory {
    fn build_string(&self, requirement: &StringRequirement) -> BuildResult;
    fn build_integer(&self, requirement: &IntegerRequirement) -> BuildResult;
    fn build_float(&self, requirement: &FloatRequirement) -> BuildResult;
    fn build_boolean(&self, requirement: &BooleanRequirement) -> BuildResult;
    fn build_radio_box(&self, requirement: &RadioBoxRequirement) -> BuildResult;
    fn build_check_box(&self, requirement: &CheckBoxRequirement) -> BuildResult;
    fn build_list(&self, requirement: &ListRequirement) -> BuildResult;
    fn build_file_input(&self, requirement: &FileInputRequirement) -> BuildResult;
    fn build_table_input(&self, requirement: &TableInputRequirement) -> BuildResult;
    fn build_relational_input(&self, requirement: &RelationalInputRequirement) -> BuildResult;
    fn build_database_connection(&self, requirement: &DatabaseConnectionRequirement) -> BuildResult;
}

/// Factory resolving references against a shared resource registry.
///
/// Holds no requirement state and only reads the registry, so one instance
/// can serve concurrent resolution passes.
#[derive(Debug, Clone)]
pub struct ResourceFactory {
    resources: Arc<ResourceRegistry>,
}

impl ResourceFactory {
    pub fn new(resources: Arc<ResourceRegistry>) -> Self {
        Self { resources }
    }

    pub fn resources(&self) -> &ResourceRegistry {
        &self.resources
    }

    fn resolve_file(&self, identifier: &str, setting: &FileInputSetting) -> Result<FileInput, ConfigurationError> {
        let file = self
            .resources
            .file(&setting.file_name)
            .ok_or_else(|| ConfigurationError::unresolved(identifier, "file", &setting.file_name))?;
        Ok(FileInput {
            file_name: file.name.clone(),
            path: file.path.clone(),
            options: setting.options.clone(),
        })
    }

    fn resolve_table(&self, identifier: &str, setting: &TableInputSetting) -> Result<TableInput, ConfigurationError> {
        if self.resources.connection(&setting.connection).is_none() {
            return Err(ConfigurationError::unresolved(
                identifier,
                "database connection",
                &setting.connection,
            ));
        }
        self.resources
            .table(&setting.connection, &setting.table)
            .ok_or_else(|| {
                ConfigurationError::unresolved(
                    identifier,
                    "table",
                    format!("{}.{}", setting.connection, setting.table),
                )
            })
    }

    fn resolve_connection(&self, identifier: &str, connection: &str) -> Result<DatabaseConnection, ConfigurationError> {
        self.resources
            .connection(connection)
            .cloned()
            .ok_or_else(|| ConfigurationError::unresolved(identifier, "database connection", connection))
    }
}

impl ConfigurationFactory for ResourceFactory {
    fn build_string(&self, requirement: &StringRequirement) -> BuildResult {
        Ok(ConfigurationValue::String {
            identifier: requirement.identifier().to_string(),
            values: requirement.resolved_settings()?.to_vec(),
        })
    }

    fn build_integer(&self, requirement: &IntegerRequirement) -> BuildResult {
        Ok(ConfigurationValue::Integer {
            identifier: requirement.identifier().to_string(),
            values: requirement.resolved_settings()?.to_vec(),
        })
    }

    fn build_float(&self, requirement: &FloatRequirement) -> BuildResult {
        let values = requirement.resolved_settings()?;
        if let Some(bad) = values.iter().find(|v| !v.is_finite()) {
            return Err(ConfigurationError::build(
                requirement.identifier(),
                format!("{} is not a finite number", bad),
            ));
        }
        Ok(ConfigurationValue::Float {
            identifier: requirement.identifier().to_string(),
            values: values.to_vec(),
        })
    }

    fn build_boolean(&self, requirement: &BooleanRequirement) -> BuildResult {
        Ok(ConfigurationValue::Boolean {
            identifier: requirement.identifier().to_string(),
            values: requirement.resolved_settings()?.to_vec(),
        })
    }

    fn build_radio_box(&self, requirement: &RadioBoxRequirement) -> BuildResult {
        Ok(ConfigurationValue::RadioBox {
            identifier: requirement.identifier().to_string(),
            values: requirement.resolved_settings()?.to_vec(),
        })
    }

    fn build_check_box(&self, requirement: &CheckBoxRequirement) -> BuildResult {
        Ok(ConfigurationValue::CheckBox {
            identifier: requirement.identifier().to_string(),
            values: requirement.resolved_settings()?.to_vec(),
        })
    }

    fn build_list(&self, requirement: &ListRequirement) -> BuildResult {
        Ok(ConfigurationValue::List {
            identifier: requirement.identifier().to_string(),
            values: requirement.resolved_settings()?.to_vec(),
        })
    }

    fn build_file_input(&self, requirement: &FileInputRequirement) -> BuildResult {
        let identifier = requirement.identifier();
        let values = requirement
            .resolved_settings()?
            .iter()
            .map(|setting| self.resolve_file(identifier, setting))
            .collect::<Result<Vec<_>, _>>()?;
        debug!(requirement = %identifier, files = values.len(), "file inputs resolved");
        Ok(ConfigurationValue::FileInput {
            identifier: identifier.to_string(),
            values,
        })
    }

    fn build_table_input(&self, requirement: &TableInputRequirement) -> BuildResult {
        let identifier = requirement.identifier();
        let values = requirement
            .resolved_settings()?
            .iter()
            .map(|setting| self.resolve_table(identifier, setting))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ConfigurationValue::TableInput {
            identifier: identifier.to_string(),
            values,
        })
    }

    fn build_relational_input(&self, requirement: &RelationalInputRequirement) -> BuildResult {
        let identifier = requirement.identifier();
        let values = requirement
            .resolved_settings()?
            .iter()
            .map(|setting| match setting {
                RelationalInputSetting::File(file) => self.resolve_file(identifier, file).map(RelationalInput::File),
                RelationalInputSetting::Table(table) => {
                    self.resolve_table(identifier, table).map(RelationalInput::Table)
                }
            })
            .collect::<Result<Vec<_>, _>>()?;
        debug!(requirement = %identifier, inputs = values.len(), "relational inputs resolved");
        Ok(ConfigurationValue::RelationalInput {
            identifier: identifier.to_string(),
            values,
        })
    }

    fn build_database_connection(&self, requirement: &DatabaseConnectionRequirement) -> BuildResult {
        let identifier = requirement.identifier();
        let values = requirement
            .resolved_settings()?
            .iter()
            .map(|setting| self.resolve_connection(identifier, &setting.connection))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ConfigurationValue::DatabaseConnection {
            identifier: identifier.to_string(),
            values,
        })
    }
}
