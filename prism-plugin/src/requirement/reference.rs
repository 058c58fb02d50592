//! Typed input references: files, tables, relational inputs and database
//! connections. Resolving them needs the resource registry behind the factory.

use super::{convert_settings, Requirement, RequirementBase, RequirementState};
use crate::setting::{
    ConfigurationSetting, DatabaseConnectionSetting, FileInputSetting, FromSetting,
    RelationalInputSetting, TableInputSetting,
};
use crate::{ConfigurationFactory, ConfigurationValue};
use prism_core::{Capability, Cardinality, ConfigurationError, CsvOptions, ValueType};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// Setting type of a reference requirement
pub trait ReferenceSetting: FromSetting + Clone + PartialEq + Debug + Serialize + DeserializeOwned {
    const VALUE_TYPE: ValueType;
    /// Input capability an algorithm must declare to ask for this reference
    const CAPABILITY: Capability;

    /// Shape checks done before any lookup
    fn check(&self) -> Result<(), String>;

    fn dispatch(
        factory: &dyn ConfigurationFactory,
        requirement: &ReferenceRequirement<Self>,
    ) -> Result<ConfigurationValue, ConfigurationError>;
}

fn non_blank(field: &str, value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        Err(format!("{} must not be blank", field))
    } else {
        Ok(())
    }
}

fn check_csv_options(options: &CsvOptions) -> Result<(), String> {
    if options.separator == options.quote_char {
        return Err(format!(
            "separator and quote character must differ (both '{}')",
            options.separator
        ));
    }
    Ok(())
}

impl ReferenceSetting for FileInputSetting {
    const VALUE_TYPE: ValueType = ValueType::FileInput;
    const CAPABILITY: Capability = Capability::FileInput;

    fn check(&self) -> Result<(), String> {
        non_blank("fileName", &self.file_name)?;
        check_csv_options(&self.options)
    }

    fn dispatch(
        factory: &dyn ConfigurationFactory,
        requirement: &ReferenceRequirement<Self>,
    ) -> Result<ConfigurationValue, ConfigurationError> {
        factory.build_file_input(requirement)
    }
}

impl ReferenceSetting for TableInputSetting {
    const VALUE_TYPE: ValueType = ValueType::TableInput;
    const CAPABILITY: Capability = Capability::TableInput;

    fn check(&self) -> Result<(), String> {
        non_blank("connection", &self.connection)?;
        non_blank("table", &self.table)
    }

    fn dispatch(
        factory: &dyn ConfigurationFactory,
        requirement: &ReferenceRequirement<Self>,
    ) -> Result<ConfigurationValue, ConfigurationError> {
        factory.build_table_input(requirement)
    }
}

impl ReferenceSetting for RelationalInputSetting {
    const VALUE_TYPE: ValueType = ValueType::RelationalInput;
    const CAPABILITY: Capability = Capability::RelationalInput;

    fn check(&self) -> Result<(), String> {
        match self {
            RelationalInputSetting::File(file) => file.check(),
            RelationalInputSetting::Table(table) => table.check(),
        }
    }

    fn dispatch(
        factory: &dyn ConfigurationFactory,
        requirement: &ReferenceRequirement<Self>,
    ) -> Result<ConfigurationValue, ConfigurationError> {
        factory.build_relational_input(requirement)
    }
}

impl ReferenceSetting for DatabaseConnectionSetting {
    const VALUE_TYPE: ValueType = ValueType::DatabaseConnection;
    const CAPABILITY: Capability = Capability::DatabaseConnection;

    fn check(&self) -> Result<(), String> {
        non_blank("connection", &self.connection)
    }

    fn dispatch(
        factory: &dyn ConfigurationFactory,
        requirement: &ReferenceRequirement<Self>,
    ) -> Result<ConfigurationValue, ConfigurationError> {
        factory.build_database_connection(requirement)
    }
}

/// Requirement for one or more references to externally managed resources
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ReferenceRequirementWire<S>", bound(deserialize = "S: ReferenceSetting"))]
pub struct ReferenceRequirement<S> {
    #[serde(flatten)]
    base: RequirementBase<S>,
}

#[derive(Deserialize)]
#[serde(bound(deserialize = "S: ReferenceSetting"))]
struct ReferenceRequirementWire<S> {
    #[serde(flatten)]
    base: RequirementBase<S>,
}

impl<S: ReferenceSetting> TryFrom<ReferenceRequirementWire<S>> for ReferenceRequirement<S> {
    type Error = ConfigurationError;

    fn try_from(wire: ReferenceRequirementWire<S>) -> Result<Self, Self::Error> {
        let mut base = wire.base;
        let settings = base.take_settings();
        let mut requirement = Self { base };
        if let Some(settings) = settings {
            requirement.check_and_set_settings_typed(settings)?;
        }
        Ok(requirement)
    }
}

pub type FileInputRequirement = ReferenceRequirement<FileInputSetting>;
pub type TableInputRequirement = ReferenceRequirement<TableInputSetting>;
pub type RelationalInputRequirement = ReferenceRequirement<RelationalInputSetting>;
pub type DatabaseConnectionRequirement = ReferenceRequirement<DatabaseConnectionSetting>;

impl<S: ReferenceSetting> ReferenceRequirement<S> {
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            base: RequirementBase::new(identifier, Cardinality::default()),
        }
    }

    pub fn with_cardinality(mut self, cardinality: Cardinality) -> Self {
        self.base.set_cardinality(cardinality);
        self
    }

    pub fn settings(&self) -> Option<&[S]> {
        self.base.settings()
    }

    pub fn resolved_settings(&self) -> Result<&[S], ConfigurationError> {
        self.base.ready_settings()
    }

    pub fn check_and_set_settings_typed(&mut self, settings: Vec<S>) -> Result<(), ConfigurationError> {
        self.base.assign(settings, |setting| setting.check())
    }
}

impl<S: ReferenceSetting> Requirement for ReferenceRequirement<S> {
    fn identifier(&self) -> &str {
        self.base.identifier()
    }

    fn cardinality(&self) -> Cardinality {
        self.base.cardinality()
    }

    fn state(&self) -> RequirementState {
        self.base.state()
    }

    fn value_type(&self) -> ValueType {
        S::VALUE_TYPE
    }

    fn required_capability(&self) -> Option<Capability> {
        Some(S::CAPABILITY)
    }

    fn check_and_set_settings(
        &mut self,
        settings: Vec<ConfigurationSetting>,
    ) -> Result<(), ConfigurationError> {
        let settings = convert_settings(self.base.identifier(), settings)?;
        self.check_and_set_settings_typed(settings)
    }

    fn build(
        &mut self,
        factory: &dyn ConfigurationFactory,
    ) -> Result<ConfigurationValue, ConfigurationError> {
        self.base.ready_settings()?;
        let value = S::dispatch(factory, self)?;
        self.base.mark_built();
        Ok(value)
    }
}
