//! Bounded list of strings

use super::{convert_settings, Requirement, RequirementBase, RequirementState};
use crate::setting::ConfigurationSetting;
use crate::{ConfigurationFactory, ConfigurationValue};
use prism_core::{Cardinality, ConfigurationError, ValueType};
use serde::{Deserialize, Serialize};

/// A list of free-form strings; the cardinality bounds the list length.
/// Unless narrowed, any length (including empty) is accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "ListRequirementWire")]
pub struct ListRequirement {
    #[serde(flatten)]
    base: RequirementBase<String>,
}

#[derive(Deserialize)]
struct ListRequirementWire {
    #[serde(flatten)]
    base: RequirementBase<String>,
}

impl TryFrom<ListRequirementWire> for ListRequirement {
    type Error = ConfigurationError;

    fn try_from(wire: ListRequirementWire) -> Result<Self, Self::Error> {
        let mut base = wire.base;
        let settings = base.take_settings();
        let mut requirement = Self { base };
        if let Some(settings) = settings {
            requirement.check_and_set_settings_typed(settings)?;
        }
        Ok(requirement)
    }
}

impl ListRequirement {
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            base: RequirementBase::new(identifier, Cardinality::at_least(0)),
        }
    }

    pub fn with_cardinality(mut self, cardinality: Cardinality) -> Self {
        self.base.set_cardinality(cardinality);
        self
    }

    pub fn settings(&self) -> Option<&[String]> {
        self.base.settings()
    }

    pub fn resolved_settings(&self) -> Result<&[String], ConfigurationError> {
        self.base.ready_settings()
    }

    pub fn check_and_set_settings_typed(&mut self, settings: Vec<String>) -> Result<(), ConfigurationError> {
        self.base.assign(settings, |entry| {
            if entry.trim().is_empty() {
                Err("list entries must not be blank".to_string())
            } else {
                Ok(())
            }
        })
    }
}

impl Requirement for ListRequirement {
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
        ValueType::String
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
        let value = factory.build_list(self)?;
        self.base.mark_built();
        Ok(value)
    }
}
