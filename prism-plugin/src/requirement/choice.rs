//! Restricted-choice requirements: radio box (one value per slot) and
//! check box (a subset of values per slot)

use super::{convert_settings, substitute_default, Requirement, RequirementBase, RequirementState};
use crate::setting::ConfigurationSetting;
use crate::{ConfigurationFactory, ConfigurationValue};
use prism_core::{Cardinality, ConfigurationError, ValueType};
use serde::{Deserialize, Serialize};

fn not_allowed(value: &str, values: &[String]) -> String {
    format!("'{}' is not one of [{}]", value, values.join(", "))
}

fn validate_choices(identifier: &str, values: &[String]) -> Result<(), ConfigurationError> {
    if values.is_empty() {
        return Err(ConfigurationError::invalid_value(identifier, "choice set is empty"));
    }
    Ok(())
}

// ========== Radio Box ==========

/// Each setting must be one of `values`. Order of `values` is presentation only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RadioBoxWire")]
pub struct RadioBoxRequirement {
    #[serde(flatten)]
    base: RequirementBase<String>,
    values: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    default_value: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RadioBoxWire {
    #[serde(flatten)]
    base: RequirementBase<String>,
    values: Vec<String>,
    #[serde(default)]
    default_value: Option<String>,
}

impl TryFrom<RadioBoxWire> for RadioBoxRequirement {
    type Error = ConfigurationError;

    fn try_from(wire: RadioBoxWire) -> Result<Self, Self::Error> {
        let mut base = wire.base;
        let settings = base.take_settings();
        let mut requirement = Self {
            base,
            values: wire.values,
            default_value: wire.default_value,
        };
        requirement.validate()?;
        if let Some(settings) = settings {
            requirement.check_and_set_settings_typed(settings)?;
        }
        Ok(requirement)
    }
}

impl RadioBoxRequirement {
    pub fn new<I, S>(identifier: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            base: RequirementBase::new(identifier, Cardinality::default()),
            values: values.into_iter().map(Into::into).collect(),
            default_value: None,
        }
    }

    pub fn with_cardinality(mut self, cardinality: Cardinality) -> Self {
        self.base.set_cardinality(cardinality);
        self
    }

    pub fn with_default(mut self, value: impl Into<String>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    pub fn default_value(&self) -> Option<&str> {
        self.default_value.as_deref()
    }

    pub fn settings(&self) -> Option<&[String]> {
        self.base.settings()
    }

    pub fn resolved_settings(&self) -> Result<&[String], ConfigurationError> {
        self.base.ready_settings()
    }

    pub fn check_and_set_settings_typed(&mut self, settings: Vec<String>) -> Result<(), ConfigurationError> {
        validate_choices(self.base.identifier(), &self.values)?;
        let settings = substitute_default(settings, self.default_value.as_ref(), self.base.cardinality());
        let values = &self.values;
        self.base.assign(settings, |selected| {
            if values.contains(selected) {
                Ok(())
            } else {
                Err(not_allowed(selected, values))
            }
        })
    }
}

impl Requirement for RadioBoxRequirement {
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

    fn validate(&self) -> Result<(), ConfigurationError> {
        validate_choices(self.base.identifier(), &self.values)?;
        match &self.default_value {
            Some(default) if !self.values.contains(default) => Err(ConfigurationError::invalid_value(
                self.base.identifier(),
                format!("default {}", not_allowed(default, &self.values)),
            )),
            _ => Ok(()),
        }
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
        let value = factory.build_radio_box(self)?;
        self.base.mark_built();
        Ok(value)
    }
}

// ========== Check Box ==========

/// Each setting is a selection of zero or more entries from `values`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "CheckBoxWire")]
pub struct CheckBoxRequirement {
    #[serde(flatten)]
    base: RequirementBase<Vec<String>>,
    values: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    default_value: Option<Vec<String>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CheckBoxWire {
    #[serde(flatten)]
    base: RequirementBase<Vec<String>>,
    values: Vec<String>,
    #[serde(default)]
    default_value: Option<Vec<String>>,
}

impl TryFrom<CheckBoxWire> for CheckBoxRequirement {
    type Error = ConfigurationError;

    fn try_from(wire: CheckBoxWire) -> Result<Self, Self::Error> {
        let mut base = wire.base;
        let settings = base.take_settings();
        let mut requirement = Self {
            base,
            values: wire.values,
            default_value: wire.default_value,
        };
        requirement.validate()?;
        if let Some(settings) = settings {
            requirement.check_and_set_settings_typed(settings)?;
        }
        Ok(requirement)
    }
}

impl CheckBoxRequirement {
    pub fn new<I, S>(identifier: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            base: RequirementBase::new(identifier, Cardinality::default()),
            values: values.into_iter().map(Into::into).collect(),
            default_value: None,
        }
    }

    pub fn with_cardinality(mut self, cardinality: Cardinality) -> Self {
        self.base.set_cardinality(cardinality);
        self
    }

    pub fn with_default<I, S>(mut self, selection: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.default_value = Some(selection.into_iter().map(Into::into).collect());
        self
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    pub fn default_value(&self) -> Option<&[String]> {
        self.default_value.as_deref()
    }

    pub fn settings(&self) -> Option<&[Vec<String>]> {
        self.base.settings()
    }

    pub fn resolved_settings(&self) -> Result<&[Vec<String>], ConfigurationError> {
        self.base.ready_settings()
    }

    pub fn check_and_set_settings_typed(&mut self, settings: Vec<Vec<String>>) -> Result<(), ConfigurationError> {
        validate_choices(self.base.identifier(), &self.values)?;
        let settings = substitute_default(settings, self.default_value.as_ref(), self.base.cardinality());
        let values = &self.values;
        self.base.assign(settings, |selection| {
            match selection.iter().find(|s| !values.contains(s)) {
                Some(rejected) => Err(not_allowed(rejected, values)),
                None => Ok(()),
            }
        })
    }
}

impl Requirement for CheckBoxRequirement {
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
        ValueType::StringList
    }

    fn validate(&self) -> Result<(), ConfigurationError> {
        validate_choices(self.base.identifier(), &self.values)?;
        let rejected = self
            .default_value
            .iter()
            .flatten()
            .find(|s| !self.values.contains(s));
        match rejected {
            Some(s) => Err(ConfigurationError::invalid_value(
                self.base.identifier(),
                format!("default {}", not_allowed(s, &self.values)),
            )),
            None => Ok(()),
        }
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
        let value = factory.build_check_box(self)?;
        self.base.mark_built();
        Ok(value)
    }
}
