//! Plain and default-valued primitive requirements

use super::{convert_settings, substitute_default, Requirement, RequirementBase, RequirementState};
use crate::setting::{ConfigurationSetting, FromSetting};
use crate::{ConfigurationFactory, ConfigurationValue};
use prism_core::{Cardinality, ConfigurationError, ValueType};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// A primitive value domain and the factory operation that resolves it
pub trait PrimitiveValue: FromSetting + Clone + PartialEq + Debug + Serialize + DeserializeOwned {
    const VALUE_TYPE: ValueType;

    fn dispatch(
        factory: &dyn ConfigurationFactory,
        requirement: &ValueRequirement<Self>,
    ) -> Result<ConfigurationValue, ConfigurationError>;
}

impl PrimitiveValue for String {
    const VALUE_TYPE: ValueType = ValueType::String;

    fn dispatch(
        factory: &dyn ConfigurationFactory,
        requirement: &ValueRequirement<Self>,
    ) -> Result<ConfigurationValue, ConfigurationError> {
        factory.build_string(requirement)
    }
}

impl PrimitiveValue for i64 {
    const VALUE_TYPE: ValueType = ValueType::Integer;

    fn dispatch(
        factory: &dyn ConfigurationFactory,
        requirement: &ValueRequirement<Self>,
    ) -> Result<ConfigurationValue, ConfigurationError> {
        factory.build_integer(requirement)
    }
}

impl PrimitiveValue for f64 {
    const VALUE_TYPE: ValueType = ValueType::Float;

    fn dispatch(
        factory: &dyn ConfigurationFactory,
        requirement: &ValueRequirement<Self>,
    ) -> Result<ConfigurationValue, ConfigurationError> {
        factory.build_float(requirement)
    }
}

impl PrimitiveValue for bool {
    const VALUE_TYPE: ValueType = ValueType::Boolean;

    fn dispatch(
        factory: &dyn ConfigurationFactory,
        requirement: &ValueRequirement<Self>,
    ) -> Result<ConfigurationValue, ConfigurationError> {
        factory.build_boolean(requirement)
    }
}

/// Requirement for a primitive value, optionally with a default.
///
/// Without a default this is a plain value requirement. With one, an empty
/// setting list resolves to `[default]` whenever the cardinality admits it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    rename_all = "camelCase",
    try_from = "ValueRequirementWire<T>",
    bound(deserialize = "T: PrimitiveValue")
)]
pub struct ValueRequirement<T> {
    #[serde(flatten)]
    base: RequirementBase<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    default_value: Option<T>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase", bound(deserialize = "T: PrimitiveValue"))]
struct ValueRequirementWire<T> {
    #[serde(flatten)]
    base: RequirementBase<T>,
    #[serde(default)]
    default_value: Option<T>,
}

impl<T: PrimitiveValue> TryFrom<ValueRequirementWire<T>> for ValueRequirement<T> {
    type Error = ConfigurationError;

    fn try_from(wire: ValueRequirementWire<T>) -> Result<Self, Self::Error> {
        let mut base = wire.base;
        let settings = base.take_settings();
        let mut requirement = Self {
            base,
            default_value: wire.default_value,
        };
        if let Some(settings) = settings {
            requirement.check_and_set_settings_typed(settings)?;
        }
        Ok(requirement)
    }
}

pub type StringRequirement = ValueRequirement<String>;
pub type IntegerRequirement = ValueRequirement<i64>;
pub type FloatRequirement = ValueRequirement<f64>;
pub type BooleanRequirement = ValueRequirement<bool>;

impl<T: PrimitiveValue> ValueRequirement<T> {
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            base: RequirementBase::new(identifier, Cardinality::default()),
            default_value: None,
        }
    }

    pub fn with_cardinality(mut self, cardinality: Cardinality) -> Self {
        self.base.set_cardinality(cardinality);
        self
    }

    pub fn with_default(mut self, value: impl Into<T>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    pub fn default_value(&self) -> Option<&T> {
        self.default_value.as_ref()
    }

    pub fn settings(&self) -> Option<&[T]> {
        self.base.settings()
    }

    /// Assigned settings, or `NotReady`
    pub fn resolved_settings(&self) -> Result<&[T], ConfigurationError> {
        self.base.ready_settings()
    }

    pub fn check_and_set_settings_typed(&mut self, settings: Vec<T>) -> Result<(), ConfigurationError> {
        let settings = substitute_default(settings, self.default_value.as_ref(), self.base.cardinality());
        self.base.assign(settings, |_| Ok(()))
    }
}

impl<T: PrimitiveValue> Requirement for ValueRequirement<T> {
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
        T::VALUE_TYPE
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
        let value = T::dispatch(factory, self)?;
        self.base.mark_built();
        Ok(value)
    }
}
