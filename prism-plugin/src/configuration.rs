//! Configuration pass
//!
//! Pairs an algorithm's freshly declared requirements with caller settings
//! and resolves them into the values handed to `execute`.

use crate::requirement::{ConfigurationRequirement, Requirement};
use crate::setting::ConfigurationSetting;
use crate::{ConfigurationFactory, ConfigurationValue};
use prism_core::{
    AlgorithmDescriptor, AlgorithmError, ConfigurationError, DatabaseConnection, FileInput,
    RelationalInput, TableInput,
};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Requirements of one algorithm during a single configuration pass
#[derive(Debug, Clone)]
pub struct AlgorithmConfiguration {
    descriptor: AlgorithmDescriptor,
    requirements: Vec<ConfigurationRequirement>,
}

impl AlgorithmConfiguration {
    pub fn new(descriptor: AlgorithmDescriptor, requirements: Vec<ConfigurationRequirement>) -> Self {
        Self {
            descriptor,
            requirements,
        }
    }

    pub fn descriptor(&self) -> &AlgorithmDescriptor {
        &self.descriptor
    }

    pub fn requirements(&self) -> &[ConfigurationRequirement] {
        &self.requirements
    }

    pub fn requirement(&self, identifier: &str) -> Option<&ConfigurationRequirement> {
        self.requirements.iter().find(|r| r.identifier() == identifier)
    }

    /// Assign settings to the requirement named `identifier`
    pub fn assign(
        &mut self,
        identifier: &str,
        settings: Vec<ConfigurationSetting>,
    ) -> Result<(), ConfigurationError> {
        let requirement = self
            .requirements
            .iter_mut()
            .find(|r| r.identifier() == identifier)
            .ok_or_else(|| ConfigurationError::UnknownRequirement {
                identifier: identifier.to_string(),
            })?;
        requirement.check_and_set_settings(settings).map_err(|e| {
            warn!(algorithm = %self.descriptor.name(), requirement = %identifier, error = %e, "settings rejected");
            e
        })
    }

    /// Assign settings by identifier. Requirements absent from `settings`
    /// get an empty list, so their defaults apply.
    pub fn assign_all(
        &mut self,
        mut settings: BTreeMap<String, Vec<ConfigurationSetting>>,
    ) -> Result<(), ConfigurationError> {
        if let Some(unknown) = settings
            .keys()
            .find(|id| self.requirement(id).is_none())
        {
            return Err(ConfigurationError::UnknownRequirement {
                identifier: unknown.clone(),
            });
        }
        let identifiers: Vec<String> = self
            .requirements
            .iter()
            .map(|r| r.identifier().to_string())
            .collect();
        for identifier in identifiers {
            let assigned = settings.remove(&identifier).unwrap_or_default();
            self.assign(&identifier, assigned)?;
        }
        Ok(())
    }

    /// Build every requirement. Either all values are produced or the first
    /// error is returned.
    pub fn resolve(
        &mut self,
        factory: &dyn ConfigurationFactory,
    ) -> Result<ResolvedConfiguration, ConfigurationError> {
        let mut values = Vec::with_capacity(self.requirements.len());
        for requirement in &mut self.requirements {
            values.push(requirement.build(factory)?);
        }
        debug!(algorithm = %self.descriptor.name(), values = values.len(), "configuration resolved");
        Ok(ResolvedConfiguration { values })
    }
}

/// Resolved values in declaration order, looked up by identifier
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ResolvedConfiguration {
    values: Vec<ConfigurationValue>,
}

impl ResolvedConfiguration {
    pub fn new(values: Vec<ConfigurationValue>) -> Self {
        Self { values }
    }

    pub fn values(&self) -> &[ConfigurationValue] {
        &self.values
    }

    pub fn get(&self, identifier: &str) -> Option<&ConfigurationValue> {
        self.values.iter().find(|v| v.identifier() == identifier)
    }

    fn typed<'a, T: ?Sized>(
        &'a self,
        identifier: &str,
        extract: impl Fn(&'a ConfigurationValue) -> Option<&'a T>,
    ) -> Result<&'a T, AlgorithmError> {
        self.get(identifier)
            .and_then(extract)
            .ok_or_else(|| AlgorithmError::MissingValue(identifier.to_string()))
    }

    fn single<T: Clone>(identifier: &str, values: &[T]) -> Result<T, AlgorithmError> {
        values
            .first()
            .cloned()
            .ok_or_else(|| AlgorithmError::MissingValue(identifier.to_string()))
    }

    // ========== Typed Accessors ==========

    /// Strings from string, radio box or list values
    pub fn strings(&self, identifier: &str) -> Result<&[String], AlgorithmError> {
        self.typed(identifier, ConfigurationValue::as_strings)
    }

    pub fn string(&self, identifier: &str) -> Result<String, AlgorithmError> {
        Self::single(identifier, self.strings(identifier)?)
    }

    pub fn integers(&self, identifier: &str) -> Result<&[i64], AlgorithmError> {
        self.typed(identifier, ConfigurationValue::as_integers)
    }

    pub fn integer(&self, identifier: &str) -> Result<i64, AlgorithmError> {
        Self::single(identifier, self.integers(identifier)?)
    }

    pub fn floats(&self, identifier: &str) -> Result<&[f64], AlgorithmError> {
        self.typed(identifier, ConfigurationValue::as_floats)
    }

    pub fn float(&self, identifier: &str) -> Result<f64, AlgorithmError> {
        Self::single(identifier, self.floats(identifier)?)
    }

    pub fn boolean(&self, identifier: &str) -> Result<bool, AlgorithmError> {
        let values = self.typed(identifier, ConfigurationValue::as_booleans)?;
        Self::single(identifier, values)
    }

    pub fn selections(&self, identifier: &str) -> Result<&[Vec<String>], AlgorithmError> {
        self.typed(identifier, ConfigurationValue::as_selections)
    }

    pub fn file_inputs(&self, identifier: &str) -> Result<&[FileInput], AlgorithmError> {
        self.typed(identifier, ConfigurationValue::as_file_inputs)
    }

    pub fn table_inputs(&self, identifier: &str) -> Result<&[TableInput], AlgorithmError> {
        self.typed(identifier, ConfigurationValue::as_table_inputs)
    }

    pub fn relational_inputs(&self, identifier: &str) -> Result<&[RelationalInput], AlgorithmError> {
        self.typed(identifier, ConfigurationValue::as_relational_inputs)
    }

    pub fn database_connections(&self, identifier: &str) -> Result<&[DatabaseConnection], AlgorithmError> {
        self.typed(identifier, ConfigurationValue::as_database_connections)
    }
}
