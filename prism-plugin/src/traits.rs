//! Algorithm plugin traits

use crate::{ConfigurationRequirement, ResolvedConfiguration};
use prism_core::{AlgorithmDescriptor, AlgorithmError};
use serde::{Deserialize, Serialize};

/// A profiling algorithm hosted by the registry.
///
/// `configuration_requirements` must return fresh, unassigned requirements on
/// every call; each configuration pass owns its own instances.
pub trait ProfilingAlgorithm: Send + Sync {
    fn descriptor(&self) -> AlgorithmDescriptor;
    fn configuration_requirements(&self) -> Vec<ConfigurationRequirement>;
    fn execute(
        &self,
        configuration: &ResolvedConfiguration,
        results: &mut ResultCollector,
    ) -> Result<(), AlgorithmError>;
}

/// A single discovered metadata item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ProfilingResult {
    #[serde(rename_all = "camelCase")]
    UniqueColumnCombination { relation: String, columns: Vec<String> },

    #[serde(rename_all = "camelCase")]
    FunctionalDependency {
        relation: String,
        determinant: Vec<String>,
        dependant: String,
        /// Fraction of rows to remove for the dependency to hold exactly
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<f64>,
    },

    #[serde(rename_all = "camelCase")]
    BasicStatistic {
        relation: String,
        column: String,
        statistic: String,
        value: serde_json::Value,
    },
}

/// Receives results while an algorithm runs
#[derive(Debug, Default)]
pub struct ResultCollector {
    results: Vec<ProfilingResult>,
}

impl ResultCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn receive(&mut self, result: ProfilingResult) {
        self.results.push(result);
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn results(&self) -> &[ProfilingResult] {
        &self.results
    }

    pub fn into_results(self) -> Vec<ProfilingResult> {
        self.results
    }
}
