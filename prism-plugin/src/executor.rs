//! Algorithm execution
//!
//! Configure, resolve and run one algorithm. Every call works on fresh
//! requirement instances, so a shared executor can serve concurrent runs.

use crate::setting::ConfigurationSetting;
use crate::{
    AlgorithmConfiguration, AlgorithmRegistry, ProfilingResult, ResourceFactory, ResultCollector,
};
use prism_core::{AlgorithmDescriptor, AlgorithmError, ConfigurationError};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error("unknown algorithm '{name}'")]
    UnknownAlgorithm {
        name: String,
        suggestion: Option<String>,
    },

    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    Algorithm(#[from] AlgorithmError),
}

impl ExecutionError {
    /// Machine-readable error code
    pub fn code(&self) -> &'static str {
        match self {
            ExecutionError::UnknownAlgorithm { .. } => "UNKNOWN_ALGORITHM",
            ExecutionError::Configuration(e) => e.code(),
            ExecutionError::Algorithm(_) => "ALGORITHM_ERROR",
        }
    }

    pub fn suggestion(&self) -> Option<String> {
        match self {
            ExecutionError::UnknownAlgorithm { suggestion, .. } => suggestion.clone(),
            ExecutionError::Configuration(e) => e.suggestion(),
            ExecutionError::Algorithm(_) => None,
        }
    }
}

/// Outcome of one algorithm run
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionReport {
    pub algorithm: AlgorithmDescriptor,
    pub results: Vec<ProfilingResult>,
    pub elapsed_ms: u64,
}

pub struct AlgorithmExecutor {
    registry: Arc<AlgorithmRegistry>,
    factory: ResourceFactory,
}

impl AlgorithmExecutor {
    pub fn new(registry: Arc<AlgorithmRegistry>, factory: ResourceFactory) -> Self {
        Self { registry, factory }
    }

    pub fn registry(&self) -> &AlgorithmRegistry {
        &self.registry
    }

    pub fn factory(&self) -> &ResourceFactory {
        &self.factory
    }

    pub fn execute(
        &self,
        name: &str,
        settings: BTreeMap<String, Vec<ConfigurationSetting>>,
    ) -> Result<ExecutionReport, ExecutionError> {
        let algorithm = self
            .registry
            .get(name)
            .ok_or_else(|| ExecutionError::UnknownAlgorithm {
                name: name.to_string(),
                suggestion: self.registry.suggest(name),
            })?;

        let descriptor = algorithm.descriptor();
        let mut configuration = AlgorithmConfiguration::new(
            descriptor.clone(),
            algorithm.configuration_requirements(),
        );
        configuration.assign_all(settings)?;
        let resolved = configuration.resolve(&self.factory)?;

        info!(algorithm = %descriptor.name(), "execution started");
        let start = Instant::now();
        let mut collector = ResultCollector::new();
        algorithm.execute(&resolved, &mut collector)?;
        let elapsed_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
        info!(
            algorithm = %descriptor.name(),
            results = collector.len(),
            elapsed_ms,
            "execution finished"
        );

        Ok(ExecutionReport {
            algorithm: descriptor,
            results: collector.into_results(),
            elapsed_ms,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::requirement::{ConfigurationRequirement, IntegerRequirement};
    use crate::{ProfilingAlgorithm, ResolvedConfiguration, ResourceRegistry};
    use prism_core::{codes, Cardinality};

    struct Counter;

    impl ProfilingAlgorithm for Counter {
        fn descriptor(&self) -> AlgorithmDescriptor {
            AlgorithmDescriptor::builder("counter.jar").name("counter").build()
        }

        fn configuration_requirements(&self) -> Vec<ConfigurationRequirement> {
            vec![IntegerRequirement::new("count")
                .with_cardinality(Cardinality::optional())
                .with_default(2)
                .into()]
        }

        fn execute(
            &self,
            configuration: &ResolvedConfiguration,
            results: &mut ResultCollector,
        ) -> Result<(), AlgorithmError> {
            let count = configuration.integer("count")?;
            if count < 0 {
                return Err(AlgorithmError::Execution("count must not be negative".to_string()));
            }
            for i in 0..count {
                results.receive(ProfilingResult::UniqueColumnCombination {
                    relation: "r".to_string(),
                    columns: vec![format!("c{}", i)],
                });
            }
            Ok(())
        }
    }

    fn executor() -> AlgorithmExecutor {
        let registry = AlgorithmRegistry::new().with_algorithm(Counter).unwrap();
        AlgorithmExecutor::new(
            Arc::new(registry),
            ResourceFactory::new(Arc::new(ResourceRegistry::new())),
        )
    }

    #[test]
    fn test_execute_with_default() {
        let report = executor().execute("counter", BTreeMap::new()).unwrap();
        assert_eq!(report.results.len(), 2);
        assert_eq!(report.algorithm.name(), "counter");
    }

    #[test]
    fn test_execute_with_settings() {
        let mut settings = BTreeMap::new();
        settings.insert("count".to_string(), vec![ConfigurationSetting::integer(4)]);
        let report = executor().execute("Counter", settings).unwrap();
        assert_eq!(report.results.len(), 4);
    }

    #[test]
    fn test_unknown_algorithm_suggests() {
        let err = executor().execute("count", BTreeMap::new()).unwrap_err();
        assert_eq!(err.code(), "UNKNOWN_ALGORITHM");
        assert!(err.suggestion().unwrap().contains("counter"));
    }

    #[test]
    fn test_configuration_error_passes_through() {
        let mut settings = BTreeMap::new();
        settings.insert(
            "count".to_string(),
            vec![ConfigurationSetting::integer(1), ConfigurationSetting::integer(2)],
        );
        let err = executor().execute("counter", settings).unwrap_err();
        assert_eq!(err.code(), codes::INVALID_CARDINALITY);
    }

    #[test]
    fn test_algorithm_error_reported() {
        let mut settings = BTreeMap::new();
        settings.insert("count".to_string(), vec![ConfigurationSetting::integer(-1)]);
        let err = executor().execute("counter", settings).unwrap_err();
        assert!(matches!(err, ExecutionError::Algorithm(_)));
    }
}
