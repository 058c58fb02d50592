//! Algorithm Registry

use crate::requirement::Requirement;
use crate::{AlgorithmConfiguration, ProfilingAlgorithm};
use prism_core::{AlgorithmDescriptor, AlgorithmLoadingError, Capability};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::info;

/// Central algorithm registry
pub struct AlgorithmRegistry {
    algorithms: HashMap<String, Arc<dyn ProfilingAlgorithm>>,
}

impl AlgorithmRegistry {
    pub fn new() -> Self {
        Self {
            algorithms: HashMap::new(),
        }
    }

    /// Register an algorithm after checking its declaration
    pub fn with_algorithm<A: ProfilingAlgorithm + 'static>(
        mut self,
        algorithm: A,
    ) -> Result<Self, AlgorithmLoadingError> {
        let descriptor = algorithm.descriptor();
        let key = descriptor.name().to_lowercase();
        if self.algorithms.contains_key(&key) {
            return Err(AlgorithmLoadingError::new(format!(
                "algorithm '{}' is already registered",
                descriptor.name()
            )));
        }
        Self::check_declaration(&descriptor, &algorithm)?;
        info!(
            algorithm = %descriptor.name(),
            file = %descriptor.file_name(),
            requirements = algorithm.configuration_requirements().len(),
            "algorithm registered"
        );
        self.algorithms.insert(key, Arc::new(algorithm));
        Ok(self)
    }

    fn check_declaration(
        descriptor: &AlgorithmDescriptor,
        algorithm: &dyn ProfilingAlgorithm,
    ) -> Result<(), AlgorithmLoadingError> {
        let mut seen = HashSet::new();
        for requirement in algorithm.configuration_requirements() {
            let identifier = requirement.identifier();
            if !seen.insert(identifier.to_string()) {
                return Err(AlgorithmLoadingError::new(format!(
                    "algorithm '{}' declares requirement '{}' twice",
                    descriptor.name(),
                    identifier
                )));
            }
            requirement.validate().map_err(|e| {
                AlgorithmLoadingError::with_source(
                    format!("algorithm '{}' has an invalid requirement", descriptor.name()),
                    e,
                )
            })?;
            if let Some(capability) = requirement.required_capability() {
                if !descriptor.has(capability) {
                    return Err(AlgorithmLoadingError::new(format!(
                        "algorithm '{}' requests '{}' without declaring the {} capability",
                        descriptor.name(),
                        identifier,
                        capability
                    )));
                }
            }
        }
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&dyn ProfilingAlgorithm> {
        self.algorithms.get(&name.to_lowercase()).map(|a| a.as_ref())
    }

    pub fn len(&self) -> usize {
        self.algorithms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.algorithms.is_empty()
    }

    /// Descriptors sorted by name, optionally restricted to one capability
    pub fn descriptors(&self, capability: Option<Capability>) -> Vec<AlgorithmDescriptor> {
        let mut descriptors: Vec<AlgorithmDescriptor> = self
            .algorithms
            .values()
            .map(|a| a.descriptor())
            .filter(|d| capability.map_or(true, |c| d.has(c)))
            .collect();
        descriptors.sort_by(|a, b| a.cmp_by_name(b));
        descriptors
    }

    /// Start a configuration pass with fresh requirements
    pub fn configure(&self, name: &str) -> Option<AlgorithmConfiguration> {
        self.get(name).map(|algorithm| {
            AlgorithmConfiguration::new(algorithm.descriptor(), algorithm.configuration_requirements())
        })
    }

    /// Suggestion text for an unknown algorithm name
    pub fn suggest(&self, name: &str) -> Option<String> {
        let similar = self.find_similar(name);
        if similar.is_empty() {
            return None;
        }
        let names: Vec<&str> = similar.iter().take(3).map(|s| s.as_str()).collect();
        Some(format!(
            "Similar: {}. Use algorithms/list for full list.",
            names.join(", ")
        ))
    }

    /// Find algorithm names similar to the given name
    fn find_similar(&self, name: &str) -> Vec<String> {
        let name_lower = name.to_lowercase();
        let mut matches: Vec<(String, usize)> = self
            .algorithms
            .keys()
            .filter_map(|candidate| {
                let score = Self::similarity_score(&name_lower, candidate);
                // Shared characters alone are noise for short names
                (score > 10).then(|| (candidate.clone(), score))
            })
            .collect();

        matches.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        matches.into_iter().map(|(name, _)| name).collect()
    }

    fn similarity_score(query: &str, candidate: &str) -> usize {
        let mut score = 0;

        if candidate.starts_with(query) {
            score += 100;
        } else if candidate.contains(query) {
            score += 50;
        } else if query.contains(candidate) {
            score += 30;
        }

        let query_chars: HashSet<char> = query.chars().collect();
        let candidate_chars: HashSet<char> = candidate.chars().collect();
        score += query_chars.intersection(&candidate_chars).count() * 2;

        let len_diff = query.len().abs_diff(candidate.len());
        if len_diff < 5 && score > 0 {
            score += 5 - len_diff;
        }

        score
    }
}

impl Default for AlgorithmRegistry {
    fn default() -> Self {
        Self::new()
    }
}
