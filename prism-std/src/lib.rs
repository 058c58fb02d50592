//! Prism Standard Library

pub mod algorithms;
pub mod csv;

use prism_core::AlgorithmLoadingError;
use prism_plugin::AlgorithmRegistry;

/// Load standard library into registry
pub fn load_standard_library(registry: AlgorithmRegistry) -> Result<AlgorithmRegistry, AlgorithmLoadingError> {
    registry
        .with_algorithm(algorithms::ColumnStatistics)?
        .with_algorithm(algorithms::UccNaive)?
        .with_algorithm(algorithms::FdApproximate)
}

/// Create registry with standard library
pub fn standard_registry() -> Result<AlgorithmRegistry, AlgorithmLoadingError> {
    load_standard_library(AlgorithmRegistry::new())
}
