//! Prism Plugin System
//!
//! Provides the pieces an algorithm host is built from:
//! - Configuration requirements, settings and values
//! - The configuration factory that resolves requirements
//! - Resource and algorithm registries
//! - The configuration pass and executor

mod configuration;
mod executor;
mod factory;
mod registry;
mod resources;
mod setting;
mod traits;
mod value;

pub mod requirement;

pub use configuration::{AlgorithmConfiguration, ResolvedConfiguration};
pub use executor::{AlgorithmExecutor, ExecutionError, ExecutionReport};
pub use factory::{ConfigurationFactory, ResourceFactory};
pub use registry::AlgorithmRegistry;
pub use requirement::{ConfigurationRequirement, Requirement, RequirementState};
pub use resources::{RegisteredFile, ResourceError, ResourceManifest, ResourceRegistry, TableEntry};
pub use setting::{
    ConfigurationSetting, DatabaseConnectionSetting, FileInputSetting, FromSetting,
    RelationalInputSetting, TableInputSetting,
};
pub use traits::{ProfilingAlgorithm, ProfilingResult, ResultCollector};
pub use value::ConfigurationValue;

/// Re-export core types for algorithm authors
pub mod prelude {
    pub use crate::requirement::{
        BooleanRequirement, CheckBoxRequirement, DatabaseConnectionRequirement,
        FileInputRequirement, FloatRequirement, IntegerRequirement, ListRequirement,
        RadioBoxRequirement, RelationalInputRequirement, StringRequirement, TableInputRequirement,
    };
    pub use crate::{
        AlgorithmRegistry, ConfigurationRequirement, ConfigurationSetting, ConfigurationValue,
        ProfilingAlgorithm, ProfilingResult, Requirement, ResolvedConfiguration, ResultCollector,
    };
    pub use prism_core::prelude::*;
}
