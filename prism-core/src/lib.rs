//! Prism Core - Fundamental types
//!
//! This crate provides the types shared by the plugin host and algorithms:
//! - `ValueType` and resource handles: what a requirement resolves to
//! - `Cardinality`: how many settings a requirement accepts
//! - `Capability` / `AlgorithmDescriptor`: what an algorithm declares
//! - Structured errors for configuration, execution and registration

mod capability;
mod cardinality;
mod error;
mod value;

pub use capability::{AlgorithmDescriptor, AlgorithmDescriptorBuilder, Capability};
pub use cardinality::{Cardinality, CardinalityError};
pub use error::{codes, AlgorithmError, AlgorithmLoadingError, ConfigurationError};
pub use value::{
    CsvOptions, DatabaseConnection, DbSystem, FileInput, RelationalInput, TableInput, ValueType,
};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::error::codes;
    pub use crate::{
        AlgorithmDescriptor, AlgorithmError, Capability, Cardinality, ConfigurationError,
        RelationalInput, ValueType,
    };
}
