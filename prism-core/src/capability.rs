//! Algorithm capabilities and the descriptor that declares them

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::hash::{Hash, Hasher};

/// An analytical or input feature an algorithm declares
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    // Analytical
    InclusionDependency,
    FunctionalDependency,
    UniqueColumnCombination,
    ConditionalUniqueColumnCombination,
    OrderDependency,
    BasicStatistics,
    // Input
    RelationalInput,
    FileInput,
    TableInput,
    DatabaseConnection,
}

impl Capability {
    pub const ALL: [Capability; 10] = [
        Capability::InclusionDependency,
        Capability::FunctionalDependency,
        Capability::UniqueColumnCombination,
        Capability::ConditionalUniqueColumnCombination,
        Capability::OrderDependency,
        Capability::BasicStatistics,
        Capability::RelationalInput,
        Capability::FileInput,
        Capability::TableInput,
        Capability::DatabaseConnection,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::InclusionDependency => "inclusion_dependency",
            Capability::FunctionalDependency => "functional_dependency",
            Capability::UniqueColumnCombination => "unique_column_combination",
            Capability::ConditionalUniqueColumnCombination => "conditional_unique_column_combination",
            Capability::OrderDependency => "order_dependency",
            Capability::BasicStatistics => "basic_statistics",
            Capability::RelationalInput => "relational_input",
            Capability::FileInput => "file_input",
            Capability::TableInput => "table_input",
            Capability::DatabaseConnection => "database_connection",
        }
    }

    pub fn is_input(&self) -> bool {
        matches!(
            self,
            Capability::RelationalInput
                | Capability::FileInput
                | Capability::TableInput
                | Capability::DatabaseConnection
        )
    }

    pub fn parse(name: &str) -> Option<Capability> {
        Self::ALL.iter().copied().find(|c| c.as_str().eq_ignore_ascii_case(name))
    }
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Read-only description of a registered algorithm.
///
/// Two descriptors are equal when they refer to the same file name,
/// regardless of the other attributes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlgorithmDescriptor {
    file_name: String,
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    capabilities: BTreeSet<Capability>,
}

impl AlgorithmDescriptor {
    pub fn builder(file_name: impl Into<String>) -> AlgorithmDescriptorBuilder {
        AlgorithmDescriptorBuilder {
            file_name: file_name.into(),
            name: None,
            author: None,
            description: None,
            capabilities: BTreeSet::new(),
        }
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn author(&self) -> Option<&str> {
        self.author.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn capabilities(&self) -> &BTreeSet<Capability> {
        &self.capabilities
    }

    pub fn has(&self, capability: Capability) -> bool {
        self.capabilities.contains(&capability)
    }

    /// Ordering used for listings
    pub fn cmp_by_name(&self, other: &Self) -> std::cmp::Ordering {
        self.name.cmp(&other.name)
    }
}

impl PartialEq for AlgorithmDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.file_name == other.file_name
    }
}

impl Eq for AlgorithmDescriptor {}

impl Hash for AlgorithmDescriptor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.file_name.hash(state);
    }
}

impl std::fmt::Display for AlgorithmDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let capabilities: Vec<&str> = self.capabilities.iter().map(|c| c.as_str()).collect();
        write!(
            f,
            "Algorithm [fileName={}, name={}, author={}, description={}, capabilities=[{}]]",
            self.file_name,
            self.name,
            self.author.as_deref().unwrap_or("-"),
            self.description.as_deref().unwrap_or("-"),
            capabilities.join(", ")
        )
    }
}

/// Collects descriptor attributes; the descriptor itself is immutable
#[derive(Debug, Clone)]
pub struct AlgorithmDescriptorBuilder {
    file_name: String,
    name: Option<String>,
    author: Option<String>,
    description: Option<String>,
    capabilities: BTreeSet<Capability>,
}

impl AlgorithmDescriptorBuilder {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn capability(mut self, capability: Capability) -> Self {
        self.capabilities.insert(capability);
        self
    }

    pub fn capabilities(mut self, capabilities: impl IntoIterator<Item = Capability>) -> Self {
        self.capabilities.extend(capabilities);
        self
    }

    /// Finish the descriptor. Without an explicit name the file name is used.
    pub fn build(self) -> AlgorithmDescriptor {
        let name = self.name.unwrap_or_else(|| self.file_name.clone());
        AlgorithmDescriptor {
            file_name: self.file_name,
            name,
            author: self.author,
            description: self.description,
            capabilities: self.capabilities,
        }
    }
}
