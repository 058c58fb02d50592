//! Approximate functional dependencies
//!
//! A dependency `X -> A` is reported when its g3 error (the fraction of rows
//! that must be removed for it to hold exactly) is within `maxError`, and no
//! subset of `X` already determines `A`.

use super::{combinations, is_subset};
use crate::csv::{read_relation, Relation};
use prism_plugin::prelude::*;
use std::collections::HashMap;
use tracing::warn;

pub struct FdApproximate;

impl ProfilingAlgorithm for FdApproximate {
    fn descriptor(&self) -> AlgorithmDescriptor {
        AlgorithmDescriptor::builder("fd-approximate")
            .author("Prism")
            .description("Minimal functional dependencies with a bounded g3 error")
            .capability(Capability::FunctionalDependency)
            .capability(Capability::RelationalInput)
            .build()
    }

    fn configuration_requirements(&self) -> Vec<ConfigurationRequirement> {
        vec![
            RelationalInputRequirement::new("inputs")
                .with_cardinality(Cardinality::at_least(1))
                .into(),
            FloatRequirement::new("maxError")
                .with_cardinality(Cardinality::optional())
                .with_default(0.0)
                .into(),
            IntegerRequirement::new("maxLhs")
                .with_cardinality(Cardinality::optional())
                .with_default(1)
                .into(),
            ListRequirement::new("ignoreColumns").into(),
        ]
    }

    fn execute(
        &self,
        configuration: &ResolvedConfiguration,
        results: &mut ResultCollector,
    ) -> Result<(), AlgorithmError> {
        let max_error = configuration.float("maxError")?;
        if !(0.0..=1.0).contains(&max_error) {
            return Err(AlgorithmError::Execution(format!(
                "maxError must be between 0 and 1, got {}",
                max_error
            )));
        }
        let max_lhs = configuration.integer("maxLhs")?;
        let max_lhs = usize::try_from(max_lhs)
            .ok()
            .filter(|&n| n >= 1)
            .ok_or_else(|| AlgorithmError::Execution(format!("maxLhs must be at least 1, got {}", max_lhs)))?;
        let ignored = configuration.strings("ignoreColumns")?;

        for input in configuration.relational_inputs("inputs")? {
            let relation = read_relation(input)?;
            for name in ignored {
                if relation.column_index(name).is_none() {
                    warn!(input = %relation.name(), column = %name, "ignored column not present");
                }
            }
            let columns: Vec<usize> = (0..relation.columns().len())
                .filter(|&c| !ignored.contains(&relation.columns()[c]))
                .collect();

            for fd in discover(&relation, &columns, max_lhs, max_error) {
                results.receive(ProfilingResult::FunctionalDependency {
                    relation: relation.name().to_string(),
                    determinant: fd.lhs.iter().map(|&c| relation.columns()[c].clone()).collect(),
                    dependant: relation.columns()[fd.rhs].clone(),
                    error: (fd.error > 0.0).then_some(fd.error),
                });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Dependency {
    lhs: Vec<usize>,
    rhs: usize,
    error: f64,
}

fn discover(relation: &Relation, columns: &[usize], max_lhs: usize, max_error: f64) -> Vec<Dependency> {
    let mut found: Vec<Dependency> = Vec::new();
    if relation.rows().is_empty() {
        return found;
    }
    for size in 1..=max_lhs.min(columns.len().saturating_sub(1)) {
        for lhs in combinations(columns, size) {
            let groups = relation.partition(&lhs);
            for &rhs in columns {
                if lhs.contains(&rhs) {
                    continue;
                }
                let implied = found.iter().any(|fd| fd.rhs == rhs && is_subset(&fd.lhs, &lhs));
                if implied {
                    continue;
                }
                let error = g3(relation, &groups, rhs);
                if error <= max_error {
                    found.push(Dependency {
                        lhs: lhs.clone(),
                        rhs,
                        error,
                    });
                }
            }
        }
    }
    found
}

/// Fraction of rows to drop so that every group agrees on `rhs`
fn g3(relation: &Relation, groups: &HashMap<Vec<Option<&str>>, Vec<usize>>, rhs: usize) -> f64 {
    let rows = relation.rows();
    let kept: usize = groups
        .values()
        .map(|members| {
            let mut counts: HashMap<Option<&str>, usize> = HashMap::new();
            for &row in members {
                *counts.entry(rows[row][rhs].as_deref()).or_default() += 1;
            }
            counts.values().copied().max().unwrap_or(0)
        })
        .sum();
    (rows.len() - kept) as f64 / rows.len() as f64
}
