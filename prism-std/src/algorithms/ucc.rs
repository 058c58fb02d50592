//! Naive discovery of minimal unique column combinations

use super::{combinations, is_subset};
use crate::csv::{read_file, Relation};
use prism_plugin::prelude::*;
use std::collections::HashSet;

const NULL_EQUALS_NULL: &str = "null-equals-null";
const NULL_NOT_EQUALS_NULL: &str = "null-not-equals-null";

/// Checks column combinations level by level, pruning supersets of
/// combinations already found unique
pub struct UccNaive;

impl ProfilingAlgorithm for UccNaive {
    fn descriptor(&self) -> AlgorithmDescriptor {
        AlgorithmDescriptor::builder("ucc-naive")
            .author("Prism")
            .description("Minimal unique column combinations up to a size limit")
            .capability(Capability::UniqueColumnCombination)
            .capability(Capability::FileInput)
            .build()
    }

    fn configuration_requirements(&self) -> Vec<ConfigurationRequirement> {
        vec![
            FileInputRequirement::new("input").into(),
            IntegerRequirement::new("maxColumns")
                .with_cardinality(Cardinality::optional())
                .with_default(2)
                .into(),
            RadioBoxRequirement::new("nullSemantics", [NULL_EQUALS_NULL, NULL_NOT_EQUALS_NULL])
                .with_cardinality(Cardinality::optional())
                .with_default(NULL_EQUALS_NULL)
                .into(),
        ]
    }

    fn execute(
        &self,
        configuration: &ResolvedConfiguration,
        results: &mut ResultCollector,
    ) -> Result<(), AlgorithmError> {
        let max_columns = configuration.integer("maxColumns")?;
        let max_columns = usize::try_from(max_columns)
            .ok()
            .filter(|&n| n >= 1)
            .ok_or_else(|| AlgorithmError::Execution(format!("maxColumns must be at least 1, got {}", max_columns)))?;
        let nulls_equal = configuration.string("nullSemantics")? == NULL_EQUALS_NULL;

        for input in configuration.file_inputs("input")? {
            let relation = read_file(input)?;
            for columns in discover(&relation, max_columns, nulls_equal) {
                results.receive(ProfilingResult::UniqueColumnCombination {
                    relation: relation.name().to_string(),
                    columns: columns.iter().map(|&c| relation.columns()[c].clone()).collect(),
                });
            }
        }
        Ok(())
    }
}

fn discover(relation: &Relation, max_columns: usize, nulls_equal: bool) -> Vec<Vec<usize>> {
    let all: Vec<usize> = (0..relation.columns().len()).collect();
    let mut found: Vec<Vec<usize>> = Vec::new();
    for size in 1..=max_columns.min(all.len()) {
        for candidate in combinations(&all, size) {
            if found.iter().any(|ucc| is_subset(ucc, &candidate)) {
                continue;
            }
            if is_unique(relation, &candidate, nulls_equal) {
                found.push(candidate);
            }
        }
    }
    found
}

fn is_unique(relation: &Relation, columns: &[usize], nulls_equal: bool) -> bool {
    let mut seen = HashSet::new();
    for row in relation.rows() {
        let key: Vec<Option<&str>> = columns.iter().map(|&c| row[c].as_deref()).collect();
        // A null never collides when nulls are distinct
        if !nulls_equal && key.iter().any(Option::is_none) {
            continue;
        }
        if !seen.insert(key) {
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::csv::parse;
    use prism_core::CsvOptions;

    fn relation() -> Relation {
        parse(
            "orders.csv",
            "id,customer,day,note\n1,a,mon,\n2,a,tue,\n3,b,mon,x\n",
            &CsvOptions::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_minimal_combinations() {
        let found = discover(&relation(), 2, true);
        // No combination containing id is reported beyond id itself
        assert_eq!(found, vec![vec![0], vec![1, 2], vec![2, 3]]);
    }

    #[test]
    fn test_size_limit() {
        assert_eq!(discover(&relation(), 1, true), vec![vec![0]]);
    }

    #[test]
    fn test_null_semantics() {
        // note is null twice: a duplicate only when nulls compare equal
        assert!(!is_unique(&relation(), &[3], true));
        assert!(is_unique(&relation(), &[3], false));
    }
}
