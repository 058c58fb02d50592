//! Per-column basic statistics

use crate::csv::{read_relation, Relation};
use prism_plugin::prelude::*;
use serde_json::json;

const STATISTICS: [&str; 5] = ["nulls", "distinct", "min", "max", "mean"];

pub struct ColumnStatistics;

impl ProfilingAlgorithm for ColumnStatistics {
    fn descriptor(&self) -> AlgorithmDescriptor {
        AlgorithmDescriptor::builder("column-statistics")
            .author("Prism")
            .description("Null count, distinct count, extrema and mean of every column")
            .capability(Capability::BasicStatistics)
            .capability(Capability::RelationalInput)
            .build()
    }

    fn configuration_requirements(&self) -> Vec<ConfigurationRequirement> {
        vec![
            RelationalInputRequirement::new("inputs")
                .with_cardinality(Cardinality::at_least(1))
                .into(),
            CheckBoxRequirement::new("statistics", STATISTICS)
                .with_cardinality(Cardinality::optional())
                .with_default(["nulls", "distinct", "min", "max"])
                .into(),
        ]
    }

    fn execute(
        &self,
        configuration: &ResolvedConfiguration,
        results: &mut ResultCollector,
    ) -> Result<(), AlgorithmError> {
        let mut selected: Vec<&String> = Vec::new();
        if let Some(selection) = configuration.selections("statistics")?.first() {
            for statistic in selection {
                if !selected.contains(&statistic) {
                    selected.push(statistic);
                }
            }
        }
        for input in configuration.relational_inputs("inputs")? {
            let relation = read_relation(input)?;
            for index in 0..relation.columns().len() {
                for &statistic in &selected {
                    if let Some(value) = compute(&relation, index, statistic) {
                        results.receive(ProfilingResult::BasicStatistic {
                            relation: relation.name().to_string(),
                            column: relation.columns()[index].clone(),
                            statistic: statistic.clone(),
                            value,
                        });
                    }
                }
            }
        }
        Ok(())
    }
}

/// Numeric view of a column, if every present value parses as a number
fn numbers(relation: &Relation, index: usize) -> Option<Vec<f64>> {
    relation
        .column(index)
        .flatten()
        .map(|v| v.trim().parse::<f64>().ok())
        .collect()
}

fn compute(relation: &Relation, index: usize, statistic: &str) -> Option<serde_json::Value> {
    let present = || relation.column(index).flatten();
    match statistic {
        "nulls" => Some(json!(relation.column(index).filter(Option::is_none).count())),
        "distinct" => {
            let distinct: std::collections::HashSet<&str> = present().collect();
            Some(json!(distinct.len()))
        }
        "min" | "max" => {
            let pick_max = statistic == "max";
            match numbers(relation, index).filter(|n| !n.is_empty()) {
                Some(values) => {
                    let fold = if pick_max { f64::max } else { f64::min };
                    let init = if pick_max { f64::NEG_INFINITY } else { f64::INFINITY };
                    Some(json!(values.into_iter().fold(init, fold)))
                }
                None if pick_max => present().max().map(|v| json!(v)),
                None => present().min().map(|v| json!(v)),
            }
        }
        "mean" => {
            let values = numbers(relation, index).filter(|n| !n.is_empty())?;
            Some(json!(values.iter().sum::<f64>() / values.len() as f64))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prism_plugin::{AlgorithmExecutor, ConfigurationSetting, ResourceFactory, ResourceRegistry};
    use std::collections::BTreeMap;
    use std::sync::Arc;

    fn executor(dir: &tempfile::TempDir) -> AlgorithmExecutor {
        std::fs::write(dir.path().join("people.csv"), "name,age\nAnn,31\nBob,\nCid,45\nAnn,29\n").unwrap();
        let resources = ResourceRegistry::new().with_file("people.csv", dir.path().join("people.csv"));
        let registry = AlgorithmRegistry::new().with_algorithm(ColumnStatistics).unwrap();
        AlgorithmExecutor::new(Arc::new(registry), ResourceFactory::new(Arc::new(resources)))
    }

    fn stat<'a>(results: &'a [ProfilingResult], column: &str, name: &str) -> Option<&'a serde_json::Value> {
        results.iter().find_map(|r| match r {
            ProfilingResult::BasicStatistic { column: c, statistic, value, .. }
                if c == column && statistic == name => Some(value),
            _ => None,
        })
    }

    #[test]
    fn test_default_statistics() {
        let dir = tempfile::tempdir().unwrap();
        let mut settings = BTreeMap::new();
        settings.insert("inputs".to_string(), vec![ConfigurationSetting::file("people.csv")]);
        let report = executor(&dir).execute("column-statistics", settings).unwrap();

        assert_eq!(stat(&report.results, "age", "nulls"), Some(&json!(1)));
        assert_eq!(stat(&report.results, "name", "distinct"), Some(&json!(3)));
        assert_eq!(stat(&report.results, "age", "max"), Some(&json!(45.0)));
        assert_eq!(stat(&report.results, "name", "min"), Some(&json!("Ann")));
        assert!(stat(&report.results, "age", "mean").is_none());
    }

    #[test]
    fn test_selected_statistics() {
        let dir = tempfile::tempdir().unwrap();
        let mut settings = BTreeMap::new();
        settings.insert("inputs".to_string(), vec![ConfigurationSetting::file("people.csv")]);
        settings.insert("statistics".to_string(), vec![ConfigurationSetting::check_box(["mean"])]);
        let report = executor(&dir).execute("column-statistics", settings).unwrap();

        assert_eq!(report.results.len(), 1);
        assert_eq!(stat(&report.results, "age", "mean"), Some(&json!(35.0)));
    }

    #[test]
    fn test_repeated_statistic_reported_once() {
        let dir = tempfile::tempdir().unwrap();
        let mut settings = BTreeMap::new();
        settings.insert("inputs".to_string(), vec![ConfigurationSetting::file("people.csv")]);
        settings.insert("statistics".to_string(), vec![ConfigurationSetting::check_box(["min", "min"])]);
        let report = executor(&dir).execute("column-statistics", settings).unwrap();

        assert_eq!(report.results.len(), 2);
        assert_eq!(stat(&report.results, "age", "min"), Some(&json!(29.0)));
    }

    #[test]
    fn test_requires_an_input() {
        let dir = tempfile::tempdir().unwrap();
        let err = executor(&dir).execute("column-statistics", BTreeMap::new()).unwrap_err();
        assert_eq!(err.code(), codes::INVALID_CARDINALITY);
    }
}
