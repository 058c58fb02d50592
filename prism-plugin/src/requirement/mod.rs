//! Configuration requirements
//!
//! A requirement describes one named parameter an algorithm needs. Every
//! variant shares a `RequirementBase` (identifier, cardinality, assigned
//! settings) and implements `Requirement`; `ConfigurationRequirement` is the
//! tagged union exchanged with callers.
//!
//! Building is double dispatch: each variant's `build` calls the one
//! `ConfigurationFactory` operation matching its own type, so the factory
//! never switches over requirement kinds.
//!
//! Lifecycle per instance: `Declared -> SettingsAssigned -> Built`. A failed
//! `check_and_set_settings` leaves the previous state untouched; a failed
//! `build` leaves the requirement `SettingsAssigned`.

mod choice;
mod list;
mod primitive;
mod reference;

pub use choice::{CheckBoxRequirement, RadioBoxRequirement};
pub use list::ListRequirement;
pub use primitive::{
    BooleanRequirement, FloatRequirement, IntegerRequirement, PrimitiveValue, StringRequirement,
    ValueRequirement,
};
pub use reference::{
    DatabaseConnectionRequirement, FileInputRequirement, ReferenceRequirement, ReferenceSetting,
    RelationalInputRequirement, TableInputRequirement,
};

use crate::setting::{ConfigurationSetting, FromSetting};
use crate::{ConfigurationFactory, ConfigurationValue};
use prism_core::{Capability, Cardinality, ConfigurationError, ValueType};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Position of a requirement instance in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequirementState {
    Declared,
    SettingsAssigned,
    Built,
}

/// Behavior common to every requirement variant
pub trait Requirement {
    fn identifier(&self) -> &str;

    fn cardinality(&self) -> Cardinality;

    fn state(&self) -> RequirementState;

    /// Value domain of the configuration value this requirement builds
    fn value_type(&self) -> ValueType;

    /// Input capability an algorithm must declare to use this requirement
    fn required_capability(&self) -> Option<Capability> {
        None
    }

    /// Declaration-time checks (choice sets, defaults)
    fn validate(&self) -> Result<(), ConfigurationError> {
        Ok(())
    }

    /// Convert raw settings to this variant's setting type, check them and
    /// attach them to the requirement
    fn check_and_set_settings(
        &mut self,
        settings: Vec<ConfigurationSetting>,
    ) -> Result<(), ConfigurationError>;

    /// Resolve the assigned settings through the factory operation for this variant
    fn build(
        &mut self,
        factory: &dyn ConfigurationFactory,
    ) -> Result<ConfigurationValue, ConfigurationError>;
}

// ========== Shared Base ==========

/// Identifier, cardinality and assigned settings of one requirement.
///
/// Settings read from the wire are not trusted: variants deserialize through
/// a wire struct and replay them with `take_settings` plus their own checks.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound(deserialize = "S: Deserialize<'de>"))]
pub struct RequirementBase<S> {
    identifier: String,
    #[serde(flatten)]
    cardinality: Cardinality,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    settings: Option<Vec<S>>,
    #[serde(skip)]
    built: bool,
}

impl<S> RequirementBase<S> {
    pub fn new(identifier: impl Into<String>, cardinality: Cardinality) -> Self {
        Self {
            identifier: identifier.into(),
            cardinality,
            settings: None,
            built: false,
        }
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn cardinality(&self) -> Cardinality {
        self.cardinality
    }

    pub(crate) fn set_cardinality(&mut self, cardinality: Cardinality) {
        self.cardinality = cardinality;
    }

    pub fn settings(&self) -> Option<&[S]> {
        self.settings.as_deref()
    }

    pub fn state(&self) -> RequirementState {
        match (&self.settings, self.built) {
            (None, _) => RequirementState::Declared,
            (Some(_), false) => RequirementState::SettingsAssigned,
            (Some(_), true) => RequirementState::Built,
        }
    }

    /// Assigned settings, or `NotReady` while still declared
    pub fn ready_settings(&self) -> Result<&[S], ConfigurationError> {
        self.settings
            .as_deref()
            .ok_or_else(|| ConfigurationError::not_ready(&self.identifier))
    }

    /// Check cardinality and every entry, then replace the assigned settings.
    /// Nothing is modified when a check fails.
    pub(crate) fn assign<F>(&mut self, settings: Vec<S>, check: F) -> Result<(), ConfigurationError>
    where
        F: Fn(&S) -> Result<(), String>,
    {
        if !self.cardinality.admits(settings.len()) {
            return Err(ConfigurationError::InvalidCardinality {
                identifier: self.identifier.clone(),
                expected: self.cardinality,
                actual: settings.len(),
            });
        }
        for setting in &settings {
            check(setting).map_err(|reason| ConfigurationError::invalid_value(&self.identifier, reason))?;
        }
        debug!(requirement = %self.identifier, count = settings.len(), "settings assigned");
        self.settings = Some(settings);
        self.built = false;
        Ok(())
    }

    /// Detach the settings, returning the base to `Declared`
    pub(crate) fn take_settings(&mut self) -> Option<Vec<S>> {
        self.built = false;
        self.settings.take()
    }

    pub(crate) fn mark_built(&mut self) {
        self.built = true;
    }
}

impl<S: PartialEq> PartialEq for RequirementBase<S> {
    fn eq(&self, other: &Self) -> bool {
        self.identifier == other.identifier
            && self.cardinality == other.cardinality
            && self.settings == other.settings
    }
}

/// Convert wire settings into a variant's typed settings
pub(crate) fn convert_settings<S: FromSetting>(
    identifier: &str,
    settings: Vec<ConfigurationSetting>,
) -> Result<Vec<S>, ConfigurationError> {
    settings
        .into_iter()
        .map(|setting| {
            let kind = setting.kind();
            S::from_setting(setting).ok_or_else(|| {
                ConfigurationError::invalid_value(identifier, format!("expected {}, got {}", S::EXPECTED, kind))
            })
        })
        .collect()
}

/// An empty setting list becomes `[default]` when the cardinality admits
/// both zero and one setting. Explicit settings always win.
pub(crate) fn substitute_default<T: Clone>(settings: Vec<T>, default: Option<&T>, cardinality: Cardinality) -> Vec<T> {
    match default {
        Some(value) if settings.is_empty() && cardinality.admits(0) && cardinality.admits(1) => {
            vec![value.clone()]
        }
        _ => settings,
    }
}

// ========== Tagged Union ==========

/// Any requirement variant, tagged by `type` on the wire
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ConfigurationRequirement {
    #[serde(rename = "ConfigurationRequirementString")]
    String(StringRequirement),
    #[serde(rename = "ConfigurationRequirementInteger")]
    Integer(IntegerRequirement),
    #[serde(rename = "ConfigurationRequirementFloat")]
    Float(FloatRequirement),
    #[serde(rename = "ConfigurationRequirementBoolean")]
    Boolean(BooleanRequirement),
    #[serde(rename = "ConfigurationRequirementRadioBox")]
    RadioBox(RadioBoxRequirement),
    #[serde(rename = "ConfigurationRequirementCheckBox")]
    CheckBox(CheckBoxRequirement),
    #[serde(rename = "ConfigurationRequirementList")]
    List(ListRequirement),
    #[serde(rename = "ConfigurationRequirementFileInput")]
    FileInput(FileInputRequirement),
    #[serde(rename = "ConfigurationRequirementTableInput")]
    TableInput(TableInputRequirement),
    #[serde(rename = "ConfigurationRequirementRelationalInput")]
    RelationalInput(RelationalInputRequirement),
    #[serde(rename = "ConfigurationRequirementDatabaseConnection")]
    DatabaseConnection(DatabaseConnectionRequirement),
}

impl ConfigurationRequirement {
    fn inner(&self) -> &dyn Requirement {
        match self {
            ConfigurationRequirement::String(r) => r,
            ConfigurationRequirement::Integer(r) => r,
            ConfigurationRequirement::Float(r) => r,
            ConfigurationRequirement::Boolean(r) => r,
            ConfigurationRequirement::RadioBox(r) => r,
            ConfigurationRequirement::CheckBox(r) => r,
            ConfigurationRequirement::List(r) => r,
            ConfigurationRequirement::FileInput(r) => r,
            ConfigurationRequirement::TableInput(r) => r,
            ConfigurationRequirement::RelationalInput(r) => r,
            ConfigurationRequirement::DatabaseConnection(r) => r,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn Requirement {
        match self {
            ConfigurationRequirement::String(r) => r,
            ConfigurationRequirement::Integer(r) => r,
            ConfigurationRequirement::Float(r) => r,
            ConfigurationRequirement::Boolean(r) => r,
            ConfigurationRequirement::RadioBox(r) => r,
            ConfigurationRequirement::CheckBox(r) => r,
            ConfigurationRequirement::List(r) => r,
            ConfigurationRequirement::FileInput(r) => r,
            ConfigurationRequirement::TableInput(r) => r,
            ConfigurationRequirement::RelationalInput(r) => r,
            ConfigurationRequirement::DatabaseConnection(r) => r,
        }
    }

    /// Wire discriminator of this variant
    pub fn kind(&self) -> &'static str {
        match self {
            ConfigurationRequirement::String(_) => "ConfigurationRequirementString",
            ConfigurationRequirement::Integer(_) => "ConfigurationRequirementInteger",
            ConfigurationRequirement::Float(_) => "ConfigurationRequirementFloat",
            ConfigurationRequirement::Boolean(_) => "ConfigurationRequirementBoolean",
            ConfigurationRequirement::RadioBox(_) => "ConfigurationRequirementRadioBox",
            ConfigurationRequirement::CheckBox(_) => "ConfigurationRequirementCheckBox",
            ConfigurationRequirement::List(_) => "ConfigurationRequirementList",
            ConfigurationRequirement::FileInput(_) => "ConfigurationRequirementFileInput",
            ConfigurationRequirement::TableInput(_) => "ConfigurationRequirementTableInput",
            ConfigurationRequirement::RelationalInput(_) => "ConfigurationRequirementRelationalInput",
            ConfigurationRequirement::DatabaseConnection(_) => "ConfigurationRequirementDatabaseConnection",
        }
    }
}

impl Requirement for ConfigurationRequirement {
    fn identifier(&self) -> &str {
        self.inner().identifier()
    }

    fn cardinality(&self) -> Cardinality {
        self.inner().cardinality()
    }

    fn state(&self) -> RequirementState {
        self.inner().state()
    }

    fn value_type(&self) -> ValueType {
        self.inner().value_type()
    }

    fn required_capability(&self) -> Option<Capability> {
        self.inner().required_capability()
    }

    fn validate(&self) -> Result<(), ConfigurationError> {
        self.inner().validate()
    }

    fn check_and_set_settings(
        &mut self,
        settings: Vec<ConfigurationSetting>,
    ) -> Result<(), ConfigurationError> {
        self.inner_mut().check_and_set_settings(settings)
    }

    fn build(
        &mut self,
        factory: &dyn ConfigurationFactory,
    ) -> Result<ConfigurationValue, ConfigurationError> {
        self.inner_mut().build(factory)
    }
}

impl From<StringRequirement> for ConfigurationRequirement {
    fn from(r: StringRequirement) -> Self {
        ConfigurationRequirement::String(r)
    }
}

impl From<IntegerRequirement> for ConfigurationRequirement {
    fn from(r: IntegerRequirement) -> Self {
        ConfigurationRequirement::Integer(r)
    }
}

impl From<FloatRequirement> for ConfigurationRequirement {
    fn from(r: FloatRequirement) -> Self {
        ConfigurationRequirement::Float(r)
    }
}

impl From<BooleanRequirement> for ConfigurationRequirement {
    fn from(r: BooleanRequirement) -> Self {
        ConfigurationRequirement::Boolean(r)
    }
}

impl From<RadioBoxRequirement> for ConfigurationRequirement {
    fn from(r: RadioBoxRequirement) -> Self {
        ConfigurationRequirement::RadioBox(r)
    }
}

impl From<CheckBoxRequirement> for ConfigurationRequirement {
    fn from(r: CheckBoxRequirement) -> Self {
        ConfigurationRequirement::CheckBox(r)
    }
}

impl From<ListRequirement> for ConfigurationRequirement {
    fn from(r: ListRequirement) -> Self {
        ConfigurationRequirement::List(r)
    }
}

impl From<FileInputRequirement> for ConfigurationRequirement {
    fn from(r: FileInputRequirement) -> Self {
        ConfigurationRequirement::FileInput(r)
    }
}

impl From<TableInputRequirement> for ConfigurationRequirement {
    fn from(r: TableInputRequirement) -> Self {
        ConfigurationRequirement::TableInput(r)
    }
}

impl From<RelationalInputRequirement> for ConfigurationRequirement {
    fn from(r: RelationalInputRequirement) -> Self {
        ConfigurationRequirement::RelationalInput(r)
    }
}

impl From<DatabaseConnectionRequirement> for ConfigurationRequirement {
    fn from(r: DatabaseConnectionRequirement) -> Self {
        ConfigurationRequirement::DatabaseConnection(r)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ResourceFactory, ResourceRegistry};
    use prism_core::codes;
    use proptest::prelude::*;
    use std::sync::Arc;

    fn empty_factory() -> ResourceFactory {
        ResourceFactory::new(Arc::new(ResourceRegistry::new()))
    }

    fn strategy() -> ConfigurationRequirement {
        RadioBoxRequirement::new("strategy", ["fast", "accurate"]).into()
    }

    #[test]
    fn test_strategy_scenario() {
        let mut req = strategy();
        assert!(req.check_and_set_settings(vec![ConfigurationSetting::radio_box("fast")]).is_ok());

        let err = req
            .check_and_set_settings(vec![ConfigurationSetting::radio_box("slow")])
            .unwrap_err();
        assert_eq!(err.code(), codes::INVALID_VALUE);

        let err = req
            .check_and_set_settings(vec![
                ConfigurationSetting::radio_box("fast"),
                ConfigurationSetting::radio_box("accurate"),
            ])
            .unwrap_err();
        assert_eq!(err.code(), codes::INVALID_CARDINALITY);
    }

    #[test]
    fn test_threshold_scenario() {
        let mut req: ConfigurationRequirement = FloatRequirement::new("threshold")
            .with_cardinality(Cardinality::optional())
            .with_default(0.8)
            .into();
        req.check_and_set_settings(vec![]).unwrap();
        let value = req.build(&empty_factory()).unwrap();
        assert_eq!(
            value,
            ConfigurationValue::Float {
                identifier: "threshold".to_string(),
                values: vec![0.8],
            }
        );
    }

    #[test]
    fn test_unregistered_file_scenario() {
        let mut req: ConfigurationRequirement = FileInputRequirement::new("input").into();
        req.check_and_set_settings(vec![ConfigurationSetting::file("missing.csv")]).unwrap();
        let err = req.build(&empty_factory()).unwrap_err();
        assert_eq!(err.code(), codes::UNRESOLVED_REFERENCE);
        assert_eq!(req.state(), RequirementState::SettingsAssigned);
    }

    #[test]
    fn test_lifecycle() {
        let mut req: ConfigurationRequirement = StringRequirement::new("name").into();
        assert_eq!(req.state(), RequirementState::Declared);

        let err = req.build(&empty_factory()).unwrap_err();
        assert_eq!(err.code(), codes::NOT_READY);
        assert_eq!(req.state(), RequirementState::Declared);

        req.check_and_set_settings(vec![ConfigurationSetting::string("x")]).unwrap();
        assert_eq!(req.state(), RequirementState::SettingsAssigned);

        req.build(&empty_factory()).unwrap();
        assert_eq!(req.state(), RequirementState::Built);

        // Reassigning settings starts a new resolution
        req.check_and_set_settings(vec![ConfigurationSetting::string("y")]).unwrap();
        assert_eq!(req.state(), RequirementState::SettingsAssigned);
    }

    #[test]
    fn test_failed_assignment_keeps_previous_settings() {
        let mut req = StringRequirement::new("name");
        req.check_and_set_settings_typed(vec!["kept".to_string()]).unwrap();
        assert!(req.check_and_set_settings_typed(vec![]).is_err());
        assert_eq!(req.settings(), Some(&["kept".to_string()][..]));
    }

    #[test]
    fn test_wrong_setting_kind_is_invalid_value() {
        let mut req: ConfigurationRequirement = IntegerRequirement::new("k").into();
        let err = req
            .check_and_set_settings(vec![ConfigurationSetting::string("3")])
            .unwrap_err();
        assert_eq!(err.code(), codes::INVALID_VALUE);
        assert!(err.to_string().contains("ConfigurationSettingInteger"));
    }

    #[test]
    fn test_build_is_idempotent() {
        let mut req: ConfigurationRequirement = IntegerRequirement::new("k")
            .with_cardinality(Cardinality::between(1, 3).unwrap())
            .into();
        req.check_and_set_settings(vec![ConfigurationSetting::integer(2), ConfigurationSetting::integer(5)])
            .unwrap();
        let factory = empty_factory();
        let first = req.build(&factory).unwrap();
        let second = req.build(&factory).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_round_trip_all_variants() {
        let requirements: Vec<ConfigurationRequirement> = vec![
            StringRequirement::new("s").with_default("x").into(),
            IntegerRequirement::new("i").with_cardinality(Cardinality::at_least(0)).into(),
            FloatRequirement::new("f").with_cardinality(Cardinality::optional()).with_default(0.5).into(),
            BooleanRequirement::new("b").with_default(true).into(),
            RadioBoxRequirement::new("strategy", ["fast", "accurate"]).with_default("fast").into(),
            CheckBoxRequirement::new("stats", ["min", "max"]).into(),
            ListRequirement::new("columns").into(),
            FileInputRequirement::new("file").into(),
            TableInputRequirement::new("table").into(),
            RelationalInputRequirement::new("input").with_cardinality(Cardinality::at_least(1)).into(),
            DatabaseConnectionRequirement::new("db").into(),
        ];
        for req in requirements {
            let json = serde_json::to_string(&req).unwrap();
            assert!(json.contains(req.kind()), "missing discriminator in {}", json);
            let back: ConfigurationRequirement = serde_json::from_str(&json).unwrap();
            assert_eq!(back, req);
        }
    }

    #[test]
    fn test_round_trip_keeps_settings() {
        let mut req: ConfigurationRequirement = CheckBoxRequirement::new("stats", ["min", "max", "mean"])
            .with_cardinality(Cardinality::at_least(1))
            .into();
        req.check_and_set_settings(vec![ConfigurationSetting::check_box(["min", "mean"])])
            .unwrap();
        let json = serde_json::to_string(&req).unwrap();
        let back: ConfigurationRequirement = serde_json::from_str(&json).unwrap();
        assert_eq!(back, req);
        assert_eq!(back.state(), RequirementState::SettingsAssigned);
    }

    #[test]
    fn test_deserialize_fixed_number_of_settings() {
        let req: ConfigurationRequirement = serde_json::from_str(
            r#"{
                "type": "ConfigurationRequirementRadioBox",
                "identifier": "strategy",
                "numberOfSettings": 1,
                "values": ["fast", "accurate"]
            }"#,
        )
        .unwrap();
        assert_eq!(req, strategy());
        assert_eq!(req.cardinality(), Cardinality::exactly(1));
    }

    #[test]
    fn test_deserialize_replays_settings_checks() {
        let json = r#"{
            "type": "ConfigurationRequirementRadioBox",
            "identifier": "strategy",
            "numberOfSettings": 1,
            "values": ["fast", "accurate"],
            "settings": ["slow", "fast", "accurate"]
        }"#;
        let err = serde_json::from_str::<ConfigurationRequirement>(json).unwrap_err();
        assert!(err.to_string().contains("expects 1 settings, got 3"), "{}", err);

        let json = r#"{
            "type": "ConfigurationRequirementRadioBox",
            "identifier": "strategy",
            "numberOfSettings": 1,
            "values": ["fast", "accurate"],
            "settings": ["slow"]
        }"#;
        let err = serde_json::from_str::<ConfigurationRequirement>(json).unwrap_err();
        assert!(err.to_string().contains("'slow' is not one of"), "{}", err);
    }

    #[test]
    fn test_deserialize_checks_every_variant() {
        let cases = [
            r#"{"type": "ConfigurationRequirementInteger", "identifier": "k", "settings": [1, 2]}"#,
            r#"{"type": "ConfigurationRequirementList", "identifier": "c", "settings": [" "]}"#,
            r#"{"type": "ConfigurationRequirementCheckBox", "identifier": "s", "values": ["min"], "settings": [["max"]]}"#,
            r#"{"type": "ConfigurationRequirementFileInput", "identifier": "f", "settings": [{"fileName": ""}]}"#,
        ];
        for json in cases {
            assert!(serde_json::from_str::<ConfigurationRequirement>(json).is_err(), "accepted {}", json);
        }
    }

    #[test]
    fn test_deserialized_settings_can_be_built() {
        let json = r#"{
            "type": "ConfigurationRequirementRadioBox",
            "identifier": "strategy",
            "numberOfSettings": 1,
            "values": ["fast", "accurate"],
            "settings": ["accurate"]
        }"#;
        let mut req: ConfigurationRequirement = serde_json::from_str(json).unwrap();
        assert_eq!(req.state(), RequirementState::SettingsAssigned);
        assert_eq!(
            req.build(&empty_factory()).unwrap(),
            ConfigurationValue::RadioBox {
                identifier: "strategy".to_string(),
                values: vec!["accurate".to_string()],
            }
        );
    }

    proptest! {
        #[test]
        fn prop_fixed_cardinality_accepts_exactly_n(n in 0usize..6, supplied in 0usize..8) {
            let mut req: ConfigurationRequirement = StringRequirement::new("s")
                .with_cardinality(Cardinality::exactly(n))
                .into();
            let settings = (0..supplied).map(|i| ConfigurationSetting::string(i.to_string())).collect();
            let result = req.check_and_set_settings(settings);
            if supplied == n {
                prop_assert!(result.is_ok());
            } else {
                prop_assert_eq!(result.unwrap_err().code(), codes::INVALID_CARDINALITY);
            }
        }

        #[test]
        fn prop_radio_box_accepts_only_members(picks in proptest::collection::vec(0usize..4, 1..4)) {
            let allowed = ["a", "b", "c"];
            let candidates = ["a", "b", "c", "z"];
            let mut req = RadioBoxRequirement::new("choice", allowed)
                .with_cardinality(Cardinality::at_least(0));
            let settings: Vec<ConfigurationSetting> = picks
                .iter()
                .map(|&i| ConfigurationSetting::radio_box(candidates[i]))
                .collect();
            let all_members = picks.iter().all(|&i| i < allowed.len());
            let result = Requirement::check_and_set_settings(&mut req, settings);
            if all_members {
                prop_assert!(result.is_ok());
            } else {
                prop_assert_eq!(result.unwrap_err().code(), codes::INVALID_VALUE);
            }
        }

        #[test]
        fn prop_default_fills_empty_input(default in -1000i64..1000, max in 1usize..4) {
            let mut req = IntegerRequirement::new("k")
                .with_cardinality(Cardinality::between(0, max).unwrap())
                .with_default(default);
            req.check_and_set_settings_typed(vec![]).unwrap();
            prop_assert_eq!(req.settings(), Some(&[default][..]));
        }
    }
}
