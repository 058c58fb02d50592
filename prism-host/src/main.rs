//! Prism Host
//!
//! JSON-lines server exposing the algorithm registry on stdin/stdout.
//! Logs go to stderr so stdout carries only protocol messages.
//!
//! Methods:
//! - algorithms/list: Descriptors, optionally filtered by capability
//! - algorithms/describe: Descriptor and configuration requirements
//! - resources/list: Registered files, connections and tables
//! - algorithms/execute: Configure, resolve and run an algorithm

mod config;

use config::HostConfig;
use prism_core::Capability;
use prism_plugin::{
    AlgorithmExecutor, AlgorithmRegistry, ConfigurationSetting, ExecutionError, ResourceFactory,
    ResourceRegistry,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};
use std::collections::BTreeMap;
use std::io::{self, BufRead, Write};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

const SERVER_NAME: &str = "prism";
const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

// JSON-RPC error codes
const PARSE_ERROR: i32 = -32700;
const METHOD_NOT_FOUND: i32 = -32601;
const INVALID_PARAMS: i32 = -32602;
const EXECUTION_FAILED: i32 = -32000;
const UNKNOWN_ALGORITHM: i32 = -32001;

#[derive(Debug, Deserialize)]
struct HostRequest {
    #[serde(default)]
    id: Option<JsonValue>,
    method: String,
    #[serde(default)]
    params: Option<JsonValue>,
}

#[derive(Debug, Serialize)]
struct HostResponse {
    jsonrpc: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<HostError>,
}

#[derive(Debug, Serialize)]
struct HostError {
    code: i32,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<JsonValue>,
}

impl HostError {
    fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    fn invalid_params(message: impl Into<String>) -> Self {
        Self::new(INVALID_PARAMS, message)
    }
}

impl From<ExecutionError> for HostError {
    fn from(e: ExecutionError) -> Self {
        let code = match e {
            ExecutionError::UnknownAlgorithm { .. } => UNKNOWN_ALGORITHM,
            _ => EXECUTION_FAILED,
        };
        Self {
            code,
            message: error_chain(&e),
            data: Some(json!({
                "code": e.code(),
                "suggestion": e.suggestion(),
            })),
        }
    }
}

/// Error message followed by its causes
fn error_chain(e: &dyn std::error::Error) -> String {
    let mut message = e.to_string();
    let mut source = e.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

#[derive(Debug, Deserialize)]
struct ListParams {
    #[serde(default)]
    capability: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DescribeParams {
    name: String,
}

#[derive(Debug, Deserialize)]
struct ExecuteParams {
    name: String,
    #[serde(default)]
    settings: BTreeMap<String, Vec<ConfigurationSetting>>,
}

fn parse_params<T: for<'de> Deserialize<'de>>(params: &Option<JsonValue>) -> Result<T, HostError> {
    let params = params.clone().unwrap_or_else(|| json!({}));
    serde_json::from_value(params).map_err(|e| HostError::invalid_params(format!("Invalid params: {}", e)))
}

/// Registry, resources and executor behind the protocol
struct Host {
    executor: AlgorithmExecutor,
}

impl Host {
    fn new(registry: AlgorithmRegistry, resources: ResourceRegistry) -> Self {
        let factory = ResourceFactory::new(Arc::new(resources));
        Self {
            executor: AlgorithmExecutor::new(Arc::new(registry), factory),
        }
    }

    fn registry(&self) -> &AlgorithmRegistry {
        self.executor.registry()
    }

    fn resources(&self) -> &ResourceRegistry {
        self.executor.factory().resources()
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn main() -> ExitCode {
    init_logging();

    let config = HostConfig::from_env();
    let registry = match prism_std::standard_registry() {
        Ok(registry) => registry,
        Err(e) => {
            error!(error = %error_chain(&e), "failed to load standard algorithms");
            return ExitCode::FAILURE;
        }
    };
    let resources = match config.load_resources() {
        Ok(resources) => resources,
        Err(e) => {
            error!(error = %error_chain(&e), "failed to load resources");
            return ExitCode::FAILURE;
        }
    };
    let host = Host::new(registry, resources);

    info!(
        version = SERVER_VERSION,
        data_path = %config.data_path.display(),
        algorithms = host.registry().len(),
        "Prism host started"
    );

    let stdin = io::stdin();
    let mut reader = io::BufReader::new(stdin.lock());

    loop {
        let mut line = String::new();
        match reader.read_line(&mut line) {
            Ok(0) => {
                info!("input closed");
                break;
            }
            Ok(_) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }

                let request: HostRequest = match serde_json::from_str(line) {
                    Ok(r) => r,
                    Err(e) => {
                        warn!(error = %e, "unparseable request");
                        let response = respond(None, Err(HostError::new(PARSE_ERROR, format!("Parse error: {}", e))));
                        if let Err(e) = write_response(&response) {
                            error!(error = %e, "failed to write response");
                            break;
                        }
                        continue;
                    }
                };

                debug!(method = %request.method, "request received");
                let response = handle_request(&host, &request);

                // Notifications (no id) get no response
                if request.id.is_none() {
                    continue;
                }
                if let Err(e) = write_response(&response) {
                    error!(error = %e, "failed to write response");
                    break;
                }
            }
            Err(e) => {
                error!(error = %e, "failed to read input");
                break;
            }
        }
    }

    info!("Prism host shutting down");
    ExitCode::SUCCESS
}

fn write_response(response: &HostResponse) -> io::Result<()> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer(&mut stdout, response)?;
    writeln!(stdout)?;
    stdout.flush()
}

fn respond(id: Option<JsonValue>, result: Result<JsonValue, HostError>) -> HostResponse {
    match result {
        Ok(r) => HostResponse {
            jsonrpc: "2.0",
            id,
            result: Some(r),
            error: None,
        },
        Err(e) => HostResponse {
            jsonrpc: "2.0",
            id,
            result: None,
            error: Some(e),
        },
    }
}

fn handle_request(host: &Host, request: &HostRequest) -> HostResponse {
    let result = match request.method.as_str() {
        "initialize" => Ok(json!({
            "serverInfo": { "name": SERVER_NAME, "version": SERVER_VERSION },
            "algorithms": host.registry().len(),
        })),
        "ping" => Ok(json!({})),
        "algorithms/list" => handle_list(host, &request.params),
        "algorithms/describe" => handle_describe(host, &request.params),
        "algorithms/execute" => handle_execute(host, &request.params),
        "resources/list" => to_json(&host.resources().to_manifest()),
        _ => Err(HostError::new(
            METHOD_NOT_FOUND,
            format!("Method not found: {}", request.method),
        )),
    };
    respond(request.id.clone(), result)
}

fn to_json<T: Serialize>(value: &T) -> Result<JsonValue, HostError> {
    serde_json::to_value(value).map_err(|e| HostError::new(EXECUTION_FAILED, format!("Serialization failed: {}", e)))
}

fn handle_list(host: &Host, params: &Option<JsonValue>) -> Result<JsonValue, HostError> {
    let params: ListParams = parse_params(params)?;
    let capability = match params.capability.as_deref() {
        Some(name) => Some(Capability::parse(name).ok_or_else(|| {
            let known: Vec<&str> = Capability::ALL.iter().map(|c| c.as_str()).collect();
            HostError::invalid_params(format!("Unknown capability '{}'. Known: {}", name, known.join(", ")))
        })?),
        None => None,
    };
    Ok(json!({ "algorithms": to_json(&host.registry().descriptors(capability))? }))
}

fn handle_describe(host: &Host, params: &Option<JsonValue>) -> Result<JsonValue, HostError> {
    let params: DescribeParams = parse_params(params)?;
    let configuration = host.registry().configure(&params.name).ok_or_else(|| {
        HostError::from(ExecutionError::UnknownAlgorithm {
            name: params.name.clone(),
            suggestion: host.registry().suggest(&params.name),
        })
    })?;
    Ok(json!({
        "algorithm": to_json(configuration.descriptor())?,
        "requirements": to_json(&configuration.requirements())?,
    }))
}

fn handle_execute(host: &Host, params: &Option<JsonValue>) -> Result<JsonValue, HostError> {
    let params: ExecuteParams = parse_params(params)?;
    let report = host.executor.execute(&params.name, params.settings).map_err(|e| {
        warn!(algorithm = %params.name, error = %e, "execution failed");
        HostError::from(e)
    })?;
    to_json(&report)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn host(dir: &tempfile::TempDir) -> Host {
        std::fs::write(dir.path().join("people.csv"), "id,name\n1,Ann\n2,Bob\n").unwrap();
        let resources = ResourceRegistry::new().with_file("people.csv", dir.path().join("people.csv"));
        Host::new(prism_std::standard_registry().unwrap(), resources)
    }

    fn call(host: &Host, line: &str) -> JsonValue {
        let request: HostRequest = serde_json::from_str(line).unwrap();
        serde_json::to_value(handle_request(host, &request)).unwrap()
    }

    #[test]
    fn test_list_filters_by_capability() {
        let dir = tempfile::tempdir().unwrap();
        let response = call(
            &host(&dir),
            r#"{"id": 1, "method": "algorithms/list", "params": {"capability": "UNIQUE_COLUMN_COMBINATION"}}"#,
        );
        let algorithms = response["result"]["algorithms"].as_array().unwrap();
        assert_eq!(algorithms.len(), 1);
        assert_eq!(algorithms[0]["name"], "ucc-naive");
    }

    #[test]
    fn test_unknown_capability_is_invalid_params() {
        let dir = tempfile::tempdir().unwrap();
        let response = call(
            &host(&dir),
            r#"{"id": 1, "method": "algorithms/list", "params": {"capability": "magic"}}"#,
        );
        assert_eq!(response["error"]["code"], INVALID_PARAMS);
    }

    #[test]
    fn test_describe_lists_tagged_requirements() {
        let dir = tempfile::tempdir().unwrap();
        let response = call(
            &host(&dir),
            r#"{"id": 2, "method": "algorithms/describe", "params": {"name": "ucc-naive"}}"#,
        );
        let requirements = response["result"]["requirements"].as_array().unwrap();
        assert_eq!(requirements[0]["type"], "ConfigurationRequirementFileInput");
        assert_eq!(requirements[2]["type"], "ConfigurationRequirementRadioBox");
        assert_eq!(requirements[2]["defaultValue"], "null-equals-null");
    }

    #[test]
    fn test_describe_unknown_suggests() {
        let dir = tempfile::tempdir().unwrap();
        let response = call(
            &host(&dir),
            r#"{"id": 3, "method": "algorithms/describe", "params": {"name": "ucc"}}"#,
        );
        assert_eq!(response["error"]["code"], UNKNOWN_ALGORITHM);
        assert!(response["error"]["data"]["suggestion"]
            .as_str()
            .unwrap()
            .contains("ucc-naive"));
    }

    #[test]
    fn test_execute() {
        let dir = tempfile::tempdir().unwrap();
        let response = call(
            &host(&dir),
            r#"{"id": 4, "method": "algorithms/execute", "params": {
                "name": "ucc-naive",
                "settings": {"input": [{"type": "ConfigurationSettingFileInput", "fileName": "people.csv"}]}
            }}"#,
        );
        let results = response["result"]["results"].as_array().unwrap();
        assert!(results
            .iter()
            .any(|r| r["type"] == "uniqueColumnCombination" && r["columns"] == json!(["id"])));
    }

    #[test]
    fn test_execute_unresolved_file() {
        let dir = tempfile::tempdir().unwrap();
        let response = call(
            &host(&dir),
            r#"{"id": 5, "method": "algorithms/execute", "params": {
                "name": "ucc-naive",
                "settings": {"input": [{"type": "ConfigurationSettingFileInput", "fileName": "missing.csv"}]}
            }}"#,
        );
        assert_eq!(response["error"]["code"], EXECUTION_FAILED);
        assert_eq!(response["error"]["data"]["code"], "UNRESOLVED_REFERENCE");
    }

    #[test]
    fn test_resources_list() {
        let dir = tempfile::tempdir().unwrap();
        let response = call(&host(&dir), r#"{"id": 6, "method": "resources/list"}"#);
        assert_eq!(response["result"]["files"][0]["name"], "people.csv");
    }

    #[test]
    fn test_unknown_method() {
        let dir = tempfile::tempdir().unwrap();
        let response = call(&host(&dir), r#"{"id": 7, "method": "tools/list"}"#);
        assert_eq!(response["error"]["code"], METHOD_NOT_FOUND);
        assert_eq!(response["id"], 7);
    }
}
