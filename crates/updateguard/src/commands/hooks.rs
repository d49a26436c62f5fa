use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use std::io::{self, Read, Write};
use updateguard_filters::{
    FilterChain, PluginsApiArgs, RequestArgs, UpdateUriFilter, BLOCKED_ERROR_CODE,
};
use updateguard_telemetry::{append_jsonl, ExtensionPoint, Paths, SuppressionRecord};

fn build_chain() -> FilterChain {
    let mut chain = FilterChain::new();
    chain.register(Box::new(UpdateUriFilter::new()));
    chain
}

#[derive(Debug, Deserialize)]
struct RequestHookInput {
    url: String,
    args: Value,
}

#[derive(Debug, Deserialize)]
struct ApiHookInput {
    #[serde(default)]
    result: Option<Value>,
    action: String,
    #[serde(default)]
    args: PluginsApiArgs,
}

#[derive(Debug, Serialize)]
struct ApiHookOutput {
    result: Option<Value>,
}

/// Extension point 1: outgoing HTTP request arguments.
///
/// Reads `{"url": ..., "args": {...}}` from stdin and writes the filtered
/// request arguments to stdout.
pub fn hook_http_request_args() -> anyhow::Result<()> {
    // 1. Read JSON from stdin
    let mut input = String::new();
    io::stdin().read_to_string(&mut input)?;

    // 2. Filter and write the result to stdout
    let paths = Paths::new()?;
    let output = run_http_request_args(&input, &paths);

    io::stdout().write_all(output.as_bytes())?;
    io::stdout().flush()?;
    Ok(())
}

/// Extension point 2: plugin metadata queries.
///
/// Reads `{"result": ..., "action": ..., "args": {...}}` from stdin and
/// writes `{"result": ...}` to stdout.
pub fn hook_plugins_api() -> anyhow::Result<()> {
    let mut input = String::new();
    io::stdin().read_to_string(&mut input)?;

    let paths = Paths::new()?;
    let output = run_plugins_api(&input, &paths);

    io::stdout().write_all(output.as_bytes())?;
    io::stdout().flush()?;
    Ok(())
}

/// Run the request-args extension point over one JSON envelope.
///
/// Input that does not match the expected envelope is echoed back unchanged
/// so a confused host integration can never lose a request.
fn run_http_request_args(input: &str, paths: &Paths) -> String {
    let Ok(envelope) = serde_json::from_str::<RequestHookInput>(input) else {
        return input.to_string();
    };
    let Ok(args) = serde_json::from_value::<RequestArgs>(envelope.args.clone()) else {
        return envelope.args.to_string();
    };

    let before = payload_plugin_files(&args);

    let mut chain = build_chain();
    let filtered = chain.on_http_request_args(args, &envelope.url);

    let after: HashSet<String> = payload_plugin_files(&filtered).into_iter().collect();
    let suppressed: Vec<String> = before
        .iter()
        .filter(|plugin_file| !after.contains(*plugin_file))
        .cloned()
        .collect();

    if !suppressed.is_empty() {
        let record = SuppressionRecord::new(
            ExtensionPoint::HttpRequestArgs,
            paths.host_root_display(),
            suppressed,
            before.len(),
        );
        let _ = append_jsonl(&paths.events_file(), &record);
    }

    serde_json::to_string(&filtered).unwrap_or_else(|_| envelope.args.to_string())
}

/// Run the metadata-query extension point over one JSON envelope.
fn run_plugins_api(input: &str, paths: &Paths) -> String {
    let Ok(envelope) = serde_json::from_str::<ApiHookInput>(input) else {
        return input.to_string();
    };

    let mut chain = build_chain();
    let result = chain.on_plugins_api(envelope.result.clone(), &envelope.action, &envelope.args);

    if is_blocked(&result) && !is_blocked(&envelope.result) {
        let slug = envelope.args.slug.clone().unwrap_or_default();
        let record = SuppressionRecord::new(
            ExtensionPoint::PluginsApi,
            paths.host_root_display(),
            vec![slug],
            1,
        );
        let _ = append_jsonl(&paths.events_file(), &record);
    }

    serde_json::to_string(&ApiHookOutput { result }).unwrap_or_else(|_| input.to_string())
}

/// Plugin files listed in an update-check body, if the arguments carry one
fn payload_plugin_files(args: &RequestArgs) -> Vec<String> {
    let Some(body) = &args.body else {
        return Vec::new();
    };
    let Some(encoded) = body.get("plugins").and_then(Value::as_str) else {
        return Vec::new();
    };
    let Ok(payload) = serde_json::from_str::<Value>(encoded) else {
        return Vec::new();
    };
    let Some(plugins) = payload.get("plugins").and_then(Value::as_object) else {
        return Vec::new();
    };
    plugins.keys().cloned().collect()
}

fn is_blocked(result: &Option<Value>) -> bool {
    result
        .as_ref()
        .and_then(|value| value.pointer("/error/code"))
        .and_then(Value::as_str)
        == Some(BLOCKED_ERROR_CODE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::path::Path;
    use updateguard_telemetry::read_jsonl;

    const UPDATE_CHECK_URL: &str = "https://api.wordpress.org/plugins/update-check/1.1/";

    fn test_paths(root: &Path) -> Paths {
        Paths {
            host_root: root.to_path_buf(),
            home_dir: root.to_path_buf(),
        }
    }

    fn update_check_envelope(url: &str) -> String {
        let payload = serde_json::json!({
            "plugins": {
                "external/external.php": {
                    "Name": "External",
                    "UpdateURI": "https://updates.example.com/external"
                },
                "plain/plain.php": { "Name": "Plain" }
            },
            "active": ["external/external.php", "plain/plain.php"]
        });
        serde_json::json!({
            "url": url,
            "args": {
                "method": "POST",
                "timeout": 30,
                "body": { "plugins": payload.to_string() }
            }
        })
        .to_string()
    }

    #[test]
    fn test_request_hook_filters_update_check() {
        let temp = tempfile::TempDir::new().unwrap();
        let paths = test_paths(temp.path());

        let output = run_http_request_args(&update_check_envelope(UPDATE_CHECK_URL), &paths);
        let args: Value = serde_json::from_str(&output).unwrap();

        assert_eq!(args["timeout"], 30);
        let encoded = args["body"]["plugins"].as_str().unwrap();
        let payload: Value = serde_json::from_str(encoded).unwrap();
        assert!(payload["plugins"].get("external/external.php").is_none());
        assert!(payload["plugins"].get("plain/plain.php").is_some());
        assert_eq!(payload["active"], serde_json::json!(["plain/plain.php"]));
    }

    #[test]
    fn test_request_hook_records_suppression_event() {
        let temp = tempfile::TempDir::new().unwrap();
        let paths = test_paths(temp.path());

        run_http_request_args(&update_check_envelope(UPDATE_CHECK_URL), &paths);

        let records: Vec<SuppressionRecord> = read_jsonl(&paths.events_file()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].extension_point, ExtensionPoint::HttpRequestArgs);
        assert_eq!(records[0].suppressed, vec!["external/external.php"]);
        assert_eq!(records[0].payload_plugins, 2);
    }

    #[test]
    fn test_request_hook_passes_other_urls_without_recording() {
        let temp = tempfile::TempDir::new().unwrap();
        let paths = test_paths(temp.path());

        let input = update_check_envelope("https://example.com/ping");
        let output = run_http_request_args(&input, &paths);

        let envelope: Value = serde_json::from_str(&input).unwrap();
        let args: Value = serde_json::from_str(&output).unwrap();
        assert_eq!(args, envelope["args"]);
        assert!(!paths.events_file().exists());
    }

    #[test]
    fn test_request_hook_echoes_malformed_input() {
        let temp = tempfile::TempDir::new().unwrap();
        let paths = test_paths(temp.path());

        assert_eq!(run_http_request_args("not json", &paths), "not json");

        // Valid envelope, arguments of an unexpected shape
        let input = r#"{"url":"https://api.wordpress.org/plugins/update-check/1.1/","args":{"method":7}}"#;
        let output = run_http_request_args(input, &paths);
        let args: Value = serde_json::from_str(&output).unwrap();
        assert_eq!(args, serde_json::json!({"method": 7}));
    }

    #[test]
    #[serial]
    fn test_api_hook_blocks_installed_external_plugin() {
        let temp = tempfile::TempDir::new().unwrap();
        let plugin_dir = temp.path().join("wp-content/plugins/external");
        std::fs::create_dir_all(&plugin_dir).unwrap();
        std::fs::write(
            plugin_dir.join("external.php"),
            "<?php\n/**\n * Plugin Name: External\n * Update URI: https://updates.example.com/external\n */\n",
        )
        .unwrap();

        // The default registry scans relative to the process working
        // directory, the way the host invokes hooks.
        let original_cwd = std::env::current_dir().unwrap();
        std::env::set_current_dir(temp.path()).unwrap();

        let paths = test_paths(temp.path());
        let input = serde_json::json!({
            "result": null,
            "action": "plugin_information",
            "args": { "slug": "external" }
        })
        .to_string();
        let output = run_plugins_api(&input, &paths);

        std::env::set_current_dir(original_cwd).unwrap();

        let response: Value = serde_json::from_str(&output).unwrap();
        assert_eq!(response["result"]["error"]["code"], BLOCKED_ERROR_CODE);

        let records: Vec<SuppressionRecord> = read_jsonl(&paths.events_file()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].extension_point, ExtensionPoint::PluginsApi);
        assert_eq!(records[0].suppressed, vec!["external"]);
    }

    #[test]
    #[serial]
    fn test_api_hook_passes_unknown_slug() {
        let temp = tempfile::TempDir::new().unwrap();
        let original_cwd = std::env::current_dir().unwrap();
        std::env::set_current_dir(temp.path()).unwrap();

        let paths = test_paths(temp.path());
        let input = serde_json::json!({
            "result": {"name": "Somebody"},
            "action": "plugin_information",
            "args": { "slug": "somebody" }
        })
        .to_string();
        let output = run_plugins_api(&input, &paths);

        std::env::set_current_dir(original_cwd).unwrap();

        let response: Value = serde_json::from_str(&output).unwrap();
        assert_eq!(response["result"], serde_json::json!({"name": "Somebody"}));
        assert!(!paths.events_file().exists());
    }

    #[test]
    fn test_api_hook_echoes_malformed_input() {
        let temp = tempfile::TempDir::new().unwrap();
        let paths = test_paths(temp.path());

        // No action field
        let input = r#"{"result": null}"#;
        assert_eq!(run_plugins_api(input, &paths), input);
    }

    #[test]
    fn test_is_blocked_matches_only_designated_code() {
        assert!(!is_blocked(&None));
        assert!(!is_blocked(&Some(serde_json::json!({"name": "x"}))));
        assert!(!is_blocked(&Some(
            serde_json::json!({"error": {"code": "other", "message": "m"}})
        )));
        assert!(is_blocked(&Some(serde_json::json!({
            "error": {"code": BLOCKED_ERROR_CODE, "message": "m"}
        }))));
    }
}
