use serde_json::Value;
use std::path::Path;
use updateguard_filters::RequestArgs;

pub const UPDATE_CHECK_URL: &str = "https://api.wordpress.org/plugins/update-check/1.1/";

/// Write a plugin main file with the given headers under a plugins directory
pub fn write_plugin(plugins_dir: &Path, rel_path: &str, name: &str, update_uri: Option<&str>) {
    let path = plugins_dir.join(rel_path);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    let uri_line = update_uri
        .map(|uri| format!(" * Update URI: {}\n", uri))
        .unwrap_or_default();
    std::fs::write(
        path,
        format!("<?php\n/**\n * Plugin Name: {}\n{} */\n", name, uri_line),
    )
    .unwrap();
}

/// Build POST request arguments carrying an update-check payload
pub fn update_check_args(payload: &Value) -> RequestArgs {
    let mut body = serde_json::Map::new();
    body.insert(
        "plugins".to_string(),
        Value::String(serde_json::to_string(payload).unwrap()),
    );
    RequestArgs {
        method: Some("POST".to_string()),
        body: Some(body),
        ..Default::default()
    }
}

/// Decode the update-check payload back out of filtered request arguments
pub fn decode_payload(args: &RequestArgs) -> Value {
    let encoded = args.body.as_ref().unwrap()["plugins"].as_str().unwrap();
    serde_json::from_str(encoded).unwrap()
}
