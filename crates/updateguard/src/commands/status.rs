use serde_json::Value;
use updateguard_core::{scan_plugins_dir, skips_updates};
use updateguard_filters::HostConfig;
use updateguard_telemetry::Paths;

pub fn run() -> anyhow::Result<()> {
    let paths = Paths::new()?;
    println!("{}", status_json(&paths));
    Ok(())
}

fn status_json(paths: &Paths) -> Value {
    let config = HostConfig::load(paths);
    let plugins_dir = config.plugins_dir(paths);
    let plugins = scan_plugins_dir(&plugins_dir).unwrap_or_default();

    let mut suppressed: Vec<String> = plugins
        .iter()
        .filter(|(_, headers)| skips_updates(headers.update_uri()))
        .map(|(plugin_file, _)| plugin_file.clone())
        .collect();
    suppressed.sort();

    serde_json::json!({
        "plugins_dir": plugins_dir.to_string_lossy(),
        "installed": plugins.len(),
        "suppressed": suppressed,
        "filters": {
            "update-uri": config.is_enabled("update-uri"),
        },
    })
}
