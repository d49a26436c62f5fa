use std::path::Path;
use updateguard_filters::{HostFilter, UpdateUriFilter};
use updateguard_telemetry::Paths;

#[cfg(test)]
fn read_filter_config(
    config_path: &Path,
) -> anyhow::Result<std::collections::HashMap<String, bool>> {
    if !config_path.exists() {
        return Ok(std::collections::HashMap::new());
    }
    let content = std::fs::read_to_string(config_path)?;
    let config: serde_json::Value = serde_json::from_str(&content)?;
    let enabled = config
        .get("enabled")
        .and_then(|e| e.as_object())
        .map(|obj| {
            obj.iter()
                .filter_map(|(k, v)| v.as_bool().map(|b| (k.clone(), b)))
                .collect()
        })
        .unwrap_or_default();
    Ok(enabled)
}

fn set_filter_enabled(config_path: &Path, name: &str, enabled: bool) -> anyhow::Result<()> {
    let mut config: serde_json::Value = if config_path.exists() {
        let content = std::fs::read_to_string(config_path)?;
        serde_json::from_str(&content)?
    } else {
        serde_json::json!({})
    };

    if config.get("enabled").is_none() {
        config["enabled"] = serde_json::json!({});
    }
    config["enabled"][name] = serde_json::Value::Bool(enabled);

    let json = serde_json::to_string_pretty(&config)?;
    updateguard_telemetry::atomic_write(config_path, json.as_bytes())?;
    Ok(())
}

pub fn run_list() -> anyhow::Result<()> {
    let filters: Vec<Box<dyn HostFilter>> = vec![Box::new(UpdateUriFilter::new())];

    println!("Registered Filters");
    println!("==================");
    for filter in &filters {
        let status = if filter.is_enabled() {
            "enabled"
        } else {
            "disabled"
        };
        println!("  {} v{} [{}]", filter.name(), filter.version(), status);
        let desc = filter.description();
        if !desc.is_empty() {
            println!("    {}", desc);
        }
    }
    Ok(())
}

pub fn run_enable(name: &str) -> anyhow::Result<()> {
    let paths = Paths::new()?;
    set_filter_enabled(&paths.config_path(), name, true)?;
    println!("Enabled filter: {}", name);
    Ok(())
}

pub fn run_disable(name: &str) -> anyhow::Result<()> {
    let paths = Paths::new()?;
    set_filter_enabled(&paths.config_path(), name, false)?;
    println!("Disabled filter: {}", name);
    Ok(())
}
