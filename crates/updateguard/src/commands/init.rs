use serde_json::Value;
use std::path::Path;
use updateguard_telemetry::Paths;

/// Extension points and the hook command registered for each
const EXTENSION_COMMANDS: &[(&str, &str)] = &[
    ("http_request_args", "updateguard hook:http-request-args"),
    ("plugins_api", "updateguard hook:plugins-api"),
];

pub fn run() -> anyhow::Result<()> {
    let paths = Paths::new()?;
    run_at(&paths)
}

fn run_at(paths: &Paths) -> anyhow::Result<()> {
    if !paths.host_root.join("wp-content").exists() {
        anyhow::bail!(
            "{} does not look like a host installation (wp-content not found)",
            paths.host_root.display()
        );
    }

    // Read or create the host's extension registration file
    let extensions_path = paths.extensions_path();
    let mut manifest: Value = if extensions_path.exists() {
        let content = std::fs::read_to_string(&extensions_path)?;
        serde_json::from_str(&content)?
    } else {
        serde_json::json!({})
    };

    if manifest.get("filters").is_none() {
        manifest["filters"] = serde_json::json!({});
    }

    for &(extension_point, command) in EXTENSION_COMMANDS {
        register_if_missing(&mut manifest, extension_point, command)?;
    }

    let json = serde_json::to_string_pretty(&manifest)?;
    updateguard_telemetry::atomic_write(&extensions_path, json.as_bytes())?;

    println!("✓ Registered updateguard filters in extensions.json");
    println!("\nExtension points:");
    for &(extension_point, _) in EXTENSION_COMMANDS {
        println!("  - {}", extension_point);
    }

    Ok(())
}

fn register_if_missing(
    manifest: &mut Value,
    extension_point: &str,
    command: &str,
) -> anyhow::Result<()> {
    let filters = manifest
        .get_mut("filters")
        .and_then(|f| f.as_object_mut())
        .ok_or_else(|| anyhow::anyhow!("filters is not an object"))?;

    let entry_array = filters
        .entry(extension_point)
        .or_insert_with(|| serde_json::json!([]));

    let entries = entry_array
        .as_array_mut()
        .ok_or_else(|| anyhow::anyhow!("extension point {} is not an array", extension_point))?;

    let already_registered = entries.iter().any(|entry| {
        entry
            .get("command")
            .and_then(|c| c.as_str())
            .map(|cmd| cmd.starts_with("updateguard "))
            .unwrap_or(false)
    });

    if !already_registered {
        entries.push(serde_json::json!({
            "type": "command",
            "command": command,
        }));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn host_paths(temp: &TempDir) -> Paths {
        fs::create_dir_all(temp.path().join("wp-content")).unwrap();
        Paths {
            host_root: temp.path().to_path_buf(),
            home_dir: temp.path().to_path_buf(),
        }
    }

    #[test]
    fn test_init_registers_both_extension_points() {
        let temp = TempDir::new().unwrap();
        let paths = host_paths(&temp);

        run_at(&paths).unwrap();

        let content = fs::read_to_string(paths.extensions_path()).unwrap();
        assert!(content.contains("http_request_args"));
        assert!(content.contains("plugins_api"));
        assert!(content.contains("updateguard hook:http-request-args"));
        assert!(content.contains("updateguard hook:plugins-api"));
    }

    #[test]
    fn test_init_is_idempotent() {
        let temp = TempDir::new().unwrap();
        let paths = host_paths(&temp);

        run_at(&paths).unwrap();
        run_at(&paths).unwrap();

        let content = fs::read_to_string(paths.extensions_path()).unwrap();
        let manifest: Value = serde_json::from_str(&content).unwrap();
        assert_eq!(manifest["filters"]["http_request_args"].as_array().unwrap().len(), 1);
        assert_eq!(manifest["filters"]["plugins_api"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_init_preserves_foreign_registrations() {
        let temp = TempDir::new().unwrap();
        let paths = host_paths(&temp);

        let existing = serde_json::json!({
            "filters": {
                "http_request_args": [
                    { "type": "command", "command": "other-tool hook" }
                ]
            }
        });
        fs::write(
            paths.extensions_path(),
            serde_json::to_string_pretty(&existing).unwrap(),
        )
        .unwrap();

        run_at(&paths).unwrap();

        let content = fs::read_to_string(paths.extensions_path()).unwrap();
        assert!(content.contains("other-tool hook"));
        assert!(content.contains("updateguard hook:http-request-args"));
    }

    #[test]
    fn test_init_rejects_non_host_directory() {
        let temp = TempDir::new().unwrap();
        let paths = Paths {
            host_root: temp.path().to_path_buf(),
            home_dir: temp.path().to_path_buf(),
        };

        assert!(run_at(&paths).is_err());
    }

    #[test]
    fn test_register_if_missing() {
        let mut manifest = serde_json::json!({ "filters": {} });

        register_if_missing(
            &mut manifest,
            "http_request_args",
            "updateguard hook:http-request-args",
        )
        .unwrap();

        let entries = manifest["filters"]["http_request_args"].as_array().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(
            entries[0]["command"].as_str().unwrap(),
            "updateguard hook:http-request-args"
        );
    }
}
