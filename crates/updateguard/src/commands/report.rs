use std::collections::HashMap;
use updateguard_telemetry::{read_jsonl, ExtensionPoint, Paths, SuppressionRecord};

pub fn run() -> anyhow::Result<()> {
    let paths = Paths::new()?;
    let records: Vec<SuppressionRecord> = read_jsonl(&paths.events_file())?;

    let report = build_report(&records);
    if report.is_empty() {
        println!("No suppression events recorded.");
    } else {
        println!("{}", report);
    }
    Ok(())
}

fn build_report(records: &[SuppressionRecord]) -> String {
    if records.is_empty() {
        return String::new();
    }

    let mut lines = vec!["## updateguard".to_string()];

    let request_events = records
        .iter()
        .filter(|r| r.extension_point == ExtensionPoint::HttpRequestArgs)
        .count();
    let lookup_events = records.len() - request_events;
    let now = chrono::Utc::now();
    let recent = records
        .iter()
        .filter(|r| now - r.timestamp < chrono::Duration::hours(24))
        .count();
    lines.push(format!(
        "Events: {} | Update checks filtered: {} | Lookups blocked: {} | Last 24h: {}",
        records.len(),
        request_events,
        lookup_events,
        recent
    ));

    // Most frequently suppressed plugins
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for record in records {
        for plugin in &record.suppressed {
            *counts.entry(plugin.as_str()).or_default() += 1;
        }
    }
    let mut sorted: Vec<_> = counts.into_iter().collect();
    sorted.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));
    if !sorted.is_empty() {
        let top3: Vec<String> = sorted
            .iter()
            .take(3)
            .map(|(plugin, count)| format!("{}({})", plugin, count))
            .collect();
        lines.push(format!("Top suppressed: {}", top3.join(", ")));
    }

    if let Some(last) = records.iter().map(|r| r.timestamp).max() {
        lines.push(format!("Last event: {}", last.format("%Y-%m-%d %H:%M UTC")));
    }

    lines.join("\n")
}
