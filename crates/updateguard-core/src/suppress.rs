//! Suppression decision for declared update sources

use regex::Regex;
use std::sync::OnceLock;

/// Update sources that still point at the canonical plugin directory:
/// optional scheme, optional "www.", then w.org or wordpress.org, any case.
const CANONICAL_SOURCE_PATTERN: &str =
    r"(?i)^(?:https?://)?(?:www\.)?w(?:ordpress)?\.org/plugins/";

fn canonical_source() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(CANONICAL_SOURCE_PATTERN).expect("canonical source pattern compiles"))
}

/// Decide whether a plugin's declared update source should suppress
/// wordpress.org update traffic for it.
///
/// Absent or empty values never suppress. Values still pointing at the
/// canonical plugin directory never suppress. Any other value does.
pub fn skips_updates(update_uri: Option<&str>) -> bool {
    let Some(uri) = update_uri else {
        return false;
    };
    if uri.is_empty() {
        return false;
    }

    !canonical_source().is_match(uri)
}
