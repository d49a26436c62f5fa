//! Plugin identifier derivation

/// Derive the short identifier for a plugin from its registry key.
///
/// Plugins installed in their own directory are identified by the directory
/// name; single-file plugins by the file base name.
/// `"example/example.php"` -> `"example"`, `"hello.php"` -> `"hello"`.
pub fn plugin_slug(plugin_file: &str) -> String {
    match plugin_file.rsplit_once('/') {
        Some((dir, _)) => dir.to_string(),
        None => plugin_file
            .strip_suffix(".php")
            .unwrap_or(plugin_file)
            .to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directory_plugin_uses_directory_name() {
        assert_eq!(plugin_slug("foo/bar.php"), "foo");
        assert_eq!(plugin_slug("my-plugin/my-plugin.php"), "my-plugin");
    }

    #[test]
    fn test_single_file_plugin_strips_extension() {
        assert_eq!(plugin_slug("bar.php"), "bar");
        assert_eq!(plugin_slug("hello-dolly.php"), "hello-dolly");
    }

    #[test]
    fn test_non_php_key_kept_verbatim() {
        assert_eq!(plugin_slug("weird.txt"), "weird.txt");
    }
}
