//! Logical asset paths and their content-addressed counterparts.
//!
//! A logical path such as `app.js` is the stable name of an asset. In digest
//! mode it is written as `app-<digest>.js`, where `<digest>` is the hex
//! content hash of the compiled bytes.

use std::sync::LazyLock;

use regex::Regex;

/// Number of hex characters in an embedded digest.
pub const DIGEST_HEX_LEN: usize = 32;

/// Matches a digest token right before the (optional) final extension.
static DIGEST_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"-([0-9a-f]{{{DIGEST_HEX_LEN}}})(?:\.\w+)?$")).unwrap());

/// Collapses `dir/index.ext` into `dir.ext`.
///
/// Only applies when the file sits inside a directory and its name starts
/// with `index.`; a top-level `index.html` keeps its name.
pub fn normalize_logical_path(logical_path: &str) -> String {
    match logical_path.rsplit_once('/') {
        Some((dir, file)) if !dir.is_empty() && file.starts_with("index.") => {
            format!("{dir}{}", &file["index".len()..])
        }
        _ => logical_path.to_string(),
    }
}

/// Inserts `-<digest>` before the final extension of `logical_path`.
///
/// `app.js` becomes `app-<digest>.js`, `vendor/jquery.min.js` becomes
/// `vendor/jquery.min-<digest>.js`. Paths without an extension get the
/// token appended.
pub fn digest_path(logical_path: &str, digest: &str) -> String {
    if let Some(dot) = extension_start(logical_path) {
        let (stem, ext) = logical_path.split_at(dot);
        format!("{stem}-{digest}{ext}")
    } else {
        format!("{logical_path}-{digest}")
    }
}

/// Returns the hex digest embedded in a content-addressed path, if any.
pub fn embedded_digest(path: &str) -> Option<&str> {
    DIGEST_TOKEN
        .captures(path)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Byte offset of the `.` starting the final extension, if the path has one.
fn extension_start(path: &str) -> Option<usize> {
    let dot = path.rfind('.')?;
    let ext = &path[dot + 1..];
    if !ext.is_empty() && ext.chars().all(|c| c.is_alphanumeric() || c == '_') {
        Some(dot)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DIGEST: &str = "0123456789abcdef0123456789abcdef";

    #[test]
    fn normalize_nested_index() {
        assert_eq!(normalize_logical_path("widgets/index.js"), "widgets.js");
        assert_eq!(normalize_logical_path("a/b/index.min.css"), "a/b.min.css");
    }

    #[test]
    fn normalize_keeps_top_level_index() {
        assert_eq!(normalize_logical_path("index.html"), "index.html");
    }

    #[test]
    fn normalize_keeps_other_names() {
        assert_eq!(normalize_logical_path("app.js"), "app.js");
        assert_eq!(normalize_logical_path("docs/indexer.js"), "docs/indexer.js");
        assert_eq!(normalize_logical_path("docs/index"), "docs/index");
    }

    #[test]
    fn digest_path_inserts_before_extension() {
        assert_eq!(digest_path("app.js", DIGEST), format!("app-{DIGEST}.js"));
        assert_eq!(
            digest_path("vendor/jquery.min.js", DIGEST),
            format!("vendor/jquery.min-{DIGEST}.js")
        );
    }

    #[test]
    fn digest_path_without_extension() {
        assert_eq!(digest_path("LICENSE", DIGEST), format!("LICENSE-{DIGEST}"));
        assert_eq!(
            digest_path("v1.2/README", DIGEST),
            format!("v1.2/README-{DIGEST}")
        );
    }

    #[test]
    fn embedded_digest_found() {
        let path = digest_path("images/logo.png", DIGEST);
        assert_eq!(embedded_digest(&path), Some(DIGEST));
        assert_eq!(embedded_digest(&format!("LICENSE-{DIGEST}")), Some(DIGEST));
    }

    #[test]
    fn embedded_digest_absent_in_plain_path() {
        assert_eq!(embedded_digest("app.js"), None);
        assert_eq!(embedded_digest("app-1234.js"), None);
        assert_eq!(DIGEST.len(), DIGEST_HEX_LEN);
    }
}
