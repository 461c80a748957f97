//! Configuration types deserialized from `kiln.toml`.

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer};

/// The top-level configuration parsed from `kiln.toml`.
#[derive(Debug, Deserialize)]
pub struct KilnConfig {
    /// Asset precompilation settings.
    pub assets: AssetsConfig,
}

/// The `[assets]` table.
#[derive(Debug, Deserialize)]
pub struct AssetsConfig {
    /// Output directory, relative to the project directory.
    #[serde(default)]
    pub target: String,
    /// Search paths to enumerate assets from, as a string or a list.
    #[serde(default, deserialize_with = "deserialize_string_or_vec")]
    pub paths: Vec<String>,
    /// Write content-addressed file names.
    #[serde(default = "default_true")]
    pub digest: bool,
    /// Persist `manifest.json` in the target directory.
    #[serde(default = "default_true")]
    pub manifest: bool,
    /// Delete outputs the manifest no longer references.
    #[serde(default = "default_true")]
    pub clean_after_precompile: bool,
    /// After a digest pass, also write plain-named copies.
    #[serde(default)]
    pub nondigest: bool,
    /// Regular expression selecting outputs that get a `.gz` companion.
    /// Unset means the precompiler's default.
    #[serde(default)]
    pub compress: Option<String>,
    /// Root of the tree cleanup sweeps. Defaults to `target`.
    #[serde(default)]
    pub output_root: Option<String>,
}

fn default_true() -> bool {
    true
}

/// Deserializes a field that can be either a single string or a list of strings.
///
/// Allows `paths = "app/assets"` as well as `paths = ["app/assets", "vendor/assets"]`.
fn deserialize_string_or_vec<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    struct StringOrVec;

    impl<'de> Visitor<'de> for StringOrVec {
        type Value = Vec<String>;

        fn expecting(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            formatter.write_str("a string or a list of strings")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
            Ok(vec![v.to_string()])
        }

        fn visit_seq<A: de::SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
            let mut vec = Vec::new();
            while let Some(val) = seq.next_element::<String>()? {
                vec.push(val);
            }
            Ok(vec)
        }
    }

    deserializer.deserialize_any(StringOrVec)
}
