//! # Configuration
//!
//! Generator settings, resolved in this order (later wins):
//!
//! 1. Built-in defaults
//! 2. `stubgen.toml` (given with `--config`, otherwise looked up in the
//!    working directory)
//! 3. Environment variables
//! 4. Command-line flags
//!
//! ## `stubgen.toml`
//!
//! ```toml
//! generated_root = "target/generated-sources/stubs"
//! mirror_root = "target/generated-stub-sources"
//! extension = "rs"
//! root_package = "com.acme"
//! mode = "strict"
//! templates = "stub-templates"
//! ```
//!
//! ## Environment Variables
//!
//! - `STUBGEN_GENERATED_ROOT` - canonical output root
//! - `STUBGEN_MIRROR_ROOT` - mirror output root
//! - `STUBGEN_ROOT_PACKAGE` - package prefix for scanned sources
//! - `STUBGEN_MODE` - `lenient` or `strict`

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::model::ModelPolicy;

/// File name looked up when no explicit config path is given.
pub const CONFIG_FILE_NAME: &str = "stubgen.toml";

/// Settings for one generator invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneratorConfig {
    /// Root of the canonical generated-sources tree
    pub generated_root: PathBuf,
    /// Root of the stable mirror tree
    pub mirror_root: PathBuf,
    /// Extension of generated files, without the dot
    pub extension: String,
    /// Package prefix for declarations found in Rust sources
    pub root_package: Option<String>,
    /// What to do with an incomplete model
    pub mode: ModelPolicy,
    /// Directory with `stub_base.rs.j2` / `stub.rs.j2` overrides
    pub templates: Option<PathBuf>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            generated_root: PathBuf::from("target/generated-sources/stubs"),
            mirror_root: PathBuf::from("target/generated-stub-sources"),
            extension: "rs".to_string(),
            root_package: None,
            mode: ModelPolicy::Lenient,
            templates: None,
        }
    }
}

impl GeneratorConfig {
    /// Apply `STUBGEN_*` overrides from the process environment.
    #[must_use]
    pub fn with_env(self) -> Self {
        self.with_env_from(|key| std::env::var(key).ok())
    }

    /// Apply `STUBGEN_*` overrides from `lookup`.
    ///
    /// An unrecognized `STUBGEN_MODE` is ignored with a warning.
    #[must_use]
    pub fn with_env_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(root) = lookup("STUBGEN_GENERATED_ROOT") {
            self.generated_root = PathBuf::from(root);
        }
        if let Some(root) = lookup("STUBGEN_MIRROR_ROOT") {
            self.mirror_root = PathBuf::from(root);
        }
        if let Some(package) = lookup("STUBGEN_ROOT_PACKAGE") {
            self.root_package = Some(package).filter(|p| !p.is_empty());
        }
        if let Some(mode) = lookup("STUBGEN_MODE") {
            match ModelPolicy::parse(&mode) {
                Some(policy) => self.mode = policy,
                None => tracing::warn!(value = %mode, "ignoring unrecognized STUBGEN_MODE"),
            }
        }
        self
    }
}

/// Load a config file.
///
/// Returns `Ok(None)` if the file does not exist, `Err` if it exists but
/// cannot be read or parsed.
pub fn load_config(config_path: &Path) -> anyhow::Result<Option<GeneratorConfig>> {
    if !config_path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(config_path)
        .with_context(|| format!("Failed to read config: {}", config_path.display()))?;

    let config: GeneratorConfig = toml::from_str(&contents)
        .with_context(|| format!("Failed to parse config: {}", config_path.display()))?;

    Ok(Some(config))
}

/// Resolve the config file path.
///
/// Priority:
/// 1. Explicitly provided path (via CLI), which must exist
/// 2. `stubgen.toml` in `base_dir`
/// 3. None (defaults only)
pub fn resolve_config_path(
    explicit_path: Option<&Path>,
    base_dir: &Path,
) -> anyhow::Result<Option<PathBuf>> {
    if let Some(path) = explicit_path {
        if !path.exists() {
            anyhow::bail!("Config file not found: {}", path.display());
        }
        return Ok(Some(path.to_path_buf()));
    }
    let candidate = base_dir.join(CONFIG_FILE_NAME);
    Ok(candidate.exists().then_some(candidate))
}

/// Defaults, then the resolved config file, then the environment.
pub fn load_effective_config(
    explicit_path: Option<&Path>,
    base_dir: &Path,
) -> anyhow::Result<GeneratorConfig> {
    let from_file = match resolve_config_path(explicit_path, base_dir)? {
        Some(path) => {
            tracing::debug!(path = %path.display(), "loading config");
            load_config(&path)?
        }
        None => None,
    };
    Ok(from_file.unwrap_or_default().with_env())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = GeneratorConfig::default();
        assert_eq!(config.extension, "rs");
        assert_eq!(config.mode, ModelPolicy::Lenient);
        assert_eq!(
            config.mirror_root,
            PathBuf::from("target/generated-stub-sources")
        );
    }

    #[test]
    fn test_load_config_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "mode = \"strict\"\nroot_package = \"com.acme\"\n").unwrap();

        let config = load_config(&path).unwrap().unwrap();
        assert_eq!(config.mode, ModelPolicy::Strict);
        assert_eq!(config.root_package.as_deref(), Some("com.acme"));
        assert_eq!(config.extension, "rs");
    }

    #[test]
    fn test_load_config_missing_and_invalid() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_config(&dir.path().join("absent.toml")).unwrap().is_none());

        let bad = dir.path().join("bad.toml");
        std::fs::write(&bad, "unknown_key = 1\n").unwrap();
        assert!(load_config(&bad).is_err());
    }

    #[test]
    fn test_resolve_config_path() {
        let dir = tempfile::tempdir().unwrap();
        assert!(resolve_config_path(None, dir.path()).unwrap().is_none());
        assert!(resolve_config_path(Some(&dir.path().join("nope.toml")), dir.path()).is_err());

        std::fs::write(dir.path().join(CONFIG_FILE_NAME), "").unwrap();
        assert_eq!(
            resolve_config_path(None, dir.path()).unwrap(),
            Some(dir.path().join(CONFIG_FILE_NAME))
        );
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("STUBGEN_GENERATED_ROOT", "/out/gen"),
            ("STUBGEN_MODE", "strict"),
            ("STUBGEN_ROOT_PACKAGE", ""),
        ]);
        let config = GeneratorConfig {
            root_package: Some("com.acme".into()),
            ..GeneratorConfig::default()
        }
        .with_env_from(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.generated_root, PathBuf::from("/out/gen"));
        assert_eq!(config.mode, ModelPolicy::Strict);
        assert_eq!(config.root_package, None);
        assert_eq!(
            config.mirror_root,
            GeneratorConfig::default().mirror_root
        );
    }

    #[test]
    fn test_unrecognized_mode_is_ignored() {
        let config = GeneratorConfig::default()
            .with_env_from(|key| (key == "STUBGEN_MODE").then(|| "paranoid".to_string()));
        assert_eq!(config.mode, ModelPolicy::Lenient);
    }
}
