use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::scan::{Declaration, Round};

/// Declarations supplied by a host that cannot be parsed as Rust source.
///
/// ```yaml
/// declarations:
///   - name: com.acme.OrderController
///     markers:
///       - kind: rest_controller
///   - name: com.acme.OrderController.getOrder
///     declared_type: OrderView()
///     markers:
///       - kind: get_mapping
///         path: ["/orders/{id}"]
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub declarations: Vec<Declaration>,
}

impl Manifest {
    pub fn into_round(self) -> Round {
        Round::new(self.declarations)
    }
}

/// Load a YAML (`.yaml`/`.yml`) or JSON manifest.
pub fn load_manifest(path: &Path) -> anyhow::Result<Round> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read manifest: {}", path.display()))?;
    let is_yaml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext == "yaml" || ext == "yml");
    let manifest: Manifest = if is_yaml {
        serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse manifest: {}", path.display()))?
    } else {
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse manifest: {}", path.display()))?
    };
    tracing::debug!(
        path = %path.display(),
        declarations = manifest.declarations.len(),
        "loaded manifest"
    );
    Ok(manifest.into_round())
}
