use std::path::{Path, PathBuf};

use crate::config::GeneratorConfig;
use crate::model::{EndpointModel, ModelPolicy};
use crate::scan::{scan, Messager, Round};

use super::emitter::{EmittedArtifact, Emitter};
use super::templates::{TemplateKind, Templates};

/// Outcome of one processed round.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoundReport {
    /// The model that was rendered, `None` when the round was skipped
    pub model: Option<EndpointModel>,
    /// Stub base first, then stub
    pub artifacts: Vec<EmittedArtifact>,
}

impl RoundReport {
    /// Every file written, canonical before mirror.
    pub fn written_files(&self) -> Vec<PathBuf> {
        self.artifacts
            .iter()
            .flat_map(|a| [a.canonical.clone(), a.mirror.clone()])
            .collect()
    }
}

/// Drives scan → render → emit for one round at a time.
///
/// Holds only immutable state between rounds: the parsed templates, the
/// emitter's layout and the model policy.
pub struct StubProcessor {
    templates: Templates,
    emitter: Emitter,
    policy: ModelPolicy,
}

impl std::fmt::Debug for StubProcessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StubProcessor")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl StubProcessor {
    pub fn new(templates: Templates, emitter: Emitter, policy: ModelPolicy) -> Self {
        Self {
            templates,
            emitter,
            policy,
        }
    }

    /// Build a processor from configuration, loading template overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if both output roots name the same directory, or if
    /// an override template is unreadable or malformed.
    pub fn from_config(config: &GeneratorConfig) -> anyhow::Result<Self> {
        if same_directory(&config.generated_root, &config.mirror_root) {
            anyhow::bail!(
                "generated_root and mirror_root must differ, both are {}",
                config.generated_root.display()
            );
        }
        let templates = match &config.templates {
            Some(dir) => Templates::with_overrides(dir)?,
            None => Templates::builtin(),
        };
        let emitter = Emitter::with_roots(
            config.generated_root.clone(),
            config.mirror_root.clone(),
            config.extension.clone(),
        );
        Ok(Self::new(templates, emitter, config.mode))
    }

    pub fn policy(&self) -> ModelPolicy {
        self.policy
    }

    /// Process one round and report whether its markers were consumed.
    ///
    /// Always `true` on success so no other processor picks the markers up.
    ///
    /// # Errors
    ///
    /// See [`StubProcessor::process_round`].
    pub fn process(&self, round: &Round, messager: &mut dyn Messager) -> anyhow::Result<bool> {
        self.process_round(round, messager)?;
        Ok(true)
    }

    /// Process one round and return what was written.
    ///
    /// A round without markers is skipped: nothing is noted or written.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError`](crate::model::ModelError) in strict mode when the
    /// model is incomplete, or [`EmitError`](super::EmitError) when a file
    /// cannot be written. Files written before the failure are left in place.
    pub fn process_round(
        &self,
        round: &Round,
        messager: &mut dyn Messager,
    ) -> anyhow::Result<RoundReport> {
        if round.is_empty() {
            tracing::debug!("round carries no markers, skipping");
            return Ok(RoundReport::default());
        }

        let model = scan(&round.declarations, messager);
        messager.note(&format!("Writing files for model: {model}"));
        model.check(self.policy)?;

        let mut artifacts = Vec::with_capacity(2);
        for (kind, name) in [
            (TemplateKind::StubBase, model.stub_base_fully_qualified_name()),
            (TemplateKind::Stub, model.stub_fully_qualified_name()),
        ] {
            let rendered = self.templates.render(kind, &model)?;
            let artifact = self.emitter.emit(&name, &rendered)?;
            tracing::info!(
                template = %kind,
                artifact = %artifact.fully_qualified_name,
                canonical = %artifact.canonical.display(),
                mirror = %artifact.mirror.display(),
                "generated stub source"
            );
            artifacts.push(artifact);
        }

        Ok(RoundReport {
            model: Some(model),
            artifacts,
        })
    }
}

fn same_directory(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
