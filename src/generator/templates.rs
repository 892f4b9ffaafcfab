use anyhow::Context;
use askama::Template;
use minijinja::Environment;
use serde::Serialize;
use std::fmt;
use std::path::Path;

use crate::model::EndpointModel;

/// The two artifacts rendered every round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateKind {
    /// Package-scoped base shared by all stubs
    StubBase,
    /// Concrete stub for the round's endpoint
    Stub,
}

impl TemplateKind {
    /// File name looked up in a template override directory.
    pub fn override_file_name(self) -> &'static str {
        match self {
            TemplateKind::StubBase => "stub_base.rs.j2",
            TemplateKind::Stub => "stub.rs.j2",
        }
    }
}

impl fmt::Display for TemplateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemplateKind::StubBase => write!(f, "stub-base"),
            TemplateKind::Stub => write!(f, "stub"),
        }
    }
}

/// Template data for the shared stub base
#[derive(Debug, Clone, Template, Serialize)]
#[template(path = "stub_base.rs.txt", escape = "none")]
pub struct StubBaseTemplateData {
    /// Package the base belongs to
    pub package_name: String,
}

/// Template data for a concrete stub
#[derive(Debug, Clone, Template, Serialize)]
#[template(path = "stub.rs.txt", escape = "none")]
pub struct StubTemplateData {
    pub package_name: String,
    pub stub_base_fully_qualified_name: String,
    pub stub_fully_qualified_name: String,
    pub stub_class_name: String,
    /// Capitalized handler name, used as the generated method name
    pub method_name: String,
    pub response_type: String,
    pub root_resource: String,
    pub sub_resource: String,
    /// `root_resource` as an escaped Rust string literal, quotes included
    pub root_resource_literal: String,
    /// `sub_resource` as an escaped Rust string literal, quotes included
    pub sub_resource_literal: String,
}

impl From<&EndpointModel> for StubBaseTemplateData {
    fn from(model: &EndpointModel) -> Self {
        Self {
            package_name: model.package_name().to_string(),
        }
    }
}

impl From<&EndpointModel> for StubTemplateData {
    fn from(model: &EndpointModel) -> Self {
        Self {
            package_name: model.package_name().to_string(),
            stub_base_fully_qualified_name: model.stub_base_fully_qualified_name(),
            stub_fully_qualified_name: model.stub_fully_qualified_name(),
            stub_class_name: model.stub_class_name(),
            method_name: model.method_name().to_string(),
            response_type: model.response_type().to_string(),
            root_resource: model.root_resource().to_string(),
            sub_resource: model.sub_resource().to_string(),
            root_resource_literal: rust_string_literal(model.root_resource()),
            sub_resource_literal: rust_string_literal(model.sub_resource()),
        }
    }
}

/// `{:?}` of a `str` is a valid Rust string literal.
fn rust_string_literal(value: &str) -> String {
    format!("{value:?}")
}

/// Renders the stub and stub-base artifacts.
///
/// The built-in askama templates are checked when the crate compiles. Override
/// templates are parsed once in [`Templates::with_overrides`]; after that,
/// rendering only fails if an override references something it cannot
/// evaluate.
pub struct Templates {
    overrides: Environment<'static>,
}

impl Templates {
    /// Only the built-in templates.
    pub fn builtin() -> Self {
        Self {
            overrides: Environment::new(),
        }
    }

    /// Load `stub_base.rs.j2` and `stub.rs.j2` from `dir` where present.
    ///
    /// # Errors
    ///
    /// Returns an error if `dir` is not a directory, a template cannot be read,
    /// or a template does not parse.
    pub fn with_overrides(dir: &Path) -> anyhow::Result<Self> {
        if !dir.is_dir() {
            anyhow::bail!("Template override directory not found: {}", dir.display());
        }
        let mut env = Environment::new();
        env.set_keep_trailing_newline(true);
        for kind in [TemplateKind::StubBase, TemplateKind::Stub] {
            let path = dir.join(kind.override_file_name());
            if !path.is_file() {
                tracing::debug!(template = %kind, path = %path.display(), "no override, using built-in");
                continue;
            }
            let source = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read template: {}", path.display()))?;
            env.add_template_owned(kind.override_file_name(), source)
                .with_context(|| format!("Malformed template: {}", path.display()))?;
            tracing::info!(template = %kind, path = %path.display(), "loaded template override");
        }
        Ok(Self { overrides: env })
    }

    pub fn is_overridden(&self, kind: TemplateKind) -> bool {
        self.overrides
            .get_template(kind.override_file_name())
            .is_ok()
    }

    /// Render `kind` for `model`. Identical models render identical text.
    ///
    /// # Errors
    ///
    /// Returns an error if template evaluation fails.
    pub fn render(&self, kind: TemplateKind, model: &EndpointModel) -> anyhow::Result<String> {
        match kind {
            TemplateKind::StubBase => self.render_data(kind, &StubBaseTemplateData::from(model)),
            TemplateKind::Stub => self.render_data(kind, &StubTemplateData::from(model)),
        }
    }

    fn render_data<T>(&self, kind: TemplateKind, data: &T) -> anyhow::Result<String>
    where
        T: Template + Serialize,
    {
        if let Ok(template) = self.overrides.get_template(kind.override_file_name()) {
            return template
                .render(data)
                .with_context(|| format!("Failed to render {kind} override template"));
        }
        data.render()
            .with_context(|| format!("Failed to render {kind} template"))
    }
}

impl Default for Templates {
    fn default() -> Self {
        Self::builtin()
    }
}

impl fmt::Debug for Templates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Templates")
            .field("stub_base_overridden", &self.is_overridden(TemplateKind::StubBase))
            .field("stub_overridden", &self.is_overridden(TemplateKind::Stub))
            .finish()
    }
}
