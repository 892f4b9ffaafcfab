//! # Endpoint Model
//!
//! The single record describing what one generation round emits: the package
//! the stubs live in, the names of the two generated artifacts and the routing
//! facts of the endpoint being stubbed.
//!
//! The model is an immutable value. The scanner folds declarations into it
//! through [`EndpointModel::with_controller`] and [`EndpointModel::with_route`],
//! each returning an updated copy. Later merges overwrite earlier ones field by
//! field, so two controllers in one round leave the last one's names behind.
//!
//! Fully-qualified names are derived on demand and can never disagree on the
//! package:
//!
//! ```
//! use stubgen::model::EndpointModel;
//!
//! let model = EndpointModel::default().with_controller("com.example.FooController", None);
//! assert_eq!(model.package_name(), "com.example");
//! assert_eq!(model.stub_class_name(), "FooControllerStub");
//! assert_eq!(model.stub_fully_qualified_name(), "com.example.FooControllerStub");
//! assert_eq!(model.stub_base_fully_qualified_name(), "com.example.StubBase");
//! ```

mod naming;

pub use naming::{
    capitalize, is_name_segment, normalize_response_type, qualify, split_qualified,
    STUB_BASE_NAME, STUB_SUFFIX,
};

use serde::{Deserialize, Serialize};
use std::fmt;

/// How a round treats a model that is missing fields when it reaches rendering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ModelPolicy {
    /// Render with empty substitutions for anything absent.
    #[default]
    Lenient,
    /// Fail the round before anything is written.
    Strict,
}

impl ModelPolicy {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lenient" => Some(ModelPolicy::Lenient),
            "strict" => Some(ModelPolicy::Strict),
            _ => None,
        }
    }
}

impl fmt::Display for ModelPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelPolicy::Lenient => write!(f, "lenient"),
            ModelPolicy::Strict => write!(f, "strict"),
        }
    }
}

/// Raised in strict mode when a round's model cannot be rendered completely.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    /// One or more required fields were never supplied by a marker.
    Incomplete {
        /// Names of the absent fields
        missing: Vec<&'static str>,
    },
}

impl fmt::Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelError::Incomplete { missing } => write!(
                f,
                "endpoint model is incomplete: missing {}. \
                Is the route declared without a controller marker in the same round?",
                missing.join(", ")
            ),
        }
    }
}

impl std::error::Error for ModelError {}

/// Naming and routing facts for the stubs generated in one round.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EndpointModel {
    package_name: Option<String>,
    controller_name: Option<String>,
    method_name: Option<String>,
    response_type: Option<String>,
    root_resource: Option<String>,
    sub_resource: Option<String>,
}

impl EndpointModel {
    /// Merge the naming facts of a controller declaration.
    ///
    /// `root_resource` only overwrites when the marker declared a path.
    #[must_use]
    pub fn with_controller(mut self, qualified_name: &str, root_resource: Option<String>) -> Self {
        let (package, simple) = split_qualified(qualified_name);
        self.package_name = Some(package.to_string());
        self.controller_name = Some(simple.to_string());
        if root_resource.is_some() {
            self.root_resource = root_resource;
        }
        self
    }

    /// Merge the routing facts of a route handler declaration.
    ///
    /// `sub_resource` only overwrites when the marker declared a path.
    #[must_use]
    pub fn with_route(
        mut self,
        simple_name: &str,
        sub_resource: Option<String>,
        declared_type: &str,
    ) -> Self {
        self.method_name = Some(capitalize(simple_name));
        self.response_type = Some(normalize_response_type(declared_type));
        if sub_resource.is_some() {
            self.sub_resource = sub_resource;
        }
        self
    }

    pub fn package_name(&self) -> &str {
        self.package_name.as_deref().unwrap_or_default()
    }

    pub fn stub_class_name(&self) -> String {
        format!("{}{STUB_SUFFIX}", self.controller_name.as_deref().unwrap_or_default())
    }

    pub fn stub_fully_qualified_name(&self) -> String {
        qualify(self.package_name(), &self.stub_class_name())
    }

    pub fn stub_base_fully_qualified_name(&self) -> String {
        qualify(self.package_name(), STUB_BASE_NAME)
    }

    pub fn method_name(&self) -> &str {
        self.method_name.as_deref().unwrap_or_default()
    }

    pub fn response_type(&self) -> &str {
        self.response_type.as_deref().unwrap_or_default()
    }

    pub fn root_resource(&self) -> &str {
        self.root_resource.as_deref().unwrap_or_default()
    }

    pub fn sub_resource(&self) -> &str {
        self.sub_resource.as_deref().unwrap_or_default()
    }

    /// Fields a complete stub needs that no marker has supplied yet.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.package_name.as_deref().is_none_or(str::is_empty) {
            missing.push("package_name");
        }
        if self.controller_name.is_none() {
            missing.push("stub_class_name");
        }
        if self.method_name.is_none() {
            missing.push("method_name");
        }
        missing
    }

    /// Apply `policy` before rendering.
    pub fn check(&self, policy: ModelPolicy) -> Result<(), ModelError> {
        if policy == ModelPolicy::Lenient {
            return Ok(());
        }
        let missing = self.missing_fields();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(ModelError::Incomplete { missing })
        }
    }
}

impl fmt::Display for EndpointModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "EndpointModel(package_name={}, stub_base_fully_qualified_name={}, \
            stub_fully_qualified_name={}, stub_class_name={}, method_name={}, \
            response_type={}, root_resource={}, sub_resource={})",
            self.package_name(),
            self.stub_base_fully_qualified_name(),
            self.stub_fully_qualified_name(),
            self.stub_class_name(),
            self.method_name(),
            self.response_type(),
            self.root_resource(),
            self.sub_resource(),
        )
    }
}
