use http::Method;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use crate::model::split_qualified;

/// The closed vocabulary of markers a round can be triggered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerKind {
    Controller,
    RestController,
    GetMapping,
    PostMapping,
    ResponseBody,
    RequestBody,
    RequestParam,
}

impl MarkerKind {
    /// Every marker the processor advertises as a trigger.
    pub const ALL: [MarkerKind; 7] = [
        MarkerKind::Controller,
        MarkerKind::RestController,
        MarkerKind::GetMapping,
        MarkerKind::PostMapping,
        MarkerKind::ResponseBody,
        MarkerKind::RequestBody,
        MarkerKind::RequestParam,
    ];

    /// Attribute name used in source, e.g. `get_mapping` for `#[get_mapping("/x")]`.
    pub fn attribute_name(self) -> &'static str {
        match self {
            MarkerKind::Controller => "controller",
            MarkerKind::RestController => "rest_controller",
            MarkerKind::GetMapping => "get_mapping",
            MarkerKind::PostMapping => "post_mapping",
            MarkerKind::ResponseBody => "response_body",
            MarkerKind::RequestBody => "request_body",
            MarkerKind::RequestParam => "request_param",
        }
    }

    pub fn from_attribute(name: &str) -> Option<Self> {
        MarkerKind::ALL
            .into_iter()
            .find(|kind| kind.attribute_name() == name)
    }

    pub fn is_controller(self) -> bool {
        matches!(self, MarkerKind::Controller | MarkerKind::RestController)
    }

    /// HTTP verb for route markers, `None` for everything else.
    pub fn route_verb(self) -> Option<Method> {
        match self {
            MarkerKind::GetMapping => Some(Method::GET),
            MarkerKind::PostMapping => Some(Method::POST),
            _ => None,
        }
    }
}

impl fmt::Display for MarkerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.attribute_name())
    }
}

/// One marker attached to a declaration, with its path attributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Marker {
    pub kind: MarkerKind,
    /// Named `path = ...` entries
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub path: Vec<String>,
    /// Positional or `value = ...` entries
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub value: Vec<String>,
}

impl Marker {
    pub fn new(kind: MarkerKind) -> Self {
        Self {
            kind,
            path: Vec::new(),
            value: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_path<I, S>(mut self, entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.path = entries.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_value<I, S>(mut self, entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.value = entries.into_iter().map(Into::into).collect();
        self
    }

    /// First declared path: the named `path` attribute wins over `value`.
    pub fn first_path(&self) -> Option<&str> {
        self.path
            .first()
            .or_else(|| self.value.first())
            .map(String::as_str)
    }
}

/// A declaration presented to the processor for one round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Declaration {
    /// Dot-delimited qualified name; a method's name ends with its owner's
    /// qualified name followed by the method's simple name.
    pub name: String,
    #[serde(default)]
    pub markers: Vec<Marker>,
    /// Declared type as the host reports it, e.g. `OrderView()` for a route handler.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub declared_type: Option<String>,
}

/// Classification of a declaration, computed before any model update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeclarationKind<'a> {
    Controller(&'a Marker),
    Route { verb: Method, marker: &'a Marker },
    Unrecognized,
}

impl Declaration {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            markers: Vec::new(),
            declared_type: None,
        }
    }

    #[must_use]
    pub fn with_marker(mut self, marker: Marker) -> Self {
        self.markers.push(marker);
        self
    }

    #[must_use]
    pub fn with_declared_type(mut self, declared_type: impl Into<String>) -> Self {
        self.declared_type = Some(declared_type.into());
        self
    }

    pub fn simple_name(&self) -> &str {
        split_qualified(&self.name).1
    }

    /// Controller markers take precedence over route markers, route markers
    /// over everything else.
    pub fn classify(&self) -> DeclarationKind<'_> {
        if let Some(marker) = self.markers.iter().find(|m| m.kind.is_controller()) {
            return DeclarationKind::Controller(marker);
        }
        self.markers
            .iter()
            .find_map(|marker| {
                marker
                    .kind
                    .route_verb()
                    .map(|verb| DeclarationKind::Route { verb, marker })
            })
            .unwrap_or(DeclarationKind::Unrecognized)
    }
}

/// One batch of declarations, as one invocation of the processor sees it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Round {
    /// Marker kinds present on at least one declaration.
    pub annotations: BTreeSet<MarkerKind>,
    /// Declarations carrying at least one marker, in presentation order.
    pub declarations: Vec<Declaration>,
}

impl Round {
    /// Build a round, dropping declarations that carry no marker.
    pub fn new(declarations: impl IntoIterator<Item = Declaration>) -> Self {
        let declarations: Vec<Declaration> = declarations
            .into_iter()
            .filter(|d| !d.markers.is_empty())
            .collect();
        let annotations = declarations
            .iter()
            .flat_map(|d| d.markers.iter().map(|m| m.kind))
            .collect();
        Self {
            annotations,
            declarations,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty()
    }

    /// Append another batch, e.g. declarations from a second source root.
    pub fn extend(&mut self, other: Round) {
        self.annotations.extend(other.annotations);
        self.declarations.extend(other.declarations);
    }
}
