//! # stubgen
//!
//! **stubgen** turns controller and route markers on endpoint declarations
//! into ready-to-use [`wiremock`](https://docs.rs/wiremock) stub sources.
//!
//! ## Overview
//!
//! A round of marked declarations is folded into one [`EndpointModel`].
//! The model fills two templates, a package-scoped `StubBase` and a
//! `{Controller}Stub`, and each rendered file is written to the canonical
//! generated-sources tree and to a mirror tree.
//!
//! ## Architecture
//!
//! - **[`source`]** - host adapters: Rust sources parsed with `syn`, or
//!   YAML/JSON manifests
//! - **[`scan`]** - declarations, markers and the fold into a model
//! - **[`model`]** - the endpoint model and its naming rules
//! - **[`generator`]** - templates, emitter and the round processor
//! - **[`config`]** - `stubgen.toml` and `STUBGEN_*` settings
//! - **[`cli`]** - the `stubgen` command line
//! - **[`logging`]** - tracing subscriber setup
//!
//! ```text
//! source ─▶ Round ─▶ scan ─▶ EndpointModel ─▶ Templates ─▶ Emitter
//!                                                         ├─ generated root
//!                                                         └─ mirror root
//! ```
//!
//! ## Example
//!
//! A controller marked like this:
//!
//! ```rust,ignore
//! #[rest_controller]
//! pub struct OrderController;
//!
//! impl OrderController {
//!     #[get_mapping("/orders/{id}")]
//!     pub fn getOrder(&self) -> OrderView { todo!() }
//! }
//! ```
//!
//! scanned with root package `com.acme` yields `com/acme/StubBase.rs` and
//! `com/acme/OrderControllerStub.rs` with a `GetOrder` stub method for
//! `GET /orders/{id}`.

pub mod cli;
pub mod config;
pub mod generator;
pub mod logging;
pub mod model;
pub mod scan;
pub mod source;

pub use config::GeneratorConfig;
pub use generator::StubProcessor;
pub use model::{EndpointModel, ModelPolicy};
pub use scan::{scan, Round};
