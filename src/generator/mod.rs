//! # Generator Module
//!
//! Renders and writes the stub sources for one round.
//!
//! ## Overview
//!
//! Every round that carries at least one marker produces two artifacts:
//!
//! - **`StubBase`** - package-scoped base shared by every stub in the package
//! - **`{Controller}Stub`** - the concrete stub for the round's endpoint
//!
//! Each artifact is written twice: once to the canonical generated-sources
//! tree and once to a stable mirror tree that a packaging step can pick up.
//!
//! ## Architecture
//!
//! ```text
//! Round → scan → EndpointModel → Templates::render → Emitter::emit
//!                                   (stub-base, stub)   (canonical, mirror)
//! ```
//!
//! 1. **Processor** - [`StubProcessor`] runs one round end to end
//! 2. **Templates** - askama templates in `templates/`, optionally overridden
//!    by minijinja templates loaded at start-up
//! 3. **Emitter** - a [`Filer`] picks the canonical path, a [`PathMapping`]
//!    picks the mirror
//!
//! ## Output Layout
//!
//! ```text
//! target/generated-sources/stubs/      target/generated-stub-sources/
//! └── com/acme/                        └── com/acme/
//!     ├── StubBase.rs                      ├── StubBase.rs
//!     └── OrderControllerStub.rs           └── OrderControllerStub.rs
//! ```
//!
//! Files are created, never overwritten. Generating the same round twice
//! without cleaning the output trees fails with [`EmitError::Collision`].
//!
//! ## Usage
//!
//! ```rust,no_run
//! use stubgen::generator::{Emitter, StubProcessor, Templates};
//! use stubgen::model::ModelPolicy;
//! use stubgen::scan::{Declaration, Marker, MarkerKind, Round, TracingMessager};
//!
//! # fn main() -> anyhow::Result<()> {
//! let processor = StubProcessor::new(
//!     Templates::builtin(),
//!     Emitter::with_roots("target/gen", "target/gen-stubs", "rs"),
//!     ModelPolicy::Lenient,
//! );
//! let round = Round::new(vec![
//!     Declaration::new("com.acme.OrderController")
//!         .with_marker(Marker::new(MarkerKind::RestController)),
//! ]);
//! processor.process(&round, &mut TracingMessager)?;
//! # Ok(())
//! # }
//! ```

mod emitter;
mod processor;
mod templates;

pub use emitter::{
    EmitError, EmittedArtifact, Emitter, Filer, PathMapping, PrefixMapping, SourceRootFiler,
};
pub use processor::{RoundReport, StubProcessor};
pub use templates::{StubBaseTemplateData, StubTemplateData, TemplateKind, Templates};
