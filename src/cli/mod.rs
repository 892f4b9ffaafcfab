//! # CLI Module
//!
//! Command-line interface for the `stubgen` binary.
//!
//! ## Commands
//!
//! ### `generate`
//!
//! Scan sources, build the endpoint model and write the stubs:
//!
//! ```bash
//! stubgen generate --src src --root-package com.acme
//! stubgen generate --manifest endpoints.yaml --mode strict
//! ```
//!
//! Options:
//! - `--src <DIR>` - Rust source tree to scan (repeatable)
//! - `--manifest <FILE>` - YAML/JSON declaration manifest (repeatable)
//! - `--config <FILE>` - Explicit `stubgen.toml`
//! - `--generated-root`, `--mirror-root` - Output roots
//! - `--mode <lenient|strict>` - Handling of incomplete models
//! - `--templates <DIR>` - Template overrides
//! - `--clean` - Remove both output roots before writing
//!
//! ### `inspect`
//!
//! Scan only. Prints the diagnostics and the resulting model as JSON.
//!
//! ### `clean`
//!
//! Remove both output roots.
//!
//! ## Usage from Code
//!
//! ```rust,ignore
//! use stubgen::cli::{Cli, run_cli};
//! use clap::Parser;
//!
//! let cli = Cli::parse();
//! run_cli(cli)?;
//! ```

mod commands;

pub use commands::{run_cli, Cli, Commands, OutputArgs, SourceArgs};
