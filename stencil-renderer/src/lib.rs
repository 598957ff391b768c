//! # stencil-renderer
//!
//! Tera-based template compilation: build a fresh engine per pass, render
//! with the standard helper filters, write the output file. On failure the
//! raw template text can be run through [`lint`] for a positioned
//! diagnostic instead of only the engine error.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::path::Path;
//! use stencil_renderer::{compile_to_file, Helpers};
//!
//! fn build(template: &Path, out: &Path) {
//!     let helpers = Helpers::standard();
//!     match compile_to_file(template, out, None, &helpers) {
//!         Ok(outcome) => println!("{} bytes", outcome.bytes),
//!         Err(err) => eprintln!("{err}"),
//!     }
//! }
//! ```

pub mod compile;
pub mod engine;
pub mod error;
pub mod helpers;
pub mod lint;

pub use compile::{compile_to_file, CompileOutcome};
pub use engine::{TemplateEngine, FRAGMENT_EXTENSION};
pub use error::RenderError;
pub use helpers::Helpers;
pub use lint::{lint, LintDiagnostic};
