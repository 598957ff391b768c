//! Single render pass with absorb-and-report error handling.

use std::error::Error as _;
use std::path::Path;

use stencil_renderer::{compile_to_file, lint, Helpers, RenderError};

/// Render `template` to `out_file`, reporting the outcome on the console.
///
/// Failures are swallowed: in watch mode the process must survive broken
/// intermediate states of the template, since edit/fail/fix/re-render is the
/// expected workflow. On a template error the raw source is re-read and
/// linted so the user gets a positioned diagnostic alongside the engine
/// error.
pub fn render_once(
    template: &Path,
    out_file: &Path,
    include_dir: Option<&Path>,
    helpers: &Helpers,
) {
    match compile_to_file(template, out_file, include_dir, helpers) {
        Ok(outcome) => {
            println!(
                "✓ {} → {} ({} bytes, {} ms)",
                template.display(),
                outcome.out_file.display(),
                outcome.bytes,
                outcome.duration.as_millis()
            );
        }
        Err(err) => report_failure(template, &err),
    }
}

fn report_failure(template: &Path, err: &RenderError) {
    tracing::error!(template = %template.display(), error = %err, "render failed");

    // Tera buries the useful detail in the error's source chain.
    let RenderError::Tera(tera_err) = err else {
        return;
    };
    let mut source = tera_err.source();
    while let Some(cause) = source {
        tracing::error!("  caused by: {cause}");
        source = cause.source();
    }

    match std::fs::read_to_string(template) {
        Ok(raw) => {
            if let Some(diag) = lint(&raw) {
                eprintln!("{diag}");
            }
        }
        Err(read_err) => {
            tracing::warn!(error = %read_err, "could not re-read template for linting");
        }
    }
}
