//! One render pass: build engine, render, write output.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::engine::TemplateEngine;
use crate::error::{io_err, RenderError};
use crate::helpers::Helpers;

/// Summary of a completed render pass.
#[derive(Debug)]
pub struct CompileOutcome {
    pub out_file: PathBuf,
    pub bytes: usize,
    pub duration: Duration,
}

/// Render `template_path` and write the result to `out_file`.
///
/// The engine is rebuilt from disk on every call, so fragment edits under
/// `include_dir` take effect on the next pass without any explicit cache
/// invalidation. The output file is overwritten in place; parent directories
/// are created as needed. Nothing is written when rendering fails.
pub fn compile_to_file(
    template_path: &Path,
    out_file: &Path,
    include_dir: Option<&Path>,
    helpers: &Helpers,
) -> Result<CompileOutcome, RenderError> {
    let started = Instant::now();
    tracing::debug!(template = %template_path.display(), "rendering");

    let engine = TemplateEngine::new(template_path, include_dir, helpers)?;
    let rendered = engine.render()?;

    if let Some(parent) = out_file.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
        }
    }
    std::fs::write(out_file, &rendered).map_err(|e| io_err(out_file, e))?;

    let duration = started.elapsed();
    tracing::debug!(
        template = %template_path.display(),
        out_file = %out_file.display(),
        bytes = rendered.len(),
        duration_ms = duration.as_millis() as u64,
        "rendered",
    );

    Ok(CompileOutcome {
        out_file: out_file.to_path_buf(),
        bytes: rendered.len(),
        duration,
    })
}
