//! Tera engine construction — a fresh instance per render pass.
//!
//! Rebuilding the engine from disk on every pass is the cache-invalidation
//! strategy: edits to include fragments are always visible to the next
//! render, and nothing leaks between passes.

use std::path::{Path, PathBuf};

use tera::Tera;

use crate::error::{io_err, RenderError};
use crate::helpers::Helpers;

/// File extension recognised for reusable fragments in the include directory.
pub const FRAGMENT_EXTENSION: &str = "tera";

/// Name under which the top-level template is registered.
const ENTRY_TEMPLATE: &str = "__entry__";

// ---------------------------------------------------------------------------
// Fragment loading
// ---------------------------------------------------------------------------

fn normalize_fragment_name(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

fn collect_fragment_files(dir: &Path, out: &mut Vec<PathBuf>) -> Result<(), RenderError> {
    let entries = std::fs::read_dir(dir).map_err(|e| io_err(dir, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| io_err(dir, e))?;
        let path = entry.path();
        let meta = entry.metadata().map_err(|e| io_err(&path, e))?;
        if meta.is_dir() {
            collect_fragment_files(&path, out)?;
        } else if meta.is_file() {
            out.push(path);
        }
    }
    Ok(())
}

/// Load every `.tera` file under `dir`, keyed by slash-normalized relative
/// name. A missing directory contributes no fragments.
fn load_fragments(dir: &Path) -> Result<Vec<(String, String)>, RenderError> {
    if !dir.exists() {
        return Ok(vec![]);
    }
    let mut files = Vec::new();
    collect_fragment_files(dir, &mut files)?;
    files.sort();

    let mut fragments = Vec::new();
    for path in files {
        if path.extension().and_then(|s| s.to_str()) != Some(FRAGMENT_EXTENSION) {
            continue;
        }
        let rel = path.strip_prefix(dir).unwrap_or(path.as_path());
        let name = normalize_fragment_name(rel);
        let contents = std::fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
        fragments.push((name, contents));
    }
    Ok(fragments)
}

// ---------------------------------------------------------------------------
// TemplateEngine
// ---------------------------------------------------------------------------

/// Single-use Tera engine for one render pass.
///
/// Fragments under `include_dir` are addressable from the template by their
/// relative path, e.g. `{% include "nav/header.tera" %}`.
#[derive(Debug)]
pub struct TemplateEngine {
    tera: Tera,
}

impl TemplateEngine {
    /// Build an engine for `template_path`, loading fragments from
    /// `include_dir` and registering the given helper filters.
    pub fn new(
        template_path: &Path,
        include_dir: Option<&Path>,
        helpers: &Helpers,
    ) -> Result<Self, RenderError> {
        let mut templates: Vec<(String, String)> = Vec::new();
        if let Some(dir) = include_dir {
            templates.extend(load_fragments(dir)?);
        }

        let entry =
            std::fs::read_to_string(template_path).map_err(|e| io_err(template_path, e))?;
        templates.push((ENTRY_TEMPLATE.to_string(), entry));

        let mut tera = Tera::default();
        tera.add_raw_templates(templates)?;
        helpers.register(&mut tera);
        Ok(TemplateEngine { tera })
    }

    /// Render the top-level template.
    ///
    /// The context is empty: all reusable behaviour is exposed through the
    /// registered helper filters.
    pub fn render(&self) -> Result<String, RenderError> {
        Ok(self.tera.render(ENTRY_TEMPLATE, &tera::Context::new())?)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
