//! Static template lint — positioned diagnostics for broken templates.
//!
//! When a render fails, the raw template text is scanned for the usual
//! suspects (unclosed delimiters, mismatched block tags) so the user sees a
//! line/column pointer instead of only the engine error. This is not a
//! parser: expression contents are never validated, only the shape of
//! `{{ }}` / `{% %}` / `{# #}` pairs and block-tag nesting.

use std::fmt;

/// Block-opening tag keywords and their terminators.
const BLOCK_PAIRS: &[(&str, &str)] = &[
    ("if", "endif"),
    ("for", "endfor"),
    ("block", "endblock"),
    ("macro", "endmacro"),
    ("filter", "endfilter"),
];

/// A single lint finding with its location in the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LintDiagnostic {
    /// 1-based line of the problem.
    pub line: usize,
    /// 1-based column of the problem.
    pub column: usize,
    /// Human-readable description.
    pub message: String,
    source_line: String,
}

impl fmt::Display for LintDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "line {}, column {}: {}",
            self.line, self.column, self.message
        )?;
        writeln!(f, "  {}", self.source_line)?;
        write!(f, "  {}^", " ".repeat(self.column.saturating_sub(1)))
    }
}

/// Scan raw template text and return the first problem found, or `None` for
/// structurally sound input.
pub fn lint(source: &str) -> Option<LintDiagnostic> {
    Linter::new(source).run().err()
}

// ---------------------------------------------------------------------------
// Scanner
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
struct Pos {
    line: usize,
    column: usize,
}

struct Linter<'a> {
    chars: Vec<char>,
    idx: usize,
    line: usize,
    column: usize,
    lines: Vec<&'a str>,
}

impl<'a> Linter<'a> {
    fn new(source: &'a str) -> Self {
        Linter {
            chars: source.chars().collect(),
            idx: 0,
            line: 1,
            column: 1,
            lines: source.lines().collect(),
        }
    }

    fn peek(&self, offset: usize) -> Option<char> {
        self.chars.get(self.idx + offset).copied()
    }

    fn bump(&mut self) {
        if let Some(ch) = self.chars.get(self.idx) {
            if *ch == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
            self.idx += 1;
        }
    }

    fn pos(&self) -> Pos {
        Pos {
            line: self.line,
            column: self.column,
        }
    }

    fn diagnostic(&self, at: Pos, message: impl Into<String>) -> LintDiagnostic {
        LintDiagnostic {
            line: at.line,
            column: at.column,
            message: message.into(),
            source_line: self
                .lines
                .get(at.line - 1)
                .map(|l| l.to_string())
                .unwrap_or_default(),
        }
    }

    fn run(mut self) -> Result<(), LintDiagnostic> {
        let mut stack: Vec<(String, Pos)> = Vec::new();

        while let Some(ch) = self.peek(0) {
            if ch != '{' {
                self.bump();
                continue;
            }
            match self.peek(1) {
                Some('{') => {
                    let opened = self.pos();
                    self.bump();
                    self.bump();
                    let body = self.consume_until("}}", opened, "expression `{{`")?;
                    if trim_whitespace_control(&body).is_empty() {
                        return Err(self.diagnostic(opened, "empty expression `{{ }}`"));
                    }
                }
                Some('%') => {
                    let opened = self.pos();
                    self.bump();
                    self.bump();
                    let body = self.consume_until("%}", opened, "tag `{%`")?;
                    if tag_keyword(&body) == Some("raw") {
                        self.skip_raw(opened)?;
                    } else {
                        self.check_tag(&body, opened, &mut stack)?;
                    }
                }
                Some('#') => {
                    let opened = self.pos();
                    self.bump();
                    self.bump();
                    self.consume_comment(opened)?;
                }
                _ => self.bump(),
            }
        }

        if let Some((name, at)) = stack.pop() {
            let end = terminator_for(&name);
            return Err(self.diagnostic(
                at,
                format!("unclosed `{{% {name} %}}` — expected `{{% {end} %}}` before end of input"),
            ));
        }
        Ok(())
    }

    /// Consume up to (and including) the two-character closer, skipping over
    /// quoted strings. A new delimiter opening first is itself a finding.
    fn consume_until(
        &mut self,
        close: &str,
        opened: Pos,
        what: &str,
    ) -> Result<String, LintDiagnostic> {
        let close_chars: Vec<char> = close.chars().collect();
        let mut body = String::new();
        while let Some(ch) = self.peek(0) {
            if ch == '"' || ch == '\'' || ch == '`' {
                body.push_str(&self.consume_string(ch)?);
                continue;
            }
            if ch == close_chars[0] && self.peek(1) == Some(close_chars[1]) {
                self.bump();
                self.bump();
                return Ok(body);
            }
            if ch == '{' && matches!(self.peek(1), Some('{') | Some('%') | Some('#')) {
                let here = self.pos();
                return Err(self.diagnostic(
                    here,
                    format!(
                        "new delimiter opened before the {what} from line {}, column {} was closed",
                        opened.line, opened.column
                    ),
                ));
            }
            body.push(ch);
            self.bump();
        }
        Err(self.diagnostic(opened, format!("unclosed {what} — expected `{close}`")))
    }

    fn consume_string(&mut self, quote: char) -> Result<String, LintDiagnostic> {
        let start = self.pos();
        let mut text = String::new();
        text.push(quote);
        self.bump();
        while let Some(ch) = self.peek(0) {
            self.bump();
            text.push(ch);
            if ch == quote {
                return Ok(text);
            }
        }
        Err(self.diagnostic(start, "unterminated string"))
    }

    /// Comments may contain anything, including delimiter-like text, so scan
    /// plainly for `#}`.
    fn consume_comment(&mut self, opened: Pos) -> Result<(), LintDiagnostic> {
        while let Some(ch) = self.peek(0) {
            if ch == '#' && self.peek(1) == Some('}') {
                self.bump();
                self.bump();
                return Ok(());
            }
            self.bump();
        }
        Err(self.diagnostic(opened, "unclosed comment `{#` — expected `#}`"))
    }

    /// Everything between `{% raw %}` and `{% endraw %}` is literal text.
    fn skip_raw(&mut self, opened: Pos) -> Result<(), LintDiagnostic> {
        while let Some(ch) = self.peek(0) {
            if ch == '{' && self.peek(1) == Some('%') {
                self.bump();
                self.bump();
                let body = self.raw_tag_body(opened)?;
                if tag_keyword(&body) == Some("endraw") {
                    return Ok(());
                }
                continue;
            }
            self.bump();
        }
        Err(self.diagnostic(opened, "unclosed `{% raw %}` — expected `{% endraw %}`"))
    }

    fn raw_tag_body(&mut self, opened: Pos) -> Result<String, LintDiagnostic> {
        let mut body = String::new();
        while let Some(ch) = self.peek(0) {
            if ch == '%' && self.peek(1) == Some('}') {
                self.bump();
                self.bump();
                return Ok(body);
            }
            body.push(ch);
            self.bump();
        }
        Err(self.diagnostic(opened, "unclosed `{% raw %}` — expected `{% endraw %}`"))
    }

    fn check_tag(
        &self,
        body: &str,
        at: Pos,
        stack: &mut Vec<(String, Pos)>,
    ) -> Result<(), LintDiagnostic> {
        let Some(keyword) = tag_keyword(body) else {
            return Err(self.diagnostic(at, "empty tag `{% %}`"));
        };

        if BLOCK_PAIRS.iter().any(|(open, _)| *open == keyword) {
            stack.push((keyword.to_string(), at));
            return Ok(());
        }

        if let Some((open, _)) = BLOCK_PAIRS.iter().find(|(_, end)| *end == keyword) {
            return match stack.pop() {
                Some((top, _)) if top == *open => Ok(()),
                Some((top, top_at)) => Err(self.diagnostic(
                    at,
                    format!(
                        "mismatched `{{% {keyword} %}}` — innermost open block is `{{% {top} %}}` from line {}, column {}",
                        top_at.line, top_at.column
                    ),
                )),
                None => Err(self.diagnostic(
                    at,
                    format!("`{{% {keyword} %}}` without a matching `{{% {open} %}}`"),
                )),
            };
        }

        if keyword == "elif" || keyword == "else" {
            let valid = stack
                .last()
                .map(|(name, _)| name == "if" || (keyword == "else" && name == "for"))
                .unwrap_or(false);
            if !valid {
                return Err(self.diagnostic(
                    at,
                    format!("`{{% {keyword} %}}` outside of an `{{% if %}}` block"),
                ));
            }
        }

        Ok(())
    }
}

/// First keyword of a tag body, tolerating whitespace-control dashes.
fn tag_keyword(body: &str) -> Option<&str> {
    let body = body.trim_start();
    let body = body.strip_prefix('-').unwrap_or(body);
    body.split_whitespace().next()
}

/// Strip whitespace-control dashes and surrounding whitespace.
fn trim_whitespace_control(body: &str) -> &str {
    let body = body.trim();
    let body = body.strip_prefix('-').unwrap_or(body);
    body.strip_suffix('-').unwrap_or(body).trim()
}

fn terminator_for(open: &str) -> &'static str {
    BLOCK_PAIRS
        .iter()
        .find(|(name, _)| *name == open)
        .map(|(_, end)| *end)
        .unwrap_or("end")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
