//! Syntax highlighting for code blocks.
//!
//! The [`Highlighter`] trait is the pluggable highlight function used by the
//! markdown renderer and the post-render pass. [`SyntectHighlighter`] is the
//! default implementation; [`PlainHighlighter`] only escapes.

use anyhow::{Context, Result};
use syntect::html::{ClassStyle, ClassedHTMLGenerator};
use syntect::parsing::{ParseState, ScopeStackOp, SyntaxReference, SyntaxSet};
use syntect::util::LinesWithEndings;
use tracing::debug;

use crate::util::escape_html;

/// CSS class prefix for highlight spans, shared with the generated stylesheet.
pub const CLASS_PREFIX: &str = "hljs-";

/// Class style used for every highlighted fragment.
pub const CLASS_STYLE: ClassStyle = ClassStyle::SpacedPrefixed {
    prefix: CLASS_PREFIX,
};

/// Languages tried by automatic detection, in tie breaking order.
const DETECTION_CANDIDATES: &[&str] = &[
    "js", "py", "rs", "go", "java", "c", "cpp", "cs", "rb", "php", "sh", "sql", "css", "html",
    "xml", "json", "yaml", "lua", "pl", "hs",
];

/// Number of leading lines scored during automatic detection.
const DETECTION_LINE_LIMIT: usize = 100;

/// Scope prefixes that count towards a detection score.
const MEANINGFUL_SCOPES: &[&str] = &[
    "keyword",
    "storage",
    "string",
    "comment",
    "constant",
    "entity",
    "support",
    "variable.language",
];

/// Converts code text into an HTML fragment with syntax coloring markup.
///
/// `language` is the hint taken from the code fence info string, `None` when
/// absent. Implementations must return HTML that is safe to insert inside
/// `<pre><code>`, meaning every character of `code` is escaped.
///
/// Any `Fn(&str, Option<&str>) -> Result<String>` closure is a highlighter:
///
/// ```
/// use hlmark::{Highlighter, escape_html};
///
/// let upper = |code: &str, _lang: Option<&str>| -> anyhow::Result<String> {
///     Ok(escape_html(&code.to_uppercase()))
/// };
/// assert_eq!(upper.highlight("a<b", None)?, "A&lt;B");
/// # Ok::<(), anyhow::Error>(())
/// ```
pub trait Highlighter: Send + Sync {
    /// Highlights `code`, using `language` as a grammar hint when present.
    ///
    /// # Errors
    ///
    /// Implementation specific. Errors propagate out of rendering unchanged.
    fn highlight(&self, code: &str, language: Option<&str>) -> Result<String>;
}

impl<F> Highlighter for F
where
    F: Fn(&str, Option<&str>) -> Result<String> + Send + Sync,
{
    fn highlight(&self, code: &str, language: Option<&str>) -> Result<String> {
        self(code, language)
    }
}

/// Highlighter that escapes code without adding markup.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainHighlighter;

impl Highlighter for PlainHighlighter {
    fn highlight(&self, code: &str, _language: Option<&str>) -> Result<String> {
        Ok(escape_html(code))
    }
}

/// Grammar based highlighter backed by syntect.
///
/// Produces `<span class="hljs-...">` markup so highlight.js style sheets
/// and the stylesheet from [`crate::theme_css`] both apply. Unknown or
/// missing language hints fall back to automatic detection.
pub struct SyntectHighlighter {
    syntax_set: SyntaxSet,
}

impl SyntectHighlighter {
    /// Creates highlighter with syntect's bundled syntax definitions.
    pub fn new() -> Self {
        Self::with_syntax_set(SyntaxSet::load_defaults_newlines())
    }

    /// Creates highlighter from a custom syntax set.
    ///
    /// The set must be built for lines that include their newline, like
    /// [`SyntaxSet::load_defaults_newlines`].
    pub fn with_syntax_set(syntax_set: SyntaxSet) -> Self {
        Self { syntax_set }
    }

    /// Resolves a language hint to a syntax definition.
    ///
    /// Matches by token, then by name, then by file extension, ignoring case.
    ///
    /// # Arguments
    ///
    /// * `language`: Language identifier (rust, js, Python, etc)
    ///
    /// # Returns
    ///
    /// Syntax definition, or None if the hint is not recognized
    pub fn find_syntax(&self, language: &str) -> Option<&SyntaxReference> {
        let lowercase = language.trim().to_ascii_lowercase();
        if lowercase.is_empty() {
            return None;
        }

        self.syntax_set
            .find_syntax_by_token(&lowercase)
            .or_else(|| {
                self.syntax_set
                    .syntaxes()
                    .iter()
                    .find(|s| s.name.eq_ignore_ascii_case(&lowercase))
            })
            .or_else(|| self.syntax_set.find_syntax_by_extension(&lowercase))
    }

    /// Detects the language of a code snippet.
    ///
    /// Tries syntect's first line detection (shebangs, `<?php`, `<?xml`),
    /// then scores every detection candidate by the number of meaningful
    /// scopes its grammar assigns to the leading lines. Scopes marked
    /// `invalid` count against the candidate. The best positive score wins;
    /// ties go to the earlier candidate.
    ///
    /// # Returns
    ///
    /// Detected syntax, or None when no candidate recognizes anything
    pub fn detect(&self, code: &str) -> Option<&SyntaxReference> {
        if let Some(syntax) = code
            .lines()
            .next()
            .and_then(|first| self.syntax_set.find_syntax_by_first_line(first))
        {
            debug!(language = %syntax.name, "detected language from first line");
            return Some(syntax);
        }

        let scored = DETECTION_CANDIDATES
            .iter()
            .filter_map(|token| self.syntax_set.find_syntax_by_token(token))
            .map(|syntax| (syntax, self.relevance(syntax, code)));

        match best_candidate(scored) {
            Some((syntax, score)) => {
                debug!(language = %syntax.name, score, "detected language by relevance");
                Some(syntax)
            }
            None => {
                debug!("no language detected, using plain text");
                None
            }
        }
    }

    /// Scores how well a grammar recognizes the code.
    fn relevance(&self, syntax: &SyntaxReference, code: &str) -> i64 {
        let mut state = ParseState::new(syntax);
        let mut score = 0i64;

        for line in LinesWithEndings::from(code).take(DETECTION_LINE_LIMIT) {
            let ops = match state.parse_line(line, &self.syntax_set) {
                Ok(ops) => ops,
                Err(err) => {
                    debug!(language = %syntax.name, error = %err, "candidate grammar failed");
                    return 0;
                }
            };

            for (_, op) in ops {
                let ScopeStackOp::Push(scope) = op else {
                    continue;
                };
                let name = scope.build_string();
                if name.starts_with("invalid") {
                    score -= 2;
                } else if MEANINGFUL_SCOPES.iter().any(|prefix| name.starts_with(prefix)) {
                    score += 1;
                }
            }
        }

        score
    }

    /// Highlights code with the given syntax using CSS classes.
    ///
    /// Grammars expect every line to end with a newline, so a missing final
    /// newline is added for parsing and removed from the output.
    fn highlight_with(&self, code: &str, syntax: &SyntaxReference) -> Result<String> {
        let padded = !code.ends_with('\n');
        let mut code_with_newline = code.to_string();
        if padded {
            code_with_newline.push('\n');
        }

        let mut generator =
            ClassedHTMLGenerator::new_with_class_style(syntax, &self.syntax_set, CLASS_STYLE);

        for line in LinesWithEndings::from(code_with_newline.as_str()) {
            generator
                .parse_html_for_line_which_includes_newline(line)
                .with_context(|| format!("Failed to highlight line as {}", syntax.name))?;
        }

        let mut html = generator.finalize();
        // Escaped text and span tags hold no newline, so the last one is ours
        if padded && let Some(pos) = html.rfind('\n') {
            html.remove(pos);
        }

        Ok(html)
    }
}

/// Picks the highest positive score, keeping the earliest on ties.
fn best_candidate<T>(scored: impl IntoIterator<Item = (T, i64)>) -> Option<(T, i64)> {
    scored
        .into_iter()
        .filter(|(_, score)| *score > 0)
        .fold(None, |best, (candidate, score)| match best {
            Some((_, top)) if top >= score => best,
            _ => Some((candidate, score)),
        })
}

impl Default for SyntectHighlighter {
    fn default() -> Self {
        Self::new()
    }
}

impl Highlighter for SyntectHighlighter {
    /// Highlights code, detecting the language when the hint is unknown.
    ///
    /// Empty code yields an empty fragment. Code no grammar recognizes is
    /// returned escaped without markup.
    ///
    /// # Errors
    ///
    /// Returns error if syntect fails to parse a line with the chosen grammar.
    fn highlight(&self, code: &str, language: Option<&str>) -> Result<String> {
        if code.is_empty() {
            return Ok(String::new());
        }

        let hinted = language.and_then(|lang| {
            let syntax = self.find_syntax(lang);
            if syntax.is_none() {
                debug!(language = lang, "unrecognized language hint, detecting");
            }
            syntax
        });

        match hinted.or_else(|| self.detect(code)) {
            Some(syntax) => self.highlight_with(code, syntax),
            None => Ok(escape_html(code)),
        }
    }
}
