//! Markdown rendering with GitHub Flavored Markdown support.

use anyhow::{Context, Result};
use comrak::adapters::SyntaxHighlighterAdapter;
use comrak::{Arena, Options, Plugins, format_html_with_plugins, parse_document};
use std::collections::HashMap;
use std::io::{self, Write};
use std::path::Path;
use std::sync::Mutex;
use tracing::{debug, warn};

use crate::config::RenderConfig;
use crate::highlight::{Highlighter, PlainHighlighter};
use crate::util::escape_html;

/// Renders markdown to HTML with highlighted code blocks.
///
/// Every fenced or indented code block goes through the highlighter held by
/// the [`RenderConfig`] passed to each call; the renderer itself keeps no
/// render settings besides the markdown dialect. Raw HTML in the source is
/// escaped and shown as text, so the only `<pre><code>` elements in the
/// output come from code blocks.
#[derive(Debug, Clone, Copy)]
pub struct MarkdownRenderer {
    gfm: bool,
}

impl MarkdownRenderer {
    /// Creates renderer with GitHub Flavored Markdown extensions.
    ///
    /// Enables tables, strikethrough, autolinks and task lists.
    pub fn new() -> Self {
        Self { gfm: true }
    }

    /// Creates renderer for strict CommonMark without extensions.
    pub fn commonmark() -> Self {
        Self { gfm: false }
    }

    /// Builds comrak options for one render call.
    fn options(&self, breaks: bool) -> Options<'static> {
        let mut options = Options::default();

        // Extension options (GFM features)
        options.extension.strikethrough = self.gfm;
        options.extension.table = self.gfm;
        options.extension.autolink = self.gfm;
        options.extension.tasklist = self.gfm;

        options.render.hardbreaks = breaks;

        // Raw HTML is shown as literal text
        options.render.escape = true;

        options
    }

    /// Renders markdown content to HTML string.
    ///
    /// Code blocks are passed to `config.highlighter()` with the first word
    /// of the fence info string as language hint (None for indented blocks
    /// and bare fences). The returned fragment is inserted verbatim inside
    /// `<pre><code>`. All other text is escaped.
    ///
    /// # Arguments
    ///
    /// * `content`: Markdown content to render
    /// * `config`: Line break and highlighting settings
    ///
    /// # Returns
    ///
    /// Rendered HTML, empty for empty input
    ///
    /// # Errors
    ///
    /// Returns the highlighter's error. Malformed markdown never fails.
    ///
    /// # Examples
    ///
    /// ```
    /// use hlmark::{MarkdownRenderer, PlainHighlighter, RenderConfig};
    ///
    /// let config = RenderConfig::builder().highlighter(PlainHighlighter).build();
    /// let html = MarkdownRenderer::new().render("a\nb", &config)?;
    /// assert_eq!(html, "<p>a<br />\nb</p>\n");
    /// # Ok::<(), anyhow::Error>(())
    /// ```
    pub fn render(&self, content: &str, config: &RenderConfig) -> Result<String> {
        self.render_with(content, config.breaks(), config.highlighter())
    }

    /// Renders markdown with code blocks escaped but not highlighted.
    ///
    /// Output is the input expected by [`crate::highlight_subtree`]: running
    /// that pass with the configured highlighter yields exactly what
    /// [`MarkdownRenderer::render`] returns.
    ///
    /// # Errors
    ///
    /// Returns error if HTML formatting fails
    pub fn render_plain(&self, content: &str, config: &RenderConfig) -> Result<String> {
        self.render_with(content, config.breaks(), &PlainHighlighter)
    }

    /// Renders markdown, falling back to unhighlighted code on failure.
    ///
    /// # Errors
    ///
    /// Returns error only if the unhighlighted render fails as well
    pub fn render_or_fallback(&self, content: &str, config: &RenderConfig) -> Result<String> {
        match self.render(content, config) {
            Ok(html) => Ok(html),
            Err(err) => {
                warn!(error = %format!("{err:#}"), "highlighting failed, rendering plain code");
                self.render_plain(content, config)
            }
        }
    }

    /// Renders markdown file at given path.
    ///
    /// Convenience method that reads file and renders content.
    ///
    /// # Arguments
    ///
    /// * `path`: Path to markdown file
    /// * `config`: Line break and highlighting settings
    ///
    /// # Returns
    ///
    /// Rendered HTML string
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be read or rendering fails
    pub fn render_file(&self, path: impl AsRef<Path>, config: &RenderConfig) -> Result<String> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read markdown file: {}", path.display()))?;
        self.render(&content, config)
    }

    fn render_with(
        &self,
        content: &str,
        breaks: bool,
        highlighter: &dyn Highlighter,
    ) -> Result<String> {
        let options = self.options(breaks);
        let adapter = HighlightAdapter::new(highlighter);
        let mut plugins = Plugins::default();
        plugins.render.codefence_syntax_highlighter = Some(&adapter);

        let arena = Arena::new();
        let root = parse_document(&arena, content, &options);

        let mut html = Vec::with_capacity(content.len() * 2);
        let formatted = format_html_with_plugins(root, &options, &mut html, &plugins);

        if let Some(err) = adapter.take_error() {
            return Err(err);
        }
        formatted.context("Failed to format markdown as HTML")?;

        String::from_utf8(html).context("Rendered HTML is not valid UTF-8")
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Bridges a [`Highlighter`] into comrak's code block rendering.
///
/// comrak only sees `io::Error`, so the highlighter's error is parked here
/// and returned once formatting stops.
struct HighlightAdapter<'h> {
    highlighter: &'h dyn Highlighter,
    error: Mutex<Option<anyhow::Error>>,
}

impl<'h> HighlightAdapter<'h> {
    fn new(highlighter: &'h dyn Highlighter) -> Self {
        Self {
            highlighter,
            error: Mutex::new(None),
        }
    }

    fn take_error(&self) -> Option<anyhow::Error> {
        self.error.lock().ok().and_then(|mut slot| slot.take())
    }

    fn park_error(&self, err: anyhow::Error) -> io::Error {
        let message = format!("{err:#}");
        if let Ok(mut slot) = self.error.lock() {
            slot.get_or_insert(err);
        }
        io::Error::other(message)
    }
}

impl SyntaxHighlighterAdapter for HighlightAdapter<'_> {
    fn write_highlighted(
        &self,
        output: &mut dyn Write,
        lang: Option<&str>,
        code: &str,
    ) -> io::Result<()> {
        let language = lang.filter(|l| !l.is_empty());
        debug!(
            language = language.unwrap_or("auto"),
            bytes = code.len(),
            "highlighting code block"
        );

        let highlighted = self
            .highlighter
            .highlight(code, language)
            .with_context(|| {
                format!(
                    "Failed to highlight {} code block",
                    language.unwrap_or("unlabelled")
                )
            })
            .map_err(|err| self.park_error(err))?;

        output.write_all(highlighted.as_bytes())
    }

    fn write_pre_tag(
        &self,
        output: &mut dyn Write,
        attributes: HashMap<String, String>,
    ) -> io::Result<()> {
        write_opening_tag(output, "pre", attributes)
    }

    fn write_code_tag(
        &self,
        output: &mut dyn Write,
        attributes: HashMap<String, String>,
    ) -> io::Result<()> {
        write_opening_tag(output, "code", attributes)
    }
}

/// Writes an opening tag with escaped attributes in name order.
fn write_opening_tag(
    output: &mut dyn Write,
    tag: &str,
    attributes: HashMap<String, String>,
) -> io::Result<()> {
    let mut attributes: Vec<_> = attributes.into_iter().collect();
    attributes.sort();

    write!(output, "<{tag}")?;
    for (name, value) in attributes {
        write!(output, " {}=\"{}\"", name, escape_html(&value))?;
    }
    output.write_all(b">")
}
