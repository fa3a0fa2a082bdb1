//! Render settings and command line configuration.

use anyhow::{Result, bail};
use clap::{Parser, ValueEnum};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use crate::assets::theme_names;
use crate::highlight::{Highlighter, PlainHighlighter, SyntectHighlighter};
use crate::markdown::MarkdownRenderer;

/// Immutable settings passed to every render call.
///
/// Built once at startup and shared by reference afterwards. Cloning is
/// cheap: the highlighter sits behind an [`Arc`].
///
/// # Examples
///
/// ```
/// use hlmark::{PlainHighlighter, RenderConfig};
///
/// let config = RenderConfig::builder()
///     .breaks(false)
///     .highlighter(PlainHighlighter)
///     .build();
/// assert!(!config.breaks());
/// ```
#[derive(Clone)]
pub struct RenderConfig {
    breaks: bool,
    highlighter: Arc<dyn Highlighter>,
}

impl RenderConfig {
    /// Creates configuration with line breaks enabled and syntect highlighting.
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Starts a builder with the default settings.
    pub fn builder() -> RenderConfigBuilder {
        RenderConfigBuilder {
            breaks: true,
            highlighter: None,
        }
    }

    /// Whether single newlines inside a paragraph render as `<br />`.
    pub fn breaks(&self) -> bool {
        self.breaks
    }

    /// Highlight function applied to every code block.
    pub fn highlighter(&self) -> &dyn Highlighter {
        self.highlighter.as_ref()
    }

}

impl Default for RenderConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for RenderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderConfig")
            .field("breaks", &self.breaks)
            .finish_non_exhaustive()
    }
}

/// Builder for [`RenderConfig`].
pub struct RenderConfigBuilder {
    breaks: bool,
    highlighter: Option<Arc<dyn Highlighter>>,
}

impl RenderConfigBuilder {
    /// Sets whether single newlines become line breaks.
    pub fn breaks(mut self, breaks: bool) -> Self {
        self.breaks = breaks;
        self
    }

    /// Sets the highlight function.
    pub fn highlighter(mut self, highlighter: impl Highlighter + 'static) -> Self {
        self.highlighter = Some(Arc::new(highlighter));
        self
    }

    /// Sets an already shared highlight function.
    pub fn shared_highlighter(mut self, highlighter: Arc<dyn Highlighter>) -> Self {
        self.highlighter = Some(highlighter);
        self
    }

    /// Finishes the configuration.
    ///
    /// Loads syntect's syntax definitions when no highlighter was given.
    pub fn build(self) -> RenderConfig {
        RenderConfig {
            breaks: self.breaks,
            highlighter: self
                .highlighter
                .unwrap_or_else(|| Arc::new(SyntectHighlighter::new())),
        }
    }
}

/// Where code blocks get highlighted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum HighlightMode {
    /// Highlight while rendering markdown
    Inline,
    /// Render plain code blocks, then highlight the produced HTML
    PostRender,
    /// Escape code blocks without highlighting
    Plain,
}

/// Command line configuration for hlmark.
#[derive(Debug, Clone, Parser)]
#[command(name = "hlmark", version, about, long_about = None)]
pub struct Config {
    /// Markdown file to render, or "-" for stdin
    pub input: Option<PathBuf>,

    /// Output file (stdout when omitted)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Keep single newlines inside paragraphs as soft breaks
    #[arg(long)]
    pub no_breaks: bool,

    /// Parse strict CommonMark without the GFM extensions
    #[arg(long)]
    pub commonmark: bool,

    /// Highlighting integration
    #[arg(long, value_enum, default_value_t = HighlightMode::Inline)]
    pub mode: HighlightMode,

    /// Syntax highlighting theme for generated CSS (InspiredGitHub, base16-ocean.dark, etc.)
    #[arg(long, default_value = "InspiredGitHub")]
    pub theme: String,

    /// Wrap output in a complete HTML document with embedded theme CSS
    #[arg(long)]
    pub standalone: bool,

    /// Write the theme stylesheet to this path
    #[arg(long)]
    pub css: Option<PathBuf>,

    /// Open the output file in the default browser
    #[arg(long)]
    pub open: bool,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parses configuration from command line arguments.
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    /// Validates configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the input file does not exist, if the theme is not
    /// bundled, or if `--open` is given without an output file.
    pub fn validate(&self) -> Result<()> {
        if let Some(input) = self.input_path()
            && !input.exists()
        {
            bail!("Input file does not exist: {}", input.display());
        }

        if !theme_names().contains(&self.theme) {
            bail!("Unknown theme: {}", self.theme);
        }

        if self.open && self.output.is_none() {
            bail!("--open requires --output");
        }

        Ok(())
    }

    /// Returns input file path, or None when reading stdin.
    pub fn input_path(&self) -> Option<&PathBuf> {
        self.input
            .as_ref()
            .filter(|path| path.as_os_str() != "-")
    }

    /// Returns the renderer for the selected markdown dialect.
    pub fn renderer(&self) -> MarkdownRenderer {
        if self.commonmark {
            MarkdownRenderer::commonmark()
        } else {
            MarkdownRenderer::new()
        }
    }

    /// Builds the render configuration selected by the flags.
    ///
    /// Post-render mode still carries the syntect highlighter; the renderer
    /// decides whether it runs inline or as a separate pass.
    pub fn render_config(&self) -> RenderConfig {
        let builder = RenderConfig::builder().breaks(!self.no_breaks);
        match self.mode {
            HighlightMode::Plain => builder.highlighter(PlainHighlighter).build(),
            HighlightMode::Inline | HighlightMode::PostRender => builder.build(),
        }
    }

    /// Returns document title from the input file name.
    pub fn title(&self) -> String {
        self.input_path()
            .and_then(|path| path.file_stem())
            .and_then(|stem| stem.to_str())
            .map(String::from)
            .unwrap_or_else(|| "Document".to_string())
    }
}
