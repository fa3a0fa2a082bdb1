//! Markdown to HTML rendering with syntax highlighted code blocks.

mod assets;
mod config;
mod highlight;
mod markdown;
pub mod page;
mod util;

pub use assets::{theme_css, theme_names, write_theme_css};
pub use config::{Config, HighlightMode, RenderConfig, RenderConfigBuilder};
pub use highlight::{CLASS_PREFIX, Highlighter, PlainHighlighter, SyntectHighlighter};
pub use markdown::{MarkdownRenderer, highlight_subtree};
pub use util::{decode_html, escape_html};
