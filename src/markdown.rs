//! Markdown rendering with highlighted code blocks.
//!
//! Two integration points are provided. [`MarkdownRenderer::render`] calls
//! the highlighter while rendering; [`highlight_subtree`] highlights the code
//! blocks of already rendered HTML. Both produce identical output for the
//! same highlighter.

mod renderer;
mod subtree;

pub use renderer::MarkdownRenderer;
pub use subtree::highlight_subtree;
