//! Post-render highlighting of code blocks in rendered HTML.

use anyhow::{Context, Result};
use tracing::debug;

use crate::highlight::Highlighter;
use crate::util::decode_html;

const CODE_CLOSE: &str = "</code>";

/// Highlights every `<pre><code>` block of an HTML fragment.
///
/// Finds `<pre><code>` elements, decodes their escaped text and replaces it
/// with the highlighter's fragment. The language hint comes from a
/// `language-*` (or `lang-*`) class on the `code` element. Text outside code
/// blocks is copied unchanged, and so are blocks that already contain markup
/// (escaped code never contains `<`), which makes the pass idempotent.
///
/// Applied to [`crate::MarkdownRenderer::render_plain`] output it produces
/// the same HTML as rendering with the highlighter inline.
///
/// # Arguments
///
/// * `html`: Rendered HTML fragment
/// * `highlighter`: Highlight function to apply
///
/// # Returns
///
/// HTML with highlighted code blocks
///
/// # Errors
///
/// Returns the highlighter's error for the first failing block
///
/// # Examples
///
/// ```
/// use hlmark::{escape_html, highlight_subtree};
///
/// let shout = |code: &str, _lang: Option<&str>| -> anyhow::Result<String> {
///     Ok(escape_html(&code.to_uppercase()))
/// };
/// let html = highlight_subtree("<pre><code class=\"language-sh\">ls &amp;</code></pre>", &shout)?;
/// assert_eq!(html, "<pre><code class=\"language-sh\">LS &amp;</code></pre>");
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn highlight_subtree(html: &str, highlighter: &dyn Highlighter) -> Result<String> {
    let mut result = String::with_capacity(html.len() * 2);
    let mut last_end = 0;
    let mut search_pos = 0;
    let mut highlighted_blocks = 0usize;

    while let Some(found) = html[search_pos..].find("<pre") {
        let pre_start = search_pos + found;

        let Some(block) = CodeBlock::locate(html, pre_start) else {
            search_pos = pre_start + "<pre".len();
            continue;
        };

        let content = &html[block.content_start..block.content_end];
        search_pos = block.content_end + CODE_CLOSE.len();

        if content.contains('<') {
            continue;
        }

        let code = decode_html(content);
        let language = block.language.as_deref();
        let highlighted = highlighter.highlight(&code, language).with_context(|| {
            format!(
                "Failed to highlight {} code block",
                language.unwrap_or("unlabelled")
            )
        })?;

        result.push_str(&html[last_end..block.content_start]);
        result.push_str(&highlighted);
        last_end = block.content_end;
        highlighted_blocks += 1;
    }

    result.push_str(&html[last_end..]);
    debug!(blocks = highlighted_blocks, "highlighted rendered code blocks");

    Ok(result)
}

/// Location of a `<pre><code>` element's text.
#[derive(Debug, PartialEq, Eq)]
struct CodeBlock {
    content_start: usize,
    content_end: usize,
    language: Option<String>,
}

impl CodeBlock {
    /// Parses the element starting at `pre_start`.
    ///
    /// Expects `<pre ...>` immediately followed by `<code ...>` and a closing
    /// `</code>`. Returns None for anything else.
    fn locate(html: &str, pre_start: usize) -> Option<Self> {
        let (_, pre_end) = opening_tag(html, pre_start, "pre")?;
        let (code_attrs, code_end) = opening_tag(html, pre_end, "code")?;
        let content_end = code_end + html[code_end..].find(CODE_CLOSE)?;

        Some(Self {
            content_start: code_end,
            content_end,
            language: language_from_attributes(code_attrs),
        })
    }
}

/// Matches an opening tag named `tag` at `pos`.
///
/// Returns the raw attribute text and the index just past `>`.
fn opening_tag<'h>(html: &'h str, pos: usize, tag: &str) -> Option<(&'h str, usize)> {
    let rest = html.get(pos..)?.strip_prefix('<')?;
    let rest = rest.get(..tag.len()).filter(|name| name.eq_ignore_ascii_case(tag))?;
    let after_name = pos + 1 + rest.len();

    match html[after_name..].chars().next()? {
        '>' => Some(("", after_name + 1)),
        c if c.is_ascii_whitespace() => {
            let close = after_name + html[after_name..].find('>')?;
            Some((&html[after_name..close], close + 1))
        }
        _ => None,
    }
}

/// Extracts the language hint from a `class` attribute.
///
/// Only a standalone `class` attribute counts, not `data-class` and the like.
fn language_from_attributes(attrs: &str) -> Option<String> {
    let class_pos = attrs
        .match_indices("class=")
        .map(|(pos, _)| pos)
        .find(|&pos| {
            attrs[..pos]
                .chars()
                .next_back()
                .is_none_or(|c| c.is_ascii_whitespace())
        })?;
    let value = &attrs[class_pos + "class=".len()..];
    let quote = value.chars().next().filter(|c| *c == '"' || *c == '\'')?;
    let value = &value[1..];
    let value = &value[..value.find(quote)?];

    decode_html(value).split_ascii_whitespace().find_map(|class| {
        class
            .strip_prefix("language-")
            .or_else(|| class.strip_prefix("lang-"))
            .filter(|lang| !lang.is_empty())
            .map(String::from)
    })
}
