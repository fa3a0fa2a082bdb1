//! Standalone document layout for rendered markdown

use maud::{DOCTYPE, Markup, PreEscaped, html};

/// Base typography for standalone documents.
const BASE_CSS: &str = "body{max-width:48rem;margin:2rem auto;padding:0 1rem;\
font-family:-apple-system,BlinkMacSystemFont,\"Segoe UI\",Helvetica,Arial,sans-serif;\
line-height:1.6}\
pre{padding:1rem;overflow:auto;border-radius:6px}\
code{font-family:ui-monospace,SFMono-Regular,Menlo,Consolas,monospace;font-size:0.9em}";

/// Wraps rendered markdown in a complete HTML document
///
/// Embeds the base typography and the highlight theme stylesheet inline so
/// the output file has no external dependencies.
///
/// # Arguments
///
/// * `title`: Document title text
/// * `body_html`: Rendered markdown HTML, inserted without escaping
/// * `theme_css`: Stylesheet for the highlight classes
///
/// # Returns
///
/// Complete HTML document
pub fn standalone(title: &str, body_html: &str, theme_css: &str) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
                style { (PreEscaped(BASE_CSS)) }
                style { (PreEscaped(theme_css)) }
            }
            body {
                article class="markdown-body" {
                    (PreEscaped(body_html))
                }
            }
        }
    }
}
