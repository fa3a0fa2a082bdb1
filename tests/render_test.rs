//! Integration tests for hlmark.
//!
//! Tests markdown rendering, inline highlighting and the post-render pass
//! through the public API.

mod common;

use anyhow::Result;
use common::{tagging_config, tagging_highlighter, write_fixture};
use hlmark::{
    MarkdownRenderer, PlainHighlighter, RenderConfig, SyntectHighlighter, highlight_subtree,
};
use std::sync::Arc;

const DOCUMENT: &str = r#"# Guide

Install it
then run it.

```rust
fn main() {
    let answer = 40 + 2;
    println!("{}", answer);
}
```

Some `inline` code & a [link](https://example.com).

```
#!/usr/bin/env python
print("auto")
```

    $ echo indented

- item with <b>raw</b> html
"#;

/// Tests that text without markdown syntax becomes one escaped paragraph.
#[test]
fn test_plain_text_renders_escaped_paragraph() -> Result<()> {
    // Arrange
    let renderer = MarkdownRenderer::new();
    let config = tagging_config(true);
    let input = "Prices: 3 < 4 > 2 & \"quoted\"";

    // Act
    let html = renderer.render(input, &config)?;

    // Assert
    assert_eq!(
        html,
        "<p>Prices: 3 &lt; 4 &gt; 2 &amp; &quot;quoted&quot;</p>\n"
    );
    Ok(())
}

/// Tests that empty input produces empty output.
#[test]
fn test_empty_input() -> Result<()> {
    // Arrange
    let renderer = MarkdownRenderer::new();

    // Act
    let html = renderer.render("", &tagging_config(true))?;

    // Assert
    assert!(html.is_empty(), "Empty input should render nothing: {:?}", html);
    Ok(())
}

/// Tests that a fenced JavaScript block is highlighted and fully escaped.
#[test]
fn test_fenced_js_block_highlighted() -> Result<()> {
    // Arrange
    let renderer = MarkdownRenderer::new();
    let config = RenderConfig::new();
    let input = "```js\nconst x=1;\nconst s = \"</script>\";\n```";

    // Act
    let html = renderer.render(input, &config)?;

    // Assert
    assert!(
        html.starts_with("<pre><code class=\"language-js\">"),
        "Should wrap in pre/code: {}",
        html
    );
    assert!(html.contains("<span class=\"hljs-"), "Should highlight: {}", html);
    assert!(html.contains("const"), "Should keep code text");
    assert!(
        !html.contains("</script>"),
        "Code must not break out of the page: {}",
        html
    );
    assert!(html.contains("&lt;/script&gt;"), "Should escape code text");
    Ok(())
}

/// Tests line break handling with breaks enabled and disabled.
#[test]
fn test_single_newline_breaks() -> Result<()> {
    // Arrange
    let renderer = MarkdownRenderer::new();

    // Act
    let with_breaks = renderer.render("a\nb", &tagging_config(true))?;
    let without_breaks = renderer.render("a\nb", &tagging_config(false))?;

    // Assert
    assert!(with_breaks.contains("a<br />"), "Got: {}", with_breaks);
    assert!(with_breaks.contains("b</p>"), "Got: {}", with_breaks);
    assert!(!without_breaks.contains("<br"), "Got: {}", without_breaks);
    Ok(())
}

/// Tests that the post-render pass reproduces inline highlighting.
#[test]
fn test_post_render_matches_inline_with_tagging() -> Result<()> {
    // Arrange
    let renderer = MarkdownRenderer::new();
    let config = tagging_config(true);

    // Act
    let inline = renderer.render(DOCUMENT, &config)?;
    let plain = renderer.render_plain(DOCUMENT, &config)?;
    let post = highlight_subtree(&plain, &tagging_highlighter)?;

    // Assert
    assert_ne!(plain, inline, "Plain output should lack highlighting");
    assert_eq!(post, inline);
    assert!(inline.contains("class=\"tag-rust\""), "Got: {}", inline);
    assert_eq!(inline.matches("class=\"tag-auto\"").count(), 2, "Got: {}", inline);
    Ok(())
}

/// Tests the equivalence with the syntect highlighter.
#[test]
fn test_post_render_matches_inline_with_syntect() -> Result<()> {
    // Arrange
    let renderer = MarkdownRenderer::new();
    let config = RenderConfig::new();

    // Act
    let inline = renderer.render(DOCUMENT, &config)?;
    let plain = renderer.render_plain(DOCUMENT, &config)?;
    let post = highlight_subtree(&plain, config.highlighter())?;

    // Assert
    assert_eq!(post, inline);
    assert!(inline.contains("hljs-"), "Got: {}", inline);
    Ok(())
}

/// Tests that raw HTML and inline code stay escaped in a full document.
#[test]
fn test_non_code_text_escaped() -> Result<()> {
    // Arrange
    let renderer = MarkdownRenderer::new();

    // Act
    let html = renderer.render(DOCUMENT, &tagging_config(true))?;

    // Assert
    assert!(html.contains("&lt;b&gt;raw&lt;/b&gt;"), "Got: {}", html);
    assert!(html.contains("<code>inline</code>"), "Got: {}", html);
    assert!(html.contains("code &amp; a"), "Got: {}", html);
    assert!(
        html.contains("<a href=\"https://example.com\">link</a>"),
        "Got: {}",
        html
    );
    Ok(())
}

/// Tests that a bare fence is highlighted with the detected language.
#[test]
fn test_bare_fence_detects_language() -> Result<()> {
    // Arrange
    let renderer = MarkdownRenderer::new();
    let config = RenderConfig::new();
    let input = "```\nfn main() {\n    let x: u32 = 42;\n    println!(\"{}\", x);\n}\n```\n";

    // Act
    let html = renderer.render(input, &config)?;

    // Assert
    assert!(
        html.starts_with("<pre><code><span class=\"hljs-"),
        "Should highlight without a hint: {}",
        html
    );
    assert!(html.contains("hljs-rust"), "Should detect Rust: {}", html);
    Ok(())
}

/// Tests that unknown language hints never fail the render.
#[test]
fn test_unknown_language_hint_detects() -> Result<()> {
    // Arrange
    let renderer = MarkdownRenderer::new();
    let config = RenderConfig::new();
    let input = "```definitely-not-a-language\n#!/bin/bash\necho hi\n```\n";

    // Act
    let html = renderer.render(input, &config)?;

    // Assert
    assert!(
        html.contains("<code class=\"language-definitely-not-a-language\">"),
        "Should keep the hint class: {}",
        html
    );
    assert!(html.contains("echo"), "Should keep code text");
    Ok(())
}

/// Tests rendering a markdown file from disk.
#[test]
fn test_render_file() -> Result<()> {
    // Arrange
    let (_dir, path) = write_fixture("README.md", "# Title\n\n```toml\nkey = 1\n```\n")?;
    let renderer = MarkdownRenderer::new();

    // Act
    let html = renderer.render_file(&path, &tagging_config(true))?;

    // Assert
    assert!(html.contains("<h1>Title</h1>"), "Got: {}", html);
    assert!(html.contains("class=\"tag-toml\""), "Got: {}", html);
    Ok(())
}

/// Tests sharing one configuration across threads.
#[test]
fn test_config_shared_across_threads() -> Result<()> {
    // Arrange
    let config = Arc::new(
        RenderConfig::builder()
            .shared_highlighter(Arc::new(PlainHighlighter))
            .build(),
    );

    // Act
    let outputs: Vec<String> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let config = Arc::clone(&config);
                scope.spawn(move || {
                    MarkdownRenderer::new().render(&format!("line {i}\nnext"), &config)
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().expect("Render thread should not panic"))
            .collect::<Result<Vec<String>>>()
    })?;

    // Assert
    for (i, html) in outputs.iter().enumerate() {
        assert_eq!(html, &format!("<p>line {i}<br />\nnext</p>\n"));
    }
    Ok(())
}

/// Tests that highlighter errors surface and the fallback recovers.
#[test]
fn test_highlighter_error_and_fallback() -> Result<()> {
    // Arrange
    let renderer = MarkdownRenderer::new();
    let config = RenderConfig::builder()
        .highlighter(|_: &str, _: Option<&str>| -> Result<String> {
            anyhow::bail!("highlighter unavailable")
        })
        .build();
    let input = "text\n\n```c\nint a = 1 < 2;\n```\n";

    // Act
    let failed = renderer.render(input, &config);
    let recovered = renderer.render_or_fallback(input, &config)?;

    // Assert
    assert!(failed.is_err(), "Render should propagate the error");
    assert!(
        recovered.contains("<pre><code class=\"language-c\">int a = 1 &lt; 2;\n</code></pre>"),
        "Got: {}",
        recovered
    );
    Ok(())
}

/// Tests the syntect highlighter on its own with an explicit hint.
#[test]
fn test_syntect_highlighter_direct() -> Result<()> {
    // Arrange
    let highlighter = SyntectHighlighter::new();

    // Act
    let html = hlmark::Highlighter::highlight(&highlighter, "SELECT 1;\n", Some("sql"))?;

    // Assert
    assert!(html.contains("hljs-"), "Got: {}", html);
    assert!(html.contains("SELECT"), "Got: {}", html);
    Ok(())
}
