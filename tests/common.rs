//! Shared test utilities for integration tests.
//!
//! Provides highlighters with predictable output and helpers for writing
//! markdown fixtures to temporary directories.

#![allow(dead_code)]

use anyhow::Result;
use hlmark::{RenderConfig, escape_html};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Highlighter that wraps code in a span naming the language hint.
pub fn tagging_highlighter(code: &str, language: Option<&str>) -> Result<String> {
    Ok(format!(
        "<span class=\"tag-{}\">{}</span>",
        language.unwrap_or("auto"),
        escape_html(code)
    ))
}

/// Render configuration using [`tagging_highlighter`].
pub fn tagging_config(breaks: bool) -> RenderConfig {
    RenderConfig::builder()
        .breaks(breaks)
        .highlighter(tagging_highlighter)
        .build()
}

/// Writes a markdown fixture into a fresh temporary directory.
///
/// # Returns
///
/// Temporary directory (keeps the file alive) and the fixture path
///
/// # Errors
///
/// Returns error if directory creation or writing fails
pub fn write_fixture(name: &str, content: &str) -> Result<(TempDir, PathBuf)> {
    let dir = TempDir::new()?;
    let path = dir.path().join(name);
    fs::write(&path, content)?;
    Ok((dir, path))
}
