//! Highlight theme stylesheets

use anyhow::{Context, Result, anyhow};
use std::{fs, path::Path};
use syntect::highlighting::ThemeSet;
use syntect::html::css_for_theme_with_class_style;

use crate::highlight::CLASS_STYLE;

/// Lists the bundled syntax highlighting themes.
pub fn theme_names() -> Vec<String> {
    ThemeSet::load_defaults().themes.into_keys().collect()
}

/// Generates the stylesheet for highlight classes from a bundled theme.
///
/// The selectors match the `hljs-` prefixed classes emitted by
/// [`crate::SyntectHighlighter`].
///
/// # Arguments
///
/// * `theme`: Theme name (InspiredGitHub, base16-ocean.dark, etc.)
///
/// # Errors
///
/// Returns error if the theme is unknown or CSS generation fails
pub fn theme_css(theme: &str) -> Result<String> {
    let themes = ThemeSet::load_defaults();
    let Some(selected) = themes.themes.get(theme) else {
        let available: Vec<&str> = themes.themes.keys().map(String::as_str).collect();
        return Err(anyhow!(
            "Unknown theme '{}', available: {}",
            theme,
            available.join(", ")
        ));
    };

    css_for_theme_with_class_style(selected, CLASS_STYLE)
        .with_context(|| format!("Failed to generate CSS for theme: {}", theme))
}

/// Writes the theme stylesheet to a file
pub fn write_theme_css(path: &Path, theme: &str) -> Result<()> {
    let css = theme_css(theme)?;
    fs::write(path, css)
        .with_context(|| format!("Failed to write CSS asset: {}", path.display()))?;
    Ok(())
}
