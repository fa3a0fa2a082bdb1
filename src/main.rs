use anyhow::{Context, Result, anyhow};
use hlmark::{
    Config, HighlightMode, MarkdownRenderer, RenderConfig, highlight_subtree, page, theme_css,
    write_theme_css,
};
use std::fs;
use std::io::{self, Read, Write};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

/// Installs the stderr logger.
///
/// `RUST_LOG` overrides the default level, which is `warn`, or `debug`
/// with `--verbose`.
fn init_logging(verbose: bool) -> Result<()> {
    let default_level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::WARN
    };

    let filter = EnvFilter::builder()
        .with_default_directive(default_level.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|err| anyhow!("Failed to install logger: {}", err))
}

/// Reads markdown from the input file, or stdin when none is given.
fn read_input(config: &Config) -> Result<String> {
    match config.input_path() {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("Failed to read input file: {}", path.display())),
        None => {
            let mut source = String::new();
            io::stdin()
                .read_to_string(&mut source)
                .context("Failed to read markdown from stdin")?;
            Ok(source)
        }
    }
}

/// Renders markdown using the highlighting integration selected by `mode`.
///
/// Inline rendering falls back to unhighlighted code blocks when the
/// highlighter fails. The post-render pass runs over plain output and fails
/// with the highlighter's error.
fn render_document(
    renderer: MarkdownRenderer,
    source: &str,
    mode: HighlightMode,
    render_config: &RenderConfig,
) -> Result<String> {
    match mode {
        HighlightMode::Inline => renderer.render_or_fallback(source, render_config),
        HighlightMode::PostRender => {
            let plain = renderer.render_plain(source, render_config)?;
            highlight_subtree(&plain, render_config.highlighter())
                .context("Post-render highlighting failed")
        }
        HighlightMode::Plain => renderer.render(source, render_config),
    }
}

/// Writes HTML to the output file, or stdout when none is given.
fn write_output(config: &Config, html: &str) -> Result<()> {
    match &config.output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent).context("Failed to create output directory")?;
            }
            fs::write(path, html)
                .with_context(|| format!("Failed to write output: {}", path.display()))?;
            info!(path = %path.display(), bytes = html.len(), "wrote HTML");
            Ok(())
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout
                .write_all(html.as_bytes())
                .context("Failed to write HTML to stdout")?;
            stdout.flush().context("Failed to flush stdout")
        }
    }
}

fn main() -> Result<()> {
    let config = Config::parse();
    init_logging(config.verbose)?;
    config.validate().context("Invalid configuration")?;

    let source = read_input(&config)?;
    debug!(bytes = source.len(), mode = ?config.mode, "rendering markdown");

    let render_config = config.render_config();
    let body = render_document(config.renderer(), &source, config.mode, &render_config)?;

    let html = if config.standalone {
        let css = theme_css(&config.theme)?;
        page::standalone(&config.title(), &body, &css).into_string()
    } else {
        body
    };

    write_output(&config, &html)?;

    if let Some(css_path) = &config.css {
        write_theme_css(css_path, &config.theme)?;
        info!(path = %css_path.display(), theme = %config.theme, "wrote theme stylesheet");
    }

    if config.open
        && let Some(output) = &config.output
    {
        open::that(output)
            .with_context(|| format!("Failed to open output: {}", output.display()))?;
    }

    Ok(())
}
