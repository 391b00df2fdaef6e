//! regiontag - tag a file with a dialect and print the result

use std::fs;
use std::io::{self, Read, Write};
use std::ops::Range;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use clap::Parser;
use tracing::debug;

use regiontag::config::Config;
use regiontag::error::{Result, TagError};
use regiontag::render;
use regiontag::syntax::{Highlighter, RuleSet, Snapshot, Theme, COQ_INFO};

/// Tag text with a highlighting dialect and print it styled
#[derive(Parser, Debug)]
#[command(name = "regiontag", version, about)]
struct Args {
    /// Input file (stdin when omitted)
    file: Option<PathBuf>,

    /// Load an extra dialect definition (TOML)
    #[arg(long)]
    rules: Option<PathBuf>,

    /// Dialect to use (defaults to the loaded rules, else coq-info)
    #[arg(long)]
    dialect: Option<String>,

    /// Byte range to tag, as START..END
    #[arg(long, value_parser = parse_range)]
    range: Option<Range<usize>>,

    /// Print the span tree instead of styled text
    #[arg(long)]
    dump: bool,

    /// Treat nested `(*` inside comments as plain text
    #[arg(long)]
    no_nested_comments: bool,

    /// Configuration file (defaults to ~/.regiontag.toml)
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() {
    // Log to stderr, defaulting to warnings only
    let _ = tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .try_init();

    if let Err(e) = run(Args::parse()) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    if args.no_nested_comments {
        config.nested_comments = false;
    }
    config.apply_global();

    let mut highlighter = Highlighter::with_options(config.coq_info_options())?;

    // Re-register the built-in dialect with the configured links
    if !config.links.is_empty() {
        if let Some(builtin) = highlighter.dialect(COQ_INFO) {
            let mut rules = RuleSet::clone(builtin);
            config.apply_links(&mut rules)?;
            highlighter.register(Arc::new(rules));
        }
    }

    let mut loaded = None;
    if let Some(path) = args.rules.as_ref().or(config.rules.as_ref()) {
        let mut rules = RuleSet::load(path)?;
        config.apply_links(&mut rules)?;
        debug!(dialect = rules.name(), path = %path.display(), "loaded dialect");
        loaded = Some(rules.name().to_string());
        highlighter.register(Arc::new(rules));
    }

    let dialect = args
        .dialect
        .clone()
        .or(loaded)
        .unwrap_or_else(|| COQ_INFO.to_string());
    highlighter.set_buffer_dialect(0, Some(&dialect))?;

    let text = read_input(args.file.as_ref())?;
    let range = match args.range.clone() {
        Some(range) => check_range(&text, range)?,
        None => 0..text.len(),
    };

    let rules = highlighter
        .dialect(&dialect)
        .cloned()
        .ok_or_else(|| TagError::UnknownDialect(dialect.clone()))?;
    let spans = highlighter.highlight(0, &Snapshot::new(&text, 0), range.clone());

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if args.dump {
        render::dump(&mut out, &text, spans, &rules)?;
    } else {
        render::render_ansi(&mut out, &text, spans, &rules, &Theme::new(), range)?;
    }
    out.flush()?;

    Ok(())
}

fn read_input(file: Option<&PathBuf>) -> Result<String> {
    match file {
        Some(path) => Ok(fs::read_to_string(path)?),
        None => {
            let mut text = String::new();
            io::stdin().read_to_string(&mut text)?;
            Ok(text)
        }
    }
}

fn parse_range(s: &str) -> std::result::Result<Range<usize>, String> {
    let (start, end) = s
        .split_once("..")
        .ok_or_else(|| format!("expected START..END, got '{}'", s))?;
    let start = start.trim().parse::<usize>().map_err(|e| e.to_string())?;
    let end = end.trim().parse::<usize>().map_err(|e| e.to_string())?;
    if start > end {
        return Err(format!("start {} is after end {}", start, end));
    }
    Ok(start..end)
}

/// Clamp a range to the text and require character boundaries
fn check_range(text: &str, range: Range<usize>) -> Result<Range<usize>> {
    let end = range.end.min(text.len());
    let start = range.start.min(end);
    if !text.is_char_boundary(start) || !text.is_char_boundary(end) {
        return Err(TagError::InvalidRange(format!(
            "{}..{} is not on character boundaries",
            range.start, range.end
        )));
    }
    Ok(start..end)
}
