//! `pen2html`: convert `.pen` design documents to static HTML and CSS.
//!
//! `convert` writes `<stem>.html` + `<stem>.css` into `--out-dir`, or prints
//! the result to stdout (a full page with `--standalone`, otherwise the
//! `{ html, css }` JSON object). `lint` reports structural problems.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{ArgAction, Parser, Subcommand};
use pen_core::{Document, LintSeverity, lint_document};
use pen_html::escape::{escape_attr, escape_text};
use pen_html::{Conversion, ConvertConfig, convert_file_with};

#[derive(Parser, Debug)]
#[command(name = "pen2html", version, about)]
struct Cli {
    /// More log output (`-v` info, `-vv` debug). `RUST_LOG` takes precedence.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert a document to HTML and CSS.
    Convert(ConvertArgs),
    /// Check a document for duplicate ids, broken refs, and undeclared variables.
    Lint(LintArgs),
}

#[derive(Parser, Debug)]
struct ConvertArgs {
    /// Input `.pen` document.
    file: PathBuf,

    /// Directory for `<stem>.html` and `<stem>.css`. Prints to stdout when omitted.
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// Wrap the HTML in a complete page.
    #[arg(long, default_value_t = false)]
    standalone: bool,

    /// Prefix for generated class names.
    #[arg(long, default_value = "pen-")]
    class_prefix: String,

    /// Maximum nesting of component references.
    #[arg(long, default_value_t = 32)]
    max_ref_depth: usize,

    /// Leave no `<!-- … -->` marker where a ref was cut off.
    #[arg(long, default_value_t = false)]
    no_cycle_comments: bool,
}

#[derive(Parser, Debug)]
struct LintArgs {
    /// Input `.pen` document.
    file: PathBuf,

    /// Exit with an error when any warning is reported.
    #[arg(long, default_value_t = false)]
    deny_warnings: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    match cli.cmd {
        Command::Convert(args) => cmd_convert(args),
        Command::Lint(args) => cmd_lint(args),
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn cmd_convert(args: ConvertArgs) -> anyhow::Result<()> {
    let config = ConvertConfig {
        class_prefix: args.class_prefix.clone(),
        max_ref_depth: args.max_ref_depth,
        cycle_comments: !args.no_cycle_comments,
        ..ConvertConfig::default()
    };
    let conversion = convert_file_with(&args.file, &config)?;
    let title = document_title(&args.file);

    let Some(out_dir) = &args.out_dir else {
        let output = if args.standalone {
            page_shell(&title, Stylesheet::Inline(&conversion.css), &conversion.html)
        } else {
            serde_json::to_string_pretty(&conversion).context("serialize conversion")?
        };
        println!("{output}");
        return Ok(());
    };

    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("create output dir '{}'", out_dir.display()))?;
    let (html_path, css_path) = output_paths(out_dir, &args.file);
    let css_name = css_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    write_outputs(&conversion, &html_path, &css_path, |html| {
        if args.standalone {
            page_shell(&title, Stylesheet::Linked(&css_name), html)
        } else {
            html.to_string()
        }
    })?;
    log::info!("wrote {} and {}", html_path.display(), css_path.display());
    Ok(())
}

fn write_outputs(
    conversion: &Conversion,
    html_path: &Path,
    css_path: &Path,
    wrap: impl FnOnce(&str) -> String,
) -> anyhow::Result<()> {
    std::fs::write(html_path, wrap(&conversion.html))
        .with_context(|| format!("write html '{}'", html_path.display()))?;
    std::fs::write(css_path, &conversion.css)
        .with_context(|| format!("write css '{}'", css_path.display()))?;
    Ok(())
}

fn cmd_lint(args: LintArgs) -> anyhow::Result<()> {
    let text = std::fs::read_to_string(&args.file)
        .with_context(|| format!("read '{}'", args.file.display()))?;
    let doc = Document::from_json(&text)
        .with_context(|| format!("parse '{}'", args.file.display()))?;

    let diags = lint_document(&doc);
    let mut warnings = 0;
    for d in &diags {
        let severity = match d.severity {
            LintSeverity::Warning => {
                warnings += 1;
                "warning"
            }
            LintSeverity::Info => "info",
        };
        println!(
            "{}: {severity}[{}] {}: {}",
            args.file.display(),
            d.rule,
            d.node_id,
            d.message
        );
    }
    if diags.is_empty() {
        eprintln!("{}: no problems found", args.file.display());
    }
    if args.deny_warnings && warnings > 0 {
        anyhow::bail!("{warnings} warning(s) in {}", args.file.display());
    }
    Ok(())
}

// ─── Output helpers ──────────────────────────────────────────────────────

enum Stylesheet<'a> {
    Inline(&'a str),
    Linked(&'a str),
}

/// A minimal HTML5 page around converted body content.
fn page_shell(title: &str, css: Stylesheet<'_>, body: &str) -> String {
    let style = match css {
        Stylesheet::Inline(css) => format!("<style>\n{css}</style>"),
        Stylesheet::Linked(href) => format!("<link rel=\"stylesheet\" href=\"{}\">", escape_attr(href)),
    };
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>{}</title>\n{style}\n</head>\n<body>\n{body}\n</body>\n</html>\n",
        escape_text(title)
    )
}

fn document_title(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "page".to_string())
}

fn output_paths(out_dir: &Path, input: &Path) -> (PathBuf, PathBuf) {
    let stem = document_title(input);
    (
        out_dir.join(format!("{stem}.html")),
        out_dir.join(format!("{stem}.css")),
    )
}
