// ABOUTME: CLI for declutter: reads HTML/XML from a file or piped stdin, cleans it and writes the result.
// ABOUTME: Validates input/output preconditions before the cleanup core runs.

use std::fs::{self, OpenOptions};
use std::io::{self, IsTerminal, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

use anyhow::{anyhow, bail, Context, Result};
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use declutter_core::{decode_input, Cleaner, Options, ParserKind};
use tracing::info;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::EnvFilter;

/// Simplify HTML/XML: drop noise tags, comments and attributes, collapse
/// redundant wrappers and prune empty elements.
#[derive(Parser, Debug)]
#[command(name = "declutter")]
#[command(about = "Simplify HTML/XML documents", long_about = None)]
struct Args {
    /// Input file path. If omitted, piped stdin is read.
    #[arg(short = 'i', long = "input")]
    input: Option<PathBuf>,

    /// Output file path (default: stdout). An existing file is never overwritten.
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,

    /// Parser: auto, document, fragment or xml (also html.parser, lxml, html5lib, lxml-xml)
    #[arg(long = "parser", default_value = "auto")]
    parser: ParserKind,

    /// Tag to remove along with its subtree; repeatable, adds to style, span, meta, script
    #[arg(short = 'r', long = "remove-tag", value_name = "TAG")]
    remove_tags: Vec<String>,

    /// Attribute to keep; repeatable, adds to href, src, alt
    #[arg(short = 'k', long = "keep-attr", visible_alias = "ka", value_name = "ATTR")]
    keep_attrs: Vec<String>,

    /// Remove comments (default: enabled)
    #[arg(long = "remove-comments", overrides_with = "no_remove_comments")]
    remove_comments: bool,
    #[arg(long = "no-remove-comments", overrides_with = "remove_comments")]
    no_remove_comments: bool,

    /// Only unwrap when wrapper and child share a tag name (default: enabled)
    #[arg(long = "same-name-only", overrides_with = "no_same_name_only")]
    same_name_only: bool,
    #[arg(long = "no-same-name-only", overrides_with = "same_name_only")]
    no_same_name_only: bool,

    /// Unwrap redundant single-child wrappers (default: enabled)
    #[arg(long = "minimize-nesting", overrides_with = "no_minimize_nesting")]
    minimize_nesting: bool,
    #[arg(long = "no-minimize-nesting", overrides_with = "minimize_nesting")]
    no_minimize_nesting: bool,

    /// Remove elements left empty after cleanup (default: enabled)
    #[arg(long = "remove-empty", overrides_with = "no_remove_empty")]
    remove_empty: bool,
    #[arg(long = "no-remove-empty", overrides_with = "remove_empty")]
    no_remove_empty: bool,

    /// Pretty-print the output (default: enabled)
    #[arg(long = "prettify", overrides_with = "no_prettify")]
    prettify: bool,
    #[arg(long = "no-prettify", overrides_with = "prettify")]
    no_prettify: bool,

    /// Input character encoding label (default: detect)
    #[arg(long = "encoding", value_name = "LABEL")]
    encoding: Option<String>,

    /// Print a JSON report of what each pass changed to stderr
    #[arg(long = "stats")]
    stats: bool,

    /// Print elapsed time in ms to stderr
    #[arg(long = "timing")]
    timing: bool,

    /// Log pipeline activity to stderr (filter with RUST_LOG)
    #[arg(short = 't', long = "trace")]
    trace: bool,
}

/// Resolve a `--flag` / `--no-flag` pair; the last one given wins.
fn toggle(on: bool, off: bool, default: bool) -> bool {
    if off {
        false
    } else if on {
        true
    } else {
        default
    }
}

impl Args {
    fn options(&self) -> Options {
        let defaults = Options::default();
        let mut builder = Options::builder()
            .parser(self.parser)
            .remove_comments(toggle(
                self.remove_comments,
                self.no_remove_comments,
                defaults.remove_comments,
            ))
            .same_name_only(toggle(
                self.same_name_only,
                self.no_same_name_only,
                defaults.same_name_only,
            ))
            .minimize_nesting(toggle(
                self.minimize_nesting,
                self.no_minimize_nesting,
                defaults.minimize_nesting,
            ))
            .remove_empty(toggle(
                self.remove_empty,
                self.no_remove_empty,
                defaults.remove_empty,
            ))
            .prettify(toggle(self.prettify, self.no_prettify, defaults.prettify));
        for tag in &self.remove_tags {
            builder = builder.remove_tag(tag.as_str());
        }
        for attr in &self.keep_attrs {
            builder = builder.keep_attr(attr.as_str());
        }
        builder.build()
    }
}

/// Whether stdin carries piped data (a pipe or a redirected file), as opposed
/// to a terminal or a null device.
fn stdin_is_piped() -> bool {
    let stdin = io::stdin();
    if stdin.is_terminal() {
        return false;
    }
    #[cfg(unix)]
    {
        use std::os::fd::AsFd;
        use std::os::unix::fs::FileTypeExt;

        let Ok(fd) = stdin.as_fd().try_clone_to_owned() else {
            return false;
        };
        let Ok(meta) = fs::File::from(fd).metadata() else {
            return false;
        };
        let kind = meta.file_type();
        kind.is_fifo() || kind.is_file() || kind.is_socket()
    }
    #[cfg(not(unix))]
    {
        true
    }
}

/// Check the input/output preconditions. Usage problems exit through clap
/// with status 2; the rest are returned as errors.
fn validate(args: &Args) -> Result<()> {
    let stdin_piped = stdin_is_piped();

    if args.input.is_some() && stdin_piped {
        Args::command()
            .error(
                ErrorKind::ArgumentConflict,
                "both --input and stdin were provided; choose one",
            )
            .exit();
    }
    if args.input.is_none() && !stdin_piped {
        Args::command()
            .error(
                ErrorKind::MissingRequiredArgument,
                "provide --input FILE or pipe markup into stdin (e.g. cat file | declutter)",
            )
            .exit();
    }

    if let Some(input) = &args.input {
        if !input.is_file() {
            bail!("file not found: {}", input.display());
        }
    }

    if let Some(output) = &args.output {
        if output.is_dir() {
            bail!("output is a directory: {}", output.display());
        }
        if output.exists() {
            bail!("output file exists: {}", output.display());
        }
    }
    Ok(())
}

fn read_input(args: &Args) -> Result<String> {
    let bytes = match &args.input {
        Some(path) => fs::read(path).with_context(|| format!("reading {}", path.display()))?,
        None => {
            let mut buf = Vec::new();
            io::stdin()
                .read_to_end(&mut buf)
                .context("reading stdin")?;
            buf
        }
    };
    Ok(decode_input(&bytes, args.encoding.as_deref())?)
}

fn write_output(path: Option<&Path>, text: &str) -> Result<()> {
    match path {
        Some(path) => {
            let mut file = OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(path)
                .map_err(|e| match e.kind() {
                    io::ErrorKind::AlreadyExists => {
                        anyhow!("output file exists: {}", path.display())
                    }
                    _ => anyhow!(e).context(format!("creating {}", path.display())),
                })?;
            file.write_all(text.as_bytes())
                .with_context(|| format!("writing {}", path.display()))?;
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(text.as_bytes()).context("writing stdout")?;
            stdout.flush().context("flushing stdout")?;
        }
    }
    Ok(())
}

fn run(args: &Args) -> Result<()> {
    validate(args)?;

    eprintln!(
        "input: {}",
        args.input
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "<stdin>".to_string())
    );
    eprintln!(
        "output: {}",
        args.output
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "-".to_string())
    );

    let start = Instant::now();
    let input = read_input(args)?;
    let cleaner = Cleaner::new(args.options());
    let (doc, report) = cleaner.clean_document(&input)?;
    let mut output = cleaner.render(&doc);
    if !output.ends_with('\n') {
        output.push('\n');
    }
    let elapsed = start.elapsed();
    info!(?report, "cleaned document");

    write_output(args.output.as_deref(), &output)?;

    if args.stats {
        eprintln!("{}", serde_json::to_string_pretty(&report)?);
    }
    if args.timing {
        eprintln!("elapsed: {}ms", elapsed.as_millis());
    }
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_span_events(FmtSpan::CLOSE)
        .with_env_filter(filter)
        .init();
}

fn main() -> ExitCode {
    let args = Args::parse();
    if args.trace {
        init_tracing();
        info!("logger initialized");
    }

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {:#}", err);
            ExitCode::from(1)
        }
    }
}
