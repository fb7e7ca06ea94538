use clap::{Parser, Subcommand};
use dimfix::fix::{self, Mode};
use dimfix::{config, output};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Shared flags for commands that produce a fix report.
#[derive(clap::Args, Clone)]
struct ReportArgs {
    /// Print the report as JSON instead of text
    #[arg(long)]
    json: bool,
}

fn version_string() -> &'static str {
    let on_tag = env!("DIMFIX_ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("DIMFIX_GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "dimfix")]
#[command(about = "Add missing width/height to <img> tags")]
#[command(long_about = "\
Add missing width/height to <img> tags

Scans a static site for <img> tags without explicit dimensions, reads each
referenced image's size from its file header, and inserts the attributes.

  <img src=\"img/cake.jpg\" alt=\"\">
    → <img width=\"800\" height=\"600\" src=\"img/cake.jpg\" alt=\"\">

Supported formats: PNG, JPEG, GIF, WebP (VP8, VP8L, VP8X), SVG.

Paths starting with / resolve against --root; others resolve against the
page's directory. Remote URLs and data: URIs are left alone.

Run 'dimfix check' first to preview, then 'dimfix apply' to write.
Run 'dimfix gen-config' to generate a documented dimfix.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Site root directory
    #[arg(long, default_value = ".", global = true)]
    root: PathBuf,

    /// Log every sniffed image (same as RUST_LOG=debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Report missing dimensions without modifying files
    Check(ReportArgs),
    /// Insert missing dimensions into pages
    Apply(ReportArgs),
    /// Print format and dimensions of image files
    Probe {
        /// Image files to inspect
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Print a stock dimfix.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Check(report_args) => run_fix(&cli.root, Mode::DryRun, &report_args)?,
        Command::Apply(report_args) => run_fix(&cli.root, Mode::Apply, &report_args)?,
        Command::Probe { files } => {
            for path in &files {
                let contents = std::fs::read(path);
                output::print_probe(path, contents.as_deref());
            }
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

fn run_fix(
    root: &std::path::Path,
    mode: Mode,
    report_args: &ReportArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let fix_config = config::load_config(root)?;
    init_thread_pool(&fix_config.processing);

    let report = fix::fix_site(root, &fix_config, mode)?;

    if report_args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        output::print_fix_report(
            &report,
            fix_config.report.preview_width,
            fix_config.report.max_warnings,
        );
    }
    Ok(())
}

/// Logs go to stderr so `--json` output stays clean.
///
/// `RUST_LOG` wins when set; otherwise `warn`, or `debug` with `--verbose`.
fn init_tracing(verbose: bool) {
    let default = if verbose { "dimfix=debug" } else { "warn" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores; the config can only lower it.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
