use clap::{Parser, Subcommand};
use folio_images::imaging::RustBackend;
use folio_images::{config, discover, output, process};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser)]
#[command(name = "folio-images")]
#[command(about = "Generate responsive gallery variants for a static portfolio")]
#[command(long_about = "\
Generate responsive gallery variants for a static portfolio

Every photo_*.{jpg,jpeg,png} in the source directory is rendered into two
size classes, each as JPEG, WebP and AVIF:

  images/
  ├── photo_dawn.jpg
  └── optimized/
      ├── large/                   # Fit inside LONG_EDGE, never upscaled
      │   ├── photo_dawn@1600.jpg
      │   ├── photo_dawn@1600.webp
      │   └── photo_dawn@1600.avif
      └── thumbs/                  # THUMB_SIZE square, cropped toward the subject
          ├── photo_dawn@480.jpg
          ├── photo_dawn@480.webp
          └── photo_dawn@480.avif

Existing outputs are never rewritten: delete a file to regenerate it.
Failures on individual photos are reported and do not stop the run.

Run 'folio-images gen-config' to generate a documented folio.toml.")]
#[command(version)]
struct Cli {
    /// Longer-edge bound for large variants in pixels [default: 1600]
    long_edge: Option<u32>,

    /// Side of the square thumbnails in pixels [default: 480]
    thumb_size: Option<u32>,

    /// Project root: folio.toml and relative paths are resolved against it
    #[arg(long, default_value = ".", global = true)]
    root: PathBuf,

    /// Log per-variant decisions to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// List sources and the variants each one is still missing
    Check,
    /// Print a stock folio.toml with all options documented
    GenConfig,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Fatal error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        None => optimize(&cli.root, cli.long_edge, cli.thumb_size),
        Some(Command::Check) => {
            let config = config::load_config(&cli.root, cli.long_edge, cli.thumb_size)?;
            let paths = config.paths.resolve(&cli.root);
            let process_config = process::ProcessConfig::new(&config, &paths);
            let sources = discover::discover_sources(&paths.source_dir, &config.paths.prefix)?;
            let entries: Vec<_> = sources
                .into_iter()
                .map(|source| {
                    let missing = process::missing_variants(&source, &process_config);
                    (source, missing)
                })
                .collect();
            output::print_check_output(&entries);
            Ok(())
        }
        Some(Command::GenConfig) => {
            print!("{}", config::stock_config_toml());
            Ok(())
        }
    }
}

fn optimize(
    root: &std::path::Path,
    long_edge: Option<u32>,
    thumb_size: Option<u32>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = config::load_config(root, long_edge, thumb_size)?;
    let paths = config.paths.resolve(root);
    let process_config = process::ProcessConfig::new(&config, &paths);

    for line in output::format_run_header(
        &process_config,
        &paths.source_dir,
        &config.paths.prefix,
        root,
    ) {
        println!("{}", line);
    }

    process::ensure_output_dirs(&process_config)?;
    let sources = discover::discover_sources(&paths.source_dir, &config.paths.prefix)?;
    if sources.is_empty() {
        for line in output::format_nothing_to_do(&paths.source_dir, root) {
            println!("{}", line);
        }
        return Ok(());
    }

    let (tx, rx) = std::sync::mpsc::channel();
    let printer_root = root.to_path_buf();
    let printer = std::thread::spawn(move || {
        for event in rx {
            let failed = matches!(event, process::ProcessEvent::ImageFailed { .. });
            for line in output::format_process_event(&event, &printer_root) {
                if failed {
                    eprintln!("{}", line);
                } else {
                    println!("{}", line);
                }
            }
        }
    });

    let result = process::process_batch(&RustBackend::new(), &sources, &process_config, Some(tx));
    printer
        .join()
        .map_err(|_| "progress printer thread panicked")?;
    let summary = result?;

    output::print_summary(&summary, &process_config, root);
    Ok(())
}

/// Route `tracing` output to stderr.
///
/// `RUST_LOG` wins when set; otherwise only errors are shown, or this crate's
/// debug events with `--verbose`.
fn init_logging(verbose: bool) {
    let default = if verbose {
        "folio_images=debug"
    } else {
        "error"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .init();
}
