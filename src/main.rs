use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use lunrstore::config::{Overrides, Settings};
use lunrstore::ssg::Ssg;
use lunrstore::{store, Result};
use std::path::PathBuf;
use std::process;
use tracing::{error, info};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Generates the lunr search store of a Jekyll-style blog.
#[derive(Debug, Parser)]
#[command(name = "lunrstore", version)]
struct Cli {
    /// Default log level; `RUST_LOG` directives take precedence.
    #[arg(long = "log-level", default_value = "info", global = true)]
    log_level: LevelFilter,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Index the site's collections and write `lunr-store.js`.
    Build(BuildArgs),
    /// Validate an existing store script.
    Check(CheckArgs),
}

#[derive(Debug, Args)]
struct BuildArgs {
    /// Site source directory containing `_config.yml` and `_posts`.
    source: PathBuf,

    /// Destination directory; defaults to `<SOURCE>/_site`.
    #[arg(long, value_name = "DIR")]
    dest: Option<PathBuf>,

    #[command(flatten)]
    overrides: Overrides,
}

#[derive(Debug, Args)]
struct CheckArgs {
    /// Path of the store script.
    store: PathBuf,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.log_level);

    if let Err(err) = run(cli.command) {
        error!(error = %err, "failed");
        process::exit(1);
    }
}

fn init_tracing(level: LevelFilter) {
    let env_filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();
    tracing_subscriber::fmt()
        .compact()
        .with_target(false)
        .with_env_filter(env_filter)
        .init();
}

fn run(command: Command) -> Result<()> {
    match command {
        Command::Build(args) => {
            let settings = Settings::load(&args.source, &args.overrides)?;
            let dest = args.dest.unwrap_or_else(|| args.source.join("_site"));
            let ssg = Ssg::new(args.source, settings)?;
            info!(
                collections = ?ssg.settings().collections,
                permalink = %ssg.settings().permalink,
                "building search store"
            );
            ssg.build(&dest, Utc::now().fixed_offset())?;
        }
        Command::Check(args) => {
            let records = store::read(&args.store)?;
            info!(
                path = %args.store.display(),
                records = records.len(),
                "store is valid"
            );
        }
    }
    Ok(())
}
