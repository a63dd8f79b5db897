#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::struct_excessive_bools)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::missing_errors_doc)]

mod commands;
mod logging;

use clap::Parser;
use miette::Result;
use resolvext_core::Config;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "resolvext")]
#[command(author, version, about = "Rewrite import specifiers to fully-resolved paths", long_about = None)]
struct Cli {
    /// Increase logging verbosity (-v for DEBUG, -vv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit JSON formatted output (stable, machine-readable)
    #[arg(long, global = true)]
    json: bool,

    /// Override the working directory
    #[arg(long, global = true, value_name = "PATH")]
    cwd: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Print version information
    Version,

    /// Rewrite specifiers in source files
    Rewrite {
        /// Files or directories to process
        #[arg(required = true, value_name = "PATH")]
        paths: Vec<PathBuf>,

        /// Options file (defaults to the nearest resolvext.json)
        #[arg(long, value_name = "FILE", env = "RESOLVEXT_CONFIG")]
        config: Option<PathBuf>,

        /// Write changed files in place
        #[arg(long)]
        write: bool,

        /// Exit with status 1 if any file would change
        #[arg(long, conflicts_with = "write")]
        check: bool,

        /// Leave unresolvable specifiers untouched
        #[arg(long)]
        ignore_unresolved: bool,

        /// Report per-file errors and continue with the remaining files
        #[arg(long)]
        keep_going: bool,

        /// Ask `node` on PATH for the built-in module list
        #[arg(long)]
        runtime_builtins: bool,
    },

    /// Show how a single specifier would be rewritten
    Explain {
        /// The specifier to resolve (e.g., "./util", "lodash/fp")
        specifier: String,

        /// The importing file
        #[arg(long, value_name = "FILE")]
        from: PathBuf,

        /// Options file (defaults to the nearest resolvext.json)
        #[arg(long, value_name = "FILE", env = "RESOLVEXT_CONFIG")]
        config: Option<PathBuf>,

        /// Ask `node` on PATH for the built-in module list
        #[arg(long)]
        runtime_builtins: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Determine working directory
    let cwd = cli
        .cwd
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."));

    let config = Config::new(cwd.clone())
        .with_verbosity(cli.verbose)
        .with_json_logs(cli.json);

    // Version output is plain; no logging needed
    let command = match cli.command {
        Some(Commands::Version) | None => return commands::version::run(),
        Some(command) => command,
    };

    logging::init(config.verbosity, config.json_logs);

    match command {
        Commands::Version => commands::version::run(),
        Commands::Rewrite {
            paths,
            config: config_file,
            write,
            check,
            ignore_unresolved,
            keep_going,
            runtime_builtins,
        } => {
            let span = tracing::info_span!("rewrite", cmd = "rewrite", cwd = %cwd.display());
            let _guard = span.enter();
            commands::rewrite::run(
                &config,
                commands::rewrite::RewriteAction {
                    paths,
                    config: config_file,
                    write,
                    check,
                    ignore_unresolved,
                    keep_going,
                    runtime_builtins,
                },
            )
        }
        Commands::Explain {
            specifier,
            from,
            config: config_file,
            runtime_builtins,
        } => {
            let span = tracing::info_span!("explain", cmd = "explain", cwd = %cwd.display());
            let _guard = span.enter();
            commands::explain::run(
                &config,
                commands::explain::ExplainAction {
                    specifier,
                    from,
                    config: config_file,
                    runtime_builtins,
                },
            )
        }
    }
}
