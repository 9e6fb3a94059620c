//! Ratchet CLI: compile fingerprinted assets and maintain their manifest.
//!
//! Provides `ratchet compile` to publish assets and their links,
//! `ratchet remove`, `ratchet clean` and `ratchet clobber` to reclaim old
//! outputs, and `ratchet sources` / `ratchet show` to inspect what is
//! published.

#![warn(missing_docs)]

mod clean;
mod compile;
mod project;
mod show;

use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// Ratchet, a digest-addressed asset manifest compiler.
#[derive(Parser, Debug)]
#[command(name = "ratchet", version, about = "Ratchet asset manifest compiler")]
pub struct Cli {
    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose (debug-level) output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to a custom `ratchet.toml` configuration file.
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compile assets (and everything they link) into the output directory.
    Compile(CompileArgs),
    /// Remove one published artifact by digest path.
    Remove {
        /// Digest path as recorded in the manifest, e.g. `app-3f2a.js`.
        digest_path: String,
    },
    /// Remove superseded versions of published assets.
    Clean(CleanArgs),
    /// Delete the whole output directory.
    Clobber,
    /// Print the published bytes of assets to stdout.
    Sources {
        /// Logical paths to print.
        #[arg(required = true)]
        paths: Vec<String>,
    },
    /// Print the manifest document.
    Show,
}

/// Arguments for the `ratchet compile` subcommand.
#[derive(Parser, Debug)]
pub struct CompileArgs {
    /// Logical paths to compile.
    #[arg(required = true)]
    pub paths: Vec<String>,

    /// Skip writing `.gz` sidecars.
    #[arg(long)]
    pub no_gzip: bool,

    /// Run exporters sequentially.
    #[arg(long)]
    pub sequential: bool,
}

/// Arguments for the `ratchet clean` subcommand.
#[derive(Parser, Debug)]
pub struct CleanArgs {
    /// Versions to keep per asset, counting the current one.
    #[arg(short, long)]
    pub keep: Option<usize>,

    /// Keep any version younger than this many seconds.
    #[arg(long)]
    pub max_age: Option<u64>,
}

/// Global settings derived from CLI flags.
pub struct GlobalArgs {
    /// Whether to suppress non-error output.
    pub quiet: bool,
    /// Whether to print verbose/debug information.
    pub verbose: bool,
    /// Optional path to a custom config file.
    pub config: Option<String>,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.quiet, cli.verbose);

    let global = GlobalArgs {
        quiet: cli.quiet,
        verbose: cli.verbose,
        config: cli.config,
    };

    let result = match cli.command {
        Command::Compile(ref args) => compile::run(args, &global),
        Command::Remove { ref digest_path } => clean::remove(digest_path, &global),
        Command::Clean(ref args) => clean::run(args, &global),
        Command::Clobber => clean::clobber(&global),
        Command::Sources { ref paths } => compile::sources(paths, &global),
        Command::Show => show::run(&global),
    };

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}

/// Installs the stderr log subscriber. `RUST_LOG` overrides the flags.
fn init_logging(quiet: bool, verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_log_level(quiet, verbose)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

fn default_log_level(quiet: bool, verbose: bool) -> &'static str {
    if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "info"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn parse_compile() {
        let cli = Cli::parse_from(["ratchet", "compile", "application.js", "site.css"]);
        match cli.command {
            Command::Compile(ref args) => {
                assert_eq!(args.paths, vec!["application.js", "site.css"]);
                assert!(!args.no_gzip);
                assert!(!args.sequential);
            }
            _ => panic!("expected Compile command"),
        }
    }

    #[test]
    fn parse_compile_flags() {
        let cli = Cli::parse_from(["ratchet", "compile", "app.js", "--no-gzip", "--sequential"]);
        match cli.command {
            Command::Compile(ref args) => {
                assert!(args.no_gzip);
                assert!(args.sequential);
            }
            _ => panic!("expected Compile command"),
        }
    }

    #[test]
    fn compile_requires_paths() {
        assert!(Cli::try_parse_from(["ratchet", "compile"]).is_err());
    }

    #[test]
    fn parse_remove() {
        let cli = Cli::parse_from(["ratchet", "remove", "app-abc.js"]);
        match cli.command {
            Command::Remove { digest_path } => assert_eq!(digest_path, "app-abc.js"),
            _ => panic!("expected Remove command"),
        }
    }

    #[test]
    fn parse_clean_default() {
        let cli = Cli::parse_from(["ratchet", "clean"]);
        match cli.command {
            Command::Clean(ref args) => {
                assert!(args.keep.is_none());
                assert!(args.max_age.is_none());
            }
            _ => panic!("expected Clean command"),
        }
    }

    #[test]
    fn parse_clean_with_args() {
        let cli = Cli::parse_from(["ratchet", "clean", "--keep", "1", "--max-age", "0"]);
        match cli.command {
            Command::Clean(ref args) => {
                assert_eq!(args.keep, Some(1));
                assert_eq!(args.max_age, Some(0));
            }
            _ => panic!("expected Clean command"),
        }
    }

    #[test]
    fn parse_clobber_and_show() {
        assert!(matches!(
            Cli::parse_from(["ratchet", "clobber"]).command,
            Command::Clobber
        ));
        assert!(matches!(Cli::parse_from(["ratchet", "show"]).command, Command::Show));
    }

    #[test]
    fn parse_sources() {
        let cli = Cli::parse_from(["ratchet", "sources", "a.js", "b.css"]);
        match cli.command {
            Command::Sources { paths } => assert_eq!(paths, vec!["a.js", "b.css"]),
            _ => panic!("expected Sources command"),
        }
    }

    #[test]
    fn parse_global_flags() {
        let cli = Cli::parse_from(["ratchet", "--quiet", "--config", "/p/ratchet.toml", "show"]);
        assert!(cli.quiet);
        assert!(!cli.verbose);
        assert_eq!(cli.config.as_deref(), Some("/p/ratchet.toml"));
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::parse_from(["ratchet", "clobber", "-v"]);
        assert!(cli.verbose);
    }

    #[test]
    fn log_level_from_flags() {
        assert_eq!(default_log_level(false, false), "info");
        assert_eq!(default_log_level(false, true), "debug");
        assert_eq!(default_log_level(true, true), "error");
    }
}
