use clap::Parser;
use std::path::PathBuf;

/// Command-line interface configuration
#[derive(Debug, Parser)]
#[command(name = "varview")]
#[command(about = "Render variational source decorations headlessly", long_about = None)]
pub struct Cli {
    /// Config file, overriding the discovered one
    #[arg(long, global = true, env = "VARVIEW_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log file, or directory for the default log file name
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands
#[derive(Debug, clap::Subcommand)]
pub enum Command {
    /// Print the stylesheet for a parser tree
    Css {
        /// JSON tree emitted by the parser
        tree: PathBuf,
    },
    /// Print the decoration forest for a parser tree
    Tree {
        /// JSON tree emitted by the parser
        tree: PathBuf,
    },
    /// Print the directive rows for a parser tree
    Predicates {
        /// JSON tree emitted by the parser
        tree: PathBuf,
    },
}
