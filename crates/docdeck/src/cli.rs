use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::app::StartOptions;

#[derive(Parser)]
#[command(name = "docdeck")]
#[command(author, version, about)]
#[command(long_about = "Present markdown documents with embedded slide decks.\n\n\
    A document may contain any number of ```slides blocks; each becomes an\n\
    interactive deck with keyboard navigation, a grid overview, and\n\
    fullscreen presentation.\n\n\
    Examples:\n  \
    docdeck handbook.md              Present a document (fullscreen window)\n  \
    docdeck handbook.md --windowed   Present in a window\n  \
    docdeck handbook.md --deck 2     Preselect the second deck\n  \
    docdeck spec                     Print the deck markup format")]
#[command(propagate_version = true)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    /// Markdown document to present
    pub file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Launch in a window instead of fullscreen
    #[arg(long, global = false)]
    pub windowed: bool,

    /// Start the selected deck on a specific slide (1-indexed)
    #[arg(long, global = false)]
    pub slide: Option<usize>,

    /// Preselect a deck as the keyboard target (1-indexed)
    #[arg(long, global = false)]
    pub deck: Option<usize>,

    /// Start with the selected deck's overview open
    #[arg(long, global = false)]
    pub overview: bool,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// View and modify configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Target shell
        #[arg(value_enum)]
        shell: Shell,
    },

    /// Print the docdeck document format specification
    Spec {
        /// Print a concise quick-reference card instead of the full spec
        #[arg(long)]
        short: bool,
    },

    /// Show version information
    Version,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Display current configuration
    Show,

    /// Set a configuration value
    Set {
        /// Configuration key (e.g. defaults.theme, defaults.start_mode)
        key: String,

        /// Value to set
        value: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    Powershell,
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        match self.command {
            Some(Commands::Config { command }) => crate::commands::config::run(command),
            Some(Commands::Completion { shell }) => {
                crate::commands::completion::run(shell);
                Ok(())
            }
            Some(Commands::Spec { short }) => {
                crate::commands::spec::run(short);
                Ok(())
            }
            Some(Commands::Version) => {
                println!("docdeck {}", env!("CARGO_PKG_VERSION"));
                Ok(())
            }
            None => {
                if let Some(file) = self.file {
                    if !file.exists() {
                        anyhow::bail!("File not found: {}", file.display());
                    }
                    crate::app::run(
                        file,
                        StartOptions {
                            windowed: self.windowed,
                            slide: self.slide,
                            deck: self.deck,
                            overview: self.overview,
                        },
                    )
                } else {
                    use clap::CommandFactory;
                    let mut cmd = Self::command();
                    cmd.print_help()?;
                    println!();
                    Ok(())
                }
            }
        }
    }
}
