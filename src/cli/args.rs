//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

/// Split SVG sprite sheets into standalone icons
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path (default: iconsplit.toml, searched upward)
    #[arg(short = 'C', long, global = true, default_value = "iconsplit.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Whether the invoked command asked for verbose output.
    pub fn is_verbose(&self) -> bool {
        matches!(&self.command, Commands::Extract { args } if args.verbose)
    }
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Extract icons from SVG files or directories
    #[command(visible_alias = "x")]
    Extract {
        #[command(flatten)]
        args: ExtractArgs,
    },

    /// List icons in the record store
    #[command(visible_alias = "ls")]
    List,

    /// Remove icons from the record store
    #[command(visible_alias = "rm")]
    Remove {
        /// Icon ids to remove
        #[arg(required = true)]
        ids: Vec<String>,
    },
}

/// Extract command arguments.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct ExtractArgs {
    /// SVG files, or directories searched recursively for `.svg` files
    #[arg(value_name = "PATH", required = true, value_hint = clap::ValueHint::AnyPath)]
    pub paths: Vec<PathBuf>,

    /// Write each icon to `DIR/{name}.svg`
    #[arg(short, long, value_name = "DIR", value_hint = clap::ValueHint::DirPath)]
    pub output: Option<PathBuf>,

    /// Save extracted icons to the record store
    #[arg(short, long)]
    pub save: bool,

    /// Maximum icons per file (overrides `limits.max_icons_per_file`)
    #[arg(short = 'n', long)]
    pub max_icons: Option<usize>,

    /// Write a JSON manifest of all extracted icons
    #[arg(short, long, value_name = "FILE", value_hint = clap::ValueHint::FilePath)]
    pub manifest: Option<PathBuf>,

    /// Enable verbose output for debugging
    #[arg(short = 'V', long)]
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_extract() {
        let cli = Cli::parse_from([
            "iconsplit", "extract", "a.svg", "icons/", "-o", "out", "--save", "-n", "10", "-V",
        ]);
        assert!(cli.is_verbose());
        assert_eq!(cli.config, PathBuf::from("iconsplit.toml"));
        let Commands::Extract { args } = cli.command else {
            panic!("expected extract");
        };
        assert_eq!(args.paths, [PathBuf::from("a.svg"), PathBuf::from("icons/")]);
        assert_eq!(args.output, Some(PathBuf::from("out")));
        assert!(args.save);
        assert_eq!(args.max_icons, Some(10));
        assert_eq!(args.manifest, None);
    }

    #[test]
    fn test_parse_store_commands() {
        let cli = Cli::parse_from(["iconsplit", "rm", "a", "b", "-C", "other.toml"]);
        assert_eq!(cli.config, PathBuf::from("other.toml"));
        assert!(matches!(cli.command, Commands::Remove { ids } if ids == ["a", "b"]));

        assert!(Cli::try_parse_from(["iconsplit", "remove"]).is_err());
        assert!(Cli::try_parse_from(["iconsplit", "extract"]).is_err());
        assert!(matches!(Cli::parse_from(["iconsplit", "list"]).command, Commands::List));
    }

    #[test]
    fn test_version_flag_is_distinct() {
        use clap::CommandFactory;
        Cli::command().debug_assert();

        let err = Cli::try_parse_from(["iconsplit", "-V"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);
        assert!(!Cli::parse_from(["iconsplit", "x", "a.svg"]).is_verbose());
    }
}
