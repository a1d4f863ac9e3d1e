use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "confpatch",
    about = "confpatch — turn configuration drift into git-applyable patches",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Settings file (TOML)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// List pending changes between two configuration directories
    List(ListArgs),
    /// Generate patches for pending changes
    Patch(PatchArgs),
    /// Unified diff of two files
    Diff(DiffArgs),
    /// Print the effective settings
    Settings(SettingsArgs),
}

/// The two configuration trees being compared.
#[derive(Args)]
pub struct StorePair {
    /// Directory holding the current (source) configuration
    pub source: PathBuf,
    /// Directory holding the changed (target) configuration
    pub target: PathBuf,
    /// Item file extension
    #[arg(long)]
    pub extension: Option<String>,
}

#[derive(Args)]
pub struct ListArgs {
    #[command(flatten)]
    pub stores: StorePair,
}

#[derive(Args)]
pub struct PatchArgs {
    #[command(flatten)]
    pub stores: StorePair,
    /// Write patches to this file instead of stdout
    #[arg(short, long)]
    pub output_file: Option<PathBuf>,
    /// Only keep these namespaces (`default` is the default namespace)
    #[arg(long, value_delimiter = ',')]
    pub collections: Vec<String>,
    /// Path prefix for patched files
    #[arg(long)]
    pub base_path: Option<String>,
    /// Only patch these items, as `NAME` or `NAMESPACE:NAME`
    #[arg(short, long)]
    pub select: Vec<String>,
}

#[derive(Args)]
pub struct DiffArgs {
    /// Old file, or `/dev/null`
    pub from: PathBuf,
    /// New file, or `/dev/null`
    pub to: PathBuf,
    /// Lines of context around each change
    #[arg(short = 'U', long)]
    pub unified: Option<usize>,
    /// Render one-line ranges without a count
    #[arg(long)]
    pub collapse_ranges: bool,
    /// Print a removed/added line count to stderr after the diff
    #[arg(long)]
    pub stat: bool,
}

#[derive(Args)]
pub struct SettingsArgs {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_list() {
        let cli = Cli::try_parse_from(["confpatch", "list", "live", "staged"]).unwrap();
        if let Command::List(args) = cli.command {
            assert_eq!(args.stores.source, PathBuf::from("live"));
            assert_eq!(args.stores.target, PathBuf::from("staged"));
            assert!(args.stores.extension.is_none());
        } else { panic!("wrong command"); }
    }

    #[test]
    fn parse_patch_with_options() {
        let cli = Cli::try_parse_from([
            "confpatch", "patch", "a", "b",
            "-o", "out.patch",
            "--collections", "default,language.fr",
            "--base-path", "config/sync",
            "-s", "system.site",
            "-s", "language.fr:system.site",
        ]).unwrap();
        if let Command::Patch(args) = cli.command {
            assert_eq!(args.output_file, Some(PathBuf::from("out.patch")));
            assert_eq!(args.collections, vec!["default", "language.fr"]);
            assert_eq!(args.base_path, Some("config/sync".into()));
            assert_eq!(args.select, vec!["system.site", "language.fr:system.site"]);
        } else { panic!("wrong command"); }
    }

    #[test]
    fn parse_diff() {
        let cli = Cli::try_parse_from(["confpatch", "diff", "/dev/null", "new.yml", "-U", "1"]).unwrap();
        if let Command::Diff(args) = cli.command {
            assert_eq!(args.from, PathBuf::from("/dev/null"));
            assert_eq!(args.unified, Some(1));
            assert!(!args.collapse_ranges);
            assert!(!args.stat);
        } else { panic!("wrong command"); }
    }

    #[test]
    fn parse_global_config() {
        let cli = Cli::try_parse_from(["confpatch", "settings", "--config", "patch.toml"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("patch.toml")));
        assert!(matches!(cli.command, Command::Settings(_)));
    }

    #[test]
    fn parse_verbose() {
        let cli = Cli::try_parse_from(["confpatch", "--verbose", "list", "a", "b"]).unwrap();
        assert!(cli.verbose);
    }

    #[test]
    fn parse_json_format() {
        let cli = Cli::try_parse_from(["confpatch", "--format", "json", "list", "a", "b"]).unwrap();
        assert!(matches!(cli.format, OutputFormat::Json));
    }

    #[test]
    fn patch_requires_two_directories() {
        assert!(Cli::try_parse_from(["confpatch", "patch", "only-one"]).is_err());
    }
}
