//! Command-line argument definitions.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Top-level CLI entry point for the batch download orchestrator.
// Flag-per-switch surface, so the bool count is inherent
#[allow(clippy::struct_excessive_bools)]
#[derive(Parser, Debug)]
#[command(
    name = "batchdl",
    about = "Batch media downloader driven by a name:url manifest",
    version
)]
pub struct Cli {
    /// Manifest file of name:url lines
    #[arg(short, long, default_value = "urls.txt")]
    pub input: PathBuf,

    /// Directory to place downloaded files in
    #[arg(short, long, default_value = "output")]
    pub output: PathBuf,

    /// Media format: ba (audio), bv (video), ba+bv (both)
    #[arg(short, long, default_value = "ba+bv")]
    pub format: String,

    /// Container extension for the output files
    #[arg(short, long, default_value = "mp4")]
    pub ext: String,

    /// Retries per record after the first attempt
    #[arg(short, long, default_value_t = 3)]
    pub retry: u32,

    /// Seconds to wait between attempts and between records
    #[arg(short, long, default_value_t = 1)]
    pub delay: u64,

    /// Process only the first N manifest records
    #[arg(short, long)]
    pub num: Option<u64>,

    /// Run self-tests instead of downloading
    #[arg(short, long, value_enum)]
    pub test: Option<TestMode>,

    /// Preview the run without invoking external tools
    #[arg(long)]
    pub dry_run: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Print the license and exit
    #[arg(long)]
    pub license: bool,

    /// Print the source repository URL and exit
    #[arg(long)]
    pub repo: bool,

    /// Print an example manifest and exit
    #[arg(long)]
    pub examples: bool,
}

/// Which self-test suite to run.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestMode {
    /// Probe every manifest URL for reachability
    Url,
    /// Check that the external tools are installed
    Dep,
    /// Run both suites
    All,
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn defaults_match_documented_values() {
        let cli = Cli::parse_from(["batchdl"]);
        assert_eq!(cli.input, PathBuf::from("urls.txt"));
        assert_eq!(cli.output, PathBuf::from("output"));
        assert_eq!(cli.format, "ba+bv");
        assert_eq!(cli.ext, "mp4");
        assert_eq!(cli.retry, 3);
        assert_eq!(cli.delay, 1);
        assert_eq!(cli.num, None);
        assert_eq!(cli.test, None);
        assert!(!cli.dry_run);
        assert!(!cli.verbose);
    }

    #[test]
    fn parse_short_flags() {
        let cli = Cli::parse_from([
            "batchdl", "-i", "list.txt", "-o", "media", "-f", "ba", "-e", "mp3", "-r", "0", "-d",
            "5", "-n", "2", "-v",
        ]);
        assert_eq!(cli.input, PathBuf::from("list.txt"));
        assert_eq!(cli.output, PathBuf::from("media"));
        assert_eq!(cli.format, "ba");
        assert_eq!(cli.ext, "mp3");
        assert_eq!(cli.retry, 0);
        assert_eq!(cli.delay, 5);
        assert_eq!(cli.num, Some(2));
        assert!(cli.verbose);
    }

    #[test]
    fn parse_test_modes() {
        let cli = Cli::parse_from(["batchdl", "--test", "url"]);
        assert_eq!(cli.test, Some(TestMode::Url));
        let cli = Cli::parse_from(["batchdl", "-t", "dep"]);
        assert_eq!(cli.test, Some(TestMode::Dep));
        let cli = Cli::parse_from(["batchdl", "-t", "all"]);
        assert_eq!(cli.test, Some(TestMode::All));
    }

    #[test]
    fn reject_unknown_test_mode() {
        assert!(Cli::try_parse_from(["batchdl", "--test", "bogus"]).is_err());
    }

    #[test]
    fn reject_non_numeric_retry() {
        assert!(Cli::try_parse_from(["batchdl", "--retry", "lots"]).is_err());
    }

    #[test]
    fn parse_dry_run_long_flag() {
        let cli = Cli::parse_from(["batchdl", "--dry-run"]);
        assert!(cli.dry_run);
    }

    #[test]
    fn info_flags_parse_alone() {
        assert!(Cli::parse_from(["batchdl", "--license"]).license);
        assert!(Cli::parse_from(["batchdl", "--repo"]).repo);
        assert!(Cli::parse_from(["batchdl", "--examples"]).examples);
    }
}
