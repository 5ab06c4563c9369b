/// CLI argument definitions via clap derive.
use clap::{ArgAction, Parser};

/// `pg_lsclusters` — show information about all PostgreSQL clusters.
#[derive(Debug, Parser)]
#[allow(clippy::struct_excessive_bools)]
#[command(
    name = "pg_lsclusters",
    about = "Show information about all PostgreSQL clusters",
    version,
    disable_help_flag = true
)]
pub struct Cli {
    /// Omit the column headers.
    #[arg(short = 'h', long)]
    pub no_header: bool,

    /// Print the full cluster records as a JSON array.
    #[arg(short, long)]
    pub json: bool,

    /// Append the startup mode (auto, manual, disabled) to the status.
    #[arg(short, long)]
    pub start_conf: bool,

    /// Log diagnostics and timings to stderr.
    #[arg(long)]
    pub debug: bool,

    /// Print help.
    #[arg(long, action = ArgAction::Help)]
    #[allow(dead_code)]
    help: Option<bool>,

    /// Version to list (e.g. 13), or a single cluster as 13-main or 13/main.
    #[arg(value_name = "VERSION")]
    pub target: Option<String>,

    /// Cluster of VERSION to list.
    #[arg(value_name = "CLUSTER")]
    pub cluster: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("pg_lsclusters").chain(args.iter().copied()))
    }

    #[test]
    fn test_no_args() {
        let cli = parse(&[]).unwrap();
        assert!(!cli.no_header && !cli.json && !cli.start_conf);
        assert_eq!(cli.target, None);
        assert_eq!(cli.cluster, None);
    }

    #[test]
    fn test_short_flags() {
        let cli = parse(&["-h", "-j", "-s", "13", "main"]).unwrap();
        assert!(cli.no_header);
        assert!(cli.json);
        assert!(cli.start_conf);
        assert_eq!(cli.target.as_deref(), Some("13"));
        assert_eq!(cli.cluster.as_deref(), Some("main"));
    }

    #[test]
    fn test_long_flags() {
        let cli = parse(&["--no-header", "--json", "--start-conf", "13-main"]).unwrap();
        assert!(cli.no_header && cli.json && cli.start_conf);
        assert_eq!(cli.target.as_deref(), Some("13-main"));
    }

    #[test]
    fn test_help_is_long_only() {
        let err = parse(&["--help"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DisplayHelp);
        assert_eq!(err.exit_code(), 0);
    }

    #[test]
    fn test_unknown_flag_fails() {
        let err = parse(&["--bogus"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownArgument);
        assert_ne!(err.exit_code(), 0);
    }

    #[test]
    fn test_too_many_positionals() {
        assert!(parse(&["13", "main", "extra"]).is_err());
    }
}
