use clap::Parser;

pub mod global;
pub mod root_commands;
pub mod subcommands;

pub use global::{GlobalFlags, OutputFormat};
pub use root_commands::Commands;

/// Top-level CLI parser for the `psra` binary.
#[derive(Debug, Parser)]
#[command(name = "psra", version, about = "PSRA volunteer dispatch console")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format: json, table, raw
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose mode (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Store directory (overrides `store.path` and forces the file backend)
    #[arg(short, long, global = true)]
    pub store: Option<String>,
}

impl Cli {
    /// Extract ergonomic global flags struct for command handlers.
    #[must_use]
    pub fn global_flags(&self) -> GlobalFlags {
        GlobalFlags {
            format: self.format,
            quiet: self.quiet,
            verbose: self.verbose,
            store: self.store.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::{CommandFactory, Parser};

    use super::subcommands::{IncidentCommands, NumberingCommands};
    use super::{Cli, Commands, GlobalFlags, OutputFormat};

    #[test]
    fn clap_command_tree_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_parse_before_subcommand() {
        let cli = Cli::try_parse_from(["psra", "--format", "table", "--verbose", "summary"])
            .expect("cli should parse");

        assert_eq!(cli.format, OutputFormat::Table);
        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::Summary { volunteer: None }));
    }

    #[test]
    fn global_flags_parse_after_subcommand() {
        let cli = Cli::try_parse_from(["psra", "clear-data", "--format", "raw", "--quiet"])
            .expect("cli should parse");

        assert_eq!(cli.format, OutputFormat::Raw);
        assert!(cli.quiet);
        assert!(matches!(cli.command, Commands::ClearData));
    }

    #[test]
    fn output_format_rejects_invalid_value() {
        let parsed = Cli::try_parse_from(["psra", "--format", "xml", "summary"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn global_flags_extraction_copies_values() {
        let cli = Cli::try_parse_from(["psra", "--store", "/tmp/psra", "--verbose", "summary"])
            .expect("cli should parse");
        let flags: GlobalFlags = cli.global_flags();
        assert_eq!(flags.store.as_deref(), Some("/tmp/psra"));
        assert!(flags.verbose);
        assert!(!flags.quiet);
    }

    #[test]
    fn cancel_requires_a_reason() {
        let parsed = Cli::try_parse_from(["psra", "incident", "cancel", "incident_1_1_abc"]);
        assert!(parsed.is_err());

        let cli = Cli::try_parse_from([
            "psra",
            "incident",
            "cancel",
            "incident_1_1_abc",
            "--reason",
            "duplicate report",
        ])
        .expect("cli should parse");
        let Commands::Incident {
            action: IncidentCommands::Cancel { reason, by, .. },
        } = cli.command
        else {
            panic!("expected incident cancel");
        };
        assert_eq!(reason, "duplicate report");
        assert_eq!(by, None);
    }

    #[test]
    fn member_number_info_takes_a_number() {
        let cli = Cli::try_parse_from(["psra", "numbering", "info", "250007"])
            .expect("cli should parse");
        assert!(matches!(
            cli.command,
            Commands::Numbering {
                action: NumberingCommands::Info { member_no: 250_007 }
            }
        ));
    }
}
