use clap::Subcommand;

use crate::cli::subcommands::{
    IncidentCommands, NumberingCommands, SupportCommands, VolunteerCommands,
};

/// Top-level command tree.
#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Incident lifecycle.
    Incident {
        #[command(subcommand)]
        action: IncidentCommands,
    },
    /// Support requests raised by assigned volunteers.
    Support {
        #[command(subcommand)]
        action: SupportCommands,
    },
    /// Volunteer registry.
    Volunteer {
        #[command(subcommand)]
        action: VolunteerCommands,
    },
    /// Member number and incident sequence counters.
    Numbering {
        #[command(subcommand)]
        action: NumberingCommands,
    },
    /// Dispatcher totals, or one volunteer's dashboard with --volunteer.
    Summary {
        #[arg(long)]
        volunteer: Option<String>,
    },
    /// Delete every stored collection, keeping session keys.
    ClearData,
}
