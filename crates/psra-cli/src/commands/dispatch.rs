use crate::cli::GlobalFlags;
use crate::cli::root_commands::Commands;
use crate::commands;
use crate::context::AppContext;

/// Dispatch a parsed command to the corresponding handler module.
pub fn dispatch(command: Commands, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    match command {
        Commands::Incident { action } => commands::incident::handle(&action, ctx, flags),
        Commands::Support { action } => commands::support::handle(&action, ctx, flags),
        Commands::Volunteer { action } => commands::volunteer::handle(&action, ctx, flags),
        Commands::Numbering { action } => commands::numbering::handle(&action, ctx, flags),
        Commands::Summary { volunteer } => {
            commands::summary::handle(volunteer.as_deref(), ctx, flags)
        }
        Commands::ClearData => commands::clear_data::handle(ctx, flags),
    }
}
