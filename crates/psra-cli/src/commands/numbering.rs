use psra_dispatch::DispatchService;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::NumberingCommands;
use crate::context::AppContext;
use crate::output::output;

/// Handle `psra numbering`.
pub fn handle(
    action: &NumberingCommands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match action {
        NumberingCommands::Stats => output(&ctx.service.numbering_stats()?, flags.format),
        NumberingCommands::Reset => {
            ctx.service.reset_counters()?;
            output(&ctx.service.numbering_stats()?, flags.format)
        }
        NumberingCommands::Duplicates => {
            let report = ctx.service.check_for_duplicates()?;
            if !report.is_clean() {
                tracing::warn!(
                    members = report.duplicate_members.len(),
                    incidents = report.duplicate_incidents.len(),
                    "duplicate numbers found"
                );
            }
            output(&report, flags.format)
        }
        NumberingCommands::Info { member_no } => {
            let Some(info) = DispatchService::member_number_info(*member_no) else {
                anyhow::bail!("invalid member number {member_no}: expected YY0001..YY9999");
            };
            output(&info, flags.format)
        }
    }
}
