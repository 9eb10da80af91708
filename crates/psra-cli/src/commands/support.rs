use psra_core::entities::SupportRequest;
use psra_core::enums::SupportStatus;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::SupportCommands;
use crate::commands::shared::parse::parse_enum;
use crate::context::AppContext;
use crate::output::output;

/// Handle `psra support`.
pub fn handle(action: &SupportCommands, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    match action {
        SupportCommands::List {
            incident,
            volunteer,
            status,
        } => {
            let mut requests: Vec<SupportRequest> = match incident {
                Some(incident_id) => ctx.service.support_requests_for_incident(incident_id)?,
                None => ctx.service.list_support_requests()?,
            };
            if let Some(volunteer_id) = volunteer {
                requests.retain(|request| &request.volunteer_id == volunteer_id);
            }
            if let Some(status) = status {
                let status = parse_enum::<SupportStatus>(status, "status")?;
                requests.retain(|request| request.status == status);
            }
            output(&requests, flags.format)
        }
        SupportCommands::Approve { id } => output(&ctx.service.approve_support(id)?, flags.format),
        SupportCommands::Delete { id } => output(&ctx.service.delete_support(id)?, flags.format),
    }
}
