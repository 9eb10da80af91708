use psra_core::entities::{Incident, NewIncident};
use psra_core::enums::IncidentStatus;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::IncidentCommands;
use crate::commands::shared::parse::parse_enum;
use crate::context::AppContext;
use crate::output::output;

/// Handle `psra incident`.
pub fn handle(
    action: &IncidentCommands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let service = &ctx.service;
    match action {
        IncidentCommands::Create {
            reporter_name,
            reporter_phone,
            maps_url,
            incident_type,
            image,
        } => {
            let input = NewIncident {
                reporter_name: reporter_name.clone(),
                reporter_phone: reporter_phone.clone(),
                maps_url: maps_url.clone(),
                incident_type: incident_type.clone(),
                incident_image: image.clone(),
            };
            output(&service.create_incident(&input)?, flags.format)
        }
        IncidentCommands::List {
            status,
            visible_to,
            history_of,
        } => list(
            status.as_deref(),
            visible_to.as_deref(),
            history_of.as_deref(),
            ctx,
            flags,
        ),
        IncidentCommands::Get { id } => output(&service.get_incident(id)?, flags.format),
        IncidentCommands::Approve { id, by } => output(
            &service.approve_incident(id, by.as_deref().unwrap_or_default())?,
            flags.format,
        ),
        IncidentCommands::Cancel { id, reason, by } => output(
            &service.cancel_incident(id, by.as_deref().unwrap_or_default(), reason)?,
            flags.format,
        ),
        IncidentCommands::Accept { id, volunteer } => {
            output(&service.accept_incident(id, volunteer)?, flags.format)
        }
        IncidentCommands::Close {
            id,
            volunteer,
            note,
        } => output(&service.close_incident(id, volunteer, note)?, flags.format),
        IncidentCommands::Delete { id } => output(&service.delete_incident(id)?, flags.format),
        IncidentCommands::Support {
            id,
            volunteer,
            note,
        } => output(
            &service.request_support(id, volunteer, note.as_deref())?,
            flags.format,
        ),
    }
}

fn list(
    status: Option<&str>,
    visible_to: Option<&str>,
    history_of: Option<&str>,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let mut incidents: Vec<Incident> = match (visible_to, history_of) {
        (Some(volunteer_id), _) => ctx.service.visible_incidents_for(volunteer_id)?,
        (None, Some(volunteer_id)) => ctx.service.history_for(volunteer_id)?,
        (None, None) => ctx.service.list_incidents()?,
    };

    if let Some(status) = status {
        let status = parse_enum::<IncidentStatus>(status, "status")?;
        incidents.retain(|incident| incident.status == status);
    }

    output(&incidents, flags.format)
}
