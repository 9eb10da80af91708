use psra_core::entities::NewVolunteer;
use psra_dispatch::VolunteerUpdateBuilder;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::VolunteerCommands;
use crate::context::AppContext;
use crate::output::output;

/// Handle `psra volunteer`.
pub fn handle(
    action: &VolunteerCommands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let service = &ctx.service;
    match action {
        VolunteerCommands::Register {
            full_name,
            national_id,
            phone,
            birth_date,
            blood_type,
            region,
        } => {
            let input = NewVolunteer {
                full_name: full_name.clone(),
                national_id: national_id.clone(),
                phone: phone.clone(),
                birth_date: birth_date.clone(),
                blood_type: blood_type.clone(),
                region: region.clone(),
            };
            output(&service.register_volunteer(&input)?, flags.format)
        }
        VolunteerCommands::List => output(&service.list_volunteers()?, flags.format),
        VolunteerCommands::Get { id } => output(&service.get_volunteer(id)?, flags.format),
        VolunteerCommands::Update {
            id,
            full_name,
            phone,
            national_id,
        } => {
            if full_name.is_none() && phone.is_none() && national_id.is_none() {
                anyhow::bail!(
                    "At least one of --full-name, --phone, or --national-id must be provided"
                );
            }

            let mut builder = VolunteerUpdateBuilder::new();
            if let Some(full_name) = full_name {
                builder = builder.full_name(full_name);
            }
            if let Some(phone) = phone {
                builder = builder.phone(phone);
            }
            if let Some(national_id) = national_id {
                builder = builder.national_id(national_id);
            }

            output(&service.update_volunteer(id, &builder.build())?, flags.format)
        }
        VolunteerCommands::Delete { id } => output(&service.delete_volunteer(id)?, flags.format),
        VolunteerCommands::Standings => output(&service.volunteer_standings()?, flags.format),
    }
}
