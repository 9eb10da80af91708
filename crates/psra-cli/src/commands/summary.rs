use crate::cli::GlobalFlags;
use crate::context::AppContext;
use crate::output::output;

/// Handle `psra summary`.
pub fn handle(volunteer: Option<&str>, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    match volunteer {
        Some(volunteer_id) => output(&ctx.service.volunteer_summary(volunteer_id)?, flags.format),
        None => output(&ctx.service.dispatcher_summary()?, flags.format),
    }
}
