use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::context::AppContext;
use crate::output::output;

#[derive(Debug, Serialize)]
struct ClearDataResponse {
    removed: Vec<String>,
}

/// Handle `psra clear-data`.
pub fn handle(ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let removed = ctx.service.clear_all_data()?;
    output(&ClearDataResponse { removed }, flags.format)
}
