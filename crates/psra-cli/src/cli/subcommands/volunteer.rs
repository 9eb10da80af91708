use clap::Subcommand;

/// Volunteer commands.
#[derive(Clone, Debug, Subcommand)]
pub enum VolunteerCommands {
    /// Register a volunteer and allocate a member number.
    Register {
        #[arg(long)]
        full_name: String,
        #[arg(long)]
        national_id: String,
        #[arg(long)]
        phone: String,
        /// `YYYY-MM-DD`
        #[arg(long)]
        birth_date: String,
        #[arg(long)]
        blood_type: String,
        #[arg(long)]
        region: String,
    },
    /// List volunteers.
    List,
    /// Get a volunteer by ID.
    Get { id: String },
    /// Update contact details.
    Update {
        id: String,
        #[arg(long)]
        full_name: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        national_id: Option<String>,
    },
    /// Delete a volunteer.
    Delete { id: String },
    /// Volunteers ranked by points.
    Standings,
}
