use clap::Subcommand;

/// Incident commands.
#[derive(Clone, Debug, Subcommand)]
pub enum IncidentCommands {
    /// Report a new incident.
    Create {
        #[arg(long)]
        reporter_name: String,
        #[arg(long)]
        reporter_phone: String,
        /// Google Maps link to the location.
        #[arg(long)]
        maps_url: String,
        #[arg(long = "type")]
        incident_type: String,
        /// Attachment as a data URL or link.
        #[arg(long)]
        image: Option<String>,
    },
    /// List incidents.
    List {
        #[arg(long)]
        status: Option<String>,
        /// Only incidents this volunteer can see (approved, or assigned to them).
        #[arg(long, conflicts_with = "history_of")]
        visible_to: Option<String>,
        /// Closed and canceled incidents assigned to this volunteer.
        #[arg(long)]
        history_of: Option<String>,
    },
    /// Get an incident by ID.
    Get { id: String },
    /// Approve an incident for volunteers.
    Approve {
        id: String,
        /// Approver name (defaults to `dispatch.default_actor`).
        #[arg(long)]
        by: Option<String>,
    },
    /// Cancel an incident.
    Cancel {
        id: String,
        #[arg(long)]
        reason: String,
        #[arg(long)]
        by: Option<String>,
    },
    /// Accept an approved incident as a volunteer.
    Accept {
        id: String,
        #[arg(long)]
        volunteer: String,
    },
    /// Close an in-progress incident.
    Close {
        id: String,
        #[arg(long)]
        volunteer: String,
        #[arg(long)]
        note: String,
    },
    /// Delete an incident and its support requests.
    Delete { id: String },
    /// Request support on an incident.
    Support {
        id: String,
        #[arg(long)]
        volunteer: String,
        #[arg(long)]
        note: Option<String>,
    },
}
