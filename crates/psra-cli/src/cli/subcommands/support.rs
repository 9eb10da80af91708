use clap::Subcommand;

/// Support request commands.
#[derive(Clone, Debug, Subcommand)]
pub enum SupportCommands {
    /// List support requests.
    List {
        /// Only requests on this incident.
        #[arg(long)]
        incident: Option<String>,
        /// Only requests from this volunteer.
        #[arg(long)]
        volunteer: Option<String>,
        #[arg(long)]
        status: Option<String>,
    },
    /// Approve a pending request.
    Approve { id: String },
    /// Delete a request.
    Delete { id: String },
}
