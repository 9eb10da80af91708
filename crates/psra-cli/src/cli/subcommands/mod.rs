mod incident;
mod numbering;
mod support;
mod volunteer;

pub use incident::IncidentCommands;
pub use numbering::NumberingCommands;
pub use support::SupportCommands;
pub use volunteer::VolunteerCommands;
