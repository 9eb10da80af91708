use clap::Subcommand;

/// Numbering commands.
#[derive(Clone, Debug, Subcommand)]
pub enum NumberingCommands {
    /// Current counters.
    Stats,
    /// Reset every counter to zero.
    Reset,
    /// Numbers embedded in more than one stored ID.
    Duplicates,
    /// Decode a member number.
    Info { member_no: u32 },
}
