use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use reserve_core::{Line, RecordStatus, Role};

#[derive(Parser)]
#[command(name = "reserve")]
#[command(about = "Track payroll acquisition leads and share them across devices")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Optional path to local database file
    #[arg(long, global = true, value_name = "PATH")]
    pub db_path: Option<PathBuf>,

    /// Employee id to act as (defaults to the session user)
    #[arg(long, global = true, value_name = "CODE")]
    pub actor: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage reserve records
    #[command(subcommand)]
    Record(RecordCommands),
    /// Manage users
    #[command(subcommand)]
    User(UserCommands),
    /// Select the acting user for this device
    Use {
        /// Employee id
        employee_id: String,
    },
    /// Show the acting user
    Whoami,
    /// Forget the session user
    Logout,
    /// Show reserve totals and drill-downs for the acting user
    Summary {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Export the records visible to the acting user
    Export {
        /// Export format
        #[arg(long, value_enum, default_value_t = ExportFormat::Json)]
        format: ExportFormat,
        /// Optional output path (stdout when omitted)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
    /// Show or change cloud sync settings
    #[command(subcommand)]
    Config(ConfigCommands),
    /// Sync with the shared cloud document now
    Sync,
    /// Generate shell completion scripts
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: CompletionShell,
        /// Optional output path (stdout when omitted)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum RecordCommands {
    /// Create a record owned by the acting user
    #[command(alias = "new")]
    Add {
        /// Company name
        company: String,
        #[command(flatten)]
        fields: RecordFields,
        /// Create even if a record for this company already exists
        #[arg(long)]
        force: bool,
    },
    /// List visible records
    List {
        #[command(flatten)]
        filter: RecordFilter,
        /// Field to sort by, largest or latest first
        #[arg(long, value_enum, default_value_t = RecordSort::Updated)]
        sort: RecordSort,
        /// Sort smallest or earliest first
        #[arg(long)]
        asc: bool,
        /// Number of records to show
        #[arg(short, long)]
        limit: Option<usize>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show one record with its history
    Show {
        /// Record ID or unique ID prefix
        id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Update fields of a record
    #[command(alias = "edit")]
    Update {
        /// Record ID or unique ID prefix
        id: String,
        /// New company name
        #[arg(long)]
        company: Option<String>,
        #[command(flatten)]
        fields: RecordFields,
        /// Reassign to the user with this employee id
        #[arg(long, value_name = "CODE")]
        owner: Option<String>,
    },
    /// Delete a record
    Delete {
        /// Record ID or unique ID prefix
        id: String,
    },
    /// Import records from a JSON array (`-` reads stdin)
    Import {
        /// Path to the JSON file
        path: PathBuf,
    },
}

/// Narrowing options for `record list`.
#[derive(Args, Debug, Default)]
pub struct RecordFilter {
    /// Only records with this status
    #[arg(long, value_parser = parse_status)]
    pub status: Option<RecordStatus>,
    /// Only records of this business line
    #[arg(long, value_parser = parse_line)]
    pub line: Option<Line>,
    /// Only records of this department
    #[arg(long)]
    pub department: Option<String>,
    /// Only records whose owner name contains this text
    #[arg(long, value_name = "NAME")]
    pub owner: Option<String>,
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, ValueEnum)]
pub enum RecordSort {
    #[default]
    Updated,
    Payroll,
    Landing,
    Cards,
    Probability,
    Visit,
}

/// Optional record fields shared by `add` and `update`.
#[derive(Args, Debug, Default)]
pub struct RecordFields {
    /// Total employees of the company
    #[arg(long)]
    pub employees: Option<u32>,
    /// Estimated new payroll accounts
    #[arg(long)]
    pub payroll: Option<u32>,
    /// Estimated landing date (YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    pub landing: Option<String>,
    /// Cards issued so far
    #[arg(long)]
    pub cards: Option<u32>,
    /// Card issuing schedule
    #[arg(long)]
    pub schedule: Option<String>,
    /// Last visit date (YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    pub visited: Option<String>,
    /// Landing probability in percent
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=100))]
    pub probability: Option<u8>,
    /// Progress notes
    #[arg(long)]
    pub notes: Option<String>,
    /// Following, completed, or failed
    #[arg(long, value_parser = parse_status)]
    pub status: Option<RecordStatus>,
}

#[derive(Subcommand)]
pub enum UserCommands {
    /// Add a user
    Add {
        /// Employee id used to select the user
        employee_id: String,
        /// Display name
        name: String,
        #[arg(long, value_parser = parse_role, default_value = "staff")]
        role: Role,
        #[arg(long)]
        department: String,
        #[arg(long, value_parser = parse_line)]
        line: Line,
        /// Job title
        #[arg(long, default_value = "")]
        title: String,
        /// Yearly payroll target
        #[arg(long, default_value_t = 0)]
        target: u32,
    },
    /// List users
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete a user by employee id
    Delete {
        employee_id: String,
    },
    /// Import users from a JSON array (`-` reads stdin)
    Import {
        path: PathBuf,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show the cloud sync settings
    Show,
    /// Change the cloud sync settings
    Set {
        /// Enable cloud sync
        #[arg(long, conflicts_with = "disable")]
        enable: bool,
        /// Disable cloud sync
        #[arg(long)]
        disable: bool,
        /// JSONBin master key
        #[arg(long, value_name = "KEY")]
        api_key: Option<String>,
        /// JSONBin bin id shared by every device
        #[arg(long, value_name = "ID")]
        bin_id: Option<String>,
    },
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum ExportFormat {
    Json,
    Csv,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum CompletionShell {
    Bash,
    Zsh,
    Fish,
    #[value(name = "powershell")]
    PowerShell,
}

fn parse_status(value: &str) -> Result<RecordStatus, String> {
    value.parse()
}

fn parse_role(value: &str) -> Result<Role, String> {
    value.parse()
}

fn parse_line(value: &str) -> Result<Line, String> {
    value.parse()
}
