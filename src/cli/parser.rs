use crate::export::ReportFormat;
use clap::{Args, Parser, Subcommand, ValueEnum};

/// Command-line interface definition for rZoomSync
/// CLI application to create Zoom meetings for courses and collect attendance
#[derive(Parser)]
#[command(
    name = "rzoomsync",
    version = env!("CARGO_PKG_VERSION"),
    about = "Create Zoom meetings for courses and sync participation reports into attendance totals (SQLite)",
    long_about = None
)]
pub struct Cli {
    /// Override database path (useful for tests or custom DB)
    #[arg(global = true, long = "db")]
    pub db: Option<String>,

    /// Run in test mode (no config file update)
    #[arg(global = true, long = "test", hide = true)]
    pub test: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database and configuration
    Init,

    /// Manage the configuration file (view or edit)
    Config {
        #[arg(long = "print", help = "Print the current configuration (secret masked)")]
        print_config: bool,

        #[arg(
            long = "edit",
            help = "Edit the configuration file (default editor: $EDITOR, or nano/notepad)"
        )]
        edit_config: bool,

        #[arg(
            long = "editor",
            help = "Specify the editor to use (vim, nano, or custom path)"
        )]
        editor: Option<String>,
    },

    /// Manage the database (migrations, integrity checks, etc.)
    Db {
        #[arg(long = "migrate", help = "Run pending database migrations")]
        migrate: bool,

        #[arg(long = "check", help = "Check database integrity")]
        check: bool,

        #[arg(long = "vacuum", help = "Optimize the database using VACUUM")]
        vacuum: bool,

        #[arg(long = "info", help = "Show database information")]
        info: bool,
    },

    /// Print the internal log table
    Log {
        #[arg(long = "print", help = "Print rows from the internal log table")]
        print: bool,
    },

    /// Add or update a course user and enrol them
    Enrol {
        #[arg(long = "course", help = "Course id")]
        course: i64,

        #[arg(long = "email", help = "User email (unique key)")]
        email: String,

        #[arg(long = "first", default_value = "", help = "First name")]
        first: String,

        #[arg(long = "last", default_value = "", help = "Last name")]
        last: String,
    },

    /// Create, list or edit meetings
    Meeting {
        #[command(subcommand)]
        action: MeetingAction,
    },

    /// Fetch Zoom participation reports and update attendance
    Sync {
        #[command(flatten)]
        selector: SyncSelector,

        #[arg(long = "from", help = "Only meetings scheduled on or after this date (YYYY-MM-DD)")]
        from: Option<String>,

        #[arg(long = "to", help = "Only meetings scheduled on or before this date (YYYY-MM-DD)")]
        to: Option<String>,
    },

    /// Show or export the attendance of a meeting
    Report {
        #[arg(long = "meeting", help = "Local meeting id")]
        meeting: i64,

        #[arg(long, value_enum, default_value = "table")]
        format: ReportFormat,

        #[arg(long, value_name = "FILE", help = "Output file (csv/json)")]
        file: Option<String>,

        #[arg(long, short = 'f', help = "Overwrite an existing file")]
        force: bool,
    },
}

/// Exactly one selector scopes a sync run.
#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
pub struct SyncSelector {
    #[arg(long = "courseid", help = "Sync every meeting of a course")]
    pub course_id: Option<i64>,

    #[arg(long = "meetingid", help = "Sync meetings with this Zoom meeting id")]
    pub meeting_id: Option<i64>,

    #[arg(long = "meetinguuid", help = "Sync the meeting instance with this Zoom UUID")]
    pub meeting_uuid: Option<String>,
}

#[derive(Subcommand)]
pub enum MeetingAction {
    /// Create a meeting on Zoom and store it locally
    Create {
        #[arg(long = "course")]
        course: i64,

        #[arg(long = "topic")]
        topic: String,

        #[arg(long = "start", help = "Start time: \"YYYY-MM-DD HH:MM\" (UTC) or RFC3339")]
        start: String,

        #[arg(long = "duration", help = "Duration in minutes")]
        duration: i64,

        #[arg(long = "timezone", default_value = "UTC")]
        timezone: String,

        #[arg(long = "recurring", help = "Recurring meeting with no fixed time")]
        recurring: bool,

        #[arg(long = "password", default_value = "")]
        password: String,

        #[arg(long = "join-before-host", conflicts_with = "waiting_room")]
        join_before_host: bool,

        #[arg(long = "waiting-room")]
        waiting_room: bool,
    },

    /// List stored meetings
    List {
        #[arg(long = "course")]
        course: Option<i64>,
    },

    /// Toggle meeting options (join before host and waiting room exclude each other)
    Options {
        #[arg(long = "id", help = "Local meeting id")]
        id: i64,

        #[arg(long = "join-before-host", value_enum)]
        join_before_host: Option<Toggle>,

        #[arg(long = "waiting-room", value_enum)]
        waiting_room: Option<Toggle>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Toggle {
    On,
    Off,
}

impl Toggle {
    pub fn is_on(&self) -> bool {
        matches!(self, Toggle::On)
    }
}
