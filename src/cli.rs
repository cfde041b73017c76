use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use fitlog::BodyPart;

#[derive(Parser)]
#[command(name = "fitlog", version, about = "Fitness log with weekly and monthly stats")]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Emit machine-readable JSON instead of colorful text.
    #[arg(global = true, long)]
    pub json: bool,

    /// Use the fitness backend instead of the local database.
    #[arg(global = true, long)]
    pub remote: bool,

    /// Database file (overrides the `db_path` config key)
    #[arg(global = true, long, value_name = "PATH")]
    pub db: Option<String>,

    /// More log output on stderr (-v info, -vv debug, -vvv trace)
    #[arg(global = true, short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Add, list and delete records
    #[command(subcommand, visible_alias = "l")]
    Log(LogCmd),

    /// Show this week's, this month's or a past month's training
    #[command(visible_alias = "st")]
    Stats(StatsArgs),

    /// View or edit fitlog config
    #[command(subcommand)]
    Config(ConfigCmd),

    /// Backend account: login, logout, profile
    #[command(subcommand)]
    Auth(AuthCmd),
}

//
// Commands
//

#[derive(Subcommand)]
pub enum LogCmd {
    /// Log a record
    #[command(visible_alias = "a")]
    Add(AddArgs),

    /// List records, newest first
    #[command(visible_alias = "l")]
    List {
        /// Only records on or after this date (YYYY-MM-DD)
        #[arg(long)]
        from: Option<NaiveDate>,

        /// Only records on or before this date (YYYY-MM-DD)
        #[arg(long)]
        to: Option<NaiveDate>,
    },

    /// Delete a record by id
    #[command(visible_alias = "d")]
    Delete { id: String },
}

#[derive(Args)]
pub struct AddArgs {
    /// Body part: 胸 背 肩 臂 腿 腹 有氧, or chest back shoulders arms legs abs cardio
    pub part: BodyPart,

    /// Exercise name
    #[arg(short, long)]
    pub exercise: Option<String>,

    /// Number of sets (with --reps)
    #[arg(long, requires = "reps", conflicts_with_all = ["distance", "minutes", "seconds"])]
    pub sets: Option<u32>,

    /// Reps per set (with --sets)
    #[arg(long, requires = "sets")]
    pub reps: Option<u32>,

    /// Distance in meters
    #[arg(long, conflicts_with_all = ["minutes", "seconds"])]
    pub distance: Option<f64>,

    /// Duration, minutes part
    #[arg(long)]
    pub minutes: Option<u32>,

    /// Duration, seconds part (0-59)
    #[arg(long)]
    pub seconds: Option<u32>,

    /// Date of the workout (defaults to today)
    #[arg(short, long)]
    pub date: Option<NaiveDate>,
}

#[derive(Clone, Copy, Default, ValueEnum)]
pub enum StatsView {
    /// Monday of this week onwards
    #[default]
    Week,
    /// This calendar month
    Month,
    /// Every month with records, newest first
    History,
}

#[derive(Args)]
pub struct StatsArgs {
    #[arg(value_enum, default_value_t)]
    pub view: StatsView,

    /// Show one past month (with --month)
    #[arg(short, long, requires = "month")]
    pub year: Option<i32>,

    /// Month 1-12 of --year
    #[arg(short, long, requires = "year")]
    pub month: Option<u32>,

    /// Pretend today is this date (YYYY-MM-DD)
    #[arg(long)]
    pub today: Option<NaiveDate>,
}

#[derive(Subcommand)]
pub enum ConfigCmd {
    /// Show all config keys
    List,

    /// Get the value of a key
    Get { key: String },

    /// Set or override a key
    Set { key: String, val: String },

    /// Remove a key
    Unset { key: String },
}

#[derive(Subcommand)]
pub enum AuthCmd {
    /// Log in to the backend and store the token
    Login {
        username: String,
        /// Password (prompted on stdin when omitted)
        #[arg(short, long)]
        password: Option<String>,
    },

    /// Create a backend account
    Register {
        username: String,
        #[arg(short, long)]
        password: Option<String>,
    },

    /// Forget the stored token and profile
    Logout,

    /// Show who is logged in
    Status,

    /// Show or edit the profile
    Profile {
        /// Birth date (YYYY-MM-DD)
        #[arg(long)]
        birth_date: Option<NaiveDate>,

        /// Height in cm
        #[arg(long)]
        height: Option<f64>,

        /// Weight in kg
        #[arg(long)]
        weight: Option<f64>,
    },
}
