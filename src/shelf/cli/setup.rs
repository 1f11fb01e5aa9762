use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "shelf",
    bin_name = "shelf",
    version,
    about = "Lend items to patrons: copies, quotas and waitlists",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Data directory (default: $SHELF_HOME, then the OS data directory)
    #[arg(long, global = true, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Verbose output (debug logging on stderr)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Add an item to the catalog
    Add {
        /// Unique catalog key (e.g. an ISBN)
        key: String,

        /// Title of the work
        title: String,

        #[arg(long, default_value = "")]
        creator: String,

        #[arg(long, default_value = "")]
        category: String,

        /// Publication year
        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        year: i32,

        /// Number of copies owned
        #[arg(long, default_value_t = 1, allow_negative_numbers = true)]
        copies: i64,
    },

    /// Remove an item from the catalog
    #[command(alias = "rm")]
    Remove { key: String },

    /// Show one item with its waitlist
    Show { key: String },

    /// List the catalog
    #[command(alias = "ls")]
    List {
        /// Sort by title, creator, year or key
        #[arg(long, short, default_value = "key")]
        sort: String,
    },

    /// Search the catalog
    Search {
        /// Text to look for
        term: String,

        /// Field to match: title and creator by substring, category exactly
        #[arg(long, value_enum, default_value = "title")]
        by: SearchBy,
    },

    /// Register a patron or administrator
    Register {
        key: String,
        username: String,

        /// Display name (defaults to the username)
        #[arg(long)]
        name: Option<String>,

        #[arg(long, default_value = "")]
        email: String,

        #[arg(long, default_value = "")]
        password: String,

        /// Register an administrator instead of a borrowing patron
        #[arg(long)]
        admin: bool,
    },

    /// Show a patron and their current loans
    Patron { key: String },

    /// Change a patron's loan quota
    Quota { key: String, quota: usize },

    /// Borrow an item for a patron
    Borrow { patron: String, item: String },

    /// Return an item for a patron
    Return { patron: String, item: String },

    /// Put a patron on an item's waitlist
    Wait { patron: String, item: String },

    /// Take the next patron off an item's waitlist
    Next { item: String },

    /// Show catalog statistics
    Stats,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum SearchBy {
    Title,
    Creator,
    Category,
}
