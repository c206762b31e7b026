use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use crisp_core::ResourceKind;

#[derive(Parser)]
#[command(name = "crisp")]
#[command(about = "Work with CRISP threat-intelligence resources from the command line")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// CLI profile name (defaults to the active profile)
    #[arg(long, global = true, value_name = "NAME")]
    pub profile: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Authenticate against the backend
    Auth {
        #[command(subcommand)]
        command: AuthCommands,
    },
    /// List records of a resource
    #[command(alias = "ls")]
    List(ListArgs),
    /// Show one record
    Show {
        /// Resource kind (users, organizations, indicators, ...)
        resource: ResourceKind,
        /// Record ID or unique ID prefix
        id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Create a record from a JSON payload
    Create {
        /// Resource kind
        resource: ResourceKind,
        /// JSON object with the record fields
        #[arg(long, value_name = "JSON")]
        data: String,
        /// Output the created record as JSON
        #[arg(long)]
        json: bool,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Update a record from a JSON payload
    Update {
        /// Resource kind
        resource: ResourceKind,
        /// Record ID or unique ID prefix
        id: String,
        /// JSON object with the changed fields
        #[arg(long, value_name = "JSON")]
        data: String,
        /// Output the updated record as JSON
        #[arg(long)]
        json: bool,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Deactivate a record (soft disable, requires confirmation)
    Deactivate {
        /// Resource kind
        resource: ResourceKind,
        /// Record ID or unique ID prefix
        id: String,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Reactivate a previously deactivated record
    Reactivate {
        /// Resource kind
        resource: ResourceKind,
        /// Record ID or unique ID prefix
        id: String,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Permanently delete records (requires confirmation)
    #[command(alias = "rm")]
    Delete {
        /// Resource kind
        resource: ResourceKind,
        /// One or more record IDs or unique ID prefixes
        #[arg(required = true)]
        ids: Vec<String>,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Accept or decline a pending trust relationship
    Respond {
        /// Trust relationship ID or unique ID prefix
        id: String,
        /// Decision
        #[arg(value_enum)]
        decision: TrustDecision,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Mark a notification as read
    MarkRead {
        /// Notification ID or unique ID prefix
        id: String,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Poll for server-side changes and report refreshes
    Watch {
        /// Resource kind to watch
        resource: ResourceKind,
        /// Override the poll interval in seconds
        #[arg(long, value_name = "SECS")]
        interval: Option<u64>,
    },
    /// Configure CLI profiles
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
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

#[derive(Args)]
pub struct ListArgs {
    /// Resource kind (users, organizations, indicators, ...)
    pub resource: ResourceKind,
    /// Case-insensitive text search
    #[arg(short, long)]
    pub search: Option<String>,
    /// Field filter, repeatable (key=value)
    #[arg(long = "filter", value_name = "KEY=VALUE")]
    pub filters: Vec<String>,
    /// Sort by a record field
    #[arg(long, value_name = "FIELD")]
    pub sort: Option<String>,
    /// Reverse the sort direction
    #[arg(long, requires = "sort")]
    pub desc: bool,
    /// Page number
    #[arg(short, long, default_value = "1")]
    pub page: usize,
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum AuthCommands {
    /// Sign in with username/password and store the session in the keychain
    Login {
        /// Account username
        #[arg(long, value_name = "USERNAME")]
        username: String,
        /// Account password
        #[arg(long, value_name = "PASSWORD")]
        password: String,
    },
    /// Show the stored session, if any
    Status,
    /// Sign out and clear the stored session
    Logout,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Initialize or update a profile
    Init {
        /// Backend base URL, e.g. <https://crisp.example.com>
        #[arg(long, value_name = "URL")]
        base_url: Option<String>,
        /// Response envelope shape (bare, data, keyed)
        #[arg(long, value_name = "SHAPE")]
        envelope: Option<String>,
        /// Background poll interval in seconds
        #[arg(long, value_name = "SECS")]
        poll_interval_secs: Option<u64>,
        /// List page size
        #[arg(long, value_name = "N")]
        items_per_page: Option<usize>,
        /// Keep the current active profile instead of activating this one
        #[arg(long)]
        no_activate: bool,
    },
    /// Print the resolved profile configuration
    Show,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum TrustDecision {
    Accept,
    Decline,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum CompletionShell {
    Bash,
    Zsh,
    Fish,
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn command_tree_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn list_accepts_resource_aliases() {
        let cli = Cli::try_parse_from(["crisp", "list", "iocs", "--search", "apt29"]).unwrap();
        match cli.command {
            Commands::List(args) => {
                assert_eq!(args.resource, ResourceKind::Indicators);
                assert_eq!(args.search.as_deref(), Some("apt29"));
                assert_eq!(args.page, 1);
            }
            _ => panic!("expected list command"),
        }
    }

    #[test]
    fn delete_requires_at_least_one_id() {
        assert!(Cli::try_parse_from(["crisp", "delete", "indicators"]).is_err());
        assert!(Cli::try_parse_from(["crisp", "delete", "indicators", "abc", "def"]).is_ok());
    }

    #[test]
    fn every_mutating_command_accepts_yes() {
        let payload = r#"{"value": "198.51.100.7"}"#;
        let cases: [&[&str]; 7] = [
            &["crisp", "create", "indicators", "--data", payload, "--yes"],
            &["crisp", "update", "indicators", "abc", "--data", payload, "--yes"],
            &["crisp", "deactivate", "users", "abc", "--yes"],
            &["crisp", "reactivate", "users", "abc", "--yes"],
            &["crisp", "delete", "indicators", "abc", "--yes"],
            &["crisp", "respond", "abc", "accept", "--yes"],
            &["crisp", "mark-read", "abc", "--yes"],
        ];
        for case in cases {
            assert!(Cli::try_parse_from(case).is_ok(), "failed: {case:?}");
        }
    }

    #[test]
    fn desc_requires_sort() {
        assert!(Cli::try_parse_from(["crisp", "list", "users", "--desc"]).is_err());
        assert!(Cli::try_parse_from(["crisp", "list", "users", "--sort", "email", "--desc"]).is_ok());
    }
}
