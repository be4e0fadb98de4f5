//! CLI command definitions and dispatch

use clap::{Parser, Subcommand};
pub use clap_complete::Shell;

pub mod args;
pub mod auth;
pub mod bulk;
pub mod completions;
pub mod context;
pub mod handlers;
pub mod org;
pub mod record;
pub mod shell;
pub mod status;
pub mod user;

pub use args::{GlobalOptions, GridArgs, OutputFormat};
pub use context::CommandContext;

use crate::client::models::ResourceKind;
use crate::error::Result;

/// adminctl - administration console for users, organizations and ad rules
#[derive(Parser, Debug)]
#[command(name = "adminctl")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Output format (table, json)
    #[arg(
        long,
        global = true,
        env = "ADMINCTL_FORMAT",
        hide_env = true,
        hide_possible_values = true
    )]
    pub format: Option<OutputFormat>,

    /// Override config file location
    #[arg(long, global = true, env = "ADMINCTL_CONFIG", hide_env = true)]
    pub config: Option<String>,

    /// Enable debug logging
    #[arg(long, global = true, env = "ADMINCTL_DEBUG", hide_env = true)]
    pub debug: bool,

    /// Admin API base URL
    #[arg(long, global = true, env = "ADMINCTL_API_URL", hide_env = true)]
    pub api_url: Option<String>,

    /// Identity provider base URL
    #[arg(long, global = true, env = "ADMINCTL_AUTH_URL", hide_env = true)]
    pub auth_url: Option<String>,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Sign in with email and password
    #[command(after_help = "EXAMPLES:\n  \
            adminctl login admin@example.com\n  \
            echo \"$PW\" | adminctl login admin@example.com --password-stdin")]
    Login {
        /// Account email (prompted when omitted)
        email: Option<String>,

        /// Read the password from stdin instead of prompting
        #[arg(long)]
        password_stdin: bool,
    },

    /// Sign out and remove the local session
    Logout,

    /// Show configuration and session status
    Status,

    /// Password recovery
    #[command(subcommand)]
    Password(PasswordCommands),

    /// Confirm an account with the emailed verification code
    VerifyEmail {
        /// Account email
        email: String,

        /// Verification code
        #[arg(long, short = 'c')]
        code: String,
    },

    /// Manage users
    #[command(subcommand)]
    User(UserCommands),

    /// Manage organizations and their members
    #[command(subcommand)]
    Org(OrgCommands),

    /// Manage ad rules
    #[command(subcommand)]
    Rule(RecordCommands),

    /// Manage roles
    #[command(subcommand)]
    Role(RecordCommands),

    /// Manage creatives
    #[command(subcommand)]
    Creative(RecordCommands),

    /// Manage keywords
    #[command(subcommand)]
    Keyword(RecordCommands),

    /// Create users in bulk from a YAML or JSON file
    #[command(after_help = "The file holds a list of users:\n\n  \
            - name: Jane Doe\n    \
              email: jane@example.com\n    \
              organizations: [Acme]")]
    BulkUpload {
        /// Path to the YAML or JSON file
        file: String,

        /// Maximum concurrent creates
        #[arg(long, default_value_t = 4)]
        concurrency: usize,
    },

    /// Interactive session with refresh and inactivity timers
    Shell,

    /// Generate shell completions
    #[command(after_help = "\
  bash:   adminctl completion bash > /etc/bash_completion.d/adminctl
  zsh:    adminctl completion zsh > \"${fpath[1]}/_adminctl\"
  fish:   adminctl completion fish > ~/.config/fish/completions/adminctl.fish")]
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Password recovery subcommands
#[derive(Subcommand, Debug)]
pub enum PasswordCommands {
    /// Email a password reset code
    Forgot {
        /// Account email
        email: String,
    },

    /// Set a new password using a reset code
    Reset {
        /// Account email
        email: String,

        /// Reset code from the email
        #[arg(long, short = 'c')]
        code: String,
    },
}

/// User management subcommands
#[derive(Subcommand, Debug)]
pub enum UserCommands {
    /// List users
    #[command(visible_alias = "ls")]
    List {
        #[command(flatten)]
        grid: GridArgs,

        /// Include soft-deleted users
        #[arg(long)]
        all: bool,
    },

    /// Show one user
    Get {
        /// User ID
        id: String,
    },

    /// Create a user
    #[command(after_help = "EXAMPLES:\n  \
            adminctl user create --name \"Jane Doe\" --email jane@example.com\n  \
            adminctl user create --name Jane --email jane@example.com --org Acme,Globex")]
    Create {
        #[arg(long)]
        name: String,

        #[arg(long)]
        email: String,

        /// Organization names, comma-separated or repeated
        #[arg(long = "org", value_delimiter = ',')]
        organizations: Vec<String>,
    },

    /// Update a user's name, email or organizations
    Update {
        /// User ID
        id: String,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        email: Option<String>,

        /// Replace organization names, comma-separated or repeated
        #[arg(long = "org", value_delimiter = ',')]
        organizations: Option<Vec<String>>,
    },

    /// Delete a user
    Delete {
        /// User ID
        id: String,

        /// Skip confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
    },
}

/// Organization management subcommands
#[derive(Subcommand, Debug)]
pub enum OrgCommands {
    /// List organizations
    #[command(visible_alias = "ls")]
    List {
        #[command(flatten)]
        grid: GridArgs,
    },

    /// Show one organization with its members
    Get {
        /// Organization ID
        id: String,
    },

    /// Create an organization
    Create {
        #[arg(long)]
        name: String,

        #[arg(long)]
        slug: Option<String>,
    },

    /// Rename an organization or change its slug
    Update {
        /// Organization ID
        id: String,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        slug: Option<String>,
    },

    /// Delete an organization
    Delete {
        /// Organization ID
        id: String,

        /// Skip confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
    },

    /// Add a user to an organization
    AddUser {
        /// Organization ID
        org_id: String,

        /// User ID
        user_id: String,
    },

    /// Remove a user from an organization
    RemoveUser {
        /// Organization ID
        org_id: String,

        /// User ID
        user_id: String,
    },
}

/// Subcommands shared by rules, roles, creatives and keywords
#[derive(Subcommand, Debug)]
pub enum RecordCommands {
    /// List records
    #[command(visible_alias = "ls")]
    List {
        #[command(flatten)]
        grid: GridArgs,
    },

    /// Show one record
    Get {
        /// Record ID
        id: String,
    },

    /// Create a record from key=value fields
    #[command(after_help = "Values are parsed as JSON when possible:\n  \
            adminctl rule create --set name=\"No gambling\" --set priority=3 --set enabled=true")]
    Create {
        /// Field to set, as key=value (repeatable)
        #[arg(long = "set", value_name = "KEY=VALUE", required = true)]
        fields: Vec<String>,
    },

    /// Change fields of a record
    Update {
        /// Record ID
        id: String,

        /// Field to set, as key=value (repeatable)
        #[arg(long = "set", value_name = "KEY=VALUE", required = true)]
        fields: Vec<String>,
    },

    /// Delete a record
    Delete {
        /// Record ID
        id: String,

        /// Skip confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
    },
}

/// Run a command that needs a session context.
///
/// `Login`, `Logout`, `Status` and `Completion` without a context are handled
/// by the caller.
pub async fn execute(ctx: &CommandContext, command: Commands) -> Result<()> {
    match command {
        Commands::Login {
            email,
            password_stdin,
        } => auth::login(ctx, email, password_stdin).await,
        Commands::Password(cmd) => match cmd {
            PasswordCommands::Forgot { email } => auth::forgot_password(ctx, &email).await,
            PasswordCommands::Reset { email, code } => {
                auth::reset_password(ctx, &email, &code).await
            }
        },
        Commands::VerifyEmail { email, code } => auth::verify_email(ctx, &email, &code).await,
        Commands::User(cmd) => user::run(ctx, cmd).await,
        Commands::Org(cmd) => org::run(ctx, cmd).await,
        Commands::Rule(cmd) => record::run(ctx, ResourceKind::Rule, cmd).await,
        Commands::Role(cmd) => record::run(ctx, ResourceKind::Role, cmd).await,
        Commands::Creative(cmd) => record::run(ctx, ResourceKind::Creative, cmd).await,
        Commands::Keyword(cmd) => record::run(ctx, ResourceKind::Keyword, cmd).await,
        Commands::BulkUpload { file, concurrency } => bulk::run(ctx, &file, concurrency).await,
        Commands::Shell => shell::run(ctx).await,
        Commands::Logout => auth::logout(ctx),
        Commands::Status => status::run(&ctx.options),
        Commands::Completion { shell } => {
            completions::print(shell);
            Ok(())
        }
    }
}
