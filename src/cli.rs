//! Command-line definition

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing::Level;

/// Command-line client for the Brightbox cloud
#[derive(Parser, Debug)]
#[command(name = "bbox", version, about, long_about = None)]
pub struct Cli {
    /// Account to operate on (defaults to the configured account)
    #[arg(short, long, global = true, env = "BRIGHTBOX_ACCOUNT")]
    pub account: Option<String>,

    /// Configured client section to use (defaults to `default_client`)
    #[arg(long, global = true, env = "BRIGHTBOX_CLIENT")]
    pub client: Option<String>,

    /// API endpoint
    #[arg(long, global = true, env = "BRIGHTBOX_API_URL")]
    pub api_url: Option<String>,

    /// API client identifier, overriding the configured credentials
    #[arg(long, global = true, env = "BRIGHTBOX_CLIENT_ID")]
    pub client_id: Option<String>,

    /// API client secret
    #[arg(long, global = true, env = "BRIGHTBOX_SECRET", hide_env_values = true)]
    pub secret: Option<String>,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value = "table")]
    pub output: OutputFormat,

    /// Log level for debugging
    #[arg(long, global = true, value_enum, default_value = "warn")]
    pub log_level: LogLevel,

    /// Write logs to this file instead of stderr
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
    Yaml,
    /// One identifier per line
    Plain,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_tracing_level(self) -> Option<Level> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some(Level::ERROR),
            LogLevel::Warn => Some(Level::WARN),
            LogLevel::Info => Some(Level::INFO),
            LogLevel::Debug => Some(Level::DEBUG),
            LogLevel::Trace => Some(Level::TRACE),
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Manage servers
    Servers {
        #[command(subcommand)]
        command: ServerCommand,
    },
    /// Manage server groups
    Groups {
        #[command(subcommand)]
        command: GroupCommand,
    },
    /// Manage firewall policies
    FirewallPolicies {
        #[command(subcommand)]
        command: PolicyCommand,
    },
    /// Manage firewall rules
    FirewallRules {
        #[command(subcommand)]
        command: RuleCommand,
    },
    /// Manage server images
    Images {
        #[command(subcommand)]
        command: BasicCommand,
    },
    /// Manage accounts
    Accounts {
        #[command(subcommand)]
        command: AccountCommand,
    },
    /// Manage cloud IPs
    Cloudips {
        #[command(subcommand)]
        command: BasicCommand,
    },
    /// Manage load balancers
    Lbs {
        #[command(subcommand)]
        command: BasicCommand,
    },
    /// List server types
    Types {
        #[command(subcommand)]
        command: ReadOnlyCommand,
    },
    /// List zones
    Zones {
        #[command(subcommand)]
        command: ReadOnlyCommand,
    },
    /// List users
    Users {
        #[command(subcommand)]
        command: ReadOnlyCommand,
    },
    /// Show any resources, whatever their kind
    Show(Ids),
    /// Inspect or change the local configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

/// Optional list of identifiers; none means all
#[derive(Args, Debug, Clone)]
pub struct MaybeIds {
    pub ids: Vec<String>,
}

/// Required list of identifiers
#[derive(Args, Debug, Clone)]
pub struct Ids {
    #[arg(required = true)]
    pub ids: Vec<String>,
}

#[derive(Subcommand, Debug)]
pub enum ServerCommand {
    /// List servers
    List(MaybeIds),
    /// Show detailed server info
    Show(Ids),
    /// Destroy servers
    Destroy(Ids),
    /// Start servers
    Start(Ids),
    /// Stop servers
    Stop(Ids),
    /// Reboot servers
    Reboot(Ids),
    /// Issue an ACPI shutdown to servers
    Shutdown(Ids),
    /// Hard reset servers
    Reset(Ids),
}

#[derive(Subcommand, Debug)]
pub enum GroupCommand {
    /// List server groups
    List(MaybeIds),
    /// Show detailed server group info
    Show(Ids),
    /// Create a server group
    Create {
        /// Name of the group
        #[arg(short, long)]
        name: Option<String>,
        /// Description of the group
        #[arg(short, long)]
        description: Option<String>,
    },
    /// Destroy server groups
    Destroy(Ids),
}

#[derive(Subcommand, Debug)]
pub enum PolicyCommand {
    /// List firewall policies
    List(MaybeIds),
    /// Show detailed firewall policy info
    Show(Ids),
    /// Create a firewall policy
    Create {
        /// Name of the policy
        #[arg(short, long)]
        name: Option<String>,
        /// Server group the policy applies to
        #[arg(short = 'g', long)]
        server_group: Option<String>,
    },
    /// Destroy firewall policies
    Destroy(Ids),
}

#[derive(Subcommand, Debug)]
pub enum RuleCommand {
    /// List the rules of a firewall policy
    List {
        /// Firewall policy id
        policy: String,
    },
    /// Show detailed firewall rule info
    Show(Ids),
    /// Create a firewall rule
    Create(RuleCreateArgs),
    /// Destroy firewall rules
    Destroy(Ids),
}

#[derive(Args, Debug, Clone)]
pub struct RuleCreateArgs {
    /// Firewall policy id
    pub policy: String,

    /// Protocol - [tcp/udp/all/Protocol numbers]
    #[arg(short, long)]
    pub protocol: Option<String>,

    /// Source - IP address (CIDR notation or 'any'), server group, server identifier
    #[arg(short, long)]
    pub source: Option<String>,

    /// Source port
    #[arg(short = 'c', long)]
    pub sport: Option<String>,

    /// Destination - IP address (CIDR notation or 'any'), server group, server identifier
    #[arg(short, long)]
    pub destination: Option<String>,

    /// Destination port
    #[arg(short = 'e', long)]
    pub dport: Option<String>,

    /// ICMP type name
    #[arg(short, long)]
    pub icmptype: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum BasicCommand {
    /// List resources
    List(MaybeIds),
    /// Show detailed info
    Show(Ids),
    /// Destroy resources
    Destroy(Ids),
}

#[derive(Subcommand, Debug)]
pub enum ReadOnlyCommand {
    /// List resources
    List(MaybeIds),
    /// Show detailed info, by id or handle
    Show(Ids),
}

#[derive(Subcommand, Debug)]
pub enum AccountCommand {
    /// List accounts
    List(MaybeIds),
    /// Show detailed account info
    Show(Ids),
    /// Show or set the default account
    Default {
        /// Account to make the default
        id: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Show the configuration and every client section
    Show,
    /// Change one value of the selected client, or a global setting
    Set {
        key: ConfigKey,
        value: String,
    },
    /// Add an API client section and make it the default if there is none
    ClientAdd {
        /// API client identifier (`cli-xxxxx`)
        id: String,
        client_secret: String,
    },
    /// Add a user application section, named after the user's email
    UserAdd {
        email: String,
        app_id: String,
        app_secret: String,
        refresh_token: String,
    },
    /// Remove a client section and its saved token
    ClientRemove {
        name: String,
    },
}

/// Settable configuration keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ConfigKey {
    ApiUrl,
    AuthUrl,
    ClientId,
    Secret,
    AppId,
    AppSecret,
    RefreshToken,
    DefaultAccount,
    /// Global: section used when `--client` isn't given
    DefaultClient,
    /// Global: HTTP request timeout
    TimeoutSecs,
}
