//! Command handlers
//!
//! Each handler resolves its arguments through the session's resolver and
//! returns the rendered output; `main` prints it and maps errors to exit codes.

pub mod accounts;
pub mod config_cmd;
pub mod firewall;
pub mod groups;
pub mod lookup;
pub mod servers;
pub mod util;

use crate::cli::{BasicCommand, Command, OutputFormat, ReadOnlyCommand};
use crate::config::Config;
use crate::resource::{RemoteApi, Resolver, ResourceKind};
use anyhow::Result;

/// State shared by every handler for one invocation
pub struct Session<A> {
    pub resolver: Resolver<A>,
    pub format: OutputFormat,
}

impl<A: RemoteApi> Session<A> {
    pub fn new(resolver: Resolver<A>, format: OutputFormat) -> Self {
        Self { resolver, format }
    }
}

/// Run one API-backed command on behalf of the named client section
pub async fn execute<A: RemoteApi>(
    command: Command,
    session: &mut Session<A>,
    config: &mut Config,
    client: &str,
) -> Result<String> {
    match command {
        Command::Servers { command } => servers::run(command, session).await,
        Command::Groups { command } => groups::run(command, session).await,
        Command::FirewallPolicies { command } => firewall::run_policies(command, session).await,
        Command::FirewallRules { command } => firewall::run_rules(command, session).await,
        Command::Images { command } => basic(command, ResourceKind::Image, session).await,
        Command::Accounts { command } => accounts::run(command, session, config, client).await,
        Command::Cloudips { command } => basic(command, ResourceKind::CloudIp, session).await,
        Command::Lbs { command } => basic(command, ResourceKind::LoadBalancer, session).await,
        Command::Types { command } => read_only(command, ResourceKind::ServerType, session).await,
        Command::Zones { command } => read_only(command, ResourceKind::Zone, session).await,
        Command::Users { command } => read_only(command, ResourceKind::User, session).await,
        Command::Show(args) => lookup::show_any(&args.ids, session).await,
        Command::Config { command } => config_cmd::run(command, config, Some(client), None),
    }
}

async fn basic<A: RemoteApi>(
    command: BasicCommand,
    kind: ResourceKind,
    session: &mut Session<A>,
) -> Result<String> {
    match command {
        BasicCommand::List(args) => util::list(session, kind, &args.ids).await,
        BasicCommand::Show(args) => util::show(session, kind, &args.ids).await,
        BasicCommand::Destroy(args) => util::destroy(session, kind, &args.ids).await,
    }
}

async fn read_only<A: RemoteApi>(
    command: ReadOnlyCommand,
    kind: ResourceKind,
    session: &mut Session<A>,
) -> Result<String> {
    match command {
        ReadOnlyCommand::List(args) => util::list(session, kind, &args.ids).await,
        ReadOnlyCommand::Show(args) => lookup::show_by_id_or_handle(session, kind, &args.ids).await,
    }
}
