use super::{util, Session};
use crate::cli::ServerCommand;
use crate::resource::{RemoteApi, ResourceKind};
use anyhow::Result;

const KIND: ResourceKind = ResourceKind::Server;

pub async fn run<A: RemoteApi>(command: ServerCommand, session: &mut Session<A>) -> Result<String> {
    match command {
        ServerCommand::List(args) => util::list(session, KIND, &args.ids).await,
        ServerCommand::Show(args) => util::show(session, KIND, &args.ids).await,
        ServerCommand::Destroy(args) => util::destroy(session, KIND, &args.ids).await,
        ServerCommand::Start(args) => util::perform(session, KIND, &args.ids, "start", "Starting").await,
        ServerCommand::Stop(args) => util::perform(session, KIND, &args.ids, "stop", "Stopping").await,
        ServerCommand::Reboot(args) => {
            util::perform(session, KIND, &args.ids, "reboot", "Rebooting").await
        }
        ServerCommand::Shutdown(args) => {
            util::perform(session, KIND, &args.ids, "shutdown", "Shutting down").await
        }
        ServerCommand::Reset(args) => util::perform(session, KIND, &args.ids, "reset", "Resetting").await,
    }
}
