use super::{util, Session};
use crate::cli::GroupCommand;
use crate::output::render_list;
use crate::resource::{RemoteApi, ResourceKind};
use anyhow::Result;
use serde_json::{Map, Value};

const KIND: ResourceKind = ResourceKind::ServerGroup;

pub async fn run<A: RemoteApi>(command: GroupCommand, session: &mut Session<A>) -> Result<String> {
    match command {
        GroupCommand::List(args) => util::list(session, KIND, &args.ids).await,
        GroupCommand::Show(args) => util::show(session, KIND, &args.ids).await,
        GroupCommand::Create { name, description } => {
            let mut attributes = Map::new();
            if let Some(name) = name {
                attributes.insert("name".to_string(), Value::String(name));
            }
            if let Some(description) = description {
                attributes.insert("description".to_string(), Value::String(description));
            }

            eprintln!("Creating a new server group");
            let group = session
                .resolver
                .create(KIND, &Value::Object(attributes))
                .await?;
            render_list(session.format, KIND, &[group])
        }
        GroupCommand::Destroy(args) => util::destroy(session, KIND, &args.ids).await,
    }
}
