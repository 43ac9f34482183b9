//! Firewall policies and the rules that hang off them

use super::{util, Session};
use crate::cli::{PolicyCommand, RuleCommand, RuleCreateArgs};
use crate::output::render_list;
use crate::resource::identifier::is_kind;
use crate::resource::{RemoteApi, Resource, ResourceKind};
use anyhow::{bail, Result};
use serde_json::{Map, Value};

const POLICY: ResourceKind = ResourceKind::FirewallPolicy;
const RULE: ResourceKind = ResourceKind::FirewallRule;

pub async fn run_policies<A: RemoteApi>(
    command: PolicyCommand,
    session: &mut Session<A>,
) -> Result<String> {
    match command {
        PolicyCommand::List(args) => util::list(session, POLICY, &args.ids).await,
        PolicyCommand::Show(args) => util::show(session, POLICY, &args.ids).await,
        PolicyCommand::Create { name, server_group } => {
            let mut attributes = Map::new();
            if let Some(name) = name {
                attributes.insert("name".to_string(), Value::String(name));
            }
            if let Some(group) = server_group {
                let group = session.resolver.find_one(ResourceKind::ServerGroup, &group).await?;
                attributes.insert("server_group".to_string(), Value::String(group.id().to_string()));
            }

            eprintln!("Creating a new firewall policy");
            let policy = session
                .resolver
                .create(POLICY, &Value::Object(attributes))
                .await?;
            render_list(session.format, POLICY, &[policy])
        }
        PolicyCommand::Destroy(args) => util::destroy(session, POLICY, &args.ids).await,
    }
}

pub async fn run_rules<A: RemoteApi>(command: RuleCommand, session: &mut Session<A>) -> Result<String> {
    match command {
        RuleCommand::List { policy } => {
            let rules = policy_rules(session, &policy).await?;
            render_list(session.format, RULE, &rules)
        }
        RuleCommand::Show(args) => util::show(session, RULE, &args.ids).await,
        RuleCommand::Create(args) => create_rule(session, args).await,
        RuleCommand::Destroy(args) => util::destroy(session, RULE, &args.ids).await,
    }
}

/// Rules embedded in the policy's representation, in the order the API gave them
async fn policy_rules<A: RemoteApi>(session: &mut Session<A>, policy: &str) -> Result<Vec<Resource>> {
    let policy = session.resolver.find_one(POLICY, policy).await?;

    let Some(Value::Array(rules)) = policy.attribute("rules")? else {
        return Ok(Vec::new());
    };

    let mut resources = Vec::with_capacity(rules.len());
    for rule in rules {
        resources.push(session.resolver.wrap_value(RULE, rule.clone())?);
    }
    Ok(resources)
}

async fn create_rule<A: RemoteApi>(session: &mut Session<A>, args: RuleCreateArgs) -> Result<String> {
    if !is_kind(&args.policy, POLICY) {
        bail!("Invalid firewall policy id '{}'", args.policy);
    }
    let policy = session.resolver.find_one(POLICY, &args.policy).await?;

    let attributes = rule_attributes(policy.id(), &args);

    eprintln!("Creating a new firewall rule");
    let rule = session.resolver.create(RULE, &attributes).await?;
    render_list(session.format, RULE, &[rule])
}

fn rule_attributes(policy_id: &str, args: &RuleCreateArgs) -> Value {
    let mut attributes = Map::new();
    attributes.insert("firewall_policy".to_string(), Value::String(policy_id.to_string()));

    let optional = [
        ("protocol", &args.protocol),
        ("source", &args.source),
        ("source_port", &args.sport),
        ("destination", &args.destination),
        ("destination_port", &args.dport),
        ("icmp_type_name", &args.icmptype),
    ];
    for (key, value) in optional {
        if let Some(value) = value {
            attributes.insert(key.to_string(), Value::String(value.clone()));
        }
    }

    Value::Object(attributes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_attributes_skip_unset_flags() {
        let args = RuleCreateArgs {
            policy: "fwp-12345".to_string(),
            protocol: Some("tcp".to_string()),
            source: None,
            sport: None,
            destination: Some("any".to_string()),
            dport: Some("22".to_string()),
            icmptype: None,
        };

        let attrs = rule_attributes("fwp-12345", &args);
        assert_eq!(attrs["firewall_policy"], "fwp-12345");
        assert_eq!(attrs["protocol"], "tcp");
        assert_eq!(attrs["destination_port"], "22");
        assert!(attrs.get("source").is_none());
        assert!(attrs.get("icmp_type_name").is_none());
    }
}
