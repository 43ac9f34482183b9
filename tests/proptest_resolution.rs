//! Property-based tests using proptest
//!
//! These tests check identifier classification, result ordering and the
//! partitioning done by tolerant lookups against randomized inputs.

use async_trait::async_trait;
use bbox::api::ApiResult;
use bbox::resource::order::sort_by_attribute;
use bbox::resource::{
    classify, FindOptions, RemoteApi, Resolver, Resource, ResourceKind, Selector,
};
use proptest::prelude::*;
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

/// Generate an identifier of a known kind
fn arb_identifier() -> impl Strategy<Value = (ResourceKind, String)> {
    (
        prop::sample::select(ResourceKind::ALL.to_vec()),
        "[a-z0-9]{5}",
    )
        .prop_map(|(kind, suffix)| (kind, format!("{}-{}", kind.prefix(), suffix)))
}

/// Attribute values of mixed and sometimes incomparable types
fn arb_attribute() -> impl Strategy<Value = Option<Value>> {
    prop_oneof![
        Just(None),
        any::<i32>().prop_map(|n| Some(json!(n))),
        "[a-z]{0,6}".prop_map(|s| Some(json!(s))),
        any::<bool>().prop_map(|b| Some(json!(b))),
        Just(Some(Value::Null)),
    ]
}

fn group(n: usize, attribute: Option<Value>) -> Resource {
    let mut value = json!({"id": format!("grp-{:05}", n)});
    if let Some(attribute) = attribute {
        value["rank"] = attribute;
    }
    Resource::from_remote(ResourceKind::ServerGroup, value).unwrap()
}

mod classification {
    use super::*;

    proptest! {
        #[test]
        fn known_prefix_classifies(
            (kind, id) in arb_identifier()
        ) {
            prop_assert_eq!(classify(&id), Some(kind));
        }

        #[test]
        fn no_separator_is_unclassified(s in "[a-z0-9]{0,12}") {
            prop_assert_eq!(classify(&s), None);
        }

        #[test]
        fn classification_ignores_suffix(
            (kind, id) in arb_identifier(),
            tail in "[-a-zA-Z0-9]{0,8}"
        ) {
            let longer = format!("{}{}", id, tail);
            prop_assert_eq!(classify(&longer), Some(kind));
        }
    }
}

mod ordering {
    use super::*;

    proptest! {
        #[test]
        fn sort_is_a_permutation(attrs in prop::collection::vec(arb_attribute(), 0..40)) {
            let mut resources: Vec<Resource> = attrs
                .into_iter()
                .enumerate()
                .map(|(n, a)| group(n, a))
                .collect();
            let before: HashSet<String> = resources.iter().map(|r| r.id().to_string()).collect();

            sort_by_attribute(&mut resources, "rank");

            let after: HashSet<String> = resources.iter().map(|r| r.id().to_string()).collect();
            prop_assert_eq!(before, after);
        }

        #[test]
        fn comparable_values_come_out_sorted_and_stable(
            ranks in prop::collection::vec(0i32..5, 0..40)
        ) {
            let mut resources: Vec<Resource> = ranks
                .iter()
                .enumerate()
                .map(|(n, r)| group(n, Some(json!(r))))
                .collect();

            sort_by_attribute(&mut resources, "rank");

            let keys: Vec<(i64, String)> = resources
                .iter()
                .map(|r| {
                    let rank = r.attribute("rank").unwrap().and_then(|v| v.as_i64()).unwrap();
                    (rank, r.id().to_string())
                })
                .collect();
            let mut expected = keys.clone();
            expected.sort();
            prop_assert_eq!(keys, expected);
        }
    }
}

/// API knowing a fixed set of server groups, counting member lookups
struct KnownGroups {
    known: HashSet<String>,
    /// `created_at` per id, where one is set
    created_at: HashMap<String, String>,
    gets: Mutex<usize>,
}

impl KnownGroups {
    fn representation(&self, id: &str) -> Value {
        match self.created_at.get(id) {
            Some(created_at) => json!({"id": id, "created_at": created_at}),
            None => json!({"id": id}),
        }
    }
}

#[async_trait]
impl RemoteApi for KnownGroups {
    async fn list(&self, _kind: ResourceKind) -> ApiResult<Vec<Value>> {
        Ok(self.known.iter().map(|id| self.representation(id)).collect())
    }

    async fn get(&self, _kind: ResourceKind, id: &str) -> ApiResult<Option<Value>> {
        *self.gets.lock().unwrap() += 1;
        Ok(self.known.contains(id).then(|| self.representation(id)))
    }

    async fn create(&self, _kind: ResourceKind, attributes: &Value) -> ApiResult<Value> {
        Ok(attributes.clone())
    }

    async fn destroy(&self, _kind: ResourceKind, _id: &str) -> ApiResult<()> {
        Ok(())
    }

    async fn perform(&self, _kind: ResourceKind, id: &str, _action: &str) -> ApiResult<Value> {
        Ok(json!({"id": id}))
    }
}

mod tolerant_lookup {
    use super::*;

    proptest! {
        #[test]
        fn found_and_missed_partition_the_input(
            known in prop::collection::hash_set(0u8..20, 0..10),
            requested in prop::collection::vec(0u8..20, 1..30)
        ) {
            let id = |n: &u8| format!("grp-{:05}", n);
            let api = KnownGroups {
                known: known.iter().map(id).collect(),
                created_at: HashMap::new(),
                gets: Mutex::new(0),
            };
            let ids: Vec<String> = requested.iter().map(id).collect();
            let mut resolver = Resolver::new(api);
            let mut missed = Vec::new();

            let found = tokio_test::block_on(resolver.find_or_call(
                ResourceKind::ServerGroup,
                &ids,
                |id| missed.push(id.to_string()),
            ))
            .unwrap();

            // Every request lands on exactly one side, in input order
            let expected_found: Vec<&String> =
                ids.iter().filter(|i| resolver.api().known.contains(*i)).collect();
            let expected_missed: Vec<&String> =
                ids.iter().filter(|i| !resolver.api().known.contains(*i)).collect();
            let found_ids: Vec<&str> = found.iter().map(|r| r.id()).collect();

            prop_assert_eq!(found_ids, expected_found.iter().map(|s| s.as_str()).collect::<Vec<_>>());
            prop_assert_eq!(missed.iter().collect::<Vec<_>>(), expected_missed);

            // One request per distinct identifier, never more
            let distinct: HashSet<&String> = ids.iter().collect();
            prop_assert_eq!(*resolver.api().gets.lock().unwrap(), distinct.len());
        }
    }
}

/// Creation days in arbitrary order, plus a shuffled request over all of them
fn arb_dated_request() -> impl Strategy<Value = (Vec<u32>, Vec<usize>)> {
    prop::collection::vec(0u32..3650, 1..20).prop_flat_map(|days| {
        let order: Vec<usize> = (0..days.len()).collect();
        (Just(days), Just(order).prop_shuffle())
    })
}

mod strict_lookup {
    use super::*;

    proptest! {
        #[test]
        fn many_ids_come_back_in_input_order((days, order) in arb_dated_request()) {
            let id = |n: usize| format!("grp-{:05}", n);
            let created_at = days
                .iter()
                .enumerate()
                .map(|(n, day)| {
                    let stamp = chrono::DateTime::from_timestamp(i64::from(*day) * 86_400, 0)
                        .unwrap()
                        .to_rfc3339();
                    (id(n), stamp)
                })
                .collect();
            let api = KnownGroups {
                known: (0..days.len()).map(id).collect(),
                created_at,
                gets: Mutex::new(0),
            };
            let ids: Vec<String> = order.iter().map(|n| id(*n)).collect();
            let mut resolver = Resolver::new(api);

            let found = tokio_test::block_on(resolver.find(
                ResourceKind::ServerGroup,
                Some(Selector::Many(ids.clone())),
                &FindOptions::default(),
            ))
            .unwrap()
            .into_vec();

            let found_ids: Vec<&str> = found.iter().map(|r| r.id()).collect();
            prop_assert_eq!(found_ids, ids.iter().map(|s| s.as_str()).collect::<Vec<_>>());
        }
    }
}
