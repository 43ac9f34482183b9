//! Integration tests for the API client using wiremock
//!
//! These tests run the real HTTP client against mocked endpoints: the token
//! exchange for both grants, tokens reused from disk, collection and member
//! URLs, status code mapping and the one retry on an expired token.

use bbox::api::auth::{Grant, TokenStore};
use bbox::api::client::ApiClient;
use bbox::api::ApiError;
use bbox::resource::{RemoteApi, Resolver, ResourceKind};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{
    basic_auth, bearer_token, body_partial_json, method, path, query_param,
    query_param_is_missing,
};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_token(server: &MockServer, token: &str) {
    Mock::given(method("POST"))
        .and(path("/token"))
        .and(basic_auth("cli-12345", "s3cret"))
        .and(body_partial_json(json!({"grant_type": "client_credentials"})))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"access_token": token, "expires_in": 7200})),
        )
        .mount(server)
        .await;
}

fn client(server: &MockServer) -> ApiClient {
    ApiClient::new(
        &server.uri(),
        "cli-12345",
        "s3cret",
        Some("acc-12345"),
        Duration::from_secs(5),
    )
    .expect("client should build")
}

mod api_client_tests {
    use super::*;

    /// Collection request is scoped to the account and authenticated
    #[tokio::test]
    async fn test_list_servers() {
        let server = MockServer::start().await;
        mount_token(&server, "tok-1").await;

        Mock::given(method("GET"))
            .and(path("/1.0/servers"))
            .and(query_param("account_id", "acc-12345"))
            .and(bearer_token("tok-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"id": "srv-aaaaa", "status": "active"},
                {"id": "srv-bbbbb", "status": "inactive"}
            ])))
            .mount(&server)
            .await;

        let items = client(&server).list(ResourceKind::Server).await.unwrap();

        assert_eq!(items.len(), 2);
        assert_eq!(items[1]["status"], "inactive");
    }

    /// Accounts aren't account scoped
    #[tokio::test]
    async fn test_accounts_are_not_scoped() {
        let server = MockServer::start().await;
        mount_token(&server, "tok-1").await;

        Mock::given(method("GET"))
            .and(path("/1.0/accounts"))
            .and(query_param_is_missing("account_id"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": "acc-12345"}])))
            .expect(1)
            .mount(&server)
            .await;

        let items = client(&server).list(ResourceKind::Account).await.unwrap();
        assert_eq!(items[0]["id"], "acc-12345");
    }

    /// A 404 on a member lookup is an absent result, not an error
    #[tokio::test]
    async fn test_get_missing_is_none() {
        let server = MockServer::start().await;
        mount_token(&server, "tok-1").await;

        Mock::given(method("GET"))
            .and(path("/1.0/servers/srv-zzzzz"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "error_name": "missing_resource",
                "errors": ["Resource not found"]
            })))
            .mount(&server)
            .await;

        let got = client(&server)
            .get(ResourceKind::Server, "srv-zzzzz")
            .await
            .unwrap();
        assert!(got.is_none());
    }

    /// 409 on destroy is a conflict the caller can report and move past
    #[tokio::test]
    async fn test_destroy_conflict() {
        let server = MockServer::start().await;
        mount_token(&server, "tok-1").await;

        Mock::given(method("DELETE"))
            .and(path("/1.0/server_groups/grp-aaaaa"))
            .respond_with(ResponseTemplate::new(409).set_body_json(json!({
                "error_name": "conflict",
                "errors": ["Cannot delete the default server group"]
            })))
            .mount(&server)
            .await;

        let err = client(&server)
            .destroy(ResourceKind::ServerGroup, "grp-aaaaa")
            .await
            .unwrap_err();

        match err {
            ApiError::Conflict(message) => assert!(message.contains("default server group")),
            other => panic!("expected a conflict, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_403_is_forbidden() {
        let server = MockServer::start().await;
        mount_token(&server, "tok-1").await;

        Mock::given(method("GET"))
            .and(path("/1.0/images"))
            .respond_with(ResponseTemplate::new(403).set_body_json(json!({
                "error_name": "forbidden",
                "errors": ["You do not have permission"]
            })))
            .mount(&server)
            .await;

        let err = client(&server).list(ResourceKind::Image).await.unwrap_err();
        assert!(matches!(err, ApiError::Forbidden(_)));
    }

    /// A collection answered with an object is a malformed response
    #[tokio::test]
    async fn test_list_of_wrong_shape() {
        let server = MockServer::start().await;
        mount_token(&server, "tok-1").await;

        Mock::given(method("GET"))
            .and(path("/1.0/images"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "img-aaaaa"})))
            .mount(&server)
            .await;

        let err = client(&server).list(ResourceKind::Image).await.unwrap_err();
        match err {
            ApiError::UnexpectedResponse(message) => {
                assert!(message.contains("images"));
                assert!(message.contains("an object"));
            }
            other => panic!("expected a malformed response, got {:?}", other),
        }
    }

    /// Member actions return 202 with an empty body
    #[tokio::test]
    async fn test_perform_action() {
        let server = MockServer::start().await;
        mount_token(&server, "tok-1").await;

        Mock::given(method("POST"))
            .and(path("/1.0/servers/srv-aaaaa/reboot"))
            .and(query_param("account_id", "acc-12345"))
            .respond_with(ResponseTemplate::new(202))
            .expect(1)
            .mount(&server)
            .await;

        let response = client(&server)
            .perform(ResourceKind::Server, "srv-aaaaa", "reboot")
            .await
            .unwrap();
        assert!(response.is_null());
    }

    #[tokio::test]
    async fn test_create_posts_attributes() {
        let server = MockServer::start().await;
        mount_token(&server, "tok-1").await;

        Mock::given(method("POST"))
            .and(path("/1.0/server_groups"))
            .and(body_partial_json(json!({"name": "web"})))
            .respond_with(
                ResponseTemplate::new(201).set_body_json(json!({"id": "grp-new01", "name": "web"})),
            )
            .mount(&server)
            .await;

        let created = client(&server)
            .create(ResourceKind::ServerGroup, &json!({"name": "web"}))
            .await
            .unwrap();
        assert_eq!(created["id"], "grp-new01");
    }
}

mod auth_tests {
    use super::*;

    /// Rejected client credentials are an authentication error
    #[tokio::test]
    async fn test_bad_credentials() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(
                ResponseTemplate::new(401).set_body_json(json!({"error": "invalid_client"})),
            )
            .mount(&server)
            .await;

        let err = client(&server).list(ResourceKind::Server).await.unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized(_)));
    }

    /// The token is fetched once and reused across requests
    #[tokio::test]
    async fn test_token_is_cached() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"access_token": "tok-1", "expires_in": 7200})),
            )
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/1.0/zones"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(2)
            .mount(&server)
            .await;

        let api = client(&server);
        api.list(ResourceKind::Zone).await.unwrap();
        api.list(ResourceKind::Zone).await.unwrap();
    }

    /// An expired token is refreshed and the request retried once
    #[tokio::test]
    async fn test_refresh_and_retry_on_401() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"access_token": "tok-1", "expires_in": 7200})),
            )
            .expect(2)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/1.0/servers"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "error_name": "invalid_token",
                "errors": ["The access token expired"]
            })))
            .up_to_n_times(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/1.0/servers"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": "srv-aaaaa"}])))
            .mount(&server)
            .await;

        let items = client(&server).list(ResourceKind::Server).await.unwrap();
        assert_eq!(items.len(), 1);
    }
}

mod token_store_tests {
    use super::*;

    /// A token saved by one run is used by the next without a new exchange
    #[tokio::test]
    async fn test_token_is_reused_across_runs() {
        let server = MockServer::start().await;
        let dir = tempfile::tempdir().unwrap();
        let store = TokenStore::for_client(dir.path(), "cli-12345");

        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"access_token": "tok-disk", "expires_in": 7200})),
            )
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/1.0/zones"))
            .and(bearer_token("tok-disk"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(2)
            .mount(&server)
            .await;

        let first = client(&server).with_token_store(store.clone());
        first.list(ResourceKind::Zone).await.unwrap();
        assert!(store.path().exists());

        let second = client(&server).with_token_store(store);
        second.list(ResourceKind::Zone).await.unwrap();
    }

    /// A rejected token is replaced on disk as well as in memory
    #[tokio::test]
    async fn test_rejected_token_is_replaced_on_disk() {
        let server = MockServer::start().await;
        let dir = tempfile::tempdir().unwrap();
        let store = TokenStore::for_client(dir.path(), "cli-12345");

        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"access_token": "tok-1", "expires_in": 7200})),
            )
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"access_token": "tok-2", "expires_in": 7200})),
            )
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/1.0/zones"))
            .and(bearer_token("tok-2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/1.0/zones"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        client(&server)
            .with_token_store(store.clone())
            .list(ResourceKind::Zone)
            .await
            .unwrap();

        let saved = std::fs::read_to_string(store.path()).unwrap();
        assert!(saved.contains("tok-2"));
    }
}

mod refresh_grant_tests {
    use super::*;

    fn user_client(server: &MockServer) -> ApiClient {
        let grant = Grant::RefreshToken {
            app_id: "app-12345".to_string(),
            app_secret: "appsecret".to_string(),
            refresh_token: "rt-1".to_string(),
        };
        ApiClient::with_grant(&server.uri(), &server.uri(), grant, None, Duration::from_secs(5))
            .expect("client should build")
    }

    /// User applications trade their refresh token, and keep the rotated one
    #[tokio::test]
    async fn test_refresh_token_grant_rotates() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/token"))
            .and(basic_auth("app-12345", "appsecret"))
            .and(body_partial_json(
                json!({"grant_type": "refresh_token", "refresh_token": "rt-1"}),
            ))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "tok-user",
                "expires_in": 7200,
                "refresh_token": "rt-2"
            })))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/token"))
            .and(body_partial_json(json!({"refresh_token": "rt-2"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "tok-user-2",
                "expires_in": 7200
            })))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/1.0/accounts"))
            .and(bearer_token("tok-user"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": "acc-12345"}])))
            .mount(&server)
            .await;

        let api = user_client(&server);
        api.list(ResourceKind::Account).await.unwrap();
        assert_eq!(
            api.credentials.current_refresh_token().await.as_deref(),
            Some("rt-2")
        );

        let token = api.credentials.refresh_token().await.unwrap();
        assert_eq!(token, "tok-user-2");
        assert_eq!(
            api.credentials.current_refresh_token().await.as_deref(),
            Some("rt-2")
        );
    }

    /// An expired refresh token is an authentication error
    #[tokio::test]
    async fn test_rejected_refresh_token() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(
                ResponseTemplate::new(400).set_body_json(json!({"error": "invalid_grant"})),
            )
            .mount(&server)
            .await;

        let err = user_client(&server)
            .list(ResourceKind::Account)
            .await
            .unwrap_err();
        match err {
            ApiError::Unauthorized(message) => assert!(message.contains("refresh-token")),
            other => panic!("expected an authentication error, got {:?}", other),
        }
    }
}

mod resolver_over_http {
    use super::*;

    /// Repeated lookups of one identifier make one request per run
    #[tokio::test]
    async fn test_lookups_are_cached_per_run() {
        let server = MockServer::start().await;
        mount_token(&server, "tok-1").await;

        Mock::given(method("GET"))
            .and(path("/1.0/servers/srv-aaaaa"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "srv-aaaaa",
                "name": "web-1",
                "created_at": "2021-06-01T10:00:00Z"
            })))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/1.0/servers/srv-zzzzz"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;

        let mut resolver = Resolver::new(client(&server));
        let mut missed = Vec::new();

        for _ in 0..2 {
            let found = resolver
                .find_or_call(ResourceKind::Server, &["srv-aaaaa", "srv-zzzzz"], |id| {
                    missed.push(id.to_string())
                })
                .await
                .unwrap();
            assert_eq!(found.len(), 1);
            assert_eq!(found[0].created_on().unwrap(), "2021-06-01");
        }

        assert_eq!(missed, ["srv-zzzzz", "srv-zzzzz"]);
    }
}
