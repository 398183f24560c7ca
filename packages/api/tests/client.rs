//! Integration tests for the Ayon API client against a mock server

use ayon_api::{ApiError, AyonApi, AyonClient, VersionPatch};
use ayon_config::{ClientConfigBuilder, Credentials};
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn client_for(server: &MockServer) -> AyonClient {
    let config = ClientConfigBuilder::new()
        .server_url(server.uri())
        .project_name("demo")
        .api_key("service-key")
        .build()
        .unwrap();
    AyonClient::new(&config).unwrap()
}

#[tokio::test]
async fn test_product_list_flattens_edges() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .and(header("x-api-key", "service-key"))
        .and(body_partial_json(json!({
            "variables": { "projectName": "demo", "folderIds": ["f1"] }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "project": { "products": { "edges": [
                { "node": {
                    "id": "p1", "name": "modelMain", "productType": "model",
                    "folderId": "f1", "folder": { "name": "chair" },
                    "latestVersion": {
                        "id": "v2", "name": "v002", "version": 2, "status": "Approved",
                        "author": "admin", "createdAt": "2024-03-01T10:30:00Z",
                        "task": null
                    }
                }},
                { "node": {
                    "id": "p2", "name": "lookMain", "productType": "look",
                    "folderId": "f1", "folder": { "name": "chair" },
                    "latestVersion": null
                }}
            ]}}}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let products = client.product_list(&["f1".to_string()]).await.unwrap();

    assert_eq!(products.len(), 2);
    assert_eq!(products[0].version_id(), Some("v2"));
    assert_eq!(products[0].folder, "chair");
    assert!(products[1].latest.is_none());
}

#[tokio::test]
async fn test_empty_folder_set_skips_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    assert!(client.product_list(&[]).await.unwrap().is_empty());
    assert!(client.versions(&[]).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_folder_versions_filters_by_folder() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "project": { "versions": { "edges": [
                { "node": {
                    "id": "v1", "name": "v001", "version": 1, "status": "In Progress",
                    "author": "jane", "createdAt": null, "productId": "p1",
                    "taskId": null, "product": { "folderId": "f1" }
                }},
                { "node": {
                    "id": "v7", "name": "v007", "version": 7, "status": "Approved",
                    "author": "joe", "createdAt": null, "productId": "p9",
                    "taskId": null, "product": { "folderId": "f2" }
                }}
            ]}}}
        })))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let ids = vec!["v1".to_string(), "v7".to_string()];
    let versions = client.folder_versions("f1", &ids).await.unwrap();

    assert_eq!(versions.len(), 1);
    assert_eq!(versions[0].id, "v1");
    assert_eq!(versions[0].folder_id, "f1");
}

#[tokio::test]
async fn test_update_versions_sends_one_operations_batch() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/projects/demo/operations"))
        .and(body_partial_json(json!({
            "operations": [
                { "type": "update", "entityType": "version", "entityId": "v1", "data": { "status": "Approved" } },
                { "type": "update", "entityType": "version", "entityId": "v2", "data": { "status": "Approved" } }
            ],
            "canFail": false
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "operations": [
                { "id": "a", "entityId": "v1", "success": true },
                { "id": "b", "entityId": "v2", "success": true }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let response = client
        .update_versions(&["v1".to_string(), "v2".to_string()], &VersionPatch::status("Approved"))
        .await
        .unwrap();

    assert!(response.success);
    assert_eq!(response.operations.len(), 2);
    assert!(response.failure_message().is_none());
}

#[tokio::test]
async fn test_status_codes_map_to_errors() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/projects/demo/versions/missing"))
        .respond_with(
            ResponseTemplate::new(404)
                .set_body_json(json!({ "code": 404, "detail": "Version missing not found" })),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/projects/demo/versions/locked"))
        .respond_with(ResponseTemplate::new(401).set_body_string(""))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/projects/demo/versions/broken"))
        .respond_with(ResponseTemplate::new(502).set_body_string("upstream down"))
        .mount(&server)
        .await;

    let client = client_for(&server).await;

    match client.version("missing").await {
        Err(ApiError::NotFound(msg)) => assert_eq!(msg, "Version missing not found"),
        other => panic!("Expected NotFound, got {:?}", other),
    }
    assert!(client.version("locked").await.unwrap_err().is_auth_error());
    match client.version("broken").await {
        Err(ApiError::Http { status, message }) => {
            assert_eq!(status, 502);
            assert_eq!(message, "upstream down");
        }
        other => panic!("Expected Http error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_version_detail_and_bearer_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/projects/demo/versions/v1"))
        .and(header("authorization", "Bearer session-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "v1",
            "version": 1,
            "productId": "p1",
            "status": "Approved",
            "tags": ["hero"],
            "attrib": { "comment": "first pass" }
        })))
        .mount(&server)
        .await;

    let mut client = client_for(&server).await;
    client.set_credentials(Credentials::Token("session-token".to_string()));

    let version = client.version("v1").await.unwrap();
    assert_eq!(version.product_id, "p1");
    assert_eq!(version.tags, vec!["hero".to_string()]);
    assert_eq!(version.attrib["comment"], "first pass");
    assert!(version.active);
}

#[tokio::test]
async fn test_missing_project_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "data": { "project": null } })),
        )
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let result = client.versions(&["v1".to_string()]).await;
    assert!(matches!(result, Err(ApiError::NotFound(_))));
}
