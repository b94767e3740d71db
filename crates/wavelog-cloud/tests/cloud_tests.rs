//! Cloud client tests against a mock HTTP server

use serde_json::json;
use tokio_test::{assert_err, assert_ok};
use wavelog_cloud::{CloudClient, CloudConfig, CloudError};
use wiremock::matchers::{basic_auth, bearer_token, body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ----------------------------------------------------------------------------
// Helpers
// ----------------------------------------------------------------------------

fn client(server: &MockServer) -> CloudClient {
    let config = CloudConfig::default()
        .with_credentials("id", "secret")
        .with_endpoints(
            format!("{}/v1/token", server.uri()),
            format!("{}/v1", server.uri()),
        );
    CloudClient::new(config).unwrap()
}

/// Token endpoint that only answers a well-formed client-credentials grant
async fn mount_token_endpoint(server: &MockServer, expected_calls: u64) {
    Mock::given(method("POST"))
        .and(path("/v1/token"))
        .and(basic_auth("id", "secret"))
        .and(body_string_contains("grant_type=client_credentials"))
        .and(body_string_contains("scope=read%3Adevice%3Acurrent_values"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "tok-1",
            "token_type": "Bearer",
            "expires_in": 3600
        })))
        .expect(expected_calls)
        .mount(server)
        .await;
}

async fn mount_resource(server: &MockServer, resource: &str, status: u16, body: &str) {
    Mock::given(method("GET"))
        .and(path(resource))
        .and(bearer_token("tok-1"))
        .respond_with(ResponseTemplate::new(status).set_body_string(body))
        .mount(server)
        .await;
}

fn output(buf: Vec<u8>) -> String {
    String::from_utf8(buf).unwrap()
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[tokio::test]
async fn test_list_streams_body_and_newline() {
    let server = MockServer::start().await;
    mount_token_endpoint(&server, 1).await;
    mount_resource(&server, "/v1/devices", 200, r#"{"devices":[{"id":"12345"}]}"#).await;

    let mut out = Vec::new();
    assert_ok!(client(&server).list_devices(&mut out).await);
    assert_eq!(output(out), "{\"devices\":[{\"id\":\"12345\"}]}\n");
}

#[tokio::test]
async fn test_token_request_uses_client_credentials() {
    let server = MockServer::start().await;
    mount_token_endpoint(&server, 1).await;
    mount_resource(&server, "/v1/devices", 200, "{}").await;

    let mut out = Vec::new();
    assert_ok!(client(&server).list_devices(&mut out).await);

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);

    let token_request = &requests[0];
    assert_eq!(token_request.method.as_str(), "POST");
    assert_eq!(token_request.url.path(), "/v1/token");
    let form = String::from_utf8_lossy(&token_request.body);
    assert!(form.contains("grant_type=client_credentials"));
    assert!(form.contains("scope=read%3Adevice%3Acurrent_values"));

    let resource_request = &requests[1];
    assert_eq!(resource_request.method.as_str(), "GET");
    assert_eq!(resource_request.url.path(), "/v1/devices");
    let authorization = resource_request
        .headers
        .get("authorization")
        .unwrap()
        .to_str()
        .unwrap();
    assert_eq!(authorization, "Bearer tok-1");
}

#[tokio::test]
async fn test_devices_in_order_with_one_token() {
    let server = MockServer::start().await;
    mount_token_endpoint(&server, 1).await;
    mount_resource(
        &server,
        "/v1/devices/12345",
        200,
        r#"{"id":"12345","segment":{"name":"Office"}}"#,
    )
    .await;
    mount_resource(
        &server,
        "/v1/devices/12347",
        200,
        r#"{"id":"12347","segment":{"name":"Kitchen"}}"#,
    )
    .await;
    mount_resource(
        &server,
        "/v1/devices/12345/latest-samples",
        200,
        r#"{"data":{"time":1654250221,"co2":766}}"#,
    )
    .await;

    let client = client(&server);
    let mut out = Vec::new();
    let ids = vec!["12345".to_string(), "12347".to_string()];
    assert_ok!(client.devices(&ids, &mut out).await);
    assert_ok!(client.latest_samples(&ids[..1], &mut out).await);

    assert_eq!(
        output(out),
        concat!(
            "{\"id\":\"12345\",\"segment\":{\"name\":\"Office\"}}\n",
            "{\"id\":\"12347\",\"segment\":{\"name\":\"Kitchen\"}}\n",
            "{\"data\":{\"time\":1654250221,\"co2\":766}}\n",
        )
    );
}

#[tokio::test]
async fn test_non_ok_status_stops_processing() {
    let server = MockServer::start().await;
    mount_token_endpoint(&server, 1).await;
    mount_resource(
        &server,
        "/v1/devices/12345",
        200,
        r#"{"id":"12345","segment":{"name":"Office"}}"#,
    )
    .await;
    mount_resource(&server, "/v1/devices/99999", 404, r#"{"error":"not found"}"#).await;
    Mock::given(method("GET"))
        .and(path("/v1/devices/12347"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut out = Vec::new();
    let ids = vec![
        "12345".to_string(),
        "99999".to_string(),
        "12347".to_string(),
    ];
    let err = assert_err!(client(&server).devices(&ids, &mut out).await);

    match err {
        CloudError::Status { resource, status } => {
            assert_eq!(resource, "device \"99999\"");
            assert_eq!(status.as_u16(), 404);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(
        output(out),
        "{\"id\":\"12345\",\"segment\":{\"name\":\"Office\"}}\n"
    );
}

#[tokio::test]
async fn test_rejected_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/token"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({ "error": "invalid_client" })),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut out = Vec::new();
    let err = assert_err!(client(&server).list_devices(&mut out).await);
    assert!(matches!(err, CloudError::TokenRejected { status } if status.as_u16() == 401));
    assert!(out.is_empty());
}
