// Contract tests for the cluster API client against a mock backend.

use mockito::Matcher;
use nodedeck::api::{ApiClient, ApiError, LoginRequest, NodeResources, StartNodeRequest, VerifyOtpRequest};

fn client(server: &mockito::ServerGuard) -> ApiClient {
    ApiClient::new(server.url()).unwrap()
}

#[tokio::test]
async fn test_login_posts_credentials() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/auth/login")
        .match_body(Matcher::Json(serde_json::json!({
            "email": "alice@example.com",
            "password": "hunter2"
        })))
        .with_status(200)
        .with_body(r#"{"message": "OTP sent"}"#)
        .create_async()
        .await;

    client(&server)
        .login(&LoginRequest {
            email: "alice@example.com".to_string(),
            password: "hunter2".to_string(),
        })
        .await
        .unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn test_verify_otp_returns_bearer_token() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/auth/verify-otp")
        .with_status(200)
        .with_body(r#"{"token": "jwt-abc"}"#)
        .create_async()
        .await;

    let token = client(&server)
        .verify_otp(&VerifyOtpRequest {
            email: "alice@example.com".to_string(),
            code: "123456".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(token, "jwt-abc");
}

#[tokio::test]
async fn test_invalid_otp_maps_to_auth_failure_with_verbatim_reason() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/auth/verify-otp")
        .with_status(401)
        .with_body(r#"{"error": "Invalid OTP code"}"#)
        .create_async()
        .await;

    let err = client(&server)
        .verify_otp(&VerifyOtpRequest {
            email: "alice@example.com".to_string(),
            code: "000000".to_string(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::AuthFailure(r) if r == "Invalid OTP code"));
}

#[tokio::test]
async fn test_fetchers_send_bearer_token() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/network/nodes")
        .match_header("authorization", "Bearer tok-1")
        .with_status(200)
        .with_body(r#"[{"nodeId": "n1"}]"#)
        .create_async()
        .await;

    let nodes = client(&server).fetch_nodes("tok-1").await.unwrap();
    assert_eq!(nodes.len(), 1);
    assert_eq!(nodes[0].node_id, "n1");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_running_nodes_payload_parsed() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/network/nodes/running")
        .with_status(200)
        .with_body(r#"{"runningNodes": ["n1", "n3"], "count": 2}"#)
        .create_async()
        .await;

    let running = client(&server).fetch_running_nodes("tok").await.unwrap();
    assert!(running.running_nodes.contains("n3"));
    assert_eq!(running.count, 2);
}

#[tokio::test]
async fn test_flat_file_listing_parsed() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/files")
        .with_status(200)
        .with_body(r#"[{"id": 3, "fileName": "a.txt", "fileSize": 10, "uploadedAt": "2026-08-01T12:00:00Z"}]"#)
        .create_async()
        .await;

    let files = client(&server).list_files("tok").await.unwrap();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].size_bytes, 10);
}

#[tokio::test]
async fn test_start_node_sends_backend_field_names() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/network/nodes/start")
        .match_body(Matcher::Json(serde_json::json!({
            "nodeId": "node-1234",
            "port": 50052,
            "storageGB": 100,
            "ramGB": 8
        })))
        .with_status(200)
        .with_body(r#"{"success": true, "message": "Node started successfully", "nodeId": "node-1234"}"#)
        .create_async()
        .await;

    let ack = client(&server)
        .start_node(
            "tok",
            &StartNodeRequest {
                node_id: "node-1234".to_string(),
                resources: NodeResources {
                    port: 50052,
                    storage_gb: 100,
                    ram_gb: 8,
                },
            },
        )
        .await
        .unwrap();
    assert!(ack.success);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_backend_rejection_reason_is_verbatim() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/network/nodes/stop/n1")
        .with_status(400)
        .with_body(r#"{"error": "Node n1 is not running"}"#)
        .create_async()
        .await;

    let err = client(&server).stop_node("tok", "n1").await.unwrap_err();
    match err {
        ApiError::BackendRejection { status, reason } => {
            assert_eq!(status, 400);
            assert_eq!(reason, "Node n1 is not running");
        }
        other => panic!("expected BackendRejection, got {other:?}"),
    }
}

#[tokio::test]
async fn test_upload_is_multipart_with_file_field() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/files/upload")
        .match_header(
            "content-type",
            Matcher::Regex("multipart/form-data.*".to_string()),
        )
        .match_body(Matcher::Regex(r#"name="file""#.to_string()))
        .with_status(200)
        .with_body(r#"{"fileName": "notes.txt", "totalChunks": 1, "fileSize": 10}"#)
        .create_async()
        .await;

    let result = client(&server)
        .upload_file("tok", "notes.txt", b"0123456789".to_vec())
        .await
        .unwrap();
    assert_eq!(result.total_chunks, 1);
    assert_eq!(result.size_bytes, 10);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_download_returns_raw_bytes() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/files/7")
        .with_status(200)
        .with_body(b"raw-bytes".to_vec())
        .create_async()
        .await;

    let resp = client(&server).download_file("tok", 7).await.unwrap();
    let bytes = resp.bytes().await.unwrap();
    assert_eq!(&bytes[..], b"raw-bytes");
}

#[tokio::test]
async fn test_malformed_body_is_unparseable() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/user/dashboard")
        .with_status(200)
        .with_body("<html>gateway error</html>")
        .create_async()
        .await;

    let err = client(&server).fetch_dashboard("tok").await.unwrap_err();
    assert!(matches!(err, ApiError::Unparseable(_)));
    assert!(err.is_transient());
}

#[tokio::test]
async fn test_connection_refused_is_network_failure() {
    // Nothing listens on port 1.
    let client = ApiClient::new("http://127.0.0.1:1").unwrap();
    let err = client.fetch_dashboard("tok").await.unwrap_err();
    assert!(matches!(err, ApiError::NetworkFailure(_)));
}
