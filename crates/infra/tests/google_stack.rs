//! Credential provider, executor and Classroom/Drive clients wired together
//! against a mock Google backend

use std::sync::Arc;

use classbatch_core::{ClassroomGateway, CredentialHolder, FileStorage};
use classbatch_domain::{HostConfig, LocalFile};
use classbatch_infra::identity::provider_from_config;
use classbatch_infra::{ApiExecutor, GoogleClassroomClient, GoogleDriveClient, HttpClient};
use serde_json::json;
use wiremock::matchers::{body_string_contains, header, method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn host_config(server: &MockServer) -> HostConfig {
    let mut config = HostConfig::default();
    config.api.classroom_base_url = server.uri();
    config.api.drive_base_url = format!("{}/drive/v3", server.uri());
    config.api.drive_upload_base_url = format!("{}/upload/drive/v3", server.uri());
    config.api.token_endpoint = format!("{}/token", server.uri());
    config.api.authorization_endpoint = format!("{}/auth", server.uri());
    config
}

fn executor(config: &HostConfig) -> (Arc<ApiExecutor>, Arc<CredentialHolder>) {
    let http = HttpClient::from_config(&config.http).unwrap();
    let provider = provider_from_config(config, http.clone()).unwrap();
    let credentials = Arc::new(CredentialHolder::new(provider));
    (Arc::new(ApiExecutor::new(http, credentials.clone())), credentials)
}

async fn mount_token(server: &MockServer, access_token: &str, times: Option<u64>) {
    let mock = Mock::given(method("POST"))
        .and(path("/token"))
        .and(body_string_contains("grant_type=refresh_token"))
        .and(body_string_contains("refresh_token=1%2F%2Fstored"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"access_token": access_token, "expires_in": 3599})),
        );
    match times {
        Some(n) => mock.up_to_n_times(n).mount(server).await,
        None => mock.mount(server).await,
    }
}

#[tokio::test]
async fn refresh_token_survives_a_401_in_the_middle_of_pagination() {
    let server = MockServer::start().await;
    mount_token(&server, "a1", Some(1)).await;
    mount_token(&server, "a2", None).await;

    Mock::given(method("GET"))
        .and(path("/courses"))
        .and(query_param_is_missing("pageToken"))
        .and(header("authorization", "Bearer a1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "courses": [{"id": "c1", "name": "Math"}],
            "nextPageToken": "p2"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/courses"))
        .and(query_param("pageToken", "p2"))
        .and(header("authorization", "Bearer a1"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/courses"))
        .and(query_param("pageToken", "p2"))
        .and(header("authorization", "Bearer a2"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"courses": [{"id": "c2", "name": "Art"}]})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let mut config = host_config(&server);
    config.auth.client_id = Some("client-1.apps.googleusercontent.com".into());
    config.auth.refresh_token = Some("1//stored".into());
    let (api, credentials) = executor(&config);
    let classroom = GoogleClassroomClient::new(api, &config.api.classroom_base_url);

    let courses = classroom.list_courses().await.unwrap();

    let ids: Vec<_> = courses.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, ["c1", "c2"]);
    assert_eq!(credentials.refresh_count(), 1);
    assert_eq!(credentials.peek().await.unwrap().secret(), "a2");
}

#[tokio::test]
async fn rejected_static_token_aborts_with_auth_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/courses/c1/courseWork"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = host_config(&server);
    config.auth.access_token = Some("ya29.pasted".into());
    let (api, _) = executor(&config);
    let classroom = GoogleClassroomClient::new(api, &config.api.classroom_base_url);

    let request = classbatch_domain::AssignmentRequest { title: "HW".into(), ..Default::default() };
    let err = classroom.create_assignment("c1", &request).await.unwrap_err();

    assert!(err.is_auth());
    assert_eq!(err.to_string(), "Authentication failed: configured access token was rejected");
}

#[tokio::test]
async fn drive_upload_uses_the_same_credential_path() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/upload/drive/v3/files"))
        .and(header("authorization", "Bearer ya29.pasted"))
        .and(body_string_contains("lesson-plan.txt"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"id": "f1", "name": "lesson-plan.txt"})),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/drive/v3/files/f1/permissions"))
        .and(header("authorization", "Bearer ya29.pasted"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "anyoneWithLink"})))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = host_config(&server);
    config.auth.access_token = Some("ya29.pasted".into());
    let (api, _) = executor(&config);
    let drive = GoogleDriveClient::new(
        api,
        &config.api.drive_base_url,
        &config.api.drive_upload_base_url,
    );

    let file = LocalFile {
        name: "lesson-plan.txt".into(),
        mime_type: Some("text/plain".into()),
        data: Some("data:text/plain;base64,aGVsbG8=".into()),
        ..Default::default()
    };
    let uploaded = drive.upload_file(&file, None).await.unwrap();

    assert_eq!(uploaded.id, "f1");
}
