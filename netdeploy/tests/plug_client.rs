//! Settings requests as a plug sees them.

use std::time::Duration;

use netdeploy::config::PlugSettings;
use netdeploy::error::PlugError;
use netdeploy::plug::{PlugProfile, ShellyClient, settings_plan};
use secrecy::SecretString;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn profile() -> PlugProfile {
    let settings = PlugSettings {
        family_name: "Peeters".to_string(),
        first_name: "Jan".to_string(),
        ..Default::default()
    };
    PlugProfile::from_settings(&settings, 1, SecretString::from("s3cret".to_string()))
}

#[tokio::test]
async fn test_settings_are_form_encoded() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/settings/device"))
        .and(body_string_contains("name=Peeters-Jan-Outlet1"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/settings/sta"))
        .and(body_string_contains("ssid=Howest-IoT"))
        .and(body_string_contains("key=s3cret"))
        .and(body_string_contains("enabled=true"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let client = ShellyClient::new(server.uri(), Duration::from_secs(10)).unwrap();
    let report = client.configure(&profile()).await;

    assert!(report.is_complete());
    assert_eq!(report.applied.len(), settings_plan(&profile()).len());
    assert!(report.applied.iter().all(|r| !r.contains("s3cret")));
}

#[tokio::test]
async fn test_non_ok_status_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Unauthorized"))
        .mount(&server)
        .await;

    let client = ShellyClient::new(format!("{}/", server.uri()), Duration::from_secs(10)).unwrap();
    assert_eq!(client.base_url(), server.uri());

    let plan = settings_plan(&profile());
    let err = client.post(&plan[0]).await.unwrap_err();
    match err {
        PlugError::Status {
            endpoint,
            status,
            body,
        } => {
            assert_eq!(endpoint, "/settings/device");
            assert_eq!(status, 401);
            assert_eq!(body, "Unauthorized");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_unreachable_plug_fails_every_request() {
    // Nothing listens on the discard port.
    let client = ShellyClient::new("http://127.0.0.1:9", Duration::from_secs(2)).unwrap();
    let report = client.configure(&profile()).await;

    assert!(report.applied.is_empty());
    assert_eq!(report.failed.len(), settings_plan(&profile()).len());
    assert!(matches!(report.failed[0].1, PlugError::Http { .. }));
}
