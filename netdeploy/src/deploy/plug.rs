//! Plug provisioning loop.

use log::{info, warn};
use secrecy::{ExposeSecret, SecretString};

use crate::config::PlugSettings;
use crate::error::Result;
use crate::plug::{PlugProfile, PlugReport, ShellyClient, WifiAdapter, shelly_candidates};

/// Find plugs in access-point mode and configure each one in turn.
///
/// Outlet numbers are handed out in scan order, starting at 1, and only
/// advance when the adapter actually joined the plug's network. Settings
/// that a plug refuses are recorded in its report; they never stop the run.
pub async fn provision_plugs<W: WifiAdapter>(
    wifi: &W,
    settings: &PlugSettings,
    wifi_password: &SecretString,
) -> Result<Vec<PlugReport>> {
    let networks = wifi.scan_networks().await?;
    let candidates = shelly_candidates(&networks, &settings.ap_marker);
    if candidates.is_empty() {
        info!("No plugs found (looking for '{}')", settings.ap_marker);
        return Ok(Vec::new());
    }
    info!("Found {} plug(s) in access-point mode", candidates.len());

    let client = ShellyClient::new(&settings.ap_address, settings.timeout())?;
    let mut reports = Vec::new();
    let mut outlet = 1;
    for ssid in &candidates {
        match wifi.connect(ssid, None).await {
            Ok(true) => {}
            Ok(false) => {
                warn!("Could not join {}, skipping", ssid);
                continue;
            }
            Err(e) => {
                warn!("Could not join {}: {}", ssid, e);
                continue;
            }
        }

        let password = SecretString::from(wifi_password.expose_secret().to_string());
        let profile = PlugProfile::from_settings(settings, outlet, password);
        info!("Configuring {} as {}", ssid, profile.name);
        reports.push(client.configure(&profile).await);
        outlet += 1;
    }
    Ok(reports)
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::plug::StaticWifi;

    fn settings(ap_address: String) -> PlugSettings {
        PlugSettings {
            family_name: "Peeters".to_string(),
            first_name: "Jan".to_string(),
            ap_address,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_no_plugs_found() {
        let wifi = StaticWifi::new(["HomeNet", "Guest"]);
        let reports = provision_plugs(
            &wifi,
            &settings("http://127.0.0.1:9".to_string()),
            &SecretString::from("pw".to_string()),
        )
        .await
        .unwrap();
        assert!(reports.is_empty());
    }

    #[tokio::test]
    async fn test_outlets_skip_unreachable_plugs() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let wifi = StaticWifi::new(["shellyplug-s-AAAA", "HomeNet", "ShellyPlug-s-BBBB", "shellyplug-s-CCCC"])
            .with_unreachable("ShellyPlug-s-BBBB");
        let reports = provision_plugs(
            &wifi,
            &settings(server.uri()),
            &SecretString::from("pw".to_string()),
        )
        .await
        .unwrap();

        let names: Vec<_> = reports.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["Peeters-Jan-Outlet1", "Peeters-Jan-Outlet2"]);
        assert!(reports.iter().all(|r| r.is_complete()));
    }

    #[tokio::test]
    async fn test_refused_setting_does_not_stop_run() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/settings/coiot"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let wifi = StaticWifi::new(["shellyplug-s-AAAA"]);
        let reports = provision_plugs(
            &wifi,
            &settings(server.uri()),
            &SecretString::from("pw".to_string()),
        )
        .await
        .unwrap();

        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].failed.len(), 1);
        assert_eq!(reports[0].failed[0].0, "/settings/coiot enabled=false");
        assert!(!reports[0].applied.is_empty());
    }
}
