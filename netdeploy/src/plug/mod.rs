//! Shelly smart plug provisioning over the Gen1 HTTP settings API.
//!
//! A factory-reset plug opens its own access point and answers on a fixed
//! address. [`settings_plan`] lists the settings requests in the order they
//! are sent; [`ShellyClient`] posts them, and the Wi-Fi side sits behind
//! [`WifiAdapter`] because joining a network is an OS concern.

mod client;
mod wifi;

pub use client::{PlugReport, ShellyClient};
pub use wifi::{StaticWifi, WifiAdapter, shelly_candidates};

use secrecy::{ExposeSecret, SecretString};

use crate::config::PlugSettings;

/// Name given to the `outlet`-th plug of a person.
pub fn plug_name(family_name: &str, first_name: &str, outlet: u32) -> String {
    format!("{family_name}-{first_name}-Outlet{outlet}")
}

/// Settings for one plug.
#[derive(Debug)]
pub struct PlugProfile {
    pub name: String,
    pub cloud: bool,
    pub mqtt_broker: String,
    pub max_power: u32,
    pub default_state: String,
    pub wifi_ssid: String,
    pub wifi_password: SecretString,
    pub ip_method: String,
}

impl PlugProfile {
    pub fn from_settings(settings: &PlugSettings, outlet: u32, wifi_password: SecretString) -> Self {
        Self {
            name: plug_name(&settings.family_name, &settings.first_name, outlet),
            cloud: settings.cloud,
            mqtt_broker: settings.mqtt_broker.clone(),
            max_power: settings.max_power,
            default_state: settings.default_state.clone(),
            wifi_ssid: settings.wifi_ssid.clone(),
            wifi_password,
            ip_method: settings.ip_method.clone(),
        }
    }
}

/// One form-encoded POST to a settings endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingRequest {
    pub endpoint: &'static str,
    pub fields: Vec<(String, String)>,

    /// Field values must not be logged.
    pub sensitive: bool,
}

impl SettingRequest {
    fn new(endpoint: &'static str, key: &str, value: impl ToString) -> Self {
        Self {
            endpoint,
            fields: vec![(key.to_string(), value.to_string())],
            sensitive: false,
        }
    }

    /// `endpoint key=value&...` with sensitive values masked.
    pub fn describe(&self) -> String {
        let fields = self
            .fields
            .iter()
            .map(|(k, v)| {
                if self.sensitive && k == "key" {
                    format!("{k}=********")
                } else {
                    format!("{k}={v}")
                }
            })
            .collect::<Vec<_>>()
            .join("&");
        format!("{} {}", self.endpoint, fields)
    }
}

/// Settings requests for `profile`, in the order they are sent.
///
/// The station Wi-Fi goes last: once the plug accepts it, it leaves
/// access-point mode and stops answering on its AP address.
pub fn settings_plan(profile: &PlugProfile) -> Vec<SettingRequest> {
    vec![
        SettingRequest::new("/settings/device", "name", &profile.name),
        SettingRequest::new("/settings/relay/0", "power_on_state", &profile.default_state),
        SettingRequest::new("/settings/relay/0", "led_status", &profile.default_state),
        SettingRequest::new("/settings/relay/0", "max_power", profile.max_power),
        SettingRequest::new("/settings/mqtt", "mqtt_enable", true),
        SettingRequest::new("/settings/mqtt", "mqtt_server", &profile.mqtt_broker),
        SettingRequest::new("/settings/mqtt", "mqtt_id", &profile.name),
        SettingRequest::new("/settings/cloud", "enabled", profile.cloud),
        SettingRequest::new("/settings/coiot", "enabled", false),
        SettingRequest::new("/settings", "max_power", profile.max_power),
        SettingRequest::new("/settings/sntp", "enabled", false),
        SettingRequest {
            endpoint: "/settings/sta",
            fields: vec![
                ("ssid".to_string(), profile.wifi_ssid.clone()),
                ("key".to_string(), profile.wifi_password.expose_secret().to_string()),
                ("ipv4_method".to_string(), profile.ip_method.clone()),
                ("enabled".to_string(), "true".to_string()),
            ],
            sensitive: true,
        },
    ]
}
