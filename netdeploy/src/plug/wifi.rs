//! Wi-Fi adapter boundary.
//!
//! Scanning for and joining access points is platform specific, so the
//! crate only defines the capability. [`StaticWifi`] serves a fixed list
//! for tests and for setups where the operator joins the network by hand.

use std::collections::HashSet;
use std::future::Future;

use secrecy::SecretString;

use crate::error::PlugError;

pub trait WifiAdapter: Send + Sync {
    /// SSIDs currently visible.
    fn scan_networks(&self) -> impl Future<Output = Result<Vec<String>, PlugError>> + Send;

    /// Join `ssid`. Returns whether the plug's address is reachable afterwards.
    fn connect(
        &self,
        ssid: &str,
        password: Option<&SecretString>,
    ) -> impl Future<Output = Result<bool, PlugError>> + Send;
}

/// SSIDs that belong to plugs in access-point mode, in scan order.
pub fn shelly_candidates(ssids: &[String], marker: &str) -> Vec<String> {
    let marker = marker.to_ascii_lowercase();
    ssids
        .iter()
        .filter(|ssid| ssid.to_ascii_lowercase().contains(&marker))
        .cloned()
        .collect()
}

/// Adapter with a fixed scan result.
#[derive(Debug, Clone, Default)]
pub struct StaticWifi {
    networks: Vec<String>,
    unreachable: HashSet<String>,
}

impl StaticWifi {
    pub fn new(networks: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            networks: networks.into_iter().map(Into::into).collect(),
            unreachable: HashSet::new(),
        }
    }

    /// Make `connect` fail for `ssid`.
    pub fn with_unreachable(mut self, ssid: impl Into<String>) -> Self {
        self.unreachable.insert(ssid.into());
        self
    }
}

impl WifiAdapter for StaticWifi {
    async fn scan_networks(&self) -> Result<Vec<String>, PlugError> {
        Ok(self.networks.clone())
    }

    async fn connect(&self, ssid: &str, _password: Option<&SecretString>) -> Result<bool, PlugError> {
        Ok(self.networks.iter().any(|n| n == ssid) && !self.unreachable.contains(ssid))
    }
}
