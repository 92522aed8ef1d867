//! Config assembler: folds input rows into command lists.
//!
//! Router tables become a single list for the whole file. Switch tables
//! become one list per row, each later sent to its own device, or one list
//! for the whole file via [`SwitchAssembler::assemble_all`].

use log::{debug, warn};

use crate::builder::{
    CommandList, GatewayPolicy, IpConfig, NetworkRole, PortNaming, PortSpec, VlanId, VlanSpec,
    router, switch,
};
use crate::config::{RouterSettings, SwitchSettings};
use crate::error::Result;
use crate::source::{RouterRow, SwitchRow};

/// Statements appended after every row has been processed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trailer {
    /// Interface used for NAT overload.
    pub egress_interface: String,
}

impl Trailer {
    pub fn new(egress_interface: impl Into<String>) -> Self {
        Self {
            egress_interface: egress_interface.into(),
        }
    }

    /// Permit-all access list plus NAT overload on the egress interface.
    pub fn commands(&self) -> CommandList {
        [
            "access-list 1 permit any".to_string(),
            format!(
                "ip nat inside source list 1 interface {} overload",
                self.egress_interface
            ),
        ]
        .into_iter()
        .collect()
    }
}

impl Default for Trailer {
    fn default() -> Self {
        Self::new("gi0/0")
    }
}

/// Description keywords that switch on extra builder paths.
///
/// Matching is a case-insensitive substring test on the free-text
/// description column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordTriggers {
    pub trunk: Vec<String>,
    pub management: Vec<String>,
}

impl Default for KeywordTriggers {
    fn default() -> Self {
        Self {
            trunk: vec!["trunk".to_string(), "uplink".to_string()],
            management: vec!["management".to_string()],
        }
    }
}

impl KeywordTriggers {
    pub fn is_trunk(&self, description: &str) -> bool {
        contains_any(description, &self.trunk)
    }

    pub fn is_management(&self, description: &str) -> bool {
        contains_any(description, &self.management)
    }
}

fn contains_any(text: &str, keywords: &[String]) -> bool {
    let text = text.to_lowercase();
    keywords
        .iter()
        .filter(|k| !k.is_empty())
        .any(|k| text.contains(&k.to_lowercase()))
}

/// Assembles the router configuration.
#[derive(Debug, Clone, Default)]
pub struct RouterAssembler {
    trailer: Trailer,
}

impl RouterAssembler {
    pub fn new(trailer: Trailer) -> Self {
        Self { trailer }
    }

    pub fn from_settings(settings: &RouterSettings) -> Self {
        Self::new(Trailer::new(settings.egress_interface.clone()))
    }

    pub fn trailer(&self) -> &Trailer {
        &self.trailer
    }

    /// Statements for one row: interface or VLAN block, NAT block, static
    /// route, in that order.
    pub fn assemble_row(&self, row: &RouterRow) -> Result<CommandList> {
        let mut config = CommandList::new();
        let interface = row.interface.trim();

        if !interface.is_empty() {
            let ip = IpConfig::from_fields(&row.ip_address, &row.subnet_mask);
            config.extend(router::interface(
                interface,
                &row.description,
                &row.vlan,
                &ip,
            )?);
        } else if let Some(vlan) = VlanId::parse_optional(&row.vlan)? {
            config.extend(router::vlan(vlan, &row.description));
        }

        config.extend(router::nat(NetworkRole::parse(&row.network), interface));

        if !row.default_gateway.trim().is_empty() {
            config.extend(router::static_route(
                &row.ip_address,
                &row.subnet_mask,
                &row.default_gateway,
            ));
        }

        Ok(config)
    }

    /// Statements for the whole table followed by the trailer.
    ///
    /// The first failing row aborts assembly.
    pub fn assemble(&self, rows: &[RouterRow]) -> Result<CommandList> {
        let mut config = CommandList::new();
        for row in rows {
            config.extend(self.assemble_row(row)?);
        }
        config.extend(self.trailer.commands());
        Ok(config)
    }
}

/// Assembles switch configuration.
#[derive(Debug, Clone)]
pub struct SwitchAssembler {
    naming: PortNaming,
    triggers: KeywordTriggers,
    trunk_ports: String,
    management_interface: String,
    gateway: GatewayPolicy,
    ip_routing: bool,
    trailer: Option<Trailer>,
}

impl Default for SwitchAssembler {
    fn default() -> Self {
        Self::from_settings(&SwitchSettings::default())
    }
}

impl SwitchAssembler {
    pub fn from_settings(settings: &SwitchSettings) -> Self {
        Self {
            naming: settings.port_naming.clone(),
            triggers: KeywordTriggers {
                trunk: settings.trunk_keywords.clone(),
                management: settings.management_keywords.clone(),
            },
            trunk_ports: settings.trunk_ports.clone(),
            management_interface: settings.management_interface.clone(),
            gateway: settings.gateway,
            ip_routing: settings.ip_routing,
            trailer: settings
                .nat_egress_interface
                .as_deref()
                .map(str::trim)
                .filter(|egress| !egress.is_empty())
                .map(Trailer::new),
        }
    }

    /// Override the trailer appended by [`assemble_all`](Self::assemble_all).
    pub fn with_trailer(mut self, trailer: Option<Trailer>) -> Self {
        self.trailer = trailer;
        self
    }

    /// Toggle the `ip routing` statement that per-device lists get for
    /// tables with Layer-3 VLANs.
    pub fn with_ip_routing(mut self, enabled: bool) -> Self {
        self.ip_routing = enabled;
        self
    }

    /// Check if any row carries an IP address, which turns on routing.
    pub fn needs_routing(&self, rows: &[SwitchRow]) -> bool {
        self.ip_routing && rows.iter().any(|r| !r.ip_address.trim().is_empty())
    }

    /// Statements for one row, without `ip routing` or trailer.
    ///
    /// Order: VLAN + SVI, access ports, then the trunk and management paths
    /// when the description carries one of their keywords.
    pub fn assemble_row(&self, row: &SwitchRow) -> Result<CommandList> {
        let vlan = VlanId::parse(&row.vlan)?;
        let spec = VlanSpec::new(vlan, &row.description, &row.ip_address, &row.netmask);
        let ports = PortSpec::parse(&row.ports)?;

        let mut config = switch::switch_vlan(&spec);
        config.extend(switch::access_ports(vlan, &ports, &self.naming));

        if self.triggers.is_trunk(&row.description) {
            let trunk_ports = if ports.is_empty() {
                PortSpec::parse(&self.trunk_ports)?
            } else {
                ports.clone()
            };
            let allowed = if row.vlan_filtering.trim().is_empty() {
                vlan.to_string()
            } else {
                row.vlan_filtering.clone()
            };
            debug!("Row {}: trunk path on ports '{}'", row.line, trunk_ports);
            config.extend(switch::trunk(&trunk_ports, &allowed, &self.naming));
        }

        if self.triggers.is_management(&row.description) {
            match &spec.address {
                Some((address, mask)) => {
                    config.extend(switch::management(
                        address,
                        mask,
                        &self.management_interface,
                    ));
                    config.extend(switch::default_gateway(address, &self.gateway)?);
                }
                None => warn!(
                    "Row {}: management keyword without IP address, skipping management block",
                    row.line
                ),
            }
        }

        Ok(config)
    }

    /// One list per row, for per-device rollout.
    ///
    /// Every list ends with `ip routing` when any row of the table carries
    /// an IP address. Failures stay attached to their row.
    pub fn assemble_per_device(&self, rows: &[SwitchRow]) -> Vec<Result<CommandList>> {
        let routing = self.needs_routing(rows);
        rows.iter()
            .map(|row| {
                let mut config = self.assemble_row(row)?;
                if routing {
                    config.push("ip routing");
                }
                Ok(config)
            })
            .collect()
    }

    /// One list for the whole table: all rows, then the NAT trailer if one
    /// is configured.
    ///
    /// `ip routing` is left to the per-device lists; this list is meant
    /// for the device doing NAT.
    pub fn assemble_all(&self, rows: &[SwitchRow]) -> Result<CommandList> {
        let mut config = CommandList::new();
        for row in rows {
            config.extend(self.assemble_row(row)?);
        }
        if let Some(trailer) = &self.trailer {
            config.extend(trailer.commands());
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn switch_row(vlan: &str, description: &str, ip: &str, mask: &str, ports: &str) -> SwitchRow {
        SwitchRow {
            line: 0,
            vlan: vlan.to_string(),
            description: description.to_string(),
            ip_address: ip.to_string(),
            netmask: mask.to_string(),
            switch: "1".to_string(),
            ports: ports.to_string(),
            vlan_filtering: String::new(),
        }
    }

    fn router_row(
        network: &str,
        interface: &str,
        vlan: &str,
        ip: &str,
        mask: &str,
        gateway: &str,
    ) -> RouterRow {
        RouterRow {
            line: 0,
            network: network.to_string(),
            interface: interface.to_string(),
            description: String::new(),
            vlan: vlan.to_string(),
            ip_address: ip.to_string(),
            subnet_mask: mask.to_string(),
            default_gateway: gateway.to_string(),
        }
    }

    #[test]
    fn test_keyword_triggers_case_insensitive() {
        let triggers = KeywordTriggers::default();
        assert!(triggers.is_trunk("Core UPLINK"));
        assert!(triggers.is_trunk("trunk-to-dist"));
        assert!(!triggers.is_trunk("Data"));
        assert!(triggers.is_management("Switch Management"));
    }

    #[test]
    fn test_router_row_order() {
        let assembler = RouterAssembler::default();
        let row = router_row("wan", "Gi0/0", "0", "dhcp", "", "");
        assert_eq!(
            assembler.assemble_row(&row).unwrap(),
            [
                "interface Gi0/0",
                " ip address dhcp",
                " no shutdown",
                " exit",
                "interface Gi0/0",
                " ip nat outside",
                " exit",
            ]
        );
    }

    #[test]
    fn test_router_vlan_only_row() {
        let assembler = RouterAssembler::default();
        let mut row = router_row("", "", "30", "", "", "");
        row.description = "Guests".to_string();
        assert_eq!(
            assembler.assemble_row(&row).unwrap(),
            ["vlan 30", " name Guests", " exit"]
        );

        let empty = router_row("", "", "0", "", "", "");
        assert!(assembler.assemble_row(&empty).unwrap().is_empty());
    }

    #[test]
    fn test_router_static_route_row() {
        let assembler = RouterAssembler::default();
        let row = router_row("", "", "", "10.0.0.0", "24", "10.0.0.1");
        assert_eq!(
            assembler.assemble_row(&row).unwrap(),
            ["ip route 10.0.0.0/24 10.0.0.1"]
        );
    }

    #[test]
    fn test_router_trailer_uses_egress() {
        let assembler = RouterAssembler::new(Trailer::new("Dialer0"));
        let config = assembler.assemble(&[]).unwrap();
        assert_eq!(
            config,
            [
                "access-list 1 permit any",
                "ip nat inside source list 1 interface Dialer0 overload"
            ]
        );
    }

    #[test]
    fn test_router_invalid_vlan() {
        let assembler = RouterAssembler::default();
        let row = router_row("lan", "Gi0/1", "x1", "", "", "");
        let err = assembler.assemble(&[row]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidVlan);
    }

    #[test]
    fn test_switch_trunk_path_defaults_to_trunk_ports() {
        let assembler = SwitchAssembler::default();
        let row = switch_row("99", "Uplink core", "", "", "");
        let config = assembler.assemble_row(&row).unwrap();

        assert_eq!(config.count("switchport mode trunk"), 24);
        assert_eq!(config.count("switchport trunk allowed vlan 99"), 24);
        assert_eq!(config.count("switchport mode access"), 0);
    }

    #[test]
    fn test_switch_trunk_path_uses_filter_column() {
        let assembler = SwitchAssembler::default();
        let mut row = switch_row("99", "trunk", "", "", "24");
        row.vlan_filtering = "10,20".to_string();
        let config = assembler.assemble_row(&row).unwrap();

        assert_eq!(config.count("switchport mode access"), 1);
        assert_eq!(config.count("switchport trunk allowed vlan 10,20"), 1);
    }

    #[test]
    fn test_switch_management_path() {
        let assembler = SwitchAssembler::default();
        let row = switch_row("1", "Management", "192.168.1.20", "255.255.255.0", "");
        let config = assembler.assemble_row(&row).unwrap();

        assert!(config.iter().any(|s| s == "ip default-gateway 192.168.1.1"));
        assert_eq!(config.count("interface vlan 1"), 2);
    }

    #[test]
    fn test_switch_per_device_adds_routing() {
        let assembler = SwitchAssembler::default();
        let rows = vec![
            switch_row("10", "Data", "", "", "1"),
            switch_row("20", "Voice", "10.0.20.1", "255.255.255.0", ""),
        ];

        let lists = assembler.assemble_per_device(&rows);

        assert_eq!(lists.len(), 2);
        for list in &lists {
            let list = list.as_ref().unwrap();
            assert_eq!(list.iter().last(), Some("ip routing"));
        }
    }

    #[test]
    fn test_switch_per_device_keeps_row_errors() {
        let assembler = SwitchAssembler::default();
        let rows = vec![
            switch_row("10", "Data", "", "", "5-1"),
            switch_row("20", "Voice", "", "", "2"),
        ];

        let lists = assembler.assemble_per_device(&rows);

        assert_eq!(
            lists[0].as_ref().unwrap_err().kind(),
            ErrorKind::InvalidPortRange
        );
        assert!(lists[1].is_ok());
    }

    #[test]
    fn test_switch_whole_table_ends_with_trailer() {
        let assembler = SwitchAssembler::default();
        let rows = vec![
            switch_row("10", "Data", "", "", "1"),
            switch_row("20", "Voice", "10.0.20.1", "255.255.255.0", ""),
        ];

        let config = assembler.assemble_all(&rows).unwrap();
        assert_eq!(config.count("ip routing"), 0);
        let tail: Vec<_> = config.iter().skip(config.len() - 4).collect();
        assert_eq!(
            tail,
            [
                "ip address 10.0.20.1 255.255.255.0",
                "no shutdown",
                "access-list 1 permit any",
                "ip nat inside source list 1 interface gi0/0 overload",
            ]
        );

        let bare = SwitchAssembler::default().with_trailer(None);
        assert_eq!(bare.assemble_all(&rows).unwrap().len(), config.len() - 2);
    }

    #[test]
    fn test_assembly_is_deterministic() {
        let assembler = SwitchAssembler::default();
        let rows = vec![
            switch_row("10", "Data", "", "", "1-3"),
            switch_row("20", "Uplink", "192.168.1.10", "255.255.255.0", "24"),
        ];

        let first = assembler.assemble_all(&rows).unwrap().to_string();
        let second = assembler.assemble_all(&rows).unwrap().to_string();
        assert_eq!(first, second);
    }
}
