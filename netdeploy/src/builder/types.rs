//! Typed builder parameters.

use std::fmt;
use std::net::Ipv4Addr;

use serde::Deserialize;

use crate::error::BuildError;

/// An 802.1Q VLAN id.
///
/// Zero is never stored: a zero or empty field means "no VLAN".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VlanId(u16);

impl VlanId {
    /// Highest usable VLAN id.
    pub const MAX: u16 = 4094;

    /// Parse an optional VLAN field.
    ///
    /// Empty text and `0` yield `None`. Anything else must be a number.
    pub fn parse_optional(text: &str) -> Result<Option<Self>, BuildError> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(None);
        }
        let value: u16 = text.parse().map_err(|_| BuildError::InvalidVlan {
            value: text.to_string(),
        })?;
        if value == 0 {
            return Ok(None);
        }
        Self::new(value).map(Some)
    }

    /// Parse a mandatory VLAN field.
    pub fn parse(text: &str) -> Result<Self, BuildError> {
        Self::parse_optional(text)?.ok_or_else(|| BuildError::InvalidVlan {
            value: text.trim().to_string(),
        })
    }

    /// Wrap a raw id, rejecting 0 and ids above [`VlanId::MAX`].
    pub fn new(value: u16) -> Result<Self, BuildError> {
        if value == 0 || value > Self::MAX {
            return Err(BuildError::InvalidVlan {
                value: value.to_string(),
            });
        }
        Ok(Self(value))
    }

    pub fn get(self) -> u16 {
        self.0
    }
}

impl fmt::Display for VlanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// IP settings for a routed interface.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum IpConfig {
    /// No address statement.
    #[default]
    None,
    /// `ip address dhcp`.
    Dhcp,
    /// Static address and mask, emitted verbatim.
    Static { address: String, mask: String },
}

impl IpConfig {
    /// Derive the IP settings from the address and mask columns.
    ///
    /// The literal `dhcp` (any case) in the address column selects DHCP.
    pub fn from_fields(address: &str, mask: &str) -> Self {
        let address = address.trim();
        if address.is_empty() {
            IpConfig::None
        } else if address.eq_ignore_ascii_case("dhcp") {
            IpConfig::Dhcp
        } else {
            IpConfig::Static {
                address: address.to_string(),
                mask: mask.trim().to_string(),
            }
        }
    }
}

/// A VLAN as configured on a switch: Layer-2 without an address pair,
/// Layer-3 with one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VlanSpec {
    pub id: VlanId,
    pub description: String,
    pub address: Option<(String, String)>,
}

impl VlanSpec {
    /// Build a spec; the address pair is kept only when both halves are set.
    pub fn new(id: VlanId, description: &str, address: &str, mask: &str) -> Self {
        let (address, mask) = (address.trim(), mask.trim());
        let address = (!address.is_empty() && !mask.is_empty())
            .then(|| (address.to_string(), mask.to_string()));
        Self {
            id,
            description: description.trim().to_string(),
            address,
        }
    }

    pub fn is_layer3(&self) -> bool {
        self.address.is_some()
    }
}

/// Which side of the NAT boundary an interface sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkRole {
    Wan,
    Lan,
    Other,
}

impl NetworkRole {
    /// Parse a role tag case-insensitively; unknown tags map to `Other`.
    pub fn parse(tag: &str) -> Self {
        let tag = tag.trim();
        if tag.eq_ignore_ascii_case("wan") {
            NetworkRole::Wan
        } else if tag.eq_ignore_ascii_case("lan") {
            NetworkRole::Lan
        } else {
            NetworkRole::Other
        }
    }
}

/// How the default gateway of a switch is derived from its address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GatewayPolicy {
    /// Replace the last octet of the switch address.
    LastOctet(u8),
    /// Always use this gateway.
    Fixed(Ipv4Addr),
}

impl Default for GatewayPolicy {
    fn default() -> Self {
        GatewayPolicy::LastOctet(1)
    }
}

impl GatewayPolicy {
    /// Resolve the gateway for a switch address.
    pub fn resolve(&self, address: &str) -> Result<Ipv4Addr, BuildError> {
        match self {
            GatewayPolicy::Fixed(gateway) => Ok(*gateway),
            GatewayPolicy::LastOctet(last) => {
                let parsed: Ipv4Addr =
                    address
                        .trim()
                        .parse()
                        .map_err(|_| BuildError::InvalidAddress {
                            value: address.trim().to_string(),
                        })?;
                let [a, b, c, _] = parsed.octets();
                Ok(Ipv4Addr::new(a, b, c, *last))
            }
        }
    }
}

/// Interface naming for numbered switch ports.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct PortNaming {
    prefix: String,
}

impl PortNaming {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Full interface name for a port number.
    pub fn interface(&self, port: u32) -> String {
        format!("{}{}", self.prefix, port)
    }
}

impl Default for PortNaming {
    fn default() -> Self {
        Self::new("FastEthernet0/")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vlan_parse_optional() {
        assert_eq!(VlanId::parse_optional("").unwrap(), None);
        assert_eq!(VlanId::parse_optional(" 0 ").unwrap(), None);
        assert_eq!(VlanId::parse_optional("10").unwrap(), Some(VlanId(10)));
        assert_eq!(
            VlanId::parse_optional("ten"),
            Err(BuildError::InvalidVlan {
                value: "ten".to_string()
            })
        );
        assert!(VlanId::parse_optional("4095").is_err());
    }

    #[test]
    fn test_vlan_parse_required() {
        assert_eq!(VlanId::parse("20").unwrap().get(), 20);
        assert!(VlanId::parse("").is_err());
        assert!(VlanId::parse("0").is_err());
    }

    #[test]
    fn test_ip_config_from_fields() {
        assert_eq!(IpConfig::from_fields("", "255.0.0.0"), IpConfig::None);
        assert_eq!(IpConfig::from_fields("DHCP", ""), IpConfig::Dhcp);
        assert_eq!(
            IpConfig::from_fields("10.0.0.1", "255.255.255.0"),
            IpConfig::Static {
                address: "10.0.0.1".to_string(),
                mask: "255.255.255.0".to_string()
            }
        );
    }

    #[test]
    fn test_vlan_spec_layer3_needs_both_fields() {
        let id = VlanId::new(20).unwrap();
        assert!(VlanSpec::new(id, "Mgmt", "192.168.1.10", "255.255.255.0").is_layer3());
        assert!(!VlanSpec::new(id, "Mgmt", "192.168.1.10", "").is_layer3());
        assert!(!VlanSpec::new(id, "Data", "", "").is_layer3());
    }

    #[test]
    fn test_network_role() {
        assert_eq!(NetworkRole::parse("WAN"), NetworkRole::Wan);
        assert_eq!(NetworkRole::parse("Lan"), NetworkRole::Lan);
        assert_eq!(NetworkRole::parse("dmz"), NetworkRole::Other);
    }

    #[test]
    fn test_gateway_policy() {
        let policy = GatewayPolicy::default();
        assert_eq!(
            policy.resolve("192.168.5.37").unwrap(),
            Ipv4Addr::new(192, 168, 5, 1)
        );
        assert!(policy.resolve("not-an-ip").is_err());

        let fixed = GatewayPolicy::Fixed(Ipv4Addr::new(10, 0, 0, 254));
        assert_eq!(fixed.resolve("anything").unwrap(), Ipv4Addr::new(10, 0, 0, 254));
    }

    #[test]
    fn test_port_naming() {
        assert_eq!(PortNaming::default().interface(7), "FastEthernet0/7");
        assert_eq!(
            PortNaming::new("GigabitEthernet1/0/").interface(12),
            "GigabitEthernet1/0/12"
        );
    }
}
