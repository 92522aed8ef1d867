//! Router statement builders: routed interfaces, VLANs, NAT and static routes.
//!
//! Sub-statements are indented by one space, the way `show running-config`
//! prints them.

use super::commands::CommandList;
use super::types::{IpConfig, NetworkRole, VlanId};
use crate::error::BuildError;

/// Build a routed interface block.
///
/// `vlan` is the raw column text: empty or `0` means untagged. Non-numeric
/// text and ids above 4094 fail with [`BuildError::InvalidVlan`].
pub fn interface(
    id: &str,
    description: &str,
    vlan: &str,
    ip: &IpConfig,
) -> Result<CommandList, BuildError> {
    let vlan = VlanId::parse_optional(vlan)?;

    let mut config = CommandList::new();
    config.push(format!("interface {}", id.trim()));

    let description = description.trim();
    if !description.is_empty() {
        config.push(format!(" description {description}"));
    }
    if let Some(vlan) = vlan {
        config.push(format!(" encapsulation dot1Q {vlan}"));
    }
    match ip {
        IpConfig::None => {}
        IpConfig::Dhcp => config.push(" ip address dhcp"),
        IpConfig::Static { address, mask } => {
            config.push(format!(" ip address {address} {mask}").trim_end().to_string())
        }
    }
    config.push(" no shutdown");
    config.push(" exit");
    Ok(config)
}

/// Build a VLAN database block.
pub fn vlan(id: VlanId, description: &str) -> CommandList {
    let mut config = CommandList::new();
    config.push(format!("vlan {id}"));
    let description = description.trim();
    if !description.is_empty() {
        config.push(format!(" name {description}"));
    }
    config.push(" exit");
    config
}

/// Mark an interface as NAT inside (LAN) or outside (WAN).
///
/// Yields nothing for other roles or an empty interface.
pub fn nat(role: NetworkRole, interface: &str) -> CommandList {
    let interface = interface.trim();
    let statement = match role {
        _ if interface.is_empty() => return CommandList::new(),
        NetworkRole::Wan => " ip nat outside",
        NetworkRole::Lan => " ip nat inside",
        NetworkRole::Other => return CommandList::new(),
    };
    [format!("interface {interface}"), statement.to_string(), " exit".to_string()]
        .into_iter()
        .collect()
}

/// Build a static route; yields nothing unless all three fields are set.
pub fn static_route(address: &str, mask: &str, gateway: &str) -> CommandList {
    let (address, mask, gateway) = (address.trim(), mask.trim(), gateway.trim());
    if address.is_empty() || mask.is_empty() || gateway.is_empty() {
        return CommandList::new();
    }
    [format!("ip route {address}/{mask} {gateway}")]
        .into_iter()
        .collect()
}
