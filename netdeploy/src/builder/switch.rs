//! Switch statement builders: VLANs with their SVI, access ports, trunks
//! and the management interface.

use super::commands::CommandList;
use super::ports::PortSpec;
use super::types::{GatewayPolicy, PortNaming, VlanId, VlanSpec};
use crate::error::BuildError;

/// Build the VLAN definition plus its switched virtual interface.
///
/// Layer-3 VLANs get an `ip address` line on the SVI.
pub fn switch_vlan(spec: &VlanSpec) -> CommandList {
    let mut config = CommandList::new();
    config.push(format!("vlan {}", spec.id));
    config.push(format!("name {}", spec.description));
    config.push(format!("interface vlan {}", spec.id));
    if let Some((address, mask)) = &spec.address {
        config.push(format!("ip address {address} {mask}"));
    }
    config.push("no shutdown");
    config
}

/// One access-port block per port in `ports`.
pub fn access_ports(vlan: VlanId, ports: &PortSpec, naming: &PortNaming) -> CommandList {
    let mut config = CommandList::new();
    for port in ports.ports() {
        config.push(format!("interface {}", naming.interface(port)));
        config.push("switchport mode access");
        config.push(format!("switchport access vlan {vlan}"));
        config.push("no shutdown");
    }
    config
}

/// One trunk block per port in `ports`.
///
/// `allowed` is the VLAN filter list as written in the table; whitespace
/// around commas is dropped.
pub fn trunk(ports: &PortSpec, allowed: &str, naming: &PortNaming) -> CommandList {
    let allowed = allowed
        .split(',')
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .collect::<Vec<_>>()
        .join(",");

    let mut config = CommandList::new();
    for port in ports.ports() {
        config.push(format!("interface {}", naming.interface(port)));
        config.push("switchport mode trunk");
        if !allowed.is_empty() {
            config.push(format!("switchport trunk allowed vlan {allowed}"));
        }
    }
    config
}

/// Fixed management interface block.
pub fn management(address: &str, mask: &str, interface: &str) -> CommandList {
    [
        format!("interface {}", interface.trim()),
        format!("ip address {} {}", address.trim(), mask.trim()),
        "no shutdown".to_string(),
        "exit".to_string(),
    ]
    .into_iter()
    .collect()
}

/// Default gateway statement, with the gateway derived by `policy`.
pub fn default_gateway(address: &str, policy: &GatewayPolicy) -> Result<CommandList, BuildError> {
    let gateway = policy.resolve(address)?;
    Ok([format!("ip default-gateway {gateway}")].into_iter().collect())
}
