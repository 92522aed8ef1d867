//! Command builders.
//!
//! Each builder takes a narrow set of typed parameters (never a whole row)
//! and returns an ordered [`CommandList`] fragment. Builders are pure: the
//! same input always yields the same statements.

mod commands;
pub mod ports;
pub mod router;
pub mod switch;
mod types;

pub use commands::CommandList;
pub use ports::PortSpec;
pub use types::{GatewayPolicy, IpConfig, NetworkRole, PortNaming, VlanId, VlanSpec};
