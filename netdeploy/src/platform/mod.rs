//! Platform definitions: prompt patterns and privilege levels.
//!
//! Only Cisco IOS is defined; the session layer takes any
//! [`PlatformDefinition`], so another family is a new constructor away.

pub mod cisco_ios;
mod definition;
mod privilege_level;

pub use definition::PlatformDefinition;
pub use privilege_level::{Mode, PrivilegeLevel};
