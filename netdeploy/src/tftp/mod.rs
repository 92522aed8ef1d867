//! In-process TFTP receiver for running-config backups.
//!
//! Only write requests are served: devices push `copy running-config
//! tftp://...` and the file lands under the configured root. Transfers use
//! 512-byte blocks in lock-step, each on its own socket as RFC 1350
//! describes. Callers await [`TftpHandle::ready`] before asking a device to
//! copy, so the first backup never races the bind.

pub mod packet;
mod server;

pub use packet::{ErrorCode, Packet, PacketError};
pub use server::{TftpHandle, TftpServer};
