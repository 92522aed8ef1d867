//! TFTP packet codec (RFC 1350).

use bytes::{Buf, BufMut, Bytes, BytesMut};
use thiserror::Error;

/// Payload size of a full DATA block. A shorter block ends the transfer.
pub const BLOCK_SIZE: usize = 512;

const OP_RRQ: u16 = 1;
const OP_WRQ: u16 = 2;
const OP_DATA: u16 = 3;
const OP_ACK: u16 = 4;
const OP_ERROR: u16 = 5;

/// TFTP error codes used by the receiver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum ErrorCode {
    NotDefined = 0,
    AccessViolation = 2,
    IllegalOperation = 4,
    UnknownTransferId = 5,
}

impl ErrorCode {
    fn from_u16(code: u16) -> Self {
        match code {
            2 => ErrorCode::AccessViolation,
            4 => ErrorCode::IllegalOperation,
            5 => ErrorCode::UnknownTransferId,
            _ => ErrorCode::NotDefined,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Packet {
    ReadRequest { filename: String, mode: String },
    WriteRequest { filename: String, mode: String },
    Data { block: u16, payload: Bytes },
    Ack { block: u16 },
    Error { code: ErrorCode, message: String },
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum PacketError {
    #[error("packet too short")]
    Truncated,

    #[error("unknown opcode {0}")]
    UnknownOpcode(u16),

    #[error("unterminated string field")]
    Unterminated,

    #[error("string field is not valid UTF-8")]
    InvalidText,
}

impl Packet {
    pub fn decode(datagram: &[u8]) -> Result<Self, PacketError> {
        let mut buf = datagram;
        if buf.remaining() < 2 {
            return Err(PacketError::Truncated);
        }
        let opcode = buf.get_u16();

        match opcode {
            OP_RRQ | OP_WRQ => {
                let (filename, rest) = read_text(buf)?;
                // Option extensions after the mode are ignored.
                let (mode, _) = read_text(rest)?;
                let mode = mode.to_ascii_lowercase();
                Ok(if opcode == OP_RRQ {
                    Packet::ReadRequest { filename, mode }
                } else {
                    Packet::WriteRequest { filename, mode }
                })
            }
            OP_DATA => {
                if buf.remaining() < 2 {
                    return Err(PacketError::Truncated);
                }
                let block = buf.get_u16();
                Ok(Packet::Data {
                    block,
                    payload: Bytes::copy_from_slice(buf),
                })
            }
            OP_ACK => {
                if buf.remaining() < 2 {
                    return Err(PacketError::Truncated);
                }
                Ok(Packet::Ack {
                    block: buf.get_u16(),
                })
            }
            OP_ERROR => {
                if buf.remaining() < 2 {
                    return Err(PacketError::Truncated);
                }
                let code = ErrorCode::from_u16(buf.get_u16());
                // Some clients omit the terminator on error messages.
                let message = match read_text(buf) {
                    Ok((message, _)) => message,
                    Err(_) => String::from_utf8_lossy(buf).into_owned(),
                };
                Ok(Packet::Error { code, message })
            }
            other => Err(PacketError::UnknownOpcode(other)),
        }
    }

    pub fn encode(&self) -> Bytes {
        let mut out = BytesMut::with_capacity(4 + BLOCK_SIZE);
        match self {
            Packet::ReadRequest { filename, mode } | Packet::WriteRequest { filename, mode } => {
                let opcode = if matches!(self, Packet::ReadRequest { .. }) {
                    OP_RRQ
                } else {
                    OP_WRQ
                };
                out.put_u16(opcode);
                put_text(&mut out, filename);
                put_text(&mut out, mode);
            }
            Packet::Data { block, payload } => {
                out.put_u16(OP_DATA);
                out.put_u16(*block);
                out.put_slice(payload);
            }
            Packet::Ack { block } => {
                out.put_u16(OP_ACK);
                out.put_u16(*block);
            }
            Packet::Error { code, message } => {
                out.put_u16(OP_ERROR);
                out.put_u16(*code as u16);
                put_text(&mut out, message);
            }
        }
        out.freeze()
    }

    pub fn error(code: ErrorCode, message: impl Into<String>) -> Self {
        Packet::Error {
            code,
            message: message.into(),
        }
    }
}

/// Split off one NUL-terminated string.
fn read_text(buf: &[u8]) -> Result<(String, &[u8]), PacketError> {
    let end = memchr::memchr(0, buf).ok_or(PacketError::Unterminated)?;
    let text = std::str::from_utf8(&buf[..end]).map_err(|_| PacketError::InvalidText)?;
    Ok((text.to_string(), &buf[end + 1..]))
}

fn put_text(out: &mut BytesMut, text: &str) {
    out.put_slice(text.as_bytes());
    out.put_u8(0);
}
