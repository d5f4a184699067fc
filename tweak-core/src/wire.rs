//! # Wire Codec
//!
//! Scalability-protocol framing as spoken by a nanomsg `NN_PAIR` socket over its
//! `ipc://` transport.
//!
//! ## Handshake
//! Both ends send an 8-byte header right after connecting:
//! `00 53 50 00` ("\0SP\0"), the protocol id as big-endian u16, two zero bytes.
//!
//! ## Frames
//! Every message is a type byte (`0x01` for a normal message), the payload length
//! as big-endian u64, then the payload.

use std::io::{Read, Write};

use crate::error::SyncError;

/// Protocol id of a PAIR socket (`NN_PROTO_PAIR * 16`).
pub const PROTO_PAIR: u16 = 0x0010;

/// Magic prefix of the handshake header.
pub const SP_MAGIC: [u8; 4] = [0x00, b'S', b'P', 0x00];

/// Type byte of an ordinary message frame.
pub const MSG_NORMAL: u8 = 0x01;

/// Largest payload accepted from the peer.
pub const MAX_FRAME_LEN: u64 = 16 * 1024 * 1024;

pub fn encode_header(protocol: u16) -> [u8; 8] {
    let proto = protocol.to_be_bytes();
    [SP_MAGIC[0], SP_MAGIC[1], SP_MAGIC[2], SP_MAGIC[3], proto[0], proto[1], 0, 0]
}

/// Checks a received handshake header and returns the peer's protocol id.
pub fn decode_header(header: &[u8; 8]) -> Result<u16, SyncError> {
    if header[..4] != SP_MAGIC {
        return Err(SyncError::Handshake(format!(
            "bad magic {:02x?}",
            &header[..4]
        )));
    }
    Ok(u16::from_be_bytes([header[4], header[5]]))
}

/// Exchanges headers with the peer and checks that it is a PAIR socket too.
pub fn handshake<S: Read + Write>(stream: &mut S) -> Result<(), SyncError> {
    stream.write_all(&encode_header(PROTO_PAIR))?;
    stream.flush()?;

    let mut header = [0u8; 8];
    stream.read_exact(&mut header)?;
    let peer = decode_header(&header)?;
    if peer != PROTO_PAIR {
        return Err(SyncError::Handshake(format!(
            "peer speaks protocol {peer:#06x}, expected PAIR ({PROTO_PAIR:#06x})"
        )));
    }
    Ok(())
}

pub fn write_frame<W: Write>(writer: &mut W, payload: &[u8]) -> Result<(), SyncError> {
    let mut head = [0u8; 9];
    head[0] = MSG_NORMAL;
    head[1..].copy_from_slice(&(payload.len() as u64).to_be_bytes());
    writer.write_all(&head)?;
    writer.write_all(payload)?;
    writer.flush()?;
    Ok(())
}

/// Blocks until one complete frame has been read and returns its payload.
pub fn read_frame<R: Read>(reader: &mut R) -> Result<Vec<u8>, SyncError> {
    let mut head = [0u8; 9];
    reader.read_exact(&mut head)?;
    if head[0] != MSG_NORMAL {
        return Err(SyncError::Frame(format!("unknown frame type {:#04x}", head[0])));
    }
    let mut len_bytes = [0u8; 8];
    len_bytes.copy_from_slice(&head[1..]);
    let len = u64::from_be_bytes(len_bytes);
    if len > MAX_FRAME_LEN {
        return Err(SyncError::Frame(format!(
            "frame of {len} bytes exceeds the {MAX_FRAME_LEN} byte limit"
        )));
    }
    let mut payload = vec![0u8; len as usize];
    reader.read_exact(&mut payload)?;
    Ok(payload)
}
