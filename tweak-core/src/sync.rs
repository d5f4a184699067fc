//! # Sync Channel
//!
//! The single connection to the parameter peer. The peer owns a PAIR socket bound
//! to a Unix domain path; this side connects, waits for one message naming the
//! file to edit, then pushes the whole document back after every edit.
//!
//! ## Threads
//! - **Caller thread**: connects, reads the path, queues outgoing messages.
//! - **Writer thread**: owns a clone of the socket and drains the outbound queue,
//!   so a slow peer never stalls the UI thread.

use crossbeam_channel::Sender;
use std::net::Shutdown;
use std::os::unix::net::UnixStream;
use std::path::PathBuf;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::config::CLOSE_FLUSH_TIMEOUT;
use crate::document::Document;
use crate::error::SyncError;
use crate::wire;

/// Something that forwards a serialized document to the peer.
///
/// Delivery is fire-and-forget: implementations never block on the peer and
/// never report failures back to the caller.
pub trait Publish {
    fn publish(&self, message: String);

    /// Sends the full document as one message.
    fn broadcast(&self, document: &Document) {
        self.publish(document.to_message());
    }
}

/// Resolves an `ipc://<path>` address to its socket path.
pub fn parse_address(address: &str) -> Result<PathBuf, SyncError> {
    match address.strip_prefix("ipc://") {
        Some(path) if !path.is_empty() => Ok(PathBuf::from(path)),
        _ => Err(SyncError::Address(address.to_string())),
    }
}

/// Open connection to the parameter peer.
#[derive(Debug)]
pub struct SyncChannel {
    address: String,
    stream: UnixStream,
    outbound: Option<Sender<String>>,
    writer: Option<JoinHandle<()>>,
}

impl SyncChannel {
    /// Connects to the peer at `address` and completes the PAIR handshake.
    ///
    /// Fails straight away when nothing is listening; there is no retry.
    pub fn connect(address: &str) -> Result<Self, SyncError> {
        let path = parse_address(address)?;
        let mut stream = UnixStream::connect(&path).map_err(|source| SyncError::Connect {
            address: address.to_string(),
            source,
        })?;
        wire::handshake(&mut stream)?;
        info!(%address, "connected to parameter peer");

        let mut write_half = stream.try_clone()?;
        let (outbound, queue) = crossbeam_channel::unbounded::<String>();
        let writer = thread::Builder::new()
            .name("sync-writer".into())
            .spawn(move || {
                debug!("sync writer started");
                for message in queue.iter() {
                    if let Err(e) = wire::write_frame(&mut write_half, message.as_bytes()) {
                        warn!("send failed, dropping further updates: {e}");
                        break;
                    }
                }
                debug!("sync writer finished");
            })?;

        Ok(Self {
            address: address.to_string(),
            stream,
            outbound: Some(outbound),
            writer: Some(writer),
        })
    }

    /// Blocks until the peer sends one message and returns it as the path to edit.
    pub fn receive_path(&mut self) -> Result<String, SyncError> {
        if self.outbound.is_none() {
            return Err(SyncError::Closed);
        }
        let payload = wire::read_frame(&mut self.stream)?;
        let path = String::from_utf8(payload)?;
        info!(%path, "received document path");
        Ok(path)
    }

    pub fn is_open(&self) -> bool {
        self.outbound.is_some()
    }

    /// Releases the connection.
    ///
    /// Messages already queued get up to `CLOSE_FLUSH_TIMEOUT` to reach the
    /// peer. After that the socket is shut down, which fails any write still
    /// blocked on a peer that stopped reading, and whatever is left is dropped.
    /// Calling this more than once is harmless.
    pub fn close(&mut self) {
        self.close_within(CLOSE_FLUSH_TIMEOUT);
    }

    fn close_within(&mut self, flush_timeout: Duration) {
        let Some(outbound) = self.outbound.take() else {
            return;
        };
        drop(outbound);

        let writer = self.writer.take();
        if let Some(writer) = &writer {
            let deadline = Instant::now() + flush_timeout;
            while !writer.is_finished() && Instant::now() < deadline {
                thread::sleep(Duration::from_millis(5));
            }
            if !writer.is_finished() {
                warn!("peer is not reading; dropping unsent updates");
            }
        }
        if let Err(e) = self.stream.shutdown(Shutdown::Both) {
            debug!("socket shutdown: {e}");
        }
        if let Some(writer) = writer {
            if writer.join().is_err() {
                warn!("sync writer thread panicked");
            }
        }
        info!(address = %self.address, "sync channel closed");
    }
}

impl Publish for SyncChannel {
    fn publish(&self, message: String) {
        match &self.outbound {
            Some(outbound) => {
                if outbound.send(message).is_err() {
                    debug!("sync writer is gone; update dropped");
                }
            }
            None => debug!("sync channel closed; update dropped"),
        }
    }
}

impl Drop for SyncChannel {
    fn drop(&mut self) {
        self.close();
    }
}
