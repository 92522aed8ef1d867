//! Write-only TFTP listener.

use std::net::SocketAddr;
use std::path::{Component, Path, PathBuf};
use std::time::Duration;

use log::{debug, info, warn};
use tokio::net::UdpSocket;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use super::packet::{BLOCK_SIZE, ErrorCode, Packet};
use crate::error::{ArchiveError, Error, Result};

/// Largest datagram accepted: a full DATA block plus its header.
const MAX_DATAGRAM: usize = BLOCK_SIZE + 4;

/// Receives backups pushed by devices and stores them under `root`.
#[derive(Debug, Clone)]
pub struct TftpServer {
    root: PathBuf,
    bind: SocketAddr,
    timeout: Duration,
    retries: u32,
}

impl TftpServer {
    pub fn new(root: impl Into<PathBuf>, bind: SocketAddr) -> Self {
        Self {
            root: root.into(),
            bind,
            timeout: Duration::from_secs(5),
            retries: 5,
        }
    }

    /// Wait per block before resending the last ACK.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    /// Start listening in a background task.
    ///
    /// The listener stops when the returned handle is shut down or dropped.
    pub fn spawn(self) -> TftpHandle {
        let (ready_tx, ready_rx) = oneshot::channel();
        let (stop_tx, stop_rx) = oneshot::channel();
        let task = tokio::spawn(self.run(ready_tx, stop_rx));
        TftpHandle {
            ready: Some(ready_rx),
            addr: None,
            stop: Some(stop_tx),
            task,
        }
    }

    async fn run(
        self,
        ready: oneshot::Sender<Result<SocketAddr>>,
        mut stop: oneshot::Receiver<()>,
    ) {
        let socket = match self.bind_listener().await {
            Ok(socket) => socket,
            Err(e) => {
                let _ = ready.send(Err(e));
                return;
            }
        };
        let local = match socket.local_addr() {
            Ok(addr) => addr,
            Err(source) => {
                let _ = ready.send(Err(ArchiveError::ListenerFailed {
                    addr: self.bind,
                    source,
                }
                .into()));
                return;
            }
        };
        info!("TFTP listener on {} storing into {}", local, self.root.display());
        let _ = ready.send(Ok(local));

        let mut buf = [0u8; MAX_DATAGRAM];
        loop {
            tokio::select! {
                _ = &mut stop => break,
                received = socket.recv_from(&mut buf) => {
                    let (len, peer) = match received {
                        Ok(r) => r,
                        Err(e) => {
                            warn!("TFTP receive failed: {}", e);
                            continue;
                        }
                    };
                    self.dispatch(&socket, &buf[..len], peer, local).await;
                }
            }
        }
        debug!("TFTP listener on {} stopped", local);
    }

    async fn bind_listener(&self) -> Result<UdpSocket> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|source| Error::Io {
                path: self.root.clone(),
                source,
            })?;
        UdpSocket::bind(self.bind).await.map_err(|source| {
            ArchiveError::ListenerFailed {
                addr: self.bind,
                source,
            }
            .into()
        })
    }

    async fn dispatch(&self, socket: &UdpSocket, datagram: &[u8], peer: SocketAddr, local: SocketAddr) {
        let reply = match Packet::decode(datagram) {
            Ok(Packet::WriteRequest { filename, mode }) => match sanitize(&filename) {
                Some(name) => {
                    debug!("TFTP write request from {} for {} ({})", peer, name, mode);
                    let transfer = Transfer {
                        path: self.root.join(name),
                        peer,
                        timeout: self.timeout,
                        retries: self.retries,
                    };
                    tokio::spawn(transfer.run(local));
                    return;
                }
                None => {
                    warn!("TFTP refused write of '{}' from {}", filename, peer);
                    Packet::error(ErrorCode::AccessViolation, "invalid filename")
                }
            },
            Ok(Packet::ReadRequest { .. }) => {
                Packet::error(ErrorCode::IllegalOperation, "read requests not supported")
            }
            Ok(_) => Packet::error(ErrorCode::UnknownTransferId, "no transfer in progress"),
            Err(e) => {
                debug!("TFTP malformed packet from {}: {}", peer, e);
                Packet::error(ErrorCode::IllegalOperation, e.to_string())
            }
        };
        if let Err(e) = socket.send_to(&reply.encode(), peer).await {
            debug!("TFTP reply to {} failed: {}", peer, e);
        }
    }
}

/// Keep only plain file names inside the root directory.
fn sanitize(filename: &str) -> Option<&str> {
    let path = Path::new(filename);
    let mut components = path.components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None)
            if !filename.contains(['/', '\\', '\0']) && filename != "." =>
        {
            Some(filename)
        }
        _ => None,
    }
}

/// One write transfer on its own socket (the server's transfer id).
struct Transfer {
    path: PathBuf,
    peer: SocketAddr,
    timeout: Duration,
    retries: u32,
}

impl Transfer {
    async fn run(self, local: SocketAddr) {
        let path = self.path.clone();
        match self.receive(local).await {
            Ok(size) => info!("TFTP stored {} ({} bytes)", path.display(), size),
            Err(e) => warn!("TFTP transfer of {} failed: {}", path.display(), e),
        }
    }

    async fn receive(self, local: SocketAddr) -> std::io::Result<usize> {
        let socket = UdpSocket::bind(SocketAddr::new(local.ip(), 0)).await?;
        socket.connect(self.peer).await?;

        let mut contents = Vec::new();
        let mut last_ack = Packet::Ack { block: 0 }.encode();
        let mut expected: u16 = 1;
        let mut attempts = 0;
        let mut buf = [0u8; MAX_DATAGRAM];

        socket.send(&last_ack).await?;
        loop {
            let len = match tokio::time::timeout(self.timeout, socket.recv(&mut buf)).await {
                Ok(received) => received?,
                Err(_) => {
                    attempts += 1;
                    if attempts > self.retries {
                        return Err(std::io::Error::new(
                            std::io::ErrorKind::TimedOut,
                            format!("no data from {} after {} retries", self.peer, self.retries),
                        ));
                    }
                    socket.send(&last_ack).await?;
                    continue;
                }
            };

            match Packet::decode(&buf[..len]) {
                Ok(Packet::Data { block, payload }) if block == expected => {
                    attempts = 0;
                    contents.extend_from_slice(&payload);
                    last_ack = Packet::Ack { block }.encode();

                    if payload.len() < BLOCK_SIZE {
                        // On disk before the final ACK reaches the device.
                        tokio::fs::write(&self.path, &contents).await?;
                        socket.send(&last_ack).await?;
                        return Ok(contents.len());
                    }
                    socket.send(&last_ack).await?;
                    expected = expected.wrapping_add(1);
                }
                Ok(Packet::Data { .. }) => {
                    // Duplicate of an acknowledged block.
                    socket.send(&last_ack).await?;
                }
                Ok(Packet::Error { code, message }) => {
                    return Err(std::io::Error::other(format!(
                        "peer aborted ({:?}): {}",
                        code, message
                    )));
                }
                Ok(_) | Err(_) => {
                    let reply = Packet::error(ErrorCode::IllegalOperation, "expected DATA");
                    socket.send(&reply.encode()).await?;
                }
            }
        }
    }
}

/// Handle to a running [`TftpServer`].
pub struct TftpHandle {
    ready: Option<oneshot::Receiver<Result<SocketAddr>>>,
    addr: Option<SocketAddr>,
    stop: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl TftpHandle {
    /// Wait until the listener is bound. Returns the bound address.
    pub async fn ready(&mut self) -> Result<SocketAddr> {
        if let Some(addr) = self.addr {
            return Ok(addr);
        }
        let rx = self.ready.take().ok_or(ArchiveError::ListenerStopped)?;
        let addr = rx.await.map_err(|_| ArchiveError::ListenerStopped)??;
        self.addr = Some(addr);
        Ok(addr)
    }

    /// Stop the listener and wait for it to exit. Transfers in flight run
    /// to completion on their own sockets.
    pub async fn shutdown(mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        let _ = (&mut self.task).await;
    }
}
