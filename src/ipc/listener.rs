//! Readiness-driven control socket server.
//!
//! Binds a Unix stream socket (backlog 1) and multiplexes the listening
//! socket and every accepted connection through one `poll(2)` call.  Each
//! registered handle is an [`Endpoint`]: either the listening socket or a
//! connection awaiting its command.
//!
//! # Wire format
//!
//! A client writes one payload of at most
//! [`MAX_REQUEST_LEN`](crate::command::MAX_REQUEST_LEN) bytes and closes:
//!
//! ```text
//! switch
//! 3: mail
//! ```
//!
//! No reply is sent.

use crate::command::MAX_REQUEST_LEN;
use log::{debug, info, warn};
use nix::errno::Errno;
use nix::poll::{poll, PollFd, PollFlags, PollTimeout};
use nix::sys::socket::{bind, listen, socket, AddressFamily, Backlog, SockFlag, SockType, UnixAddr};
use std::collections::BTreeMap;
use std::fs::DirBuilder;
use std::io::{self, Read};
use std::os::fd::{AsFd, AsRawFd, BorrowedFd};
use std::os::unix::fs::DirBuilderExt;
use std::os::unix::net::{SocketAddr, UnixListener, UnixStream};
use std::path::Path;

/// Errors produced by the control listener.
#[derive(Debug, thiserror::Error)]
pub enum ListenerError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("socket error: {0}")]
    Sys(#[from] Errno),
}

/// Handle of a registered endpoint.  The listening socket is always
/// [`LISTENER`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct Token(u64);

const LISTENER: Token = Token(0);

/// What a registered handle is waiting for.
enum Endpoint {
    Listening(UnixListener),
    AwaitingCommand(UnixStream),
}

impl AsFd for Endpoint {
    fn as_fd(&self) -> BorrowedFd<'_> {
        match self {
            Endpoint::Listening(l) => l.as_fd(),
            Endpoint::AwaitingCommand(s) => s.as_fd(),
        }
    }
}

/// Outcome of servicing a ready endpoint.
enum Ready {
    Accept(io::Result<(UnixStream, SocketAddr)>),
    Read(io::Result<usize>),
}

/// Token-indexed set of endpoints polled together.
struct Registry {
    endpoints: BTreeMap<Token, Endpoint>,
    next: u64,
}

impl Registry {
    fn new(listener: UnixListener) -> Self {
        let mut endpoints = BTreeMap::new();
        endpoints.insert(LISTENER, Endpoint::Listening(listener));
        Self { endpoints, next: 1 }
    }

    fn register(&mut self, stream: UnixStream) -> Token {
        let token = Token(self.next);
        self.next += 1;
        self.endpoints.insert(token, Endpoint::AwaitingCommand(stream));
        token
    }

    /// Drop (and so close) a connection.
    fn unregister(&mut self, token: Token) {
        if token != LISTENER && self.endpoints.remove(&token).is_some() {
            debug!("client disconnected");
        }
    }

    fn len(&self) -> usize {
        self.endpoints.len()
    }

    /// Block until at least one endpoint is ready and return which.
    fn wait(&self) -> Result<Vec<Token>, ListenerError> {
        let (tokens, mut fds): (Vec<Token>, Vec<PollFd<'_>>) = self
            .endpoints
            .iter()
            .map(|(token, ep)| (*token, PollFd::new(ep.as_fd(), PollFlags::POLLIN)))
            .unzip();

        loop {
            match poll(&mut fds, PollTimeout::NONE) {
                Ok(_) => break,
                Err(Errno::EINTR) => continue,
                Err(e) => return Err(e.into()),
            }
        }

        let wake =
            PollFlags::POLLIN | PollFlags::POLLHUP | PollFlags::POLLERR | PollFlags::POLLNVAL;
        Ok(tokens
            .into_iter()
            .zip(fds.iter())
            .filter(|(_, fd)| fd.revents().is_some_and(|r| r.intersects(wake)))
            .map(|(token, _)| token)
            .collect())
    }

    /// Service one ready endpoint, feeding any payload to `on_payload`.
    fn service<F: FnMut(&[u8])>(&mut self, token: Token, on_payload: &mut F) {
        let mut buf = [0u8; MAX_REQUEST_LEN];
        let ready = match self.endpoints.get_mut(&token) {
            Some(Endpoint::Listening(listener)) => Ready::Accept(listener.accept()),
            Some(Endpoint::AwaitingCommand(stream)) => Ready::Read(stream.read(&mut buf)),
            None => return,
        };

        match ready {
            Ready::Accept(Ok((stream, _))) => {
                let token = self.register(stream);
                debug!("client connected ({:?})", token);
            }
            Ready::Accept(Err(e)) => warn!("accept error: {}", e),
            Ready::Read(Ok(0)) => self.unregister(token),
            Ready::Read(Ok(n)) => on_payload(&buf[..n]),
            Ready::Read(Err(e)) if e.kind() == io::ErrorKind::Interrupted => {}
            Ready::Read(Err(e)) => {
                warn!("read error: {}", e);
                self.unregister(token);
            }
        }
    }
}

/// The bound control socket.
pub struct ControlListener {
    listener: UnixListener,
}

impl ControlListener {
    /// Bind the control socket at `path`.
    ///
    /// The parent directory is created with mode `0700` if missing, and a
    /// stale socket file left by a previous run is removed first.
    pub fn bind(path: impl AsRef<Path>) -> Result<Self, ListenerError> {
        let path = path.as_ref().to_path_buf();
        if let Some(dir) = path.parent() {
            DirBuilder::new().recursive(true).mode(0o700).create(dir)?;
        }
        match std::fs::remove_file(&path) {
            Ok(()) => debug!("removed stale socket {}", path.display()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }

        let fd = socket(AddressFamily::Unix, SockType::Stream, SockFlag::SOCK_CLOEXEC, None)?;
        bind(fd.as_raw_fd(), &UnixAddr::new(path.as_path())?)?;
        listen(&fd, Backlog::new(1)?)?;

        info!("listening on {}", path.display());
        Ok(Self {
            listener: UnixListener::from(fd),
        })
    }

    /// Accept connections and pass every payload to `on_payload`.
    ///
    /// This method **blocks** forever and only returns if polling itself
    /// fails.  Errors on a single connection close that connection only.
    pub fn run<F: FnMut(&[u8])>(self, mut on_payload: F) -> Result<(), ListenerError> {
        let mut registry = Registry::new(self.listener);
        loop {
            let ready = registry.wait()?;
            for token in ready {
                registry.service(token, &mut on_payload);
            }
            debug!("{} endpoint(s) registered", registry.len());
        }
    }
}

//  Tests
