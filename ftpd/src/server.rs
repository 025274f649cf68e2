use std::io;
use std::net::{IpAddr, Ipv4Addr, SocketAddr, TcpListener, TcpStream};
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::auth::{Authorizer, User, UserTable};
use crate::control::Stream;
use crate::fs::LocalFs;
use crate::listing::UnixListing;
use crate::session::ProtocolInterpreter;

use anyhow::Result;

/// Transport-security seam. Implementations wrap freshly accepted
/// sockets (TLS or similar); the engine only needs the result to be a
/// byte stream. Configuring one enables PBSZ/PROT and wraps every
/// control connection; PROT P additionally wraps data connections.
pub trait SecureTransport: Send + Sync {
    fn wrap(&self, stream: TcpStream) -> io::Result<Box<dyn Stream>>;
}

#[derive(Clone)]
pub struct FtpConfig {
    pub ip: IpAddr,
    pub port: u16,
    /// Host directory served as "/".
    pub root: PathBuf,
    /// Empty means no authorizer: any USER/PASS pair is accepted.
    pub users: Vec<User>,
    /// Bound on data-channel negotiation (passive accept, active dial).
    pub conn_timeout: Duration,
    pub security: Option<Arc<dyn SecureTransport>>,
}

impl Default for FtpConfig {
    fn default() -> Self {
        FtpConfig {
            ip: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 21,
            root: PathBuf::from("."),
            users: Vec::new(),
            conn_timeout: Duration::from_secs(120),
            security: None,
        }
    }
}

pub struct FtpServer {
    listener: TcpListener,
    interpreter: Arc<ProtocolInterpreter>,
}

impl FtpServer {
    pub fn new(config: FtpConfig) -> Result<FtpServer> {
        let authorizer = if config.users.is_empty() {
            None
        } else {
            Some(Arc::new(UserTable::new(config.users)) as Arc<dyn Authorizer>)
        };
        let interpreter = ProtocolInterpreter::new(
            Arc::new(LocalFs::new(config.root)),
            authorizer,
            Arc::new(UnixListing),
            config.security,
            config.conn_timeout,
        );
        Ok(FtpServer {
            listener: TcpListener::bind((config.ip, config.port))?,
            interpreter: Arc::new(interpreter),
        })
    }

    pub fn addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Accept connections until the listener fails, serving each session
    /// on its own thread. A failing session never affects the others or
    /// the accept loop.
    pub fn run(&self) -> Result<()> {
        for client in self.listener.incoming() {
            let client = client?;
            let interpreter = Arc::clone(&self.interpreter);
            thread::spawn(move || {
                if let Err(e) = interpreter.handle_client(client) {
                    log::error!("an error while handling connection: {:#}", e);
                }
            });
        }
        Ok(())
    }

    /// Accept and serve exactly one connection on this thread.
    pub fn do_one_listen(&self) -> Result<()> {
        let (client, _) = self.listener.accept()?;
        self.interpreter.handle_client(client)
    }
}
