use std::io;
use std::io::ErrorKind;
use std::net::{IpAddr, SocketAddr, TcpStream};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use crate::auth::Authorizer;
use crate::command::{Command, Verb};
use crate::control::{CrlfStream, Stream};
use crate::data_channel::{DataChannel, DataRepr, NetFamily};
use crate::fs::FileSystem;
use crate::hostport::{parse_eprt, HostPort};
use crate::listing::ListingFormat;
use crate::reply::Reply;
use crate::server::SecureTransport;
use crate::transfer;

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use path_dedot::ParseDot;

const MDTM_FORMAT: &str = "%Y%m%d%H%M%S";

/// Mutable per-connection protocol state. One value per accepted control
/// connection, owned by that connection's thread for its whole lifetime.
pub struct Session {
    pub(crate) control: CrlfStream,
    pub(crate) remote: SocketAddr,
    pub(crate) host: IpAddr,
    pub(crate) user: String,
    pub(crate) password: String,
    pub(crate) authed: bool,
    pub(crate) cwd: String,
    pub(crate) renaming: Option<String>,
    pub(crate) restart: u64,
    pub(crate) epsv_only: bool,
    pub(crate) protected: bool,
    pub(crate) repr: DataRepr,
    pub(crate) data: Option<DataChannel>,
}

impl Session {
    fn new(control: CrlfStream, remote: SocketAddr, host: IpAddr) -> Session {
        Session {
            control,
            remote,
            host,
            user: String::new(),
            password: String::new(),
            authed: false,
            cwd: "/".to_owned(),
            renaming: None,
            restart: 0,
            epsv_only: false,
            protected: false,
            repr: DataRepr::default(),
            data: None,
        }
    }

    /// Name the client authenticated as, empty before login.
    pub fn user(&self) -> &str {
        &self.user
    }

    /// Password the client authenticated with, empty before login.
    pub fn password(&self) -> &str {
        &self.password
    }

    /// Resolve a command argument against the working directory into a
    /// server-rooted path, collapsing `.` and `..` lexically.
    pub(crate) fn resolve(&self, arg: &str) -> String {
        let joined = if arg.starts_with('/') {
            PathBuf::from(arg)
        } else if arg.is_empty() {
            PathBuf::from(&self.cwd)
        } else {
            Path::new(&self.cwd).join(arg)
        };
        match joined.parse_dot() {
            Ok(path) => path.to_string_lossy().into_owned(),
            Err(_) => joined.to_string_lossy().into_owned(),
        }
    }

    pub(crate) fn reply(&mut self, reply: Reply) -> Result<()> {
        self.control
            .send_reply(&reply)
            .context("control channel write failed")
    }
}

/// The read-dispatch-reply engine. One instance is shared read-only by
/// every connection; all mutable state lives in the [`Session`].
pub struct ProtocolInterpreter {
    pub(crate) fs: Arc<dyn FileSystem>,
    pub(crate) authorizer: Option<Arc<dyn Authorizer>>,
    pub(crate) listing: Arc<dyn ListingFormat>,
    pub(crate) security: Option<Arc<dyn SecureTransport>>,
    pub(crate) conn_timeout: Duration,
}

impl ProtocolInterpreter {
    pub fn new(
        fs: Arc<dyn FileSystem>,
        authorizer: Option<Arc<dyn Authorizer>>,
        listing: Arc<dyn ListingFormat>,
        security: Option<Arc<dyn SecureTransport>>,
        conn_timeout: Duration,
    ) -> ProtocolInterpreter {
        ProtocolInterpreter {
            fs,
            authorizer,
            listing,
            security,
            conn_timeout,
        }
    }

    /// Serve one control connection to completion: greet, then read and
    /// dispatch commands until QUIT or a transport failure.
    pub fn handle_client(&self, stream: TcpStream) -> Result<()> {
        let remote = stream.peer_addr()?;
        let host = stream.local_addr()?.ip();
        log::info!("got a new connection from {}", remote);
        let stream: Box<dyn Stream> = match &self.security {
            Some(security) => security.wrap(stream)?,
            None => Box::new(stream),
        };
        let mut session = Session::new(CrlfStream::new(stream), remote, host);
        session.reply(Reply::Greeting)?;

        loop {
            let line = session
                .control
                .read_message()
                .context("control channel read failed")?;
            let command = match Command::parse_line(&line) {
                Ok(command) => Some(command),
                Err(e) => {
                    log::debug!("{}", e);
                    None
                }
            };
            let reply = match &command {
                Some(command) => self.dispatch(&mut session, command)?,
                None if session.authed => Reply::NotImplemented,
                None => Reply::NotLoggedIn,
            };
            session.reply(reply)?;

            let verb = command.map(|c| c.verb);
            if verb == Some(Verb::Quit) {
                log::info!("connection with {} properly closed", remote);
                return Ok(());
            }
            // Two-step sub-protocol state survives exactly one command.
            if verb != Some(Verb::Rnfr) {
                session.renaming = None;
            }
            if verb != Some(Verb::Rest) {
                session.restart = 0;
            }
        }
    }

    fn dispatch(&self, session: &mut Session, command: &Command) -> Result<Reply> {
        use Verb::*;
        match command.verb {
            User | Pass | Feat | Quit | Help | Noop => self.dispatch_global(session, command),
            _ if !session.authed => Ok(Reply::NotLoggedIn),
            _ => self.dispatch_authed(session, command),
        }
    }

    // Commands available whether or not the client has logged in.
    fn dispatch_global(&self, session: &mut Session, command: &Command) -> Result<Reply> {
        let arg = command.arg.as_str();
        Ok(match command.verb {
            Verb::User => {
                if session.authed {
                    Reply::CannotChangeUser
                } else if arg.is_empty() {
                    Reply::UserNameRequired
                } else {
                    session.user = arg.to_owned();
                    Reply::PasswordRequired
                }
            }
            Verb::Pass => return self.login(session, arg),
            Verb::Feat => Reply::Features(self.features()),
            Verb::Quit => Reply::Goodbye,
            Verb::Help => Reply::Help,
            Verb::Noop => Reply::CommandOk,
            _ => Reply::NotImplemented,
        })
    }

    fn login(&self, session: &mut Session, pass: &str) -> Result<Reply> {
        if session.authed {
            return Ok(Reply::AlreadyLoggedIn);
        }
        if session.user.is_empty() {
            return Ok(Reply::LogInFirst);
        }
        if let Some(authorizer) = &self.authorizer {
            match authorizer.authorize(&session.user, pass) {
                Err(e) => {
                    session.user.clear();
                    return Err(e.context("authorizer failure"));
                }
                Ok(false) => {
                    session.user.clear();
                    return Ok(Reply::InvalidCredentials);
                }
                Ok(true) => {}
            }
        }
        session.password = pass.to_owned();
        session.authed = true;
        log::info!("{} logged in as {:?}", session.remote, session.user);
        Ok(Reply::LoggedIn)
    }

    fn dispatch_authed(&self, session: &mut Session, command: &Command) -> Result<Reply> {
        use Verb::*;
        let arg = command.arg.as_str();
        Ok(match command.verb {
            Syst => Reply::SystemType,
            Type => match session.repr.set_type(arg) {
                Ok(()) => {
                    log::debug!("{} switched type to {}", session.remote, session.repr.data_type);
                    Reply::TypeSet
                }
                Err(e) => Reply::BadParameter(e.to_string()),
            },
            Mode => match session.repr.set_mode(arg) {
                Ok(()) => {
                    log::debug!(
                        "{} switched mode to {}",
                        session.remote,
                        session.repr.transfer_mode
                    );
                    Reply::ModeSet
                }
                Err(e) => Reply::BadParameter(e.to_string()),
            },
            Pwd => Reply::CurrentDirectory(session.cwd.clone()),
            Cwd => self.change_dir(session, arg),
            Cdup => self.change_dir(session, ".."),
            Mkd => self.make_dir(session, arg),
            Size => self.size(session, arg),
            Mdtm => self.mod_time(session, arg),
            Dele | Rmd => self.remove(session, arg),
            Rnfr => {
                if arg.is_empty() {
                    Reply::FileNameRequired
                } else {
                    session.renaming = Some(session.resolve(arg));
                    Reply::RenamePending
                }
            }
            Rnto => self.rename_to(session, arg),
            Pasv => self.passive(session),
            Epsv => self.extended_passive(session, arg),
            Port | Eprt => self.active(session, command.verb, arg),
            Rest => match arg.parse::<u64>() {
                Ok(n) => {
                    session.restart = n;
                    Reply::RestartAccepted(n)
                }
                Err(_) => Reply::InvalidSyntax,
            },
            Stat => self.status(session, arg),
            List => transfer::list(self, session, arg, false)?,
            Nlst => transfer::list(self, session, arg, true)?,
            Retr => transfer::retrieve(self, session, arg)?,
            Stor => transfer::store(self, session, arg)?,
            Pbsz => self.pbsz(arg),
            Prot => self.prot(session, arg),
            Opts => {
                if arg.eq_ignore_ascii_case("UTF8 ON") {
                    Reply::Utf8Mode
                } else {
                    Reply::OptionNotUnderstood
                }
            }
            User | Pass | Feat | Quit | Help | Noop => {
                return self.dispatch_global(session, command)
            }
        })
    }

    fn features(&self) -> Vec<String> {
        let mut features = vec!["EPRT", "EPSV", "MDTM", "PASV", "REST STREAM", "SIZE", "UTF8"];
        if self.security.is_some() {
            features.extend(["PBSZ", "PROT"]);
        }
        features.sort_unstable();
        features.into_iter().map(str::to_owned).collect()
    }

    fn change_dir(&self, session: &mut Session, arg: &str) -> Reply {
        if arg.is_empty() {
            return Reply::FailedToChangeDirectory;
        }
        let path = session.resolve(arg);
        match self.fs.stat(&path) {
            Ok(meta) if meta.is_dir => {
                session.cwd = path;
                Reply::DirectoryChanged
            }
            Ok(_) => Reply::FailedToChangeDirectory,
            Err(e) => fs_reply(&e, Reply::NoSuchDirectory, Reply::FailedToChangeDirectory),
        }
    }

    fn make_dir(&self, session: &Session, arg: &str) -> Reply {
        let path = session.resolve(arg);
        match self.fs.make_dir(&path) {
            Ok(()) => Reply::PathCreated(path),
            Err(e) => fs_reply(&e, Reply::NoSuchDirectory, Reply::FailedToCreateDirectory),
        }
    }

    fn size(&self, session: &Session, arg: &str) -> Reply {
        match self.fs.stat(&session.resolve(arg)) {
            Ok(meta) if meta.is_dir => Reply::PathIsDirectory,
            Ok(meta) => Reply::FileSize(meta.size),
            Err(e) => fs_reply(&e, Reply::NoSuchFile, Reply::CouldNotGetSize),
        }
    }

    fn mod_time(&self, session: &Session, arg: &str) -> Reply {
        match self.fs.stat(&session.resolve(arg)) {
            Ok(meta) if meta.is_dir => Reply::CouldNotGetSize,
            Ok(meta) => Reply::ModTime(format_mdtm(meta.modified)),
            Err(e) => fs_reply(&e, Reply::NoSuchFileOrDirectory, Reply::CouldNotGetSize),
        }
    }

    fn remove(&self, session: &Session, arg: &str) -> Reply {
        if arg.is_empty() {
            return Reply::FileNameRequired;
        }
        match self.fs.remove(&session.resolve(arg)) {
            Ok(()) => Reply::Deleted,
            Err(e) => fs_reply(&e, Reply::NoSuchFile, Reply::CouldNotDelete),
        }
    }

    fn rename_to(&self, session: &mut Session, arg: &str) -> Reply {
        if arg.is_empty() {
            return Reply::FileNameRequired;
        }
        let from = match session.renaming.take() {
            Some(from) => from,
            None => return Reply::CallRnfrFirst,
        };
        match self.fs.rename(&from, &session.resolve(arg)) {
            Ok(()) => Reply::Renamed,
            Err(e) => fs_reply(&e, Reply::NoSuchFile, Reply::CouldNotRename),
        }
    }

    fn passive(&self, session: &mut Session) -> Reply {
        if session.epsv_only {
            return Reply::Disallowed("PASV");
        }
        let ip = match session.host {
            IpAddr::V4(ip) => ip,
            IpAddr::V6(_) => {
                log::warn!("PASV requested over an IPv6 control connection");
                return Reply::CantOpenDataConnection;
            }
        };
        match DataChannel::passive(NetFamily::V4, self.conn_timeout) {
            Ok((chan, addr)) => {
                session.data = Some(chan);
                Reply::PassiveMode(HostPort::new(ip, addr.port()))
            }
            Err(e) => {
                log::warn!("passive negotiation failed: {}", e);
                Reply::CantOpenDataConnection
            }
        }
    }

    fn extended_passive(&self, session: &mut Session, arg: &str) -> Reply {
        if arg.eq_ignore_ascii_case("ALL") {
            // One-way ratchet: only EPSV remains usable afterwards.
            session.epsv_only = true;
            return Reply::EpsvAllOk;
        }
        let family = match arg {
            "1" => NetFamily::V4,
            "2" => NetFamily::V6,
            "" => NetFamily::of(&session.host),
            _ => return Reply::UnsupportedProtocol,
        };
        match DataChannel::passive(family, self.conn_timeout) {
            Ok((chan, addr)) => {
                session.data = Some(chan);
                Reply::ExtendedPassiveMode(addr.port())
            }
            Err(e) => {
                log::warn!("passive negotiation failed: {}", e);
                Reply::CantOpenDataConnection
            }
        }
    }

    fn active(&self, session: &mut Session, verb: Verb, arg: &str) -> Reply {
        let name = if verb == Verb::Port { "PORT" } else { "EPRT" };
        if session.epsv_only {
            return Reply::Disallowed(name);
        }
        let addr = match verb {
            Verb::Port => match arg.parse::<HostPort>() {
                Ok(host_port) => SocketAddr::from(&host_port),
                Err(_) => return Reply::InvalidSyntax,
            },
            _ => match parse_eprt(arg) {
                Ok(addr) => addr,
                Err(_) => return Reply::InvalidSyntax,
            },
        };
        match DataChannel::active(addr, self.conn_timeout) {
            Ok(chan) => {
                session.data = Some(chan);
                Reply::CommandOk
            }
            Err(e) => {
                log::warn!("active negotiation with {} failed: {}", addr, e);
                Reply::CantOpenDataConnection
            }
        }
    }

    fn pbsz(&self, arg: &str) -> Reply {
        if self.security.is_none() {
            return Reply::NotImplemented;
        }
        if arg == "0" {
            Reply::CommandOk
        } else {
            Reply::UnacceptableBufferSize
        }
    }

    fn prot(&self, session: &mut Session, arg: &str) -> Reply {
        if self.security.is_none() {
            return Reply::NotImplemented;
        }
        match arg {
            "P" => {
                session.protected = true;
                Reply::ProtectionChanged
            }
            "C" => {
                session.protected = false;
                Reply::ProtectionChanged
            }
            _ => Reply::UnsupportedProtectionLevel,
        }
    }

    // STAT with a path is a LIST addressed to the control channel.
    fn status(&self, session: &Session, arg: &str) -> Reply {
        if arg.is_empty() {
            return Reply::StatusOk;
        }
        let path = session.resolve(arg);
        let entries = match self.fs.stat(&path) {
            Ok(meta) if meta.is_dir => match self.fs.read_dir(&path) {
                Ok(entries) => entries,
                Err(e) => {
                    return fs_reply(&e, Reply::NoSuchFileOrDirectory, Reply::ErrorRetrievingStatus)
                }
            },
            Ok(meta) => vec![meta],
            Err(e) => {
                return fs_reply(&e, Reply::NoSuchFileOrDirectory, Reply::ErrorRetrievingStatus)
            }
        };
        Reply::StatusList(self.listing.render(&entries, false))
    }
}

/// Map a classified filesystem error onto the calling command's replies.
pub(crate) fn fs_reply(err: &io::Error, missing: Reply, fallback: Reply) -> Reply {
    match err.kind() {
        ErrorKind::PermissionDenied => Reply::InsufficientPermissions,
        ErrorKind::NotFound => missing,
        _ => fallback,
    }
}

pub(crate) fn format_mdtm(modified: SystemTime) -> String {
    let modified: DateTime<Local> = modified.into();
    modified.format(MDTM_FORMAT).to_string()
}
