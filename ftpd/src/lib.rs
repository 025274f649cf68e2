mod auth;
mod command;
mod control;
mod data_channel;
mod fs;
mod hostport;
mod listing;
mod reply;
mod server;
mod session;
mod transfer;

pub use auth::{Authorizer, User, UserTable};
pub use command::{Command, UnknownCommand, Verb};
pub use control::Stream;
pub use fs::{FileRead, FileSystem, FileWrite, LocalFs, Metadata};
pub use hostport::HostPort;
pub use listing::{ListingFormat, UnixListing};
pub use reply::Reply;
pub use server::{FtpConfig, FtpServer, SecureTransport};
pub use session::{ProtocolInterpreter, Session};
