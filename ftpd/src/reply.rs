use crate::hostport::HostPort;

use strum::EnumMessage;
use strum_macros::EnumMessage;

/// Every reply the interpreter can send. Status codes follow the usual
/// three-digit families: 1xx preliminary, 2xx success, 3xx pending
/// further input, 4xx transient failure, 5xx permanent failure.
/// Messages containing `\n` are framed as multi-line blocks by the
/// control channel.
#[derive(Debug, PartialEq, EnumMessage)]
pub enum Reply {
    #[strum(message = "Here comes the file.")]
    HereComesFile,
    #[strum(message = "Awaiting file data.")]
    AwaitingData,
    #[strum(message = "Here comes the list.")]
    HereComesList,

    #[strum(message = "OK.")]
    CommandOk,
    #[strum(message = "Type switched successfully.")]
    TypeSet,
    #[strum(message = "Mode switched successfully.")]
    ModeSet,
    #[strum(message = "EPSV ALL ok.")]
    EpsvAllOk,
    #[strum(message = "Protection level changed.")]
    ProtectionChanged,
    #[strum(message = "Always in UTF8 mode.")]
    Utf8Mode,
    #[strum(message = "Extensions supported:\n{}\nEnd.")]
    Features(Vec<String>),
    #[strum(message = "Looks good to me.")]
    StatusOk,
    #[strum(message = "{}")]
    FileSize(u64),
    #[strum(message = "{}")]
    ModTime(String),
    #[strum(message = "Status:\n{}\nEnd.")]
    StatusList(Vec<String>),
    #[strum(
        message = "The following commands are recognized.\nCDUP CWD  DELE EPRT EPSV FEAT HELP LIST MDTM MKD  MODE NLST NOOP OPTS\nPASS PASV PBSZ PORT PROT PWD  QUIT REST RETR RMD  RNFR RNTO SIZE STAT\nSTOR SYST TYPE USER\nHelp OK."
    )]
    Help,
    #[strum(message = "UNIX Type: L8")]
    SystemType,
    #[strum(message = "Welcome.")]
    Greeting,
    #[strum(message = "Goodbye.")]
    Goodbye,
    #[strum(message = "Transfer complete.")]
    TransferComplete,
    #[strum(message = "Directory send OK.")]
    DirectorySent,
    #[strum(message = "Entering Passive Mode ({}).")]
    PassiveMode(HostPort),
    #[strum(message = "Entering Extended Passive Mode (|||{}|)")]
    ExtendedPassiveMode(u16),
    #[strum(message = "Login successful.")]
    LoggedIn,
    #[strum(message = "Already logged in.")]
    AlreadyLoggedIn,
    #[strum(message = "Directory successfully changed.")]
    DirectoryChanged,
    #[strum(message = "Successfully deleted file.")]
    Deleted,
    #[strum(message = "Successfully renamed file.")]
    Renamed,
    #[strum(message = "{} created.")]
    PathCreated(String),
    #[strum(message = "{} is the current directory.")]
    CurrentDirectory(String),

    #[strum(message = "Please specify the password.")]
    PasswordRequired,
    #[strum(message = "Call RNTO to specify destination.")]
    RenamePending,
    #[strum(message = "Restart position accepted ({}).")]
    RestartAccepted(u64),

    #[strum(message = "Can't open data connection.")]
    CantOpenDataConnection,
    #[strum(message = "Use PORT or PASV first.")]
    UsePortOrPasvFirst,
    #[strum(message = "Invalid user name or password.")]
    InvalidCredentials,

    #[strum(message = "Invalid syntax.")]
    InvalidSyntax,
    #[strum(message = "A file name is required.")]
    FileNameRequired,
    #[strum(message = "Option not understood.")]
    OptionNotUnderstood,
    #[strum(message = "Not implemented.")]
    NotImplemented,
    #[strum(message = "Log in with USER first.")]
    LogInFirst,
    #[strum(message = "Call RNFR first.")]
    CallRnfrFirst,
    #[strum(message = "A user name is required.")]
    UserNameRequired,
    #[strum(message = "{}")]
    BadParameter(String),
    #[strum(message = "Unsupported protection level.")]
    UnsupportedProtectionLevel,
    #[strum(message = "Unsupported protocol.")]
    UnsupportedProtocol,
    #[strum(message = "Cannot change user.")]
    CannotChangeUser,
    #[strum(message = "Log in with USER and PASS.")]
    NotLoggedIn,
    #[strum(message = "Unacceptable buffer size. PBSZ=0")]
    UnacceptableBufferSize,

    #[strum(message = "Insufficient permissions.")]
    InsufficientPermissions,
    #[strum(message = "No such file.")]
    NoSuchFile,
    #[strum(message = "No such directory.")]
    NoSuchDirectory,
    #[strum(message = "No such file or directory.")]
    NoSuchFileOrDirectory,
    #[strum(message = "Failed to change directory.")]
    FailedToChangeDirectory,
    #[strum(message = "Failed to create directory.")]
    FailedToCreateDirectory,
    #[strum(message = "Could not get size.")]
    CouldNotGetSize,
    #[strum(message = "Path specifies a directory.")]
    PathIsDirectory,
    #[strum(message = "Could not delete file.")]
    CouldNotDelete,
    #[strum(message = "Could not rename file.")]
    CouldNotRename,
    #[strum(message = "Error retrieving status.")]
    ErrorRetrievingStatus,
    #[strum(message = "Error listing directory.")]
    ErrorListing,
    #[strum(message = "Error retrieving file.")]
    ErrorRetrieving,
    #[strum(message = "Error storing file.")]
    ErrorStoring,
    #[strum(message = "{} is disallowed.")]
    Disallowed(&'static str),
}

impl Reply {
    pub fn code(&self) -> u16 {
        use Reply::*;
        match self {
            HereComesFile | AwaitingData | HereComesList => 150,

            CommandOk | TypeSet | ModeSet | EpsvAllOk | ProtectionChanged | Utf8Mode => 200,
            Features(_) | StatusOk => 211,
            FileSize(_) | ModTime(_) | StatusList(_) => 213,
            Help => 214,
            SystemType => 215,
            Greeting => 220,
            Goodbye => 221,
            TransferComplete | DirectorySent => 226,
            PassiveMode(_) => 227,
            ExtendedPassiveMode(_) => 229,
            LoggedIn | AlreadyLoggedIn => 230,
            DirectoryChanged | Deleted | Renamed => 250,
            PathCreated(_) | CurrentDirectory(_) => 257,

            PasswordRequired => 331,
            RenamePending | RestartAccepted(_) => 350,

            CantOpenDataConnection | UsePortOrPasvFirst => 425,
            InvalidCredentials => 430,

            InvalidSyntax | FileNameRequired | OptionNotUnderstood => 501,
            NotImplemented => 502,
            LogInFirst | CallRnfrFirst => 503,
            UserNameRequired | BadParameter(_) | UnsupportedProtectionLevel => 504,
            UnsupportedProtocol => 522,
            CannotChangeUser | NotLoggedIn => 530,
            UnacceptableBufferSize => 534,

            InsufficientPermissions | NoSuchFile | NoSuchDirectory | NoSuchFileOrDirectory
            | FailedToChangeDirectory | FailedToCreateDirectory | CouldNotGetSize
            | PathIsDirectory | CouldNotDelete | CouldNotRename | ErrorRetrievingStatus
            | ErrorListing | ErrorRetrieving | ErrorStoring | Disallowed(_) => 550,
        }
    }

    pub fn text(&self) -> String {
        use Reply::*;
        let message = self.get_message().unwrap_or_default();
        match self {
            Features(lines) | StatusList(lines) => message.replace("{}", &lines.join("\n")),
            FileSize(n) => message.replace("{}", &n.to_string()),
            ModTime(mdtm) => message.replace("{}", mdtm),
            PassiveMode(host_port) => message.replace("{}", &host_port.to_string()),
            ExtendedPassiveMode(port) => message.replace("{}", &port.to_string()),
            PathCreated(path) | CurrentDirectory(path) => message.replace("{}", &quote(path)),
            RestartAccepted(n) => message.replace("{}", &n.to_string()),
            BadParameter(reason) => message.replace("{}", reason),
            Disallowed(verb) => message.replace("{}", verb),
            _ => message.to_owned(),
        }
    }
}

impl ToString for Reply {
    fn to_string(&self) -> String {
        format!("{} {}", self.code(), self.text())
    }
}

/// Double-quote a path, doubling any embedded quotes.
fn quote(path: &str) -> String {
    format!("\"{}\"", path.replace('"', "\"\""))
}
