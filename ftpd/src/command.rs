use std::str::FromStr;

use strum_macros::{Display, EnumString};

/// The closed set of verbs the interpreter dispatches on. Anything else
/// on the wire is an [`UnknownCommand`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(ascii_case_insensitive, serialize_all = "UPPERCASE")]
pub enum Verb {
    User,
    Pass,
    Quit,
    Feat,
    Help,
    Noop,
    Syst,
    Type,
    Mode,
    Pwd,
    Cwd,
    Cdup,
    Mkd,
    Size,
    Mdtm,
    Dele,
    Rmd,
    Rnfr,
    Rnto,
    Pasv,
    Epsv,
    Port,
    Eprt,
    Rest,
    Stat,
    List,
    Nlst,
    Retr,
    Stor,
    Pbsz,
    Prot,
    Opts,
}

/// One command read from the control channel: a verb plus the raw,
/// unparsed argument text (empty when none was given).
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    pub verb: Verb,
    pub arg: String,
}

#[derive(Debug, thiserror::Error)]
#[error("command {0:?} not recognized")]
pub struct UnknownCommand(pub String);

impl Command {
    pub fn parse_line(line: &str) -> Result<Command, UnknownCommand> {
        let (verb, arg) = match line.split_once(' ') {
            Some((verb, arg)) => (verb, arg),
            None => (line, ""),
        };
        let verb = Verb::from_str(verb).map_err(|_| UnknownCommand(verb.to_owned()))?;
        Ok(Command {
            verb,
            arg: arg.to_owned(),
        })
    }
}
