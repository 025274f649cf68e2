use std::io::{self, Seek, SeekFrom, Write};

use crate::control::Stream;
use crate::data_channel::DataChannel;
use crate::reply::Reply;
use crate::session::{fs_reply, ProtocolInterpreter, Session};

use anyhow::Result;

// The orchestration shape shared by every transfer: consume the data
// channel, open the filesystem resource, send the provisional 150,
// apply any restart offset, stream, and let drops close both ends no
// matter which step failed. The first error wins.

pub(crate) fn retrieve(
    interpreter: &ProtocolInterpreter,
    session: &mut Session,
    arg: &str,
) -> Result<Reply> {
    let chan = match session.data.take() {
        Some(chan) => chan,
        None => return Ok(Reply::UsePortOrPasvFirst),
    };
    let path = session.resolve(arg);
    let mut file = match interpreter.fs.open(&path) {
        Ok(file) => file,
        Err(e) => return Ok(fs_reply(&e, Reply::NoSuchFile, Reply::ErrorRetrieving)),
    };
    session.reply(Reply::HereComesFile)?;
    if session.restart > 0 {
        if let Err(e) = file.seek(SeekFrom::Start(session.restart)) {
            return Ok(fs_reply(&e, Reply::NoSuchFile, Reply::ErrorRetrieving));
        }
    }
    let mut conn = match open_data(interpreter, session, chan) {
        Ok(conn) => conn,
        Err(_) => return Ok(Reply::CantOpenDataConnection),
    };
    match io::copy(&mut file, &mut conn) {
        Ok(sent) => {
            log::info!("sent {} ({} bytes) to {}", path, sent, session.remote);
            Ok(Reply::TransferComplete)
        }
        Err(e) => {
            log::warn!("error sending {} to {}: {}", path, session.remote, e);
            Ok(fs_reply(&e, Reply::NoSuchFile, Reply::ErrorRetrieving))
        }
    }
}

pub(crate) fn store(
    interpreter: &ProtocolInterpreter,
    session: &mut Session,
    arg: &str,
) -> Result<Reply> {
    let chan = match session.data.take() {
        Some(chan) => chan,
        None => return Ok(Reply::UsePortOrPasvFirst),
    };
    let path = session.resolve(arg);
    let mut file = match interpreter.fs.create(&path) {
        Ok(file) => file,
        Err(e) => return Ok(fs_reply(&e, Reply::NoSuchFile, Reply::ErrorStoring)),
    };
    session.reply(Reply::AwaitingData)?;
    if session.restart > 0 {
        if let Err(e) = file.seek(SeekFrom::Start(session.restart)) {
            return Ok(fs_reply(&e, Reply::NoSuchFile, Reply::ErrorStoring));
        }
    }
    let mut conn = match open_data(interpreter, session, chan) {
        Ok(conn) => conn,
        Err(_) => return Ok(Reply::CantOpenDataConnection),
    };
    if let Err(e) = io::copy(&mut conn, &mut file) {
        log::warn!("error receiving {} from {}: {}", path, session.remote, e);
        return Ok(fs_reply(&e, Reply::NoSuchFile, Reply::ErrorStoring));
    }
    // A close failure only matters when nothing went wrong earlier.
    if let Err(e) = file.flush() {
        log::warn!("error finishing {}: {}", path, e);
        return Ok(fs_reply(&e, Reply::NoSuchFile, Reply::ErrorStoring));
    }
    log::info!("stored {} from {}", path, session.remote);
    Ok(Reply::TransferComplete)
}

pub(crate) fn list(
    interpreter: &ProtocolInterpreter,
    session: &mut Session,
    arg: &str,
    names_only: bool,
) -> Result<Reply> {
    let chan = match session.data.take() {
        Some(chan) => chan,
        None => return Ok(Reply::UsePortOrPasvFirst),
    };
    let path = session.resolve(&strip_list_flags(arg));
    let entries = match interpreter.fs.read_dir(&path) {
        Ok(entries) => entries,
        Err(e) => return Ok(fs_reply(&e, Reply::NoSuchDirectory, Reply::ErrorListing)),
    };
    session.reply(Reply::HereComesList)?;
    let mut conn = match open_data(interpreter, session, chan) {
        Ok(conn) => conn,
        Err(_) => return Ok(Reply::CantOpenDataConnection),
    };
    for line in interpreter.listing.render(&entries, names_only) {
        if let Err(e) = conn
            .write_all(line.as_bytes())
            .and_then(|_| conn.write_all(b"\r\n"))
        {
            log::warn!("error listing {} to {}: {}", path, session.remote, e);
            return Ok(Reply::ErrorListing);
        }
    }
    Ok(Reply::DirectorySent)
}

fn open_data(
    interpreter: &ProtocolInterpreter,
    session: &Session,
    chan: DataChannel,
) -> io::Result<Box<dyn Stream>> {
    let stream = chan.open(session.remote.ip()).map_err(|e| {
        log::warn!("data connection with {} failed: {}", session.remote, e);
        e
    })?;
    match (&interpreter.security, session.protected) {
        (Some(security), true) => security.wrap(stream),
        _ => Ok(Box::new(stream)),
    }
}

/// Some clients assume LIST accepts ls-style flags. Drop leading
/// `-`-prefixed tokens before treating the rest as a path.
fn strip_list_flags(arg: &str) -> String {
    if !arg.trim_start().starts_with('-') {
        return arg.to_owned();
    }
    arg.split(' ')
        .filter(|token| !token.starts_with('-'))
        .collect::<Vec<_>>()
        .join(" ")
}
