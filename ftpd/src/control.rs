use std::io::{self, ErrorKind, Read, Write};

use crate::reply::Reply;

/// Byte stream a control or data channel runs over: plain TCP, or
/// whatever a [`crate::SecureTransport`] wraps it into.
pub trait Stream: Read + Write + Send {}
impl<T: Read + Write + Send> Stream for T {}

const CRLF: &str = "\r\n";
const MAX_LINE: usize = 4096;

pub(crate) struct CrlfStream {
    stream: Box<dyn Stream>,
    buf: Vec<u8>,
}

impl CrlfStream {
    pub fn new(stream: Box<dyn Stream>) -> CrlfStream {
        CrlfStream {
            stream,
            buf: Vec::new(),
        }
    }

    /// Read one CRLF-terminated line, without the terminator. A CRLF may
    /// arrive split across reads; leftover bytes stay buffered for the
    /// next call.
    pub fn read_message(&mut self) -> io::Result<String> {
        loop {
            if let Some(pos) = self.buf.windows(2).position(|w| w == CRLF.as_bytes()) {
                let msg = String::from_utf8_lossy(&self.buf[..pos]).into_owned();
                self.buf.drain(..pos + 2);
                log::debug!("<---- {}", msg);
                return Ok(msg);
            }
            if self.buf.len() > MAX_LINE {
                return Err(io::Error::new(
                    ErrorKind::InvalidData,
                    "control line too long",
                ));
            }
            let mut chunk = [0u8; 1024];
            let n = self.stream.read(&mut chunk)?;
            if n == 0 {
                return Err(io::Error::new(
                    ErrorKind::ConnectionAborted,
                    "client closed the control connection",
                ));
            }
            self.buf.extend_from_slice(&chunk[..n]);
        }
    }

    /// Write one reply. Texts containing `\n` become a multi-line block:
    /// `CODE-first`, space-indented middle lines, and a closing
    /// `CODE last` line.
    pub fn send_reply(&mut self, reply: &Reply) -> io::Result<()> {
        let code = reply.code();
        let text = reply.text();
        let lines: Vec<&str> = text.split('\n').collect();
        let last = lines.len() - 1;
        for (i, line) in lines.iter().enumerate() {
            let framed = if last == 0 {
                format!("{} {}", code, line)
            } else if i == 0 {
                format!("{}-{}", code, line)
            } else if i == last {
                format!("{} {}", code, line)
            } else {
                format!(" {}", line)
            };
            log::debug!("----> {}", framed);
            self.stream.write_all(framed.as_bytes())?;
            self.stream.write_all(CRLF.as_bytes())?;
        }
        self.stream.flush()
    }
}
