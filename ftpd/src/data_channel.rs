use std::io::{self, ErrorKind};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr, TcpListener, TcpStream};
use std::str::FromStr;
use std::thread::sleep;
use std::time::{Duration, Instant};

use strum_macros::{Display, EnumString};

#[derive(Debug, Clone, Copy, PartialEq, Display, EnumString)]
pub enum DataType {
    #[strum(serialize = "A")]
    Ascii,
    #[strum(serialize = "E")]
    Ebcdic,
    #[strum(serialize = "I")]
    Image,
    #[strum(serialize = "L")]
    Local,
}

impl Default for DataType {
    fn default() -> Self {
        DataType::Ascii
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Display, EnumString)]
pub enum TransferMode {
    #[strum(serialize = "S")]
    Stream,
    #[strum(serialize = "B")]
    Block,
    #[strum(serialize = "C")]
    Compressed,
}

impl Default for TransferMode {
    fn default() -> Self {
        TransferMode::Stream
    }
}

#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct ReprError(String);

/// Representation negotiated over TYPE and MODE. Transfers are always
/// byte-exact; the setters only police what clients may select.
#[derive(Default)]
pub struct DataRepr {
    pub data_type: DataType,
    pub transfer_mode: TransferMode,
}

impl DataRepr {
    pub fn set_type(&mut self, arg: &str) -> Result<(), ReprError> {
        let (letter, param) = match arg.split_once(' ') {
            Some((letter, param)) => (letter, Some(param)),
            None => (arg, None),
        };
        let data_type = DataType::from_str(letter)
            .map_err(|_| ReprError(format!("unknown representation type {:?}", arg)))?;
        match data_type {
            DataType::Ascii => {
                if !matches!(param, None | Some("N")) {
                    return Err(ReprError("only non-print format is supported".to_owned()));
                }
            }
            DataType::Image => {
                if param.is_some() {
                    return Err(ReprError(format!("unknown representation type {:?}", arg)));
                }
            }
            DataType::Local => {
                if param != Some("8") {
                    return Err(ReprError("only 8-bit logical bytes are supported".to_owned()));
                }
            }
            DataType::Ebcdic => {
                return Err(ReprError("EBCDIC is not supported".to_owned()));
            }
        }
        self.data_type = data_type;
        Ok(())
    }

    pub fn set_mode(&mut self, arg: &str) -> Result<(), ReprError> {
        let mode = TransferMode::from_str(arg)
            .map_err(|_| ReprError(format!("unknown transfer mode {:?}", arg)))?;
        if mode != TransferMode::Stream {
            return Err(ReprError("only stream mode is supported".to_owned()));
        }
        self.transfer_mode = mode;
        Ok(())
    }
}

/// Address family for a passive listener.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NetFamily {
    V4,
    V6,
}

impl NetFamily {
    pub fn of(addr: &IpAddr) -> NetFamily {
        match addr {
            IpAddr::V4(_) => NetFamily::V4,
            IpAddr::V6(_) => NetFamily::V6,
        }
    }
}

/// One negotiated data channel. `Passive` holds the bound listener the
/// client has been told about; `Active` holds an already-dialed
/// connection. Either way the channel is consumed by exactly one
/// transfer via [`DataChannel::open`].
pub enum DataChannel {
    Passive {
        listener: TcpListener,
        timeout: Duration,
    },
    Active(TcpStream),
}

impl DataChannel {
    pub fn passive(family: NetFamily, timeout: Duration) -> io::Result<(DataChannel, SocketAddr)> {
        let listener = match family {
            NetFamily::V4 => TcpListener::bind((Ipv4Addr::UNSPECIFIED, 0))?,
            NetFamily::V6 => TcpListener::bind((Ipv6Addr::UNSPECIFIED, 0))?,
        };
        listener.set_nonblocking(true)?;
        let addr = listener.local_addr()?;
        log::info!("data channel listening on {}", addr);
        Ok((DataChannel::Passive { listener, timeout }, addr))
    }

    pub fn active(addr: SocketAddr, timeout: Duration) -> io::Result<DataChannel> {
        let stream = TcpStream::connect_timeout(&addr, timeout)?;
        log::info!("data channel connected with {}", addr);
        Ok(DataChannel::Active(stream))
    }

    /// Hand over the ready byte stream. Passive mode accepts the
    /// client's incoming connection here, dropping strangers until
    /// `peer` shows up or the timeout runs out.
    pub fn open(self, peer: IpAddr) -> io::Result<TcpStream> {
        match self {
            DataChannel::Active(stream) => Ok(stream),
            DataChannel::Passive { listener, timeout } => {
                let start = Instant::now();
                while start.elapsed() < timeout {
                    match listener.accept() {
                        Ok((stream, addr)) => {
                            if addr.ip() == peer {
                                stream.set_nonblocking(false)?;
                                log::info!("data channel accepted {}", addr);
                                return Ok(stream);
                            }
                            log::warn!("dropping connection from {}: unexpected ip address", addr);
                        }
                        Err(e) if e.kind() == ErrorKind::WouldBlock => {
                            sleep(Duration::from_millis(50));
                        }
                        Err(e) => return Err(e),
                    }
                }
                Err(io::Error::from(ErrorKind::TimedOut))
            }
        }
    }
}
