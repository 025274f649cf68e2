use std::fmt::Debug;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::str::FromStr;

use fallible_iterator::FallibleIterator;

/// The `h1,h2,h3,h4,p1,p2` address encoding used by PORT arguments and
/// PASV replies.
#[derive(Debug, PartialEq)]
pub struct HostPort {
    pub ip: Ipv4Addr,
    pub port: u16,
}

impl HostPort {
    pub fn new(ip: Ipv4Addr, port: u16) -> HostPort {
        HostPort { ip, port }
    }
}

#[derive(thiserror::Error, Debug)]
#[error("could not parse host-port address")]
pub struct ParseHostPortError {}

impl FromStr for HostPort {
    type Err = ParseHostPortError;
    fn from_str(s: &str) -> Result<HostPort, ParseHostPortError> {
        let nums: Vec<u8> = fallible_iterator::convert(s.split(',').map(|c| c.parse::<u8>()))
            .collect()
            .map_err(|_| ParseHostPortError {})?;
        if nums.len() < 6 {
            return Err(ParseHostPortError {});
        }
        let ip = Ipv4Addr::new(nums[0], nums[1], nums[2], nums[3]);
        let port = ((nums[4] as u16) << 8) + nums[5] as u16;
        Ok(HostPort { ip, port })
    }
}

impl ToString for HostPort {
    fn to_string(&self) -> String {
        let ip = self.ip.octets();
        let p1 = self.port >> 8;
        let p2 = self.port & 0xFF;
        format!("{},{},{},{},{},{}", ip[0], ip[1], ip[2], ip[3], p1, p2)
    }
}

impl From<&HostPort> for SocketAddr {
    fn from(host_port: &HostPort) -> SocketAddr {
        SocketAddr::new(IpAddr::V4(host_port.ip), host_port.port)
    }
}

#[derive(thiserror::Error, Debug)]
#[error("could not parse extended address")]
pub struct ParseEprtError {}

/// Parse an EPRT argument: `<d><proto><d><addr><d><port><d>` where `<d>`
/// is any single delimiter character and proto is 1 (IPv4) or 2 (IPv6).
pub fn parse_eprt(s: &str) -> Result<SocketAddr, ParseEprtError> {
    let delim = s.chars().next().ok_or(ParseEprtError {})?;
    let parts: Vec<&str> = s.split(delim).collect();
    if parts.len() != 5 || !parts[0].is_empty() || !parts[4].is_empty() {
        return Err(ParseEprtError {});
    }
    let port: u16 = parts[3].parse().map_err(|_| ParseEprtError {})?;
    let ip = match parts[1] {
        "1" => IpAddr::V4(Ipv4Addr::from_str(parts[2]).map_err(|_| ParseEprtError {})?),
        "2" => IpAddr::V6(Ipv6Addr::from_str(parts[2]).map_err(|_| ParseEprtError {})?),
        _ => return Err(ParseEprtError {}),
    };
    Ok(SocketAddr::new(ip, port))
}

impl Default for HostPort {
    fn default() -> Self {
        HostPort {
            ip: Ipv4Addr::LOCALHOST,
            port: 0,
        }
    }
}
