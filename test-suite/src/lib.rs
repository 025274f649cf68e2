use std::fs::{self, File};
use std::io::{BufRead, BufReader, Read, Write};
use std::net::{IpAddr, Ipv4Addr, SocketAddr, TcpStream};
use std::path::PathBuf;
use std::sync::Once;
use std::thread;
use std::time::Duration;

use ftpd::{FtpConfig, FtpServer, User};

use simplelog::*;
use tempdir::TempDir;

#[cfg(test)]
mod test_authorization;
#[cfg(test)]
mod test_basic_commands;

pub struct TestEnvironment {
    pub dir: TempDir,
    pub server_addr: SocketAddr,
}

static INIT_LOG: Once = Once::new();

fn initialize_logger() {
    CombinedLogger::init(vec![
        TermLogger::new(
            LevelFilter::Warn,
            Config::default(),
            TerminalMode::Mixed,
            ColorChoice::Auto,
        ),
        WriteLogger::new(
            LevelFilter::Debug,
            Config::default(),
            File::create("test.log").unwrap(),
        ),
    ])
    .unwrap();
}

#[allow(dead_code)]
impl TestEnvironment {
    /// Server with a single configured account, test/test.
    pub fn new() -> TestEnvironment {
        Self::with_users(vec![User {
            username: "test".to_owned(),
            password: "test".to_owned(),
        }])
    }

    /// Server with no authorizer: any credentials are accepted.
    pub fn open() -> TestEnvironment {
        Self::with_users(Vec::new())
    }

    fn with_users(users: Vec<User>) -> TestEnvironment {
        INIT_LOG.call_once(initialize_logger);
        let dir = TempDir::new("ftpd-test").unwrap();
        let config = FtpConfig {
            ip: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 0,
            root: dir.path().to_path_buf(),
            users,
            conn_timeout: Duration::from_secs(5),
            security: None,
        };
        let ftp_server = FtpServer::new(config).unwrap();
        let server_addr = ftp_server.addr().unwrap();
        thread::spawn(move || {
            let _ = ftp_server.run();
        });
        TestEnvironment { dir, server_addr }
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    pub fn create_empty_file(&self, name: &str) {
        File::create(self.path(name)).unwrap();
    }

    pub fn create_file(&self, name: &str, contents: &[u8]) {
        let mut file = File::create(self.path(name)).unwrap();
        file.write_all(contents).unwrap();
    }

    pub fn create_dir(&self, name: &str) {
        fs::create_dir(self.path(name)).unwrap();
    }

    pub fn read_file(&self, name: &str) -> Vec<u8> {
        fs::read(self.path(name)).unwrap()
    }

    pub fn exists(&self, name: &str) -> bool {
        self.path(name).exists()
    }
}

/// Scripted control-channel client for reply-level assertions.
pub struct RawClient {
    stream: TcpStream,
    reader: BufReader<TcpStream>,
}

#[allow(dead_code)]
impl RawClient {
    pub fn connect(addr: SocketAddr) -> RawClient {
        let stream = TcpStream::connect(addr).unwrap();
        let reader = BufReader::new(stream.try_clone().unwrap());
        let mut client = RawClient { stream, reader };
        let greeting = client.read_line();
        assert!(greeting.starts_with("220"), "greeting was {:?}", greeting);
        client
    }

    pub fn send(&mut self, line: &str) {
        self.stream.write_all(line.as_bytes()).unwrap();
        self.stream.write_all(b"\r\n").unwrap();
    }

    pub fn read_line(&mut self) -> String {
        let mut line = String::new();
        self.reader.read_line(&mut line).unwrap();
        line.trim_end().to_owned()
    }

    /// Send a command and read its single-line reply.
    pub fn cmd(&mut self, line: &str) -> String {
        self.send(line);
        self.read_line()
    }

    /// Send a command and read a full reply block, multi-line or not.
    pub fn cmd_multi(&mut self, line: &str) -> Vec<String> {
        self.send(line);
        let first = self.read_line();
        let mut lines = vec![first.clone()];
        if first.len() >= 4 && first.as_bytes()[3] == b'-' {
            let closing = format!("{} ", &first[..3]);
            loop {
                let next = self.read_line();
                let done = next.starts_with(&closing);
                lines.push(next);
                if done {
                    break;
                }
            }
        }
        lines
    }

    pub fn login(&mut self) {
        let reply = self.cmd("USER test");
        assert!(reply.starts_with("331"), "USER reply was {:?}", reply);
        let reply = self.cmd("PASS test");
        assert!(reply.starts_with("230"), "PASS reply was {:?}", reply);
    }

    /// Negotiate PASV and dial the data connection it advertises.
    pub fn pasv_connect(&mut self) -> TcpStream {
        let reply = self.cmd("PASV");
        assert!(reply.starts_with("227"), "PASV reply was {:?}", reply);
        TcpStream::connect(parse_pasv(&reply)).unwrap()
    }

    /// Negotiate EPSV and dial the data connection it advertises.
    pub fn epsv_connect(&mut self) -> TcpStream {
        let reply = self.cmd("EPSV");
        assert!(reply.starts_with("229"), "EPSV reply was {:?}", reply);
        let port = parse_epsv(&reply);
        TcpStream::connect((Ipv4Addr::LOCALHOST, port)).unwrap()
    }

    pub fn read_data(stream: &mut TcpStream) -> Vec<u8> {
        let mut data = Vec::new();
        stream.read_to_end(&mut data).unwrap();
        data
    }
}

pub fn parse_pasv(reply: &str) -> SocketAddr {
    let start = reply.find('(').unwrap() + 1;
    let end = reply.rfind(')').unwrap();
    let nums: Vec<u16> = reply[start..end]
        .split(',')
        .map(|n| n.parse().unwrap())
        .collect();
    let ip = Ipv4Addr::new(nums[0] as u8, nums[1] as u8, nums[2] as u8, nums[3] as u8);
    SocketAddr::new(IpAddr::V4(ip), (nums[4] << 8) + nums[5])
}

pub fn parse_epsv(reply: &str) -> u16 {
    let start = reply.find("(|||").unwrap() + 4;
    let end = reply.rfind("|)").unwrap();
    reply[start..end].parse().unwrap()
}
