use std::fs;
use std::io::{self, Read, Seek, Write};
use std::path::PathBuf;
use std::time::SystemTime;

use fallible_iterator::FallibleIterator;

/// What the protocol needs to know about one filesystem entry.
#[derive(Debug, Clone)]
pub struct Metadata {
    pub name: String,
    pub size: u64,
    pub modified: SystemTime,
    pub is_dir: bool,
}

pub trait FileRead: Read + Seek + Send {}
impl<T: Read + Seek + Send> FileRead for T {}

pub trait FileWrite: Write + Seek + Send {}
impl<T: Write + Seek + Send> FileWrite for T {}

/// Storage capability the session engine runs against. Paths are
/// server-rooted strings ("/" is the share root) with `.`/`..` already
/// collapsed by the caller. Failures are classified through
/// `io::ErrorKind`: `PermissionDenied`, `NotFound`, everything else.
pub trait FileSystem: Send + Sync {
    fn open(&self, path: &str) -> io::Result<Box<dyn FileRead>>;
    fn create(&self, path: &str) -> io::Result<Box<dyn FileWrite>>;
    fn remove(&self, path: &str) -> io::Result<()>;
    fn rename(&self, from: &str, to: &str) -> io::Result<()>;
    fn make_dir(&self, path: &str) -> io::Result<()>;
    fn stat(&self, path: &str) -> io::Result<Metadata>;
    fn read_dir(&self, path: &str) -> io::Result<Vec<Metadata>>;
}

/// [`FileSystem`] serving a directory on the host.
pub struct LocalFs {
    root: PathBuf,
}

impl LocalFs {
    pub fn new<P: Into<PathBuf>>(root: P) -> LocalFs {
        LocalFs { root: root.into() }
    }

    fn real(&self, path: &str) -> PathBuf {
        self.root.join(path.trim_start_matches('/'))
    }
}

impl FileSystem for LocalFs {
    fn open(&self, path: &str) -> io::Result<Box<dyn FileRead>> {
        Ok(Box::new(fs::File::open(self.real(path))?))
    }

    fn create(&self, path: &str) -> io::Result<Box<dyn FileWrite>> {
        Ok(Box::new(fs::File::create(self.real(path))?))
    }

    fn remove(&self, path: &str) -> io::Result<()> {
        let real = self.real(path);
        if fs::metadata(&real)?.is_dir() {
            fs::remove_dir(real)
        } else {
            fs::remove_file(real)
        }
    }

    fn rename(&self, from: &str, to: &str) -> io::Result<()> {
        fs::rename(self.real(from), self.real(to))
    }

    fn make_dir(&self, path: &str) -> io::Result<()> {
        fs::create_dir(self.real(path))
    }

    fn stat(&self, path: &str) -> io::Result<Metadata> {
        let real = self.real(path);
        let meta = fs::metadata(&real)?;
        let name = real
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "/".to_owned());
        Ok(Metadata {
            name,
            size: meta.len(),
            modified: meta.modified()?,
            is_dir: meta.is_dir(),
        })
    }

    fn read_dir(&self, path: &str) -> io::Result<Vec<Metadata>> {
        let mut entries: Vec<Metadata> = fallible_iterator::convert(fs::read_dir(self.real(path))?)
            .map(|entry| {
                let meta = entry.metadata()?;
                Ok(Metadata {
                    name: entry.file_name().to_string_lossy().into_owned(),
                    size: meta.len(),
                    modified: meta.modified()?,
                    is_dir: meta.is_dir(),
                })
            })
            .collect()?;
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }
}
