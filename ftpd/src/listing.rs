use chrono::{DateTime, Local};

use crate::fs::Metadata;

/// Renders directory entries into listing lines. `names_only` selects
/// the NLST form; otherwise the full LIST form is produced.
pub trait ListingFormat: Send + Sync {
    fn render(&self, entries: &[Metadata], names_only: bool) -> Vec<String>;
}

/// `ls -l` style listing lines with synthetic ownership and modes.
pub struct UnixListing;

impl ListingFormat for UnixListing {
    fn render(&self, entries: &[Metadata], names_only: bool) -> Vec<String> {
        entries
            .iter()
            .map(|entry| {
                if names_only {
                    entry.name.clone()
                } else {
                    long_line(entry)
                }
            })
            .collect()
    }
}

fn long_line(entry: &Metadata) -> String {
    let (kind, mode) = if entry.is_dir {
        ('d', "rwxr-xr-x")
    } else {
        ('-', "rw-r--r--")
    };
    let modified: DateTime<Local> = entry.modified.into();
    format!(
        "{}{} 1 ftp ftp {:>13} {} {}",
        kind,
        mode,
        entry.size,
        modified.format("%b %e %H:%M"),
        entry.name
    )
}
