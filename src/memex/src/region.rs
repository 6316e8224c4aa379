//! Memory Region Types
//!
//! Data structures for representing memory regions from /proc/pid/maps.

use std::fmt;

/// Access flags of a mapping, as in the `rwxp` column of /proc/pid/maps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[allow(clippy::struct_excessive_bools)]
pub struct Permissions {
    pub read: bool,
    pub write: bool,
    pub execute: bool,
    /// `s` in the fourth column; `p` (private, copy-on-write) otherwise
    pub shared: bool,
}

impl Permissions {
    /// Parse the four-character permission field (e.g. `r-xp`)
    ///
    /// Returns `None` unless the field is exactly four characters drawn from
    /// `r|-`, `w|-`, `x|-`, `p|s` in that order.
    pub fn parse(field: &str) -> Option<Self> {
        let bytes = field.as_bytes();
        if bytes.len() != 4 {
            return None;
        }

        let flag = |byte: u8, set: u8| match byte {
            b'-' => Some(false),
            b if b == set => Some(true),
            _ => None,
        };

        let shared = match bytes[3] {
            b'p' => false,
            b's' => true,
            _ => return None,
        };

        Some(Permissions {
            read: flag(bytes[0], b'r')?,
            write: flag(bytes[1], b'w')?,
            execute: flag(bytes[2], b'x')?,
            shared,
        })
    }
}

impl fmt::Display for Permissions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}{}{}",
            if self.read { 'r' } else { '-' },
            if self.write { 'w' } else { '-' },
            if self.execute { 'x' } else { '-' },
            if self.shared { 's' } else { 'p' },
        )
    }
}

/// A memory region from /proc/pid/maps
///
/// `start` is inclusive and `end` exclusive; the map reader never produces a
/// region with `end <= start`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryRegion {
    pub start: u64,
    pub end: u64,
    pub perms: Permissions,
    pub offset: u64,
    pub path: Option<String>,
}

impl MemoryRegion {
    pub fn size(&self) -> u64 {
        self.end - self.start
    }

    pub fn is_readable(&self) -> bool {
        self.perms.read
    }

    pub fn is_writable(&self) -> bool {
        self.perms.write
    }

    pub fn is_executable(&self) -> bool {
        self.perms.execute
    }
}

impl fmt::Display for MemoryRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:08x}-{:08x} {} {:08x}",
            self.start, self.end, self.perms, self.offset
        )?;
        if let Some(path) = &self.path {
            write!(f, " {}", path)?;
        }
        Ok(())
    }
}
