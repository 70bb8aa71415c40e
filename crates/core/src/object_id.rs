//! Document identifiers and sharded-path utilities.
//!
//! Patients and clinical-data entries are addressed by 12-byte document identifiers rendered
//! as **24 lowercase hexadecimal characters**, the format document databases use for their
//! primary keys.
//!
//! ## Layout of a generated identifier
//! - bytes `0..4`: seconds since the Unix epoch (big-endian)
//! - bytes `4..9`: a random value chosen once per process
//! - bytes `9..12`: a per-process counter starting at zero, incremented atomically
//!
//! Identifiers generated by one process sort in allocation order, which the file store
//! relies on to return documents in insertion order. The counter is 24 bits wide: the order
//! only holds while a process allocates fewer than 2^24 identifiers, after which the counter
//! wraps and a later identifier can sort before an earlier one from the same second.
//!
//! ## Parsing
//! [`ObjectId::parse`] accepts exactly 24 hex characters in either case and normalises to
//! lower case. Anything else is rejected with [`RecordError::Validation`].
//!
//! ## Sharded directory layout
//! For an identifier `i`, the file store keeps the document under
//! `parent_dir/<i[0..2]>/<i[2..4]>/<i>/`.

use crate::constants::INVALID_ID_MSG;
use crate::error::{RecordError, RecordResult};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::OnceLock;
use std::{fmt, str::FromStr};

const ID_BYTES: usize = 12;
const ID_HEX_LEN: usize = ID_BYTES * 2;
const COUNTER_MASK: u32 = 0x00ff_ffff;

static PROCESS_UNIQUE: OnceLock<[u8; 5]> = OnceLock::new();
static COUNTER: AtomicU32 = AtomicU32::new(0);

/// A validated 12-byte document identifier.
///
/// Once constructed the value is always well formed, so it can be used to derive storage
/// paths and compared byte-for-byte.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectId([u8; ID_BYTES]);

impl ObjectId {
    /// Allocates a fresh identifier.
    ///
    /// Allocation is lock-free: the counter is a process-wide atomic, so concurrent callers
    /// never receive the same identifier within one second.
    pub fn new() -> Self {
        let seconds = u32::try_from(chrono::Utc::now().timestamp()).unwrap_or(u32::MAX);
        let process = PROCESS_UNIQUE.get_or_init(rand::random::<[u8; 5]>);
        let counter = COUNTER.fetch_add(1, Ordering::Relaxed) & COUNTER_MASK;

        let mut bytes = [0u8; ID_BYTES];
        bytes[0..4].copy_from_slice(&seconds.to_be_bytes());
        bytes[4..9].copy_from_slice(process);
        bytes[9..12].copy_from_slice(&counter.to_be_bytes()[1..4]);
        Self(bytes)
    }

    /// Validates and parses an externally supplied identifier.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::Validation`] with the message `Invalid ID format` if `input` is
    /// not exactly 24 hex characters.
    pub fn parse(input: &str) -> RecordResult<Self> {
        if !Self::is_well_formed(input) {
            return Err(RecordError::Validation(INVALID_ID_MSG.into()));
        }

        let mut bytes = [0u8; ID_BYTES];
        for (slot, pair) in bytes.iter_mut().zip(input.as_bytes().chunks(2)) {
            *slot = (hex_value(pair[0]) << 4) | hex_value(pair[1]);
        }
        Ok(Self(bytes))
    }

    /// Returns true if `input` is 24 hex characters (either case).
    pub fn is_well_formed(input: &str) -> bool {
        input.len() == ID_HEX_LEN && input.bytes().all(|b| b.is_ascii_hexdigit())
    }

    /// Seconds since the Unix epoch at which the identifier was generated.
    pub fn timestamp(&self) -> u32 {
        u32::from_be_bytes([self.0[0], self.0[1], self.0[2], self.0[3]])
    }

    /// Returns `parent_dir/<s1>/<s2>/<id>/` where `s1`/`s2` are the first four hex characters.
    pub fn sharded_dir(&self, parent_dir: &Path) -> PathBuf {
        let canonical = self.to_string();
        let s1 = &canonical[0..2];
        let s2 = &canonical[2..4];
        parent_dir.join(s1).join(s2).join(&canonical)
    }
}

impl Default for ObjectId {
    fn default() -> Self {
        Self::new()
    }
}

fn hex_value(b: u8) -> u8 {
    match b {
        b'0'..=b'9' => b - b'0',
        b'a'..=b'f' => b - b'a' + 10,
        b'A'..=b'F' => b - b'A' + 10,
        _ => 0,
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in self.0 {
            write!(f, "{:02x}", b)?;
        }
        Ok(())
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectId({})", self)
    }
}

impl FromStr for ObjectId {
    type Err = RecordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ObjectId::parse(s)
    }
}

impl serde::Serialize for ObjectId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> serde::Deserialize<'de> for ObjectId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        ObjectId::parse(&s).map_err(serde::de::Error::custom)
    }
}
