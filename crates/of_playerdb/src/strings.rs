//! Interned name table addressed by `u16` ids.
//!
//! Id 0 is reserved for "no name" and never backed, so at most 65,535
//! distinct strings fit. A missing id resolves to `None`; callers that need
//! display text fall back to [`missing_value`].
//!
//! File format: LZ4 (size-prepended) of MessagePack(`StringFile`), followed
//! by a 32-byte SHA-256 of the compressed payload.

use crate::atomic::write_atomic;
use crate::config::StoreConfig;
use crate::error::StringTableError;
use byteorder::{ByteOrder, LittleEndian};
use lz4_flex::{compress_prepend_size, decompress_size_prepended};
use rmp_serde::{from_slice, to_vec_named};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::io::Write;
use std::path::Path;

pub const STRING_TABLE_VERSION: u32 = 1;

/// Number of ids available for real strings (id 0 is reserved).
pub const STRING_TABLE_CAPACITY: usize = u16::MAX as usize;

/// Placeholder shown when a name id does not resolve.
pub const MISSING_VALUE: &str = "–";

/// Longest string `intern` accepts, in UTF-8 bytes.
pub const MAX_STRING_BYTES: usize = 255;

const CHECKSUM_BYTES: usize = 32;

/// Upper bound on the decompressed MessagePack body: every string at
/// `MAX_STRING_BYTES` plus its str8 marker, and room for the envelope.
const MAX_DECOMPRESSED_BYTES: usize = STRING_TABLE_CAPACITY * (MAX_STRING_BYTES + 2) + 64;

pub fn missing_value() -> &'static str {
    MISSING_VALUE
}

#[derive(Serialize, Deserialize)]
struct StringFile {
    version: u32,
    strings: Vec<String>,
}

/// Collects distinct strings and hands out ids in first-seen order.
#[derive(Debug, Default)]
pub struct StringDatabaseBuilder {
    strings: Vec<String>,
    index: FxHashMap<String, u16>,
}

impl StringDatabaseBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Id for `s`, assigning the next free one if `s` is new.
    pub fn intern(&mut self, s: &str) -> Result<u16, StringTableError> {
        if let Some(&id) = self.index.get(s) {
            return Ok(id);
        }
        if s.len() > MAX_STRING_BYTES {
            return Err(StringTableError::StringTooLong { len: s.len(), max: MAX_STRING_BYTES });
        }
        if self.strings.len() >= STRING_TABLE_CAPACITY {
            return Err(StringTableError::TableFull { capacity: STRING_TABLE_CAPACITY });
        }

        self.strings.push(s.to_string());
        let id = self.strings.len() as u16;
        self.index.insert(s.to_string(), id);
        Ok(id)
    }

    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }

    pub fn build(self) -> StringDatabase {
        StringDatabase { strings: self.strings, index: self.index }
    }
}

/// Read-only after construction; share it by reference or `Arc`.
#[derive(Debug, Clone, Default)]
pub struct StringDatabase {
    /// `strings[i]` backs id `i + 1`
    strings: Vec<String>,
    index: FxHashMap<String, u16>,
}

impl StringDatabase {
    pub fn from_strings<I, S>(source: I) -> Result<Self, StringTableError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut builder = StringDatabaseBuilder::new();
        for s in source {
            builder.intern(s.as_ref())?;
        }
        Ok(builder.build())
    }

    #[inline]
    pub fn get(&self, id: u16) -> Option<&str> {
        let slot = (id as usize).checked_sub(1)?;
        self.strings.get(slot).map(String::as_str)
    }

    pub fn id_of(&self, s: &str) -> Option<u16> {
        self.index.get(s).copied()
    }

    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }

    /// `"First Last"`, or `None` if either id is unresolved.
    pub fn get_full_name(&self, first_id: u16, last_id: u16) -> Option<String> {
        let first = self.get(first_id)?;
        let last = self.get(last_id)?;
        Some(match (first.is_empty(), last.is_empty()) {
            (true, _) => last.to_string(),
            (false, true) => first.to_string(),
            (false, false) => format!("{} {}", first, last),
        })
    }

    /// `"F. Last"` for tight layouts, or `None` if either id is unresolved.
    ///
    /// Falls back to whichever fragment is non-empty when the other is empty.
    pub fn get_compact_name(&self, first_id: u16, last_id: u16) -> Option<String> {
        let first = self.get(first_id)?;
        let last = self.get(last_id)?;
        let initial = first.trim().chars().next();
        Some(match (initial, last.is_empty()) {
            (None, _) => last.to_string(),
            (Some(_), true) => first.to_string(),
            (Some(c), false) => format!("{}. {}", c, last),
        })
    }

    pub fn full_name_or_missing(&self, first_id: u16, last_id: u16) -> String {
        self.get_full_name(first_id, last_id).unwrap_or_else(|| MISSING_VALUE.to_string())
    }

    pub fn missing_value(&self) -> &'static str {
        MISSING_VALUE
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, StringTableError> {
        let file = StringFile { version: STRING_TABLE_VERSION, strings: self.strings.clone() };

        // 1. MessagePack with field names
        let msgpack = to_vec_named(&file)?;

        // 2. LZ4, size prepended
        let compressed = compress_prepend_size(&msgpack);

        // 3. SHA256 trailer
        Ok(seal(compressed))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, StringTableError> {
        if bytes.len() < 4 + CHECKSUM_BYTES {
            return Err(StringTableError::Corrupted);
        }

        let (payload, checksum_bytes) = bytes.split_at(bytes.len() - CHECKSUM_BYTES);

        let mut hasher = Sha256::new();
        hasher.update(payload);
        let calculated_checksum = hasher.finalize();
        if &calculated_checksum[..] != checksum_bytes {
            return Err(StringTableError::ChecksumMismatch);
        }

        let declared = LittleEndian::read_u32(&payload[..4]) as usize;
        if declared > MAX_DECOMPRESSED_BYTES {
            return Err(StringTableError::TooLarge { size: declared, max: MAX_DECOMPRESSED_BYTES });
        }

        let msgpack =
            decompress_size_prepended(payload).map_err(|_| StringTableError::Decompression)?;
        let file: StringFile = from_slice(&msgpack)?;

        if file.version > STRING_TABLE_VERSION {
            return Err(StringTableError::VersionMismatch {
                found: file.version,
                expected: STRING_TABLE_VERSION,
            });
        }
        if file.strings.len() > STRING_TABLE_CAPACITY
            || file.strings.iter().any(|s| s.len() > MAX_STRING_BYTES)
        {
            return Err(StringTableError::Corrupted);
        }

        let mut index = FxHashMap::default();
        for (slot, s) in file.strings.iter().enumerate() {
            if index.insert(s.clone(), slot as u16 + 1).is_some() {
                return Err(StringTableError::Corrupted);
            }
        }

        Ok(Self { strings: file.strings, index })
    }

    pub fn load(path: &Path) -> Result<Self, StringTableError> {
        let bytes = std::fs::read(path)?;
        let table = Self::from_bytes(&bytes)?;
        log::info!("Loaded {} interned strings from {:?}", table.len(), path);
        Ok(table)
    }

    /// Load the table at `config.strings_path`.
    pub fn load_with(config: &StoreConfig) -> Result<Self, StringTableError> {
        Self::load(&config.strings_path)
    }

    pub fn save(&self, path: &Path) -> Result<(), StringTableError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let data = self.to_bytes()?;
        write_atomic(path, |file| file.write_all(&data))?;

        log::debug!("Saved {} bytes to {:?}", data.len(), path);
        Ok(())
    }

    pub fn save_with(&self, config: &StoreConfig) -> Result<(), StringTableError> {
        self.save(&config.strings_path)
    }
}

/// Append the SHA-256 of `compressed` as the file trailer.
fn seal(compressed: Vec<u8>) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(&compressed);
    let checksum = hasher.finalize();

    let mut result = compressed;
    result.extend_from_slice(&checksum);
    result
}
