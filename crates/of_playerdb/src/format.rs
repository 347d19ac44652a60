//! Store file header read/write helpers.
//!
//! The header is always the **first 64 bytes** of a store file:
//!
//! ```text
//! [magic: 4 = "OFPD"][version: u16][bom: u16 = 0xFEFF]
//! [record_size: u32][capacity: u32][lineup: 11 × u32][reserved: u32]
//! ```
//!
//! All integers are little-endian. Records follow immediately, in id order.

use crate::error::InitFailure;
use crate::record::RECORD_SIZE;
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{Read, Result as IoResult, Write};

/// Records are cast straight from file bytes, which is only valid on
/// little-endian hosts.
const _: () = {
    #[cfg(not(target_endian = "little"))]
    compile_error!("of_playerdb only supports little-endian architectures");
};

pub const STORE_MAGIC: [u8; 4] = *b"OFPD";
pub const STORE_VERSION: u16 = 1;
pub const BYTE_ORDER_MARK: u16 = 0xFEFF;

/// Size of the starting lineup kept in the header.
pub const SQUAD_SIZE: usize = 11;

/// Header size in bytes: 4 + 2 + 2 + 4 + 4 + 11×4 + 4.
pub const HEADER_BYTES: u64 = 64;

/// Largest capacity a store file may declare.
pub const MAX_PLAYERS: u32 = 500_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreHeader {
    pub version: u16,
    pub record_size: u32,
    pub capacity: u32,
    /// Player ids of the starting lineup (0 = unassigned).
    pub lineup: [u32; SQUAD_SIZE],
}

impl StoreHeader {
    pub fn new(capacity: u32) -> Self {
        Self {
            version: STORE_VERSION,
            record_size: RECORD_SIZE as u32,
            capacity,
            lineup: [0; SQUAD_SIZE],
        }
    }

    /// Total file length implied by this header.
    pub fn expected_len(&self) -> u64 {
        HEADER_BYTES + self.capacity as u64 * self.record_size as u64
    }

    pub fn write<W: Write>(&self, w: &mut W) -> IoResult<()> {
        w.write_all(&STORE_MAGIC)?;
        w.write_u16::<LittleEndian>(self.version)?;
        w.write_u16::<LittleEndian>(BYTE_ORDER_MARK)?;
        w.write_u32::<LittleEndian>(self.record_size)?;
        w.write_u32::<LittleEndian>(self.capacity)?;
        for id in self.lineup {
            w.write_u32::<LittleEndian>(id)?;
        }
        w.write_u32::<LittleEndian>(0)?;
        Ok(())
    }

    /// Reads and validates a header against this build's record layout.
    ///
    /// Length consistency is the caller's job, since it needs the file size.
    pub fn read<R: Read>(r: &mut R) -> Result<Self, InitFailure> {
        let mut magic = [0u8; 4];
        r.read_exact(&mut magic)?;
        if magic != STORE_MAGIC {
            return Err(InitFailure::BadMagic);
        }

        let version = r.read_u16::<LittleEndian>()?;
        if version != STORE_VERSION {
            return Err(InitFailure::VersionMismatch { found: version, expected: STORE_VERSION });
        }

        let bom = r.read_u16::<LittleEndian>()?;
        if bom != BYTE_ORDER_MARK {
            return Err(InitFailure::ByteOrder { found: bom });
        }

        let record_size = r.read_u32::<LittleEndian>()?;
        if record_size != RECORD_SIZE as u32 {
            return Err(InitFailure::RecordSize { found: record_size, expected: RECORD_SIZE as u32 });
        }

        let capacity = r.read_u32::<LittleEndian>()?;
        check_capacity(capacity)?;

        let mut lineup = [0u32; SQUAD_SIZE];
        for (index, slot) in lineup.iter_mut().enumerate() {
            let id = r.read_u32::<LittleEndian>()?;
            if id > capacity {
                return Err(InitFailure::Lineup { index, id });
            }
            *slot = id;
        }
        let _reserved = r.read_u32::<LittleEndian>()?;

        Ok(Self { version, record_size, capacity, lineup })
    }
}

pub fn check_capacity(capacity: u32) -> Result<(), InitFailure> {
    if capacity == 0 || capacity > MAX_PLAYERS {
        return Err(InitFailure::Capacity { capacity, max: MAX_PLAYERS });
    }
    Ok(())
}
