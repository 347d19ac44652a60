//! Player store: every record resident in one flat array, addressed by id.
//!
//! Lifecycle: `open`/`create` → Open → `close` (or drop) → Closed.
//! Mutations stay in memory until `save` or `close`; the file is rewritten
//! atomically (temp file + rename) so a crash never leaves a half-written store.
//!
//! # Sharing
//!
//! There is no internal locking. Mutation goes through `&mut self`, so one
//! owner at a time is enforced by the borrow checker; callers that share a
//! store across threads must serialize access themselves, e.g. with
//! `Mutex<PlayerDatabase>`.

use crate::config::StoreConfig;
use crate::error::{InitFailure, StoreError};
use crate::format::{check_capacity, StoreHeader, HEADER_BYTES, SQUAD_SIZE};
use crate::record::PlayerRecord;

use crate::atomic::write_atomic;
use bytemuck::Zeroable;
use std::fs::File;
use std::io::{self, Cursor, Read, Write};
use std::path::{Path, PathBuf};

pub struct PlayerDatabase {
    path: PathBuf,
    capacity: u32,
    state: Option<OpenStore>,
}

struct OpenStore {
    header: StoreHeader,
    records: Vec<PlayerRecord>,
    dirty: bool,
}

impl PlayerDatabase {
    /// Load an existing store file fully into memory.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let (header, records) =
            read_store(path).map_err(|reason| StoreError::init(path, reason))?;

        log::info!(
            "Opened player store {:?} ({} records, {} in lineup)",
            path,
            header.capacity,
            header.lineup.iter().filter(|&&id| id != 0).count()
        );

        Ok(Self {
            path: path.to_path_buf(),
            capacity: header.capacity,
            state: Some(OpenStore { header, records, dirty: false }),
        })
    }

    pub fn open_with(config: &StoreConfig) -> Result<Self, StoreError> {
        Self::open(&config.path)
    }

    /// Write a fresh store of `capacity` blank records and return it open.
    ///
    /// An existing file at `path` is replaced.
    pub fn create(path: impl AsRef<Path>, capacity: u32) -> Result<Self, StoreError> {
        let path = path.as_ref();
        check_capacity(capacity).map_err(|reason| StoreError::init(path, reason))?;

        let store = OpenStore {
            header: StoreHeader::new(capacity),
            records: (1..=capacity).map(PlayerRecord::blank).collect(),
            dirty: false,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| StoreError::init(path, e))?;
        }
        write_store(path, &store).map_err(|e| StoreError::init(path, e))?;

        log::info!("Created player store {:?} with {} slots", path, capacity);

        Ok(Self { path: path.to_path_buf(), capacity, state: Some(store) })
    }

    pub fn create_with(config: &StoreConfig) -> Result<Self, StoreError> {
        Self::create(&config.path, config.capacity)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    pub fn is_open(&self) -> bool {
        self.state.is_some()
    }

    /// Whether there are in-memory changes not yet written to disk.
    pub fn is_dirty(&self) -> bool {
        self.state.as_ref().is_some_and(|s| s.dirty)
    }

    /// Mutable access to record `id`, aliasing the resident table.
    ///
    /// Writes are visible to every later `get` of the same id and are
    /// persisted at the next `save` or `close`.
    #[inline]
    pub fn get(&mut self, id: u32) -> Result<&mut PlayerRecord, StoreError> {
        let store = self.state.as_mut().ok_or(StoreError::Disposed)?;
        let slot = slot_of(id, self.capacity)?;
        store.dirty = true;
        Ok(&mut store.records[slot])
    }

    /// Shared access to record `id`; does not mark the store dirty.
    #[inline]
    pub fn get_ref(&self, id: u32) -> Result<&PlayerRecord, StoreError> {
        let store = self.state.as_ref().ok_or(StoreError::Disposed)?;
        let slot = slot_of(id, self.capacity)?;
        Ok(&store.records[slot])
    }

    /// All records in id order.
    pub fn records(&self) -> Result<&[PlayerRecord], StoreError> {
        let store = self.state.as_ref().ok_or(StoreError::Disposed)?;
        Ok(&store.records)
    }

    /// Iterate records in id order.
    pub fn iter(&self) -> Result<impl Iterator<Item = &PlayerRecord>, StoreError> {
        Ok(self.records()?.iter())
    }

    /// Number of assigned starting lineup slots.
    pub fn squad_count(&self) -> Result<usize, StoreError> {
        let store = self.state.as_ref().ok_or(StoreError::Disposed)?;
        Ok(store.header.lineup.iter().filter(|&&id| id != 0).count())
    }

    pub fn starting_ids(&self) -> Result<[u32; SQUAD_SIZE], StoreError> {
        let store = self.state.as_ref().ok_or(StoreError::Disposed)?;
        Ok(store.header.lineup)
    }

    /// Record in lineup slot `index`, or `None` when the slot is unassigned.
    pub fn get_starting_player(
        &mut self,
        index: usize,
    ) -> Result<Option<&mut PlayerRecord>, StoreError> {
        let store = self.state.as_mut().ok_or(StoreError::Disposed)?;
        let id = lineup_slot(&store.header, index)?;
        if id == 0 {
            return Ok(None);
        }
        let slot = slot_of(id, self.capacity)?;
        store.dirty = true;
        Ok(Some(&mut store.records[slot]))
    }

    /// Assign (or clear with `None`) lineup slot `index`.
    pub fn set_starting_player(&mut self, index: usize, id: Option<u32>) -> Result<(), StoreError> {
        let store = self.state.as_mut().ok_or(StoreError::Disposed)?;
        lineup_slot(&store.header, index)?;
        let id = match id {
            Some(id) => {
                slot_of(id, self.capacity)?;
                id
            }
            None => 0,
        };
        store.header.lineup[index] = id;
        store.dirty = true;
        Ok(())
    }

    /// Persist all records now; the store stays open.
    pub fn save(&mut self) -> Result<(), StoreError> {
        let store = self.state.as_mut().ok_or(StoreError::Disposed)?;
        write_store(&self.path, store)?;
        store.dirty = false;
        Ok(())
    }

    /// Flush pending changes and release the resident table.
    ///
    /// The store is Closed afterwards even if the flush fails. Closing an
    /// already closed store is a no-op.
    pub fn close(&mut self) -> Result<(), StoreError> {
        let Some(store) = self.state.take() else {
            return Ok(());
        };

        let result = if store.dirty { write_store(&self.path, &store) } else { Ok(()) };
        drop(store);

        match &result {
            Ok(()) => log::info!("Closed player store {:?}", self.path),
            Err(e) => log::warn!("Closed player store {:?} without saving: {}", self.path, e),
        }
        result.map_err(StoreError::from)
    }
}

impl Drop for PlayerDatabase {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            log::warn!("Failed to flush player store on drop: {}", e);
        }
    }
}

impl std::fmt::Debug for PlayerDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlayerDatabase")
            .field("path", &self.path)
            .field("capacity", &self.capacity)
            .field("open", &self.is_open())
            .field("dirty", &self.is_dirty())
            .finish()
    }
}

/// Pure arithmetic addressing: id `n` lives in slot `n - 1`.
#[inline]
fn slot_of(id: u32, capacity: u32) -> Result<usize, StoreError> {
    if id == 0 || id > capacity {
        return Err(StoreError::OutOfRange { id, capacity });
    }
    Ok((id - 1) as usize)
}

fn lineup_slot(header: &StoreHeader, index: usize) -> Result<u32, StoreError> {
    header.lineup.get(index).copied().ok_or(StoreError::LineupIndex { index, size: SQUAD_SIZE })
}

fn read_store(path: &Path) -> Result<(StoreHeader, Vec<PlayerRecord>), InitFailure> {
    let mut file = File::open(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => InitFailure::NotFound,
        _ => InitFailure::Io(e),
    })?;

    let len = file.metadata()?.len();
    if len < HEADER_BYTES {
        return Err(InitFailure::Truncated { found: len, expected: HEADER_BYTES });
    }

    let mut header_bytes = [0u8; HEADER_BYTES as usize];
    file.read_exact(&mut header_bytes)?;
    let header = StoreHeader::read(&mut Cursor::new(&header_bytes[..]))?;

    let expected = header.expected_len();
    if len < expected {
        return Err(InitFailure::Truncated { found: len, expected });
    }
    if len > expected {
        return Err(InitFailure::LengthMismatch { found: len, expected });
    }

    let mut records = vec![PlayerRecord::zeroed(); header.capacity as usize];
    file.read_exact(bytemuck::cast_slice_mut(&mut records))?;

    if let Some((slot, rec)) =
        records.iter().enumerate().find(|(slot, rec)| rec.id as usize != slot + 1)
    {
        return Err(InitFailure::IdMismatch { slot: slot as u32, found: rec.id });
    }

    Ok((header, records))
}

fn write_store(path: &Path, store: &OpenStore) -> io::Result<()> {
    let mut header_bytes = Vec::with_capacity(HEADER_BYTES as usize);
    store.header.write(&mut header_bytes)?;

    write_atomic(path, |file| {
        file.write_all(&header_bytes)?;
        file.write_all(bytemuck::cast_slice(&store.records))
    })?;

    log::debug!("Saved {} records to {:?}", store.records.len(), path);
    Ok(())
}
