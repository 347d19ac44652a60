//! # of_playerdb - Fixed-record player store
//!
//! Resident, id-addressed player records backed by a flat binary file,
//! plus the interned name table the records point into.
//!
//! - `PlayerDatabase::get(id)` is pure arithmetic (`slot = id - 1`) and hands
//!   back `&mut PlayerRecord` into the store's own table; nothing is copied.
//! - Changes are persisted on `save()` / `close()` / drop, never per mutation.
//! - `StringDatabase` resolves `u16` name ids; unknown ids are `None`.
//!
//! ```no_run
//! use of_playerdb::{PlayerDatabase, StoreConfig, StringDatabase};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = StoreConfig::from_env();
//! let mut players = PlayerDatabase::open_with(&config)?;
//! let names = StringDatabase::load_with(&config)?;
//!
//! let player = players.get(42)?;
//! player.fitness = player.fitness.saturating_sub(5);
//! let label = names.full_name_or_missing(player.first_name_id, player.last_name_id);
//! println!("{label}: fitness {}", player.fitness);
//!
//! players.close()?;
//! # Ok(())
//! # }
//! ```

mod atomic;
pub mod config;
pub mod error;
pub mod format;
pub mod record;
pub mod store;
pub mod strings;

pub use config::StoreConfig;
pub use error::{InitFailure, RecordError, StoreError, StringTableError};
pub use format::{MAX_PLAYERS, SQUAD_SIZE};
pub use record::{
    scale_attribute, MentalAttr, PhysicalAttr, PlayerRecord, Position, PreferredFoot,
    TechnicalAttr, RECORD_SIZE,
};
pub use store::PlayerDatabase;
pub use strings::{
    missing_value, StringDatabase, StringDatabaseBuilder, MAX_STRING_BYTES, MISSING_VALUE,
};
