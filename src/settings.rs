//! Persisted user settings.
//!
//! Only one value survives a power cycle: the selected blade color index.
//! Persistence failures are never fatal; the saber keeps running with the
//! in-memory value and the default comes back on the next boot.

/// Settings collaborator.
pub trait SettingsStore {
    /// Returns the persisted blade color index, or `default` when no valid
    /// record exists.
    fn color_index(&mut self, default: usize) -> usize;

    /// Persists the blade color index.
    fn save_color_index(&mut self, index: usize);
}

#[cfg(target_os = "none")]
pub use flash::{FLASH_SIZE, FlashSettings};

#[cfg(target_os = "none")]
mod flash {
    use embassy_rp::flash::{Blocking, ERASE_SIZE, Flash};
    use embassy_rp::peripherals::FLASH;

    use super::SettingsStore;

    /// Total flash size of the target board.
    pub const FLASH_SIZE: usize = 2 * 1024 * 1024;

    /// Identifies a record written by this firmware revision.
    const MAGIC: u32 = 0x5342_4c31;

    /// The record lives in the last erase sector, well clear of the program.
    const RECORD_OFFSET: u32 = (FLASH_SIZE - ERASE_SIZE) as u32;

    const RECORD_LEN: usize = 8;

    /// Settings stored in the last sector of on-board flash.
    pub struct FlashSettings<'d> {
        flash: Flash<'d, FLASH, Blocking, FLASH_SIZE>,
    }

    impl<'d> FlashSettings<'d> {
        #[must_use]
        pub fn new(flash: Flash<'d, FLASH, Blocking, FLASH_SIZE>) -> Self {
            Self { flash }
        }
    }

    impl SettingsStore for FlashSettings<'_> {
        fn color_index(&mut self, default: usize) -> usize {
            let mut record = [0_u8; RECORD_LEN];
            if let Err(error) = self.flash.blocking_read(RECORD_OFFSET, &mut record) {
                warn!("settings read failed: {}", error);
                return default;
            }
            let magic = u32::from_le_bytes([record[0], record[1], record[2], record[3]]);
            if magic != MAGIC {
                info!("no settings record, using defaults");
                return default;
            }
            u32::from_le_bytes([record[4], record[5], record[6], record[7]]) as usize
        }

        fn save_color_index(&mut self, index: usize) {
            let mut record = [0_u8; RECORD_LEN];
            record[..4].copy_from_slice(&MAGIC.to_le_bytes());
            record[4..].copy_from_slice(&(index as u32).to_le_bytes());
            let result = self
                .flash
                .blocking_erase(RECORD_OFFSET, RECORD_OFFSET + ERASE_SIZE as u32)
                .and_then(|()| self.flash.blocking_write(RECORD_OFFSET, &record));
            if let Err(error) = result {
                warn!("settings write failed: {}", error);
            }
        }
    }
}
