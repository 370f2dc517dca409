//! Batch-size settings bridge.
//!
//! The user picks an exponent `k` on a logarithmic scale; the engine only
//! ever sees the derived [`BatchSize`] of `10^k` rounds per snapshot.

use std::fmt;
use std::num::NonZeroU64;

use thiserror::Error;
use tokio::sync::watch;

/// Largest exponent whose power of ten fits the round counter.
pub const MAX_BATCH_EXPONENT: u32 = 19;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SettingsError {
    #[error("batch size exponent {exponent} exceeds {MAX_BATCH_EXPONENT}")]
    ExponentTooLarge { exponent: u32 },
}

/// Number of rounds played between two snapshots. Always positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BatchSize(NonZeroU64);

impl BatchSize {
    pub const ONE: Self = Self(NonZeroU64::MIN);

    /// Returns `None` for zero.
    pub fn new(rounds: u64) -> Option<Self> {
        NonZeroU64::new(rounds).map(Self)
    }

    /// `10^exponent` rounds.
    pub fn from_exponent(exponent: u32) -> Result<Self, SettingsError> {
        10u64
            .checked_pow(exponent)
            .and_then(Self::new)
            .ok_or(SettingsError::ExponentTooLarge { exponent })
    }

    pub fn get(self) -> u64 {
        self.0.get()
    }
}

impl Default for BatchSize {
    fn default() -> Self {
        Self::ONE
    }
}

impl fmt::Display for BatchSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Supplies the configured batch size as a live value.
pub trait SettingsSource: Send + Sync {
    /// Batch size currently configured.
    fn batch_size(&self) -> BatchSize;

    /// Receiver notified whenever the batch size changes.
    fn watch_batch_size(&self) -> watch::Receiver<BatchSize>;
}

/// In-memory batch-size preference expressed as a power of ten.
#[derive(Debug)]
pub struct BatchSizeSettings {
    batch_size: watch::Sender<BatchSize>,
}

impl BatchSizeSettings {
    pub fn new(exponent: u32) -> Result<Self, SettingsError> {
        let (batch_size, _) = watch::channel(BatchSize::from_exponent(exponent)?);
        Ok(Self { batch_size })
    }

    /// Current exponent `k` of `10^k`.
    pub fn exponent(&self) -> u32 {
        self.batch_size.borrow().get().ilog10()
    }

    /// Changes the preference. Watchers are notified only when the value
    /// actually changes.
    pub fn set_exponent(&self, exponent: u32) -> Result<BatchSize, SettingsError> {
        let next = BatchSize::from_exponent(exponent)?;
        let changed = self.batch_size.send_if_modified(|current| {
            if *current == next {
                return false;
            }
            *current = next;
            true
        });
        if changed {
            tracing::debug!(target: "runtime::settings", exponent, batch_size = %next, "batch size updated");
        }
        Ok(next)
    }
}

impl Default for BatchSizeSettings {
    fn default() -> Self {
        let (batch_size, _) = watch::channel(BatchSize::ONE);
        Self { batch_size }
    }
}

impl SettingsSource for BatchSizeSettings {
    fn batch_size(&self) -> BatchSize {
        *self.batch_size.borrow()
    }

    fn watch_batch_size(&self) -> watch::Receiver<BatchSize> {
        self.batch_size.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn powers_of_ten() {
        assert_eq!(BatchSize::from_exponent(0).unwrap().get(), 1);
        assert_eq!(BatchSize::from_exponent(3).unwrap().get(), 1_000);
        assert_eq!(
            BatchSize::from_exponent(MAX_BATCH_EXPONENT).unwrap().get(),
            10_000_000_000_000_000_000
        );
        assert_eq!(
            BatchSize::from_exponent(MAX_BATCH_EXPONENT + 1),
            Err(SettingsError::ExponentTooLarge { exponent: 20 })
        );
    }

    #[test]
    fn zero_is_not_a_batch_size() {
        assert!(BatchSize::new(0).is_none());
        assert_eq!(BatchSize::new(5).unwrap().get(), 5);
        assert_eq!(BatchSize::default(), BatchSize::ONE);
    }

    #[test]
    fn settings_track_exponent() {
        let settings = BatchSizeSettings::new(2).unwrap();
        assert_eq!(settings.exponent(), 2);
        assert_eq!(settings.batch_size().get(), 100);

        settings.set_exponent(4).unwrap();
        assert_eq!(settings.exponent(), 4);
        assert_eq!(settings.batch_size().get(), 10_000);

        assert!(settings.set_exponent(40).is_err());
        assert_eq!(settings.exponent(), 4);
    }

    #[tokio::test]
    async fn watchers_see_changes_only() {
        let settings = BatchSizeSettings::default();
        let mut rx = settings.watch_batch_size();
        assert_eq!(*rx.borrow_and_update(), BatchSize::ONE);

        settings.set_exponent(0).unwrap();
        assert!(!rx.has_changed().unwrap());

        settings.set_exponent(1).unwrap();
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().get(), 10);
    }
}
