use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Assigns per-directory sequence numbers in write order
///
/// Numbers within a directory start at 1 and increase by one for every file actually
/// written. A page holds its directory's [`Reservation`] while it writes; the number is
/// only consumed by [`Reservation::commit`], so a failed write leaves no gap.
#[derive(Debug, Default)]
pub struct NumberingCounter {
    dirs: Mutex<HashMap<PathBuf, Arc<AsyncMutex<u32>>>>,
}

/// The next number of one directory, held until the write finishes
#[derive(Debug)]
pub struct Reservation {
    last: OwnedMutexGuard<u32>,
}

impl Reservation {
    pub fn number(&self) -> u32 {
        *self.last + 1
    }

    /// Consumes the number after its file was written
    pub fn commit(mut self) {
        *self.last += 1;
    }
}

impl NumberingCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits for the directory containing `relative_path` and reserves its next number
    ///
    /// Pages writing into the same directory are serialized until the reservation is
    /// committed or dropped.
    pub async fn reserve(&self, relative_path: &Path) -> Reservation {
        let dir = relative_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();

        let slot = {
            let mut dirs = match self.dirs.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            Arc::clone(dirs.entry(dir).or_default())
        };

        Reservation {
            last: slot.lock_owned().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn take(counter: &NumberingCounter, path: &str) -> u32 {
        let reservation = counter.reserve(Path::new(path)).await;
        let number = reservation.number();
        reservation.commit();
        number
    }

    #[tokio::test]
    async fn test_numbers_per_directory() {
        let counter = NumberingCounter::new();
        assert_eq!(take(&counter, "guide/a.md").await, 1);
        assert_eq!(take(&counter, "guide/b.md").await, 2);
        assert_eq!(take(&counter, "api/a.md").await, 1);
        assert_eq!(take(&counter, "index.md").await, 1);
        assert_eq!(take(&counter, "guide/c.md").await, 3);
    }

    #[tokio::test]
    async fn test_dropped_reservation_is_reused() {
        let counter = NumberingCounter::new();
        assert_eq!(take(&counter, "guide/a.md").await, 1);

        let failed = counter.reserve(Path::new("guide/b.md")).await;
        assert_eq!(failed.number(), 2);
        drop(failed);

        assert_eq!(take(&counter, "guide/c.md").await, 2);
    }

    #[tokio::test]
    async fn test_concurrent_assignment_is_dense() {
        let counter = Arc::new(NumberingCounter::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let counter = Arc::clone(&counter);
                tokio::spawn(async move { take(&counter, &format!("docs/{}.md", i)).await })
            })
            .collect();

        let mut numbers = Vec::new();
        for handle in handles {
            numbers.push(handle.await.unwrap());
        }
        numbers.sort_unstable();
        assert_eq!(numbers, (1..=8).collect::<Vec<_>>());
    }
}
