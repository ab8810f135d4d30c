//! Process-wide soft cap on the bytes staged in per-worker read buffers.
//! A worker exceeding its share blocks in `fetch_reads` until budget is
//! released by another worker finishing its region, the backpressure
//! mechanism that keeps total staged reads bounded without a hard
//! per-worker limit.

use std::sync::{Condvar, Mutex};

pub struct ReadBudget {
    cap_bytes: u64,
    in_use: Mutex<u64>,
    released: Condvar,
}

impl ReadBudget {
    pub fn new(cap_bytes: u64) -> Self {
        ReadBudget {
            cap_bytes,
            in_use: Mutex::new(0),
            released: Condvar::new(),
        }
    }

    /// Blocks until `bytes` of budget is available, then reserves it.
    /// Returns a guard that releases the reservation on drop.
    pub fn acquire(&self, bytes: u64) -> ReadBudgetGuard<'_> {
        let mut in_use = self.in_use.lock().expect("read budget mutex poisoned");
        while *in_use + bytes > self.cap_bytes && *in_use > 0 {
            in_use = self.released.wait(in_use).expect("read budget mutex poisoned");
        }
        *in_use += bytes;
        ReadBudgetGuard { budget: self, bytes }
    }

    fn release(&self, bytes: u64) {
        let mut in_use = self.in_use.lock().expect("read budget mutex poisoned");
        *in_use = in_use.saturating_sub(bytes);
        self.released.notify_all();
    }

    pub fn in_use_bytes(&self) -> u64 {
        *self.in_use.lock().expect("read budget mutex poisoned")
    }
}

pub struct ReadBudgetGuard<'a> {
    budget: &'a ReadBudget,
    bytes: u64,
}

impl Drop for ReadBudgetGuard<'_> {
    fn drop(&mut self) {
        self.budget.release(self.bytes);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn acquire_and_release_tracks_in_use_bytes() {
        let budget = ReadBudget::new(100);
        assert_eq!(budget.in_use_bytes(), 0);
        let guard = budget.acquire(40);
        assert_eq!(budget.in_use_bytes(), 40);
        drop(guard);
        assert_eq!(budget.in_use_bytes(), 0);
    }

    #[test]
    fn a_single_oversized_request_is_let_through_to_avoid_deadlock() {
        // A worker needing more than the whole cap must still proceed once
        // nothing else is in flight, or every worker would starve forever.
        let budget = ReadBudget::new(10);
        let guard = budget.acquire(50);
        assert_eq!(budget.in_use_bytes(), 50);
        drop(guard);
    }

    #[test]
    fn second_acquirer_blocks_until_first_releases() {
        let budget = Arc::new(ReadBudget::new(10));
        let first = budget.acquire(10);

        let budget2 = Arc::clone(&budget);
        let handle = thread::spawn(move || {
            let _second = budget2.acquire(10);
        });

        thread::sleep(Duration::from_millis(50));
        assert_eq!(budget.in_use_bytes(), 10);
        drop(first);
        handle.join().unwrap();
    }
}
