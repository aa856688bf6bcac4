// std
use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters describing how authorization failures were repaired.
#[derive(Debug, Default)]
pub struct RefreshMetrics {
	refreshes: AtomicU64,
	resigns: AtomicU64,
	failures: AtomicU64,
}
impl RefreshMetrics {
	/// Network refresh calls issued.
	pub fn refreshes(&self) -> u64 {
		self.refreshes.load(Ordering::Relaxed)
	}

	/// Requests re-signed with a credential another caller already refreshed.
	pub fn resigns(&self) -> u64 {
		self.resigns.load(Ordering::Relaxed)
	}

	/// Refresh calls that failed.
	pub fn failures(&self) -> u64 {
		self.failures.load(Ordering::Relaxed)
	}

	pub(crate) fn record_refresh(&self) {
		self.refreshes.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_resign(&self) {
		self.resigns.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_failure(&self) {
		self.failures.fetch_add(1, Ordering::Relaxed);
	}
}
