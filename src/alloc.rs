//! Allocation tracking.
//!
//! Install [`TrackingAllocator`] as the process's global allocator to give the
//! memory probe something to read:
//!
//! ```ignore
//! #[global_allocator]
//! static GLOBAL: crossbench::TrackingAllocator = crossbench::TrackingAllocator;
//! ```
//!
//! Without it the probe reports memory as absent. Live bytes are always
//! counted once installed; the peak high-water mark is only maintained while
//! at least one tracking window is open.

use std::alloc::{GlobalAlloc, Layout, System};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};

static INSTALLED: AtomicBool = AtomicBool::new(false);
static LIVE_BYTES: AtomicU64 = AtomicU64::new(0);
static PEAK_BYTES: AtomicU64 = AtomicU64::new(0);
static OPEN_WINDOWS: AtomicUsize = AtomicUsize::new(0);

/// Global allocator wrapper that counts live and peak heap bytes.
pub struct TrackingAllocator;

impl TrackingAllocator {
    #[inline]
    fn grow(size: u64) {
        let live = LIVE_BYTES.fetch_add(size, Ordering::Relaxed) + size;
        if OPEN_WINDOWS.load(Ordering::Relaxed) > 0 {
            PEAK_BYTES.fetch_max(live, Ordering::Relaxed);
        }
    }

    #[inline]
    fn shrink(size: u64) {
        // Frees of blocks allocated before installation can underflow.
        let _ = LIVE_BYTES.fetch_update(Ordering::Relaxed, Ordering::Relaxed, |live| {
            Some(live.saturating_sub(size))
        });
    }
}

// SAFETY: every call is forwarded to the System allocator with the caller's
// layout; the bookkeeping only touches atomics and never allocates.
unsafe impl GlobalAlloc for TrackingAllocator {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        INSTALLED.store(true, Ordering::Relaxed);
        // SAFETY: forwarded with the same layout.
        let ptr = unsafe { System.alloc(layout) };
        if !ptr.is_null() {
            Self::grow(layout.size() as u64);
        }
        ptr
    }

    unsafe fn alloc_zeroed(&self, layout: Layout) -> *mut u8 {
        INSTALLED.store(true, Ordering::Relaxed);
        // SAFETY: forwarded with the same layout.
        let ptr = unsafe { System.alloc_zeroed(layout) };
        if !ptr.is_null() {
            Self::grow(layout.size() as u64);
        }
        ptr
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        // SAFETY: ptr came from System with this layout.
        unsafe { System.dealloc(ptr, layout) };
        Self::shrink(layout.size() as u64);
    }

    unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
        // SAFETY: ptr came from System with this layout; new_size is the
        // caller's contract.
        let new_ptr = unsafe { System.realloc(ptr, layout, new_size) };
        if !new_ptr.is_null() {
            let old = layout.size() as u64;
            let new = new_size as u64;
            if new > old {
                Self::grow(new - old);
            } else {
                Self::shrink(old - new);
            }
        }
        new_ptr
    }
}

/// Whether allocations are flowing through [`TrackingAllocator`].
pub fn tracking_available() -> bool {
    INSTALLED.load(Ordering::Relaxed)
}

/// Bytes currently live on the heap, as seen by the tracking allocator.
pub fn live_bytes() -> u64 {
    LIVE_BYTES.load(Ordering::Relaxed)
}

/// An open allocation-tracking window. Peak is measured relative to the
/// live byte count when the window opened.
#[derive(Debug)]
pub(crate) struct TrackingWindow {
    baseline: u64,
}

impl TrackingWindow {
    /// Returns `None` when the tracking allocator is not installed.
    pub(crate) fn open() -> Option<Self> {
        if !tracking_available() {
            return None;
        }
        let baseline = LIVE_BYTES.load(Ordering::Relaxed);
        PEAK_BYTES.store(baseline, Ordering::Relaxed);
        OPEN_WINDOWS.fetch_add(1, Ordering::Relaxed);
        Some(Self { baseline })
    }

    /// Close the window, returning `(current_bytes, peak_bytes)` allocated
    /// since it opened.
    pub(crate) fn close(self) -> (u64, u64) {
        let live = LIVE_BYTES.load(Ordering::Relaxed);
        let peak = PEAK_BYTES.load(Ordering::Relaxed).max(live);
        (
            live.saturating_sub(self.baseline),
            peak.saturating_sub(self.baseline),
        )
    }
}

impl Drop for TrackingWindow {
    fn drop(&mut self) {
        OPEN_WINDOWS.fetch_sub(1, Ordering::Relaxed);
    }
}
