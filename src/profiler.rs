//! Lightweight timing profile for the search hot paths
//!
//! Uses thread-local accumulators merged into global atomics, so concurrent
//! searches on different threads never contend while they run.
//! Enable with environment variable SNAKE_PLANNER_PROFILE=1 or with
//! `[profiling] enabled = true` in Planner.toml.

use std::cell::RefCell;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::time::Instant;

thread_local! {
    static SEARCH_TIME: RefCell<u64> = const { RefCell::new(0) };
    static SEARCH_COUNT: RefCell<usize> = const { RefCell::new(0) };

    static TRANSITION_TIME: RefCell<u64> = const { RefCell::new(0) };
    static TRANSITION_COUNT: RefCell<usize> = const { RefCell::new(0) };

    static SURVIVAL_TIME: RefCell<u64> = const { RefCell::new(0) };
    static SURVIVAL_COUNT: RefCell<usize> = const { RefCell::new(0) };
}

// Global aggregators
static GLOBAL_SEARCH_TIME: AtomicU64 = AtomicU64::new(0);
static GLOBAL_SEARCH_COUNT: AtomicUsize = AtomicUsize::new(0);
static GLOBAL_TRANSITION_TIME: AtomicU64 = AtomicU64::new(0);
static GLOBAL_TRANSITION_COUNT: AtomicUsize = AtomicUsize::new(0);
static GLOBAL_SURVIVAL_TIME: AtomicU64 = AtomicU64::new(0);
static GLOBAL_SURVIVAL_COUNT: AtomicUsize = AtomicUsize::new(0);

static FORCE_ENABLED: AtomicBool = AtomicBool::new(false);

#[inline]
pub fn is_profiling_enabled() -> bool {
    FORCE_ENABLED.load(Ordering::Relaxed) || std::env::var("SNAKE_PLANNER_PROFILE").is_ok()
}

/// Turns profiling on for the rest of the process, regardless of the environment
pub fn enable() {
    FORCE_ENABLED.store(true, Ordering::Relaxed);
}

pub struct ProfileGuard {
    start: Instant,
    category: &'static str,
}

impl ProfileGuard {
    pub fn new(category: &'static str) -> Option<Self> {
        if is_profiling_enabled() {
            Some(ProfileGuard {
                start: Instant::now(),
                category,
            })
        } else {
            None
        }
    }
}

impl Drop for ProfileGuard {
    fn drop(&mut self) {
        let elapsed_ns = self.start.elapsed().as_nanos() as u64;

        match self.category {
            "search" => {
                SEARCH_TIME.with(|t| *t.borrow_mut() += elapsed_ns);
                SEARCH_COUNT.with(|c| *c.borrow_mut() += 1);
            }
            "transition" => {
                TRANSITION_TIME.with(|t| *t.borrow_mut() += elapsed_ns);
                TRANSITION_COUNT.with(|c| *c.borrow_mut() += 1);
            }
            "survival_check" => {
                SURVIVAL_TIME.with(|t| *t.borrow_mut() += elapsed_ns);
                SURVIVAL_COUNT.with(|c| *c.borrow_mut() += 1);
            }
            _ => {}
        }
    }
}

fn drain(time: &'static std::thread::LocalKey<RefCell<u64>>, global: &AtomicU64) {
    time.with(|t| {
        global.fetch_add(*t.borrow(), Ordering::Relaxed);
        *t.borrow_mut() = 0;
    });
}

fn drain_count(count: &'static std::thread::LocalKey<RefCell<usize>>, global: &AtomicUsize) {
    count.with(|c| {
        global.fetch_add(*c.borrow(), Ordering::Relaxed);
        *c.borrow_mut() = 0;
    });
}

/// Moves this thread's accumulated timings into the global totals
pub fn merge_thread_local() {
    if !is_profiling_enabled() {
        return;
    }

    drain(&SEARCH_TIME, &GLOBAL_SEARCH_TIME);
    drain_count(&SEARCH_COUNT, &GLOBAL_SEARCH_COUNT);
    drain(&TRANSITION_TIME, &GLOBAL_TRANSITION_TIME);
    drain_count(&TRANSITION_COUNT, &GLOBAL_TRANSITION_COUNT);
    drain(&SURVIVAL_TIME, &GLOBAL_SURVIVAL_TIME);
    drain_count(&SURVIVAL_COUNT, &GLOBAL_SURVIVAL_COUNT);
}

/// Snapshot of the global totals
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProfileTotals {
    pub search_ns: u64,
    pub searches: usize,
    pub transition_ns: u64,
    pub expansions: usize,
    pub survival_ns: u64,
    pub survival_checks: usize,
}

pub fn totals() -> ProfileTotals {
    ProfileTotals {
        search_ns: GLOBAL_SEARCH_TIME.load(Ordering::Relaxed),
        searches: GLOBAL_SEARCH_COUNT.load(Ordering::Relaxed),
        transition_ns: GLOBAL_TRANSITION_TIME.load(Ordering::Relaxed),
        expansions: GLOBAL_TRANSITION_COUNT.load(Ordering::Relaxed),
        survival_ns: GLOBAL_SURVIVAL_TIME.load(Ordering::Relaxed),
        survival_checks: GLOBAL_SURVIVAL_COUNT.load(Ordering::Relaxed),
    }
}

fn share(part: u64, whole: u64) -> f64 {
    if whole > 0 {
        100.0 * part as f64 / whole as f64
    } else {
        0.0
    }
}

fn avg_us(time_ns: u64, count: usize) -> f64 {
    if count > 0 {
        time_ns as f64 / (count * 1000) as f64
    } else {
        0.0
    }
}

pub fn print_report(total_time_ms: u64) {
    if !is_profiling_enabled() {
        return;
    }

    let t = totals();
    let total_ns = total_time_ms * 1_000_000;

    eprintln!("\n═══════════════════════════════════════════════════════════");
    eprintln!("                 SEARCH PROFILE");
    eprintln!("═══════════════════════════════════════════════════════════");
    eprintln!("Total Time: {}ms\n", total_time_ms);

    eprintln!("Search:");
    eprintln!(
        "  Time:     {:.2}ms ({:.1}%)",
        t.search_ns as f64 / 1_000_000.0,
        share(t.search_ns, total_ns)
    );
    eprintln!("  Calls:    {}", t.searches);
    eprintln!("  Avg:      {:.2}µs/call\n", avg_us(t.search_ns, t.searches));

    eprintln!("Successor Generation:");
    eprintln!(
        "  Time:     {:.2}ms ({:.1}% of search)",
        t.transition_ns as f64 / 1_000_000.0,
        share(t.transition_ns, t.search_ns)
    );
    eprintln!("  Calls:    {}", t.expansions);
    eprintln!("  Avg:      {:.2}µs/call\n", avg_us(t.transition_ns, t.expansions));

    eprintln!("Survivability Checks:");
    eprintln!(
        "  Time:     {:.2}ms ({:.1}% of search)",
        t.survival_ns as f64 / 1_000_000.0,
        share(t.survival_ns, t.search_ns)
    );
    eprintln!("  Calls:    {}", t.survival_checks);
    eprintln!("  Avg:      {:.2}µs/call\n", avg_us(t.survival_ns, t.survival_checks));

    eprintln!("═══════════════════════════════════════════════════════════\n");
}

#[macro_export]
macro_rules! profile {
    ($category:expr, $code:block) => {{
        let _guard = $crate::profiler::ProfileGuard::new($category);
        $code
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guard_is_recorded_once_enabled() {
        enable();
        assert!(is_profiling_enabled());

        let value = profile!("survival_check", { 21 * 2 });
        assert_eq!(value, 42);

        merge_thread_local();
        assert!(totals().survival_checks >= 1);
    }
}
