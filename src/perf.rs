// ==========================================
// Query-cycle performance instrumentation
// ==========================================
// Dashboards live and die by round-trip latency. This module hooks
// SQLite's profile callback to flag slow statements and counts the
// statements issued inside an instrumented cycle, so a "why was that
// query slow" report carries numbers instead of guesses.
// ==========================================

use rusqlite::Connection;
use std::cell::RefCell;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// 0 disables slow-statement logging entirely.
static SLOW_SQL_THRESHOLD_MS: AtomicU64 = AtomicU64::new(0);

#[derive(Default)]
struct CycleCounters {
    depth: u32,
    statements: u64,
    slow_statements: u64,
}

thread_local! {
    static CYCLE: RefCell<CycleCounters> = RefCell::new(CycleCounters::default());
}

/// Install the statement hooks on a connection.
///
/// Enabled by default in debug builds; `GARMENT_PROGRESS_PERF_SQL=1`
/// forces it on elsewhere. `GARMENT_PROGRESS_SLOW_SQL_MS` overrides
/// the slow-statement threshold (default 50ms debug / 200ms release).
pub fn install_sqlite_tracing(conn: &mut Connection) {
    let enabled = std::env::var("GARMENT_PROGRESS_PERF_SQL")
        .map(|v| matches!(v.trim().to_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(cfg!(debug_assertions));

    if !enabled {
        SLOW_SQL_THRESHOLD_MS.store(0, Ordering::Relaxed);
        // reused connections may carry stale callbacks
        conn.trace(None);
        conn.profile(None);
        return;
    }

    let threshold_ms = std::env::var("GARMENT_PROGRESS_SLOW_SQL_MS")
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(if cfg!(debug_assertions) { 50 } else { 200 });
    SLOW_SQL_THRESHOLD_MS.store(threshold_ms, Ordering::Relaxed);

    conn.trace(Some(count_statement));
    conn.profile(Some(log_slow_statement));
}

fn count_statement(_sql: &str) {
    CYCLE.with(|c| {
        let mut counters = c.borrow_mut();
        if counters.depth > 0 {
            counters.statements = counters.statements.saturating_add(1);
        }
    });
}

fn log_slow_statement(sql: &str, duration: Duration) {
    let threshold = SLOW_SQL_THRESHOLD_MS.load(Ordering::Relaxed);
    if threshold == 0 {
        return;
    }

    let ms = duration.as_millis() as u64;
    if ms < threshold {
        return;
    }

    let mut sql_short = sql.trim().replace('\n', " ");
    if sql_short.len() > 420 {
        let cut = (0..=420)
            .rev()
            .find(|&i| sql_short.is_char_boundary(i))
            .unwrap_or(0);
        sql_short.truncate(cut);
        sql_short.push('…');
    }
    tracing::warn!(target: "slow_sql", duration_ms = ms, sql = %sql_short, "slow sql");

    CYCLE.with(|c| {
        let mut counters = c.borrow_mut();
        if counters.depth > 0 {
            counters.slow_statements = counters.slow_statements.saturating_add(1);
        }
    });
}

// ==========================================
// PerfGuard - one instrumented cycle
// ==========================================

/// Logs elapsed time plus statement counts when dropped.
///
/// ```ignore
/// let _perf = garment_progress::perf::PerfGuard::new("window_progress");
/// // run the cycle...
/// ```
pub struct PerfGuard {
    op: &'static str,
    started: Instant,
    statements_before: u64,
    slow_before: u64,
}

impl PerfGuard {
    pub fn new(op: &'static str) -> Self {
        let (statements_before, slow_before) = CYCLE.with(|c| {
            let mut counters = c.borrow_mut();
            counters.depth = counters.depth.saturating_add(1);
            (counters.statements, counters.slow_statements)
        });
        Self {
            op,
            started: Instant::now(),
            statements_before,
            slow_before,
        }
    }
}

impl Drop for PerfGuard {
    fn drop(&mut self) {
        let (statements, slow_statements) = CYCLE.with(|c| {
            let mut counters = c.borrow_mut();
            counters.depth = counters.depth.saturating_sub(1);
            (
                counters.statements.saturating_sub(self.statements_before),
                counters.slow_statements.saturating_sub(self.slow_before),
            )
        });

        tracing::info!(
            target: "perf",
            op = self.op,
            elapsed_ms = self.started.elapsed().as_millis() as u64,
            statements,
            slow_statements,
            "done"
        );
    }
}
