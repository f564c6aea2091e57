use std::fmt::Write;
use std::time::Instant;

use herald_core::{NotificationSnapshot, QueueStats};

/// One line per notification, newest first, with time left before expiry.
pub(crate) fn render_snapshot(snapshot: &NotificationSnapshot, now: Instant) -> String {
    if snapshot.is_empty() {
        return format!("[v{}] (no notifications)", snapshot.version());
    }

    let mut out = format!("[v{}] {} notification(s)", snapshot.version(), snapshot.len());
    for notification in snapshot {
        let left = notification.expires_at().saturating_duration_since(now);
        let _ = write!(
            out,
            "\n  #{:<4} {:<4} {} ({:.1}s)",
            notification.id().value(),
            notification.kind().label(),
            notification.title(),
            left.as_secs_f64()
        );
    }
    out
}

pub(crate) fn render_stats(stats: &QueueStats) -> String {
    format!(
        "enqueued={} dismissed={} expired={} sweeps={} timers_armed={}",
        stats.enqueued, stats.dismissed, stats.expired, stats.sweeps, stats.timers_armed
    )
}
