use chrono::DateTime;

/// Longest span get_order_list accepts for one time range (15 days).
pub const MAX_WINDOW_SPAN_SECS: i64 = 15 * 24 * 60 * 60;

/// An epoch-second range [from, to] inclusive, sized for one listing pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeWindow {
    pub from: i64,
    pub to: i64,
    pub label: String,
}

impl TimeWindow {
    pub fn new(from: i64, to: i64) -> Self {
        Self {
            from,
            to,
            label: format!("{}..{}", date_str(from), date_str(to)),
        }
    }
}

/// Split [start, end] into windows no wider than `max_span`, newest first.
///
/// Consecutive windows meet exactly (`next.to + 1 == prev.from`), so the
/// union covers every second once. Every window satisfies `from < to`;
/// when the walk would strand a single second at the start boundary, the
/// neighboring window absorbs it. Spans below two seconds are widened to
/// two, and an empty or inverted range yields no windows.
pub fn backfill_windows(start: i64, end: i64, max_span: i64) -> Vec<TimeWindow> {
    let mut windows = Vec::new();
    if start >= end {
        return windows;
    }
    let max_span = max_span.max(2);

    let mut to = end;
    loop {
        if to - start <= max_span {
            windows.push(TimeWindow::new(start, to));
            break;
        }
        let mut from = to - max_span;
        // Leaving exactly one second before `from` would force a
        // degenerate final window; shift the boundary by one.
        if from == start + 1 {
            from = start + 2;
        }
        windows.push(TimeWindow::new(from, to));
        to = from - 1;
    }
    windows
}

fn date_str(ts: i64) -> String {
    DateTime::from_timestamp(ts, 0)
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| ts.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_window_when_range_fits() {
        let windows = backfill_windows(1000, 2000, 5000);
        assert_eq!(windows.len(), 1);
        assert_eq!(windows[0].from, 1000);
        assert_eq!(windows[0].to, 2000);
    }

    #[test]
    fn test_walks_backward_from_the_end() {
        let windows = backfill_windows(0, 100, 30);
        assert_eq!(windows.len(), 4);
        assert_eq!((windows[0].from, windows[0].to), (70, 100));
        assert_eq!((windows[1].from, windows[1].to), (39, 69));
        assert_eq!((windows[2].from, windows[2].to), (8, 38));
        assert_eq!((windows[3].from, windows[3].to), (0, 7));
    }

    #[test]
    fn test_no_single_second_window_at_start() {
        // A naive cut at 6 would leave [5, 6] fighting over one second.
        let windows = backfill_windows(5, 16, 10);
        assert_eq!(windows.len(), 2);
        assert_eq!((windows[0].from, windows[0].to), (7, 16));
        assert_eq!((windows[1].from, windows[1].to), (5, 6));
        for w in &windows {
            assert!(w.from < w.to);
        }
    }

    #[test]
    fn test_empty_or_inverted_range_yields_nothing() {
        assert!(backfill_windows(100, 100, 30).is_empty());
        assert!(backfill_windows(200, 100, 30).is_empty());
    }

    #[test]
    fn test_two_year_backfill_window_count() {
        let end = 1_755_000_000;
        let start = end - 730 * 86_400;
        let windows = backfill_windows(start, end, MAX_WINDOW_SPAN_SECS);
        // 730 days of seconds split into 15-day windows.
        assert_eq!(windows.len(), 49);
        assert_eq!(windows[0].to, end);
        assert_eq!(windows.last().unwrap().from, start);
    }

    #[test]
    fn test_label_names_both_dates() {
        let windows = backfill_windows(1_700_000_000, 1_700_200_000, MAX_WINDOW_SPAN_SECS);
        assert_eq!(windows[0].label, "2023-11-14..2023-11-17");
    }

    #[test]
    fn test_random_ranges_cover_every_second_once() {
        let mut seed: u64 = 0x243F_6A88_85A3_08D3;
        let mut next = move || {
            seed ^= seed << 13;
            seed ^= seed >> 7;
            seed ^= seed << 17;
            seed
        };

        for _ in 0..500 {
            let start = (next() % 1_000_000) as i64;
            let end = start + 1 + (next() % 300_000) as i64;
            let max_span = 2 + (next() % 50_000) as i64;

            let windows = backfill_windows(start, end, max_span);
            assert!(!windows.is_empty());
            assert_eq!(windows[0].to, end);
            assert_eq!(windows.last().unwrap().from, start);
            for w in &windows {
                assert!(w.from < w.to, "degenerate window {w:?}");
                assert!(w.to - w.from <= max_span, "overwide window {w:?}");
            }
            for pair in windows.windows(2) {
                assert_eq!(pair[0].from, pair[1].to + 1, "gap between {pair:?}");
            }
            let covered: i64 = windows.iter().map(|w| w.to - w.from + 1).sum();
            assert_eq!(covered, end - start + 1);
        }
    }
}
