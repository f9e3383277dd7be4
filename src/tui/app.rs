//! TUI application state and logic

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::time::{Duration, Instant};

use crate::capture::{CaptureEngine, CaptureStats};
use crate::config::Config;
use crate::stats::{SortMode, SortOrder, Stat, StatsAggregator};
use crate::tui::LogBuffer;

/// State behind the rendered dashboard. Refreshes leaderboard snapshots
/// on the configured interval; sort mode and direction are switchable at
/// runtime.
pub struct TuiApp<'a> {
    stats: &'a StatsAggregator,
    capture: &'a CaptureEngine,
    log_buffer: LogBuffer,
    interface: String,
    port: u16,
    refresh_interval: Duration,
    sort_mode: SortMode,
    sort_order: SortOrder,
    leaders: Vec<Stat>,
    capture_stats: CaptureStats,
    started_at: Instant,
    last_refresh: Option<Instant>,
}

impl<'a> TuiApp<'a> {
    #[must_use]
    pub fn new(
        stats: &'a StatsAggregator,
        capture: &'a CaptureEngine,
        log_buffer: LogBuffer,
        config: &Config,
    ) -> Self {
        Self {
            stats,
            capture,
            log_buffer,
            interface: config.interface.clone(),
            port: config.port,
            refresh_interval: config.refresh_interval(),
            sort_mode: config.sort_mode,
            sort_order: config.sort_order,
            leaders: Vec::new(),
            capture_stats: CaptureStats::default(),
            started_at: Instant::now(),
            last_refresh: None,
        }
    }

    /// Take fresh snapshots when the refresh interval has elapsed.
    pub fn refresh_if_due(&mut self) {
        let due = self
            .last_refresh
            .is_none_or(|last| last.elapsed() >= self.refresh_interval);
        if due {
            self.refresh();
        }
    }

    fn refresh(&mut self) {
        self.leaders = self.stats.get_leaders(self.sort_mode, self.sort_order);
        self.capture_stats = self.capture.stats();
        self.last_refresh = Some(Instant::now());
    }

    /// How long the event loop may block before the next refresh is due.
    #[must_use]
    pub fn tick_timeout(&self) -> Duration {
        const MAX_POLL: Duration = Duration::from_millis(250);
        let until_refresh = self
            .last_refresh
            .map_or(Duration::ZERO, |last| {
                self.refresh_interval.saturating_sub(last.elapsed())
            });
        until_refresh.min(MAX_POLL)
    }

    /// Apply a key press; returns true when the app should quit.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => return true,
            KeyCode::Char('c') | KeyCode::Char('C') => self.set_sort_mode(SortMode::Calls),
            KeyCode::Char('s') | KeyCode::Char('S') => self.set_sort_mode(SortMode::Size),
            KeyCode::Char('r') | KeyCode::Char('R') => self.set_sort_mode(SortMode::ReqRate),
            KeyCode::Char('b') | KeyCode::Char('B') => self.set_sort_mode(SortMode::Bandwidth),
            KeyCode::Char('o') | KeyCode::Char('O') => {
                self.sort_order = self.sort_order.toggled();
                self.refresh();
            }
            _ => {}
        }
        false
    }

    fn set_sort_mode(&mut self, mode: SortMode) {
        self.sort_mode = mode;
        self.refresh();
    }

    #[must_use]
    pub fn leaders(&self) -> &[Stat] {
        &self.leaders
    }

    #[must_use]
    pub fn capture_stats(&self) -> CaptureStats {
        self.capture_stats
    }

    #[must_use]
    pub fn capture_alive(&self) -> bool {
        self.capture.is_running()
    }

    #[must_use]
    pub fn stat_count(&self) -> usize {
        self.stats.stat_count()
    }

    #[must_use]
    pub fn sort_mode(&self) -> SortMode {
        self.sort_mode
    }

    #[must_use]
    pub fn sort_order(&self) -> SortOrder {
        self.sort_order
    }

    #[must_use]
    pub fn interface(&self) -> &str {
        &self.interface
    }

    #[must_use]
    pub fn port(&self) -> u16 {
        self.port
    }

    #[must_use]
    pub fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }

    #[must_use]
    pub fn recent_logs(&self, count: usize) -> Vec<String> {
        self.log_buffer.recent_lines(count)
    }
}
