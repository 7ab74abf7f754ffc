/// Tick-based and wall-clock timers
///
/// Behaviors gate periodic work (scans, cooldowns, give-up windows) on
/// `TimerGame`, which counts game ticks and therefore pauses with the game.
/// `TimerReal` and `Stopwatch` measure wall time for planner budgets.
use std::time::{Duration, Instant};

/// Timer counted in game ticks against the world's tick counter
#[derive(Debug, Clone, Copy)]
pub struct TimerGame {
    started_tick: u64,
}

impl TimerGame {
    pub fn new(current_tick: u64) -> Self {
        Self {
            started_tick: current_tick,
        }
    }

    /// Ticks elapsed since the last reset
    pub fn elapsed(&self, current_tick: u64) -> u64 {
        current_tick.saturating_sub(self.started_tick)
    }

    pub fn has_elapsed(&self, current_tick: u64, ticks: u64) -> bool {
        self.elapsed(current_tick) >= ticks
    }

    pub fn reset(&mut self, current_tick: u64) {
        self.started_tick = current_tick;
    }
}

/// Timer counted in wall-clock time
#[derive(Debug, Clone, Copy)]
pub struct TimerReal {
    started: Instant,
}

impl TimerReal {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    pub fn elapsed_ms(&self) -> f64 {
        self.started.elapsed().as_secs_f64() * 1000.0
    }

    pub fn has_elapsed(&self, ms: f64) -> bool {
        self.elapsed_ms() >= ms
    }

    pub fn reset(&mut self) {
        self.started = Instant::now();
    }
}

impl Default for TimerReal {
    fn default() -> Self {
        Self::new()
    }
}

/// Accumulating stopwatch for measuring planner slices across suspensions
#[derive(Debug, Clone, Copy, Default)]
pub struct Stopwatch {
    accumulated: Duration,
    running_since: Option<Instant>,
}

impl Stopwatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self) {
        if self.running_since.is_none() {
            self.running_since = Some(Instant::now());
        }
    }

    pub fn stop(&mut self) {
        if let Some(since) = self.running_since.take() {
            self.accumulated += since.elapsed();
        }
    }

    pub fn is_running(&self) -> bool {
        self.running_since.is_some()
    }

    /// Total accumulated time, including the in-flight segment if running
    pub fn elapsed(&self) -> Duration {
        match self.running_since {
            Some(since) => self.accumulated + since.elapsed(),
            None => self.accumulated,
        }
    }

    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed().as_secs_f64() * 1000.0
    }

    pub fn reset(&mut self) {
        self.accumulated = Duration::ZERO;
        self.running_since = None;
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_game_timer_elapsed() {
        let mut timer = TimerGame::new(100);
        assert_eq!(timer.elapsed(100), 0);
        assert_eq!(timer.elapsed(140), 40);
        assert!(timer.has_elapsed(140, 40));
        assert!(!timer.has_elapsed(139, 40));

        timer.reset(200);
        assert_eq!(timer.elapsed(200), 0);
    }

    #[test]
    fn test_game_timer_never_underflows() {
        let timer = TimerGame::new(50);
        // A tick counter reset mid-flight must not wrap
        assert_eq!(timer.elapsed(10), 0);
    }

    #[test]
    fn test_stopwatch_accumulates_across_stops() {
        let mut sw = Stopwatch::new();
        sw.start();
        std::thread::sleep(Duration::from_millis(2));
        sw.stop();
        let first = sw.elapsed();
        assert!(first >= Duration::from_millis(2));

        sw.start();
        std::thread::sleep(Duration::from_millis(2));
        sw.stop();
        assert!(sw.elapsed() >= first + Duration::from_millis(2));

        sw.reset();
        assert_eq!(sw.elapsed(), Duration::ZERO);
    }

    #[test]
    fn test_stopwatch_double_start_is_idempotent() {
        let mut sw = Stopwatch::new();
        sw.start();
        sw.start();
        assert!(sw.is_running());
        sw.stop();
        assert!(!sw.is_running());
    }
}
