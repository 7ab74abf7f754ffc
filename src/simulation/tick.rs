/// Tick resources and metrics for the navigation pipeline
use bevy::prelude::*;
use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Current game tick as reported by the adapter.
/// Mirrors the world's own clock; never invented locally.
#[derive(Resource, Default, Debug, Clone, Copy)]
pub struct SimulationTick(pub u64);

impl SimulationTick {
    pub fn get(&self) -> u64 {
        self.0
    }

    pub fn set(&mut self, tick: u64) {
        self.0 = tick;
    }
}

/// Rolling tick-duration metrics
#[derive(Resource)]
pub struct TickMetrics {
    durations: VecDeque<Duration>,
    max_samples: usize,
    current_start: Option<Instant>,
}

impl Default for TickMetrics {
    fn default() -> Self {
        Self {
            durations: VecDeque::with_capacity(120),
            max_samples: 120,
            current_start: None,
        }
    }
}

impl TickMetrics {
    pub fn start_tick(&mut self) {
        self.current_start = Some(Instant::now());
    }

    pub fn end_tick(&mut self) {
        if let Some(start) = self.current_start.take() {
            self.durations.push_back(start.elapsed());
            while self.durations.len() > self.max_samples {
                self.durations.pop_front();
            }
        }
    }

    pub fn average_duration(&self) -> Duration {
        if self.durations.is_empty() {
            return Duration::ZERO;
        }
        let total: Duration = self.durations.iter().sum();
        total / self.durations.len() as u32
    }

    pub fn max_duration(&self) -> Option<Duration> {
        self.durations.iter().max().copied()
    }

    pub fn last_duration(&self) -> Option<Duration> {
        self.durations.back().copied()
    }
}

/// Run condition: execute a system every N ticks
pub fn every_n_ticks(n: u64) -> impl Fn(Res<SimulationTick>) -> bool + Clone {
    move |tick: Res<SimulationTick>| tick.0 % n == 0
}

/// System: log rolling tick metrics
pub fn log_tick_metrics(tick: Res<SimulationTick>, metrics: Res<TickMetrics>) {
    let avg = metrics.average_duration();
    let max = metrics.max_duration().unwrap_or(Duration::ZERO);
    info!(
        "📊 Tick {} - avg {:.2}ms, worst {:.2}ms over the last window",
        tick.get(),
        avg.as_secs_f64() * 1000.0,
        max.as_secs_f64() * 1000.0
    );
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::ecs::system::SystemState;

    #[test]
    fn test_tick_mirrors_set_value() {
        let mut tick = SimulationTick::default();
        assert_eq!(tick.get(), 0);
        tick.set(42);
        assert_eq!(tick.get(), 42);
    }

    #[test]
    fn test_metrics_record_durations() {
        let mut metrics = TickMetrics::default();
        metrics.start_tick();
        std::thread::sleep(Duration::from_millis(1));
        metrics.end_tick();
        assert!(metrics.last_duration().unwrap() >= Duration::from_millis(1));
        assert!(metrics.average_duration() > Duration::ZERO);
    }

    #[test]
    fn test_every_n_ticks_condition() {
        let cond = every_n_ticks(5);
        let mut world = World::new();
        world.insert_resource(SimulationTick(10));
        let mut state: SystemState<Res<SimulationTick>> = SystemState::new(&mut world);
        let tick = state.get(&world);
        assert!(cond(tick));

        world.insert_resource(SimulationTick(11));
        let mut state: SystemState<Res<SimulationTick>> = SystemState::new(&mut world);
        let tick = state.get(&world);
        assert!(!cond(tick));
    }
}
