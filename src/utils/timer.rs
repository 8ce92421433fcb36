//! Named phase timing for graph construction.

use log::debug;
use std::fmt;
use std::time::{Duration, Instant};

/// Records how long each named phase of a read took.
///
/// Each reader owns its own timer; there is no shared state.
#[derive(Debug, Clone, Default)]
pub struct PhaseTimer {
    phases: Vec<(String, Duration)>,
}

impl PhaseTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` as the phase `name`, recording its elapsed time.
    ///
    /// The duration is recorded whether `f` succeeds or not.
    pub fn phase<T>(&mut self, name: &str, f: impl FnOnce() -> T) -> T {
        let start = Instant::now();
        let result = f();
        let elapsed = start.elapsed();
        debug!("Phase '{}' took {:.3}ms", name, elapsed.as_secs_f64() * 1000.0);
        self.phases.push((name.to_string(), elapsed));
        result
    }

    pub fn phases(&self) -> &[(String, Duration)] {
        &self.phases
    }

    /// Total time spent across all recorded phases
    pub fn total(&self) -> Duration {
        self.phases.iter().map(|(_, d)| *d).sum()
    }
}

impl fmt::Display for PhaseTimer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, elapsed) in &self.phases {
            writeln!(f, "{:<20} {:>10.3}ms", name, elapsed.as_secs_f64() * 1000.0)?;
        }
        write!(f, "{:<20} {:>10.3}ms", "total", self.total().as_secs_f64() * 1000.0)
    }
}
