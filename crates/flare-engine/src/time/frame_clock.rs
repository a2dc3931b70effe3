use std::time::{Duration, Instant};

/// How the clock advances between ticks.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum TimeStep {
    /// Every tick advances by exactly this many seconds.
    ///
    /// Offscreen runs use this so a run is reproducible frame by frame.
    Fixed(f32),
    /// Ticks advance by measured wall-clock time (clamped).
    Realtime,
}

impl TimeStep {
    /// Fixed step for a target frame rate.
    pub fn fps(fps: u32) -> Self {
        Self::Fixed(1.0 / fps.max(1) as f32)
    }
}

impl Default for TimeStep {
    fn default() -> Self {
        Self::fps(60)
    }
}

/// Frame timing snapshot.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FrameTime {
    /// Time elapsed since the previous frame tick, in seconds.
    pub dt: f32,

    /// Simulation time at this tick: the sum of all `dt` so far, in seconds.
    pub elapsed: f32,

    /// Monotonic frame counter.
    pub frame_index: u64,
}

/// Frame clock producing `FrameTime` snapshots.
///
/// In realtime mode delta time is clamped to avoid pathological values when
/// the application is paused by the debugger or stalls.
#[derive(Debug, Clone)]
pub struct FrameClock {
    step: TimeStep,
    last: Instant,
    elapsed: f64,
    frame_index: u64,
    dt_min: Duration,
    dt_max: Duration,
}

impl FrameClock {
    /// Creates a new clock with default clamps.
    pub fn new(step: TimeStep) -> Self {
        Self::with_clamps(
            step,
            Duration::from_micros(100), // 0.0001s
            Duration::from_millis(250), // 0.25s
        )
    }

    /// Creates a clock with custom realtime delta-time clamps.
    pub fn with_clamps(step: TimeStep, dt_min: Duration, dt_max: Duration) -> Self {
        debug_assert!(dt_min <= dt_max);
        Self {
            step,
            last: Instant::now(),
            elapsed: 0.0,
            frame_index: 0,
            dt_min,
            dt_max,
        }
    }

    pub fn step(&self) -> TimeStep {
        self.step
    }

    /// Resets the realtime baseline. Elapsed time is kept.
    pub fn reset(&mut self) {
        self.last = Instant::now();
    }

    /// Advances the clock and returns a new `FrameTime`.
    pub fn tick(&mut self) -> FrameTime {
        let now = Instant::now();
        let dt = match self.step {
            TimeStep::Fixed(dt) => dt,
            TimeStep::Realtime => now
                .saturating_duration_since(self.last)
                .clamp(self.dt_min, self.dt_max)
                .as_secs_f32(),
        };
        self.last = now;

        // Accumulate in f64 so long runs do not drift.
        self.elapsed += dt as f64;

        let ft = FrameTime {
            dt,
            elapsed: self.elapsed as f32,
            frame_index: self.frame_index,
        };

        self.frame_index = self.frame_index.wrapping_add(1);

        ft
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new(TimeStep::default())
    }
}
