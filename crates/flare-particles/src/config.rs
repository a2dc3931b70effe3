use glam::{Vec3, Vec4};
use serde::{Deserialize, Serialize};

use crate::error::EmitterError;
use crate::particle::INDICES_PER_PARTICLE;

/// Emission cadence.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmissionRate {
    /// One particle every `seconds` seconds.
    SecondsPerParticle(f32),
    /// `particles_per_emit` particles every `seconds_per_emit` seconds.
    Burst {
        particles_per_emit: u32,
        seconds_per_emit: f32,
    },
}

impl EmissionRate {
    /// Seconds between emission ticks.
    #[inline]
    pub fn interval(&self) -> f32 {
        match *self {
            Self::SecondsPerParticle(s) => s,
            Self::Burst { seconds_per_emit, .. } => seconds_per_emit,
        }
    }

    /// Spawn attempts per emission tick.
    #[inline]
    pub fn particles_per_interval(&self) -> u32 {
        match *self {
            Self::SecondsPerParticle(_) => 1,
            Self::Burst { particles_per_emit, .. } => particles_per_emit,
        }
    }
}

impl Default for EmissionRate {
    fn default() -> Self {
        Self::SecondsPerParticle(0.05)
    }
}

/// Per-emitter visual and physical parameters.
///
/// Everything except the velocity fields is passed through to the shading
/// stage untouched.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParticleVisuals {
    pub start_color: Vec4,
    pub end_color: Vec4,
    pub start_size: f32,
    pub end_size: f32,
    /// Fraction of the lifetime after which alpha starts fading to zero.
    pub fade_out: f32,
    pub base_velocity: Vec3,
    /// Per-axis half-width of the uniform velocity jitter.
    pub velocity_random_range: Vec3,
    pub acceleration: Vec3,
}

impl Default for ParticleVisuals {
    fn default() -> Self {
        Self {
            start_color: Vec4::ONE,
            end_color: Vec4::new(1.0, 1.0, 1.0, 0.0),
            start_size: 0.1,
            end_size: 0.1,
            fade_out: 1.0,
            base_velocity: Vec3::ZERO,
            velocity_random_range: Vec3::ZERO,
            acceleration: Vec3::ZERO,
        }
    }
}

/// Emitter construction parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmitterConfig {
    /// Pool capacity. Fixed for the emitter's lifetime.
    pub max_particles: usize,
    /// Seconds a particle stays alive.
    pub max_lifetime: f32,
    pub emission: EmissionRate,
    /// Emitters can start paused and be unpaused on the first frame.
    pub start_paused: bool,
    /// Initial emitter position.
    pub position: Vec3,
    pub visuals: ParticleVisuals,
}

impl Default for EmitterConfig {
    fn default() -> Self {
        Self {
            max_particles: 256,
            max_lifetime: 2.0,
            emission: EmissionRate::default(),
            start_paused: false,
            position: Vec3::ZERO,
            visuals: ParticleVisuals::default(),
        }
    }
}

impl EmitterConfig {
    /// Checks everything the emitter relies on for well-defined arithmetic.
    pub fn validate(&self) -> Result<(), EmitterError> {
        if self.max_particles == 0 {
            return Err(EmitterError::invalid("max_particles must be at least 1"));
        }
        let max_quads = (u32::MAX / INDICES_PER_PARTICLE) as usize;
        if self.max_particles > max_quads {
            return Err(EmitterError::invalid(format!(
                "max_particles {} exceeds the 32-bit index range ({max_quads})",
                self.max_particles
            )));
        }
        if !(self.max_lifetime.is_finite() && self.max_lifetime > 0.0) {
            return Err(EmitterError::invalid(format!(
                "max_lifetime must be positive and finite, got {}",
                self.max_lifetime
            )));
        }

        let interval = self.emission.interval();
        if !(interval.is_finite() && interval > 0.0) {
            return Err(EmitterError::invalid(format!(
                "emission interval must be positive and finite, got {interval}"
            )));
        }
        if self.emission.particles_per_interval() == 0 {
            return Err(EmitterError::invalid("particles_per_emit must be at least 1"));
        }

        let range = self.visuals.velocity_random_range;
        if !range.is_finite() || range.min_element() < 0.0 {
            return Err(EmitterError::invalid(format!(
                "velocity_random_range must be finite and non-negative, got {range}"
            )));
        }

        Ok(())
    }
}
