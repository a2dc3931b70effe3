use bytemuck::Zeroable;
use glam::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::backend::{Camera, ParticleBackend, ParticleDevice, ParticlePass, Transform, names};
use crate::config::EmitterConfig;
use crate::error::EmitterError;
use crate::particle::{Particle, index_count, quad_indices};
use crate::ring::LiveWindow;
use crate::staging::stage_live;

/// Fraction of an interval the emission clock must pass a tick by before it
/// fires. Absorbs `f32` rounding so time summed over many frames and the same
/// time in one frame land on the same tick.
const CADENCE_SLACK: f64 = 1e-4;

/// Lifetime counters, for diagnostics only.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct EmitterStats {
    /// Particles written into the pool.
    pub spawned: u64,
    /// Spawns discarded because the pool was saturated.
    pub dropped: u64,
    /// Particles aged out.
    pub retired: u64,
}

/// A fixed-capacity particle emitter backed by a ring buffer.
///
/// Per frame: [`update`](Self::update) ages and spawns particles, then
/// [`draw`](Self::draw) stages the live window into the GPU buffer and issues
/// one indexed draw for it.
///
/// The random source is injected so velocity jitter is reproducible under a
/// fixed seed.
pub struct Emitter<B: ParticleBackend, R: Rng = StdRng> {
    config: EmitterConfig,

    particles: Box<[Particle]>,
    window: LiveWindow,
    emit_clock: f64,
    emit_ticks: u64,
    paused: bool,

    transform: Transform,
    rng: R,
    stats: EmitterStats,
    warned_saturated: bool,

    particle_buffer: B::ParticleBuffer,
    index_buffer: B::IndexBuffer,
    texture: B::Texture,
    sampler: B::Sampler,
}

impl<B: ParticleBackend> Emitter<B, StdRng> {
    /// Creates an emitter whose velocity jitter is driven by `StdRng::seed_from_u64(seed)`.
    pub fn with_seed<D>(
        device: &mut D,
        config: EmitterConfig,
        texture: B::Texture,
        sampler: B::Sampler,
        seed: u64,
    ) -> Result<Self, EmitterError>
    where
        D: ParticleDevice<Backend = B>,
    {
        Self::new(device, config, texture, sampler, StdRng::seed_from_u64(seed))
    }
}

impl<B: ParticleBackend, R: Rng> Emitter<B, R> {
    /// Validates `config`, allocates the pool and creates the GPU resources:
    /// a structured buffer for `max_particles` records and an immutable
    /// index buffer of `max_particles` quads.
    pub fn new<D>(
        device: &mut D,
        config: EmitterConfig,
        texture: B::Texture,
        sampler: B::Sampler,
        rng: R,
    ) -> Result<Self, EmitterError>
    where
        D: ParticleDevice<Backend = B>,
    {
        config.validate()?;

        let capacity = config.max_particles;
        let particle_buffer = device.create_particle_buffer(capacity)?;
        let index_buffer = device.create_index_buffer(&quad_indices(capacity))?;

        log::debug!(
            "emitter created: capacity={capacity} lifetime={}s interval={}s",
            config.max_lifetime,
            config.emission.interval()
        );

        Ok(Self {
            particles: vec![Particle::zeroed(); capacity].into_boxed_slice(),
            window: LiveWindow::new(capacity),
            emit_clock: 0.0,
            emit_ticks: 0,
            paused: config.start_paused,
            transform: Transform::from_position(config.position),
            rng,
            stats: EmitterStats::default(),
            warned_saturated: false,
            particle_buffer,
            index_buffer,
            texture,
            sampler,
            config,
        })
    }

    // ── simulation ────────────────────────────────────────────────────────

    /// Spawns one particle at `now` into slot `first_dead`.
    ///
    /// Silently dropped when the pool is full.
    pub fn emit_particle(&mut self, now: f32) {
        let Some(slot) = self.window.claim() else {
            self.note_dropped(1);
            return;
        };

        let visuals = &self.config.visuals;
        let jitter = Vec3::new(
            self.rng.random_range(-1.0..=1.0),
            self.rng.random_range(-1.0..=1.0),
            self.rng.random_range(-1.0..=1.0),
        );

        self.particles[slot] = Particle {
            emit_time: now,
            start_position: self.transform.position(),
            start_velocity: visuals.base_velocity + visuals.velocity_random_range * jitter,
        };
        self.stats.spawned += 1;
    }

    /// Ages out expired particles, then emits on the configured cadence.
    ///
    /// A particle is retired once `now - emit_time > max_lifetime`. Emission
    /// ticks are counted from the total unpaused time, so the count does not
    /// depend on how `dt` is sliced across frames. Work per call is bounded by
    /// the free slots: spawns beyond them are only counted as dropped.
    /// Non-finite or negative `dt` advances nothing.
    pub fn update(&mut self, dt: f32, now: f32) {
        if self.paused {
            return;
        }

        // Oldest first: stop at the first survivor.
        while !self.window.is_empty() {
            let oldest = &self.particles[self.window.first_alive()];
            if oldest.age(now) <= self.config.max_lifetime {
                break;
            }
            self.window.retire_front();
            self.stats.retired += 1;
        }
        if !self.window.is_full() {
            self.warned_saturated = false;
        }

        if dt.is_finite() && dt > 0.0 {
            self.emit_clock += f64::from(dt);
        }

        let due = self.ticks_due();
        let ticks = due.saturating_sub(self.emit_ticks);
        self.emit_ticks = self.emit_ticks.max(due);
        if ticks == 0 {
            return;
        }

        let per_interval = u64::from(self.config.emission.particles_per_interval());
        let attempts = ticks.saturating_mul(per_interval);
        let free = (self.window.capacity() - self.window.len()) as u64;
        let spawns = attempts.min(free);

        for _ in 0..spawns {
            self.emit_particle(now);
        }
        if attempts > spawns {
            self.note_dropped(attempts - spawns);
        }
    }

    /// Whole intervals the emission clock strictly exceeds.
    ///
    /// Reaching exactly `k` intervals yields `k - 1`; the k-th tick fires
    /// only once the clock moves past it.
    fn ticks_due(&self) -> u64 {
        let ratio = self.emit_clock / self.interval() - CADENCE_SLACK;
        if ratio <= 1.0 {
            0
        } else {
            // Saturates for absurd clocks.
            ratio.ceil() as u64 - 1
        }
    }

    fn interval(&self) -> f64 {
        f64::from(self.config.emission.interval())
    }

    fn note_dropped(&mut self, count: u64) {
        self.stats.dropped = self.stats.dropped.saturating_add(count);
        if !self.warned_saturated {
            log::debug!(
                "emitter saturated at {} particles; further spawns are dropped",
                self.window.capacity()
            );
            self.warned_saturated = true;
        }
    }

    // ── rendering ─────────────────────────────────────────────────────────

    /// Copies the live window into the particle buffer, oldest first.
    ///
    /// The buffer is mapped for exactly the live count and released before
    /// returning. Returns the number of records staged; an empty window does
    /// not map at all.
    pub fn stage<D>(&self, device: &mut D) -> Result<usize, EmitterError>
    where
        D: ParticleDevice<Backend = B>,
    {
        let live = self.window.len();
        if live == 0 {
            return Ok(0);
        }

        let mut mapped = device.map_write(&self.particle_buffer, live)?;
        Ok(stage_live(&self.particles, &self.window, &mut mapped))
    }

    /// Stages, binds and draws the live particles.
    ///
    /// Draws `6 × num_living` indices: only the freshly staged prefix of the
    /// particle buffer is ever rasterised. No-op while paused or empty.
    pub fn draw<'r, D, P, C>(
        &'r self,
        device: &mut D,
        pass: &mut P,
        now: f32,
        camera: &C,
    ) -> Result<(), EmitterError>
    where
        D: ParticleDevice<Backend = B>,
        P: ParticlePass<'r, B>,
        C: Camera + ?Sized,
    {
        if self.paused {
            return Ok(());
        }

        let live = self.stage(device)?;
        if live == 0 {
            return Ok(());
        }

        let v = &self.config.visuals;

        pass.set_index_buffer(&self.index_buffer);

        pass.set_matrix4(names::VIEW, camera.view());
        pass.set_matrix4(names::PROJECTION, camera.projection());
        pass.set_float(names::CURRENT_TIME, now);
        pass.set_float4(names::START_COLOR, v.start_color);
        pass.set_float4(names::END_COLOR, v.end_color);
        pass.set_float(names::START_SIZE, v.start_size);
        pass.set_float(names::END_SIZE, v.end_size);
        pass.set_float(names::FADE_OUT, v.fade_out);
        pass.set_float(names::LIFETIME, self.config.max_lifetime);
        pass.set_float3(names::ACCELERATION, v.acceleration);

        pass.set_particle_data(names::PARTICLE_DATA, &self.particle_buffer);
        pass.set_texture(names::PARTICLE_TEXTURE, &self.texture);
        pass.set_sampler(names::PARTICLE_SAMPLER, &self.sampler);

        pass.commit()?;
        pass.draw_indexed(index_count(live));

        Ok(())
    }

    // ── state ─────────────────────────────────────────────────────────────

    pub fn config(&self) -> &EmitterConfig {
        &self.config
    }

    pub fn capacity(&self) -> usize {
        self.window.capacity()
    }

    pub fn first_alive(&self) -> usize {
        self.window.first_alive()
    }

    pub fn first_dead(&self) -> usize {
        self.window.first_dead()
    }

    pub fn num_living(&self) -> usize {
        self.window.len()
    }

    /// Time accumulated past the last emission tick.
    pub fn time_since_last_emit(&self) -> f32 {
        let elapsed = self.emit_clock - self.emit_ticks as f64 * self.interval();
        elapsed.max(0.0) as f32
    }

    pub fn stats(&self) -> EmitterStats {
        self.stats
    }

    /// Indices a draw of the current live window would cover.
    pub fn index_count(&self) -> u32 {
        index_count(self.window.len())
    }

    /// Live particles in ring order, oldest first.
    pub fn live_particles(&self) -> impl Iterator<Item = &Particle> + '_ {
        self.window.slots().map(|i| &self.particles[i])
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn unpause(&mut self) {
        self.paused = false;
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    pub fn transform_mut(&mut self) -> &mut Transform {
        &mut self.transform
    }

    pub fn texture(&self) -> &B::Texture {
        &self.texture
    }

    pub fn set_texture(&mut self, texture: B::Texture) {
        self.texture = texture;
    }

    pub fn set_sampler(&mut self, sampler: B::Sampler) {
        self.sampler = sampler;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{EmissionRate, ParticleVisuals};
    use crate::testing::{FixedCamera, PassOp, Recording, RecordingDevice, RecordingPass};
    use proptest::prelude::*;

    type TestEmitter = Emitter<Recording, StdRng>;

    fn config(capacity: usize, lifetime: f32, interval: f32) -> EmitterConfig {
        EmitterConfig {
            max_particles: capacity,
            max_lifetime: lifetime,
            emission: EmissionRate::SecondsPerParticle(interval),
            ..Default::default()
        }
    }

    fn emitter(dev: &mut RecordingDevice, cfg: EmitterConfig) -> TestEmitter {
        Emitter::with_seed(dev, cfg, "tex", "smp", 7).unwrap()
    }

    fn assert_window_invariants(e: &TestEmitter) {
        assert!(e.num_living() <= e.capacity());
        assert_eq!(e.first_dead(), (e.first_alive() + e.num_living()) % e.capacity());
    }

    // ── construction ──────────────────────────────────────────────────────

    #[test]
    fn new_allocates_buffers_and_starts_empty() {
        let mut dev = RecordingDevice::default();
        let e = emitter(&mut dev, config(5, 1.0, 0.25));

        assert_eq!(dev.particle_buffers.len(), 1);
        assert_eq!(dev.particle_buffers[0].len(), 5);
        assert_eq!(dev.index_buffers[0], quad_indices(5));
        assert_eq!((e.first_alive(), e.first_dead(), e.num_living()), (0, 0, 0));
        assert_eq!(e.time_since_last_emit(), 0.0);
    }

    #[test]
    fn invalid_config_rejected_before_allocation() {
        let mut dev = RecordingDevice::default();
        let err = TestEmitter::with_seed(&mut dev, config(0, 1.0, 0.1), "t", "s", 0)
            .err()
            .unwrap();
        assert!(matches!(err, EmitterError::InvalidConfiguration(_)));
        assert!(dev.particle_buffers.is_empty());

        let err = TestEmitter::with_seed(&mut dev, config(4, 1.0, 0.0), "t", "s", 0)
            .err()
            .unwrap();
        assert!(matches!(err, EmitterError::InvalidConfiguration(_)));
    }

    #[test]
    fn allocation_failure_propagates() {
        let mut dev = RecordingDevice { fail_allocations: true, ..Default::default() };
        let err = TestEmitter::with_seed(&mut dev, config(4, 1.0, 0.1), "t", "s", 0)
            .err()
            .unwrap();
        assert!(matches!(err, EmitterError::Backend(_)));
    }

    #[test]
    fn start_paused_and_position_come_from_config() {
        let mut dev = RecordingDevice::default();
        let cfg = EmitterConfig {
            start_paused: true,
            position: Vec3::new(1.0, 2.0, 3.0),
            ..config(4, 1.0, 0.1)
        };
        let e = emitter(&mut dev, cfg);
        assert!(e.is_paused());
        assert_eq!(e.transform().position(), Vec3::new(1.0, 2.0, 3.0));
    }

    // ── emission ──────────────────────────────────────────────────────────

    #[test]
    fn emit_writes_time_and_position() {
        let mut dev = RecordingDevice::default();
        let mut e = emitter(&mut dev, config(4, 1.0, 0.1));
        e.transform_mut().set_position(Vec3::new(0.5, -1.0, 2.0));
        e.emit_particle(3.0);

        let p = e.live_particles().next().copied().unwrap();
        assert_eq!(p.emit_time, 3.0);
        assert_eq!(p.start_position, Vec3::new(0.5, -1.0, 2.0));
        assert_eq!(e.first_dead(), 1);
        assert_eq!(e.num_living(), 1);
    }

    #[test]
    fn emit_on_full_pool_is_dropped() {
        let mut dev = RecordingDevice::default();
        let mut e = emitter(&mut dev, config(1, 10.0, 0.1));
        e.emit_particle(1.0);
        e.emit_particle(2.0);
        e.emit_particle(5.0);

        assert_eq!(e.num_living(), 1);
        assert_eq!(e.live_particles().next().unwrap().emit_time, 1.0);
        assert_eq!(e.stats().spawned, 1);
        assert_eq!(e.stats().dropped, 2);
        assert_window_invariants(&e);
    }

    #[test]
    fn burst_emits_per_interval() {
        let mut dev = RecordingDevice::default();
        let cfg = EmitterConfig {
            emission: EmissionRate::Burst { particles_per_emit: 3, seconds_per_emit: 0.5 },
            ..config(16, 10.0, 1.0)
        };
        let mut e = emitter(&mut dev, cfg);
        // 1.25 > 0.5 twice → two bursts.
        e.update(1.25, 1.25);
        assert_eq!(e.num_living(), 6);
        assert_eq!(e.time_since_last_emit(), 0.25);
    }

    #[test]
    fn accumulator_carries_remainder() {
        let mut dev = RecordingDevice::default();
        let mut e = emitter(&mut dev, config(16, 10.0, 0.25));
        e.update(0.375, 0.375);
        assert_eq!(e.num_living(), 1);
        assert_eq!(e.time_since_last_emit(), 0.125);
        e.update(0.125, 0.5);
        // 0.25 is not strictly greater than the interval.
        assert_eq!(e.num_living(), 1);
        e.update(0.125, 0.625);
        assert_eq!(e.num_living(), 2);
        assert_eq!(e.time_since_last_emit(), 0.125);
    }

    #[test]
    fn cadence_is_independent_of_frame_size() {
        let mut dev = RecordingDevice::default();
        let mut one = emitter(&mut dev, config(64, 100.0, 0.125));
        let mut many = emitter(&mut dev, config(64, 100.0, 0.125));

        one.update(2.0, 2.0);
        for i in 1..=16 {
            many.update(0.125, i as f32 * 0.125);
        }

        assert_eq!(one.num_living(), many.num_living());
        assert_eq!(one.stats().spawned, many.stats().spawned);
        assert_eq!(one.time_since_last_emit(), many.time_since_last_emit());
    }

    #[test]
    fn cadence_matches_when_saturating() {
        let mut dev = RecordingDevice::default();
        let mut one = emitter(&mut dev, config(4, 100.0, 0.125));
        let mut many = emitter(&mut dev, config(4, 100.0, 0.125));

        one.update(1.0, 1.0);
        for i in 1..=8 {
            many.update(0.125, i as f32 * 0.125);
        }

        assert_eq!(one.num_living(), 4);
        assert_eq!(many.num_living(), 4);
        assert_eq!(
            one.stats().spawned + one.stats().dropped,
            many.stats().spawned + many.stats().dropped
        );
    }

    /// Intervals that `f32` cannot store exactly still count the same ticks
    /// whether the time arrives in one frame or in interval-sized frames.
    #[test]
    fn cadence_matches_for_non_binary_intervals() {
        for (interval, steps) in [(0.1_f32, 10), (0.01, 100), (1.0 / 60.0, 60)] {
            let mut dev = RecordingDevice::default();
            let mut one = emitter(&mut dev, config(256, 100.0, interval));
            let mut many = emitter(&mut dev, config(256, 100.0, interval));

            one.update(1.0, 1.0);
            for i in 1..=steps {
                many.update(interval, i as f32 * interval);
            }

            assert_eq!(one.stats().spawned, steps - 1, "interval {interval}");
            assert_eq!(many.stats().spawned, steps - 1, "interval {interval}");
        }
    }

    #[test]
    fn large_dt_is_bounded_by_free_slots() {
        let mut dev = RecordingDevice::default();
        let mut e = emitter(&mut dev, config(8, 1.0e6, 0.001));
        e.update(1.0e5, 1.0e5);

        assert_eq!(e.num_living(), 8);
        assert_eq!(e.stats().spawned, 8);
        assert!(e.stats().dropped > 99_000_000);
        assert!(e.time_since_last_emit() > 0.0);
        assert!(e.time_since_last_emit() < 0.0011);
        assert_window_invariants(&e);

        // The cadence keeps going afterwards.
        let dropped = e.stats().dropped;
        e.update(0.0015, 1.0e5);
        assert_eq!(e.stats().dropped, dropped + 1);
    }

    #[test]
    fn huge_burst_spawns_only_free_slots() {
        let mut dev = RecordingDevice::default();
        let cfg = EmitterConfig {
            emission: EmissionRate::Burst { particles_per_emit: u32::MAX, seconds_per_emit: 0.5 },
            ..config(4, 10.0, 1.0)
        };
        let mut e = emitter(&mut dev, cfg);
        e.update(1.0, 1.0);

        assert_eq!(e.num_living(), 4);
        assert_eq!(e.stats().spawned, 4);
        assert_eq!(e.stats().dropped, u64::from(u32::MAX) - 4);
    }

    #[test]
    fn non_finite_dt_advances_nothing() {
        let mut dev = RecordingDevice::default();
        let mut e = emitter(&mut dev, config(8, 10.0, 0.25));
        e.update(f32::INFINITY, 1.0);
        e.update(f32::NAN, 1.0);
        e.update(-3.0, 1.0);
        assert_eq!(e.num_living(), 0);
        assert_eq!(e.time_since_last_emit(), 0.0);

        e.update(0.375, 1.0);
        assert_eq!(e.num_living(), 1);
    }

    #[test]
    fn saturation_warning_rearms_after_drain() {
        let mut dev = RecordingDevice::default();
        let mut e = emitter(&mut dev, config(1, 1.0, 100.0));
        e.emit_particle(0.0);
        e.emit_particle(0.0);
        assert!(e.warned_saturated);

        // Still full: stays quiet.
        e.update(0.0, 0.5);
        assert!(e.warned_saturated);

        e.update(0.0, 2.0);
        assert_eq!(e.num_living(), 0);
        assert!(!e.warned_saturated);

        e.emit_particle(2.0);
        e.emit_particle(2.0);
        assert!(e.warned_saturated);
        assert_eq!(e.stats().dropped, 2);
    }

    // ── retirement ────────────────────────────────────────────────────────

    #[test]
    fn retirement_is_strict() {
        let mut dev = RecordingDevice::default();
        let mut e = emitter(&mut dev, config(4, 1.0, 100.0));
        e.emit_particle(0.5);

        // Age exactly equals the lifetime: still alive.
        e.update(0.0, 1.5);
        assert_eq!(e.num_living(), 1);

        e.update(0.0, 1.5 + 1.0 / 64.0);
        assert_eq!(e.num_living(), 0);
        assert_eq!(e.first_alive(), 1);
        assert_eq!(e.stats().retired, 1);
    }

    #[test]
    fn retirement_trims_prefix_only() {
        let mut dev = RecordingDevice::default();
        let mut e = emitter(&mut dev, config(8, 1.0, 100.0));
        for t in [0.0, 0.25, 0.5, 1.0] {
            e.emit_particle(t);
        }
        e.update(0.0, 1.375);
        let times: Vec<f32> = e.live_particles().map(|p| p.emit_time).collect();
        assert_eq!(times, vec![0.5, 1.0]);
        assert_eq!(e.first_alive(), 2);
        assert_window_invariants(&e);
    }

    #[test]
    fn paused_update_is_noop() {
        let mut dev = RecordingDevice::default();
        let mut e = emitter(&mut dev, config(8, 1.0, 0.125));
        e.emit_particle(0.0);
        e.pause();
        e.update(5.0, 5.0);
        assert_eq!(e.num_living(), 1);
        assert_eq!(e.time_since_last_emit(), 0.0);

        e.unpause();
        e.update(0.0, 5.0);
        assert_eq!(e.num_living(), 0);
    }

    // ── velocity ──────────────────────────────────────────────────────────

    #[test]
    fn zero_range_gives_base_velocity() {
        let mut dev = RecordingDevice::default();
        let mut cfg = config(4, 1.0, 0.1);
        cfg.visuals.base_velocity = Vec3::new(0.0, 3.0, 0.0);
        let mut e = emitter(&mut dev, cfg);
        e.emit_particle(0.0);
        assert_eq!(e.live_particles().next().unwrap().start_velocity, Vec3::new(0.0, 3.0, 0.0));
    }

    #[test]
    fn same_seed_same_velocities() {
        let mut dev = RecordingDevice::default();
        let mut cfg = config(16, 10.0, 0.1);
        cfg.visuals.velocity_random_range = Vec3::new(1.0, 2.0, 0.5);

        let mut a = emitter(&mut dev, cfg.clone());
        let mut b = emitter(&mut dev, cfg);
        for t in 0..10 {
            a.emit_particle(t as f32);
            b.emit_particle(t as f32);
        }
        let va: Vec<Vec3> = a.live_particles().map(|p| p.start_velocity).collect();
        let vb: Vec<Vec3> = b.live_particles().map(|p| p.start_velocity).collect();
        assert_eq!(va, vb);
    }

    // ── staging ───────────────────────────────────────────────────────────

    /// capacity 4: emit 4, retire 3, emit 1 → first_alive 3, first_dead 1.
    fn wrapped_emitter(dev: &mut RecordingDevice) -> TestEmitter {
        let mut e = emitter(dev, config(4, 1.0, 100.0));
        for t in [0.0, 0.25, 0.5, 2.0] {
            e.emit_particle(t);
        }
        e.update(0.0, 2.0);
        e.emit_particle(2.5);
        assert_eq!((e.first_alive(), e.first_dead(), e.num_living()), (3, 1, 2));
        e
    }

    #[test]
    fn stage_wrapped_window_oldest_first() {
        let mut dev = RecordingDevice::default();
        let e = wrapped_emitter(&mut dev);

        assert_eq!(e.stage(&mut dev).unwrap(), 2);

        let gpu = &dev.particle_buffers[0];
        assert_eq!(gpu[0], e.particles[3]);
        assert_eq!(gpu[1], e.particles[0]);
        assert_eq!(gpu[0].emit_time, 2.0);
        assert_eq!(gpu[1].emit_time, 2.5);
    }

    #[test]
    fn stage_releases_mapping_once() {
        let mut dev = RecordingDevice::default();
        let e = wrapped_emitter(&mut dev);
        e.stage(&mut dev).unwrap();
        e.stage(&mut dev).unwrap();
        assert_eq!(dev.maps, 2);
        assert_eq!(dev.unmaps, 2);
    }

    #[test]
    fn stage_empty_does_not_map() {
        let mut dev = RecordingDevice::default();
        let e = emitter(&mut dev, config(4, 1.0, 0.1));
        assert_eq!(e.stage(&mut dev).unwrap(), 0);
        assert_eq!(dev.maps, 0);
    }

    // ── draw ──────────────────────────────────────────────────────────────

    #[test]
    fn draw_covers_live_particles_only() {
        let mut dev = RecordingDevice::default();
        let e = wrapped_emitter(&mut dev);
        let mut pass = RecordingPass::default();

        e.draw(&mut dev, &mut pass, 2.5, &FixedCamera).unwrap();

        assert_eq!(pass.draws(), vec![12]);
        assert_eq!(e.index_count(), 12);
        assert_eq!(pass.float(names::CURRENT_TIME), Some(2.5));
        assert_eq!(pass.float(names::LIFETIME), Some(1.0));
    }

    #[test]
    fn draw_binds_before_commit_and_commits_before_draw() {
        let mut dev = RecordingDevice::default();
        let mut cfg = config(4, 1.0, 0.1);
        cfg.visuals = ParticleVisuals { start_size: 0.5, ..Default::default() };
        let mut e = emitter(&mut dev, cfg);
        e.emit_particle(0.0);
        let mut pass = RecordingPass::default();

        e.draw(&mut dev, &mut pass, 0.5, &FixedCamera).unwrap();

        let commit = pass.ops.iter().position(|op| *op == PassOp::Commit).unwrap();
        let draw = pass.ops.iter().position(|op| matches!(op, PassOp::DrawIndexed(_))).unwrap();
        assert!(commit < draw);
        assert_eq!(pass.ops[0], PassOp::IndexBuffer(0));
        for expected in [
            PassOp::ParticleData(names::PARTICLE_DATA.into(), 0),
            PassOp::Texture(names::PARTICLE_TEXTURE.into(), "tex"),
            PassOp::Sampler(names::PARTICLE_SAMPLER.into(), "smp"),
            PassOp::Float(names::START_SIZE.into(), 0.5),
            PassOp::Matrix(names::VIEW.into(), FixedCamera.view()),
        ] {
            let at = pass.ops.iter().position(|op| *op == expected).unwrap();
            assert!(at < commit, "{expected:?} bound after commit");
        }
    }

    #[test]
    fn draw_is_noop_when_paused_or_empty() {
        let mut dev = RecordingDevice::default();
        let mut e = emitter(&mut dev, config(4, 1.0, 0.1));
        let mut pass = RecordingPass::default();

        e.draw(&mut dev, &mut pass, 0.0, &FixedCamera).unwrap();
        assert!(pass.ops.is_empty());

        e.emit_particle(0.0);
        e.pause();
        e.draw(&mut dev, &mut pass, 0.0, &FixedCamera).unwrap();
        assert!(pass.ops.is_empty());
        assert_eq!(dev.maps, 0);
    }

    #[test]
    fn set_texture_rebinds() {
        let mut dev = RecordingDevice::default();
        let mut e = emitter(&mut dev, config(4, 1.0, 0.1));
        e.set_texture("other");
        e.set_sampler("nearest");
        e.emit_particle(0.0);
        let mut pass = RecordingPass::default();
        e.draw(&mut dev, &mut pass, 0.0, &FixedCamera).unwrap();
        assert_eq!(*e.texture(), "other");
        assert!(pass.ops.contains(&PassOp::Texture(names::PARTICLE_TEXTURE.into(), "other")));
        assert!(pass.ops.contains(&PassOp::Sampler(names::PARTICLE_SAMPLER.into(), "nearest")));
    }

    // ── properties ────────────────────────────────────────────────────────

    proptest! {
        #[test]
        fn invariants_hold_across_updates(
            capacity in 1usize..24,
            lifetime in 0.05f32..2.0,
            interval in 0.01f32..0.5,
            dts in proptest::collection::vec(0.0f32..0.3, 1..80),
        ) {
            let mut dev = RecordingDevice::default();
            let mut e = emitter(&mut dev, config(capacity, lifetime, interval));
            let mut now = 0.0f32;
            for dt in dts {
                now += dt;
                e.update(dt, now);

                prop_assert!(e.num_living() <= e.capacity());
                prop_assert_eq!(e.first_dead(), (e.first_alive() + e.num_living()) % e.capacity());

                let times: Vec<f32> = e.live_particles().map(|p| p.emit_time).collect();
                prop_assert!(times.windows(2).all(|w| w[0] <= w[1]), "ages out of order: {:?}", times);
                prop_assert!(e.live_particles().all(|p| now - p.emit_time <= lifetime));
            }
        }

        #[test]
        fn velocity_stays_within_range(
            seed in any::<u64>(),
            base in proptest::array::uniform3(-5.0f32..5.0),
            range in proptest::array::uniform3(0.0f32..3.0),
        ) {
            let mut dev = RecordingDevice::default();
            let mut cfg = config(32, 10.0, 0.1);
            cfg.visuals.base_velocity = Vec3::from_array(base);
            cfg.visuals.velocity_random_range = Vec3::from_array(range);
            let mut e = TestEmitter::with_seed(&mut dev, cfg, "t", "s", seed).unwrap();

            for t in 0..32 {
                e.emit_particle(t as f32);
            }
            for p in e.live_particles() {
                let delta = (p.start_velocity - Vec3::from_array(base)).abs();
                let bound = Vec3::from_array(range) + Vec3::splat(1e-5);
                prop_assert!(delta.cmple(bound).all(), "{:?} outside {:?}", delta, range);
            }
        }
    }
}
