use anyhow::{Context, Result};
use flare_engine::core::{App, AppControl, FrameCtx};
use flare_engine::render::particles::{WgpuEmitter, WgpuParticleDevice};
use flare_engine::render::{OrbitCamera, ParticleRenderer, ParticleTexture};
use flare_particles::{Emitter, PresetFile};

const CLEAR: wgpu::Color = wgpu::Color {
    r: 0.02,
    g: 0.02,
    b: 0.04,
    a: 1.0,
};

/// Radians per simulated second.
const ORBIT_SPEED: f32 = 0.25;

struct NamedEmitter {
    name: String,
    emitter: WgpuEmitter,
}

/// Builds emitters from presets on the first frame, then updates and draws
/// them every frame under a slowly orbiting camera.
pub struct DemoApp {
    presets: PresetFile,
    seed: u64,
    stats_every: u64,

    renderer: ParticleRenderer,
    texture: Option<ParticleTexture>,
    emitters: Vec<NamedEmitter>,
    camera: OrbitCamera,
}

impl DemoApp {
    pub fn new(presets: PresetFile, seed: u64, stats_every: u64) -> Self {
        Self {
            presets,
            seed,
            stats_every,
            renderer: ParticleRenderer::new(),
            texture: None,
            emitters: Vec::new(),
            camera: OrbitCamera::default(),
        }
    }

    fn log_stats(&self, frame_index: u64) {
        for NamedEmitter { name, emitter } in &self.emitters {
            let stats = emitter.stats();
            log::info!(
                "[frame {frame_index:>5}] {name}: {}/{} live, spawned {}, retired {}, dropped {}",
                emitter.num_living(),
                emitter.capacity(),
                stats.spawned,
                stats.retired,
                stats.dropped
            );
        }
    }
}

fn spawn_emitters(
    device: &mut WgpuParticleDevice<'_>,
    presets: &PresetFile,
    texture: &ParticleTexture,
    seed: u64,
) -> Result<Vec<NamedEmitter>> {
    let mut emitters = Vec::with_capacity(presets.emitters.len());
    for (i, preset) in presets.emitters.iter().enumerate() {
        let mut emitter = Emitter::with_seed(
            device,
            preset.config.clone(),
            texture.view.clone(),
            texture.sampler.clone(),
            seed.wrapping_add(i as u64),
        )
        .with_context(|| format!("failed to create emitter {:?}", preset.name))?;

        // Presets may start paused; the demo runs everything from frame one.
        emitter.unpause();
        log::info!(
            "emitter {:?}: {} particles, {}s lifetime",
            preset.name,
            emitter.capacity(),
            preset.config.max_lifetime
        );
        emitters.push(NamedEmitter {
            name: preset.name.clone(),
            emitter,
        });
    }
    Ok(emitters)
}

impl App for DemoApp {
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_>) -> Result<AppControl> {
        let time = ctx.time;

        ctx.render(CLEAR, |rctx, target| {
            if self.emitters.is_empty() {
                let texture = self
                    .texture
                    .get_or_insert_with(|| ParticleTexture::soft_disc(rctx.device, rctx.queue));
                let mut device = self.renderer.device(rctx);
                self.emitters = spawn_emitters(&mut device, &self.presets, texture, self.seed)?;
            }

            self.camera.aspect = rctx.aspect();
            self.camera.orbit(ORBIT_SPEED * time.dt);

            for e in &mut self.emitters {
                e.emitter.update(time.dt, time.elapsed);
            }

            let mut frame = self.renderer.begin(rctx)?;
            for e in &self.emitters {
                e.emitter
                    .draw(&mut frame.device, &mut frame.pass, time.elapsed, &self.camera)
                    .with_context(|| format!("failed to draw emitter {:?}", e.name))?;
            }
            frame.pass.finish(target);
            Ok(())
        })?;

        if self.stats_every > 0 && time.frame_index % self.stats_every == 0 {
            self.log_stats(time.frame_index);
        }

        Ok(AppControl::Continue)
    }
}
