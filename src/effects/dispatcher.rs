use std::path::{Path, PathBuf};

use rand::Rng;
use tracing::{debug, info};

use crate::{
    config::{Config, EffectsConfig},
    effects::{EffectKind, EffectRegistry},
    error::{EffectError, ReelError, Result},
    video::{
        ClipPlan, EncoderParams, FfmpegEncoder, Frame, FrameSequencer, FrameSink, ImageLoader,
        MemorySink, RenderStats,
    },
};

/// Runs a named effect over a still image and writes the clip.
///
/// The dispatcher is deterministic for a given effect and seed; callers that
/// want variety choose the effect and seed themselves.
pub struct EffectDispatcher {
    registry: EffectRegistry,
    effects: EffectsConfig,
    sequencer: FrameSequencer,
    encoder: EncoderParams,
    seed: Option<u64>,
}

impl EffectDispatcher {
    pub fn new(config: &Config) -> Result<Self> {
        let registry = EffectRegistry::with_enabled(&config.effects.enabled_kinds()?);
        let sequencer = FrameSequencer::new(config.render.threads, config.render.batch_size)?;
        debug!(
            "Dispatcher ready: {} effects, {} render threads",
            registry.len(),
            sequencer.threads()
        );

        Ok(Self {
            registry,
            effects: config.effects.clone(),
            sequencer,
            encoder: config.render.encoder.clone(),
            seed: config.render.seed,
        })
    }

    /// Enabled effects in registry order
    pub fn list_effects(&self) -> Vec<EffectKind> {
        self.registry.list_effects()
    }

    pub fn registry(&self) -> &EffectRegistry {
        &self.registry
    }

    /// The configured seed, or a fresh random one
    pub fn seed_or_random(&self) -> u64 {
        self.seed.unwrap_or_else(|| rand::thread_rng().gen())
    }

    /// Resolve an effect name against the enabled effects
    pub fn resolve(&self, effect_id: &str) -> Result<EffectKind> {
        let kind: EffectKind = effect_id.parse()?;
        if !self.registry.has_effect(kind) {
            return Err(EffectError::Unknown {
                name: effect_id.to_string(),
            }
            .into());
        }
        Ok(kind)
    }

    /// Render `effect_id` over the image at `image_path` into `output_path`.
    ///
    /// Unknown effect names fail with [`EffectError::Unknown`]; every other
    /// failure is wrapped in [`EffectError::Execution`].
    pub fn invoke<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        effect_id: &str,
        image_path: P,
        duration: f64,
        fps: u32,
        output_path: Q,
    ) -> Result<PathBuf> {
        let kind = self.resolve(effect_id)?;
        self.invoke_seeded(kind, image_path, duration, fps, output_path, self.seed_or_random())
    }

    /// Like [`invoke`](Self::invoke) with an explicit effect and seed
    pub fn invoke_seeded<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        kind: EffectKind,
        image_path: P,
        duration: f64,
        fps: u32,
        output_path: Q,
        seed: u64,
    ) -> Result<PathBuf> {
        let image_path = image_path.as_ref();
        let output_path = output_path.as_ref();

        info!("Animating {:?} with {} (seed {})", image_path, kind, seed);

        self.encode_clip(kind, image_path, duration, fps, output_path, seed)
            .map_err(|e| ReelError::execution(kind.name(), e))?;

        Ok(output_path.to_path_buf())
    }

    fn encode_clip(
        &self,
        kind: EffectKind,
        image_path: &Path,
        duration: f64,
        fps: u32,
        output_path: &Path,
        seed: u64,
    ) -> Result<RenderStats> {
        let source = ImageLoader::load(image_path)?;
        let plan = ClipPlan::new(source.width(), source.height(), duration, fps)?;
        debug!(
            "{}: {}x{}, {} frames @ {} fps ({:.2}s)",
            kind,
            plan.width,
            plan.height,
            plan.total_frames,
            plan.fps,
            plan.duration()
        );

        let mut encoder = FfmpegEncoder::new(output_path, plan, &self.encoder)?;
        self.render_to_sink(kind, &source, &plan, seed, &mut encoder)
    }

    /// Render every frame of `kind` into `sink` using the configured parameters
    pub fn render_to_sink(
        &self,
        kind: EffectKind,
        source: &Frame,
        plan: &ClipPlan,
        seed: u64,
        sink: &mut dyn FrameSink,
    ) -> Result<RenderStats> {
        let effect = match self.registry.build(kind, &self.effects.params_for(kind)) {
            Ok(effect) => effect,
            Err(e) => {
                sink.abort();
                return Err(e);
            }
        };
        self.sequencer.render(effect.as_ref(), source, plan, seed, sink)
    }

    /// Render a clip of `kind` into memory
    pub fn animate(&self, kind: EffectKind, source: &Frame, duration: f64, fps: u32, seed: u64) -> Result<Vec<Frame>> {
        let render = || -> Result<Vec<Frame>> {
            let plan = ClipPlan::new(source.width(), source.height(), duration, fps)?;
            let mut sink = MemorySink::new(plan);
            self.render_to_sink(kind, source, &plan, seed, &mut sink)?;
            Ok(sink.into_frames())
        };
        render().map_err(|e| ReelError::execution(kind.name(), e))
    }
}
