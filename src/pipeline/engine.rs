use std::path::{Path, PathBuf};

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, warn};

use crate::{
    config::{Config, PipelineConfig},
    effects::{EffectDispatcher, EffectKind, EffectRegistry},
    error::{PipelineError, Result, VideoError},
    pipeline::storyboard::{Scene, Storyboard},
    pipeline::tools::{
        AudioDurationProbe, AudioMuxer, ClipConcatenator, DurationProbe, FfmpegTools, SubtitleBurner,
    },
};

const WORK_SUBDIRS: [&str; 3] = ["stills", "silent", "clips"];

/// A rendered clip without audio
#[derive(Debug, Clone, PartialEq)]
pub struct SilentClip {
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
}

/// Turns a still into a silent clip with a given effect
pub trait ClipRenderer {
    fn render_clip(
        &self,
        kind: EffectKind,
        image: &Path,
        duration: f64,
        fps: u32,
        output: &Path,
        seed: u64,
    ) -> Result<SilentClip>;
}

impl ClipRenderer for EffectDispatcher {
    fn render_clip(
        &self,
        kind: EffectKind,
        image: &Path,
        duration: f64,
        fps: u32,
        output: &Path,
        seed: u64,
    ) -> Result<SilentClip> {
        let (width, height) = image::image_dimensions(image).map_err(|e| VideoError::ImageDecode {
            path: image.display().to_string(),
            reason: e.to_string(),
        })?;
        let path = self.invoke_seeded(kind, image, duration, fps, output, seed)?;
        Ok(SilentClip { path, width, height })
    }
}

/// A scene that made it into the final video
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedScene {
    /// 1-based scene number
    pub index: usize,
    pub effect: EffectKind,
    pub seed: u64,
    pub duration: f64,
    /// Width and height of the clip's frames
    pub frame_size: (u32, u32),
    pub clip: PathBuf,
}

/// A scene left out after an error
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedScene {
    /// 1-based scene number
    pub index: usize,
    pub text: String,
    pub reason: String,
}

/// Outcome of one pipeline run
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineReport {
    pub output: PathBuf,
    pub rendered: Vec<RenderedScene>,
    pub skipped: Vec<SkippedScene>,
}

impl PipelineReport {
    /// Total length of the rendered scenes in seconds
    pub fn duration(&self) -> f64 {
        self.rendered.iter().map(|scene| scene.duration).sum()
    }
}

/// Scene-by-scene orchestrator
///
/// For each scene, in order:
/// 1. Measure the narration
/// 2. Burn the subtitle onto a copy of the still
/// 3. Animate the still with a randomly chosen effect
/// 4. Mux the narration into the clip
///
/// A failing scene is logged and skipped; the surviving clips are then
/// concatenated into the output.
pub struct ScenePipeline {
    settings: PipelineConfig,
    fps: u32,
    seed: Option<u64>,
    registry: EffectRegistry,
    renderer: Box<dyn ClipRenderer>,
    probe: Box<dyn DurationProbe>,
    subtitles: Box<dyn SubtitleBurner>,
    muxer: Box<dyn AudioMuxer>,
    concatenator: Box<dyn ClipConcatenator>,
}

impl ScenePipeline {
    /// Create a pipeline using the effect dispatcher and ffmpeg tools
    pub fn new(config: &Config) -> Result<Self> {
        config.validate()?;

        let tools = FfmpegTools::new(config.render.encoder.clone(), config.pipeline.subtitles.clone());

        Ok(Self {
            settings: config.pipeline.clone(),
            fps: config.render.fps,
            seed: config.render.seed,
            registry: EffectRegistry::with_enabled(&config.effects.enabled_kinds()?),
            renderer: Box::new(EffectDispatcher::new(config)?),
            probe: Box::new(AudioDurationProbe),
            subtitles: Box::new(tools.clone()),
            muxer: Box::new(tools.clone()),
            concatenator: Box::new(tools),
        })
    }

    pub fn with_renderer(mut self, renderer: Box<dyn ClipRenderer>) -> Self {
        self.renderer = renderer;
        self
    }

    pub fn with_probe(mut self, probe: Box<dyn DurationProbe>) -> Self {
        self.probe = probe;
        self
    }

    pub fn with_subtitles(mut self, subtitles: Box<dyn SubtitleBurner>) -> Self {
        self.subtitles = subtitles;
        self
    }

    pub fn with_muxer(mut self, muxer: Box<dyn AudioMuxer>) -> Self {
        self.muxer = muxer;
        self
    }

    pub fn with_concatenator(mut self, concatenator: Box<dyn ClipConcatenator>) -> Self {
        self.concatenator = concatenator;
        self
    }

    /// Render every scene of `storyboard` and join the results into `output`
    pub fn run<P: AsRef<Path>>(&self, storyboard: &Storyboard, output: P) -> Result<PipelineReport> {
        let output = output.as_ref();

        if storyboard.is_empty() {
            return Err(PipelineError::NoScenes.into());
        }

        let base_seed = self.seed.unwrap_or_else(|| rand::thread_rng().gen());
        let mut rng = SmallRng::seed_from_u64(base_seed);

        info!("🎬 Rendering {} scenes into {:?}", storyboard.len(), output);
        info!("   Effects: {}", self.registry.names().join(", "));
        info!("   Seed: {}", base_seed);

        self.prepare_work_dir()?;

        let mut rendered = Vec::new();
        let mut skipped = Vec::new();

        for (i, scene) in storyboard.scenes.iter().enumerate() {
            let index = i + 1;

            // Drawn up front so a failing scene does not shift later choices.
            let effect = self.registry.choose(&mut rng).ok_or_else(|| PipelineError::NoClips {
                skipped: storyboard.len(),
            })?;
            let seed: u64 = rng.gen();

            info!("   Scene {}/{}: {} ({})", index, storyboard.len(), scene.text, effect);

            match self.render_scene(index, scene, effect, seed) {
                Ok(scene) => rendered.push(scene),
                Err(e) => {
                    if e.is_recoverable() {
                        warn!("Skipping scene {} (may succeed on retry): {}", index, e);
                    } else {
                        warn!("Skipping scene {}: {}", index, e);
                    }
                    skipped.push(SkippedScene {
                        index,
                        text: scene.text.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        if rendered.is_empty() {
            return Err(PipelineError::NoClips {
                skipped: skipped.len(),
            }
            .into());
        }

        // The first scene sets the resolution of the whole video
        let frame_size = rendered[0].frame_size;
        let clips: Vec<PathBuf> = rendered.iter().map(|scene| scene.clip.clone()).collect();
        self.concatenator.concat(&clips, frame_size, output)?;

        if !self.settings.keep_work_dir {
            self.clean_work_dir();
        }

        let report = PipelineReport {
            output: output.to_path_buf(),
            rendered,
            skipped,
        };
        info!(
            "🎉 Wrote {:?}: {} scenes, {:.1}s ({} skipped)",
            report.output,
            report.rendered.len(),
            report.duration(),
            report.skipped.len()
        );
        Ok(report)
    }

    fn render_scene(&self, index: usize, scene: &Scene, effect: EffectKind, seed: u64) -> Result<RenderedScene> {
        for (asset, path) in [("image", &scene.image), ("audio", &scene.audio)] {
            if !path.is_file() {
                return Err(PipelineError::MissingAsset {
                    index,
                    asset: asset.to_string(),
                    path: path.display().to_string(),
                }
                .into());
            }
        }

        let duration = self.probe.duration(&scene.audio)?;
        debug!("Scene {} narration: {:.2}s", index, duration);

        let still = if self.settings.subtitles.enabled && !scene.text.trim().is_empty() {
            let target = self.work_path("stills", index, "png");
            self.subtitles.burn(&scene.image, &scene.text, &target)?
        } else {
            scene.image.clone()
        };

        let silent = self.work_path("silent", index, "mp4");
        let silent = self
            .renderer
            .render_clip(effect, &still, duration, self.fps, &silent, seed)?;

        let clip = self.work_path("clips", index, "mp4");
        let clip = self.muxer.mux(&silent.path, &scene.audio, &clip)?;

        Ok(RenderedScene {
            index,
            effect,
            seed,
            duration,
            frame_size: (silent.width, silent.height),
            clip,
        })
    }

    fn work_path(&self, subdir: &str, index: usize, extension: &str) -> PathBuf {
        self.settings
            .work_dir
            .join(subdir)
            .join(format!("{:03}.{}", index, extension))
    }

    /// Empty the intermediate directories left by an earlier run
    fn prepare_work_dir(&self) -> Result<()> {
        for subdir in WORK_SUBDIRS {
            let dir = self.settings.work_dir.join(subdir);
            if dir.exists() {
                std::fs::remove_dir_all(&dir)?;
            }
            std::fs::create_dir_all(&dir)?;
        }
        Ok(())
    }

    fn clean_work_dir(&self) {
        for subdir in WORK_SUBDIRS {
            let dir = self.settings.work_dir.join(subdir);
            if let Err(e) = std::fs::remove_dir_all(&dir) {
                warn!("Failed to remove {:?}: {}", dir, e);
            }
        }
        // Only succeeds when nothing else lives there.
        let _ = std::fs::remove_dir(&self.settings.work_dir);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AudioError, ReelError};
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;
    use tempfile::{tempdir, TempDir};

    /// Writes the effect name as the clip; the still's text length is its width
    struct FakeRenderer;

    impl ClipRenderer for FakeRenderer {
        fn render_clip(&self, kind: EffectKind, image: &Path, _duration: f64, _fps: u32, output: &Path, _seed: u64) -> Result<SilentClip> {
            let still = std::fs::read_to_string(image)?;
            std::fs::write(output, format!("{}|{}", kind, still))?;
            Ok(SilentClip {
                path: output.to_path_buf(),
                width: still.len() as u32,
                height: 2,
            })
        }
    }

    /// Audio files hold their duration as text
    struct FakeProbe;

    impl DurationProbe for FakeProbe {
        fn duration(&self, audio: &Path) -> Result<f64> {
            std::fs::read_to_string(audio)?
                .trim()
                .parse()
                .map_err(|_| AudioError::UnknownDuration { path: audio.display().to_string() }.into())
        }
    }

    #[derive(Default)]
    struct FakeTools {
        burned: RefCell<Vec<String>>,
    }

    impl SubtitleBurner for FakeTools {
        fn burn(&self, image: &Path, text: &str, output: &Path) -> Result<PathBuf> {
            self.burned.borrow_mut().push(text.to_string());
            let still = std::fs::read_to_string(image)?;
            std::fs::write(output, format!("{}+{}", still, text))?;
            Ok(output.to_path_buf())
        }
    }

    struct FakeMuxer;

    impl AudioMuxer for FakeMuxer {
        fn mux(&self, video: &Path, _audio: &Path, output: &Path) -> Result<PathBuf> {
            std::fs::copy(video, output)?;
            Ok(output.to_path_buf())
        }
    }

    #[derive(Default)]
    struct FakeConcat {
        frame_size: Rc<Cell<Option<(u32, u32)>>>,
    }

    impl ClipConcatenator for FakeConcat {
        fn concat(&self, clips: &[PathBuf], frame_size: (u32, u32), output: &Path) -> Result<PathBuf> {
            self.frame_size.set(Some(frame_size));
            let joined = clips
                .iter()
                .map(std::fs::read_to_string)
                .collect::<std::io::Result<Vec<_>>>()?
                .join("\n");
            std::fs::write(output, joined)?;
            Ok(output.to_path_buf())
        }
    }

    fn config(dir: &TempDir, seed: u64) -> Config {
        let mut config = Config::default();
        config.render.seed = Some(seed);
        config.render.threads = 1;
        config.pipeline.work_dir = dir.path().join("work");
        config
    }

    fn pipeline(config: &Config) -> ScenePipeline {
        ScenePipeline::new(config)
            .unwrap()
            .with_renderer(Box::new(FakeRenderer))
            .with_probe(Box::new(FakeProbe))
            .with_subtitles(Box::new(FakeTools::default()))
            .with_muxer(Box::new(FakeMuxer))
            .with_concatenator(Box::new(FakeConcat::default()))
    }

    fn storyboard(dir: &TempDir, scenes: &[(&str, Option<&str>)]) -> Storyboard {
        let scenes = scenes
            .iter()
            .enumerate()
            .map(|(i, (text, duration))| {
                let image = dir.path().join(format!("{}.png", i + 1));
                let audio = dir.path().join(format!("{}.wav", i + 1));
                std::fs::write(&image, format!("img{}", i + 1)).unwrap();
                if let Some(duration) = duration {
                    std::fs::write(&audio, duration).unwrap();
                }
                Scene {
                    text: text.to_string(),
                    image,
                    audio,
                }
            })
            .collect();
        Storyboard { scenes }
    }

    #[test]
    fn test_failed_scene_is_skipped() {
        let dir = tempdir().unwrap();
        let board = storyboard(&dir, &[("one", Some("1.5")), ("two", None), ("three", Some("2.0"))]);
        let output = dir.path().join("out.mp4");

        let report = pipeline(&config(&dir, 7)).run(&board, &output).unwrap();

        assert_eq!(report.rendered.iter().map(|s| s.index).collect::<Vec<_>>(), vec![1, 3]);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].index, 2);
        assert!(report.skipped[0].reason.contains("audio"));
        assert_eq!(report.duration(), 3.5);

        let joined = std::fs::read_to_string(&output).unwrap();
        let lines: Vec<&str> = joined.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("|img1+one"));
        assert!(lines[1].ends_with("|img3+three"));
    }

    #[test]
    fn test_no_clips_is_an_error() {
        let dir = tempdir().unwrap();
        let board = storyboard(&dir, &[("one", Some("not a number")), ("two", None)]);

        let result = pipeline(&config(&dir, 1)).run(&board, dir.path().join("out.mp4"));
        assert!(matches!(
            result,
            Err(ReelError::Pipeline(PipelineError::NoClips { skipped: 2 }))
        ));
    }

    #[test]
    fn test_seed_fixes_effect_choice() {
        let dir = tempdir().unwrap();
        let board = storyboard(&dir, &[("a", Some("1")), ("b", Some("1")), ("c", Some("1")), ("d", Some("1"))]);

        let run = |seed| {
            pipeline(&config(&dir, seed))
                .run(&board, dir.path().join("out.mp4"))
                .unwrap()
                .rendered
                .iter()
                .map(|s| (s.effect, s.seed))
                .collect::<Vec<_>>()
        };

        assert_eq!(run(42), run(42));
    }

    #[test]
    fn test_choice_limited_to_enabled_effects() {
        let dir = tempdir().unwrap();
        let board = storyboard(&dir, &[("a", Some("1")), ("b", Some("1")), ("c", Some("1"))]);
        let mut config = config(&dir, 3);
        config.effects.enabled = vec!["ripple".to_string()];

        let report = pipeline(&config).run(&board, dir.path().join("out.mp4")).unwrap();
        assert!(report.rendered.iter().all(|s| s.effect == EffectKind::Ripple));
    }

    #[test]
    fn test_subtitles_can_be_disabled() {
        let dir = tempdir().unwrap();
        let board = storyboard(&dir, &[("hello", Some("1"))]);
        let mut config = config(&dir, 0);
        config.pipeline.subtitles.enabled = false;
        let output = dir.path().join("out.mp4");

        pipeline(&config).run(&board, &output).unwrap();
        assert!(std::fs::read_to_string(&output).unwrap().ends_with("|img1"));
    }

    #[test]
    fn test_work_dir_cleanup() {
        let dir = tempdir().unwrap();
        let board = storyboard(&dir, &[("a", Some("1"))]);

        let config_clean = config(&dir, 0);
        pipeline(&config_clean).run(&board, dir.path().join("out.mp4")).unwrap();
        assert!(!dir.path().join("work").exists());

        let mut config_keep = config(&dir, 0);
        config_keep.pipeline.keep_work_dir = true;
        pipeline(&config_keep).run(&board, dir.path().join("out.mp4")).unwrap();
        assert!(dir.path().join("work/clips/001.mp4").exists());
    }

    #[test]
    fn test_empty_storyboard_rejected() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("out.mp4");
        let err = pipeline(&config(&dir, 0))
            .run(&Storyboard::default(), &output)
            .unwrap_err();

        assert!(matches!(err, ReelError::Pipeline(PipelineError::NoScenes)));
        assert!(!err.to_string().contains("out.mp4"));
    }

    #[test]
    fn test_first_rendered_scene_sets_video_size() {
        let dir = tempdir().unwrap();
        let board = storyboard(&dir, &[("x", None), ("two", Some("1")), ("three!", Some("1"))]);
        let concat = FakeConcat::default();
        let frame_size = Rc::clone(&concat.frame_size);

        let report = pipeline(&config(&dir, 5))
            .with_concatenator(Box::new(concat))
            .run(&board, dir.path().join("out.mp4"))
            .unwrap();

        // Scene 1 is skipped; scene 2's still is "img2+two"
        assert_eq!(report.rendered[0].frame_size, (8, 2));
        assert_eq!(report.rendered[1].frame_size, (11, 2));
        assert_eq!(frame_size.get(), Some((8, 2)));
    }
}
