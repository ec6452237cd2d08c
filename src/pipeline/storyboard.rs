use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{PipelineError, Result};
use crate::pipeline::script::split_narration;

const IMAGE_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];
const AUDIO_EXTENSIONS: [&str; 6] = ["wav", "mp3", "flac", "ogg", "m4a", "aac"];

/// One narrated still
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    /// Narration line, also used as the subtitle
    pub text: String,
    pub image: PathBuf,
    pub audio: PathBuf,
}

/// Ordered list of scenes making up one video
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Storyboard {
    pub scenes: Vec<Scene>,
}

impl Storyboard {
    /// Load a TOML manifest of `[[scenes]]` tables.
    ///
    /// Relative asset paths are resolved against the manifest's directory.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;

        let mut storyboard: Storyboard = toml::from_str(&content).map_err(|e| PipelineError::InvalidStoryboard {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        if storyboard.scenes.is_empty() {
            return Err(PipelineError::EmptyStoryboard {
                path: path.display().to_string(),
            }
            .into());
        }

        let base = path.parent().unwrap_or_else(|| Path::new(""));
        for scene in &mut storyboard.scenes {
            scene.image = resolve(base, &scene.image);
            scene.audio = resolve(base, &scene.audio);
        }

        debug!("Loaded storyboard {:?} with {} scenes", path, storyboard.len());
        Ok(storyboard)
    }

    /// Build scenes from a narration script and numbered asset directories.
    ///
    /// Scene `i` (1-based) uses `images_dir/i.png` and `audio_dir/i.wav`, or
    /// the first other supported extension that exists.
    pub fn from_script<P: AsRef<Path>, Q: AsRef<Path>>(
        script: &str,
        delimiters: &str,
        images_dir: P,
        audio_dir: Q,
    ) -> Result<Self> {
        let segments = split_narration(script, delimiters);
        if segments.is_empty() {
            return Err(PipelineError::EmptyStoryboard {
                path: "<script>".to_string(),
            }
            .into());
        }

        let scenes = segments
            .into_iter()
            .enumerate()
            .map(|(i, text)| -> Result<Scene> {
                let number = i + 1;
                Ok(Scene {
                    text,
                    image: find_numbered(images_dir.as_ref(), number, &IMAGE_EXTENSIONS, "image")?,
                    audio: find_numbered(audio_dir.as_ref(), number, &AUDIO_EXTENSIONS, "audio")?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { scenes })
    }

    /// Write the storyboard as a TOML manifest
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self).map_err(|e| PipelineError::InvalidStoryboard {
            path: path.as_ref().display().to_string(),
            reason: e.to_string(),
        })?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.scenes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenes.is_empty()
    }
}

fn resolve(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

fn find_numbered(dir: &Path, number: usize, extensions: &[&str], asset: &str) -> Result<PathBuf> {
    extensions
        .iter()
        .map(|ext| dir.join(format!("{}.{}", number, ext)))
        .find(|candidate| candidate.is_file())
        .ok_or_else(|| {
            PipelineError::MissingAsset {
                index: number,
                asset: asset.to_string(),
                path: dir.join(format!("{}.{}", number, extensions[0])).display().to_string(),
            }
            .into()
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ReelError;
    use tempfile::tempdir;

    #[test]
    fn test_manifest_paths_are_relative_to_file() {
        let dir = tempdir().unwrap();
        let manifest = dir.path().join("story.toml");
        std::fs::write(
            &manifest,
            r#"
[[scenes]]
text = "A fox wakes up"
image = "images/fox.png"
audio = "/abs/fox.wav"

[[scenes]]
text = "It runs"
image = "run.jpg"
audio = "run.mp3"
"#,
        )
        .unwrap();

        let storyboard = Storyboard::from_file(&manifest).unwrap();
        assert_eq!(storyboard.len(), 2);
        assert_eq!(storyboard.scenes[0].image, dir.path().join("images/fox.png"));
        assert_eq!(storyboard.scenes[0].audio, PathBuf::from("/abs/fox.wav"));
        assert_eq!(storyboard.scenes[1].text, "It runs");
    }

    #[test]
    fn test_empty_manifest_rejected() {
        let dir = tempdir().unwrap();
        let manifest = dir.path().join("empty.toml");
        std::fs::write(&manifest, "scenes = []\n").unwrap();

        assert!(matches!(
            Storyboard::from_file(&manifest),
            Err(ReelError::Pipeline(PipelineError::EmptyStoryboard { .. }))
        ));
    }

    #[test]
    fn test_malformed_manifest_rejected() {
        let dir = tempdir().unwrap();
        let manifest = dir.path().join("bad.toml");
        std::fs::write(&manifest, "[[scenes]]\ntext = 3\n").unwrap();

        assert!(matches!(
            Storyboard::from_file(&manifest),
            Err(ReelError::Pipeline(PipelineError::InvalidStoryboard { .. }))
        ));
    }

    #[test]
    fn test_from_script_picks_numbered_assets() {
        let dir = tempdir().unwrap();
        let images = dir.path().join("images");
        let audio = dir.path().join("audio");
        std::fs::create_dir_all(&images).unwrap();
        std::fs::create_dir_all(&audio).unwrap();
        for file in ["images/1.png", "images/2.jpg", "audio/1.wav", "audio/2.mp3"] {
            std::fs::write(dir.path().join(file), b"x").unwrap();
        }

        let storyboard = Storyboard::from_script("第一幕。第二幕！", "，。！？：", &images, &audio).unwrap();

        assert_eq!(storyboard.len(), 2);
        assert_eq!(storyboard.scenes[0].text, "第一幕");
        assert_eq!(storyboard.scenes[1].image, images.join("2.jpg"));
        assert_eq!(storyboard.scenes[1].audio, audio.join("2.mp3"));
    }

    #[test]
    fn test_from_script_reports_missing_asset() {
        let dir = tempdir().unwrap();
        let result = Storyboard::from_script("only scene", "。", dir.path(), dir.path());

        match result {
            Err(ReelError::Pipeline(PipelineError::MissingAsset { index, asset, .. })) => {
                assert_eq!(index, 1);
                assert_eq!(asset, "image");
            }
            other => panic!("expected missing asset, got {:?}", other),
        }
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempdir().unwrap();
        let manifest = dir.path().join("saved.toml");
        let storyboard = Storyboard {
            scenes: vec![Scene {
                text: "hello".to_string(),
                image: dir.path().join("a.png"),
                audio: dir.path().join("a.wav"),
            }],
        };

        storyboard.save_to_file(&manifest).unwrap();
        assert_eq!(Storyboard::from_file(&manifest).unwrap(), storyboard);
    }
}
