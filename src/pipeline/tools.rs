//! External collaborators of the scene pipeline.
//!
//! The pipeline only sees these traits; the defaults shell out to `ffmpeg`
//! and read audio headers, and tests substitute in-process fakes.

use std::ffi::OsString;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tracing::debug;

use crate::audio::AudioProbe;
use crate::config::SubtitleConfig;
use crate::error::{PipelineError, Result};
use crate::pipeline::script::wrap_subtitle;
use crate::video::EncoderParams;

/// Measures narration length
pub trait DurationProbe {
    fn duration(&self, audio: &Path) -> Result<f64>;
}

/// Draws subtitle text onto a still image
pub trait SubtitleBurner {
    fn burn(&self, image: &Path, text: &str, output: &Path) -> Result<PathBuf>;
}

/// Adds a narration track to a silent clip
pub trait AudioMuxer {
    fn mux(&self, video: &Path, audio: &Path, output: &Path) -> Result<PathBuf>;
}

/// Joins scene clips, in the given order, into one video
pub trait ClipConcatenator {
    /// `frame_size` is the resolution of the joined video
    fn concat(&self, clips: &[PathBuf], frame_size: (u32, u32), output: &Path) -> Result<PathBuf>;
}

/// [`DurationProbe`] backed by [`AudioProbe`]
#[derive(Debug, Clone, Copy, Default)]
pub struct AudioDurationProbe;

impl DurationProbe for AudioDurationProbe {
    fn duration(&self, audio: &Path) -> Result<f64> {
        AudioProbe::duration(audio)
    }
}

/// Subtitle, mux and concat steps implemented with the `ffmpeg` binary
#[derive(Debug, Clone)]
pub struct FfmpegTools {
    ffmpeg: String,
    encoder: EncoderParams,
    subtitles: SubtitleConfig,
}

impl FfmpegTools {
    pub fn new(encoder: EncoderParams, subtitles: SubtitleConfig) -> Self {
        Self {
            ffmpeg: encoder.ffmpeg.clone(),
            encoder,
            subtitles,
        }
    }

    /// The `drawtext` filter centring the text read from `textfile`.
    ///
    /// Text is drawn literally: `%` and `\` in narration are not expanded.
    pub fn drawtext_filter(&self, textfile: &str) -> String {
        let mut filter = format!(
            "drawtext=textfile={}:expansion=none:fontsize={}:fontcolor={}:borderw=1:bordercolor={}:line_spacing=8:x=(w-text_w)/2:y=(h-text_h)/2",
            escape_filter_value(textfile),
            self.subtitles.font_size,
            escape_filter_value(&self.subtitles.color),
            escape_filter_value(&self.subtitles.color),
        );
        if let Some(font) = &self.subtitles.font_file {
            filter.push_str(&format!(":fontfile={}", escape_filter_value(&font.display().to_string())));
        }
        filter
    }

    /// Arguments joining the clips listed in `list` into `output`.
    ///
    /// Clips are re-encoded at one even-sized resolution: each is scaled to
    /// fit `frame_size` and padded with black, so scenes with different still
    /// sizes or pixel formats end up in one uniform stream.
    pub fn concat_args(&self, list: &Path, frame_size: (u32, u32), output: &Path) -> Vec<OsString> {
        let (width, height) = (even(frame_size.0), even(frame_size.1));
        let filter = format!(
            "scale={w}:{h}:force_original_aspect_ratio=decrease:force_divisible_by=2,pad={w}:{h}:(ow-iw)/2:(oh-ih)/2,setsar=1",
            w = width,
            h = height
        );

        let mut args: Vec<OsString> = ["-y", "-loglevel", "error", "-f", "concat", "-safe", "0", "-i"]
            .into_iter()
            .map(OsString::from)
            .collect();
        args.push(list.as_os_str().to_os_string());
        args.extend(
            [
                "-vf",
                filter.as_str(),
                "-c:v",
                self.encoder.codec.as_str(),
                "-pix_fmt",
                self.encoder.pixel_format.as_str(),
            ]
            .into_iter()
            .map(OsString::from),
        );
        if self.encoder.codec.starts_with("libx26") {
            args.push("-crf".into());
            args.push(self.encoder.crf().to_string().into());
        }
        args.extend(["-c:a", "aac", "-movflags", "+faststart"].into_iter().map(OsString::from));
        args.push(output.as_os_str().to_os_string());
        args
    }

    fn run(&self, cmd: &mut Command, step: &str) -> Result<()> {
        debug!("Running {:?}", cmd);

        let output = cmd
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| PipelineError::ToolFailed {
                tool: self.ffmpeg.clone(),
                reason: format!("{}: failed to start: {}", step, e),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(PipelineError::ToolFailed {
                tool: self.ffmpeg.clone(),
                reason: format!("{}: {}", step, stderr.trim()),
            }
            .into());
        }
        Ok(())
    }
}

impl SubtitleBurner for FfmpegTools {
    fn burn(&self, image: &Path, text: &str, output: &Path) -> Result<PathBuf> {
        ensure_parent_dir(output)?;

        // The text goes through a file next to the output so quoting and
        // non-ASCII narration never pass through the filter parser.
        let textfile = output.with_extension("txt");
        std::fs::write(&textfile, wrap_subtitle(text, self.subtitles.max_chars_per_line))?;

        let dir = absolute(textfile.parent().unwrap_or_else(|| Path::new(".")))?;
        let textfile_name = textfile
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("subtitle.txt")
            .to_string();

        let mut cmd = Command::new(&self.ffmpeg);
        cmd.current_dir(&dir)
            .args(["-y", "-loglevel", "error", "-i"])
            .arg(absolute(image)?)
            .args(["-vf", &self.drawtext_filter(&textfile_name), "-frames:v", "1"])
            .arg(absolute(output)?);

        self.run(&mut cmd, "subtitle")?;
        Ok(output.to_path_buf())
    }
}

impl AudioMuxer for FfmpegTools {
    fn mux(&self, video: &Path, audio: &Path, output: &Path) -> Result<PathBuf> {
        ensure_parent_dir(output)?;

        let mut cmd = Command::new(&self.ffmpeg);
        cmd.args(["-y", "-loglevel", "error", "-i"])
            .arg(video)
            .arg("-i")
            .arg(audio)
            .args(["-c:v", "copy", "-c:a", "aac", "-shortest"])
            .arg(output);

        self.run(&mut cmd, "mux")?;
        Ok(output.to_path_buf())
    }
}

impl ClipConcatenator for FfmpegTools {
    fn concat(&self, clips: &[PathBuf], frame_size: (u32, u32), output: &Path) -> Result<PathBuf> {
        ensure_parent_dir(output)?;

        let list = output.with_extension("concat.txt");
        write_concat_list(clips, &list)?;

        let mut cmd = Command::new(&self.ffmpeg);
        cmd.args(self.concat_args(&list, frame_size, output));

        let result = self.run(&mut cmd, "concat");
        let _ = std::fs::remove_file(&list);
        result?;
        Ok(output.to_path_buf())
    }
}

/// Write an ffmpeg concat demuxer list with absolute paths
pub fn write_concat_list(clips: &[PathBuf], list_path: &Path) -> Result<()> {
    let mut file = File::create(list_path)?;
    for clip in clips {
        let path = absolute(clip)?;
        let quoted = path.display().to_string().replace('\'', r"'\''");
        writeln!(file, "file '{}'", quoted)?;
    }
    Ok(())
}

/// Escape a value for an ffmpeg filter option
fn escape_filter_value(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '\\' | ':' | '\'' | ',' | ';' | '[' | ']') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Round down to an even size, never below 2
fn even(size: u32) -> u32 {
    (size - size % 2).max(2)
}

fn absolute(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ReelError;
    use tempfile::tempdir;

    fn tools(ffmpeg: &str) -> FfmpegTools {
        let encoder = EncoderParams {
            ffmpeg: ffmpeg.to_string(),
            ..EncoderParams::default()
        };
        FfmpegTools::new(encoder, SubtitleConfig::default())
    }

    fn value_after<'a>(args: &'a [OsString], flag: &str) -> Option<&'a str> {
        args.iter()
            .position(|arg| arg == flag)
            .and_then(|i| args.get(i + 1))
            .and_then(|value| value.to_str())
    }

    #[test]
    fn test_drawtext_filter_centres_text() {
        let filter = tools("ffmpeg").drawtext_filter("001.txt");
        assert!(filter.starts_with("drawtext=textfile=001.txt:expansion=none:fontsize=60:fontcolor=white"));
        assert!(filter.contains("x=(w-text_w)/2:y=(h-text_h)/2"));
        assert!(!filter.contains("fontfile"));
    }

    #[test]
    fn test_drawtext_filter_escapes_font_path() {
        let mut subtitles = SubtitleConfig::default();
        subtitles.font_file = Some(PathBuf::from("C:/Fonts/simhei.ttf"));
        let filter = FfmpegTools::new(EncoderParams::default(), subtitles).drawtext_filter("a.txt");
        assert!(filter.ends_with(r":fontfile=C\:/Fonts/simhei.ttf"));
    }

    #[test]
    fn test_burn_keeps_percent_signs_literal() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("stills/002.png");
        let _ = tools("storyreel-no-such-ffmpeg").burn(&dir.path().join("still.png"), "涨了50%", &output);

        assert_eq!(std::fs::read_to_string(output.with_extension("txt")).unwrap(), "涨了50%");
        assert!(tools("ffmpeg").drawtext_filter("002.txt").contains(":expansion=none:"));
    }

    #[test]
    fn test_concat_reencodes_to_one_even_size() {
        let tools = tools("ffmpeg");
        let args = tools.concat_args(Path::new("list.txt"), (321, 181), Path::new("out.mp4"));

        assert!(!args.iter().any(|arg| arg == "copy"));
        assert_eq!(value_after(&args, "-i"), Some("list.txt"));
        assert_eq!(value_after(&args, "-c:v"), Some("libx264"));
        assert_eq!(value_after(&args, "-pix_fmt"), Some("yuv420p"));
        assert_eq!(value_after(&args, "-c:a"), Some("aac"));
        assert!(value_after(&args, "-crf").is_some());

        let filter = value_after(&args, "-vf").unwrap();
        assert!(filter.starts_with("scale=320:180:force_original_aspect_ratio=decrease"));
        assert!(filter.contains("pad=320:180:(ow-iw)/2:(oh-ih)/2"));
        assert_eq!(args.last().unwrap(), "out.mp4");
    }

    #[test]
    fn test_concat_tiny_frames_stay_encodable() {
        let args = tools("ffmpeg").concat_args(Path::new("l.txt"), (1, 5), Path::new("o.mp4"));
        assert!(value_after(&args, "-vf").unwrap().starts_with("scale=2:4:"));
    }

    #[test]
    fn test_concat_list_is_ordered_and_quoted() {
        let dir = tempdir().unwrap();
        let clips = vec![dir.path().join("001.mp4"), dir.path().join("it's.mp4")];
        let list = dir.path().join("list.txt");

        write_concat_list(&clips, &list).unwrap();

        let content = std::fs::read_to_string(&list).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("001.mp4'"));
        assert!(lines[1].ends_with(r"it'\''s.mp4'"));
    }

    #[test]
    fn test_missing_binary_is_tool_failure() {
        let dir = tempdir().unwrap();
        let result = tools("storyreel-no-such-ffmpeg").mux(
            &dir.path().join("a.mp4"),
            &dir.path().join("a.wav"),
            &dir.path().join("out.mp4"),
        );
        assert!(matches!(result, Err(ReelError::Pipeline(PipelineError::ToolFailed { .. }))));
    }

    #[test]
    fn test_burn_writes_wrapped_text_file() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("subtitled/001.png");
        let result = tools("storyreel-no-such-ffmpeg").burn(
            &dir.path().join("still.png"),
            "一二三四五六七八九十十一",
            &output,
        );

        assert!(result.is_err());
        let text = std::fs::read_to_string(output.with_extension("txt")).unwrap();
        assert_eq!(text, "一二三四五六七八九十\n十一");
    }

    #[test]
    fn test_audio_probe_reads_wav() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("n.wav");
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 16000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(&path, spec).unwrap();
        for _ in 0..8000 {
            writer.write_sample(0i16).unwrap();
        }
        writer.finalize().unwrap();

        assert_eq!(AudioDurationProbe.duration(&path).unwrap(), 0.5);
    }
}
