use std::fs::File;
use std::path::Path;

use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::debug;

use crate::error::{AudioError, Result};

/// Basic facts about a narration track
#[derive(Debug, Clone, PartialEq)]
pub struct AudioInfo {
    /// Length in seconds
    pub duration: f64,
    pub sample_rate: u32,
    pub channels: u16,
}

/// Measures audio files without keeping their samples
pub struct AudioProbe;

impl AudioProbe {
    /// Duration of an audio file in seconds
    pub fn duration<P: AsRef<Path>>(path: P) -> Result<f64> {
        Ok(Self::probe(path)?.duration)
    }

    /// Read duration, sample rate and channel count
    pub fn probe<P: AsRef<Path>>(path: P) -> Result<AudioInfo> {
        let path = path.as_ref();
        let extension = Self::detect_format(path).unwrap_or_default();

        if !Self::is_format_supported(&extension) {
            return Err(AudioError::UnsupportedFormat {
                format: extension
            }.into());
        }

        let info = if extension == "wav" {
            Self::probe_wav(path)?
        } else {
            Self::probe_with_symphonia(path)?
        };

        debug!(
            "Audio {:?}: {:.2}s, {} Hz, {} channels",
            path, info.duration, info.sample_rate, info.channels
        );
        Ok(info)
    }

    /// WAV header gives the exact frame count
    fn probe_wav(path: &Path) -> Result<AudioInfo> {
        let reader = hound::WavReader::open(path)
            .map_err(|_| AudioError::LoadFailed {
                path: path.display().to_string()
            })?;

        let spec = reader.spec();
        if spec.sample_rate == 0 {
            return Err(AudioError::UnknownDuration {
                path: path.display().to_string()
            }.into());
        }

        Ok(AudioInfo {
            duration: reader.duration() as f64 / spec.sample_rate as f64,
            sample_rate: spec.sample_rate,
            channels: spec.channels,
        })
    }

    /// Use the container's frame count when present, otherwise decode and count
    fn probe_with_symphonia(path: &Path) -> Result<AudioInfo> {
        let file = File::open(path)
            .map_err(|_| AudioError::LoadFailed {
                path: path.display().to_string()
            })?;

        let mss = MediaSourceStream::new(Box::new(file), Default::default());

        let mut hint = Hint::new();
        if let Some(extension) = path.extension().and_then(|ext| ext.to_str()) {
            hint.with_extension(extension);
        }

        let meta_opts: MetadataOptions = Default::default();
        let fmt_opts: FormatOptions = Default::default();

        let probed = symphonia::default::get_probe()
            .format(&hint, mss, &fmt_opts, &meta_opts)
            .map_err(|_| AudioError::LoadFailed {
                path: path.display().to_string()
            })?;

        let mut format = probed.format;

        let track = format
            .tracks()
            .iter()
            .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
            .ok_or_else(|| AudioError::LoadFailed {
                path: path.display().to_string()
            })?;

        let track_id = track.id;
        let codec_params = track.codec_params.clone();

        let sample_rate = codec_params.sample_rate
            .ok_or_else(|| AudioError::UnknownDuration {
                path: path.display().to_string()
            })?;
        let channels = codec_params.channels.map(|c| c.count() as u16).unwrap_or(1);

        if let (Some(n_frames), Some(time_base)) = (codec_params.n_frames, codec_params.time_base) {
            let time = time_base.calc_time(n_frames);
            return Ok(AudioInfo {
                duration: time.seconds as f64 + time.frac,
                sample_rate,
                channels,
            });
        }

        debug!("{:?} has no frame count, decoding to measure", path);

        let dec_opts: DecoderOptions = Default::default();
        let mut decoder = symphonia::default::get_codecs()
            .make(&codec_params, &dec_opts)
            .map_err(|_| AudioError::LoadFailed {
                path: path.display().to_string()
            })?;

        let mut frames: u64 = 0;
        loop {
            let packet = match format.next_packet() {
                Ok(packet) => packet,
                Err(SymphoniaError::ResetRequired) => {
                    decoder.reset();
                    continue;
                }
                Err(_) => break,
            };

            if packet.track_id() != track_id {
                continue;
            }

            match decoder.decode(&packet) {
                Ok(decoded) => frames += decoded.frames() as u64,
                Err(SymphoniaError::DecodeError(_)) => continue,
                Err(_) => break,
            }
        }

        if frames == 0 {
            return Err(AudioError::UnknownDuration {
                path: path.display().to_string()
            }.into());
        }

        Ok(AudioInfo {
            duration: frames as f64 / sample_rate as f64,
            sample_rate,
            channels,
        })
    }

    /// Detect audio format from file extension
    pub fn detect_format<P: AsRef<Path>>(path: P) -> Option<String> {
        path.as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_lowercase())
    }

    /// Check if a file format is supported
    pub fn is_format_supported(extension: &str) -> bool {
        matches!(
            extension.to_lowercase().as_str(),
            "wav" | "mp3" | "flac" | "ogg" | "m4a" | "aac"
        )
    }
}
