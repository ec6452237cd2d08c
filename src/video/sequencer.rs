use std::time::{Duration, Instant};

use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::effects::{frame_rng, Effect};
use crate::error::{Result, VideoError};
use crate::video::encoder::FrameSink;
use crate::video::types::{ClipPlan, Frame};

/// Summary of one rendered clip
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderStats {
    pub frames: u32,
    pub elapsed: Duration,
}

impl RenderStats {
    pub fn frames_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.frames as f64 / secs
        } else {
            0.0
        }
    }
}

/// Drives the frame loop of an effect into a [`FrameSink`].
///
/// Frames are computed in parallel batches on a private thread pool and
/// handed to the sink strictly in index order. Each frame draws from its own
/// generator, so the output is identical for any thread count.
pub struct FrameSequencer {
    pool: rayon::ThreadPool,
    batch_size: usize,
}

impl FrameSequencer {
    pub fn new(threads: usize, batch_size: usize) -> Result<Self> {
        if threads == 0 {
            return Err(VideoError::InvalidParameters {
                details: "render threads must be >= 1".to_string(),
            }
            .into());
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()
            .map_err(|e| VideoError::InvalidParameters {
                details: format!("failed to build render thread pool: {}", e),
            })?;

        Ok(Self {
            pool,
            batch_size: batch_size.max(1),
        })
    }

    pub fn threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Render every frame of `plan` and finalize the sink.
    ///
    /// On any error the sink is aborted before the error is returned, so no
    /// partial output survives.
    pub fn render(
        &self,
        effect: &dyn Effect,
        source: &Frame,
        plan: &ClipPlan,
        seed: u64,
        sink: &mut dyn FrameSink,
    ) -> Result<RenderStats> {
        let started = Instant::now();

        match self.render_frames(effect, source, plan, seed, sink) {
            Ok(()) => {
                if let Err(e) = sink.finish() {
                    sink.abort();
                    return Err(e);
                }
            }
            Err(e) => {
                warn!("{} failed, discarding output: {}", effect.name(), e);
                sink.abort();
                return Err(e);
            }
        }

        let stats = RenderStats {
            frames: plan.total_frames,
            elapsed: started.elapsed(),
        };
        info!(
            "Rendered {} frames of {} in {:.2}s ({:.1} fps)",
            stats.frames,
            effect.name(),
            stats.elapsed.as_secs_f64(),
            stats.frames_per_second()
        );
        Ok(stats)
    }

    fn render_frames(
        &self,
        effect: &dyn Effect,
        source: &Frame,
        plan: &ClipPlan,
        seed: u64,
        sink: &mut dyn FrameSink,
    ) -> Result<()> {
        if source.dimensions() != (plan.width, plan.height) {
            return Err(VideoError::FrameMismatch {
                got_width: source.width(),
                got_height: source.height(),
                expected_width: plan.width,
                expected_height: plan.height,
            }
            .into());
        }

        let batch = self.batch_size as u32;
        let mut start = 0;
        while start < plan.total_frames {
            let end = start.saturating_add(batch).min(plan.total_frames);
            debug!("Rendering frames {}..{} of {}", start, end, plan.total_frames);

            let frames = self.pool.install(|| {
                (start..end)
                    .into_par_iter()
                    .map(|index| {
                        let mut rng = frame_rng(seed, index);
                        effect.render_frame(source, plan.timing(index), &mut rng)
                    })
                    .collect::<Result<Vec<_>>>()
            })?;

            for frame in &frames {
                sink.write_frame(frame)?;
            }
            start = end;
        }
        Ok(())
    }
}
