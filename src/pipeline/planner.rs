//! Chunk planning: turning a duration into bounded transcription intervals.

use crate::defaults;
use crate::error::{AudioscribeError, Result};

/// One planned interval of the source audio.
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkSpec {
    /// Dense 0-based position, identical to the chunk's place in the plan
    pub index: usize,
    /// Start offset in seconds, inclusive
    pub start: f64,
    /// End offset in seconds, exclusive
    pub end: f64,
}

impl ChunkSpec {
    pub fn length(&self) -> f64 {
        self.end - self.start
    }
}

/// An ordered list of chunks covering `[0, duration]` with no gaps.
///
/// Consecutive chunks overlap by the configured amount so words cut at a
/// boundary appear in at least one chunk whole.
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkPlan {
    chunks: Vec<ChunkSpec>,
}

impl ChunkPlan {
    /// Plan chunks for a stream of `duration` seconds.
    ///
    /// Walks forward from zero emitting `[t, min(t + chunk_size, duration))`
    /// and stepping back by `overlap` each time, stopping once a chunk's end
    /// reaches the duration. `duration <= chunk_size` yields a single chunk.
    pub fn build(duration: f64, chunk_size: f64, overlap: f64) -> Result<Self> {
        if duration <= 0.0 {
            return Err(AudioscribeError::InvalidChunking {
                message: "duration must be positive".to_string(),
            });
        }
        if chunk_size <= 0.0 {
            return Err(AudioscribeError::InvalidChunking {
                message: "chunk size must be positive".to_string(),
            });
        }
        if overlap < 0.0 || overlap >= chunk_size {
            return Err(AudioscribeError::InvalidChunking {
                message: "overlap must be at least 0 and smaller than chunk size".to_string(),
            });
        }

        let mut chunks = Vec::new();
        let mut start = 0.0_f64;
        loop {
            let end = (start + chunk_size).min(duration);
            chunks.push(ChunkSpec {
                index: chunks.len(),
                start,
                end,
            });
            if end >= duration {
                break;
            }
            start = end - overlap;
        }

        Ok(Self { chunks })
    }

    pub fn chunks(&self) -> &[ChunkSpec] {
        &self.chunks
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }
}

/// Validate caller-supplied chunking parameters.
///
/// Violations signal a configuration error and are rejected before any work
/// is dispatched.
pub fn validate_chunking(chunk_size_secs: u32, overlap_secs: u32) -> Result<()> {
    if !(defaults::MIN_CHUNK_SIZE_SECS..=defaults::MAX_CHUNK_SIZE_SECS).contains(&chunk_size_secs) {
        return Err(AudioscribeError::InvalidChunking {
            message: format!(
                "chunk size must be between {} and {} seconds, got {}",
                defaults::MIN_CHUNK_SIZE_SECS,
                defaults::MAX_CHUNK_SIZE_SECS,
                chunk_size_secs
            ),
        });
    }
    if overlap_secs >= chunk_size_secs {
        return Err(AudioscribeError::InvalidChunking {
            message: format!(
                "overlap ({overlap_secs}s) must be smaller than chunk size ({chunk_size_secs}s)"
            ),
        });
    }
    Ok(())
}

/// A single transcription interval for windowed (interactive) mode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeWindow {
    pub start: f64,
    pub end: f64,
}

/// Interval around a playback position, clamped to the stream.
///
/// Files no longer than twice the half-window are taken whole; anything the
/// listener could be hearing is inside the window anyway.
pub fn playback_window(duration: f64, position: f64, half_window: f64) -> TimeWindow {
    if duration <= 2.0 * half_window {
        TimeWindow {
            start: 0.0,
            end: duration,
        }
    } else {
        TimeWindow {
            start: (position - half_window).max(0.0),
            end: (position + half_window).min(duration),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    fn assert_covers(plan: &ChunkPlan, duration: f64, chunk_size: f64, overlap: f64) {
        let chunks = plan.chunks();
        assert!(!chunks.is_empty());
        assert!(chunks[0].start.abs() < EPSILON, "plan must start at 0");
        assert!(
            (chunks[chunks.len() - 1].end - duration).abs() < EPSILON,
            "plan must end at duration"
        );

        for (position, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.index, position, "indices must be dense and ordered");
            assert!(chunk.start < chunk.end);
            assert!(
                chunk.length() <= chunk_size + EPSILON,
                "no chunk may exceed the chunk size"
            );
        }

        for pair in chunks.windows(2) {
            assert!(
                (pair[1].start - (pair[0].end - overlap)).abs() < EPSILON,
                "consecutive chunks must overlap by exactly the configured amount"
            );
            assert!(pair[1].start < pair[0].end, "no gaps between chunks");
        }
    }

    #[test]
    fn plan_covers_duration_with_overlap() {
        let plan = ChunkPlan::build(600.0, 120.0, 1.0).unwrap();
        assert_covers(&plan, 600.0, 120.0, 1.0);
    }

    #[test]
    fn plan_covers_duration_without_overlap() {
        let plan = ChunkPlan::build(100.0, 30.0, 0.0).unwrap();
        assert_covers(&plan, 100.0, 30.0, 0.0);
        assert_eq!(plan.len(), 4);
    }

    #[test]
    fn plan_covers_awkward_durations() {
        for duration in [31.0, 59.9, 121.0, 3601.5, 86400.0] {
            let plan = ChunkPlan::build(duration, 120.0, 2.0).unwrap();
            assert_covers(&plan, duration, 120.0, 2.0);
        }
    }

    #[test]
    fn short_duration_is_a_single_chunk() {
        let plan = ChunkPlan::build(45.0, 120.0, 1.0).unwrap();
        assert_eq!(plan.len(), 1);
        assert_eq!(plan.chunks()[0], ChunkSpec { index: 0, start: 0.0, end: 45.0 });
    }

    #[test]
    fn duration_equal_to_chunk_size_is_a_single_chunk() {
        let plan = ChunkPlan::build(120.0, 120.0, 1.0).unwrap();
        assert_eq!(plan.len(), 1);
    }

    #[test]
    fn final_chunk_may_be_shorter() {
        let plan = ChunkPlan::build(250.0, 120.0, 0.0).unwrap();
        assert_eq!(plan.len(), 3);
        assert!(plan.chunks()[2].length() < 120.0);
    }

    #[test]
    fn zero_chunk_size_is_rejected() {
        assert!(ChunkPlan::build(100.0, 0.0, 0.0).is_err());
    }

    #[test]
    fn negative_overlap_is_rejected() {
        assert!(ChunkPlan::build(100.0, 30.0, -1.0).is_err());
    }

    #[test]
    fn overlap_not_below_chunk_size_is_rejected() {
        assert!(ChunkPlan::build(100.0, 30.0, 30.0).is_err());
        assert!(ChunkPlan::build(100.0, 30.0, 31.0).is_err());
    }

    #[test]
    fn zero_duration_is_rejected() {
        assert!(ChunkPlan::build(0.0, 30.0, 1.0).is_err());
    }

    #[test]
    fn validate_chunking_accepts_interface_range() {
        assert!(validate_chunking(10, 0).is_ok());
        assert!(validate_chunking(300, 299).is_ok());
        assert!(validate_chunking(120, 1).is_ok());
    }

    #[test]
    fn validate_chunking_rejects_out_of_range_sizes() {
        assert!(validate_chunking(9, 0).is_err());
        assert!(validate_chunking(301, 0).is_err());
    }

    #[test]
    fn validate_chunking_rejects_oversized_overlap() {
        assert!(validate_chunking(30, 30).is_err());
    }

    #[test]
    fn window_is_clamped_at_stream_start() {
        let window = playback_window(500.0, 50.0, 120.0);
        assert_eq!(window, TimeWindow { start: 0.0, end: 170.0 });
    }

    #[test]
    fn window_is_clamped_at_stream_end() {
        let window = playback_window(500.0, 450.0, 120.0);
        assert_eq!(window, TimeWindow { start: 330.0, end: 500.0 });
    }

    #[test]
    fn window_centered_when_room_on_both_sides() {
        let window = playback_window(1000.0, 500.0, 120.0);
        assert_eq!(window, TimeWindow { start: 380.0, end: 620.0 });
    }

    #[test]
    fn short_file_window_is_the_whole_file() {
        // duration <= 2 × half-window → whole file, regardless of position
        for position in [0.0, 100.0, 199.0] {
            let window = playback_window(200.0, position, 120.0);
            assert_eq!(window, TimeWindow { start: 0.0, end: 200.0 });
        }
    }
}
