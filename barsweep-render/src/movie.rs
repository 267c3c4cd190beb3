use crate::frame::RgbImage;
use barsweep_core::ToolboxError;

/// Raw stimulus movie indexed `[row, col, frame, channel]`.
///
/// Storage is frame-major so that a whole frame is one contiguous slice.
/// Frames that were never stored stay zero.
#[derive(Debug, Clone, PartialEq)]
pub struct RawMovie {
    rows: usize,
    cols: usize,
    frames: usize,
    channels: usize,
    data: Vec<f32>,
    stored: Vec<bool>,
}

impl RawMovie {
    pub fn allocate(rows: usize, cols: usize, frames: usize, channels: usize) -> Self {
        Self {
            rows,
            cols,
            frames,
            channels,
            data: vec![0.0; rows * cols * frames * channels],
            stored: vec![false; frames],
        }
    }

    pub fn shape(&self) -> [usize; 4] {
        [self.rows, self.cols, self.frames, self.channels]
    }

    fn frame_len(&self) -> usize {
        self.rows * self.cols * self.channels
    }

    /// Copy an image into zero-based frame slot `frame`.
    pub fn store_frame(&mut self, frame: usize, image: &RgbImage) -> Result<(), ToolboxError> {
        let len = self.frame_len();
        if frame >= self.frames {
            return Err(ToolboxError::ShapeMismatch {
                what: "movie frame slots",
                expected: self.frames,
                actual: frame + 1,
            });
        }
        if image.rows != self.rows || image.cols != self.cols || image.data.len() != len {
            return Err(ToolboxError::ShapeMismatch {
                what: "movie frame",
                expected: len,
                actual: image.data.len(),
            });
        }
        self.data[frame * len..(frame + 1) * len].copy_from_slice(&image.data);
        self.stored[frame] = true;
        Ok(())
    }

    pub fn is_stored(&self, frame: usize) -> bool {
        self.stored.get(frame).copied().unwrap_or(false)
    }

    pub fn stored_frames(&self) -> usize {
        self.stored.iter().filter(|s| **s).count()
    }

    /// Interleaved pixels of one frame.
    pub fn frame(&self, frame: usize) -> Option<&[f32]> {
        let len = self.frame_len();
        (frame < self.frames).then(|| &self.data[frame * len..(frame + 1) * len])
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize, frame: usize, ch: usize) -> f32 {
        self.data[((frame * self.rows + row) * self.cols + col) * self.channels + ch]
    }

    /// One color channel of every frame, laid out `[frame][row][col]`.
    pub fn channel_plane(&self, ch: usize) -> Vec<f32> {
        if ch >= self.channels {
            return Vec::new();
        }
        self.data
            .iter()
            .skip(ch)
            .step_by(self.channels)
            .copied()
            .collect()
    }

    /// Native-endian f32 bytes in storage order.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::CHANNELS;

    fn ramp(rows: usize, cols: usize, offset: f32) -> RgbImage {
        let data = (0..rows * cols * CHANNELS)
            .map(|i| offset + i as f32)
            .collect();
        RgbImage { rows, cols, data }
    }

    #[test]
    fn frames_land_in_their_slot() {
        let mut movie = RawMovie::allocate(2, 3, 4, CHANNELS);
        movie.store_frame(2, &ramp(2, 3, 100.0)).unwrap();
        assert_eq!(movie.shape(), [2, 3, 4, 3]);
        assert_eq!(movie.get(0, 0, 2, 0), 100.0);
        assert_eq!(movie.get(1, 2, 2, 2), 117.0);
        assert_eq!(movie.get(1, 2, 1, 2), 0.0);
        assert!(movie.is_stored(2));
        assert!(!movie.is_stored(0));
        assert_eq!(movie.stored_frames(), 1);
    }

    #[test]
    fn mismatched_frames_are_refused() {
        let mut movie = RawMovie::allocate(2, 3, 1, CHANNELS);
        assert!(movie.store_frame(0, &ramp(3, 2, 0.0)).is_err());
        assert!(movie.store_frame(1, &ramp(2, 3, 0.0)).is_err());
    }

    #[test]
    fn channel_plane_keeps_one_channel() {
        let mut movie = RawMovie::allocate(1, 2, 2, CHANNELS);
        movie.store_frame(0, &ramp(1, 2, 0.0)).unwrap();
        movie.store_frame(1, &ramp(1, 2, 10.0)).unwrap();
        assert_eq!(movie.channel_plane(1), vec![1.0, 4.0, 11.0, 14.0]);
        assert!(movie.channel_plane(3).is_empty());
    }

    #[test]
    fn byte_view_covers_the_whole_tensor() {
        let movie = RawMovie::allocate(2, 2, 3, CHANNELS);
        assert_eq!(movie.as_bytes().len(), 2 * 2 * 3 * CHANNELS * 4);
        assert_eq!(movie.frame(3), None);
        assert_eq!(movie.frame(0).map(<[f32]>::len), Some(12));
    }
}
