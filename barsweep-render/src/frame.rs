use barsweep_core::{ConfigError, FrameStimulus};
use tiny_skia::{Color, Paint, Pixmap, Rect, Transform};

/// Color channels per pixel (RGB).
pub const CHANNELS: usize = 3;

/// 8-bit level of the mid-gray background.
pub const GRAY_LEVEL: u8 = 128;

/// Interleaved RGB image with values in [0, 1], row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct RgbImage {
    pub rows: usize,
    pub cols: usize,
    pub data: Vec<f32>,
}

impl RgbImage {
    pub fn uniform(rows: usize, cols: usize, value: f32) -> Self {
        Self {
            rows,
            cols,
            data: vec![value; rows * cols * CHANNELS],
        }
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize, ch: usize) -> f32 {
        self.data[(row * self.cols + col) * CHANNELS + ch]
    }

    pub fn pixel_count(&self) -> usize {
        self.rows * self.cols
    }

    pub fn mean(&self) -> f32 {
        if self.data.is_empty() {
            return 0.0;
        }
        self.data.iter().sum::<f32>() / self.data.len() as f32
    }
}

/// Rasterises frame stimuli onto a reusable canvas.
pub struct FrameSynth {
    rows: usize,
    cols: usize,
    canvas: Pixmap,
    background: Color,
    bar_paint: Paint<'static>,
}

impl FrameSynth {
    pub fn new(rows: usize, cols: usize) -> Result<Self, ConfigError> {
        if rows == 0 {
            return Err(ConfigError::Zero { field: "image_rows" });
        }
        if cols == 0 {
            return Err(ConfigError::Zero { field: "image_cols" });
        }
        let canvas = Pixmap::new(cols as u32, rows as u32).ok_or(ConfigError::NotPositive {
            field: "image size",
            value: (rows * cols) as f64,
        })?;

        let mut bar_paint = Paint::default();
        bar_paint.anti_alias = false;
        bar_paint.set_color(Color::from_rgba8(255, 255, 255, 255));

        Ok(Self {
            rows,
            cols,
            canvas,
            background: Color::from_rgba8(GRAY_LEVEL, GRAY_LEVEL, GRAY_LEVEL, 255),
            bar_paint,
        })
    }

    pub fn size(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Render one frame. Bar columns outside the canvas are clipped.
    pub fn render(&mut self, stimulus: &FrameStimulus) -> RgbImage {
        self.canvas.fill(self.background);

        if let Some(span) = stimulus.bar() {
            let cols = span.pixel_range();
            let end = cols.end.min(self.cols);
            if cols.start < end {
                // Integer-aligned rect without anti-aliasing covers whole pixels only.
                if let Some(rect) = Rect::from_xywh(
                    cols.start as f32,
                    0.0,
                    (end - cols.start) as f32,
                    self.rows as f32,
                ) {
                    self.canvas
                        .fill_rect(rect, &self.bar_paint, Transform::identity(), None);
                }
            }
        }

        self.snapshot()
    }

    fn snapshot(&self) -> RgbImage {
        let mut data = Vec::with_capacity(self.rows * self.cols * CHANNELS);
        // Opaque canvas: premultiplied values equal straight values.
        for px in self.canvas.pixels() {
            data.push(px.red() as f32 / 255.0);
            data.push(px.green() as f32 / 255.0);
            data.push(px.blue() as f32 / 255.0);
        }
        RgbImage {
            rows: self.rows,
            cols: self.cols,
            data,
        }
    }
}
