use std::ops::Range;

/// Columns covered by the bar, 1-based and inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BarSpan {
    pub col_start: usize,
    pub col_end: usize,
}

impl BarSpan {
    /// Span shown at 1-based frame `t`. The bar slides one column per frame,
    /// starting at column 2 on the first sweep frame.
    pub fn for_frame(t: usize, pre_roll: usize, bar_width: usize) -> Self {
        debug_assert!(t > pre_roll && bar_width > 0);
        let col_start = t - pre_roll + 1;
        Self {
            col_start,
            col_end: col_start + bar_width - 1,
        }
    }

    pub fn width(&self) -> usize {
        self.col_end + 1 - self.col_start
    }

    /// Zero-based, half-open pixel columns.
    pub fn pixel_range(&self) -> Range<usize> {
        self.col_start - 1..self.col_end
    }
}

/// What a single frame shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameStimulus {
    /// Uniform mid-gray field.
    Uniform,
    /// Mid-gray field with a full-intensity vertical bar.
    Bar(BarSpan),
}

impl FrameStimulus {
    pub fn bar(&self) -> Option<&BarSpan> {
        match self {
            FrameStimulus::Bar(span) => Some(span),
            FrameStimulus::Uniform => None,
        }
    }
}
