use barsweep_core::{BarSpan, FrameStimulus, Segment, StimulusParameters};
use std::ops::RangeInclusive;

/// One frame of the timeline. `index` is 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameSlot {
    pub index: usize,
    pub segment: Segment,
    pub stimulus: FrameStimulus,
}

/// Pre-roll, bar sweep and post-roll frames in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameTimeline {
    pub pre_roll: usize,
    pub stimulus_frames: usize,
    pub post_roll: usize,
    pub bar_width: usize,
}

impl FrameTimeline {
    pub fn new(
        pre_roll: usize,
        stimulus_frames: usize,
        post_roll: usize,
        bar_width: usize,
    ) -> Self {
        Self {
            pre_roll,
            stimulus_frames,
            post_roll,
            bar_width,
        }
    }

    /// Timeline for a scene rendered `scene_cols` wide.
    pub fn from_params(params: &StimulusParameters, scene_cols: usize) -> Self {
        Self::new(
            params.pre_roll,
            params.resolve_stimulus_frames(scene_cols),
            params.post_roll,
            params.bar_width,
        )
    }

    pub fn len(&self) -> usize {
        self.pre_roll + self.stimulus_frames + self.post_roll
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 1-based frames showing the bar. Empty when there is no sweep.
    pub fn sweep_window(&self) -> RangeInclusive<usize> {
        self.pre_roll + 1..=self.pre_roll + self.stimulus_frames
    }

    pub fn first_sweep_frame(&self) -> Option<usize> {
        let window = self.sweep_window();
        (!window.is_empty()).then(|| *window.start())
    }

    /// Frames that reuse the uniform background.
    pub fn mean_frames(&self) -> usize {
        self.pre_roll + self.post_roll
    }

    pub fn segment(&self, t: usize) -> Segment {
        if t <= self.pre_roll {
            Segment::PreRoll
        } else if t <= self.pre_roll + self.stimulus_frames {
            Segment::Sweep
        } else {
            Segment::PostRoll
        }
    }

    pub fn frame(&self, t: usize) -> Option<FrameSlot> {
        if t == 0 || t > self.len() {
            return None;
        }
        let segment = self.segment(t);
        let stimulus = if segment.is_sweep() {
            FrameStimulus::Bar(BarSpan::for_frame(t, self.pre_roll, self.bar_width))
        } else {
            FrameStimulus::Uniform
        };
        Some(FrameSlot {
            index: t,
            segment,
            stimulus,
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = FrameSlot> + '_ {
        (1..=self.len()).filter_map(move |t| self.frame(t))
    }
}
