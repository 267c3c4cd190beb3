/// Part of the timeline a frame belongs to.
#[derive(Copy, Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum Segment {
    #[default]
    PreRoll,
    Sweep,
    PostRoll,
}

impl Segment {
    pub fn is_sweep(&self) -> bool {
        matches!(self, Segment::Sweep)
    }

    /// Frames outside the sweep show the uniform background.
    pub fn uses_mean_image(&self) -> bool {
        !self.is_sweep()
    }

    pub fn label(&self) -> &'static str {
        match self {
            Segment::PreRoll => "pre-roll",
            Segment::Sweep => "sweep",
            Segment::PostRoll => "post-roll",
        }
    }
}
