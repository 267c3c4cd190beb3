pub mod frame;
pub mod movie;

pub use frame::{FrameSynth, RgbImage, CHANNELS, GRAY_LEVEL};
pub use movie::RawMovie;
