//! Core emulator primitives: CPU core, PSG, and shared types.

pub mod apu;
pub mod cpu_z80;

pub mod types {
    use serde::{Deserialize, Serialize};

    /// A host-visible pixel buffer in ARGB8888.
    ///
    /// The console's video chip writes into a shared `Frame` owned by the
    /// front end; the core never copies pixel data.
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct Frame {
        pub width: u32,
        pub height: u32,
        pub pixels: Vec<u32>,
    }

    impl Frame {
        pub fn new(width: u32, height: u32) -> Self {
            Self {
                width,
                height,
                pixels: vec![0; (width * height) as usize],
            }
        }
    }

    pub type AudioSample = i16;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_initialization() {
        let f = types::Frame::new(10, 10);
        assert_eq!(f.pixels.len(), 100);
        assert_eq!(f.width, 10);
        assert_eq!(f.height, 10);
    }
}
