//! Audio chip emulation.
//!
//! The only chip the handheld carries is the Texas Instruments SN76489
//! programmable sound generator, in its Game Gear configuration with the
//! stereo-enable register bolted on.

pub mod sn76489;

pub use sn76489::Sn76489Psg;
