//! Sega Game Gear console emulation
//!
//! # Architecture
//!
//! - **CPU**: Zilog Z80 @ 3.58 MHz
//! - **MMU**: Sega mapper, three switchable 16 KiB windows over up to 64
//!   ROM banks, 8 KiB system RAM mirrored at the top of the address space
//! - **VDP**: Sega 315-5378, 256x192 field with the LCD's 160x144 window
//! - **PSG**: Texas Instruments SN76489 with the stereo-enable register
//!
//! The console is driven by [`GameGear::run`], which executes CPU
//! instructions in lock-step with the chips and yields to the host once per
//! video frame.

pub mod bus;
pub mod mmu;
pub mod system;
pub mod vdp;

pub use system::{FrameCallback, GameGear, PowerSwitch};
