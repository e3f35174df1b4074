//! Console aggregate and frame-paced scheduler
//!
//! `GameGear` owns the CPU (which owns the bus), the chips hanging off it,
//! and the power lifecycle: Unpowered -> Powered -> running -> Unpowered.
//! `run` blocks the calling thread until the session ends, handing control
//! to the host once per video frame through the attached callback.

use crate::bus::GgBus;
use crate::vdp::Vdp;
use gg_core::apu::Sn76489Psg;
use gg_core::cpu_z80::{CpuFault, CpuZ80};
use gg_core::types::Frame;
use log::{debug, error};
use serde_json::{json, Value};
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Host callback invoked once per emulated video frame.
///
/// Runs synchronously on the emulation thread; it may call `power_off` to
/// request termination, but must not call `run` reentrantly.
pub type FrameCallback<'a> = Box<dyn FnMut(&mut GameGear<'a>) + 'a>;

/// Cloneable handle for requesting power-off from outside the run loop.
///
/// The handle only ever stores one atomic boolean, which the run loop polls
/// cooperatively; it is safe to use from a signal handler or another thread
/// without any lock. No other state crosses that boundary.
#[derive(Clone)]
pub struct PowerSwitch(Arc<AtomicBool>);

impl PowerSwitch {
    pub fn power_off(&self) {
        self.0.store(false, Ordering::Relaxed);
    }
}

/// The whole console
pub struct GameGear<'a> {
    cpu: CpuZ80<GgBus<'a>>,

    // Shared chip handles (the bus holds the other ends)
    vdp: Rc<RefCell<Vdp>>,
    psg: Rc<RefCell<Sn76489Psg>>,

    powered: Arc<AtomicBool>,
    callback: Option<FrameCallback<'a>>,
    fault: Option<CpuFault>,
}

impl<'a> GameGear<'a> {
    /// Create an unpowered console with nothing mounted.
    pub fn new() -> Self {
        let vdp = Rc::new(RefCell::new(Vdp::new()));
        let psg = Rc::new(RefCell::new(Sn76489Psg::new()));
        let bus = GgBus::new(Rc::clone(&vdp), Rc::clone(&psg));

        Self {
            cpu: CpuZ80::new(bus),
            vdp,
            psg,
            powered: Arc::new(AtomicBool::new(false)),
            callback: None,
            fault: None,
        }
    }

    /// Register a cartridge image with the MMU.
    ///
    /// The image must stay alive for the lifetime of the console; the MMU
    /// only borrows it. Must not be called while `run` is executing (the
    /// borrow checker enforces this via `&mut self`).
    pub fn mount_cartridge(&mut self, data: &'a [u8]) {
        debug!("mounting cartridge image, {} bytes", data.len());
        self.cpu.bus.mmu.load_rom(data);
    }

    /// Attach the per-frame host callback. Only valid while unpowered or
    /// between `run` invocations.
    pub fn attach_callback(&mut self, callback: FrameCallback<'a>) {
        self.callback = Some(callback);
    }

    /// Attach the caller-owned display buffer the VDP renders into.
    pub fn attach_display(&mut self, display: Rc<RefCell<Frame>>) {
        self.vdp.borrow_mut().attach_display(display);
    }

    /// Drop the callback and display buffer references.
    pub fn detach(&mut self) {
        self.callback = None;
        self.vdp.borrow_mut().detach_display();
    }

    /// Power on: reset every chip to its initial state, clear any recorded
    /// fault, and raise the power flag.
    pub fn power_on(&mut self) {
        debug!("powering on");
        self.cpu.reset();
        self.cpu.bus.mmu.power_on();
        self.vdp.borrow_mut().reset();
        self.psg.borrow_mut().reset();
        self.fault = None;
        self.powered.store(true, Ordering::Relaxed);
    }

    /// Request power-off. Observed by the run loop at its next check.
    pub fn power_off(&mut self) {
        self.powered.store(false, Ordering::Relaxed);
    }

    /// A handle that can request power-off from an asynchronous context.
    pub fn power_switch(&self) -> PowerSwitch {
        PowerSwitch(Arc::clone(&self.powered))
    }

    pub fn is_powered(&self) -> bool {
        self.powered.load(Ordering::Relaxed)
    }

    /// The fault that stopped the last `run`, if any.
    pub fn fault(&self) -> Option<&CpuFault> {
        self.fault.as_ref()
    }

    /// Run until power-off or a CPU fault. Blocks the calling thread.
    ///
    /// Each iteration emulates one frame's worth of instructions, then
    /// invokes the frame callback and re-checks the power flag.
    pub fn run(&mut self) {
        while self.powered.load(Ordering::Relaxed) {
            if !self.step_frame() {
                break;
            }

            // The callback gets the console itself; take it out of the
            // struct for the duration of the call
            let mut callback = self.callback.take();
            if let Some(cb) = callback.as_mut() {
                cb(self);
            }
            if self.callback.is_none() {
                self.callback = callback;
            }
        }
    }

    /// Emulate a single frame without invoking the callback.
    ///
    /// This is the polling-style adapter the headless front end uses; `run`
    /// is built on top of it. Returns true when a full frame was produced,
    /// false when the session stopped first (power-off or fault).
    pub fn step_frame(&mut self) -> bool {
        loop {
            if !self.powered.load(Ordering::Relaxed) {
                return false;
            }

            let cycles = match self.cpu.step() {
                Ok(cycles) => cycles,
                Err(fault) => {
                    error!("CPU fault: {}", fault);
                    self.fault = Some(fault);
                    self.powered.store(false, Ordering::Relaxed);
                    return false;
                }
            };

            let frame_done = self.cpu.bus.tick(cycles);

            // The VDP holds its interrupt line until software reads the
            // status port; the CPU decides whether to accept it
            if self.cpu.bus.irq_pending() {
                self.cpu.interrupt();
            }

            if frame_done {
                return true;
            }
        }
    }

    /// Debug snapshot of processor state (never includes ROM data).
    pub fn save_state(&self) -> Value {
        json!({
            "cpu": {
                "a": self.cpu.a,
                "f": self.cpu.f,
                "b": self.cpu.b,
                "c": self.cpu.c,
                "d": self.cpu.d,
                "e": self.cpu.e,
                "h": self.cpu.h,
                "l": self.cpu.l,
                "ix": self.cpu.ix,
                "iy": self.cpu.iy,
                "sp": self.cpu.sp,
                "pc": self.cpu.pc,
                "i": self.cpu.i,
                "r": self.cpu.r,
                "im": self.cpu.im,
                "iff1": self.cpu.iff1,
                "iff2": self.cpu.iff2,
                "halted": self.cpu.halted,
                "cycles": self.cpu.cycles,
            },
        })
    }

    /// Drain the audio samples the PSG accumulated since the last call.
    ///
    /// Hosts that do not play audio should still drain once per frame to
    /// keep the sample buffer bounded.
    pub fn take_audio_samples(&mut self) -> Vec<i16> {
        self.psg.borrow_mut().take_samples()
    }

    /// Forward host button state to the bus.
    pub fn set_controller_1(&mut self, state: u8) {
        self.cpu.bus.set_controller_1(state);
    }

    pub fn set_controller_2(&mut self, state: u8) {
        self.cpu.bus.set_controller_2(state);
    }

    pub fn set_start_button(&mut self, pressed: bool) {
        self.cpu.bus.set_start_button(pressed);
    }
}

impl Default for GameGear<'_> {
    fn default() -> Self {
        Self::new()
    }
}
