//! System bus: memory accesses and I/O port decode
//!
//! Memory goes through the banked MMU. I/O ports:
//! - 0x00:      start button / region
//! - 0x06:      PSG stereo enable (write only)
//! - 0x7E/0x7F: V/H counter reads, PSG writes
//! - 0xBE:      VDP data port
//! - 0xBF:      VDP control/status port
//! - 0xDC/0xDD: controller ports

use crate::mmu::Mmu;
use crate::vdp::Vdp;
use gg_core::apu::Sn76489Psg;
use gg_core::cpu_z80::Bus;
use std::cell::RefCell;
use std::rc::Rc;

/// The console's bus fabric
pub struct GgBus<'a> {
    pub mmu: Mmu<'a>,

    // Shared chip references
    vdp: Rc<RefCell<Vdp>>,
    psg: Rc<RefCell<Sn76489Psg>>,

    // Host input state (active low, hardware convention)
    controller_1: u8,
    controller_2: u8,
    start_pressed: bool,
}

impl<'a> GgBus<'a> {
    pub fn new(vdp: Rc<RefCell<Vdp>>, psg: Rc<RefCell<Sn76489Psg>>) -> Self {
        Self {
            mmu: Mmu::new(),
            vdp,
            psg,
            controller_1: 0xFF,
            controller_2: 0xFF,
            start_pressed: false,
        }
    }

    /// Advance the peripheral chips by the cycles the CPU just consumed.
    /// Returns true when the VDP finished a frame.
    pub fn tick(&mut self, cycles: u32) -> bool {
        self.psg.borrow_mut().tick(cycles);
        self.vdp.borrow_mut().tick(cycles)
    }

    /// True while the VDP holds its interrupt line asserted.
    pub fn irq_pending(&self) -> bool {
        self.vdp.borrow().interrupt_pending()
    }

    pub fn set_controller_1(&mut self, state: u8) {
        self.controller_1 = state;
    }

    pub fn set_controller_2(&mut self, state: u8) {
        self.controller_2 = state;
    }

    pub fn set_start_button(&mut self, pressed: bool) {
        self.start_pressed = pressed;
    }
}

impl Bus for GgBus<'_> {
    fn read(&self, addr: u16) -> u8 {
        self.mmu.read_byte(addr)
    }

    fn write(&mut self, addr: u16, val: u8) {
        // ROM-region writes are rejected by the MMU; software doing so is
        // ignored the way the hardware would
        self.mmu.write_byte(addr, val);
    }

    fn io_read(&mut self, port: u8) -> u8 {
        match port {
            // Bit 7: start button (1 = released); bit 6: export region
            0x00 => {
                let start = if self.start_pressed { 0x00 } else { 0x80 };
                start | 0x40
            }
            // Serial/EXT port block, nothing attached
            0x01..=0x06 => 0xFF,
            0x7E => self.vdp.borrow().read_vcounter(),
            0x7F => self.vdp.borrow().read_hcounter(),
            0xBE => self.vdp.borrow_mut().read_data(),
            0xBF => self.vdp.borrow_mut().read_status(),
            0xDC => self.controller_1,
            0xDD => self.controller_2,
            _ => 0xFF,
        }
    }

    fn io_write(&mut self, port: u8, val: u8) {
        match port {
            0x06 => self.psg.borrow_mut().write_stereo(val),
            0x7E | 0x7F => self.psg.borrow_mut().write(val),
            0xBE => self.vdp.borrow_mut().write_data(val),
            0xBF => self.vdp.borrow_mut().write_control(val),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bus<'a>() -> GgBus<'a> {
        GgBus::new(
            Rc::new(RefCell::new(Vdp::new())),
            Rc::new(RefCell::new(Sn76489Psg::new())),
        )
    }

    #[test]
    fn memory_routes_through_the_mmu() {
        let mut bus = bus();
        bus.mmu.power_on();
        bus.write(0xC000, 0x42);
        assert_eq!(bus.read(0xC000), 0x42);
        assert_eq!(bus.read(0xE000), 0x42);
        // ROM region silently rejects
        bus.write(0x1000, 0x42);
        assert_eq!(bus.read(0x1000), 0xFF);
    }

    #[test]
    fn start_button_reads_active_low() {
        let mut bus = bus();
        assert_eq!(bus.io_read(0x00) & 0x80, 0x80);
        bus.set_start_button(true);
        assert_eq!(bus.io_read(0x00) & 0x80, 0x00);
    }

    #[test]
    fn controller_ports_reflect_host_state() {
        let mut bus = bus();
        assert_eq!(bus.io_read(0xDC), 0xFF);
        bus.set_controller_1(0xDE);
        assert_eq!(bus.io_read(0xDC), 0xDE);
    }

    #[test]
    fn vdp_ports_reach_the_chip() {
        let mut bus = bus();
        bus.io_write(0xBF, 0x34);
        bus.io_write(0xBF, 0x52); // VRAM write at 0x1234
        bus.io_write(0xBE, 0x99);
        bus.io_write(0xBF, 0x34);
        bus.io_write(0xBF, 0x12); // VRAM read
        let _ = bus.io_read(0xBE);
        assert_eq!(bus.io_read(0xBE), 0x99);
    }

    #[test]
    fn unmapped_port_is_open_bus() {
        let mut bus = bus();
        assert_eq!(bus.io_read(0x42), 0xFF);
    }
}
