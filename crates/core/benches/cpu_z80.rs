use criterion::{black_box, criterion_group, criterion_main, Criterion};
use gg_core::cpu_z80::{Bus, CpuZ80};

/// Flat RAM bus for benchmarking raw dispatch throughput
struct BenchBus {
    ram: Vec<u8>,
}

impl BenchBus {
    fn new() -> Self {
        let mut ram = vec![0; 0x10000];

        // Program at 0x0000:
        // LD HL,0x4000 ; 21 00 40
        // LD DE,0x5000 ; 11 00 50
        // LD BC,0x0100 ; 01 00 01
        // LDIR         ; ED B0
        // LD B,0xFF    ; 06 FF
        // loop: ADD A,B ; 80
        // DJNZ loop    ; 10 FD
        // JP 0x0000    ; C3 00 00
        let program = [
            0x21, 0x00, 0x40, 0x11, 0x00, 0x50, 0x01, 0x00, 0x01, 0xED, 0xB0, 0x06, 0xFF, 0x80,
            0x10, 0xFD, 0xC3, 0x00, 0x00,
        ];
        ram[..program.len()].copy_from_slice(&program);
        Self { ram }
    }
}

impl Bus for BenchBus {
    fn read(&self, addr: u16) -> u8 {
        self.ram[addr as usize]
    }

    fn write(&mut self, addr: u16, val: u8) {
        self.ram[addr as usize] = val;
    }
}

fn bench_dispatch(c: &mut Criterion) {
    c.bench_function("z80_step_100k", |b| {
        b.iter(|| {
            let mut cpu = CpuZ80::new(BenchBus::new());
            for _ in 0..100_000 {
                cpu.step().expect("benchmark program is fully defined");
            }
            black_box(cpu.cycles)
        })
    });
}

criterion_group!(benches, bench_dispatch);
criterion_main!(benches);
