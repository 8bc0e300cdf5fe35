//! MMU (Memory Management Unit) functions and structures.
//!
//! The MMU is the cycle accounting hub of the emulator: every bus
//! access first advances the PPU, APU, timer, serial and DMA by one
//! machine cycle (see [`Mmu::cycle`]) and only then resolves the
//! read or write operation. Keeping this ordering is what makes
//! timer interrupts, PPU mode changes and audio phase observable
//! at the expected instant from the running program.

use std::sync::Mutex;

use dotmatrix_common::util::SharedThread;

use crate::{
    apu::Apu,
    assert_pedantic_gb,
    consts::{BOOT_ADDR, IF_ADDR, JOYP_ADDR, KEY0_ADDR, KEY1_ADDR, RP_ADDR, SVBK_ADDR},
    debugln,
    dma::Dma,
    gb::{Components, GameBoyConfig, GameBoyMode, GameBoySpeed},
    pad::Pad,
    ppu::Ppu,
    rom::Cartridge,
    serial::Serial,
    timer::Timer,
};

pub const BOOT_SIZE_DMG: usize = 256;
pub const BOOT_SIZE_CGB: usize = 2304;

pub const RAM_SIZE_DMG: usize = 8192;
pub const RAM_SIZE_CGB: usize = 32768;

pub const HRAM_SIZE: usize = 128;

/// Interrupt sources in priority order, the bit index in both the
/// IE and IF registers matches the position in this ordering.
pub const INT_VBLANK: u8 = 0;
pub const INT_STAT: u8 = 1;
pub const INT_TIMER: u8 = 2;
pub const INT_SERIAL: u8 = 3;
pub const INT_PAD: u8 = 4;

pub struct Mmu {
    /// Register that controls the interrupts that are considered
    /// to be enabled and should be triggered.
    pub ie: u8,

    /// Register that controls the compatibility mode in use, this
    /// value comes directly from 0x0143 (CGB flag). The possible (and
    /// valid) values are: 0x80 for games that support CGB enhancements
    /// and 0xC0 for games that are compatible only with a CGB device
    /// (CGB only).
    pub key0: u8,

    /// Flag that controls if the system is currently in the process
    /// of switching between the double and single speed modes.
    pub switching: bool,

    /// The speed (frequency) at which the system is currently running,
    /// it may be either normal (4.194304 MHz) or double (8.388608 MHz).
    speed: GameBoySpeed,

    /// Callback to be called when the speed of the system changes, it
    /// should provide visibility over the current speed of the system.
    speed_callback: fn(speed: GameBoySpeed),

    /// Reference to the PPU (Pixel Processing Unit) that is going
    /// to be used both for VRAM reading/writing and to forward
    /// some of the access operations.
    ppu: Ppu,

    /// Reference to the APU (Audio Processing Unit) that is going
    /// to be used both for register reading/writing and to forward
    /// some of the access operations.
    apu: Apu,

    /// Reference to the DMA (Direct Memory Access) controller that is
    /// going to be used for CPU offloaded memory transfers.
    dma: Dma,

    /// Reference to the Gamepad structure that is going to control
    /// the I/O access to this device.
    pad: Pad,

    /// The timer controller to be used as part of the I/O access
    /// that is memory mapped.
    timer: Timer,

    /// The serial data transfer controller to be used to control the
    /// link cable connection, this component is memory mapped.
    serial: Serial,

    /// The cartridge ROM that is currently loaded into the system,
    /// going to be used to access ROM and external RAM banks.
    rom: Cartridge,

    /// Flag that controls the access to the boot section in the
    /// lower memory area, this flag is unset once the boot sequence
    /// writes to the 0xFF50 register.
    boot_active: bool,

    /// Buffer to be used to store the boot ROM, the code that is
    /// going to be executed at the beginning of the Game Boy
    /// execution. The buffer is 256 bytes for the DMG and 2304
    /// bytes for the CGB, where the range 0x0100-0x01FF belongs
    /// to the cartridge header instead.
    boot: Vec<u8>,

    /// Buffer that is used to store the working RAM of the system,
    /// 8KB for the DMG and 32KB (8 banks of 4KB) for the CGB.
    /// Mapped in range 0xC000-0xDFFF.
    ram: Vec<u8>,

    /// High RAM memory buffer, mapped in range 0xFF80-0xFFFE.
    hram: [u8; HRAM_SIZE],

    /// The WRAM bank selected for the 0xD000-0xDFFF memory range,
    /// the zero value acts as one (CGB only).
    ram_bank: u8,

    /// The offset to be used in the read and write operation of
    /// the WRAM, consistent with the selected bank (CGB only).
    ram_offset: u16,

    /// Number of T-cycles that have been run by [`Mmu::cycle`] since
    /// the last counter reset, used by the CPU to account for the
    /// cycles taken by the instruction under execution.
    cycles_run: u8,

    ppu_enabled: bool,
    apu_enabled: bool,
    dma_enabled: bool,
    timer_enabled: bool,
    serial_enabled: bool,

    /// The current running mode of the emulator, this
    /// may affect many aspects of the emulation.
    mode: GameBoyMode,

    /// The pointer to the parent configuration of the running
    /// Game Boy emulator, that can be used to control the behaviour
    /// of Game Boy emulation.
    gbc: SharedThread<GameBoyConfig>,
}

impl Mmu {
    pub fn new(
        components: Components,
        mode: GameBoyMode,
        gbc: SharedThread<GameBoyConfig>,
    ) -> Self {
        Self {
            ppu: components.ppu,
            apu: components.apu,
            dma: components.dma,
            pad: components.pad,
            timer: components.timer,
            serial: components.serial,
            rom: Cartridge::new(),
            boot_active: true,
            boot: vec![],
            ram: vec![],
            hram: [0u8; HRAM_SIZE],
            ram_bank: 0x1,
            ram_offset: 0x1000,
            cycles_run: 0,
            ie: 0x0,
            key0: 0x0,
            speed: GameBoySpeed::Normal,
            switching: false,
            speed_callback: |_| {},
            ppu_enabled: true,
            apu_enabled: true,
            dma_enabled: true,
            timer_enabled: true,
            serial_enabled: true,
            mode,
            gbc,
        }
    }

    pub fn reset(&mut self) {
        self.rom = Cartridge::new();
        self.boot_active = true;
        self.boot = vec![];
        self.ram = vec![];
        self.hram = [0u8; HRAM_SIZE];
        self.ram_bank = 0x1;
        self.ram_offset = 0x1000;
        self.cycles_run = 0;
        self.ie = 0x0;
        self.key0 = 0x0;
        self.speed = GameBoySpeed::Normal;
        self.switching = false;
    }

    pub fn allocate_default(&mut self) {
        self.allocate_dmg();
    }

    pub fn allocate_dmg(&mut self) {
        self.boot = vec![0x00; BOOT_SIZE_DMG];
        self.ram = vec![0x00; RAM_SIZE_DMG];
    }

    pub fn allocate_cgb(&mut self) {
        self.boot = vec![0x00; BOOT_SIZE_CGB];
        self.ram = vec![0x00; RAM_SIZE_CGB];
    }

    /// Advances the complete machine by one machine cycle, the
    /// single point through which the PPU, APU, timer, serial and
    /// DMA are kept in lock-step with the CPU.
    ///
    /// One machine cycle corresponds to 4 T-cycles, or 8 in CGB
    /// double speed mode. The PPU dot clock is not affected by the
    /// double speed mode, the remaining components are.
    pub fn cycle(&mut self) {
        let cycles = 4u16 * self.speed.multiplier() as u16;
        self.cycles_run = self.cycles_run.wrapping_add(cycles as u8);
        if self.ppu_enabled {
            self.ppu.clock(4);
        }
        if self.apu_enabled {
            self.apu.clock(cycles);
        }
        if self.timer_enabled {
            self.timer.clock(cycles);
        }
        if self.serial_enabled {
            self.serial.clock(cycles);
        }
        if self.dma_enabled {
            self.clock_dma(cycles);
        }
    }

    #[inline(always)]
    pub fn cycles_run(&self) -> u8 {
        self.cycles_run
    }

    #[inline(always)]
    pub fn reset_cycles_run(&mut self) {
        self.cycles_run = 0;
    }

    /// Reads a byte from the provided address, advancing the rest
    /// of the machine by one machine cycle before the bus operation
    /// is resolved.
    pub fn read(&mut self, addr: u16) -> u8 {
        self.cycle();
        self.read_plain(addr)
    }

    /// Writes a byte to the provided address, advancing the rest
    /// of the machine by one machine cycle before the bus operation
    /// is resolved.
    pub fn write(&mut self, addr: u16, value: u8) {
        self.cycle();
        self.write_plain(addr, value);
    }

    /// Reads a byte from a certain memory address without advancing
    /// the machine state, used for DMA transfers, debug access and
    /// the internal interrupt checks of the CPU.
    pub fn read_plain(&self, addr: u16) -> u8 {
        match addr {
            // 0x0000-0x0FFF - BOOT (256 B) + ROM0 (4 KB/16 KB)
            0x0000..=0x0fff => {
                if self.boot_active && addr <= 0x00ff {
                    return self.boot[addr as usize];
                }
                if self.boot_active
                    && self.mode == GameBoyMode::Cgb
                    && (0x0200..=0x08ff).contains(&addr)
                {
                    return self.boot[addr as usize];
                }
                self.rom.read(addr)
            }

            // 0x1000-0x3FFF - ROM 0 (12 KB/16 KB)
            // 0x4000-0x7FFF - ROM 1 (Banked) (16 KB)
            0x1000..=0x7fff => self.rom.read(addr),

            // 0x8000-0x9FFF - Graphics: VRAM (8 KB)
            0x8000..=0x9fff => self.ppu.read(addr),

            // 0xA000-0xBFFF - External RAM (8 KB)
            0xa000..=0xbfff => self.rom.read(addr),

            // 0xC000-0xCFFF - Working RAM 0 (4 KB)
            0xc000..=0xcfff => self.ram[(addr & 0x0fff) as usize],

            // 0xD000-0xDFFF - Working RAM 1 (Banked) (4KB)
            0xd000..=0xdfff => self.ram[(self.ram_offset + (addr & 0x0fff)) as usize],

            // 0xE000-0xFDFF - Working RAM Shadow
            0xe000..=0xfdff => self.ram[(addr & 0x1fff) as usize],

            // 0xFE00-0xFE9F - Object attribute memory (OAM)
            0xfe00..=0xfe9f => self.ppu.read(addr),

            // 0xFEA0-0xFEFF - Not Usable
            0xfea0..=0xfeff => 0x00,

            // 0xFF00 - Joypad input
            JOYP_ADDR => self.pad.read(addr),

            // 0xFF01-0xFF02 - Serial data transfer
            0xff01..=0xff02 => self.serial.read(addr),

            // 0xFF04-0xFF07 - Timer and divider
            0xff04..=0xff07 => self.timer.read(addr),

            // 0xFF0F — IF: Interrupt flag
            IF_ADDR => self.if_value() | 0xe0,

            // 0xFF10-0xFF26 — Audio
            // 0xFF30-0xFF3F — Wave pattern
            0xff10..=0xff26 | 0xff30..=0xff3f => self.apu.read(addr),

            // 0xFF40-0xFF45 - PPU registers
            // 0xFF47-0xFF4B - PPU registers
            0xff40..=0xff45 | 0xff47..=0xff4b => self.ppu.read(addr),

            // 0xFF46 — DMA: OAM DMA source address & start
            0xff46 => self.dma.read(addr),

            // 0xFF4C - KEY0: Compatibility flag (CGB only)
            KEY0_ADDR => self.key0,

            // 0xFF4D - KEY1: Speed switching (CGB only)
            KEY1_ADDR => (if self.switching { 0x01 } else { 0x00 }) | ((self.speed as u8) << 7) | 0x7e,

            // 0xFF4F - VBK: VRAM Bank Select (CGB only)
            0xff4f => self.ppu.read(addr),

            // 0xFF50 - Boot active flag
            BOOT_ADDR => u8::from(!self.boot_active),

            // 0xFF51-0xFF55 - VRAM DMA (HDMA) (CGB only)
            0xff51..=0xff55 => self.dma.read(addr),

            // 0xFF56 - RP: Infrared communications port (CGB only)
            RP_ADDR => 0xff,

            // 0xFF68-0xFF6C - BG / OBJ Palettes + OPRI (CGB only)
            0xff68..=0xff6c => self.ppu.read(addr),

            // 0xFF70 - SVBK: WRAM bank (CGB only)
            SVBK_ADDR => (self.ram_bank & 0x07) | 0xf8,

            // 0xFF80-0xFFFE - High RAM (HRAM)
            0xff80..=0xfffe => self.hram[(addr & 0x007f) as usize],

            // 0xFFFF — IE: Interrupt enable
            0xffff => self.ie,

            addr => {
                debugln!("Reading from unmapped location 0x{:04x}", addr);
                #[allow(unreachable_code)]
                0xff
            }
        }
    }

    /// Writes a byte to a certain memory address without advancing
    /// the machine state.
    pub fn write_plain(&mut self, addr: u16, value: u8) {
        match addr {
            // 0x0000-0x7FFF - MBC register writes
            0x0000..=0x7fff => self.rom.write(addr, value),

            // 0x8000-0x9FFF - Graphics: VRAM (8 KB)
            0x8000..=0x9fff => self.ppu.write(addr, value),

            // 0xA000-0xBFFF - External RAM (8 KB)
            0xa000..=0xbfff => self.rom.write(addr, value),

            // 0xC000-0xCFFF - Working RAM 0 (4 KB)
            0xc000..=0xcfff => self.ram[(addr & 0x0fff) as usize] = value,

            // 0xD000-0xDFFF - Working RAM 1 (Banked) (4KB)
            0xd000..=0xdfff => self.ram[(self.ram_offset + (addr & 0x0fff)) as usize] = value,

            // 0xE000-0xFDFF - Working RAM Shadow
            0xe000..=0xfdff => self.ram[(addr & 0x1fff) as usize] = value,

            // 0xFE00-0xFE9F - Object attribute memory (OAM)
            0xfe00..=0xfe9f => self.ppu.write(addr, value),

            // 0xFEA0-0xFEFF - Not Usable
            0xfea0..=0xfeff => {}

            // 0xFF00 - Joypad input
            JOYP_ADDR => self.pad.write(addr, value),

            // 0xFF01-0xFF02 - Serial data transfer
            0xff01..=0xff02 => self.serial.write(addr, value),

            // 0xFF04-0xFF07 - Timer and divider
            0xff04..=0xff07 => self.timer.write(addr, value),

            // 0xFF0F — IF: Interrupt flag
            IF_ADDR => self.set_if(value),

            // 0xFF10-0xFF26 — Audio
            // 0xFF30-0xFF3F — Wave pattern
            0xff10..=0xff26 | 0xff30..=0xff3f => self.apu.write(addr, value),

            // 0xFF40-0xFF45 - PPU registers
            // 0xFF47-0xFF4B - PPU registers
            0xff40..=0xff45 | 0xff47..=0xff4b => self.ppu.write(addr, value),

            // 0xFF46 — DMA: OAM DMA source address & start
            0xff46 => self.dma.write(addr, value),

            // 0xFF4C - KEY0: Compatibility flag (CGB only)
            KEY0_ADDR => {
                self.key0 = value;
                if value == 0x04 {
                    self.ppu.set_dmg_compat(true);
                }
            }

            // 0xFF4D - KEY1: Speed switching (CGB only)
            KEY1_ADDR => {
                if self.mode == GameBoyMode::Cgb {
                    self.switching = value & 0x01 == 0x01;
                }
            }

            // 0xFF4F - VBK: VRAM Bank Select (CGB only)
            0xff4f => self.ppu.write(addr, value),

            // 0xFF50 - Boot active flag
            BOOT_ADDR => self.boot_active = value == 0x00,

            // 0xFF51-0xFF55 - VRAM DMA (HDMA) (CGB only)
            0xff51..=0xff55 => self.dma.write(addr, value),

            // 0xFF56 - RP: Infrared communications port (CGB only)
            RP_ADDR => {}

            // 0xFF68-0xFF6C - BG / OBJ Palettes + OPRI (CGB only)
            0xff68..=0xff6c => self.ppu.write(addr, value),

            // 0xFF70 - SVBK: WRAM bank (CGB only)
            SVBK_ADDR => {
                let mut ram_bank = value & 0x07;
                if ram_bank == 0x0 {
                    ram_bank = 0x1;
                }
                self.ram_bank = ram_bank;
                self.ram_offset = self.ram_bank as u16 * 0x1000;
            }

            // 0xFF80-0xFFFE - High RAM (HRAM)
            0xff80..=0xfffe => self.hram[(addr & 0x007f) as usize] = value,

            // 0xFFFF — IE: Interrupt enable
            0xffff => self.ie = value,

            addr => debugln!("Writing to unmapped location 0x{:04x}", addr),
        }
    }

    /// Composes the current value of the IF register from the
    /// interrupt lines of the several components.
    #[allow(clippy::bool_to_int_with_if)]
    pub fn if_value(&self) -> u8 {
        (if self.ppu.int_vblank() { 0x01 } else { 0x00 })
            | (if self.ppu.int_stat() { 0x02 } else { 0x00 })
            | (if self.timer.int_tima() { 0x04 } else { 0x00 })
            | (if self.serial.int_serial() { 0x08 } else { 0x00 })
            | (if self.pad.int_pad() { 0x10 } else { 0x00 })
    }

    /// Updates the interrupt lines of the several components from
    /// a raw write to the IF register.
    pub fn set_if(&mut self, value: u8) {
        self.ppu.set_int_vblank(value & 0x01 == 0x01);
        self.ppu.set_int_stat(value & 0x02 == 0x02);
        self.timer.set_int_tima(value & 0x04 == 0x04);
        self.serial.set_int_serial(value & 0x08 == 0x08);
        self.pad.set_int_pad(value & 0x10 == 0x10);
    }

    /// Acknowledges the interrupt with the provided bit index,
    /// clearing the matching interrupt line.
    pub fn ack_interrupt(&mut self, index: u8) {
        match index {
            INT_VBLANK => self.ppu.ack_vblank(),
            INT_STAT => self.ppu.ack_stat(),
            INT_TIMER => self.timer.ack_tima(),
            INT_SERIAL => self.serial.ack_serial(),
            INT_PAD => self.pad.ack_pad(),
            _ => (),
        }
    }

    /// Runs the pending DMA transfers, the OAM transfer is applied
    /// as a single copy once its (bus occupation) period has elapsed
    /// and the VRAM (HDMA) transfer is applied as a one-shot burst
    /// for both the general purpose and the H-Blank modes.
    fn clock_dma(&mut self, cycles: u16) {
        if !self.dma.active() {
            return;
        }

        if self.dma.active_dma() {
            let cycles_dma = self.dma.cycles_dma().saturating_sub(cycles);
            if cycles_dma == 0x0 {
                let base = (self.dma.value_dma() as u16) << 8;
                for offset in 0..160u16 {
                    let byte = self.read_plain(base + offset);
                    self.ppu.write(0xfe00 + offset, byte);
                }
                self.dma.set_active_dma(false);
            }
            self.dma.set_cycles_dma(cycles_dma);
        }

        if self.dma.active_hdma() {
            assert_pedantic_gb!(
                (0x0000..=0x7ff0).contains(&self.dma.source())
                    || (0xa000..=0xdff0).contains(&self.dma.source()),
                "Invalid HDMA source start memory address 0x{:04x}",
                self.dma.source()
            );
            assert_pedantic_gb!(
                (0x8000..=0x9ff0).contains(&self.dma.destination()),
                "Invalid HDMA destination start memory address 0x{:04x}",
                self.dma.destination()
            );

            // only runs the HDMA transfer if the system is in CGB
            // mode, this avoids issues when writing to DMG unmapped
            // registers that would otherwise corrupt memory
            if self.mode == GameBoyMode::Cgb {
                let source = self.dma.source();
                let destination = self.dma.destination();
                for offset in 0..self.dma.pending() {
                    let byte = self.read_plain(source + offset);
                    self.write_plain(destination + offset, byte);
                }
            }
            self.dma.set_pending(0);
            self.dma.set_active_hdma(false);
        }
    }

    /// Switches the current system's speed toggling between
    /// the normal and double speed modes.
    pub fn switch_speed(&mut self) {
        self.speed = self.speed.switch();
        self.switching = false;
        (self.speed_callback)(self.speed);
    }

    pub fn speed(&self) -> GameBoySpeed {
        self.speed
    }

    pub fn set_speed_callback(&mut self, callback: fn(speed: GameBoySpeed)) {
        self.speed_callback = callback;
    }

    pub fn ppu(&mut self) -> &mut Ppu {
        &mut self.ppu
    }

    pub fn ppu_i(&self) -> &Ppu {
        &self.ppu
    }

    pub fn apu(&mut self) -> &mut Apu {
        &mut self.apu
    }

    pub fn apu_i(&self) -> &Apu {
        &self.apu
    }

    pub fn dma(&mut self) -> &mut Dma {
        &mut self.dma
    }

    pub fn dma_i(&self) -> &Dma {
        &self.dma
    }

    pub fn pad(&mut self) -> &mut Pad {
        &mut self.pad
    }

    pub fn pad_i(&self) -> &Pad {
        &self.pad
    }

    pub fn timer(&mut self) -> &mut Timer {
        &mut self.timer
    }

    pub fn timer_i(&self) -> &Timer {
        &self.timer
    }

    pub fn serial(&mut self) -> &mut Serial {
        &mut self.serial
    }

    pub fn serial_i(&self) -> &Serial {
        &self.serial
    }

    pub fn boot_active(&self) -> bool {
        self.boot_active
    }

    pub fn set_boot_active(&mut self, value: bool) {
        self.boot_active = value;
    }

    pub fn set_ppu_enabled(&mut self, value: bool) {
        self.ppu_enabled = value;
    }

    pub fn set_apu_enabled(&mut self, value: bool) {
        self.apu_enabled = value;
    }

    pub fn set_dma_enabled(&mut self, value: bool) {
        self.dma_enabled = value;
    }

    pub fn set_timer_enabled(&mut self, value: bool) {
        self.timer_enabled = value;
    }

    pub fn set_serial_enabled(&mut self, value: bool) {
        self.serial_enabled = value;
    }

    pub fn write_boot(&mut self, addr: u16, buffer: &[u8]) {
        self.boot[addr as usize..addr as usize + buffer.len()].clone_from_slice(buffer);
    }

    pub fn rom(&mut self) -> &mut Cartridge {
        &mut self.rom
    }

    pub fn rom_i(&self) -> &Cartridge {
        &self.rom
    }

    pub fn set_rom(&mut self, rom: Cartridge) {
        self.rom = rom;
    }

    pub fn mode(&self) -> GameBoyMode {
        self.mode
    }

    pub fn set_mode(&mut self, value: GameBoyMode) {
        self.mode = value;
    }

    pub fn gbc(&self) -> SharedThread<GameBoyConfig> {
        self.gbc.clone()
    }

    pub fn set_gbc(&mut self, value: SharedThread<GameBoyConfig>) {
        self.gbc = value;
    }
}

impl Default for Mmu {
    fn default() -> Self {
        let mode = GameBoyMode::Dmg;
        let gbc = SharedThread::new(Mutex::new(GameBoyConfig::default()));
        let components = Components {
            ppu: Ppu::new(mode),
            apu: Apu::default(),
            dma: Dma::default(),
            pad: Pad::default(),
            timer: Timer::default(),
            serial: Serial::default(),
        };
        Mmu::new(components, mode, gbc)
    }
}

#[cfg(test)]
mod tests {
    use super::Mmu;
    use crate::consts::{DIV_ADDR, IF_ADDR, LCDC_ADDR};

    #[test]
    fn test_echo_ram() {
        let mut mmu = Mmu::default();
        mmu.allocate_default();
        mmu.write_plain(0xc123, 0x42);
        assert_eq!(mmu.read_plain(0xe123), 0x42);
        mmu.write_plain(0xfd00, 0x24);
        assert_eq!(mmu.read_plain(0xdd00), 0x24);
    }

    #[test]
    fn test_not_usable_reads_zero() {
        let mmu = Mmu::default();
        assert_eq!(mmu.read_plain(0xfea0), 0x00);
        assert_eq!(mmu.read_plain(0xfeff), 0x00);
    }

    #[test]
    fn test_hram() {
        let mut mmu = Mmu::default();
        mmu.write_plain(0xff80, 0x13);
        mmu.write_plain(0xfffe, 0x37);
        assert_eq!(mmu.read_plain(0xff80), 0x13);
        assert_eq!(mmu.read_plain(0xfffe), 0x37);
    }

    #[test]
    fn test_if_composition() {
        let mut mmu = Mmu::default();
        assert_eq!(mmu.read_plain(IF_ADDR), 0xe0);

        mmu.pad().key_press(crate::pad::PadKey::A);
        assert_eq!(mmu.read_plain(IF_ADDR), 0xf0);

        mmu.write_plain(IF_ADDR, 0x00);
        assert_eq!(mmu.read_plain(IF_ADDR), 0xe0);
    }

    #[test]
    fn test_cycle_lock_step() {
        let mut mmu = Mmu::default();
        mmu.allocate_default();
        mmu.write_plain(LCDC_ADDR, 0x91);
        mmu.reset_cycles_run();

        // 64 machine cycles push the divider clock over the 256
        // T-cycle boundary, both the PPU and the timer must have
        // observed exactly the same amount of cycles
        for _ in 0..64 {
            mmu.cycle();
        }
        assert_eq!(mmu.read_plain(DIV_ADDR), 1);

        // 256 dots are 80 (OAM scan) + 172 (VRAM read) + 4 into
        // the H-Blank period
        assert_eq!(mmu.ppu_i().mode(), crate::ppu::PpuMode::HBlank);
        assert_eq!(mmu.ppu_i().mode_clock(), 4);
    }

    #[test]
    fn test_read_advances_machine() {
        let mut mmu = Mmu::default();
        mmu.allocate_default();
        mmu.reset_cycles_run();
        mmu.read(0xc000);
        mmu.write(0xc000, 0x01);
        assert_eq!(mmu.cycles_run(), 8);
    }
}
