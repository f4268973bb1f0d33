//! A CHIP-8 interpreter core.
//!
//! [`Cpu`] owns the whole machine and advances it one instruction per [`Cpu::step`]. Rendering,
//! input, audio and pacing belong to the host: it writes the key state, calls `step` at whatever
//! rate it likes and reads back the screen buffer and sound timer. The same type is exported to
//! JavaScript through `wasm-bindgen`.

mod cpu;
pub mod decode;
pub mod error;
pub mod machine;
pub mod quirks;
mod utils;

use std::collections::VecDeque;

use rand::rngs::StdRng;
use rand::SeedableRng;
use wasm_bindgen::prelude::*;

pub use crate::decode::Instruction;
pub use crate::error::{Diagnostic, LoadError};
pub use crate::machine::{Machine, KEY_COUNT, MAX_PROGRAM_SIZE, MEM_SIZE, SCREEN_HEIGHT, SCREEN_WIDTH};
pub use crate::quirks::Quirks;

/// Undrained diagnostics beyond this are dropped, oldest first.
pub const DIAGNOSTIC_CAPACITY: usize = 64;

/// State of the `LD Vx, K` instruction, the only one that spans several steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyWait {
    /// No key press is pending.
    Satisfied,
    /// `LD Vx, K` is re-executed every step until a key is held, which is then stored in Vx.
    Waiting { x: usize },
}

#[wasm_bindgen]
/// Represents a CHIP-8 CPU
pub struct Cpu {
    machine: Machine,

    // Options that change how some instructions operate.
    quirks: Quirks,

    // Source for `RND`. Seeded from entropy unless the host asks for a fixed seed.
    rng: StdRng,

    key_wait: KeyWait,

    // Screen buffer dirty flag. This flag is set whenever the internal buffer is changed. The
    // actual display must update and then clear this flag.
    screen_dirty: bool,

    // Conditions the driver should know about; never fatal.
    diagnostics: VecDeque<Diagnostic>,
}

#[wasm_bindgen]
impl Cpu {
    /// Construct a CHIP-8 cpu at the initial entry state.
    pub fn new() -> Self {
        Cpu::with_quirks(Quirks::default())
    }

    /// Construct a CHIP-8 cpu with rom bytes loaded at the entry point in memory. Fails if the rom
    /// doesn't fit.
    pub fn from_rom(rom: &[u8]) -> Result<Cpu, JsValue> {
        Cpu::with_rom(rom).map_err(|err| JsValue::from_str(&err.to_string()))
    }

    /// Like `from_rom`. When `original_shift` is true the shift instructions shift Vy instead of
    /// Vx. When `original_mem_acc` is true the load/store instructions increment the I register
    /// by the number of registers transferred.
    pub fn from_rom_with_options(
        rom: &[u8],
        original_shift: bool,
        original_mem_acc: bool,
    ) -> Result<Cpu, JsValue> {
        let quirks = Quirks {
            shift_uses_vy: original_shift,
            increment_index_on_dump: original_mem_acc,
        };
        Cpu::with_rom_and_quirks(rom, quirks).map_err(|err| JsValue::from_str(&err.to_string()))
    }

    /// Fetch, decode and execute one instruction, then tick both timers once.
    ///
    /// Unknown instructions and stack faults are reported through the diagnostics queue and
    /// otherwise skipped. It is the responsibility of the caller to check the `screen_dirty` flag
    /// and update the display if needed.
    pub fn step(&mut self) {
        self.cycle();
    }

    /// Return every register, the memory, the screen and the key state to the entry state, with
    /// the font loaded. Quirks are kept.
    pub fn reset(&mut self) {
        self.machine.reset();
        self.key_wait = KeyWait::Satisfied;
        self.screen_dirty = true;
        self.diagnostics.clear();
    }

    /// Get a pointer to the screen buffer memory, used from the JS side to render the screen.
    pub fn get_screen_buffer(&self) -> *const bool {
        self.machine.screen_buffer.as_ptr()
    }

    pub fn screen_width() -> usize {
        SCREEN_WIDTH
    }

    pub fn screen_height() -> usize {
        SCREEN_HEIGHT
    }

    /// Returns whether or not the screen dirty, and if it is, sets it to false.
    pub fn handle_screen_dirty_flag(&mut self) -> bool {
        let captured_flag = self.screen_dirty;
        self.screen_dirty = false;
        captured_flag
    }

    /// Update the internal key state to the provided key state, one byte per key, nonzero meaning
    /// pressed. A slice that isn't exactly 16 long is ignored.
    pub fn update_key_state(&mut self, new_key_state: &[u8]) {
        if new_key_state.len() != KEY_COUNT {
            log::warn!(
                "ignoring key state of length {}, expected {}",
                new_key_state.len(),
                KEY_COUNT
            );
            return;
        }

        for (held, &byte) in self.machine.key_state.iter_mut().zip(new_key_state) {
            *held = byte != 0;
        }
    }

    /// Returns true if the cpu is blocked on `LD Vx, K`.
    pub fn is_waiting_for_keypress(&self) -> bool {
        matches!(self.key_wait, KeyWait::Waiting { .. })
    }

    /// Returns true if the emulator should play a tone
    pub fn should_play_tone(&self) -> bool {
        self.machine.st_register > 0
    }

    /// Drain the diagnostics queue as one message per line.
    pub fn take_diagnostic_log(&mut self) -> String {
        self.take_diagnostics()
            .iter()
            .map(|diagnostic| diagnostic.to_string())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Cpu {
    /// Construct a CHIP-8 cpu at the initial entry state with the given quirks.
    pub fn with_quirks(quirks: Quirks) -> Self {
        utils::set_panic_hook();
        utils::set_logger();

        Cpu {
            machine: Machine::new(),
            quirks,
            rng: StdRng::from_entropy(),
            key_wait: KeyWait::Satisfied,
            screen_dirty: false,
            diagnostics: VecDeque::new(),
        }
    }

    /// Construct a CHIP-8 cpu whose `RND` sequence is fixed by `seed`.
    pub fn with_seed(seed: u64) -> Self {
        let mut cpu = Cpu::new();
        cpu.reseed(seed);
        cpu
    }

    /// Construct a CHIP-8 cpu at the initial entry state, with rom bytes loaded at the entry point
    /// in memory.
    pub fn with_rom(rom: &[u8]) -> Result<Self, LoadError> {
        Cpu::with_rom_and_quirks(rom, Quirks::default())
    }

    pub fn with_rom_and_quirks(rom: &[u8], quirks: Quirks) -> Result<Self, LoadError> {
        let mut cpu = Cpu::with_quirks(quirks);
        cpu.load_program(rom)?;
        Ok(cpu)
    }

    /// Reset the cpu and load a program at the entry point. A rom that doesn't fit is rejected
    /// whole and the cpu is left as it was.
    pub fn load_program(&mut self, rom: &[u8]) -> Result<(), LoadError> {
        self.machine.load_program(rom)?;
        self.key_wait = KeyWait::Satisfied;
        self.screen_dirty = true;
        self.diagnostics.clear();
        log::info!("loaded {} byte program", rom.len());
        Ok(())
    }

    pub fn reseed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }

    pub fn quirks(&self) -> Quirks {
        self.quirks
    }

    pub fn set_quirks(&mut self, quirks: Quirks) {
        self.quirks = quirks;
    }

    pub fn machine(&self) -> &Machine {
        &self.machine
    }

    pub fn key_wait(&self) -> KeyWait {
        self.key_wait
    }

    /// Press or release one of the 16 keys. Keys above 0xF are ignored.
    pub fn set_key(&mut self, key: u8, pressed: bool) {
        if let Some(held) = self.machine.key_state.get_mut(key as usize) {
            *held = pressed;
        }
    }

    pub fn set_keys(&mut self, keys: &[bool; KEY_COUNT]) {
        self.machine.key_state = *keys;
    }

    /// Row-major, `true` for a lit pixel.
    pub fn framebuffer(&self) -> &[bool; SCREEN_WIDTH * SCREEN_HEIGHT] {
        &self.machine.screen_buffer
    }

    pub fn pixel(&self, x: usize, y: usize) -> bool {
        x < SCREEN_WIDTH && y < SCREEN_HEIGHT && self.machine.screen_buffer[y * SCREEN_WIDTH + x]
    }

    /// Value of register V0 through VF. Panics if `reg` is above 0xF.
    pub fn register(&self, reg: usize) -> u8 {
        self.machine.v_registers[reg]
    }

    pub fn index_register(&self) -> u16 {
        self.machine.i_register
    }

    pub fn program_counter(&self) -> u16 {
        self.machine.pc_register
    }

    pub fn stack_depth(&self) -> usize {
        self.machine.sp_register
    }

    pub fn memory(&self) -> &[u8; MEM_SIZE] {
        &self.machine.memory
    }

    pub fn delay_timer(&self) -> u8 {
        self.machine.dt_register
    }

    pub fn sound_timer(&self) -> u8 {
        self.machine.st_register
    }

    /// Remove and return every queued diagnostic, oldest first.
    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        self.diagnostics.drain(..).collect()
    }

    pub fn diagnostic_count(&self) -> usize {
        self.diagnostics.len()
    }
}

impl Default for Cpu {
    fn default() -> Self {
        Cpu::new()
    }
}
