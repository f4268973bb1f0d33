use crate::error::LoadError;

/// Total addressable memory.
pub const MEM_SIZE: usize = 4096;
/// The first 512 bytes are reserved for the interpreter. We only use them for the font sprites.
pub const MEM_RESERVED: usize = 512;
/// The largest program image that fits between the entry point and the end of memory.
pub const MAX_PROGRAM_SIZE: usize = MEM_SIZE - MEM_RESERVED;
/// Every computed address is masked with this to stay inside memory.
pub const ADDR_MASK: u16 = (MEM_SIZE - 1) as u16;

pub const SCREEN_WIDTH: usize = 64;
pub const SCREEN_HEIGHT: usize = 32;

/// Nesting limit for `CALL`.
pub const STACK_DEPTH: usize = 16;
pub const KEY_COUNT: usize = 16;

/// Index of the flag register VF.
pub const FLAG_REGISTER: usize = 0xF;

/// Each font glyph is 5 rows of 4 pixels, stored in the high nibble.
pub const FONT_GLYPH_SIZE: u16 = 5;

/// Font sprites for the hex digits, loaded at address 0.
#[rustfmt::skip]
pub const FONT: [u8; 5 * 16] = [
    0xF0, 0x90, 0x90, 0x90, 0xF0, // '0'
    0x20, 0x60, 0x20, 0x20, 0x70, // '1'
    0xF0, 0x10, 0xF0, 0x80, 0xF0, // '2'
    0xF0, 0x10, 0xF0, 0x10, 0xF0, // '3'
    0x90, 0x90, 0xF0, 0x10, 0x10, // '4'
    0xF0, 0x80, 0xF0, 0x10, 0xF0, // '5'
    0xF0, 0x80, 0xF0, 0x90, 0xF0, // '6'
    0xF0, 0x10, 0x20, 0x40, 0x40, // '7'
    0xF0, 0x90, 0xF0, 0x90, 0xF0, // '8'
    0xF0, 0x90, 0xF0, 0x10, 0xF0, // '9'
    0xF0, 0x90, 0xF0, 0x90, 0x90, // 'A'
    0xE0, 0x90, 0xE0, 0x90, 0xE0, // 'B'
    0xF0, 0x80, 0x80, 0x80, 0xF0, // 'C'
    0xE0, 0x90, 0x90, 0x90, 0xE0, // 'D'
    0xF0, 0x80, 0xF0, 0x80, 0xF0, // 'E'
    0xF0, 0x80, 0xF0, 0x80, 0x80, // 'F'
];

/// All architectural state of a CHIP-8 machine. Only the cpu mutates it, apart from the key state
/// which belongs to the input side.
#[derive(Clone)]
pub struct Machine {
    pub(crate) memory: [u8; MEM_SIZE],

    // Return addresses pushed by `CALL`.
    pub(crate) call_stack: [u16; STACK_DEPTH],
    // The number of occupied `call_stack` slots, i.e. the index of the first free slot. It never
    // exceeds `STACK_DEPTH`.
    pub(crate) sp_register: usize,

    // V0 through VF. VF is written as a flag by arithmetic, shift and draw instructions.
    pub(crate) v_registers: [u8; 16],

    // Full 16 bits wide; only masked when used as an address.
    pub(crate) i_register: u16,

    // Address of the next instruction to fetch. Always within `ADDR_MASK`.
    pub(crate) pc_register: u16,

    pub(crate) dt_register: u8,
    pub(crate) st_register: u8,

    // Row-major, a pixel is `true` if it is turned on.
    pub(crate) screen_buffer: [bool; SCREEN_WIDTH * SCREEN_HEIGHT],

    pub(crate) key_state: [bool; KEY_COUNT],
}

impl Machine {
    /// A zeroed machine with the font loaded and the pc at the entry point.
    pub fn new() -> Self {
        let mut memory = [0u8; MEM_SIZE];
        memory[..FONT.len()].copy_from_slice(&FONT);

        Machine {
            memory,
            call_stack: [0; STACK_DEPTH],
            sp_register: 0,
            v_registers: [0; 16],
            i_register: 0,
            pc_register: MEM_RESERVED as u16,
            dt_register: 0,
            st_register: 0,
            screen_buffer: [false; SCREEN_WIDTH * SCREEN_HEIGHT],
            key_state: [false; KEY_COUNT],
        }
    }

    pub fn reset(&mut self) {
        *self = Machine::new();
    }

    /// Reset the machine and copy `rom` to the entry point. An image that doesn't fit is rejected
    /// without touching any state.
    pub fn load_program(&mut self, rom: &[u8]) -> Result<(), LoadError> {
        if rom.len() > MAX_PROGRAM_SIZE {
            return Err(LoadError::ProgramTooLarge {
                len: rom.len(),
                capacity: MAX_PROGRAM_SIZE,
            });
        }

        self.reset();
        self.memory[MEM_RESERVED..MEM_RESERVED + rom.len()].copy_from_slice(rom);
        Ok(())
    }

    pub fn read_byte(&self, addr: u16) -> u8 {
        self.memory[(addr & ADDR_MASK) as usize]
    }

    pub fn write_byte(&mut self, addr: u16, value: u8) {
        self.memory[(addr & ADDR_MASK) as usize] = value;
    }

    /// Instructions are 2 bytes, big-endian. A word at the last address wraps to address 0 for its
    /// low byte.
    pub fn read_word(&self, addr: u16) -> u16 {
        u16::from_be_bytes([self.read_byte(addr), self.read_byte(addr.wrapping_add(1))])
    }

    /// Byte at `offset` past the I register, wrapped into memory.
    pub(crate) fn read_indexed(&self, offset: u16) -> u8 {
        self.read_byte(self.i_register.wrapping_add(offset))
    }

    pub(crate) fn write_indexed(&mut self, offset: u16, value: u8) {
        self.write_byte(self.i_register.wrapping_add(offset), value);
    }

    pub(crate) fn jump(&mut self, addr: u16) {
        self.pc_register = addr & ADDR_MASK;
    }

    /// Move the pc forward by one instruction.
    pub(crate) fn skip(&mut self) {
        self.jump(self.pc_register.wrapping_add(2));
    }

    /// Push a return address. Returns false, leaving the stack untouched, if the stack is full.
    pub(crate) fn push(&mut self, return_addr: u16) -> bool {
        if self.sp_register == STACK_DEPTH {
            return false;
        }

        self.call_stack[self.sp_register] = return_addr;
        self.sp_register += 1;
        true
    }

    /// Pop a return address, or `None` if the stack is empty.
    pub(crate) fn pop(&mut self) -> Option<u16> {
        if self.sp_register == 0 {
            return None;
        }

        self.sp_register -= 1;
        Some(self.call_stack[self.sp_register])
    }

    /// Count both timers down by one, stopping at zero.
    pub(crate) fn tick_timers(&mut self) {
        self.dt_register = self.dt_register.saturating_sub(1);
        self.st_register = self.st_register.saturating_sub(1);
    }

    /// Lowest-numbered key currently held down.
    pub(crate) fn first_pressed_key(&self) -> Option<u8> {
        self.key_state.iter().position(|&pressed| pressed).map(|key| key as u8)
    }

    pub(crate) fn is_key_pressed(&self, key: u8) -> bool {
        self.key_state[(key & 0xF) as usize]
    }
}

impl Default for Machine {
    fn default() -> Self {
        Machine::new()
    }
}
