use rand::Rng;

use crate::decode::Instruction;
use crate::error::Diagnostic;
use crate::machine::{FLAG_REGISTER, FONT_GLYPH_SIZE, SCREEN_HEIGHT, SCREEN_WIDTH};
use crate::{Cpu, KeyWait, DIAGNOSTIC_CAPACITY};

// Fetch/execute cycle
impl Cpu {
    pub(crate) fn cycle(&mut self) {
        let addr = self.machine.pc_register;
        let instr = self.machine.read_word(addr);

        // Advance before executing, so jumps and skips work from the next instruction.
        self.machine.skip();

        match Instruction::decode(instr) {
            Some(decoded) => self.execute(addr, decoded),
            None => self.report(Diagnostic::UnknownInstruction { addr, word: instr }),
        }

        self.machine.tick_timers();
    }

    /// Queue a diagnostic for the driver, dropping the oldest if the queue is full.
    pub(crate) fn report(&mut self, diagnostic: Diagnostic) {
        log::warn!("{}", diagnostic);

        if self.diagnostics.len() == DIAGNOSTIC_CAPACITY {
            self.diagnostics.pop_front();
        }
        self.diagnostics.push_back(diagnostic);
    }

    /// Execute an instruction fetched from `addr`. The pc already points past it.
    fn execute(&mut self, addr: u16, instr: Instruction) {
        match instr {
            Instruction::Cls => self.instr_00e0(),
            Instruction::Ret => self.instr_00ee(addr),
            Instruction::Sys { addr: target } => {
                log::debug!("ignoring SYS {:#05X} at {:#05X}", target, addr);
            }
            Instruction::Jp { addr: target } => self.machine.jump(target),
            Instruction::Call { addr: target } => self.instr_2nnn(addr, target),
            Instruction::SeByte { x, byte } => self.skip_if(self.machine.v_registers[x] == byte),
            Instruction::SneByte { x, byte } => self.skip_if(self.machine.v_registers[x] != byte),
            Instruction::SeReg { x, y } => {
                self.skip_if(self.machine.v_registers[x] == self.machine.v_registers[y])
            }
            Instruction::SneReg { x, y } => {
                self.skip_if(self.machine.v_registers[x] != self.machine.v_registers[y])
            }
            Instruction::LdByte { x, byte } => self.machine.v_registers[x] = byte,
            Instruction::AddByte { x, byte } => {
                self.machine.v_registers[x] = self.machine.v_registers[x].wrapping_add(byte)
            }
            Instruction::LdReg { x, y } => self.machine.v_registers[x] = self.machine.v_registers[y],
            Instruction::Or { x, y } => self.machine.v_registers[x] |= self.machine.v_registers[y],
            Instruction::And { x, y } => self.machine.v_registers[x] &= self.machine.v_registers[y],
            Instruction::Xor { x, y } => self.machine.v_registers[x] ^= self.machine.v_registers[y],
            Instruction::AddReg { x, y } => self.instr_8xy4(x, y),
            Instruction::Sub { x, y } => self.instr_8xy5(x, y),
            Instruction::Shr { x, y } => self.instr_8xy6(x, y),
            Instruction::Subn { x, y } => self.instr_8xy7(x, y),
            Instruction::Shl { x, y } => self.instr_8xye(x, y),
            Instruction::LdI { addr: target } => self.machine.i_register = target,
            Instruction::JpV0 { addr: target } => {
                self.machine
                    .jump(target.wrapping_add(self.machine.v_registers[0] as u16))
            }
            Instruction::Rnd { x, byte } => {
                self.machine.v_registers[x] = self.rng.gen::<u8>() & byte
            }
            Instruction::Drw { x, y, height } => self.instr_dxyn(x, y, height),
            Instruction::Skp { x } => {
                self.skip_if(self.machine.is_key_pressed(self.machine.v_registers[x]))
            }
            Instruction::Sknp { x } => {
                self.skip_if(!self.machine.is_key_pressed(self.machine.v_registers[x]))
            }
            Instruction::LdVxDt { x } => self.machine.v_registers[x] = self.machine.dt_register,
            Instruction::LdVxK { x } => self.instr_fx0a(addr, x),
            Instruction::LdDtVx { x } => self.machine.dt_register = self.machine.v_registers[x],
            Instruction::LdStVx { x } => self.machine.st_register = self.machine.v_registers[x],
            Instruction::AddI { x } => {
                self.machine.i_register = self
                    .machine
                    .i_register
                    .wrapping_add(self.machine.v_registers[x] as u16)
            }
            Instruction::LdF { x } => {
                // Font sprites live at address 0
                self.machine.i_register = FONT_GLYPH_SIZE * self.machine.v_registers[x] as u16
            }
            Instruction::LdB { x } => self.instr_fx33(x),
            Instruction::LdMemVx { x } => self.instr_fx55(x),
            Instruction::LdVxMem { x } => self.instr_fx65(x),
        }
    }

    fn skip_if(&mut self, condition: bool) {
        if condition {
            self.machine.skip();
        }
    }
}

// Instruction implementations
impl Cpu {
    /// Execute `CLS` instruction
    fn instr_00e0(&mut self) {
        for pixel in self.machine.screen_buffer.iter_mut() {
            *pixel = false;
        }

        self.screen_dirty = true;
    }

    /// Execute `RET` instruction
    fn instr_00ee(&mut self, addr: u16) {
        match self.machine.pop() {
            Some(return_addr) => self.machine.jump(return_addr),
            None => self.report(Diagnostic::StackUnderflow { addr }),
        }
    }

    /// Execute `CALL addr` instruction
    fn instr_2nnn(&mut self, addr: u16, target: u16) {
        // The pc already holds the address of the instruction after the call
        let return_addr = self.machine.pc_register;

        if self.machine.push(return_addr) {
            self.machine.jump(target);
        } else {
            self.report(Diagnostic::StackOverflow { addr });
        }
    }

    /// Execute `ADD Vx, Vy` instruction
    fn instr_8xy4(&mut self, x: usize, y: usize) {
        let (sum, carry) = self.machine.v_registers[x].overflowing_add(self.machine.v_registers[y]);

        // After performing register addition, VF acts as a carry flag
        self.machine.v_registers[x] = sum;
        self.machine.v_registers[FLAG_REGISTER] = carry as u8;
    }

    /// Execute `SUB Vx, Vy` instruction
    fn instr_8xy5(&mut self, x: usize, y: usize) {
        let (vx, vy) = (self.machine.v_registers[x], self.machine.v_registers[y]);

        // VF is set only when Vx is strictly greater, so equal operands clear it
        self.machine.v_registers[x] = vx.wrapping_sub(vy);
        self.machine.v_registers[FLAG_REGISTER] = (vx > vy) as u8;
    }

    /// Execute `SHR Vx, Vy` instruction
    fn instr_8xy6(&mut self, x: usize, y: usize) {
        let source = self.shift_source(x, y);
        let value = self.machine.v_registers[source];

        // After a shift-right, VF holds the LSB that was shifted
        self.machine.v_registers[x] = value >> 1;
        self.machine.v_registers[FLAG_REGISTER] = value & 1;
    }

    /// Execute `SUBN Vx, Vy` instruction
    fn instr_8xy7(&mut self, x: usize, y: usize) {
        let (vx, vy) = (self.machine.v_registers[x], self.machine.v_registers[y]);

        self.machine.v_registers[x] = vy.wrapping_sub(vx);
        self.machine.v_registers[FLAG_REGISTER] = (vy > vx) as u8;
    }

    /// Execute `SHL Vx, Vy` instruction
    fn instr_8xye(&mut self, x: usize, y: usize) {
        let source = self.shift_source(x, y);
        let value = self.machine.v_registers[source];

        // After a shift-left, VF holds the MSB that was shifted
        self.machine.v_registers[x] = value << 1;
        self.machine.v_registers[FLAG_REGISTER] = (value >> 7) & 1;
    }

    fn shift_source(&self, x: usize, y: usize) -> usize {
        if self.quirks.shift_uses_vy {
            y
        } else {
            x
        }
    }

    /// Execute `DRW Vx, Vy, nibble` instruction
    fn instr_dxyn(&mut self, x: usize, y: usize, height: u8) {
        let sprite_x = (self.machine.v_registers[x] as usize) % SCREEN_WIDTH;
        let sprite_y = (self.machine.v_registers[y] as usize) % SCREEN_HEIGHT;

        // The origin wraps and rows wrap to the top of the screen, but columns past the right
        // edge are clipped.
        self.machine.v_registers[FLAG_REGISTER] = 0;
        let mut collision = false;

        for row in 0..height as u16 {
            // A sprite is a bit-packed representation of a bitmap, as such its width is 8, and
            // the number of bytes is its height.
            let sprite_row = self.machine.read_indexed(row);
            let pixel_y = (sprite_y + row as usize) % SCREEN_HEIGHT;

            for column in 0..8 {
                let pixel_x = sprite_x + column;
                if pixel_x >= SCREEN_WIDTH {
                    break;
                }

                // The MSB is the leftmost pixel
                if sprite_row & (0x80 >> column) == 0 {
                    continue;
                }

                let pixel = &mut self.machine.screen_buffer[pixel_y * SCREEN_WIDTH + pixel_x];
                collision |= *pixel;
                *pixel = !*pixel;
            }
        }

        // When drawing sprites, VF acts as collision flag
        self.machine.v_registers[FLAG_REGISTER] = collision as u8;

        self.screen_dirty = true;
    }

    /// Execute `LD Vx, K` instruction
    fn instr_fx0a(&mut self, addr: u16, x: usize) {
        match self.machine.first_pressed_key() {
            Some(key) => {
                self.machine.v_registers[x] = key;
                self.key_wait = KeyWait::Satisfied;
            }
            None => {
                // Point the pc back at this instruction so the next step executes it again
                self.machine.jump(addr);
                self.key_wait = KeyWait::Waiting { x };
            }
        }
    }

    /// Execute `LD B, Vx` instruction
    fn instr_fx33(&mut self, x: usize) {
        let reg_val = self.machine.v_registers[x];
        self.machine.write_indexed(0, reg_val / 100);
        self.machine.write_indexed(1, (reg_val / 10) % 10);
        self.machine.write_indexed(2, reg_val % 10);
    }

    /// Execute `LD [I], Vx` instruction
    fn instr_fx55(&mut self, last_reg: usize) {
        // Store registers V0 through Vx in memory, starting at address I
        for reg in 0..=last_reg {
            self.machine
                .write_indexed(reg as u16, self.machine.v_registers[reg]);
        }

        self.advance_index_after_transfer(last_reg);
    }

    /// Execute `LD Vx, [I]` instruction
    fn instr_fx65(&mut self, last_reg: usize) {
        // Load registers V0 through Vx from memory, starting at address I
        for reg in 0..=last_reg {
            self.machine.v_registers[reg] = self.machine.read_indexed(reg as u16);
        }

        self.advance_index_after_transfer(last_reg);
    }

    fn advance_index_after_transfer(&mut self, last_reg: usize) {
        // In the original CHIP-8 interpreter, the I register was incremented in the transfer loop.
        // Some newer interpreters don't change the I register.
        if self.quirks.increment_index_on_dump {
            self.machine.i_register = self.machine.i_register.wrapping_add(last_reg as u16 + 1);
        }
    }
}
