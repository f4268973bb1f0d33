use std::fmt;

/// A decoded CHIP-8 instruction. Register operands are indices 0..=0xF.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    /// `00E0`
    Cls,
    /// `00EE`
    Ret,
    /// `0nnn`, a machine code routine on the original hardware. Ignored.
    Sys { addr: u16 },
    /// `1nnn`
    Jp { addr: u16 },
    /// `2nnn`
    Call { addr: u16 },
    /// `3xkk`
    SeByte { x: usize, byte: u8 },
    /// `4xkk`
    SneByte { x: usize, byte: u8 },
    /// `5xy0`
    SeReg { x: usize, y: usize },
    /// `6xkk`
    LdByte { x: usize, byte: u8 },
    /// `7xkk`
    AddByte { x: usize, byte: u8 },
    /// `8xy0`
    LdReg { x: usize, y: usize },
    /// `8xy1`
    Or { x: usize, y: usize },
    /// `8xy2`
    And { x: usize, y: usize },
    /// `8xy3`
    Xor { x: usize, y: usize },
    /// `8xy4`
    AddReg { x: usize, y: usize },
    /// `8xy5`
    Sub { x: usize, y: usize },
    /// `8xy6`
    Shr { x: usize, y: usize },
    /// `8xy7`
    Subn { x: usize, y: usize },
    /// `8xyE`
    Shl { x: usize, y: usize },
    /// `9xy0`
    SneReg { x: usize, y: usize },
    /// `Annn`
    LdI { addr: u16 },
    /// `Bnnn`
    JpV0 { addr: u16 },
    /// `Cxkk`
    Rnd { x: usize, byte: u8 },
    /// `Dxyn`
    Drw { x: usize, y: usize, height: u8 },
    /// `Ex9E`
    Skp { x: usize },
    /// `ExA1`
    Sknp { x: usize },
    /// `Fx07`
    LdVxDt { x: usize },
    /// `Fx0A`
    LdVxK { x: usize },
    /// `Fx15`
    LdDtVx { x: usize },
    /// `Fx18`
    LdStVx { x: usize },
    /// `Fx1E`
    AddI { x: usize },
    /// `Fx29`
    LdF { x: usize },
    /// `Fx33`
    LdB { x: usize },
    /// `Fx55`
    LdMemVx { x: usize },
    /// `Fx65`
    LdVxMem { x: usize },
}

impl Instruction {
    /// Decode an instruction word, or `None` if it isn't a known instruction.
    ///
    /// The instruction type is determined by the most significant nibble. The `0`, `8`, `E` and
    /// `F` families share a nibble between several instructions and are disambiguated by their own
    /// handlers.
    pub fn decode(instr: u16) -> Option<Instruction> {
        let x = decode_instr_x_reg(instr);
        let y = decode_instr_y_reg(instr);
        let byte = decode_instr_byte_imm(instr);
        let addr = decode_instr_addr(instr);

        match decode_instr_family(instr) {
            0x0 => decode_sys_family(instr),
            0x1 => Some(Instruction::Jp { addr }),
            0x2 => Some(Instruction::Call { addr }),
            0x3 => Some(Instruction::SeByte { x, byte }),
            0x4 => Some(Instruction::SneByte { x, byte }),
            0x5 if decode_instr_nibble_imm(instr) == 0 => Some(Instruction::SeReg { x, y }),
            0x6 => Some(Instruction::LdByte { x, byte }),
            0x7 => Some(Instruction::AddByte { x, byte }),
            0x8 => decode_alu_family(instr),
            0x9 if decode_instr_nibble_imm(instr) == 0 => Some(Instruction::SneReg { x, y }),
            0xA => Some(Instruction::LdI { addr }),
            0xB => Some(Instruction::JpV0 { addr }),
            0xC => Some(Instruction::Rnd { x, byte }),
            0xD => Some(Instruction::Drw {
                x,
                y,
                height: decode_instr_nibble_imm(instr),
            }),
            0xE => decode_key_family(instr),
            0xF => decode_misc_family(instr),
            _ => None,
        }
    }
}

/// `0nnn`: the two fixed words first, everything else is a `SYS` call.
fn decode_sys_family(instr: u16) -> Option<Instruction> {
    match instr {
        0x00E0 => Some(Instruction::Cls),
        0x00EE => Some(Instruction::Ret),
        _ => Some(Instruction::Sys {
            addr: decode_instr_addr(instr),
        }),
    }
}

/// `8xyT`: arithmetic and logic operations, where the last nibble determines the operation.
fn decode_alu_family(instr: u16) -> Option<Instruction> {
    let x = decode_instr_x_reg(instr);
    let y = decode_instr_y_reg(instr);

    match decode_instr_nibble_imm(instr) {
        0x0 => Some(Instruction::LdReg { x, y }),
        0x1 => Some(Instruction::Or { x, y }),
        0x2 => Some(Instruction::And { x, y }),
        0x3 => Some(Instruction::Xor { x, y }),
        0x4 => Some(Instruction::AddReg { x, y }),
        0x5 => Some(Instruction::Sub { x, y }),
        0x6 => Some(Instruction::Shr { x, y }),
        0x7 => Some(Instruction::Subn { x, y }),
        0xE => Some(Instruction::Shl { x, y }),
        _ => None,
    }
}

/// `ExTT`: keyboard flow-control, where the last byte determines the instruction.
fn decode_key_family(instr: u16) -> Option<Instruction> {
    let x = decode_instr_x_reg(instr);

    match decode_instr_byte_imm(instr) {
        0x9E => Some(Instruction::Skp { x }),
        0xA1 => Some(Instruction::Sknp { x }),
        _ => None,
    }
}

/// `FxTT`: timers, the index register and memory transfers, where the last byte determines the
/// instruction.
fn decode_misc_family(instr: u16) -> Option<Instruction> {
    let x = decode_instr_x_reg(instr);

    match decode_instr_byte_imm(instr) {
        0x07 => Some(Instruction::LdVxDt { x }),
        0x0A => Some(Instruction::LdVxK { x }),
        0x15 => Some(Instruction::LdDtVx { x }),
        0x18 => Some(Instruction::LdStVx { x }),
        0x1E => Some(Instruction::AddI { x }),
        0x29 => Some(Instruction::LdF { x }),
        0x33 => Some(Instruction::LdB { x }),
        0x55 => Some(Instruction::LdMemVx { x }),
        0x65 => Some(Instruction::LdVxMem { x }),
        _ => None,
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Instruction::Cls => write!(f, "CLS"),
            Instruction::Ret => write!(f, "RET"),
            Instruction::Sys { addr } => write!(f, "SYS {:#05X}", addr),
            Instruction::Jp { addr } => write!(f, "JP {:#05X}", addr),
            Instruction::Call { addr } => write!(f, "CALL {:#05X}", addr),
            Instruction::SeByte { x, byte } => write!(f, "SE V{:X}, {:#04X}", x, byte),
            Instruction::SneByte { x, byte } => write!(f, "SNE V{:X}, {:#04X}", x, byte),
            Instruction::SeReg { x, y } => write!(f, "SE V{:X}, V{:X}", x, y),
            Instruction::LdByte { x, byte } => write!(f, "LD V{:X}, {:#04X}", x, byte),
            Instruction::AddByte { x, byte } => write!(f, "ADD V{:X}, {:#04X}", x, byte),
            Instruction::LdReg { x, y } => write!(f, "LD V{:X}, V{:X}", x, y),
            Instruction::Or { x, y } => write!(f, "OR V{:X}, V{:X}", x, y),
            Instruction::And { x, y } => write!(f, "AND V{:X}, V{:X}", x, y),
            Instruction::Xor { x, y } => write!(f, "XOR V{:X}, V{:X}", x, y),
            Instruction::AddReg { x, y } => write!(f, "ADD V{:X}, V{:X}", x, y),
            Instruction::Sub { x, y } => write!(f, "SUB V{:X}, V{:X}", x, y),
            Instruction::Shr { x, y } => write!(f, "SHR V{:X}, V{:X}", x, y),
            Instruction::Subn { x, y } => write!(f, "SUBN V{:X}, V{:X}", x, y),
            Instruction::Shl { x, y } => write!(f, "SHL V{:X}, V{:X}", x, y),
            Instruction::SneReg { x, y } => write!(f, "SNE V{:X}, V{:X}", x, y),
            Instruction::LdI { addr } => write!(f, "LD I, {:#05X}", addr),
            Instruction::JpV0 { addr } => write!(f, "JP V0, {:#05X}", addr),
            Instruction::Rnd { x, byte } => write!(f, "RND V{:X}, {:#04X}", x, byte),
            Instruction::Drw { x, y, height } => write!(f, "DRW V{:X}, V{:X}, {}", x, y, height),
            Instruction::Skp { x } => write!(f, "SKP V{:X}", x),
            Instruction::Sknp { x } => write!(f, "SKNP V{:X}", x),
            Instruction::LdVxDt { x } => write!(f, "LD V{:X}, DT", x),
            Instruction::LdVxK { x } => write!(f, "LD V{:X}, K", x),
            Instruction::LdDtVx { x } => write!(f, "LD DT, V{:X}", x),
            Instruction::LdStVx { x } => write!(f, "LD ST, V{:X}", x),
            Instruction::AddI { x } => write!(f, "ADD I, V{:X}", x),
            Instruction::LdF { x } => write!(f, "LD F, V{:X}", x),
            Instruction::LdB { x } => write!(f, "LD B, V{:X}", x),
            Instruction::LdMemVx { x } => write!(f, "LD [I], V{:X}", x),
            Instruction::LdVxMem { x } => write!(f, "LD V{:X}, [I]", x),
        }
    }
}

/// Decodes the instruction family (most significant nibble) from a CHIP-8 instruction
pub fn decode_instr_family(instr: u16) -> u8 {
    ((instr & 0xF000) >> 12) as u8
}

/// Decodes a memory address from a CHIP-8 instruction
pub fn decode_instr_addr(instr: u16) -> u16 {
    instr & 0x0FFF
}

/// Decodes the first register from a CHIP-8 instruction
pub fn decode_instr_x_reg(instr: u16) -> usize {
    ((instr & 0x0F00) >> 8) as usize
}

/// Decodes the second register from a CHIP-8 instruction
pub fn decode_instr_y_reg(instr: u16) -> usize {
    ((instr & 0x00F0) >> 4) as usize
}

/// Decodes a byte-sized immediate from a CHIP-8 instruction
pub fn decode_instr_byte_imm(instr: u16) -> u8 {
    (instr & 0x00FF) as u8
}

/// Decodes a nibble-sized immediate from a CHIP-8 instruction
pub fn decode_instr_nibble_imm(instr: u16) -> u8 {
    (instr & 0x000F) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operand_fields() {
        let instr = 0xD123;
        assert_eq!(decode_instr_family(instr), 0xD);
        assert_eq!(decode_instr_x_reg(instr), 1);
        assert_eq!(decode_instr_y_reg(instr), 2);
        assert_eq!(decode_instr_nibble_imm(instr), 3);
        assert_eq!(decode_instr_byte_imm(instr), 0x23);
        assert_eq!(decode_instr_addr(instr), 0x123);
    }

    #[test]
    fn decodes_every_family() {
        assert_eq!(Instruction::decode(0x00E0), Some(Instruction::Cls));
        assert_eq!(Instruction::decode(0x00EE), Some(Instruction::Ret));
        assert_eq!(Instruction::decode(0x0123), Some(Instruction::Sys { addr: 0x123 }));
        assert_eq!(Instruction::decode(0x1ABC), Some(Instruction::Jp { addr: 0xABC }));
        assert_eq!(Instruction::decode(0x2ABC), Some(Instruction::Call { addr: 0xABC }));
        assert_eq!(Instruction::decode(0x3A42), Some(Instruction::SeByte { x: 0xA, byte: 0x42 }));
        assert_eq!(Instruction::decode(0x5AB0), Some(Instruction::SeReg { x: 0xA, y: 0xB }));
        assert_eq!(Instruction::decode(0x8AB6), Some(Instruction::Shr { x: 0xA, y: 0xB }));
        assert_eq!(Instruction::decode(0x8ABE), Some(Instruction::Shl { x: 0xA, y: 0xB }));
        assert_eq!(Instruction::decode(0x9AB0), Some(Instruction::SneReg { x: 0xA, y: 0xB }));
        assert_eq!(Instruction::decode(0xB300), Some(Instruction::JpV0 { addr: 0x300 }));
        assert_eq!(
            Instruction::decode(0xD12F),
            Some(Instruction::Drw { x: 1, y: 2, height: 0xF })
        );
        assert_eq!(Instruction::decode(0xE59E), Some(Instruction::Skp { x: 5 }));
        assert_eq!(Instruction::decode(0xE5A1), Some(Instruction::Sknp { x: 5 }));
        assert_eq!(Instruction::decode(0xF50A), Some(Instruction::LdVxK { x: 5 }));
        assert_eq!(Instruction::decode(0xF565), Some(Instruction::LdVxMem { x: 5 }));
    }

    #[test]
    fn rejects_unknown_words() {
        for &instr in &[0x5121, 0x912F, 0x8008, 0x800F, 0xE000, 0xE0A2, 0xF000, 0xF0FF, 0xF09E] {
            assert_eq!(Instruction::decode(instr), None, "{:#06X}", instr);
        }
    }

    #[test]
    fn key_family_does_not_fall_into_misc_family() {
        // FxTT suffixes must not be accepted under the E prefix and vice versa
        assert_eq!(Instruction::decode(0xE107), None);
        assert_eq!(Instruction::decode(0xF1A1), None);
    }

    #[test]
    fn every_known_instruction_counts_to_35() {
        let mut kinds = std::collections::HashSet::new();
        for instr in 0..=0xFFFFu16 {
            if let Some(decoded) = Instruction::decode(instr) {
                kinds.insert(std::mem::discriminant(&decoded));
            }
        }
        assert_eq!(kinds.len(), 35);
    }

    #[test]
    fn mnemonics() {
        assert_eq!(Instruction::decode(0x00E0).unwrap().to_string(), "CLS");
        assert_eq!(Instruction::decode(0x1200).unwrap().to_string(), "JP 0x200");
        assert_eq!(Instruction::decode(0x612A).unwrap().to_string(), "LD V1, 0x2A");
        assert_eq!(Instruction::decode(0xD015).unwrap().to_string(), "DRW V0, V1, 5");
        assert_eq!(Instruction::decode(0xFA55).unwrap().to_string(), "LD [I], VA");
    }
}
