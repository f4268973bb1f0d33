use thiserror::Error;

/// Errors raised while placing a program image into memory.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    /// The image does not fit between the program entry point and the end of memory. Nothing is
    /// copied in this case.
    #[error("program is {len} bytes, but only {capacity} bytes fit in memory")]
    ProgramTooLarge { len: usize, capacity: usize },
}

/// Non-fatal conditions observed while executing a program. These never stop the cpu; they are
/// queued for the driver and logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Diagnostic {
    #[error("unknown instruction {word:#06X} at {addr:#05X}")]
    UnknownInstruction { addr: u16, word: u16 },

    /// `CALL` with every stack slot in use. The call is not taken.
    #[error("call stack overflow at {addr:#05X}, call ignored")]
    StackOverflow { addr: u16 },

    /// `RET` with an empty stack. Execution continues after the `RET`.
    #[error("call stack underflow at {addr:#05X}, return ignored")]
    StackUnderflow { addr: u16 },
}

impl Diagnostic {
    /// Address of the instruction that raised the condition.
    pub fn addr(&self) -> u16 {
        match *self {
            Diagnostic::UnknownInstruction { addr, .. }
            | Diagnostic::StackOverflow { addr }
            | Diagnostic::StackUnderflow { addr } => addr,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_error_message() {
        let err = LoadError::ProgramTooLarge { len: 4000, capacity: 3584 };
        assert_eq!(err.to_string(), "program is 4000 bytes, but only 3584 bytes fit in memory");
    }

    #[test]
    fn diagnostic_message_and_addr() {
        let diag = Diagnostic::UnknownInstruction { addr: 0x204, word: 0x5121 };
        assert_eq!(diag.to_string(), "unknown instruction 0x5121 at 0x204");
        assert_eq!(diag.addr(), 0x204);
        assert_eq!(Diagnostic::StackUnderflow { addr: 0x3FE }.addr(), 0x3FE);
    }
}
