use num_enum::TryFromPrimitive;
use strum_macros::Display;

/// Supported opcodes. Every other byte value is rejected by the dispatch
/// loop rather than skipped, since operand widths are opcode-specific.
#[derive(TryFromPrimitive, Display, Debug, Copy, Clone, PartialEq, Eq)]
#[repr(u8)]
#[strum(serialize_all = "lowercase")]
pub enum Opcode {
    Ldc = 18,
    Return = 177,
    Getstatic = 178,
    Invokevirtual = 182,
}

/// Fixed operand-byte count following the opcode byte.
pub const fn operand_count(op: Opcode) -> usize {
    match op {
        Opcode::Ldc => 1,
        Opcode::Return => 0,
        Opcode::Getstatic | Opcode::Invokevirtual => 2,
    }
}

#[cfg(test)]
mod test {
    use crate::vm::instructions::{operand_count, Opcode};

    #[test]
    fn operand_widths() {
        assert_eq!(operand_count(Opcode::Ldc), 1);
        assert_eq!(operand_count(Opcode::Return), 0);
        assert_eq!(operand_count(Opcode::Getstatic), 2);
        assert_eq!(operand_count(Opcode::Invokevirtual), 2);
    }

    #[test]
    fn decodes_known_bytes_only() {
        assert_eq!(Opcode::try_from(178).unwrap(), Opcode::Getstatic);
        assert!(Opcode::try_from(0).is_err()); // nop is not supported
        assert!(Opcode::try_from(179).is_err()); // putstatic is not supported
    }

    #[test]
    fn renders_mnemonics() {
        assert_eq!(Opcode::Invokevirtual.to_string(), "invokevirtual");
    }
}
