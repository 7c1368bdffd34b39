use std::io::Read;
use crate::class_parser::ParseError;

/// Reads exactly `buf.len()` bytes. A short read surfaces as `Truncated` so
/// it stays distinguishable from other I/O failures; `what` names the field
/// being read for the error chain.
pub fn read_full(reader: &mut impl Read, buf: &mut [u8], what: &'static str) -> Result<(), ParseError> {
    reader.read_exact(buf).map_err(|e| match e.kind() {
        std::io::ErrorKind::UnexpectedEof => ParseError::Truncated { what },
        _ => ParseError::Io { what, source: e },
    })
}

pub trait BEReader<const N: usize> : Sized {
    fn from_byte_array(buf: [u8; N]) -> Self;

    fn read(reader: &mut impl Read, what: &'static str) -> Result<Self, ParseError> {
        let mut buf = [0u8; N];
        read_full(reader, &mut buf, what)?;

        Ok(Self::from_byte_array(buf))
    }
}

// We can't abstract over from_be_bytes, because no specific trait implements
// it, so we have to resort to macros
macro_rules! be_reader {
    ($t: ty, $n: expr) => {
        impl BEReader<$n> for $t {
            fn from_byte_array(buf: [u8; $n]) -> Self {
                <$t>::from_be_bytes(buf)
            }
        }
    }
}

be_reader!(u8, 1);
be_reader!(u16, 2);
be_reader!(u32, 4);
be_reader!(u64, 8);
