use std::io::Read;
use num_enum::TryFromPrimitive;
use strum_macros::Display;
use crate::class_parser::be_reader::{read_full, BEReader};
use crate::class_parser::types::{PoolIndex, U1, U2, U4, U8};
use crate::class_parser::ParseError;

#[derive(TryFromPrimitive, Display, Debug, Copy, Clone, PartialEq, Eq)]
#[repr(u8)]
pub enum CpTag {
    Utf8 = 1,
    Integer = 3,
    Float = 4,
    Long = 5,
    Double = 6,
    Class = 7,
    String = 8,
    Fieldref = 9,
    Methodref = 10,
    InterfaceMethodref = 11,
    NameAndType = 12,
    MethodHandle = 15,
    MethodType = 16,
    Dynamic = 17,
    InvokeDynamic = 18,
    Module = 19,
    Package = 20,
}

/// One constant pool entry. The payload shape is fixed by the tag; an entry
/// is only reinterpreted through the checked `as_*` projections below.
#[derive(Debug, Clone, PartialEq)]
pub enum CpEntry {
    Utf8(String),
    Integer(i32),
    Float(f32),
    Long(i64),
    Double(f64),
    Class { name_index: PoolIndex },
    String { utf8_index: PoolIndex },
    Fieldref { class_index: PoolIndex, name_and_type_index: PoolIndex },
    Methodref { class_index: PoolIndex, name_and_type_index: PoolIndex },
    InterfaceMethodref { class_index: PoolIndex, name_and_type_index: PoolIndex },
    NameAndType { name_index: PoolIndex, descriptor_index: PoolIndex },
    MethodHandle { reference_kind: U1, reference_index: PoolIndex },
    MethodType { descriptor_index: PoolIndex },
    Dynamic { bootstrap_method_attr_index: U2, name_and_type_index: PoolIndex },
    InvokeDynamic { bootstrap_method_attr_index: U2, name_and_type_index: PoolIndex },
    Module { name_index: PoolIndex },
    Package { name_index: PoolIndex },
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct FieldRef {
    pub class_index: PoolIndex,
    pub name_and_type_index: PoolIndex,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct MethodRef {
    pub class_index: PoolIndex,
    pub name_and_type_index: PoolIndex,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct NameAndType {
    pub name_index: PoolIndex,
    pub descriptor_index: PoolIndex,
}

/// Decodes a single tag-prefixed entry. The payload of entry `i` is fully
/// consumed before entry `i + 1` can begin; an unknown tag byte is a hard
/// error because the payload width cannot be inferred without it.
pub fn read_cp_entry(reader: &mut impl Read) -> Result<CpEntry, ParseError> {
    let tag = U1::read(reader, "constant tag")?;
    let tag = CpTag::try_from(tag).map_err(|e| ParseError::UnknownConstantTag(e.number))?;

    let entry = match tag {
        CpTag::Utf8 => {
            let length = U2::read(reader, "utf8 length")?;
            let mut buf = vec![0; length as usize];
            read_full(reader, &mut buf, "utf8 bytes")?;
            CpEntry::Utf8(String::from_utf8(buf)?)
        }
        CpTag::Integer => CpEntry::Integer(U4::read(reader, "integer constant")? as i32),
        CpTag::Float => CpEntry::Float(f32::from_bits(U4::read(reader, "float constant")?)),
        CpTag::Long => CpEntry::Long(U8::read(reader, "long constant")? as i64),
        CpTag::Double => CpEntry::Double(f64::from_bits(U8::read(reader, "double constant")?)),
        CpTag::Class => CpEntry::Class {
            name_index: PoolIndex::read(reader, "class name index")?,
        },
        CpTag::String => CpEntry::String {
            utf8_index: PoolIndex::read(reader, "string utf8 index")?,
        },
        CpTag::Fieldref => CpEntry::Fieldref {
            class_index: PoolIndex::read(reader, "fieldref class index")?,
            name_and_type_index: PoolIndex::read(reader, "fieldref name and type index")?,
        },
        CpTag::Methodref => CpEntry::Methodref {
            class_index: PoolIndex::read(reader, "methodref class index")?,
            name_and_type_index: PoolIndex::read(reader, "methodref name and type index")?,
        },
        CpTag::InterfaceMethodref => CpEntry::InterfaceMethodref {
            class_index: PoolIndex::read(reader, "interface methodref class index")?,
            name_and_type_index: PoolIndex::read(reader, "interface methodref name and type index")?,
        },
        CpTag::NameAndType => CpEntry::NameAndType {
            name_index: PoolIndex::read(reader, "name index")?,
            descriptor_index: PoolIndex::read(reader, "descriptor index")?,
        },
        CpTag::MethodHandle => CpEntry::MethodHandle {
            reference_kind: U1::read(reader, "method handle kind")?,
            reference_index: PoolIndex::read(reader, "method handle reference index")?,
        },
        CpTag::MethodType => CpEntry::MethodType {
            descriptor_index: PoolIndex::read(reader, "method type descriptor index")?,
        },
        CpTag::Dynamic => CpEntry::Dynamic {
            bootstrap_method_attr_index: U2::read(reader, "dynamic bootstrap index")?,
            name_and_type_index: PoolIndex::read(reader, "dynamic name and type index")?,
        },
        CpTag::InvokeDynamic => CpEntry::InvokeDynamic {
            bootstrap_method_attr_index: U2::read(reader, "invokedynamic bootstrap index")?,
            name_and_type_index: PoolIndex::read(reader, "invokedynamic name and type index")?,
        },
        CpTag::Module => CpEntry::Module {
            name_index: PoolIndex::read(reader, "module name index")?,
        },
        CpTag::Package => CpEntry::Package {
            name_index: PoolIndex::read(reader, "package name index")?,
        },
    };

    Ok(entry)
}

impl CpEntry {
    pub fn tag(&self) -> CpTag {
        match self {
            CpEntry::Utf8(_) => CpTag::Utf8,
            CpEntry::Integer(_) => CpTag::Integer,
            CpEntry::Float(_) => CpTag::Float,
            CpEntry::Long(_) => CpTag::Long,
            CpEntry::Double(_) => CpTag::Double,
            CpEntry::Class { .. } => CpTag::Class,
            CpEntry::String { .. } => CpTag::String,
            CpEntry::Fieldref { .. } => CpTag::Fieldref,
            CpEntry::Methodref { .. } => CpTag::Methodref,
            CpEntry::InterfaceMethodref { .. } => CpTag::InterfaceMethodref,
            CpEntry::NameAndType { .. } => CpTag::NameAndType,
            CpEntry::MethodHandle { .. } => CpTag::MethodHandle,
            CpEntry::MethodType { .. } => CpTag::MethodType,
            CpEntry::Dynamic { .. } => CpTag::Dynamic,
            CpEntry::InvokeDynamic { .. } => CpTag::InvokeDynamic,
            CpEntry::Module { .. } => CpTag::Module,
            CpEntry::Package { .. } => CpTag::Package,
        }
    }

    fn mismatch<T>(&self, expected: CpTag) -> Result<T, ParseError> {
        Err(ParseError::TagMismatch { expected, found: self.tag() })
    }

    pub fn as_utf8(&self) -> Result<&str, ParseError> {
        match self {
            CpEntry::Utf8(text) => Ok(text),
            other => other.mismatch(CpTag::Utf8),
        }
    }

    /// Utf8 index carried by a String entry.
    pub fn as_string(&self) -> Result<PoolIndex, ParseError> {
        match self {
            CpEntry::String { utf8_index } => Ok(*utf8_index),
            other => other.mismatch(CpTag::String),
        }
    }

    /// Name index carried by a Class entry.
    pub fn as_class(&self) -> Result<PoolIndex, ParseError> {
        match self {
            CpEntry::Class { name_index } => Ok(*name_index),
            other => other.mismatch(CpTag::Class),
        }
    }

    pub fn as_field_ref(&self) -> Result<FieldRef, ParseError> {
        match self {
            CpEntry::Fieldref { class_index, name_and_type_index } => Ok(FieldRef {
                class_index: *class_index,
                name_and_type_index: *name_and_type_index,
            }),
            other => other.mismatch(CpTag::Fieldref),
        }
    }

    pub fn as_method_ref(&self) -> Result<MethodRef, ParseError> {
        match self {
            CpEntry::Methodref { class_index, name_and_type_index } => Ok(MethodRef {
                class_index: *class_index,
                name_and_type_index: *name_and_type_index,
            }),
            other => other.mismatch(CpTag::Methodref),
        }
    }

    pub fn as_name_and_type(&self) -> Result<NameAndType, ParseError> {
        match self {
            CpEntry::NameAndType { name_index, descriptor_index } => Ok(NameAndType {
                name_index: *name_index,
                descriptor_index: *descriptor_index,
            }),
            other => other.mismatch(CpTag::NameAndType),
        }
    }
}

#[cfg(test)]
mod test {
    use std::io::Cursor;
    use crate::class_parser::constants::{read_cp_entry, CpEntry, CpTag};
    use crate::class_parser::types::PoolIndex;
    use crate::class_parser::ParseError;

    fn decode(bytes: &[u8]) -> Result<CpEntry, ParseError> {
        read_cp_entry(&mut Cursor::new(bytes))
    }

    #[test]
    fn decodes_utf8_entry() {
        let entry = decode(&[1, 0, 4, b'm', b'a', b'i', b'n']).unwrap();
        assert_eq!(entry, CpEntry::Utf8("main".to_string()));
    }

    #[test]
    fn decodes_ref_entries() {
        let entry = decode(&[9, 0, 2, 0, 7]).unwrap();
        assert_eq!(entry, CpEntry::Fieldref {
            class_index: PoolIndex(2),
            name_and_type_index: PoolIndex(7),
        });

        let entry = decode(&[7, 0, 3]).unwrap();
        assert_eq!(entry, CpEntry::Class { name_index: PoolIndex(3) });
    }

    #[test]
    fn decodes_wide_literals() {
        let entry = decode(&[5, 0, 0, 0, 0, 0, 0, 0, 42]).unwrap();
        assert_eq!(entry, CpEntry::Long(42));

        let bits = 2.5f64.to_bits().to_be_bytes();
        let mut bytes = vec![6];
        bytes.extend_from_slice(&bits);
        let entry = decode(&bytes).unwrap();
        assert_eq!(entry, CpEntry::Double(2.5));
    }

    #[test]
    fn unknown_tag_is_rejected() {
        let err = decode(&[99, 0, 0]).unwrap_err();
        assert!(matches!(err, ParseError::UnknownConstantTag(99)));
    }

    #[test]
    fn truncated_payload_fails_at_entry() {
        let err = decode(&[1, 0, 10, b'x']).unwrap_err();
        assert!(matches!(err, ParseError::Truncated { .. }));
    }

    #[test]
    fn projections_reject_wrong_tags() {
        let string = decode(&[8, 0, 3]).unwrap();

        // every wrong-shape projection fails, and keeps failing
        assert!(matches!(string.as_utf8(),
            Err(ParseError::TagMismatch { expected: CpTag::Utf8, found: CpTag::String })));
        assert!(matches!(string.as_field_ref(), Err(ParseError::TagMismatch { .. })));
        assert!(matches!(string.as_method_ref(), Err(ParseError::TagMismatch { .. })));
        assert!(matches!(string.as_class(), Err(ParseError::TagMismatch { .. })));
        assert!(matches!(string.as_name_and_type(), Err(ParseError::TagMismatch { .. })));
        assert_eq!(string.as_string().unwrap(), PoolIndex(3));
    }
}
