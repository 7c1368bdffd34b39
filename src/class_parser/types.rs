use std::fmt::{Display, Formatter};
use std::io::Read;
use crate::class_parser::constants::{CpEntry, FieldRef, MethodRef, NameAndType};
use crate::class_parser::be_reader::BEReader;
use crate::class_parser::ParseError;

pub type U1 = u8;
pub type U2 = u16;
pub type U4 = u32;
pub type U8 = u64;

/// 1-based constant pool index as it appears in the class file. Index 0 is
/// reserved and never valid.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PoolIndex(pub U2);

impl PoolIndex {
    pub fn read(reader: &mut impl Read, what: &'static str) -> Result<PoolIndex, ParseError> {
        Ok(PoolIndex(U2::read(reader, what)?))
    }
}

impl Display for PoolIndex {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug)]
pub struct FieldInfo {
    pub access_flags: U2,
    pub name_index: PoolIndex,
    pub descriptor_index: PoolIndex,
    pub attributes: Vec<AttributeInfo>, // of attributes_count length
}

#[derive(Debug)]
pub struct MethodInfo {
    pub access_flags: U2,
    pub name_index: PoolIndex,
    pub descriptor_index: PoolIndex,
    pub attributes: Vec<AttributeInfo>, // of attributes_count length
}

/// Generic attribute. Consumers reinterpret `info` according to the kind the
/// name index resolves to.
#[derive(Debug, Clone)]
pub struct AttributeInfo {
    pub attribute_name_index: PoolIndex,
    pub attribute_length: U4,
    pub info: Vec<u8>,
}

#[derive(Debug)]
pub struct ParsedClass {
    pub minor_version: U2,
    pub major_version: U2,
    pub constant_pool: Vec<CpEntry>, // of length constant_pool_count-1
    pub access_flags: U2,
    pub this_class: PoolIndex,
    pub super_class: PoolIndex,
    pub interfaces: Vec<PoolIndex>, // of length interfaces_count
    pub fields: Vec<FieldInfo>, // of length fields_count
    pub methods: Vec<MethodInfo>, // of length methods_count
    pub attributes: Vec<AttributeInfo>, // of length attributes_count
}

impl ParsedClass {
    /// The one place the 1-based file index is translated to storage. Every
    /// other lookup goes through here.
    pub fn cp_entry(&self, index: PoolIndex) -> Result<&CpEntry, ParseError> {
        if index.0 == 0 || index.0 as usize > self.constant_pool.len() {
            return Err(ParseError::BadPoolIndex(index.0));
        }

        Ok(&self.constant_pool[index.0 as usize - 1])
    }

    pub fn utf8_at(&self, index: PoolIndex) -> Result<&str, ParseError> {
        self.cp_entry(index)?.as_utf8()
    }

    /// Chases Class -> Utf8.
    pub fn class_name_at(&self, index: PoolIndex) -> Result<&str, ParseError> {
        let name_index = self.cp_entry(index)?.as_class()?;
        self.utf8_at(name_index)
    }

    /// Chases String -> Utf8.
    pub fn string_text_at(&self, index: PoolIndex) -> Result<&str, ParseError> {
        let utf8_index = self.cp_entry(index)?.as_string()?;
        self.utf8_at(utf8_index)
    }

    pub fn name_and_type_at(&self, index: PoolIndex) -> Result<NameAndType, ParseError> {
        self.cp_entry(index)?.as_name_and_type()
    }

    pub fn field_ref_at(&self, index: PoolIndex) -> Result<FieldRef, ParseError> {
        self.cp_entry(index)?.as_field_ref()
    }

    pub fn method_ref_at(&self, index: PoolIndex) -> Result<MethodRef, ParseError> {
        self.cp_entry(index)?.as_method_ref()
    }
}
