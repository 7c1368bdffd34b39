use std::io::{Cursor, Read};
use std::string::FromUtf8Error;
use log::debug;
use thiserror::Error;
use crate::class_parser::be_reader::{read_full, BEReader};
use crate::class_parser::constants::{read_cp_entry, CpTag};
use crate::class_parser::types::{AttributeInfo, FieldInfo, MethodInfo, ParsedClass, PoolIndex, U2, U4};

pub mod be_reader;
pub mod code;
pub mod constants;
pub mod types;

pub const CLASS_MAGIC: U4 = 0xCAFE_BABE;
pub const SUPPORTED_MINOR_VERSION: U2 = 0;
pub const SUPPORTED_MAJOR_VERSION: U2 = 55;

/// Decode failures. Record-level variants wrap the inner failure with the
/// index at which it occurred; a short read or bad tag invalidates all later
/// offsets, so nothing is recoverable below the top-level caller.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("{what}: truncated input")]
    Truncated { what: &'static str },
    #[error("{what}: {source}")]
    Io { what: &'static str, source: std::io::Error },
    #[error("invalid magic number")]
    InvalidMagic,
    #[error("unsupported class file version {major}.{minor}")]
    UnsupportedVersion { minor: U2, major: U2 },
    #[error("constant pool count must be at least 1")]
    InvalidPoolCount,
    #[error("unknown constant tag {0}")]
    UnknownConstantTag(u8),
    #[error("malformed utf8 constant: {0}")]
    MalformedUtf8(#[from] FromUtf8Error),
    #[error("constant pool entry {index}: {source}")]
    PoolEntry { index: u16, source: Box<ParseError> },
    #[error("interface {index}: {source}")]
    Interface { index: u16, source: Box<ParseError> },
    #[error("field {index}: {source}")]
    Field { index: u16, source: Box<ParseError> },
    #[error("method {index}: {source}")]
    Method { index: u16, source: Box<ParseError> },
    #[error("attribute {index}: {source}")]
    Attribute { index: u16, source: Box<ParseError> },
    #[error("exception table entry {index}: {source}")]
    Exception { index: u16, source: Box<ParseError> },
    #[error("constant pool index {0} is out of range")]
    BadPoolIndex(u16),
    #[error("constant pool entry is {found}, expected {expected}")]
    TagMismatch { expected: CpTag, found: CpTag },
    #[error("class file is longer than expected")]
    TrailingBytes,
}

fn parse_field_info(reader: &mut impl Read) -> Result<FieldInfo, ParseError> {
    let access_flags = U2::read(reader, "field access flags")?;
    let name_index = PoolIndex::read(reader, "field name index")?;
    let descriptor_index = PoolIndex::read(reader, "field descriptor index")?;
    let attributes = parse_attribute_table(reader)?;

    Ok(FieldInfo {
        access_flags,
        name_index,
        descriptor_index,
        attributes,
    })
}

fn parse_method_info(reader: &mut impl Read) -> Result<MethodInfo, ParseError> {
    let access_flags = U2::read(reader, "method access flags")?;
    let name_index = PoolIndex::read(reader, "method name index")?;
    let descriptor_index = PoolIndex::read(reader, "method descriptor index")?;
    let attributes = parse_attribute_table(reader)?;

    Ok(MethodInfo {
        access_flags,
        name_index,
        descriptor_index,
        attributes,
    })
}

pub(crate) fn parse_attribute_info(reader: &mut impl Read) -> Result<AttributeInfo, ParseError> {
    let attribute_name_index = PoolIndex::read(reader, "attribute name index")?;
    let attribute_length = U4::read(reader, "attribute length")?;

    let mut info = vec![0; attribute_length as usize];
    read_full(reader, &mut info, "attribute payload")?;

    Ok(AttributeInfo {
        attribute_name_index,
        attribute_length,
        info,
    })
}

/// Count-prefixed attribute table, the shape shared by the class itself,
/// fields, methods and the Code attribute.
pub(crate) fn parse_attribute_table(reader: &mut impl Read) -> Result<Vec<AttributeInfo>, ParseError> {
    let attributes_count = U2::read(reader, "attributes count")?;
    let mut attributes = Vec::with_capacity(attributes_count as usize);
    for i in 0..attributes_count {
        let attribute = parse_attribute_info(reader)
            .map_err(|e| ParseError::Attribute { index: i, source: Box::new(e) })?;
        attributes.push(attribute);
    }

    Ok(attributes)
}

/// Decodes a complete class file image. The whole decode fails on the first
/// nested failure; there are no partial results.
pub fn parse_class(buf: &[u8]) -> Result<ParsedClass, ParseError> {
    let mut cursor = Cursor::new(buf);

    let magic = U4::read(&mut cursor, "magic number")?;
    if magic != CLASS_MAGIC {
        return Err(ParseError::InvalidMagic);
    }

    let minor_version = U2::read(&mut cursor, "minor version")?;
    let major_version = U2::read(&mut cursor, "major version")?;
    if (minor_version, major_version) != (SUPPORTED_MINOR_VERSION, SUPPORTED_MAJOR_VERSION) {
        return Err(ParseError::UnsupportedVersion { minor: minor_version, major: major_version });
    }

    let constant_pool_count = U2::read(&mut cursor, "constant pool count")?;
    if constant_pool_count == 0 {
        return Err(ParseError::InvalidPoolCount);
    }

    // the file stores constant_pool_count - 1 entries
    let mut constant_pool = Vec::with_capacity(constant_pool_count as usize - 1);
    for i in 0..constant_pool_count - 1 {
        let entry = read_cp_entry(&mut cursor)
            .map_err(|e| ParseError::PoolEntry { index: i + 1, source: Box::new(e) })?;
        constant_pool.push(entry);
    }
    debug!("decoded {} constant pool entries", constant_pool.len());

    let access_flags = U2::read(&mut cursor, "access flags")?;
    let this_class = PoolIndex::read(&mut cursor, "this class")?;
    let super_class = PoolIndex::read(&mut cursor, "super class")?;

    let interfaces_count = U2::read(&mut cursor, "interfaces count")?;
    let mut interfaces = Vec::with_capacity(interfaces_count as usize);
    for i in 0..interfaces_count {
        let index = PoolIndex::read(&mut cursor, "interface index")
            .map_err(|e| ParseError::Interface { index: i, source: Box::new(e) })?;
        interfaces.push(index);
    }

    let fields_count = U2::read(&mut cursor, "fields count")?;
    let mut fields = Vec::with_capacity(fields_count as usize);
    for i in 0..fields_count {
        let field = parse_field_info(&mut cursor)
            .map_err(|e| ParseError::Field { index: i, source: Box::new(e) })?;
        fields.push(field);
    }

    let methods_count = U2::read(&mut cursor, "methods count")?;
    let mut methods = Vec::with_capacity(methods_count as usize);
    for i in 0..methods_count {
        let method = parse_method_info(&mut cursor)
            .map_err(|e| ParseError::Method { index: i, source: Box::new(e) })?;
        methods.push(method);
    }

    let attributes = parse_attribute_table(&mut cursor)?;

    let mut rest = Vec::new();
    cursor.read_to_end(&mut rest)
        .map_err(|e| ParseError::Io { what: "trailing bytes", source: e })?;
    if !rest.is_empty() {
        return Err(ParseError::TrailingBytes);
    }

    debug!("parsed class file: {} fields, {} methods, {} class attributes",
           fields.len(), methods.len(), attributes.len());

    Ok(ParsedClass {
        minor_version,
        major_version,
        constant_pool,
        access_flags,
        this_class,
        super_class,
        interfaces,
        fields,
        methods,
        attributes,
    })
}
