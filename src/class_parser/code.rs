use std::io::{Cursor, Read};
use crate::class_parser::be_reader::{read_full, BEReader};
use crate::class_parser::types::{AttributeInfo, U2, U4};
use crate::class_parser::{parse_attribute_table, ParseError};

/// Decoded body of a `Code` attribute. Derived on demand from a generic
/// attribute, not retained on the class.
#[derive(Debug, Clone)]
pub struct CodeAttribute {
    pub max_stack: U2,
    pub max_locals: U2,
    pub code: Vec<u8>,
    pub exception_table: Vec<ExceptionEntry>,
    pub attributes: Vec<AttributeInfo>,
}

/// One protected region of the instruction stream. Decoded for completeness;
/// execution does not consult it.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ExceptionEntry {
    pub start_pc: U2,
    pub end_pc: U2,
    pub handler_pc: U2,
    pub catch_type: U2,
}

fn read_exception_entry(reader: &mut impl Read) -> Result<ExceptionEntry, ParseError> {
    Ok(ExceptionEntry {
        start_pc: U2::read(reader, "exception start pc")?,
        end_pc: U2::read(reader, "exception end pc")?,
        handler_pc: U2::read(reader, "exception handler pc")?,
        catch_type: U2::read(reader, "exception catch type")?,
    })
}

impl CodeAttribute {
    /// Reinterprets a generic attribute payload. The caller is expected to
    /// have resolved the attribute's name index to `Code` first; on any other
    /// kind every sub-read still bounds-checks, so the worst outcome is
    /// garbage fields or `Truncated`, never a panic.
    pub fn parse(attr: &AttributeInfo) -> Result<CodeAttribute, ParseError> {
        let mut reader = Cursor::new(attr.info.as_slice());

        let max_stack = U2::read(&mut reader, "max stack")?;
        let max_locals = U2::read(&mut reader, "max locals")?;

        let code_length = U4::read(&mut reader, "code length")?;
        let mut code = vec![0; code_length as usize];
        read_full(&mut reader, &mut code, "code")?;

        let exception_table_length = U2::read(&mut reader, "exception table length")?;
        let mut exception_table = Vec::with_capacity(exception_table_length as usize);
        for i in 0..exception_table_length {
            let entry = read_exception_entry(&mut reader)
                .map_err(|e| ParseError::Exception { index: i, source: Box::new(e) })?;
            exception_table.push(entry);
        }

        let attributes = parse_attribute_table(&mut reader)?;

        Ok(CodeAttribute {
            max_stack,
            max_locals,
            code,
            exception_table,
            attributes,
        })
    }
}

#[cfg(test)]
mod test {
    use crate::class_parser::code::{CodeAttribute, ExceptionEntry};
    use crate::class_parser::fixtures::{self, hello_class};
    use crate::class_parser::types::{AttributeInfo, PoolIndex};
    use crate::class_parser::{parse_class, ParseError};

    fn attribute(info: Vec<u8>) -> AttributeInfo {
        AttributeInfo {
            attribute_name_index: PoolIndex(2),
            attribute_length: info.len() as u32,
            info,
        }
    }

    #[test]
    fn decodes_hello_code_attribute() {
        let class = parse_class(&hello_class()).unwrap();
        let code = CodeAttribute::parse(&class.methods[0].attributes[0]).unwrap();

        assert_eq!(code.max_stack, 2);
        assert_eq!(code.max_locals, 1);
        assert_eq!(code.code, vec![178, 0, 10, 18, 4, 182, 0, 16, 177]);
        assert!(code.exception_table.is_empty());
        assert!(code.attributes.is_empty());
    }

    #[test]
    fn decodes_exception_table_and_sub_attributes() {
        let mut info = Vec::new();
        fixtures::u2(&mut info, 3); // max stack
        fixtures::u2(&mut info, 2); // max locals
        fixtures::u4(&mut info, 1);
        info.push(177); // code
        fixtures::u2(&mut info, 1); // exception table length
        fixtures::u2(&mut info, 0);
        fixtures::u2(&mut info, 1);
        fixtures::u2(&mut info, 1);
        fixtures::u2(&mut info, 5);
        fixtures::u2(&mut info, 1); // sub-attribute count
        fixtures::u2(&mut info, 9); // sub-attribute name index
        fixtures::u4(&mut info, 2);
        info.extend_from_slice(&[0, 0]);

        let code = CodeAttribute::parse(&attribute(info)).unwrap();
        assert_eq!(code.exception_table, vec![ExceptionEntry {
            start_pc: 0,
            end_pc: 1,
            handler_pc: 1,
            catch_type: 5,
        }]);
        assert_eq!(code.attributes.len(), 1);
        assert_eq!(code.attributes[0].info, vec![0, 0]);
    }

    #[test]
    fn declared_code_length_overrun_is_truncated() {
        let mut info = Vec::new();
        fixtures::u2(&mut info, 1);
        fixtures::u2(&mut info, 1);
        fixtures::u4(&mut info, 50); // longer than the remaining payload
        info.push(177);

        let err = CodeAttribute::parse(&attribute(info)).unwrap_err();
        assert!(matches!(err, ParseError::Truncated { what: "code" }));
    }

    #[test]
    fn wrong_kind_payload_never_panics() {
        // four bytes of something that is not a Code payload
        let result = CodeAttribute::parse(&attribute(vec![0, 1, 0, 0]));
        assert!(matches!(result, Err(ParseError::Truncated { .. })));
    }
}
