use std::collections::HashMap;
use once_cell::sync::OnceCell;

/// Key of one host-provided member: the type it is invoked on, the member
/// name, and the member's descriptor text.
#[derive(Eq, Hash, PartialEq)]
pub struct NativeCallRef {
    pub class_name: String,
    pub method_name: String,
    pub descriptor: String,
}

pub type NativeFn = fn(args: &[&str], out: &mut dyn std::io::Write) -> std::io::Result<()>;

static NATIVE_FN_STORE: OnceCell<HashMap<NativeCallRef, NativeFn>> = OnceCell::new();

/// Resolves a call shape to its handler. A miss is the caller's signal to
/// fail the call as unsupported; there is no implicit no-op entry.
pub fn lookup(class_name: &str, method_name: &str, descriptor: &str) -> Option<NativeFn> {
    let store = NATIVE_FN_STORE.get_or_init(init_native_store);

    store.get(&NativeCallRef {
        class_name: class_name.to_string(),
        method_name: method_name.to_string(),
        descriptor: descriptor.to_string(),
    }).copied()
}

fn init_native_store() -> HashMap<NativeCallRef, NativeFn> {
    let mut native_store: HashMap<NativeCallRef, NativeFn> = Default::default();

    native_store.insert(NativeCallRef {
        class_name: "java/io/PrintStream".to_string(),
        method_name: "println".to_string(),
        descriptor: "(Ljava/lang/String;)V".to_string(),
    }, stream::println_string);

    native_store.insert(NativeCallRef {
        class_name: "java/io/PrintStream".to_string(),
        method_name: "print".to_string(),
        descriptor: "(Ljava/lang/String;)V".to_string(),
    }, stream::print_string);

    native_store
}

mod stream {
    use std::io::{self, Write};

    pub fn println_string(args: &[&str], out: &mut dyn Write) -> io::Result<()> {
        writeln!(out, "{}", args[0])
    }

    pub fn print_string(args: &[&str], out: &mut dyn Write) -> io::Result<()> {
        write!(out, "{}", args[0])
    }
}

#[cfg(test)]
mod test {
    use crate::vm::native::lookup;

    #[test]
    fn resolves_seeded_print_shapes() {
        assert!(lookup("java/io/PrintStream", "println", "(Ljava/lang/String;)V").is_some());
        assert!(lookup("java/io/PrintStream", "print", "(Ljava/lang/String;)V").is_some());
    }

    #[test]
    fn misses_unknown_shapes() {
        assert!(lookup("java/io/PrintStream", "flush", "()V").is_none());
        assert!(lookup("java/io/PrintStream", "println", "(I)V").is_none());
        assert!(lookup("java/lang/System", "println", "(Ljava/lang/String;)V").is_none());
    }

    #[test]
    fn handlers_write_to_the_sink() {
        let println = lookup("java/io/PrintStream", "println", "(Ljava/lang/String;)V").unwrap();
        let print = lookup("java/io/PrintStream", "print", "(Ljava/lang/String;)V").unwrap();

        let mut out = Vec::new();
        println(&["hello"], &mut out).unwrap();
        print(&["world"], &mut out).unwrap();

        assert_eq!(out, b"hello\nworld");
    }
}
