use std::fs;
use std::path::{Path, PathBuf};
use std::process::exit;
use clap::Parser;

use crate::vm::vm::VirtualMachine;

mod class_parser;
mod vm;

/// Loads a single class file and runs its `main` method.
#[derive(Parser)]
#[clap(author, version, about)]
struct Args {
    /// Class file to execute
    #[clap(parse(from_os_str))]
    class_file: PathBuf,
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    if let Err(e) = run(&args.class_file) {
        eprintln!("error: {}", e);
        exit(1);
    }
}

fn run(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let buf = fs::read(path)?;
    let class = class_parser::parse_class(&buf)?;
    log::info!("loaded class with {} constant pool entries and {} methods",
               class.constant_pool.len(), class.methods.len());

    let mut vm = VirtualMachine::new(class);
    vm.run_entry_method()?;

    Ok(())
}
