//! vm2asm - stack VM to Hack assembly translator.
//!
//! Lowers stack-oriented VM code (`.vm`) to Hack assembly (`.asm`):
//! operand stack, eight memory segments, branching, and the full
//! call/return convention with stack frames. Input is a single `.vm` file
//! or a directory of them; output is one combined program behind a single
//! bootstrap and one flat label namespace.
//!
//! The translation pipeline is one-way: source lines are parsed into
//! [`command::VmCommand`] values and lowered by [`codegen::CodeGenerator`];
//! nothing reads emitted assembly back.

pub mod bootstrap;
pub mod codegen;
pub mod command;
pub mod error;
pub mod labels;
pub mod mapper;
pub mod parser;

use std::fs;
use std::path::{Path, PathBuf};

use log::debug;

use crate::codegen::CodeGenerator;
use crate::labels::LabelAllocator;
use crate::parser::parse_line;

pub use crate::command::{ArithOp, Segment, VmCommand};
pub use crate::error::{Result, VmError};

/// One VM translation unit: a source identifier (the file stem, which keys
/// the static-variable namespace) plus the source text.
#[derive(Debug, Clone)]
pub struct SourceUnit {
    pub id: String,
    pub text: String,
}

impl SourceUnit {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
        }
    }

    /// Load a unit from a `.vm` file; the unit id is the file stem.
    pub fn from_path(path: &Path) -> Result<Self> {
        let id = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("Unknown")
            .to_string();
        let text = fs::read_to_string(path).map_err(|e| VmError::FileRead {
            path: path.display().to_string(),
            source: e,
        })?;
        Ok(Self { id, text })
    }
}

/// Translate one unit through an existing generator, appending to `out`.
/// Fails fast on the first malformed command.
fn translate_unit(generator: &mut CodeGenerator, unit: &SourceUnit, out: &mut String) -> Result<()> {
    generator.begin_unit(&unit.id);
    for (idx, line) in unit.text.lines().enumerate() {
        if let Some(cmd) = parse_line(line, idx + 1, &unit.id)? {
            generator.translate(&cmd, idx + 1, out)?;
        }
    }
    Ok(())
}

/// Translate a single source without the bootstrap prologue.
///
/// Useful for embedding and for exercising isolated command sequences; a
/// whole program goes through [`translate_program`], which prepends the
/// bootstrap.
pub fn translate_source(source: &str, id: &str) -> Result<String> {
    let unit = SourceUnit::new(id, source);
    let mut generator = CodeGenerator::new(LabelAllocator::new());
    let mut out = String::with_capacity(source.lines().count() * 40);
    translate_unit(&mut generator, &unit, &mut out)?;
    Ok(out)
}

/// Translate a whole program: bootstrap first, then every unit in the
/// given order, sharing one label allocator so synthetic labels stay
/// unique across the run. The output is built entirely in memory; on error
/// nothing is returned, so a failed run can never leave partial output.
pub fn translate_program(units: &[SourceUnit]) -> Result<String> {
    let total_lines: usize = units.iter().map(|u| u.text.lines().count()).sum();
    let mut out = String::with_capacity(total_lines * 40 + 512);

    let mut allocator = LabelAllocator::new();
    bootstrap::emit(&mut allocator, &mut out);

    let mut generator = CodeGenerator::new(allocator);
    for unit in units {
        debug!("translating unit {}", unit.id);
        translate_unit(&mut generator, unit, &mut out)?;
    }
    Ok(out)
}

/// Collect the translation units for an input path.
///
/// A `.vm` file yields one unit. A directory yields all its `.vm` files,
/// `Sys.vm` first (the bootstrap jumps into it) and the rest in file-name
/// order, so repeated runs produce identical output.
pub fn collect_units(input: &Path) -> Result<Vec<SourceUnit>> {
    if input.is_file() {
        if input.extension().is_some_and(|ext| ext == "vm") {
            return Ok(vec![SourceUnit::from_path(input)?]);
        }
        return Err(VmError::InvalidPath {
            path: input.display().to_string(),
        });
    }
    if !input.is_dir() {
        return Err(VmError::InvalidPath {
            path: input.display().to_string(),
        });
    }

    let mut files: Vec<PathBuf> = fs::read_dir(input)
        .map_err(|e| VmError::FileRead {
            path: input.display().to_string(),
            source: e,
        })?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "vm"))
        .collect();

    if files.is_empty() {
        return Err(VmError::NoSources {
            path: input.display().to_string(),
        });
    }

    files.sort();
    // Sys.vm leads; the relative order of the rest is alphabetical.
    if let Some(pos) = files
        .iter()
        .position(|f| f.file_name().is_some_and(|n| n == "Sys.vm"))
    {
        let sys = files.remove(pos);
        files.insert(0, sys);
    }

    debug!("collected {} unit(s) from {}", files.len(), input.display());
    files.iter().map(|f| SourceUnit::from_path(f)).collect()
}

/// Translate the program rooted at `input` (file or directory).
pub fn translate_path(input: &Path) -> Result<String> {
    let units = collect_units(input)?;
    translate_program(&units)
}

/// Default output location: `Foo.vm` -> `Foo.asm`, `dir/` -> `dir/dir.asm`.
pub fn output_path(input: &Path) -> PathBuf {
    if input.is_dir() {
        let dir_name = input
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("output");
        input.join(format!("{dir_name}.asm"))
    } else {
        input.with_extension("asm")
    }
}
