//! Error types for VM translation.
//!
//! Translation is fail-fast: the first error aborts the run. Every
//! source-level error carries the originating file identifier and 1-based
//! line number so the fault can be located in the `.vm` input.

use thiserror::Error;

/// Translation error with source context.
#[derive(Error, Debug)]
pub enum VmError {
    // Malformed commands (parser)
    #[error("{file}:{line}: unknown command: {mnemonic}")]
    UnknownCommand {
        file: String,
        line: usize,
        mnemonic: String,
    },

    #[error("{file}:{line}: {mnemonic} expects {expected} operand(s)")]
    WrongArity {
        file: String,
        line: usize,
        mnemonic: String,
        expected: usize,
    },

    #[error("{file}:{line}: invalid index: {token} (expected a non-negative integer)")]
    InvalidIndex {
        file: String,
        line: usize,
        token: String,
    },

    // Segment resolution (mapper)
    #[error("{file}:{line}: unsupported segment: {segment}")]
    UnknownSegment {
        file: String,
        line: usize,
        segment: String,
    },

    #[error("{file}:{line}: index {index} out of range for segment {segment} (max {max})")]
    SegmentIndexOutOfRange {
        file: String,
        line: usize,
        segment: &'static str,
        index: u16,
        max: u16,
    },

    // Code generation
    #[error("{file}:{line}: cannot pop into the constant segment")]
    IllegalPopTarget { file: String, line: usize },

    // I/O (driver and CLI)
    #[error("failed to read {path}: {source}")]
    FileRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    FileWrite {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("no .vm sources found in {path}")]
    NoSources { path: String },

    #[error("not a .vm file or a directory: {path}")]
    InvalidPath { path: String },
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, VmError>;
