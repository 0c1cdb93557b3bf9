//! Typed representation of the VM instruction set.
//!
//! A [`VmCommand`] is immutable once parsed; the code generator matches
//! exhaustively over it, so adding or removing a mnemonic is a
//! compile-time-checked change.

use std::fmt;

/// Arithmetic-logical stack operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithOp {
    Add,
    Sub,
    Neg,
    Eq,
    Gt,
    Lt,
    And,
    Or,
    Not,
}

impl ArithOp {
    /// Source mnemonic for this operation.
    pub fn mnemonic(self) -> &'static str {
        match self {
            ArithOp::Add => "add",
            ArithOp::Sub => "sub",
            ArithOp::Neg => "neg",
            ArithOp::Eq => "eq",
            ArithOp::Gt => "gt",
            ArithOp::Lt => "lt",
            ArithOp::And => "and",
            ArithOp::Or => "or",
            ArithOp::Not => "not",
        }
    }

    /// Look up an operation by its mnemonic.
    pub fn from_mnemonic(s: &str) -> Option<Self> {
        Some(match s {
            "add" => ArithOp::Add,
            "sub" => ArithOp::Sub,
            "neg" => ArithOp::Neg,
            "eq" => ArithOp::Eq,
            "gt" => ArithOp::Gt,
            "lt" => ArithOp::Lt,
            "and" => ArithOp::And,
            "or" => ArithOp::Or,
            "not" => ArithOp::Not,
            _ => return None,
        })
    }
}

/// The eight VM memory segments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment {
    Local,
    Argument,
    This,
    That,
    Constant,
    Static,
    Temp,
    Pointer,
}

impl Segment {
    /// Source-level segment name.
    pub fn name(self) -> &'static str {
        match self {
            Segment::Local => "local",
            Segment::Argument => "argument",
            Segment::This => "this",
            Segment::That => "that",
            Segment::Constant => "constant",
            Segment::Static => "static",
            Segment::Temp => "temp",
            Segment::Pointer => "pointer",
        }
    }

    /// Look up a segment by its source-level name.
    pub fn from_name(s: &str) -> Option<Self> {
        Some(match s {
            "local" => Segment::Local,
            "argument" => Segment::Argument,
            "this" => Segment::This,
            "that" => Segment::That,
            "constant" => Segment::Constant,
            "static" => Segment::Static,
            "temp" => Segment::Temp,
            "pointer" => Segment::Pointer,
            _ => return None,
        })
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One parsed VM command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VmCommand {
    Arith(ArithOp),
    Push { segment: Segment, index: u16 },
    Pop { segment: Segment, index: u16 },
    Label(String),
    Goto(String),
    IfGoto(String),
    Function { name: String, locals: u16 },
    Call { name: String, args: u16 },
    Return,
}

/// Renders the command in its source form, e.g. `push constant 7`.
/// The generator uses this to echo each command as a comment above its
/// emitted block.
impl fmt::Display for VmCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VmCommand::Arith(op) => f.write_str(op.mnemonic()),
            VmCommand::Push { segment, index } => write!(f, "push {segment} {index}"),
            VmCommand::Pop { segment, index } => write!(f, "pop {segment} {index}"),
            VmCommand::Label(name) => write!(f, "label {name}"),
            VmCommand::Goto(name) => write!(f, "goto {name}"),
            VmCommand::IfGoto(name) => write!(f, "if-goto {name}"),
            VmCommand::Function { name, locals } => write!(f, "function {name} {locals}"),
            VmCommand::Call { name, args } => write!(f, "call {name} {args}"),
            VmCommand::Return => f.write_str("return"),
        }
    }
}
