//! Lowering of VM commands to Hack assembly.
//!
//! Each command is emitted as a fixed instruction template, preceded by a
//! `//` comment echoing the source command so the output can be traced back
//! to the VM program. Two invariants hold around every template: the top of
//! the operand stack sits at `RAM[SP-1]` on entry, and on exit `SP` reflects
//! exactly the command's documented stack effect.

use crate::command::{ArithOp, Segment, VmCommand};
use crate::error::{Result, VmError};
use crate::labels::LabelAllocator;
use crate::mapper::{self, Slot};

/// `*SP = D; SP += 1`
const PUSH_D: &str = "@SP\nA=M\nM=D\n@SP\nM=M+1\n";
/// `SP -= 1; D = *SP` (leaves A addressing the popped slot)
const POP_D: &str = "@SP\nAM=M-1\nD=M\n";

/// Translates parsed commands into Hack assembly text.
///
/// Holds the run-wide label allocator plus the current file and function,
/// which scope static slots and source-level labels respectively.
pub struct CodeGenerator {
    labels: LabelAllocator,
    file_id: String,
    function: String,
}

impl CodeGenerator {
    /// Create a generator around an explicit label allocator. The allocator
    /// must be shared with everything else that mints labels in the same
    /// run (the bootstrap emitter), hence it is passed in rather than
    /// created here.
    pub fn new(labels: LabelAllocator) -> Self {
        Self {
            labels,
            file_id: String::new(),
            function: String::new(),
        }
    }

    /// Start translating a new source unit. Resets the function scope;
    /// `file_id` names static slots until the next call.
    pub fn begin_unit(&mut self, file_id: &str) {
        self.file_id = file_id.to_string();
        self.function.clear();
    }

    /// Label scope: the enclosing function, or the file before any
    /// `function` command has been seen.
    fn scope(&self) -> &str {
        if self.function.is_empty() {
            &self.file_id
        } else {
            &self.function
        }
    }

    fn scoped(&self, label: &str) -> String {
        format!("{}${}", self.scope(), label)
    }

    /// Append the assembly for one command to `out`.
    ///
    /// `line` is the command's 1-based source line, used for error context
    /// in segment resolution and pop-target checks.
    pub fn translate(&mut self, cmd: &VmCommand, line: usize, out: &mut String) -> Result<()> {
        out.push_str(&format!("// {cmd}\n"));
        match cmd {
            VmCommand::Arith(op) => self.emit_arith(*op, out),
            VmCommand::Push { segment, index } => self.emit_push(*segment, *index, line, out)?,
            VmCommand::Pop { segment, index } => self.emit_pop(*segment, *index, line, out)?,
            VmCommand::Label(name) => out.push_str(&format!("({})\n", self.scoped(name))),
            VmCommand::Goto(name) => out.push_str(&format!("@{}\n0;JMP\n", self.scoped(name))),
            VmCommand::IfGoto(name) => {
                out.push_str(&format!("{POP_D}@{}\nD;JNE\n", self.scoped(name)));
            }
            VmCommand::Function { name, locals } => self.emit_function(name, *locals, out),
            VmCommand::Call { name, args } => self.emit_call_site(name, *args, out),
            VmCommand::Return => out.push_str(RETURN),
        }
        Ok(())
    }

    fn emit_arith(&mut self, op: ArithOp, out: &mut String) {
        match op {
            // Binary: pop y into D, fold into x in place. x is the value
            // pushed earlier, y the later one; sub computes x - y.
            ArithOp::Add => out.push_str(&binary("D+M")),
            ArithOp::Sub => out.push_str(&binary("M-D")),
            ArithOp::And => out.push_str(&binary("D&M")),
            ArithOp::Or => out.push_str(&binary("D|M")),
            // Unary: rewrite the top slot in place, SP untouched.
            ArithOp::Neg => out.push_str("@SP\nA=M-1\nM=-M\n"),
            ArithOp::Not => out.push_str("@SP\nA=M-1\nM=!M\n"),
            ArithOp::Eq => self.emit_compare("JEQ", out),
            ArithOp::Gt => self.emit_compare("JGT", out),
            ArithOp::Lt => self.emit_compare("JLT", out),
        }
    }

    /// Comparison: pop y, compute x - y, branch on the sign. True pushes
    /// -1 (all ones), false pushes 0; no other bit pattern can result.
    /// Fresh labels per occurrence keep concatenated units collision-free.
    fn emit_compare(&mut self, jump: &str, out: &mut String) {
        let (truthy, done) = self.labels.comparison_pair();
        out.push_str(&format!(
            "{POP_D}A=A-1\nD=M-D\n\
             @{truthy}\nD;{jump}\n\
             @SP\nA=M-1\nM=0\n\
             @{done}\n0;JMP\n\
             ({truthy})\n@SP\nA=M-1\nM=-1\n\
             ({done})\n"
        ));
    }

    fn emit_push(&mut self, segment: Segment, index: u16, line: usize, out: &mut String) -> Result<()> {
        let text = match mapper::resolve(segment, index, &self.file_id, line)? {
            Slot::Immediate(value) => format!("@{value}\nD=A\n{PUSH_D}"),
            Slot::Indirect { base, offset } => {
                format!("@{offset}\nD=A\n@{base}\nA=D+M\nD=M\n{PUSH_D}")
            }
            Slot::Fixed(addr) => format!("@{addr}\nD=M\n{PUSH_D}"),
            Slot::Register(sym) => format!("@{sym}\nD=M\n{PUSH_D}"),
            Slot::StaticSlot(name) => format!("@{name}\nD=M\n{PUSH_D}"),
        };
        out.push_str(&text);
        Ok(())
    }

    fn emit_pop(&mut self, segment: Segment, index: u16, line: usize, out: &mut String) -> Result<()> {
        let text = match mapper::resolve(segment, index, &self.file_id, line)? {
            Slot::Immediate(_) => {
                return Err(VmError::IllegalPopTarget {
                    file: self.file_id.clone(),
                    line,
                });
            }
            // Target address depends on a base register, so it is computed
            // first and parked in R13 while the pop clobbers A.
            Slot::Indirect { base, offset } => {
                format!("@{offset}\nD=A\n@{base}\nD=D+M\n@R13\nM=D\n{POP_D}@R13\nA=M\nM=D\n")
            }
            Slot::Fixed(addr) => format!("{POP_D}@{addr}\nM=D\n"),
            Slot::Register(sym) => format!("{POP_D}@{sym}\nM=D\n"),
            Slot::StaticSlot(name) => format!("{POP_D}@{name}\nM=D\n"),
        };
        out.push_str(&text);
        Ok(())
    }

    fn emit_function(&mut self, name: &str, locals: u16, out: &mut String) {
        self.function = name.to_string();
        out.push_str(&format!("({name})\n"));
        for _ in 0..locals {
            out.push_str("@SP\nA=M\nM=0\n@SP\nM=M+1\n");
        }
    }

    fn emit_call_site(&mut self, callee: &str, args: u16, out: &mut String) {
        let caller = self.scope().to_string();
        let ret = self.labels.return_label(&caller);
        emit_call(callee, args, &ret, out);
    }
}

/// The call protocol, shared with the bootstrap emitter.
///
/// Pushes the return address and the four caller base registers, repoints
/// ARG at the first argument (`SP - args - 5`) and LCL at the new frame
/// top, jumps to the callee, and plants the return label.
pub(crate) fn emit_call(callee: &str, args: u16, ret: &str, out: &mut String) {
    out.push_str(&format!("@{ret}\nD=A\n{PUSH_D}"));
    for base in ["LCL", "ARG", "THIS", "THAT"] {
        out.push_str(&format!("@{base}\nD=M\n{PUSH_D}"));
    }
    out.push_str(&format!("@SP\nD=M\n@{}\nD=D-A\n@ARG\nM=D\n", args + 5));
    out.push_str("@SP\nD=M\n@LCL\nM=D\n");
    out.push_str(&format!("@{callee}\n0;JMP\n({ret})\n"));
}

fn binary(alu: &str) -> String {
    format!("{POP_D}A=A-1\nM={alu}\n")
}

/// Frame teardown. R13 holds the frame base, R14 the return address read
/// from `frame - 5` before `*ARG = pop()` can overwrite it (it does when
/// the callee took no arguments).
const RETURN: &str = "@LCL\nD=M\n@R13\nM=D\n\
                      @5\nA=D-A\nD=M\n@R14\nM=D\n\
                      @SP\nAM=M-1\nD=M\n@ARG\nA=M\nM=D\n\
                      @ARG\nD=M+1\n@SP\nM=D\n\
                      @R13\nAM=M-1\nD=M\n@THAT\nM=D\n\
                      @R13\nAM=M-1\nD=M\n@THIS\nM=D\n\
                      @R13\nAM=M-1\nD=M\n@ARG\nM=D\n\
                      @R13\nAM=M-1\nD=M\n@LCL\nM=D\n\
                      @R14\nA=M\n0;JMP\n";
