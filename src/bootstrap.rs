//! Bootstrap prologue.
//!
//! Emitted exactly once, before any translated command: points SP at the
//! start of the stack region and performs `call Sys.init 0` with the
//! standard call protocol. The call happens outside any function frame, so
//! its return label is scoped to a reserved caller name instead.

use crate::codegen::emit_call;
use crate::labels::LabelAllocator;

/// First RAM address of the operand stack.
pub const STACK_BASE: u16 = 256;

/// The program entry function invoked by the bootstrap.
pub const ENTRY_FUNCTION: &str = "Sys.init";

/// Caller name scoping the bootstrap's return label. Jack-generated VM code
/// always qualifies function names as `Class.method`, so this cannot
/// collide with a real caller.
const BOOTSTRAP_SCOPE: &str = "Bootstrap";

/// Append the bootstrap prologue to `out`.
///
/// The return label comes from the run's allocator so it stays unique even
/// though `Sys.init` is never expected to return; a halt sentinel loop
/// follows in case it does.
pub fn emit(labels: &mut LabelAllocator, out: &mut String) {
    out.push_str("// bootstrap\n");
    out.push_str(&format!("@{STACK_BASE}\nD=A\n@SP\nM=D\n"));
    let ret = labels.return_label(BOOTSTRAP_SCOPE);
    emit_call(ENTRY_FUNCTION, 0, &ret, out);
    out.push_str("(HALT)\n@HALT\n0;JMP\n");
}
