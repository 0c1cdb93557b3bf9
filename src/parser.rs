//! Line-level VM command parsing.
//!
//! One physical line holds at most one command. `//` starts a comment
//! (full-line or trailing); blank and comment-only lines parse to nothing.
//! Arity is strict: a mnemonic with too few or too many operands is
//! rejected, with the file and line number in the error.

use crate::command::{ArithOp, Segment, VmCommand};
use crate::error::{Result, VmError};

/// Parse one physical line.
///
/// Returns `Ok(None)` for blank and comment-only lines, `Ok(Some(_))` for a
/// well-formed command, and an error for anything else. `line_num` is
/// 1-based.
pub fn parse_line(line: &str, line_num: usize, file_id: &str) -> Result<Option<VmCommand>> {
    let text = line.split("//").next().unwrap_or("").trim();
    if text.is_empty() {
        return Ok(None);
    }

    let tokens: Vec<&str> = text.split_whitespace().collect();
    let mnemonic = tokens[0].to_lowercase();
    let operands = &tokens[1..];
    let arity = |expected| check_arity(operands.len(), expected, &mnemonic, line_num, file_id);

    if let Some(op) = ArithOp::from_mnemonic(&mnemonic) {
        arity(0)?;
        return Ok(Some(VmCommand::Arith(op)));
    }

    let cmd = match mnemonic.as_str() {
        "push" => {
            arity(2)?;
            let segment = parse_segment(operands[0], line_num, file_id)?;
            let index = parse_index(operands[1], line_num, file_id)?;
            VmCommand::Push { segment, index }
        }
        "pop" => {
            arity(2)?;
            let segment = parse_segment(operands[0], line_num, file_id)?;
            let index = parse_index(operands[1], line_num, file_id)?;
            VmCommand::Pop { segment, index }
        }
        "label" => {
            arity(1)?;
            VmCommand::Label(operands[0].to_string())
        }
        "goto" => {
            arity(1)?;
            VmCommand::Goto(operands[0].to_string())
        }
        "if-goto" => {
            arity(1)?;
            VmCommand::IfGoto(operands[0].to_string())
        }
        "function" => {
            arity(2)?;
            VmCommand::Function {
                name: operands[0].to_string(),
                locals: parse_index(operands[1], line_num, file_id)?,
            }
        }
        "call" => {
            arity(2)?;
            VmCommand::Call {
                name: operands[0].to_string(),
                args: parse_index(operands[1], line_num, file_id)?,
            }
        }
        "return" => {
            arity(0)?;
            VmCommand::Return
        }
        _ => {
            return Err(VmError::UnknownCommand {
                file: file_id.to_string(),
                line: line_num,
                mnemonic: mnemonic.clone(),
            });
        }
    };

    Ok(Some(cmd))
}

fn check_arity(
    actual: usize,
    expected: usize,
    mnemonic: &str,
    line_num: usize,
    file_id: &str,
) -> Result<()> {
    if actual == expected {
        Ok(())
    } else {
        Err(VmError::WrongArity {
            file: file_id.to_string(),
            line: line_num,
            mnemonic: mnemonic.to_string(),
            expected,
        })
    }
}

fn parse_segment(token: &str, line_num: usize, file_id: &str) -> Result<Segment> {
    Segment::from_name(&token.to_lowercase()).ok_or_else(|| VmError::UnknownSegment {
        file: file_id.to_string(),
        line: line_num,
        segment: token.to_string(),
    })
}

fn parse_index(token: &str, line_num: usize, file_id: &str) -> Result<u16> {
    token.parse::<u16>().map_err(|_| VmError::InvalidIndex {
        file: file_id.to_string(),
        line: line_num,
        token: token.to_string(),
    })
}
