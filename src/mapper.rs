//! Segment addressing.
//!
//! Maps a (segment, index) reference onto the Hack memory map. Pure: the
//! result depends only on the reference and the current source file's
//! identifier (which names static slots).

use crate::command::Segment;
use crate::error::{Result, VmError};

/// Base RAM address of the temp block (RAM[5..=12]).
pub const TEMP_BASE: u16 = 5;
/// Number of temp slots.
pub const TEMP_SLOTS: u16 = 8;

/// Addressing recipe for one segment reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Slot {
    /// Immediate literal (constant segment). Never a legal pop target.
    Immediate(u16),
    /// Offset from a base register held in memory (local/argument/this/that).
    Indirect { base: &'static str, offset: u16 },
    /// Fixed RAM address (temp block).
    Fixed(u16),
    /// Fixed named register (pointer 0/1 = THIS/THAT).
    Register(&'static str),
    /// File-scoped global, named `<FileId>.<index>`.
    StaticSlot(String),
}

/// Resolve a segment reference against the current source file.
///
/// `file_id` is the source file's stem; it keys the static namespace so the
/// same static index in two files never aliases. `line` is only used for
/// error context.
pub fn resolve(segment: Segment, index: u16, file_id: &str, line: usize) -> Result<Slot> {
    match segment {
        Segment::Constant => Ok(Slot::Immediate(index)),
        Segment::Local => Ok(Slot::Indirect {
            base: "LCL",
            offset: index,
        }),
        Segment::Argument => Ok(Slot::Indirect {
            base: "ARG",
            offset: index,
        }),
        Segment::This => Ok(Slot::Indirect {
            base: "THIS",
            offset: index,
        }),
        Segment::That => Ok(Slot::Indirect {
            base: "THAT",
            offset: index,
        }),
        Segment::Temp => {
            if index >= TEMP_SLOTS {
                return Err(VmError::SegmentIndexOutOfRange {
                    file: file_id.to_string(),
                    line,
                    segment: "temp",
                    index,
                    max: TEMP_SLOTS - 1,
                });
            }
            Ok(Slot::Fixed(TEMP_BASE + index))
        }
        Segment::Pointer => match index {
            0 => Ok(Slot::Register("THIS")),
            1 => Ok(Slot::Register("THAT")),
            _ => Err(VmError::SegmentIndexOutOfRange {
                file: file_id.to_string(),
                line,
                segment: "pointer",
                index,
                max: 1,
            }),
        },
        Segment::Static => Ok(Slot::StaticSlot(format!("{file_id}.{index}"))),
    }
}
