//! Operator extraction.
//!
//! Brainfuck source is mostly commentary: any character outside the eight
//! operator characters `><+-.,[]` is ignored, so "lexing" is a pure filter
//! over the raw text. The filter is stateless and never fails — arbitrary
//! text is acceptable, and an empty result just means there is nothing to
//! execute in this chunk.

use std::fmt;

/// One of the eight Brainfuck operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    /// `>` — move the head one cell forward.
    Advance,
    /// `<` — move the head one cell back.
    Retreat,
    /// `+` — increment the current cell, wrapping at 255.
    Increment,
    /// `-` — decrement the current cell, wrapping at 0.
    Decrement,
    /// `.` — emit the current cell as one output byte.
    Emit,
    /// `,` — read one input byte into the current cell.
    Consume,
    /// `[` — open a loop.
    LoopOpen,
    /// `]` — close a loop.
    LoopClose,
}

impl Op {
    /// Map a source character to its operator, or `None` for commentary.
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '>' => Some(Op::Advance),
            '<' => Some(Op::Retreat),
            '+' => Some(Op::Increment),
            '-' => Some(Op::Decrement),
            '.' => Some(Op::Emit),
            ',' => Some(Op::Consume),
            '[' => Some(Op::LoopOpen),
            ']' => Some(Op::LoopClose),
            _ => None,
        }
    }

    pub fn as_char(self) -> char {
        match self {
            Op::Advance => '>',
            Op::Retreat => '<',
            Op::Increment => '+',
            Op::Decrement => '-',
            Op::Emit => '.',
            Op::Consume => ',',
            Op::LoopOpen => '[',
            Op::LoopClose => ']',
        }
    }

}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// Lex a chunk of raw text into operators, in source order.
pub fn lex(text: &str) -> impl Iterator<Item = Op> + '_ {
    text.chars().filter_map(Op::from_char)
}

/// Keep only operator characters.
///
/// Used where the *textual* form of the operator stream is wanted: REPL
/// echo, diagnostic context windows. `strip(strip(s)) == strip(s)`.
pub fn strip(text: &str) -> String {
    text.chars().filter(|&c| Op::from_char(c).is_some()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn discards_everything_but_operators() {
        let ops: Vec<Op> = lex("a+b- hello > <1.2,3[]\n").collect();
        assert_eq!(
            ops,
            vec![
                Op::Increment,
                Op::Decrement,
                Op::Advance,
                Op::Retreat,
                Op::Emit,
                Op::Consume,
                Op::LoopOpen,
                Op::LoopClose,
            ]
        );
    }

    #[test]
    fn empty_and_comment_only_chunks_lex_to_nothing() {
        assert_eq!(lex("").count(), 0);
        assert_eq!(lex("this line is only a comment 123").count(), 0);
    }

    #[test]
    fn strip_is_idempotent() {
        let once = strip("+ + [ loop body - ] done.");
        let twice = strip(&once);
        assert_eq!(once, twice);
        assert_eq!(once, "++[-].");
    }

    #[test]
    fn chars_round_trip_through_the_enum() {
        for c in "><+-.,[]".chars() {
            let op = Op::from_char(c).unwrap();
            assert_eq!(op.as_char(), c);
        }
    }
}
