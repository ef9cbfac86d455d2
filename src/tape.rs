//! The memory tape and read/write head.
//!
//! A fixed run of unsigned byte cells, all zero at the start of a program,
//! with a single head indexing into it. Cell arithmetic wraps modulo 256
//! and never fails; moving the head past either end of the tape is a fatal
//! condition for the run, not a wraparound.

use std::fmt;

/// Default tape length, per the classic machine definition.
pub const DEFAULT_TAPE_LEN: usize = 30_000;

/// Which way the head was moving when it left the tape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Back,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Forward => write!(f, "'>'"),
            Direction::Back => write!(f, "'<'"),
        }
    }
}

/// The head attempted to move outside the fixed tape.
#[derive(Debug, Clone, Copy, thiserror::Error)]
#[error("head out of bounds (head={head}, move={direction})")]
pub struct OutOfBounds {
    /// Head position at the time of the move.
    pub head: usize,
    pub direction: Direction,
}

/// Fixed-length byte tape plus head position.
///
/// Lifetime is one program execution; a fresh run gets a fresh tape.
pub struct Tape {
    cells: Vec<u8>,
    head: usize,
}

impl Tape {
    pub fn new() -> Self {
        Self::with_len(DEFAULT_TAPE_LEN)
    }

    /// A tape with a custom number of cells. `len` must be at least 1.
    pub fn with_len(len: usize) -> Self {
        Self {
            cells: vec![0; len],
            head: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn head(&self) -> usize {
        self.head
    }

    /// The byte under the head.
    pub fn read(&self) -> u8 {
        self.cells[self.head]
    }

    /// Store `byte` at the head.
    pub fn write(&mut self, byte: u8) {
        self.cells[self.head] = byte;
    }

    /// Add 1 to the cell at the head, wrapping 255 -> 0.
    pub fn increment(&mut self) {
        self.cells[self.head] = self.cells[self.head].wrapping_add(1);
    }

    /// Subtract 1 from the cell at the head, wrapping 0 -> 255.
    pub fn decrement(&mut self) {
        self.cells[self.head] = self.cells[self.head].wrapping_sub(1);
    }

    /// Move the head one cell forward.
    pub fn advance(&mut self) -> Result<(), OutOfBounds> {
        if self.head >= self.cells.len() - 1 {
            return Err(OutOfBounds {
                head: self.head,
                direction: Direction::Forward,
            });
        }
        self.head += 1;
        Ok(())
    }

    /// Move the head one cell back.
    pub fn retreat(&mut self) -> Result<(), OutOfBounds> {
        if self.head == 0 {
            return Err(OutOfBounds {
                head: self.head,
                direction: Direction::Back,
            });
        }
        self.head -= 1;
        Ok(())
    }

    /// All cells, in tape order.
    pub fn cells(&self) -> &[u8] {
        &self.cells
    }

    /// A page-aligned window of cells around the head.
    ///
    /// Returns the window's base index and its slice; the head always falls
    /// inside the returned range.
    pub fn window(&self, window_len: usize) -> (usize, &[u8]) {
        let window_len = window_len.max(1);
        let base = self.head - self.head % window_len;
        let end = (base + window_len).min(self.cells.len());
        (base, &self.cells[base..end])
    }
}

impl Default for Tape {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_zeroed_with_head_at_origin() {
        let tape = Tape::new();
        assert_eq!(tape.len(), DEFAULT_TAPE_LEN);
        assert_eq!(tape.head(), 0);
        assert_eq!(tape.read(), 0);
    }

    #[test]
    fn arithmetic_wraps_modulo_256() {
        let mut tape = Tape::with_len(1);
        tape.decrement();
        assert_eq!(tape.read(), 255);
        tape.increment();
        assert_eq!(tape.read(), 0);
        for _ in 0..300 {
            tape.increment();
        }
        assert_eq!(tape.read() as u32, 300 % 256);
    }

    #[test]
    fn retreat_from_origin_is_out_of_bounds() {
        let mut tape = Tape::with_len(10);
        let err = tape.retreat().unwrap_err();
        assert_eq!(err.head, 0);
        assert_eq!(err.direction, Direction::Back);
    }

    #[test]
    fn advance_past_last_cell_is_out_of_bounds() {
        let mut tape = Tape::with_len(3);
        tape.advance().unwrap();
        tape.advance().unwrap();
        let err = tape.advance().unwrap_err();
        assert_eq!(err.head, 2);
        assert_eq!(err.direction, Direction::Forward);
    }

    #[test]
    fn window_is_aligned_and_contains_the_head() {
        let mut tape = Tape::with_len(100);
        for _ in 0..37 {
            tape.advance().unwrap();
        }
        let (base, cells) = tape.window(16);
        assert_eq!(base, 32);
        assert_eq!(cells.len(), 16);
        assert!(base <= tape.head() && tape.head() < base + cells.len());
    }
}
