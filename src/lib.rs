//! A streaming Brainfuck interpreter library.
//!
//! This crate interprets Brainfuck delivered as a character *stream*: feed
//! the [`Interpreter`] program text in chunks (a line at a time, or one
//! block) and it executes operators as they arrive, capturing loop bodies
//! on the fly and replaying them — nested loops included — until the
//! current cell reads zero.
//!
//! Features and behaviors:
//! - Memory tape initialized to 0 (default 30,000 cells), single head.
//! - Strict head bounds: moving left of cell 0 or right past the end ends
//!   the run with an error; cell arithmetic wraps modulo 256.
//! - Loops may span chunk boundaries; an open `[` keeps recording across
//!   `feed` calls and `finish` reports a loop left open.
//! - Input `,` reads a single byte (stdin by default); end of input sets
//!   the current cell to 0. Output `.` emits the raw byte (stdout by
//!   default). Both ends are replaceable callbacks.
//! - A stray `]` is a positioned warning by default, or an error under the
//!   strict bracket policy.
//! - Non-operator characters are commentary and are discarded by the lexer.
//!
//! Quick start:
//!
//! ```no_run
//! use bf_stream::Interpreter;
//!
//! // Classic "Hello World!" in Brainfuck
//! let code = "++++++++++[>+++++++>++++++++++>+++>+<<<<-]>++.>+.+++++++..+++.>++.<<+++++++++++++++.>.+++.------.--------.>+.>.";
//! let mut bf = Interpreter::new();
//! bf.run(code).expect("program should run");
//! println!(); // ensure a trailing newline for readability
//! ```

pub mod cli_util;
pub mod commands;
pub mod config;
pub mod interp;
pub mod lexer;
pub mod repl;
pub mod tape;
pub mod theme;

pub use interp::{BracketPolicy, BracketWarning, Interpreter, InterpreterError, StepControl};
pub use lexer::Op;
pub use tape::{Direction, Tape};
