//! The streaming execution engine.
//!
//! An [`Interpreter`] is fed program text in chunks — a line at a time or
//! one whole block — and executes operators as they arrive. The one piece
//! of real machinery is the loop recorder: while a `[` is open, operators
//! are captured into a buffer instead of executed; the `]` that closes the
//! outermost level hands the captured body to the replayer, which runs it
//! repeatedly (recursing into nested loops) until the cell under the head
//! reads zero. A loop may therefore span any number of `feed` calls.
//!
//! Behaviors:
//! - Output goes to an output sink (default: stdout), one raw byte per `.`.
//! - Input comes from an input provider (default: a blocking single-byte
//!   stdin read); end of input writes 0 to the current cell and execution
//!   continues.
//! - A stray `]` with no loop open is a warning under the default lenient
//!   policy and an error under [`BracketPolicy::Strict`].
//! - `finish` signals end of input and reports a loop left open.
//! - A [`StepControl`] bounds runaway programs with a step limit and a
//!   cooperative cancellation flag, checked at every operator and at every
//!   loop-condition test.
//!
//! Quick start:
//!
//! ```
//! use bf_stream::Interpreter;
//! use std::sync::{Arc, Mutex};
//!
//! let out = Arc::new(Mutex::new(Vec::new()));
//! let sink = Arc::clone(&out);
//!
//! let mut bf = Interpreter::new();
//! bf.set_output_sink(move |b| sink.lock().unwrap().push(b));
//! bf.run("++++++++[>++++++++<-]>+.+.").unwrap();
//! assert_eq!(out.lock().unwrap().as_slice(), b"AB");
//! ```

use std::io::{Read, Write};
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use crate::lexer::{self, Op};
use crate::tape::{Direction, Tape};

/// Errors that can occur while interpreting a program.
#[derive(Debug, thiserror::Error)]
pub enum InterpreterError {
    /// The head attempted to move left of cell 0 or beyond the last cell.
    #[error("Head out of bounds at operator {ip} (head={head}, move={direction})")]
    OutOfBounds {
        ip: usize,
        head: usize,
        direction: Direction,
    },

    /// A `]` arrived with no loop open (strict policy only).
    #[error("Unexpected ']' at operator {ip}")]
    UnexpectedCloseBracket { ip: usize },

    /// The input ended while loops were still open.
    #[error("Unterminated loop at end of input ({depth} open, outermost '[' at operator {open_ip})")]
    UnterminatedLoop { depth: usize, open_ip: usize },

    /// Execution aborted: step limit exceeded.
    #[error("Execution aborted: step limit exceeded ({limit})")]
    StepLimitExceeded { limit: usize },

    /// Execution aborted by the cooperative cancellation flag (e.g. timeout).
    #[error("Execution aborted: cancelled")]
    Canceled,

    /// An underlying I/O error from the default stdin/stdout endpoints.
    #[error("I/O error at operator {ip}: {source}")]
    Io {
        ip: usize,
        #[source]
        source: std::io::Error,
    },
}

/// A lenient-policy diagnostic: a `]` arrived with no loop open and was
/// skipped. `ip` is the operator's position in the lexed stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BracketWarning {
    pub ip: usize,
}

/// What to do with a `]` that has no matching `[`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BracketPolicy {
    /// Record a warning, skip the bracket, keep executing.
    #[default]
    Lenient,
    /// Abort the run with [`InterpreterError::UnexpectedCloseBracket`].
    Strict,
}

/// Controls for cooperative cancellation and step limiting.
#[derive(Clone)]
pub struct StepControl {
    pub max_steps: Option<usize>,
    pub cancel_flag: Arc<AtomicBool>,
}

impl StepControl {
    pub fn new(max_steps: Option<usize>, cancel_flag: Arc<AtomicBool>) -> Self {
        Self {
            max_steps,
            cancel_flag,
        }
    }
}

/// A captured loop body, parsed once at capture time so replay never
/// re-lexes. Leaf operators keep their position in the original stream for
/// error reporting.
enum Node {
    Op(Op, usize),
    Loop(Vec<Node>),
}

/// Recorder state: either executing directly, or capturing a loop.
enum Recorder {
    Idle,
    Recording {
        /// Count of currently unmatched `[`.
        depth: usize,
        /// Position of the outermost `[`, for unterminated-loop reporting.
        open_ip: usize,
        /// Captured operators, brackets included, in arrival order.
        buf: Vec<(Op, usize)>,
    },
}

/// A streaming Brainfuck interpreter.
///
/// The interpreter owns the tape, the head, and the loop recorder; feed it
/// program text with [`feed`](Interpreter::feed) and close the stream with
/// [`finish`](Interpreter::finish). State persists across `feed` calls, so
/// one instance can interpret a program delivered line by line.
pub struct Interpreter {
    tape: Tape,
    recorder: Recorder,
    policy: BracketPolicy,
    warnings: Vec<BracketWarning>,
    /// Operators dispatched from the top-level stream so far.
    ip: usize,
    steps: usize,
    control: Option<StepControl>,
    output_sink: Option<Box<dyn FnMut(u8) + Send>>,
    input_provider: Option<Box<dyn FnMut() -> Option<u8> + Send>>,
}

impl Interpreter {
    /// An interpreter with the default 30,000-cell tape.
    pub fn new() -> Self {
        Self::with_tape_len(crate::tape::DEFAULT_TAPE_LEN)
    }

    /// An interpreter with a custom tape length.
    pub fn with_tape_len(len: usize) -> Self {
        Self {
            tape: Tape::with_len(len),
            recorder: Recorder::Idle,
            policy: BracketPolicy::default(),
            warnings: Vec::new(),
            ip: 0,
            steps: 0,
            control: None,
            output_sink: None,
            input_provider: None,
        }
    }

    /// Provide an output sink. When set, `.` sends its byte here instead of
    /// stdout.
    pub fn set_output_sink<F>(&mut self, sink: F)
    where
        F: FnMut(u8) + Send + 'static,
    {
        self.output_sink = Some(Box::new(sink));
    }

    /// Provide an input provider. When set, `,` reads from it instead of
    /// stdin; returning `None` means end of input (cell is set to 0).
    pub fn set_input_provider<F>(&mut self, provider: F)
    where
        F: FnMut() -> Option<u8> + Send + 'static,
    {
        self.input_provider = Some(Box::new(provider));
    }

    pub fn set_bracket_policy(&mut self, policy: BracketPolicy) {
        self.policy = policy;
    }

    /// Install step limiting / cooperative cancellation.
    pub fn set_step_control(&mut self, control: StepControl) {
        self.control = Some(control);
    }

    pub fn tape(&self) -> &Tape {
        &self.tape
    }

    /// Stray-`]` warnings recorded so far (lenient policy).
    pub fn warnings(&self) -> &[BracketWarning] {
        &self.warnings
    }

    /// Steps consumed so far: one per operator dispatched or replayed, one
    /// per loop-condition test.
    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Count of currently unmatched `[` — zero when not inside a loop.
    pub fn loop_depth(&self) -> usize {
        match &self.recorder {
            Recorder::Idle => 0,
            Recorder::Recording { depth, .. } => *depth,
        }
    }

    /// Lex `chunk` and dispatch every operator in it.
    ///
    /// May be called any number of times; a loop left open by one chunk
    /// keeps recording into the next. On an error the run is over and the
    /// interpreter should be discarded (or reset by the caller).
    pub fn feed(&mut self, chunk: &str) -> Result<(), InterpreterError> {
        for op in lexer::lex(chunk) {
            self.dispatch(op)?;
        }
        Ok(())
    }

    /// Signal end of the character stream.
    ///
    /// Reports [`InterpreterError::UnterminatedLoop`] if brackets remain
    /// open; output already emitted stands either way.
    pub fn finish(&mut self) -> Result<(), InterpreterError> {
        if let Recorder::Recording { depth, open_ip, .. } = self.recorder {
            return Err(InterpreterError::UnterminatedLoop { depth, open_ip });
        }
        Ok(())
    }

    /// Feed one complete program and finish the stream.
    pub fn run(&mut self, code: &str) -> Result<(), InterpreterError> {
        self.feed(code)?;
        self.finish()
    }

    /// Central branch: buffer while a loop is open, execute otherwise.
    fn dispatch(&mut self, op: Op) -> Result<(), InterpreterError> {
        self.tick()?;
        let ip = self.ip;
        self.ip += 1;

        if matches!(self.recorder, Recorder::Recording { .. }) {
            return self.record(op, ip);
        }

        match op {
            Op::LoopOpen => {
                self.recorder = Recorder::Recording {
                    depth: 1,
                    open_ip: ip,
                    buf: vec![(op, ip)],
                };
                Ok(())
            }
            Op::LoopClose => self.stray_close(ip),
            _ => self.primitive(op, ip),
        }
    }

    /// Capture one operator; on the `]` that closes the outermost level,
    /// parse the capture and replay it.
    fn record(&mut self, op: Op, ip: usize) -> Result<(), InterpreterError> {
        let closed = {
            let Recorder::Recording { depth, buf, .. } = &mut self.recorder else {
                unreachable!("record is only called while recording");
            };
            buf.push((op, ip));
            match op {
                Op::LoopOpen => {
                    *depth += 1;
                    false
                }
                Op::LoopClose => {
                    *depth -= 1;
                    *depth == 0
                }
                _ => false,
            }
        };

        if !closed {
            return Ok(());
        }

        let Recorder::Recording { buf, .. } =
            std::mem::replace(&mut self.recorder, Recorder::Idle)
        else {
            unreachable!("record is only called while recording");
        };
        let body = parse_body(&buf);
        self.replay(&body)
    }

    /// Run a captured body while the cell under the head is nonzero.
    fn replay(&mut self, body: &[Node]) -> Result<(), InterpreterError> {
        loop {
            // The condition test is a step too, so an empty body still
            // consumes the step budget.
            self.tick()?;
            if self.tape.read() == 0 {
                return Ok(());
            }
            self.run_block(body)?;
        }
    }

    fn run_block(&mut self, block: &[Node]) -> Result<(), InterpreterError> {
        for node in block {
            match node {
                Node::Op(op, ip) => {
                    self.tick()?;
                    self.primitive(*op, *ip)?;
                }
                Node::Loop(inner) => self.replay(inner)?,
            }
        }
        Ok(())
    }

    fn stray_close(&mut self, ip: usize) -> Result<(), InterpreterError> {
        match self.policy {
            BracketPolicy::Lenient => {
                self.warnings.push(BracketWarning { ip });
                Ok(())
            }
            BracketPolicy::Strict => Err(InterpreterError::UnexpectedCloseBracket { ip }),
        }
    }

    /// Execute one non-bracket operator against the tape.
    fn primitive(&mut self, op: Op, ip: usize) -> Result<(), InterpreterError> {
        match op {
            Op::Increment => self.tape.increment(),
            Op::Decrement => self.tape.decrement(),
            Op::Advance | Op::Retreat => {
                let moved = if op == Op::Advance {
                    self.tape.advance()
                } else {
                    self.tape.retreat()
                };
                moved.map_err(|e| InterpreterError::OutOfBounds {
                    ip,
                    head: e.head,
                    direction: e.direction,
                })?;
            }
            Op::Emit => {
                let byte = self.tape.read();
                self.emit(byte, ip)?;
            }
            Op::Consume => {
                let byte = self.read_input(ip)?;
                // End of input writes 0; the cell is always overwritten.
                self.tape.write(byte.unwrap_or(0));
            }
            Op::LoopOpen | Op::LoopClose => {
                unreachable!("brackets are handled by the recorder")
            }
        }
        Ok(())
    }

    fn emit(&mut self, byte: u8, ip: usize) -> Result<(), InterpreterError> {
        if let Some(sink) = self.output_sink.as_mut() {
            (sink)(byte);
            return Ok(());
        }
        std::io::stdout()
            .write_all(&[byte])
            .map_err(|e| InterpreterError::Io { ip, source: e })
    }

    fn read_input(&mut self, ip: usize) -> Result<Option<u8>, InterpreterError> {
        if let Some(provider) = self.input_provider.as_mut() {
            return Ok((provider)());
        }
        // Blocks until a byte is available; EOF reads as end of input.
        let mut buf = [0u8; 1];
        match std::io::stdin().read(&mut buf) {
            Ok(0) => Ok(None),
            Ok(_) => Ok(Some(buf[0])),
            Err(e) => Err(InterpreterError::Io { ip, source: e }),
        }
    }

    /// One step: poll the controls, then spend one unit of budget.
    fn tick(&mut self) -> Result<(), InterpreterError> {
        if let Some(ctrl) = &self.control {
            if ctrl.cancel_flag.load(Ordering::Relaxed) {
                return Err(InterpreterError::Canceled);
            }
            if let Some(max) = ctrl.max_steps {
                if self.steps >= max {
                    return Err(InterpreterError::StepLimitExceeded { limit: max });
                }
            }
        }
        self.steps += 1;
        Ok(())
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

/// Build the replayable block tree from a captured buffer.
///
/// The buffer always starts with the opening `[` and ends with its matching
/// `]` — the recorder only hands it over once the outermost level closes —
/// so the delimiters are stripped and the interior is balanced.
fn parse_body(buf: &[(Op, usize)]) -> Vec<Node> {
    let inner = &buf[1..buf.len() - 1];
    let mut stack: Vec<Vec<Node>> = vec![Vec::new()];
    for &(op, ip) in inner {
        match op {
            Op::LoopOpen => stack.push(Vec::new()),
            Op::LoopClose => {
                let block = stack.pop().expect("captured body is balanced");
                stack
                    .last_mut()
                    .expect("captured body is balanced")
                    .push(Node::Loop(block));
            }
            _ => stack
                .last_mut()
                .expect("captured body is balanced")
                .push(Node::Op(op, ip)),
        }
    }
    stack.pop().expect("captured body is balanced")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    fn collecting(bf: &mut Interpreter) -> Arc<Mutex<Vec<u8>>> {
        let out = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&out);
        bf.set_output_sink(move |b| sink.lock().unwrap().push(b));
        out
    }

    fn scripted_input(bf: &mut Interpreter, bytes: &[u8]) {
        let mut queue: VecDeque<u8> = bytes.iter().copied().collect();
        bf.set_input_provider(move || queue.pop_front());
    }

    #[test]
    fn increments_accumulate_modulo_256() {
        let mut bf = Interpreter::with_tape_len(4);
        bf.run(&"+".repeat(300)).unwrap();
        assert_eq!(bf.tape().read() as u32, 300 % 256);

        let mut bf = Interpreter::with_tape_len(4);
        bf.run("-").unwrap();
        assert_eq!(bf.tape().read(), 255);
    }

    #[test]
    fn head_position_is_the_signed_sum_of_moves() {
        let mut bf = Interpreter::with_tape_len(10);
        bf.run(">>><<>").unwrap();
        assert_eq!(bf.tape().head(), 2);
    }

    #[test]
    fn retreat_from_origin_reports_direction() {
        let mut bf = Interpreter::with_tape_len(10);
        let err = bf.run("<").unwrap_err();
        assert!(matches!(
            err,
            InterpreterError::OutOfBounds {
                ip: 0,
                head: 0,
                direction: Direction::Back,
            }
        ));
    }

    #[test]
    fn advance_past_end_reports_direction() {
        let mut bf = Interpreter::with_tape_len(3);
        let err = bf.run(">>>").unwrap_err();
        assert!(matches!(
            err,
            InterpreterError::OutOfBounds {
                ip: 2,
                head: 2,
                direction: Direction::Forward,
            }
        ));
    }

    #[test]
    fn consume_then_emit_is_the_identity() {
        let mut bf = Interpreter::with_tape_len(4);
        let out = collecting(&mut bf);
        scripted_input(&mut bf, b"Q");
        bf.run(",.").unwrap();
        assert_eq!(out.lock().unwrap().as_slice(), b"Q");
    }

    #[test]
    fn exhausted_input_writes_zero() {
        let mut bf = Interpreter::with_tape_len(4);
        let out = collecting(&mut bf);
        scripted_input(&mut bf, b"");
        bf.run("+,.").unwrap();
        assert_eq!(out.lock().unwrap().as_slice(), &[0]);
    }

    #[test]
    fn loop_drains_the_cell_to_zero() {
        let mut bf = Interpreter::with_tape_len(4);
        let out = collecting(&mut bf);
        bf.run("+++[-]").unwrap();
        assert_eq!(bf.tape().read(), 0);
        assert!(out.lock().unwrap().is_empty());
        // 6 dispatched operators plus replay work
        assert!(bf.steps() > 6);
    }

    #[test]
    fn loop_body_runs_exactly_once_per_nonzero_test() {
        // Emit-then-decrement from 3 gives one byte per iteration.
        let mut bf = Interpreter::with_tape_len(4);
        let out = collecting(&mut bf);
        bf.run("+++[.-]").unwrap();
        assert_eq!(out.lock().unwrap().as_slice(), &[3, 2, 1]);
    }

    #[test]
    fn nested_loops_multiply() {
        let mut bf = Interpreter::with_tape_len(8);
        bf.run("++[>+++[>++<-]<-]").unwrap();
        assert_eq!(bf.tape().head(), 0);
        assert_eq!(&bf.tape().cells()[..3], &[0, 0, 12]);
    }

    #[test]
    fn empty_loop_on_zero_cell_is_ok() {
        let mut bf = Interpreter::with_tape_len(4);
        bf.run("[]").unwrap();
        assert_eq!(bf.tape().read(), 0);
    }

    #[test]
    fn loops_span_chunk_boundaries() {
        let mut streamed = Interpreter::with_tape_len(8);
        streamed.feed("++[>+").unwrap();
        assert_eq!(streamed.loop_depth(), 1);
        streamed.feed("+<-]").unwrap();
        streamed.finish().unwrap();

        let mut whole = Interpreter::with_tape_len(8);
        whole.run("++[>++<-]").unwrap();

        assert_eq!(streamed.tape().cells(), whole.tape().cells());
        assert_eq!(streamed.tape().head(), whole.tape().head());
    }

    #[test]
    fn unterminated_loop_is_reported_at_finish() {
        let mut bf = Interpreter::with_tape_len(4);
        let out = collecting(&mut bf);
        bf.feed("[+").unwrap();
        let err = bf.finish().unwrap_err();
        assert!(matches!(
            err,
            InterpreterError::UnterminatedLoop { depth: 1, open_ip: 0 }
        ));
        assert!(out.lock().unwrap().is_empty());
    }

    #[test]
    fn stray_close_bracket_warns_and_execution_continues() {
        let mut bf = Interpreter::with_tape_len(4);
        let out = collecting(&mut bf);
        bf.run("]+.").unwrap();
        assert_eq!(bf.warnings(), &[BracketWarning { ip: 0 }]);
        assert_eq!(out.lock().unwrap().as_slice(), &[1]);
    }

    #[test]
    fn strict_policy_rejects_stray_close_bracket() {
        let mut bf = Interpreter::with_tape_len(4);
        bf.set_bracket_policy(BracketPolicy::Strict);
        let err = bf.run("]+.").unwrap_err();
        assert!(matches!(
            err,
            InterpreterError::UnexpectedCloseBracket { ip: 0 }
        ));
    }

    #[test]
    fn step_limit_bounds_an_infinite_loop() {
        let mut bf = Interpreter::with_tape_len(4);
        bf.set_step_control(StepControl::new(Some(50), Arc::new(AtomicBool::new(false))));
        let err = bf.run("+[]").unwrap_err();
        assert!(matches!(
            err,
            InterpreterError::StepLimitExceeded { limit: 50 }
        ));
    }

    #[test]
    fn cancellation_flag_aborts_dispatch() {
        let mut bf = Interpreter::with_tape_len(4);
        let flag = Arc::new(AtomicBool::new(true));
        bf.set_step_control(StepControl::new(None, flag));
        let err = bf.run("+").unwrap_err();
        assert!(matches!(err, InterpreterError::Canceled));
    }

    #[test]
    fn commentary_between_operators_is_ignored() {
        let mut bf = Interpreter::with_tape_len(4);
        bf.run("one + two + three + (comments everywhere)").unwrap();
        assert_eq!(bf.tape().read(), 3);
    }
}
