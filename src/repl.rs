//! Interactive session over one persistent streaming interpreter.
//!
//! Unlike a whole-program interpreter, the streaming engine keeps tape,
//! head and any open loop capture alive between submissions, so the REPL
//! feeds each line straight into the same machine. The prompt shows the
//! open-loop depth while a capture is in progress, the way a shell shows a
//! continuation prompt inside an unclosed quote.

use std::env;
use std::io::{self, IsTerminal, Write};
use std::sync::{Arc, atomic::{AtomicBool, Ordering}};
use std::thread;
use std::time::Duration;
use reedline::{Signal, DefaultPrompt, DefaultPromptSegment, HistoryItem, Highlighter, StyledText};
use nu_ansi_term::Style;

use crate::{cli_util, config, lexer};
use crate::interp::{BracketPolicy, Interpreter, StepControl};

/// One REPL session: the machine plus the operator stream fed so far
/// (diagnostic positions index into that stream).
struct Session {
    machine: Interpreter,
    ops: String,
    /// How many lenient warnings have already been shown.
    warned: usize,
    tape_len: usize,
    policy: BracketPolicy,
}

impl Session {
    fn new(tape_len: usize, policy: BracketPolicy) -> Self {
        let mut machine = Interpreter::with_tape_len(tape_len);
        machine.set_bracket_policy(policy);
        Self {
            machine,
            ops: String::new(),
            warned: 0,
            tape_len,
            policy,
        }
    }

    fn reset(&mut self) {
        *self = Self::new(self.tape_len, self.policy);
    }

    /// Feed one submission into the machine and report diagnostics.
    ///
    /// A trailing newline is always written to stdout so the next prompt
    /// starts at column 0. Returns false on a fatal error, after which the
    /// machine is unusable until [`recover`](Session::recover).
    fn submit(&mut self, line: &str) -> bool {
        let filtered = lexer::strip(line);
        if filtered.is_empty() {
            return true;
        }
        self.ops.push_str(&filtered);

        let result = self.machine.feed(&filtered);
        self.report_warnings();
        let ok = match result {
            Ok(()) => true,
            Err(err) => {
                cli_util::print_interp_error(None, &self.ops, &err);
                let _ = io::stderr().flush();
                false
            }
        };
        println!();
        let _ = io::stdout().flush();
        ok
    }

    /// After a fatal error: tell the user and start a fresh run.
    fn recover(&mut self) {
        eprintln!("(machine reset: tape, head and open loops cleared)");
        let _ = io::stderr().flush();
        self.reset();
    }

    fn report_warnings(&mut self) {
        let total = self.machine.warnings().len();
        if total > self.warned {
            let pending = self.machine.warnings()[self.warned..].to_vec();
            cli_util::print_bracket_warnings(None, &self.ops, &pending);
            self.warned = total;
        }
    }

    /// End of the character stream: report a loop left open.
    fn close(&mut self) {
        if let Err(err) = self.machine.finish() {
            cli_util::print_interp_error(None, &self.ops, &err);
            let _ = io::stderr().flush();
        }
    }
}

pub fn repl_loop(tape_len: usize, policy: BracketPolicy) -> io::Result<()> {
    let mut editor = init_line_editor()?;
    let mut session = Session::new(tape_len, policy);

    loop {
        let submission =
            read_submission_interactive(&mut editor, session.machine.loop_depth())?;
        let Some(submission) = submission else {
            // EOF or editor closed; the stream ends here.
            session.close();
            println!();
            io::stdout().flush()?;
            return Ok(());
        };

        let trimmed = submission.trim();
        if trimmed.is_empty() {
            continue;
        }

        // Meta commands start with ':' and never reach the machine.
        if let Some(cmd) = trimmed.strip_prefix(':') {
            if !handle_meta(cmd, &mut session) {
                session.close();
                return Ok(());
            }
            continue;
        }

        if !session.submit(trimmed) {
            session.recover();
        }

        // Test hook: if BFS_REPL_ONCE=1, exit after one execution
        if env::var("BFS_REPL_ONCE").ok().as_deref() == Some("1") {
            session.close();
            return Ok(());
        }
    }
}

/// Dispatch a meta command. Returns false when the session should end.
fn handle_meta(cmd: &str, session: &mut Session) -> bool {
    match cmd.trim() {
        "exit" | "quit" => false,
        "reset" => {
            session.reset();
            eprintln!("machine reset");
            let _ = io::stderr().flush();
            true
        }
        "tape" => {
            print_tape(session);
            true
        }
        "help" => {
            print_meta_help();
            true
        }
        other => {
            eprintln!("unknown meta command ':{other}'");
            print_meta_help();
            true
        }
    }
}

fn print_tape(session: &Session) {
    let tape = session.machine.tape();
    let (base, cells) = tape.window(16);
    let rendered: Vec<String> = cells.iter().map(|c| c.to_string()).collect();
    eprintln!(
        "head={} cell={} depth={} | cells[{}..]: {}",
        tape.head(),
        tape.read(),
        session.machine.loop_depth(),
        base,
        rendered.join(" ")
    );
    let _ = io::stderr().flush();
}

fn print_meta_help() {
    eprintln!(
        r#"Meta commands (line starts with ":")
  :help    Show this help
  :tape    Show head position and a window of cells around it
  :reset   Fresh machine (tape, head, warnings and open loops cleared)
  :exit    End the session (reports a loop left open, exits 0)"#
    );
    let _ = io::stderr().flush();
}

fn init_line_editor() -> io::Result<reedline::Reedline> {
    use reedline::{FileBackedHistory, Reedline};

    // Default emacs bindings: Enter submits the line, Up/Down browse
    // history. Each line is one chunk for the machine.
    let history = FileBackedHistory::new(1_000).unwrap();

    let editor = Reedline::create()
        .with_highlighter(Box::new(OpHighlighter::from_settings()))
        .with_history(Box::new(history));

    Ok(editor)
}

fn read_submission_interactive(
    editor: &mut reedline::Reedline,
    depth: usize,
) -> io::Result<Option<String>> {
    // Continuation-style prompt while a loop capture is open
    let left = if depth == 0 {
        "bfs".to_string()
    } else {
        format!("bfs[{depth}]")
    };
    let prompt = DefaultPrompt::new(
        DefaultPromptSegment::Basic(left),
        DefaultPromptSegment::Empty,
    );

    match editor.read_line(&prompt) {
        Ok(Signal::Success(buffer)) => {
            if !buffer.trim().is_empty() {
                let _ = editor
                    .history_mut()
                    .save(HistoryItem::from_command_line(buffer.clone()));
            }
            Ok(Some(buffer))
        }
        Ok(Signal::CtrlC) => Ok(None), // Global SIGINT, exit immediately
        Ok(Signal::CtrlD) => Ok(None), // EOF, exit cleanly
        Err(e) => {
            eprintln!("repl: editor error: {e}");
            let _ = io::stderr().flush();
            Ok(None)
        }
    }
}

pub fn read_submission<R: io::BufRead>(stdin: &mut R) -> Option<String> {
    // Collect all lines until EOF
    let mut buffer = String::new();

    loop {
        let mut line = String::new();
        match stdin.read_line(&mut line) {
            Ok(0) => {
                // EOF
                break;
            }
            Ok(_) => {
                buffer.push_str(&line);
            }
            Err(_) => {
                // Read error, ignore
                return None;
            }
        }
    }

    if buffer.is_empty() { None } else { Some(buffer) }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplMode {
    Bare,
    Editor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeFlagOverride {
    None,
    Bare,
    Editor,
}

pub fn select_mode(flag: ModeFlagOverride) -> Result<ReplMode, String> {
    // Flag override
    match flag {
        ModeFlagOverride::Bare => return Ok(ReplMode::Bare),
        ModeFlagOverride::Editor => {
            if !io::stdin().is_terminal() {
                return Err(
                    "cannot start editor: stdin is not a TTY (use --bare or BFS_REPL_MODE=bare)"
                        .to_string(),
                );
            }
            return Ok(ReplMode::Editor);
        }
        ModeFlagOverride::None => {}
    }

    // Environment override
    if let Ok(val) = env::var("BFS_REPL_MODE") {
        let v = val.trim().to_ascii_lowercase();
        return match v.as_str() {
            "bare" => Ok(ReplMode::Bare),
            "editor" => {
                if !io::stdin().is_terminal() {
                    return Err(
                        "cannot start editor: stdin is not a TTY (use BFS_REPL_MODE=bare)"
                            .to_string(),
                    );
                }
                Ok(ReplMode::Editor)
            }
            _ => Err(format!(
                "invalid BFS_REPL_MODE value: {val}, must be 'bare' or 'editor'"
            )),
        };
    }

    // Auto-detect
    if io::stdin().is_terminal() {
        Ok(ReplMode::Editor)
    } else {
        Ok(ReplMode::Bare)
    }
}

/// Bare mode: read stdin to EOF, execute once as a single stream, report,
/// exit. Used when stdin is piped.
pub fn execute_bare_once(tape_len: usize, policy: BracketPolicy) -> io::Result<()> {
    let submission = {
        let mut locked = io::BufReader::new(io::stdin().lock());
        read_submission(&mut locked)
    };
    let Some(s) = submission else {
        return Ok(());
    };

    let mut session = Session::new(tape_len, policy);

    // Piped programs get the same runaway protection as `run`: step limit
    // from env/config, wall-clock timeout via a watchdog thread that trips
    // the cancellation flag.
    let settings = config::settings();
    let timeout_ms = env::var("BFS_TIMEOUT_MS")
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(settings.timeout_ms);
    let max_steps = env::var("BFS_MAX_STEPS")
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .or(settings.max_steps);

    let cancel = Arc::new(AtomicBool::new(false));
    let watchdog = Arc::clone(&cancel);
    thread::spawn(move || {
        thread::sleep(Duration::from_millis(timeout_ms));
        watchdog.store(true, Ordering::Relaxed);
    });
    session
        .machine
        .set_step_control(StepControl::new(max_steps.map(|n| n as usize), cancel));

    // A fatal error already ended the run; only a clean stream gets the
    // end-of-input check.
    if session.submit(&s) {
        session.close();
    }
    Ok(())
}

struct OpHighlighter {
    // Per-char styles for the operators, and a fallback for commentary
    map_advance: Style,
    map_retreat: Style,
    map_increment: Style,
    map_decrement: Style,
    map_emit: Style,
    map_consume: Style,
    map_bracket: Style,
    map_other: Style,
}

impl OpHighlighter {
    fn from_settings() -> Self {
        let colors = &config::settings().colors;
        Self {
            map_advance: Style::new().fg(colors.op_advance).bold(),
            map_retreat: Style::new().fg(colors.op_retreat).bold(),
            map_increment: Style::new().fg(colors.op_increment).bold(),
            map_decrement: Style::new().fg(colors.op_decrement).bold(),
            map_emit: Style::new().fg(colors.op_emit).bold(),
            map_consume: Style::new().fg(colors.op_consume).bold(),
            map_bracket: Style::new().fg(colors.op_bracket).bold(),
            map_other: Style::new().fg(colors.commentary),
        }
    }

    #[inline]
    fn style_for(&self, ch: char) -> Style {
        match ch {
            '>' => self.map_advance,
            '<' => self.map_retreat,
            '+' => self.map_increment,
            '-' => self.map_decrement,
            '.' => self.map_emit,
            ',' => self.map_consume,
            '[' | ']' => self.map_bracket,
            _ => self.map_other,
        }
    }
}

impl Highlighter for OpHighlighter {
    fn highlight(&self, line: &str, _cursor: usize) -> StyledText {
        let mut out: StyledText = StyledText::new();
        let mut current_style: Option<Style> = None;
        let mut buffer = String::new();

        for ch in line.chars() {
            let style = self.style_for(ch);

            match current_style {
                None => {
                    current_style = Some(style);
                    buffer.push(ch);
                }
                Some(s) if s == style => {
                    buffer.push(ch);
                }
                Some(s) => {
                    out.push((s, std::mem::take(&mut buffer)));
                    current_style = Some(style);
                    buffer.push(ch);
                }
            }
        }

        if let Some(s) = current_style {
            if !buffer.is_empty() {
                out.push((s, buffer));
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn read_submission_reads_until_eof_multiple_lines() {
        let input = b"+++\n>+.\n";
        let mut cursor = Cursor::new(&input[..]);
        let got = read_submission(&mut cursor);
        assert_eq!(got.as_deref(), Some("+++\n>+.\n"));
    }

    #[test]
    fn read_submission_empty_returns_none() {
        let mut cursor = Cursor::new(Vec::<u8>::new());
        let got = read_submission(&mut cursor);
        assert!(got.is_none());
    }
}
