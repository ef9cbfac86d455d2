//! Stderr reporting for interpreter errors and warnings.

use std::io::{self, Write};

use crate::interp::{BracketWarning, InterpreterError};

/// Pretty-print a structured [`InterpreterError`] with caret positioning.
///
/// `ops` is the stripped operator stream the run was fed (positions in the
/// error index into it). If `program` is `Some("bfs")`, messages are
/// prefixed with "bfs: ..." for CLI use.
pub fn print_interp_error(program: Option<&str>, ops: &str, err: &InterpreterError) {
    let prefix_program = |msg: &str| {
        if let Some(p) = program {
            format!("{p}: {msg}")
        } else {
            msg.to_string()
        }
    };

    match err {
        InterpreterError::OutOfBounds {
            ip,
            head,
            direction,
        } => {
            let msg = prefix_program(&format!(
                "Runtime error: head out of bounds (head={head}, move={direction})"
            ));
            print_error_with_context(&msg, ops, *ip);
        }
        InterpreterError::UnexpectedCloseBracket { ip } => {
            let msg = prefix_program("Parse error: unexpected ']'");
            print_error_with_context(&msg, ops, *ip);
        }
        InterpreterError::UnterminatedLoop { depth, open_ip } => {
            let msg = prefix_program(&format!(
                "Parse error: unterminated loop ({depth} open '[')"
            ));
            print_error_with_context(&msg, ops, *open_ip);
        }
        InterpreterError::Io { ip, source } => {
            let msg = prefix_program(&format!("I/O error: {source}"));
            print_error_with_context(&msg, ops, *ip);
        }
        // Abort conditions have no meaningful source position.
        InterpreterError::StepLimitExceeded { .. } | InterpreterError::Canceled => {
            eprintln!("{}", prefix_program(&err.to_string()));
            let _ = io::stderr().flush();
        }
    }
}

/// Print lenient-policy bracket warnings, one caret context each.
pub fn print_bracket_warnings(program: Option<&str>, ops: &str, warnings: &[BracketWarning]) {
    for w in warnings {
        let msg = match program {
            Some(p) => format!("{p}: warning: unexpected ']' (skipped)"),
            None => "warning: unexpected ']' (skipped)".to_string(),
        };
        print_error_with_context(&msg, ops, w.ip);
    }
}

/// Print a concise message with operator index and a caret context window.
///
/// The operator stream is ASCII by construction, so positions slice it
/// directly.
pub fn print_error_with_context(prefix: &str, ops: &str, pos: usize) {
    eprintln!("{prefix} at operator {pos}");

    // Show a short window around the position for context
    const WINDOW: usize = 32;

    let start = pos.saturating_sub(WINDOW);
    let end = (pos + WINDOW + 1).min(ops.len());
    if start < end {
        eprintln!("  {}", &ops[start..end]);

        // Caret under the exact position
        let mut underline = String::new();
        for _ in 0..pos.saturating_sub(start) {
            underline.push(' ');
        }
        underline.push('^');
        eprintln!("  {}", underline);
    }
    let _ = io::stderr().flush();
}
