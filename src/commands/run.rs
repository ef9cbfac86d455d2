use clap::Args;
use std::{fs, thread};
use std::io::{self, Write};
use std::sync::{mpsc, Arc};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crate::{config, lexer};
use crate::cli_util::{print_bracket_warnings, print_interp_error};
use crate::interp::{BracketPolicy, BracketWarning, Interpreter, InterpreterError, StepControl};

#[derive(Args, Debug)]
#[command(disable_help_flag = true)]
pub struct RunArgs {
    /// Abort on a stray ']' instead of warning and continuing
    #[arg(long = "strict")]
    pub strict: bool,

    /// Tape length in cells (default 30,000 or the configured value)
    #[arg(long = "tape-size", value_name = "CELLS")]
    pub tape_size: Option<usize>,

    /// Read code from PATH instead of positional "<code>"
    #[arg(short = 'f', long = "file")]
    pub file: Option<String>,

    /// Concatenated code parts
    #[arg(value_name = "code", trailing_var_arg = true)]
    pub code: Vec<String>,

    /// Wall-clock timeout in milliseconds (fallback BFS_TIMEOUT_MS; default 2_000)
    #[arg(long = "timeout", value_name = "MS")]
    pub timeout_ms: Option<u64>,

    /// Maximum interpreter steps before abort (fallback BFS_MAX_STEPS; default unlimited)
    #[arg(long = "max-steps", value_name = "N")]
    pub max_steps: Option<u64>,

    /// Show this help
    #[arg(short = 'h', long = "help", action = clap::ArgAction::SetTrue)]
    pub help: bool,
}

pub fn run(program: &str, args: RunArgs) -> i32 {
    if args.help {
        usage_and_exit(program, 0);
    }

    let RunArgs {
        strict,
        tape_size,
        file,
        code,
        timeout_ms,
        max_steps,
        ..
    } = args;

    if file.is_none() && code.is_empty() {
        usage_and_exit(program, 2);
    }

    if file.is_some() && !code.is_empty() {
        eprintln!("{program}: cannot use positional code together with --file");
        usage_and_exit(program, 2);
    }

    let code_str = if let Some(path) = file {
        match fs::read_to_string(&path) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("{program}: failed to read code file as UTF-8: {e}");
                let _ = io::stderr().flush();
                return 1;
            }
        }
    } else {
        code.join("")
    };

    let settings = config::settings();

    // Resolve limits: flags -> env -> config -> defaults
    let timeout_ms = timeout_ms
        .or_else(|| std::env::var("BFS_TIMEOUT_MS").ok().and_then(|s| s.parse::<u64>().ok()))
        .unwrap_or(settings.timeout_ms);
    let max_steps = max_steps
        .or_else(|| std::env::var("BFS_MAX_STEPS").ok().and_then(|s| s.parse::<u64>().ok()))
        .or(settings.max_steps);
    let tape_len = tape_size.unwrap_or(settings.tape_len);
    let policy = if strict {
        BracketPolicy::Strict
    } else {
        settings.bracket_policy
    };

    // Error positions index the stripped operator stream, so keep it for
    // the caret context.
    let ops = lexer::strip(&code_str);

    // Execute on a worker thread with cooperative cancellation
    let cancel = Arc::new(AtomicBool::new(false));
    let (tx, rx) = mpsc::channel::<(Result<(), InterpreterError>, Vec<BracketWarning>)>();
    let program_owned = code_str.clone();
    let cancel_clone = cancel.clone();

    thread::spawn(move || {
        let mut bf = Interpreter::with_tape_len(tape_len);
        bf.set_bracket_policy(policy);
        bf.set_step_control(StepControl::new(
            max_steps.map(|n| n as usize),
            cancel_clone,
        ));
        let res = bf.run(&program_owned);
        let warnings = bf.warnings().to_vec();
        let _ = tx.send((res, warnings));
    });

    let timeout = Duration::from_millis(timeout_ms);
    let exit_code = match rx.recv_timeout(timeout) {
        Ok((result, warnings)) => {
            print_bracket_warnings(Some(program), &ops, &warnings);
            match result {
                Ok(()) => 0,
                Err(InterpreterError::StepLimitExceeded { limit }) => {
                    eprintln!("Execution aborted: step limit exceeded ({limit})");
                    let _ = io::stderr().flush();
                    1
                }
                Err(InterpreterError::Canceled) => {
                    eprintln!("Execution aborted: wall-clock timeout exceeded ({timeout_ms} ms)");
                    let _ = io::stderr().flush();
                    1
                }
                Err(other) => {
                    print_interp_error(Some(program), &ops, &other);
                    let _ = io::stderr().flush();
                    1
                }
            }
        }
        Err(mpsc::RecvTimeoutError::Timeout) => {
            cancel.store(true, Ordering::Relaxed);
            eprintln!("Execution aborted: wall-clock timeout exceeded ({timeout_ms} ms)");
            let _ = io::stderr().flush();
            1
        }
        Err(mpsc::RecvTimeoutError::Disconnected) => 1,
    };

    println!();
    let _ = io::stdout().flush();
    exit_code
}

fn usage_and_exit(program: &str, code: i32) -> ! {
    eprintln!(
        r#"Usage:
  {0} run [--strict] "<code>"
  {0} run [--strict] --file <PATH>

Options:
  --file,  -f <PATH>   Read code from PATH instead of positional "<code>"
  --strict             Abort on a stray ']' instead of warning and continuing
  --tape-size <CELLS>  Tape length in cells (default 30,000)
  --timeout <MS>       Wall-clock timeout in milliseconds (fallback BFS_TIMEOUT_MS; default 2_000)
  --max-steps <N>      Maximum interpreter steps before abort (fallback BFS_MAX_STEPS)
  --help,  -h          Show this help

Notes:
- Input (`,`) reads a single byte from stdin; at end of input the current cell is set to 0.
- Characters outside of ><+-.,[] are comments and are ignored.
- A stray ']' is reported as a warning and skipped unless --strict is given.
- A '[' left open at end of input is an unterminated-loop error.

Examples:
- Load code from a file:
    {0} run --file ./program.bf
- Read bytes from a file as stdin (`,` will consume file input):
    {0} run ",[.,]" < input.txt
"#,
        program
    );
    let _ = io::stderr().flush();
    std::process::exit(code);
}
