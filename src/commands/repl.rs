use std::io::{self, IsTerminal, Write};
use clap::Args;

use crate::config;
use crate::interp::BracketPolicy;
use crate::repl::{execute_bare_once, repl_loop, select_mode, ModeFlagOverride, ReplMode};

#[derive(Args, Debug, Default)]
#[command(disable_help_flag = true)]
pub struct ReplArgs {
    /// Force non-interactive bare mode
    #[arg(long = "bare", conflicts_with = "editor")]
    pub bare: bool,

    /// Force interactive mode (errors if stdin is not a TTY)
    #[arg(long = "editor", conflicts_with = "bare")]
    pub editor: bool,

    /// Abort on a stray ']' instead of warning and continuing
    #[arg(long = "strict")]
    pub strict: bool,

    /// Show this help
    #[arg(short = 'h', long = "help", action = clap::ArgAction::SetTrue)]
    pub help: bool,
}

// Public entry point for the REPL from main.rs
pub fn run(program: &str, args: ReplArgs) -> i32 {
    if args.help {
        usage_and_exit(program, 0);
    }

    let mode_flag = if args.bare {
        ModeFlagOverride::Bare
    } else if args.editor {
        ModeFlagOverride::Editor
    } else {
        ModeFlagOverride::None
    };

    // Determine mode: flags -> env -> auto-detect via is_terminal()
    let mode = match select_mode(mode_flag) {
        Ok(m) => m,
        Err(msg) => {
            eprintln!("{program}: {msg}");
            let _ = io::stderr().flush();
            return 1;
        }
    };

    let settings = config::settings();
    let tape_len = settings.tape_len;
    let policy = if args.strict {
        BracketPolicy::Strict
    } else {
        settings.bracket_policy
    };

    // Install SIGINT (ctrl+c) handler to flush and exit(0) immediately
    if let Err(e) = ctrlc::set_handler(|| {
        let _ = io::stdout().flush();
        let _ = io::stderr().flush();
        std::process::exit(0);
    }) {
        eprintln!("{program}: failed to set ctrl+c handler: {e}");
        let _ = io::stderr().flush();
        return 1;
    }

    match mode {
        ReplMode::Editor => {
            // Print banners/prompts only if stderr is a TTY
            if io::stderr().is_terminal() {
                eprintln!("bf-stream REPL (interactive editor mode)");
                eprintln!(
                    "Tape, head and open loops persist across lines. \
                     Type :help for meta commands; ctrl+c or ctrl+d exits"
                );
                let _ = io::stderr().flush();
            }

            if let Err(e) = repl_loop(tape_len, policy) {
                eprintln!("{program}: REPL error: {e}");
                let _ = io::stderr().flush();
                return 1;
            }

            0
        }
        ReplMode::Bare => {
            // Bare mode: read stdin until EOF, execute once, exit 0
            match execute_bare_once(tape_len, policy) {
                Ok(_) => 0,
                Err(e) => {
                    eprintln!("{program}: REPL error: {e}");
                    let _ = io::stderr().flush();
                    1
                }
            }
        }
    }
}

fn usage_and_exit(program: &str, code: i32) -> ! {
    eprintln!(
        r#"Usage:
  {0} repl   # Start a streaming REPL (read-eval-print loop)

Options:
  --help,   -h        Show this help
  --bare              Force non-interactive bare mode
  --editor            Force interactive editor mode (errors if stdin is not a TTY)
  --strict            Abort on a stray ']' instead of warning and continuing

Description:
  Starts a REPL backed by ONE persistent streaming interpreter: tape, head
  and any open loop survive across lines, and a '[' left open turns the
  prompt into a continuation prompt until its ']' arrives.

Meta commands (line starts with ":")
  :help            Show meta command help
  :tape            Show head position and a window of cells around it
  :reset           Fresh machine (tape, head, warnings and open loops cleared)
  :exit            End the session (reports a loop left open, exits 0)

Notes:
    - Enter submits the current line; each line is one chunk of the stream.
    - Non-operator characters are comments and are ignored.
    - Ctrl+C or Ctrl+D exits; an open loop is reported as unterminated.
    - Mode selection:
        * Flags: --bare|--editor override environment and auto-detection.
        * Env: BFS_REPL_MODE=bare|editor overrides auto-detection (flags, when present, will override env).
        * Auto-detect: if stdin is a TTY, starts in interactive editor mode; otherwise, bare mode.
        * Prompts/banners suppressed if stderr is not a TTY.
    - The REPL will exit after a single execution if the environment variable `BFS_REPL_ONCE` is set to `1`.
"#,
        program
    );
    let _ = io::stderr().flush();
    std::process::exit(code);
}
