use bf_stream::commands;
use clap::{Parser, Subcommand};
use std::env;
use std::io::{self, Write};

fn print_top_usage_and_exit(program: &str, code: i32) -> ! {
    eprintln!(
        r#"Usage:
  {0} run  [--strict] "<code>"      # Run code (args are concatenated)
  {0} run  [--strict] --file <PATH> # Run code loaded from file
  {0} repl [--bare|--editor]        # Start a streaming REPL (state persists across lines)

With no subcommand, {0} starts the REPL: piped stdin executes once in bare
mode, a TTY gets the interactive editor.

Run "{0} <subcommand> --help" for more info.
"#,
        program
    );
    let _ = io::stderr().flush();
    std::process::exit(code);
}

#[derive(Parser, Debug)]
#[command(name = "bfs", disable_help_flag = true, disable_help_subcommand = true)]
struct Cli {
    /// Show this help
    #[arg(short = 'h', long = "help", action = clap::ArgAction::SetTrue)]
    help: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    Run(commands::run::RunArgs),
    Repl(commands::repl::ReplArgs),
}

fn main() {
    // We still pull the program name for help rendering consistency
    let program = env::args().next().unwrap_or_else(|| String::from("bfs"));

    let cli = Cli::parse();

    if cli.help {
        print_top_usage_and_exit(&program, 0);
    }

    let code = match cli.command {
        Some(Command::Run(args)) => commands::run::run(&program, args),
        Some(Command::Repl(args)) => commands::repl::run(&program, args),
        // Bare `bfs` defers to the REPL's mode auto-detection so that piped
        // programs just run.
        None => commands::repl::run(&program, commands::repl::ReplArgs::default()),
    };

    std::process::exit(code);
}
