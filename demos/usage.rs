use bf_stream::Interpreter;

fn main() {
    // Classic Brainfuck "Hello World!" program
    let code = "++++++++++[>+++++++>++++++++++>+++>+<<<<-]>++.>+.+++++++..+++.>++.<<+++++++++++++++.>.+++.------.--------.>+.>.";

    let mut bf = Interpreter::new();

    if let Err(err) = bf.run(code) {
        eprintln!("interpreter error: {err}");
        std::process::exit(1);
    }

    // Print a newline after the program output for readability
    println!();
}
