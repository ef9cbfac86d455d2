use bf_stream::Interpreter;

fn main() {
    // The stream a REPL would deliver: one chunk per line, with a loop
    // spanning the chunk boundary. Prints "AB".
    let lines = ["++++++++[>++++", "++++<-]>+.", "+."];

    let mut bf = Interpreter::new();
    for line in lines {
        if let Err(err) = bf.feed(line) {
            eprintln!("interpreter error: {err}");
            std::process::exit(1);
        }
    }
    if let Err(err) = bf.finish() {
        eprintln!("interpreter error: {err}");
        std::process::exit(1);
    }

    println!();
}
