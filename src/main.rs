use std::process;

fn main() {
    if let Err(e) = tsk::cli::run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
