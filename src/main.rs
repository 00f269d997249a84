fn main() {
    if let Err(e) = porting_presence::run() {
        eprintln!("{e}");
        std::process::exit(1);
    }
}
