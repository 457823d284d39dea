fn main() {
    if let Err(err) = stock_pulse::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
