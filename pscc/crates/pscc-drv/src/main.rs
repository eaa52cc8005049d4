fn main() {
    if let Err(error) = pscc_drv::run_cli() {
        eprintln!("eroare: {error:#}");
        std::process::exit(1);
    }
}
