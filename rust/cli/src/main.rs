use std::io::{self, Write};

fn main() {
    let argv: Vec<String> = std::env::args().collect();
    let log_file = rangekpi_cli::config::load()
        .ok()
        .and_then(|cfg| rangekpi_cli::log_file_path(&argv, &cfg));
    if let Err(e) = rangekpi_cli::logging::init_logging(log_file.as_deref()) {
        let _ = writeln!(io::stderr(), "WARNING: {}", e);
    }

    let mut out = io::stdout();
    let mut err = io::stderr();
    let code = rangekpi_cli::run(argv, &mut out, &mut err);
    std::process::exit(code);
}
