//! GridPaint command-line entry point.

mod cli;

use clap::Parser;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = cli::Cli::parse();
    let mut stdout = std::io::stdout().lock();
    if let Err(e) = cli::run(args, &mut stdout) {
        log::error!("{}", e);
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
