use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

fn main() {
    fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = hearthctl::Cli::parse();
    if let Err(err) = hearthctl::run(cli) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
