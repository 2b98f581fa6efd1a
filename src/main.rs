use clap::Parser;
use tracing_subscriber::FmtSubscriber;
use trendcost::cli::{Cli, run};

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(cli.max_level())
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("warning: failed to install logger: {e}");
    }

    run(cli)
}
