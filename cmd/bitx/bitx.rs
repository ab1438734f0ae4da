mod cli;

use clap::Parser;
use tracing_subscriber::{
    EnvFilter, Layer, Registry, filter::Directive, fmt, layer::SubscriberExt,
};

fn init_tracing(opts: &cli::Options) {
    let log_filter = EnvFilter::builder()
        .with_default_directive(Directive::from(opts.log_level))
        .from_env_lossy();
    let subscriber = Registry::default().with(fmt::layer().with_filter(log_filter));
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");
}

fn main() {
    let cli = cli::CLI::parse();
    init_tracing(&cli.opts);

    if let Err(report) = cli::run(cli) {
        eprintln!("bitx: {report}");
        std::process::exit(1);
    }
}
