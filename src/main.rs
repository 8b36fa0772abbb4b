use clap::Parser;

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = molt::cli::Cli::parse();
    molt::cli::run(cli)
}
