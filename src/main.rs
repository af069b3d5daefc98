use clap::Parser;
use histcalc::cli::{run, Cli};

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let code = run(Cli::parse())?;
    if code != 0 {
        std::process::exit(code);
    }
    Ok(())
}
