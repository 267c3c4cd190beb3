mod app;
mod cli;

use app::App;
use clap::Parser;
use cli::Args;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args = Args::parse();
    let app = App::new(args)?;
    app.run()?;

    Ok(())
}
