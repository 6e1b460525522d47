use anyhow::Result;

mod app;
mod logging;

use fsource::cli;

fn main() -> Result<()> {
    let args = cli::parse();
    app::run(args)
}
