mod app;
mod canvas;
mod config;
mod forces;
mod geometry;
mod solver;
mod surrogate;
mod sweep;
mod template;
mod tree;
mod visualize;

use clap::Parser;

use app::{run_app, Cli};

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run_app(cli) {
        tracing::error!("{}", e);
        std::process::exit(e.exit_code());
    }
}
