use anyhow::Context;
use clap::Parser;
use std::process;
use wlk_import::cli::{args::Args, commands};

fn main() {
    let args = Args::parse();
    let root = args.root.clone();

    let result = commands::run(args)
        .with_context(|| format!("WLK import under {} failed", root.display()));

    if let Err(error) = result {
        eprintln!("Error: {:#}", error);
        process::exit(1);
    }
}
