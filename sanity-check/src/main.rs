use anyhow::Result;
use clap::Parser;
use sanity_check::{run, Args};

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let report = run(&args)?;
    log::info!("wrote {}", args.output.display());
    println!("{report}");
    Ok(())
}
