use crate::args::StageArgs;
use colored::Colorize;

/// Print the resolved stage configuration.
pub fn handle(stage: &StageArgs) -> anyhow::Result<()> {
    let (path, config) = super::load_stage(stage)?;

    match path {
        Some(path) => println!("Config file: {}", path.display().to_string().cyan()),
        None => println!("Config file: {}", "(none, using defaults)".dimmed()),
    }
    println!();

    for (key, value) in config.entries() {
        println!("  {:<28} {}", key, value);
    }

    Ok(())
}
