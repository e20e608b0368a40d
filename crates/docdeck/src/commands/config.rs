use colored::Colorize;

use crate::cli::ConfigCommands;
use crate::config::Config;

pub fn run(command: ConfigCommands) -> anyhow::Result<()> {
    match command {
        ConfigCommands::Show => {
            let config = Config::load_or_default();
            println!("{}", "docdeck configuration".bold());
            if let Ok(path) = Config::path() {
                println!("{} {}", "file:".dimmed(), path.display());
            }
            println!();
            let yaml = serde_yaml::to_string(&config)?;
            if yaml.trim() == "{}" {
                println!("{}", "(all defaults)".dimmed());
                println!();
                println!("Available keys:");
                println!("  defaults.theme       light | dark");
                println!("  defaults.start_mode  first | overview | <slide number>");
                println!("  defaults.controls    full | minimal | none");
            } else {
                print!("{yaml}");
            }
            Ok(())
        }
        ConfigCommands::Set { key, value } => {
            let mut config = Config::load_or_default();
            config.set(&key, &value)?;
            let path = config.save()?;
            println!(
                "{} {} = {} ({})",
                "updated".green().bold(),
                key,
                value,
                path.display()
            );
            Ok(())
        }
    }
}
