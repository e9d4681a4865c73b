//! `config.toml` commands. Keys are dot paths into the `[hyperfocus]` and
//! `[energy]` sections.

use clap::Subcommand;
use kai_focus_core::Config;

use super::CmdResult;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Get a config value
    Get {
        /// Config key (e.g. "hyperfocus.gentle_after_min", "energy.recent_window")
        key: String,
    },
    /// Set a config value; the whole file is validated before saving
    Set {
        /// Config key
        key: String,
        /// New value ("none" clears energy.encouragement_seed)
        value: String,
    },
    /// Print the config file location and its contents
    List,
    /// Restore defaults for one section, or for everything
    Reset {
        /// Section to reset: "hyperfocus" or "energy"
        section: Option<String>,
    },
}

pub fn run(action: ConfigAction) -> CmdResult {
    match action {
        ConfigAction::Get { key } => {
            let config = Config::load()?;
            match config.get(&key) {
                Some(value) => println!("{value}"),
                None => return Err(format!("unknown key: {key}").into()),
            }
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load()?;
            config.set(&key, &value)?;
            let stored = config.get(&key).unwrap_or(value);
            println!("{key} = {stored}");
        }
        ConfigAction::List => {
            let config = Config::load()?;
            println!("# {}", Config::file_path()?.display());
            print!("{}", toml::to_string_pretty(&config)?);
        }
        ConfigAction::Reset { section: None } => {
            Config::default().save()?;
            println!("config reset to defaults");
        }
        ConfigAction::Reset {
            section: Some(section),
        } => {
            let mut config = Config::load()?;
            config.reset_section(&section)?;
            config.save()?;
            println!("[{section}] reset to defaults");
        }
    }
    Ok(())
}
