use clap::Subcommand;
use coachsync_core::Config;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Get a config value
    Get {
        /// Config key (e.g. "matching.coach_patterns")
        key: String,
    },
    /// Set a config value
    Set {
        /// Config key
        key: String,
        /// New value: JSON array or comma-separated list for list keys
        value: String,
    },
    /// List all config values
    List,
    /// Show the effective matching rules (defaults included)
    Rules,
    /// Reset config to defaults
    Reset,
}

pub fn run(action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
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
            config.save()?;
            tracing::info!(%key, "config updated");
            println!("ok");
        }
        ConfigAction::List => {
            let config = Config::load()?;
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        ConfigAction::Rules => {
            let rules = Config::load()?.matching_rules();
            let json = serde_json::json!({
                "coaching_keywords": rules.coaching_keywords(),
                "class_keywords": rules.class_keywords(),
                "exclusion_keywords": rules.exclusion_keywords(),
                "coach_patterns": rules.coach_patterns(),
            });
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        ConfigAction::Reset => {
            let config = Config::default();
            config.save()?;
            println!("config reset to defaults");
        }
    }
    Ok(())
}
