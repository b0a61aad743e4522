//! Command line definitions using clap.

use clap::Parser;
use std::path::PathBuf;

/// Coffee house - an actor simulation of guests, a waiter and baristas
#[derive(Parser, Debug)]
#[command(name = "coffee-house")]
#[command(version)]
#[command(
    long_about = "Runs a coffee house where guests order, baristas prepare and a waiter serves, all as supervised actors. Guests are created from the interactive terminal."
)]
pub struct Cli {
    /// JSON settings file, keys nested under "coffee-house"
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Name of the coffee house, used in logs
    #[arg(short, long, default_value = "coffee-house")]
    pub name: String,

    /// Override a setting, e.g. -Dcoffee-house.caffeine-limit=5
    #[arg(short = 'D', value_name = "KEY=VALUE", value_parser = parse_key_val)]
    pub overrides: Vec<(String, String)>,
}

fn parse_key_val(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got `{}`", raw))?;

    let key = key.trim();
    if key.is_empty() {
        return Err(format!("missing key in `{}`", raw));
    }
    Ok((key.to_string(), value.trim().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["coffee-house"]).unwrap();
        assert_eq!(cli.name, "coffee-house");
        assert!(cli.config.is_none());
        assert!(cli.overrides.is_empty());
    }

    #[test]
    fn test_overrides_and_config() {
        let cli = Cli::try_parse_from([
            "coffee-house",
            "--config",
            "house.json",
            "-Dcoffee-house.caffeine-limit=5",
            "-D",
            "coffee-house.barista.accuracy=90",
            "--name",
            "corner-cafe",
        ])
        .unwrap();

        assert_eq!(cli.config, Some(PathBuf::from("house.json")));
        assert_eq!(cli.name, "corner-cafe");
        assert_eq!(
            cli.overrides,
            vec![
                ("coffee-house.caffeine-limit".to_string(), "5".to_string()),
                ("coffee-house.barista.accuracy".to_string(), "90".to_string()),
            ]
        );
    }

    #[test]
    fn test_malformed_override_is_rejected() {
        assert!(Cli::try_parse_from(["coffee-house", "-Dcaffeine-limit"]).is_err());
        assert!(Cli::try_parse_from(["coffee-house", "-D=5"]).is_err());
    }
}
