use std::fmt;
use std::str::FromStr;

// ============================================================================
// Domain Models
// ============================================================================

/// A drink on the coffee house menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Coffee {
    Akkaccino,
    MochaPlay,
    CaffeJava,
}

impl Coffee {
    /// The drink a barista hands out when the order goes wrong.
    ///
    /// Walks the menu in order, so the result is always a different coffee.
    pub fn substitute(self) -> Coffee {
        match self {
            Coffee::Akkaccino => Coffee::MochaPlay,
            Coffee::MochaPlay => Coffee::CaffeJava,
            Coffee::CaffeJava => Coffee::Akkaccino,
        }
    }
}

impl fmt::Display for Coffee {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Coffee::Akkaccino => "Akkaccino",
            Coffee::MochaPlay => "MochaPlay",
            Coffee::CaffeJava => "CaffeJava",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown coffee: {0}")]
pub struct UnknownCoffee(pub String);

impl FromStr for Coffee {
    type Err = UnknownCoffee;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "a" | "akkaccino" => Ok(Coffee::Akkaccino),
            "m" | "mochaplay" => Ok(Coffee::MochaPlay),
            "c" | "caffejava" => Ok(Coffee::CaffeJava),
            _ => Err(UnknownCoffee(s.to_string())),
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
