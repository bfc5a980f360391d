//! Supported leagues.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sport {
    Mlb,
    Nhl,
    Nba,
    Nfl,
    Xfl,
}

impl Sport {
    pub const ALL: [Sport; 5] = [Self::Mlb, Self::Nhl, Self::Nba, Self::Nfl, Self::Xfl];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mlb => "mlb",
            Self::Nhl => "nhl",
            Self::Nba => "nba",
            Self::Nfl => "nfl",
            Self::Xfl => "xfl",
        }
    }
}

impl fmt::Display for Sport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Sport {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mlb" | "baseball" => Ok(Self::Mlb),
            "nhl" | "hockey" => Ok(Self::Nhl),
            "nba" | "basketball" => Ok(Self::Nba),
            "nfl" | "football" => Ok(Self::Nfl),
            "xfl" => Ok(Self::Xfl),
            _ => Err(format!("Invalid sport: {s}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_aliases() {
        assert_eq!("MLB".parse::<Sport>(), Ok(Sport::Mlb));
        assert_eq!("hockey".parse::<Sport>(), Ok(Sport::Nhl));
        assert!("csgo".parse::<Sport>().is_err());
    }
}
