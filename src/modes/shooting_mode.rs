use crate::errors::AppError;
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

/// The five lighting presets a session can run under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShootingMode {
    Day,
    Night,
    Sunrise,
    Sunset,
    Custom,
}

impl ShootingMode {
    pub const ALL: [ShootingMode; 5] = [
        ShootingMode::Day,
        ShootingMode::Night,
        ShootingMode::Sunrise,
        ShootingMode::Sunset,
        ShootingMode::Custom,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ShootingMode::Day => "day",
            ShootingMode::Night => "night",
            ShootingMode::Sunrise => "sunrise",
            ShootingMode::Sunset => "sunset",
            ShootingMode::Custom => "custom",
        }
    }
}

impl fmt::Display for ShootingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ShootingMode {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "day" => Ok(ShootingMode::Day),
            "night" => Ok(ShootingMode::Night),
            "sunrise" => Ok(ShootingMode::Sunrise),
            "sunset" => Ok(ShootingMode::Sunset),
            "custom" => Ok(ShootingMode::Custom),
            other => Err(AppError::InvalidMode(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_all_known_modes() {
        for mode in ShootingMode::ALL {
            assert_eq!(mode.as_str().parse::<ShootingMode>().unwrap(), mode);
        }
        assert_eq!(" Day ".parse::<ShootingMode>().unwrap(), ShootingMode::Day);
    }

    #[test]
    fn rejects_unknown_mode() {
        let err = "eclipse".parse::<ShootingMode>().unwrap_err();
        assert!(matches!(err, AppError::InvalidMode(ref m) if m == "eclipse"));
    }
}
