use std::str::FromStr;

use super::ConfigError;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum Environment {
    #[cfg_attr(not(feature = "production"), default)]
    Development,
    #[cfg_attr(feature = "production", default)]
    Production,
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let environment = match value {
            "development" => Environment::Development,
            "production" => Environment::Production,
            _ => return Err(ConfigError("invalid environment type")),
        };
        Ok(environment)
    }
}
