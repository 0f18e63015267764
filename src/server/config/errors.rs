use std::fmt;

#[derive(Debug)]
pub enum ConfigError {
    InvalidParameter { name: String, value: String },
    Io(std::io::Error),
    Yaml(serde_yaml::Error),
}

impl ConfigError {
    pub fn invalid(name: &str, value: impl fmt::Display) -> Self {
        ConfigError::InvalidParameter {
            name: name.to_string(),
            value: value.to_string(),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidParameter { name, value } => {
                write!(f, "Invalid parameter '{}' with value '{}'", name, value)
            }
            ConfigError::Io(err) => write!(f, "Config I/O error: {}", err),
            ConfigError::Yaml(err) => write!(f, "YAML error: {}", err),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidParameter { .. } => None,
            ConfigError::Io(err) => Some(err),
            ConfigError::Yaml(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> ConfigError {
        ConfigError::Io(err)
    }
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(err: serde_yaml::Error) -> ConfigError {
        ConfigError::Yaml(err)
    }
}
