//! Runtime configuration.

/// Runtime configuration options.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Store integer-valued attributes in raw `Int` slots.
    pub unbox_ints: bool,
    /// Store float-valued attributes in raw `Float` slots.
    pub unbox_floats: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            unbox_ints: true,
            unbox_floats: true,
        }
    }
}

impl RuntimeConfig {
    /// Defaults, overridden by `RU_UNBOX_INTS` / `RU_UNBOX_FLOATS`.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(v) = env_flag("RU_UNBOX_INTS") {
            config.unbox_ints = v;
        }
        if let Some(v) = env_flag("RU_UNBOX_FLOATS") {
            config.unbox_floats = v;
        }
        config
    }
}

fn env_flag(key: &str) -> Option<bool> {
    let raw = std::env::var(key).ok()?;
    parse_flag(&raw)
}

fn parse_flag(raw: &str) -> Option<bool> {
    let raw = raw.trim();
    if raw == "1" || raw.eq_ignore_ascii_case("true") || raw.eq_ignore_ascii_case("on") {
        Some(true)
    } else if raw == "0" || raw.eq_ignore_ascii_case("false") || raw.eq_ignore_ascii_case("off") {
        Some(false)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::{RuntimeConfig, parse_flag};

    #[test]
    fn flag_parsing() {
        assert_eq!(parse_flag("1"), Some(true));
        assert_eq!(parse_flag(" TRUE "), Some(true));
        assert_eq!(parse_flag("off"), Some(false));
        assert_eq!(parse_flag("maybe"), None);
    }

    #[test]
    fn env_overrides_defaults() {
        // Only this test touches these variables.
        unsafe {
            std::env::set_var("RU_UNBOX_INTS", "0");
            std::env::set_var("RU_UNBOX_FLOATS", "garbage");
        }
        let config = RuntimeConfig::from_env();
        unsafe {
            std::env::remove_var("RU_UNBOX_INTS");
            std::env::remove_var("RU_UNBOX_FLOATS");
        }
        assert!(!config.unbox_ints);
        assert!(config.unbox_floats);
    }
}
