use anyhow::{anyhow, Context, Result};
use log::Level;
use std::env;
use std::fmt;

pub const ENV_VAR_MAX_DEPTH: &str = "SDB2_MAX_DEPTH";

pub const ENV_VAR_DIAG_LEVEL: &str = "SDB2_DIAG_LEVEL";

pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Settings passed into every codec entry point.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct CodecConfig {
    /// How many containers deep the serializer and deserializer will recurse.
    /// The root block is depth 0.
    pub max_depth: usize,

    /// Level at which recoverable format problems are logged; `None` silences them.
    pub diag_level: Option<Level>,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            diag_level: Some(Level::Debug),
        }
    }
}

impl CodecConfig {
    pub fn from_env() -> Result<Self> {
        let mut cfg = Self::default();
        if let Ok(s) = env::var(ENV_VAR_MAX_DEPTH) {
            cfg.max_depth = s
                .parse()
                .with_context(|| format!("{ENV_VAR_MAX_DEPTH}={s:?}"))?;
        }
        if let Ok(s) = env::var(ENV_VAR_DIAG_LEVEL) {
            cfg.diag_level = parse_diag_level(&s)?;
        }
        Ok(cfg)
    }

    pub fn silent() -> Self {
        Self {
            diag_level: None,
            ..Self::default()
        }
    }

    pub(crate) fn diag(&self, args: fmt::Arguments) {
        if let Some(level) = self.diag_level {
            log::log!(level, "{args}");
        }
    }
}

fn parse_diag_level(s: &str) -> Result<Option<Level>> {
    if s.eq_ignore_ascii_case("off") {
        return Ok(None);
    }
    let level = s
        .parse::<Level>()
        .map_err(|e| anyhow!("{ENV_VAR_DIAG_LEVEL}={s:?}: {e}"))?;
    Ok(Some(level))
}
