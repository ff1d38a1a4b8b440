//! Bridge configuration.

use crate::error::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::path::PathBuf;

/// Configuration for one bridge instance.
///
/// The two stream paths are the whole protocol surface; everything else is
/// identification used for logging.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// Path of the stream requests are read from.
    pub input: PathBuf,
    /// Path of the stream responses are written to.
    pub output: PathBuf,
    pub name: Cow<'static, str>,
    pub version: Cow<'static, str>,
}

impl BridgeConfig {
    pub fn new(input: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            name: env!("CARGO_PKG_NAME").into(),
            version: env!("CARGO_PKG_VERSION").into(),
        }
    }

    pub fn builder() -> BridgeConfigBuilder {
        BridgeConfigBuilder::default()
    }
}

/// Builder for [`BridgeConfig`].
#[derive(Default)]
pub struct BridgeConfigBuilder {
    input: Option<PathBuf>,
    output: Option<PathBuf>,
    name: Option<Cow<'static, str>>,
    version: Option<Cow<'static, str>>,
}

impl BridgeConfigBuilder {
    pub fn input(mut self, input: impl Into<PathBuf>) -> Self {
        self.input = Some(input.into());
        self
    }

    pub fn output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = Some(output.into());
        self
    }

    pub fn name(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn version(mut self, version: impl Into<Cow<'static, str>>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn build(self) -> Result<BridgeConfig> {
        let input = self
            .input
            .ok_or(ConfigError::MissingField("input".into()))?;
        let output = self
            .output
            .ok_or(ConfigError::MissingField("output".into()))?;

        if input.as_os_str().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "input".into(),
                message: "Path must not be empty".into(),
            }
            .into());
        }
        if output.as_os_str().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "output".into(),
                message: "Path must not be empty".into(),
            }
            .into());
        }

        Ok(BridgeConfig {
            input,
            output,
            name: self.name.unwrap_or_else(|| env!("CARGO_PKG_NAME").into()),
            version: self
                .version
                .unwrap_or_else(|| env!("CARGO_PKG_VERSION").into()),
        })
    }
}
