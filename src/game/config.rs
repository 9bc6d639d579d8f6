// Copyright 2023 Tobin Edwards
//
//    Licensed under the Apache License, Version 2.0 (the "License");
//    you may not use this file except in compliance with the License.
//    You may obtain a copy of the License at
//
//        http://www.apache.org/licenses/LICENSE-2.0
//
//    Unless required by applicable law or agreed to in writing, software
//    distributed under the License is distributed on an "AS IS" BASIS,
//    WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//    See the License for the specific language governing permissions and
//    limitations under the License.


use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use crate::{Color, DEFAULT_CLOCK_SECONDS};

pub const DEFAULT_DELIBERATION_MS: u64 = 1000;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid game config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("clock_seconds must be greater than zero")]
    ZeroClock,
}

/// Which side, if any, the computer plays.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Computer {
    Off,
    White,
    #[default]
    Black,
}

impl Computer {
    pub fn color(&self) -> Option<Color> {
        match self {
            Computer::Off => None,
            Computer::White => Some(Color::White),
            Computer::Black => Some(Color::Black),
        }
    }
}

/// Settings for a session. Every field has a default so a config file only
/// needs to name what it changes.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct GameConfig {
    pub clock_seconds: u32,
    pub timed: bool,
    pub computer: Computer,
    pub deliberation_ms: u64,
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            clock_seconds: DEFAULT_CLOCK_SECONDS,
            timed: false,
            computer: Computer::default(),
            deliberation_ms: DEFAULT_DELIBERATION_MS,
            seed: None,
        }
    }
}

impl GameConfig {
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.clock_seconds == 0 {
            return Err(ConfigError::ZeroClock);
        }
        Ok(())
    }

    #[inline]
    pub fn deliberation(&self) -> Duration {
        Duration::from_millis(self.deliberation_ms)
    }

    #[inline]
    pub fn computer_color(&self) -> Option<Color> {
        self.computer.color()
    }
}
