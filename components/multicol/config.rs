/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Tunables for the fragmentation engine.

use std::fmt;

use app_units::Au;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct MulticolConfig {
    /// Upper bound of the number of columns in a fragmentainer group. Keeps
    /// pathological content heights and tiny columns from producing an
    /// unbounded amount of fragmentainers.
    pub max_actual_column_count: u32,
    /// Half of the extent, in CSS pixels, of the rectangle used where column
    /// overflow is not clipped.
    pub overflow_clip_extent: f32,
    /// Smallest known column block size, in CSS pixels.
    pub min_column_block_size: f32,
}

impl Default for MulticolConfig {
    fn default() -> Self {
        Self {
            max_actual_column_count: 10000,
            overflow_clip_extent: 1_000_000.,
            min_column_block_size: 1.,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    /// The configuration is not valid JSON, or has fields of the wrong type.
    Parse(serde_json::Error),
    /// A field has a value the engine cannot work with.
    InvalidValue {
        name: &'static str,
        reason: &'static str,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            ConfigError::Parse(ref error) => write!(f, "Could not parse multicol config: {}", error),
            ConfigError::InvalidValue { name, reason } => {
                write!(f, "Invalid value for {}: {}", name, reason)
            },
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match *self {
            ConfigError::Parse(ref error) => Some(error),
            ConfigError::InvalidValue { .. } => None,
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(error: serde_json::Error) -> Self {
        ConfigError::Parse(error)
    }
}

impl MulticolConfig {
    /// Parses a configuration from JSON. Missing fields take their default value.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_actual_column_count == 0 {
            return Err(ConfigError::InvalidValue {
                name: "max_actual_column_count",
                reason: "must be at least 1",
            });
        }
        validate_length("overflow_clip_extent", self.overflow_clip_extent)?;
        validate_length("min_column_block_size", self.min_column_block_size)?;
        if !servo_geometry::fits_symmetric_rect(self.overflow_clip_extent()) {
            return Err(ConfigError::InvalidValue {
                name: "overflow_clip_extent",
                reason: "twice the extent does not fit in app units",
            });
        }
        if self.overflow_clip_extent().to_f32_px() != self.overflow_clip_extent {
            return Err(ConfigError::InvalidValue {
                name: "overflow_clip_extent",
                reason: "not exactly representable in app units",
            });
        }
        Ok(())
    }

    pub fn overflow_clip_extent(&self) -> Au {
        Au::from_f32_px(self.overflow_clip_extent)
    }

    pub fn min_column_block_size(&self) -> Au {
        Au::from_f32_px(self.min_column_block_size)
    }
}

fn validate_length(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if !value.is_finite() {
        return Err(ConfigError::InvalidValue {
            name,
            reason: "must be finite",
        });
    }
    if value <= 0. {
        return Err(ConfigError::InvalidValue {
            name,
            reason: "must be positive",
        });
    }
    Ok(())
}
