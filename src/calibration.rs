//! Per-channel sensor calibration.
//!
//! Each channel carries a quadratic correction `v² · mult2 + v · mult + offset`.
//! The defaults are the identity transform.

use serde::{Deserialize, Serialize};

/// Quadratic correction for one physical channel
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelCalibration {
    pub offset: f64,
    pub mult: f64,
    pub mult2: f64,
}

impl Default for ChannelCalibration {
    fn default() -> Self {
        Self {
            offset: 0.0,
            mult: 1.0,
            mult2: 0.0,
        }
    }
}

impl ChannelCalibration {
    pub fn new(offset: f64, mult: f64, mult2: f64) -> Self {
        Self {
            offset,
            mult,
            mult2,
        }
    }

    pub fn calibrate(&self, value: f64) -> f64 {
        value * value * self.mult2 + value * self.mult + self.offset
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::default()
    }
}

/// Calibration table covering every channel the station reports
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Calibration {
    pub temp: ChannelCalibration,
    pub in_temp: ChannelCalibration,
    pub hum: ChannelCalibration,
    pub in_hum: ChannelCalibration,
    pub press: ChannelCalibration,
    pub rain: ChannelCalibration,
    pub wind_speed: ChannelCalibration,
    pub wind_gust: ChannelCalibration,
    pub wind_dir: ChannelCalibration,
    pub solar: ChannelCalibration,
    pub uv: ChannelCalibration,
    pub wet_bulb: ChannelCalibration,
}

impl Calibration {
    /// Names of the channels carrying a non-identity correction
    pub fn active_channels(&self) -> Vec<&'static str> {
        [
            ("temp", &self.temp),
            ("in_temp", &self.in_temp),
            ("hum", &self.hum),
            ("in_hum", &self.in_hum),
            ("press", &self.press),
            ("rain", &self.rain),
            ("wind_speed", &self.wind_speed),
            ("wind_gust", &self.wind_gust),
            ("wind_dir", &self.wind_dir),
            ("solar", &self.solar),
            ("uv", &self.uv),
            ("wet_bulb", &self.wet_bulb),
        ]
        .into_iter()
        .filter(|(_, channel)| !channel.is_identity())
        .map(|(name, _)| name)
        .collect()
    }
}
