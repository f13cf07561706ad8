//! Configuration management and validation.
//!
//! Station, unit, calibration, solar, NOAA and chill-hour settings are read
//! from a TOML file. Missing keys fall back to the defaults the station
//! software uses; out-of-range values are logged and reset during
//! [`ImportConfig::load`].

use crate::calibration::Calibration;
use crate::error::{Result, WlkError};
use crate::units::{DecimalPlaces, PressureUnit, RainUnit, TempUnit, UnitConverter, WindUnit};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{debug, error, info, warn};

/// Top-level import configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    pub station: StationConfig,
    pub units: UnitsConfig,
    pub calibration: Calibration,
    pub solar: SolarConfig,
    pub noaa: NoaaConfig,
    pub chill_hours: ChillHourConfig,
}

/// Site description
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StationConfig {
    /// Decimal degrees, north positive
    pub latitude: f64,

    /// Decimal degrees, east positive
    pub longitude: f64,

    pub altitude: f64,
    pub altitude_in_feet: bool,

    /// Hour the meteorological day starts (0 = midnight)
    pub rollover_hour: u32,

    /// Davis station types are 0 (Vantage Pro) and 1 (Vantage Pro2)
    pub station_type: i32,
}

impl Default for StationConfig {
    fn default() -> Self {
        Self {
            latitude: 0.0,
            longitude: 0.0,
            altitude: 0.0,
            altitude_in_feet: false,
            rollover_hour: 0,
            station_type: -1,
        }
    }
}

impl StationConfig {
    pub fn altitude_m(&self) -> f64 {
        if self.altitude_in_feet {
            self.altitude * 0.3048
        } else {
            self.altitude
        }
    }

    pub fn is_davis(&self) -> bool {
        self.station_type == 0 || self.station_type == 1
    }
}

/// Display units and optional decimal-place overrides
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UnitsConfig {
    pub temperature: TempUnit,
    pub pressure: PressureUnit,
    pub wind: WindUnit,
    pub rain: RainUnit,

    pub round_wind_speed: bool,

    /// Davis stations only: one extra pressure decimal place
    pub increment_pressure_dp: bool,

    pub temp_decimals: Option<u8>,
    pub press_decimals: Option<u8>,
    pub wind_speed_decimals: Option<u8>,
    pub wind_speed_avg_decimals: Option<u8>,
    pub wind_run_decimals: Option<u8>,
    pub rain_decimals: Option<u8>,
    pub uv_decimals: Option<u8>,
    pub sunshine_decimals: Option<u8>,
}

/// Theoretical solar maximum model selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SolarModel {
    #[default]
    RyanStolzenbach,
    Bras,
}

/// Solar model settings.
///
/// Station files often carry sunshine-detection keys as well (`sun_threshold`,
/// `solar_minimum`, `lux_to_wm2`, `use_blake_larsen`). The import takes
/// sunshine hours from the daily summaries, so those keys are ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SolarConfig {
    pub model: SolarModel,

    /// Legacy single transmission factor, applied to both seasons
    pub rs_trans_factor: Option<f64>,
    #[serde(alias = "rs_trans_factor_jul")]
    pub rs_trans_factor_jun: Option<f64>,
    pub rs_trans_factor_dec: Option<f64>,

    /// Legacy single turbidity, applied to both seasons
    pub bras_turbidity: Option<f64>,
    #[serde(alias = "bras_turbidity_jul")]
    pub bras_turbidity_jun: Option<f64>,
    pub bras_turbidity_dec: Option<f64>,
}

impl Default for SolarConfig {
    fn default() -> Self {
        Self {
            model: SolarModel::RyanStolzenbach,
            rs_trans_factor: None,
            rs_trans_factor_jun: None,
            rs_trans_factor_dec: None,
            bras_turbidity: None,
            bras_turbidity_jun: None,
            bras_turbidity_dec: None,
        }
    }
}

/// Resolved seasonal factors for the solar model
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolarOptions {
    pub model: SolarModel,
    pub rs_trans_jun: f64,
    pub rs_trans_dec: f64,
    pub bras_turbidity_jun: f64,
    pub bras_turbidity_dec: f64,
}

impl Default for SolarOptions {
    fn default() -> Self {
        Self {
            model: SolarModel::RyanStolzenbach,
            rs_trans_jun: DEFAULT_RS_TRANS_FACTOR,
            rs_trans_dec: DEFAULT_RS_TRANS_FACTOR,
            bras_turbidity_jun: DEFAULT_BRAS_TURBIDITY,
            bras_turbidity_dec: DEFAULT_BRAS_TURBIDITY,
        }
    }
}

const DEFAULT_RS_TRANS_FACTOR: f64 = 0.8;
const MIN_RS_TRANS_FACTOR: f64 = 0.1;
const DEFAULT_BRAS_TURBIDITY: f64 = 2.0;

impl SolarConfig {
    /// Fold the legacy single-value keys into the June/December pair
    fn migrate_legacy(&mut self) {
        if let Some(factor) = self.rs_trans_factor.take() {
            debug!("Migrating legacy rs_trans_factor {} to seasonal pair", factor);
            self.rs_trans_factor_jun = Some(factor);
            self.rs_trans_factor_dec = Some(factor);
        }
        if let Some(turbidity) = self.bras_turbidity.take() {
            debug!("Migrating legacy bras_turbidity {} to seasonal pair", turbidity);
            self.bras_turbidity_jun = Some(turbidity);
            self.bras_turbidity_dec = Some(turbidity);
        }
    }

    pub fn options(&self) -> SolarOptions {
        let rs = |season: Option<f64>| {
            self.rs_trans_factor
                .or(season)
                .unwrap_or(DEFAULT_RS_TRANS_FACTOR)
                .max(MIN_RS_TRANS_FACTOR)
        };
        let bras = |season: Option<f64>| {
            self.bras_turbidity
                .or(season)
                .unwrap_or(DEFAULT_BRAS_TURBIDITY)
        };

        SolarOptions {
            model: self.model,
            rs_trans_jun: rs(self.rs_trans_factor_jun),
            rs_trans_dec: rs(self.rs_trans_factor_dec),
            bras_turbidity_jun: bras(self.bras_turbidity_jun),
            bras_turbidity_dec: bras(self.bras_turbidity_dec),
        }
    }
}

/// NOAA report degree-day thresholds, in the display temperature unit
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NoaaConfig {
    pub heating_threshold: Option<f64>,
    pub cooling_threshold: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChillHourConfig {
    /// Month (1-12) the chill-hour season starts
    pub season_start: u32,

    /// Display temperature unit; defaults to 7 °C / 45 °F
    pub threshold: Option<f64>,
}

impl Default for ChillHourConfig {
    fn default() -> Self {
        Self {
            season_start: 10,
            threshold: None,
        }
    }
}

impl ImportConfig {
    /// Read, parse and validate the configuration file
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(WlkError::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }

        info!("Reading configuration from {}", path.display());
        let text = fs::read_to_string(path)?;
        let config = Self::from_toml(&text).map_err(|source| WlkError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?;

        Ok(config.validated())
    }

    /// Parse without touching the filesystem; values are not yet validated
    pub fn from_toml(text: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Reset out-of-range values and fill in unit-dependent defaults
    pub fn validated(mut self) -> Self {
        if !(-90.0..=90.0).contains(&self.station.latitude) {
            error!(
                "Invalid latitude value [{}], defaulting to zero",
                self.station.latitude
            );
            self.station.latitude = 0.0;
        }
        if !(-180.0..=180.0).contains(&self.station.longitude) {
            error!(
                "Invalid longitude value [{}], defaulting to zero",
                self.station.longitude
            );
            self.station.longitude = 0.0;
        }
        if self.station.rollover_hour > 23 {
            warn!(
                "Invalid rollover hour {}, using midnight",
                self.station.rollover_hour
            );
            self.station.rollover_hour = 0;
        }

        let default_threshold = match self.units.temperature {
            TempUnit::Celsius => 18.3,
            TempUnit::Fahrenheit => 65.0,
        };
        let noaa_valid = |t: Option<f64>| t.filter(|v| (-99.0..=150.0).contains(v));
        self.noaa.heating_threshold =
            Some(noaa_valid(self.noaa.heating_threshold).unwrap_or(default_threshold));
        self.noaa.cooling_threshold =
            Some(noaa_valid(self.noaa.cooling_threshold).unwrap_or(default_threshold));

        if !(1..=12).contains(&self.chill_hours.season_start) {
            self.chill_hours.season_start = 1;
        }
        if self.chill_hours.threshold.is_none_or(|t| t < -998.0) {
            self.chill_hours.threshold = Some(match self.units.temperature {
                TempUnit::Celsius => 7.0,
                TempUnit::Fahrenheit => 45.0,
            });
        }

        self.solar.migrate_legacy();
        self
    }

    /// Builder-style override of the site coordinates
    pub fn with_location(mut self, latitude: f64, longitude: f64, altitude_m: f64) -> Self {
        self.station.latitude = latitude;
        self.station.longitude = longitude;
        self.station.altitude = altitude_m;
        self.station.altitude_in_feet = false;
        self
    }

    /// Builder-style override of the display units
    pub fn with_units(
        mut self,
        temperature: TempUnit,
        pressure: PressureUnit,
        wind: WindUnit,
        rain: RainUnit,
    ) -> Self {
        self.units.temperature = temperature;
        self.units.pressure = pressure;
        self.units.wind = wind;
        self.units.rain = rain;
        self
    }

    /// Builder-style override of the calibration table
    pub fn with_calibration(mut self, calibration: Calibration) -> Self {
        self.calibration = calibration;
        self
    }

    pub fn decimal_places(&self) -> DecimalPlaces {
        let units = &self.units;
        let wind = if units.round_wind_speed {
            0
        } else {
            units.wind.default_decimals()
        };
        let mut press = units.pressure.default_decimals();
        if self.station.is_davis() && units.increment_pressure_dp {
            press += 1;
        }
        let uv = if self.station.is_davis() { 1 } else { 0 };

        DecimalPlaces {
            temp: units
                .temp_decimals
                .unwrap_or(units.temperature.default_decimals()),
            press: units.press_decimals.unwrap_or(press),
            wind: units.wind_speed_decimals.unwrap_or(wind),
            wind_avg: units.wind_speed_avg_decimals.unwrap_or(wind),
            rain: units.rain_decimals.unwrap_or(units.rain.default_decimals()),
            uv: units.uv_decimals.unwrap_or(uv),
            sunshine: units.sunshine_decimals.unwrap_or(1),
            wind_run: units.wind_run_decimals.unwrap_or(1),
        }
    }

    pub fn converter(&self) -> UnitConverter {
        UnitConverter {
            temp: self.units.temperature,
            press: self.units.pressure,
            wind: self.units.wind,
            rain: self.units.rain,
            decimals: self.decimal_places(),
        }
    }

    /// Chill threshold in the display unit, after validation
    pub fn chill_threshold(&self) -> f64 {
        self.chill_hours
            .threshold
            .unwrap_or(match self.units.temperature {
                TempUnit::Celsius => 7.0,
                TempUnit::Fahrenheit => 45.0,
            })
    }
}
