//! Theoretical clear-sky solar maximum.
//!
//! Sun position follows the NOAA general solar position approximation.
//! Surface irradiance uses either the Ryan-Stolzenbach transmission model
//! or the Bras turbidity model, with the model factor interpolated between
//! its June and December values over the year.

use crate::config::{SolarModel, SolarOptions};
use chrono::{DateTime, Datelike, Timelike, Utc};
use std::f64::consts::PI;

/// Solar constant, W/m²
const SOLAR_CONSTANT: f64 = 1367.0;

/// Sun elevation above the horizon in degrees
pub fn sun_elevation(utc: DateTime<Utc>, latitude: f64, longitude: f64) -> f64 {
    let day_of_year = f64::from(utc.ordinal());
    let hour = f64::from(utc.hour());
    let minute = f64::from(utc.minute());
    let second = f64::from(utc.second());

    let gamma = 2.0 * PI / 365.0 * (day_of_year - 1.0 + (hour - 12.0) / 24.0);

    let eq_time = 229.18
        * (0.000075 + 0.001868 * gamma.cos()
            - 0.032077 * gamma.sin()
            - 0.014615 * (2.0 * gamma).cos()
            - 0.040849 * (2.0 * gamma).sin());

    let declination = 0.006918 - 0.399912 * gamma.cos() + 0.070257 * gamma.sin()
        - 0.006758 * (2.0 * gamma).cos()
        + 0.000907 * (2.0 * gamma).sin()
        - 0.002697 * (3.0 * gamma).cos()
        + 0.00148 * (3.0 * gamma).sin();

    let true_solar_minutes = hour * 60.0 + minute + second / 60.0 + eq_time + 4.0 * longitude;
    let hour_angle = (true_solar_minutes / 4.0 - 180.0).to_radians();

    let lat = latitude.to_radians();
    let cos_zenith =
        lat.sin() * declination.sin() + lat.cos() * declination.cos() * hour_angle.cos();
    let zenith = cos_zenith.clamp(-1.0, 1.0).acos();

    90.0 - zenith.to_degrees()
}

/// Interpolate a seasonal factor: `jun` at the June solstice, `dec` at the
/// December solstice. Seasons swap in the southern hemisphere.
pub fn seasonal_factor(day_of_year: u32, jun: f64, dec: f64, latitude: f64) -> f64 {
    let (summer, winter) = if latitude < 0.0 { (dec, jun) } else { (jun, dec) };
    let winterness = ((2.0 * PI * f64::from(day_of_year + 10) / 365.0).cos() + 1.0) / 2.0;
    summer - (summer - winter) * winterness
}

/// Theoretical maximum solar radiation (W/m²) for a clear sky
pub fn solar_max(
    utc: DateTime<Utc>,
    latitude: f64,
    longitude: f64,
    altitude_m: f64,
    options: &SolarOptions,
) -> f64 {
    let elevation = sun_elevation(utc, latitude, longitude);
    if elevation <= 0.0 {
        return 0.0;
    }

    let day_of_year = utc.ordinal();
    let sin_el = elevation.to_radians().sin();

    // Relative optical air mass, corrected for station pressure
    let pressure_ratio = ((288.0 - 0.0065 * altitude_m) / 288.0).powf(5.256);
    let air_mass = pressure_ratio / (sin_el + 0.15 * (elevation + 3.885).powf(-1.253));

    let top_of_atmosphere = SOLAR_CONSTANT
        * (1.0 + 0.034 * (2.0 * PI * f64::from(day_of_year) / 365.0).cos())
        * sin_el;

    match options.model {
        SolarModel::RyanStolzenbach => {
            let factor = seasonal_factor(
                day_of_year,
                options.rs_trans_jun,
                options.rs_trans_dec,
                latitude,
            );
            top_of_atmosphere * factor.powf(air_mass)
        }
        SolarModel::Bras => {
            let turbidity = seasonal_factor(
                day_of_year,
                options.bras_turbidity_jun,
                options.bras_turbidity_dec,
                latitude,
            );
            let extinction = 0.128 - 0.054 * air_mass.log10();
            top_of_atmosphere * (-turbidity * extinction * air_mass).exp()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    #[test]
    fn test_sun_below_horizon_at_midnight() {
        let elevation = sun_elevation(utc(2024, 6, 21, 0, 0), 51.5, 0.0);
        assert!(elevation < 0.0, "got {}", elevation);
        assert_eq!(
            solar_max(utc(2024, 6, 21, 0, 0), 51.5, 0.0, 0.0, &SolarOptions::default()),
            0.0
        );
    }

    #[test]
    fn test_midsummer_noon_elevation() {
        // London at the June solstice peaks near 62°
        let elevation = sun_elevation(utc(2024, 6, 21, 12, 0), 51.5, 0.0);
        assert!((elevation - 62.0).abs() < 1.0, "got {}", elevation);
    }

    #[test]
    fn test_solar_max_plausible_at_noon() {
        let options = SolarOptions::default();
        let summer = solar_max(utc(2024, 6, 21, 12, 0), 51.5, 0.0, 50.0, &options);
        let winter = solar_max(utc(2024, 12, 21, 12, 0), 51.5, 0.0, 50.0, &options);

        assert!(summer > 700.0 && summer < 1100.0, "got {}", summer);
        assert!(winter > 0.0 && winter < summer, "got {}", winter);
    }

    #[test]
    fn test_bras_model_positive() {
        let options = SolarOptions {
            model: SolarModel::Bras,
            ..Default::default()
        };
        let value = solar_max(utc(2024, 6, 21, 12, 0), 51.5, 0.0, 0.0, &options);
        assert!(value > 500.0 && value < 1100.0, "got {}", value);
    }

    #[test]
    fn test_seasonal_factor_endpoints() {
        // December solstice (day 355) is fully winter
        assert!((seasonal_factor(355, 0.9, 0.7, 51.0) - 0.7).abs() < 1e-3);
        // June solstice (day 172) is close to the summer value
        assert!((seasonal_factor(172, 0.9, 0.7, 51.0) - 0.9).abs() < 1e-3);
        // Southern hemisphere swaps the seasons
        assert!((seasonal_factor(355, 0.9, 0.7, -33.0) - 0.9).abs() < 1e-3);
        // Equal factors are constant
        assert_eq!(seasonal_factor(100, 0.8, 0.8, 10.0), 0.8);
    }
}
