//! Unit conversion and number formatting.
//!
//! WLK files store imperial device units (°F, inHg, mph, inches, miles).
//! [`UnitConverter`] maps those into the station's display units and formats
//! them with the configured number of decimal places.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TempUnit {
    #[default]
    Celsius,
    Fahrenheit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PressureUnit {
    #[default]
    Mb,
    Hpa,
    Inhg,
    Kpa,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindUnit {
    #[default]
    Ms,
    Mph,
    Kph,
    Knots,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RainUnit {
    #[default]
    Mm,
    In,
}

/// Unit a raw rain amount is expressed in before conversion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RainMeasure {
    Inches,
    Millimetres,
}

impl TempUnit {
    pub fn default_decimals(self) -> u8 {
        1
    }
}

impl PressureUnit {
    pub fn default_decimals(self) -> u8 {
        match self {
            PressureUnit::Mb | PressureUnit::Hpa => 1,
            PressureUnit::Inhg => 2,
            PressureUnit::Kpa => 3,
        }
    }
}

impl WindUnit {
    pub fn default_decimals(self) -> u8 {
        match self {
            WindUnit::Ms => 1,
            WindUnit::Mph | WindUnit::Kph | WindUnit::Knots => 0,
        }
    }
}

impl RainUnit {
    pub fn default_decimals(self) -> u8 {
        match self {
            RainUnit::Mm => 1,
            RainUnit::In => 2,
        }
    }
}

/// Resolved decimal places per quantity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecimalPlaces {
    pub temp: u8,
    pub press: u8,
    pub wind: u8,
    pub wind_avg: u8,
    pub rain: u8,
    pub uv: u8,
    pub sunshine: u8,
    pub wind_run: u8,
}

impl DecimalPlaces {
    /// ET is written with one more place than rain
    pub fn et(&self) -> u8 {
        self.rain + 1
    }
}

impl Default for DecimalPlaces {
    fn default() -> Self {
        Self {
            temp: TempUnit::default().default_decimals(),
            press: PressureUnit::default().default_decimals(),
            wind: WindUnit::default().default_decimals(),
            wind_avg: WindUnit::default().default_decimals(),
            rain: RainUnit::default().default_decimals(),
            uv: 1,
            sunshine: 1,
            wind_run: 1,
        }
    }
}

/// Converts device units to display units and formats the results
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct UnitConverter {
    pub temp: TempUnit,
    pub press: PressureUnit,
    pub wind: WindUnit,
    pub rain: RainUnit,
    pub decimals: DecimalPlaces,
}

const MPH_TO_MS: f64 = 0.44704;
const MPH_TO_KPH: f64 = 1.609344;
const MPH_TO_KNOTS: f64 = 0.868976;
const INHG_TO_MB: f64 = 33.8638866667;
const MM_PER_INCH: f64 = 25.4;

impl UnitConverter {
    // Temperature

    pub fn temp_f_to_user(&self, value: f64) -> f64 {
        match self.temp {
            TempUnit::Celsius => (value - 32.0) / 1.8,
            TempUnit::Fahrenheit => value,
        }
    }

    pub fn temp_c_to_user(&self, value: f64) -> f64 {
        match self.temp {
            TempUnit::Celsius => value,
            TempUnit::Fahrenheit => value * 1.8 + 32.0,
        }
    }

    pub fn user_temp_to_c(&self, value: f64) -> f64 {
        match self.temp {
            TempUnit::Celsius => value,
            TempUnit::Fahrenheit => (value - 32.0) / 1.8,
        }
    }

    pub fn user_temp_to_f(&self, value: f64) -> f64 {
        match self.temp {
            TempUnit::Celsius => value * 1.8 + 32.0,
            TempUnit::Fahrenheit => value,
        }
    }

    /// Degree-day totals scale by 5/9 but carry no offset
    pub fn degree_days_f_to_user(&self, value: f64) -> f64 {
        match self.temp {
            TempUnit::Celsius => value * 5.0 / 9.0,
            TempUnit::Fahrenheit => value,
        }
    }

    // Pressure

    pub fn press_inhg_to_user(&self, value: f64) -> f64 {
        match self.press {
            PressureUnit::Mb | PressureUnit::Hpa => value * INHG_TO_MB,
            PressureUnit::Inhg => value,
            PressureUnit::Kpa => value * INHG_TO_MB / 10.0,
        }
    }

    // Wind

    pub fn wind_mph_to_user(&self, value: f64) -> f64 {
        match self.wind {
            WindUnit::Ms => value * MPH_TO_MS,
            WindUnit::Mph => value,
            WindUnit::Kph => value * MPH_TO_KPH,
            WindUnit::Knots => value * MPH_TO_KNOTS,
        }
    }

    pub fn user_wind_to_kph(&self, value: f64) -> f64 {
        match self.wind {
            WindUnit::Ms => value * 3.6,
            WindUnit::Mph => value * MPH_TO_KPH,
            WindUnit::Kph => value,
            WindUnit::Knots => value * 1.852,
        }
    }

    pub fn user_wind_to_ms(&self, value: f64) -> f64 {
        self.user_wind_to_kph(value) / 3.6
    }

    /// Wind run distance follows the wind unit: km for m/s and km/h,
    /// nautical miles for knots
    pub fn miles_to_user(&self, value: f64) -> f64 {
        match self.wind {
            WindUnit::Ms | WindUnit::Kph => value * MPH_TO_KPH,
            WindUnit::Mph => value,
            WindUnit::Knots => value * MPH_TO_KNOTS,
        }
    }

    // Rain

    pub fn rain_in_to_user(&self, value: f64) -> f64 {
        match self.rain {
            RainUnit::Mm => value * MM_PER_INCH,
            RainUnit::In => value,
        }
    }

    pub fn rain_mm_to_user(&self, value: f64) -> f64 {
        match self.rain {
            RainUnit::Mm => value,
            RainUnit::In => value / MM_PER_INCH,
        }
    }

    pub fn rain_to_user(&self, value: f64, measure: RainMeasure) -> f64 {
        match measure {
            RainMeasure::Inches => self.rain_in_to_user(value),
            RainMeasure::Millimetres => self.rain_mm_to_user(value),
        }
    }

    // Formatting

    pub fn fmt_temp(&self, value: f64) -> String {
        fixed(value, self.decimals.temp)
    }

    pub fn fmt_press(&self, value: f64) -> String {
        fixed(value, self.decimals.press)
    }

    pub fn fmt_wind(&self, value: f64) -> String {
        fixed(value, self.decimals.wind)
    }

    pub fn fmt_wind_avg(&self, value: f64) -> String {
        fixed(value, self.decimals.wind_avg)
    }

    pub fn fmt_rain(&self, value: f64) -> String {
        fixed(value, self.decimals.rain)
    }

    pub fn fmt_et(&self, value: f64) -> String {
        fixed(value, self.decimals.et())
    }

    pub fn fmt_uv(&self, value: f64) -> String {
        fixed(value, self.decimals.uv)
    }

    pub fn fmt_sunshine(&self, value: f64) -> String {
        fixed(value, self.decimals.sunshine)
    }
}

/// Fixed-point rendering with a set number of decimal places
pub fn fixed(value: f64, decimals: u8) -> String {
    format!("{:.*}", usize::from(decimals), value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metric() -> UnitConverter {
        UnitConverter::default()
    }

    fn imperial() -> UnitConverter {
        UnitConverter {
            temp: TempUnit::Fahrenheit,
            press: PressureUnit::Inhg,
            wind: WindUnit::Mph,
            rain: RainUnit::In,
            decimals: DecimalPlaces {
                press: 2,
                wind: 0,
                wind_avg: 0,
                rain: 2,
                ..Default::default()
            },
        }
    }

    #[test]
    fn test_temperature_conversion() {
        let units = metric();
        assert!((units.temp_f_to_user(32.0)).abs() < 1e-9);
        assert!((units.temp_f_to_user(212.0) - 100.0).abs() < 1e-9);
        assert!((units.user_temp_to_c(21.5) - 21.5).abs() < 1e-9);

        let units = imperial();
        assert_eq!(units.temp_f_to_user(71.3), 71.3);
        assert!((units.user_temp_to_c(50.0) - 10.0).abs() < 1e-9);
        assert!((units.temp_c_to_user(100.0) - 212.0).abs() < 1e-9);
    }

    #[test]
    fn test_degree_days_have_no_offset() {
        assert!((metric().degree_days_f_to_user(9.0) - 5.0).abs() < 1e-9);
        assert_eq!(imperial().degree_days_f_to_user(9.0), 9.0);
    }

    #[test]
    fn test_pressure_conversion() {
        let mb = metric().press_inhg_to_user(29.921);
        assert!((mb - 1013.2).abs() < 0.05);
        assert_eq!(imperial().press_inhg_to_user(29.921), 29.921);
    }

    #[test]
    fn test_wind_conversion() {
        let units = UnitConverter {
            wind: WindUnit::Kph,
            ..Default::default()
        };
        assert!((units.wind_mph_to_user(10.0) - 16.09344).abs() < 1e-9);
        assert!((units.user_wind_to_kph(16.09344) - 16.09344).abs() < 1e-9);
        assert!((units.miles_to_user(100.0) - 160.9344).abs() < 1e-9);

        let ms = metric();
        assert!((ms.wind_mph_to_user(10.0) - 4.4704).abs() < 1e-9);
        assert!((ms.user_wind_to_ms(4.4704) - 4.4704).abs() < 1e-9);
    }

    #[test]
    fn test_rain_conversion() {
        let units = metric();
        assert!((units.rain_in_to_user(1.0) - 25.4).abs() < 1e-9);
        assert!((units.rain_to_user(1.0, RainMeasure::Millimetres) - 1.0).abs() < 1e-9);

        let units = imperial();
        assert!((units.rain_mm_to_user(25.4) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_formatting_uses_decimal_places() {
        let units = metric();
        assert_eq!(units.fmt_temp(21.456), "21.5");
        assert_eq!(units.fmt_rain(3.0), "3.0");
        assert_eq!(units.fmt_et(0.127), "0.13");
        assert_eq!(imperial().fmt_press(29.921), "29.92");
        assert_eq!(imperial().fmt_wind(12.6), "13");
        assert_eq!(fixed(1.0, 0), "1");
    }
}
