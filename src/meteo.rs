//! Derived meteorological quantities.
//!
//! All functions take and return °C; wind is km/h unless noted and
//! humidity is relative humidity in percent.

/// Actual vapour pressure (hPa), Magnus form over water
fn vapour_pressure(temp_c: f64, humidity: f64) -> f64 {
    humidity / 100.0 * 6.112 * ((17.62 * temp_c) / (243.12 + temp_c)).exp()
}

/// Wind chill, JAG/TI formula. Returns the air temperature outside the
/// formula's validity range (above 10 °C or below 4.8 km/h).
pub fn wind_chill(temp_c: f64, wind_kph: f64) -> f64 {
    if temp_c >= 10.0 || wind_kph < 4.8 {
        return temp_c;
    }
    let v = wind_kph.powf(0.16);
    13.12 + 0.6215 * temp_c - 11.37 * v + 0.3965 * temp_c * v
}

/// Heat index, Rothfusz regression with the NWS adjustments. Below 80 °F
/// the simple Steadman form is used.
pub fn heat_index(temp_c: f64, humidity: f64) -> f64 {
    let t = c_to_f(temp_c);
    let rh = humidity;

    let simple = 0.5 * (t + 61.0 + (t - 68.0) * 1.2 + rh * 0.094);
    if (simple + t) / 2.0 < 80.0 {
        return f_to_c(simple);
    }

    let mut hi = -42.379 + 2.04901523 * t + 10.14333127 * rh
        - 0.22475541 * t * rh
        - 0.00683783 * t * t
        - 0.05481717 * rh * rh
        + 0.00122874 * t * t * rh
        + 0.00085282 * t * rh * rh
        - 0.00000199 * t * t * rh * rh;

    if rh < 13.0 && (80.0..=112.0).contains(&t) {
        hi -= ((13.0 - rh) / 4.0) * ((17.0 - (t - 95.0).abs()) / 17.0).sqrt();
    } else if rh > 85.0 && (80.0..=87.0).contains(&t) {
        hi += ((rh - 85.0) / 10.0) * ((87.0 - t) / 5.0);
    }

    f_to_c(hi)
}

/// Canadian humidex
pub fn humidex(temp_c: f64, humidity: f64) -> f64 {
    temp_c + (5.0 / 9.0) * (vapour_pressure(temp_c, humidity) - 10.0)
}

/// Dew point from the inverted Magnus equation
pub fn dew_point(temp_c: f64, humidity: f64) -> f64 {
    if humidity <= 0.0 {
        return temp_c;
    }
    let ln_vapour = vapour_pressure(temp_c, humidity).ln();
    (243.12 * ln_vapour - 440.1) / (19.43 - ln_vapour)
}

/// Australian apparent temperature (shade, no radiation term); wind in m/s
pub fn apparent_temperature(temp_c: f64, wind_ms: f64, humidity: f64) -> f64 {
    let avp = humidity / 100.0 * 6.105 * ((17.27 * temp_c) / (237.7 + temp_c)).exp();
    temp_c + 0.33 * avp - 0.7 * wind_ms - 4.0
}

/// "Feels like": wind chill when cold and windy, heat index when hot,
/// otherwise the air temperature
pub fn feels_like(temp_c: f64, wind_kph: f64, humidity: f64) -> f64 {
    let wind_kph = wind_kph.max(0.0);
    if temp_c <= 10.0 && wind_kph > 4.828 {
        wind_chill(temp_c, wind_kph)
    } else if temp_c >= 26.7 {
        heat_index(temp_c, humidity)
    } else {
        temp_c
    }
}

pub fn c_to_f(temp_c: f64) -> f64 {
    temp_c * 1.8 + 32.0
}

pub fn f_to_c(temp_f: f64) -> f64 {
    (temp_f - 32.0) / 1.8
}
