//! Choropleth colour mapping for the regional map.
//!
//! Values are normalised over the observed min/max of a snapshot and mapped
//! onto a green/red ramp. The direction depends on whether a high reading is
//! good news (income, house prices) or bad news (unemployment).

use crate::domain::StateRecord;

/// An sRGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub fn to_css(self) -> String {
        format!("rgb({}, {}, {})", self.0, self.1, self.2)
    }
}

/// Light gray used for states without data.
pub const NO_DATA_COLOR: Rgb = Rgb(211, 211, 211);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorScale {
    /// 0 -> green, 1 -> red.
    HighIsBad,
    /// 0 -> red, 1 -> green.
    HighIsGood,
}

impl ColorScale {
    pub fn for_high_is_bad(high_is_bad: bool) -> Self {
        if high_is_bad {
            ColorScale::HighIsBad
        } else {
            ColorScale::HighIsGood
        }
    }
}

/// Observed `(min, max)` over the finite values.
pub fn value_range(values: impl IntoIterator<Item = f64>) -> Option<(f64, f64)> {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for v in values.into_iter().filter(|v| v.is_finite()) {
        min = min.min(v);
        max = max.max(v);
    }
    (min <= max).then_some((min, max))
}

/// Linear normalisation into `[0, 1]`. A degenerate range maps to the midpoint.
pub fn normalize(value: f64, min: f64, max: f64) -> f64 {
    let range = max - min;
    if !(range.is_finite() && range > 0.0) {
        return 0.5;
    }
    ((value - min) / range).clamp(0.0, 1.0)
}

/// Interpolate between the two ramp endpoints.
pub fn interpolate(t: f64, scale: ColorScale) -> Rgb {
    let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.5 };
    let up = (t * 255.0).floor() as u8;
    let down = ((1.0 - t) * 255.0).floor() as u8;
    match scale {
        ColorScale::HighIsBad => Rgb(up, down, 0),
        ColorScale::HighIsGood => Rgb(down, up, 0),
    }
}

/// Colour every state of a snapshot, in input order.
pub fn choropleth(states: &[StateRecord], scale: ColorScale) -> Vec<(String, Rgb)> {
    let range = value_range(states.iter().filter_map(|s| s.value));
    states
        .iter()
        .map(|s| {
            let color = match (s.value.filter(|v| v.is_finite()), range) {
                (Some(v), Some((min, max))) => interpolate(normalize(v, min, max), scale),
                _ => NO_DATA_COLOR,
            };
            (s.code.clone(), color)
        })
        .collect()
}
