// src/display/colormap.rs
//! Diverging red-yellow-green scale for index values.

/// RGB color with 0..=255 channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Shown for values that are not finite.
    pub const INVALID: Self = Self::new(128, 128, 128);
}

#[derive(Debug, Clone, Copy)]
struct ColorStop {
    t: f64,
    color: Rgb,
}

impl ColorStop {
    const fn new(t: f64, r: u8, g: u8, b: u8) -> Self {
        Self {
            t,
            color: Rgb::new(r, g, b),
        }
    }
}

// 11-class RdYlGn
const RD_YL_GN_STOPS: &[ColorStop] = &[
    ColorStop::new(0.0, 165, 0, 38),
    ColorStop::new(0.1, 215, 48, 39),
    ColorStop::new(0.2, 244, 109, 67),
    ColorStop::new(0.3, 253, 174, 97),
    ColorStop::new(0.4, 254, 224, 139),
    ColorStop::new(0.5, 255, 255, 191),
    ColorStop::new(0.6, 217, 239, 139),
    ColorStop::new(0.7, 166, 217, 106),
    ColorStop::new(0.8, 102, 189, 99),
    ColorStop::new(0.9, 26, 152, 80),
    ColorStop::new(1.0, 0, 104, 55),
];

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

fn lerp_color(c1: Rgb, c2: Rgb, t: f64) -> Rgb {
    Rgb::new(
        lerp(c1.r as f64, c2.r as f64, t).round() as u8,
        lerp(c1.g as f64, c2.g as f64, t).round() as u8,
        lerp(c1.b as f64, c2.b as f64, t).round() as u8,
    )
}

fn multi_stop(stops: &[ColorStop], t: f64) -> Rgb {
    if t <= 0.0 {
        return stops[0].color;
    }
    if t >= 1.0 {
        return stops[stops.len() - 1].color;
    }
    for i in 1..stops.len() {
        if t <= stops[i].t {
            let ratio = (t - stops[i - 1].t) / (stops[i].t - stops[i - 1].t);
            return lerp_color(stops[i - 1].color, stops[i].color, ratio);
        }
    }
    stops[stops.len() - 1].color
}

/// Fixed value range of the scale; values outside it take the end colors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DivergingScale {
    pub min: f64,
    pub max: f64,
}

impl Default for DivergingScale {
    fn default() -> Self {
        Self { min: -1.0, max: 1.0 }
    }
}

impl DivergingScale {
    pub fn color(&self, value: f64) -> Rgb {
        if !value.is_finite() {
            return Rgb::INVALID;
        }
        let t = (value - self.min) / (self.max - self.min);
        multi_stop(RD_YL_GN_STOPS, t)
    }

    /// Value at normalized position `t` in [0, 1].
    pub fn value_at(&self, t: f64) -> f64 {
        lerp(self.min, self.max, t)
    }
}
