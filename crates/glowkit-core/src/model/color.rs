use std::fmt;

use serde::{Deserialize, Serialize};

/// Hue/saturation/kelvin color. A saturation of zero is a white.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    /// Degrees, 0–360.
    pub hue: f64,
    /// 0.0–1.0.
    pub saturation: f64,
    pub kelvin: i64,
}

impl Color {
    pub const MAX_HUE: f64 = 360.0;
    pub const DEFAULT_KELVIN: i64 = 3500;

    pub fn new(hue: f64, saturation: f64, kelvin: i64) -> Self {
        Self {
            hue,
            saturation,
            kelvin,
        }
    }

    /// A saturated color at the default kelvin.
    pub fn hue_saturation(hue: f64, saturation: f64) -> Self {
        Self::new(hue, saturation, Self::DEFAULT_KELVIN)
    }

    pub fn white(kelvin: i64) -> Self {
        Self::new(0.0, 0.0, kelvin)
    }

    pub fn is_white(&self) -> bool {
        self.saturation == 0.0
    }

    pub fn is_color(&self) -> bool {
        !self.is_white()
    }

    /// Wire encoding used in state-change bodies.
    pub fn to_wire(&self) -> String {
        if self.is_white() {
            format!("kelvin:{}", self.kelvin)
        } else {
            format!("hue:{} saturation:{}", self.hue, self.saturation)
        }
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::white(Self::DEFAULT_KELVIN)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_white() {
            write!(f, "{}K", self.kelvin)
        } else {
            write!(f, "{:.0}° {:.0}%", self.hue, self.saturation * 100.0)
        }
    }
}
