//! Environmental attribute model.
//!
//! Every world position carries four continuous scalars (moisture,
//! temperature, height, fertility). Global bounds are fixed at world
//! construction and re-applied after every interpolation or inheritance
//! step.

use serde::{Deserialize, Serialize};

/// Number of environmental attributes carried by a sample.
pub const ATTRIBUTE_COUNT: usize = 4;

/// Closed interval for one attribute.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScalarRange {
    /// Inclusive lower bound.
    pub min: f64,
    /// Inclusive upper bound.
    pub max: f64,
}

impl ScalarRange {
    /// Construct a range; `min` must not exceed `max`.
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Clamp a value into the range.
    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }

    /// Whether a value lies inside the range.
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    /// Width of the range.
    pub fn span(&self) -> f64 {
        self.max - self.min
    }
}

/// One environmental sample: the four scalars at a single world point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnvSample {
    /// Ground moisture.
    pub moisture: f64,
    /// Air temperature.
    pub temperature: f64,
    /// Terrain elevation.
    pub height: f64,
    /// Soil fertility.
    pub fertility: f64,
}

impl EnvSample {
    /// Construct a sample.
    pub const fn new(moisture: f64, temperature: f64, height: f64, fertility: f64) -> Self {
        Self {
            moisture,
            temperature,
            height,
            fertility,
        }
    }

    /// Attribute values in canonical order (moisture, temperature,
    /// height, fertility).
    pub fn to_array(self) -> [f64; ATTRIBUTE_COUNT] {
        [self.moisture, self.temperature, self.height, self.fertility]
    }

    /// Rebuild a sample from canonical-order values.
    pub fn from_array(values: [f64; ATTRIBUTE_COUNT]) -> Self {
        Self {
            moisture: values[0],
            temperature: values[1],
            height: values[2],
            fertility: values[3],
        }
    }

    /// Copy of this sample with every attribute clamped to the bounds.
    pub fn clamped(self, bounds: &AttributeBounds) -> Self {
        Self {
            moisture: bounds.moisture.clamp(self.moisture),
            temperature: bounds.temperature.clamp(self.temperature),
            height: bounds.height.clamp(self.height),
            fertility: bounds.fertility.clamp(self.fertility),
        }
    }

    /// Whether every attribute lies inside the bounds.
    pub fn is_within(&self, bounds: &AttributeBounds) -> bool {
        bounds.moisture.contains(self.moisture)
            && bounds.temperature.contains(self.temperature)
            && bounds.height.contains(self.height)
            && bounds.fertility.contains(self.fertility)
    }
}

/// Global attribute bounds, fixed at world-map construction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AttributeBounds {
    /// Moisture range.
    pub moisture: ScalarRange,
    /// Temperature range.
    pub temperature: ScalarRange,
    /// Height range.
    pub height: ScalarRange,
    /// Fertility range.
    pub fertility: ScalarRange,
}

impl AttributeBounds {
    /// Lower bounds in canonical attribute order.
    pub fn mins(&self) -> [f64; ATTRIBUTE_COUNT] {
        [
            self.moisture.min,
            self.temperature.min,
            self.height.min,
            self.fertility.min,
        ]
    }

    /// Upper bounds in canonical attribute order.
    pub fn maxs(&self) -> [f64; ATTRIBUTE_COUNT] {
        [
            self.moisture.max,
            self.temperature.max,
            self.height.max,
            self.fertility.max,
        ]
    }

    /// Ranges in canonical attribute order.
    pub fn ranges(&self) -> [ScalarRange; ATTRIBUTE_COUNT] {
        [self.moisture, self.temperature, self.height, self.fertility]
    }
}

impl Default for AttributeBounds {
    fn default() -> Self {
        Self {
            moisture: ScalarRange::new(0.0, 100.0),
            temperature: ScalarRange::new(-40.0, 50.0),
            height: ScalarRange::new(0.0, 255.0),
            fertility: ScalarRange::new(0.0, 100.0),
        }
    }
}
