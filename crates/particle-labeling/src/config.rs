//! Labeler configuration

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Initial capacity of the particle table
pub(crate) const DEFAULT_PARTICLE_CAPACITY: usize = 1_000_000;

/// Initial bucket capacity per unit of cell area
pub(crate) const DEFAULT_BUCKET_CAPACITY_FACTOR: usize = 3;

/// Configuration for the labeler
///
/// The defaults reproduce the standard labeling setup: a 500 sample spiral with a radius of
/// 150 units and 20 windings, and a 0.1 unit gap between a feature and its adjacent label.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Config {
    /// Shape of the spiral searched by the last pipeline stage
    pub spiral: SpiralParameters,
    /// Gap between the feature's extent and an adjacent label (stages 1 to 3).
    /// Default: 0.1
    pub label_gap: f32,
    /// Initial number of particles the store can hold before growing.
    /// Default: 1,000,000
    pub initial_particle_capacity: usize,
    /// Each grid cell starts with room for `cell_width * cell_height * factor` particles.
    /// Default: 3
    pub bucket_capacity_factor: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            spiral: SpiralParameters::default(),
            label_gap: 0.1,
            initial_particle_capacity: DEFAULT_PARTICLE_CAPACITY,
            bucket_capacity_factor: DEFAULT_BUCKET_CAPACITY_FACTOR,
        }
    }
}

/// Rotation of the search spiral in screen coordinates (y pointing down)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SpiralDirection {
    Clockwise,
    #[default]
    CounterClockwise,
}

impl SpiralDirection {
    /// Direction from a sign: negative values select [`SpiralDirection::CounterClockwise`]
    pub fn from_sign(sign: f32) -> Self {
        if sign >= 0.0 {
            Self::Clockwise
        } else {
            Self::CounterClockwise
        }
    }

    /// Factor applied to the horizontal spiral offset
    #[inline]
    pub fn factor(self) -> f32 {
        match self {
            Self::Clockwise => 1.0,
            Self::CounterClockwise => -1.0,
        }
    }
}

/// Parameters of the spiral used to find distant label positions
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SpiralParameters {
    /// Number of sample positions along the spiral. Default: 500
    pub sample_points: usize,
    /// Distance of the last sample from the center. Default: 150
    pub radius: f32,
    /// Number of windings until the maximum radius is reached. Default: 20
    pub windings: f32,
    pub direction: SpiralDirection,
}

impl Default for SpiralParameters {
    fn default() -> Self {
        Self {
            sample_points: 500,
            radius: 150.0,
            windings: 20.0,
            direction: SpiralDirection::CounterClockwise,
        }
    }
}

impl SpiralParameters {
    pub fn new(sample_points: usize, radius: f32, windings: f32, direction: SpiralDirection) -> Self {
        Self {
            sample_points,
            radius,
            windings,
            direction,
        }
    }

    /// Spiral scaled to a radius: `radius / 2` windings and `radius * 3` samples
    pub fn for_radius(radius: f32) -> Self {
        Self {
            sample_points: (radius * 3.0).max(0.0) as usize,
            radius,
            windings: radius / 2.0,
            direction: SpiralDirection::CounterClockwise,
        }
    }
}

/// Global minimum and maximum label box dimensions
///
/// The minimum drives the density of blocking particles, the maximum the grid cell size.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LabelDimensions {
    pub min_width: f32,
    pub min_height: f32,
    pub max_width: f32,
    pub max_height: f32,
}

impl LabelDimensions {
    /// Build dimensions from two width/height pairs, normalising which one is min and max
    pub fn new(min_width: f32, min_height: f32, max_width: f32, max_height: f32) -> Self {
        Self {
            min_width: min_width.min(max_width),
            min_height: min_height.min(max_height),
            max_width: min_width.max(max_width),
            max_height: min_height.max(max_height),
        }
    }

    /// Smallest and largest label sizes over the given `(width, height)` pairs
    ///
    /// Returns `None` when the iterator is empty.
    pub fn from_sizes(sizes: impl IntoIterator<Item = (f32, f32)>) -> Option<Self> {
        sizes.into_iter().fold(None, |acc: Option<Self>, (w, h)| {
            Some(match acc {
                None => Self {
                    min_width: w,
                    min_height: h,
                    max_width: w,
                    max_height: h,
                },
                Some(d) => Self {
                    min_width: d.min_width.min(w),
                    min_height: d.min_height.min(h),
                    max_width: d.max_width.max(w),
                    max_height: d.max_height.max(h),
                },
            })
        })
    }

    /// True when every dimension is strictly positive
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.min_width > 0.0 && self.min_height > 0.0 && self.max_width > 0.0 && self.max_height > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.spiral.sample_points, 500);
        assert_eq!(config.spiral.radius, 150.0);
        assert_eq!(config.spiral.windings, 20.0);
        assert_eq!(config.spiral.direction, SpiralDirection::CounterClockwise);
        assert_eq!(config.label_gap, 0.1);
        assert_eq!(config.initial_particle_capacity, 1_000_000);
        assert_eq!(config.bucket_capacity_factor, 3);
    }

    #[test]
    fn test_spiral_for_radius() {
        let params = SpiralParameters::for_radius(100.0);
        assert_eq!(params.sample_points, 300);
        assert_eq!(params.windings, 50.0);
        assert_eq!(params.direction.factor(), -1.0);
    }

    #[test]
    fn test_direction_from_sign() {
        assert_eq!(SpiralDirection::from_sign(1.0), SpiralDirection::Clockwise);
        assert_eq!(SpiralDirection::from_sign(0.0), SpiralDirection::Clockwise);
        assert_eq!(SpiralDirection::from_sign(-1.0), SpiralDirection::CounterClockwise);
    }

    #[test]
    fn test_dimensions_normalized() {
        let dims = LabelDimensions::new(80.0, 10.0, 20.0, 30.0);
        assert_eq!(dims.min_width, 20.0);
        assert_eq!(dims.max_width, 80.0);
        assert_eq!(dims.min_height, 10.0);
        assert_eq!(dims.max_height, 30.0);
        assert!(dims.is_valid());
    }

    #[test]
    fn test_dimensions_from_sizes() {
        let dims = LabelDimensions::from_sizes([(40.0, 12.0), (100.0, 8.0), (60.0, 20.0)]).unwrap();
        assert_eq!(dims, LabelDimensions::new(40.0, 8.0, 100.0, 20.0));

        assert!(LabelDimensions::from_sizes(std::iter::empty()).is_none());

        let with_zero = LabelDimensions::from_sizes([(0.0, 12.0)]).unwrap();
        assert!(!with_zero.is_valid());
    }
}
