//! Precomputed search spiral for distant label positions

use crate::SpiralParameters;
use geo::Coord;

/// Offsets sampled along an outward (Archimedean-like) spiral
///
/// Sample `i` of `n` sits at distance `radius * i / n` from the center, rotated by
/// `2π · windings · sqrt(i / n)`; the square root keeps the samples evenly spread
/// along the curve. Sample 0 is always the center itself.
#[derive(Debug, Clone, PartialEq)]
pub struct Spiral {
    parameters: SpiralParameters,
    offsets: Vec<Coord<f32>>,
}

impl Spiral {
    pub fn new(parameters: SpiralParameters) -> Self {
        let n = parameters.sample_points;
        let direction = parameters.direction.factor();
        let radius = parameters.radius as f64;
        let windings = parameters.windings as f64;

        let offsets = (0..n)
            .map(|i| {
                if i == 0 {
                    return Coord { x: 0.0, y: 0.0 };
                }
                let m = i as f64 / n as f64;
                let angle = 2.0 * std::f64::consts::PI * m.sqrt() * windings;
                Coord {
                    x: direction * (angle.cos() * m * radius) as f32,
                    y: (angle.sin() * m * radius) as f32,
                }
            })
            .collect();

        Self {
            parameters,
            offsets,
        }
    }

    #[inline]
    pub fn parameters(&self) -> &SpiralParameters {
        &self.parameters
    }

    /// Offsets relative to the spiral center, in search order
    #[inline]
    pub fn offsets(&self) -> &[Coord<f32>] {
        &self.offsets
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    /// Absolute sample positions around `(x, y)`
    pub fn path_around(&self, x: f32, y: f32) -> Vec<Coord<f32>> {
        self.offsets
            .iter()
            .map(|o| Coord {
                x: x + o.x,
                y: y + o.y,
            })
            .collect()
    }
}

impl Default for Spiral {
    fn default() -> Self {
        Self::new(SpiralParameters::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SpiralDirection;

    #[test]
    fn test_default_spiral() {
        let spiral = Spiral::default();
        assert_eq!(spiral.len(), 500);
        assert_eq!(spiral.offsets()[0], Coord { x: 0.0, y: 0.0 });
    }

    #[test]
    fn test_distance_grows_linearly() {
        let spiral = Spiral::new(SpiralParameters::new(100, 50.0, 5.0, SpiralDirection::Clockwise));
        for (i, offset) in spiral.offsets().iter().enumerate() {
            let distance = (offset.x * offset.x + offset.y * offset.y).sqrt();
            let expected = 50.0 * i as f32 / 100.0;
            assert!((distance - expected).abs() < 1e-3, "sample {i}: {distance} vs {expected}");
        }
    }

    #[test]
    fn test_direction_mirrors_horizontally() {
        let cw = Spiral::new(SpiralParameters::new(50, 80.0, 7.0, SpiralDirection::Clockwise));
        let ccw = Spiral::new(SpiralParameters::new(50, 80.0, 7.0, SpiralDirection::CounterClockwise));
        for (a, b) in cw.offsets().iter().zip(ccw.offsets()) {
            assert_eq!(a.x, -b.x);
            assert_eq!(a.y, b.y);
        }
    }

    #[test]
    fn test_path_around() {
        let spiral = Spiral::new(SpiralParameters::new(3, 30.0, 1.0, SpiralDirection::Clockwise));
        let path = spiral.path_around(100.0, 200.0);
        assert_eq!(path.len(), 3);
        assert_eq!(path[0], Coord { x: 100.0, y: 200.0 });
        assert_eq!(path[1].x, 100.0 + spiral.offsets()[1].x);
    }

    #[test]
    fn test_empty_spiral() {
        let spiral = Spiral::new(SpiralParameters::new(0, 150.0, 20.0, SpiralDirection::Clockwise));
        assert!(spiral.is_empty());
    }
}
