//! Greedy point-feature labeler
//!
//! Owns the priority levels, the particle store and the spiral, and drives the
//! four-stage placement pipeline over them.

use crate::placement::Placer;
use crate::sampling::{walk_box, walk_circle, walk_disc_section, walk_line, walk_map};
use crate::{
    Config, ConflictMap, ConflictParticle, LabelArea, LabelDimensions, LabelError, ParticleStore,
    PointFeature, Result, Spiral, SpiralParameters, Strategy,
};
use geo::Coord;

/// What a particle store was built for; a matching store is reset instead of rebuilt
#[derive(Debug, Clone, Copy, PartialEq)]
struct GridKey {
    area: LabelArea,
    cell_width: f32,
    cell_height: f32,
}

/// Places labels for point features grouped by priority
///
/// Typical use: [`load_priority`](Self::load_priority) (or one of its variants), any number of
/// `respect_*` calls for other visual elements, then [`standard_pipeline_all`](Self::standard_pipeline_all).
/// The results are read back through [`levels`](Self::levels) or [`take_levels`](Self::take_levels).
///
/// Obstacle and pipeline calls are no-ops until a load succeeds; pipeline calls then return 0.
#[derive(Debug, Clone)]
pub struct PointFeatureLabeler<T = ()> {
    config: Config,
    spiral: Spiral,
    store: Option<ParticleStore>,
    grid_key: Option<GridKey>,
    levels: Vec<Vec<PointFeature<T>>>,
    area: LabelArea,
    dimensions: LabelDimensions,
    data_loaded: bool,
}

impl<T> Default for PointFeatureLabeler<T> {
    fn default() -> Self {
        Self::with_config(Config::default())
    }
}

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl<T> PointFeatureLabeler<T> {
    /// Create a labeler with the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: Config) -> Self {
        Self {
            spiral: Spiral::new(config.spiral),
            config,
            store: None,
            grid_key: None,
            levels: Vec::new(),
            area: LabelArea::default(),
            dimensions: LabelDimensions::new(0.0, 0.0, 0.0, 0.0),
            data_loaded: false,
        }
    }

    /// Load features grouped by priority (index 0 first), deriving the label dimensions
    pub fn load_priority(&mut self, levels: Vec<Vec<PointFeature<T>>>, area: LabelArea) -> Result<()> {
        self.load(levels, area, None)
    }

    /// Load features grouped by priority with global label dimensions
    ///
    /// If any of the given dimensions is not positive, all four are derived from the features.
    pub fn load_priority_with_dimensions(
        &mut self,
        levels: Vec<Vec<PointFeature<T>>>,
        area: LabelArea,
        dimensions: LabelDimensions,
    ) -> Result<()> {
        self.load(levels, area, Some(dimensions))
    }

    /// Load a flat feature list as a single priority level
    pub fn load_standard(&mut self, features: Vec<PointFeature<T>>, area: LabelArea) -> Result<()> {
        self.load(vec![features], area, None)
    }

    /// [`load_standard`](Self::load_standard) with global label dimensions
    pub fn load_standard_with_dimensions(
        &mut self,
        features: Vec<PointFeature<T>>,
        area: LabelArea,
        dimensions: LabelDimensions,
    ) -> Result<()> {
        self.load(vec![features], area, Some(dimensions))
    }

    fn load(
        &mut self,
        levels: Vec<Vec<PointFeature<T>>>,
        area: LabelArea,
        dimensions: Option<LabelDimensions>,
    ) -> Result<()> {
        self.data_loaded = false;
        self.levels = levels;
        self.area = area;

        // Sizes that cannot be labeled are ignored unless there is nothing else
        let sizes = || {
            self.levels
                .iter()
                .flatten()
                .map(|f| (f.label_box_width, f.label_box_height))
        };
        let dimensions = match dimensions.filter(LabelDimensions::is_valid) {
            Some(dimensions) => dimensions,
            None => LabelDimensions::from_sizes(sizes().filter(|&(w, h)| w > 0.0 && h > 0.0))
                .or_else(|| LabelDimensions::from_sizes(sizes()))
                .ok_or(LabelError::NoFeatures)?,
        };

        if !dimensions.is_valid() {
            tracing::warn!(
                "Rejected label dimensions: min {}x{}, max {}x{}",
                dimensions.min_width,
                dimensions.min_height,
                dimensions.max_width,
                dimensions.max_height
            );
            return Err(LabelError::InvalidLabelDimensions {
                min_width: dimensions.min_width,
                min_height: dimensions.min_height,
                max_width: dimensions.max_width,
                max_height: dimensions.max_height,
            });
        }
        self.dimensions = dimensions;

        let key = GridKey {
            area,
            cell_width: dimensions.max_width,
            cell_height: dimensions.max_height,
        };
        if self.grid_key == Some(key) {
            tracing::debug!("Reusing particle store");
        } else {
            self.store = None;
            self.grid_key = Some(key);
        }

        let particle_capacity = self.config.initial_particle_capacity;
        let bucket_factor = self.config.bucket_capacity_factor;
        let store = self.store.get_or_insert_with(|| {
            ParticleStore::with_capacity(
                area.width(),
                area.height(),
                dimensions.max_width,
                dimensions.max_height,
                particle_capacity,
                bucket_factor,
            )
            .with_origin(area.left, area.top)
        });
        store.reset();

        let mut enabled = 0usize;
        let mut disabled = 0usize;
        for feature in self.levels.iter_mut().flatten() {
            feature.reset_labeling();
            if area.contains_point(feature.x(), feature.y()) {
                feature.enable(store.add_particle(feature.x(), feature.y()));
                enabled += 1;
            } else {
                disabled += 1;
            }
        }

        tracing::debug!(
            "Loaded {} priority levels: {} features enabled, {} outside the labeling area",
            self.levels.len(),
            enabled,
            disabled
        );

        self.data_loaded = true;
        Ok(())
    }

    /// Whether the last load succeeded
    #[inline]
    pub fn is_data_loaded(&self) -> bool {
        self.data_loaded
    }

    /// The loaded features, with placement results after a pipeline run
    #[inline]
    pub fn levels(&self) -> &[Vec<PointFeature<T>>] {
        &self.levels
    }

    /// Hand the features back to the caller, leaving the labeler unloaded
    pub fn take_levels(&mut self) -> Vec<Vec<PointFeature<T>>> {
        self.data_loaded = false;
        std::mem::take(&mut self.levels)
    }

    #[inline]
    pub fn num_priority_levels(&self) -> usize {
        self.levels.len()
    }

    #[inline]
    pub fn area(&self) -> LabelArea {
        self.area
    }

    /// Label dimensions in effect after the last successful load
    #[inline]
    pub fn label_dimensions(&self) -> LabelDimensions {
        self.dimensions
    }

    #[inline]
    pub fn particle_store(&self) -> Option<&ParticleStore> {
        self.store.as_ref()
    }

    #[inline]
    pub fn config(&self) -> &Config {
        &self.config
    }

    #[inline]
    pub fn spiral(&self) -> &Spiral {
        &self.spiral
    }

    /// Rebuild the search spiral
    pub fn set_spiral_parameters(&mut self, parameters: SpiralParameters) {
        self.config.spiral = parameters;
        self.spiral = Spiral::new(parameters);
    }

    /// Rebuild the search spiral scaled to `radius`, see [`SpiralParameters::for_radius`]
    pub fn set_spiral_radius(&mut self, radius: f32) {
        if self.spiral.parameters().radius == radius {
            return;
        }
        self.set_spiral_parameters(SpiralParameters::for_radius(radius));
    }

    /// Block a line segment, one particle every `resolution` units
    ///
    /// Only the part of the segment inside the labeling area is sampled.
    pub fn respect_line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, resolution: f32) {
        let Some([x1, y1, x2, y2]) = self.area.clip_segment(x1, y1, x2, y2) else {
            return;
        };
        if let Some(store) = self.loaded_store() {
            walk_line(x1, y1, x2, y2, resolution, |x, y| {
                store.add_particle(x, y);
            });
        }
    }

    /// [`respect_line`](Self::respect_line) with one particle per unit
    pub fn respect_line_default(&mut self, x1: f32, y1: f32, x2: f32, y2: f32) {
        self.respect_line(x1, y1, x2, y2, 1.0);
    }

    /// Block a filled circle, sampled at the smallest label size
    ///
    /// Circles larger than the labeling area only sample the section inside the area.
    pub fn respect_circle(&mut self, center_x: f32, center_y: f32, radius: f32) {
        let resolution = self.dimensions.min_width.min(self.dimensions.min_height);
        let area = self.area;
        let Some(window) = area.clip_box(
            center_x - radius,
            center_x + radius,
            center_y - radius,
            center_y + radius,
        ) else {
            return;
        };
        let Some(store) = self.loaded_store() else {
            return;
        };

        let mut add = |x, y| {
            store.add_particle(x, y);
        };
        if radius <= area.width().max(area.height()) {
            walk_circle(center_x, center_y, radius, resolution, &mut add);
        } else {
            tracing::trace!("Sampling section of circle with radius {}", radius);
            walk_disc_section(center_x, center_y, radius, resolution, &window, &mut add);
        }
    }

    /// Block a filled box with top-left corner `(x, y)`
    pub fn respect_box(&mut self, x: f32, y: f32, width: f32, height: f32) {
        self.respect_box_intern(x, x + width, y, y + height);
    }

    /// Cover `[left, right] × [top, bottom]`, clipped to the labeling area, with a lattice
    /// at the smallest label size
    fn respect_box_intern(&mut self, left: f32, right: f32, top: f32, bottom: f32) {
        let LabelDimensions {
            min_width,
            min_height,
            ..
        } = self.dimensions;
        let Some(clipped) = self.area.clip_box(left, right, top, bottom) else {
            return;
        };
        if let Some(store) = self.loaded_store() {
            walk_box(
                clipped.left,
                clipped.right,
                clipped.top,
                clipped.bottom,
                min_width,
                min_height,
                |x, y| {
                    store.add_particle(x, y);
                },
            );
        }
    }

    /// Block every `resolution`-th pixel of a raster that differs from `empty_color`
    ///
    /// Pixel `(0, 0)` maps to the top-left corner of the labeling area; the raster is
    /// clipped to the area size.
    pub fn respect_map<M: ConflictMap + ?Sized>(&mut self, map: &M, empty_color: u32, resolution: usize) {
        let area = self.area;
        if let Some(store) = self.loaded_store() {
            let max_width = area.width().max(0.0) as u32;
            let max_height = area.height().max(0.0) as u32;
            walk_map(map, empty_color, resolution, max_width, max_height, |x, y| {
                store.add_particle(area.left + x as f32, area.top + y as f32);
            });
        }
    }

    /// [`respect_map`](Self::respect_map) treating white as empty, sampling every pixel
    pub fn respect_map_default<M: ConflictMap + ?Sized>(&mut self, map: &M) {
        self.respect_map(map, crate::RasterMap::WHITE, 1);
    }

    /// Block literal positions
    pub fn respect_points<P: Into<Coord<f32>>>(&mut self, points: impl IntoIterator<Item = P>) {
        if let Some(store) = self.loaded_store() {
            for point in points {
                let point = point.into();
                store.add_particle(point.x, point.y);
            }
        }
    }

    /// Stage 1 on one priority level: the four diagonal corners
    pub fn label_greedy_corner(&mut self, priority: usize) -> usize {
        self.run_strategy(priority, Strategy::Corner)
    }

    /// Stage 2 on one priority level: the four side centers
    pub fn label_greedy_mid_edge(&mut self, priority: usize) -> usize {
        self.run_strategy(priority, Strategy::MidEdge)
    }

    /// Stage 3 on one priority level: boxes slid around the feature
    pub fn label_greedy_slider(&mut self, priority: usize) -> usize {
        self.run_strategy(priority, Strategy::Slider)
    }

    /// Stage 4 on one priority level: distant positions along the spiral
    pub fn label_greedy_spiral(&mut self, priority: usize) -> usize {
        self.run_strategy(priority, Strategy::Spiral)
    }

    /// All four stages on one priority level; returns the number of newly labeled features
    pub fn standard_pipeline(&mut self, priority: usize) -> usize {
        #[cfg(feature = "profiling")]
        profiling::scope!("labeler::standard_pipeline");

        self.standard_pipeline_adjacent(priority) + self.label_greedy_spiral(priority)
    }

    /// Stages 1 to 3 on one priority level, leaving features unlabeled rather than far away
    pub fn standard_pipeline_adjacent(&mut self, priority: usize) -> usize {
        #[cfg(feature = "profiling")]
        profiling::scope!("labeler::standard_pipeline_adjacent");

        self.label_greedy_corner(priority)
            + self.label_greedy_mid_edge(priority)
            + self.label_greedy_slider(priority)
    }

    /// [`standard_pipeline`](Self::standard_pipeline) over every priority level in order
    pub fn standard_pipeline_all(&mut self) -> usize {
        #[cfg(feature = "profiling")]
        profiling::scope!("labeler::standard_pipeline_all");

        (0..self.levels.len())
            .map(|priority| self.standard_pipeline(priority))
            .sum()
    }

    /// [`standard_pipeline_adjacent`](Self::standard_pipeline_adjacent) over every priority level in order
    pub fn standard_pipeline_adjacent_all(&mut self) -> usize {
        #[cfg(feature = "profiling")]
        profiling::scope!("labeler::standard_pipeline_adjacent_all");

        (0..self.levels.len())
            .map(|priority| self.standard_pipeline_adjacent(priority))
            .sum()
    }

    /// Every conflict particle currently stored, in id order
    pub fn particles(&self) -> &[ConflictParticle] {
        self.store
            .as_ref()
            .map(ParticleStore::particles)
            .unwrap_or_default()
    }

    /// Absolute spiral sample positions around `(x, y)`
    pub fn spiral_path(&self, x: f32, y: f32) -> Vec<Coord<f32>> {
        self.spiral.path_around(x, y)
    }

    #[inline]
    fn loaded_store(&mut self) -> Option<&mut ParticleStore> {
        if self.data_loaded { self.store.as_mut() } else { None }
    }

    fn run_strategy(&mut self, priority: usize, strategy: Strategy) -> usize {
        if !self.data_loaded {
            return 0;
        }
        let (Some(store), Some(level)) = (self.store.as_mut(), self.levels.get_mut(priority)) else {
            return 0;
        };

        let mut placer = Placer::new(store, self.area, self.dimensions, self.config.label_gap);
        let mut placed = 0;

        for feature in level.iter_mut().filter(|f| f.awaits_label()) {
            let found = match strategy {
                Strategy::Corner => placer.corner(feature),
                Strategy::MidEdge => placer.mid_edge(feature),
                Strategy::Slider => placer.slider(feature),
                Strategy::Spiral => placer.spiral(feature, &self.spiral),
            };

            if let Some(label_box) = found {
                placer.block(&label_box, feature.label_box_width, feature.label_box_height);
                feature.place(label_box, strategy);
                placed += 1;
            }
        }

        tracing::trace!("{:?} placed {} labels at priority {}", strategy, placed, priority);
        placed
    }
}
