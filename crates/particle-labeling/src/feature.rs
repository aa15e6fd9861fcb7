//! Point features and their placement results

use crate::LabelBox;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Pipeline stage that produced a label position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Strategy {
    /// Positions 1 to 4 of the 8-position model: the four diagonal corners
    Corner,
    /// Positions 5 to 8 of the 8-position model: centered on each side
    MidEdge,
    /// Boxes slid along the perimeter of the four corner positions
    Slider,
    /// Distant positions sampled along a spiral around the feature
    Spiral,
}

/// A placed label
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Placement {
    pub label_box: LabelBox,
    pub strategy: Strategy,
}

/// A 2D point to be labeled
///
/// The position is fixed at construction. The label size must be positive before labeling;
/// a zero width or height disables placement for this feature. Everything the labeler
/// writes back (enabled flag, particle link, placement) is read-only to callers.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PointFeature<T = ()> {
    x: f32,
    y: f32,
    /// Width of the label box
    pub label_box_width: f32,
    /// Height of the label box
    pub label_box_height: f32,
    /// Size of the visual symbol drawn at the position; labels keep clear of it
    extent_width: f32,
    extent_height: f32,
    /// Id of the conflict particle registered for the position
    particle_id: Option<u32>,
    enabled_for_labeling: bool,
    placement: Option<Placement>,
    /// Caller payload, never touched by the labeler
    pub data: T,
}

impl PointFeature<()> {
    /// Create a feature without payload
    pub fn new(x: f32, y: f32, label_box_width: f32, label_box_height: f32) -> Self {
        Self::with_data(x, y, label_box_width, label_box_height, ())
    }
}

impl<T> PointFeature<T> {
    /// Create a feature carrying a caller payload
    pub fn with_data(x: f32, y: f32, label_box_width: f32, label_box_height: f32, data: T) -> Self {
        Self {
            x,
            y,
            label_box_width,
            label_box_height,
            extent_width: 0.0,
            extent_height: 0.0,
            particle_id: None,
            enabled_for_labeling: false,
            placement: None,
            data,
        }
    }

    /// Builder form of [`Self::set_extent`]
    pub fn with_extent(mut self, width: f32, height: f32) -> Self {
        self.set_extent(width, height);
        self
    }

    /// Set the rectangular extent of the feature's symbol
    pub fn set_extent(&mut self, width: f32, height: f32) {
        self.extent_width = width;
        self.extent_height = height;
    }

    #[inline]
    pub fn x(&self) -> f32 {
        self.x
    }

    #[inline]
    pub fn y(&self) -> f32 {
        self.y
    }

    #[inline]
    pub fn extent_width(&self) -> f32 {
        self.extent_width
    }

    #[inline]
    pub fn extent_height(&self) -> f32 {
        self.extent_height
    }

    /// Radius of the circle enclosing the symbol, `max(extent_width, extent_height)`
    #[inline]
    pub fn radial_extent(&self) -> f32 {
        self.extent_width.max(self.extent_height)
    }

    /// The symbol extent as a box centered on the position
    pub fn extent_box(&self) -> LabelBox {
        let half_w = self.extent_width / 2.0;
        let half_h = self.extent_height / 2.0;
        LabelBox::new(self.x - half_w, self.x + half_w, self.y - half_h, self.y + half_h)
    }

    /// Whether the position lay inside the labeling area at load time
    #[inline]
    pub fn is_enabled_for_labeling(&self) -> bool {
        self.enabled_for_labeling
    }

    #[inline]
    pub fn particle_id(&self) -> Option<u32> {
        self.particle_id
    }

    #[inline]
    pub fn is_labeled(&self) -> bool {
        self.placement.is_some()
    }

    #[inline]
    pub fn placement(&self) -> Option<&Placement> {
        self.placement.as_ref()
    }

    /// The label rectangle, only present once labeled
    #[inline]
    pub fn label_box(&self) -> Option<LabelBox> {
        self.placement.map(|p| p.label_box)
    }

    /// The stage that placed the label, only present once labeled
    #[inline]
    pub fn strategy(&self) -> Option<Strategy> {
        self.placement.map(|p| p.strategy)
    }

    #[inline]
    pub fn is_labeled_by(&self, strategy: Strategy) -> bool {
        self.strategy() == Some(strategy)
    }

    /// Enabled, unlabeled and with a usable label size
    #[inline]
    pub(crate) fn awaits_label(&self) -> bool {
        self.enabled_for_labeling
            && self.placement.is_none()
            && self.label_box_width > 0.0
            && self.label_box_height > 0.0
    }

    /// Forget any previous run: no particle, no placement, disabled
    pub(crate) fn reset_labeling(&mut self) {
        self.particle_id = None;
        self.enabled_for_labeling = false;
        self.placement = None;
    }

    pub(crate) fn enable(&mut self, particle_id: Option<u32>) {
        self.enabled_for_labeling = true;
        self.particle_id = particle_id;
    }

    pub(crate) fn place(&mut self, label_box: LabelBox, strategy: Strategy) {
        self.placement = Some(Placement {
            label_box,
            strategy,
        });
    }
}
