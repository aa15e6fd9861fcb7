//! Candidate search for the four placement strategies
//!
//! A [`Placer`] borrows the labeler's particle store for the duration of one strategy run.
//! Searches only read the store; [`Placer::block`] injects the particles of an accepted label.

use crate::sampling::walk_box;
use crate::{ConflictParticle, LabelArea, LabelBox, LabelDimensions, ParticleStore, PointFeature, Spiral};

/// Distance a slider box moves per step
const SLIDER_STEP: f32 = 1.0;

/// A slider pass ends once the box is closer than this to its stop position
const SLIDER_EPSILON: f32 = 0.01;

pub(crate) struct Placer<'a> {
    store: &'a mut ParticleStore,
    area: LabelArea,
    dimensions: LabelDimensions,
    gap: f32,
}

/// Geometry shared by the adjacent strategies
#[derive(Clone, Copy)]
struct Anchor {
    x: f32,
    y: f32,
    /// Half extent plus gap
    h_gap: f32,
    v_gap: f32,
    width: f32,
    height: f32,
    own_id: Option<u32>,
}

impl Anchor {
    fn of<T>(feature: &PointFeature<T>, gap: f32) -> Self {
        Self {
            x: feature.x(),
            y: feature.y(),
            h_gap: feature.extent_width() / 2.0 + gap,
            v_gap: feature.extent_height() / 2.0 + gap,
            width: feature.label_box_width,
            height: feature.label_box_height,
            own_id: feature.particle_id(),
        }
    }

    /// Rectangle every adjacent candidate lies in
    fn reach(&self) -> LabelBox {
        LabelBox::new(
            self.x - self.h_gap - self.width,
            self.x + self.h_gap + self.width,
            self.y - self.v_gap - self.height,
            self.y + self.v_gap + self.height,
        )
    }

    /// Positions 1 to 4: right-above, left-above, left-below, right-below
    fn corners(&self) -> [LabelBox; 4] {
        let right_l = self.x + self.h_gap;
        let left_r = self.x - self.h_gap;
        let above_b = self.y - self.v_gap;
        let below_t = self.y + self.v_gap;
        [
            LabelBox::new(right_l, right_l + self.width, above_b - self.height, above_b),
            LabelBox::new(left_r - self.width, left_r, above_b - self.height, above_b),
            LabelBox::new(left_r - self.width, left_r, below_t, below_t + self.height),
            LabelBox::new(right_l, right_l + self.width, below_t, below_t + self.height),
        ]
    }

    /// Positions 5 to 8: right, above, left, below, centered on the feature
    fn mid_edges(&self) -> [LabelBox; 4] {
        let half_w = self.width / 2.0;
        let half_h = self.height / 2.0;
        let right_l = self.x + self.h_gap;
        let left_r = self.x - self.h_gap;
        let above_b = self.y - self.v_gap;
        let below_t = self.y + self.v_gap;
        [
            LabelBox::new(right_l, right_l + self.width, self.y - half_h, self.y + half_h),
            LabelBox::new(self.x - half_w, self.x + half_w, above_b - self.height, above_b),
            LabelBox::new(left_r - self.width, left_r, self.y - half_h, self.y + half_h),
            LabelBox::new(self.x - half_w, self.x + half_w, below_t, below_t + self.height),
        ]
    }
}

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl<'a> Placer<'a> {
    pub(crate) fn new(
        store: &'a mut ParticleStore,
        area: LabelArea,
        dimensions: LabelDimensions,
        gap: f32,
    ) -> Self {
        Self {
            store,
            area,
            dimensions,
            gap,
        }
    }

    /// First free corner position
    pub(crate) fn corner<T>(&self, feature: &PointFeature<T>) -> Option<LabelBox> {
        let anchor = Anchor::of(feature, self.gap);
        let nearby = self.nearby(&anchor.reach());
        anchor
            .corners()
            .into_iter()
            .find(|candidate| self.fits(candidate, &nearby, anchor.own_id))
    }

    /// First free mid-edge position
    pub(crate) fn mid_edge<T>(&self, feature: &PointFeature<T>) -> Option<LabelBox> {
        let anchor = Anchor::of(feature, self.gap);
        let nearby = self.nearby(&anchor.reach());
        anchor
            .mid_edges()
            .into_iter()
            .find(|candidate| self.fits(candidate, &nearby, anchor.own_id))
    }

    /// First free position while sliding a box around the perimeter of the corner positions
    ///
    /// The box starts right-above and slides left, then down along the left side, right along
    /// the bottom and finally up the right side. A pass is skipped when its starting
    /// position already lies beyond the matching area border.
    pub(crate) fn slider<T>(&self, feature: &PointFeature<T>) -> Option<LabelBox> {
        let anchor = Anchor::of(feature, self.gap);
        let stop = anchor.reach();
        let nearby = self.nearby(&stop);
        let fits = |candidate: &LabelBox| self.fits(candidate, &nearby, anchor.own_id);

        let mut candidate = LabelBox::new(
            stop.right - anchor.width,
            stop.right,
            stop.top,
            stop.top + anchor.height,
        );

        // Along the top, leftwards
        if candidate.top >= self.area.top {
            while candidate.left - stop.left >= SLIDER_EPSILON {
                if fits(&candidate) {
                    return Some(candidate);
                }
                candidate.translate(-SLIDER_STEP, 0.0);
            }
        }

        // Along the left side, downwards
        candidate.left = stop.left;
        candidate.right = stop.left + anchor.width;
        if candidate.left >= self.area.left {
            while stop.bottom - candidate.bottom >= SLIDER_EPSILON {
                if fits(&candidate) {
                    return Some(candidate);
                }
                candidate.translate(0.0, SLIDER_STEP);
            }
        }

        // Along the bottom, rightwards
        candidate.bottom = stop.bottom;
        candidate.top = stop.bottom - anchor.height;
        if candidate.bottom <= self.area.bottom {
            while stop.right - candidate.right >= SLIDER_EPSILON {
                if fits(&candidate) {
                    return Some(candidate);
                }
                candidate.translate(SLIDER_STEP, 0.0);
            }
        }

        // Along the right side, upwards
        candidate.right = stop.right;
        candidate.left = stop.right - anchor.width;
        if candidate.right <= self.area.right {
            while candidate.top - stop.top >= SLIDER_EPSILON {
                if fits(&candidate) {
                    return Some(candidate);
                }
                candidate.translate(0.0, -SLIDER_STEP);
            }
        }

        None
    }

    /// First free position along the spiral, with the sample as the box's bottom-left corner
    ///
    /// Stricter than the adjacent strategies: the feature's own particle counts as a
    /// collision and no corner may touch the feature's extent box.
    pub(crate) fn spiral<T>(&self, feature: &PointFeature<T>, spiral: &Spiral) -> Option<LabelBox> {
        let extent = feature.extent_box();
        let (x, y) = (feature.x(), feature.y());
        let (width, height) = (feature.label_box_width, feature.label_box_height);

        spiral
            .offsets()
            .iter()
            .map(|offset| {
                let left = x + offset.x;
                let bottom = y + offset.y;
                LabelBox::new(left, left + width, bottom - height, bottom)
            })
            .find(|candidate| {
                self.area.contains(candidate)
                    && !candidate.has_corner_in(&extent)
                    && self
                        .store
                        .involved_particles(candidate.left, candidate.top, candidate.right, candidate.bottom)
                        .all(|p| !candidate.contains_point(p.x, p.y))
            })
    }

    /// Inject particles so later candidates cannot overlap an accepted label
    ///
    /// A box no larger than the smallest label only needs its corners; anything larger is
    /// covered with a lattice at the smallest label size.
    pub(crate) fn block(&mut self, label_box: &LabelBox, width: f32, height: f32) {
        let store = &mut *self.store;
        if width <= self.dimensions.min_width && height <= self.dimensions.min_height {
            for (x, y) in label_box.corners() {
                store.add_particle(x, y);
            }
        } else {
            walk_box(
                label_box.left,
                label_box.right,
                label_box.top,
                label_box.bottom,
                self.dimensions.min_width,
                self.dimensions.min_height,
                |x, y| {
                    store.add_particle(x, y);
                },
            );
        }
    }

    #[inline]
    fn nearby(&self, reach: &LabelBox) -> Vec<ConflictParticle> {
        self.store
            .get_involved_particles(reach.left, reach.top, reach.right, reach.bottom)
    }

    /// Inside the area and no particle other than `own_id` within the closed box
    #[inline]
    fn fits(&self, candidate: &LabelBox, nearby: &[ConflictParticle], own_id: Option<u32>) -> bool {
        self.area.contains(candidate)
            && nearby
                .iter()
                .all(|p| Some(p.id) == own_id || !candidate.contains_point(p.x, p.y))
    }
}
