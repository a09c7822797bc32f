use std::collections::HashMap;

use glam::Mat4;
use log::debug;
use uuid::Uuid;

use crate::math;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaneAlignment {
    Horizontal,
    Vertical,
}

/// A flat surface detected by the AR engine.
#[derive(Debug, Clone, Copy)]
pub struct PlaneAnchor {
    pub id: Uuid,
    pub alignment: PlaneAlignment,
    /// World transform of the anchor; the translation carries the plane height.
    pub transform: Mat4,
    /// Reconstructed extent in meters (width, depth).
    pub extent: (f32, f32),
}

impl PlaneAnchor {
    pub fn horizontal(id: Uuid, transform: Mat4, extent: (f32, f32)) -> Self {
        Self {
            id,
            alignment: PlaneAlignment::Horizontal,
            transform,
            extent,
        }
    }

    pub fn y(&self) -> f32 {
        math::translation(&self.transform).y
    }
}

/// Bookkeeping over the plane anchors observed so far.
///
/// The floor estimate is a running minimum over horizontal plane heights: it
/// only ever moves down and survives anchor removal and tracking
/// interruptions. [`PlaneTracker::reset`] is the sole way to clear it.
#[derive(Debug, Default)]
pub struct PlaneTracker {
    planes: HashMap<Uuid, PlaneAnchor>,
    floor_y: Option<f32>,
    seen_plane: bool,
}

impl PlaneTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a newly detected plane. Returns true when this is the first
    /// plane since the last reset or interruption.
    pub fn anchor_added(&mut self, anchor: PlaneAnchor) -> bool {
        let first = !self.seen_plane;
        self.seen_plane = true;
        if anchor.alignment == PlaneAlignment::Horizontal {
            self.observe_height(&anchor);
            self.planes.insert(anchor.id, anchor);
        }
        first
    }

    /// Updates an already-tracked plane's geometry and height. Unknown
    /// anchors are ignored.
    pub fn anchor_updated(&mut self, anchor: PlaneAnchor) {
        if anchor.alignment != PlaneAlignment::Horizontal
            || !self.planes.contains_key(&anchor.id)
        {
            return;
        }
        self.observe_height(&anchor);
        self.planes.insert(anchor.id, anchor);
    }

    pub fn anchor_removed(&mut self, id: Uuid) {
        self.planes.remove(&id);
    }

    fn observe_height(&mut self, anchor: &PlaneAnchor) {
        let y = anchor.y();
        if self.floor_y.map_or(true, |floor| y < floor) {
            debug!("floor plane at y = {}", y);
            self.floor_y = Some(y);
        }
    }

    /// Lowest horizontal plane height seen so far.
    pub fn floor_y(&self) -> Option<f32> {
        self.floor_y
    }

    /// Total reconstructed horizontal surface in square meters.
    pub fn scanned_area(&self) -> f32 {
        self.planes
            .values()
            .map(|plane| plane.extent.0 * plane.extent.1)
            .sum()
    }

    pub fn plane_count(&self) -> usize {
        self.planes.len()
    }

    /// Clears the first-plane latch while keeping planes and the floor
    /// estimate; used when tracking resumes after an interruption.
    pub fn clear_detection_latch(&mut self) {
        self.seen_plane = false;
    }

    /// Forgets everything, floor estimate included. Only for a full session
    /// restart.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn anchor_at(y: f32) -> PlaneAnchor {
        PlaneAnchor::horizontal(
            Uuid::new_v4(),
            Mat4::from_translation(Vec3::new(0.0, y, 0.0)),
            (1.0, 1.0),
        )
    }

    #[test]
    fn floor_is_the_running_minimum() {
        let mut tracker = PlaneTracker::new();
        assert_eq!(tracker.floor_y(), None);
        for y in [0.3, -0.1, 0.2, -0.4, 0.0] {
            tracker.anchor_added(anchor_at(y));
        }
        assert_eq!(tracker.floor_y(), Some(-0.4));
    }

    #[test]
    fn floor_never_rises_on_update_or_removal() {
        let mut tracker = PlaneTracker::new();
        let low = anchor_at(-0.4);
        tracker.anchor_added(low);
        let mut raised = low;
        raised.transform = Mat4::from_translation(Vec3::new(0.0, 0.5, 0.0));
        tracker.anchor_updated(raised);
        assert_eq!(tracker.floor_y(), Some(-0.4));
        tracker.anchor_removed(low.id);
        assert_eq!(tracker.floor_y(), Some(-0.4));
    }

    #[test]
    fn update_of_unknown_anchor_is_ignored() {
        let mut tracker = PlaneTracker::new();
        tracker.anchor_updated(anchor_at(-2.0));
        assert_eq!(tracker.floor_y(), None);
        assert_eq!(tracker.plane_count(), 0);
    }

    #[test]
    fn first_plane_latch_and_interruption() {
        let mut tracker = PlaneTracker::new();
        assert!(tracker.anchor_added(anchor_at(0.0)));
        assert!(!tracker.anchor_added(anchor_at(0.1)));
        tracker.clear_detection_latch();
        assert!(tracker.anchor_added(anchor_at(0.2)));
        // floor survives the interruption
        assert_eq!(tracker.floor_y(), Some(0.0));
    }

    #[test]
    fn vertical_planes_do_not_affect_floor_or_area() {
        let mut tracker = PlaneTracker::new();
        let wall = PlaneAnchor {
            id: Uuid::new_v4(),
            alignment: PlaneAlignment::Vertical,
            transform: Mat4::from_translation(Vec3::new(0.0, -5.0, 0.0)),
            extent: (2.0, 2.0),
        };
        // still counts for the first-plane latch
        assert!(tracker.anchor_added(wall));
        assert_eq!(tracker.floor_y(), None);
        assert_eq!(tracker.scanned_area(), 0.0);
    }

    #[test]
    fn scanned_area_sums_horizontal_extents() {
        let mut tracker = PlaneTracker::new();
        let a = PlaneAnchor::horizontal(Uuid::new_v4(), Mat4::IDENTITY, (2.0, 1.5));
        let b = PlaneAnchor::horizontal(Uuid::new_v4(), Mat4::IDENTITY, (0.5, 0.5));
        tracker.anchor_added(a);
        tracker.anchor_added(b);
        assert!((tracker.scanned_area() - 3.25).abs() < f32::EPSILON);
        tracker.anchor_removed(b.id);
        assert!((tracker.scanned_area() - 3.0).abs() < f32::EPSILON);
    }

    #[test]
    fn reset_forgets_the_floor() {
        let mut tracker = PlaneTracker::new();
        tracker.anchor_added(anchor_at(-1.0));
        tracker.reset();
        assert_eq!(tracker.floor_y(), None);
        assert_eq!(tracker.plane_count(), 0);
    }
}
