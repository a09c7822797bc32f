use glam::{Mat4, Vec3};

use crate::math::{self, ScreenPoint};
use crate::plane::PlaneTracker;

/// Which tier of surface estimate a raycast is allowed to hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RaycastTarget {
    /// Fully reconstructed plane geometry.
    ExistingPlaneGeometry,
    /// A plane the engine is still estimating.
    EstimatedPlane,
}

/// Host AR engine boundary: projects a ray from a screen point into the
/// scene and reports the world transform of the intersection, if any. A
/// raycast either resolves within the frame or returns `None`; there are no
/// retries or timeouts.
pub trait Raycaster {
    fn raycast(&self, point: ScreenPoint, target: RaycastTarget) -> Option<Mat4>;
}

/// A successful surface query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocateHit {
    pub transform: Mat4,
    /// True when the hit came from reconstructed geometry rather than an
    /// estimated plane.
    pub exact: bool,
}

impl LocateHit {
    pub fn position(&self) -> Vec3 {
        math::translation(&self.transform)
    }
}

pub trait SurfaceLocator {
    /// Finds a horizontal surface under `point`. Returns `None` when neither
    /// raycast tier yields a result; callers must not open a placement
    /// session in that case.
    fn locate(&self, point: ScreenPoint) -> Option<LocateHit>;
}

/// Locator over the raw raycaster plus the accumulated plane state.
///
/// Tries reconstructed geometry first and falls back to an estimated plane.
/// When a floor has been recorded, the hit's vertical component is snapped
/// to the floor height so placements do not float on locally noisy plane
/// estimates. Pure query; mutates nothing.
pub struct PlaneLocator<'a, R> {
    raycaster: &'a R,
    tracker: &'a PlaneTracker,
}

impl<'a, R: Raycaster> PlaneLocator<'a, R> {
    pub fn new(raycaster: &'a R, tracker: &'a PlaneTracker) -> Self {
        Self { raycaster, tracker }
    }
}

impl<R: Raycaster> SurfaceLocator for PlaneLocator<'_, R> {
    fn locate(&self, point: ScreenPoint) -> Option<LocateHit> {
        let (transform, exact) = match self
            .raycaster
            .raycast(point, RaycastTarget::ExistingPlaneGeometry)
        {
            Some(hit) => (hit, true),
            None => (
                self.raycaster.raycast(point, RaycastTarget::EstimatedPlane)?,
                false,
            ),
        };
        let transform = match self.tracker.floor_y() {
            Some(floor) => math::with_translation_y(transform, floor),
            None => transform,
        };
        Some(LocateHit { transform, exact })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plane::PlaneAnchor;
    use uuid::Uuid;

    struct FakeRaycaster {
        existing: Option<Mat4>,
        estimated: Option<Mat4>,
    }

    impl Raycaster for FakeRaycaster {
        fn raycast(&self, _point: ScreenPoint, target: RaycastTarget) -> Option<Mat4> {
            match target {
                RaycastTarget::ExistingPlaneGeometry => self.existing,
                RaycastTarget::EstimatedPlane => self.estimated,
            }
        }
    }

    fn at(x: f32, y: f32, z: f32) -> Mat4 {
        Mat4::from_translation(Vec3::new(x, y, z))
    }

    #[test]
    fn prefers_existing_geometry() {
        let raycaster = FakeRaycaster {
            existing: Some(at(1.0, 0.2, 1.0)),
            estimated: Some(at(9.0, 9.0, 9.0)),
        };
        let tracker = PlaneTracker::new();
        let hit = PlaneLocator::new(&raycaster, &tracker)
            .locate(ScreenPoint::new(100.0, 100.0))
            .unwrap();
        assert!(hit.exact);
        assert_eq!(hit.position(), Vec3::new(1.0, 0.2, 1.0));
    }

    #[test]
    fn falls_back_to_estimated_plane() {
        let raycaster = FakeRaycaster {
            existing: None,
            estimated: Some(at(0.5, 0.1, -0.3)),
        };
        let tracker = PlaneTracker::new();
        let hit = PlaneLocator::new(&raycaster, &tracker)
            .locate(ScreenPoint::new(0.0, 0.0))
            .unwrap();
        assert!(!hit.exact);
        assert_eq!(hit.position(), Vec3::new(0.5, 0.1, -0.3));
    }

    #[test]
    fn returns_none_when_both_tiers_miss() {
        let raycaster = FakeRaycaster {
            existing: None,
            estimated: None,
        };
        let tracker = PlaneTracker::new();
        assert!(PlaneLocator::new(&raycaster, &tracker)
            .locate(ScreenPoint::new(10.0, 10.0))
            .is_none());
    }

    #[test]
    fn snaps_hits_to_the_recorded_floor() {
        let raycaster = FakeRaycaster {
            existing: Some(at(1.0, 0.35, 2.0)),
            estimated: None,
        };
        let mut tracker = PlaneTracker::new();
        tracker.anchor_added(PlaneAnchor::horizontal(
            Uuid::new_v4(),
            at(0.0, -0.2, 0.0),
            (1.0, 1.0),
        ));
        let hit = PlaneLocator::new(&raycaster, &tracker)
            .locate(ScreenPoint::new(50.0, 50.0))
            .unwrap();
        assert_eq!(hit.position(), Vec3::new(1.0, -0.2, 2.0));
    }
}
