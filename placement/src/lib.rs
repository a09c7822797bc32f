//! Gesture-driven furniture placement pipeline for an AR scene.
//!
//! The pipeline is three roles composed behind trait seams: a surface
//! locator raycasting against detected horizontal planes, a transient
//! placement session accumulating gesture-driven transform adjustments,
//! and a placement store of committed records replayed onto the scene
//! through identity-based reconciliation. The host AR engine and render
//! graph stay outside the crate, behind the [`Raycaster`] and
//! [`SceneGraph`] traits.

pub mod assets;
pub mod controller;
pub mod locator;
pub mod math;
pub mod plane;
pub mod scene;
pub mod session;
pub mod store;

pub use assets::{AssetError, AssetResolver, DiskAssetResolver, ResolvedAsset};
pub use controller::{FocusState, PlacementController, TrackingState};
pub use locator::{LocateHit, PlaneLocator, RaycastTarget, Raycaster, SurfaceLocator};
pub use math::ScreenPoint;
pub use plane::{PlaneAlignment, PlaneAnchor, PlaneTracker};
pub use scene::{SceneGraph, SceneReconciler, GHOST_OPACITY};
pub use session::{
    Gesture, GestureEvent, PlacementSession, BASE_SCALE, LIFT_SENSITIVITY, MAX_SCALE, MIN_SCALE,
};
pub use store::{
    CreatePlacement, FilePlacementStore, MemoryPlacementStore, PlacedItem, PlacementStore,
    StorageError,
};
