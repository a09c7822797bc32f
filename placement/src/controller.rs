use glam::Vec3;
use log::{debug, error, warn};
use uuid::Uuid;

use crate::assets::AssetResolver;
use crate::locator::{LocateHit, PlaneLocator, Raycaster, SurfaceLocator};
use crate::math::ScreenPoint;
use crate::plane::{PlaneAnchor, PlaneTracker};
use crate::scene::{SceneGraph, SceneReconciler, GHOST_OPACITY};
use crate::session::{Gesture, GestureEvent, PlacementSession};
use crate::store::{PlacedItem, PlacementStore, StorageError};

/// Tracking state of the AR session, as surfaced to the UI. Five cases, no
/// transition validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackingState {
    Initializing,
    PlaneSearching,
    PlaneDetected,
    Ready,
    Failed(String),
}

impl TrackingState {
    pub fn is_ready(&self) -> bool {
        matches!(self, TrackingState::Ready | TrackingState::PlaneDetected)
    }
}

/// Focus indicator state for the per-frame surface query at the screen
/// center.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FocusState {
    Hidden,
    /// A placement surface is under the query point. `exact` is false when
    /// the hit came from an estimated plane rather than reconstructed
    /// geometry.
    OnSurface { position: Vec3, exact: bool },
}

/// Drives the placement pipeline over explicitly injected collaborators.
///
/// Construction takes every dependency once; there is no ambient container.
/// All state is mutated through `&mut self` from a single logical thread, so
/// nothing here is locked. Gesture events arrive one at a time.
pub struct PlacementController<R, S, A, G> {
    raycaster: R,
    store: S,
    resolver: A,
    scene: G,
    tracker: PlaneTracker,
    reconciler: SceneReconciler,
    session: Option<PlacementSession>,
    state: TrackingState,
    items: Vec<PlacedItem>,
    model: String,
}

impl<R, S, A, G> PlacementController<R, S, A, G>
where
    R: Raycaster,
    S: PlacementStore,
    A: AssetResolver,
    G: SceneGraph,
{
    /// Builds the controller and replays any previously committed placements
    /// onto the scene.
    pub fn new(
        raycaster: R,
        store: S,
        resolver: A,
        scene: G,
        model: impl Into<String>,
    ) -> Result<Self, StorageError> {
        let mut controller = Self {
            raycaster,
            store,
            resolver,
            scene,
            tracker: PlaneTracker::new(),
            reconciler: SceneReconciler::new(),
            session: None,
            state: TrackingState::Initializing,
            items: Vec::new(),
            model: model.into(),
        };
        controller.refresh()?;
        Ok(controller)
    }

    pub fn state(&self) -> &TrackingState {
        &self.state
    }

    /// Committed placements as of the last refresh, creation order.
    pub fn items(&self) -> &[PlacedItem] {
        &self.items
    }

    pub fn is_placing(&self) -> bool {
        self.session.is_some()
    }

    pub fn session(&self) -> Option<&PlacementSession> {
        self.session.as_ref()
    }

    pub fn selected_model(&self) -> &str {
        &self.model
    }

    /// Total reconstructed horizontal surface in square meters.
    pub fn scanned_area(&self) -> f32 {
        self.tracker.scanned_area()
    }

    /// Re-reads the committed list and reconciles the scene against it.
    pub fn refresh(&mut self) -> Result<(), StorageError> {
        self.items = self.store.list()?;
        self.reconciler
            .reconcile(&mut self.scene, &self.resolver, &self.items);
        Ok(())
    }

    // --- AR engine callbacks ---

    /// The session configuration has been (re)run and plane detection is
    /// underway.
    pub fn begin_searching(&mut self) {
        self.state = TrackingState::PlaneSearching;
    }

    pub fn plane_added(&mut self, anchor: PlaneAnchor) {
        if self.tracker.anchor_added(anchor) {
            self.state = TrackingState::PlaneDetected;
        }
    }

    pub fn plane_updated(&mut self, anchor: PlaneAnchor) {
        self.tracker.anchor_updated(anchor);
    }

    pub fn plane_removed(&mut self, id: Uuid) {
        self.tracker.anchor_removed(id);
    }

    pub fn fail(&mut self, message: impl Into<String>) {
        self.state = TrackingState::Failed(message.into());
    }

    pub fn interruption_began(&mut self) {
        self.state = TrackingState::Failed("session interrupted".to_string());
    }

    /// Tracking resumed after an interruption. The first-plane latch is
    /// cleared so the next detection surfaces again; the floor estimate is
    /// kept.
    pub fn interruption_ended(&mut self) {
        self.tracker.clear_detection_latch();
        self.state = TrackingState::PlaneSearching;
    }

    /// Full restart: discard any open session, forget all plane and floor
    /// state, and respawn the committed placements into the renderer's fresh
    /// graph.
    pub fn restart(&mut self) -> Result<(), StorageError> {
        self.cancel();
        self.tracker.reset();
        self.reconciler.forget_all();
        self.state = TrackingState::PlaneSearching;
        self.refresh()
    }

    // --- gestures ---

    pub fn handle_gesture(&mut self, event: GestureEvent) {
        match event {
            GestureEvent::TapAt(point) => self.begin_placement(point),
            GestureEvent::PanChanged(point) => self.drag(point),
            GestureEvent::PinchChanged(factor) => {
                if let Some(session) = self.session.as_mut() {
                    session.pinch(factor);
                }
                self.sync_ghost();
            }
            GestureEvent::RotateChanged(delta) => {
                if let Some(session) = self.session.as_mut() {
                    session.rotate(delta);
                }
                self.sync_ghost();
            }
            GestureEvent::TwoFingerPanChanged(translation) => {
                if let Some(session) = self.session.as_mut() {
                    session.lift(translation.y);
                }
                self.sync_ghost();
            }
            GestureEvent::GestureEnded(Gesture::Rotate) => {
                if let Some(session) = self.session.as_mut() {
                    session.end_rotate();
                }
            }
            GestureEvent::GestureEnded(_) => {}
        }
    }

    fn locate(&self, point: ScreenPoint) -> Option<LocateHit> {
        PlaneLocator::new(&self.raycaster, &self.tracker).locate(point)
    }

    fn begin_placement(&mut self, point: ScreenPoint) {
        let Some(hit) = self.locate(point) else {
            debug!("no surface under tap, declining to open a session");
            return;
        };
        // Opening discards any previous preview; at most one session is open.
        self.scene.remove_ghost();
        let session = PlacementSession::open(self.model.clone(), hit.transform);
        self.show_ghost(&session);
        self.session = Some(session);
    }

    fn show_ghost(&mut self, session: &PlacementSession) {
        match self.resolver.load(session.model()) {
            Ok(asset) => self.scene.show_ghost(
                &asset,
                session.position(),
                session.rotation_y(),
                session.scale(),
                GHOST_OPACITY,
            ),
            // The session stays open with no visible node; a later model
            // switch can still bring the ghost up.
            Err(err) => warn!("ghost for '{}' unavailable: {}", session.model(), err),
        }
    }

    fn drag(&mut self, point: ScreenPoint) {
        if self.session.is_none() {
            return;
        }
        let Some(hit) = self.locate(point) else {
            return;
        };
        if let Some(session) = self.session.as_mut() {
            session.drag_to(hit.transform);
        }
        self.sync_ghost();
    }

    fn sync_ghost(&mut self) {
        if let Some(session) = &self.session {
            self.scene
                .move_ghost(session.position(), session.rotation_y(), session.scale());
        }
    }

    // --- session lifecycle ---

    /// Finalizes the open session into a persisted record and closes it.
    /// Returns `Ok(None)` when no session is open. On a storage failure the
    /// session is already closed and nothing is written.
    pub fn commit(&mut self) -> Result<Option<PlacedItem>, StorageError> {
        let Some(session) = self.session.take() else {
            return Ok(None);
        };
        self.scene.remove_ghost();
        let item = match self.store.create(session.finish()) {
            Ok(item) => item,
            Err(err) => {
                error!("failed to save placement: {}", err);
                return Err(err);
            }
        };
        debug!("committed '{}' as {}", item.model, item.id);
        self.refresh()?;
        Ok(Some(item))
    }

    /// Discards the session and releases the ghost synchronously. No store
    /// interaction.
    pub fn cancel(&mut self) {
        if self.session.take().is_some() {
            self.scene.remove_ghost();
        }
    }

    pub fn delete(&mut self, id: Uuid) -> Result<(), StorageError> {
        self.store.delete(id)?;
        self.refresh()
    }

    /// Removes every committed placement.
    pub fn clear(&mut self) -> Result<(), StorageError> {
        self.store.clear()?;
        self.refresh()
    }

    // --- model selection ---

    /// Switches the previewed model. An open session keeps its accumulated
    /// position, scale, and rotation; the ghost is reloaded for the new
    /// asset.
    pub fn set_model(&mut self, model: impl Into<String>) {
        self.model = model.into();
        if let Some(session) = self.session.as_mut() {
            session.set_model(self.model.clone());
        }
        if let Some(session) = self.session.clone() {
            self.scene.remove_ghost();
            self.show_ghost(&session);
        }
    }

    /// Filters candidate model identifiers down to those with a resolvable
    /// asset.
    pub fn available_models<'a>(&self, candidates: &'a [String]) -> Vec<&'a str> {
        candidates
            .iter()
            .filter(|model| self.resolver.exists(model))
            .map(String::as_str)
            .collect()
    }

    // --- focus indicator ---

    /// Per-frame focus query, normally at the screen center. Hidden while a
    /// placement is in progress or when no surface is under the point.
    pub fn focus_at(&self, point: ScreenPoint) -> FocusState {
        if self.session.is_some() {
            return FocusState::Hidden;
        }
        match self.locate(point) {
            Some(hit) => FocusState::OnSurface {
                position: hit.position(),
                exact: hit.exact,
            },
            None => FocusState::Hidden,
        }
    }
}
