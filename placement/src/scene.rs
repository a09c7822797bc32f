use std::collections::HashSet;

use glam::Vec3;
use log::{debug, warn};
use uuid::Uuid;

use crate::assets::{AssetResolver, ResolvedAsset};
use crate::session::BASE_SCALE;
use crate::store::PlacedItem;

/// Opacity of the not-yet-committed preview node.
pub const GHOST_OPACITY: f32 = 0.5;

/// Render-graph boundary, implemented by the host renderer.
///
/// The pipeline only issues identity-keyed node operations plus a single
/// ghost node. `scale` arrives as the final world scale (base size already
/// applied).
pub trait SceneGraph {
    fn spawn_node(
        &mut self,
        id: Uuid,
        asset: &ResolvedAsset,
        position: Vec3,
        rotation_y: f32,
        scale: f32,
    );

    fn remove_node(&mut self, id: Uuid);

    fn show_ghost(
        &mut self,
        asset: &ResolvedAsset,
        position: Vec3,
        rotation_y: f32,
        scale: f32,
        opacity: f32,
    );

    fn move_ghost(&mut self, position: Vec3, rotation_y: f32, scale: f32);

    /// Must release the ghost synchronously; no deferred teardown.
    fn remove_ghost(&mut self);
}

impl<S: SceneGraph + ?Sized> SceneGraph for &mut S {
    fn spawn_node(
        &mut self,
        id: Uuid,
        asset: &ResolvedAsset,
        position: Vec3,
        rotation_y: f32,
        scale: f32,
    ) {
        (**self).spawn_node(id, asset, position, rotation_y, scale);
    }

    fn remove_node(&mut self, id: Uuid) {
        (**self).remove_node(id);
    }

    fn show_ghost(
        &mut self,
        asset: &ResolvedAsset,
        position: Vec3,
        rotation_y: f32,
        scale: f32,
        opacity: f32,
    ) {
        (**self).show_ghost(asset, position, rotation_y, scale, opacity);
    }

    fn move_ghost(&mut self, position: Vec3, rotation_y: f32, scale: f32) {
        (**self).move_ghost(position, rotation_y, scale);
    }

    fn remove_ghost(&mut self) {
        (**self).remove_ghost();
    }
}

/// Reconciles the rendered node set against the committed placement list by
/// identity-set difference: nodes whose id left the list are removed, ids
/// not yet rendered are spawned, and a node whose id is still present is
/// never re-created or moved. Applying the same list twice is a no-op.
#[derive(Debug, Default)]
pub struct SceneReconciler {
    rendered: HashSet<Uuid>,
}

impl SceneReconciler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reconcile<S, A>(&mut self, scene: &mut S, resolver: &A, items: &[PlacedItem])
    where
        S: SceneGraph,
        A: AssetResolver,
    {
        let live: HashSet<Uuid> = items.iter().map(|item| item.id).collect();

        let stale: Vec<Uuid> = self.rendered.difference(&live).copied().collect();
        for id in stale {
            scene.remove_node(id);
            self.rendered.remove(&id);
        }

        for item in items {
            if self.rendered.contains(&item.id) {
                continue;
            }
            match resolver.load(&item.model) {
                Ok(asset) => {
                    scene.spawn_node(
                        item.id,
                        &asset,
                        item.position_vec(),
                        item.rotation_y,
                        BASE_SCALE * item.scale,
                    );
                    self.rendered.insert(item.id);
                    debug!("restored '{}' at {:?}", item.model, item.position);
                }
                // Left out of the rendered set, so the next pass retries.
                Err(err) => warn!("skipping placed item {}: {}", item.id, err),
            }
        }
    }

    pub fn rendered_count(&self) -> usize {
        self.rendered.len()
    }

    /// Forgets every rendered id without touching the scene; for a full
    /// restart where the renderer rebuilds its graph from scratch.
    pub fn forget_all(&mut self) {
        self.rendered.clear();
    }
}


#[cfg(test)]
mod tests {
    use super::testutil::{RecordingScene, SceneOp, StubResolver};
    use super::*;
    use chrono::Utc;

    fn item(model: &str) -> PlacedItem {
        PlacedItem {
            id: Uuid::new_v4(),
            model: model.to_string(),
            position: [0.0, 0.0, 0.0],
            rotation_y: 0.0,
            scale: 1.0,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn reapplying_the_same_list_is_a_no_op() {
        let mut scene = RecordingScene::default();
        let resolver = StubResolver::with(&["chair"]);
        let mut reconciler = SceneReconciler::new();
        let items = vec![item("chair"), item("chair")];

        reconciler.reconcile(&mut scene, &resolver, &items);
        let ops_after_first = scene.ops.len();
        reconciler.reconcile(&mut scene, &resolver, &items);
        assert_eq!(scene.ops.len(), ops_after_first);
        assert_eq!(reconciler.rendered_count(), 2);
    }

    #[test]
    fn removes_absent_and_spawns_new_without_touching_survivors() {
        let mut scene = RecordingScene::default();
        let resolver = StubResolver::with(&["chair", "sofa"]);
        let mut reconciler = SceneReconciler::new();

        let keep = item("chair");
        let stale = item("chair");
        reconciler.reconcile(&mut scene, &resolver, &[keep.clone(), stale.clone()]);
        scene.ops.clear();

        let added = item("sofa");
        reconciler.reconcile(&mut scene, &resolver, &[keep.clone(), added.clone()]);

        assert!(scene.ops.contains(&SceneOp::Remove(stale.id)));
        assert!(scene.ops.contains(&SceneOp::Spawn(added.id)));
        assert!(!scene.ops.contains(&SceneOp::Spawn(keep.id)));
        assert!(!scene.ops.contains(&SceneOp::Remove(keep.id)));
        assert!(scene.nodes.contains(&keep.id));
    }

    #[test]
    fn unresolvable_items_are_skipped_and_retried() {
        let mut scene = RecordingScene::default();
        let mut reconciler = SceneReconciler::new();
        let broken = item("missing");

        let empty = StubResolver::with(&[]);
        reconciler.reconcile(&mut scene, &empty, &[broken.clone()]);
        assert_eq!(reconciler.rendered_count(), 0);
        assert!(scene.nodes.is_empty());

        // the asset shows up later; the next pass picks the item up
        let fixed = StubResolver::with(&["missing"]);
        reconciler.reconcile(&mut scene, &fixed, &[broken.clone()]);
        assert_eq!(reconciler.rendered_count(), 1);
        assert!(scene.nodes.contains(&broken.id));
    }
}
