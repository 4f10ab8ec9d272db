//! Ownership of every renderable created while building a level.
//!
//! Physics colliders are owned by the physics world once inserted; models and instances
//! are owned here until [`LevelResources::dispose`] hands them back to the render context.
//! Disposal must happen before the next build and at shutdown.

use crate::{ground::GroundTile, render::RenderContext};

#[derive(Debug)]
pub struct LevelResources<M, I> {
    models: Vec<M>,
    ground_tiles: Vec<(GroundTile, I)>,
    static_instances: Vec<I>,
}

impl<M, I> Default for LevelResources<M, I> {
    fn default() -> Self {
        Self {
            models: Vec::new(),
            ground_tiles: Vec::new(),
            static_instances: Vec::new(),
        }
    }
}

impl<M, I> LevelResources<M, I> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn track_model(&mut self, model: M) {
        self.models.push(model);
    }

    pub fn track_ground_tile(&mut self, tile: GroundTile, instance: I) {
        self.ground_tiles.push((tile, instance));
    }

    pub fn track_static_instance(&mut self, instance: I) {
        self.static_instances.push(instance);
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty() && self.ground_tiles.is_empty() && self.static_instances.is_empty()
    }

    pub fn model_count(&self) -> usize {
        self.models.len()
    }

    pub fn ground_tiles(&self) -> impl Iterator<Item = (&GroundTile, &I)> {
        self.ground_tiles.iter().map(|(tile, instance)| (tile, instance))
    }

    pub fn ground_tile_count(&self) -> usize {
        self.ground_tiles.len()
    }

    pub fn static_instances(&self) -> &[I] {
        &self.static_instances
    }

    /// Release everything tracked so far: instances first, then the models they reference.
    ///
    /// Without a render context nothing was uploaded through this registry in the first
    /// place, so any leftovers are dropped with a warning.
    pub fn dispose<R>(&mut self, render: Option<&mut R>)
    where
        R: RenderContext<Model = M, Instance = I>,
    {
        let models = self.models.len();
        let instances = self.ground_tiles.len() + self.static_instances.len();

        match render {
            Some(render) => {
                for (_, instance) in self.ground_tiles.drain(..) {
                    render.release_instance(instance);
                }
                for instance in self.static_instances.drain(..) {
                    render.release_instance(instance);
                }
                for model in self.models.drain(..) {
                    render.release_model(model);
                }
            }
            None => {
                if !self.is_empty() {
                    log::warn!(
                        "disposing {models} models / {instances} instances without a render context"
                    );
                }
                self.ground_tiles.clear();
                self.static_instances.clear();
                self.models.clear();
                return;
            }
        }
        log::debug!("released {models} models and {instances} instances");
    }
}
