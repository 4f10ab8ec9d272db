//! Level session: the per-level context object both roles run through.
//!
//! A [`LevelSession`] owns the physics world, the renderable registry and the role
//! strategy for one level. The role is fixed at construction:
//! - [`AuthorityLevel`] randomizes placements and publishes them.
//! - [`ObserverLevel`] never randomizes; it rebuilds from a received placement list.
//!
//! Calling an operation that belongs to the other role returns
//! [`LevelError::RoleViolation`].
//!
//! Lifecycle
//! - `create_level` disposes whatever the session held, then builds ground and statics.
//! - A failed build leaves the session empty (no partial level).
//! - `dispose` releases every model and clears physics. Call it before dropping a
//!   session that rendered.

use std::fmt;

use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::{
    AssetResolver, LevelConfig, LevelError, LevelResult, PlacementRecord,
    assemble::{AssembledStatics, assemble, layout_of, render_statics},
    collision::{ShapeKind, validate_triangles},
    ground::{GroundLayer, build_ground},
    physics::StaticPhysicsWorld,
    placement::generate_placements,
    render::RenderContext,
    resources::LevelResources,
    sync::SyncPayload,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Role {
    /// Decides placement.
    Authoritative,
    /// Reproduces placement received from the authority.
    Observing,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Authoritative => f.write_str("authoritative"),
            Role::Observing => f.write_str("observing"),
        }
    }
}

/// Authoritative strategy: owns the placement RNG and the generated list.
#[derive(Debug)]
pub struct AuthorityLevel {
    seed: u64,
    rng: StdRng,
    placements: Vec<PlacementRecord>,
}

impl AuthorityLevel {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: StdRng::seed_from_u64(seed),
            placements: Vec::new(),
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn placements(&self) -> &[PlacementRecord] {
        &self.placements
    }

    fn populate<R: RenderContext>(
        &mut self,
        config: &LevelConfig,
        assets: &impl AssetResolver,
        physics: &mut StaticPhysicsWorld,
        resources: &mut LevelResources<R::Model, R::Instance>,
        render: Option<&mut R>,
    ) -> LevelResult<AssembledStatics> {
        self.placements.clear();
        let first = physics.len();
        let records = generate_placements(
            &mut self.rng,
            config.static_count,
            &config.catalog,
            &config.bounds,
            assets,
            physics,
        )?;
        let colliders = physics.inserted()[first..]
            .iter()
            .filter(|(_, kind)| matches!(kind, ShapeKind::Mesh))
            .map(|(handle, _)| *handle)
            .collect();

        let layout = match render {
            Some(render) => render_statics(&records, assets, resources, render)?,
            None => layout_of(&records),
        };
        self.placements = records;
        Ok(AssembledStatics { layout, colliders })
    }
}

/// Observing strategy: holds the last received placement list.
#[derive(Debug, Default)]
pub struct ObserverLevel {
    received: Vec<PlacementRecord>,
}

impl ObserverLevel {
    pub fn received(&self) -> &[PlacementRecord] {
        &self.received
    }
}

#[derive(Debug)]
enum Strategy {
    Authority(AuthorityLevel),
    Observer(ObserverLevel),
}

/// Static geometry of one level, for one role.
pub struct LevelSession<M, I> {
    config: LevelConfig,
    strategy: Strategy,
    physics: StaticPhysicsWorld,
    resources: LevelResources<M, I>,
    ground: Option<GroundLayer>,
    statics: Option<AssembledStatics>,
}

/// Session for hosts without a display.
pub type HeadlessSession = LevelSession<(), ()>;

impl<M, I> LevelSession<M, I> {
    /// The authoritative seed comes from `config.seed` (0 when unset).
    pub fn new(role: Role, config: LevelConfig) -> LevelResult<Self> {
        config.validate()?;
        let strategy = match role {
            Role::Authoritative => {
                let seed = config.seed.unwrap_or_default();
                log::debug!("authoritative level session, seed {seed}");
                Strategy::Authority(AuthorityLevel::new(seed))
            }
            Role::Observing => Strategy::Observer(ObserverLevel::default()),
        };
        Ok(Self {
            config,
            strategy,
            physics: StaticPhysicsWorld::new(),
            resources: LevelResources::new(),
            ground: None,
            statics: None,
        })
    }

    pub fn role(&self) -> Role {
        match self.strategy {
            Strategy::Authority(_) => Role::Authoritative,
            Strategy::Observer(_) => Role::Observing,
        }
    }

    pub fn config(&self) -> &LevelConfig {
        &self.config
    }

    pub fn as_authority(&self) -> Option<&AuthorityLevel> {
        match &self.strategy {
            Strategy::Authority(level) => Some(level),
            Strategy::Observer(_) => None,
        }
    }

    pub fn as_observer(&self) -> Option<&ObserverLevel> {
        match &self.strategy {
            Strategy::Observer(level) => Some(level),
            Strategy::Authority(_) => None,
        }
    }

    fn violation(&self, operation: &'static str) -> LevelError {
        LevelError::RoleViolation {
            operation,
            role: self.role(),
        }
    }

    /// Placements of the current level: generated (authority) or received (observer).
    pub fn placements(&self) -> &[PlacementRecord] {
        match &self.strategy {
            Strategy::Authority(level) => level.placements(),
            Strategy::Observer(level) => level.received(),
        }
    }

    /// The payload to publish. Authority only.
    pub fn sync_payload(&self) -> LevelResult<SyncPayload> {
        match &self.strategy {
            Strategy::Authority(level) => Ok(SyncPayload::from_records(level.placements())),
            Strategy::Observer(_) => Err(self.violation("sync_payload")),
        }
    }

    pub fn physics(&self) -> &StaticPhysicsWorld {
        &self.physics
    }

    pub fn resources(&self) -> &LevelResources<M, I> {
        &self.resources
    }

    pub fn ground(&self) -> Option<&GroundLayer> {
        self.ground.as_ref()
    }

    pub fn statics(&self) -> Option<&AssembledStatics> {
        self.statics.as_ref()
    }

    pub fn is_built(&self) -> bool {
        self.ground.is_some()
    }

    /// (Re)build the level: ground in both roles, then generated (authority) or
    /// last-received (observer) statics.
    pub fn create_level<R>(
        &mut self,
        assets: &impl AssetResolver,
        mut render: Option<&mut R>,
    ) -> LevelResult<()>
    where
        R: RenderContext<Model = M, Instance = I>,
    {
        self.dispose(render.as_deref_mut());

        if let Err(err) = self.build(assets, render.as_deref_mut()) {
            log::error!("{} level construction failed: {err}", self.role());
            self.dispose(render);
            return Err(err);
        }
        self.physics.refresh();

        log::info!(
            "{} level ready: {} ground tiles, {} statics, {} colliders",
            self.role(),
            self.ground.as_ref().map_or(0, |g| g.tiles.len()),
            self.placements().len(),
            self.physics.len()
        );
        Ok(())
    }

    fn build<R>(&mut self, assets: &impl AssetResolver, mut render: Option<&mut R>) -> LevelResult<()>
    where
        R: RenderContext<Model = M, Instance = I>,
    {
        let ground = build_ground(
            &self.config.bounds,
            self.config.tile_size,
            &mut self.physics,
            &mut self.resources,
            render.as_deref_mut(),
        )?;
        self.ground = Some(ground);

        let statics = match &mut self.strategy {
            Strategy::Authority(level) => {
                level.populate(&self.config, assets, &mut self.physics, &mut self.resources, render)?
            }
            Strategy::Observer(level) => {
                assemble(&level.received, assets, &mut self.physics, &mut self.resources, render)?
            }
        };
        self.statics = Some(statics);
        Ok(())
    }

    /// Replace the observed level with `payload`. Observer only.
    ///
    /// Every entry is decoded and resolved (triangles, plus render data when rendering)
    /// before the current level is touched; a payload that fails here leaves it as it was.
    /// If the rebuild itself fails the session ends up empty with no received placements.
    pub fn apply_sync<R>(
        &mut self,
        payload: &SyncPayload,
        assets: &impl AssetResolver,
        mut render: Option<&mut R>,
    ) -> LevelResult<()>
    where
        R: RenderContext<Model = M, Instance = I>,
    {
        if self.role() != Role::Observing {
            return Err(self.violation("apply_sync"));
        }
        let records = payload.to_records()?;
        for record in &records {
            resolve(record.asset_id(), assets, render.as_deref())?;
        }
        log::debug!("received {} placements", records.len());

        if let Strategy::Observer(level) = &mut self.strategy {
            level.received = records;
        }
        let result = self.create_level(assets, render.as_deref_mut());
        if result.is_err()
            && let Strategy::Observer(level) = &mut self.strategy
        {
            level.received.clear();
        }
        result
    }

    /// Release every renderable, then drop colliders and level state.
    pub fn dispose<R>(&mut self, render: Option<&mut R>)
    where
        R: RenderContext<Model = M, Instance = I>,
    {
        self.resources.dispose(render);
        self.physics.clear();
        self.ground = None;
        self.statics = None;
    }
}

/// Check that `asset_id` can be built: triangles usable for a collider and, when
/// rendering, render data present.
fn resolve<R: RenderContext>(
    asset_id: &str,
    assets: &impl AssetResolver,
    render: Option<&R>,
) -> LevelResult<()> {
    if let Some(render) = render
        && !render.has_render_data(asset_id)
    {
        return Err(LevelError::missing(asset_id));
    }
    validate_triangles(asset_id, assets.triangles(asset_id)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AssetLibrary, render::Headless};

    fn config(seed: u64) -> LevelConfig {
        LevelConfig::default().with_seed(seed)
    }

    #[test]
    fn authority_builds_ground_and_statics() {
        let assets = AssetLibrary::builtin().unwrap();
        let mut session = HeadlessSession::new(Role::Authoritative, config(1)).unwrap();
        session.create_level::<Headless>(&assets, None).unwrap();

        assert_eq!(session.placements().len(), 1);
        assert_eq!(session.physics().plane_count(), 1);
        assert_eq!(session.physics().mesh_count(), 1);
        assert_eq!(session.statics().unwrap().colliders.len(), 1);
        assert!(session.ground().unwrap().tiles.is_empty());
    }

    #[test]
    fn observer_before_sync_has_only_ground() {
        let assets = AssetLibrary::builtin().unwrap();
        let mut session = HeadlessSession::new(Role::Observing, LevelConfig::default()).unwrap();
        session.create_level::<Headless>(&assets, None).unwrap();

        assert!(session.placements().is_empty());
        assert_eq!(session.physics().len(), 1);
    }

    #[test]
    fn role_violations_are_reported() {
        let assets = AssetLibrary::builtin().unwrap();
        let mut authority = HeadlessSession::new(Role::Authoritative, config(2)).unwrap();
        let err = authority
            .apply_sync::<Headless>(&SyncPayload::default(), &assets, None)
            .unwrap_err();
        assert!(matches!(
            err,
            LevelError::RoleViolation { operation: "apply_sync", role: Role::Authoritative }
        ));

        let observer = HeadlessSession::new(Role::Observing, LevelConfig::default()).unwrap();
        assert!(matches!(
            observer.sync_payload(),
            Err(LevelError::RoleViolation { role: Role::Observing, .. })
        ));
    }

    #[test]
    fn recreate_replaces_rather_than_accumulates() {
        let assets = AssetLibrary::builtin().unwrap();
        let mut session = HeadlessSession::new(Role::Authoritative, config(3)).unwrap();
        session.create_level::<Headless>(&assets, None).unwrap();
        session.create_level::<Headless>(&assets, None).unwrap();
        assert_eq!(session.physics().len(), 2);
        assert_eq!(session.placements().len(), 1);
    }

    #[test]
    fn failed_build_leaves_session_empty() {
        let assets = AssetLibrary::builtin().unwrap();
        let cfg = LevelConfig {
            catalog: vec!["windmill".into()],
            ..config(4)
        };
        let mut session = HeadlessSession::new(Role::Authoritative, cfg).unwrap();
        assert!(session.create_level::<Headless>(&assets, None).is_err());
        assert!(!session.is_built());
        assert!(session.physics().is_empty());
        assert!(session.placements().is_empty());
    }

    #[test]
    fn invalid_payload_keeps_the_current_level() {
        let assets = AssetLibrary::builtin().unwrap();
        let mut session = HeadlessSession::new(Role::Observing, LevelConfig::default()).unwrap();
        session.create_level::<Headless>(&assets, None).unwrap();

        let bad = SyncPayload {
            placements: vec![crate::sync::PlacementEntry {
                asset_id: "gate".into(),
                translation: [f32::NAN, 0.0, 0.0],
                rotation: [0.0, 0.0, 0.0, 1.0],
            }],
        };
        assert!(session.apply_sync::<Headless>(&bad, &assets, None).is_err());
        assert!(session.is_built());
        assert_eq!(session.physics().len(), 1);
    }

    #[test]
    fn unknown_asset_in_payload_keeps_the_current_level() {
        let assets = AssetLibrary::builtin().unwrap();
        let mut session = HeadlessSession::new(Role::Observing, LevelConfig::default()).unwrap();
        let good = SyncPayload {
            placements: vec![crate::sync::PlacementEntry {
                asset_id: "gate".into(),
                translation: [20.0, 0.0, 0.0],
                rotation: [0.0, 0.0, 0.0, 1.0],
            }],
        };
        session.apply_sync::<Headless>(&good, &assets, None).unwrap();

        let mut bad = good.clone();
        bad.placements[0].asset_id = "windmill".into();
        let err = session.apply_sync::<Headless>(&bad, &assets, None).unwrap_err();

        assert!(matches!(err, LevelError::MissingAsset { asset_id } if asset_id == "windmill"));
        assert!(session.is_built());
        assert_eq!(session.physics().mesh_count(), 1);
        assert_eq!(session.placements().len(), 1);
        assert_eq!(session.placements()[0].asset_id(), "gate");

        // A plain rebuild still uses the last accepted list.
        session.create_level::<Headless>(&assets, None).unwrap();
        assert_eq!(session.placements()[0].asset_id(), "gate");
    }
}
