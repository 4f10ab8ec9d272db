//! Bevy implementation of the level core's render capability.
//!
//! Models are mesh assets plus a material; instances are entities. The ground shares
//! one mesh across every tile entity, structures share one combined mesh.

use bevy::{
    asset::RenderAssetUsages,
    image::{ImageAddressMode, ImageSampler, ImageSamplerDescriptor},
    mesh::{Indices, PrimitiveTopology},
    prelude::*,
    render::render_resource::{Extent3d, TextureDimension, TextureFormat},
};
use nalgebra::Isometry3;
use shared::{AssetLibrary, MaterialKind, RenderContext, RenderMesh};

/// Marks entities spawned for static level geometry.
#[derive(Component, Debug)]
pub struct StaticGeometry;

/// GPU-side handles of one uploaded model.
#[derive(Debug, Clone)]
pub struct BevyModel {
    pub mesh: Handle<Mesh>,
    pub material: Handle<StandardMaterial>,
}

/// Materials shared by every level build.
#[derive(Resource)]
pub struct LevelMaterials {
    pub ground: Handle<StandardMaterial>,
    pub structure: Handle<StandardMaterial>,
}

const CHECKER_SIZE: u32 = 64;

pub(super) fn setup_materials(
    mut commands: Commands,
    mut images: ResMut<Assets<Image>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let ground_texture = images.add(checker_image());
    commands.insert_resource(LevelMaterials {
        ground: materials.add(StandardMaterial {
            base_color_texture: Some(ground_texture),
            perceptual_roughness: 1.0,
            metallic: 0.0,
            ..default()
        }),
        structure: materials.add(StandardMaterial {
            base_color: Color::srgb_u8(124, 144, 255),
            perceptual_roughness: 0.8,
            ..default()
        }),
    });
}

/// Two-tone grass checker with repeat addressing, so tile UVs beyond 1 wrap.
fn checker_image() -> Image {
    let half = CHECKER_SIZE / 2;
    let mut data = Vec::with_capacity((CHECKER_SIZE * CHECKER_SIZE * 4) as usize);
    for y in 0..CHECKER_SIZE {
        for x in 0..CHECKER_SIZE {
            let texel: [u8; 4] = if (x < half) == (y < half) {
                [51, 77, 64, 255]
            } else {
                [61, 92, 71, 255]
            };
            data.extend_from_slice(&texel);
        }
    }

    let mut image = Image::new(
        Extent3d {
            width: CHECKER_SIZE,
            height: CHECKER_SIZE,
            depth_or_array_layers: 1,
        },
        TextureDimension::D2,
        data,
        TextureFormat::Rgba8UnormSrgb,
        RenderAssetUsages::RENDER_WORLD,
    );
    image.sampler = ImageSampler::Descriptor(ImageSamplerDescriptor {
        address_mode_u: ImageAddressMode::Repeat,
        address_mode_v: ImageAddressMode::Repeat,
        ..default()
    });
    image
}

fn to_bevy_mesh(mesh: &RenderMesh) -> Mesh {
    let mut out = Mesh::new(PrimitiveTopology::TriangleList, RenderAssetUsages::default());
    out.insert_attribute(Mesh::ATTRIBUTE_POSITION, mesh.positions.clone());
    out.insert_attribute(Mesh::ATTRIBUTE_NORMAL, mesh.normals.clone());
    out.insert_attribute(Mesh::ATTRIBUTE_UV_0, mesh.uvs.clone());
    out.insert_indices(Indices::U32(mesh.indices.clone()));
    out
}

pub fn to_transform(pose: &Isometry3<f32>) -> Transform {
    let t = pose.translation.vector;
    let q = pose.rotation.into_inner();
    Transform {
        translation: Vec3::new(t.x, t.y, t.z),
        rotation: Quat::from_xyzw(q.i, q.j, q.k, q.w),
        ..default()
    }
}

/// Borrowed view of the ECS state a level build touches.
pub struct BevyRender<'a, 'w, 's> {
    pub commands: &'a mut Commands<'w, 's>,
    pub meshes: &'a mut Assets<Mesh>,
    pub materials: &'a LevelMaterials,
    pub assets: &'a AssetLibrary,
}

impl RenderContext for BevyRender<'_, '_, '_> {
    type Model = BevyModel;
    type Instance = Entity;

    fn has_render_data(&self, asset_id: &str) -> bool {
        self.assets.contains(asset_id)
    }

    fn upload(&mut self, name: &str, mesh: &RenderMesh, material: MaterialKind) -> BevyModel {
        debug!(
            "upload `{name}`: {} vertices, {} triangles",
            mesh.vertex_count(),
            mesh.triangle_count()
        );
        let material = match material {
            MaterialKind::Ground => self.materials.ground.clone(),
            MaterialKind::Structure => self.materials.structure.clone(),
        };
        BevyModel {
            mesh: self.meshes.add(to_bevy_mesh(mesh)),
            material,
        }
    }

    fn instantiate(&mut self, model: &BevyModel, name: &str, pose: &Isometry3<f32>) -> Entity {
        self.commands
            .spawn((
                Name::new(name.to_owned()),
                StaticGeometry,
                Mesh3d(model.mesh.clone()),
                MeshMaterial3d(model.material.clone()),
                to_transform(pose),
            ))
            .id()
    }

    fn release_instance(&mut self, instance: Entity) {
        self.commands.entity(instance).despawn();
    }

    fn release_model(&mut self, model: BevyModel) {
        self.meshes.remove(&model.mesh);
    }
}
