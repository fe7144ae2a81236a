use std::borrow::Cow;
use std::collections::HashMap;

use glam::Mat4;
use tracing::{debug, info, warn};

use super::camera::Camera;
use super::light::{Light, MAX_LIGHTS};
use super::material::{Material, DEFAULT_MATERIAL};
use super::tree::ObjectForest;
use super::{SceneGraph, SceneObject};
use crate::anim::AnimationCollection;
use crate::config::ExportConfig;
use crate::error::{ExportError, Result};
use crate::file_format::OBJECT_NAME_LEN;
use crate::host::{self, ObjectKind, RawArmature, RawObject, SceneDescription, SceneSource};
use crate::mesh::{self, indexer, tangents, BoneIndexSpace, IndexedGeometry, SkinWeightResolver};

/// Append-only table deduplicated by source identity.
struct ResourceTable<T> {
    items: Vec<T>,
    by_key: HashMap<String, usize>,
}

impl<T> ResourceTable<T> {
    fn new() -> Self {
        Self {
            items: vec![],
            by_key: HashMap::new(),
        }
    }

    /// 1-based index of `key`, encoding the resource on first use.
    fn get_or_insert_with(&mut self, key: &str, encode: impl FnOnce() -> Result<T>) -> Result<u32> {
        if let Some(&index) = self.by_key.get(key) {
            return Ok(index as u32 + 1);
        }
        let item = encode()?;
        self.items.push(item);
        self.by_key.insert(key.to_string(), self.items.len() - 1);
        Ok(self.items.len() as u32)
    }
}

/// Rejects names that do not fit the fixed-size object name field.
pub fn check_object_name(name: &str) -> Result<()> {
    if !name.is_ascii() || name.bytes().any(|b| b == 0) {
        return Err(ExportError::InvalidName(name.to_string()));
    }
    if name.len() > OBJECT_NAME_LEN {
        return Err(ExportError::NameTooLong {
            name: name.to_string(),
            len: name.len(),
            max: OBJECT_NAME_LEN,
        });
    }
    Ok(())
}

fn local(object: &RawObject) -> Mat4 {
    Mat4::from_cols_array(&object.matrix_local)
}

fn world(object: &RawObject) -> Mat4 {
    Mat4::from_cols_array(&object.matrix_world)
}

/// Walks a host scene once and collects every table of the output file.
pub struct SceneGraphBuilder<'a, S: SceneSource + ?Sized> {
    source: &'a S,
    config: &'a ExportConfig,
    scene: &'a SceneDescription,
    fps: f32,
    cameras: ResourceTable<Camera>,
    geometries: ResourceTable<IndexedGeometry>,
    materials: ResourceTable<Material>,
    lights: ResourceTable<Light>,
    animations: ResourceTable<AnimationCollection>,
    /// Animation whose bone space each skinned geometry was built in.
    geometry_rigs: HashMap<u32, u32>,
    objects: Vec<SceneObject>,
}

impl<'a, S: SceneSource + ?Sized> SceneGraphBuilder<'a, S> {
    pub fn new(source: &'a S, config: &'a ExportConfig) -> Result<Self> {
        config.validate()?;
        let scene = source.description();
        let fps = config
            .fps_override
            .unwrap_or_else(|| scene.render.effective_fps());
        if !(fps.is_finite() && fps > 0.0) {
            return Err(ExportError::Config(format!(
                "scene frame rate must be positive, got {}",
                fps
            )));
        }
        Ok(Self {
            source,
            config,
            scene,
            fps,
            cameras: ResourceTable::new(),
            geometries: ResourceTable::new(),
            materials: ResourceTable::new(),
            lights: ResourceTable::new(),
            animations: ResourceTable::new(),
            geometry_rigs: HashMap::new(),
            objects: vec![],
        })
    }

    pub fn build(mut self) -> Result<SceneGraph> {
        let scene = self.scene;
        for object in &scene.objects {
            match object.kind {
                ObjectKind::Mesh | ObjectKind::Empty | ObjectKind::Camera | ObjectKind::Light => {
                    self.add_object(object)?
                }
                ObjectKind::Armature | ObjectKind::Other => {
                    debug!("skipping {:?} object '{}'", object.kind, object.name)
                }
            }
        }

        if self.lights.items.len() > MAX_LIGHTS {
            return Err(ExportError::TooManyLights {
                count: self.lights.items.len(),
                max: MAX_LIGHTS,
            });
        }

        let tree = self.object_tree();
        let graph = SceneGraph {
            ambient: self.config.ambient_override.unwrap_or(scene.ambient),
            cameras: self.cameras.items,
            geometries: self.geometries.items,
            materials: self.materials.items,
            lights: self.lights.items,
            animations: self.animations.items,
            objects: self.objects,
            tree,
        };
        info!(
            "scene: {} objects, {} geometries, {} materials, {} lights, {} cameras, {} animation collections",
            graph.objects.len(),
            graph.geometries.len(),
            graph.materials.len(),
            graph.lights.len(),
            graph.cameras.len(),
            graph.animations.len()
        );
        Ok(graph)
    }

    fn add_object(&mut self, object: &'a RawObject) -> Result<()> {
        check_object_name(&object.name)?;
        let (parent, transform) = self.resolve_parent(object);
        let mut record = SceneObject {
            name: object.name.clone(),
            parent,
            camera: 0,
            geometry: 0,
            material: 0,
            light: 0,
            animation: 0,
            transform,
        };

        match object.kind {
            ObjectKind::Mesh => self.add_mesh(object, &mut record)?,
            ObjectKind::Camera => record.camera = self.add_camera(object)?,
            ObjectKind::Light => record.light = self.add_light(object)?,
            _ => {}
        }
        self.objects.push(record);
        Ok(())
    }

    /// First non-armature ancestor, and the local transform composed through
    /// every armature skipped on the way.
    fn resolve_parent(&self, object: &RawObject) -> (Option<String>, Mat4) {
        let mut transform = local(object);
        let mut parent = object.parent.as_deref();
        let mut hops = 0;
        while let Some(name) = parent {
            match self.scene.object(name) {
                Some(p) if p.kind == ObjectKind::Armature => {
                    transform = local(p) * transform;
                    parent = p.parent.as_deref();
                }
                _ => break,
            }
            hops += 1;
            if hops > self.scene.objects.len() {
                warn!("object '{}' has an armature parent cycle", object.name);
                parent = None;
            }
        }
        (parent.map(str::to_string), transform)
    }

    fn data_name<'o>(object: &'o RawObject, kind: &'static str) -> Result<&'o str> {
        object.data.as_deref().ok_or_else(|| ExportError::MissingData {
            object: object.name.clone(),
            kind,
            name: String::new(),
        })
    }

    /// The armature object deforming `object`: the explicit one, else the
    /// nearest armature ancestor.
    fn deforming_armature(&self, object: &RawObject) -> Result<Option<&'a RawObject>> {
        let scene = self.scene;
        if let Some(name) = &object.armature {
            return match scene.object(name) {
                Some(a) if a.kind == ObjectKind::Armature => Ok(Some(a)),
                _ => Err(ExportError::MissingData {
                    object: object.name.clone(),
                    kind: "armature object",
                    name: name.clone(),
                }),
            };
        }
        let mut parent = object.parent.as_deref();
        for _ in 0..scene.objects.len() {
            let Some(p) = parent.and_then(|name| scene.object(name)) else {
                break;
            };
            if p.kind == ObjectKind::Armature {
                return Ok(Some(p));
            }
            parent = p.parent.as_deref();
        }
        Ok(None)
    }

    fn add_mesh(&mut self, object: &'a RawObject, record: &mut SceneObject) -> Result<()> {
        let scene = self.scene;
        let mesh_name = Self::data_name(object, "mesh")?;

        let rig = match self.deforming_armature(object)? {
            Some(armature_object) => {
                let data = Self::data_name(armature_object, "armature")?;
                let armature = scene.armature(data).ok_or_else(|| ExportError::MissingData {
                    object: armature_object.name.clone(),
                    kind: "armature",
                    name: data.to_string(),
                })?;
                Some((armature_object, armature))
            }
            None => None,
        };

        if let Some((armature_object, armature)) = rig {
            record.animation = self.add_animation(object, armature_object, armature)?;
        }
        let bone_space = (record.animation > 0)
            .then(|| self.animations.items[record.animation as usize - 1].skeleton.names.clone());

        let source = self.source;
        let config = self.config;
        record.geometry = self.geometries.get_or_insert_with(mesh_name, || {
            let lease = host::lease_mesh(source, mesh_name)?;
            indexer::validate(&lease)?;
            let mut raw = Cow::Borrowed(&*lease);
            if config.generate_tangents
                && raw.loops.iter().any(|l| l.tangent.is_none() || l.binormal.is_none())
                && !tangents::generate_missing_tangents(raw.to_mut())
            {
                warn!("mesh '{}': tangent generation failed, leaving them zero", mesh_name);
            }

            if raw.groups.is_empty() {
                return mesh::convert(&raw, config.winding);
            }
            let space = bone_space.unwrap_or_else(|| BoneIndexSpace::from_groups(&raw.groups));
            let skin = SkinWeightResolver::new(&raw.groups, &space, raw.positions.len());
            mesh::convert_skinned(&raw, config.winding, Some(&skin))
        })?;
        let skinned = self.geometries.items[record.geometry as usize - 1]
            .vertices
            .iter()
            .any(|v| v.weights != [0.0; 3]);
        if skinned && record.animation > 0 {
            self.check_geometry_rig(mesh_name, record.geometry, record.animation);
        }

        let material_key = object.material.as_deref().unwrap_or(DEFAULT_MATERIAL);
        record.material = self.materials.get_or_insert_with(material_key, || match &object.material {
            None => Ok(Material::defaults(DEFAULT_MATERIAL)),
            Some(name) => {
                let raw = scene.material(name).ok_or_else(|| ExportError::MissingData {
                    object: object.name.clone(),
                    kind: "material",
                    name: name.clone(),
                })?;
                Material::from_raw(raw)
            }
        })?;
        Ok(())
    }

    fn check_geometry_rig(&mut self, mesh_name: &str, geometry: u32, animation: u32) {
        let first = *self.geometry_rigs.entry(geometry).or_insert(animation);
        if first == animation {
            return;
        }
        let bones = |index: u32| &self.animations.items[index as usize - 1].skeleton.names;
        if bones(first) != bones(animation) {
            warn!(
                "mesh '{}' is deformed by rigs with different bones, reusing the bone indices of '{}'",
                mesh_name,
                self.animations.items[first as usize - 1].name
            );
        }
    }

    fn add_animation(
        &mut self,
        object: &RawObject,
        armature_object: &RawObject,
        armature: &RawArmature,
    ) -> Result<u32> {
        let scene = self.scene;
        // actions and armatures are keyed apart, names may clash across kinds
        let key = match armature_object.actions.first() {
            Some(action) => format!("action:{}", action),
            None => format!("armature:{}", armature.name),
        };
        let bind = world(object).inverse() * world(armature_object);
        let fps = self.fps;
        self.animations.get_or_insert_with(&key, || {
            let actions = armature_object
                .actions
                .iter()
                .map(|name| {
                    scene.action(name).ok_or_else(|| ExportError::MissingData {
                        object: armature_object.name.clone(),
                        kind: "action",
                        name: name.clone(),
                    })
                })
                .collect::<Result<Vec<_>>>()?;
            AnimationCollection::encode(armature, bind, actions, fps)
        })
    }

    fn add_camera(&mut self, object: &RawObject) -> Result<u32> {
        let scene = self.scene;
        let data = Self::data_name(object, "camera")?;
        let main = scene.active_camera.as_deref() == Some(object.name.as_str());
        let index = self.cameras.get_or_insert_with(data, || {
            let raw = scene.camera(data).ok_or_else(|| ExportError::MissingData {
                object: object.name.clone(),
                kind: "camera",
                name: data.to_string(),
            })?;
            Ok(Camera::from_raw(raw, &scene.render, main))
        })?;
        if main {
            self.cameras.items[index as usize - 1].main = true;
        }
        Ok(index)
    }

    fn add_light(&mut self, object: &RawObject) -> Result<u32> {
        let scene = self.scene;
        let data = Self::data_name(object, "light")?;
        self.lights.get_or_insert_with(data, || {
            let raw = scene.light(data).ok_or_else(|| ExportError::MissingData {
                object: object.name.clone(),
                kind: "light",
                name: data.to_string(),
            })?;
            Light::from_raw(raw)
        })
    }

    fn object_tree(&self) -> ObjectForest {
        let index: HashMap<&str, usize> = self
            .objects
            .iter()
            .enumerate()
            .map(|(i, o)| (o.name.as_str(), i))
            .collect();
        let parents: Vec<Option<usize>> = self
            .objects
            .iter()
            .map(|o| {
                let name = o.parent.as_deref()?;
                let parent = index.get(name).copied();
                if parent.is_none() {
                    warn!(
                        "object '{}' has parent '{}' which is not exported, making it a root",
                        o.name, name
                    );
                }
                parent
            })
            .collect();
        ObjectForest::new(&parents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{
        MaterialSource, RawAction, RawBone, RawCamera, RawCurve, RawKeyframePoint, RawLight,
        RawLoop, RawMaterial, RawMesh, RawPolygon, SceneDump, VertexGroup, IDENTITY,
    };
    use glam::Vec3;

    fn object(name: &str, kind: ObjectKind, data: Option<&str>, parent: Option<&str>) -> RawObject {
        RawObject {
            name: name.to_string(),
            kind,
            data: data.map(str::to_string),
            parent: parent.map(str::to_string),
            matrix_local: IDENTITY,
            matrix_world: IDENTITY,
            material: None,
            armature: None,
            actions: vec![],
        }
    }

    fn triangle(name: &str) -> RawMesh {
        let corner = |vertex: u32, uv: [f32; 2]| RawLoop {
            vertex,
            uv,
            normal: [0.0, 0.0, 1.0],
            tangent: Some([1.0, 0.0, 0.0]),
            binormal: Some([0.0, 1.0, 0.0]),
        };
        RawMesh {
            name: name.to_string(),
            positions: vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            loops: vec![corner(0, [0.0, 0.0]), corner(1, [1.0, 0.0]), corner(2, [0.0, 1.0])],
            polygons: vec![RawPolygon {
                loops: vec![0, 1, 2],
                normal: [0.0, 0.0, 1.0],
            }],
            groups: vec![],
        }
    }

    fn bake(dump: &SceneDump) -> Result<SceneGraph> {
        SceneGraphBuilder::new(dump, &ExportConfig::default())?.build()
    }

    #[test]
    fn shared_data_is_stored_once() {
        let mut scene = SceneDescription::default();
        scene.objects = vec![
            object("A", ObjectKind::Mesh, Some("Tri"), None),
            object("B", ObjectKind::Mesh, Some("Tri"), Some("A")),
            object("C", ObjectKind::Empty, None, Some("A")),
        ];
        let dump = SceneDump::new(scene, vec![triangle("Tri")]);
        let graph = bake(&dump).unwrap();
        assert_eq!(graph.geometries.len(), 1);
        assert_eq!(graph.materials.len(), 1);
        assert_eq!(graph.materials[0], Material::defaults(DEFAULT_MATERIAL));
        assert_eq!(graph.objects[0].geometry, 1);
        assert_eq!(graph.objects[1].geometry, 1);
        assert_eq!(graph.objects[2].geometry, 0);
        assert_eq!(graph.objects[2].material, 0);
        assert_eq!(graph.tree.encode(), b"0{1{}2{}}\0");
        assert_eq!(dump.outstanding_leases(), 0);
    }

    #[test]
    fn armature_parents_are_skipped_and_composed() {
        let mut scene = SceneDescription::default();
        let mut rig = object("Rig", ObjectKind::Armature, Some("RigData"), Some("Root"));
        rig.matrix_local = Mat4::from_translation(Vec3::X).to_cols_array();
        let mut body = object("Body", ObjectKind::Mesh, Some("Tri"), Some("Rig"));
        body.matrix_local = Mat4::from_translation(Vec3::Y).to_cols_array();
        scene.objects = vec![object("Root", ObjectKind::Empty, None, None), rig, body];
        scene.armatures = vec![RawArmature {
            name: "RigData".to_string(),
            bones: vec![RawBone {
                name: "Spine".to_string(),
                parent: None,
                matrix_local: IDENTITY,
            }],
        }];
        let dump = SceneDump::new(scene, vec![triangle("Tri")]);
        let graph = bake(&dump).unwrap();

        assert_eq!(graph.objects.len(), 2);
        let body = &graph.objects[1];
        assert_eq!(body.parent.as_deref(), Some("Root"));
        assert_eq!(body.transform, Mat4::from_translation(Vec3::new(1.0, 1.0, 0.0)));
        assert_eq!(body.animation, 1);
        assert_eq!(graph.animations[0].name, "RigData");
        assert!(graph.animations[0].animations.is_empty());
    }

    #[test]
    fn actions_bake_against_the_deforming_skeleton() {
        let mut scene = SceneDescription::default();
        let mut rig = object("Rig", ObjectKind::Armature, Some("RigData"), None);
        rig.actions = vec!["Walk".to_string(), "Walk".to_string()];
        let mut body = object("Body", ObjectKind::Mesh, Some("Tri"), None);
        body.armature = Some("Rig".to_string());
        scene.objects = vec![rig, body];
        scene.armatures = vec![RawArmature {
            name: "RigData".to_string(),
            bones: vec![
                RawBone { name: "Spine".to_string(), parent: None, matrix_local: IDENTITY },
                RawBone { name: "Arm".to_string(), parent: Some("Spine".to_string()), matrix_local: IDENTITY },
            ],
        }];
        scene.actions = vec![RawAction {
            name: "Walk".to_string(),
            curves: vec![RawCurve {
                data_path: r#"pose.bones["Arm"].rotation_euler"#.to_string(),
                array_index: 0,
                keyframes: vec![RawKeyframePoint {
                    co: [12.0, 0.5],
                    interpolation: Default::default(),
                    handle_left: None,
                    handle_right: None,
                }],
            }],
        }];
        let mut mesh = triangle("Tri");
        mesh.groups = vec![VertexGroup {
            name: "Spine".to_string(),
            weights: vec![(0, 1.0)],
        }];
        let dump = SceneDump::new(scene, vec![mesh]);
        let graph = bake(&dump).unwrap();

        let collection = &graph.animations[0];
        assert_eq!(collection.animations.len(), 1);
        assert_eq!(collection.animations[0].keyframes.len(), 1);
        assert!((collection.animations[0].keyframes[0].time - 0.5).abs() < 1e-6);
        // "Spine" sorts after "Arm"
        assert_eq!(graph.geometries[0].vertices[0].bones, [0.0, 0.0, 1.0]);
        assert_eq!(graph.geometries[0].vertices[0].weights, [0.0, 0.0, 1.0]);
    }

    fn one_bone_rig(data: &str, bone: &str) -> RawArmature {
        RawArmature {
            name: data.to_string(),
            bones: vec![RawBone { name: bone.to_string(), parent: None, matrix_local: IDENTITY }],
        }
    }

    fn skinned_triangle(name: &str, bone: &str) -> RawMesh {
        let mut mesh = triangle(name);
        mesh.groups = vec![VertexGroup {
            name: bone.to_string(),
            weights: vec![(0, 1.0)],
        }];
        mesh
    }

    #[test]
    fn armature_and_action_names_do_not_collide() {
        let mut scene = SceneDescription::default();
        let rig_a = object("RigA", ObjectKind::Armature, Some("Walk"), None);
        let mut rig_b = object("RigB", ObjectKind::Armature, Some("RigBData"), None);
        rig_b.actions = vec!["Walk".to_string()];
        let mut body_a = object("A", ObjectKind::Mesh, Some("TriA"), None);
        body_a.armature = Some("RigA".to_string());
        let mut body_b = object("B", ObjectKind::Mesh, Some("TriB"), None);
        body_b.armature = Some("RigB".to_string());
        scene.objects = vec![rig_a, rig_b, body_a, body_b];

        let mut two_bones = one_bone_rig("RigBData", "Hips");
        two_bones.bones.push(RawBone {
            name: "Leg".to_string(),
            parent: Some("Hips".to_string()),
            matrix_local: IDENTITY,
        });
        scene.armatures = vec![one_bone_rig("Walk", "Spine"), two_bones];
        scene.actions = vec![RawAction {
            name: "Walk".to_string(),
            curves: vec![RawCurve {
                data_path: r#"pose.bones["Leg"].rotation_euler"#.to_string(),
                array_index: 0,
                keyframes: vec![RawKeyframePoint {
                    co: [1.0, 0.5],
                    interpolation: Default::default(),
                    handle_left: None,
                    handle_right: None,
                }],
            }],
        }];
        let dump = SceneDump::new(scene, vec![skinned_triangle("TriA", "Spine"), skinned_triangle("TriB", "Leg")]);
        let graph = bake(&dump).unwrap();

        assert_eq!(graph.animations.len(), 2);
        assert_eq!(graph.objects[0].animation, 1);
        assert_eq!(graph.objects[1].animation, 2);
        let walk = &graph.animations[1];
        assert_eq!(walk.name, "RigBData");
        assert_eq!(walk.skeleton.bones.len(), 2);
        assert_eq!(walk.animations.len(), 1);
        // "Leg" is bone 1 of RigB, not a slot of RigA's one-bone space
        assert_eq!(graph.geometries[1].vertices[0].bones, [0.0, 0.0, 1.0]);
    }

    #[test]
    fn mesh_shared_by_different_rigs_warns() {
        let mut scene = SceneDescription::default();
        let mut body_a = object("A", ObjectKind::Mesh, Some("Tri"), None);
        body_a.armature = Some("RigA".to_string());
        let mut body_b = object("B", ObjectKind::Mesh, Some("Tri"), None);
        body_b.armature = Some("RigB".to_string());
        scene.objects = vec![
            object("RigA", ObjectKind::Armature, Some("DataA"), None),
            object("RigB", ObjectKind::Armature, Some("DataB"), None),
            body_a,
            body_b,
        ];
        scene.armatures = vec![one_bone_rig("DataA", "Spine"), one_bone_rig("DataB", "Tail")];
        let dump = SceneDump::new(scene, vec![skinned_triangle("Tri", "Spine")]);

        let (graph, logged) = crate::test_log::capture(|| bake(&dump));
        let graph = graph.unwrap();
        assert_eq!(graph.geometries.len(), 1);
        assert_eq!(graph.objects[1].geometry, 1);
        assert!(logged.contains("mesh 'Tri' is deformed by rigs with different bones"));
    }

    #[test]
    fn active_camera_marks_shared_data_main() {
        let mut scene = SceneDescription::default();
        scene.active_camera = Some("Second".to_string());
        scene.objects = vec![
            object("First", ObjectKind::Camera, Some("Lens"), None),
            object("Second", ObjectKind::Camera, Some("Lens"), None),
        ];
        scene.cameras = vec![RawCamera {
            name: "Lens".to_string(),
            angle: 0.8,
            clip_start: 0.1,
            clip_end: 50.0,
        }];
        let graph = bake(&SceneDump::new(scene, vec![])).unwrap();
        assert_eq!(graph.cameras.len(), 1);
        assert!(graph.cameras[0].main);
        assert_eq!(graph.objects[1].camera, 1);
    }

    #[test]
    fn more_than_twenty_lights_fail() {
        let mut scene = SceneDescription::default();
        for i in 0..=MAX_LIGHTS {
            let name = format!("Lamp{}", i);
            scene.objects.push(object(&name, ObjectKind::Light, Some(&name), None));
            scene.lights.push(RawLight {
                name,
                kind: "POINT".to_string(),
                color: [1.0; 3],
                energy: 10.0,
                spot_size: 0.0,
                attenuation: [1.0, 0.0, 1.0],
            });
        }
        assert!(matches!(
            bake(&SceneDump::new(scene, vec![])),
            Err(ExportError::TooManyLights { count: 21, max: 20 })
        ));
    }

    #[test]
    fn object_names_must_fit() {
        let mut scene = SceneDescription::default();
        scene.objects = vec![object(&"x".repeat(32), ObjectKind::Empty, None, None)];
        assert!(matches!(
            bake(&SceneDump::new(scene, vec![])),
            Err(ExportError::NameTooLong { len: 32, max: 31, .. })
        ));
        assert!(check_object_name(&"x".repeat(31)).is_ok());
        assert!(matches!(check_object_name("Café"), Err(ExportError::InvalidName(_))));
        assert!(matches!(check_object_name("a\0b"), Err(ExportError::InvalidName(_))));
    }

    #[test]
    fn mesh_leases_are_released_on_error() {
        let mut scene = SceneDescription::default();
        scene.objects = vec![object("Quad", ObjectKind::Mesh, Some("QuadMesh"), None)];
        let mut mesh = triangle("QuadMesh");
        mesh.polygons[0].loops.push(0);
        let dump = SceneDump::new(scene, vec![mesh]);
        assert!(matches!(bake(&dump), Err(ExportError::NonTriangularFace { .. })));
        assert_eq!(dump.outstanding_leases(), 0);
    }

    #[test]
    fn failed_material_aborts() {
        let mut scene = SceneDescription::default();
        let mut tri = object("Tri", ObjectKind::Mesh, Some("Tri"), None);
        tri.material = Some("Glass".to_string());
        scene.objects = vec![tri];
        scene.materials = vec![RawMaterial {
            name: "Glass".to_string(),
            source: MaterialSource::Failed {
                reason: "no principled BSDF".to_string(),
            },
        }];
        let dump = SceneDump::new(scene, vec![triangle("Tri")]);
        assert!(matches!(
            bake(&dump),
            Err(ExportError::MaterialExtractionError { .. })
        ));
    }

    #[test]
    fn dangling_parent_becomes_root() {
        let mut scene = SceneDescription::default();
        scene.objects = vec![
            object("Lamp", ObjectKind::Empty, None, Some("Gone")),
            object("Other", ObjectKind::Empty, None, None),
        ];
        let graph = bake(&SceneDump::new(scene, vec![])).unwrap();
        assert_eq!(graph.tree.encode(), b"0{}1{}\0");
    }
}
