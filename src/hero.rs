//! 3D hero scene.
//!
//! Rendering belongs to whatever 3D library the host provides, reached
//! through [`SceneBackend`]. This module only decides where the objects go
//! and where the camera looks.

use std::f64::consts::TAU;

use tracing::debug;

use crate::dom::{Document, NodeId};
use crate::events::{Event, Propagation};
use crate::mount::{MountError, require_id};

pub const HERO_CANVAS: &str = "hero-canvas";

/// Objects placed around the ring.
pub const OBJECT_COUNT: usize = 8;
pub const RING_RADIUS: f64 = 3.0;
/// How far the camera may drift from center on either axis.
pub const CAMERA_RANGE: f64 = 1.5;
pub const CAMERA_DISTANCE: f64 = 8.0;
/// Fraction of the remaining distance covered each frame.
pub const CAMERA_EASING: f64 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    fn lerp(self, to: Vec3, t: f64) -> Vec3 {
        Vec3::new(
            self.x + (to.x - self.x) * t,
            self.y + (to.y - self.y) * t,
            self.z + (to.z - self.z) * t,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Sphere,
    Torus,
    Capsule,
}

/// The host's 3D library.
pub trait SceneBackend {
    fn add_object(&mut self, shape: Shape, position: Vec3);
    fn set_camera(&mut self, position: Vec3, look_at: Vec3);
    fn resize(&mut self, width: f64, height: f64);
    fn render(&mut self);
}

/// Evenly spaced positions on a horizontal ring, first one at +x.
pub fn ring_positions(count: usize, radius: f64) -> Vec<Vec3> {
    (0..count)
        .map(|i| {
            let angle = TAU * i as f64 / count as f64;
            Vec3::new(radius * angle.cos(), 0.0, radius * angle.sin())
        })
        .collect()
}

/// Map a pointer position to a camera target. The pointer is normalized to
/// [-1, 1] on both axes with +y up.
pub fn camera_target(x: f64, y: f64, width: f64, height: f64) -> Vec3 {
    if width <= 0.0 || height <= 0.0 {
        return Vec3::new(0.0, 0.0, CAMERA_DISTANCE);
    }
    let nx = ((x / width) * 2.0 - 1.0).clamp(-1.0, 1.0);
    let ny = -((y / height) * 2.0 - 1.0).clamp(-1.0, 1.0);
    Vec3::new(nx * CAMERA_RANGE, ny * CAMERA_RANGE, CAMERA_DISTANCE)
}

pub struct HeroScene {
    canvas: NodeId,
    backend: Box<dyn SceneBackend>,
    camera: Vec3,
    target: Vec3,
    viewport: (f64, f64),
}

impl std::fmt::Debug for HeroScene {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HeroScene")
            .field("canvas", &self.canvas)
            .field("camera", &self.camera)
            .field("target", &self.target)
            .finish_non_exhaustive()
    }
}

impl HeroScene {
    /// Set up the scene on `#hero-canvas`. Without a backend the hero falls
    /// back to its static image.
    pub fn mount(
        doc: &mut Document,
        backend: Option<Box<dyn SceneBackend>>,
        viewport: (f64, f64),
    ) -> Result<Self, MountError> {
        let canvas = require_id(doc, HERO_CANVAS)?;
        let Some(mut backend) = backend else {
            doc.add_class(canvas, "hero-static");
            return Err(MountError::LibraryUnavailable("3D"));
        };

        let shapes = [Shape::Sphere, Shape::Torus, Shape::Capsule];
        for (i, position) in ring_positions(OBJECT_COUNT, RING_RADIUS).into_iter().enumerate() {
            backend.add_object(shapes[i % shapes.len()], position);
        }
        let camera = Vec3::new(0.0, 0.0, CAMERA_DISTANCE);
        backend.set_camera(camera, Vec3::default());
        backend.resize(viewport.0, viewport.1);
        doc.add_class(canvas, "hero-3d");
        doc.set_flag(canvas, "aria-hidden", true);
        debug!(objects = OBJECT_COUNT, "hero scene mounted");
        Ok(Self {
            canvas,
            backend,
            camera,
            target: camera,
            viewport,
        })
    }

    pub fn camera(&self) -> Vec3 {
        self.camera
    }

    pub fn camera_target(&self) -> Vec3 {
        self.target
    }

    /// Ease the camera toward its target and draw one frame.
    pub fn frame(&mut self) {
        self.camera = self.camera.lerp(self.target, CAMERA_EASING);
        self.backend.set_camera(self.camera, Vec3::default());
        self.backend.render();
    }

    pub fn handle_event(&mut self, _doc: &mut Document, event: &Event) -> Propagation {
        match event {
            Event::PointerMove { x, y } => {
                self.target = camera_target(*x, *y, self.viewport.0, self.viewport.1);
                Propagation::Handled
            }
            Event::Resize { width, height } => {
                self.viewport = (*width, *height);
                self.backend.resize(*width, *height);
                Propagation::Handled
            }
            _ => Propagation::Ignored,
        }
    }
}
