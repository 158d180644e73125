//! Render composition.
//!
//! Labs describe what to draw each frame with a [`Render`]. The runtime
//! flattens it into opaque draws, issued first, and background draws (the
//! skybox) issued after them so they only fill what is still at the far
//! plane.

use std::ops::Range;

use crate::{
    data_structures::{model::Mesh, object::Object},
    pipelines::material::Material,
};

/// One indexed draw: a range of a mesh, placed by an object, shaded by a
/// material.
pub struct Draw<'a> {
    pub mesh: &'a Mesh,
    pub object: &'a Object,
    pub material: &'a dyn Material,
    pub indices: Range<u32>,
}

impl<'a> Draw<'a> {
    /// Draws the whole mesh.
    pub fn new(mesh: &'a Mesh, object: &'a Object, material: &'a dyn Material) -> Self {
        Self {
            mesh,
            object,
            material,
            indices: mesh.all(),
        }
    }

    /// Draws only the `idx`-th piece of a merged mesh.
    pub fn submesh(
        mesh: &'a Mesh,
        idx: usize,
        object: &'a Object,
        material: &'a dyn Material,
    ) -> Self {
        Self {
            mesh,
            object,
            material,
            indices: mesh.submesh(idx),
        }
    }
}

/// What a lab wants drawn this frame.
///
/// - `None` renders nothing
/// - `Opaque(Draw)` / `Opaques(Vec<Draw>)` render with depth testing in order
/// - `Background(Draw)` renders after all opaques
/// - `Composed(Vec<Render>)` recursively renders a composition of renders
pub enum Render<'a> {
    None,
    Opaque(Draw<'a>),
    Opaques(Vec<Draw<'a>>),
    Background(Draw<'a>),
    Composed(Vec<Render<'a>>),
}

impl<'a> Render<'a> {
    pub(crate) fn collect(self, opaques: &mut Vec<Draw<'a>>, backgrounds: &mut Vec<Draw<'a>>) {
        match self {
            Render::None => (),
            Render::Opaque(draw) => opaques.push(draw),
            Render::Opaques(mut draws) => opaques.append(&mut draws),
            Render::Background(draw) => backgrounds.push(draw),
            Render::Composed(renders) => renders
                .into_iter()
                .for_each(|render| render.collect(opaques, backgrounds)),
        }
    }
}

impl<'a> From<Draw<'a>> for Render<'a> {
    fn from(draw: Draw<'a>) -> Self {
        Render::Opaque(draw)
    }
}

impl<'a> From<Vec<Draw<'a>>> for Render<'a> {
    fn from(draws: Vec<Draw<'a>>) -> Self {
        Render::Opaques(draws)
    }
}
