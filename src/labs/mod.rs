//! The lab scenes.
//!
//! Each lab is a [`GraphicsFlow`] built asynchronously from an
//! [`InitContext`]. [`Lab`] names them for the command line and the web
//! entry point.

use std::{fmt, str::FromStr};

use anyhow::anyhow;

use crate::{
    context::InitContext,
    data_structures::{mesh::MeshData, model::Mesh, object::Object},
    flow::{FlowConstructor, GraphicsFlow},
    transform::Transform,
};

pub mod lighting;
pub mod reflections;
pub mod shader_programming;
pub mod textures;
pub mod transformations;
pub mod village;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Lab {
    Village,
    ShaderProgramming,
    Transformations,
    Lighting,
    Textures,
    Reflections,
}

impl Lab {
    pub const ALL: [Lab; 6] = [
        Lab::Village,
        Lab::ShaderProgramming,
        Lab::Transformations,
        Lab::Lighting,
        Lab::Textures,
        Lab::Reflections,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Lab::Village => "village",
            Lab::ShaderProgramming => "shaders",
            Lab::Transformations => "transformations",
            Lab::Lighting => "lighting",
            Lab::Textures => "textures",
            Lab::Reflections => "reflections",
        }
    }

    /// Number of the exercise sheet the lab belongs to.
    pub fn number(&self) -> u32 {
        match self {
            Lab::Village => 3,
            Lab::ShaderProgramming => 4,
            Lab::Transformations => 5,
            Lab::Lighting => 7,
            Lab::Textures => 8,
            Lab::Reflections => 9,
        }
    }

    /// A one line listing of every lab, e.g. for usage messages.
    pub fn listing() -> String {
        Lab::ALL
            .iter()
            .map(|lab| format!("{} (lab{:02})", lab.name(), lab.number()))
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn constructor(self) -> FlowConstructor<()> {
        match self {
            Lab::Village => boxed(village::Village::new),
            Lab::ShaderProgramming => boxed(shader_programming::ShaderProgramming::new),
            Lab::Transformations => boxed(transformations::Transformations::new),
            Lab::Lighting => boxed(lighting::Lighting::new),
            Lab::Textures => boxed(textures::Textures::new),
            Lab::Reflections => boxed(reflections::Reflections::new),
        }
    }
}

fn boxed<F, Fut, L>(new: F) -> FlowConstructor<()>
where
    F: FnOnce(InitContext) -> Fut + 'static,
    Fut: Future<Output = anyhow::Result<L>> + 'static,
    L: GraphicsFlow<()> + 'static,
{
    Box::new(move |ctx| {
        Box::pin(async move {
            let lab = new(ctx).await?;
            Ok(Box::new(lab) as Box<dyn GraphicsFlow<()>>)
        })
    })
}

impl fmt::Display for Lab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Lab {
    type Err = anyhow::Error;

    /// Accepts a lab name in any case, or its number as `lab05`, `lab5` or `5`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase();
        if let Some(lab) = Lab::ALL.into_iter().find(|lab| lab.name() == s) {
            return Ok(lab);
        }
        let number = s.strip_prefix("lab").unwrap_or(&s);
        number
            .parse::<u32>()
            .ok()
            .and_then(|n| Lab::ALL.into_iter().find(|lab| lab.number() == n))
            .ok_or_else(|| anyhow!("unknown lab {s:?}, expected one of: {}", Lab::listing()))
    }
}

/// A mesh placed once in the scene.
pub(crate) struct Placed {
    pub mesh: Mesh,
    pub object: Object,
}

impl Placed {
    pub fn new(ctx: &InitContext, name: &str, data: &MeshData, transform: Transform) -> Self {
        Self {
            mesh: Mesh::from_data(&ctx.device, name, data),
            object: Object::new(&ctx.device, &ctx.object_bind_group_layout, name, transform),
        }
    }
}
