//! Engine data structures: meshes, placed objects and textures.
//!
//! - `mesh` holds CPU-side geometry and the primitive builders
//! - `model` uploads geometry to the GPU and defines the vertex layout
//! - `object` is a placed mesh with its per-object uniforms
//! - `texture` contains GPU texture wrappers and creation utilities

pub mod mesh;
pub mod model;
pub mod object;
pub mod texture;
