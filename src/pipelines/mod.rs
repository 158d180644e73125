//! Render pipelines and everything that feeds them.
//!
//! - `basic` builds pipeline layouts and render pipelines
//! - `light` holds the scene light and its uniform
//! - `material` compiles shader programs into materials
//! - `standard` is the built-in lit material for reference geometry

pub mod basic;
pub mod light;
pub mod material;
pub mod standard;
