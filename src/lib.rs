//! shader-labs
//!
//! A series of small classroom scenes, each showing one step of writing
//! shaders by hand: flat colours, vertex distortion, world matrices composed
//! on the CPU, Lambert and Blinn-Phong lighting, texture sampling and cube
//! map reflections. The scenes run natively and in the browser on top of a
//! minimal wgpu/winit runtime.
//!
//! High-level modules
//! - `camera`: arc rotate and free cameras, their controller and uniforms
//! - `context`: central GPU and window context shared by the labs
//! - `data_structures`: meshes, placed objects and textures
//! - `flow`: the event loop and the lab lifecycle
//! - `labs`: the lab scenes themselves
//! - `pipelines`: materials, the scene light and pipeline construction
//! - `render`: what a lab asks to draw each frame
//! - `resources`: loading textures and glTF meshes from the assets directory
//! - `shaders`: the WGSL programs and their uniform blocks
//! - `shading`: CPU reference versions of the lighting formulas
//! - `transform`: the hand-built matrices of the transformations lab
//!

pub mod camera;
pub mod context;
pub mod data_structures;
pub mod flow;
pub mod labs;
pub mod pipelines;
pub mod render;
pub mod resources;
pub mod shaders;
pub mod shading;
pub mod transform;

pub use labs::Lab;

// Re-exports commonly used types for convenience in downstream code.
pub use cgmath;
pub use wgpu;
pub use winit::event::{DeviceEvent, WindowEvent};

/// Runs a single lab until its window is closed.
pub fn run_lab(lab: Lab) -> anyhow::Result<()> {
    flow::run(vec![lab.constructor()])
}

/// Browser entry point: renders `lab` into the canvas with id `canvas`.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen::prelude::wasm_bindgen]
pub fn run_web(lab: &str) -> Result<(), wasm_bindgen::JsValue> {
    let lab: Lab = lab
        .parse()
        .map_err(|e: anyhow::Error| wasm_bindgen::JsValue::from_str(&e.to_string()))?;
    run_lab(lab).map_err(|e| wasm_bindgen::JsValue::from_str(&format!("{e:#}")))
}
