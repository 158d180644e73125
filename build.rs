use anyhow::*;
use fs_extra::copy_items;
use fs_extra::dir::CopyOptions;
use std::env;
use std::path::{Path, PathBuf};

/// Files the labs look for. Each has a generated stand-in, so a missing one
/// only changes how a lab looks.
const LAB_ASSETS: &[&str] = &[
    "normalMap.jpg",
    "floor.png",
    "roof.jpg",
    "wood.jpg",
    "fishtexture.png",
    "fish.glb",
    "skybox_px.jpg",
    "skybox_nx.jpg",
    "skybox_py.jpg",
    "skybox_ny.jpg",
    "skybox_pz.jpg",
    "skybox_nz.jpg",
];

fn report_missing(assets_src: &Path) {
    for name in LAB_ASSETS {
        if !assets_src.join(name).exists() {
            println!("cargo:warning=assets/{name} not found, the lab using it falls back to a generated stand-in");
        }
    }
}

fn main() -> Result<()> {
    println!("cargo:rerun-if-changed=assets");

    let out_dir = env::var("OUT_DIR")?;
    let manifest_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR")?);
    let assets_src = manifest_dir.join("assets");
    if !assets_src.exists() {
        println!("cargo:warning=no assets directory, every lab runs on generated stand-ins");
        return Ok(());
    }
    report_missing(&assets_src);

    let mut copy_options = CopyOptions::new();
    copy_options.overwrite = true;
    copy_items(&[&assets_src], out_dir, &copy_options)
        .with_context(|| format!("copying {}", assets_src.display()))?;

    Ok(())
}
