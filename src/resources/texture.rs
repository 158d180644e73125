use anyhow::Context as _;

use crate::data_structures::texture::{self, CubeTexture, Texture};

/// Face suffixes in wgpu cube layer order: +X, -X, +Y, -Y, +Z, -Z.
pub const CUBE_FACES: [&str; 6] = ["px", "nx", "py", "ny", "pz", "nz"];

/// File names of the six faces of the cube texture `base`, e.g.
/// `skybox_px.jpg` for `("skybox", "jpg")`.
pub fn cube_face_names(base: &str, extension: &str) -> [String; 6] {
    CUBE_FACES.map(|face| format!("{base}_{face}.{extension}"))
}

#[cfg(target_arch = "wasm32")]
fn format_url(file_name: &str) -> anyhow::Result<reqwest::Url> {
    let window = web_sys::window().context("no browser window")?;
    let origin = window
        .location()
        .origin()
        .map_err(|e| anyhow::anyhow!("cannot read page origin: {e:?}"))?;
    let base = reqwest::Url::parse(&format!("{}/assets/", origin))?;
    Ok(base.join(file_name)?)
}

pub async fn load_binary(file_name: &str) -> anyhow::Result<Vec<u8>> {
    #[cfg(target_arch = "wasm32")]
    let data = {
        let url = format_url(file_name)?;
        reqwest::get(url).await?.bytes().await?.to_vec()
    };
    #[cfg(not(target_arch = "wasm32"))]
    let data = {
        let path = std::path::Path::new("./")
            .join("assets")
            .join(file_name);
        std::fs::read(&path).with_context(|| format!("cannot read {}", path.display()))?
    };

    Ok(data)
}

pub async fn load_texture(
    file_name: &str,
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    format: Option<&str>,
) -> anyhow::Result<Texture> {
    let data = load_binary(file_name).await?;
    Texture::from_bytes(device, queue, &data, file_name, format)
        .with_context(|| format!("cannot decode texture {file_name}"))
}

/// Like [`load_texture`], but a missing or broken file only costs a warning
/// and the mesh is drawn with a checkerboard instead.
pub async fn load_texture_or_fallback(
    file_name: &str,
    device: &wgpu::Device,
    queue: &wgpu::Queue,
) -> Texture {
    match load_texture(file_name, device, queue, None).await {
        Ok(texture) => texture,
        Err(e) => {
            log::warn!("Using a placeholder for texture {}: {:#}", file_name, e);
            Texture::checkerboard(device, queue, 64, 8, file_name)
        }
    }
}

/// Loads the six `<base>_<face>.<extension>` images of a cube texture.
pub async fn load_cube_texture(
    base: &str,
    extension: &str,
    device: &wgpu::Device,
    queue: &wgpu::Queue,
) -> anyhow::Result<CubeTexture> {
    let names = cube_face_names(base, extension);
    let mut faces = Vec::with_capacity(6);
    for name in &names {
        let bytes = load_binary(name).await?;
        let face = texture::decode(&bytes, name, Some(extension))
            .with_context(|| format!("cannot decode cube face {name}"))?;
        faces.push(face);
    }
    let faces: [image::DynamicImage; 6] = faces
        .try_into()
        .map_err(|_| anyhow::anyhow!("cube texture {base} needs six faces"))?;
    CubeTexture::from_images(device, queue, &faces, base)
}

/// Like [`load_cube_texture`], falling back to a plain sky blue cube.
pub async fn load_cube_or_fallback(
    base: &str,
    extension: &str,
    device: &wgpu::Device,
    queue: &wgpu::Queue,
) -> anyhow::Result<CubeTexture> {
    match load_cube_texture(base, extension, device, queue).await {
        Ok(cube) => Ok(cube),
        Err(e) => {
            log::warn!("Using a placeholder for cube texture {}: {:#}", base, e);
            CubeTexture::from_color(device, queue, [135, 190, 235, 255], base)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cube_faces_follow_layer_order() {
        let names = cube_face_names("skybox", "jpg");
        assert_eq!(
            names,
            [
                "skybox_px.jpg",
                "skybox_nx.jpg",
                "skybox_py.jpg",
                "skybox_ny.jpg",
                "skybox_pz.jpg",
                "skybox_nz.jpg",
            ]
        );
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn missing_assets_report_the_path() {
        let err = futures::executor::block_on(load_binary("does-not-exist.bin")).unwrap_err();
        assert!(format!("{err:#}").contains("does-not-exist.bin"));
    }
}
