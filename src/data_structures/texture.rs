//! GPU textures and texture creation utilities.
//!
//! This module provides [`Texture`], a wrapper around a 2D WGPU texture with
//! its view and sampler, the six-faced [`CubeTexture`] used for skyboxes and
//! reflections, and the generated fallbacks used when an asset is missing.

use anyhow::*;
use image::{GenericImageView, ImageFormat, load_from_memory_with_format};

/// A GPU texture with a view and optional sampler.
///
/// Wraps WGPU texture objects along with associated views and samplers.
/// Typically created via [`from_bytes`](Self::from_bytes) or
/// via [`create_depth_texture`](Self::create_depth_texture).
#[derive(Clone, Debug)]
pub struct Texture {
    #[allow(unused)]
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: Option<wgpu::Sampler>,
}

impl Texture {
    /// Standard depth buffer texture format (32-bit float).
    pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

    /// Create a depth texture for depth-testing during rendering.
    ///
    /// # Arguments
    ///
    /// * `size` is [width, height] of the texture in pixels
    /// * `label` is used as a debug label for the GPU resource
    pub fn create_depth_texture(device: &wgpu::Device, size: [u32; 2], label: &str) -> Self {
        let size = wgpu::Extent3d {
            width: size[0].max(1),
            height: size[1].max(1),
            depth_or_array_layers: 1,
        };
        let desc = wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[Self::DEPTH_FORMAT],
        };
        let texture = device.create_texture(&desc);
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        Self {
            texture,
            view,
            sampler: None,
        }
    }

    /// A 1x1 texture of one sRGB colour.
    ///
    /// Bound where a material has a texture slot but nothing to put in it,
    /// so the same shader serves textured and untextured meshes.
    pub fn from_color(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        rgba: [u8; 4],
        label: &str,
    ) -> Texture {
        let img = image::RgbaImage::from_pixel(1, 1, image::Rgba(rgba));
        Self::from_rgba(device, queue, &img, Some(label))
    }

    /// Magenta and black squares, the usual "texture missing" pattern.
    pub fn checkerboard(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        size: u32,
        cells: u32,
        label: &str,
    ) -> Texture {
        Self::from_rgba(device, queue, &checkerboard_image(size, cells), Some(label))
    }

    /// Load a texture from raw byte data (image file contents).
    ///
    /// # Arguments
    ///
    /// * `bytes` represent raw image file data (PNG, JPEG, etc.)
    /// * `label` is used as a debug name for the GPU resource
    /// * `format`  is an optional file format hint (e.g., "png"). If None, auto-detect.
    pub fn from_bytes(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        bytes: &[u8],
        label: &str,
        format: Option<&str>,
    ) -> Result<Self> {
        let img = decode(bytes, label, format)?;
        Ok(Self::from_image(device, queue, &img, Some(label)))
    }

    pub fn from_image(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        img: &image::DynamicImage,
        label: Option<&str>,
    ) -> Self {
        Self::from_rgba(device, queue, &img.to_rgba8(), label)
    }

    fn from_rgba(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        rgba: &image::RgbaImage,
        label: Option<&str>,
    ) -> Self {
        let dimensions = rgba.dimensions();
        let size = wgpu::Extent3d {
            width: dimensions.0,
            height: dimensions.1,
            depth_or_array_layers: 1,
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label,
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                aspect: wgpu::TextureAspect::All,
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
            },
            rgba,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * dimensions.0),
                rows_per_image: Some(dimensions.1),
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = Some(create_default_sampler(device));

        Self {
            texture,
            view,
            sampler,
        }
    }
}

/// Six square faces sampled by direction.
///
/// Face order is the wgpu layer order: +X, -X, +Y, -Y, +Z, -Z.
#[derive(Clone, Debug)]
pub struct CubeTexture {
    #[allow(unused)]
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
}

impl CubeTexture {
    pub fn from_images(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        faces: &[image::DynamicImage; 6],
        label: &str,
    ) -> Result<Self> {
        let (width, height) = check_cube_faces(faces)?;
        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 6,
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        for (layer, face) in faces.iter().enumerate() {
            queue.write_texture(
                wgpu::TexelCopyTextureInfo {
                    aspect: wgpu::TextureAspect::All,
                    texture: &texture,
                    mip_level: 0,
                    origin: wgpu::Origin3d {
                        x: 0,
                        y: 0,
                        z: layer as u32,
                    },
                },
                &face.to_rgba8(),
                wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(4 * width),
                    rows_per_image: Some(height),
                },
                wgpu::Extent3d {
                    width,
                    height,
                    depth_or_array_layers: 1,
                },
            );
        }

        let view = texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some(label),
            dimension: Some(wgpu::TextureViewDimension::Cube),
            ..Default::default()
        });
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        Ok(Self {
            texture,
            view,
            sampler,
        })
    }

    /// Every face the same colour, for when the sky cannot be loaded.
    pub fn from_color(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        rgba: [u8; 4],
        label: &str,
    ) -> Result<Self> {
        let face = image::DynamicImage::ImageRgba8(image::RgbaImage::from_pixel(
            1,
            1,
            image::Rgba(rgba),
        ));
        let faces = [(); 6].map(|_| face.clone());
        Self::from_images(device, queue, &faces, label)
    }
}

pub fn create_default_sampler(device: &wgpu::Device) -> wgpu::Sampler {
    device.create_sampler(&wgpu::SamplerDescriptor {
        address_mode_u: wgpu::AddressMode::Repeat,
        address_mode_v: wgpu::AddressMode::Repeat,
        address_mode_w: wgpu::AddressMode::Repeat,
        mag_filter: wgpu::FilterMode::Linear,
        min_filter: wgpu::FilterMode::Linear,
        mipmap_filter: wgpu::FilterMode::Linear,
        ..Default::default()
    })
}

pub(crate) fn decode(bytes: &[u8], label: &str, format: Option<&str>) -> Result<image::DynamicImage> {
    let img = match format {
        None => image::load_from_memory(bytes)?,
        Some(fmt) => {
            let format = ImageFormat::from_extension(fmt)
                .with_context(|| format!("unknown image format {fmt:?} for {label}"))?;
            load_from_memory_with_format(bytes, format)?
        }
    };
    Ok(img)
}

pub(crate) fn checkerboard_image(size: u32, cells: u32) -> image::RgbaImage {
    let cell = (size / cells.max(1)).max(1);
    image::RgbaImage::from_fn(size, size, |x, y| {
        if (x / cell + y / cell) % 2 == 0 {
            image::Rgba([255, 0, 255, 255])
        } else {
            image::Rgba([0, 0, 0, 255])
        }
    })
}

/// All six faces must be square and share one size.
pub(crate) fn check_cube_faces(faces: &[image::DynamicImage]) -> Result<(u32, u32)> {
    let Some(first) = faces.first() else {
        bail!("cube texture needs six faces, got none");
    };
    let dimensions = first.dimensions();
    if dimensions.0 != dimensions.1 {
        bail!(
            "cube faces must be square, got {}x{}",
            dimensions.0,
            dimensions.1
        );
    }
    for (i, face) in faces.iter().enumerate().skip(1) {
        if face.dimensions() != dimensions {
            bail!(
                "cube face {} is {:?}, expected {:?} like the first face",
                i,
                face.dimensions(),
                dimensions
            );
        }
    }
    Ok(dimensions)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blank(w: u32, h: u32) -> image::DynamicImage {
        image::DynamicImage::ImageRgba8(image::RgbaImage::new(w, h))
    }

    #[test]
    fn checkerboard_alternates() {
        let img = checkerboard_image(8, 2);
        assert_eq!(img.get_pixel(0, 0), &image::Rgba([255, 0, 255, 255]));
        assert_eq!(img.get_pixel(4, 0), &image::Rgba([0, 0, 0, 255]));
        assert_eq!(img.get_pixel(4, 4), &image::Rgba([255, 0, 255, 255]));
    }

    #[test]
    fn cube_faces_must_match() {
        let good: Vec<_> = (0..6).map(|_| blank(4, 4)).collect();
        assert_eq!(check_cube_faces(&good).unwrap(), (4, 4));

        let mut odd = good.clone();
        odd[3] = blank(8, 8);
        let err = check_cube_faces(&odd).unwrap_err();
        assert!(err.to_string().contains("cube face 3"));

        let oblong: Vec<_> = (0..6).map(|_| blank(4, 2)).collect();
        assert!(check_cube_faces(&oblong).is_err());
    }

    #[test]
    fn decoding_garbage_fails() {
        assert!(decode(&[1, 2, 3], "junk", None).is_err());
        assert!(decode(&[1, 2, 3], "junk", Some("nope")).is_err());
    }
}
