use anyhow::Result;
use nalgebra::Matrix4;
use wgpu::{
    vertex_attr_array, AddressMode, BufferUsages, Extent3d, FilterMode, SamplerDescriptor,
    ShaderStages, TextureUsages,
};

use crate::{
    bind::{BindEntry, BindEntryType, BindHandle},
    camera::CameraUniform,
    config::ScrollerConfig,
    geometry::Geometry,
    instance::InstanceData,
    pipeline::{Pipeline, PipelineBuilder, PipelineHandle},
    plain::{Plain, PlainSlice},
    render::{MeshHandle, Render},
    render_object::RenderObject,
    transform::Transform,
};

use super::scroller::GlyphSlot;

pub const CAMERA_BINDING: u32 = 0;
pub const GLYPH_TEXTURE_BINDING: u32 = 1;

#[repr(C)]
#[derive(Clone, Copy, Debug)]
pub struct GlyphVertex {
    pub pos: [f32; 3],
    pub uv: [f32; 2],
}

unsafe impl Plain for GlyphVertex {}

#[repr(C)]
#[derive(Clone, Copy, Debug)]
pub struct GlyphInstance {
    pub transform: [[f32; 4]; 4],
    pub layer: u32,
    _padding: [u32; 3],
}

unsafe impl Plain for GlyphInstance {}

impl GlyphInstance {
    pub fn new(transform: Matrix4<f32>, layer: u32) -> Self {
        Self {
            transform: transform.into(),
            layer,
            _padding: [0; 3],
        }
    }
}

impl InstanceData for GlyphInstance {
    fn data(&self) -> &[u8] {
        self.as_bytes()
    }
}

#[derive(Debug)]
pub struct GlyphGeometry {
    pub vertices: [GlyphVertex; 4],
    pub indices: [u16; 6],
}

impl Geometry for GlyphGeometry {
    fn contents(&self) -> &[u8] {
        self.vertices.as_bytes()
    }

    fn length(&self) -> u32 {
        self.vertices.len() as u32
    }

    fn indices(&self) -> Option<&[u8]> {
        Some(self.indices.as_bytes())
    }
}

pub const fn quad_geometry() -> GlyphGeometry {
    GlyphGeometry {
        vertices: quad_shape(),
        indices: [0, 2, 1, 1, 2, 3],
    }
}

/// Unit quad centred on the origin. Texture rows run top to bottom, so v is flipped.
pub const fn quad_shape() -> [GlyphVertex; 4] {
    [
        GlyphVertex {
            pos: [-0.5, -0.5, 0.0],
            uv: [0.0, 1.0],
        },
        GlyphVertex {
            pos: [0.5, -0.5, 0.0],
            uv: [1.0, 1.0],
        },
        GlyphVertex {
            pos: [-0.5, 0.5, 0.0],
            uv: [0.0, 0.0],
        },
        GlyphVertex {
            pos: [0.5, 0.5, 0.0],
            uv: [1.0, 0.0],
        },
    ]
}

#[derive(Debug, Clone, Copy)]
pub struct GlyphRenderObject {
    pub transform: Matrix4<f32>,
    pub layer: u32,
    pub pipeline_handle: PipelineHandle,
    pub mesh_handle: MeshHandle,
}

impl RenderObject for GlyphRenderObject {
    type InstanceType = GlyphInstance;

    fn instance(&self) -> Self::InstanceType {
        GlyphInstance::new(self.transform, self.layer)
    }

    fn pipeline_handle(&self) -> PipelineHandle {
        self.pipeline_handle
    }

    fn mesh_handle(&self) -> MeshHandle {
        self.mesh_handle
    }
}

/// Where the scrolling line sits in the world, and what it is drawn with.
#[derive(Debug, Clone, Copy)]
pub struct GlyphLine {
    pub baseline_y: f32,
    pub depth: f32,
    pub scale: f32,
    pub pipeline_handle: PipelineHandle,
    pub mesh_handle: MeshHandle,
}

impl GlyphLine {
    pub fn new(
        config: &ScrollerConfig,
        pipeline_handle: PipelineHandle,
        mesh_handle: MeshHandle,
    ) -> Self {
        Self {
            baseline_y: config.baseline_y,
            depth: config.glyph_depth,
            scale: config.glyph_scale,
            pipeline_handle,
            mesh_handle,
        }
    }

    pub fn render_object(&self, slot: &GlyphSlot) -> GlyphRenderObject {
        GlyphRenderObject {
            transform: Transform::placed(slot.x, self.baseline_y, self.depth, self.scale).matrix(),
            layer: slot.glyph,
            pipeline_handle: self.pipeline_handle,
            mesh_handle: self.mesh_handle,
        }
    }
}

pub fn glyph_pipeline(
    render: &mut Render,
    tile_width: u32,
    tile_height: u32,
    layers: u32,
) -> Result<(Pipeline, BindHandle)> {
    let glyph_bind = render.build_bind(&[
        // camera
        BindEntry {
            visibility: ShaderStages::VERTEX,
            ty: BindEntryType::BufferUniform {
                size: std::mem::size_of::<CameraUniform>() as u64,
                usages: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
            },
            count: None,
        },
        // one layer per glyph
        BindEntry {
            visibility: ShaderStages::FRAGMENT,
            ty: BindEntryType::Texture {
                sample_type: wgpu::TextureSampleType::Float { filterable: true },
                view_dimension: wgpu::TextureViewDimension::D2Array,
                format: wgpu::TextureFormat::Rgba8UnormSrgb,
                size: Extent3d {
                    width: tile_width,
                    height: tile_height,
                    depth_or_array_layers: layers,
                },
                usage: TextureUsages::COPY_DST | TextureUsages::TEXTURE_BINDING,
            },
            count: None,
        },
        // sampler
        BindEntry {
            visibility: ShaderStages::FRAGMENT,
            ty: BindEntryType::Sampler {
                binding_type: wgpu::SamplerBindingType::Filtering,
                descriptor: SamplerDescriptor {
                    address_mode_u: AddressMode::ClampToEdge,
                    address_mode_v: AddressMode::ClampToEdge,
                    address_mode_w: AddressMode::ClampToEdge,
                    mag_filter: FilterMode::Linear,
                    min_filter: FilterMode::Linear,
                    mipmap_filter: FilterMode::Nearest,
                    ..Default::default()
                },
            },
            count: None,
        },
    ])?;

    let pipeline = PipelineBuilder::new()
        .with_label("glyphs")
        .with_format(render.surface_format())
        .with_cull_mode(None)
        .with_bind(glyph_bind)
        .with_shader(include_str!("../shaders/glyph.wgsl"))
        .with_vb::<GlyphVertex>(
            wgpu::VertexStepMode::Vertex,
            &vertex_attr_array![
                // position
                0 => Float32x3,
                // uv
                1 => Float32x2,
            ],
        )
        .with_vb::<GlyphInstance>(
            wgpu::VertexStepMode::Instance,
            &vertex_attr_array![
                // transform
                2 => Float32x4,
                3 => Float32x4,
                4 => Float32x4,
                5 => Float32x4,
                // layer
                6 => Uint32,
            ],
        )
        .build(render)?;

    Ok((pipeline, glyph_bind))
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use nalgebra::Translation3;

    use super::{quad_geometry, GlyphInstance};
    use crate::{geometry::Geometry, instance::InstanceData};

    #[test]
    fn instance_is_tightly_packed() {
        assert_eq!(std::mem::size_of::<GlyphInstance>(), 80);
        let instance = GlyphInstance::new(Translation3::new(1.0, 2.0, 3.0).to_homogeneous(), 9);
        let bytes = instance.data();
        assert_eq!(bytes.len(), 80);
        assert_eq!(&bytes[64..68], &9u32.to_ne_bytes());
        // column major: translation is the fourth column
        assert_relative_eq!(instance.transform[3][0], 1.0);
        assert_relative_eq!(instance.transform[3][2], 3.0);
    }

    #[test]
    fn quad_is_two_indexed_triangles() {
        let quad = quad_geometry();
        assert_eq!(quad.length(), 4);
        assert_eq!(quad.index_count(), 6);
        assert_eq!(quad.contents().len(), 4 * 20);
        assert!(quad.indices.iter().all(|&i| i < 4));
    }
}
