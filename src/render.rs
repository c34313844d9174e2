use std::{collections::HashMap, sync::Arc};

use anyhow::{anyhow, Context, Result};
use generational_arena::{Arena, Index};
use wgpu::{
    util::{BufferInitDescriptor, DeviceExt},
    Buffer, BufferAddress, BufferDescriptor, BufferUsages, Color, CommandEncoderDescriptor, Device,
    DeviceDescriptor, Extent3d, ImageCopyTexture, ImageDataLayout, Instance, Operations, Origin3d,
    Queue, RenderPassColorAttachment, RenderPassDepthStencilAttachment, RenderPassDescriptor,
    RequestAdapterOptions, StoreOp, Surface, SurfaceConfiguration, SurfaceError, TextureAspect,
    TextureDescriptor, TextureDimension, TextureFormat, TextureUsages, TextureViewDescriptor,
};
pub use winit::{dpi::PhysicalSize, window::Window};

use crate::{
    bind::{Bind, BindEntry, BindHandle},
    geometry::Geometry,
    instance::InstanceData,
    pipeline::{Pipeline, PipelineHandle},
    render_object::RenderObject,
};

pub const DEPTH_FORMAT: TextureFormat = TextureFormat::Depth32Float;

#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
struct MeshAndPipelineHandleComposite(MeshHandle, PipelineHandle);

#[derive(Debug, Default)]
struct InstanceBatch {
    data: Vec<u8>,
    count: u32,
}

#[derive(Debug, Eq, Hash, PartialEq, Clone, Copy)]
pub struct MeshHandle(pub Index);

// renderer draws meshes
pub struct Render {
    device: Device,
    queue: Queue,
    surface: Surface<'static>,
    config: SurfaceConfiguration,
    pipelines: Arena<Pipeline>,
    binds: Arena<Bind>,
    meshes: Arena<(
        Box<dyn Geometry>,
        Buffer,         // vertex
        Option<Buffer>, // index
    )>,
    // instance data submitted for the current frame
    render_objects: HashMap<MeshAndPipelineHandleComposite, InstanceBatch>,
    // kept between frames, grown when a frame needs more room
    instance_buffers: HashMap<MeshAndPipelineHandleComposite, Buffer>,
    depth_texture: wgpu::Texture,
    clear_color: Color,
}

fn create_depth_texture(device: &Device, width: u32, height: u32) -> wgpu::Texture {
    device.create_texture(&TextureDescriptor {
        label: Some("depth texture"),
        size: Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: TextureUsages::RENDER_ATTACHMENT | TextureUsages::TEXTURE_BINDING,
        view_formats: &[],
    })
}

impl Render {
    pub fn new(window: Arc<Window>) -> Result<Self> {
        let instance = Instance::default();
        let size = window.inner_size();

        let surface = instance.create_surface(window)?;

        let (adapter, device, queue) = pollster::block_on(async {
            let adapter = instance
                .request_adapter(&RequestAdapterOptions {
                    compatible_surface: Some(&surface),
                    ..Default::default()
                })
                .await
                .ok_or(anyhow!("No suitable adapter found."))?;

            let (device, queue) = adapter
                .request_device(&DeviceDescriptor::default(), None)
                .await?;

            Ok::<(wgpu::Adapter, wgpu::Device, wgpu::Queue), anyhow::Error>((
                adapter, device, queue,
            ))
        })?;

        let info = adapter.get_info();
        log::info!("using adapter {} ({:?})", info.name, info.backend);

        // validation errors are reported, not fatal
        device.on_uncaptured_error(Box::new(|err| {
            log::error!("wgpu error: {}", err);
        }));

        let mut config = surface
            .get_default_config(&adapter, size.width.max(1), size.height.max(1))
            .ok_or(anyhow!("Surface isn't supported by the adapter."))?;
        config.present_mode = wgpu::PresentMode::Fifo;
        surface.configure(&device, &config);
        log::info!("surface format {:?}", config.format);

        let depth_texture = create_depth_texture(&device, config.width, config.height);

        Ok(Self {
            device,
            queue,
            surface,
            config,
            binds: Arena::new(),
            pipelines: Arena::new(),
            meshes: Arena::new(),
            render_objects: HashMap::new(),
            instance_buffers: HashMap::new(),
            depth_texture,
            clear_color: Color::BLACK,
        })
    }

    pub fn device(&self) -> &Device {
        &self.device
    }

    pub fn surface_format(&self) -> TextureFormat {
        self.config.format
    }

    pub fn size(&self) -> PhysicalSize<u32> {
        PhysicalSize::new(self.config.width, self.config.height)
    }

    pub fn set_clear_color(&mut self, [r, g, b, a]: [f64; 4]) {
        self.clear_color = Color { r, g, b, a };
    }

    pub fn write_buffer(&self, data: &[u8], handle: BindHandle, binding: u32) -> Result<()> {
        let buffer = self.get_bind(handle)?.resource(binding)?.buffer()?;
        self.queue.write_buffer(buffer, 0, data);
        Ok(())
    }

    /// Writes `data` to the start of the texture at `binding`, `size.depth_or_array_layers`
    /// layers at once.
    pub fn write_texture(
        &self,
        data: &[u8],
        data_layout: ImageDataLayout,
        size: Extent3d,
        handle: BindHandle,
        binding: u32,
    ) -> Result<()> {
        let (texture, _) = self.get_bind(handle)?.resource(binding)?.texture_view()?;

        if size.width > texture.width()
            || size.height > texture.height()
            || size.depth_or_array_layers > texture.depth_or_array_layers()
        {
            return Err(anyhow!(
                "Write of {:?} doesn't fit texture of {:?}.",
                size,
                texture.size()
            ));
        }

        self.queue.write_texture(
            ImageCopyTexture {
                texture,
                mip_level: 0,
                origin: Origin3d::ZERO,
                aspect: TextureAspect::All,
            },
            data,
            data_layout,
            size,
        );
        Ok(())
    }

    pub fn add_pipeline(&mut self, pipeline: Pipeline) -> PipelineHandle {
        PipelineHandle(self.pipelines.insert(pipeline))
    }

    pub fn get_pipeline(&self, handle: PipelineHandle) -> Result<&Pipeline> {
        self.pipelines
            .get(handle.0)
            .ok_or(anyhow!("No pipeline found at index {:?}.", handle))
    }

    pub fn add_mesh<G: Geometry + 'static>(&mut self, geometry: G) -> MeshHandle {
        let buffer = self.device.create_buffer_init(&BufferInitDescriptor {
            label: Some("Vertex buffer"),
            contents: geometry.contents(),
            usage: BufferUsages::VERTEX,
        });
        let index_buffer = geometry.indices().map(|indices| {
            self.device.create_buffer_init(&BufferInitDescriptor {
                label: Some("Index buffer"),
                contents: indices,
                usage: BufferUsages::INDEX,
            })
        });
        let geometry: Box<dyn Geometry> = Box::new(geometry);
        MeshHandle(self.meshes.insert((geometry, buffer, index_buffer)))
    }

    fn get_mesh(
        &self,
        mesh_handle: MeshHandle,
    ) -> Result<&(Box<dyn Geometry>, Buffer, Option<Buffer>)> {
        self.meshes
            .get(mesh_handle.0)
            .ok_or(anyhow!("Mesh not found for handle id {:?}", mesh_handle.0))
    }

    // objects only live for one frame: everything added before `draw` is drawn once,
    // then forgotten
    pub fn add_render_object<R: RenderObject>(&mut self, render_object: &R) {
        let key =
            MeshAndPipelineHandleComposite(render_object.mesh_handle(), render_object.pipeline_handle());
        let batch = self.render_objects.entry(key).or_default();
        batch.data.extend_from_slice(render_object.instance().data());
        batch.count += 1;
    }

    pub fn build_bind(&mut self, bind_entries: &[BindEntry]) -> Result<BindHandle> {
        let bind = Bind::new(bind_entries, &self.device)?;
        Ok(BindHandle(self.binds.insert(bind)))
    }

    pub fn get_bind(&self, handle: BindHandle) -> Result<&Bind> {
        self.binds
            .get(handle.0)
            .ok_or(anyhow!("No Bind for handle {:?}.", handle))
    }

    pub fn resize(&mut self, size: PhysicalSize<u32>) {
        if size.width == 0 || size.height == 0 {
            log::debug!("ignoring resize to {:?}", size);
            return;
        }
        self.config.width = size.width;
        self.config.height = size.height;
        self.surface.configure(&self.device, &self.config);
        self.depth_texture = create_depth_texture(&self.device, size.width, size.height);
    }

    fn upload_instances(&mut self) {
        for (key, batch) in &self.render_objects {
            let needed = batch.data.len() as BufferAddress;
            let too_small = self
                .instance_buffers
                .get(key)
                .map_or(true, |buffer| buffer.size() < needed);
            if too_small {
                log::debug!("growing instance buffer for {:?} to {} bytes", key, needed);
                let buffer = self.device.create_buffer(&BufferDescriptor {
                    label: Some("Instance buffer"),
                    size: needed.next_power_of_two(),
                    usage: BufferUsages::VERTEX | BufferUsages::COPY_DST,
                    mapped_at_creation: false,
                });
                self.instance_buffers.insert(*key, buffer);
            }
            if let Some(buffer) = self.instance_buffers.get(key) {
                self.queue.write_buffer(buffer, 0, &batch.data);
            }
        }
    }

    pub fn draw(&mut self) -> Result<()> {
        let frame = match self.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(SurfaceError::Lost | SurfaceError::Outdated) => {
                log::warn!("surface lost, reconfiguring");
                self.surface.configure(&self.device, &self.config);
                self.render_objects.clear();
                return Ok(());
            }
            Err(SurfaceError::Timeout) => {
                log::warn!("timed out waiting for the next frame");
                self.render_objects.clear();
                return Ok(());
            }
            Err(err) => return Err(err).context("Couldn't acquire the next frame."),
        };

        self.upload_instances();

        let view = frame.texture.create_view(&TextureViewDescriptor::default());
        let depth_texture_view = self
            .depth_texture
            .create_view(&TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&CommandEncoderDescriptor::default());

        {
            // bind pipeline -> bind vertex/index buffer -> draw instances, to minimise state changes
            let mut draw_map: HashMap<PipelineHandle, Vec<(MeshHandle, u32, &Buffer)>> =
                HashMap::new();
            for (key, batch) in &self.render_objects {
                if let Some(buffer) = self.instance_buffers.get(key) {
                    draw_map
                        .entry(key.1)
                        .or_default()
                        .push((key.0, batch.count, buffer));
                }
            }

            let mut rpass = encoder.begin_render_pass(&RenderPassDescriptor {
                label: None,
                color_attachments: &[Some(RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(RenderPassDepthStencilAttachment {
                    view: &depth_texture_view,
                    depth_ops: Some(Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            for (pipeline_handle, batches) in draw_map.iter() {
                let pipeline = self.get_pipeline(*pipeline_handle)?;
                rpass.set_pipeline(&pipeline.pipeline);
                for (idx, handle) in pipeline.binds.iter().enumerate() {
                    let bind = self.get_bind(*handle)?;
                    rpass.set_bind_group(idx as u32, &bind.bg, &[]);
                }

                for (mesh_handle, num_instances, instance_buffer) in batches {
                    let (geometry, vertex_buffer, index_buffer) = self.get_mesh(*mesh_handle)?;

                    rpass.set_vertex_buffer(0, vertex_buffer.slice(..));
                    rpass.set_vertex_buffer(1, instance_buffer.slice(..));
                    if let Some(index_buffer) = index_buffer {
                        rpass.set_index_buffer(index_buffer.slice(..), wgpu::IndexFormat::Uint16);
                        rpass.draw_indexed(0..geometry.index_count(), 0, 0..*num_instances);
                    } else {
                        rpass.draw(0..geometry.length(), 0..*num_instances);
                    }
                }
            }
        }

        self.queue.submit([encoder.finish()]);
        frame.present();

        self.render_objects.clear();
        Ok(())
    }
}
