//! WebGPU render pipeline setup
//!
//! The scene is a flat triangle list in world space. Each frame it is mapped
//! into NDC against the view rectangle and written into one reusable vertex
//! buffer that grows when a level needs more vertices.

use glam::Vec2;

use super::vertex::{Vertex, colors};
use crate::sim::Wall;

/// Vertices the buffer holds before its first resize
const INITIAL_VERTEX_CAPACITY: u64 = 1024;

/// Main render state
pub struct RenderState {
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    pub pipeline: wgpu::RenderPipeline,
    pub vertex_buffer: wgpu::Buffer,
    /// Vertices the buffer can hold
    vertex_capacity: u64,
    pub vertex_count: u32,
    /// Viewport size in pixels
    pub size: (u32, u32),
    /// World-space rectangle kept in view
    pub view_min: Vec2,
    pub view_max: Vec2,
}

impl RenderState {
    pub async fn new(
        surface: wgpu::Surface<'static>,
        adapter: &wgpu::Adapter,
        width: u32,
        height: u32,
    ) -> Result<Self, wgpu::RequestDeviceError> {
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("ball-game-device"),
                required_limits: wgpu::Limits::downlevel_webgl2_defaults(),
                ..Default::default()
            })
            .await?;

        let config = surface_config(&surface.get_capabilities(adapter), width, height);
        surface.configure(&device, &config);

        let pipeline = flat_pipeline(&device, config.format);
        let vertex_buffer = vertex_buffer(&device, INITIAL_VERTEX_CAPACITY);

        Ok(Self {
            surface,
            device,
            queue,
            config,
            pipeline,
            vertex_buffer,
            vertex_capacity: INITIAL_VERTEX_CAPACITY,
            vertex_count: 0,
            size: (width, height),
            view_min: Vec2::splat(-5.0),
            view_max: Vec2::splat(5.0),
        })
    }

    pub fn resize(&mut self, new_width: u32, new_height: u32) {
        if new_width > 0 && new_height > 0 {
            self.size = (new_width, new_height);
            self.config.width = new_width;
            self.config.height = new_height;
            self.surface.configure(&self.device, &self.config);
        }
    }

    /// Frame the given walls
    pub fn fit_to_walls(&mut self, walls: &[Wall]) {
        if let Some((min, max)) = view_bounds(walls) {
            self.view_min = min;
            self.view_max = max;
        }
    }

    /// Map world-space vertices to NDC and upload them
    fn upload(&mut self, vertices: &[Vertex]) {
        let ndc: Vec<Vertex> = vertices
            .iter()
            .map(|v| {
                let p = world_to_ndc(v.pos(), self.view_min, self.view_max, self.size);
                Vertex::at(p, v.color)
            })
            .collect();

        if let Some(capacity) = grown_capacity(self.vertex_capacity, ndc.len() as u64) {
            self.vertex_capacity = capacity;
            self.vertex_buffer = vertex_buffer(&self.device, self.vertex_capacity);
            log::debug!("Vertex buffer grown to {} vertices", self.vertex_capacity);
        }
        if !ndc.is_empty() {
            self.queue.write_buffer(&self.vertex_buffer, 0, bytemuck::cast_slice(&ndc));
        }
        self.vertex_count = ndc.len() as u32;
    }

    /// Draw one frame of world-space vertices
    pub fn render(&mut self, vertices: &[Vertex]) -> Result<(), wgpu::SurfaceError> {
        self.upload(vertices);

        let frame = self.surface.get_current_texture()?;
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("scene_encoder"),
            });

        let [r, g, b, a] = colors::BACKGROUND.map(f64::from);
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("scene_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color { r, g, b, a }),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            if self.vertex_count > 0 {
                pass.set_pipeline(&self.pipeline);
                pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
                pass.draw(0..self.vertex_count, 0..1);
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        frame.present();
        Ok(())
    }
}

/// Prefer an sRGB format; fall back to whatever the surface lists first
fn surface_config(
    caps: &wgpu::SurfaceCapabilities,
    width: u32,
    height: u32,
) -> wgpu::SurfaceConfiguration {
    let format = caps
        .formats
        .iter()
        .copied()
        .find(|f| f.is_srgb())
        .or_else(|| caps.formats.first().copied())
        .unwrap_or(wgpu::TextureFormat::Bgra8UnormSrgb);
    let alpha_mode = caps
        .alpha_modes
        .first()
        .copied()
        .unwrap_or(wgpu::CompositeAlphaMode::Auto);

    wgpu::SurfaceConfiguration {
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        format,
        width,
        height,
        present_mode: wgpu::PresentMode::AutoVsync,
        alpha_mode,
        view_formats: vec![],
        desired_maximum_frame_latency: 2,
    }
}

/// Pass-through pipeline for alpha-blended flat-coloured triangles
fn flat_pipeline(device: &wgpu::Device, format: wgpu::TextureFormat) -> wgpu::RenderPipeline {
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("flat_shader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("shader.wgsl").into()),
    });
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("flat_layout"),
        bind_group_layouts: &[],
        immediate_size: 0,
    });

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("flat_pipeline"),
        layout: Some(&layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            buffers: &[Vertex::desc()],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        // Shapes are wound either way, so nothing is culled
        primitive: wgpu::PrimitiveState::default(),
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview_mask: None,
        cache: None,
    })
}

/// New buffer capacity if `needed` vertices do not fit in `current`
fn grown_capacity(current: u64, needed: u64) -> Option<u64> {
    (needed > current).then(|| needed.next_power_of_two())
}

fn vertex_buffer(device: &wgpu::Device, capacity: u64) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("scene_vertices"),
        size: capacity * std::mem::size_of::<Vertex>() as u64,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

/// Bounding box of all walls plus a 5% margin
pub fn view_bounds(walls: &[Wall]) -> Option<(Vec2, Vec2)> {
    let first = walls.first()?;
    let (min, max) = walls
        .iter()
        .fold((first.min, first.max), |(lo, hi), w| (lo.min(w.min), hi.max(w.max)));
    let margin = (max - min) * 0.05;
    Some((min - margin, max + margin))
}

/// Convert world coordinates to normalized device coordinates
///
/// The view rectangle is centred and scaled uniformly so all of it fits the
/// surface, whatever the aspect ratio.
pub fn world_to_ndc(p: Vec2, view_min: Vec2, view_max: Vec2, size: (u32, u32)) -> Vec2 {
    let (w, h) = size;
    let aspect = w as f32 / h.max(1) as f32;
    let center = (view_min + view_max) * 0.5;
    let half = ((view_max - view_min) * 0.5).max(Vec2::splat(1e-3));

    let scale = (1.0 / half.y).min(aspect / half.x);
    let rel = (p - center) * scale;
    Vec2::new(rel.x / aspect, rel.y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::WallKind;

    #[test]
    fn test_view_bounds_margin() {
        let walls = vec![
            Wall::new(1, WallKind::Normal, Vec2::new(-10.0, -10.0), Vec2::new(0.0, 0.0)),
            Wall::new(2, WallKind::Normal, Vec2::new(0.0, 0.0), Vec2::new(10.0, 10.0)),
        ];
        let (min, max) = view_bounds(&walls).unwrap();
        assert_eq!(min, Vec2::splat(-11.0));
        assert_eq!(max, Vec2::splat(11.0));
        assert!(view_bounds(&[]).is_none());
    }

    #[test]
    fn test_buffer_grows_to_power_of_two() {
        assert_eq!(grown_capacity(1024, 1024), None);
        assert_eq!(grown_capacity(1024, 10), None);
        assert_eq!(grown_capacity(1024, 1025), Some(2048));
        assert_eq!(grown_capacity(1024, 5000), Some(8192));
    }

    #[test]
    fn test_surface_config_prefers_srgb() {
        let caps = wgpu::SurfaceCapabilities {
            formats: vec![
                wgpu::TextureFormat::Bgra8Unorm,
                wgpu::TextureFormat::Rgba8UnormSrgb,
            ],
            alpha_modes: vec![wgpu::CompositeAlphaMode::Opaque],
            ..Default::default()
        };
        let config = surface_config(&caps, 640, 480);
        assert_eq!(config.format, wgpu::TextureFormat::Rgba8UnormSrgb);
        assert_eq!(config.alpha_mode, wgpu::CompositeAlphaMode::Opaque);
        assert_eq!((config.width, config.height), (640, 480));
    }

    #[test]
    fn test_surface_config_without_caps_falls_back() {
        let config = surface_config(&wgpu::SurfaceCapabilities::default(), 1, 1);
        assert_eq!(config.format, wgpu::TextureFormat::Bgra8UnormSrgb);
        assert_eq!(config.alpha_mode, wgpu::CompositeAlphaMode::Auto);

        let caps = wgpu::SurfaceCapabilities {
            formats: vec![wgpu::TextureFormat::Bgra8Unorm],
            ..Default::default()
        };
        assert_eq!(surface_config(&caps, 1, 1).format, wgpu::TextureFormat::Bgra8Unorm);
    }

    #[test]
    fn test_world_to_ndc_fits_tall_view_on_wide_screen() {
        let (min, max) = (Vec2::new(-1.0, -2.0), Vec2::new(1.0, 2.0));
        // 2:1 landscape surface, 1:2 portrait view: height limits
        let top = world_to_ndc(Vec2::new(0.0, 2.0), min, max, (200, 100));
        assert!((top - Vec2::Y).length() < 1e-6);
        let right = world_to_ndc(Vec2::new(1.0, 0.0), min, max, (200, 100));
        assert!((right.x - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_world_to_ndc_fits_wide_view_on_tall_screen() {
        let (min, max) = (Vec2::new(-2.0, -1.0), Vec2::new(2.0, 1.0));
        let right = world_to_ndc(Vec2::new(2.0, 0.0), min, max, (100, 200));
        assert!((right.x - 1.0).abs() < 1e-6);
        let top = world_to_ndc(Vec2::new(0.0, 1.0), min, max, (100, 200));
        assert!((top.y - 0.25).abs() < 1e-6);
    }
}
