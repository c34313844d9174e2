use std::sync::Arc;

use anyhow::Result;
use glyphscroll::{
    bind::BindHandle,
    camera::Camera,
    config::ScrollerConfig,
    plain::Plain,
    render::{PhysicalSize, Render, Window},
    text::{
        font_sheet::FontSheet,
        pipeline::{glyph_pipeline, quad_geometry, GlyphLine, CAMERA_BINDING, GLYPH_TEXTURE_BINDING},
        scroller::{ScrollLayout, Scroller},
    },
    window::{make_window, AppLoop},
};

struct TextScroller {
    render: Render,
    camera: Camera,
    glyph_bind: BindHandle,
    line: GlyphLine,
    scroller: Scroller,
}

impl TextScroller {
    fn new(window: Arc<Window>, config: &ScrollerConfig) -> Result<Self> {
        let mut render = Render::new(window)?;
        render.set_clear_color(config.clear_color);

        let sheet = FontSheet::from_path(
            &config.font_path,
            config.tile_width,
            config.tile_height,
            config.tile_count,
        )?;

        let (pipeline, glyph_bind) = glyph_pipeline(
            &mut render,
            config.tile_width,
            config.tile_height,
            config.tile_count,
        )?;
        let pipeline_handle = render.add_pipeline(pipeline);
        let mesh_handle = render.add_mesh(quad_geometry());
        sheet.upload(&render, glyph_bind, GLYPH_TEXTURE_BINDING)?;

        let mut camera = Camera::for_screen(config);
        let size = render.size();
        camera.set_aspect(size.width, size.height);
        render.write_buffer(camera.uniform().as_bytes(), glyph_bind, CAMERA_BINDING)?;
        log::info!("far plane at {}", config.far_plane());

        let glyphs = config.glyph_map().encode(&config.message);
        log::info!("scrolling {} glyphs: {:?}", glyphs.len(), config.message.trim_end());
        let scroller = Scroller::new(glyphs, config.slot_count, ScrollLayout::from(config))?;

        Ok(Self {
            render,
            camera,
            glyph_bind,
            line: GlyphLine::new(config, pipeline_handle, mesh_handle),
            scroller,
        })
    }
}

impl AppLoop for TextScroller {
    fn draw(&mut self) -> Result<()> {
        self.scroller.advance();
        for slot in self.scroller.active() {
            self.render.add_render_object(&self.line.render_object(slot));
        }
        self.render.draw()
    }

    fn resized(&mut self, new_size: PhysicalSize<u32>) {
        self.render.resize(new_size);
        self.camera.set_aspect(new_size.width, new_size.height);
        if let Err(err) = self.render.write_buffer(
            self.camera.uniform().as_bytes(),
            self.glyph_bind,
            CAMERA_BINDING,
        ) {
            log::error!("couldn't update camera: {:#}", err);
        }
    }
}

fn main() -> Result<()> {
    let app = make_window();

    let mut config = ScrollerConfig::default();
    if let Some(font_path) = std::env::args_os().nth(1) {
        config = config.with_font_path(font_path);
    }
    config.validate()?;

    app.with_title("text scroller")
        .with_window_size((config.screen_width, config.screen_height))
        .with_framerate(config.frame_rate)
        .run(move |window, _| TextScroller::new(window, &config))
}
