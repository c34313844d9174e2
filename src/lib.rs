pub mod bind;
pub mod camera;
pub mod config;
pub mod geometry;
pub mod input;
pub mod instance;
pub mod pipeline;
pub mod plain;
pub mod render;
pub mod render_object;
pub mod text;
pub mod transform;
pub mod window;
