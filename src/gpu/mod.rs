pub mod terrain_callback;
pub mod terrain_renderer;

pub use terrain_callback::TerrainCallback;
pub use terrain_renderer::{LayerUniforms, TerrainFrame, TerrainRenderer};
