// 地形生成模块

pub mod color;
pub mod height_field;
pub mod mesh;
pub mod noise;
pub mod zones;

pub use self::color::*;
pub use self::height_field::*;
pub use self::mesh::*;
pub use self::noise::*;
pub use self::zones::*;
