//! 3D 形态学操作: 区域 (zone) 标记与基于逐层腐蚀的边界距离图.
//!
//! 两者都以 [`crate::TextureInput`] 的实现块形式提供, 同时导出同名自由函数.

mod distance;
mod memento;
mod zone;

pub use distance::distance_map;
pub use zone::{label_zones, Zone};
