#![warn(missing_docs)] // <= 合适时移除它.
// #![warn(clippy::missing_docs_in_private_items)]  // <= too strict.

//! 核心库. 从已离散化的 2D / 3D ROI 中提取基于空间灰度关系的纹理特征 (IBSI 定义).
//!
//! 该 crate 只提供 `safe` 接口, 是纯内存计算: 不做图像解码, 不做离散化或重采样,
//! 也不负责多特征族的编排与结果序列化.
//!
//! # 注意
//!
//! 1. 所有网格按 `(z, h, w)` 组织, `h` 向下增长. 方向模型中的 `dy` 则向上为正,
//!   二者之间的转换只在 [`direction::Direction::offset`] 中进行.
//! 2. 输入不一致 (形状, 分辨率, 灰度越界) 在构造 [`TextureInput`] 时以
//!   [`TextureError`] 拒绝. 数值上的退化 (空 ROI, 全零矩阵, 0/0) 不是错误,
//!   而是以 [`FeatureValue`] 的三种状态表达.
//!
//! # 组成
//!
//! ### 方向模型 ✅
//!
//! 26 个单位步长方向, 13 个对称代表. 实现位于 `radio-berry/src/direction.rs`.
//!
//! ### 区域标记与边界距离图 ✅
//!
//! 显式队列的区域标记 (不递归), 逐层腐蚀的边界距离图.
//!
//! 实现位于 `radio-berry/src/morph`.
//!
//! ### 纹理矩阵 ✅
//!
//! | 矩阵族 | 特征数 | 模块 |
//! | --- | --- | --- |
//! | GLCM | 25 | [`glcm`] |
//! | GLRLM | 16 | [`glrlm`] |
//! | GLDZM | 16 | [`gldzm`] |
//! | GLSZM | 16 | [`glszm`] |
//! | NGTDM | 5 | [`ngtdm`] |
//! | NGLDM | 17 | [`ngldm`] |
//!
//! 每个构建结果都实现 [`TextureFeatures`], 可以按特征枚举或按 IBSI 编码计算特征.
//!
//! ### 并行 ✅
//!
//! 启用 `rayon` feature 时, GLCM / GLRLM 的各方向扫描并行执行, 结果与串行一致.
//!
//! # 示例
//!
//! ```
//! use ndarray::Array3;
//! use radio_berry::prelude::*;
//!
//! let data = Array3::from_shape_fn((1, 4, 4), |(_, h, w)| ((h + w) % 4 + 1) as u16);
//! let volume = DiscretizedVolume::new(data, 4, [1.0, 1.0, 1.0]).unwrap();
//! let mask = RoiMask::filled((1, 4, 4), [1.0, 1.0, 1.0], 1).unwrap();
//! let input = TextureInput::new(&volume, &mask, 1).unwrap();
//!
//! let glcm = Glcm::build(&input, &GlcmParams::default()).unwrap();
//! assert!(glcm.calculate_code("8ZQL").is_value());
//! ```

/// 三维索引, 同时也可一定程度上用作非负整数向量. 按 `(z, h, w)` 排列.
pub type Idx3d = (usize, usize, usize);

/// 三维网格索引偏移 `(dz, dh, dw)`.
pub type Offset3d = (isize, isize, isize);

/// 输入网格.
mod data;

pub use data::{DiscretizedVolume, Dimensionality, PosIter, RoiMask, TextureInput, VoxelGrid};

pub mod consts;

mod error;

pub use error::{TextureError, TextureResult};

pub mod direction;

pub mod morph;

mod feature;

pub use feature::{Family, Feature, FeatureValue, TextureFeatures};

mod zone_stats;

pub mod glcm;
pub mod gldzm;
pub mod glrlm;
pub mod glszm;
pub mod ngldm;
pub mod ngtdm;

pub mod prelude;
