//! 运行时错误.
//!
//! 只有输入构造和参数校验会返回 `Err`. 数值退化 (空 ROI, 全零矩阵, 0/0)
//! 不是错误, 而是由 [`crate::FeatureValue`] 表达.

use thiserror::Error;

use crate::Idx3d;

/// 构造纹理输入或校验参数时的错误.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TextureError {
    /// 离散化体数据与 ROI 掩码形状不一致. 形状按 `(z, h, w)` 给出.
    #[error("体数据与 ROI 掩码形状不一致: {volume:?} vs {mask:?}")]
    ShapeMismatch {
        /// 体数据形状.
        volume: Idx3d,
        /// 掩码形状.
        mask: Idx3d,
    },

    /// 离散化体数据与 ROI 掩码体素分辨率不一致. 单位为毫米, 按 `[z, h, w]` 给出.
    #[error("体数据与 ROI 掩码体素分辨率不一致: {volume:?} vs {mask:?}")]
    SpacingMismatch {
        /// 体数据分辨率.
        volume: [f64; 3],
        /// 掩码分辨率.
        mask: [f64; 3],
    },

    /// ROI 内某体素的灰度不在 `[1, n_bins]` 范围内.
    #[error("ROI 内体素 {pos:?} 的灰度 {level} 不在 [1, {n_bins}] 范围内")]
    LevelOutOfRange {
        /// 体素索引.
        pos: Idx3d,
        /// 实际灰度.
        level: u16,
        /// 灰度级数.
        n_bins: u16,
    },

    /// 参数不合法.
    #[error("参数 `{name}` 不合法: {reason}")]
    InvalidParameter {
        /// 参数名.
        name: &'static str,
        /// 原因.
        reason: String,
    },
}

/// 纹理计算中可能失败的操作的返回类型.
pub type TextureResult<T> = Result<T, TextureError>;
