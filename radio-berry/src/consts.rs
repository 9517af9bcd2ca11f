//! 通用常量.

/// ROI 掩码相关的标签值.
pub mod label {
    /// 掩码中背景 (ROI 外) 的体素值.
    pub const ROI_BACKGROUND: u8 = 0;

    /// 掩码中默认目标 ROI 的体素值.
    pub const ROI_DEFAULT: u8 = 1;

    /// 离散化体数据中 ROI 外体素的灰度占位值. 合法灰度从 1 开始.
    pub const OUTSIDE_ROI_LEVEL: u16 = 0;

    /// 体素是否属于标签 `label` 的 ROI?
    #[inline]
    pub const fn is_target(p: u8, label: u8) -> bool {
        p == label
    }
}

/// 加在每个对数自变量上的机器精度下限, 所有特征统一使用.
pub const LOG_EPSILON: f64 = f64::EPSILON;

/// 默认的共生/邻域距离 `delta`.
pub const DEFAULT_DELTA: usize = 1;

/// 默认的 NGLDM 粗糙度参数 `alpha`.
pub const DEFAULT_ALPHA: u16 = 0;

/// 体素在腐蚀过程中的状态.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ElemType {
    /// ROI 外, 或已被腐蚀掉.
    Background,

    /// 仍然存活的 ROI 体素.
    Foreground,
}

impl ElemType {
    /// 是否为前景.
    #[inline]
    pub fn is_foreground(&self) -> bool {
        matches!(self, Self::Foreground)
    }

    /// 是否为背景.
    #[inline]
    pub fn is_background(&self) -> bool {
        !self.is_foreground()
    }
}
