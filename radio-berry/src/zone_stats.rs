//! GLRLM / GLDZM / GLSZM / NGLDM 共用的统计量.
//!
//! 这四个矩阵族的行都是灰度 `i` (从 1 开始), 列都是某种 "长度" `j`
//! (游程长度, 到边缘的距离, 区域大小, 依赖数 + 1), 也都从 1 开始.
//! 它们的特征 (强调类, 非均匀性, 百分比, 方差, 熵, 能量) 只在列的解释上不同.

use ndarray::{Array2, Axis};

use crate::consts::LOG_EPSILON;

/// 四个矩阵族共有的统计量.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum ZoneStat {
    /// `Σ p_ij · i^a · j^b`.
    Emphasis(i32, i32),
    GrayNonUniformity,
    GrayNonUniformityNorm,
    ColNonUniformity,
    ColNonUniformityNorm,
    Percentage,
    GrayVariance,
    ColVariance,
    Entropy,
    Energy,
}

/// 由一个原始计数矩阵一次性计算出的系数.
///
/// 非均匀性和百分比使用 **原始** 矩阵, 其余特征使用归一化矩阵.
#[derive(Debug, Clone)]
pub(crate) struct EmphasisStats {
    /// 原始矩阵总和 `N_s`.
    total: f64,

    /// 百分比的分母 (通常是 ROI 体素数 `N_v`).
    population: f64,

    /// 归一化矩阵 `p_ij`.
    p: Array2<f64>,

    /// 原始矩阵行和 `r_i.`.
    row_sums: Vec<f64>,

    /// 原始矩阵列和 `r_.j`.
    col_sums: Vec<f64>,

    /// 归一化矩阵上灰度的均值.
    mu_i: f64,

    /// 归一化矩阵上列变量的均值.
    mu_j: f64,
}

/// 第 `idx` 行/列 (从 0 开始) 所代表的值 (从 1 开始).
#[inline]
fn rank(idx: usize) -> f64 {
    (idx + 1) as f64
}

impl EmphasisStats {
    /// 从原始矩阵计算系数. 原始矩阵全为零时返回 `None`.
    pub fn new(raw: &Array2<f64>, population: f64) -> Option<Self> {
        let total = raw.sum();
        if total <= 0.0 {
            return None;
        }
        let p = raw / total;
        let row_sums = raw.sum_axis(Axis(1)).to_vec();
        let col_sums = raw.sum_axis(Axis(0)).to_vec();

        let (mut mu_i, mut mu_j) = (0.0, 0.0);
        for ((i, j), &v) in p.indexed_iter() {
            mu_i += rank(i) * v;
            mu_j += rank(j) * v;
        }
        Some(Self {
            total,
            population,
            p,
            row_sums,
            col_sums,
            mu_i,
            mu_j,
        })
    }

    /// 归一化矩阵.
    #[inline]
    pub fn normalized(&self) -> &Array2<f64> {
        &self.p
    }

    /// `Σ p_ij · i^a · j^b`. 覆盖全部八种强调类特征.
    pub fn emphasis(&self, a: i32, b: i32) -> f64 {
        self.p
            .indexed_iter()
            .filter(|(_, v)| **v != 0.0)
            .map(|((i, j), &v)| v * rank(i).powi(a) * rank(j).powi(b))
            .sum()
    }

    /// 灰度非均匀性 `Σ_i r_i.² / N_s`.
    pub fn gray_non_uniformity(&self) -> f64 {
        self.row_sums.iter().map(|r| r * r).sum::<f64>() / self.total
    }

    /// 归一化灰度非均匀性 `Σ_i r_i.² / N_s²`.
    pub fn gray_non_uniformity_norm(&self) -> f64 {
        self.gray_non_uniformity() / self.total
    }

    /// 列非均匀性 `Σ_j r_.j² / N_s`.
    pub fn col_non_uniformity(&self) -> f64 {
        self.col_sums.iter().map(|r| r * r).sum::<f64>() / self.total
    }

    /// 归一化列非均匀性 `Σ_j r_.j² / N_s²`.
    pub fn col_non_uniformity_norm(&self) -> f64 {
        self.col_non_uniformity() / self.total
    }

    /// 百分比 `N_s / population`.
    pub fn percentage(&self) -> f64 {
        self.total / self.population
    }

    /// 灰度方差 `Σ (i - μ_i)² p_ij`.
    pub fn gray_variance(&self) -> f64 {
        self.p
            .indexed_iter()
            .map(|((i, _), &v)| (rank(i) - self.mu_i).powi(2) * v)
            .sum()
    }

    /// 列方差 `Σ (j - μ_j)² p_ij`.
    pub fn col_variance(&self) -> f64 {
        self.p
            .indexed_iter()
            .map(|((_, j), &v)| (rank(j) - self.mu_j).powi(2) * v)
            .sum()
    }

    /// 熵 `-Σ p_ij log2(p_ij + ε)`, 不小于 0.
    pub fn entropy(&self) -> f64 {
        let h = -self
            .p
            .iter()
            .filter(|v| **v > 0.0)
            .map(|v| v * (v + LOG_EPSILON).log2())
            .sum::<f64>();
        h.max(0.0)
    }

    /// 能量 `Σ p_ij²`.
    pub fn energy(&self) -> f64 {
        self.p.iter().map(|v| v * v).sum()
    }

    /// 按 [`ZoneStat`] 分派.
    pub fn stat(&self, stat: ZoneStat) -> f64 {
        match stat {
            ZoneStat::Emphasis(a, b) => self.emphasis(a, b),
            ZoneStat::GrayNonUniformity => self.gray_non_uniformity(),
            ZoneStat::GrayNonUniformityNorm => self.gray_non_uniformity_norm(),
            ZoneStat::ColNonUniformity => self.col_non_uniformity(),
            ZoneStat::ColNonUniformityNorm => self.col_non_uniformity_norm(),
            ZoneStat::Percentage => self.percentage(),
            ZoneStat::GrayVariance => self.gray_variance(),
            ZoneStat::ColVariance => self.col_variance(),
            ZoneStat::Entropy => self.entropy(),
            ZoneStat::Energy => self.energy(),
        }
    }
}
