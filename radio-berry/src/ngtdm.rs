//! 邻域灰度差矩阵 (NGTDM).
//!
//! 对每个 ROI 体素, 取其切比雪夫距离 `delta` 以内 ROI 邻居的平均灰度,
//! 按中心灰度累加 `|i - 平均值|`. 没有任何 ROI 邻居的体素不参与统计.

use crate::consts::DEFAULT_DELTA;
use crate::direction::neighbourhood;
use crate::error::{TextureError, TextureResult};
use crate::feature::{Family, Feature, FeatureValue, TextureFeatures};
use crate::TextureInput;

crate::feature::feature_enum! {
    /// NGTDM 的 5 个特征.
    NgtdmFeature {
        /// 粗糙度.
        Coarseness => ("QCDE", "coarseness"),
        /// 对比度.
        Contrast => ("65HE", "contrast"),
        /// 繁忙度.
        Busyness => ("NQ30", "busyness"),
        /// 复杂度.
        Complexity => ("HDEZ", "complexity"),
        /// 强度.
        Strength => ("1X9X", "strength"),
    }
}

/// NGTDM 构建参数.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct NgtdmParams {
    /// 邻域半径 (切比雪夫距离), 至少为 1.
    pub delta: usize,
}

impl Default for NgtdmParams {
    fn default() -> Self {
        Self {
            delta: DEFAULT_DELTA,
        }
    }
}

impl NgtdmParams {
    /// 校验参数.
    pub fn validate(&self) -> TextureResult<()> {
        if self.delta == 0 {
            return Err(TextureError::InvalidParameter {
                name: "delta",
                reason: "必须至少为 1".to_string(),
            });
        }
        Ok(())
    }
}

/// 某个灰度上的统计.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct NgtdmRow {
    /// 灰度 `i`.
    pub level: u16,

    /// 参与统计的体素个数 `N_i`.
    pub count: usize,

    /// `p_i = N_i / N_vp`.
    pub probability: f64,

    /// `s_i = Σ |i - 邻域均值|`.
    pub diff_sum: f64,
}

/// 一次 NGTDM 构建的结果.
#[derive(Debug, Clone)]
pub struct Ngtdm {
    rows: Vec<NgtdmRow>,
    nvp: usize,
}

impl Ngtdm {
    /// 构建 `input` 的邻域灰度差表, 每个灰度 `1..=n_bins` 一行.
    pub fn build(input: &TextureInput, params: &NgtdmParams) -> TextureResult<Self> {
        params.validate()?;
        let offsets = neighbourhood(params.delta, input.dimensionality(), input.shape());
        let ng = input.n_bins();
        let mut counts = vec![0usize; ng];
        let mut diffs = vec![0.0f64; ng];

        for (pos, level) in input.roi_iter() {
            let (sum, n) = offsets
                .iter()
                .filter_map(|&off| input.level_at(pos, off))
                .fold((0.0, 0usize), |(s, n), g| (s + g as f64, n + 1));
            if n == 0 {
                continue;
            }
            let k = level as usize - 1;
            counts[k] += 1;
            diffs[k] += (level as f64 - sum / n as f64).abs();
        }

        let nvp: usize = counts.iter().sum();
        log::debug!(
            "NGTDM: {nvp}/{} voxels with neighbours, delta {}",
            input.voxel_count(),
            params.delta
        );
        let rows = (0..ng)
            .map(|k| NgtdmRow {
                level: (k + 1) as u16,
                count: counts[k],
                probability: if nvp == 0 {
                    0.0
                } else {
                    counts[k] as f64 / nvp as f64
                },
                diff_sum: diffs[k],
            })
            .collect();
        Ok(Self { rows, nvp })
    }

    /// 各灰度的统计, 按灰度升序.
    #[inline]
    pub fn rows(&self) -> &[NgtdmRow] {
        &self.rows
    }

    /// 参与统计的体素总数 `N_vp`.
    #[inline]
    pub fn voxel_count(&self) -> usize {
        self.nvp
    }

    /// `s_i ≠ 0` 的灰度个数 `N_gp`.
    pub fn active_levels(&self) -> usize {
        self.rows.iter().filter(|r| r.diff_sum != 0.0).count()
    }

    /// 所有 `p_i`, `p_j` 均非零的有序灰度对 `(i, j)`.
    fn occupied_pairs(&self) -> impl Iterator<Item = (&NgtdmRow, &NgtdmRow)> + '_ {
        let occupied = move || self.rows.iter().filter(|r| r.probability != 0.0);
        occupied().flat_map(move |a| occupied().map(move |b| (a, b)))
    }

    fn coarseness(&self) -> FeatureValue {
        let den: f64 = self.rows.iter().map(|r| r.probability * r.diff_sum).sum();
        FeatureValue::ratio(1.0, den)
    }

    fn contrast(&self) -> f64 {
        let ngp = self.active_levels();
        if ngp <= 1 {
            return 0.0;
        }
        let spread: f64 = self
            .occupied_pairs()
            .map(|(a, b)| a.probability * b.probability * (a.level as f64 - b.level as f64).powi(2))
            .sum();
        let diff: f64 = self.rows.iter().map(|r| r.diff_sum).sum();
        spread / (ngp * (ngp - 1)) as f64 * diff / self.nvp as f64
    }

    fn busyness(&self) -> f64 {
        let num: f64 = self.rows.iter().map(|r| r.probability * r.diff_sum).sum();
        let den: f64 = self
            .occupied_pairs()
            .map(|(a, b)| (a.level as f64 * a.probability - b.level as f64 * b.probability).abs())
            .sum();
        if den == 0.0 {
            0.0
        } else {
            num / den
        }
    }

    fn complexity(&self) -> f64 {
        let total: f64 = self
            .occupied_pairs()
            .map(|(a, b)| {
                (a.level as f64 - b.level as f64).abs()
                    * (a.probability * a.diff_sum + b.probability * b.diff_sum)
                    / (a.probability + b.probability)
            })
            .sum();
        total / self.nvp as f64
    }

    fn strength(&self) -> f64 {
        let diff: f64 = self.rows.iter().map(|r| r.diff_sum).sum();
        if diff == 0.0 {
            return 0.0;
        }
        let num: f64 = self
            .occupied_pairs()
            .map(|(a, b)| (a.probability + b.probability) * (a.level as f64 - b.level as f64).powi(2))
            .sum();
        num / diff
    }
}

impl TextureFeatures for Ngtdm {
    type Feature = NgtdmFeature;
    const FAMILY: Family = Family::Ngtdm;

    fn features() -> &'static [NgtdmFeature] {
        NgtdmFeature::ALL
    }

    fn select(feature: Feature) -> Option<NgtdmFeature> {
        match feature {
            Feature::Ngtdm(f) => Some(f),
            _ => None,
        }
    }

    fn calculate(&self, feature: NgtdmFeature) -> FeatureValue {
        if self.nvp == 0 {
            return FeatureValue::NotApplicable;
        }
        match feature {
            NgtdmFeature::Coarseness => self.coarseness(),
            NgtdmFeature::Contrast => self.contrast().into(),
            NgtdmFeature::Busyness => self.busyness().into(),
            NgtdmFeature::Complexity => self.complexity().into(),
            NgtdmFeature::Strength => self.strength().into(),
        }
    }
}
