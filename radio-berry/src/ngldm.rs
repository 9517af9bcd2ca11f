//! 邻域灰度依赖矩阵 (NGLDM).
//!
//! 对每个 ROI 体素, 统计其切比雪夫距离 `delta` 以内与之灰度差不超过 `alpha`
//! 的 ROI 邻居个数 `k` (依赖数). 矩阵 `[g - 1, k]` 为灰度 `g`, 依赖数 `k` 的体素个数,
//! 特征中的列变量取 `k + 1`.

use ndarray::Array2;

use crate::consts::{DEFAULT_ALPHA, DEFAULT_DELTA};
use crate::direction::neighbourhood;
use crate::error::{TextureError, TextureResult};
use crate::feature::{Family, Feature, FeatureValue, TextureFeatures};
use crate::zone_stats::{EmphasisStats, ZoneStat};
use crate::TextureInput;

crate::feature::feature_enum! {
    /// NGLDM 的 17 个特征.
    NgldmFeature {
        /// 低依赖强调.
        LowDependenceEmphasis => ("SODN", "low dependence emphasis"),
        /// 高依赖强调.
        HighDependenceEmphasis => ("IMOQ", "high dependence emphasis"),
        /// 低灰度计数强调.
        LowGreyLevelCountEmphasis => ("TL9H", "low grey level count emphasis"),
        /// 高灰度计数强调.
        HighGreyLevelCountEmphasis => ("OAE7", "high grey level count emphasis"),
        /// 低依赖低灰度强调.
        LowDependenceLowGreyLevelEmphasis => ("EQ3F", "low dependence low grey level emphasis"),
        /// 低依赖高灰度强调.
        LowDependenceHighGreyLevelEmphasis => ("JA6D", "low dependence high grey level emphasis"),
        /// 高依赖低灰度强调.
        HighDependenceLowGreyLevelEmphasis => ("NBZI", "high dependence low grey level emphasis"),
        /// 高依赖高灰度强调.
        HighDependenceHighGreyLevelEmphasis => ("9QMG", "high dependence high grey level emphasis"),
        /// 灰度非均匀性.
        GreyLevelNonUniformity => ("FP8K", "grey level non-uniformity"),
        /// 归一化灰度非均匀性.
        NormalisedGreyLevelNonUniformity => ("5SPA", "normalised grey level non-uniformity"),
        /// 依赖数非均匀性.
        DependenceCountNonUniformity => ("Z87G", "dependence count non-uniformity"),
        /// 归一化依赖数非均匀性.
        NormalisedDependenceCountNonUniformity => ("OKJI", "normalised dependence count non-uniformity"),
        /// 依赖数百分比, 在该邻域模型下恒为 1.
        DependenceCountPercentage => ("6XV8", "dependence count percentage"),
        /// 灰度方差.
        GreyLevelVariance => ("1PFV", "grey level variance"),
        /// 依赖数方差.
        DependenceCountVariance => ("DNX2", "dependence count variance"),
        /// 依赖数熵.
        DependenceCountEntropy => ("FCBV", "dependence count entropy"),
        /// 依赖数能量.
        DependenceCountEnergy => ("CAS9", "dependence count energy"),
    }
}

impl NgldmFeature {
    fn stat(&self) -> ZoneStat {
        use NgldmFeature::*;
        match self {
            LowDependenceEmphasis => ZoneStat::Emphasis(0, -2),
            HighDependenceEmphasis => ZoneStat::Emphasis(0, 2),
            LowGreyLevelCountEmphasis => ZoneStat::Emphasis(-2, 0),
            HighGreyLevelCountEmphasis => ZoneStat::Emphasis(2, 0),
            LowDependenceLowGreyLevelEmphasis => ZoneStat::Emphasis(-2, -2),
            LowDependenceHighGreyLevelEmphasis => ZoneStat::Emphasis(2, -2),
            HighDependenceLowGreyLevelEmphasis => ZoneStat::Emphasis(-2, 2),
            HighDependenceHighGreyLevelEmphasis => ZoneStat::Emphasis(2, 2),
            GreyLevelNonUniformity => ZoneStat::GrayNonUniformity,
            NormalisedGreyLevelNonUniformity => ZoneStat::GrayNonUniformityNorm,
            DependenceCountNonUniformity => ZoneStat::ColNonUniformity,
            NormalisedDependenceCountNonUniformity => ZoneStat::ColNonUniformityNorm,
            DependenceCountPercentage => ZoneStat::Percentage,
            GreyLevelVariance => ZoneStat::GrayVariance,
            DependenceCountVariance => ZoneStat::ColVariance,
            DependenceCountEntropy => ZoneStat::Entropy,
            DependenceCountEnergy => ZoneStat::Energy,
        }
    }
}

/// NGLDM 构建参数.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct NgldmParams {
    /// 灰度差容忍度. `0` 表示只有同灰度邻居才计入.
    pub alpha: u16,

    /// 邻域半径 (切比雪夫距离), 至少为 1.
    pub delta: usize,
}

impl Default for NgldmParams {
    fn default() -> Self {
        Self {
            alpha: DEFAULT_ALPHA,
            delta: DEFAULT_DELTA,
        }
    }
}

impl NgldmParams {
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

/// 一次 NGLDM 构建的结果.
#[derive(Debug, Clone)]
pub struct Ngldm {
    raw: Array2<f64>,
    stats: Option<EmphasisStats>,
}

impl Ngldm {
    /// 构建 `input` 的邻域灰度依赖矩阵. 列数为邻域大小加 1.
    pub fn build(input: &TextureInput, params: &NgldmParams) -> TextureResult<Self> {
        params.validate()?;
        let offsets = neighbourhood(params.delta, input.dimensionality(), input.shape());
        let mut raw = Array2::zeros((input.n_bins(), offsets.len() + 1));

        for (pos, level) in input.roi_iter() {
            let dependent = offsets
                .iter()
                .filter_map(|&off| input.level_at(pos, off))
                .filter(|g| g.abs_diff(level) <= params.alpha)
                .count();
            raw[[level as usize - 1, dependent]] += 1.0;
        }
        log::debug!(
            "NGLDM: {} voxels, alpha {}, delta {}",
            input.voxel_count(),
            params.alpha,
            params.delta
        );

        let stats = EmphasisStats::new(&raw, input.voxel_count() as f64);
        Ok(Self { raw, stats })
    }

    /// 原始计数矩阵.
    #[inline]
    pub fn raw(&self) -> &Array2<f64> {
        &self.raw
    }

    /// 归一化矩阵. ROI 为空时返回 `None`.
    #[inline]
    pub fn normalized(&self) -> Option<&Array2<f64>> {
        self.stats.as_ref().map(EmphasisStats::normalized)
    }
}

impl TextureFeatures for Ngldm {
    type Feature = NgldmFeature;
    const FAMILY: Family = Family::Ngldm;

    fn features() -> &'static [NgldmFeature] {
        NgldmFeature::ALL
    }

    fn select(feature: Feature) -> Option<NgldmFeature> {
        match feature {
            Feature::Ngldm(f) => Some(f),
            _ => None,
        }
    }

    fn calculate(&self, feature: NgldmFeature) -> FeatureValue {
        self.stats
            .as_ref()
            .map_or(FeatureValue::NotApplicable, |s| s.stat(feature.stat()).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DiscretizedVolume, RoiMask};
    use ndarray::Array3;

    const ISO: [f64; 3] = [1.0, 1.0, 1.0];

    fn f64_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_uniform_cube() {
        let v = DiscretizedVolume::new(Array3::from_elem((3, 3, 3), 1), 1, ISO).unwrap();
        let m = RoiMask::filled((3, 3, 3), ISO, 1).unwrap();
        let input = TextureInput::new(&v, &m, 1).unwrap();
        let ngldm = Ngldm::build(&input, &NgldmParams::default()).unwrap();

        let raw = ngldm.raw();
        assert_eq!(raw.dim(), (1, 27));
        // 角, 棱, 面心, 体心
        assert_eq!(raw[[0, 7]], 8.0);
        assert_eq!(raw[[0, 11]], 12.0);
        assert_eq!(raw[[0, 17]], 6.0);
        assert_eq!(raw[[0, 26]], 1.0);
        assert_eq!(raw.sum(), 27.0);

        let value = |f| ngldm.calculate(f).value().unwrap();
        assert!(f64_eq(value(NgldmFeature::HighDependenceEmphasis), 4913.0 / 27.0));
        assert!(f64_eq(value(NgldmFeature::DependenceCountPercentage), 1.0));
        let energy = (64.0 + 144.0 + 36.0 + 1.0) / 729.0;
        assert!(f64_eq(value(NgldmFeature::DependenceCountEnergy), energy));
    }

    #[test]
    fn test_alpha_tolerance() {
        let data = Array3::from_shape_vec((1, 1, 3), vec![1, 2, 3]).unwrap();
        let v = DiscretizedVolume::new(data, 3, ISO).unwrap();
        let m = RoiMask::filled((1, 1, 3), ISO, 1).unwrap();
        let input = TextureInput::new(&v, &m, 1).unwrap();

        let exact = Ngldm::build(&input, &NgldmParams::default()).unwrap();
        assert_eq!(exact.raw().dim(), (3, 3));
        assert_eq!(exact.raw().column(0).sum(), 3.0);

        let loose = Ngldm::build(
            &input,
            &NgldmParams {
                alpha: 1,
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(loose.raw()[[0, 1]], 1.0);
        assert_eq!(loose.raw()[[1, 2]], 1.0);
        assert_eq!(loose.raw()[[2, 1]], 1.0);
        assert!(f64_eq(loose.normalized().unwrap().sum(), 1.0));
    }

    #[test]
    fn test_delta_beyond_grid() {
        let data = Array3::from_shape_vec((2, 2, 2), vec![1, 2, 1, 1, 2, 2, 1, 2]).unwrap();
        let v = DiscretizedVolume::new(data, 2, ISO).unwrap();
        let m = RoiMask::filled((2, 2, 2), ISO, 1).unwrap();
        let input = TextureInput::new(&v, &m, 1).unwrap();

        let near = Ngldm::build(&input, &NgldmParams::default()).unwrap();
        let far = Ngldm::build(
            &input,
            &NgldmParams {
                delta: 1000,
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(far.raw().dim(), (2, 27));
        assert_eq!(far.raw(), near.raw());
        assert_eq!(far.calculate_all(), near.calculate_all());
    }

    #[test]
    fn test_empty_and_invalid() {
        let v = DiscretizedVolume::new(Array3::from_elem((1, 2, 2), 1), 1, ISO).unwrap();
        let m = RoiMask::filled((1, 2, 2), ISO, 0).unwrap();
        let input = TextureInput::new(&v, &m, 1).unwrap();
        let ngldm = Ngldm::build(&input, &NgldmParams::default()).unwrap();
        assert!(ngldm.normalized().is_none());
        assert_eq!(ngldm.calculate_code("SODN"), FeatureValue::NotApplicable);

        let params = NgldmParams {
            delta: 0,
            ..Default::default()
        };
        assert!(Ngldm::build(&input, &params).is_err());
    }
}
