//! 灰度区域距离矩阵 (GLDZM).
//!
//! 以全邻接关系标记区域, 以共面邻接关系逐层腐蚀得到边界距离图.
//! 每个区域按其灰度和成员的最小边界距离计入一次.

use ndarray::Array2;

use crate::direction::Connectivity;
use crate::error::TextureResult;
use crate::feature::{Family, Feature, FeatureValue, TextureFeatures};
use crate::zone_stats::{EmphasisStats, ZoneStat};
use crate::TextureInput;

crate::feature::feature_enum! {
    /// GLDZM 的 16 个特征.
    GldzmFeature {
        /// 小距离强调.
        SmallDistanceEmphasis => ("0GBI", "small distance emphasis"),
        /// 大距离强调.
        LargeDistanceEmphasis => ("MB4I", "large distance emphasis"),
        /// 低灰度区域强调.
        LowGreyLevelZoneEmphasis => ("S1RA", "low grey level zone emphasis"),
        /// 高灰度区域强调.
        HighGreyLevelZoneEmphasis => ("K26C", "high grey level zone emphasis"),
        /// 小距离低灰度强调.
        SmallDistanceLowGreyLevelEmphasis => ("RUVG", "small distance low grey level emphasis"),
        /// 小距离高灰度强调.
        SmallDistanceHighGreyLevelEmphasis => ("DKNJ", "small distance high grey level emphasis"),
        /// 大距离低灰度强调.
        LargeDistanceLowGreyLevelEmphasis => ("A7WM", "large distance low grey level emphasis"),
        /// 大距离高灰度强调.
        LargeDistanceHighGreyLevelEmphasis => ("KLTH", "large distance high grey level emphasis"),
        /// 灰度非均匀性.
        GreyLevelNonUniformity => ("VFT7", "grey level non-uniformity"),
        /// 归一化灰度非均匀性.
        NormalisedGreyLevelNonUniformity => ("7HP3", "normalised grey level non-uniformity"),
        /// 区域距离非均匀性.
        ZoneDistanceNonUniformity => ("V294", "zone distance non-uniformity"),
        /// 归一化区域距离非均匀性.
        NormalisedZoneDistanceNonUniformity => ("IATH", "normalised zone distance non-uniformity"),
        /// 区域百分比.
        ZonePercentage => ("VIWW", "zone percentage"),
        /// 灰度方差.
        GreyLevelVariance => ("QK93", "grey level variance"),
        /// 区域距离方差.
        ZoneDistanceVariance => ("7WT1", "zone distance variance"),
        /// 区域距离熵.
        ZoneDistanceEntropy => ("GBDU", "zone distance entropy"),
    }
}

impl GldzmFeature {
    fn stat(&self) -> ZoneStat {
        use GldzmFeature::*;
        match self {
            SmallDistanceEmphasis => ZoneStat::Emphasis(0, -2),
            LargeDistanceEmphasis => ZoneStat::Emphasis(0, 2),
            LowGreyLevelZoneEmphasis => ZoneStat::Emphasis(-2, 0),
            HighGreyLevelZoneEmphasis => ZoneStat::Emphasis(2, 0),
            SmallDistanceLowGreyLevelEmphasis => ZoneStat::Emphasis(-2, -2),
            SmallDistanceHighGreyLevelEmphasis => ZoneStat::Emphasis(2, -2),
            LargeDistanceLowGreyLevelEmphasis => ZoneStat::Emphasis(-2, 2),
            LargeDistanceHighGreyLevelEmphasis => ZoneStat::Emphasis(2, 2),
            GreyLevelNonUniformity => ZoneStat::GrayNonUniformity,
            NormalisedGreyLevelNonUniformity => ZoneStat::GrayNonUniformityNorm,
            ZoneDistanceNonUniformity => ZoneStat::ColNonUniformity,
            NormalisedZoneDistanceNonUniformity => ZoneStat::ColNonUniformityNorm,
            ZonePercentage => ZoneStat::Percentage,
            GreyLevelVariance => ZoneStat::GrayVariance,
            ZoneDistanceVariance => ZoneStat::ColVariance,
            ZoneDistanceEntropy => ZoneStat::Entropy,
        }
    }
}

/// 一次 GLDZM 构建的结果.
#[derive(Debug, Clone)]
pub struct Gldzm {
    raw: Array2<f64>,
    stats: Option<EmphasisStats>,
}

impl Gldzm {
    /// 构建 `input` 的区域距离矩阵.
    ///
    /// 矩阵形状为 `(n_bins, 最大边界距离)`, `[g - 1, d - 1]` 为灰度 `g`,
    /// 最小边界距离 `d` 的区域个数.
    pub fn build(input: &TextureInput) -> TextureResult<Self> {
        let zones = input.zones(Connectivity::Full);
        let dist = input.distance_map();
        let max_dist = dist.iter().copied().max().unwrap_or_default().max(1) as usize;

        let mut raw = Array2::zeros((input.n_bins(), max_dist));
        for zone in zones.iter() {
            let d = zone.min_distance(&dist) as usize;
            raw[[zone.level() as usize - 1, d - 1]] += 1.0;
        }
        log::debug!(
            "GLDZM: {} zones, max distance {max_dist}",
            zones.len()
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

impl TextureFeatures for Gldzm {
    type Feature = GldzmFeature;
    const FAMILY: Family = Family::Gldzm;

    fn features() -> &'static [GldzmFeature] {
        GldzmFeature::ALL
    }

    fn select(feature: Feature) -> Option<GldzmFeature> {
        match feature {
            Feature::Gldzm(f) => Some(f),
            _ => None,
        }
    }

    fn calculate(&self, feature: GldzmFeature) -> FeatureValue {
        self.stats
            .as_ref()
            .map_or(FeatureValue::NotApplicable, |s| s.stat(feature.stat()).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DiscretizedVolume, RoiMask};
    use ndarray::{array, Array3};

    const ISO: [f64; 3] = [1.0, 1.0, 1.0];

    fn f64_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn fixture() -> (DiscretizedVolume, RoiMask) {
        #[rustfmt::skip]
        let data = Array3::from_shape_vec((1, 4, 4), vec![
            1, 2, 2, 3,
            1, 2, 3, 3,
            4, 2, 4, 1,
            4, 1, 2, 3,
        ]).unwrap();
        let v = DiscretizedVolume::new(data, 4, ISO).unwrap();
        let m = RoiMask::filled((1, 4, 4), ISO, 1).unwrap();
        (v, m)
    }

    #[test]
    fn test_fixture_matrix() {
        let (v, m) = fixture();
        let input = TextureInput::new(&v, &m, 1).unwrap();
        let gldzm = Gldzm::build(&input).unwrap();
        // 只有灰度 4 的单体素区域 (2, 2) 位于内部.
        assert_eq!(
            gldzm.raw(),
            &array![[3.0, 0.0], [1.0, 0.0], [2.0, 0.0], [1.0, 1.0]]
        );
        assert!(f64_eq(gldzm.normalized().unwrap().sum(), 1.0));

        let value = |f| gldzm.calculate(f).value().unwrap();
        assert!(f64_eq(value(GldzmFeature::SmallDistanceEmphasis), 29.0 / 32.0));
        assert!(f64_eq(value(GldzmFeature::ZonePercentage), 0.5));
        // 列和 [7, 1], N_s = 8
        assert!(f64_eq(value(GldzmFeature::ZoneDistanceNonUniformity), 50.0 / 8.0));
    }

    #[test]
    fn test_uniform_cube() {
        let v = DiscretizedVolume::new(Array3::from_elem((5, 5, 5), 1), 1, ISO).unwrap();
        let m = RoiMask::filled((5, 5, 5), ISO, 1).unwrap();
        let input = TextureInput::new(&v, &m, 1).unwrap();
        let gldzm = Gldzm::build(&input).unwrap();
        // 一个区域, 最小距离为 1
        assert_eq!(gldzm.raw().dim(), (1, 3));
        assert_eq!(gldzm.raw()[[0, 0]], 1.0);
        assert_eq!(gldzm.raw().sum(), 1.0);
        assert!(gldzm
            .calculate(GldzmFeature::ZonePercentage)
            .value()
            .is_some_and(|x| f64_eq(x, 1.0 / 125.0)));
        assert!(gldzm
            .calculate(GldzmFeature::ZoneDistanceEntropy)
            .value()
            .is_some_and(|x| x.abs() < 1e-9));
    }

    #[test]
    fn test_empty_roi() {
        let (v, _) = fixture();
        let m = RoiMask::filled((1, 4, 4), ISO, 0).unwrap();
        let input = TextureInput::new(&v, &m, 1).unwrap();
        let gldzm = Gldzm::build(&input).unwrap();
        assert!(gldzm.normalized().is_none());
        assert_eq!(
            gldzm.calculate_code("0GBI"),
            FeatureValue::NotApplicable
        );
    }
}
