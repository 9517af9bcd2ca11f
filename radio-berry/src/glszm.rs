//! 灰度区域大小矩阵 (GLSZM).

use ndarray::Array2;

use crate::direction::Connectivity;
use crate::error::TextureResult;
use crate::feature::{Family, Feature, FeatureValue, TextureFeatures};
use crate::zone_stats::{EmphasisStats, ZoneStat};
use crate::TextureInput;

crate::feature::feature_enum! {
    /// GLSZM 的 16 个特征.
    GlszmFeature {
        /// 小区域强调.
        SmallZoneEmphasis => ("5QRC", "small zone emphasis"),
        /// 大区域强调.
        LargeZoneEmphasis => ("48P8", "large zone emphasis"),
        /// 低灰度区域强调.
        LowGreyLevelZoneEmphasis => ("XMSY", "low grey level zone emphasis"),
        /// 高灰度区域强调.
        HighGreyLevelZoneEmphasis => ("5GN9", "high grey level zone emphasis"),
        /// 小区域低灰度强调.
        SmallZoneLowGreyLevelEmphasis => ("5RAI", "small zone low grey level emphasis"),
        /// 小区域高灰度强调.
        SmallZoneHighGreyLevelEmphasis => ("HW1V", "small zone high grey level emphasis"),
        /// 大区域低灰度强调.
        LargeZoneLowGreyLevelEmphasis => ("YH51", "large zone low grey level emphasis"),
        /// 大区域高灰度强调.
        LargeZoneHighGreyLevelEmphasis => ("J17V", "large zone high grey level emphasis"),
        /// 灰度非均匀性.
        GreyLevelNonUniformity => ("JNSA", "grey level non-uniformity"),
        /// 归一化灰度非均匀性.
        NormalisedGreyLevelNonUniformity => ("Y1RO", "normalised grey level non-uniformity"),
        /// 区域大小非均匀性.
        ZoneSizeNonUniformity => ("4JP3", "zone size non-uniformity"),
        /// 归一化区域大小非均匀性.
        NormalisedZoneSizeNonUniformity => ("VB3A", "normalised zone size non-uniformity"),
        /// 区域百分比.
        ZonePercentage => ("P30P", "zone percentage"),
        /// 灰度方差.
        GreyLevelVariance => ("BYLV", "grey level variance"),
        /// 区域大小方差.
        ZoneSizeVariance => ("3NSA", "zone size variance"),
        /// 区域大小熵.
        ZoneSizeEntropy => ("GU8N", "zone size entropy"),
    }
}

impl GlszmFeature {
    fn stat(&self) -> ZoneStat {
        use GlszmFeature::*;
        match self {
            SmallZoneEmphasis => ZoneStat::Emphasis(0, -2),
            LargeZoneEmphasis => ZoneStat::Emphasis(0, 2),
            LowGreyLevelZoneEmphasis => ZoneStat::Emphasis(-2, 0),
            HighGreyLevelZoneEmphasis => ZoneStat::Emphasis(2, 0),
            SmallZoneLowGreyLevelEmphasis => ZoneStat::Emphasis(-2, -2),
            SmallZoneHighGreyLevelEmphasis => ZoneStat::Emphasis(2, -2),
            LargeZoneLowGreyLevelEmphasis => ZoneStat::Emphasis(-2, 2),
            LargeZoneHighGreyLevelEmphasis => ZoneStat::Emphasis(2, 2),
            GreyLevelNonUniformity => ZoneStat::GrayNonUniformity,
            NormalisedGreyLevelNonUniformity => ZoneStat::GrayNonUniformityNorm,
            ZoneSizeNonUniformity => ZoneStat::ColNonUniformity,
            NormalisedZoneSizeNonUniformity => ZoneStat::ColNonUniformityNorm,
            ZonePercentage => ZoneStat::Percentage,
            GreyLevelVariance => ZoneStat::GrayVariance,
            ZoneSizeVariance => ZoneStat::ColVariance,
            ZoneSizeEntropy => ZoneStat::Entropy,
        }
    }
}

/// 一次 GLSZM 构建的结果.
#[derive(Debug, Clone)]
pub struct Glszm {
    raw: Array2<f64>,
    stats: Option<EmphasisStats>,
}

impl Glszm {
    /// 构建 `input` 的区域大小矩阵. `[g - 1, s - 1]` 为灰度 `g`, 大小 `s` 的区域个数.
    pub fn build(input: &TextureInput) -> TextureResult<Self> {
        let zones = input.zones(Connectivity::Full);
        let max_size = zones.iter().map(|z| z.size()).max().unwrap_or(1);

        let mut raw = Array2::zeros((input.n_bins(), max_size));
        for zone in zones.iter() {
            raw[[zone.level() as usize - 1, zone.size() - 1]] += 1.0;
        }
        log::debug!("GLSZM: {} zones, largest {max_size}", zones.len());

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

impl TextureFeatures for Glszm {
    type Feature = GlszmFeature;
    const FAMILY: Family = Family::Glszm;

    fn features() -> &'static [GlszmFeature] {
        GlszmFeature::ALL
    }

    fn select(feature: Feature) -> Option<GlszmFeature> {
        match feature {
            Feature::Glszm(f) => Some(f),
            _ => None,
        }
    }

    fn calculate(&self, feature: GlszmFeature) -> FeatureValue {
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

    #[test]
    fn test_fixture_matrix() {
        #[rustfmt::skip]
        let data = Array3::from_shape_vec((1, 4, 4), vec![
            1, 2, 2, 3,
            1, 2, 3, 3,
            4, 2, 4, 1,
            4, 1, 2, 3,
        ]).unwrap();
        let v = DiscretizedVolume::new(data, 4, ISO).unwrap();
        let m = RoiMask::filled((1, 4, 4), ISO, 1).unwrap();
        let input = TextureInput::new(&v, &m, 1).unwrap();
        let glszm = Glszm::build(&input).unwrap();
        assert_eq!(
            glszm.raw(),
            &array![
                [2.0, 1.0, 0.0, 0.0, 0.0],
                [0.0, 0.0, 0.0, 0.0, 1.0],
                [1.0, 0.0, 1.0, 0.0, 0.0],
                [1.0, 1.0, 0.0, 0.0, 0.0],
            ]
        );

        let value = |f| glszm.calculate(f).value().unwrap();
        let sze = (2.0 + 0.25 + 1.0 / 25.0 + 1.0 + 1.0 / 9.0 + 1.0 + 0.25) / 8.0;
        assert!(f64_eq(value(GlszmFeature::SmallZoneEmphasis), sze));
        assert!(f64_eq(value(GlszmFeature::ZonePercentage), 0.5));
        // 行和 [3, 1, 2, 2]
        assert!(f64_eq(value(GlszmFeature::GreyLevelNonUniformity), 18.0 / 8.0));
    }

    #[test]
    fn test_zone_sizes_cover_roi() {
        let data = Array3::from_shape_fn((4, 5, 6), |(z, h, w)| ((z + 2 * h + w) % 3 + 1) as u16);
        let v = DiscretizedVolume::new(data, 3, ISO).unwrap();
        let m = RoiMask::filled((4, 5, 6), ISO, 1).unwrap();
        let input = TextureInput::new(&v, &m, 1).unwrap();
        let glszm = Glszm::build(&input).unwrap();
        let covered: f64 = glszm
            .raw()
            .indexed_iter()
            .map(|((_, s), n)| (s + 1) as f64 * n)
            .sum();
        assert!(f64_eq(covered, 120.0));
        assert!(f64_eq(glszm.normalized().unwrap().sum(), 1.0));
    }
}
