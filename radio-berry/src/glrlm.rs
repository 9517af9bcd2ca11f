//! 灰度游程矩阵 (GLRLM).
//!
//! 对每个对称代表方向, 从每个尚未访问的 ROI 体素出发, 沿方向正反两侧
//! 吞并连续的同灰度 ROI 体素, 得到一个游程. 每个体素恰好属于每个方向上的一个游程.

use ndarray::Array2;

use crate::direction::{scan_directions, symmetric_directions, Direction};
use crate::error::TextureResult;
use crate::feature::{Family, Feature, FeatureValue, TextureFeatures};
use crate::glcm::Aggregation;
use crate::zone_stats::{EmphasisStats, ZoneStat};
use crate::TextureInput;

crate::feature::feature_enum! {
    /// GLRLM 的 16 个特征.
    GlrlmFeature {
        /// 短游程强调.
        ShortRunsEmphasis => ("22OV", "short runs emphasis"),
        /// 长游程强调.
        LongRunsEmphasis => ("W4KF", "long runs emphasis"),
        /// 低灰度游程强调.
        LowGreyLevelRunEmphasis => ("V3SW", "low grey level run emphasis"),
        /// 高灰度游程强调.
        HighGreyLevelRunEmphasis => ("G3QZ", "high grey level run emphasis"),
        /// 短游程低灰度强调.
        ShortRunLowGreyLevelEmphasis => ("HTZT", "short run low grey level emphasis"),
        /// 短游程高灰度强调.
        ShortRunHighGreyLevelEmphasis => ("GD3A", "short run high grey level emphasis"),
        /// 长游程低灰度强调.
        LongRunLowGreyLevelEmphasis => ("IVPO", "long run low grey level emphasis"),
        /// 长游程高灰度强调.
        LongRunHighGreyLevelEmphasis => ("3KUM", "long run high grey level emphasis"),
        /// 灰度非均匀性.
        GreyLevelNonUniformity => ("R5YN", "grey level non-uniformity"),
        /// 归一化灰度非均匀性.
        NormalisedGreyLevelNonUniformity => ("OVBL", "normalised grey level non-uniformity"),
        /// 游程长度非均匀性.
        RunLengthNonUniformity => ("W92Y", "run length non-uniformity"),
        /// 归一化游程长度非均匀性.
        NormalisedRunLengthNonUniformity => ("IC23", "normalised run length non-uniformity"),
        /// 游程百分比.
        RunPercentage => ("9ZK5", "run percentage"),
        /// 灰度方差.
        GreyLevelVariance => ("8CE5", "grey level variance"),
        /// 游程长度方差.
        RunLengthVariance => ("SXLW", "run length variance"),
        /// 游程熵.
        RunEntropy => ("HJ9O", "run entropy"),
    }
}

impl GlrlmFeature {
    pub(crate) fn stat(&self) -> ZoneStat {
        use GlrlmFeature::*;
        match self {
            ShortRunsEmphasis => ZoneStat::Emphasis(0, -2),
            LongRunsEmphasis => ZoneStat::Emphasis(0, 2),
            LowGreyLevelRunEmphasis => ZoneStat::Emphasis(-2, 0),
            HighGreyLevelRunEmphasis => ZoneStat::Emphasis(2, 0),
            ShortRunLowGreyLevelEmphasis => ZoneStat::Emphasis(-2, -2),
            ShortRunHighGreyLevelEmphasis => ZoneStat::Emphasis(2, -2),
            LongRunLowGreyLevelEmphasis => ZoneStat::Emphasis(-2, 2),
            LongRunHighGreyLevelEmphasis => ZoneStat::Emphasis(2, 2),
            GreyLevelNonUniformity => ZoneStat::GrayNonUniformity,
            NormalisedGreyLevelNonUniformity => ZoneStat::GrayNonUniformityNorm,
            RunLengthNonUniformity => ZoneStat::ColNonUniformity,
            NormalisedRunLengthNonUniformity => ZoneStat::ColNonUniformityNorm,
            RunPercentage => ZoneStat::Percentage,
            GreyLevelVariance => ZoneStat::GrayVariance,
            RunLengthVariance => ZoneStat::ColVariance,
            RunEntropy => ZoneStat::Entropy,
        }
    }
}

/// GLRLM 构建参数.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct GlrlmParams {
    /// 多方向聚合.
    pub aggregation: Aggregation,
}

/// 统计方向 `direction` 上的所有游程.
///
/// 结果形状为 `(n_bins, 最长边)`, `[g - 1, len - 1]` 为灰度 `g`, 长度 `len` 的游程个数.
pub fn trace_runs(input: &TextureInput, direction: Direction) -> Array2<f64> {
    let (z, h, w) = input.shape();
    let mut matrix = Array2::zeros((input.n_bins(), z.max(h).max(w)));
    let steps = [direction.offset(1), direction.antipode().offset(1)];
    let mut visited = vec![false; input.grid_size()];

    for (seed, level) in input.roi_iter() {
        let seed_idx = input.linear_index(seed);
        if visited[seed_idx] {
            continue;
        }
        visited[seed_idx] = true;

        let mut len = 1usize;
        for &step in steps.iter() {
            let mut cur = seed;
            while let Some(next) = input.shift(cur, step) {
                if input.level(next) != Some(level) {
                    break;
                }
                visited[input.linear_index(next)] = true;
                len += 1;
                cur = next;
            }
        }
        matrix[[level as usize - 1, len - 1]] += 1.0;
    }
    matrix
}

/// 单个方向上的游程矩阵.
#[derive(Debug, Clone)]
pub struct DirectionalGlrlm {
    direction: Direction,
    raw: Array2<f64>,
    stats: Option<EmphasisStats>,
}

impl DirectionalGlrlm {
    fn build(input: &TextureInput, direction: Direction) -> Self {
        let raw = trace_runs(input, direction);
        let stats = EmphasisStats::new(&raw, input.voxel_count() as f64);
        log::trace!("GLRLM {direction}: {} runs", raw.sum());
        Self {
            direction,
            raw,
            stats,
        }
    }

    /// 方向.
    #[inline]
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// 原始游程计数矩阵.
    #[inline]
    pub fn raw(&self) -> &Array2<f64> {
        &self.raw
    }

    /// 归一化矩阵. 全零时返回 `None`.
    #[inline]
    pub fn normalized(&self) -> Option<&Array2<f64>> {
        self.stats.as_ref().map(EmphasisStats::normalized)
    }

    /// 该方向上的单个特征.
    pub fn calculate(&self, feature: GlrlmFeature) -> FeatureValue {
        self.stats
            .as_ref()
            .map_or(FeatureValue::NotApplicable, |s| s.stat(feature.stat()).into())
    }
}

/// 一次 GLRLM 构建的结果.
#[derive(Debug, Clone)]
pub struct Glrlm {
    params: GlrlmParams,
    directions: Vec<DirectionalGlrlm>,
    merged: Option<EmphasisStats>,
}

impl Glrlm {
    /// 构建 `input` 在所有对称代表方向上的游程矩阵.
    pub fn build(input: &TextureInput, params: &GlrlmParams) -> TextureResult<Self> {
        let dirs: Vec<_> = symmetric_directions(input.dimensionality()).collect();
        let directions = scan_directions(dirs, |d| DirectionalGlrlm::build(input, d));

        let merged = match params.aggregation {
            Aggregation::Average => None,
            Aggregation::Merge => {
                let mut valid = 0usize;
                let mut sum: Option<Array2<f64>> = None;
                for d in directions.iter().filter(|d| d.stats.is_some()) {
                    valid += 1;
                    sum = Some(match sum {
                        Some(acc) => acc + &d.raw,
                        None => d.raw.clone(),
                    });
                }
                let population = (input.voxel_count() * valid) as f64;
                sum.and_then(|m| EmphasisStats::new(&m, population))
            }
        };

        log::debug!(
            "GLRLM: {} directions over {} voxels, {:?}",
            directions.len(),
            input.voxel_count(),
            params.aggregation
        );
        Ok(Self {
            params: *params,
            directions,
            merged,
        })
    }

    /// 构建参数.
    #[inline]
    pub fn params(&self) -> &GlrlmParams {
        &self.params
    }

    /// 各方向的矩阵, 按方向编号升序.
    #[inline]
    pub fn directions(&self) -> &[DirectionalGlrlm] {
        &self.directions
    }

    /// `Merge` 聚合下合并后的归一化矩阵.
    #[inline]
    pub fn merged(&self) -> Option<&Array2<f64>> {
        self.merged.as_ref().map(EmphasisStats::normalized)
    }
}

impl TextureFeatures for Glrlm {
    type Feature = GlrlmFeature;
    const FAMILY: Family = Family::Glrlm;

    fn features() -> &'static [GlrlmFeature] {
        GlrlmFeature::ALL
    }

    fn select(feature: Feature) -> Option<GlrlmFeature> {
        match feature {
            Feature::Glrlm(f) => Some(f),
            _ => None,
        }
    }

    fn calculate(&self, feature: GlrlmFeature) -> FeatureValue {
        match self.params.aggregation {
            Aggregation::Average => {
                FeatureValue::mean(self.directions.iter().map(|d| d.calculate(feature)))
            }
            Aggregation::Merge => self
                .merged
                .as_ref()
                .map_or(FeatureValue::NotApplicable, |s| s.stat(feature.stat()).into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Dimensionality;
    use crate::{DiscretizedVolume, RoiMask};
    use ndarray::{array, Array3, Axis};

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

    /// 每个体素恰好属于一个游程: `Σ len · r = N_v`.
    fn covered_voxels(raw: &Array2<f64>) -> f64 {
        raw.sum_axis(Axis(0))
            .iter()
            .enumerate()
            .map(|(j, r)| (j + 1) as f64 * r)
            .sum()
    }

    #[test]
    fn test_horizontal_runs() {
        let (v, m) = fixture();
        let input = TextureInput::new(&v, &m, 1).unwrap();
        let right = Direction::from_components(0, 0, 1).unwrap();
        let raw = trace_runs(&input, right);
        assert_eq!(
            raw,
            array![
                [4.0, 0.0, 0.0, 0.0],
                [3.0, 1.0, 0.0, 0.0],
                [2.0, 1.0, 0.0, 0.0],
                [3.0, 0.0, 0.0, 0.0],
            ]
        );

        let glrlm = Glrlm::build(&input, &GlrlmParams::default()).unwrap();
        let d0 = &glrlm.directions()[0];
        assert_eq!(d0.direction(), right);
        let sre = d0.calculate(GlrlmFeature::ShortRunsEmphasis).value().unwrap();
        assert!(f64_eq(sre, 50.0 / 56.0));
        let rp = d0.calculate(GlrlmFeature::RunPercentage).value().unwrap();
        assert!(f64_eq(rp, 14.0 / 16.0));
        // 非均匀性使用原始矩阵: 行和 [4, 4, 3, 3], N_s = 14
        let glnu = d0.calculate(GlrlmFeature::GreyLevelNonUniformity).value().unwrap();
        assert!(f64_eq(glnu, 50.0 / 14.0));
    }

    #[test]
    fn test_runs_cover_roi() {
        let (v, m) = fixture();
        let input = TextureInput::new(&v, &m, 1).unwrap();
        let volumetric = input.with_dimensionality(Dimensionality::Volumetric);
        for inp in [input, volumetric] {
            let glrlm = Glrlm::build(&inp, &GlrlmParams::default()).unwrap();
            for d in glrlm.directions() {
                assert!(f64_eq(covered_voxels(d.raw()), 16.0));
                let p = d.normalized().unwrap();
                assert!(f64_eq(p.sum(), 1.0));
            }
        }
    }

    #[test]
    fn test_uniform_volume() {
        let v = DiscretizedVolume::new(Array3::from_elem((3, 3, 3), 2), 2, ISO).unwrap();
        let m = RoiMask::filled((3, 3, 3), ISO, 1).unwrap();
        let input = TextureInput::new(&v, &m, 1).unwrap();
        let glrlm = Glrlm::build(&input, &GlrlmParams::default()).unwrap();
        assert_eq!(glrlm.directions().len(), 13);
        // 沿坐标轴: 9 个长度为 3 的游程
        let right = &glrlm.directions()[0];
        assert_eq!(right.raw()[[1, 2]], 9.0);
        assert_eq!(right.raw().sum(), 9.0);
        assert!(glrlm
            .calculate(GlrlmFeature::LowGreyLevelRunEmphasis)
            .value()
            .is_some_and(|x| f64_eq(x, 0.25)));
    }

    #[test]
    fn test_merge_population() {
        let (v, m) = fixture();
        let input = TextureInput::new(&v, &m, 1).unwrap();
        let params = GlrlmParams {
            aggregation: Aggregation::Merge,
        };
        let glrlm = Glrlm::build(&input, &params).unwrap();
        let runs: f64 = glrlm.directions().iter().map(|d| d.raw().sum()).sum();
        let rp = glrlm.calculate(GlrlmFeature::RunPercentage).value().unwrap();
        assert!(f64_eq(rp, runs / (16.0 * 4.0)));
        assert!(f64_eq(glrlm.merged().unwrap().sum(), 1.0));
    }

    #[test]
    fn test_masked_and_empty() {
        let (v, _) = fixture();
        let mut mask = Array3::zeros((1, 4, 4));
        mask[(0, 0, 1)] = 1u8;
        mask[(0, 0, 2)] = 1u8;
        let m = RoiMask::new(mask, ISO).unwrap();
        let input = TextureInput::new(&v, &m, 1).unwrap();
        let glrlm = Glrlm::build(&input, &GlrlmParams::default()).unwrap();
        // 0° 方向上一个长度为 2 的游程, 其余方向两个长度为 1 的游程
        assert_eq!(glrlm.directions()[0].raw()[[1, 1]], 1.0);
        assert_eq!(glrlm.directions()[2].raw()[[1, 0]], 2.0);

        let empty = RoiMask::filled((1, 4, 4), ISO, 0).unwrap();
        let input = TextureInput::new(&v, &empty, 1).unwrap();
        let glrlm = Glrlm::build(&input, &GlrlmParams::default()).unwrap();
        assert!(glrlm
            .calculate_all()
            .iter()
            .all(|(_, v)| v.is_not_applicable()));
    }
}
