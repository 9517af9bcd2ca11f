//! 灰度共生矩阵 (GLCM).
//!
//! 对每个对称代表方向 `d`, 统计所有 ROI 内体素对 `(p, p + d·delta)` 的灰度组合,
//! 并同时计入 `(q, p)`, 因此每个方向的原始矩阵都是对称的.
//! 全零的方向 (例如单切片数据上的跨切片方向) 不参与聚合.

mod coeffs;

use ndarray::Array2;

use coeffs::GlcmCoefficients;

use crate::consts::DEFAULT_DELTA;
use crate::direction::{scan_directions, symmetric_directions, Direction};
use crate::error::{TextureError, TextureResult};
use crate::feature::{Family, Feature, FeatureValue, TextureFeatures};
use crate::TextureInput;

crate::feature::feature_enum! {
    /// GLCM 的 25 个特征.
    GlcmFeature {
        /// 联合最大值.
        JointMaximum => ("GYBY", "joint maximum"),
        /// 联合均值.
        JointAverage => ("60VM", "joint average"),
        /// 联合方差.
        JointVariance => ("UR99", "joint variance"),
        /// 联合熵.
        JointEntropy => ("TU9B", "joint entropy"),
        /// 差分均值.
        DifferenceAverage => ("TF7R", "difference average"),
        /// 差分方差.
        DifferenceVariance => ("D3YU", "difference variance"),
        /// 差分熵.
        DifferenceEntropy => ("NTRS", "difference entropy"),
        /// 和均值.
        SumAverage => ("ZGXS", "sum average"),
        /// 和方差.
        SumVariance => ("OEEB", "sum variance"),
        /// 和熵.
        SumEntropy => ("P6QZ", "sum entropy"),
        /// 角二阶矩 (能量).
        AngularSecondMoment => ("8ZQL", "angular second moment"),
        /// 对比度.
        Contrast => ("ACUI", "contrast"),
        /// 相异性.
        Dissimilarity => ("8S9J", "dissimilarity"),
        /// 逆差.
        InverseDifference => ("IB1Z", "inverse difference"),
        /// 归一化逆差.
        NormalisedInverseDifference => ("NDRX", "normalised inverse difference"),
        /// 逆差矩.
        InverseDifferenceMoment => ("WF0Z", "inverse difference moment"),
        /// 归一化逆差矩.
        NormalisedInverseDifferenceMoment => ("1QCO", "normalised inverse difference moment"),
        /// 逆方差.
        InverseVariance => ("E8JP", "inverse variance"),
        /// 相关性.
        Correlation => ("NI2N", "correlation"),
        /// 自相关.
        Autocorrelation => ("QWB0", "autocorrelation"),
        /// 聚类趋势.
        ClusterTendency => ("DG8W", "cluster tendency"),
        /// 聚类阴影.
        ClusterShade => ("7NFM", "cluster shade"),
        /// 聚类显著性.
        ClusterProminence => ("AE86", "cluster prominence"),
        /// 第一信息相关度.
        InformationCorrelation1 => ("R8DG", "information correlation 1"),
        /// 第二信息相关度.
        InformationCorrelation2 => ("JN9H", "information correlation 2"),
    }
}

/// 距离加权方式. 权重为 `exp(-d²)`, `d` 为物理偏移向量的范数.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Weighting {
    /// 不加权.
    #[default]
    None,

    /// 曼哈顿距离.
    Manhattan,

    /// 欧氏距离.
    Euclidean,

    /// 切比雪夫距离.
    Chebyshev,
}

impl Weighting {
    /// 物理偏移向量 `v` (毫米) 对应的权重.
    pub fn weight(&self, v: [f64; 3]) -> f64 {
        let d = match self {
            Self::None => return 1.0,
            Self::Manhattan => v.iter().map(|x| x.abs()).sum::<f64>(),
            Self::Euclidean => v.iter().map(|x| x * x).sum::<f64>().sqrt(),
            Self::Chebyshev => v.iter().fold(0.0, |m: f64, x| m.max(x.abs())),
        };
        (-d * d).exp()
    }
}

/// 多方向聚合方式.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Aggregation {
    /// 每个方向单独计算特征, 再对非退化方向取平均.
    #[default]
    Average,

    /// 先把各方向的 (加权) 原始矩阵相加, 再归一化并计算一次特征.
    Merge,
}

/// GLCM 构建参数.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct GlcmParams {
    /// 体素对之间的步数, 至少为 1.
    pub delta: usize,

    /// 距离加权.
    pub weighting: Weighting,

    /// 多方向聚合.
    pub aggregation: Aggregation,
}

impl Default for GlcmParams {
    fn default() -> Self {
        Self {
            delta: DEFAULT_DELTA,
            weighting: Weighting::default(),
            aggregation: Aggregation::default(),
        }
    }
}

impl GlcmParams {
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

/// 统计方向 `direction` 上步长 `delta` 的体素对, **不含** 对称项.
///
/// 结果的 `[g1 - 1, g2 - 1]` 为满足 `level(p) = g1`, `level(p + d·delta) = g2`
/// 且两者都在 ROI 内的 `p` 的个数.
pub fn count_pairs(input: &TextureInput, direction: Direction, delta: usize) -> Array2<f64> {
    let ng = input.n_bins();
    let offset = direction.offset(delta);
    let mut counts = Array2::zeros((ng, ng));
    for (pos, g1) in input.roi_iter() {
        if let Some(g2) = input.level_at(pos, offset) {
            counts[[g1 as usize - 1, g2 as usize - 1]] += 1.0;
        }
    }
    counts
}

/// 单个方向上的共生矩阵.
#[derive(Debug, Clone)]
pub struct DirectionalGlcm {
    direction: Direction,
    raw: Array2<f64>,
    weight: f64,
    coeffs: Option<GlcmCoefficients>,
}

impl DirectionalGlcm {
    fn build(input: &TextureInput, direction: Direction, params: &GlcmParams) -> Self {
        let counts = count_pairs(input, direction, params.delta);
        let raw = &counts + &counts.t();
        let weight = params
            .weighting
            .weight(direction.physical_offset(params.delta, input.spacing()));
        let coeffs = GlcmCoefficients::new(&raw);
        log::trace!("GLCM {direction}: {} pairs, weight {weight:.4}", raw.sum());
        Self {
            direction,
            raw,
            weight,
            coeffs,
        }
    }

    /// 方向.
    #[inline]
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// 对称化后的原始计数矩阵 (未加权).
    #[inline]
    pub fn raw(&self) -> &Array2<f64> {
        &self.raw
    }

    /// 该方向的距离权重.
    #[inline]
    pub fn weight(&self) -> f64 {
        self.weight
    }

    /// 归一化矩阵. 退化方向返回 `None`.
    #[inline]
    pub fn normalized(&self) -> Option<&Array2<f64>> {
        self.coeffs.as_ref().map(GlcmCoefficients::normalized)
    }

    /// 原始矩阵是否全为零?
    #[inline]
    pub fn is_degenerate(&self) -> bool {
        self.coeffs.is_none()
    }

    /// 该方向上的单个特征. 退化方向返回 [`FeatureValue::NotApplicable`].
    pub fn calculate(&self, feature: GlcmFeature) -> FeatureValue {
        self.coeffs
            .as_ref()
            .map_or(FeatureValue::NotApplicable, |c| c.calculate(feature))
    }
}

/// 一次 GLCM 构建的结果.
#[derive(Debug, Clone)]
pub struct Glcm {
    params: GlcmParams,
    directions: Vec<DirectionalGlcm>,
    merged: Option<GlcmCoefficients>,
}

impl Glcm {
    /// 构建 `input` 在所有对称代表方向上的共生矩阵.
    ///
    /// # 错误
    ///
    /// 参数不合法时返回 [`TextureError::InvalidParameter`].
    pub fn build(input: &TextureInput, params: &GlcmParams) -> TextureResult<Self> {
        params.validate()?;
        let dirs: Vec<_> = symmetric_directions(input.dimensionality()).collect();
        let directions = scan_directions(dirs, |d| DirectionalGlcm::build(input, d, params));

        let merged = match params.aggregation {
            Aggregation::Average => None,
            Aggregation::Merge => {
                let ng = input.n_bins();
                let sum = directions
                    .iter()
                    .fold(Array2::zeros((ng, ng)), |acc, d| acc + &d.raw * d.weight);
                GlcmCoefficients::new(&sum)
            }
        };

        let valid = directions.iter().filter(|d| !d.is_degenerate()).count();
        log::debug!(
            "GLCM: {valid}/{} non-degenerate directions, delta {}, {:?}",
            directions.len(),
            params.delta,
            params.aggregation
        );
        if valid == 0 && !input.is_empty() {
            log::warn!("GLCM: every direction is degenerate");
        }
        Ok(Self {
            params: *params,
            directions,
            merged,
        })
    }

    /// 构建参数.
    #[inline]
    pub fn params(&self) -> &GlcmParams {
        &self.params
    }

    /// 各方向的矩阵, 按方向编号升序 (包括退化方向).
    #[inline]
    pub fn directions(&self) -> &[DirectionalGlcm] {
        &self.directions
    }

    /// 非退化方向个数.
    pub fn valid_direction_count(&self) -> usize {
        self.directions.iter().filter(|d| !d.is_degenerate()).count()
    }

    /// `Merge` 聚合下合并后的归一化矩阵. 其它聚合方式或全部退化时返回 `None`.
    #[inline]
    pub fn merged(&self) -> Option<&Array2<f64>> {
        self.merged.as_ref().map(GlcmCoefficients::normalized)
    }
}

impl TextureFeatures for Glcm {
    type Feature = GlcmFeature;
    const FAMILY: Family = Family::Glcm;

    fn features() -> &'static [GlcmFeature] {
        GlcmFeature::ALL
    }

    fn select(feature: Feature) -> Option<GlcmFeature> {
        match feature {
            Feature::Glcm(f) => Some(f),
            _ => None,
        }
    }

    fn calculate(&self, feature: GlcmFeature) -> FeatureValue {
        match self.params.aggregation {
            Aggregation::Average => FeatureValue::mean(
                self.directions
                    .iter()
                    .filter(|d| !d.is_degenerate())
                    .map(|d| d.calculate(feature)),
            ),
            Aggregation::Merge => self
                .merged
                .as_ref()
                .map_or(FeatureValue::NotApplicable, |c| c.calculate(feature)),
        }
    }
}
