//! 单个归一化共生矩阵上的系数与 25 个特征.

use ndarray::{Array2, Axis};

use super::GlcmFeature;
use crate::consts::LOG_EPSILON;
use crate::FeatureValue;

/// `-Σ p log2(p + ε)`, 跳过零项. `ε` 会让单点分布得到极小的负值, 截断到 0.
fn entropy<'a, I: IntoIterator<Item = &'a f64>>(it: I) -> f64 {
    let h = -it
        .into_iter()
        .filter(|p| **p > 0.0)
        .map(|p| p * (p + LOG_EPSILON).log2())
        .sum::<f64>();
    h.max(0.0)
}

/// 一个归一化共生矩阵及其一次性计算出的系数.
///
/// 灰度 `i`, `j` 从 1 开始, 第 `k` 行/列代表灰度 `k + 1`.
#[derive(Debug, Clone)]
pub(crate) struct GlcmCoefficients {
    p: Array2<f64>,

    /// `p_{x+y}(k)`, 下标 `k - 2`, `k ∈ [2, 2 N_g]`.
    p_sum: Vec<f64>,

    /// `p_{x-y}(k)`, `k ∈ [0, N_g)`.
    p_diff: Vec<f64>,

    mu_x: f64,
    mu_y: f64,
    sigma_x: f64,
    sigma_y: f64,
    hx: f64,
    hy: f64,
    hxy: f64,
    hxy1: f64,
    hxy2: f64,
}

impl GlcmCoefficients {
    /// 对原始矩阵归一化并计算系数. 原始矩阵全为零时返回 `None`.
    pub fn new(raw: &Array2<f64>) -> Option<Self> {
        let total = raw.sum();
        if total <= 0.0 {
            return None;
        }
        let p = raw / total;
        let ng = p.nrows();

        let px = p.sum_axis(Axis(1)).to_vec();
        let py = p.sum_axis(Axis(0)).to_vec();
        let mut p_sum = vec![0.0; 2 * ng - 1];
        let mut p_diff = vec![0.0; ng];
        for ((i, j), &v) in p.indexed_iter() {
            p_sum[i + j] += v;
            p_diff[i.abs_diff(j)] += v;
        }

        let moment = |m: &[f64]| -> (f64, f64) {
            let mu: f64 = m.iter().enumerate().map(|(k, v)| (k + 1) as f64 * v).sum();
            let var: f64 = m
                .iter()
                .enumerate()
                .map(|(k, v)| ((k + 1) as f64 - mu).powi(2) * v)
                .sum();
            (mu, var.sqrt())
        };
        let (mu_x, sigma_x) = moment(&px[..]);
        let (mu_y, sigma_y) = moment(&py[..]);

        let hx = entropy(&px);
        let hy = entropy(&py);
        let hxy = entropy(p.iter());
        let (mut hxy1, mut hxy2) = (0.0, 0.0);
        for ((i, j), &v) in p.indexed_iter() {
            let prod = px[i] * py[j];
            let log_prod = (prod + LOG_EPSILON).log2();
            hxy1 -= v * log_prod;
            hxy2 -= prod * log_prod;
        }

        Some(Self {
            p,
            p_sum,
            p_diff,
            mu_x,
            mu_y,
            sigma_x,
            sigma_y,
            hx,
            hy,
            hxy,
            hxy1,
            hxy2,
        })
    }

    /// 归一化矩阵.
    #[inline]
    pub fn normalized(&self) -> &Array2<f64> {
        &self.p
    }

    /// `Σ f(i, j) p_ij`, `i`, `j` 从 1 开始.
    fn weighted<F: Fn(f64, f64) -> f64>(&self, f: F) -> f64 {
        self.p
            .indexed_iter()
            .filter(|(_, v)| **v != 0.0)
            .map(|((i, j), &v)| f((i + 1) as f64, (j + 1) as f64) * v)
            .sum()
    }

    fn sum_average(&self) -> f64 {
        self.p_sum
            .iter()
            .enumerate()
            .map(|(k, v)| (k + 2) as f64 * v)
            .sum()
    }

    fn diff_average(&self) -> f64 {
        self.p_diff.iter().enumerate().map(|(k, v)| k as f64 * v).sum()
    }

    /// 计算单个特征.
    pub fn calculate(&self, feature: GlcmFeature) -> FeatureValue {
        use GlcmFeature::*;

        let ng = self.p.nrows() as f64;
        match feature {
            JointMaximum => self.p.iter().copied().fold(0.0, f64::max).into(),
            JointAverage => self.mu_x.into(),
            JointVariance => {
                let mu = self.mu_x;
                self.weighted(|i, _| (i - mu).powi(2)).into()
            }
            JointEntropy => self.hxy.into(),
            DifferenceAverage => self.diff_average().into(),
            DifferenceVariance => {
                let mu = self.diff_average();
                self.p_diff
                    .iter()
                    .enumerate()
                    .map(|(k, v)| (k as f64 - mu).powi(2) * v)
                    .sum::<f64>()
                    .into()
            }
            DifferenceEntropy => entropy(&self.p_diff).into(),
            SumAverage => self.sum_average().into(),
            SumVariance => {
                let mu = self.sum_average();
                self.p_sum
                    .iter()
                    .enumerate()
                    .map(|(k, v)| ((k + 2) as f64 - mu).powi(2) * v)
                    .sum::<f64>()
                    .into()
            }
            SumEntropy => entropy(&self.p_sum).into(),
            AngularSecondMoment => self.p.iter().map(|v| v * v).sum::<f64>().into(),
            Contrast => self.weighted(|i, j| (i - j).powi(2)).into(),
            Dissimilarity => self.weighted(|i, j| (i - j).abs()).into(),
            InverseDifference => self.weighted(|i, j| 1.0 / (1.0 + (i - j).abs())).into(),
            NormalisedInverseDifference => {
                self.weighted(|i, j| 1.0 / (1.0 + (i - j).abs() / ng)).into()
            }
            InverseDifferenceMoment => {
                self.weighted(|i, j| 1.0 / (1.0 + (i - j).powi(2))).into()
            }
            NormalisedInverseDifferenceMoment => self
                .weighted(|i, j| 1.0 / (1.0 + (i - j).powi(2) / (ng * ng)))
                .into(),
            InverseVariance => self
                .weighted(|i, j| if i == j { 0.0 } else { 1.0 / (i - j).powi(2) })
                .into(),
            Correlation => {
                let (mx, my) = (self.mu_x, self.mu_y);
                let cov = self.weighted(|i, j| (i - mx) * (j - my));
                FeatureValue::ratio(cov, self.sigma_x * self.sigma_y)
            }
            Autocorrelation => self.weighted(|i, j| i * j).into(),
            ClusterTendency => {
                let mu = self.mu_x + self.mu_y;
                self.weighted(|i, j| (i + j - mu).powi(2)).into()
            }
            ClusterShade => {
                let mu = self.mu_x + self.mu_y;
                self.weighted(|i, j| (i + j - mu).powi(3)).into()
            }
            ClusterProminence => {
                let mu = self.mu_x + self.mu_y;
                self.weighted(|i, j| (i + j - mu).powi(4)).into()
            }
            InformationCorrelation1 => {
                let den = self.hx.max(self.hy);
                if den <= LOG_EPSILON {
                    FeatureValue::Undefined
                } else {
                    FeatureValue::ratio(self.hxy - self.hxy1, den)
                }
            }
            InformationCorrelation2 => {
                let arg = (self.hxy2 - self.hxy).max(0.0);
                (1.0 - (-2.0 * arg).exp()).sqrt().into()
            }
        }
    }
}
