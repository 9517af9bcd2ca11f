//! 特征值类型, 特征枚举与共享目录.
//!
//! 每个矩阵族在各自模块中用 [`feature_enum!`] 定义一个封闭的特征枚举,
//! 每个变体带有 IBSI 的短字母数字编码. [`Feature`] 把它们汇总为一个目录,
//! 以便按编码查找.

mod catalog;

pub use catalog::{Family, Feature};

/// 单个特征的计算结果.
///
/// 三种状态互不混淆: 成功计算的数值, 对该输入不适用 (空 ROI, 全零矩阵,
/// 未知编码), 以及数值上无定义 (例如分母为零的比值).
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum FeatureValue {
    /// 成功计算的数值.
    Value(f64),

    /// 对该输入不适用.
    NotApplicable,

    /// 数值上无定义.
    Undefined,
}

impl FeatureValue {
    /// 若为数值则返回 `Some`, 否则返回 `None` (由上层作为缺失值处理).
    #[inline]
    pub fn value(&self) -> Option<f64> {
        match self {
            Self::Value(v) => Some(*v),
            _ => None,
        }
    }

    /// 是否为数值.
    #[inline]
    pub fn is_value(&self) -> bool {
        matches!(self, Self::Value(_))
    }

    /// 是否为 "不适用".
    #[inline]
    pub fn is_not_applicable(&self) -> bool {
        matches!(self, Self::NotApplicable)
    }

    /// 是否为 "数值上无定义".
    #[inline]
    pub fn is_undefined(&self) -> bool {
        matches!(self, Self::Undefined)
    }

    /// `num / den`. 分母为零时返回 [`FeatureValue::Undefined`].
    #[inline]
    pub fn ratio(num: f64, den: f64) -> Self {
        if den == 0.0 {
            Self::Undefined
        } else {
            Self::Value(num / den)
        }
    }

    /// 按方向聚合: 对所有数值取算术平均.
    ///
    /// 没有任何数值时, 若存在 `Undefined` 则结果为 `Undefined`, 否则为 `NotApplicable`.
    pub fn mean<I: IntoIterator<Item = FeatureValue>>(it: I) -> Self {
        let (mut sum, mut count, mut undefined) = (0.0, 0usize, false);
        for v in it {
            match v {
                Self::Value(x) => {
                    sum += x;
                    count += 1;
                }
                Self::Undefined => undefined = true,
                Self::NotApplicable => {}
            }
        }
        match (count, undefined) {
            (0, true) => Self::Undefined,
            (0, false) => Self::NotApplicable,
            _ => Self::Value(sum / count as f64),
        }
    }
}

impl From<f64> for FeatureValue {
    #[inline]
    fn from(value: f64) -> Self {
        Self::Value(value)
    }
}

/// 定义一个矩阵族的特征枚举, 每个变体附带 IBSI 编码和可读名称.
macro_rules! feature_enum {
    (
        $(#[$meta: meta])*
        $name: ident {
            $($(#[$vmeta: meta])* $variant: ident => ($code: literal, $text: literal),)+
        }
    ) => {
        $(#[$meta])*
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
        pub enum $name {
            $($(#[$vmeta])* $variant,)+
        }

        impl $name {
            /// 全部特征, 按定义顺序.
            pub const ALL: &'static [$name] = &[$($name::$variant,)+];

            /// IBSI 编码.
            pub const fn code(&self) -> &'static str {
                match self {
                    $($name::$variant => $code,)+
                }
            }

            /// 可读名称.
            pub const fn name(&self) -> &'static str {
                match self {
                    $($name::$variant => $text,)+
                }
            }
        }
    };
}

pub(crate) use feature_enum;

/// 纹理矩阵构建结果的共同接口.
pub trait TextureFeatures {
    /// 该矩阵族的特征枚举.
    type Feature: Copy + 'static;

    /// 该矩阵族.
    const FAMILY: Family;

    /// 该矩阵族的全部特征.
    fn features() -> &'static [Self::Feature];

    /// 从目录条目中取出本族特征. 其它族返回 `None`.
    fn select(feature: Feature) -> Option<Self::Feature>;

    /// 计算单个特征.
    fn calculate(&self, feature: Self::Feature) -> FeatureValue;

    /// 按 IBSI 编码计算单个特征. 未知编码或其它族的编码返回
    /// [`FeatureValue::NotApplicable`].
    fn calculate_code(&self, code: &str) -> FeatureValue {
        Feature::from_code(code)
            .and_then(Self::select)
            .map_or(FeatureValue::NotApplicable, |f| self.calculate(f))
    }

    /// 计算本族全部特征, 按定义顺序.
    fn calculate_all(&self) -> Vec<(Self::Feature, FeatureValue)> {
        Self::features()
            .iter()
            .map(|&f| (f, self.calculate(f)))
            .collect()
    }
}
