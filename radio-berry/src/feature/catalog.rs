use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::gldzm::GldzmFeature;
use crate::glcm::GlcmFeature;
use crate::glrlm::GlrlmFeature;
use crate::glszm::GlszmFeature;
use crate::ngldm::NgldmFeature;
use crate::ngtdm::NgtdmFeature;

/// 纹理矩阵族.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Family {
    /// 灰度共生矩阵.
    Glcm,

    /// 灰度游程矩阵.
    Glrlm,

    /// 灰度区域距离矩阵.
    Gldzm,

    /// 灰度区域大小矩阵.
    Glszm,

    /// 邻域灰度差矩阵.
    Ngtdm,

    /// 邻域灰度依赖矩阵.
    Ngldm,
}

impl Family {
    /// IBSI 族编码.
    pub const fn code(&self) -> &'static str {
        match self {
            Family::Glcm => "LFYI",
            Family::Glrlm => "TP0I",
            Family::Gldzm => "VMDZ",
            Family::Glszm => "9SAK",
            Family::Ngtdm => "IPET",
            Family::Ngldm => "REK0",
        }
    }
}

/// 共享特征目录中的一个条目.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Feature {
    /// GLCM 特征.
    Glcm(GlcmFeature),

    /// GLRLM 特征.
    Glrlm(GlrlmFeature),

    /// GLDZM 特征.
    Gldzm(GldzmFeature),

    /// GLSZM 特征.
    Glszm(GlszmFeature),

    /// NGTDM 特征.
    Ngtdm(NgtdmFeature),

    /// NGLDM 特征.
    Ngldm(NgldmFeature),
}

/// 编码 -> 特征.
static CATALOG: Lazy<HashMap<&'static str, Feature>> = Lazy::new(|| {
    let catalog: HashMap<_, _> = Feature::iter().map(|f| (f.code(), f)).collect();
    debug_assert_eq!(catalog.len(), Feature::iter().count(), "特征编码重复");
    catalog
});

impl Feature {
    /// 按 IBSI 编码查找特征. 未知编码返回 `None`.
    #[inline]
    pub fn from_code(code: &str) -> Option<Feature> {
        CATALOG.get(code).copied()
    }

    /// 按族和可读名称查找特征, 名称不区分大小写.
    pub fn from_name(family: Family, name: &str) -> Option<Feature> {
        Feature::iter().find(|f| f.family() == family && f.name().eq_ignore_ascii_case(name))
    }

    /// 迭代目录中的全部特征, 按族依次排列.
    pub fn iter() -> impl Iterator<Item = Feature> {
        let glcm = GlcmFeature::ALL.iter().copied().map(Feature::Glcm);
        let glrlm = GlrlmFeature::ALL.iter().copied().map(Feature::Glrlm);
        let gldzm = GldzmFeature::ALL.iter().copied().map(Feature::Gldzm);
        let glszm = GlszmFeature::ALL.iter().copied().map(Feature::Glszm);
        let ngtdm = NgtdmFeature::ALL.iter().copied().map(Feature::Ngtdm);
        let ngldm = NgldmFeature::ALL.iter().copied().map(Feature::Ngldm);
        glcm.chain(glrlm)
            .chain(gldzm)
            .chain(glszm)
            .chain(ngtdm)
            .chain(ngldm)
    }

    /// 所属矩阵族.
    pub const fn family(&self) -> Family {
        match self {
            Feature::Glcm(_) => Family::Glcm,
            Feature::Glrlm(_) => Family::Glrlm,
            Feature::Gldzm(_) => Family::Gldzm,
            Feature::Glszm(_) => Family::Glszm,
            Feature::Ngtdm(_) => Family::Ngtdm,
            Feature::Ngldm(_) => Family::Ngldm,
        }
    }

    /// IBSI 编码.
    pub const fn code(&self) -> &'static str {
        match self {
            Feature::Glcm(f) => f.code(),
            Feature::Glrlm(f) => f.code(),
            Feature::Gldzm(f) => f.code(),
            Feature::Glszm(f) => f.code(),
            Feature::Ngtdm(f) => f.code(),
            Feature::Ngldm(f) => f.code(),
        }
    }

    /// 可读名称.
    pub const fn name(&self) -> &'static str {
        match self {
            Feature::Glcm(f) => f.name(),
            Feature::Glrlm(f) => f.name(),
            Feature::Gldzm(f) => f.name(),
            Feature::Glszm(f) => f.name(),
            Feature::Ngtdm(f) => f.name(),
            Feature::Ngldm(f) => f.name(),
        }
    }
}
