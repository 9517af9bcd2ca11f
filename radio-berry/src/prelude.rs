//! 🍇欢迎光临🍓
//!
//! 涵盖了本 crate 一系列常用的功能.

pub use crate::{Idx3d, Offset3d};

pub use crate::{DiscretizedVolume, Dimensionality, RoiMask, TextureInput, VoxelGrid};
pub use crate::{TextureError, TextureResult};
pub use crate::{Family, Feature, FeatureValue, TextureFeatures};

pub use crate::consts::label::{ROI_BACKGROUND, ROI_DEFAULT};

pub use crate::direction::{Connectivity, Direction};
pub use crate::morph::{distance_map, label_zones, Zone};

pub use crate::glcm::{Aggregation, Glcm, GlcmFeature, GlcmParams, Weighting};
pub use crate::gldzm::{Gldzm, GldzmFeature};
pub use crate::glrlm::{Glrlm, GlrlmFeature, GlrlmParams};
pub use crate::glszm::{Glszm, GlszmFeature};
pub use crate::ngldm::{Ngldm, NgldmFeature, NgldmParams};
pub use crate::ngtdm::{Ngtdm, NgtdmFeature, NgtdmParams};
