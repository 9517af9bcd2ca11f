use std::ops::Index;

use ndarray::{Array3, ArrayView3};

use crate::consts::label::{is_target, OUTSIDE_ROI_LEVEL};
use crate::error::{TextureError, TextureResult};
use crate::{Idx3d, Offset3d};

mod iter;

pub use iter::PosIter;

/// 三维体素网格的共用属性和部分通用操作.
///
/// 所有网格均按 `(z, h, w)` 组织: `z` 为相邻切片方向, `h` 为自然图像的垂直方向
/// (向下增长), `w` 为自然图像的水平方向 (向右增长).
pub trait VoxelGrid {
    /// 获取数据形状大小.
    fn shape(&self) -> Idx3d;

    /// 获取单个体素分辨率. 该分辨率以毫米为单位, 分别代表空间 (相邻切片方向),
    /// 高 (自然图像的垂直方向), 宽 (自然图像的水平方向).
    fn spacing(&self) -> [f64; 3];

    /// 获取水平切片个数.
    #[inline]
    fn len_z(&self) -> usize {
        self.shape().0
    }

    /// 获取数据体素个数.
    #[inline]
    fn size(&self) -> usize {
        let (z, h, w) = self.shape();
        z * h * w
    }

    /// 检查索引是否合法.
    #[inline]
    fn check(&self, (z0, h0, w0): &Idx3d) -> bool {
        let (z, h, w) = self.shape();
        *z0 < z && *h0 < h && *w0 < w
    }

    /// 获取空间方向体素分辨率, 以毫米为单位.
    #[inline]
    fn z_mm(&self) -> f64 {
        self.spacing()[0]
    }

    /// 获取 height 方向体素分辨率, 以毫米为单位.
    #[inline]
    fn height_mm(&self) -> f64 {
        self.spacing()[1]
    }

    /// 获取 width 方向体素分辨率, 以毫米为单位.
    #[inline]
    fn width_mm(&self) -> f64 {
        self.spacing()[2]
    }

    /// 体素分辨率在三个维度上是否是各向同的?
    #[inline]
    fn is_isotropic(&self) -> bool {
        let [z, h, w] = self.spacing();
        z == h && z == w
    }

    /// 获取体素的实际体积值, 以立方毫米为单位.
    #[inline]
    fn voxel(&self) -> f64 {
        self.spacing().iter().product()
    }
}

/// 校验体素分辨率: 每个分量都必须是有限正数.
fn check_spacing(spacing: [f64; 3]) -> TextureResult<()> {
    if spacing.iter().all(|s| s.is_finite() && *s > 0.0) {
        Ok(())
    } else {
        Err(TextureError::InvalidParameter {
            name: "spacing",
            reason: format!("体素分辨率必须为有限正数, 实际为 {spacing:?}"),
        })
    }
}

/// 形状为 `shape` 的网格中 `pos` 的行优先线性下标. 索引越界时结果无意义.
#[inline]
pub(crate) fn linear_index(shape: Idx3d, (z, h, w): Idx3d) -> usize {
    let (_, hl, wl) = shape;
    (z * hl + h) * wl + w
}

/// 已离散化的三维灰度体数据. 灰度值以 `u16` 保存, 合法范围为 `[1, n_bins]`.
///
/// ROI 外体素的值不受约束 (惯例上为 [`crate::consts::label::OUTSIDE_ROI_LEVEL`]),
/// 任何构建器都不会读取它们.
#[derive(Debug, Clone)]
pub struct DiscretizedVolume {
    data: Array3<u16>,
    n_bins: u16,
    spacing: [f64; 3],
}

impl VoxelGrid for DiscretizedVolume {
    #[inline]
    fn shape(&self) -> Idx3d {
        self.data.dim()
    }

    #[inline]
    fn spacing(&self) -> [f64; 3] {
        self.spacing
    }
}

impl Index<Idx3d> for DiscretizedVolume {
    type Output = u16;

    #[inline]
    fn index(&self, index: Idx3d) -> &Self::Output {
        &self.data[index]
    }
}

impl DiscretizedVolume {
    /// 由 `(z, h, w)` 组织的灰度数据直接创建体数据.
    ///
    /// `n_bins` 必须至少为 1, `spacing` 以毫米为单位按 `[z, h, w]` 给出.
    pub fn new(data: Array3<u16>, n_bins: u16, spacing: [f64; 3]) -> TextureResult<Self> {
        if n_bins == 0 {
            return Err(TextureError::InvalidParameter {
                name: "n_bins",
                reason: "灰度级数至少为 1".to_string(),
            });
        }
        check_spacing(spacing)?;
        Ok(Self {
            data,
            n_bins,
            spacing,
        })
    }

    /// 灰度级数.
    #[inline]
    pub fn n_bins(&self) -> u16 {
        self.n_bins
    }

    /// 获得数据的一份不可变 shallow copy.
    #[inline]
    pub fn data(&self) -> ArrayView3<'_, u16> {
        self.data.view()
    }
}

/// 三维 ROI 掩码. 标签值以 `u8` 保存, 与 [`DiscretizedVolume`] 逐体素对应.
#[derive(Debug, Clone)]
pub struct RoiMask {
    data: Array3<u8>,
    spacing: [f64; 3],
}

impl VoxelGrid for RoiMask {
    #[inline]
    fn shape(&self) -> Idx3d {
        self.data.dim()
    }

    #[inline]
    fn spacing(&self) -> [f64; 3] {
        self.spacing
    }
}

impl Index<Idx3d> for RoiMask {
    type Output = u8;

    #[inline]
    fn index(&self, index: Idx3d) -> &Self::Output {
        &self.data[index]
    }
}

impl RoiMask {
    /// 由 `(z, h, w)` 组织的标签数据直接创建掩码.
    pub fn new(data: Array3<u8>, spacing: [f64; 3]) -> TextureResult<Self> {
        check_spacing(spacing)?;
        Ok(Self { data, spacing })
    }

    /// 创建形状为 `shape`, 全部体素都为 `label` 的掩码 (即 "无掩码").
    pub fn filled(shape: Idx3d, spacing: [f64; 3], label: u8) -> TextureResult<Self> {
        Self::new(Array3::from_elem(shape, label), spacing)
    }

    /// 获得数据的一份不可变 shallow copy.
    #[inline]
    pub fn data(&self) -> ArrayView3<'_, u8> {
        self.data.view()
    }

    /// 获取掩码中值为 `label` 的体素个数.
    #[inline]
    pub fn count(&self, label: u8) -> usize {
        self.data.iter().filter(|p| **p == label).count()
    }
}

/// 邻域与方向的维度模式.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Dimensionality {
    /// 仅在水平切片内部取邻域 (8-/4-邻域, 4 个对称方向).
    Planar,

    /// 三维邻域 (26-/6-邻域, 13 个对称方向).
    Volumetric,
}

impl Dimensionality {
    /// 由网格形状推断: 只有一个切片时为 `Planar`, 否则为 `Volumetric`.
    #[inline]
    pub fn from_shape((z, _, _): Idx3d) -> Self {
        if z <= 1 {
            Self::Planar
        } else {
            Self::Volumetric
        }
    }

    /// 是否为平面模式.
    #[inline]
    pub fn is_planar(&self) -> bool {
        matches!(self, Self::Planar)
    }
}

/// 一次纹理计算的不可变输入: 离散化体数据、掩码和目标标签.
///
/// 构造时完成所有一致性校验, 之后所有构建器只读地共享它.
#[derive(Debug, Clone, Copy)]
pub struct TextureInput<'a> {
    volume: &'a DiscretizedVolume,
    mask: &'a RoiMask,
    label: u8,
    dims: Dimensionality,
    voxel_count: usize,
}

impl<'a> TextureInput<'a> {
    /// 校验并组合输入.
    ///
    /// # 错误
    ///
    /// 1. 形状不一致时返回 [`TextureError::ShapeMismatch`];
    /// 2. 分辨率不一致时返回 [`TextureError::SpacingMismatch`];
    /// 3. ROI 内存在 `[1, n_bins]` 之外的灰度时返回 [`TextureError::LevelOutOfRange`].
    ///
    /// 空 ROI 不是错误.
    pub fn new(volume: &'a DiscretizedVolume, mask: &'a RoiMask, label: u8) -> TextureResult<Self> {
        if volume.shape() != mask.shape() {
            return Err(TextureError::ShapeMismatch {
                volume: volume.shape(),
                mask: mask.shape(),
            });
        }
        if volume.spacing() != mask.spacing() {
            return Err(TextureError::SpacingMismatch {
                volume: volume.spacing(),
                mask: mask.spacing(),
            });
        }

        let n_bins = volume.n_bins();
        let mut voxel_count = 0usize;
        for (pos, &m) in mask.data.indexed_iter() {
            if !is_target(m, label) {
                continue;
            }
            let level = volume[pos];
            if level == OUTSIDE_ROI_LEVEL || level > n_bins {
                return Err(TextureError::LevelOutOfRange { pos, level, n_bins });
            }
            voxel_count += 1;
        }

        let dims = Dimensionality::from_shape(volume.shape());
        log::trace!("texture input: shape {:?}, {voxel_count} ROI voxels, {dims:?}", volume.shape());
        Ok(Self {
            volume,
            mask,
            label,
            dims,
            voxel_count,
        })
    }

    /// 强制指定维度模式. 对多切片数据使用 `Planar` 时, 邻域被限制在各自切片内.
    #[inline]
    pub fn with_dimensionality(mut self, dims: Dimensionality) -> Self {
        self.dims = dims;
        self
    }

    /// 维度模式.
    #[inline]
    pub fn dimensionality(&self) -> Dimensionality {
        self.dims
    }

    /// 目标标签.
    #[inline]
    pub fn label(&self) -> u8 {
        self.label
    }

    /// 灰度级数.
    #[inline]
    pub fn n_bins(&self) -> usize {
        self.volume.n_bins() as usize
    }

    /// 底层体数据.
    #[inline]
    pub fn volume(&self) -> &'a DiscretizedVolume {
        self.volume
    }

    /// 底层掩码.
    #[inline]
    pub fn mask(&self) -> &'a RoiMask {
        self.mask
    }

    /// ROI 体素个数.
    #[inline]
    pub fn voxel_count(&self) -> usize {
        self.voxel_count
    }

    /// ROI 是否为空?
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.voxel_count == 0
    }

    /// 网格形状.
    #[inline]
    pub fn shape(&self) -> Idx3d {
        self.volume.shape()
    }

    /// 网格体素分辨率 `[z, h, w]`, 以毫米为单位.
    #[inline]
    pub fn spacing(&self) -> [f64; 3] {
        self.volume.spacing()
    }

    /// 网格总体素个数 (包括 ROI 外).
    #[inline]
    pub fn grid_size(&self) -> usize {
        self.volume.size()
    }

    /// 行优先线性下标. 索引越界时结果无意义.
    #[inline]
    pub fn linear_index(&self, pos: Idx3d) -> usize {
        linear_index(self.shape(), pos)
    }

    /// 索引 `pos` 是否在网格内且属于目标 ROI.
    #[inline]
    pub fn in_roi(&self, pos: Idx3d) -> bool {
        self.mask.data.get(pos).is_some_and(|&m| is_target(m, self.label))
    }

    /// 获取 `pos` 的灰度. 若 `pos` 越界或不在 ROI 内则返回 `None`.
    #[inline]
    pub fn level(&self, pos: Idx3d) -> Option<u16> {
        self.in_roi(pos).then(|| self.volume[pos])
    }

    /// 计算 `pos + offset`. 结果越界时返回 `None`.
    #[inline]
    pub fn shift(&self, (z, h, w): Idx3d, (dz, dh, dw): Offset3d) -> Option<Idx3d> {
        let pos = (
            z.checked_add_signed(dz)?,
            h.checked_add_signed(dh)?,
            w.checked_add_signed(dw)?,
        );
        self.volume.check(&pos).then_some(pos)
    }

    /// 获取 `pos + offset` 的灰度. 越界或不在 ROI 内时返回 `None`.
    #[inline]
    pub fn level_at(&self, pos: Idx3d, offset: Offset3d) -> Option<u16> {
        self.shift(pos, offset).and_then(|p| self.level(p))
    }

    /// 以行优先规则迭代 ROI 内所有 `(索引, 灰度)`.
    pub fn roi_iter(&self) -> impl Iterator<Item = (Idx3d, u16)> + '_ {
        PosIter::new(self.shape()).filter_map(|pos| self.level(pos).map(|g| (pos, g)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;

    const ISO: [f64; 3] = [1.0, 1.0, 1.0];

    fn volume(data: Array3<u16>, n_bins: u16) -> DiscretizedVolume {
        DiscretizedVolume::new(data, n_bins, ISO).unwrap()
    }

    #[test]
    fn test_input_shape_mismatch() {
        let v = volume(Array3::from_elem((1, 2, 2), 1), 2);
        let m = RoiMask::filled((1, 2, 3), ISO, 1).unwrap();
        let e = TextureInput::new(&v, &m, 1).unwrap_err();
        assert_eq!(
            e,
            TextureError::ShapeMismatch {
                volume: (1, 2, 2),
                mask: (1, 2, 3)
            }
        );
    }

    #[test]
    fn test_input_spacing_mismatch() {
        let v = volume(Array3::from_elem((1, 2, 2), 1), 2);
        let m = RoiMask::filled((1, 2, 2), [2.0, 1.0, 1.0], 1).unwrap();
        assert!(matches!(
            TextureInput::new(&v, &m, 1),
            Err(TextureError::SpacingMismatch { .. })
        ));
    }

    #[test]
    fn test_input_level_out_of_range() {
        let mut data = Array3::from_elem((1, 2, 2), 1);
        data[(0, 1, 1)] = 5;
        let v = volume(data, 4);
        let m = RoiMask::filled((1, 2, 2), ISO, 1).unwrap();
        assert_eq!(
            TextureInput::new(&v, &m, 1).unwrap_err(),
            TextureError::LevelOutOfRange {
                pos: (0, 1, 1),
                level: 5,
                n_bins: 4
            }
        );
    }

    /// ROI 外的非法灰度不会被读取, 因此不是错误.
    #[test]
    fn test_input_ignores_outside_roi() {
        let mut data = Array3::from_elem((1, 2, 2), 1);
        data[(0, 0, 0)] = 0;
        let v = volume(data, 1);
        let mut mask = Array3::from_elem((1, 2, 2), 1);
        mask[(0, 0, 0)] = 0;
        let m = RoiMask::new(mask, ISO).unwrap();
        let input = TextureInput::new(&v, &m, 1).unwrap();
        assert_eq!(input.voxel_count(), 3);
        assert_eq!(input.level((0, 0, 0)), None);
        assert_eq!(input.level((0, 1, 1)), Some(1));
        assert_eq!(input.roi_iter().count(), 3);
    }

    #[test]
    fn test_invalid_construction() {
        assert!(DiscretizedVolume::new(Array3::from_elem((1, 1, 1), 1), 0, ISO).is_err());
        assert!(RoiMask::filled((1, 1, 1), [1.0, 0.0, 1.0], 1).is_err());
        assert!(RoiMask::filled((1, 1, 1), [1.0, f64::NAN, 1.0], 1).is_err());
    }

    #[test]
    fn test_shift_and_dimensionality() {
        let v = volume(Array3::from_elem((2, 3, 3), 1), 1);
        let m = RoiMask::filled((2, 3, 3), ISO, 1).unwrap();
        let input = TextureInput::new(&v, &m, 1).unwrap();
        assert_eq!(input.dimensionality(), Dimensionality::Volumetric);
        assert_eq!(input.shift((0, 0, 0), (0, -1, 0)), None);
        assert_eq!(input.shift((0, 0, 0), (1, 1, 2)), Some((1, 1, 2)));
        assert_eq!(input.shift((1, 2, 2), (1, 0, 0)), None);
        assert_eq!(input.linear_index((1, 2, 2)), 17);
        assert_eq!(linear_index((2, 3, 4), (1, 2, 3)), 23);

        let planar = input.with_dimensionality(Dimensionality::Planar);
        assert!(planar.dimensionality().is_planar());
        assert_eq!(Dimensionality::from_shape((1, 5, 5)), Dimensionality::Planar);
    }
}
