//! 方向模型与邻域.
//!
//! 26 个单位步长方向向量 `(dz, dy, dx) ∈ {-1, 0, 1}³ \ {0}` 按字典序编号为
//! `0..=25`, 编号 `k` 的反向量编号为 `25 - k`. 对称视图取后 13 个
//! (首个非零分量为正) 作为每对反向量的代表.
//!
//! `dy` 是几何意义上的分量 (向上为正), 而网格的 `h` 轴向下增长.
//! 二者之间的符号翻转只在 [`Direction::offset`] 中进行, 所有构建器都经由它访问邻居,
//! 因此 45° 与 135° 在各个矩阵族之间保持一致.

use std::fmt;

use either::Either;
use itertools::iproduct;

use crate::data::Dimensionality;
use crate::{Idx3d, Offset3d};

/// 方向总数 (对称折叠前).
pub const DIRECTION_COUNT: usize = 26;

/// 对称代表方向个数.
pub const SYMMETRIC_COUNT: usize = 13;

/// 一个单位步长方向向量.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Direction {
    id: u8,
    dz: i8,
    dy: i8,
    dx: i8,
}

/// 按 `(dz, dy, dx)` 字典序生成全部 26 个方向.
const fn enumerate_directions() -> [Direction; DIRECTION_COUNT] {
    let mut ans = [Direction {
        id: 0,
        dz: 0,
        dy: 0,
        dx: 0,
    }; DIRECTION_COUNT];
    let mut id = 0usize;
    let mut cell = 0i8;
    while cell < 27 {
        let (dz, dy, dx) = (cell / 9 - 1, cell / 3 % 3 - 1, cell % 3 - 1);
        if dz != 0 || dy != 0 || dx != 0 {
            ans[id] = Direction {
                id: id as u8,
                dz,
                dy,
                dx,
            };
            id += 1;
        }
        cell += 1;
    }
    ans
}

static ALL_DIRECTIONS: [Direction; DIRECTION_COUNT] = enumerate_directions();

impl Direction {
    /// 按编号获取方向. 编号越界时返回 `None`.
    #[inline]
    pub fn from_id(id: usize) -> Option<Direction> {
        ALL_DIRECTIONS.get(id).copied()
    }

    /// 由几何分量 `(dz, dy, dx)` 查找方向. 分量不在 `{-1, 0, 1}` 内或全为零时返回 `None`.
    pub fn from_components(dz: i8, dy: i8, dx: i8) -> Option<Direction> {
        ALL_DIRECTIONS
            .iter()
            .find(|d| d.components() == (dz, dy, dx))
            .copied()
    }

    /// 稳定编号, 范围 `0..=25`.
    #[inline]
    pub const fn id(&self) -> usize {
        self.id as usize
    }

    /// 几何分量 `(dz, dy, dx)`, 其中 `dy` 向上为正.
    #[inline]
    pub const fn components(&self) -> (i8, i8, i8) {
        (self.dz, self.dy, self.dx)
    }

    /// 反向量.
    #[inline]
    pub fn antipode(&self) -> Direction {
        ALL_DIRECTIONS[DIRECTION_COUNT - 1 - self.id()]
    }

    /// 是否为对称视图中的代表方向.
    #[inline]
    pub const fn is_representative(&self) -> bool {
        self.id() >= DIRECTION_COUNT - SYMMETRIC_COUNT
    }

    /// 是否位于水平切片内 (`dz == 0`).
    #[inline]
    pub fn is_planar(&self) -> bool {
        self.dz == 0
    }

    /// 切片内方向的角度 (度), 以 `→` 为 0°, 逆时针增长. 非平面方向返回 `None`.
    pub fn planar_angle(&self) -> Option<f64> {
        self.is_planar()
            .then(|| (self.dy as f64).atan2(self.dx as f64).to_degrees().rem_euclid(360.0))
    }

    /// 沿该方向走 `delta` 步所对应的 **网格索引** 偏移 `(dz, dh, dw)`.
    ///
    /// 网格 `h` 轴向下增长, 因此 `dh = -dy`.
    #[inline]
    pub fn offset(&self, delta: usize) -> Offset3d {
        let k = delta as isize;
        (
            self.dz as isize * k,
            -(self.dy as isize) * k,
            self.dx as isize * k,
        )
    }

    /// 沿该方向走 `delta` 步所对应的物理偏移向量 `[z, h, w]`, 单位为毫米.
    pub fn physical_offset(&self, delta: usize, spacing: [f64; 3]) -> [f64; 3] {
        let (z, h, w) = self.offset(delta);
        [
            z as f64 * spacing[0],
            h as f64 * spacing[1],
            w as f64 * spacing[2],
        ]
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} ({}, {}, {})", self.id, self.dz, self.dy, self.dx)
    }
}

/// 获取全部 26 个方向, 按编号升序.
#[inline]
pub fn directions() -> &'static [Direction; DIRECTION_COUNT] {
    &ALL_DIRECTIONS
}

/// 获取对称视图中的代表方向, 按编号升序.
///
/// 体模式下为 13 个, 平面模式下为 4 个 (0°, 135°, 90°, 45°, 按编号排列).
/// 使用者必须对每个匹配的体素对同时计入 `(p, q)` 和 `(q, p)`.
pub fn symmetric_directions(dims: Dimensionality) -> impl Iterator<Item = Direction> {
    let reps = ALL_DIRECTIONS[DIRECTION_COUNT - SYMMETRIC_COUNT..]
        .iter()
        .copied();
    match dims {
        Dimensionality::Planar => Either::Left(reps.filter(Direction::is_planar)),
        Dimensionality::Volumetric => Either::Right(reps),
    }
}

/// 邻接关系.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Connectivity {
    /// 仅共面邻居: 体模式下 6-邻域, 平面模式下 4-邻域. 用于腐蚀.
    Face,

    /// 全部邻居: 体模式下 26-邻域, 平面模式下 8-邻域. 用于区域标记.
    Full,
}

/// 获取给定邻接关系下的全部单步邻居偏移 (网格索引空间), 按方向编号升序.
pub fn neighbour_offsets(connectivity: Connectivity, dims: Dimensionality) -> Vec<Offset3d> {
    ALL_DIRECTIONS
        .iter()
        .filter(|d| !dims.is_planar() || d.is_planar())
        .filter(|d| match connectivity {
            Connectivity::Full => true,
            Connectivity::Face => {
                let (z, y, x) = d.components();
                z.abs() + y.abs() + x.abs() == 1
            }
        })
        .map(|d| d.offset(1))
        .collect()
}

/// 获取切比雪夫距离不超过 `delta` 的全部邻居偏移 (不含中心), 按字典序排列.
///
/// 即 26-邻域 (平面模式下 8-邻域) 按 `delta` 层向外扩展. 每个轴上的半径
/// 不超过 `shape` 在该轴上的跨度, 因为更远的偏移不可能落在网格内.
pub fn neighbourhood(delta: usize, dims: Dimensionality, shape: Idx3d) -> Vec<Offset3d> {
    let reach = |len: usize| delta.min(len.saturating_sub(1)) as isize;
    let dz = if dims.is_planar() { 0 } else { reach(shape.0) };
    let (dh, dw) = (reach(shape.1), reach(shape.2));
    iproduct!(-dz..=dz, -dh..=dh, -dw..=dw)
        .filter(|&off| off != (0, 0, 0))
        .collect()
}

cfg_if::cfg_if! {
    if #[cfg(feature = "rayon")] {
        use rayon::iter::{IntoParallelIterator, ParallelIterator};

        /// 借助 `rayon`, 并行地对每个方向实施 `op` 操作. 结果按 `dirs` 的顺序排列.
        pub(crate) fn scan_directions<T, F>(dirs: Vec<Direction>, op: F) -> Vec<T>
        where
            T: Send,
            F: Fn(Direction) -> T + Sync + Send,
        {
            dirs.into_par_iter().map(op).collect()
        }
    } else {
        /// 依次对每个方向实施 `op` 操作. 结果按 `dirs` 的顺序排列.
        pub(crate) fn scan_directions<T, F>(dirs: Vec<Direction>, op: F) -> Vec<T>
        where
            F: Fn(Direction) -> T,
        {
            dirs.into_iter().map(op).collect()
        }
    }
}
