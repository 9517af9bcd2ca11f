use std::collections::VecDeque;

use ndarray::Array3;

use crate::direction::{neighbour_offsets, Connectivity};
use crate::{Idx3d, TextureInput};

/// 一个区域 (zone / blob): 在给定邻接关系下, 灰度相同的极大连通体素集合.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Zone {
    level: u16,
    voxels: Vec<Idx3d>,
}

impl Zone {
    /// 区域灰度.
    #[inline]
    pub fn level(&self) -> u16 {
        self.level
    }

    /// 区域体素个数.
    #[inline]
    pub fn size(&self) -> usize {
        self.voxels.len()
    }

    /// 区域内所有体素索引, 按访问 (广度优先) 顺序排列. 第一个元素是行优先序下最小的体素.
    #[inline]
    pub fn voxels(&self) -> &[Idx3d] {
        &self.voxels
    }

    /// 区域内体素在距离图 `dist` 上的最小值, 即区域到 ROI 边缘的距离.
    ///
    /// `dist` 应由同一输入的 [`TextureInput::distance_map`] 生成.
    pub fn min_distance(&self, dist: &Array3<u32>) -> u32 {
        self.voxels
            .iter()
            .map(|p| dist[*p])
            .min()
            .unwrap_or_default()
    }
}

/// 区域标记实现块
impl TextureInput<'_> {
    /// 按照 `connectivity` 获取 ROI 内所有区域. 两个体素 `p1` 和 `p2` 属于同一个区域,
    /// 当且仅当存在一条从 `p1` 到 `p2` 的相邻路径, 且路径上的所有体素
    /// (包括 `p1` 和 `p2`) 都在 ROI 内且灰度相同.
    ///
    /// 使用显式队列而非递归实现, 已访问标记保存在按线性下标索引的扁平数组中,
    /// 因此对百万级体素的 ROI 也不会增长调用栈.
    ///
    /// # 返回值
    ///
    /// 区域按其最小体素的行优先序排列. 所有区域两两不交, 其并集恰为 ROI.
    pub fn zones(&self, connectivity: Connectivity) -> Vec<Zone> {
        let offsets = neighbour_offsets(connectivity, self.dimensionality());
        let mut ans = Vec::with_capacity(16);
        let mut visited = vec![false; self.grid_size()];
        let mut bfs_q = VecDeque::with_capacity(64);

        for (seed, level) in self.roi_iter() {
            let seed_idx = self.linear_index(seed);
            if visited[seed_idx] {
                continue;
            }
            visited[seed_idx] = true;
            bfs_q.push_back(seed);

            let mut this_zone = Vec::with_capacity(1);
            while let Some(cur) = bfs_q.pop_front() {
                this_zone.push(cur);
                for &off in offsets.iter() {
                    let Some(neigh) = self.shift(cur, off) else {
                        continue;
                    };
                    let idx = self.linear_index(neigh);
                    if !visited[idx] && self.level(neigh) == Some(level) {
                        visited[idx] = true;
                        bfs_q.push_back(neigh);
                    }
                }
            }
            ans.push(Zone {
                level,
                voxels: this_zone,
            });
        }
        log::debug!(
            "zone labelling ({connectivity:?}): {} zones over {} voxels",
            ans.len(),
            self.voxel_count()
        );
        ans
    }
}

/// 获取 `input` 的所有区域. 见 [`TextureInput::zones`].
#[inline]
pub fn label_zones(input: &TextureInput, connectivity: Connectivity) -> Vec<Zone> {
    input.zones(connectivity)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DiscretizedVolume, RoiMask};
    use std::collections::HashSet;

    const ISO: [f64; 3] = [1.0, 1.0, 1.0];

    /// 区域两两不交, 且并集恰为 ROI.
    fn assert_partition(input: &TextureInput, zones: &[Zone]) {
        let mut seen = HashSet::new();
        for z in zones {
            assert!(z.size() >= 1);
            for p in z.voxels() {
                assert!(seen.insert(*p), "{p:?} 属于多个区域");
                assert_eq!(input.level(*p), Some(z.level()));
            }
        }
        let roi: HashSet<_> = input.roi_iter().map(|(p, _)| p).collect();
        assert_eq!(seen, roi);
    }

    #[test]
    fn test_uniform_roi_is_one_zone() {
        let shape = (3, 4, 5);
        let v = DiscretizedVolume::new(Array3::from_elem(shape, 2), 2, ISO).unwrap();
        let m = RoiMask::filled(shape, ISO, 1).unwrap();
        let input = TextureInput::new(&v, &m, 1).unwrap();
        let zones = input.zones(Connectivity::Full);
        assert_eq!(zones.len(), 1);
        assert_eq!(zones[0].size(), 60);
        assert_eq!(zones[0].voxels()[0], (0, 0, 0));
        assert_partition(&input, &zones);
    }

    /// 三维棋盘格: 26-邻接下相同灰度的体素只在棱/角上相邻, 于是连成两个大区域;
    /// 而 6-邻接下每个体素都是单独的区域.
    #[test]
    fn test_checkerboard() {
        let shape = (3, 4, 4);
        let data = Array3::from_shape_fn(shape, |(z, h, w)| ((z + h + w) % 2) as u16 + 1);
        let v = DiscretizedVolume::new(data, 2, ISO).unwrap();
        let m = RoiMask::filled(shape, ISO, 1).unwrap();
        let input = TextureInput::new(&v, &m, 1).unwrap();

        let face = input.zones(Connectivity::Face);
        assert_eq!(face.len(), 48);
        assert!(face.iter().all(|z| z.size() == 1));
        assert_partition(&input, &face);

        let full = label_zones(&input, Connectivity::Full);
        assert_eq!(full.len(), 2);
        assert_partition(&input, &full);
    }

    /// 平面棋盘格在 8-邻接下仍会沿对角线连通; 以 "交替列" 构造单体素区域.
    #[test]
    fn test_planar_singletons() {
        let shape = (1, 1, 6);
        let data = Array3::from_shape_fn(shape, |(_, _, w)| (w % 2) as u16 + 1);
        let v = DiscretizedVolume::new(data, 2, ISO).unwrap();
        let m = RoiMask::filled(shape, ISO, 1).unwrap();
        let input = TextureInput::new(&v, &m, 1).unwrap();
        let zones = input.zones(Connectivity::Full);
        assert_eq!(zones.len(), 6);
        assert_partition(&input, &zones);
    }

    /// 掩码将同一灰度切成两块.
    #[test]
    fn test_mask_splits_zone() {
        let shape = (1, 3, 5);
        let v = DiscretizedVolume::new(Array3::from_elem(shape, 1), 1, ISO).unwrap();
        let mask = Array3::from_shape_fn(shape, |(_, _, w)| u8::from(w != 2));
        let m = RoiMask::new(mask, ISO).unwrap();
        let input = TextureInput::new(&v, &m, 1).unwrap();
        let zones = input.zones(Connectivity::Full);
        assert_eq!(zones.len(), 2);
        assert_eq!(zones[0].size(), 6);
        assert_eq!(zones[1].size(), 6);
        assert_partition(&input, &zones);

        let dist = input.distance_map();
        assert_eq!(zones[0].min_distance(&dist), 1);
    }

    /// 大体积 ROI 不会因递归而栈溢出.
    #[test]
    fn test_large_volume_does_not_recurse() {
        let shape = (40, 160, 160);
        let v = DiscretizedVolume::new(Array3::from_elem(shape, 1), 1, ISO).unwrap();
        let m = RoiMask::filled(shape, ISO, 1).unwrap();
        let input = TextureInput::new(&v, &m, 1).unwrap();
        let zones = input.zones(Connectivity::Full);
        assert_eq!(zones.len(), 1);
        assert_eq!(zones[0].size(), 40 * 160 * 160);
    }
}
