use ndarray::Array3;

use super::memento::ErosionMemento;
use crate::direction::{neighbour_offsets, Connectivity};
use crate::TextureInput;

/// 边界距离实现块
impl TextureInput<'_> {
    /// 获取 ROI 的边界距离图.
    ///
    /// 该函数对二值 ROI 反复做共面邻域 (体模式 6-邻域, 平面模式 4-邻域) 腐蚀:
    /// 体素在第 `k` 轮后仍存活, 当且仅当它及其所有共面邻居在第 `k - 1` 轮后都存活.
    /// 网格之外视为背景. 在第 `k` 轮被腐蚀掉的体素距离为 `k` (从 1 开始).
    ///
    /// # 返回值
    ///
    /// 与输入同形状的距离图. ROI 体素的距离至少为 1, ROI 外体素为 0.
    /// 轮数不超过 ROI 的最大内切半径 (以体素计).
    pub fn distance_map(&self) -> Array3<u32> {
        let mut dist = Array3::<u32>::zeros(self.shape());
        if self.is_empty() {
            return dist;
        }
        let offsets = neighbour_offsets(Connectivity::Face, self.dimensionality());
        let mut db = ErosionMemento::new(self);

        // 第一轮: 至少有一个共面邻居是背景 (或越界) 的 ROI 体素.
        for (pos, _) in self.roi_iter() {
            let is_surface = offsets.iter().any(|&off| match self.shift(pos, off) {
                Some(neigh) => !db.is_foreground(&neigh),
                None => true,
            });
            if is_surface {
                db.push_pos(&pos);
            }
        }

        let mut pass = 0u32;
        let mut vox_cnt = self.voxel_count();
        loop {
            let layer = db.take_positions();
            if layer.is_empty() {
                break;
            }
            pass += 1;
            debug_assert!(vox_cnt >= layer.len());

            // 本轮腐蚀
            for pos in layer.iter() {
                debug_assert!(db.is_foreground(pos));
                dist[*pos] = pass;
                db.set_background(pos);
            }
            vox_cnt -= layer.len();

            // 与本轮腐蚀体素共面相邻的前景, 下一轮必然被腐蚀.
            for pos in layer.iter() {
                for &off in offsets.iter() {
                    if let Some(neigh) = self.shift(*pos, off) {
                        if db.is_foreground(&neigh) {
                            db.push_pos_next(&neigh);
                        }
                    }
                }
            }
            db.step();
        }
        debug_assert_eq!(vox_cnt, 0);
        log::debug!("distance map: {pass} erosion passes over {} voxels", self.voxel_count());
        dist
    }
}

/// 获取 `input` 的 ROI 边界距离图. 见 [`TextureInput::distance_map`].
#[inline]
pub fn distance_map(input: &TextureInput) -> Array3<u32> {
    input.distance_map()
}

#[cfg(test)]
mod tests {
    use crate::{DiscretizedVolume, RoiMask, TextureInput};
    use ndarray::Array3;

    const ISO: [f64; 3] = [1.0, 1.0, 1.0];

    fn solid(shape: (usize, usize, usize)) -> (DiscretizedVolume, RoiMask) {
        (
            DiscretizedVolume::new(Array3::from_elem(shape, 1), 1, ISO).unwrap(),
            RoiMask::filled(shape, ISO, 1).unwrap(),
        )
    }

    /// 奇数边长立方体: 唯一的中心体素距离最大, 表层体素距离为 1.
    #[test]
    fn test_cube_center_is_unique_maximum() {
        let (v, m) = solid((5, 5, 5));
        let input = TextureInput::new(&v, &m, 1).unwrap();
        let dist = input.distance_map();

        let max = *dist.iter().max().unwrap();
        assert_eq!(max, 3);
        assert_eq!(dist[(2, 2, 2)], 3);
        assert_eq!(dist.iter().filter(|d| **d == max).count(), 1);

        for ((z, h, w), d) in dist.indexed_iter() {
            let on_surface = [z, h, w].iter().any(|&c| c == 0 || c == 4);
            assert_eq!(on_surface, *d == 1, "({z}, {h}, {w}) -> {d}");
            let expect = [z, h, w].iter().map(|&c| c.min(4 - c)).min().unwrap() as u32 + 1;
            assert_eq!(*d, expect);
        }
    }

    #[test]
    fn test_planar_square() {
        let (v, m) = solid((1, 5, 5));
        let input = TextureInput::new(&v, &m, 1).unwrap();
        let dist = input.distance_map();
        assert_eq!(dist[(0, 2, 2)], 3);
        assert_eq!(dist[(0, 1, 1)], 2);
        assert_eq!(dist[(0, 0, 3)], 1);
    }

    /// 掩码外体素距离为 0, 掩码边缘 (即使不在网格边缘) 距离为 1.
    #[test]
    fn test_masked_region() {
        let shape = (1, 7, 7);
        let v = DiscretizedVolume::new(Array3::from_elem(shape, 1), 1, ISO).unwrap();
        let mask = Array3::from_shape_fn(shape, |(_, h, w)| {
            u8::from((1..=5).contains(&h) && (1..=5).contains(&w))
        });
        let m = RoiMask::new(mask, ISO).unwrap();
        let input = TextureInput::new(&v, &m, 1).unwrap();
        let dist = input.distance_map();
        assert_eq!(dist[(0, 0, 0)], 0);
        assert_eq!(dist[(0, 1, 1)], 1);
        assert_eq!(dist[(0, 3, 3)], 3);
        assert!(dist
            .indexed_iter()
            .all(|(p, d)| (*d > 0) == input.in_roi(p)));
    }

    #[test]
    fn test_empty_roi() {
        let shape = (2, 2, 2);
        let v = DiscretizedVolume::new(Array3::from_elem(shape, 1), 1, ISO).unwrap();
        let m = RoiMask::filled(shape, ISO, 0).unwrap();
        let input = TextureInput::new(&v, &m, 1).unwrap();
        assert!(input.distance_map().iter().all(|d| *d == 0));
    }
}
