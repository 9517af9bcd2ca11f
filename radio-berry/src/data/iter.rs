use crate::Idx3d;

/// 三维行优先索引迭代器, 按 `z -> h -> w` 的顺序产生索引.
///
/// 虽然如下函数也能实现相同的功能:
///
/// ```
/// type Idx3d = (usize, usize, usize);
///
/// fn pos_iter_auto((z, h, w): Idx3d) -> impl Iterator<Item = Idx3d> {
///     (0..z).flat_map(move |a| (0..h).flat_map(move |b| (0..w).map(move |c| (a, b, c))))
/// }
///
/// // ...
/// ```
///
/// 但该迭代器对象占用的空间比手写 `PosIter` 更大. 所有构建器的遍历顺序都依赖它,
/// 从而保证重复运行时累加顺序一致.
#[derive(Debug)]
pub struct PosIter {
    cur: Idx3d,
    shape: Idx3d,
}

impl PosIter {
    /// 从 `(0, 0, 0)` 开始遍历形状为 `shape` 的网格.
    #[inline]
    pub fn new(shape: Idx3d) -> Self {
        Self {
            cur: (0, 0, 0),
            shape,
        }
    }
}

impl Iterator for PosIter {
    type Item = Idx3d;

    fn next(&mut self) -> Option<Self::Item> {
        let (z, h, w) = self.shape;
        if z == 0 || h == 0 || w == 0 || self.cur.0 == z {
            return None;
        }
        let ret_pos = self.cur;
        let (cz, ch, cw) = &mut self.cur;
        if *cw + 1 < w {
            *cw += 1;
        } else {
            *cw = 0;
            if *ch + 1 < h {
                *ch += 1;
            } else {
                *ch = 0;
                *cz += 1;
            }
        }
        Some(ret_pos)
    }
}

/// 该测试已足够覆盖所有情况, 不用变更.
#[cfg(test)]
mod completeness_tests {
    use super::PosIter;
    use crate::Idx3d;

    fn pos_iter_builtin((z, h, w): Idx3d) -> impl Iterator<Item = Idx3d> {
        (0..z).flat_map(move |a| (0..h).flat_map(move |b| (0..w).map(move |c| (a, b, c))))
    }

    #[test]
    fn test_builtin_iter_size_larger() {
        use std::mem::size_of_val as sizeof;

        let tup = (1, 1, 1);
        assert!(sizeof(&pos_iter_builtin(tup)) > sizeof(&PosIter::new(tup)));
    }

    #[test]
    fn test_pos_iter() {
        for i in 0..=3 {
            for j in 0..=3 {
                for k in 0..=3 {
                    let tup = (i, j, k);
                    assert!(Iterator::eq(pos_iter_builtin(tup), PosIter::new(tup)));
                }
            }
        }
    }
}
