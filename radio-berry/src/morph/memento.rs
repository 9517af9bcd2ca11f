use crate::consts::ElemType;
use crate::data::linear_index;
use crate::{Idx3d, TextureInput};
use std::mem;

/// 逐层腐蚀所需要维护的数据结构集合.
///
/// 所有逐体素状态都存放在按行优先线性下标索引的扁平数组中.
pub struct ErosionMemento {
    shape: Idx3d,
    data: Vec<ElemType>,
    scheduled: Vec<bool>,
    surf1: Vec<Idx3d>,
    surf2: Vec<Idx3d>,
}

impl ErosionMemento {
    /// 以 `input` 的 ROI 作为初始前景.
    pub fn new(input: &TextureInput) -> Self {
        let size = input.grid_size();
        let mut data = vec![ElemType::Background; size];
        for (pos, _) in input.roi_iter() {
            data[input.linear_index(pos)] = ElemType::Foreground;
        }
        Self {
            shape: input.shape(),
            data,
            scheduled: vec![false; size],
            surf1: Vec::with_capacity(1024),
            surf2: Vec::with_capacity(1024),
        }
    }

    #[inline]
    fn linear(&self, pos: &Idx3d) -> usize {
        linear_index(self.shape, *pos)
    }

    /// 为当前轮次添加一个坐标. 返回值指示是否是新安排的坐标.
    #[inline]
    pub fn push_pos(&mut self, pos: &Idx3d) -> bool {
        let idx = self.linear(pos);
        if mem::replace(&mut self.scheduled[idx], true) {
            return false;
        }
        self.surf1.push(*pos);
        true
    }

    /// 为下一轮次添加一个坐标. 返回值指示是否是新安排的坐标.
    #[inline]
    pub fn push_pos_next(&mut self, pos: &Idx3d) -> bool {
        let idx = self.linear(pos);
        if mem::replace(&mut self.scheduled[idx], true) {
            return false;
        }
        self.surf2.push(*pos);
        true
    }

    /// 获得本轮所有即将被腐蚀的坐标.
    ///
    /// 注意该操作在底层是 move 的, 因此性能开销较小.
    pub fn take_positions(&mut self) -> Vec<Idx3d> {
        let prev_len = self.surf1.len();
        mem::replace(&mut self.surf1, Vec::with_capacity(prev_len))
    }

    /// 进入下一轮.
    ///
    /// # 内部行为
    ///
    /// 清空 `self.surf1` 并与 `self.surf2` 交换.
    pub fn step(&mut self) {
        self.surf1.clear();
        mem::swap(&mut self.surf1, &mut self.surf2);
    }

    /// 设置某个体素索引的值为背景.
    #[inline]
    pub fn set_background(&mut self, pos: &Idx3d) {
        let idx = self.linear(pos);
        self.data[idx] = ElemType::Background;
    }

    /// 判断某索引体素是否仍为前景. 越界时 panic.
    #[inline]
    pub fn is_foreground(&self, pos: &Idx3d) -> bool {
        self.data[self.linear(pos)].is_foreground()
    }
}
