//! # State 模块
//!
//! 跨场景保存的游戏状态：玩家名字、当前关卡、每关得分账本。
//!
//! 状态由引擎持有并显式传递，不使用全局变量。

use serde::{Deserialize, Serialize};

/// 跨场景游戏状态
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GameState {
    /// 玩家名字（Intro 的键盘写入，回到标题时清空）
    pub player_name: String,
    /// 当前关卡索引
    pub level_index: usize,
    /// 每关得分，长度在加载时确定
    ledger: Vec<i32>,
}

impl GameState {
    /// 创建状态，账本长度等于关卡数
    pub fn new(level_count: usize) -> Self {
        Self {
            player_name: String::new(),
            level_index: 0,
            ledger: vec![0; level_count],
        }
    }

    /// 只读账本
    pub fn ledger(&self) -> &[i32] {
        &self.ledger
    }

    /// 关卡数
    pub fn level_count(&self) -> usize {
        self.ledger.len()
    }

    /// 记录某关得分，越界时忽略
    pub fn record(&mut self, index: usize, score: i32) -> bool {
        match self.ledger.get_mut(index) {
            Some(slot) => {
                *slot = score;
                true
            }
            None => false,
        }
    }

    /// 得分最高的关卡，平分时取最先出现的
    pub fn best_level(&self) -> Option<usize> {
        let mut best: Option<(usize, i32)> = None;
        for (index, &score) in self.ledger.iter().enumerate() {
            match best {
                Some((_, top)) if score <= top => {}
                _ => best = Some((index, score)),
            }
        }
        best.map(|(index, _)| index)
    }

    /// 回到标题前清空：名字、关卡索引、账本（长度保持不变）
    pub fn reset(&mut self) {
        self.player_name.clear();
        self.level_index = 0;
        self.ledger.iter_mut().for_each(|score| *score = 0);
    }
}
