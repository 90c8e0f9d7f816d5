//! # History 模块
//!
//! 本轮游戏的历史记录：显示过的对话、做出的选择、输入的名字、进入的场景。
//!
//! ## 设计原则
//!
//! - 每条记录都带有引擎 tick，作为确定性的时间戳
//! - 所有数据可序列化
//! - 不记录临时状态（转场、立绘动画）
//! - 回到标题时清空

use serde::{Deserialize, Serialize};

use crate::scene::SceneKind;

/// 历史事件
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum HistoryEvent {
    /// 对话事件
    Dialogue {
        /// 说话者（None 表示旁白）
        speaker: Option<String>,
        /// 替换标记后的对话内容
        content: String,
        tick: u64,
    },

    /// 选择事件
    ChoiceMade {
        /// 按显示顺序排列的选项
        options: Vec<String>,
        /// 选择的索引（显示顺序）
        selected_index: usize,
        /// 该选项的得分增量
        score: i32,
        tick: u64,
    },

    /// 玩家输入名字
    NameEntered { name: String, tick: u64 },

    /// 进入场景
    SceneEntered { scene: SceneKind, tick: u64 },
}

impl HistoryEvent {
    /// 获取事件的 tick
    pub fn tick(&self) -> u64 {
        match self {
            HistoryEvent::Dialogue { tick, .. } => *tick,
            HistoryEvent::ChoiceMade { tick, .. } => *tick,
            HistoryEvent::NameEntered { tick, .. } => *tick,
            HistoryEvent::SceneEntered { tick, .. } => *tick,
        }
    }
}

/// 历史记录容器
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct History {
    /// 事件列表（按时间顺序）
    events: Vec<HistoryEvent>,
    /// 最大记录数（防止内存无限增长）
    max_events: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}

impl History {
    /// 创建新的历史记录
    pub fn new() -> Self {
        Self {
            events: Vec::new(),
            max_events: 1000,
        }
    }

    /// 设置最大记录数
    pub fn with_max_events(mut self, max: usize) -> Self {
        self.max_events = max;
        self
    }

    /// 添加事件
    pub fn push(&mut self, event: HistoryEvent) {
        self.events.push(event);

        // 超过最大数量时移除最早的事件
        if self.events.len() > self.max_events {
            let overflow = self.events.len() - self.max_events;
            self.events.drain(..overflow);
        }
    }

    /// 获取所有事件
    pub fn events(&self) -> &[HistoryEvent] {
        &self.events
    }

    /// 对话事件数量
    pub fn dialogue_count(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, HistoryEvent::Dialogue { .. }))
            .count()
    }

    /// 所有选择事件
    pub fn choices(&self) -> impl Iterator<Item = &HistoryEvent> {
        self.events
            .iter()
            .filter(|e| matches!(e, HistoryEvent::ChoiceMade { .. }))
    }

    /// 最近的 N 条对话（按时间顺序）
    pub fn recent_dialogues(&self, count: usize) -> Vec<&HistoryEvent> {
        let mut recent: Vec<_> = self
            .events
            .iter()
            .filter(|e| matches!(e, HistoryEvent::Dialogue { .. }))
            .rev()
            .take(count)
            .collect();
        recent.reverse();
        recent
    }

    /// 清空历史
    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// 事件总数
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
