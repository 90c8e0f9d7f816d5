//! 事件栈：活跃事件的有序集合
//!
//! 按插入顺序排列，模态事件（确认框）总是插到最前面。
//! 输入路由从前往后遍历，具体投递规则见 `engine::routing`。

use super::EventId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Entry {
    id: EventId,
    modal: bool,
}

#[derive(Debug, Clone, Default)]
pub struct EventStack {
    entries: Vec<Entry>,
}

impl EventStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// 入栈；已在栈中时不重复插入
    pub fn push(&mut self, id: EventId, modal: bool) -> bool {
        if self.contains(id) {
            return false;
        }
        let entry = Entry { id, modal };
        if modal {
            self.entries.insert(0, entry);
        } else {
            self.entries.push(entry);
        }
        true
    }

    /// 出栈；不在栈中时返回 false
    pub fn remove(&mut self, id: EventId) -> bool {
        match self.entries.iter().position(|entry| entry.id == id) {
            Some(index) => {
                self.entries.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, id: EventId) -> bool {
        self.entries.iter().any(|entry| entry.id == id)
    }

    /// 当前顺序的快照，路由期间栈可能被续体修改
    pub fn snapshot(&self) -> Vec<EventId> {
        self.iter().collect()
    }

    /// 最前面的事件
    pub fn front(&self) -> Option<EventId> {
        self.entries.first().map(|entry| entry.id)
    }

    /// 是否有模态事件打开
    pub fn has_modal(&self) -> bool {
        self.entries.iter().any(|entry| entry.modal)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = EventId> + '_ {
        self.entries.iter().map(|entry| entry.id)
    }
}
