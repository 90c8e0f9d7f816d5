//! 事件表：创建、播放、停止、完成与丢弃
//!
//! 每个事件有一个拥有者（场景、另一个事件或全局）。丢弃一个事件会
//! 递归丢弃它拥有的事件，并且保证渲染句柄在丢弃前已卸载。

use tracing::{debug, trace};

use crate::backend::{Backend, RenderHandle};
use crate::event::{EventCore, EventId, Next, Outcome, Sequence, Step};
use crate::history::HistoryEvent;
use crate::widget::{Behavior, Ctx, Mount, Widget};

use super::{Engine, StepSpec};

/// 事件的拥有者
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Owner {
    /// 当前场景，场景停止时丢弃
    Scene,
    /// 另一个事件（序列步骤、选项的后续对话）
    Event(EventId),
    /// 不随场景切换丢弃
    Global,
}

/// 事件表中的一项
#[derive(Debug)]
pub(crate) struct Slot {
    pub(crate) core: EventCore,
    pub(crate) widget: Widget,
    pub(crate) owner: Owner,
    pub(crate) children: Vec<EventId>,
    pub(crate) mount: Option<Mount>,
}

impl<B: Backend> Engine<B> {
    pub(crate) fn insert(&mut self, widget: Widget, on_complete: Next, owner: Owner) -> EventId {
        let id = EventId(self.alloc_id());
        let owner = match owner {
            Owner::Scene => match self.scene.as_mut() {
                Some(scene) => {
                    scene.events.push(id);
                    Owner::Scene
                }
                None => Owner::Global,
            },
            Owner::Event(parent) => match self.slots.get_mut(&parent) {
                Some(slot) => {
                    slot.children.push(id);
                    Owner::Event(parent)
                }
                None => Owner::Global,
            },
            Owner::Global => Owner::Global,
        };
        trace!(%id, kind = widget.kind(), ?owner, "创建事件");
        self.slots.insert(
            id,
            Slot {
                core: EventCore::new(on_complete),
                widget,
                owner,
                children: Vec::new(),
                mount: None,
            },
        );
        id
    }

    pub(crate) fn build_sequence(
        &mut self,
        steps: Vec<StepSpec>,
        on_complete: Next,
        owner: Owner,
    ) -> EventId {
        let seq = self.insert(
            Widget::Sequence(Sequence::new(Vec::new())),
            on_complete,
            owner,
        );
        let built: Vec<Step> = steps
            .into_iter()
            .map(|step| match step {
                StepSpec::Widget(widget) => {
                    Step::Event(self.insert(widget, Next::Advance(seq), Owner::Event(seq)))
                }
                StepSpec::Action(next) => Step::Action(next),
            })
            .collect();
        if let Some(sequence) = self
            .slots
            .get_mut(&seq)
            .and_then(|slot| slot.widget.as_sequence_mut())
        {
            *sequence = Sequence::new(built);
        }
        seq
    }

    /// 播放事件
    ///
    /// 只有从未播放过的事件可以播放；返回是否真的开始了。
    /// 序列会立即执行到第一个需要等待的步骤。
    pub fn play(&mut self, id: EventId) -> bool {
        let Some(slot) = self.slots.get_mut(&id) else {
            debug!(%id, "播放不存在的事件");
            return false;
        };
        if !slot.core.play() {
            debug!(%id, "事件已播放过，忽略");
            return false;
        }
        self.stack.push(id, slot.widget.is_modal());

        if let Some(layer) = slot.widget.layer() {
            let handle = RenderHandle(id.0);
            let visual = slot.widget.visual();
            if let Some(visual) = &visual {
                self.backend.attach(handle, layer, visual);
            }
            slot.mount = Some(Mount {
                handle,
                layer,
                attached: visual.is_some(),
            });
        }

        let mut ctx = Ctx::new(&self.config, &mut self.backend);
        slot.widget.on_play(&mut ctx);
        let dirty = ctx.is_dirty();

        let dialogue = match &slot.widget {
            Widget::Voice(voice) => Some(HistoryEvent::Dialogue {
                speaker: voice.speaker().title.clone(),
                content: voice.text().to_string(),
                tick: self.tick,
            }),
            _ => None,
        };
        let is_sequence = slot.widget.as_sequence().is_some();
        trace!(%id, kind = slot.widget.kind(), "播放事件");

        if dirty {
            self.sync_visual(id);
        }
        if let Some(entry) = dialogue {
            self.history.push(entry);
        }
        if is_sequence {
            self.run_sequence(id);
        }
        true
    }

    /// 让后端的画面与组件当前状态一致
    pub(crate) fn sync_visual(&mut self, id: EventId) {
        let Some(slot) = self.slots.get_mut(&id) else {
            return;
        };
        let Some(mount) = slot.mount.as_mut() else {
            return;
        };
        match (slot.widget.visual(), mount.attached) {
            (Some(visual), true) => self.backend.update(mount.handle, &visual),
            (Some(visual), false) => {
                self.backend.attach(mount.handle, mount.layer, &visual);
                mount.attached = true;
            }
            (None, true) => {
                self.backend.detach(mount.handle, mount.layer);
                mount.attached = false;
            }
            (None, false) => {}
        }
    }

    /// 停止事件，丢弃其续体
    pub fn stop(&mut self, id: EventId) -> bool {
        let stopped = self
            .slots
            .get_mut(&id)
            .is_some_and(|slot| slot.core.stop());
        if stopped {
            debug!(%id, "停止事件");
            self.discard(id);
        }
        stopped
    }

    /// 以 `outcome` 完成事件并执行其续体
    ///
    /// 事件先离开事件栈并卸载画面，然后才执行续体，因此续体可以
    /// 立即开始一个同类事件。非活跃事件返回 false。
    pub fn complete(&mut self, id: EventId, outcome: Outcome) -> bool {
        let Some(next) = self.slots.get_mut(&id).and_then(|slot| slot.core.complete()) else {
            trace!(%id, "完成非活跃事件，忽略");
            return false;
        };
        trace!(%id, ?outcome, ?next, "事件完成");
        self.discard(id);
        self.resume(next, outcome);
        true
    }

    /// 从事件表中移除事件及其拥有的所有事件
    pub(crate) fn discard(&mut self, id: EventId) {
        let Some(mut slot) = self.slots.remove(&id) else {
            return;
        };
        slot.core.stop();
        self.stack.remove(id);
        if let Some(mount) = slot.mount
            && mount.attached
        {
            self.backend.detach(mount.handle, mount.layer);
        }
        for child in std::mem::take(&mut slot.children) {
            self.discard(child);
        }
        match slot.owner {
            Owner::Event(parent) => {
                if let Some(parent) = self.slots.get_mut(&parent) {
                    parent.children.retain(|child| *child != id);
                }
            }
            Owner::Scene => {
                if let Some(scene) = self.scene.as_mut() {
                    scene.events.retain(|event| *event != id);
                }
            }
            Owner::Global => {}
        }
    }
}
