//! # Handle 模块
//!
//! 渲染层返回的动画句柄：可查询是否完成，可挂接完成回调（continuation）。
//!
//! 单线程协作模型：句柄内部是 `Rc` + `Cell`/`RefCell`，不跨线程。
//! 引擎从不轮询，只通过 [`AnimationHandle::on_finish`] 挂接后续阶段。

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use super::AnimationState;

type Continuation = Box<dyn FnOnce()>;

struct HandleInner {
    state: Cell<AnimationState>,
    continuations: RefCell<Vec<Continuation>>,
}

/// 动画句柄
///
/// 克隆得到的是同一个动画的另一个引用。
#[derive(Clone)]
pub struct AnimationHandle {
    inner: Rc<HandleInner>,
}

impl Default for AnimationHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for AnimationHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnimationHandle")
            .field("state", &self.inner.state.get())
            .field("continuations", &self.inner.continuations.borrow().len())
            .finish()
    }
}

impl AnimationHandle {
    /// 创建正在播放的动画句柄（由渲染层在动画结束时调用 [`complete`](Self::complete)）
    pub fn new() -> Self {
        Self {
            inner: Rc::new(HandleInner {
                state: Cell::new(AnimationState::Playing),
                continuations: RefCell::new(Vec::new()),
            }),
        }
    }

    /// 创建已结束的句柄
    ///
    /// 渲染层不支持动画时使用：生命周期照常推进，图形照常销毁。
    pub fn finished() -> Self {
        let handle = Self::new();
        handle.skip();
        handle
    }

    /// 当前状态
    pub fn state(&self) -> AnimationState {
        self.inner.state.get()
    }

    /// 是否已结束
    pub fn is_finished(&self) -> bool {
        self.state().is_finished()
    }

    /// 标记动画正常完成，并依次执行已挂接的回调
    pub fn complete(&self) {
        self.settle(AnimationState::Completed);
    }

    /// 标记动画被跳过（未播放即结束），并依次执行已挂接的回调
    pub fn skip(&self) {
        self.settle(AnimationState::Skipped);
    }

    /// 挂接完成回调
    ///
    /// 已结束的句柄会立即执行回调；否则在结束时按挂接顺序执行。
    pub fn on_finish(&self, continuation: impl FnOnce() + 'static) {
        if self.is_finished() {
            continuation();
        } else {
            self.inner
                .continuations
                .borrow_mut()
                .push(Box::new(continuation));
        }
    }

    fn settle(&self, state: AnimationState) {
        if self.is_finished() {
            return;
        }
        self.inner.state.set(state);

        // 先取出再执行：回调可能再次访问本句柄
        let continuations = std::mem::take(&mut *self.inner.continuations.borrow_mut());
        for continuation in continuations {
            continuation();
        }
    }
}
