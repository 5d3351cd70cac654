//! 生命周期定义

use crate::identity::SessionId;

/// 绑定生命周期类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lifetime {
    /// 单例模式 - 整个应用生命周期内只创建一个实例
    Singleton,
    /// UI 作用域模式 - 在同一 (会话, UI 实例) 内共享实例
    UiScoped,
    /// 瞬时模式 - 每次解析都创建新实例
    Transient,
}

impl Default for Lifetime {
    fn default() -> Self {
        Self::Transient
    }
}

/// 会话生命周期监听器
///
/// 显式的创建/销毁回调，取代弱引用映射的自动回收。
/// 会话销毁通知负责清理与该会话绑定的全部缓存状态。
pub trait SessionListener: Send + Sync {
    /// 会话初始化通知
    fn session_initialized(&self, _session: SessionId) {}

    /// 会话销毁通知
    fn session_destroyed(&self, _session: SessionId) {}
}
