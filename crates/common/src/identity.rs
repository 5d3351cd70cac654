//! 身份标识定义
//!
//! 会话、UI 实例与作用域令牌的不透明标识，以及显式作用域上下文

use std::fmt;
use uuid::Uuid;

/// 浏览器会话标识
///
/// 由宿主在会话建立时生成，整个会话生命周期内保持不变
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(Uuid);

impl SessionId {
    /// 生成新的会话标识
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "session-{}", self.0)
    }
}

/// UI 实例标识
///
/// 对应一个打开的根窗口实例，初始化完成后与唯一的作用域令牌关联
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UiInstanceId(Uuid);

impl UiInstanceId {
    /// 生成新的 UI 实例标识
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for UiInstanceId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UiInstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ui-{}", self.0)
    }
}

/// 作用域令牌
///
/// 在每次 UI 实例构造开始时铸造，一经关联不再重新生成
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(Uuid);

impl ScopeId {
    /// 铸造新的作用域令牌
    pub fn mint() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ScopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "scope-{}", self.0)
    }
}

/// 作用域上下文
///
/// 取代环境态的"当前 UI"，显式沿调用链传递
#[derive(Debug, Clone, Copy)]
pub struct ScopeContext {
    /// 当前会话
    pub session: SessionId,
    /// 当前 UI 实例，初始化窗口期间为 None
    pub current_ui: Option<UiInstanceId>,
}

impl ScopeContext {
    /// 创建绑定到具体 UI 实例的上下文
    pub fn of_ui(session: SessionId, ui: UiInstanceId) -> Self {
        Self {
            session,
            current_ui: Some(ui),
        }
    }

    /// 创建未绑定 UI 的上下文
    ///
    /// 用于初始化窗口内的解析，此时 UI 实例的身份尚不可观测
    pub fn unbound(session: SessionId) -> Self {
        Self {
            session,
            current_ui: None,
        }
    }
}
