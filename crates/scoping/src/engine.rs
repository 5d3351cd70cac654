//! 作用域引擎实现
//!
//! 引擎围绕一个"初始化窗口"状态机工作: UI 实例构造开始时打开窗口
//! 并铸造作用域令牌，期间所有 UI 作用域解析都落入该令牌的缓存；
//! 构造出的 UI 实例确定身份后冲洗缓存，窗口关闭后解析改由
//! 上下文中的 UI 实例定位令牌。

use dashmap::DashMap;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, warn};
use viewbind_common::{
    BindingKey, InjectionResult, InstanceRef, ScopeContext, ScopeError, ScopeId, ScopeResult,
    SessionId, SessionListener, UiInstanceId,
};

/// 单个作用域令牌下的对象缓存
type ScopeCache = DashMap<BindingKey, InstanceRef>;

/// 初始化窗口内的待定作用域
struct PendingScope {
    token: ScopeId,
    session: SessionId,
    objects: Arc<ScopeCache>,
    flushed: bool,
}

/// 两级作用域引擎
///
/// 外层按会话分组，内层按作用域令牌缓存对象。
/// 同一时刻至多一个初始化窗口打开，调用方负责串行化 UI 实例构造。
pub struct ScopeEngine {
    window: Mutex<Option<PendingScope>>,
    scopes: DashMap<SessionId, Arc<DashMap<ScopeId, Arc<ScopeCache>>>>,
    ui_to_scope: DashMap<UiInstanceId, (SessionId, ScopeId)>,
}

impl ScopeEngine {
    /// 创建空引擎
    pub fn new() -> Self {
        Self {
            window: Mutex::new(None),
            scopes: DashMap::new(),
            ui_to_scope: DashMap::new(),
        }
    }

    /// 打开初始化窗口并铸造作用域令牌
    ///
    /// 窗口已打开时返回错误，令牌在整个窗口期间保持不变
    pub fn start_scope_init(&self, session: SessionId) -> ScopeResult<ScopeId> {
        let mut window = self.window.lock();
        if window.is_some() {
            return Err(ScopeError::WindowAlreadyOpen);
        }
        let token = ScopeId::mint();
        *window = Some(PendingScope {
            token,
            session,
            objects: Arc::new(DashMap::new()),
            flushed: false,
        });
        debug!(%session, %token, "作用域初始化窗口已打开");
        Ok(token)
    }

    /// 把待定作用域与构造完成的 UI 实例关联并发布
    ///
    /// 窗口保持打开，直到 end_scope_init 关闭
    pub fn flush_initial_scope_set(&self, ui: UiInstanceId) -> ScopeResult<()> {
        let mut window = self.window.lock();
        let pending = window.as_mut().ok_or(ScopeError::WindowNotOpen)?;
        if pending.flushed || self.ui_to_scope.contains_key(&ui) {
            return Err(ScopeError::ScopeAlreadyAssigned { ui: ui.to_string() });
        }
        self.publish(pending.session, pending.token, Arc::clone(&pending.objects));
        self.ui_to_scope
            .insert(ui, (pending.session, pending.token));
        pending.flushed = true;
        debug!(%ui, token = %pending.token, "初始作用域集合已冲洗");
        Ok(())
    }

    /// 关闭初始化窗口
    ///
    /// 未冲洗的待定作用域仍提交到所属会话之下，随会话销毁回收；
    /// 窗口未打开时静默返回
    pub fn end_scope_init(&self) {
        let mut window = self.window.lock();
        match window.take() {
            Some(pending) => {
                if !pending.flushed {
                    self.publish(pending.session, pending.token, pending.objects);
                }
                debug!(token = %pending.token, "作用域初始化窗口已关闭");
            }
            None => debug!("end_scope_init 在窗口未打开时调用，忽略"),
        }
    }

    /// 回滚初始化窗口
    ///
    /// 丢弃待定作用域中的全部对象；若已冲洗则一并撤销发布。
    /// 窗口未打开时静默返回
    pub fn rollback_scope_init(&self) {
        let mut window = self.window.lock();
        match window.take() {
            Some(pending) => {
                if pending.flushed {
                    if let Some(session_scopes) = self.scopes.get(&pending.session) {
                        session_scopes.remove(&pending.token);
                    }
                    self.ui_to_scope.retain(|_, v| v.1 != pending.token);
                }
                warn!(token = %pending.token, "作用域初始化已回滚");
            }
            None => debug!("rollback_scope_init 在窗口未打开时调用，忽略"),
        }
    }

    /// 在上下文确定的作用域内解析或创建对象
    ///
    /// 同一 (作用域令牌, 绑定键) 下 create 至多执行一次；
    /// 窗口打开期间解析落入待定作用域，上下文不得携带当前 UI
    pub fn scope<F>(
        &self,
        key: &BindingKey,
        ctx: &ScopeContext,
        create: F,
    ) -> ScopeResult<InstanceRef>
    where
        F: FnOnce() -> InjectionResult<InstanceRef>,
    {
        let cache = self.locate_cache(ctx)?;
        if let Some(existing) = cache.get(key) {
            return Ok(Arc::clone(existing.value()));
        }
        let created = create().map_err(|source| ScopeError::ObjectCreationFailed {
            key: key.to_string(),
            source: Box::new(source),
        })?;
        let entry = cache.entry(key.clone()).or_insert(created);
        Ok(Arc::clone(entry.value()))
    }

    /// 查询 UI 实例关联的作用域令牌
    pub fn scope_of(&self, ui: UiInstanceId) -> Option<ScopeId> {
        self.ui_to_scope.get(&ui).map(|entry| entry.value().1)
    }

    /// 销毁会话并回收其全部作用域缓存
    pub fn destroy_session(&self, session: SessionId) {
        let removed = self
            .scopes
            .remove(&session)
            .map(|(_, scopes)| scopes.len())
            .unwrap_or(0);
        self.ui_to_scope.retain(|_, v| v.0 != session);
        debug!(%session, scopes = removed, "会话作用域已回收");
    }

    /// 初始化窗口当前是否打开
    pub fn window_open(&self) -> bool {
        self.window.lock().is_some()
    }

    /// 会话当前持有的作用域数量
    pub fn scope_count(&self, session: SessionId) -> usize {
        self.scopes
            .get(&session)
            .map(|scopes| scopes.len())
            .unwrap_or(0)
    }

    fn publish(&self, session: SessionId, token: ScopeId, objects: Arc<ScopeCache>) {
        self.scopes
            .entry(session)
            .or_insert_with(|| Arc::new(DashMap::new()))
            .insert(token, objects);
    }

    /// 定位上下文对应的对象缓存
    ///
    /// 创建回调可能递归解析其它作用域对象，因此不能持有窗口锁返回
    fn locate_cache(&self, ctx: &ScopeContext) -> ScopeResult<Arc<ScopeCache>> {
        let window = self.window.lock();
        if let Some(pending) = window.as_ref() {
            if pending.session != ctx.session {
                return Err(ScopeError::ForeignWindow {
                    session: pending.session.to_string(),
                });
            }
            if ctx.current_ui.is_some() {
                return Err(ScopeError::ContextConflict);
            }
            return Ok(Arc::clone(&pending.objects));
        }
        drop(window);

        let ui = ctx.current_ui.ok_or(ScopeError::NoResolvableScope)?;
        let (session, token) = *self
            .ui_to_scope
            .get(&ui)
            .ok_or(ScopeError::UiNotRegistered { ui: ui.to_string() })?
            .value();
        let session_scopes = self
            .scopes
            .get(&session)
            .ok_or(ScopeError::UiNotRegistered { ui: ui.to_string() })?;
        let cache = session_scopes
            .get(&token)
            .ok_or(ScopeError::UiNotRegistered { ui: ui.to_string() })?;
        Ok(Arc::clone(cache.value()))
    }
}

impl Default for ScopeEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionListener for ScopeEngine {
    fn session_destroyed(&self, session: SessionId) {
        self.destroy_session(session);
    }
}

impl std::fmt::Debug for ScopeEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScopeEngine")
            .field("sessions", &self.scopes.len())
            .field("uis", &self.ui_to_scope.len())
            .field("window_open", &self.window_open())
            .finish()
    }
}
