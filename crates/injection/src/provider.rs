//! 视图提供者
//!
//! 按名称解析视图注册项，并以 (会话, UI 实例, 视图名) 为键
//! 惰性缓存视图实例。视图构造在独立的作用域初始化窗口内进行，
//! 失败时回滚，不留下半初始化状态。

use dashmap::DashMap;
use parking_lot::Mutex;
use std::any::TypeId;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};
use viewbind_common::{
    ClassRegistry, ConfigurationError, ConfigurationResult, InjectionError, LifecycleError,
    LifecycleResult, ResolverHandle, ScopeContext, SessionId, SessionListener, UiInstanceId, View,
    ViewError, ViewRegistration, ViewResult, conventions,
};
use viewbind_scoping::ScopeEngine;

/// 单个会话内的视图缓存
type SessionViewCache = DashMap<(UiInstanceId, String), Arc<dyn View>>;

/// 视图提供者
pub struct ViewProvider {
    engine: Arc<ScopeEngine>,
    resolver: ResolverHandle,
    views: HashMap<String, ViewRegistration>,
    error_view: Option<String>,
    cache: DashMap<SessionId, Arc<SessionViewCache>>,
    // 串行化视图构造，保证同一键的工厂至多执行一次
    construction: Mutex<()>,
}

impl ViewProvider {
    /// 从注册表构建视图提供者
    ///
    /// 未显式命名的视图按约定从类型名派生名称，名称冲突即报错
    pub fn new(
        registry: &ClassRegistry,
        engine: Arc<ScopeEngine>,
        resolver: ResolverHandle,
    ) -> ConfigurationResult<Self> {
        let mut views: HashMap<String, ViewRegistration> = HashMap::new();
        let mut error_view = None;
        for registration in registry.views() {
            let name = match &registration.metadata.name {
                Some(name) => name.clone(),
                None => conventions::derive_view_name(registration.type_info.short_name()),
            };
            if let Some(existing) = views.get(&name) {
                return Err(ConfigurationError::DuplicateViewName {
                    view_name: name,
                    first: existing.type_info.name.clone(),
                    second: registration.type_info.name.clone(),
                });
            }
            if registration.metadata.is_error_view {
                error_view = Some(name.clone());
            }
            debug!(view = %name, type_name = %registration.type_info.name, "视图已登记");
            views.insert(name, registration.clone());
        }
        info!(views = views.len(), "视图提供者已就绪");
        Ok(Self {
            engine,
            resolver,
            views,
            error_view,
            cache: DashMap::new(),
            construction: Mutex::new(()),
        })
    }

    /// 已登记的全部视图名称
    pub fn view_names(&self) -> impl Iterator<Item = &str> {
        self.views.keys().map(String::as_str)
    }

    /// 注册表级的错误视图名称
    pub fn error_view_name(&self) -> Option<&str> {
        self.error_view.as_deref()
    }

    /// 从导航状态解析视图名
    ///
    /// 取首个 `/` 之前的部分与已登记名称精确匹配，无匹配返回 None
    pub fn resolve_view_name<'a>(&self, state: &'a str) -> Option<&'a str> {
        let name = conventions::leading_view_name(state);
        if self.views.contains_key(name) {
            Some(name)
        } else {
            None
        }
    }

    /// 查询视图登记项
    pub fn registration(&self, view_name: &str) -> Option<&ViewRegistration> {
        self.views.get(view_name)
    }

    /// 检查视图是否适用于指定 UI 类型
    pub fn is_navigable(&self, view_name: &str, ui_type: TypeId) -> bool {
        self.views
            .get(view_name)
            .map(|v| v.applies_to(ui_type))
            .unwrap_or(false)
    }

    /// 获取视图实例
    ///
    /// 同一 (会话, UI 实例, 视图名) 返回同一实例;
    /// 首次获取时在独立的作用域窗口内构造，失败即回滚且不缓存。
    /// 会话缓存桶必须已经初始化，否则报错
    pub fn get_view(&self, view_name: &str, ctx: &ScopeContext) -> ViewResult<Arc<dyn View>> {
        let registration =
            self.views
                .get(view_name)
                .ok_or_else(|| ViewError::NotRegistered {
                    view_name: view_name.to_string(),
                })?;
        let ui = ctx.current_ui.ok_or(ViewError::NoCurrentUi)?;
        // 缓存桶只在会话初始化时创建，销毁后不得复活
        let session_cache = self
            .cache
            .get(&ctx.session)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| ViewError::SessionNotInitialized {
                session: ctx.session.to_string(),
            })?;
        let cache_key = (ui, view_name.to_string());

        if let Some(existing) = session_cache.get(&cache_key) {
            return Ok(Arc::clone(existing.value()));
        }

        let _guard = self.construction.lock();
        // 锁内复查，避免重复构造
        if let Some(existing) = session_cache.get(&cache_key) {
            return Ok(Arc::clone(existing.value()));
        }

        let view = self.construct(view_name, registration, ctx.session)?;
        session_cache.insert(cache_key, Arc::clone(&view));
        Ok(view)
    }

    /// 在独立的初始化窗口内构造视图
    fn construct(
        &self,
        view_name: &str,
        registration: &ViewRegistration,
        session: SessionId,
    ) -> ViewResult<Arc<dyn View>> {
        let resolver = self
            .resolver
            .get()
            .map_err(|source| ViewError::ConstructionFailed {
                view_name: view_name.to_string(),
                source,
            })?;
        self.engine
            .start_scope_init(session)
            .map_err(|e| ViewError::ConstructionFailed {
                view_name: view_name.to_string(),
                source: InjectionError::from(e),
            })?;
        let window_ctx = ScopeContext::unbound(session);
        match (registration.factory)(resolver.as_ref(), &window_ctx) {
            Ok(view) => {
                self.engine.end_scope_init();
                debug!(view = %view_name, %session, "视图构造完成");
                Ok(view)
            }
            Err(source) => {
                self.engine.rollback_scope_init();
                warn!(view = %view_name, %session, error = %source, "视图构造失败，作用域已回滚");
                Err(ViewError::ConstructionFailed {
                    view_name: view_name.to_string(),
                    source,
                })
            }
        }
    }

    /// 初始化会话的视图缓存
    pub fn init_session(&self, session: SessionId) -> LifecycleResult<()> {
        if self.cache.contains_key(&session) {
            return Err(LifecycleError::SessionAlreadyInitialized {
                session: session.to_string(),
            });
        }
        self.cache.insert(session, Arc::new(DashMap::new()));
        Ok(())
    }

    /// 销毁会话的视图缓存
    pub fn destroy_session(&self, session: SessionId) {
        if let Some((_, cache)) = self.cache.remove(&session) {
            debug!(%session, views = cache.len(), "会话视图缓存已回收");
        }
    }
}

impl SessionListener for ViewProvider {
    fn session_initialized(&self, session: SessionId) {
        if let Err(e) = self.init_session(session) {
            warn!(%session, error = %e, "会话视图缓存重复初始化");
        }
    }

    fn session_destroyed(&self, session: SessionId) {
        self.destroy_session(session);
    }
}

impl std::fmt::Debug for ViewProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewProvider")
            .field("views", &self.views.len())
            .field("sessions", &self.cache.len())
            .finish()
    }
}
