//! 服务端运行时
//!
//! 对接宿主的会话与窗口生命周期: 会话建立/销毁的扇出通知，
//! 以及按路径创建 UI 实例的完整三段式流程。

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{info, warn};
use viewbind_common::{
    ClassRegistry, ConfigurationError, GlueResult, LifecycleError, SessionId, SessionListener,
    UiInstanceId, UiRoot,
};
use viewbind_injection::{Injector, Navigator, UiProvisioner, ViewProvider};
use viewbind_scoping::ScopeEngine;

use crate::builder::ViewbindServerBuilder;

/// 会话记录
struct SessionRecord {
    uis: Vec<UiInstanceId>,
    created_at: DateTime<Utc>,
}

/// 创建完成的 UI 实例句柄
pub struct UiHandle {
    /// 所属会话
    pub session: SessionId,
    /// UI 实例标识
    pub id: UiInstanceId,
    /// 根窗口实例
    pub ui: Arc<dyn UiRoot>,
    /// 导航器，仅在 UI 配置了视图容器时存在
    pub navigator: Option<Arc<Navigator>>,
}

/// 服务端运行时指标
#[derive(Debug, Clone)]
pub struct ServerMetrics {
    /// 活跃会话数
    pub sessions: usize,
    /// 活跃 UI 实例数
    pub active_uis: usize,
    /// 绑定总数
    pub bindings: usize,
    /// 启动时间
    pub started_at: DateTime<Utc>,
}

/// Viewbind 服务端
pub struct ViewbindServer {
    registry: Arc<ClassRegistry>,
    engine: Arc<ScopeEngine>,
    injector: Arc<Injector>,
    provider: Arc<ViewProvider>,
    provisioner: UiProvisioner,
    session_listeners: Vec<Arc<dyn SessionListener>>,
    sessions: DashMap<SessionId, SessionRecord>,
    // 串行化 UI 实例构造，保证初始化窗口不重叠
    ui_construction: Mutex<()>,
    started_at: DateTime<Utc>,
}

impl ViewbindServer {
    /// 创建服务端构建器
    pub fn builder() -> ViewbindServerBuilder {
        ViewbindServerBuilder::new()
    }

    pub(crate) fn assemble(
        registry: Arc<ClassRegistry>,
        engine: Arc<ScopeEngine>,
        injector: Arc<Injector>,
        provider: Arc<ViewProvider>,
        provisioner: UiProvisioner,
        session_listeners: Vec<Arc<dyn SessionListener>>,
    ) -> Self {
        Self {
            registry,
            engine,
            injector,
            provider,
            provisioner,
            session_listeners,
            sessions: DashMap::new(),
            ui_construction: Mutex::new(()),
            started_at: Utc::now(),
        }
    }

    /// 建立新会话
    pub fn init_session(&self) -> SessionId {
        let session = SessionId::new();
        self.sessions.insert(
            session,
            SessionRecord {
                uis: Vec::new(),
                created_at: Utc::now(),
            },
        );
        for listener in &self.session_listeners {
            listener.session_initialized(session);
        }
        info!(%session, "会话已建立");
        session
    }

    /// 销毁会话并回收其全部作用域与缓存
    pub fn destroy_session(&self, session: SessionId) -> GlueResult<()> {
        let (_, record) =
            self.sessions
                .remove(&session)
                .ok_or(LifecycleError::SessionNotInitialized {
                    session: session.to_string(),
                })?;
        for listener in &self.session_listeners {
            listener.session_destroyed(session);
        }
        info!(
            %session,
            uis = record.uis.len(),
            lived = %(Utc::now() - record.created_at),
            "会话已销毁"
        );
        Ok(())
    }

    /// 按路径创建 UI 实例
    ///
    /// 构造、装配、冲洗、关窗四步依次进行，任一步失败即回滚，
    /// 不留下半初始化的作用域
    pub fn create_ui(&self, session: SessionId, path: &str) -> GlueResult<UiHandle> {
        if !self.sessions.contains_key(&session) {
            return Err(LifecycleError::SessionNotInitialized {
                session: session.to_string(),
            }
            .into());
        }
        let registration =
            self.registry
                .ui_by_path(path)
                .ok_or_else(|| ConfigurationError::UnknownUiPath {
                    path: path.to_string(),
                })?;

        let _guard = self.ui_construction.lock();
        let ui_id = UiInstanceId::new();
        self.engine
            .start_scope_init(session)
            .map_err(viewbind_common::GlueError::from)?;

        let provisioned = match self.provisioner.provision(registration, session, ui_id) {
            Ok(provisioned) => provisioned,
            Err(e) => {
                self.engine.rollback_scope_init();
                warn!(path, %session, error = %e, "UI 实例创建失败，已回滚");
                return Err(e);
            }
        };
        if let Err(e) = self.engine.flush_initial_scope_set(ui_id) {
            self.engine.rollback_scope_init();
            return Err(e.into());
        }
        self.engine.end_scope_init();

        if let Some(mut record) = self.sessions.get_mut(&session) {
            record.uis.push(ui_id);
        }
        info!(path, %session, %ui_id, ui_type = %registration.type_info.name, "UI 实例已创建");
        Ok(UiHandle {
            session,
            id: ui_id,
            ui: provisioned.ui,
            navigator: provisioned.navigator,
        })
    }

    /// 注入器
    pub fn injector(&self) -> &Arc<Injector> {
        &self.injector
    }

    /// 作用域引擎
    pub fn scope_engine(&self) -> &Arc<ScopeEngine> {
        &self.engine
    }

    /// 视图提供者
    pub fn view_provider(&self) -> &Arc<ViewProvider> {
        &self.provider
    }

    /// 类注册表
    pub fn registry(&self) -> &Arc<ClassRegistry> {
        &self.registry
    }

    /// 运行时指标快照
    pub fn metrics(&self) -> ServerMetrics {
        ServerMetrics {
            sessions: self.sessions.len(),
            active_uis: self.sessions.iter().map(|r| r.uis.len()).sum(),
            bindings: self.injector.binding_count(),
            started_at: self.started_at,
        }
    }
}

impl std::fmt::Debug for ViewbindServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewbindServer")
            .field("sessions", &self.sessions.len())
            .field("started_at", &self.started_at)
            .finish()
    }
}
