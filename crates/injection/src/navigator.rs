//! 导航器
//!
//! 把导航状态解析为视图并在容器中展示，
//! 串起监听器否决、进入回调与错误视图回退。

use parking_lot::Mutex;
use std::any::TypeId;
use std::sync::Arc;
use tracing::{debug, warn};
use viewbind_common::{
    ErrorViewProvider, ScopeContext, View, ViewChangeEvent, ViewChangeListener, ViewContainer,
    ViewError, ViewResult, conventions,
};

use crate::provider::ViewProvider;

/// 单个 UI 实例的导航器
pub struct Navigator {
    provider: Arc<ViewProvider>,
    container: Arc<dyn ViewContainer>,
    listeners: Vec<Arc<dyn ViewChangeListener>>,
    error_view: Option<String>,
    error_view_provider: Option<Arc<dyn ErrorViewProvider>>,
    ui_type: TypeId,
    ctx: ScopeContext,
    current: Mutex<Option<String>>,
}

impl Navigator {
    /// 创建导航器
    ///
    /// ctx 必须绑定到具体 UI 实例
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        provider: Arc<ViewProvider>,
        container: Arc<dyn ViewContainer>,
        listeners: Vec<Arc<dyn ViewChangeListener>>,
        error_view: Option<String>,
        error_view_provider: Option<Arc<dyn ErrorViewProvider>>,
        ui_type: TypeId,
        ctx: ScopeContext,
    ) -> Self {
        Self {
            provider,
            container,
            listeners,
            error_view,
            error_view_provider,
            ui_type,
            ctx,
            current: Mutex::new(None),
        }
    }

    /// 当前展示的视图名称
    pub fn current_view(&self) -> Option<String> {
        self.current.lock().clone()
    }

    /// 导航到指定状态
    ///
    /// 状态无法解析或视图不适用于本 UI 时回退到错误视图;
    /// 没有可用回退则报错
    pub fn navigate_to(&self, state: &str) -> ViewResult<()> {
        let resolved = self
            .provider
            .resolve_view_name(state)
            .filter(|name| self.provider.is_navigable(name, self.ui_type));

        let (view_name, parameters) = match resolved {
            Some(name) => (name.to_string(), conventions::trailing_parameters(state).to_string()),
            None => {
                let fallback = self.error_view_for(state).ok_or_else(|| {
                    match self.provider.resolve_view_name(state) {
                        Some(name) => ViewError::NotNavigable {
                            view_name: name.to_string(),
                            ui_type: format!("{:?}", self.ui_type),
                        },
                        None => ViewError::NotRegistered {
                            view_name: conventions::leading_view_name(state).to_string(),
                        },
                    }
                })?;
                warn!(state, fallback = %fallback, "导航状态无法解析，回退到错误视图");
                // 错误视图把完整状态作为参数接收
                (fallback, state.to_string())
            }
        };

        let view = self.provider.get_view(&view_name, &self.ctx)?;
        let event = ViewChangeEvent {
            old_view: self.current_view(),
            new_view: view_name.clone(),
            parameters: parameters.clone(),
            ui: self
                .ctx
                .current_ui
                .ok_or(ViewError::NoCurrentUi)?,
        };

        for listener in &self.listeners {
            if !listener.before_view_change(&event) {
                debug!(view = %view_name, "导航被监听器否决");
                return Err(ViewError::NavigationCancelled {
                    view_name: view_name.clone(),
                });
            }
        }

        self.container.show(Arc::clone(&view).as_component());
        view.on_enter(&parameters);
        *self.current.lock() = Some(view_name);
        for listener in &self.listeners {
            listener.after_view_change(&event);
        }
        Ok(())
    }

    fn error_view_for(&self, state: &str) -> Option<String> {
        if let Some(name) = &self.error_view {
            return Some(name.clone());
        }
        if let Some(provider) = &self.error_view_provider {
            return provider.error_view_name(state);
        }
        None
    }
}

impl std::fmt::Debug for Navigator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Navigator")
            .field("current", &self.current_view())
            .field("listeners", &self.listeners.len())
            .field("error_view", &self.error_view)
            .finish()
    }
}
