//! UI 实例装配
//!
//! 在作用域初始化窗口内完成单个 UI 实例的构造与接线:
//! 根内容、错误处理器、视图容器、监听器与导航器。

use std::sync::Arc;
use tracing::debug;
use viewbind_common::{
    ClassRegistry, GlueResult, ResolverHandle, ScopeContext, SessionId, UiInstanceId,
    UiRegistration, UiRoot, ViewChangeListener,
};

use crate::navigator::Navigator;
use crate::provider::ViewProvider;

/// 装配完成的 UI 实例
pub struct ProvisionedUi {
    /// 根窗口实例
    pub ui: Arc<dyn UiRoot>,
    /// 导航器，仅在配置了视图容器时存在
    pub navigator: Option<Arc<Navigator>>,
}

/// UI 装配器
pub struct UiProvisioner {
    registry: Arc<ClassRegistry>,
    resolver: ResolverHandle,
    provider: Arc<ViewProvider>,
}

impl UiProvisioner {
    /// 创建装配器
    pub fn new(
        registry: Arc<ClassRegistry>,
        resolver: ResolverHandle,
        provider: Arc<ViewProvider>,
    ) -> Self {
        Self {
            registry,
            resolver,
            provider,
        }
    }

    /// 装配一个 UI 实例
    ///
    /// 必须在已打开的初始化窗口内调用，所有 UI 作用域解析
    /// 因此落入本次铸造的作用域令牌
    pub fn provision(
        &self,
        registration: &UiRegistration,
        session: SessionId,
        ui_id: UiInstanceId,
    ) -> GlueResult<ProvisionedUi> {
        let resolver = self.resolver.get()?;
        let ctx = ScopeContext::unbound(session);

        let ui = (registration.factory)(resolver.as_ref(), &ctx)?;

        if let Some(content) = &registration.metadata.content {
            let component = resolver.resolve_any(content, &ctx)?;
            ui.set_content(component);
        }
        if let Some(factory) = &registration.metadata.error_handler {
            let handler = factory(resolver.as_ref(), &ctx)?;
            ui.set_error_handler(handler);
        }

        let navigator = match &registration.metadata.view_container {
            Some(binding) => {
                let container = (binding.factory)(resolver.as_ref(), &ctx)?;
                let listeners: Vec<Arc<dyn ViewChangeListener>> = self
                    .registry
                    .listeners_for(registration.type_info.id)
                    .into_iter()
                    .map(|l| (l.factory)(resolver.as_ref(), &ctx))
                    .collect::<Result<_, _>>()?;
                let error_view_provider = registration
                    .metadata
                    .error_view_provider
                    .as_ref()
                    .map(|f| f(resolver.as_ref(), &ctx))
                    .transpose()?;
                // 显式错误视图优先，其次错误视图提供者，最后注册表级错误视图;
                // 构建期校验保证前两者互斥
                let error_view = registration.metadata.error_view.clone().or_else(|| {
                    if error_view_provider.is_some() {
                        None
                    } else {
                        self.provider.error_view_name().map(str::to_string)
                    }
                });
                Some(Arc::new(Navigator::new(
                    Arc::clone(&self.provider),
                    container,
                    listeners,
                    error_view,
                    error_view_provider,
                    registration.type_info.id,
                    ScopeContext::of_ui(session, ui_id),
                )))
            }
            None => None,
        };

        debug!(
            ui_type = %registration.type_info.name,
            %session,
            %ui_id,
            navigator = navigator.is_some(),
            "UI 实例装配完成"
        );
        Ok(ProvisionedUi { ui, navigator })
    }
}
