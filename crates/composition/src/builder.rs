//! 服务端构建器
//!
//! 分阶段完成启动装配: 日志初始化、注册表构建、启动期校验、
//! 模块装配、内建绑定、注入器创建与解析器句柄填充。
//! 所有配置错误都在 build 阶段暴露，服务端一旦建成即视为一致。

use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;
use viewbind_common::{
    Binder, Binding, BindingKey, ClassRegistry, ClassRegistryBuilder, ConfigurationError,
    GlueResult, InjectionResult, InstanceRef, Lifetime, ListenerMetadata, ModuleCtor,
    ModuleMetadata, Resolver, ResolverHandle, ScopeContext, SessionListener, UiMetadata, UiRoot,
    View, ViewChangeListener, ViewMetadata,
};
use viewbind_injection::{Injector, ModuleAssembler, UiProvisioner, ViewProvider};
use viewbind_scoping::ScopeEngine;

use crate::config::{init_logging, DeploymentConfig, LoggingConfig};
use crate::server::ViewbindServer;

/// 服务端构建器
pub struct ViewbindServerBuilder {
    registry: ClassRegistryBuilder,
    config: DeploymentConfig,
    init_logging: bool,
    session_listeners: Vec<Arc<dyn SessionListener>>,
}

impl Default for ViewbindServerBuilder {
    fn default() -> Self {
        Self {
            registry: ClassRegistry::builder(),
            config: DeploymentConfig::default(),
            init_logging: true,
            session_listeners: Vec::new(),
        }
    }
}

impl ViewbindServerBuilder {
    /// 创建构建器
    pub fn new() -> Self {
        Self::default()
    }

    /// 应用部署配置
    pub fn with_deployment_config(mut self, config: DeploymentConfig) -> Self {
        self.config = config;
        self
    }

    /// 设置日志配置
    pub fn with_logging(mut self, logging: LoggingConfig) -> Self {
        self.config.logging = logging;
        self
    }

    /// 跳过日志初始化，由宿主自行安装订阅器
    pub fn without_logging_init(mut self) -> Self {
        self.init_logging = false;
        self
    }

    /// 登记一个 UI 类型
    pub fn register_ui<T, F>(mut self, metadata: UiMetadata, factory: F) -> Self
    where
        T: UiRoot + 'static,
        F: Fn(&dyn Resolver, &ScopeContext) -> InjectionResult<Arc<T>> + Send + Sync + 'static,
    {
        self.registry = self.registry.register_ui::<T, F>(metadata, factory);
        self
    }

    /// 登记一个视图类型
    pub fn register_view<T, F>(mut self, metadata: ViewMetadata, factory: F) -> Self
    where
        T: View + 'static,
        F: Fn(&dyn Resolver, &ScopeContext) -> InjectionResult<Arc<T>> + Send + Sync + 'static,
    {
        self.registry = self.registry.register_view::<T, F>(metadata, factory);
        self
    }

    /// 登记一个视图变更监听器类型
    pub fn register_listener<T, F>(mut self, metadata: ListenerMetadata, factory: F) -> Self
    where
        T: ViewChangeListener + 'static,
        F: Fn(&dyn Resolver, &ScopeContext) -> InjectionResult<Arc<T>> + Send + Sync + 'static,
    {
        self.registry = self.registry.register_listener::<T, F>(metadata, factory);
        self
    }

    /// 登记一个注入模块类型
    pub fn register_module<T: 'static>(
        mut self,
        metadata: ModuleMetadata,
        ctors: Vec<ModuleCtor>,
    ) -> Self {
        self.registry = self.registry.register_module::<T>(metadata, ctors);
        self
    }

    /// 登记一个注入模块类型并附加选项值
    pub fn register_module_with_options<T: 'static>(
        mut self,
        metadata: ModuleMetadata,
        ctors: Vec<ModuleCtor>,
        options: Option<InstanceRef>,
    ) -> Self {
        self.registry = self
            .registry
            .register_module_with_options::<T>(metadata, ctors, options);
        self
    }

    /// 登记一个宿主会话监听器，随会话初始化与销毁回调
    pub fn register_session_listener(mut self, listener: Arc<dyn SessionListener>) -> Self {
        self.session_listeners.push(listener);
        self
    }

    /// 完成装配
    pub fn build(mut self) -> GlueResult<ViewbindServer> {
        if self.init_logging {
            init_logging(&self.config.logging);
        }

        if !self.config.packages_to_scan.is_empty() {
            self.registry = self
                .registry
                .with_packages(self.config.packages_to_scan.clone());
        }
        let registry = Arc::new(self.registry.build()?);
        validate_registry(&registry)?;

        let engine = Arc::new(ScopeEngine::new());
        let resolver = ResolverHandle::new();

        let assembler = ModuleAssembler::new(Arc::clone(&registry), resolver.clone());
        let mut bindings = assembler.assemble()?;
        install_builtin_bindings(
            &mut bindings,
            Arc::clone(&registry),
            Arc::clone(&engine),
            resolver.clone(),
        );
        validate_companion_scopes(&registry, &bindings)?;

        let injector = Arc::new(Injector::new(bindings, Arc::clone(&engine)));
        resolver.set(Arc::clone(&injector) as Arc<dyn Resolver>);

        let provider = Arc::new(ViewProvider::new(
            &registry,
            Arc::clone(&engine),
            resolver.clone(),
        )?);
        validate_error_views(&registry, &provider)?;

        let provisioner = UiProvisioner::new(
            Arc::clone(&registry),
            resolver.clone(),
            Arc::clone(&provider),
        );
        // 框架监听器先行，宿主监听器随后收到回调
        let mut session_listeners: Vec<Arc<dyn SessionListener>> = vec![
            Arc::clone(&engine) as Arc<dyn SessionListener>,
            Arc::clone(&provider) as Arc<dyn SessionListener>,
        ];
        session_listeners.extend(self.session_listeners);

        info!(
            uis = registry.uis().len(),
            views = registry.views().len(),
            modules = registry.modules().len(),
            bindings = injector.binding_count(),
            "服务端装配完成"
        );
        Ok(ViewbindServer::assemble(
            registry,
            engine,
            injector,
            provider,
            provisioner,
            session_listeners,
        ))
    }
}

/// 注册表级校验: 路径唯一、错误选项互斥、适用 UI 引用有效
fn validate_registry(registry: &ClassRegistry) -> Result<(), ConfigurationError> {
    let mut paths: HashMap<&str, &str> = HashMap::new();
    for ui in registry.uis() {
        if let Some(first) = paths.insert(&ui.metadata.path, &ui.type_info.name) {
            return Err(ConfigurationError::DuplicateUiPath {
                path: ui.metadata.path.clone(),
                first: first.to_string(),
                second: ui.type_info.name.clone(),
            });
        }
        if ui.metadata.error_view.is_some() && ui.metadata.error_view_provider.is_some() {
            return Err(ConfigurationError::MutuallyExclusiveErrorOptions {
                ui_type: ui.type_info.name.clone(),
            });
        }
    }

    for view in registry.views() {
        if let Some(uis) = &view.metadata.applicable_uis {
            for ui_type in uis {
                let registration = registry.ui_by_type(*ui_type).ok_or_else(|| {
                    ConfigurationError::UnknownApplicableUi {
                        type_name: view.type_info.name.clone(),
                        ui_type: format!("{ui_type:?}"),
                    }
                })?;
                if registration.metadata.view_container.is_none() {
                    return Err(ConfigurationError::ViewContainerNotSet {
                        type_name: view.type_info.name.clone(),
                        ui_type: registration.type_info.name.clone(),
                    });
                }
            }
        }
    }
    for listener in registry.listeners() {
        if let Some(uis) = &listener.metadata.applicable_uis {
            for ui_type in uis {
                let registration = registry.ui_by_type(*ui_type).ok_or_else(|| {
                    ConfigurationError::UnknownApplicableUi {
                        type_name: listener.type_info.name.clone(),
                        ui_type: format!("{ui_type:?}"),
                    }
                })?;
                // 监听器只随导航器接线，没有视图容器的 UI 永远不会触发它
                if registration.metadata.view_container.is_none() {
                    return Err(ConfigurationError::ViewContainerNotSet {
                        type_name: listener.type_info.name.clone(),
                        ui_type: registration.type_info.name.clone(),
                    });
                }
            }
        }
    }
    Ok(())
}

/// 校验 UI 伴随组件的绑定存在且为 UI 作用域
fn validate_companion_scopes(
    registry: &ClassRegistry,
    bindings: &HashMap<BindingKey, Binding>,
) -> Result<(), ConfigurationError> {
    let check = |ui_type: &str, key: &BindingKey| match bindings.get(key) {
        Some(binding) if binding.lifetime == Lifetime::UiScoped => Ok(()),
        _ => Err(ConfigurationError::CompanionNotUiScoped {
            ui_type: ui_type.to_string(),
            companion: key.to_string(),
        }),
    };
    for ui in registry.uis() {
        if let Some(content) = &ui.metadata.content {
            check(&ui.type_info.name, content)?;
        }
        if let Some(container) = &ui.metadata.view_container {
            check(&ui.type_info.name, &container.key)?;
        }
    }
    Ok(())
}

/// 校验显式错误视图名均已登记
fn validate_error_views(
    registry: &ClassRegistry,
    provider: &ViewProvider,
) -> Result<(), ConfigurationError> {
    for ui in registry.uis() {
        if let Some(view_name) = &ui.metadata.error_view {
            if provider.registration(view_name).is_none() {
                return Err(ConfigurationError::UnknownErrorView {
                    ui_type: ui.type_info.name.clone(),
                    view_name: view_name.clone(),
                });
            }
        }
    }
    Ok(())
}

/// 安装框架自身的内建绑定
///
/// 应用模块中的同键绑定优先于内建绑定
fn install_builtin_bindings(
    bindings: &mut HashMap<BindingKey, Binding>,
    registry: Arc<ClassRegistry>,
    engine: Arc<ScopeEngine>,
    resolver: ResolverHandle,
) {
    let mut binder = Binder::new();
    binder.bind_instance::<ClassRegistry>(registry);
    binder.bind_instance::<ScopeEngine>(engine);
    binder.bind_provider::<ResolverHandle, _>(Lifetime::Singleton, move |_, _| {
        Ok(Arc::new(resolver.clone()))
    });
    for (key, binding) in binder.into_bindings() {
        bindings.entry(key).or_insert(binding);
    }
}
