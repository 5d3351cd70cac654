//! 类注册表
//!
//! 反射扫描的显式等价物: 应用在启动前把 UI、视图、模块与监听器
//! 逐一登记到注册表，后续所有发现逻辑都只查这张表。

use crate::binding::{InstanceRef, Module, Resolver, ResolverHandle};
use crate::component::{UiRoot, View, ViewChangeListener};
use crate::errors::{ConfigurationError, InjectionError};
use crate::identity::ScopeContext;
use crate::metadata::{ListenerMetadata, ModuleMetadata, TypeInfo, UiMetadata, ViewMetadata};
use std::any::TypeId;
use std::sync::Arc;
use tracing::debug;

/// UI 实例工厂
pub type UiFactory = Arc<
    dyn Fn(&dyn Resolver, &ScopeContext) -> Result<Arc<dyn UiRoot>, InjectionError> + Send + Sync,
>;

/// 视图实例工厂
pub type ViewFactory = Arc<
    dyn Fn(&dyn Resolver, &ScopeContext) -> Result<Arc<dyn View>, InjectionError> + Send + Sync,
>;

/// 视图变更监听器工厂
pub type ListenerFactory = Arc<
    dyn Fn(&dyn Resolver, &ScopeContext) -> Result<Arc<dyn ViewChangeListener>, InjectionError>
        + Send
        + Sync,
>;

/// 模块构造函数
///
/// 模块可以不带参数，也可以接收注册表、延迟解析器句柄
/// 或登记时附加的选项值。组装器按声明顺序取第一个可满足的
/// 构造函数，选项构造函数只有在登记项附加了选项时才可满足。
#[derive(Clone)]
pub enum ModuleCtor {
    /// 无参构造
    Default(Arc<dyn Fn() -> Arc<dyn Module> + Send + Sync>),
    /// 接收类注册表
    WithRegistry(Arc<dyn Fn(Arc<ClassRegistry>) -> Arc<dyn Module> + Send + Sync>),
    /// 接收延迟解析器句柄
    WithResolver(Arc<dyn Fn(ResolverHandle) -> Arc<dyn Module> + Send + Sync>),
    /// 接收登记时附加的选项值
    WithOptions(Arc<dyn Fn(InstanceRef) -> Arc<dyn Module> + Send + Sync>),
}

impl std::fmt::Debug for ModuleCtor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Default(_) => write!(f, "ModuleCtor::Default"),
            Self::WithRegistry(_) => write!(f, "ModuleCtor::WithRegistry"),
            Self::WithResolver(_) => write!(f, "ModuleCtor::WithResolver"),
            Self::WithOptions(_) => write!(f, "ModuleCtor::WithOptions"),
        }
    }
}

/// UI 登记项
#[derive(Clone)]
pub struct UiRegistration {
    /// UI 类型信息
    pub type_info: TypeInfo,
    /// 声明式配置
    pub metadata: UiMetadata,
    /// 实例工厂
    pub factory: UiFactory,
}

/// 视图登记项
#[derive(Clone)]
pub struct ViewRegistration {
    /// 视图类型信息
    pub type_info: TypeInfo,
    /// 声明式配置
    pub metadata: ViewMetadata,
    /// 实例工厂
    pub factory: ViewFactory,
}

impl ViewRegistration {
    /// 检查视图是否适用于指定 UI 类型
    pub fn applies_to(&self, ui_type: TypeId) -> bool {
        match &self.metadata.applicable_uis {
            Some(uis) => uis.contains(&ui_type),
            None => true,
        }
    }
}

/// 视图变更监听器登记项
#[derive(Clone)]
pub struct ListenerRegistration {
    /// 监听器类型信息
    pub type_info: TypeInfo,
    /// 声明式配置
    pub metadata: ListenerMetadata,
    /// 实例工厂
    pub factory: ListenerFactory,
}

impl ListenerRegistration {
    /// 检查监听器是否适用于指定 UI 类型
    pub fn applies_to(&self, ui_type: TypeId) -> bool {
        match &self.metadata.applicable_uis {
            Some(uis) => uis.contains(&ui_type),
            None => true,
        }
    }
}

/// 注入模块登记项
#[derive(Clone)]
pub struct ModuleRegistration {
    /// 模块类型信息
    pub type_info: TypeInfo,
    /// 声明式配置
    pub metadata: ModuleMetadata,
    /// 候选构造函数，按声明顺序
    pub ctors: Vec<ModuleCtor>,
    /// 登记时附加的选项值，供选项构造函数消费
    pub options: Option<InstanceRef>,
}

impl std::fmt::Debug for ModuleRegistration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModuleRegistration")
            .field("type_info", &self.type_info)
            .field("metadata", &self.metadata)
            .field("ctors", &self.ctors)
            .field("options", &self.options.is_some())
            .finish()
    }
}

/// 类注册表
///
/// 启动时构建，此后只读
pub struct ClassRegistry {
    uis: Vec<UiRegistration>,
    views: Vec<ViewRegistration>,
    listeners: Vec<ListenerRegistration>,
    modules: Vec<ModuleRegistration>,
}

impl ClassRegistry {
    /// 创建注册表构建器
    pub fn builder() -> ClassRegistryBuilder {
        ClassRegistryBuilder::default()
    }

    /// 全部 UI 登记项
    pub fn uis(&self) -> &[UiRegistration] {
        &self.uis
    }

    /// 全部视图登记项
    pub fn views(&self) -> &[ViewRegistration] {
        &self.views
    }

    /// 全部监听器登记项
    pub fn listeners(&self) -> &[ListenerRegistration] {
        &self.listeners
    }

    /// 全部模块登记项
    pub fn modules(&self) -> &[ModuleRegistration] {
        &self.modules
    }

    /// 按路径查找 UI 登记项
    pub fn ui_by_path(&self, path: &str) -> Option<&UiRegistration> {
        self.uis.iter().find(|ui| ui.metadata.path == path)
    }

    /// 按类型查找 UI 登记项
    pub fn ui_by_type(&self, ui_type: TypeId) -> Option<&UiRegistration> {
        self.uis.iter().find(|ui| ui.type_info.id == ui_type)
    }

    /// 适用于指定 UI 类型的监听器登记项
    pub fn listeners_for(&self, ui_type: TypeId) -> Vec<&ListenerRegistration> {
        self.listeners
            .iter()
            .filter(|l| l.applies_to(ui_type))
            .collect()
    }
}

impl std::fmt::Debug for ClassRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClassRegistry")
            .field("uis", &self.uis.len())
            .field("views", &self.views.len())
            .field("listeners", &self.listeners.len())
            .field("modules", &self.modules.len())
            .finish()
    }
}

/// 注册表构建器
#[derive(Default)]
pub struct ClassRegistryBuilder {
    uis: Vec<UiRegistration>,
    views: Vec<ViewRegistration>,
    listeners: Vec<ListenerRegistration>,
    modules: Vec<ModuleRegistration>,
    packages: Option<Vec<String>>,
}

impl ClassRegistryBuilder {
    /// 限定参与装配的包前缀，未登记在这些包下的项会被过滤掉
    pub fn with_packages(mut self, packages: Vec<String>) -> Self {
        self.packages = Some(packages);
        self
    }

    /// 登记一个 UI 类型
    pub fn register_ui<T, F>(mut self, metadata: UiMetadata, factory: F) -> Self
    where
        T: UiRoot + 'static,
        F: Fn(&dyn Resolver, &ScopeContext) -> Result<Arc<T>, InjectionError>
            + Send
            + Sync
            + 'static,
    {
        self.uis.push(UiRegistration {
            type_info: TypeInfo::of::<T>(),
            metadata,
            factory: Arc::new(move |resolver, ctx| {
                factory(resolver, ctx).map(|ui| ui as Arc<dyn UiRoot>)
            }),
        });
        self
    }

    /// 登记一个视图类型
    pub fn register_view<T, F>(mut self, metadata: ViewMetadata, factory: F) -> Self
    where
        T: View + 'static,
        F: Fn(&dyn Resolver, &ScopeContext) -> Result<Arc<T>, InjectionError>
            + Send
            + Sync
            + 'static,
    {
        self.views.push(ViewRegistration {
            type_info: TypeInfo::of::<T>(),
            metadata,
            factory: Arc::new(move |resolver, ctx| {
                factory(resolver, ctx).map(|view| view as Arc<dyn View>)
            }),
        });
        self
    }

    /// 登记一个视图变更监听器类型
    pub fn register_listener<T, F>(mut self, metadata: ListenerMetadata, factory: F) -> Self
    where
        T: ViewChangeListener + 'static,
        F: Fn(&dyn Resolver, &ScopeContext) -> Result<Arc<T>, InjectionError>
            + Send
            + Sync
            + 'static,
    {
        self.listeners.push(ListenerRegistration {
            type_info: TypeInfo::of::<T>(),
            metadata,
            factory: Arc::new(move |resolver, ctx| {
                factory(resolver, ctx).map(|l| l as Arc<dyn ViewChangeListener>)
            }),
        });
        self
    }

    /// 登记一个注入模块类型
    pub fn register_module<T: 'static>(
        self,
        metadata: ModuleMetadata,
        ctors: Vec<ModuleCtor>,
    ) -> Self {
        self.register_module_with_options::<T>(metadata, ctors, None)
    }

    /// 登记一个注入模块类型并附加选项值
    pub fn register_module_with_options<T: 'static>(
        mut self,
        metadata: ModuleMetadata,
        ctors: Vec<ModuleCtor>,
        options: Option<InstanceRef>,
    ) -> Self {
        self.modules.push(ModuleRegistration {
            type_info: TypeInfo::of::<T>(),
            metadata,
            ctors,
            options,
        });
        self
    }

    /// 完成构建
    ///
    /// 适用 UI 限制列表不允许为空，错误视图整个注册表至多一个
    pub fn build(mut self) -> Result<ClassRegistry, ConfigurationError> {
        if let Some(packages) = &self.packages {
            let keep = |info: &TypeInfo| {
                let kept = packages.iter().any(|p| info.in_package(p));
                if !kept {
                    debug!(type_path = %info.module_path, "类型不在扫描包范围内，已跳过");
                }
                kept
            };
            self.uis.retain(|r| keep(&r.type_info));
            self.views.retain(|r| keep(&r.type_info));
            self.listeners.retain(|r| keep(&r.type_info));
            self.modules.retain(|r| keep(&r.type_info));
        }

        for view in &self.views {
            if matches!(&view.metadata.applicable_uis, Some(uis) if uis.is_empty()) {
                return Err(ConfigurationError::EmptyApplicableUis {
                    type_name: view.type_info.name.clone(),
                });
            }
        }
        for listener in &self.listeners {
            if matches!(&listener.metadata.applicable_uis, Some(uis) if uis.is_empty()) {
                return Err(ConfigurationError::EmptyApplicableUis {
                    type_name: listener.type_info.name.clone(),
                });
            }
        }

        let error_views: Vec<&ViewRegistration> = self
            .views
            .iter()
            .filter(|v| v.metadata.is_error_view)
            .collect();
        if error_views.len() > 1 {
            return Err(ConfigurationError::MultipleErrorViews {
                first: error_views[0].type_info.name.clone(),
                second: error_views[1].type_info.name.clone(),
            });
        }

        Ok(ClassRegistry {
            uis: self.uis,
            views: self.views,
            listeners: self.listeners,
            modules: self.modules,
        })
    }
}
