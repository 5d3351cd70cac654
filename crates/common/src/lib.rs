//! Viewbind 公共基础设施
//!
//! 提供整个集成层共享的基础类型:
//! - 错误类型体系与结果别名
//! - 会话、UI 实例与作用域的标识类型
//! - 绑定、模块与解析器抽象
//! - 类注册表及各角色的声明式元数据
//! - 组件契约与命名约定

pub mod binding;
pub mod component;
pub mod conventions;
pub mod errors;
pub mod identity;
pub mod lifecycle;
pub mod metadata;
pub mod registry;

pub use binding::{
    Binder, Binding, ErrorHandlerFactory, ErrorViewProviderFactory, InstanceRef, Module,
    ProviderFn, Resolver, ResolverExt, ResolverHandle, ViewContainerBinding, ViewContainerFactory,
};
pub use component::{
    ComponentRef, ErrorHandler, ErrorViewProvider, UiRoot, View, ViewChangeEvent,
    ViewChangeListener, ViewContainer,
};
pub use errors::{
    ConfigurationError, ConfigurationResult, GlueError, GlueResult, InjectionError,
    InjectionResult, LifecycleError, LifecycleResult, ScopeError, ScopeResult, ViewError,
    ViewResult,
};
pub use identity::{ScopeContext, ScopeId, SessionId, UiInstanceId};
pub use lifecycle::{Lifetime, SessionListener};
pub use metadata::{
    BindingKey, ListenerMetadata, ModuleMetadata, TypeInfo, UiMetadata, ViewMetadata,
};
pub use registry::{
    ClassRegistry, ClassRegistryBuilder, ListenerFactory, ListenerRegistration, ModuleCtor,
    ModuleRegistration, UiFactory, UiRegistration, ViewFactory, ViewRegistration,
};
