//! 绑定与解析抽象
//!
//! 模块向绑定器登记 provider，注入器实现 Resolver 按键解析实例。
//! ResolverHandle 允许在注入器建成之前预先持有对它的引用。

use crate::component::{ErrorHandler, ErrorViewProvider, ViewContainer};
use crate::errors::InjectionError;
use crate::identity::ScopeContext;
use crate::lifecycle::Lifetime;
use crate::metadata::BindingKey;
use once_cell::sync::OnceCell;
use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

/// 实例引用
pub type InstanceRef = Arc<dyn Any + Send + Sync>;

/// 实例构造函数
///
/// 在给定解析器与作用域上下文中创建一个实例
pub type ProviderFn =
    Arc<dyn Fn(&dyn Resolver, &ScopeContext) -> Result<InstanceRef, InjectionError> + Send + Sync>;

/// 错误处理器工厂
pub type ErrorHandlerFactory = Arc<
    dyn Fn(&dyn Resolver, &ScopeContext) -> Result<Arc<dyn ErrorHandler>, InjectionError>
        + Send
        + Sync,
>;

/// 错误视图提供者工厂
pub type ErrorViewProviderFactory = Arc<
    dyn Fn(&dyn Resolver, &ScopeContext) -> Result<Arc<dyn ErrorViewProvider>, InjectionError>
        + Send
        + Sync,
>;

/// 视图容器工厂
pub type ViewContainerFactory = Arc<
    dyn Fn(&dyn Resolver, &ScopeContext) -> Result<Arc<dyn ViewContainer>, InjectionError>
        + Send
        + Sync,
>;

/// 视图容器绑定
///
/// 键用于启动期的作用域校验，工厂负责解析并向上转型为容器契约
#[derive(Clone)]
pub struct ViewContainerBinding {
    /// 容器组件的绑定键
    pub key: BindingKey,
    /// 容器实例工厂
    pub factory: ViewContainerFactory,
}

impl ViewContainerBinding {
    /// 以具体容器类型创建绑定
    pub fn of<T: ViewContainer + 'static>() -> Self {
        let key = BindingKey::of::<T>();
        let resolve_key = key.clone();
        Self {
            key,
            factory: Arc::new(move |resolver, ctx| {
                resolver
                    .resolve_keyed::<T>(&resolve_key, ctx)
                    .map(|c| c as Arc<dyn ViewContainer>)
            }),
        }
    }
}

impl std::fmt::Debug for ViewContainerBinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewContainerBinding")
            .field("key", &self.key)
            .finish()
    }
}

/// 一条绑定: 生命周期加构造函数
#[derive(Clone)]
pub struct Binding {
    /// 实例的生命周期
    pub lifetime: Lifetime,
    /// 实例的构造函数
    pub provider: ProviderFn,
}

/// 绑定器
///
/// 模块配置阶段的收集器，同一键的后一条绑定覆盖前一条
#[derive(Default)]
pub struct Binder {
    bindings: HashMap<BindingKey, Binding>,
}

impl Binder {
    /// 创建空绑定器
    pub fn new() -> Self {
        Self::default()
    }

    /// 登记一条原始绑定
    pub fn bind_key(&mut self, key: BindingKey, lifetime: Lifetime, provider: ProviderFn) {
        self.bindings.insert(key, Binding { lifetime, provider });
    }

    /// 将类型绑定到现成实例，生命周期为单例
    pub fn bind_instance<T: Send + Sync + 'static>(&mut self, instance: Arc<T>) {
        let instance: InstanceRef = instance;
        self.bind_key(
            BindingKey::of::<T>(),
            Lifetime::Singleton,
            Arc::new(move |_, _| Ok(Arc::clone(&instance))),
        );
    }

    /// 将类型绑定到构造闭包
    pub fn bind_provider<T, F>(&mut self, lifetime: Lifetime, provider: F)
    where
        T: Send + Sync + 'static,
        F: Fn(&dyn Resolver, &ScopeContext) -> Result<Arc<T>, InjectionError>
            + Send
            + Sync
            + 'static,
    {
        self.bind_key(
            BindingKey::of::<T>(),
            lifetime,
            Arc::new(move |resolver, ctx| provider(resolver, ctx).map(|v| v as InstanceRef)),
        );
    }

    /// 将带限定名的键绑定到构造闭包
    pub fn bind_named_provider<T, F>(&mut self, qualifier: &str, lifetime: Lifetime, provider: F)
    where
        T: Send + Sync + 'static,
        F: Fn(&dyn Resolver, &ScopeContext) -> Result<Arc<T>, InjectionError>
            + Send
            + Sync
            + 'static,
    {
        self.bind_key(
            BindingKey::named::<T>(qualifier),
            lifetime,
            Arc::new(move |resolver, ctx| provider(resolver, ctx).map(|v| v as InstanceRef)),
        );
    }

    /// 取出收集到的全部绑定
    pub fn into_bindings(self) -> HashMap<BindingKey, Binding> {
        self.bindings
    }

    /// 已登记的绑定数量
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// 是否尚无绑定
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

/// 注入模块
///
/// 一组相关绑定的配置单元
pub trait Module: Send + Sync {
    /// 向绑定器登记本模块的绑定
    fn configure(&self, binder: &mut Binder);
}

/// 按键解析实例的能力
pub trait Resolver: Send + Sync {
    /// 在给定作用域上下文中解析键对应的实例
    fn resolve_any(&self, key: &BindingKey, ctx: &ScopeContext)
        -> Result<InstanceRef, InjectionError>;
}

/// Resolver 的类型化便捷方法
pub trait ResolverExt: Resolver {
    /// 解析并向下转型为具体类型
    fn resolve<T: Send + Sync + 'static>(
        &self,
        ctx: &ScopeContext,
    ) -> Result<Arc<T>, InjectionError> {
        self.resolve_keyed(&BindingKey::of::<T>(), ctx)
    }

    /// 按键解析并向下转型为具体类型
    fn resolve_keyed<T: Send + Sync + 'static>(
        &self,
        key: &BindingKey,
        ctx: &ScopeContext,
    ) -> Result<Arc<T>, InjectionError> {
        let instance = self.resolve_any(key, ctx)?;
        instance
            .downcast::<T>()
            .map_err(|_| InjectionError::TypeMismatch {
                key: key.to_string(),
                expected: std::any::type_name::<T>().to_string(),
            })
    }
}

impl<R: Resolver + ?Sized> ResolverExt for R {}

/// 延迟解析器句柄
///
/// 注册阶段即可分发给各组件，注入器建成后填充一次
#[derive(Clone, Default)]
pub struct ResolverHandle {
    inner: Arc<OnceCell<Arc<dyn Resolver>>>,
}

impl ResolverHandle {
    /// 创建未填充的句柄
    pub fn new() -> Self {
        Self::default()
    }

    /// 填充注入器，重复填充时静默忽略后续调用
    pub fn set(&self, resolver: Arc<dyn Resolver>) {
        let _ = self.inner.set(resolver);
    }

    /// 获取注入器，尚未填充时返回错误
    pub fn get(&self) -> Result<Arc<dyn Resolver>, InjectionError> {
        self.inner
            .get()
            .cloned()
            .ok_or(InjectionError::InjectorNotReady)
    }
}

impl std::fmt::Debug for ResolverHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolverHandle")
            .field("ready", &self.inner.get().is_some())
            .finish()
    }
}
