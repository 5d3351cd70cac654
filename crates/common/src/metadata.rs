//! 元数据定义
//!
//! 类型信息、绑定键以及各角色的声明式配置项（注解的显式等价物）

use crate::binding::{ErrorHandlerFactory, ErrorViewProviderFactory, ViewContainerBinding};
use std::any::TypeId;
use std::fmt;

/// 类型信息
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeInfo {
    /// 简短类型名称
    pub name: String,
    /// 类型ID
    pub id: TypeId,
    /// 模块路径（包过滤的依据）
    pub module_path: String,
}

impl TypeInfo {
    /// 从类型获取类型信息
    pub fn of<T: 'static>() -> Self {
        let full = std::any::type_name::<T>();
        Self {
            name: full.split("::").last().unwrap_or(full).to_string(),
            id: TypeId::of::<T>(),
            module_path: full.to_string(),
        }
    }

    /// 获取简短的类型名称
    pub fn short_name(&self) -> &str {
        &self.name
    }

    /// 检查模块路径是否位于指定包前缀之下
    pub fn in_package(&self, package: &str) -> bool {
        self.module_path == package
            || self
                .module_path
                .strip_prefix(package)
                .map(|rest| rest.starts_with("::"))
                .unwrap_or(false)
    }
}

/// 绑定键
///
/// 类型加可选限定名，唯一确定一条绑定
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BindingKey {
    /// 目标类型ID
    pub type_id: TypeId,
    /// 目标类型名称（仅用于诊断信息）
    pub type_name: &'static str,
    /// 可选限定名
    pub qualifier: Option<String>,
}

impl BindingKey {
    /// 创建类型键
    pub fn of<T: 'static>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
            qualifier: None,
        }
    }

    /// 创建带限定名的类型键
    pub fn named<T: 'static>(qualifier: impl Into<String>) -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
            qualifier: Some(qualifier.into()),
        }
    }
}

impl fmt::Display for BindingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.qualifier {
            Some(q) => write!(f, "{}@{}", self.type_name, q),
            None => write!(f, "{}", self.type_name),
        }
    }
}

/// UI 根窗口的声明式配置
///
/// 对应原注解的结构化选项: 路径、内容、视图容器、错误视图/错误视图提供者/
/// 错误处理器。错误视图与错误视图提供者互斥。
#[derive(Clone, Default)]
pub struct UiMetadata {
    /// UI 绑定到的路径，空串表示根路径
    pub path: String,
    /// UI 的根内容组件绑定键，必须为 UI 作用域
    pub content: Option<BindingKey>,
    /// 导航用的视图容器绑定，必须为 UI 作用域
    pub view_container: Option<ViewContainerBinding>,
    /// 显式错误视图名称
    pub error_view: Option<String>,
    /// 错误视图提供者工厂
    pub error_view_provider: Option<ErrorViewProviderFactory>,
    /// 错误处理器工厂
    pub error_handler: Option<ErrorHandlerFactory>,
}

impl UiMetadata {
    /// 创建空配置
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置路径
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// 设置根内容组件
    pub fn with_content(mut self, key: BindingKey) -> Self {
        self.content = Some(key);
        self
    }

    /// 设置视图容器
    pub fn with_view_container(mut self, binding: ViewContainerBinding) -> Self {
        self.view_container = Some(binding);
        self
    }

    /// 设置显式错误视图名称
    pub fn with_error_view(mut self, view_name: impl Into<String>) -> Self {
        self.error_view = Some(view_name.into());
        self
    }

    /// 设置错误视图提供者工厂
    pub fn with_error_view_provider(mut self, factory: ErrorViewProviderFactory) -> Self {
        self.error_view_provider = Some(factory);
        self
    }

    /// 设置错误处理器工厂
    pub fn with_error_handler(mut self, factory: ErrorHandlerFactory) -> Self {
        self.error_handler = Some(factory);
        self
    }
}

impl fmt::Debug for UiMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UiMetadata")
            .field("path", &self.path)
            .field("content", &self.content)
            .field("view_container", &self.view_container)
            .field("error_view", &self.error_view)
            .field(
                "error_view_provider",
                &self.error_view_provider.as_ref().map(|_| "<factory>"),
            )
            .field(
                "error_handler",
                &self.error_handler.as_ref().map(|_| "<factory>"),
            )
            .finish()
    }
}

/// 视图的声明式配置
#[derive(Debug, Clone, Default)]
pub struct ViewMetadata {
    /// 显式视图名称，None 时按约定从类型名派生
    pub name: Option<String>,
    /// 是否为错误视图，整个注册表中至多一个
    pub is_error_view: bool,
    /// 适用 UI 限制列表
    ///
    /// None 表示不限制；Some(空) 属于配置错误
    pub applicable_uis: Option<Vec<TypeId>>,
}

impl ViewMetadata {
    /// 创建空配置
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置显式视图名称
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// 标记为错误视图
    pub fn as_error_view(mut self) -> Self {
        self.is_error_view = true;
        self
    }

    /// 限制视图只适用于指定 UI 类型
    pub fn for_ui<U: 'static>(mut self) -> Self {
        self.applicable_uis
            .get_or_insert_with(Vec::new)
            .push(TypeId::of::<U>());
        self
    }
}

/// 视图变更监听器的声明式配置
#[derive(Debug, Clone, Default)]
pub struct ListenerMetadata {
    /// 适用 UI 限制列表，None 表示适用于所有 UI
    pub applicable_uis: Option<Vec<TypeId>>,
}

impl ListenerMetadata {
    /// 创建空配置
    pub fn new() -> Self {
        Self::default()
    }

    /// 限制监听器只适用于指定 UI 类型
    pub fn for_ui<U: 'static>(mut self) -> Self {
        self.applicable_uis
            .get_or_insert_with(Vec::new)
            .push(TypeId::of::<U>());
        self
    }
}

/// 注入模块的声明式配置
#[derive(Debug, Clone, Default)]
pub struct ModuleMetadata {
    /// 是否为覆盖模块，覆盖模块的绑定优先于基础模块
    pub overrides_bindings: bool,
}

impl ModuleMetadata {
    /// 创建空配置
    pub fn new() -> Self {
        Self::default()
    }

    /// 标记为覆盖模块
    pub fn overriding(mut self) -> Self {
        self.overrides_bindings = true;
        self
    }
}
