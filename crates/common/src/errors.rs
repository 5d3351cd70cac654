//! 错误类型定义

use thiserror::Error;

/// 配置错误类型
///
/// 属于启动期或单次请求的不可恢复错误，发现后立即失败
#[derive(Error, Debug)]
pub enum ConfigurationError {
    #[error("视图名称重复: {view_name}, 冲突类型: {first} 与 {second}")]
    DuplicateViewName {
        view_name: String,
        first: String,
        second: String,
    },

    #[error("错误视图与错误视图提供者不能同时设置: {ui_type}")]
    MutuallyExclusiveErrorOptions { ui_type: String },

    #[error("伴随组件未声明 UI 作用域: {ui_type} 引用了 {companion}")]
    CompanionNotUiScoped { ui_type: String, companion: String },

    #[error("模块没有可用的构造方式: {module_type}")]
    NoEligibleConstructor { module_type: String },

    #[error("绑定键重复: {key}, 冲突模块: {first} 与 {second}")]
    DuplicateBinding {
        key: String,
        first: String,
        second: String,
    },

    #[error("{type_name} 的适用 UI 列表不能为空")]
    EmptyApplicableUis { type_name: String },

    #[error("{type_name} 声明的适用 UI {ui_type} 未注册")]
    UnknownApplicableUi { type_name: String, ui_type: String },

    #[error("{type_name} 声明的适用 UI {ui_type} 未设置视图容器")]
    ViewContainerNotSet { type_name: String, ui_type: String },

    #[error("错误视图名称未注册: {view_name} (来自 {ui_type})")]
    UnknownErrorView { ui_type: String, view_name: String },

    #[error("{first} 与 {second} 都被标记为错误视图")]
    MultipleErrorViews { first: String, second: String },

    #[error("路径未绑定任何 UI: {path}")]
    UnknownUiPath { path: String },

    #[error("UI 路径重复: {path}, 冲突类型: {first} 与 {second}")]
    DuplicateUiPath {
        path: String,
        first: String,
        second: String,
    },
}

/// 作用域错误类型
///
/// 使用顺序违规属于程序逻辑错误，不做恢复，直接向调用方传播
#[derive(Error, Debug)]
pub enum ScopeError {
    #[error("作用域初始化窗口已打开，禁止重入")]
    WindowAlreadyOpen,

    #[error("作用域初始化窗口未打开")]
    WindowNotOpen,

    #[error("UI 实例已关联作用域令牌: {ui}")]
    ScopeAlreadyAssigned { ui: String },

    #[error("无法确定当前作用域: 窗口未打开且未提供当前 UI")]
    NoResolvableScope,

    #[error("UI 实例未注册作用域令牌: {ui}")]
    UiNotRegistered { ui: String },

    #[error("初始化窗口期间不允许携带当前 UI 解析作用域对象")]
    ContextConflict,

    #[error("禁止在其它会话的初始化窗口内解析作用域对象: {session}")]
    ForeignWindow { session: String },

    #[error("作用域对象创建失败: {key}, 原因: {source}")]
    ObjectCreationFailed {
        key: String,
        source: Box<InjectionError>,
    },
}

/// 依赖注入错误类型
#[derive(Error, Debug)]
pub enum InjectionError {
    #[error("绑定不存在: {key}")]
    BindingNotFound { key: String },

    #[error("绑定类型不匹配: {key}, 期望 {expected}")]
    TypeMismatch { key: String, expected: String },

    #[error("实例创建失败: {key}, 原因: {message}")]
    CreationFailed { key: String, message: String },

    #[error("注入器尚未构建完成")]
    InjectorNotReady,

    #[error("作用域错误: {source}")]
    Scope {
        #[from]
        source: ScopeError,
    },
}

/// 视图错误类型
#[derive(Error, Debug)]
pub enum ViewError {
    #[error("视图名称未注册: {view_name}")]
    NotRegistered { view_name: String },

    #[error("视图构造失败: {view_name}, 原因: {source}")]
    ConstructionFailed {
        view_name: String,
        source: InjectionError,
    },

    #[error("视图 {view_name} 不适用于 UI 类型 {ui_type}")]
    NotNavigable { view_name: String, ui_type: String },

    #[error("视图导航被监听器取消: {view_name}")]
    NavigationCancelled { view_name: String },

    #[error("缺少当前 UI 实例，无法定位视图缓存")]
    NoCurrentUi,

    #[error("会话 {session} 未初始化，视图缓存不存在")]
    SessionNotInitialized { session: String },
}

/// 生命周期错误类型
#[derive(Error, Debug)]
pub enum LifecycleError {
    #[error("会话已初始化: {session}")]
    SessionAlreadyInitialized { session: String },

    #[error("会话未初始化: {session}")]
    SessionNotInitialized { session: String },
}

/// 集成层统一错误类型
#[derive(Error, Debug)]
pub enum GlueError {
    #[error("配置错误: {source}")]
    Configuration {
        #[from]
        source: ConfigurationError,
    },

    #[error("作用域错误: {source}")]
    Scope {
        #[from]
        source: ScopeError,
    },

    #[error("依赖注入错误: {source}")]
    Injection {
        #[from]
        source: InjectionError,
    },

    #[error("视图错误: {source}")]
    View {
        #[from]
        source: ViewError,
    },

    #[error("生命周期错误: {source}")]
    Lifecycle {
        #[from]
        source: LifecycleError,
    },

    #[error("服务端启动失败: {message}")]
    BootstrapFailed { message: String },
}

/// 结果类型别名
pub type ConfigurationResult<T> = Result<T, ConfigurationError>;
pub type ScopeResult<T> = Result<T, ScopeError>;
pub type InjectionResult<T> = Result<T, InjectionError>;
pub type ViewResult<T> = Result<T, ViewError>;
pub type LifecycleResult<T> = Result<T, LifecycleError>;
pub type GlueResult<T> = Result<T, GlueError>;
