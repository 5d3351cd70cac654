//! GUI 组件契约
//!
//! 框架侧与应用侧的衔接点: UI 根窗口、可导航视图、
//! 视图变更监听以及错误处理

use crate::identity::UiInstanceId;
use std::any::Any;
use std::sync::Arc;

/// 通用组件引用
///
/// 作用域缓存与导航容器不关心组件的具体类型
pub type ComponentRef = Arc<dyn Any + Send + Sync>;

/// 可导航的视图
pub trait View: Send + Sync {
    /// 导航到达本视图时触发，参数为路径中视图名之后的剩余部分
    fn on_enter(&self, _parameters: &str) {}

    /// 视图对应的显示组件
    fn as_component(self: Arc<Self>) -> ComponentRef;
}

/// UI 根窗口
///
/// 每个 (会话, 浏览器窗口) 对应一个实例
pub trait UiRoot: Send + Sync {
    /// 设置根内容组件
    fn set_content(&self, _content: ComponentRef) {}

    /// 设置错误处理器
    fn set_error_handler(&self, _handler: Arc<dyn ErrorHandler>) {}
}

/// 错误处理器
pub trait ErrorHandler: Send + Sync {
    /// 处理 UI 范围内未捕获的错误
    fn handle(&self, message: &str);
}

/// 容纳视图的容器组件
pub trait ViewContainer: Send + Sync {
    /// 显示指定视图
    fn show(&self, view: ComponentRef);
}

/// 视图变更事件
#[derive(Debug, Clone)]
pub struct ViewChangeEvent {
    /// 离开的视图名称，首次导航时为 None
    pub old_view: Option<String>,
    /// 进入的视图名称
    pub new_view: String,
    /// 视图名之后的路径参数
    pub parameters: String,
    /// 发生导航的 UI 实例
    pub ui: UiInstanceId,
}

/// 视图变更监听器
pub trait ViewChangeListener: Send + Sync {
    /// 视图切换前触发，返回 false 可否决本次导航
    fn before_view_change(&self, _event: &ViewChangeEvent) -> bool {
        true
    }

    /// 视图切换完成后触发
    fn after_view_change(&self, _event: &ViewChangeEvent) {}
}

/// 错误视图提供者
///
/// 在视图名无法解析时给出回退视图，与显式错误视图名互斥
pub trait ErrorViewProvider: Send + Sync {
    /// 为无法解析的导航状态给出回退视图名，None 表示不回退
    fn error_view_name(&self, state: &str) -> Option<String>;
}
