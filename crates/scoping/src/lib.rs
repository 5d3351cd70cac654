//! Viewbind 作用域引擎
//!
//! 实现会话与 UI 实例两级作用域: 同一 (会话, UI 实例) 内的
//! UI 作用域绑定解析到同一实例，会话销毁时整体回收。

pub mod engine;

pub use engine::ScopeEngine;
