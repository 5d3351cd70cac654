//! Viewbind 注入层
//!
//! 在作用域引擎之上实现依赖注入的核心流程:
//! - 模块装配与绑定表合成
//! - 按生命周期分派解析的注入器
//! - 视图提供者、导航器与 UI 实例装配

pub mod assembler;
pub mod injector;
pub mod navigator;
pub mod provider;
pub mod provisioner;

pub use assembler::ModuleAssembler;
pub use injector::Injector;
pub use navigator::Navigator;
pub use provider::ViewProvider;
pub use provisioner::{ProvisionedUi, UiProvisioner};
