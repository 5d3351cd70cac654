//! Viewbind 组合层
//!
//! 把注册表、作用域引擎、注入器与视图提供者装配成可运行的
//! 服务端，并对接宿主的会话与窗口生命周期。
//!
//! # 使用示例
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use viewbind_common::{
//!     Binder, ComponentRef, Lifetime, Module, ModuleCtor, ModuleMetadata, UiMetadata, UiRoot,
//!     View, ViewContainer, ViewContainerBinding, ViewMetadata,
//! };
//! use viewbind_composition::ViewbindServer;
//!
//! struct MainUi;
//! impl UiRoot for MainUi {}
//!
//! struct MainContainer;
//! impl ViewContainer for MainContainer {
//!     fn show(&self, _view: ComponentRef) {}
//! }
//!
//! struct HomeView;
//! impl View for HomeView {
//!     fn as_component(self: Arc<Self>) -> ComponentRef {
//!         self
//!     }
//! }
//!
//! struct AppModule;
//! impl Module for AppModule {
//!     fn configure(&self, binder: &mut Binder) {
//!         binder.bind_provider::<MainContainer, _>(Lifetime::UiScoped, |_, _| {
//!             Ok(Arc::new(MainContainer))
//!         });
//!     }
//! }
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let server = ViewbindServer::builder()
//!     .register_ui::<MainUi, _>(
//!         UiMetadata::new().with_view_container(ViewContainerBinding::of::<MainContainer>()),
//!         |_, _| Ok(Arc::new(MainUi)),
//!     )
//!     .register_view::<HomeView, _>(ViewMetadata::new(), |_, _| Ok(Arc::new(HomeView)))
//!     .register_module::<AppModule>(
//!         ModuleMetadata::new(),
//!         vec![ModuleCtor::Default(Arc::new(|| Arc::new(AppModule) as _))],
//!     )
//!     .build()?;
//!
//! let session = server.init_session();
//! let handle = server.create_ui(session, "")?;
//! if let Some(navigator) = &handle.navigator {
//!     navigator.navigate_to("home")?;
//! }
//! server.destroy_session(session)?;
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod config;
pub mod server;

pub use builder::ViewbindServerBuilder;
pub use config::{init_logging, DeploymentConfig, LoggingConfig};
pub use server::{ServerMetrics, UiHandle, ViewbindServer};
