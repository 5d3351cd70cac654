//! 启动期校验集成测试
//!
//! 所有配置错误必须在 build 阶段暴露，而不是留到运行期

use anyhow::Result;
use std::sync::Arc;
use viewbind_common::{
    Binder, ComponentRef, ConfigurationError, GlueError, Lifetime, Module, ModuleCtor,
    ModuleMetadata, UiMetadata, UiRoot, View, ViewContainer, ViewContainerBinding, ViewMetadata,
};
use viewbind_composition::ViewbindServer;

struct MainUi;
impl UiRoot for MainUi {}

struct OtherUi;
impl UiRoot for OtherUi {}

struct MainContainer;
impl ViewContainer for MainContainer {
    fn show(&self, _view: ComponentRef) {}
}

struct HomeView;
impl View for HomeView {
    fn as_component(self: Arc<Self>) -> ComponentRef {
        self
    }
}

struct OopsView;
impl View for OopsView {
    fn as_component(self: Arc<Self>) -> ComponentRef {
        self
    }
}

struct ContainerModule;
impl Module for ContainerModule {
    fn configure(&self, binder: &mut Binder) {
        binder.bind_provider::<MainContainer, _>(Lifetime::UiScoped, |_, _| {
            Ok(Arc::new(MainContainer))
        });
    }
}

fn container_module_ctor() -> Vec<ModuleCtor> {
    vec![ModuleCtor::Default(Arc::new(|| {
        Arc::new(ContainerModule) as Arc<dyn Module>
    }))]
}

fn expect_configuration_error(result: Result<ViewbindServer, GlueError>) -> ConfigurationError {
    match result {
        Err(GlueError::Configuration { source }) => source,
        Err(other) => panic!("期望配置错误，实际: {other}"),
        Ok(_) => panic!("期望配置错误，实际装配成功"),
    }
}

#[test]
fn duplicate_ui_paths_are_rejected() {
    let result = ViewbindServer::builder()
        .without_logging_init()
        .register_ui::<MainUi, _>(UiMetadata::new().with_path("app"), |_, _| {
            Ok(Arc::new(MainUi))
        })
        .register_ui::<OtherUi, _>(UiMetadata::new().with_path("app"), |_, _| {
            Ok(Arc::new(OtherUi))
        })
        .build();
    assert!(matches!(
        expect_configuration_error(result),
        ConfigurationError::DuplicateUiPath { .. }
    ));
}

#[test]
fn error_view_and_provider_are_mutually_exclusive() {
    let result = ViewbindServer::builder()
        .without_logging_init()
        .register_ui::<MainUi, _>(
            UiMetadata::new()
                .with_error_view("oops")
                .with_error_view_provider(Arc::new(|_, _| {
                    unreachable!("装配应在此之前失败")
                })),
            |_, _| Ok(Arc::new(MainUi)),
        )
        .build();
    assert!(matches!(
        expect_configuration_error(result),
        ConfigurationError::MutuallyExclusiveErrorOptions { .. }
    ));
}

#[test]
fn unknown_explicit_error_view_is_rejected() {
    let result = ViewbindServer::builder()
        .without_logging_init()
        .register_ui::<MainUi, _>(UiMetadata::new().with_error_view("missing"), |_, _| {
            Ok(Arc::new(MainUi))
        })
        .build();
    assert!(matches!(
        expect_configuration_error(result),
        ConfigurationError::UnknownErrorView { .. }
    ));
}

#[test]
fn companion_components_must_be_ui_scoped() {
    struct WrongScopeModule;
    impl Module for WrongScopeModule {
        fn configure(&self, binder: &mut Binder) {
            binder.bind_provider::<MainContainer, _>(Lifetime::Singleton, |_, _| {
                Ok(Arc::new(MainContainer))
            });
        }
    }
    let result = ViewbindServer::builder()
        .without_logging_init()
        .register_ui::<MainUi, _>(
            UiMetadata::new().with_view_container(ViewContainerBinding::of::<MainContainer>()),
            |_, _| Ok(Arc::new(MainUi)),
        )
        .register_module::<WrongScopeModule>(
            ModuleMetadata::new(),
            vec![ModuleCtor::Default(Arc::new(|| {
                Arc::new(WrongScopeModule) as Arc<dyn Module>
            }))],
        )
        .build();
    assert!(matches!(
        expect_configuration_error(result),
        ConfigurationError::CompanionNotUiScoped { .. }
    ));
}

#[test]
fn view_restricted_to_container_less_ui_is_rejected() {
    let result = ViewbindServer::builder()
        .without_logging_init()
        .register_ui::<MainUi, _>(UiMetadata::new(), |_, _| Ok(Arc::new(MainUi)))
        .register_view::<HomeView, _>(ViewMetadata::new().for_ui::<MainUi>(), |_, _| {
            Ok(Arc::new(HomeView))
        })
        .build();
    assert!(matches!(
        expect_configuration_error(result),
        ConfigurationError::ViewContainerNotSet { .. }
    ));
}

#[test]
fn listener_restricted_to_container_less_ui_is_rejected() {
    struct AuditListener;
    impl viewbind_common::ViewChangeListener for AuditListener {}

    let result = ViewbindServer::builder()
        .without_logging_init()
        .register_ui::<MainUi, _>(UiMetadata::new(), |_, _| Ok(Arc::new(MainUi)))
        .register_listener::<AuditListener, _>(
            viewbind_common::ListenerMetadata::new().for_ui::<MainUi>(),
            |_, _| Ok(Arc::new(AuditListener)),
        )
        .build();
    assert!(matches!(
        expect_configuration_error(result),
        ConfigurationError::ViewContainerNotSet { .. }
    ));
}

#[test]
fn view_restricted_to_unregistered_ui_is_rejected() {
    let result = ViewbindServer::builder()
        .without_logging_init()
        .register_view::<HomeView, _>(ViewMetadata::new().for_ui::<OtherUi>(), |_, _| {
            Ok(Arc::new(HomeView))
        })
        .build();
    assert!(matches!(
        expect_configuration_error(result),
        ConfigurationError::UnknownApplicableUi { .. }
    ));
}

#[test]
fn conflicting_base_module_bindings_are_rejected() {
    struct SecondModule;
    impl Module for SecondModule {
        fn configure(&self, binder: &mut Binder) {
            binder.bind_provider::<MainContainer, _>(Lifetime::UiScoped, |_, _| {
                Ok(Arc::new(MainContainer))
            });
        }
    }
    let result = ViewbindServer::builder()
        .without_logging_init()
        .register_module::<ContainerModule>(ModuleMetadata::new(), container_module_ctor())
        .register_module::<SecondModule>(
            ModuleMetadata::new(),
            vec![ModuleCtor::Default(Arc::new(|| {
                Arc::new(SecondModule) as Arc<dyn Module>
            }))],
        )
        .build();
    assert!(matches!(
        expect_configuration_error(result),
        ConfigurationError::DuplicateBinding { .. }
    ));
}

#[test]
fn registry_level_error_view_acts_as_fallback() -> Result<()> {
    let server = ViewbindServer::builder()
        .without_logging_init()
        .register_ui::<MainUi, _>(
            UiMetadata::new().with_view_container(ViewContainerBinding::of::<MainContainer>()),
            |_, _| Ok(Arc::new(MainUi)),
        )
        .register_view::<HomeView, _>(ViewMetadata::new(), |_, _| Ok(Arc::new(HomeView)))
        .register_view::<OopsView, _>(ViewMetadata::new().as_error_view(), |_, _| {
            Ok(Arc::new(OopsView))
        })
        .register_module::<ContainerModule>(ModuleMetadata::new(), container_module_ctor())
        .build()?;

    let session = server.init_session();
    let handle = server.create_ui(session, "")?;
    let navigator = handle.navigator.as_ref().expect("应存在导航器");

    navigator.navigate_to("does-not-exist/abc")?;
    assert_eq!(navigator.current_view().as_deref(), Some("oops"));
    Ok(())
}

#[test]
fn duplicate_view_names_are_rejected() {
    struct AliasView;
    impl View for AliasView {
        fn as_component(self: Arc<Self>) -> ComponentRef {
            self
        }
    }
    let result = ViewbindServer::builder()
        .without_logging_init()
        .register_view::<HomeView, _>(ViewMetadata::new(), |_, _| Ok(Arc::new(HomeView)))
        .register_view::<AliasView, _>(ViewMetadata::new().with_name("home"), |_, _| {
            Ok(Arc::new(AliasView))
        })
        .build();
    assert!(matches!(
        expect_configuration_error(result),
        ConfigurationError::DuplicateViewName { .. }
    ));
}
