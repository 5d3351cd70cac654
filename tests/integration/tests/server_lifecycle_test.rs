//! 服务端端到端集成测试
//!
//! 覆盖完整流程: 模块装配、会话建立、UI 实例创建、
//! 作用域隔离、视图导航与会话销毁。

use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use viewbind_common::{
    Binder, ComponentRef, GlueError, InjectionError, Lifetime, Module, ModuleCtor,
    ModuleMetadata, ResolverExt, ScopeContext, UiMetadata, UiRoot, View, ViewContainer,
    ViewContainerBinding, ViewMetadata,
};
use viewbind_composition::{LoggingConfig, ViewbindServer};

/// 购物车服务，UI 作用域: 每个浏览器窗口一份
struct CartService {
    items: Mutex<Vec<String>>,
}

impl CartService {
    fn add(&self, item: &str) {
        self.items.lock().push(item.to_string());
    }
    fn count(&self) -> usize {
        self.items.lock().len()
    }
}

/// 订单仓储，单例: 全应用共享
struct OrderRepository {
    created: AtomicUsize,
}

struct ShopUi;
impl UiRoot for ShopUi {}

struct ShopContainer {
    shown: Mutex<usize>,
}
impl ViewContainer for ShopContainer {
    fn show(&self, _view: ComponentRef) {
        *self.shown.lock() += 1;
    }
}

struct HomeView;
impl View for HomeView {
    fn as_component(self: Arc<Self>) -> ComponentRef {
        self
    }
}

struct OrderHistoryView {
    cart: Arc<CartService>,
    last_parameters: Mutex<String>,
}
impl View for OrderHistoryView {
    fn on_enter(&self, parameters: &str) {
        *self.last_parameters.lock() = parameters.to_string();
    }
    fn as_component(self: Arc<Self>) -> ComponentRef {
        self
    }
}

struct ShopModule;
impl Module for ShopModule {
    fn configure(&self, binder: &mut Binder) {
        binder.bind_provider::<CartService, _>(Lifetime::UiScoped, |_, _| {
            Ok(Arc::new(CartService {
                items: Mutex::new(Vec::new()),
            }))
        });
        binder.bind_provider::<ShopContainer, _>(Lifetime::UiScoped, |_, _| {
            Ok(Arc::new(ShopContainer {
                shown: Mutex::new(0),
            }))
        });
        binder.bind_provider::<OrderRepository, _>(Lifetime::Singleton, |_, _| {
            Ok(Arc::new(OrderRepository {
                created: AtomicUsize::new(0),
            }))
        });
    }
}

fn build_server() -> ViewbindServer {
    ViewbindServer::builder()
        .with_logging(LoggingConfig::development())
        .without_logging_init()
        .register_ui::<ShopUi, _>(
            UiMetadata::new()
                .with_path("shop")
                .with_view_container(ViewContainerBinding::of::<ShopContainer>()),
            |_, _| Ok(Arc::new(ShopUi)),
        )
        .register_view::<HomeView, _>(ViewMetadata::new(), |_, _| Ok(Arc::new(HomeView)))
        .register_view::<OrderHistoryView, _>(ViewMetadata::new(), |resolver, ctx| {
            Ok(Arc::new(OrderHistoryView {
                cart: resolver.resolve::<CartService>(ctx)?,
                last_parameters: Mutex::new(String::new()),
            }))
        })
        .register_module::<ShopModule>(
            ModuleMetadata::new(),
            vec![ModuleCtor::Default(Arc::new(|| {
                Arc::new(ShopModule) as Arc<dyn Module>
            }))],
        )
        .build()
        .expect("服务端装配失败")
}

#[test]
fn full_session_ui_navigation_lifecycle() {
    let server = build_server();
    let session = server.init_session();

    let handle = server.create_ui(session, "shop").unwrap();
    assert!(!server.scope_engine().window_open());

    let navigator = handle.navigator.as_ref().expect("应存在导航器");
    navigator.navigate_to("order-history/42").unwrap();
    assert_eq!(navigator.current_view().as_deref(), Some("order-history"));

    // 请求路径形式的状态允许带前导斜杠
    navigator.navigate_to("/order-history/7").unwrap();
    assert_eq!(navigator.current_view().as_deref(), Some("order-history"));

    navigator.navigate_to("home").unwrap();
    assert_eq!(navigator.current_view().as_deref(), Some("home"));

    server.destroy_session(session).unwrap();
    assert_eq!(server.scope_engine().scope_count(session), 0);
    assert_eq!(server.metrics().sessions, 0);
}

#[test]
fn navigation_passes_parameters_to_view() {
    let server = build_server();
    let session = server.init_session();
    let handle = server.create_ui(session, "shop").unwrap();
    let navigator = handle.navigator.as_ref().unwrap();

    navigator.navigate_to("order-history/42").unwrap();
    let ctx = ScopeContext::of_ui(session, handle.id);
    // 导航得到的是同一个缓存实例，参数已送达
    let view = server.view_provider().get_view("order-history", &ctx).unwrap();
    assert_eq!(
        view.as_component()
            .downcast::<OrderHistoryView>()
            .unwrap()
            .last_parameters
            .lock()
            .as_str(),
        "42"
    );
}

#[test]
fn ui_scoped_state_is_isolated_per_window() {
    let server = build_server();
    let session = server.init_session();
    let window_a = server.create_ui(session, "shop").unwrap();
    let window_b = server.create_ui(session, "shop").unwrap();

    let injector = server.injector();
    let cart_a = injector
        .resolve::<CartService>(&ScopeContext::of_ui(session, window_a.id))
        .unwrap();
    let cart_b = injector
        .resolve::<CartService>(&ScopeContext::of_ui(session, window_b.id))
        .unwrap();

    cart_a.add("键盘");
    cart_a.add("鼠标");
    cart_b.add("显示器");
    assert_eq!(cart_a.count(), 2);
    assert_eq!(cart_b.count(), 1);
    assert!(!Arc::ptr_eq(&cart_a, &cart_b));

    // 同一窗口内重复解析得到同一实例
    let cart_a_again = injector
        .resolve::<CartService>(&ScopeContext::of_ui(session, window_a.id))
        .unwrap();
    assert!(Arc::ptr_eq(&cart_a, &cart_a_again));
}

#[test]
fn singletons_are_shared_across_windows_and_sessions() {
    let server = build_server();
    let session_a = server.init_session();
    let session_b = server.init_session();
    let ui_a = server.create_ui(session_a, "shop").unwrap();
    let ui_b = server.create_ui(session_b, "shop").unwrap();

    let injector = server.injector();
    let repo_a = injector
        .resolve::<OrderRepository>(&ScopeContext::of_ui(session_a, ui_a.id))
        .unwrap();
    let repo_b = injector
        .resolve::<OrderRepository>(&ScopeContext::of_ui(session_b, ui_b.id))
        .unwrap();
    assert!(Arc::ptr_eq(&repo_a, &repo_b));
    repo_a.created.fetch_add(1, Ordering::SeqCst);
    assert_eq!(repo_b.created.load(Ordering::SeqCst), 1);
}

#[test]
fn view_shares_ui_scope_of_its_construction_window() {
    let server = build_server();
    let session = server.init_session();
    let handle = server.create_ui(session, "shop").unwrap();
    let ctx = ScopeContext::of_ui(session, handle.id);

    let view = server
        .view_provider()
        .get_view("order-history", &ctx)
        .unwrap()
        .as_component()
        .downcast::<OrderHistoryView>()
        .unwrap();
    let window_cart = server
        .injector()
        .resolve::<CartService>(&ctx)
        .unwrap();
    // 视图在独立窗口内构造，其购物车不与 UI 窗口的购物车混用
    assert!(!Arc::ptr_eq(&view.cart, &window_cart));
}

#[test]
fn unknown_session_and_path_are_rejected() {
    let server = build_server();
    let session = server.init_session();

    assert!(matches!(
        server.create_ui(viewbind_common::SessionId::new(), "shop"),
        Err(GlueError::Lifecycle { .. })
    ));
    assert!(matches!(
        server.create_ui(session, "no-such-path"),
        Err(GlueError::Configuration { .. })
    ));
    assert!(server.destroy_session(viewbind_common::SessionId::new()).is_err());
}

#[test]
fn failed_ui_creation_rolls_back_and_allows_retry() {
    static ATTEMPTS: AtomicUsize = AtomicUsize::new(0);

    struct FlakyUi;
    impl UiRoot for FlakyUi {}

    let server = ViewbindServer::builder()
        .without_logging_init()
        .register_ui::<FlakyUi, _>(UiMetadata::new().with_path("flaky"), |_, _| {
            if ATTEMPTS.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(InjectionError::CreationFailed {
                    key: "FlakyUi".into(),
                    message: "首次构造失败".into(),
                })
            } else {
                Ok(Arc::new(FlakyUi))
            }
        })
        .build()
        .unwrap();

    let session = server.init_session();
    assert!(server.create_ui(session, "flaky").is_err());
    // 失败后窗口关闭，作用域未泄漏
    assert!(!server.scope_engine().window_open());
    assert_eq!(server.scope_engine().scope_count(session), 0);

    let handle = server.create_ui(session, "flaky").unwrap();
    assert!(server.scope_engine().scope_of(handle.id).is_some());
}

#[test]
fn concurrent_ui_creation_never_overlaps_windows() {
    let server = Arc::new(build_server());
    let session = server.init_session();

    let mut threads = Vec::new();
    for _ in 0..8 {
        let server = Arc::clone(&server);
        threads.push(std::thread::spawn(move || {
            server.create_ui(session, "shop").map(|h| h.id)
        }));
    }
    let mut ids = Vec::new();
    for t in threads {
        ids.push(t.join().unwrap().unwrap());
    }

    assert!(!server.scope_engine().window_open());
    assert_eq!(server.scope_engine().scope_count(session), 8);
    // 每个窗口拿到各自的作用域令牌
    let mut tokens: Vec<_> = ids
        .iter()
        .map(|id| server.scope_engine().scope_of(*id).unwrap())
        .collect();
    tokens.sort_by_key(|t| t.to_string());
    tokens.dedup();
    assert_eq!(tokens.len(), 8);
}

#[test]
fn destroyed_session_no_longer_serves_views() {
    let server = build_server();
    let session = server.init_session();
    let handle = server.create_ui(session, "shop").unwrap();
    let ctx = ScopeContext::of_ui(session, handle.id);

    server.view_provider().get_view("home", &ctx).unwrap();
    server.destroy_session(session).unwrap();

    // 销毁后视图缓存桶不再存在，残留的导航上下文拿不到视图
    assert!(matches!(
        server.view_provider().get_view("home", &ctx),
        Err(viewbind_common::ViewError::SessionNotInitialized { .. })
    ));
}

#[test]
fn host_session_listeners_receive_lifecycle_callbacks() {
    struct RecordingListener {
        events: Mutex<Vec<String>>,
    }
    impl viewbind_common::SessionListener for RecordingListener {
        fn session_initialized(&self, session: viewbind_common::SessionId) {
            self.events.lock().push(format!("init {session}"));
        }
        fn session_destroyed(&self, session: viewbind_common::SessionId) {
            self.events.lock().push(format!("destroy {session}"));
        }
    }

    let listener = Arc::new(RecordingListener {
        events: Mutex::new(Vec::new()),
    });
    let server = ViewbindServer::builder()
        .without_logging_init()
        .register_ui::<ShopUi, _>(UiMetadata::new().with_path("shop"), |_, _| {
            Ok(Arc::new(ShopUi))
        })
        .register_session_listener(Arc::clone(&listener) as _)
        .build()
        .unwrap();

    let session = server.init_session();
    server.destroy_session(session).unwrap();

    let events = listener.events.lock();
    assert_eq!(
        events.as_slice(),
        [format!("init {session}"), format!("destroy {session}")]
    );
}

#[test]
fn builtin_bindings_are_resolvable() {
    let server = build_server();
    let session = server.init_session();
    let ctx = ScopeContext::unbound(session);

    let registry = server
        .injector()
        .resolve::<viewbind_common::ClassRegistry>(&ctx)
        .unwrap();
    assert_eq!(registry.uis().len(), 1);
    assert!(server
        .injector()
        .resolve::<viewbind_scoping::ScopeEngine>(&ctx)
        .is_ok());
}
