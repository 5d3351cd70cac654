//! # 示例应用程序
//!
//! 演示 Viewbind 的完整使用方式: 登记 UI、视图与模块，
//! 装配服务端，模拟一个会话内的窗口创建与视图导航。

use anyhow::Result;
use clap::Parser;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::info;
use viewbind_common::{
    Binder, ComponentRef, Lifetime, Module, ModuleCtor, ModuleMetadata, ResolverExt, UiMetadata,
    UiRoot, View, ViewContainer, ViewContainerBinding, ViewMetadata,
};
use viewbind_composition::{DeploymentConfig, LoggingConfig, ViewbindServer};

/// 命令行参数
#[derive(Parser, Debug)]
#[command(name = "demo-app")]
#[command(about = "Viewbind 示例应用")]
struct Args {
    /// 配置文件路径
    #[arg(short, long)]
    config: Option<String>,

    /// 是否输出 JSON 日志
    #[arg(long)]
    json_logs: bool,

    /// 模拟导航的目标状态
    #[arg(long, default_value = "order-history/1001")]
    navigate: String,
}

/// 购物车服务，每个浏览器窗口一份
struct CartService {
    items: Mutex<Vec<String>>,
}

impl CartService {
    fn add(&self, item: &str) {
        self.items.lock().push(item.to_string());
    }
}

/// 主窗口
struct ShopUi;
impl UiRoot for ShopUi {
    fn set_content(&self, _content: ComponentRef) {
        info!("主窗口内容已设置");
    }
}

/// 视图容器
struct ShopContainer;
impl ViewContainer for ShopContainer {
    fn show(&self, _view: ComponentRef) {
        info!("容器切换到新视图");
    }
}

/// 首页视图
struct HomeView;
impl View for HomeView {
    fn on_enter(&self, _parameters: &str) {
        info!("进入首页");
    }
    fn as_component(self: Arc<Self>) -> ComponentRef {
        self
    }
}

/// 订单历史视图
struct OrderHistoryView {
    cart: Arc<CartService>,
}
impl View for OrderHistoryView {
    fn on_enter(&self, parameters: &str) {
        self.cart.add(parameters);
        info!(order = parameters, "展示订单详情");
    }
    fn as_component(self: Arc<Self>) -> ComponentRef {
        self
    }
}

/// 找不到视图时的回退
struct NotFoundView;
impl View for NotFoundView {
    fn on_enter(&self, parameters: &str) {
        info!(state = parameters, "展示 404 页面");
    }
    fn as_component(self: Arc<Self>) -> ComponentRef {
        self
    }
}

/// 应用绑定模块
struct ShopModule;
impl Module for ShopModule {
    fn configure(&self, binder: &mut Binder) {
        binder.bind_provider::<CartService, _>(Lifetime::UiScoped, |_, _| {
            Ok(Arc::new(CartService {
                items: Mutex::new(Vec::new()),
            }))
        });
        binder.bind_provider::<ShopContainer, _>(Lifetime::UiScoped, |_, _| {
            Ok(Arc::new(ShopContainer))
        });
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => DeploymentConfig::from_file(std::path::Path::new(path))?,
        None => DeploymentConfig::default(),
    };
    if args.json_logs {
        config.logging = LoggingConfig::production();
    }

    let server = ViewbindServer::builder()
        .with_deployment_config(config)
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
            }))
        })
        .register_view::<NotFoundView, _>(
            ViewMetadata::new().with_name("not-found").as_error_view(),
            |_, _| Ok(Arc::new(NotFoundView)),
        )
        .register_module::<ShopModule>(
            ModuleMetadata::new(),
            vec![ModuleCtor::Default(Arc::new(|| {
                Arc::new(ShopModule) as Arc<dyn Module>
            }))],
        )
        .build()?;

    info!("服务端装配完成，开始模拟会话");

    // 模拟: 浏览器建立会话并打开一个窗口
    let session = server.init_session();
    let window = server.create_ui(session, "shop")?;
    let navigator = window
        .navigator
        .as_ref()
        .ok_or_else(|| anyhow::anyhow!("shop UI 未配置视图容器"))?;

    // 模拟: 用户依次访问首页与命令行指定的状态
    navigator.navigate_to("home")?;
    navigator.navigate_to(&args.navigate)?;
    info!(current = ?navigator.current_view(), "导航结束");

    // 模拟: 浏览器关闭，会话销毁
    server.destroy_session(session)?;
    let metrics = server.metrics();
    info!(sessions = metrics.sessions, "会话已回收，应用退出");
    Ok(())
}
