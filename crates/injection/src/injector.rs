//! 注入器实现
//!
//! 持有装配完成的绑定表，按生命周期分派解析:
//! 单例缓存在注入器内部，UI 作用域委托给作用域引擎，瞬时直接构造。

use dashmap::DashMap;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::trace;
use viewbind_common::{
    Binding, BindingKey, InjectionError, InjectionResult, InstanceRef, Lifetime, Resolver,
    ScopeContext,
};
use viewbind_scoping::ScopeEngine;

/// 注入器
pub struct Injector {
    bindings: HashMap<BindingKey, Binding>,
    singletons: DashMap<BindingKey, InstanceRef>,
    engine: Arc<ScopeEngine>,
}

impl Injector {
    /// 以装配完成的绑定表创建注入器
    pub fn new(bindings: HashMap<BindingKey, Binding>, engine: Arc<ScopeEngine>) -> Self {
        Self {
            bindings,
            singletons: DashMap::new(),
            engine,
        }
    }

    /// 查询键的生命周期
    pub fn lifetime_of(&self, key: &BindingKey) -> Option<Lifetime> {
        self.bindings.get(key).map(|b| b.lifetime)
    }

    /// 是否存在指定键的绑定
    pub fn has_binding(&self, key: &BindingKey) -> bool {
        self.bindings.contains_key(key)
    }

    /// 绑定总数
    pub fn binding_count(&self) -> usize {
        self.bindings.len()
    }

    /// 作用域引擎
    pub fn scope_engine(&self) -> &Arc<ScopeEngine> {
        &self.engine
    }
}

impl Resolver for Injector {
    fn resolve_any(
        &self,
        key: &BindingKey,
        ctx: &ScopeContext,
    ) -> InjectionResult<InstanceRef> {
        let binding = self
            .bindings
            .get(key)
            .ok_or_else(|| InjectionError::BindingNotFound {
                key: key.to_string(),
            })?;
        trace!(%key, lifetime = ?binding.lifetime, "解析绑定");
        match binding.lifetime {
            Lifetime::Singleton => {
                if let Some(existing) = self.singletons.get(key) {
                    return Ok(Arc::clone(existing.value()));
                }
                let created = (binding.provider)(self, ctx)?;
                // 并发竞争时先写入者胜出
                let entry = self.singletons.entry(key.clone()).or_insert(created);
                Ok(Arc::clone(entry.value()))
            }
            Lifetime::UiScoped => {
                let instance = self
                    .engine
                    .scope(key, ctx, || (binding.provider)(self, ctx))?;
                Ok(instance)
            }
            Lifetime::Transient => (binding.provider)(self, ctx),
        }
    }
}

impl std::fmt::Debug for Injector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Injector")
            .field("bindings", &self.bindings.len())
            .field("singletons", &self.singletons.len())
            .finish()
    }
}
