//! 模块装配
//!
//! 把注册表中的模块实例化并合成最终绑定表:
//! 基础模块之间的键冲突视为配置错误，覆盖模块的绑定
//! 无条件覆盖基础绑定。

use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};
use viewbind_common::{
    Binder, Binding, BindingKey, ClassRegistry, ConfigurationError, ConfigurationResult, Module,
    ModuleCtor, ModuleRegistration, ResolverHandle,
};

/// 模块装配器
pub struct ModuleAssembler {
    registry: Arc<ClassRegistry>,
    resolver: ResolverHandle,
}

impl ModuleAssembler {
    /// 创建装配器
    pub fn new(registry: Arc<ClassRegistry>, resolver: ResolverHandle) -> Self {
        Self { registry, resolver }
    }

    /// 实例化单个模块
    ///
    /// 按声明顺序取第一个可满足的构造函数: 选项构造函数仅在
    /// 登记项附加了选项时可满足。没有可满足的构造函数时报错
    pub fn instantiate(
        &self,
        registration: &ModuleRegistration,
    ) -> ConfigurationResult<Arc<dyn Module>> {
        for ctor in &registration.ctors {
            let module = match ctor {
                ModuleCtor::Default(f) => f(),
                ModuleCtor::WithRegistry(f) => f(Arc::clone(&self.registry)),
                ModuleCtor::WithResolver(f) => f(self.resolver.clone()),
                ModuleCtor::WithOptions(f) => match &registration.options {
                    Some(options) => f(Arc::clone(options)),
                    None => continue,
                },
            };
            debug!(module = %registration.type_info.name, ctor = ?ctor, "模块已实例化");
            return Ok(module);
        }
        Err(ConfigurationError::NoEligibleConstructor {
            module_type: registration.type_info.name.clone(),
        })
    }

    /// 装配全部模块为最终绑定表
    pub fn assemble(&self) -> ConfigurationResult<HashMap<BindingKey, Binding>> {
        let (overrides, base): (Vec<_>, Vec<_>) = self
            .registry
            .modules()
            .iter()
            .partition(|m| m.metadata.overrides_bindings);

        // 基础模块: 键冲突即报错
        let mut owners: HashMap<BindingKey, String> = HashMap::new();
        let mut bindings: HashMap<BindingKey, Binding> = HashMap::new();
        for registration in &base {
            let module = self.instantiate(registration)?;
            let mut binder = Binder::new();
            module.configure(&mut binder);
            for (key, binding) in binder.into_bindings() {
                if let Some(first) = owners.get(&key) {
                    return Err(ConfigurationError::DuplicateBinding {
                        key: key.to_string(),
                        first: first.clone(),
                        second: registration.type_info.name.clone(),
                    });
                }
                owners.insert(key.clone(), registration.type_info.name.clone());
                bindings.insert(key, binding);
            }
        }

        // 覆盖模块: 后配置者无条件覆盖
        for registration in &overrides {
            let module = self.instantiate(registration)?;
            let mut binder = Binder::new();
            module.configure(&mut binder);
            for (key, binding) in binder.into_bindings() {
                if bindings.insert(key.clone(), binding).is_some() {
                    debug!(%key, module = %registration.type_info.name, "基础绑定已被覆盖");
                }
            }
        }

        info!(
            base_modules = base.len(),
            override_modules = overrides.len(),
            bindings = bindings.len(),
            "模块装配完成"
        );
        Ok(bindings)
    }
}
