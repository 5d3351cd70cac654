//! 命名约定
//!
//! 视图名称的派生及导航状态的拆分规则

/// 按约定从类型短名派生视图名称
///
/// 去掉末尾的 `View` 后缀（若去掉后为空则保留原名），
/// 再在内部大写字母前插入连字符并整体转小写。
/// 例如 `OrderHistoryView` 派生为 `order-history`。
pub fn derive_view_name(type_name: &str) -> String {
    let base = match type_name.strip_suffix("View") {
        Some(stripped) if !stripped.is_empty() => stripped,
        _ => type_name,
    };

    let mut name = String::with_capacity(base.len() + 4);
    for (i, ch) in base.chars().enumerate() {
        if ch.is_uppercase() {
            if i > 0 {
                name.push('-');
            }
            for lower in ch.to_lowercase() {
                name.push(lower);
            }
        } else {
            name.push(ch);
        }
    }
    name
}

/// 取导航状态中首个 `/` 之前的视图名部分
///
/// 请求路径形式的状态允许携带一个前导 `/`，先剥掉再拆分
pub fn leading_view_name(state: &str) -> &str {
    let state = state.strip_prefix('/').unwrap_or(state);
    match state.find('/') {
        Some(idx) => &state[..idx],
        None => state,
    }
}

/// 取导航状态中视图名之后的参数部分（不含分隔符）
pub fn trailing_parameters(state: &str) -> &str {
    let state = state.strip_prefix('/').unwrap_or(state);
    match state.find('/') {
        Some(idx) => &state[idx + 1..],
        None => "",
    }
}
