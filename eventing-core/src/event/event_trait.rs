use std::any::{Any, type_name};
use std::borrow::Cow;

/// 事件载荷需要满足的能力边界
///
/// 类型键（event type）是订阅匹配的最小单位：
/// - 显式声明：覆写 `event_type`（或使用 `#[derive(Event)]` + `#[event(event_type = "...")]`）；
/// - 结构回退：默认实现返回具体类型名 `std::any::type_name::<Self>()`。
///
/// 同一事件实例的类型键在其生命周期内必须保持不变。
pub trait Event: Any + Send + Sync {
    /// 事件类型键（形如 `order.created`，或回退为具体类型名）
    fn event_type(&self) -> Cow<'static, str> {
        Cow::Borrowed(type_name::<Self>())
    }
}
