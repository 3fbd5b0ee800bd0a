use proc_macro::TokenStream;

mod event;

/// 事件派生宏
/// - 为结构体/枚举实现 `::eventing_core::event::Event`
/// - 结构体：`#[event(event_type = "...")]` 指定类型键；缺省时回退为具体类型名
/// - 枚举：变体可通过 `#[event(event_type = "...")]` 覆写，缺省为 `EnumName.Variant`；
///   枚举级 `#[event(event_type = "...")]` 作为所有变体的默认值
#[proc_macro_derive(Event, attributes(event))]
pub fn derive_event(input: TokenStream) -> TokenStream {
    event::expand(input)
}
