//! 命名通道目录（eventing-directory）
//!
//! 由调用方持有的通道注册表：按名称登记通道，向指定通道或全部通道发布，
//! 并在结束时统一关闭。
//!
pub mod directory;
pub mod error;

pub use directory::ChannelDirectory;
pub use error::DirectoryError;
