//! # Protoflex - 旧式 Protobuf 消息的结构化反射兼容层
//!
//! Protoflex 让按旧式粗粒度运行时生成的消息对象（只支持整条
//! 编解码与压缩模式 blob 提取）可以被新式细粒度结构化反射
//! 接口驱动，而不改写消息自身的编解码逻辑，也不改变序列化
//! 输出的任何一个字节。
//!
//! ## 特性
//!
//! - 从压缩模式 blob 恢复字段名、线路类别与嵌套结构
//! - 静态属性表驱动的逐字段遍历（Range）
//! - 直通旧式定长缓冲例程的快速路径编解码
//! - 只读 / 读写两级反射能力分层
//! - 兼容性校验执行器（字节一致性、往返、文本渲染、内容哈希）
//!
//! ## 快速开始
//!
//! ```rust,no_run,ignore
//! use protoflex::prelude::*;
//!
//! fn main() -> protoflex::Result<()> {
//!     let event = SyncEvent::beat(42, 7);
//!     let report = CompatRunner::new().verify(&event)?;
//!     println!("{:?}", report.content_hash);
//!     Ok(())
//! }
//! ```
//!
//! ## 模块组织
//!
//! ### 契约模块
//! - LegacyMessage - 旧式消息能力契约
//! - MessageView / MessageMut - 结构化反射分层契约
//!
//! ### 模式模块
//! - extract_file / for_message - 压缩 blob 提取
//! - ResolvedFile / MessageDescriptor - 已解析描述符
//!
//! ### 适配模块
//! - Adapter / AdapterMut - 反射适配器
//!
//! ### 校验模块
//! - CompatConfig / CompatRunner - 兼容性校验

// ============================================================================
// Conditional Compilation Based on Features
// ============================================================================

// 适配层
#[cfg(feature = "adapter")]
pub use protoflex_adapter::{Adapter, AdapterMut};

// 校验层
#[cfg(feature = "compat")]
pub use protoflex_compat::{CompatConfig, CompatReport, CompatRunner};

// ============================================================================
// Crate Re-exports (for advanced users)
// ============================================================================

#[cfg(feature = "adapter")]
pub use protoflex_core;

#[cfg(feature = "adapter")]
pub use protoflex_schema;

#[cfg(feature = "adapter")]
pub use protoflex_reflect;

#[cfg(feature = "adapter")]
pub use protoflex_adapter;

#[cfg(feature = "compat")]
pub use protoflex_compat;

// ============================================================================
// Prelude Module
// ============================================================================

/// 预导出常用类型
///
/// 通过 `use protoflex::prelude::*;` 导入所有常用类型
pub mod prelude {
    #[cfg(feature = "adapter")]
    pub use protoflex_core::{FieldProperty, LegacyMessage, RawDescriptor, RawField, RawList};

    #[cfg(feature = "adapter")]
    pub use protoflex_schema::{FieldDescriptor, MessageDescriptor, ResolveOptions};

    #[cfg(feature = "adapter")]
    pub use protoflex_reflect::{
        format_compact, unmarshal_replace, MarshalOptions, MessageMut, MessageView,
        UnmarshalOptions, Value,
    };

    #[cfg(feature = "adapter")]
    pub use protoflex_adapter::{Adapter, AdapterMut};

    #[cfg(feature = "compat")]
    pub use protoflex_compat::sample::{OpKind, PeerInfo, SyncEvent};

    #[cfg(feature = "compat")]
    pub use protoflex_compat::{CompatConfig, CompatRunner};
}

// ============================================================================
// Error Types
// ============================================================================

/// Protoflex 统一 Result 类型
pub type Result<T> = std::result::Result<T, Error>;

/// Protoflex 统一错误枚举
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// 线路格式错误
    #[cfg(feature = "adapter")]
    #[error(transparent)]
    Wire(#[from] protoflex_core::WireError),

    /// 模式错误
    #[cfg(feature = "adapter")]
    #[error(transparent)]
    Schema(#[from] protoflex_schema::SchemaError),

    /// 反射层错误
    #[cfg(feature = "adapter")]
    #[error(transparent)]
    Reflect(#[from] protoflex_reflect::ReflectError),

    /// 校验错误
    #[cfg(feature = "compat")]
    #[error(transparent)]
    Compat(#[from] protoflex_compat::CompatError),

    /// 配置错误
    #[cfg(feature = "compat")]
    #[error(transparent)]
    Config(#[from] protoflex_compat::ConfigError),

    /// 自定义错误
    #[error("{0}")]
    Custom(String),
}

// ============================================================================
// Version Information
// ============================================================================

/// Protoflex 版本号
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Protoflex 包名
pub const NAME: &str = env!("CARGO_PKG_NAME");
