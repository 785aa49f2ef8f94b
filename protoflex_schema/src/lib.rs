//! Protoflex 模式提取与解析
//!
//! 从压缩模式 blob 中恢复消息类型的结构描述（字段名、类别、
//! 嵌套关系），并链接为可供反射消费方导航的已解析描述符。

pub mod descriptor;
pub mod extract;
pub mod resolve;

// 导出主要类型到 crate root
pub use crate::descriptor::{
    Cardinality, EnumDescriptor, FieldDescriptor, Kind, MessageDescriptor,
};
pub use crate::extract::{extract_file, for_message, message_full_name};
pub use crate::resolve::{resolve_file, ResolveOptions, ResolvedFile};

use thiserror::Error;

/// 模式错误
#[derive(Error, Debug)]
pub enum SchemaError {
    /// 模式数据解压失败（blob 损坏或截断）
    #[error("模式数据解压失败: {0}")]
    Corrupt(String),

    /// 解压后的模式数据反序列化失败
    #[error("模式数据反序列化失败: {0}")]
    Malformed(#[from] prost::DecodeError),

    /// 字段不存在
    #[error("字段不存在: {0}")]
    FieldNotFound(String),

    /// 消息类型不存在
    #[error("消息类型不存在: {0}")]
    MessageNotFound(String),

    /// 无法定位的类型引用
    #[error("无法定位的类型引用: {0}")]
    UnresolvedType(String),
}

/// 模式 Result 类型
pub type Result<T> = std::result::Result<T, SchemaError>;

/// 一步完成提取与解析
///
/// 从压缩 blob 与类型路径定位消息类型，解析整个模式文件，
/// 返回该消息的已解析描述符。每次调用重新解压并解析。
pub fn resolve_message(
    gz: &[u8],
    path: &[usize],
    options: &ResolveOptions,
) -> Result<MessageDescriptor> {
    let (file, _message) = extract::for_message(gz, path)?;
    let full_name = extract::message_full_name(&file, path);
    let resolved = resolve::resolve_file(&file, options)?;
    resolved
        .message_by_full_name(&full_name)
        .ok_or(SchemaError::MessageNotFound(full_name))
}
