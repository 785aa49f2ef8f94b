//! Protoflex 结构化反射接口
//!
//! 新编解码器消费的逐字段反射契约：只读层 MessageView、读写层
//! MessageMut、归一化取值模型与单行文本渲染。适配层实现这组
//! 契约，把旧式消息接入新编解码器。

pub mod message;
pub mod text;
pub mod value;

// 导出主要类型到 crate root
pub use crate::message::{
    unmarshal_replace, MarshalOptions, MessageMut, MessageView, UnmarshalOptions,
};
pub use crate::text::format_compact;
pub use crate::value::{ListValue, Value};

use protoflex_core::WireError;
use protoflex_schema::{Kind, SchemaError};
use thiserror::Error;

/// 反射层错误
#[derive(Error, Debug)]
pub enum ReflectError {
    /// 模式提取或解析失败
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// 字段元数据与已解析模式不一致
    ///
    /// 属性表与模式由同一构建过程生成，两者不一致说明被包装
    /// 的类型违反了适配层的基础假设。
    #[error("字段元数据与模式不一致: {0}")]
    FieldMismatch(String),

    /// 不支持的线路类别
    #[error("不支持的线路类别: {0}")]
    UnsupportedKind(Kind),

    /// 不支持的编解码选项
    #[error("不支持的编解码选项: {0}")]
    UnsupportedFlags(String),

    /// 声明但未实现的操作
    #[error("操作未实现: {0}")]
    Unsupported(&'static str),

    /// 缺少必填字段
    #[error("缺少必填字段: {0}")]
    RequiredFieldMissing(String),

    /// 旧式消息自身的编解码错误，原样透传
    #[error(transparent)]
    Wire(#[from] WireError),
}

// 预导出
pub mod prelude {
    pub use crate::message::{
        unmarshal_replace, MarshalOptions, MessageMut, MessageView, UnmarshalOptions,
    };
    pub use crate::text::format_compact;
    pub use crate::value::{ListValue, Value};
    pub use crate::ReflectError;
}
