//! Protoflex 旧式消息契约
//!
//! 定义适配层对旧式消息的全部要求（LegacyMessage trait），
//! 以及旧式生成代码使用的底层线路格式辅助。

pub mod legacy;
pub mod wire;

// 导出主要类型到 crate root
pub use crate::legacy::{
    FieldProperty, LegacyMessage, MessageSeq, RawDescriptor, RawField, RawList,
};
pub use crate::wire::WireError;

// 预导出
pub mod prelude {
    pub use crate::legacy::{FieldProperty, LegacyMessage, RawDescriptor, RawField, RawList};
    pub use crate::wire::WireError;
}
