//! Protoflex 反射适配器
//!
//! 将只支持整条编解码的旧式消息包装为满足结构化反射契约的
//! 消息视图：描述符在首次访问时解析一次并缓存，逐字段遍历由
//! 静态属性表驱动，字节级编解码直通旧式消息自身的快速路径，
//! 保证输出与旧路径逐字节一致。

mod adapter;
mod bridge;
mod range;

pub use crate::adapter::{Adapter, AdapterMut};

// 预导出
pub mod prelude {
    pub use crate::adapter::{Adapter, AdapterMut};
    pub use protoflex_reflect::{MessageMut, MessageView};
}
