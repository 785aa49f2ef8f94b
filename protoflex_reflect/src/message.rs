//! 反射消息契约
//!
//! 按能力分层：MessageView 为只读层（适配层完整实现），
//! MessageMut 为读写层。变更类操作当前全部声明未实现，调用方
//! 会得到明确的失败而不是静默忽略。

use bytes::BytesMut;
use protoflex_schema::{FieldDescriptor, MessageDescriptor};

use crate::value::Value;
use crate::ReflectError;

/// 序列化选项
///
/// 快速路径只接受默认选项，任何非默认取值都会被拒绝。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarshalOptions {
    /// 要求确定性输出
    pub deterministic: bool,
    /// 使用缓存的尺寸信息
    pub use_cached_size: bool,
}

impl MarshalOptions {
    /// 是否为默认选项
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

/// 反序列化选项
///
/// 快速路径只接受默认选项，任何非默认取值都会被拒绝。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnmarshalOptions {
    /// 合并到现有状态而非完全替换
    pub merge: bool,
    /// 丢弃未知字段
    pub discard_unknown: bool,
}

impl UnmarshalOptions {
    /// 是否为默认选项
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

/// 只读反射层
///
/// 新编解码器对消息的最小读取契约：获取描述符、遍历已填充
/// 字段、快速路径序列化。
pub trait MessageView {
    /// 获取消息类型描述符
    ///
    /// 首次调用触发模式提取与解析，之后返回缓存结果。
    fn descriptor(&self) -> Result<MessageDescriptor, ReflectError>;

    /// 遍历已填充字段
    ///
    /// 对每个字段以 (描述符, 取值) 调用访问器；访问器返回 false
    /// 时立即停止。遍历顺序由实现决定，调用方不得依赖。
    fn range<'s>(
        &'s self,
        visit: &mut dyn FnMut(FieldDescriptor, Value<'s>) -> bool,
    ) -> Result<(), ReflectError>;

    /// 快速路径序列化
    ///
    /// 复用传入缓冲并调整为精确尺寸，绕过逐字段遍历，输出与
    /// 旧路径逐字节一致。
    fn marshal(&self, options: &MarshalOptions, buf: BytesMut) -> Result<BytesMut, ReflectError>;

    /// 校验必填字段是否齐全
    fn check_initialized(&self) -> Result<(), ReflectError>;

    /// 消息是否有效
    fn is_valid(&self) -> bool;

    /// 获取未知字段原始数据
    fn get_unknown(&self) -> Option<&[u8]>;

    /// 读取单个字段的取值（声明但未实现）
    fn get(&self, field: &FieldDescriptor) -> Result<Value<'_>, ReflectError>;

    /// 判断字段是否已填充（声明但未实现）
    fn has(&self, field: &FieldDescriptor) -> Result<bool, ReflectError>;
}

/// 读写反射层
///
/// 在只读层之上增加替换与变更操作。
pub trait MessageMut: MessageView {
    /// 快速路径反序列化
    ///
    /// 字节直接交给旧式消息自身的解析例程（合并语义）；完全
    /// 替换见 [`unmarshal_replace`]。
    fn unmarshal(&mut self, options: &UnmarshalOptions, buf: &[u8]) -> Result<(), ReflectError>;

    /// 重置为初始状态
    fn reset(&mut self);

    /// 设置字段取值（声明但未实现）
    fn set(&mut self, field: &FieldDescriptor, value: Value<'_>) -> Result<(), ReflectError>;

    /// 清除字段（声明但未实现）
    fn clear(&mut self, field: &FieldDescriptor) -> Result<(), ReflectError>;

    /// 获取复合字段的可变引用（声明但未实现）
    fn mutable(&mut self, field: &FieldDescriptor) -> Result<Value<'_>, ReflectError>;

    /// 构造可赋给字段的新值（声明但未实现）
    fn new_field(&self, field: &FieldDescriptor) -> Result<Value<'_>, ReflectError>;

    /// 报告 oneof 中已填充的字段（声明但未实现）
    fn which_oneof(&self, name: &str) -> Result<Option<FieldDescriptor>, ReflectError>;

    /// 写入未知字段原始数据（声明但未实现）
    fn set_unknown(&mut self, raw: &[u8]) -> Result<(), ReflectError>;
}

/// 完全替换式反序列化
///
/// 先重置再走快速路径，成功后消息状态被完全替换。
pub fn unmarshal_replace(
    message: &mut dyn MessageMut,
    options: &UnmarshalOptions,
    buf: &[u8],
) -> Result<(), ReflectError> {
    message.reset();
    message.unmarshal(options, buf)
}
