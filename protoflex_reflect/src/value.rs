//! 归一化取值模型
//!
//! Range 遍历产出的字段取值：标量按类别打标签，字节与列表
//! 借用自来源字段，嵌套消息包装为新的只读视图（仍只借用
//! 底层消息，不发生深拷贝）。

use std::fmt;

use protoflex_core::RawList;
use protoflex_schema::FieldDescriptor;

use crate::message::MessageView;
use crate::ReflectError;

/// 字段取值
pub enum Value<'a> {
    /// 枚举序数
    Enum(i32),
    /// 64 位无符号整数
    Uint64(u64),
    /// 布尔值
    Bool(bool),
    /// 字节串（调用方必须按只读处理）
    Bytes(&'a [u8]),
    /// 嵌套消息的只读视图
    Message(Box<dyn MessageView + 'a>),
    /// 重复字段
    List(ListValue<'a>),
}

impl<'a> Value<'a> {
    /// 取枚举序数
    pub fn as_enum(&self) -> Option<i32> {
        match self {
            Value::Enum(n) => Some(*n),
            _ => None,
        }
    }

    /// 取无符号整数
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Value::Uint64(v) => Some(*v),
            _ => None,
        }
    }

    /// 取布尔值
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// 取字节串
    pub fn as_bytes(&self) -> Option<&'a [u8]> {
        match self {
            Value::Bytes(b) => Some(*b),
            _ => None,
        }
    }

    /// 取嵌套消息视图
    pub fn as_message(&self) -> Option<&dyn MessageView> {
        match self {
            Value::Message(m) => Some(m.as_ref()),
            _ => None,
        }
    }

    /// 取重复字段句柄
    pub fn as_list(&self) -> Option<&ListValue<'a>> {
        match self {
            Value::List(list) => Some(list),
            _ => None,
        }
    }
}

impl fmt::Debug for Value<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Enum(n) => write!(f, "Enum({})", n),
            Value::Uint64(v) => write!(f, "Uint64({})", v),
            Value::Bool(v) => write!(f, "Bool({})", v),
            Value::Bytes(b) => write!(f, "Bytes(len={})", b.len()),
            Value::Message(_) => write!(f, "Message(..)"),
            Value::List(list) => write!(f, "List(len={})", list.len()),
        }
    }
}

/// 重复字段句柄
///
/// 只借用旧式消息的后备存储。当前契约只提供长度；逐元素访问
/// 与变更是声明但未实现的操作，完整实现需按元素类别做与逐
/// 字段取值相同的转换。
pub struct ListValue<'a> {
    list: RawList<'a>,
    field: FieldDescriptor,
}

impl<'a> ListValue<'a> {
    /// 包装一个重复字段的底层存储
    pub fn new(list: RawList<'a>, field: FieldDescriptor) -> Self {
        Self { list, field }
    }

    /// 元素数量
    pub fn len(&self) -> usize {
        self.list.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    /// 元素所属字段的描述符
    pub fn field(&self) -> &FieldDescriptor {
        &self.field
    }

    /// 获取指定下标的元素（声明但未实现）
    pub fn get(&self, _index: usize) -> Result<Value<'a>, ReflectError> {
        Err(ReflectError::Unsupported("ListValue::get"))
    }

    /// 设置指定下标的元素（声明但未实现）
    pub fn set(&mut self, _index: usize, _value: Value<'a>) -> Result<(), ReflectError> {
        Err(ReflectError::Unsupported("ListValue::set"))
    }

    /// 追加元素（声明但未实现）
    pub fn append(&mut self, _value: Value<'a>) -> Result<(), ReflectError> {
        Err(ReflectError::Unsupported("ListValue::append"))
    }

    /// 追加一个新的可变消息元素（声明但未实现）
    pub fn append_mutable(&mut self) -> Result<Value<'a>, ReflectError> {
        Err(ReflectError::Unsupported("ListValue::append_mutable"))
    }

    /// 截断到更小长度（声明但未实现）
    pub fn truncate(&mut self, _len: usize) -> Result<(), ReflectError> {
        Err(ReflectError::Unsupported("ListValue::truncate"))
    }

    /// 构造一个新的元素值（声明但未实现）
    pub fn new_element(&self) -> Result<Value<'a>, ReflectError> {
        Err(ReflectError::Unsupported("ListValue::new_element"))
    }
}
