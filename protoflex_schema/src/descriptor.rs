//! 已解析描述符模型
//!
//! 描述符数据集中存放在共享池中，对外句柄只持有池指针与下标，
//! 克隆开销极低；句柄相等当且仅当指向同一个池中的同一项。

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::SchemaError;

/// 字段的线路类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Double,
    Float,
    Int64,
    Uint64,
    Int32,
    Fixed64,
    Fixed32,
    Bool,
    String,
    Group,
    Message,
    Bytes,
    Uint32,
    Enum,
    Sfixed32,
    Sfixed64,
    Sint32,
    Sint64,
}

impl Kind {
    /// 从模式文件中的字段类型编号映射
    pub(crate) fn from_proto(t: prost_types::field_descriptor_proto::Type) -> Kind {
        use prost_types::field_descriptor_proto::Type;
        match t {
            Type::Double => Kind::Double,
            Type::Float => Kind::Float,
            Type::Int64 => Kind::Int64,
            Type::Uint64 => Kind::Uint64,
            Type::Int32 => Kind::Int32,
            Type::Fixed64 => Kind::Fixed64,
            Type::Fixed32 => Kind::Fixed32,
            Type::Bool => Kind::Bool,
            Type::String => Kind::String,
            Type::Group => Kind::Group,
            Type::Message => Kind::Message,
            Type::Bytes => Kind::Bytes,
            Type::Uint32 => Kind::Uint32,
            Type::Enum => Kind::Enum,
            Type::Sfixed32 => Kind::Sfixed32,
            Type::Sfixed64 => Kind::Sfixed64,
            Type::Sint32 => Kind::Sint32,
            Type::Sint64 => Kind::Sint64,
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Kind::Double => "double",
            Kind::Float => "float",
            Kind::Int64 => "int64",
            Kind::Uint64 => "uint64",
            Kind::Int32 => "int32",
            Kind::Fixed64 => "fixed64",
            Kind::Fixed32 => "fixed32",
            Kind::Bool => "bool",
            Kind::String => "string",
            Kind::Group => "group",
            Kind::Message => "message",
            Kind::Bytes => "bytes",
            Kind::Uint32 => "uint32",
            Kind::Enum => "enum",
            Kind::Sfixed32 => "sfixed32",
            Kind::Sfixed64 => "sfixed64",
            Kind::Sint32 => "sint32",
            Kind::Sint64 => "sint64",
        };
        f.write_str(name)
    }
}

/// 字段基数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    /// 单值
    Singular,
    /// 重复
    Repeated,
}

pub(crate) struct FieldData {
    pub(crate) name: String,
    pub(crate) number: u32,
    pub(crate) kind: Kind,
    pub(crate) cardinality: Cardinality,
    /// 嵌套消息类型在池中的下标
    pub(crate) message: Option<usize>,
    /// 枚举类型在池中的下标
    pub(crate) enum_type: Option<usize>,
    /// 未能定位的类型引用保留原始名称作为占位
    pub(crate) unresolved: Option<String>,
}

pub(crate) struct MessageData {
    pub(crate) name: String,
    pub(crate) full_name: String,
    pub(crate) fields: Vec<FieldData>,
    pub(crate) field_index: HashMap<String, usize>,
}

pub(crate) struct EnumData {
    pub(crate) name: String,
    pub(crate) full_name: String,
    pub(crate) values: Vec<(String, i32)>,
}

pub(crate) struct Pool {
    pub(crate) package: String,
    pub(crate) messages: Vec<MessageData>,
    pub(crate) enums: Vec<EnumData>,
    pub(crate) message_index: HashMap<String, usize>,
    pub(crate) enum_index: HashMap<String, usize>,
}

/// 消息类型描述符句柄
#[derive(Clone)]
pub struct MessageDescriptor {
    pub(crate) pool: Arc<Pool>,
    pub(crate) index: usize,
}

impl MessageDescriptor {
    fn data(&self) -> &MessageData {
        &self.pool.messages[self.index]
    }

    /// 短名称
    pub fn name(&self) -> &str {
        &self.data().name
    }

    /// 包限定全名
    pub fn full_name(&self) -> &str {
        &self.data().full_name
    }

    /// 字段数量
    pub fn field_count(&self) -> usize {
        self.data().fields.len()
    }

    /// 按下标获取字段
    pub fn field(&self, index: usize) -> Option<FieldDescriptor> {
        if index >= self.field_count() {
            return None;
        }
        Some(FieldDescriptor {
            pool: Arc::clone(&self.pool),
            message: self.index,
            field: index,
        })
    }

    /// 按声明顺序遍历全部字段
    pub fn fields(&self) -> impl Iterator<Item = FieldDescriptor> {
        let pool = Arc::clone(&self.pool);
        let message = self.index;
        (0..self.field_count()).map(move |field| FieldDescriptor {
            pool: Arc::clone(&pool),
            message,
            field,
        })
    }

    /// 按线路名称查找字段
    pub fn field_by_name(&self, name: &str) -> Result<FieldDescriptor, SchemaError> {
        match self.data().field_index.get(name) {
            Some(&field) => Ok(FieldDescriptor {
                pool: Arc::clone(&self.pool),
                message: self.index,
                field,
            }),
            None => Err(SchemaError::FieldNotFound(format!(
                "{}.{}",
                self.full_name(),
                name
            ))),
        }
    }
}

impl PartialEq for MessageDescriptor {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.pool, &other.pool) && self.index == other.index
    }
}

impl Eq for MessageDescriptor {}

impl fmt::Debug for MessageDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MessageDescriptor({})", self.full_name())
    }
}

/// 字段描述符句柄
#[derive(Clone)]
pub struct FieldDescriptor {
    pub(crate) pool: Arc<Pool>,
    pub(crate) message: usize,
    pub(crate) field: usize,
}

impl FieldDescriptor {
    fn data(&self) -> &FieldData {
        &self.pool.messages[self.message].fields[self.field]
    }

    /// 线路格式字段名
    pub fn name(&self) -> &str {
        &self.data().name
    }

    /// 字段编号
    pub fn number(&self) -> u32 {
        self.data().number
    }

    /// 线路类别
    pub fn kind(&self) -> Kind {
        self.data().kind
    }

    /// 字段基数
    pub fn cardinality(&self) -> Cardinality {
        self.data().cardinality
    }

    /// 是否为重复字段
    pub fn is_list(&self) -> bool {
        self.data().cardinality == Cardinality::Repeated
    }

    /// 嵌套消息类型的描述符（未定位的引用返回 None）
    pub fn message_descriptor(&self) -> Option<MessageDescriptor> {
        self.data().message.map(|index| MessageDescriptor {
            pool: Arc::clone(&self.pool),
            index,
        })
    }

    /// 枚举类型的描述符（未定位的引用返回 None）
    pub fn enum_descriptor(&self) -> Option<EnumDescriptor> {
        self.data().enum_type.map(|index| EnumDescriptor {
            pool: Arc::clone(&self.pool),
            index,
        })
    }

    /// 未定位引用保留的原始类型名
    pub fn unresolved_type_name(&self) -> Option<&str> {
        self.data().unresolved.as_deref()
    }
}

impl PartialEq for FieldDescriptor {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.pool, &other.pool)
            && self.message == other.message
            && self.field == other.field
    }
}

impl Eq for FieldDescriptor {}

impl fmt::Debug for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "FieldDescriptor({}.{})",
            self.pool.messages[self.message].full_name,
            self.name()
        )
    }
}

/// 枚举类型描述符句柄
#[derive(Clone)]
pub struct EnumDescriptor {
    pub(crate) pool: Arc<Pool>,
    pub(crate) index: usize,
}

impl EnumDescriptor {
    fn data(&self) -> &EnumData {
        &self.pool.enums[self.index]
    }

    /// 短名称
    pub fn name(&self) -> &str {
        &self.data().name
    }

    /// 包限定全名
    pub fn full_name(&self) -> &str {
        &self.data().full_name
    }

    /// 按数值查找枚举值名称（存在别名时返回第一个声明）
    pub fn value_name(&self, number: i32) -> Option<&str> {
        self.data()
            .values
            .iter()
            .find(|(_, n)| *n == number)
            .map(|(name, _)| name.as_str())
    }

    /// 按声明顺序遍历枚举值
    pub fn values(&self) -> impl Iterator<Item = (&str, i32)> {
        self.data().values.iter().map(|(name, n)| (name.as_str(), *n))
    }
}

impl PartialEq for EnumDescriptor {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.pool, &other.pool) && self.index == other.index
    }
}

impl Eq for EnumDescriptor {}

impl fmt::Debug for EnumDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EnumDescriptor({})", self.full_name())
    }
}
