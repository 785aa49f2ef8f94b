//! 模式解析
//!
//! 将解压后的模式文件链接为可导航的已解析描述符：第一遍按
//! 全名注册全部消息与枚举（含嵌套），第二遍解析字段间的类型
//! 引用。解析预期每个消息类型只执行一次，由调用方缓存结果。

use std::collections::HashMap;
use std::sync::Arc;

use prost_types::field_descriptor_proto::Label;
use prost_types::{DescriptorProto, EnumDescriptorProto, FieldDescriptorProto, FileDescriptorProto};

use crate::descriptor::{
    Cardinality, EnumData, FieldData, Kind, MessageData, MessageDescriptor, Pool,
};
use crate::SchemaError;

/// 解析选项
#[derive(Debug, Clone, Default)]
pub struct ResolveOptions {
    /// 允许无法定位的跨文件类型引用
    ///
    /// 开启时，引用类型缺失的字段以未知类型占位符保留；
    /// 关闭时解析直接失败。
    pub allow_unresolvable: bool,
}

/// 已解析的模式文件
#[derive(Clone)]
pub struct ResolvedFile {
    pool: Arc<Pool>,
}

impl ResolvedFile {
    /// 按短名称查找文件级消息类型
    pub fn message_by_name(&self, name: &str) -> Option<MessageDescriptor> {
        let full_name = if self.pool.package.is_empty() {
            name.to_string()
        } else {
            format!("{}.{}", self.pool.package, name)
        };
        self.message_by_full_name(&full_name)
    }

    /// 按包限定全名查找消息类型（含嵌套类型）
    pub fn message_by_full_name(&self, full_name: &str) -> Option<MessageDescriptor> {
        self.pool
            .message_index
            .get(full_name)
            .map(|&index| MessageDescriptor {
                pool: Arc::clone(&self.pool),
                index,
            })
    }

    /// 消息类型数量（含嵌套类型）
    pub fn message_count(&self) -> usize {
        self.pool.messages.len()
    }
}

/// 解析整个模式文件
pub fn resolve_file(
    file: &FileDescriptorProto,
    options: &ResolveOptions,
) -> Result<ResolvedFile, SchemaError> {
    let mut builder = PoolBuilder {
        package: file.package.clone().unwrap_or_default(),
        messages: Vec::new(),
        enums: Vec::new(),
        message_index: HashMap::new(),
        enum_index: HashMap::new(),
    };

    // 第一遍：注册全部类型的全名
    for message in &file.message_type {
        builder.register_message(message, None);
    }
    for enum_type in &file.enum_type {
        builder.register_enum(enum_type, None);
    }

    // 第二遍：按相同的先序遍历链接字段类型引用
    let mut cursor = 0;
    for message in &file.message_type {
        builder.link_message(message, &mut cursor, options)?;
    }

    Ok(ResolvedFile {
        pool: Arc::new(builder.build()),
    })
}

struct PoolBuilder {
    package: String,
    messages: Vec<MessageData>,
    enums: Vec<EnumData>,
    message_index: HashMap<String, usize>,
    enum_index: HashMap<String, usize>,
}

impl PoolBuilder {
    fn qualify(&self, parent: Option<&str>, name: &str) -> String {
        match parent {
            Some(parent) => format!("{}.{}", parent, name),
            None if self.package.is_empty() => name.to_string(),
            None => format!("{}.{}", self.package, name),
        }
    }

    fn register_message(&mut self, message: &DescriptorProto, parent: Option<&str>) {
        let name = message.name().to_string();
        let full_name = self.qualify(parent, &name);
        let index = self.messages.len();
        self.messages.push(MessageData {
            name,
            full_name: full_name.clone(),
            fields: Vec::new(),
            field_index: HashMap::new(),
        });
        self.message_index.insert(full_name.clone(), index);

        for enum_type in &message.enum_type {
            self.register_enum(enum_type, Some(&full_name));
        }
        for nested in &message.nested_type {
            self.register_message(nested, Some(&full_name));
        }
    }

    fn register_enum(&mut self, enum_type: &EnumDescriptorProto, parent: Option<&str>) {
        let name = enum_type.name().to_string();
        let full_name = self.qualify(parent, &name);
        let index = self.enums.len();
        self.enums.push(EnumData {
            name,
            full_name: full_name.clone(),
            values: enum_type
                .value
                .iter()
                .map(|v| (v.name().to_string(), v.number()))
                .collect(),
        });
        self.enum_index.insert(full_name, index);
    }

    fn link_message(
        &mut self,
        message: &DescriptorProto,
        cursor: &mut usize,
        options: &ResolveOptions,
    ) -> Result<(), SchemaError> {
        let index = *cursor;
        *cursor += 1;

        let mut fields = Vec::with_capacity(message.field.len());
        let mut field_index = HashMap::new();
        for field in &message.field {
            let data = self.link_field(field, options)?;
            field_index.insert(data.name.clone(), fields.len());
            fields.push(data);
        }
        self.messages[index].fields = fields;
        self.messages[index].field_index = field_index;

        // 嵌套类型按与注册相同的顺序递归
        for nested in &message.nested_type {
            self.link_message(nested, cursor, options)?;
        }
        Ok(())
    }

    fn link_field(
        &self,
        field: &FieldDescriptorProto,
        options: &ResolveOptions,
    ) -> Result<FieldData, SchemaError> {
        let name = field.name().to_string();
        let number = field.number() as u32;
        let cardinality = if field.label() == Label::Repeated {
            Cardinality::Repeated
        } else {
            Cardinality::Singular
        };
        let kind = Kind::from_proto(field.r#type());

        let mut message = None;
        let mut enum_type = None;
        let mut unresolved = None;
        match kind {
            Kind::Message | Kind::Group => {
                let reference = field.type_name();
                match self.lookup(&self.message_index, reference) {
                    Some(index) => message = Some(index),
                    None if options.allow_unresolvable => {
                        unresolved = Some(reference.to_string());
                    }
                    None => return Err(SchemaError::UnresolvedType(reference.to_string())),
                }
            }
            Kind::Enum => {
                let reference = field.type_name();
                match self.lookup(&self.enum_index, reference) {
                    Some(index) => enum_type = Some(index),
                    None if options.allow_unresolvable => {
                        unresolved = Some(reference.to_string());
                    }
                    None => return Err(SchemaError::UnresolvedType(reference.to_string())),
                }
            }
            _ => {}
        }

        Ok(FieldData {
            name,
            number,
            kind,
            cardinality,
            message,
            enum_type,
            unresolved,
        })
    }

    /// 定位一个类型引用
    ///
    /// 生成器写入的引用是以 '.' 开头的绝对名；相对名退而尝试
    /// 包前缀限定。
    fn lookup(&self, index: &HashMap<String, usize>, reference: &str) -> Option<usize> {
        if let Some(absolute) = reference.strip_prefix('.') {
            return index.get(absolute).copied();
        }
        if let Some(&found) = index.get(reference) {
            return Some(found);
        }
        if !self.package.is_empty() {
            return index
                .get(&format!("{}.{}", self.package, reference))
                .copied();
        }
        None
    }

    fn build(self) -> Pool {
        Pool {
            package: self.package,
            messages: self.messages,
            enums: self.enums,
            message_index: self.message_index,
            enum_index: self.enum_index,
        }
    }
}
