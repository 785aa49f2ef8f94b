//! 适配器本体
//!
//! Adapter 为只读层视图，AdapterMut 为读写层视图；两者都只
//! 借用底层旧式消息，生命周期内假定独占访问。描述符经
//! OnceLock 保护，状态只发生一次 未解析 → 已解析 的迁移。

use std::fmt;
use std::sync::OnceLock;

use bytes::BytesMut;
use protoflex_core::LegacyMessage;
use protoflex_reflect::{
    format_compact, MarshalOptions, MessageMut, MessageView, ReflectError, UnmarshalOptions, Value,
};
use protoflex_schema::{FieldDescriptor, MessageDescriptor, ResolveOptions};
use tracing::debug;

use crate::bridge;
use crate::range;

fn resolve_descriptor(
    message: &dyn LegacyMessage,
    options: &ResolveOptions,
) -> Result<MessageDescriptor, ReflectError> {
    let raw = message.raw_descriptor();
    let descriptor = protoflex_schema::resolve_message(&raw.blob, &raw.path, options)?;
    debug!(full_name = descriptor.full_name(), "已解析消息描述符");
    Ok(descriptor)
}

/// 旧式消息的只读反射视图
///
/// 只借用底层消息，不拷贝其缓冲。嵌套消息字段在遍历时包装为
/// 新的 Adapter，各自独立惰性解析描述符。
pub struct Adapter<'m> {
    message: &'m dyn LegacyMessage,
    options: ResolveOptions,
    descriptor: OnceLock<MessageDescriptor>,
}

impl<'m> Adapter<'m> {
    /// 包装一个旧式消息
    ///
    /// 默认允许无法定位的跨文件类型引用，与旧路径的行为一致。
    pub fn new(message: &'m dyn LegacyMessage) -> Self {
        Self::with_options(
            message,
            ResolveOptions {
                allow_unresolvable: true,
            },
        )
    }

    /// 以指定解析选项包装
    pub fn with_options(message: &'m dyn LegacyMessage, options: ResolveOptions) -> Self {
        Self {
            message,
            options,
            descriptor: OnceLock::new(),
        }
    }

    /// 获取（首次访问时解析）描述符
    pub fn cached_descriptor(&self) -> Result<&MessageDescriptor, ReflectError> {
        if let Some(descriptor) = self.descriptor.get() {
            return Ok(descriptor);
        }
        let resolved = resolve_descriptor(self.message, &self.options)?;
        Ok(self.descriptor.get_or_init(|| resolved))
    }
}

impl MessageView for Adapter<'_> {
    fn descriptor(&self) -> Result<MessageDescriptor, ReflectError> {
        self.cached_descriptor().map(|d| d.clone())
    }

    fn range<'s>(
        &'s self,
        visit: &mut dyn FnMut(FieldDescriptor, Value<'s>) -> bool,
    ) -> Result<(), ReflectError> {
        let descriptor = self.cached_descriptor()?;
        range::range_fields(self.message, descriptor, &self.options, visit)
    }

    fn marshal(&self, options: &MarshalOptions, buf: BytesMut) -> Result<BytesMut, ReflectError> {
        bridge::marshal(self.message, options, buf)
    }

    fn check_initialized(&self) -> Result<(), ReflectError> {
        bridge::check_initialized(self.message)
    }

    fn is_valid(&self) -> bool {
        true
    }

    fn get_unknown(&self) -> Option<&[u8]> {
        // 未知字段不经适配器往返
        debug!("未知字段读取未实现，返回空");
        None
    }

    fn get(&self, field: &FieldDescriptor) -> Result<Value<'_>, ReflectError> {
        let _ = field;
        Err(ReflectError::Unsupported("Adapter::get"))
    }

    fn has(&self, field: &FieldDescriptor) -> Result<bool, ReflectError> {
        let _ = field;
        Err(ReflectError::Unsupported("Adapter::has"))
    }
}

impl fmt::Display for Adapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match format_compact(self) {
            Ok(text) => f.write_str(&text),
            Err(e) => write!(f, "<渲染失败: {}>", e),
        }
    }
}

/// 旧式消息的读写反射视图
///
/// 独占借用底层消息，在只读能力之上提供快速路径反序列化与
/// 重置；变更类操作声明但未实现。
pub struct AdapterMut<'m> {
    message: &'m mut dyn LegacyMessage,
    options: ResolveOptions,
    descriptor: OnceLock<MessageDescriptor>,
}

impl<'m> AdapterMut<'m> {
    /// 包装一个旧式消息
    pub fn new(message: &'m mut dyn LegacyMessage) -> Self {
        Self::with_options(
            message,
            ResolveOptions {
                allow_unresolvable: true,
            },
        )
    }

    /// 以指定解析选项包装
    pub fn with_options(message: &'m mut dyn LegacyMessage, options: ResolveOptions) -> Self {
        Self {
            message,
            options,
            descriptor: OnceLock::new(),
        }
    }

    /// 获取（首次访问时解析）描述符
    pub fn cached_descriptor(&self) -> Result<&MessageDescriptor, ReflectError> {
        if let Some(descriptor) = self.descriptor.get() {
            return Ok(descriptor);
        }
        let resolved = resolve_descriptor(&*self.message, &self.options)?;
        Ok(self.descriptor.get_or_init(|| resolved))
    }
}

impl MessageView for AdapterMut<'_> {
    fn descriptor(&self) -> Result<MessageDescriptor, ReflectError> {
        self.cached_descriptor().map(|d| d.clone())
    }

    fn range<'s>(
        &'s self,
        visit: &mut dyn FnMut(FieldDescriptor, Value<'s>) -> bool,
    ) -> Result<(), ReflectError> {
        let descriptor = self.cached_descriptor()?;
        range::range_fields(&*self.message, descriptor, &self.options, visit)
    }

    fn marshal(&self, options: &MarshalOptions, buf: BytesMut) -> Result<BytesMut, ReflectError> {
        bridge::marshal(&*self.message, options, buf)
    }

    fn check_initialized(&self) -> Result<(), ReflectError> {
        bridge::check_initialized(&*self.message)
    }

    fn is_valid(&self) -> bool {
        true
    }

    fn get_unknown(&self) -> Option<&[u8]> {
        debug!("未知字段读取未实现，返回空");
        None
    }

    fn get(&self, field: &FieldDescriptor) -> Result<Value<'_>, ReflectError> {
        let _ = field;
        Err(ReflectError::Unsupported("AdapterMut::get"))
    }

    fn has(&self, field: &FieldDescriptor) -> Result<bool, ReflectError> {
        let _ = field;
        Err(ReflectError::Unsupported("AdapterMut::has"))
    }
}

impl MessageMut for AdapterMut<'_> {
    fn unmarshal(&mut self, options: &UnmarshalOptions, buf: &[u8]) -> Result<(), ReflectError> {
        bridge::unmarshal(&mut *self.message, options, buf)
    }

    fn reset(&mut self) {
        self.message.reset();
    }

    fn set(&mut self, field: &FieldDescriptor, value: Value<'_>) -> Result<(), ReflectError> {
        let _ = (field, value);
        Err(ReflectError::Unsupported("AdapterMut::set"))
    }

    fn clear(&mut self, field: &FieldDescriptor) -> Result<(), ReflectError> {
        let _ = field;
        Err(ReflectError::Unsupported("AdapterMut::clear"))
    }

    fn mutable(&mut self, field: &FieldDescriptor) -> Result<Value<'_>, ReflectError> {
        let _ = field;
        Err(ReflectError::Unsupported("AdapterMut::mutable"))
    }

    fn new_field(&self, field: &FieldDescriptor) -> Result<Value<'_>, ReflectError> {
        let _ = field;
        Err(ReflectError::Unsupported("AdapterMut::new_field"))
    }

    fn which_oneof(&self, name: &str) -> Result<Option<FieldDescriptor>, ReflectError> {
        let _ = name;
        Err(ReflectError::Unsupported("AdapterMut::which_oneof"))
    }

    fn set_unknown(&mut self, raw: &[u8]) -> Result<(), ReflectError> {
        let _ = raw;
        Err(ReflectError::Unsupported("AdapterMut::set_unknown"))
    }
}

impl fmt::Display for AdapterMut<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match format_compact(self) {
            Ok(text) => f.write_str(&text),
            Err(e) => write!(f, "<渲染失败: {}>", e),
        }
    }
}
