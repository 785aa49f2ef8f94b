//! 单行文本渲染
//!
//! 完全由 Range 驱动的人类可读渲染：标量直接打印，枚举优先
//! 使用已解析的取值名称，嵌套消息递归包在花括号内。列表的
//! 逐元素访问尚未实现时退化为长度摘要，不让整条渲染失败。

use std::fmt::Write;

use protoflex_schema::FieldDescriptor;

use crate::message::MessageView;
use crate::value::Value;
use crate::ReflectError;

/// 渲染为单行文本
pub fn format_compact(message: &dyn MessageView) -> Result<String, ReflectError> {
    let mut out = String::new();
    write_message(message, &mut out)?;
    Ok(out)
}

fn write_message(message: &dyn MessageView, out: &mut String) -> Result<(), ReflectError> {
    let mut result = Ok(());
    let mut first = true;
    message.range(&mut |field, value| {
        if !first {
            out.push(' ');
        }
        first = false;
        match write_field(&field, &value, out) {
            Ok(()) => true,
            Err(e) => {
                result = Err(e);
                false
            }
        }
    })?;
    result
}

fn write_field(
    field: &FieldDescriptor,
    value: &Value<'_>,
    out: &mut String,
) -> Result<(), ReflectError> {
    out.push_str(field.name());
    out.push_str(": ");
    write_value(field, value, out)
}

fn write_value(
    field: &FieldDescriptor,
    value: &Value<'_>,
    out: &mut String,
) -> Result<(), ReflectError> {
    match value {
        Value::Enum(number) => {
            let name = field
                .enum_descriptor()
                .and_then(|e| e.value_name(*number).map(str::to_string));
            match name {
                Some(name) => out.push_str(&name),
                None => {
                    let _ = write!(out, "{}", number);
                }
            }
        }
        Value::Uint64(v) => {
            let _ = write!(out, "{}", v);
        }
        Value::Bool(v) => {
            let _ = write!(out, "{}", v);
        }
        Value::Bytes(bytes) => write_bytes(bytes, out),
        Value::Message(nested) => {
            let mut inner = String::new();
            write_message(nested.as_ref(), &mut inner)?;
            if inner.is_empty() {
                out.push_str("{}");
            } else {
                let _ = write!(out, "{{ {} }}", inner);
            }
        }
        Value::List(list) => {
            // 探测逐元素访问是否可用
            match list.get(0) {
                Err(ReflectError::Unsupported(_)) => {
                    let _ = write!(out, "<{} 项>", list.len());
                }
                Err(e) => return Err(e),
                Ok(_) => {
                    out.push('[');
                    for index in 0..list.len() {
                        if index > 0 {
                            out.push_str(", ");
                        }
                        let element = list.get(index)?;
                        write_value(field, &element, out)?;
                    }
                    out.push(']');
                }
            }
        }
    }
    Ok(())
}

fn write_bytes(bytes: &[u8], out: &mut String) {
    out.push('"');
    for &b in bytes {
        match b {
            b'"' => out.push_str("\\\""),
            b'\\' => out.push_str("\\\\"),
            0x20..=0x7e => out.push(b as char),
            _ => {
                let _ = write!(out, "\\x{:02x}", b);
            }
        }
    }
    out.push('"');
}
