//! 逐字段遍历
//!
//! 由旧式消息的静态属性表驱动：按声明顺序访问每个线路编号
//! 非零且已填充的字段，依据已解析描述符构造归一化取值。
//! 属性表与模式不一致作为可恢复错误返回给调用方。

use protoflex_core::{LegacyMessage, RawField};
use protoflex_reflect::{ListValue, ReflectError, Value};
use protoflex_schema::{FieldDescriptor, Kind, MessageDescriptor, ResolveOptions};

use crate::adapter::Adapter;

pub(crate) fn range_fields<'m>(
    message: &'m dyn LegacyMessage,
    descriptor: &MessageDescriptor,
    options: &ResolveOptions,
    visit: &mut dyn FnMut(FieldDescriptor, Value<'m>) -> bool,
) -> Result<(), ReflectError> {
    for property in message.properties() {
        // 编号为零的内部簿记字段不参与遍历
        if property.tag == 0 {
            continue;
        }

        let field = descriptor
            .field_by_name(property.wire_name)
            .map_err(|_| {
                ReflectError::FieldMismatch(format!(
                    "字段 {} 不在 {} 的模式中",
                    property.wire_name,
                    descriptor.full_name()
                ))
            })?;

        let raw = message.raw_field(property.tag).ok_or_else(|| {
            ReflectError::FieldMismatch(format!(
                "字段编号 {} 不在 {} 的取值表中",
                property.tag,
                descriptor.full_name()
            ))
        })?;

        let value = if field.is_list() {
            let RawField::Repeated(list) = raw else {
                return Err(shape_mismatch(&field));
            };
            if list.is_empty() {
                continue;
            }
            Value::List(ListValue::new(list, field.clone()))
        } else {
            match field.kind() {
                Kind::Enum => {
                    let RawField::Enum(number) = raw else {
                        return Err(shape_mismatch(&field));
                    };
                    if number == 0 {
                        continue;
                    }
                    Value::Enum(number)
                }
                Kind::Uint64 => {
                    let RawField::Uint64(v) = raw else {
                        return Err(shape_mismatch(&field));
                    };
                    if v == 0 {
                        continue;
                    }
                    Value::Uint64(v)
                }
                Kind::Bool => {
                    let RawField::Bool(v) = raw else {
                        return Err(shape_mismatch(&field));
                    };
                    if !v {
                        continue;
                    }
                    Value::Bool(v)
                }
                Kind::Bytes => {
                    let RawField::Bytes(bytes) = raw else {
                        return Err(shape_mismatch(&field));
                    };
                    if bytes.is_empty() {
                        continue;
                    }
                    Value::Bytes(bytes)
                }
                Kind::Message => {
                    let RawField::Message(nested) = raw else {
                        return Err(shape_mismatch(&field));
                    };
                    let Some(nested) = nested else {
                        continue;
                    };
                    // 嵌套消息包装为新的只读适配器，仍只借用底层消息
                    Value::Message(Box::new(Adapter::with_options(nested, options.clone())))
                }
                other => return Err(ReflectError::UnsupportedKind(other)),
            }
        };

        if !visit(field, value) {
            break;
        }
    }

    Ok(())
}

fn shape_mismatch(field: &FieldDescriptor) -> ReflectError {
    ReflectError::FieldMismatch(format!(
        "字段 {} 的取值形态与声明类别 {} 不符",
        field.name(),
        field.kind()
    ))
}
