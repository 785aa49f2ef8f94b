//! 快速路径桥接
//!
//! 序列化与反序列化直通旧式消息自身的定长缓冲例程，不经过
//! 逐字段遍历；旧式例程报告的错误原样透传。

use bytes::BytesMut;
use protoflex_core::LegacyMessage;
use protoflex_reflect::{MarshalOptions, ReflectError, UnmarshalOptions};
use tracing::debug;

/// 快速路径序列化
///
/// 将缓冲调整为精确尺寸后交给旧式消息从末尾向前填充，返回
/// 填充好的缓冲。
pub(crate) fn marshal(
    message: &dyn LegacyMessage,
    options: &MarshalOptions,
    mut buf: BytesMut,
) -> Result<BytesMut, ReflectError> {
    if !options.is_default() {
        return Err(ReflectError::UnsupportedFlags(format!("{:?}", options)));
    }

    let size = message.encoded_size();
    buf.resize(size, 0);
    message.marshal_to_sized_buffer(&mut buf[..])?;
    Ok(buf)
}

/// 快速路径反序列化
///
/// 字节直接交给旧式消息自身的解析例程（合并语义）。
pub(crate) fn unmarshal(
    message: &mut dyn LegacyMessage,
    options: &UnmarshalOptions,
    buf: &[u8],
) -> Result<(), ReflectError> {
    if !options.is_default() {
        return Err(ReflectError::UnsupportedFlags(format!("{:?}", options)));
    }

    message.unmarshal(buf)?;
    Ok(())
}

/// 必填字段检查
///
/// 完整实现需遍历必填字段并逐个报告缺失，当前恒定通过。
pub(crate) fn check_initialized(message: &dyn LegacyMessage) -> Result<(), ReflectError> {
    let _ = message;
    debug!("必填字段检查未实现，默认视为已初始化");
    Ok(())
}
