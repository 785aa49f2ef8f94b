//! 模式提取
//!
//! 解压嵌入的压缩模式 blob，并沿类型路径定位具体消息类型。
//! 提取是输入的纯函数，每次调用重新解压与反序列化，调用方
//! 独占返回值。

use std::io::Read;

use flate2::read::GzDecoder;
use prost::Message;
use prost_types::{DescriptorProto, FileDescriptorProto};

use crate::SchemaError;

/// 从 gzip 压缩的 blob 中提取整个模式文件
pub fn extract_file(gz: &[u8]) -> Result<FileDescriptorProto, SchemaError> {
    let mut decoder = GzDecoder::new(gz);
    let mut raw = Vec::new();
    decoder
        .read_to_end(&mut raw)
        .map_err(|e| SchemaError::Corrupt(e.to_string()))?;

    let file = FileDescriptorProto::decode(raw.as_slice())?;
    Ok(file)
}

/// 沿类型路径定位消息类型，返回模式文件与该消息的描述
///
/// 路径与 blob 由同一构建过程同步生成，越界索引视为不可恢复的
/// 程序错误，直接 panic。
pub fn for_message(
    gz: &[u8],
    path: &[usize],
) -> Result<(FileDescriptorProto, DescriptorProto), SchemaError> {
    let file = extract_file(gz)?;
    let message = message_at_path(&file, path).clone();
    Ok((file, message))
}

/// 计算路径所指消息类型的包限定全名
pub fn message_full_name(file: &FileDescriptorProto, path: &[usize]) -> String {
    assert!(!path.is_empty(), "类型路径不能为空");
    let mut message = &file.message_type[path[0]];
    let mut full_name = String::new();
    if let Some(package) = &file.package {
        if !package.is_empty() {
            full_name.push_str(package);
            full_name.push('.');
        }
    }
    full_name.push_str(message.name());
    for &index in &path[1..] {
        message = &message.nested_type[index];
        full_name.push('.');
        full_name.push_str(message.name());
    }
    full_name
}

fn message_at_path<'a>(file: &'a FileDescriptorProto, path: &[usize]) -> &'a DescriptorProto {
    assert!(!path.is_empty(), "类型路径不能为空");
    let mut message = &file.message_type[path[0]];
    for &index in &path[1..] {
        message = &message.nested_type[index];
    }
    message
}
