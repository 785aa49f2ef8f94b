//! 线路格式辅助
//!
//! 旧式生成代码的编解码约定：定长缓冲序列化从缓冲区末尾向前
//! 填充，反序列化从头部向后读取。本模块提供两个方向共用的
//! varint 辅助函数。

use thiserror::Error;

/// 线路格式错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WireError {
    /// 输出缓冲区空间不足
    #[error("输出缓冲区空间不足")]
    BufferTooSmall,

    /// 输入数据被截断
    #[error("输入数据被截断")]
    Truncated,

    /// varint 超出 64 位范围
    #[error("varint 超出 64 位范围")]
    Overflow,

    /// 无效的线路类型
    #[error("无效的线路类型: {0}")]
    InvalidWireType(u8),
}

/// 线路类型：varint
pub const WIRE_VARINT: u8 = 0;
/// 线路类型：64 位定长
pub const WIRE_FIXED64: u8 = 1;
/// 线路类型：变长字节
pub const WIRE_BYTES: u8 = 2;
/// 线路类型：32 位定长
pub const WIRE_FIXED32: u8 = 5;

/// 计算 varint 编码后的字节数
pub fn uvarint_len(v: u64) -> usize {
    let bits = 64 - (v | 1).leading_zeros() as usize;
    (bits + 6) / 7
}

/// 从 pos 向前写入一个 varint，返回新的写入位置
pub fn put_uvarint_back(buf: &mut [u8], pos: usize, v: u64) -> Result<usize, WireError> {
    let n = uvarint_len(v);
    if pos < n || pos > buf.len() {
        return Err(WireError::BufferTooSmall);
    }
    let start = pos - n;
    let mut x = v;
    for i in 0..n {
        let mut b = (x & 0x7f) as u8;
        x >>= 7;
        if i + 1 < n {
            b |= 0x80;
        }
        buf[start + i] = b;
    }
    Ok(start)
}

/// 从 pos 向前写入一个字段键（字段编号 + 线路类型）
pub fn put_tag_back(buf: &mut [u8], pos: usize, tag: u32, wire_type: u8) -> Result<usize, WireError> {
    put_uvarint_back(buf, pos, ((tag as u64) << 3) | wire_type as u64)
}

/// 从 pos 向前写入原始字节
pub fn put_bytes_back(buf: &mut [u8], pos: usize, data: &[u8]) -> Result<usize, WireError> {
    if pos < data.len() || pos > buf.len() {
        return Err(WireError::BufferTooSmall);
    }
    let start = pos - data.len();
    buf[start..pos].copy_from_slice(data);
    Ok(start)
}

/// 从 pos 读取一个 varint，返回 (值, 新位置)
pub fn read_uvarint(buf: &[u8], pos: usize) -> Result<(u64, usize), WireError> {
    let mut x: u64 = 0;
    let mut shift = 0u32;
    let mut i = pos;
    loop {
        if i >= buf.len() {
            return Err(WireError::Truncated);
        }
        let b = buf[i];
        i += 1;
        // 第十个字节只允许出现最高位的 0 或 1
        if shift == 63 && b > 1 {
            return Err(WireError::Overflow);
        }
        x |= ((b & 0x7f) as u64) << shift;
        if b & 0x80 == 0 {
            return Ok((x, i));
        }
        shift += 7;
        if shift > 63 {
            return Err(WireError::Overflow);
        }
    }
}

/// 从 pos 读取一个变长字节段，返回 (数据, 新位置)
pub fn read_length_delimited(buf: &[u8], pos: usize) -> Result<(&[u8], usize), WireError> {
    let (len, next) = read_uvarint(buf, pos)?;
    let len = usize::try_from(len).map_err(|_| WireError::Truncated)?;
    let end = next.checked_add(len).ok_or(WireError::Truncated)?;
    if end > buf.len() {
        return Err(WireError::Truncated);
    }
    Ok((&buf[next..end], end))
}

/// 跳过一个未知字段的取值部分，返回新位置
pub fn skip_field(buf: &[u8], pos: usize, wire_type: u8) -> Result<usize, WireError> {
    match wire_type {
        WIRE_VARINT => {
            let (_, next) = read_uvarint(buf, pos)?;
            Ok(next)
        }
        WIRE_FIXED64 => {
            let end = pos.checked_add(8).ok_or(WireError::Truncated)?;
            if end > buf.len() {
                return Err(WireError::Truncated);
            }
            Ok(end)
        }
        WIRE_BYTES => {
            let (_, next) = read_length_delimited(buf, pos)?;
            Ok(next)
        }
        WIRE_FIXED32 => {
            let end = pos.checked_add(4).ok_or(WireError::Truncated)?;
            if end > buf.len() {
                return Err(WireError::Truncated);
            }
            Ok(end)
        }
        other => Err(WireError::InvalidWireType(other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uvarint_len_boundaries() {
        assert_eq!(uvarint_len(0), 1);
        assert_eq!(uvarint_len(127), 1);
        assert_eq!(uvarint_len(128), 2);
        assert_eq!(uvarint_len(16383), 2);
        assert_eq!(uvarint_len(16384), 3);
        assert_eq!(uvarint_len(u64::MAX), 10);
    }

    #[test]
    fn test_put_back_then_read_forward() {
        let values = [0u64, 1, 127, 128, 300, 16384, u64::MAX];
        for v in values {
            let mut buf = vec![0u8; 10];
            let len = buf.len();
            let start = put_uvarint_back(&mut buf, len, v).unwrap();
            let (decoded, next) = read_uvarint(&buf, start).unwrap();
            assert_eq!(decoded, v);
            assert_eq!(next, buf.len());
        }
    }

    #[test]
    fn test_put_uvarint_back_too_small() {
        let mut buf = vec![0u8; 1];
        // 300 需要两个字节
        assert_eq!(
            put_uvarint_back(&mut buf, 1, 300),
            Err(WireError::BufferTooSmall)
        );
    }

    #[test]
    fn test_put_tag_back() {
        let mut buf = vec![0u8; 1];
        put_tag_back(&mut buf, 1, 1, WIRE_VARINT).unwrap();
        // 字段 1 + varint => 0x08
        assert_eq!(buf[0], 0x08);
    }

    #[test]
    fn test_put_bytes_back() {
        let mut buf = vec![0u8; 5];
        let start = put_bytes_back(&mut buf, 5, b"abc").unwrap();
        assert_eq!(start, 2);
        assert_eq!(&buf[2..], b"abc");

        let mut small = vec![0u8; 2];
        assert_eq!(
            put_bytes_back(&mut small, 2, b"abc"),
            Err(WireError::BufferTooSmall)
        );
    }

    #[test]
    fn test_read_uvarint_truncated() {
        // 最高位置位但没有后续字节
        assert_eq!(read_uvarint(&[0x80], 0), Err(WireError::Truncated));
        assert_eq!(read_uvarint(&[], 0), Err(WireError::Truncated));
    }

    #[test]
    fn test_read_uvarint_overflow() {
        let buf = [0xffu8; 11];
        assert_eq!(read_uvarint(&buf, 0), Err(WireError::Overflow));
    }

    #[test]
    fn test_read_length_delimited() {
        let buf = [0x03, b'a', b'b', b'c', 0x00];
        let (data, next) = read_length_delimited(&buf, 0).unwrap();
        assert_eq!(data, b"abc");
        assert_eq!(next, 4);

        let truncated = [0x05, b'a'];
        assert_eq!(
            read_length_delimited(&truncated, 0),
            Err(WireError::Truncated)
        );
    }

    #[test]
    fn test_skip_field() {
        // varint
        assert_eq!(skip_field(&[0xac, 0x02], 0, WIRE_VARINT).unwrap(), 2);
        // 变长字节
        assert_eq!(skip_field(&[0x02, 1, 2], 0, WIRE_BYTES).unwrap(), 3);
        // 定长
        assert_eq!(skip_field(&[0u8; 8], 0, WIRE_FIXED64).unwrap(), 8);
        assert_eq!(skip_field(&[0u8; 4], 0, WIRE_FIXED32).unwrap(), 4);
        // 无效线路类型
        assert_eq!(
            skip_field(&[0u8; 4], 0, 7),
            Err(WireError::InvalidWireType(7))
        );
    }
}
