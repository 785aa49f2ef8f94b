//! 旧式消息能力契约
//!
//! 旧式运行时生成的消息只支持整条消息的编解码和压缩模式 blob
//! 提取，不提供逐字段的反射访问。本模块定义适配层对这类消息的
//! 全部要求：五个编解码能力，外加静态字段属性表与按编号取值。

use bytes::Bytes;

use crate::wire::WireError;

/// 压缩模式 blob 与类型路径
///
/// blob 为 gzip 压缩的序列化模式数据；path 从文件级类型列表
/// 出发，逐层索引嵌套类型列表，定位一个具体的消息类型。
/// 两者由同一构建过程同步生成。
#[derive(Debug, Clone)]
pub struct RawDescriptor {
    /// 压缩模式数据
    pub blob: Bytes,
    /// 嵌套类型索引路径
    pub path: Vec<usize>,
}

/// 字段属性表条目
///
/// 按声明顺序描述一个字段的元数据，在类型定义处静态生成。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldProperty {
    /// Rust 字段名
    pub name: &'static str,
    /// 线路格式字段名（与模式中的名称一致）
    pub wire_name: &'static str,
    /// 字段编号（0 为内部簿记字段，遍历时跳过）
    pub tag: u32,
}

/// 单个字段的原始取值视图
///
/// 借用自消息本体，不发生拷贝。
pub enum RawField<'a> {
    /// 枚举序数
    Enum(i32),
    /// 64 位无符号整数
    Uint64(u64),
    /// 布尔值
    Bool(bool),
    /// 字节串
    Bytes(&'a [u8]),
    /// 嵌套消息（未设置时为 None）
    Message(Option<&'a dyn LegacyMessage>),
    /// 重复字段
    Repeated(RawList<'a>),
}

/// 重复字段的底层存储视图
///
/// 只借用后备存储，不拥有元素。
pub enum RawList<'a> {
    /// 64 位无符号整数序列
    Uint64(&'a [u64]),
    /// 布尔序列
    Bool(&'a [bool]),
    /// 枚举序数序列
    Enum(&'a [i32]),
    /// 字节串序列
    Bytes(&'a [Vec<u8>]),
    /// 嵌套消息序列
    Message(&'a dyn MessageSeq),
}

impl RawList<'_> {
    /// 元素数量
    pub fn len(&self) -> usize {
        match self {
            RawList::Uint64(s) => s.len(),
            RawList::Bool(s) => s.len(),
            RawList::Enum(s) => s.len(),
            RawList::Bytes(s) => s.len(),
            RawList::Message(s) => s.len(),
        }
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// 嵌套消息序列视图
pub trait MessageSeq {
    /// 元素数量
    fn len(&self) -> usize;

    /// 获取指定下标的元素
    fn get(&self, index: usize) -> &dyn LegacyMessage;
}

impl<M: LegacyMessage> MessageSeq for Vec<M> {
    fn len(&self) -> usize {
        self.as_slice().len()
    }

    fn get(&self, index: usize) -> &dyn LegacyMessage {
        &self[index]
    }
}

/// 旧式消息能力契约
///
/// 满足此契约的任何消息类型都可以被适配层包装。
pub trait LegacyMessage {
    /// 返回压缩模式 blob 与类型路径
    fn raw_descriptor(&self) -> RawDescriptor;

    /// 计算序列化后的字节数
    fn encoded_size(&self) -> usize;

    /// 重置为初始状态
    fn reset(&mut self);

    /// 从字节序列反序列化
    ///
    /// 合并语义：解析结果叠加在当前状态之上，完全替换需先 reset。
    fn unmarshal(&mut self, buf: &[u8]) -> Result<(), WireError>;

    /// 序列化到恰好等于 encoded_size() 的缓冲区
    ///
    /// 按生成代码的约定从缓冲区末尾向前填充，返回写入的字节数。
    fn marshal_to_sized_buffer(&self, buf: &mut [u8]) -> Result<usize, WireError>;

    /// 按声明顺序返回字段属性表
    fn properties(&self) -> &'static [FieldProperty];

    /// 按字段编号返回原始取值视图
    ///
    /// 编号不在属性表中时返回 None（元数据不一致）。
    fn raw_field(&self, tag: u32) -> Option<RawField<'_>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    // 最小化的旧式消息桩
    #[derive(Default)]
    struct StubMessage {
        value: u64,
    }

    const STUB_PROPS: &[FieldProperty] = &[FieldProperty {
        name: "value",
        wire_name: "value",
        tag: 1,
    }];

    impl LegacyMessage for StubMessage {
        fn raw_descriptor(&self) -> RawDescriptor {
            RawDescriptor {
                blob: Bytes::new(),
                path: vec![0],
            }
        }

        fn encoded_size(&self) -> usize {
            0
        }

        fn reset(&mut self) {
            *self = StubMessage::default();
        }

        fn unmarshal(&mut self, _buf: &[u8]) -> Result<(), WireError> {
            Ok(())
        }

        fn marshal_to_sized_buffer(&self, buf: &mut [u8]) -> Result<usize, WireError> {
            let _ = buf;
            Ok(0)
        }

        fn properties(&self) -> &'static [FieldProperty] {
            STUB_PROPS
        }

        fn raw_field(&self, tag: u32) -> Option<RawField<'_>> {
            match tag {
                1 => Some(RawField::Uint64(self.value)),
                _ => None,
            }
        }
    }

    #[test]
    fn test_raw_list_len() {
        let numbers = [1u64, 2, 3];
        let list = RawList::Uint64(&numbers);
        assert_eq!(list.len(), 3);
        assert!(!list.is_empty());

        let empty: [bool; 0] = [];
        assert!(RawList::Bool(&empty).is_empty());
    }

    #[test]
    fn test_message_seq_for_vec() {
        let messages = vec![StubMessage { value: 7 }, StubMessage { value: 8 }];
        let seq: &dyn MessageSeq = &messages;
        assert_eq!(seq.len(), 2);

        let first = seq.get(0);
        match first.raw_field(1) {
            Some(RawField::Uint64(v)) => assert_eq!(v, 7),
            _ => panic!("期望 Uint64 取值"),
        }
    }

    #[test]
    fn test_raw_field_unknown_tag() {
        let stub = StubMessage::default();
        assert!(stub.raw_field(99).is_none());
    }
}
