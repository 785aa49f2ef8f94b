//! 示例旧式消息
//!
//! 以生成代码的形态手写的两个旧式消息类型，供兼容性校验与
//! 演示驱动：定长缓冲序列化从末尾向前按字段编号降序填充，
//! 反序列化为合并语义并跳过未知字段，压缩模式 blob 首次使用
//! 时构建一次，之后廉价克隆。

use std::io::Write as _;
use std::sync::OnceLock;

use bytes::Bytes;
use flate2::write::GzEncoder;
use flate2::Compression;
use prost::Message as _;
use prost_types::field_descriptor_proto::{Label, Type};
use prost_types::{
    DescriptorProto, EnumDescriptorProto, EnumValueDescriptorProto, FieldDescriptorProto,
    FileDescriptorProto,
};
use protoflex_core::{
    wire, FieldProperty, LegacyMessage, RawDescriptor, RawField, RawList, WireError,
};

/// 操作类别
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum OpKind {
    /// 未指定
    None = 0,
    /// 加入会话
    Join = 1,
    /// 离开会话
    Leave = 2,
    /// 心跳
    Beat = 3,
    /// 状态同步
    State = 4,
}

impl From<OpKind> for i32 {
    fn from(kind: OpKind) -> i32 {
        kind as i32
    }
}

/// 参与方信息
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PeerInfo {
    /// 参与方 ID
    pub peer_id: u64,
    /// 昵称
    pub nickname: Vec<u8>,
}

/// 会话同步事件
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SyncEvent {
    /// 操作类别（OpKind 序数）
    pub kind: i32,
    /// 会话 ID
    pub session_id: u64,
    /// 事件序号
    pub sequence: u64,
    /// 是否加急
    pub urgent: bool,
    /// 附加负载
    pub payload: Vec<u8>,
    /// 事件来源
    pub source: Option<PeerInfo>,
    /// 已确认序号列表
    pub ack_list: Vec<u64>,
}

impl SyncEvent {
    /// 构造一个心跳事件
    pub fn beat(session_id: u64, sequence: u64) -> Self {
        Self {
            kind: OpKind::Beat.into(),
            session_id,
            sequence,
            ..Default::default()
        }
    }
}

// ---- 模式 blob ----

fn descriptor_field(
    name: &str,
    number: i32,
    label: Label,
    r#type: Type,
    type_name: Option<&str>,
) -> FieldDescriptorProto {
    FieldDescriptorProto {
        name: Some(name.to_string()),
        number: Some(number),
        label: Some(label as i32),
        r#type: Some(r#type as i32),
        type_name: type_name.map(str::to_string),
        ..Default::default()
    }
}

fn peer_info_descriptor() -> DescriptorProto {
    DescriptorProto {
        name: Some("PeerInfo".to_string()),
        field: vec![
            descriptor_field("peer_id", 1, Label::Optional, Type::Uint64, None),
            descriptor_field("nickname", 2, Label::Optional, Type::Bytes, None),
        ],
        ..Default::default()
    }
}

fn sync_event_descriptor() -> DescriptorProto {
    DescriptorProto {
        name: Some("SyncEvent".to_string()),
        field: vec![
            descriptor_field(
                "kind",
                1,
                Label::Optional,
                Type::Enum,
                Some(".protoflex.sample.OpKind"),
            ),
            descriptor_field("session_id", 2, Label::Optional, Type::Uint64, None),
            descriptor_field("sequence", 3, Label::Optional, Type::Uint64, None),
            descriptor_field("urgent", 4, Label::Optional, Type::Bool, None),
            descriptor_field("payload", 5, Label::Optional, Type::Bytes, None),
            descriptor_field(
                "source",
                6,
                Label::Optional,
                Type::Message,
                Some(".protoflex.sample.PeerInfo"),
            ),
            descriptor_field("ack_list", 7, Label::Repeated, Type::Uint64, None),
        ],
        ..Default::default()
    }
}

fn op_kind_descriptor() -> EnumDescriptorProto {
    let value = [
        ("OP_NONE", 0),
        ("OP_JOIN", 1),
        ("OP_LEAVE", 2),
        ("OP_BEAT", 3),
        ("OP_STATE", 4),
    ]
    .iter()
    .map(|(name, number)| EnumValueDescriptorProto {
        name: Some(name.to_string()),
        number: Some(*number),
        ..Default::default()
    })
    .collect();

    EnumDescriptorProto {
        name: Some("OpKind".to_string()),
        value,
        ..Default::default()
    }
}

fn sample_file_descriptor() -> FileDescriptorProto {
    FileDescriptorProto {
        name: Some("protoflex/sample/sync.proto".to_string()),
        package: Some("protoflex.sample".to_string()),
        message_type: vec![peer_info_descriptor(), sync_event_descriptor()],
        enum_type: vec![op_kind_descriptor()],
        syntax: Some("proto3".to_string()),
        ..Default::default()
    }
}

/// 压缩后的模式 blob（每个类型构建一次）
fn sample_blob() -> Bytes {
    static BLOB: OnceLock<Bytes> = OnceLock::new();
    BLOB.get_or_init(|| {
        let raw = sample_file_descriptor().encode_to_vec();
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&raw).expect("写入内存缓冲不会失败");
        Bytes::from(encoder.finish().expect("gzip 压缩到内存缓冲不会失败"))
    })
    .clone()
}

// ---- PeerInfo ----

const PEER_INFO_PROPS: &[FieldProperty] = &[
    FieldProperty {
        name: "peer_id",
        wire_name: "peer_id",
        tag: 1,
    },
    FieldProperty {
        name: "nickname",
        wire_name: "nickname",
        tag: 2,
    },
];

impl LegacyMessage for PeerInfo {
    fn raw_descriptor(&self) -> RawDescriptor {
        RawDescriptor {
            blob: sample_blob(),
            path: vec![0],
        }
    }

    fn encoded_size(&self) -> usize {
        let mut n = 0;
        if self.peer_id != 0 {
            n += 1 + wire::uvarint_len(self.peer_id);
        }
        if !self.nickname.is_empty() {
            n += 1 + wire::uvarint_len(self.nickname.len() as u64) + self.nickname.len();
        }
        n
    }

    fn reset(&mut self) {
        *self = PeerInfo::default();
    }

    fn unmarshal(&mut self, buf: &[u8]) -> Result<(), WireError> {
        let mut pos = 0;
        while pos < buf.len() {
            let (key, next) = wire::read_uvarint(buf, pos)?;
            pos = next;
            let tag = (key >> 3) as u32;
            let wire_type = (key & 0x7) as u8;
            match (tag, wire_type) {
                (1, wire::WIRE_VARINT) => {
                    let (v, next) = wire::read_uvarint(buf, pos)?;
                    pos = next;
                    self.peer_id = v;
                }
                (2, wire::WIRE_BYTES) => {
                    let (data, next) = wire::read_length_delimited(buf, pos)?;
                    pos = next;
                    self.nickname = data.to_vec();
                }
                _ => pos = wire::skip_field(buf, pos, wire_type)?,
            }
        }
        Ok(())
    }

    fn marshal_to_sized_buffer(&self, buf: &mut [u8]) -> Result<usize, WireError> {
        let mut pos = buf.len();
        if !self.nickname.is_empty() {
            pos = wire::put_bytes_back(buf, pos, &self.nickname)?;
            pos = wire::put_uvarint_back(buf, pos, self.nickname.len() as u64)?;
            pos = wire::put_tag_back(buf, pos, 2, wire::WIRE_BYTES)?;
        }
        if self.peer_id != 0 {
            pos = wire::put_uvarint_back(buf, pos, self.peer_id)?;
            pos = wire::put_tag_back(buf, pos, 1, wire::WIRE_VARINT)?;
        }
        Ok(buf.len() - pos)
    }

    fn properties(&self) -> &'static [FieldProperty] {
        PEER_INFO_PROPS
    }

    fn raw_field(&self, tag: u32) -> Option<RawField<'_>> {
        match tag {
            1 => Some(RawField::Uint64(self.peer_id)),
            2 => Some(RawField::Bytes(&self.nickname)),
            _ => None,
        }
    }
}

// ---- SyncEvent ----

const SYNC_EVENT_PROPS: &[FieldProperty] = &[
    FieldProperty {
        name: "kind",
        wire_name: "kind",
        tag: 1,
    },
    FieldProperty {
        name: "session_id",
        wire_name: "session_id",
        tag: 2,
    },
    FieldProperty {
        name: "sequence",
        wire_name: "sequence",
        tag: 3,
    },
    FieldProperty {
        name: "urgent",
        wire_name: "urgent",
        tag: 4,
    },
    FieldProperty {
        name: "payload",
        wire_name: "payload",
        tag: 5,
    },
    FieldProperty {
        name: "source",
        wire_name: "source",
        tag: 6,
    },
    FieldProperty {
        name: "ack_list",
        wire_name: "ack_list",
        tag: 7,
    },
];

impl LegacyMessage for SyncEvent {
    fn raw_descriptor(&self) -> RawDescriptor {
        RawDescriptor {
            blob: sample_blob(),
            path: vec![1],
        }
    }

    fn encoded_size(&self) -> usize {
        let mut n = 0;
        if self.kind != 0 {
            n += 1 + wire::uvarint_len(self.kind as i64 as u64);
        }
        if self.session_id != 0 {
            n += 1 + wire::uvarint_len(self.session_id);
        }
        if self.sequence != 0 {
            n += 1 + wire::uvarint_len(self.sequence);
        }
        if self.urgent {
            n += 2;
        }
        if !self.payload.is_empty() {
            n += 1 + wire::uvarint_len(self.payload.len() as u64) + self.payload.len();
        }
        if let Some(source) = &self.source {
            let inner = source.encoded_size();
            n += 1 + wire::uvarint_len(inner as u64) + inner;
        }
        if !self.ack_list.is_empty() {
            let inner: usize = self.ack_list.iter().map(|v| wire::uvarint_len(*v)).sum();
            n += 1 + wire::uvarint_len(inner as u64) + inner;
        }
        n
    }

    fn reset(&mut self) {
        *self = SyncEvent::default();
    }

    fn unmarshal(&mut self, buf: &[u8]) -> Result<(), WireError> {
        let mut pos = 0;
        while pos < buf.len() {
            let (key, next) = wire::read_uvarint(buf, pos)?;
            pos = next;
            let tag = (key >> 3) as u32;
            let wire_type = (key & 0x7) as u8;
            match (tag, wire_type) {
                (1, wire::WIRE_VARINT) => {
                    let (v, next) = wire::read_uvarint(buf, pos)?;
                    pos = next;
                    self.kind = v as i32;
                }
                (2, wire::WIRE_VARINT) => {
                    let (v, next) = wire::read_uvarint(buf, pos)?;
                    pos = next;
                    self.session_id = v;
                }
                (3, wire::WIRE_VARINT) => {
                    let (v, next) = wire::read_uvarint(buf, pos)?;
                    pos = next;
                    self.sequence = v;
                }
                (4, wire::WIRE_VARINT) => {
                    let (v, next) = wire::read_uvarint(buf, pos)?;
                    pos = next;
                    self.urgent = v != 0;
                }
                (5, wire::WIRE_BYTES) => {
                    let (data, next) = wire::read_length_delimited(buf, pos)?;
                    pos = next;
                    self.payload = data.to_vec();
                }
                (6, wire::WIRE_BYTES) => {
                    let (data, next) = wire::read_length_delimited(buf, pos)?;
                    pos = next;
                    let mut source = self.source.take().unwrap_or_default();
                    source.unmarshal(data)?;
                    self.source = Some(source);
                }
                (7, wire::WIRE_BYTES) => {
                    let (data, next) = wire::read_length_delimited(buf, pos)?;
                    pos = next;
                    let mut inner = 0;
                    while inner < data.len() {
                        let (v, n) = wire::read_uvarint(data, inner)?;
                        inner = n;
                        self.ack_list.push(v);
                    }
                }
                (7, wire::WIRE_VARINT) => {
                    let (v, next) = wire::read_uvarint(buf, pos)?;
                    pos = next;
                    self.ack_list.push(v);
                }
                _ => pos = wire::skip_field(buf, pos, wire_type)?,
            }
        }
        Ok(())
    }

    fn marshal_to_sized_buffer(&self, buf: &mut [u8]) -> Result<usize, WireError> {
        let mut pos = buf.len();
        if !self.ack_list.is_empty() {
            let end = pos;
            for v in self.ack_list.iter().rev() {
                pos = wire::put_uvarint_back(buf, pos, *v)?;
            }
            pos = wire::put_uvarint_back(buf, pos, (end - pos) as u64)?;
            pos = wire::put_tag_back(buf, pos, 7, wire::WIRE_BYTES)?;
        }
        if let Some(source) = &self.source {
            let end = pos;
            let written = source.marshal_to_sized_buffer(&mut buf[..end])?;
            pos = end - written;
            pos = wire::put_uvarint_back(buf, pos, written as u64)?;
            pos = wire::put_tag_back(buf, pos, 6, wire::WIRE_BYTES)?;
        }
        if !self.payload.is_empty() {
            pos = wire::put_bytes_back(buf, pos, &self.payload)?;
            pos = wire::put_uvarint_back(buf, pos, self.payload.len() as u64)?;
            pos = wire::put_tag_back(buf, pos, 5, wire::WIRE_BYTES)?;
        }
        if self.urgent {
            pos = wire::put_uvarint_back(buf, pos, 1)?;
            pos = wire::put_tag_back(buf, pos, 4, wire::WIRE_VARINT)?;
        }
        if self.sequence != 0 {
            pos = wire::put_uvarint_back(buf, pos, self.sequence)?;
            pos = wire::put_tag_back(buf, pos, 3, wire::WIRE_VARINT)?;
        }
        if self.session_id != 0 {
            pos = wire::put_uvarint_back(buf, pos, self.session_id)?;
            pos = wire::put_tag_back(buf, pos, 2, wire::WIRE_VARINT)?;
        }
        if self.kind != 0 {
            pos = wire::put_uvarint_back(buf, pos, self.kind as i64 as u64)?;
            pos = wire::put_tag_back(buf, pos, 1, wire::WIRE_VARINT)?;
        }
        Ok(buf.len() - pos)
    }

    fn properties(&self) -> &'static [FieldProperty] {
        SYNC_EVENT_PROPS
    }

    fn raw_field(&self, tag: u32) -> Option<RawField<'_>> {
        match tag {
            1 => Some(RawField::Enum(self.kind)),
            2 => Some(RawField::Uint64(self.session_id)),
            3 => Some(RawField::Uint64(self.sequence)),
            4 => Some(RawField::Bool(self.urgent)),
            5 => Some(RawField::Bytes(&self.payload)),
            6 => Some(RawField::Message(
                self.source.as_ref().map(|m| m as &dyn LegacyMessage),
            )),
            7 => Some(RawField::Repeated(RawList::Uint64(&self.ack_list))),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn marshal_native(message: &dyn LegacyMessage) -> Vec<u8> {
        let mut buf = vec![0u8; message.encoded_size()];
        let written = message.marshal_to_sized_buffer(&mut buf).unwrap();
        assert_eq!(written, buf.len());
        buf
    }

    fn full_event() -> SyncEvent {
        SyncEvent {
            kind: OpKind::State.into(),
            session_id: 42,
            sequence: 1000,
            urgent: true,
            payload: vec![0x01, 0x02, 0x03],
            source: Some(PeerInfo {
                peer_id: 9,
                nickname: b"flint".to_vec(),
            }),
            ack_list: vec![1, 300, 16384],
        }
    }

    #[test]
    fn test_native_round_trip() {
        let event = full_event();
        let encoded = marshal_native(&event);

        let mut decoded = SyncEvent::default();
        decoded.unmarshal(&encoded).unwrap();
        assert_eq!(decoded, event);
    }

    #[test]
    fn test_empty_event_encodes_to_nothing() {
        let event = SyncEvent::default();
        assert_eq!(event.encoded_size(), 0);
        assert!(marshal_native(&event).is_empty());
    }

    #[test]
    fn test_single_enum_field_bytes() {
        let event = SyncEvent {
            kind: OpKind::Join.into(),
            ..Default::default()
        };
        // 字段 1 + varint 1
        assert_eq!(marshal_native(&event), vec![0x08, 0x01]);
    }

    #[test]
    fn test_nested_default_still_encoded() {
        // 指针型嵌套字段：存在即编码，哪怕内容为空
        let event = SyncEvent {
            source: Some(PeerInfo::default()),
            ..Default::default()
        };
        // 字段 6 (0x32) + 长度 0
        assert_eq!(marshal_native(&event), vec![0x32, 0x00]);

        let mut decoded = SyncEvent::default();
        decoded.unmarshal(&marshal_native(&event)).unwrap();
        assert_eq!(decoded.source, Some(PeerInfo::default()));
    }

    #[test]
    fn test_unmarshal_accepts_unpacked_ack_list() {
        // 字段 7 以非紧凑形式出现两次
        let encoded = vec![0x38, 0x05, 0x38, 0x07];
        let mut decoded = SyncEvent::default();
        decoded.unmarshal(&encoded).unwrap();
        assert_eq!(decoded.ack_list, vec![5, 7]);
    }

    #[test]
    fn test_unmarshal_skips_unknown_field() {
        let mut encoded = marshal_native(&SyncEvent::beat(1, 2));
        // 附加一个未知字段 15 (varint)
        encoded.extend_from_slice(&[0x78, 0x2a]);
        let mut decoded = SyncEvent::default();
        decoded.unmarshal(&encoded).unwrap();
        assert_eq!(decoded, SyncEvent::beat(1, 2));
    }

    #[test]
    fn test_unmarshal_truncated_payload() {
        // 字段 5 声称 5 字节但只有 1 字节
        let encoded = vec![0x2a, 0x05, 0x01];
        let mut decoded = SyncEvent::default();
        assert_eq!(decoded.unmarshal(&encoded), Err(WireError::Truncated));
    }

    #[test]
    fn test_peer_info_round_trip() {
        let peer = PeerInfo {
            peer_id: u64::MAX,
            nickname: b"ember".to_vec(),
        };
        let encoded = marshal_native(&peer);

        let mut decoded = PeerInfo::default();
        decoded.unmarshal(&encoded).unwrap();
        assert_eq!(decoded, peer);
    }

    #[test]
    fn test_reset() {
        let mut event = full_event();
        event.reset();
        assert_eq!(event, SyncEvent::default());
    }
}
