//! 兼容性校验执行器
//!
//! 同一消息实例分别走旧式原生路径与适配器路径，逐项对比：
//! 字节一致性、往返一致性、文本渲染，并按配置生成内容哈希
//! 报告。任何一项不一致都以错误返回，报告首个差异。

use std::fmt::Debug;

use bytes::BytesMut;
use protoflex_adapter::{Adapter, AdapterMut};
use protoflex_core::{LegacyMessage, WireError};
use protoflex_reflect::{
    format_compact, unmarshal_replace, MarshalOptions, MessageView, ReflectError,
    UnmarshalOptions,
};
use protoflex_schema::ResolveOptions;
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::{debug, info};

use crate::config::{CompatConfig, ConfigError};

/// 校验错误
#[derive(Error, Debug)]
pub enum CompatError {
    /// 配置错误
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// 反射层错误
    #[error(transparent)]
    Reflect(#[from] ReflectError),

    /// 旧式消息编解码错误
    #[error(transparent)]
    Wire(#[from] WireError),

    /// 适配器路径与原生路径字节不一致
    #[error("交叉路径字节不一致: 原生 {native} 字节, 适配器 {bridged} 字节, 首个差异下标 {first_diff:?}")]
    CrossPathMismatch {
        /// 原生路径输出长度
        native: usize,
        /// 适配器路径输出长度
        bridged: usize,
        /// 首个不一致的字节下标
        first_diff: Option<usize>,
    },

    /// 往返后字段不一致
    #[error("往返后消息不一致: {0}")]
    RoundTripMismatch(String),
}

/// 校验报告
#[derive(Debug, Clone)]
pub struct CompatReport {
    /// 序列化字节数
    pub serialized_len: usize,
    /// 序列化内容的 SHA-256 哈希（十六进制）
    pub content_hash: Option<String>,
    /// 单行文本渲染
    pub rendering: Option<String>,
}

/// 兼容性校验执行器
pub struct CompatRunner {
    config: CompatConfig,
}

impl CompatRunner {
    /// 以默认配置创建
    pub fn new() -> Self {
        Self {
            config: CompatConfig::default(),
        }
    }

    /// 以指定配置创建
    pub fn with_config(config: CompatConfig) -> Result<Self, CompatError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// 当前配置
    pub fn config(&self) -> &CompatConfig {
        &self.config
    }

    fn resolve_options(&self) -> ResolveOptions {
        ResolveOptions {
            allow_unresolvable: self.config.resolver.allow_unresolvable,
        }
    }

    /// 对一个消息实例执行全部启用的校验
    pub fn verify<M>(&self, input: &M) -> Result<CompatReport, CompatError>
    where
        M: LegacyMessage + Default + PartialEq + Debug,
    {
        let native = marshal_native(input)?;

        let adapter = Adapter::with_options(input, self.resolve_options());
        let bridged = adapter.marshal(&MarshalOptions::default(), BytesMut::new())?;

        if self.config.checks.cross_path {
            compare_bytes(&native, &bridged)?;
            info!(len = native.len(), "交叉路径字节一致");
        }

        if self.config.checks.round_trip {
            let mut restored = M::default();
            let mut target = AdapterMut::with_options(&mut restored, self.resolve_options());
            unmarshal_replace(&mut target, &UnmarshalOptions::default(), &bridged)?;
            if restored != *input {
                return Err(CompatError::RoundTripMismatch(format!(
                    "期望 {:?}, 实得 {:?}",
                    input, restored
                )));
            }
            info!("往返一致");
        }

        let rendering = if self.config.checks.render_text {
            let text = format_compact(&adapter)?;
            debug!(text = text.as_str(), "文本渲染");
            Some(text)
        } else {
            None
        };

        let content_hash = if self.config.report.content_hash {
            Some(hex_digest(&bridged))
        } else {
            None
        };

        Ok(CompatReport {
            serialized_len: bridged.len(),
            content_hash,
            rendering,
        })
    }
}

impl Default for CompatRunner {
    fn default() -> Self {
        Self::new()
    }
}

/// 原生路径序列化
fn marshal_native(message: &dyn LegacyMessage) -> Result<Vec<u8>, WireError> {
    let size = message.encoded_size();
    let mut buf = vec![0u8; size];
    let written = message.marshal_to_sized_buffer(&mut buf)?;
    debug_assert_eq!(written, size);
    Ok(buf)
}

/// 字节级对比，报告首个差异位置
fn compare_bytes(native: &[u8], bridged: &[u8]) -> Result<(), CompatError> {
    if native == bridged {
        return Ok(());
    }
    let first_diff = native
        .iter()
        .zip(bridged.iter())
        .position(|(a, b)| a != b);
    Err(CompatError::CrossPathMismatch {
        native: native.len(),
        bridged: bridged.len(),
        first_diff,
    })
}

/// SHA-256 十六进制摘要
fn hex_digest(data: &[u8]) -> String {
    let digest = Sha256::digest(data);
    digest.iter().map(|b| format!("{:02x}", b)).collect()
}
