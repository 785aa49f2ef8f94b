//! 兼容性校验配置
//!
//! 支持 TOML 配置文件与环境变量覆盖，控制执行哪些校验以及
//! 报告包含的内容。

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// 配置错误类型
#[derive(Error, Debug)]
pub enum ConfigError {
    /// IO 错误
    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),

    /// 解析错误
    #[error("解析配置文件失败: {0}")]
    Parse(String),

    /// 验证错误
    #[error("配置验证失败: {0}")]
    Validation(String),

    /// 环境变量错误
    #[error("环境变量解析失败: {0}")]
    EnvVar(String),
}

/// 校验项开关
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CheckSection {
    /// 适配器路径与原生路径的字节一致性
    #[serde(default = "default_true")]
    pub cross_path: bool,

    /// 序列化后再反序列化的往返一致性
    #[serde(default = "default_true")]
    pub round_trip: bool,

    /// 单行文本渲染
    #[serde(default = "default_true")]
    pub render_text: bool,
}

impl Default for CheckSection {
    fn default() -> Self {
        Self {
            cross_path: default_true(),
            round_trip: default_true(),
            render_text: default_true(),
        }
    }
}

/// 报告内容开关
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ReportSection {
    /// 输出序列化内容的 SHA-256 哈希
    #[serde(default = "default_true")]
    pub content_hash: bool,
}

impl Default for ReportSection {
    fn default() -> Self {
        Self {
            content_hash: default_true(),
        }
    }
}

/// 解析行为
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ResolverSection {
    /// 允许无法定位的跨文件类型引用
    #[serde(default = "default_true")]
    pub allow_unresolvable: bool,
}

impl Default for ResolverSection {
    fn default() -> Self {
        Self {
            allow_unresolvable: default_true(),
        }
    }
}

/// 兼容性校验配置
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CompatConfig {
    /// 校验项
    #[serde(default)]
    pub checks: CheckSection,

    /// 报告内容
    #[serde(default)]
    pub report: ReportSection,

    /// 解析行为
    #[serde(default)]
    pub resolver: ResolverSection,
}

impl CompatConfig {
    /// 从 TOML 文件加载配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Parse(format!("读取配置文件失败: {}", e)))?;

        let config: CompatConfig = toml::from_str(&content)
            .map_err(|e| ConfigError::Parse(format!("解析配置文件失败: {}", e)))?;

        Ok(config)
    }

    /// 从环境变量加载配置并覆盖
    ///
    /// 支持的环境变量：
    /// - PROTOFLEX_CHECK_CROSS_PATH: 字节一致性校验 (true/false)
    /// - PROTOFLEX_CHECK_ROUND_TRIP: 往返校验 (true/false)
    /// - PROTOFLEX_CHECK_RENDER_TEXT: 文本渲染 (true/false)
    /// - PROTOFLEX_REPORT_CONTENT_HASH: 内容哈希 (true/false)
    /// - PROTOFLEX_ALLOW_UNRESOLVABLE: 允许未定位引用 (true/false)
    pub fn load_with_env_override(mut self) -> Result<Self, ConfigError> {
        if let Ok(v) = std::env::var("PROTOFLEX_CHECK_CROSS_PATH") {
            self.checks.cross_path = parse_bool_env("PROTOFLEX_CHECK_CROSS_PATH", &v)?;
        }
        if let Ok(v) = std::env::var("PROTOFLEX_CHECK_ROUND_TRIP") {
            self.checks.round_trip = parse_bool_env("PROTOFLEX_CHECK_ROUND_TRIP", &v)?;
        }
        if let Ok(v) = std::env::var("PROTOFLEX_CHECK_RENDER_TEXT") {
            self.checks.render_text = parse_bool_env("PROTOFLEX_CHECK_RENDER_TEXT", &v)?;
        }
        if let Ok(v) = std::env::var("PROTOFLEX_REPORT_CONTENT_HASH") {
            self.report.content_hash = parse_bool_env("PROTOFLEX_REPORT_CONTENT_HASH", &v)?;
        }
        if let Ok(v) = std::env::var("PROTOFLEX_ALLOW_UNRESOLVABLE") {
            self.resolver.allow_unresolvable = parse_bool_env("PROTOFLEX_ALLOW_UNRESOLVABLE", &v)?;
        }
        Ok(self)
    }

    /// 从文件加载并应用环境变量覆盖
    pub fn from_file_with_env<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        Self::from_file(path)?.load_with_env_override()
    }

    /// 验证配置是否有效
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.checks.cross_path && !self.checks.round_trip && !self.checks.render_text {
            return Err(ConfigError::Validation("至少启用一项校验".to_string()));
        }
        Ok(())
    }

    /// 获取配置摘要信息
    pub fn summary(&self) -> String {
        format!(
            "Protoflex 兼容性校验配置:\n  字节一致性: {}\n  往返: {}\n  文本渲染: {}\n  内容哈希: {}\n  允许未定位引用: {}",
            self.checks.cross_path,
            self.checks.round_trip,
            self.checks.render_text,
            self.report.content_hash,
            self.resolver.allow_unresolvable
        )
    }
}

fn parse_bool_env(name: &str, value: &str) -> Result<bool, ConfigError> {
    value
        .parse()
        .map_err(|_| ConfigError::EnvVar(format!("{} 必须是 true 或 false", name)))
}

fn default_true() -> bool {
    true
}
