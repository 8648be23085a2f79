//! # Error 模块
//!
//! 定义 ripple-core 中使用的错误类型。
//!
//! 涟漪是纯装饰层：`RippleEngine::create` 从不向调用方返回错误。
//! 这里的错误只出现在显式 API 上（颜色解析、配置校验、场景回放）。

use thiserror::Error;

/// 颜色解析错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ColorParseError {
    /// 十六进制位数不是 3/4/6/8
    #[error("十六进制颜色长度无效：{len} 位")]
    InvalidLength { len: usize },

    /// 非法的十六进制字符
    #[error("第 {index} 位不是有效的十六进制字符")]
    InvalidDigit { index: usize },

    /// 不是十六进制颜色
    #[error("不支持的颜色格式 '{input}'")]
    Unsupported { input: String },
}

/// 配置错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// 读取/写入失败
    #[error("配置 IO 错误: {0}")]
    Io(String),

    /// JSON 解析失败
    #[error("配置解析失败: {0}")]
    Parse(String),

    /// 配置项取值无效
    #[error("配置项 '{field}' 无效 - {message}")]
    Validation {
        field: &'static str,
        message: String,
    },
}

/// 场景错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScenarioError {
    /// JSON 解析失败
    #[error("场景解析失败: {0}")]
    Parse(String),

    /// 引用了未声明的表面
    #[error("第 {step} 步：表面 '{surface}' 未声明")]
    UnknownSurface { step: usize, surface: String },

    /// 重复声明表面
    #[error("第 {step} 步：表面 '{surface}' 重复声明")]
    DuplicateSurface { step: usize, surface: String },

    /// 场景使用的配置无效
    #[error("场景配置无效: {0}")]
    Config(#[from] ConfigError),
}
