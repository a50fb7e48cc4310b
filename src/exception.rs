// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # Exception 模块
//!
//! 该模块定义了请求处理与服务器启动过程中可能出现的各类错误。
//!
//! ## 设计意图
//! - **错误分类**：底层的 I/O 错误在发现的位置立即被归入固定的几类，不会原样向上传递。
//! - **语义映射**：每个变体都对应唯一的 HTTP 状态码与一句固定的客户端提示。
//! - **信息隔离**：`RequestError::detail` 只写入日志，永远不会出现在响应正文中。

use std::{fmt, io, path::Path};

/// 请求处理失败的类别。
///
/// 前四个变体来自路径解析流程，其余变体来自 HTTP 报文解析。
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Exception {
    /// 文件不存在、被过滤器拦截，或目录中找不到索引文件。对应 `404 Not Found`。
    NotFound,
    /// 越出文档根目录，或操作系统拒绝访问。对应 `403 Forbidden`。
    PermissionDenied,
    /// 符号链接层数超过上限（包括链接环路）。
    TooManyRedirects,
    /// 不应出现的内部状态，例如索引文件名指向一个目录，或模板渲染失败。
    InternalError,
    /// 请求字节流无法解析为 UTF-8 字符串。
    RequestIsNotUtf8,
    /// 请求行格式不正确，或请求头部超出长度限制。
    MalformedRequest,
    /// 客户端使用了不支持的 HTTP 协议版本。
    UnsupportedHttpVersion,
    /// 请求路径解码后不是合法的 UTF-8，或包含 NUL 字节。
    InvalidPath,
}

use Exception::*;

impl Exception {
    /// 该类错误对应的 HTTP 状态码
    pub fn status_code(&self) -> u16 {
        match self {
            NotFound => 404,
            PermissionDenied => 403,
            TooManyRedirects | InternalError => 500,
            RequestIsNotUtf8 | MalformedRequest | UnsupportedHttpVersion | InvalidPath => 400,
        }
    }

    /// 展示给客户端的固定提示语
    pub fn message(&self) -> &'static str {
        match self.status_code() {
            404 => "Not found",
            403 => "Forbidden",
            400 => "Bad Request",
            _ => "Internal Server Error",
        }
    }
}

impl fmt::Display for Exception {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotFound => write!(f, "Not found (404)"),
            PermissionDenied => write!(f, "Permission denied (403)"),
            TooManyRedirects => write!(f, "Too many levels of symbolic links"),
            InternalError => write!(f, "Internal error (500)"),
            RequestIsNotUtf8 => write!(f, "Request bytes can't be parsed in UTF-8"),
            MalformedRequest => write!(f, "Malformed request"),
            UnsupportedHttpVersion => write!(f, "Unsupported HTTP version"),
            InvalidPath => write!(f, "Invalid path (400)"),
        }
    }
}

/// 一次失败的请求：错误类别加上仅供日志使用的细节。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestError {
    kind: Exception,
    detail: String,
}

impl RequestError {
    pub fn new(kind: Exception, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
        }
    }

    /// 将操作系统错误归类，并把出错时所在的路径记入细节。
    pub fn from_io(err: &io::Error, path: &Path) -> Self {
        let kind = match err.kind() {
            io::ErrorKind::NotFound | io::ErrorKind::NotADirectory => NotFound,
            io::ErrorKind::PermissionDenied => PermissionDenied,
            _ => InternalError,
        };
        Self::new(kind, format!("{}: {}", path.display(), err))
    }

    pub fn kind(&self) -> Exception {
        self.kind
    }

    pub fn detail(&self) -> &str {
        &self.detail
    }
}

impl fmt::Display for RequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.detail)
    }
}

impl std::error::Error for RequestError {}

impl From<Exception> for RequestError {
    fn from(kind: Exception) -> Self {
        Self::new(kind, kind.to_string())
    }
}

/// 启动阶段的致命错误。出现时服务器不会开始监听。
#[derive(Debug)]
pub enum StartupError {
    /// 读取文件或目录失败
    Io(String, io::Error),
    /// 配置文件格式错误
    Config(toml::de::Error),
    /// 模板无法解析
    Template(tera::Error),
    /// 过滤规则不是合法的正则表达式
    Filter(regex::Error),
    /// 日志系统初始化失败
    Logging(String),
}

impl fmt::Display for StartupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StartupError::Io(what, e) => write!(f, "{}: {}", what, e),
            StartupError::Config(e) => write!(f, "invalid config: {}", e),
            StartupError::Template(e) => write!(f, "invalid template: {}", e),
            StartupError::Filter(e) => write!(f, "invalid filter: {}", e),
            StartupError::Logging(e) => write!(f, "couldn't initialise logging: {}", e),
        }
    }
}

impl std::error::Error for StartupError {}

impl From<toml::de::Error> for StartupError {
    fn from(e: toml::de::Error) -> Self {
        StartupError::Config(e)
    }
}

impl From<tera::Error> for StartupError {
    fn from(e: tera::Error) -> Self {
        StartupError::Template(e)
    }
}

impl From<regex::Error> for StartupError {
    fn from(e: regex::Error) -> Self {
        StartupError::Filter(e)
    }
}
