// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 协议参数与常量模块
//!
//! 该模块集中存放 `docserver` 运行期间不会变化的常量：
//! - 路径解析相关的上限与索引文件列表。
//! - HTTP 状态码原因短语。
//! - 按文件后缀查询的 MIME 类型表。

use std::collections::HashMap;
use std::fmt;

use lazy_static::lazy_static;

/// 服务器名称标识，用于 HTTP 响应头的 `Server` 字段
pub const SERVER_NAME: &str = "docserver";

/// HTTP 协议规定的换行符（Carriage Return Line Feed）
pub const CRLF: &str = "\r\n";

/// 符号链接最多允许跟随的层数。超过该层数仍是链接则判定为环路或过深的间接引用。
pub const MAX_LINK_LEVELS: usize = 5;

/// 请求目录时依次尝试的索引文件
pub const INDEX_CANDIDATES: [&str; 2] = ["index.md", "README.md"];

/// 以该后缀结尾的文件会被渲染为 HTML
pub const MARKDOWN_EXTENSION: &str = "md";

/// 强制按原始字节返回 Markdown 文件的查询参数名
pub const RAW_QUERY_FLAG: &str = "raw";

/// 请求头部（请求行 + 标头）允许的最大字节数
pub const MAX_REQUEST_HEAD: usize = 8192;

/// 默认配置文件路径
pub const DEFAULT_CONFIG: &str = "config/docserver.toml";

/// 默认日志配置文件路径
pub const DEFAULT_LOG_CONFIG: &str = "config/log4rs.yaml";

lazy_static! {
    /// 本服务器会用到的 HTTP 状态码与原因短语。
    ///
    /// 参考标准：[RFC 9110: HTTP Semantics](https://www.rfc-editor.org/rfc/rfc9110.html)。
    pub static ref STATUS_CODES: HashMap<u16, &'static str> = {
        let mut map = HashMap::new();
        map.insert(200, "OK");
        map.insert(302, "Found");
        map.insert(400, "Bad Request");
        map.insert(403, "Forbidden");
        map.insert(404, "Not Found");
        map.insert(500, "Internal Server Error");
        map
    };
}

lazy_static! {
    /// 文件后缀名到 MIME 类型的映射表。
    ///
    /// 仅在原始字节模式下使用；未登记的后缀不设置 `Content-Type`，由浏览器自行判断。
    pub static ref MIME_TYPES: HashMap<&'static str, &'static str> = {
        let mut map = HashMap::new();
        // 文本与文档
        map.insert("md", "text/markdown;charset=utf-8");
        map.insert("markdown", "text/markdown;charset=utf-8");
        map.insert("txt", "text/plain;charset=utf-8");
        map.insert("htm", "text/html;charset=utf-8");
        map.insert("html", "text/html;charset=utf-8");
        map.insert("css", "text/css;charset=utf-8");
        map.insert("csv", "text/csv");
        map.insert("xml", "text/xml");
        map.insert("js", "text/javascript;charset=utf-8");
        map.insert("mjs", "text/javascript;charset=utf-8");
        map.insert("json", "application/json");
        map.insert("pdf", "application/pdf");
        map.insert("rtf", "application/rtf");
        map.insert("sh", "application/x-sh");
        // 图片
        map.insert("bmp", "image/bmp");
        map.insert("gif", "image/gif");
        map.insert("ico", "image/x-icon");
        map.insert("jpg", "image/jpeg");
        map.insert("jpeg", "image/jpeg");
        map.insert("png", "image/png");
        map.insert("svg", "image/svg+xml");
        map.insert("webp", "image/webp");
        map.insert("avif", "image/avif");
        // 字体
        map.insert("otf", "font/otf");
        map.insert("ttf", "font/ttf");
        map.insert("woff", "font/woff");
        map.insert("woff2", "font/woff2");
        // 音视频
        map.insert("mp3", "audio/mpeg");
        map.insert("wav", "audio/wav");
        map.insert("mp4", "video/mp4");
        map.insert("webm", "video/webm");
        // 归档
        map.insert("gz", "application/gzip");
        map.insert("tar", "application/x-tar");
        map.insert("zip", "application/zip");
        map.insert("wasm", "application/wasm");
        map
    };
}

/// 支持的 HTTP 协议版本
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HttpVersion {
    /// HTTP/1.0 版本
    V1_0,
    /// HTTP/1.1 版本
    V1_1,
}

impl fmt::Display for HttpVersion {
    /// 将枚举格式化为 HTTP 报文中的版本字符串
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            HttpVersion::V1_0 => write!(f, "1.0"),
            HttpVersion::V1_1 => write!(f, "1.1"),
        }
    }
}
