// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # HTTP 请求处理模块
//!
//! 负责将 TCP 流中读取的请求头部解析为 `Request` 结构体：
//! 1. 请求行（方法、目标、版本）的解析。
//! 2. 目标拆分为路径与查询串，并对路径做百分号解码。
//! 3. 少量用于日志的标头（`Host`、`User-Agent`）的提取。
//!
//! 请求方法只用于日志记录，路由时一律按 GET 语义处理。

use log::error;
use percent_encoding::percent_decode_str;

use crate::{
    exception::Exception,
    param::{HttpVersion, CRLF, RAW_QUERY_FLAG},
};

#[derive(Debug, Clone)]
pub struct Request {
    /// HTTP 请求方法，原样保留（大写）
    method: String,
    /// 请求行中的原始目标
    target: String,
    /// 解码后的路径部分，不含查询串
    path: String,
    /// 查询串（不含 `?`）
    query: Option<String>,
    version: HttpVersion,
    user_agent: String,
    host: Option<String>,
}

impl Request {
    /// 从原始字节缓冲区尝试构建 `Request` 实例。
    ///
    /// # 参数
    /// * `buffer` - 从网络 Socket 读取的请求头部，可以带有 `\r\n\r\n` 之后的多余字节。
    /// * `id` - 连接 ID，用于在日志中追踪请求。
    pub fn try_from(buffer: &[u8], id: u128) -> Result<Self, Exception> {
        let request_string = match std::str::from_utf8(buffer) {
            Ok(string) => string,
            Err(_) => {
                error!("[ID{}]无法解析HTTP请求", id);
                return Err(Exception::RequestIsNotUtf8);
            }
        };
        let head = match request_string.split_once("\r\n\r\n") {
            Some((head, _)) => head,
            None => request_string,
        };
        let mut lines = head.split(CRLF);

        // 1. 解析请求行 (e.g., "GET /index.md?raw HTTP/1.1")
        let request_line = lines.next().unwrap_or_default();
        let parts: Vec<&str> = request_line.split_whitespace().collect();
        if parts.len() != 3 {
            error!("[ID{}]HTTP请求行格式不正确：{}", id, request_line);
            return Err(Exception::MalformedRequest);
        }

        let method = parts[0].to_uppercase();
        if !method.chars().all(|c| c.is_ascii_alphabetic()) {
            error!("[ID{}]非法的HTTP请求方法：{}", id, parts[0]);
            return Err(Exception::MalformedRequest);
        }

        let version = match parts[2].to_uppercase().as_str() {
            "HTTP/1.1" => HttpVersion::V1_1,
            "HTTP/1.0" => HttpVersion::V1_0,
            other => {
                error!("[ID{}]不支持的HTTP协议版本：{}", id, other);
                return Err(Exception::UnsupportedHttpVersion);
            }
        };

        // 2. 拆分并解码请求目标
        let target = parts[1].to_string();
        let origin = match origin_form(&target) {
            Some(o) => o,
            None => {
                error!("[ID{}]无法识别的请求目标：{}", id, target);
                return Err(Exception::MalformedRequest);
            }
        };
        let (raw_path, query) = match origin.split_once('?') {
            Some((p, q)) => (p, Some(q.to_string())),
            None => (origin, None),
        };
        let path = match percent_decode_str(raw_path).decode_utf8() {
            Ok(p) if !p.contains('\0') => p.into_owned(),
            _ => {
                error!("[ID{}]请求路径解码失败：{}", id, raw_path);
                return Err(Exception::InvalidPath);
            }
        };

        // 3. 提取标头
        let mut user_agent = String::new();
        let mut host = None;
        for line in lines {
            if let Some((name, value)) = line.split_once(':') {
                let value = value.trim();
                if name.eq_ignore_ascii_case("user-agent") {
                    user_agent = value.to_string();
                } else if name.eq_ignore_ascii_case("host") {
                    host = Some(value.to_string());
                }
            }
        }

        Ok(Self {
            method,
            target,
            path,
            query,
            version,
            user_agent,
            host,
        })
    }
}

/// 取出目标中的 origin-form 部分（以 `/` 开头）。绝对形式的目标会去掉协议与主机名。
fn origin_form(target: &str) -> Option<&str> {
    let target = target.split('#').next().unwrap_or_default();
    if target.starts_with('/') {
        return Some(target);
    }
    let (_, rest) = target.split_once("://")?;
    match rest.find('/') {
        Some(i) => Some(&rest[i..]),
        None => Some("/"),
    }
}

// --- Getter 访问器实现 ---

impl Request {
    pub fn version(&self) -> &HttpVersion {
        &self.version
    }

    /// 获取解码后的请求路径（不含查询参数）
    pub fn path(&self) -> &str {
        &self.path
    }

    /// 获取请求行中的原始目标
    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    pub fn host(&self) -> Option<&str> {
        self.host.as_deref()
    }

    /// 查询串中是否出现了 `raw` 参数（不论取值）
    pub fn raw(&self) -> bool {
        self.query.as_deref().map_or(false, |q| {
            q.split('&')
                .any(|pair| pair.split('=').next() == Some(RAW_QUERY_FLAG))
        })
    }
}
