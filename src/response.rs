// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # HTTP 响应构建模块
//!
//! `Response` 只负责报文本身：状态行、标头与正文的序列化。
//! 选择返回什么内容由 [`crate::router`] 决定。

use bytes::Bytes;
use chrono::prelude::*;

use crate::param::{HttpVersion, CRLF, SERVER_NAME, STATUS_CODES};

pub const HTML_CONTENT_TYPE: &str = "text/html;charset=utf-8";

#[derive(Debug, Clone)]
pub struct Response {
    version: HttpVersion,
    status_code: u16,
    information: String,
    content_type: Option<String>,
    date: DateTime<Utc>,
    server_name: String,
    location: Option<String>,
    content: Option<Bytes>,
}

impl Response {
    pub fn new() -> Self {
        Self {
            version: HttpVersion::V1_1,
            status_code: 200,
            information: "OK".to_string(),
            content_type: None,
            date: Utc::now(),
            server_name: SERVER_NAME.to_string(),
            location: None,
            content: None,
        }
    }

    /// 状态码加 HTML 正文
    pub fn html(code: u16, body: String) -> Self {
        let mut response = Self::new();
        response.set_code(code);
        response.content_type = Some(HTML_CONTENT_TYPE.to_string());
        response.content = Some(Bytes::from(body));
        response
    }

    /// 原样返回字节，`content_type` 为 `None` 时不发送 `Content-Type`
    pub fn raw(content: Vec<u8>, content_type: Option<&str>) -> Self {
        let mut response = Self::new();
        response.content_type = content_type.map(str::to_string);
        response.content = Some(Bytes::from(content));
        response
    }

    /// 302 跳转
    pub fn redirect(location: &str) -> Self {
        let mut response = Self::new();
        response.set_code(302);
        response.location = Some(location.to_string());
        response
    }

    /// 只有状态行的最简响应，用于错误页本身渲染失败的情况
    pub fn bare(code: u16) -> Self {
        let mut response = Self::new();
        response.set_code(code);
        response
    }

    fn set_code(&mut self, code: u16) -> &mut Self {
        self.status_code = code;
        self.information = STATUS_CODES
            .get(&code)
            .copied()
            .unwrap_or("Unknown")
            .to_string();
        self
    }

    pub fn as_bytes(&self) -> Vec<u8> {
        let mut head = format!(
            "HTTP/{} {} {}{}",
            self.version, self.status_code, self.information, CRLF
        );
        head.push_str(&format!("Date: {}{}", format_date(&self.date), CRLF));
        head.push_str(&format!("Server: {}{}", self.server_name, CRLF));
        if let Some(content_type) = &self.content_type {
            head.push_str(&format!("Content-Type: {}{}", content_type, CRLF));
        }
        if let Some(location) = &self.location {
            head.push_str(&format!("Location: {}{}", location, CRLF));
        }
        head.push_str(&format!("Content-Length: {}{}", self.content_length(), CRLF));
        head.push_str(&format!("Connection: close{}", CRLF));
        head.push_str(CRLF);

        let mut bytes = head.into_bytes();
        if let Some(content) = &self.content {
            bytes.extend_from_slice(content);
        }
        bytes
    }
}

impl Default for Response {
    fn default() -> Self {
        Self::new()
    }
}

impl Response {
    pub fn status_code(&self) -> u16 {
        self.status_code
    }

    pub fn information(&self) -> &str {
        &self.information
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    pub fn content(&self) -> &[u8] {
        self.content.as_deref().unwrap_or_default()
    }

    pub fn content_length(&self) -> usize {
        self.content.as_ref().map_or(0, |c| c.len())
    }
}

fn format_date(date: &DateTime<Utc>) -> String {
    date.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}
