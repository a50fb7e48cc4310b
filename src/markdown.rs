// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! Markdown 到 HTML 片段的渲染。

use pulldown_cmark::{html, Options, Parser};

/// 把 Markdown 源码转换为 HTML 片段。实现必须是纯函数，且对任意字节输入都有结果。
#[cfg_attr(test, mockall::automock)]
pub trait Renderer: Send + Sync {
    fn render(&self, source: &[u8]) -> Vec<u8>;
}

/// 基于 pulldown-cmark 的渲染器，开启表格、删除线、任务列表和脚注等 GitHub 风格扩展。
#[derive(Debug, Clone)]
pub struct CommonMark {
    options: Options,
}

impl CommonMark {
    pub fn new() -> Self {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_TASKLISTS);
        options.insert(Options::ENABLE_FOOTNOTES);
        Self { options }
    }
}

impl Default for CommonMark {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for CommonMark {
    fn render(&self, source: &[u8]) -> Vec<u8> {
        // 非 UTF-8 字节以替换字符呈现，而不是拒绝整篇文档
        let text = String::from_utf8_lossy(source);
        let mut out = String::with_capacity(text.len() * 3 / 2);
        html::push_html(&mut out, Parser::new_ext(&text, self.options));
        out.into_bytes()
    }
}
