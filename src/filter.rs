// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! 请求过滤规则。
//!
//! 规则在启动时编译一次，之后只读。匹配对象是解析完符号链接后、相对文档根目录的路径，
//! 而不是客户端发来的原始请求串。

use log::info;
use regex::Regex;

#[derive(Debug, Clone, Default)]
pub struct FilterSet {
    patterns: Vec<Regex>,
}

impl FilterSet {
    /// 编译全部规则，任意一条非法即整体失败。
    pub fn compile<S: AsRef<str>>(patterns: &[S]) -> Result<Self, regex::Error> {
        let mut compiled = Vec::with_capacity(patterns.len());
        for p in patterns {
            info!("Adding filter: {}", p.as_ref());
            compiled.push(Regex::new(p.as_ref())?);
        }
        Ok(Self { patterns: compiled })
    }

    /// 返回第一条命中的规则
    pub fn matching(&self, relative: &str) -> Option<&Regex> {
        self.patterns.iter().find(|rex| rex.is_match(relative))
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }
}
