// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 页面模板模块
//!
//! 服务器使用两个模板：
//! - `page`：包裹渲染后的 Markdown，可用变量 `Title`、`Markup`。
//! - `error`：错误页，可用变量 `Url`、`Code`、`Msg`。
//!
//! 两者都可以从文件加载，未提供时使用内置的默认页面。模板在启动时加载一次，之后只读。

use std::{fs, path::Path};

use log::info;
use serde_derive::Serialize;
use tera::{Context, Tera};

use crate::exception::StartupError;

const PAGE: &str = "page";
const ERROR: &str = "error";

/// 内置的 Markdown 页面模板
pub const DEFAULT_PAGE: &str = r#"<!DOCTYPE html>
<html>
    <head>
        <title>{{ Title | escape }}</title>
        <meta charset="utf-8">
    </head>
    <body>
        <article>
        {{ Markup }}
        </article>
    </body>
</html>
"#;

/// 内置的错误页模板
pub const DEFAULT_ERROR_PAGE: &str = r#"<!DOCTYPE html>
<html>
    <head>
        <title>Error {{ Code }}</title>
        <meta charset="utf-8">
    </head>
    <body>
        <article>
        <h1>Error {{ Code }}</h1>
        <p>{{ Url | escape }}: {{ Msg }}</p>
        </article>
    </body>
</html>
"#;

/// Markdown 页面的模板变量
#[derive(Debug, Serialize)]
pub struct Page<'a> {
    #[serde(rename = "Title")]
    pub title: &'a str,
    #[serde(rename = "Markup")]
    pub markup: &'a str,
}

/// 错误页的模板变量
#[derive(Debug, Serialize)]
pub struct ErrorPage<'a> {
    #[serde(rename = "Url")]
    pub url: &'a str,
    #[serde(rename = "Code")]
    pub code: u16,
    #[serde(rename = "Msg")]
    pub msg: &'a str,
}

pub struct Templates {
    tera: Tera,
}

impl Templates {
    /// 加载模板，`None` 表示使用内置默认模板。
    pub fn load(page: Option<&Path>, error: Option<&Path>) -> Result<Self, StartupError> {
        let page_source = match page {
            Some(p) => {
                info!("Using template: {}", p.display());
                read_template(p)?
            }
            None => DEFAULT_PAGE.to_string(),
        };
        let error_source = match error {
            Some(p) => {
                info!("Using error-template: {}", p.display());
                read_template(p)?
            }
            None => DEFAULT_ERROR_PAGE.to_string(),
        };
        Self::from_sources(&page_source, &error_source)
    }

    /// 直接从模板文本构建
    pub fn from_sources(page: &str, error: &str) -> Result<Self, StartupError> {
        let mut tera = Tera::default();
        // Markup 已经是 HTML；需要转义的变量在模板里显式使用 escape 过滤器
        tera.autoescape_on(vec![]);
        tera.add_raw_template(PAGE, page)?;
        tera.add_raw_template(ERROR, error)?;
        Ok(Self { tera })
    }

    pub fn builtin() -> Result<Self, StartupError> {
        Self::from_sources(DEFAULT_PAGE, DEFAULT_ERROR_PAGE)
    }

    pub fn render_page(&self, page: &Page) -> tera::Result<String> {
        self.tera.render(PAGE, &Context::from_serialize(page)?)
    }

    pub fn render_error(&self, page: &ErrorPage) -> tera::Result<String> {
        self.tera.render(ERROR, &Context::from_serialize(page)?)
    }
}

fn read_template(path: &Path) -> Result<String, StartupError> {
    fs::read_to_string(path)
        .map_err(|e| StartupError::Io(format!("couldn't read template {}", path.display()), e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_page() {
        let templates = Templates::builtin().unwrap();
        let html = templates
            .render_page(&Page {
                title: "docs/intro.md",
                markup: "<h1>Intro</h1>",
            })
            .unwrap();
        assert!(html.contains("<title>docs&#x2F;intro.md</title>"));
        // Markup 原样插入，不被转义
        assert!(html.contains("<h1>Intro</h1>"));
        assert!(!html.contains("&lt;h1&gt;"));
    }

    #[test]
    fn test_builtin_page_escapes_title() {
        let templates = Templates::builtin().unwrap();
        let html = templates
            .render_page(&Page {
                title: "<b>odd</b>.md",
                markup: "",
            })
            .unwrap();
        assert!(html.contains("<title>&lt;b&gt;odd&lt;&#x2F;b&gt;.md</title>"));
        assert!(!html.contains("<b>"));
    }

    #[test]
    fn test_builtin_error_page_escapes_url() {
        let templates = Templates::builtin().unwrap();
        let html = templates
            .render_error(&ErrorPage {
                url: "/<script>",
                code: 404,
                msg: "Not found",
            })
            .unwrap();
        assert!(html.contains("<h1>Error 404</h1>"));
        assert!(html.contains("&lt;script&gt;: Not found"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn test_custom_templates_from_files() {
        let dir = tempfile::tempdir().unwrap();
        let page = dir.path().join("page.html");
        let error = dir.path().join("error.html");
        fs::write(&page, "<main data-title=\"{{ Title }}\">{{ Markup }}</main>").unwrap();
        fs::write(&error, "{{ Code }} {{ Msg }}").unwrap();

        let templates = Templates::load(Some(&page), Some(&error)).unwrap();
        let html = templates
            .render_page(&Page {
                title: "a.md",
                markup: "<p>x</p>",
            })
            .unwrap();
        assert_eq!(html, "<main data-title=\"a.md\"><p>x</p></main>");
        let html = templates
            .render_error(&ErrorPage {
                url: "/a",
                code: 403,
                msg: "Forbidden",
            })
            .unwrap();
        assert_eq!(html, "403 Forbidden");
    }

    #[test]
    fn test_missing_template_file() {
        let result = Templates::load(Some(Path::new("/nonexistent/page.html")), None);
        assert!(matches!(result, Err(StartupError::Io(..))));
    }

    #[test]
    fn test_invalid_template() {
        let result = Templates::from_sources("{{ Title", DEFAULT_ERROR_PAGE);
        assert!(matches!(result, Err(StartupError::Template(_))));
    }
}
