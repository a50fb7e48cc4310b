// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 路由引擎
//!
//! 将一次请求转换为唯一的结果：跳转、渲染后的 Markdown、原始文件，或一个带类别的错误。
//!
//! ## 路由规则
//! 1. 请求路径拼接到文档根目录并规范化，再跟随符号链接，然后做包含检查与过滤。
//! 2. 目录请求缺少结尾的 `/` 时跳转到补全后的地址，保证页面内的相对链接正确。
//! 3. 带 `/` 的目录请求查找索引文件（`index.md`，其次 `README.md`），并重新检查。
//! 4. `.md` 文件渲染后套用页面模板；带 `raw` 查询参数或其他后缀的文件原样返回。
//!
//! 任何一步失败都通过错误模板返回，客户端只能看到类别对应的固定提示语。

use std::{fs, path::Path};

use log::{debug, error, info, warn};
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};

use crate::{
    exception::{Exception, RequestError},
    param::{MARKDOWN_EXTENSION, MIME_TYPES},
    request::Request,
    resolver::{canonicalize, check_access, find_index, relative_to, resolve_links, ResolvedPath},
    response::Response,
    site::Site,
    template::{ErrorPage, Page},
};

/// 需要在路径段中转义的字符
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// 一次请求成功解析后的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// 渲染 Markdown 后套用页面模板
    Markdown(ResolvedPath),
    /// 原样返回文件字节
    Raw(ResolvedPath),
    /// 302 跳转到给定地址
    Redirect(String),
}

/// 为请求选择结果，不读取文件内容。
pub fn route(site: &Site, request: &Request, id: u128) -> Result<Outcome, RequestError> {
    let root = site.root();
    let target = canonicalize(root, request.path());
    debug!("[ID{}]映射物理路径：{}", id, target.display());

    let linked = resolve_links(&target)?;
    let resolved = check_access(root, site.filters(), &linked)?;

    if !resolved.is_dir() {
        return Ok(dispatch(resolved, request.raw()));
    }

    if !request.path().ends_with('/') {
        // 使用跟随链接之前的路径，使地址停留在客户端所用的命名空间内
        return Ok(Outcome::Redirect(directory_url(root, &target)));
    }

    let index = find_index(resolved.path())?;
    let resolved = check_access(root, site.filters(), &index)?;
    if resolved.is_dir() {
        return Err(RequestError::new(
            Exception::InternalError,
            format!("{}: index resolved to a directory", index.display()),
        ));
    }
    Ok(dispatch(resolved, request.raw()))
}

fn dispatch(resolved: ResolvedPath, raw: bool) -> Outcome {
    if resolved.extension() == Some(MARKDOWN_EXTENSION) && !raw {
        Outcome::Markdown(resolved)
    } else {
        Outcome::Raw(resolved)
    }
}

/// 目录的规范地址，总以 `/` 结尾
fn directory_url(root: &Path, dir: &Path) -> String {
    let mut url = String::from("/");
    if let Some(relative) = relative_to(dir, root) {
        for segment in relative.iter() {
            let segment = segment.to_string_lossy();
            if segment == "." {
                continue;
            }
            url.extend(utf8_percent_encode(&segment, PATH_SEGMENT));
            url.push('/');
        }
    }
    url
}

/// 处理一次请求并生成完整的响应。文件读取是同步阻塞的。
pub fn respond(site: &Site, request: &Request, id: u128) -> Response {
    let result = route(site, request, id).and_then(|outcome| match outcome {
        Outcome::Redirect(to) => {
            info!("[ID{}]`-> Redirecting -> {}", id, to);
            Ok(Response::redirect(&to))
        }
        Outcome::Markdown(resolved) => serve_markdown(site, &resolved, id),
        Outcome::Raw(resolved) => serve_raw(&resolved, id),
    });
    match result {
        Ok(response) => response,
        Err(e) => error_response(site, request.path(), &e, id),
    }
}

fn read(resolved: &ResolvedPath) -> Result<Vec<u8>, RequestError> {
    fs::read(resolved.path()).map_err(|e| {
        let err = RequestError::from_io(&e, resolved.path());
        RequestError::new(err.kind(), format!("couldn't read file: {}", err.detail()))
    })
}

fn serve_markdown(site: &Site, resolved: &ResolvedPath, id: u128) -> Result<Response, RequestError> {
    info!("[ID{}]`-> Serving markdown: {}", id, resolved.path().display());
    let source = read(resolved)?;
    let markup = site.renderer().render(&source);
    let markup = String::from_utf8_lossy(&markup);
    let title = resolved.relative().to_string_lossy();

    let body = site
        .templates()
        .render_page(&Page {
            title: &title,
            markup: &markup,
        })
        .map_err(|e| {
            RequestError::new(
                Exception::InternalError,
                format!("page template failed: {}", e),
            )
        })?;
    Ok(Response::html(200, body))
}

fn serve_raw(resolved: &ResolvedPath, id: u128) -> Result<Response, RequestError> {
    info!("[ID{}]`-> Serving file: {}", id, resolved.path().display());
    let content = read(resolved)?;
    let mime = resolved
        .extension()
        .and_then(|ext| MIME_TYPES.get(ext.to_ascii_lowercase().as_str()).copied());
    Ok(Response::raw(content, mime))
}

/// 通过错误模板生成错误响应；错误模板本身失败时退回只含状态码的响应。
pub fn error_response(site: &Site, url: &str, err: &RequestError, id: u128) -> Response {
    warn!("[ID{}]`-> Error: {} '{}'", id, url, err);
    let kind = err.kind();
    let code = kind.status_code();
    let page = ErrorPage {
        url,
        code,
        msg: kind.message(),
    };
    match site.templates().render_error(&page) {
        Ok(body) => Response::html(code, body),
        Err(e) => {
            error!("[ID{}]*-> Error: {}", id, e);
            Response::bare(code)
        }
    }
}
