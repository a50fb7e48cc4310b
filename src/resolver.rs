// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 路径解析模块
//!
//! 把不可信的 URL 路径变成一个确认位于文档根目录之内、且可以读取的文件系统路径。
//!
//! 流程分四步：
//! 1. [`canonicalize`]：纯文本拼接与规范化，不访问文件系统。
//! 2. [`resolve_links`]：逐层跟随最后一段的符号链接，最多 [`MAX_LINK_LEVELS`] 层。
//! 3. [`check_access`]：确认结果仍在根目录内、未被过滤规则命中、并且可以打开。
//! 4. [`find_index`]：请求目录时查找索引文件。
//!
//! 只有 [`check_access`] 能构造 [`ResolvedPath`]。

use std::{
    fs::{self, File},
    path::{Component, Path, PathBuf},
};

use log::debug;

use crate::{
    exception::{Exception, RequestError},
    filter::FilterSet,
    param::{INDEX_CANDIDATES, MAX_LINK_LEVELS},
};

/// 通过了全部检查的路径：存在、位于根目录内、未被过滤。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPath {
    path: PathBuf,
    relative: PathBuf,
    is_dir: bool,
}

impl ResolvedPath {
    /// 文件系统中的绝对路径
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 相对文档根目录的路径，用作页面标题
    pub fn relative(&self) -> &Path {
        &self.relative
    }

    pub fn is_dir(&self) -> bool {
        self.is_dir
    }

    pub fn extension(&self) -> Option<&str> {
        self.path.extension().and_then(|e| e.to_str())
    }
}

/// 对路径做纯文本规范化：去掉 `.`，消去 `..`，合并重复分隔符。
///
/// 绝对路径的 `..` 不会越过 `/`；相对路径开头无法消去的 `..` 会被保留。
pub fn clean(path: &Path) -> PathBuf {
    let mut parts: Vec<Component> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match parts.last() {
                Some(Component::Normal(_)) => {
                    parts.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => parts.push(component),
            },
            c => parts.push(c),
        }
    }
    if parts.is_empty() {
        return PathBuf::from(".");
    }
    parts.iter().collect()
}

/// 把请求路径拼接到根目录下。
///
/// 请求路径按 `/` 切分后逐段处理，开头多余的 `..` 被直接丢弃，
/// 因此结果在字面上总以 `root` 开头。这只是必要条件，符号链接仍可能指向别处。
pub fn canonicalize(root: &Path, request_path: &str) -> PathBuf {
    let mut segments: Vec<&str> = Vec::new();
    for segment in request_path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }
    let mut path = root.to_path_buf();
    path.extend(segments);
    path
}

/// 跟随路径最后一段上的符号链接，直到它不再是链接。
///
/// 绝对目标直接替换当前路径；相对目标以链接**所在目录**为基准拼接后再规范化。
/// 读取链接的次数不超过 [`MAX_LINK_LEVELS`]，之后仍是链接则返回 `TooManyRedirects`，
/// 所以任意长度的链接环都会在有限步内被拒绝。
///
/// 返回的路径最后一段不是符号链接，但调用方仍需自行确认它的类型。
pub fn resolve_links(path: &Path) -> Result<PathBuf, RequestError> {
    debug!("|-> Resolving: {}", path.display());
    let mut path = path.to_path_buf();
    let mut meta = fs::symlink_metadata(&path).map_err(|e| RequestError::from_io(&e, &path))?;

    let mut level = 0;
    while meta.file_type().is_symlink() {
        if level == MAX_LINK_LEVELS {
            return Err(RequestError::new(
                Exception::TooManyRedirects,
                format!("{}: more than {} levels of links", path.display(), MAX_LINK_LEVELS),
            ));
        }
        let target = fs::read_link(&path).map_err(|e| RequestError::from_io(&e, &path))?;
        path = if target.is_absolute() {
            clean(&target)
        } else {
            let parent = path.parent().unwrap_or_else(|| Path::new("/"));
            clean(&parent.join(&target))
        };
        debug!("|-> Link to: {} ({})", path.display(), target.display());

        meta = fs::symlink_metadata(&path).map_err(|e| RequestError::from_io(&e, &path))?;
        level += 1;
    }
    Ok(path)
}

/// 计算 `path` 相对 `root` 的路径，两者都应是规范化后的绝对路径。
///
/// `path` 在 `root` 之外时结果以 `..` 开头；两者前缀不同（例如 Windows 上的不同盘符）时返回 `None`。
pub fn relative_to(path: &Path, root: &Path) -> Option<PathBuf> {
    let path: Vec<Component> = path.components().collect();
    let root: Vec<Component> = root.components().collect();

    let anchored = |c: &Component| matches!(c, Component::Prefix(_) | Component::RootDir);
    let path_anchor: Vec<&Component> = path.iter().take_while(|c| anchored(c)).collect();
    let root_anchor: Vec<&Component> = root.iter().take_while(|c| anchored(c)).collect();
    if path_anchor != root_anchor {
        return None;
    }

    let common = path
        .iter()
        .zip(root.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut relative = PathBuf::new();
    for _ in common..root.len() {
        relative.push("..");
    }
    for c in &path[common..] {
        relative.push(c.as_os_str());
    }
    if relative.as_os_str().is_empty() {
        relative.push(".");
    }
    Some(relative)
}

fn escapes(relative: &Path) -> bool {
    matches!(relative.components().next(), Some(Component::ParentDir))
}

/// 相对根目录定位 `path`，越界即拒绝。
fn contain(path: &Path, root: &Path) -> Result<PathBuf, RequestError> {
    let relative = relative_to(path, root).ok_or_else(|| {
        RequestError::new(
            Exception::PermissionDenied,
            format!("{}: no relative path to document root", path.display()),
        )
    })?;
    if escapes(&relative) {
        return Err(RequestError::new(
            Exception::PermissionDenied,
            format!("{}: escapes document root", path.display()),
        ));
    }
    Ok(relative)
}

/// 确认已跟随过符号链接的 `path` 可以对外提供。
///
/// 检查依次为：根目录包含关系（字面路径与真实路径各一次）、过滤规则、文件类型、能否打开。
/// 过滤命中报告为 `NotFound` 而不是 `PermissionDenied`，以免暴露文件的存在。
pub fn check_access(
    root: &Path,
    filters: &FilterSet,
    path: &Path,
) -> Result<ResolvedPath, RequestError> {
    let relative = contain(path, root)?;

    // 中间目录上的符号链接由操作系统跟随，这里用真实路径再确认一次
    let real = fs::canonicalize(path).map_err(|e| RequestError::from_io(&e, path))?;
    let real_relative = contain(&real, root)?;

    // 根目录本身的相对形式是 "."，不参与过滤
    for candidate in [&relative, &real_relative] {
        if candidate.as_path() == Path::new(".") {
            continue;
        }
        let candidate = candidate.to_string_lossy();
        if let Some(rex) = filters.matching(&candidate) {
            debug!("|-> Matched on filter: {}", rex);
            return Err(RequestError::new(
                Exception::NotFound,
                format!("{}: request filtered by '{}'", candidate, rex),
            ));
        }
    }

    let meta = fs::metadata(&real).map_err(|e| RequestError::from_io(&e, path))?;
    if !meta.is_file() && !meta.is_dir() {
        return Err(RequestError::new(
            Exception::NotFound,
            format!("{}: not a regular file", path.display()),
        ));
    }

    File::open(&real).map_err(|e| RequestError::from_io(&e, path))?;

    Ok(ResolvedPath {
        path: path.to_path_buf(),
        relative,
        is_dir: meta.is_dir(),
    })
}

/// 在目录中按 [`INDEX_CANDIDATES`] 的顺序查找索引文件。
///
/// 第一个能成功解析的候选即为结果；它若是目录则属于内部错误。
pub fn find_index(dir: &Path) -> Result<PathBuf, RequestError> {
    let mut found = None;
    for name in INDEX_CANDIDATES {
        let candidate = dir.join(name);
        debug!("|-> Find index: {}", candidate.display());
        match resolve_links(&candidate) {
            Ok(index) => {
                found = Some(index);
                break;
            }
            Err(e) => debug!("|-> Skip index candidate: {}", e),
        }
    }

    let index = found.ok_or_else(|| {
        RequestError::new(
            Exception::NotFound,
            format!("{}: no index found", dir.display()),
        )
    })?;

    let meta = fs::metadata(&index).map_err(|e| RequestError::from_io(&e, &index))?;
    if meta.is_dir() {
        return Err(RequestError::new(
            Exception::InternalError,
            format!("{}: found directory looking for index", index.display()),
        ));
    }
    Ok(index)
}
