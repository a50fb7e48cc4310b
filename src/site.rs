// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! 进程级的只读状态：文档根目录、过滤规则、模板与渲染器。
//!
//! `Site` 在启动时构建一次，之后通过 `Arc<Site>` 在所有连接之间共享，无需加锁。

use std::{
    fs,
    path::{Path, PathBuf},
};

use log::info;

use crate::{
    config::Config,
    exception::StartupError,
    filter::FilterSet,
    markdown::{CommonMark, Renderer},
    template::Templates,
};

pub struct Site {
    root: PathBuf,
    filters: FilterSet,
    templates: Templates,
    renderer: Box<dyn Renderer>,
}

impl Site {
    /// `root` 会被规范化为不含符号链接的绝对路径。
    pub fn new(
        root: impl AsRef<Path>,
        filters: FilterSet,
        templates: Templates,
        renderer: Box<dyn Renderer>,
    ) -> Result<Self, StartupError> {
        let root = root.as_ref();
        let root = fs::canonicalize(root).map_err(|e| {
            StartupError::Io(format!("couldn't resolve document root {}", root.display()), e)
        })?;
        Ok(Self {
            root,
            filters,
            templates,
            renderer,
        })
    }

    /// 按配置装配。模板与过滤规则在 chroot 之前加载，因为模板文件可能位于根目录之外。
    pub fn from_config(config: &Config) -> Result<Self, StartupError> {
        let templates = Templates::load(config.template(), config.error_template())?;
        let filters = FilterSet::compile(config.filters())?;

        let mut root = fs::canonicalize(config.root()).map_err(|e| {
            StartupError::Io(
                format!("couldn't resolve document root {}", config.root().display()),
                e,
            )
        })?;
        info!("Document root: {}", root.display());

        if config.chroot() {
            info!("`-> chroot() into document root");
            confine(&root)?;
            root = PathBuf::from("/");
        }

        Self::new(root, filters, templates, Box::new(CommonMark::new()))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn filters(&self) -> &FilterSet {
        &self.filters
    }

    pub fn templates(&self) -> &Templates {
        &self.templates
    }

    pub fn renderer(&self) -> &dyn Renderer {
        self.renderer.as_ref()
    }
}

#[cfg(unix)]
fn confine(root: &Path) -> Result<(), StartupError> {
    std::os::unix::fs::chroot(root)
        .map_err(|e| StartupError::Io(format!("chroot() into {} failed", root.display()), e))?;
    std::env::set_current_dir("/")
        .map_err(|e| StartupError::Io("couldn't change directory to /".to_string(), e))
}

#[cfg(not(unix))]
fn confine(_root: &Path) -> Result<(), StartupError> {
    Err(StartupError::Io(
        "chroot".to_string(),
        std::io::Error::from(std::io::ErrorKind::Unsupported),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_is_canonicalized() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("docs")).unwrap();
        let dotted = dir.path().join("docs/./../docs");

        let site = Site::new(
            &dotted,
            FilterSet::default(),
            Templates::builtin().unwrap(),
            Box::new(CommonMark::new()),
        )
        .unwrap();
        assert_eq!(site.root(), fs::canonicalize(dir.path().join("docs")).unwrap());
        assert!(site.root().is_absolute());
    }

    #[test]
    fn test_missing_root() {
        let result = Site::new(
            "/nonexistent/document/root",
            FilterSet::default(),
            Templates::builtin().unwrap(),
            Box::new(CommonMark::new()),
        );
        assert!(matches!(result, Err(StartupError::Io(..))));
    }

    #[test]
    fn test_from_config() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::new();
        config.set_root(dir.path());
        config.add_filter("^private/");

        let site = Site::from_config(&config).unwrap();
        assert_eq!(site.filters().len(), 1);
        assert_eq!(site.root(), fs::canonicalize(dir.path()).unwrap());
    }

    #[test]
    fn test_from_config_bad_filter() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::new();
        config.set_root(dir.path());
        config.add_filter("[");
        assert!(matches!(
            Site::from_config(&config),
            Err(StartupError::Filter(_))
        ));
    }
}
