// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! 配置加载。
//!
//! 配置来源有两层：TOML 配置文件提供基础值，命令行参数覆盖其中的同名项。

use std::{
    fs,
    path::{Path, PathBuf},
};

use clap::Parser;
use log::{info, warn};
use serde_derive::{Deserialize, Serialize};

use crate::{
    exception::StartupError,
    param::{DEFAULT_CONFIG, DEFAULT_LOG_CONFIG},
};

/// 命令行参数
#[derive(Parser, Debug, Default)]
#[command(name = "docserver", version, about = "Simple webserver for serving markdown files")]
pub struct Args {
    /// TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Root directory to serve files from
    #[arg(long)]
    pub root: Option<PathBuf>,

    /// addr:port to listen on
    #[arg(long)]
    pub addr: Option<String>,

    /// chroot() to the document root upon starting
    #[arg(long)]
    pub chroot: bool,

    /// Regular expression for request filtering; requests resolving to a matching file will 404
    #[arg(long = "filter")]
    pub filters: Vec<String>,

    /// Template for rendering Markdown pages (variables: Title, Markup)
    #[arg(long)]
    pub template: Option<PathBuf>,

    /// Template for rendering error pages (variables: Url, Code, Msg)
    #[arg(long)]
    pub error_template: Option<PathBuf>,

    /// Number of runtime worker threads, 0 means one per CPU
    #[arg(long)]
    pub worker_threads: Option<usize>,

    /// log4rs configuration file
    #[arg(long, default_value = DEFAULT_LOG_CONFIG)]
    pub log_config: PathBuf,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Config {
    #[serde(default = "default_root")]
    root: PathBuf,
    #[serde(default = "default_addr")]
    addr: String,
    #[serde(default)]
    chroot: bool,
    #[serde(default)]
    filters: Vec<String>,
    #[serde(default)]
    template: Option<PathBuf>,
    #[serde(default)]
    error_template: Option<PathBuf>,
    #[serde(default)]
    worker_threads: usize,
}

fn default_root() -> PathBuf {
    PathBuf::from(".")
}

fn default_addr() -> String {
    "0.0.0.0:8000".to_string()
}

impl Config {
    pub fn new() -> Self {
        Self {
            root: default_root(),
            addr: default_addr(),
            chroot: false,
            filters: Vec::new(),
            template: None,
            error_template: None,
            worker_threads: 0,
        }
    }

    pub fn from_toml(filename: &Path) -> Result<Self, StartupError> {
        let content = fs::read_to_string(filename).map_err(|e| {
            StartupError::Io(format!("couldn't read config {}", filename.display()), e)
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, StartupError> {
        let mut config: Config = toml::from_str(content)?;
        config.normalize();
        Ok(config)
    }

    /// 合并命令行参数与配置文件。
    ///
    /// 显式给出的 `--config` 必须存在；否则尝试默认位置，默认位置也没有时使用内置默认值。
    pub fn load(args: &Args) -> Result<Self, StartupError> {
        let mut config = match &args.config {
            Some(path) => Self::from_toml(path)?,
            None if Path::new(DEFAULT_CONFIG).exists() => Self::from_toml(Path::new(DEFAULT_CONFIG))?,
            None => {
                info!("未找到配置文件，使用默认配置");
                Self::new()
            }
        };
        config.apply(args);
        Ok(config)
    }

    fn apply(&mut self, args: &Args) {
        if let Some(root) = &args.root {
            self.root = root.clone();
        }
        if let Some(addr) = &args.addr {
            self.addr = addr.clone();
        }
        if args.chroot {
            self.chroot = true;
        }
        self.filters.extend(args.filters.iter().cloned());
        if let Some(template) = &args.template {
            self.template = Some(template.clone());
        }
        if let Some(template) = &args.error_template {
            self.error_template = Some(template.clone());
        }
        if let Some(n) = args.worker_threads {
            self.worker_threads = n;
        }
        self.normalize();
    }

    fn normalize(&mut self) {
        if self.worker_threads == 0 {
            self.worker_threads = num_cpus::get();
        }
        // 省略主机的 ":8000" 写法监听全部地址
        if self.addr.starts_with(':') {
            warn!("addr {} 未指定主机，监听 0.0.0.0", self.addr);
            self.addr = format!("0.0.0.0{}", self.addr);
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn addr(&self) -> &str {
        &self.addr
    }

    pub fn chroot(&self) -> bool {
        self.chroot
    }

    pub fn filters(&self) -> &[String] {
        &self.filters
    }

    pub fn template(&self) -> Option<&Path> {
        self.template.as_deref()
    }

    pub fn error_template(&self) -> Option<&Path> {
        self.error_template.as_deref()
    }

    pub fn worker_threads(&self) -> usize {
        self.worker_threads
    }

    pub fn set_root(&mut self, root: impl Into<PathBuf>) {
        self.root = root.into();
    }

    pub fn add_filter(&mut self, pattern: impl Into<String>) {
        self.filters.push(pattern.into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::new();
        assert_eq!(config.root(), Path::new("."));
        assert_eq!(config.addr(), "0.0.0.0:8000");
        assert!(!config.chroot());
        assert!(config.filters().is_empty());
        assert!(config.template().is_none());
    }

    #[test]
    fn test_from_toml_str() {
        let config = Config::from_toml_str(
            r#"
            root = "/srv/docs"
            addr = "127.0.0.1:9000"
            chroot = true
            filters = ["^\\.git/", "bar"]
            template = "templates/page.html"
            worker_threads = 2
            "#,
        )
        .unwrap();

        assert_eq!(config.root(), Path::new("/srv/docs"));
        assert_eq!(config.addr(), "127.0.0.1:9000");
        assert!(config.chroot());
        assert_eq!(config.filters(), ["^\\.git/", "bar"]);
        assert_eq!(config.template(), Some(Path::new("templates/page.html")));
        assert!(config.error_template().is_none());
        assert_eq!(config.worker_threads(), 2);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = Config::from_toml_str("root = \"docs\"").unwrap();
        assert_eq!(config.addr(), "0.0.0.0:8000");
        assert_eq!(config.worker_threads(), num_cpus::get());
    }

    #[test]
    fn test_go_style_addr() {
        let config = Config::from_toml_str("addr = \":8080\"").unwrap();
        assert_eq!(config.addr(), "0.0.0.0:8080");
    }

    #[test]
    fn test_invalid_toml() {
        assert!(matches!(
            Config::from_toml_str("root = ["),
            Err(StartupError::Config(_))
        ));
    }

    #[test]
    fn test_missing_explicit_config() {
        let args = Args {
            config: Some(PathBuf::from("/nonexistent/docserver.toml")),
            ..Default::default()
        };
        assert!(matches!(Config::load(&args), Err(StartupError::Io(..))));
    }

    #[test]
    fn test_args_override_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("docserver.toml");
        fs::write(&file, "root = \"/srv/docs\"\nfilters = [\"bar\"]\n").unwrap();

        let args = Args::parse_from([
            "docserver",
            "--config",
            file.to_str().unwrap(),
            "--root",
            "/srv/other",
            "--filter",
            "^private/",
            "--chroot",
        ]);
        let config = Config::load(&args).unwrap();

        assert_eq!(config.root(), Path::new("/srv/other"));
        assert_eq!(config.filters(), ["bar", "^private/"]);
        assert!(config.chroot());
        assert_eq!(config.addr(), "0.0.0.0:8000");
    }

    #[test]
    fn test_args_defaults() {
        let args = Args::parse_from(["docserver"]);
        assert_eq!(args.log_config, PathBuf::from(DEFAULT_LOG_CONFIG));
        assert!(args.filters.is_empty());
        assert!(!args.chroot);
    }
}
