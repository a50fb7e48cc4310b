// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # Markdown 文档服务器
//!
//! 从文档根目录提供文件，`.md` 文件即时渲染为 HTML。
//! 核心功能包括：
//! - 符号链接跟随与根目录包含检查，阻止任何越出根目录的请求
//! - 基于正则表达式的请求过滤
//! - 目录索引（`index.md` / `README.md`）
//! - 可替换的页面模板与错误页模板
//! - 可选的 chroot 限制

use std::{path::Path, process, sync::Arc};

use clap::Parser;
use log::{error, info, LevelFilter};
use log4rs::{
    append::console::ConsoleAppender,
    config::{Appender, Config as LogConfig, Root},
    encode::pattern::PatternEncoder,
};
use tokio::{net::TcpListener, runtime::Builder};

use docserver::{server, Args, Config, Site, StartupError};

/// # 程序入口点
///
/// 初始化日志、加载配置、装配站点状态并启动主事件循环。
fn main() {
    let args = Args::parse();

    // 1. 初始化日志系统：优先使用外部 YAML 配置，缺失时退回控制台输出
    if let Err(e) = init_logging(&args.log_config) {
        eprintln!("{}", e);
        process::exit(1);
    }

    if let Err(e) = start(&args) {
        error!("{}", e);
        process::exit(1);
    }
}

fn start(args: &Args) -> Result<(), StartupError> {
    // 2. 配置加载：配置文件 + 命令行覆盖
    let config = Config::load(args)?;
    info!("配置文件已载入");

    // 3. 站点状态：模板、过滤规则、文档根目录（以及可选的 chroot）
    let site = Arc::new(Site::from_config(&config)?);

    // 4. 异步运行时：工作线程数由配置决定
    let runtime = Builder::new_multi_thread()
        .worker_threads(config.worker_threads())
        .enable_all()
        .build()
        .map_err(|e| StartupError::Io("couldn't start runtime".to_string(), e))?;

    runtime.block_on(async move {
        let listener = TcpListener::bind(config.addr())
            .await
            .map_err(|e| StartupError::Io(format!("couldn't bind {}", config.addr()), e))?;
        info!("Serving on '{}'", config.addr());
        server::run(listener, site).await;
        Ok::<(), StartupError>(())
    })
}

fn init_logging(path: &Path) -> Result<(), StartupError> {
    if path.exists() {
        return log4rs::init_file(path, Default::default())
            .map_err(|e| StartupError::Logging(e.to_string()));
    }

    let stdout = ConsoleAppender::builder()
        .encoder(Box::new(PatternEncoder::new(
            "{d(%Y-%m-%d %H:%M:%S)} {h({l})} {t} - {m}{n}",
        )))
        .build();
    let config = LogConfig::builder()
        .appender(Appender::builder().build("stdout", Box::new(stdout)))
        .build(Root::builder().appender("stdout").build(LevelFilter::Info))
        .map_err(|e| StartupError::Logging(e.to_string()))?;
    log4rs::init_config(config).map_err(|e| StartupError::Logging(e.to_string()))?;
    Ok(())
}
