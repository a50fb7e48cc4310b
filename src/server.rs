// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 连接处理
//!
//! 主循环接收 TCP 连接，每个连接交给独立的 Tokio 任务。
//! 每个连接只处理一个请求，响应带 `Connection: close`。

use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use log::{debug, error, info};
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::{TcpListener, TcpStream},
    task, time,
};

use crate::{
    exception::{Exception, RequestError},
    param::MAX_REQUEST_HEAD,
    request::Request,
    response::Response,
    router::{error_response, respond},
    site::Site,
};

/// 发送响应后等待客户端关闭连接的最长时间
const LINGER: Duration = Duration::from_secs(2);

/// 主事件循环：持续接收新连接并分发到 Tokio 线程池。
pub async fn run(listener: TcpListener, site: Arc<Site>) {
    let mut id: u128 = 0;
    loop {
        let (mut stream, addr) = match listener.accept().await {
            Ok(conn) => conn,
            Err(e) => {
                error!("接受连接失败：{}", e);
                continue;
            }
        };
        debug!("[ID{}]新的连接：{}", id, addr);

        let site = Arc::clone(&site);
        tokio::spawn(async move {
            handle_connection(&mut stream, id, site).await;
        });
        id += 1;
    }
}

/// 读取请求头部，直到遇到空行、对端关闭或超出长度限制。
async fn read_head(stream: &mut TcpStream) -> std::io::Result<Option<Vec<u8>>> {
    let mut buffer = Vec::with_capacity(1024);
    let mut chunk = [0u8; 1024];
    loop {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            return Ok(if buffer.is_empty() { None } else { Some(buffer) });
        }
        buffer.extend_from_slice(&chunk[..n]);
        if buffer.windows(4).any(|w| w == b"\r\n\r\n") || buffer.len() > MAX_REQUEST_HEAD {
            return Ok(Some(buffer));
        }
    }
}

/// # 连接处理器
///
/// 读取并解析请求，执行路由，发送响应。
async fn handle_connection(stream: &mut TcpStream, id: u128, site: Arc<Site>) {
    let buffer = match read_head(stream).await {
        Ok(Some(buffer)) => buffer,
        Ok(None) => return, // 客户端主动关闭连接
        Err(e) => {
            error!("[ID{}]读取TCPStream时遇到错误: {}", id, e);
            return;
        }
    };
    debug!("[ID{}]HTTP请求接收完毕", id);
    let start_time = Instant::now();

    if buffer.len() > MAX_REQUEST_HEAD {
        let err = RequestError::new(
            Exception::MalformedRequest,
            format!("request head longer than {} bytes", MAX_REQUEST_HEAD),
        );
        let response = error_response(&site, "", &err, id);
        write_response(stream, &response, id).await;
        return;
    }

    let request = match Request::try_from(&buffer, id) {
        Ok(req) => req,
        Err(kind) => {
            let response = error_response(&site, "", &RequestError::from(kind), id);
            write_response(stream, &response, id).await;
            return;
        }
    };
    debug!("[ID{}]成功解析HTTP请求", id);

    // 路径解析与文件读取都是阻塞 I/O，放到专用线程池执行
    let response = {
        let shared = Arc::clone(&site);
        let owned = request.clone();
        match task::spawn_blocking(move || respond(&shared, &owned, id)).await {
            Ok(response) => response,
            Err(e) => {
                let err = RequestError::new(Exception::InternalError, format!("handler failed: {}", e));
                error_response(&site, request.path(), &err, id)
            }
        }
    };

    debug!(
        "[ID{}]HTTP响应构建完成，服务端用时{}ms。",
        id,
        start_time.elapsed().as_millis()
    );
    info!(
        "[ID{}] {}, {}, {}, {}, {}, {}, {}",
        id,
        request.version(),
        request.method(),
        request.host().unwrap_or("-"),
        request.target(),
        response.status_code(),
        response.information(),
        request.user_agent(),
    );

    write_response(stream, &response, id).await;
}

async fn write_response(stream: &mut TcpStream, response: &Response, id: u128) {
    let bytes = response.as_bytes();
    debug!("[ID{}]发送响应，长度: {}", id, bytes.len());
    if let Err(e) = stream.write_all(&bytes).await {
        error!("[ID{}]发送响应失败: {}", id, e);
        return;
    }
    let _ = stream.flush().await;
    let _ = stream.shutdown().await;

    // 关闭前读掉客户端尚未发送完的数据，否则内核会以 RST 结束连接，客户端可能收不到响应
    let mut scratch = [0u8; 1024];
    let _ = time::timeout(LINGER, async {
        while let Ok(n) = stream.read(&mut scratch).await {
            if n == 0 {
                break;
            }
        }
    })
    .await;
}
