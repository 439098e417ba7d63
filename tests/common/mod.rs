//! 集成测试共享工具：请求构造与日志捕获。
#![allow(dead_code)]

use axum::body::{Body, to_bytes};
use axum::http::Request;
use axum::response::Response;
use std::cell::RefCell;
use std::io;
use std::sync::{Arc, Mutex, Once};
use tracing_subscriber::fmt::MakeWriter;

/// 构造 GET 请求
pub fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("build request")
}

/// 构造 JSON POST 请求
pub fn post_json(uri: &str, body: &serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("build request")
}

/// 读取响应体并解析为 JSON
pub async fn body_json(resp: Response) -> serde_json::Value {
    let bytes = to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("parse json body")
}

/// 捕获 tracing 输出，便于断言诊断日志行。
#[derive(Clone, Default)]
pub struct LogCapture {
    buf: Arc<Mutex<Vec<u8>>>,
}

impl LogCapture {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.buf.lock().expect("log buffer")).into_owned()
    }

    /// 统计同时包含全部关键字的日志行数
    pub fn lines_with_all(&self, needles: &[&str]) -> usize {
        self.contents()
            .lines()
            .filter(|line| needles.iter().all(|needle| line.contains(needle)))
            .count()
    }
}

thread_local! {
    /// 当前线程的活动捕获缓冲区。每个测试线程独立，`spawn` 出的
    /// 装配任务与测试同线程，因此其日志写入同一缓冲区。
    static ACTIVE_BUF: RefCell<Option<Arc<Mutex<Vec<u8>>>>> = const { RefCell::new(None) };
}

/// 写入当前线程活动缓冲区；未设置时丢弃。
pub struct CaptureWriter;

impl io::Write for CaptureWriter {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        ACTIVE_BUF.with(|slot| {
            if let Some(buf) = slot.borrow().as_ref() {
                buf.lock().expect("log buffer").extend_from_slice(data);
            }
        });
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct ThreadLocalMakeWriter;

impl<'a> MakeWriter<'a> for ThreadLocalMakeWriter {
    type Writer = CaptureWriter;

    fn make_writer(&'a self) -> Self::Writer {
        CaptureWriter
    }
}

/// 捕获结束后清除本线程的活动缓冲区。
pub struct CaptureGuard;

impl Drop for CaptureGuard {
    fn drop(&mut self) {
        ACTIVE_BUF.with(|slot| *slot.borrow_mut() = None);
    }
}

static INIT: Once = Once::new();

/// 安装捕获 subscriber；guard 析构后停止向缓冲区写入。
///
/// 进程内仅安装一次全局 subscriber（稳定 callsite 兴趣缓存，避免并行
/// 测试下 thread-local subscriber 与全局兴趣缓存竞争导致漏采），其写入器
/// 按线程路由到各自缓冲区。配合默认的 current-thread 测试 runtime：
/// spawn 出的装配任务与测试代码同线程，写入同一缓冲区。
pub fn capture_logs() -> (LogCapture, CaptureGuard) {
    INIT.call_once(|| {
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_writer(ThreadLocalMakeWriter)
            .with_ansi(false)
            .finish();
        let _ = tracing::subscriber::set_global_default(subscriber);
    });
    let capture = LogCapture::default();
    ACTIVE_BUF.with(|slot| *slot.borrow_mut() = Some(capture.buf.clone()));
    (capture, CaptureGuard)
}
