use once_cell::sync::OnceCell;
use reqwest::Client;
use std::time::Duration;

/// 全局复用的 HTTP Client（统一连接池/Keep-Alive），避免每次请求重复创建。
///
/// 不在 Client 上设置整体 timeout：上游超时由调用方按各自配置
/// 通过 `RequestBuilder::timeout` 逐请求指定。
static SHARED_CLIENT: OnceCell<Client> = OnceCell::new();

/// 共享 HTTP Client
pub fn shared_client() -> Result<&'static Client, reqwest::Error> {
    SHARED_CLIENT.get_or_try_init(|| {
        Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .build()
    })
}
