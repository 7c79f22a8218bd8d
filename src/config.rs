//! 运行时配置模块
//!
//! CSR 应用没有环境变量，部署方通过 index.html 的 meta 标签覆盖配置，
//! 读不到就用编译期默认值。

/// 这些是默认值，如果 index.html 中没有对应的 meta 标签，则使用这些值
const DEFAULT_API_BASE: &str = "/api";

/// 待支付角标的轮询间隔（毫秒）
pub const PENDING_POLL_MILLIS: u32 = 30_000;

/// meta 标签名
const META_API_BASE: &str = "courtside-api-base";

/// 运行时配置结构体
/// 启动时读取一次，此后只读
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// 后端 API 根地址，不带结尾斜杠
    pub api_base: String,
}

impl AppConfig {
    /// 从页面 meta 标签加载配置
    pub fn load() -> Self {
        Self {
            api_base: read_meta(META_API_BASE)
                .filter(|v| !v.trim().is_empty())
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
        }
    }
}

/// 读取 `<meta name="..." content="...">` 的 content
fn read_meta(name: &str) -> Option<String> {
    let document = web_sys::window()?.document()?;
    let selector = format!("meta[name='{}']", name);
    let element = document.query_selector(&selector).ok()??;
    element.get_attribute("content")
}
