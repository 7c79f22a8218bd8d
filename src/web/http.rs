//! HTTP 请求封装模块
//!
//! 基于 `web_sys::fetch` 的轻量封装，并以 `HttpClient` trait 隔离浏览器环境，
//! 让上层逻辑可以在原生测试里用 Mock 客户端跑通。

use std::collections::HashMap;
use std::rc::Rc;

use serde::de::DeserializeOwned;

use crate::error::{ApiError, ApiResult};

#[cfg(test)]
use std::cell::RefCell;

// =========================================================
// 核心抽象层 (HTTP Interface Abstraction)
// =========================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

/// 上传的文件：真实实现是浏览器的 File 句柄，
/// 测试走内存字节，二者对上层呈现同样的名字/大小接口
#[derive(Clone)]
pub enum UploadFile {
    /// `<input type="file">` 选出的文件
    Handle(web_sys::File),
    /// 内存中构造的文件（原生测试用，不触碰浏览器 API）
    Bytes {
        name: String,
        mime: String,
        bytes: Vec<u8>,
    },
}

impl UploadFile {
    pub fn name(&self) -> String {
        match self {
            UploadFile::Handle(f) => f.name(),
            UploadFile::Bytes { name, .. } => name.clone(),
        }
    }

    pub fn size(&self) -> u64 {
        match self {
            UploadFile::Handle(f) => f.size() as u64,
            UploadFile::Bytes { bytes, .. } => bytes.len() as u64,
        }
    }
}

/// 请求体：JSON 或 multipart 表单（上传凭证用）
#[derive(Clone)]
pub enum HttpBody {
    Json(String),
    Multipart { field: String, file: UploadFile },
}

#[derive(Clone)]
pub struct HttpRequest {
    pub url: String,
    pub method: HttpMethod,
    pub headers: HashMap<String, String>,
    pub body: Option<HttpBody>,
}

impl HttpRequest {
    pub fn new(url: &str, method: HttpMethod) -> Self {
        Self {
            url: url.to_string(),
            method,
            headers: HashMap::new(),
            body: None,
        }
    }

    pub fn with_header(mut self, key: &str, value: &str) -> Self {
        self.headers.insert(key.to_string(), value.to_string());
        self
    }

    /// JSON 请求体，同时带上 Content-Type
    pub fn with_json(mut self, body: serde_json::Value) -> Self {
        self.headers
            .insert("Content-Type".to_string(), "application/json".to_string());
        self.body = Some(HttpBody::Json(body.to_string()));
        self
    }

    /// multipart 表单体
    /// Content-Type 交给浏览器生成（需要它自动补 boundary）
    pub fn with_file(mut self, field: &str, file: UploadFile) -> Self {
        self.body = Some(HttpBody::Multipart {
            field: field.to_string(),
            file,
        });
        self
    }
}

#[derive(Debug)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    /// 响应是否成功 (2xx)
    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn json<T: DeserializeOwned>(&self) -> ApiResult<T> {
        serde_json::from_str(&self.body)
            .map_err(|e| ApiError::unknown(format!("响应解析失败: {}", e)))
    }
}

#[async_trait::async_trait(?Send)]
pub trait HttpClient {
    async fn send(&self, req: HttpRequest) -> ApiResult<HttpResponse>;
}

/// 允许多个持有方共享同一个客户端
#[async_trait::async_trait(?Send)]
impl<C: HttpClient> HttpClient for Rc<C> {
    async fn send(&self, req: HttpRequest) -> ApiResult<HttpResponse> {
        (**self).send(req).await
    }
}

// =========================================================
// 实现层: 浏览器 fetch 客户端
// =========================================================

#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserHttpClient;

#[async_trait::async_trait(?Send)]
impl HttpClient for BrowserHttpClient {
    async fn send(&self, req: HttpRequest) -> ApiResult<HttpResponse> {
        use wasm_bindgen::{JsCast, JsValue};
        use wasm_bindgen_futures::JsFuture;
        use web_sys::{Headers, Request, RequestInit, Response};

        let headers = Headers::new()
            .map_err(|e| ApiError::network(format!("创建 Headers 失败: {:?}", e)))?;
        for (key, value) in &req.headers {
            headers
                .set(key, value)
                .map_err(|e| ApiError::network(format!("设置 Header 失败: {:?}", e)))?;
        }

        let opts = RequestInit::new();
        opts.set_method(req.method.as_str());
        opts.set_headers(&headers.into());

        match &req.body {
            Some(HttpBody::Json(body)) => {
                opts.set_body(&JsValue::from_str(body));
            }
            Some(HttpBody::Multipart { field, file }) => {
                let form = build_form_data(field, file)?;
                opts.set_body(form.as_ref());
            }
            None => {}
        }

        let request = Request::new_with_str_and_init(&req.url, &opts)
            .map_err(|e| ApiError::network(format!("请求构建失败: {:?}", e)))?;

        let window = web_sys::window().ok_or_else(|| ApiError::network("无法获取 window 对象"))?;

        // fetch 被拒绝意味着请求根本没到服务器（断网 / CORS / DNS）
        let resp_value = JsFuture::from(window.fetch_with_request(&request))
            .await
            .map_err(|e| ApiError::network(format!("{:?}", e)))?;

        let response: Response = resp_value
            .dyn_into()
            .map_err(|e| ApiError::unknown(format!("Response 类型转换失败: {:?}", e)))?;
        let status = response.status();

        let promise = response
            .text()
            .map_err(|e| ApiError::unknown(format!("读取响应失败: {:?}", e)))?;
        let text = JsFuture::from(promise)
            .await
            .map_err(|e| ApiError::unknown(format!("读取响应失败: {:?}", e)))?;

        Ok(HttpResponse {
            status,
            body: text.as_string().unwrap_or_default(),
        })
    }
}

/// 把上传文件装进 FormData
fn build_form_data(field: &str, file: &UploadFile) -> ApiResult<web_sys::FormData> {
    let form = web_sys::FormData::new()
        .map_err(|e| ApiError::network(format!("创建 FormData 失败: {:?}", e)))?;

    match file {
        UploadFile::Handle(f) => {
            form.append_with_blob_and_filename(field, f, &f.name())
                .map_err(|e| ApiError::network(format!("附加文件失败: {:?}", e)))?;
        }
        UploadFile::Bytes { name, mime, bytes } => {
            let array = js_sys::Uint8Array::from(bytes.as_slice());
            let parts = js_sys::Array::new();
            parts.push(&array.buffer());
            let options = web_sys::BlobPropertyBag::new();
            options.set_type(mime);
            let blob = web_sys::Blob::new_with_u8_array_sequence_and_options(&parts, &options)
                .map_err(|e| ApiError::network(format!("创建 Blob 失败: {:?}", e)))?;
            form.append_with_blob_and_filename(field, &blob, name)
                .map_err(|e| ApiError::network(format!("附加文件失败: {:?}", e)))?;
        }
    }

    Ok(form)
}

// =========================================================
// 测试工具: MockHttpClient
// =========================================================

#[cfg(test)]
pub mod tests {
    use super::*;

    pub struct MockHttpClient {
        // (URL, (Status, Response Body))
        responses: RefCell<HashMap<String, (u16, String)>>,
        // 记录发出的请求 (URL, Method, Headers, Body 摘要)
        pub requests: RefCell<Vec<(String, String, HashMap<String, String>, Option<String>)>>,
    }

    impl MockHttpClient {
        pub fn new() -> Self {
            Self {
                responses: RefCell::new(HashMap::new()),
                requests: RefCell::new(Vec::new()),
            }
        }

        pub fn mock_response(&self, url: &str, status: u16, body: serde_json::Value) {
            self.responses
                .borrow_mut()
                .insert(url.to_string(), (status, body.to_string()));
        }

        /// fetch 层面直接失败（模拟断网）
        pub fn mock_network_failure(&self, url: &str) {
            // status 0 作为内部标记
            self.responses
                .borrow_mut()
                .insert(url.to_string(), (0, String::new()));
        }

        pub fn request_count(&self) -> usize {
            self.requests.borrow().len()
        }
    }

    #[async_trait::async_trait(?Send)]
    impl HttpClient for MockHttpClient {
        async fn send(&self, req: HttpRequest) -> ApiResult<HttpResponse> {
            let body_digest = match &req.body {
                Some(HttpBody::Json(s)) => Some(s.clone()),
                Some(HttpBody::Multipart { field, file }) => {
                    Some(format!("multipart:{}:{}", field, file.name()))
                }
                None => None,
            };
            self.requests.borrow_mut().push((
                req.url.clone(),
                req.method.as_str().to_string(),
                req.headers.clone(),
                body_digest,
            ));

            let responses = self.responses.borrow();
            match responses.get(&req.url) {
                Some((0, _)) => Err(ApiError::network("connection refused")),
                Some((status, body)) => Ok(HttpResponse {
                    status: *status,
                    body: body.clone(),
                }),
                None => Ok(HttpResponse {
                    status: 404,
                    body: "Not Found".to_string(),
                }),
            }
        }
    }

    #[tokio::test]
    async fn test_mock_client_records_requests() {
        let client = MockHttpClient::new();
        client.mock_response("/ping", 200, serde_json::json!({"ok": true}));

        let resp = client
            .send(HttpRequest::new("/ping", HttpMethod::Get).with_header("Authorization", "Bearer t"))
            .await
            .unwrap();
        assert_eq!(resp.status, 200);
        assert!(resp.ok());

        let requests = client.requests.borrow();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].0, "/ping");
        assert_eq!(requests[0].1, "GET");
        assert_eq!(requests[0].2.get("Authorization").unwrap(), "Bearer t");
    }

    #[tokio::test]
    async fn test_mock_client_defaults_to_404() {
        let client = MockHttpClient::new();
        let resp = client
            .send(HttpRequest::new("/missing", HttpMethod::Get))
            .await
            .unwrap();
        assert_eq!(resp.status, 404);
        assert!(!resp.ok());
    }

    #[tokio::test]
    async fn test_mock_network_failure_is_network_kind() {
        let client = MockHttpClient::new();
        client.mock_network_failure("/down");
        let err = client
            .send(HttpRequest::new("/down", HttpMethod::Get))
            .await
            .unwrap_err();
        assert!(matches!(err.kind, crate::error::ApiErrorKind::Network));
    }
}
