//! 支付凭证上传模块
//!
//! 凭证页只对"待支付"状态的订单有效：已提交、已过期、已取消的订单
//! 一律跳走，防止重复上传。文件大小在客户端先卡一道，超限不发请求。

use crate::api::ApiClient;
use crate::error::{ApiError, ApiResult};
use crate::models::{Booking, PaymentStatus};
use crate::web::{HttpClient, UploadFile};

/// 凭证图片的大小上限
pub const MAX_PROOF_BYTES: u64 = 2 * 1024 * 1024;

/// 客户端侧的文件校验，超限时不允许发起网络请求
pub fn validate_proof_size(file: &UploadFile) -> ApiResult<()> {
    if file.size() > MAX_PROOF_BYTES {
        return Err(ApiError::validation("凭证图片不能超过 2MB"));
    }
    Ok(())
}

/// 按订单号加载后的判定结果
#[derive(Debug, Clone)]
pub enum ProofTarget {
    /// 待支付，允许上传
    Ready(Booking),
    /// 状态已经不是待支付，页面应当跳走
    Redirect(Booking),
}

/// 凭证页的流程逻辑，泛型于 HTTP 适配器以便原生测试
pub struct ProofUploadLogic<C> {
    api: ApiClient<C>,
}

impl<C: HttpClient> ProofUploadLogic<C> {
    pub fn new(api: ApiClient<C>) -> Self {
        Self { api }
    }

    /// 从我的订单里按订单号找出目标订单
    ///
    /// 后端没有单独的按号查询接口，列表量级是个位数到两位数，
    /// 客户端过滤足够。
    pub async fn load_booking(&self, code: &str) -> ApiResult<ProofTarget> {
        let bookings = self.api.my_bookings().await?;
        let Some(booking) = bookings.into_iter().find(|b| b.booking_code == code) else {
            return Err(ApiError::not_found(format!("订单 {} 不存在", code)));
        };

        if booking.payment_status == PaymentStatus::Unpaid {
            Ok(ProofTarget::Ready(booking))
        } else {
            Ok(ProofTarget::Redirect(booking))
        }
    }

    /// 校验并上传凭证
    ///
    /// 一次点击只发一次请求，in-flight 期间的禁用由组件层负责。
    pub async fn upload(&self, code: &str, file: UploadFile) -> ApiResult<()> {
        validate_proof_size(&file)?;
        self.api.upload_payment_proof(code, file).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiErrorKind;
    use crate::web::http::tests::MockHttpClient;
    use serde_json::json;
    use std::rc::Rc;

    fn logic(mock: Rc<MockHttpClient>) -> ProofUploadLogic<Rc<MockHttpClient>> {
        ProofUploadLogic::new(ApiClient::new(mock, "http://api.test").with_token(Some("tok".into())))
    }

    fn image(len: usize) -> UploadFile {
        UploadFile::Bytes {
            name: "bukti.jpg".to_string(),
            mime: "image/jpeg".to_string(),
            bytes: vec![0u8; len],
        }
    }

    fn bookings_json() -> serde_json::Value {
        json!({"data": [
            {"id": 1, "booking_code": "BK-1", "total_amount": 200_000,
             "payment_status": "unpaid"},
            {"id": 2, "booking_code": "BK-2", "total_amount": 100_000,
             "payment_status": "pending"},
        ]})
    }

    #[tokio::test]
    async fn test_oversized_file_never_reaches_network() {
        let mock = Rc::new(MockHttpClient::new());
        let logic = logic(mock.clone());

        let err = logic
            .upload("BK-1", image(MAX_PROOF_BYTES as usize + 1))
            .await
            .unwrap_err();

        assert_eq!(err.kind, ApiErrorKind::Validation);
        // 超限文件：一个请求都不许发
        assert_eq!(mock.request_count(), 0);
    }

    #[tokio::test]
    async fn test_exact_limit_is_allowed() {
        let mock = Rc::new(MockHttpClient::new());
        mock.mock_response(
            "http://api.test/user/bookings/BK-1/payment-proof",
            200,
            json!({"message": "uploaded"}),
        );
        let logic = logic(mock.clone());

        logic
            .upload("BK-1", image(MAX_PROOF_BYTES as usize))
            .await
            .unwrap();
        assert_eq!(mock.request_count(), 1);
    }

    #[tokio::test]
    async fn test_load_booking_finds_by_code() {
        let mock = Rc::new(MockHttpClient::new());
        mock.mock_response("http://api.test/user/bookings/my", 200, bookings_json());

        match logic(mock).load_booking("BK-1").await.unwrap() {
            ProofTarget::Ready(b) => assert_eq!(b.booking_code, "BK-1"),
            other => panic!("expected Ready, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_load_booking_unknown_code_is_not_found() {
        let mock = Rc::new(MockHttpClient::new());
        mock.mock_response("http://api.test/user/bookings/my", 200, bookings_json());

        let err = logic(mock).load_booking("BK-404").await.unwrap_err();
        assert_eq!(err.kind, ApiErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_load_booking_already_submitted_redirects() {
        let mock = Rc::new(MockHttpClient::new());
        mock.mock_response("http://api.test/user/bookings/my", 200, bookings_json());

        // BK-2 已经在等管理员确认，不能再传
        match logic(mock).load_booking("BK-2").await.unwrap() {
            ProofTarget::Redirect(b) => assert_eq!(b.payment_status, PaymentStatus::Pending),
            other => panic!("expected Redirect, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_upload_failure_is_surfaced() {
        let mock = Rc::new(MockHttpClient::new());
        mock.mock_response(
            "http://api.test/user/bookings/BK-1/payment-proof",
            422,
            json!({"message": "The payment proof must be an image.",
                   "errors": {"payment_proof": ["The payment proof must be an image."]}}),
        );

        let err = logic(mock)
            .upload("BK-1", image(1024))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ApiErrorKind::Validation);
        assert_eq!(err.message, "The payment proof must be an image.");
    }
}
