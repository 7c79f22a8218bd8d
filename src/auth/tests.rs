use super::*;
use crate::error::ApiErrorKind;
use crate::models::Role;
use crate::web::http::tests::MockHttpClient;
use crate::web::storage::tests::MemoryStore;
use serde_json::json;
use std::rc::Rc;

// =========================================================
// 辅助函数
// =========================================================

const BASE: &str = "http://backend.test/api";

fn sample_user_json() -> serde_json::Value {
    json!({"id": 1, "name": "Budi", "email": "budi@mail.com", "role": "user"})
}

/// 模拟上一次会话留下的持久化内容
fn persisted_json(token: &str) -> String {
    json!({"token": token, "user": sample_user_json()}).to_string()
}

fn create_logic(
    storage: MemoryStore,
    client: Rc<MockHttpClient>,
) -> SessionLogic<MemoryStore, Rc<MockHttpClient>> {
    SessionLogic::new(storage, client, BASE)
}

fn saved_session(logic: &SessionLogic<MemoryStore, Rc<MockHttpClient>>) -> PersistedSession {
    let raw = logic.storage.get(SESSION_STORE_KEY).unwrap();
    serde_json::from_str(&raw).unwrap()
}

// =========================================================
// rehydrate 测试
// =========================================================

#[test]
fn test_rehydrate_empty_storage() {
    let logic = create_logic(MemoryStore::new(), Rc::new(MockHttpClient::new()));

    let (token, user) = logic.rehydrate();
    assert!(token.is_none());
    assert!(user.is_none());
}

#[test]
fn test_rehydrate_restores_session() {
    let store = MemoryStore::new().with_entry(SESSION_STORE_KEY, &persisted_json("tok-1"));
    let logic = create_logic(store, Rc::new(MockHttpClient::new()));

    let (token, user) = logic.rehydrate();
    assert_eq!(token.as_deref(), Some("tok-1"));
    assert_eq!(user.unwrap().name, "Budi");
}

#[test]
fn test_rehydrate_clears_corrupt_payload() {
    let store = MemoryStore::new().with_entry(SESSION_STORE_KEY, "not-json{");
    let logic = create_logic(store, Rc::new(MockHttpClient::new()));

    let (token, user) = logic.rehydrate();
    assert!(token.is_none());
    assert!(user.is_none());
    // 解析不出来的脏数据顺手清掉
    assert_eq!(logic.storage.get(SESSION_STORE_KEY), None);
}

// =========================================================
// login / register 测试
// =========================================================

#[tokio::test]
async fn test_login_persists_session() {
    let client = Rc::new(MockHttpClient::new());
    client.mock_response(
        "http://backend.test/api/login",
        200,
        json!({"message": "ok", "data": {"token": "tok-9", "user": sample_user_json()}}),
    );
    let logic = create_logic(MemoryStore::new(), client);

    let payload = logic.login("budi@mail.com", "rahasia1").await.unwrap();
    assert_eq!(payload.token, "tok-9");

    let saved = saved_session(&logic);
    assert_eq!(saved.token, "tok-9");
    assert_eq!(saved.user.email, "budi@mail.com");
}

#[tokio::test]
async fn test_login_failure_writes_nothing() {
    let client = Rc::new(MockHttpClient::new());
    client.mock_response(
        "http://backend.test/api/login",
        401,
        json!({"message": "Invalid credentials"}),
    );
    let logic = create_logic(MemoryStore::new(), client);

    let err = logic.login("budi@mail.com", "salah").await.unwrap_err();
    assert_eq!(err.kind, ApiErrorKind::Auth);
    assert_eq!(logic.storage.get(SESSION_STORE_KEY), None);
}

#[tokio::test]
async fn test_register_does_not_create_session() {
    let client = Rc::new(MockHttpClient::new());
    client.mock_response(
        "http://backend.test/api/register",
        201,
        json!({"message": "registered", "data": sample_user_json()}),
    );
    let logic = create_logic(MemoryStore::new(), client);

    let payload = RegisterRequest {
        name: "Budi".to_string(),
        email: "budi@mail.com".to_string(),
        password: "rahasia1".to_string(),
        password_confirmation: "rahasia1".to_string(),
    };
    let user = logic.register(&payload).await.unwrap();
    assert_eq!(user.role, Role::User);

    // 注册成功也不算登录
    assert_eq!(logic.storage.get(SESSION_STORE_KEY), None);
}

// =========================================================
// fetch_me 测试
// =========================================================

#[tokio::test]
async fn test_fetch_me_refreshes_persisted_user() {
    let client = Rc::new(MockHttpClient::new());
    client.mock_response(
        "http://backend.test/api/me",
        200,
        json!({"data": {"id": 1, "name": "Budi Santoso",
                "email": "budi@mail.com", "role": "user"}}),
    );
    let store = MemoryStore::new().with_entry(SESSION_STORE_KEY, &persisted_json("tok-1"));
    let logic = create_logic(store, client.clone());

    let user = logic.fetch_me("tok-1").await.unwrap();
    assert_eq!(user.name, "Budi Santoso");

    // 刷新结果落盘，token 不变
    let saved = saved_session(&logic);
    assert_eq!(saved.token, "tok-1");
    assert_eq!(saved.user.name, "Budi Santoso");

    // 请求带上了 Bearer token
    let requests = client.requests.borrow();
    assert_eq!(
        requests[0].2.get("Authorization").map(String::as_str),
        Some("Bearer tok-1")
    );
}

#[tokio::test]
async fn test_fetch_me_unauthorized_wipes_storage() {
    let client = Rc::new(MockHttpClient::new());
    client.mock_response(
        "http://backend.test/api/me",
        401,
        json!({"message": "Unauthenticated."}),
    );
    let store = MemoryStore::new().with_entry(SESSION_STORE_KEY, &persisted_json("expired"));
    let logic = create_logic(store, client);

    let err = logic.fetch_me("expired").await.unwrap_err();
    assert_eq!(err.kind, ApiErrorKind::Auth);
    // 凭证失效后持久化会话必须消失
    assert_eq!(logic.storage.get(SESSION_STORE_KEY), None);
}

#[tokio::test]
async fn test_fetch_me_network_failure_keeps_storage() {
    let client = Rc::new(MockHttpClient::new());
    client.mock_network_failure("http://backend.test/api/me");
    let store = MemoryStore::new().with_entry(SESSION_STORE_KEY, &persisted_json("tok-1"));
    let logic = create_logic(store, client);

    let err = logic.fetch_me("tok-1").await.unwrap_err();
    assert_eq!(err.kind, ApiErrorKind::Network);
    // 网络抖动不把人登出
    assert!(logic.storage.get(SESSION_STORE_KEY).is_some());
}

// =========================================================
// update_profile / logout 测试
// =========================================================

#[tokio::test]
async fn test_update_profile_persists_new_name() {
    let client = Rc::new(MockHttpClient::new());
    client.mock_response(
        "http://backend.test/api/me",
        200,
        json!({"message": "updated", "data": {"id": 1, "name": "Budi S.",
                "email": "budi@mail.com", "role": "user"}}),
    );
    let store = MemoryStore::new().with_entry(SESSION_STORE_KEY, &persisted_json("tok-1"));
    let logic = create_logic(store, client.clone());

    let payload = UpdateProfileRequest {
        name: "Budi S.".to_string(),
        email: "budi@mail.com".to_string(),
    };
    let user = logic.update_profile("tok-1", &payload).await.unwrap();
    assert_eq!(user.name, "Budi S.");
    assert_eq!(saved_session(&logic).user.name, "Budi S.");

    let requests = client.requests.borrow();
    assert_eq!(requests[0].1, "PUT");
}

#[test]
fn test_logout_clears_storage_without_network() {
    let client = Rc::new(MockHttpClient::new());
    let store = MemoryStore::new().with_entry(SESSION_STORE_KEY, &persisted_json("tok-1"));
    let logic = create_logic(store, client.clone());

    logic.logout();

    assert_eq!(logic.storage.get(SESSION_STORE_KEY), None);
    // 登出是纯本地操作
    assert_eq!(client.request_count(), 0);
}
