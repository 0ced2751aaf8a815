use careops_api::app::{build_app, services::AppServices};
use careops_infra::Settings;
use chrono::{Duration as ChronoDuration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::StatusCode;
use serde_json::{Value, json};

const SECRET: &str = "black-box-secret";
const ORIGIN: &str = "http://localhost:5173";

struct TestServer {
    base_url: String,
    client: reqwest::Client,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        // Same router as prod, in-memory stores, cheapest bcrypt cost.
        let settings = Settings::from_lookup(|key| match key {
            "SECRET_KEY" => Some(SECRET.to_string()),
            "BCRYPT_COST" => Some("4".to_string()),
            "ALLOWED_ORIGINS" => Some(ORIGIN.to_string()),
            _ => None,
        })
        .expect("test settings");
        let services = AppServices::in_memory(&settings).expect("services");
        let app = build_app(services);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url,
            client: reqwest::Client::new(),
            handle,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Register an account with the given role and return its bearer token.
    async fn register(&self, email: &str, role: &str) -> (String, Value) {
        let res = self
            .client
            .post(self.url("/auth/register"))
            .json(&json!({
                "email": email,
                "password": "correct-horse",
                "username": email.split('@').next().unwrap(),
                "role": role,
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::CREATED);
        let body: Value = res.json().await.unwrap();
        (body["access_token"].as_str().unwrap().to_string(), body["user"].clone())
    }

    async fn staff_token(&self) -> String {
        self.register("owner@careops.test", "admin").await.0
    }

    async fn post(&self, path: &str, token: &str, body: Value) -> reqwest::Response {
        self.client
            .post(self.url(path))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .unwrap()
    }

    async fn patch(&self, path: &str, token: &str, body: Value) -> reqwest::Response {
        self.client
            .patch(self.url(path))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .unwrap()
    }

    async fn get(&self, path: &str, token: &str) -> reqwest::Response {
        self.client.get(self.url(path)).bearer_auth(token).send().await.unwrap()
    }

    async fn delete(&self, path: &str, token: &str) -> reqwest::Response {
        self.client.delete(self.url(path)).bearer_auth(token).send().await.unwrap()
    }

    async fn create_booking(&self, token: &str) -> Value {
        let res = self.post("/bookings", token, booking_payload()).await;
        assert_eq!(res.status(), StatusCode::CREATED);
        res.json().await.unwrap()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn booking_payload() -> Value {
    json!({
        "customer_name": "Dana Whitfield",
        "customer_email": "dana@example.com",
        "service": "Deep tissue massage",
        "date": "2026-03-14",
        "time": "10:30",
        "location": "Studio B",
        "notes": "prefers the quiet room",
    })
}

#[tokio::test]
async fn service_info_and_health_are_public() {
    let srv = TestServer::spawn().await;

    let body: Value = srv.client.get(srv.url("/")).send().await.unwrap().json().await.unwrap();
    assert_eq!(body["name"], "CareOps API");
    assert_eq!(body["status"], "online");

    let res = srv.client.get(srv.url("/health")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.json::<Value>().await.unwrap()["status"], "healthy");
}

#[tokio::test]
async fn auth_required_for_protected_endpoints() {
    let srv = TestServer::spawn().await;

    let res = srv.client.get(srv.url("/bookings")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "unauthorized");

    let res = srv.get("/auth/me", "not-a-token").await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn customer_token_is_forbidden_on_staff_endpoints() {
    let srv = TestServer::spawn().await;
    let (token, _) = srv.register("client@careops.test", "customer").await;

    let res = srv.get("/contacts", &token).await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    assert_eq!(res.json::<Value>().await.unwrap()["error"], "forbidden");

    // Customers may still read bookings.
    let res = srv.get("/bookings", &token).await;
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn customer_may_book_but_not_manage_bookings() {
    let srv = TestServer::spawn().await;
    let staff = srv.staff_token().await;
    let (customer, _) = srv.register("client@careops.test", "customer").await;

    let own = srv.create_booking(&customer).await;
    assert_eq!(own["status"], "pending");
    let id = own["id"].as_str().unwrap();
    let path = format!("/bookings/{id}");

    let res = srv.get(&path, &customer).await;
    assert_eq!(res.status(), StatusCode::OK);

    let res = srv.patch(&path, &customer, json!({"status": "confirmed"})).await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let res = srv.delete(&path, &customer).await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let res = srv.get("/bookings/stats/summary", &customer).await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    // Nothing changed behind the refusals.
    let fetched: Value = srv.get(&path, &staff).await.json().await.unwrap();
    assert_eq!(fetched["status"], "pending");

    let res = srv.delete(&path, &staff).await;
    assert_eq!(res.status(), StatusCode::OK);
    let res = srv.get(&path, &staff).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn customer_may_fill_in_but_not_delete_forms() {
    let srv = TestServer::spawn().await;
    let staff = srv.staff_token().await;
    let (customer, _) = srv.register("client@careops.test", "customer").await;

    let res = srv
        .post("/forms", &staff, json!({"name": "Intake", "customer_name": "Dana", "fields": 2}))
        .await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let form: Value = res.json().await.unwrap();
    let path = format!("/forms/{}", form["id"].as_str().unwrap());

    let res = srv.post("/forms", &customer, json!({"name": "Own", "customer_name": "Me"})).await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = srv.patch(&path, &customer, json!({"completed_fields": 1})).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.json::<Value>().await.unwrap()["progress"], 50);

    let res = srv.delete(&path, &customer).await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = srv.get(&path, &staff).await;
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn contact_listing_accepts_either_status_parameter() {
    let srv = TestServer::spawn().await;
    let token = srv.staff_token().await;

    let mut ids = Vec::new();
    for (name, email) in [("Dana", "dana@example.com"), ("Lee", "lee@example.com")] {
        let res = srv
            .post("/contacts", &token, json!({"name": name, "email": email, "phone": "555-0100"}))
            .await;
        assert_eq!(res.status(), StatusCode::CREATED);
        ids.push(res.json::<Value>().await.unwrap()["id"].clone());
    }
    let lee = ids[1].as_str().unwrap();
    let res = srv
        .patch(&format!("/contacts/{lee}"), &token, json!({"status": "inactive"}))
        .await;
    assert_eq!(res.status(), StatusCode::OK);

    for query in ["status=inactive", "status_filter=inactive"] {
        let res = srv.get(&format!("/contacts?{query}"), &token).await;
        let list: Value = res.json().await.unwrap();
        let list = list.as_array().unwrap();
        assert_eq!(list.len(), 1, "{query}");
        assert_eq!(list[0]["name"], "Lee", "{query}");
    }

    let all: Value = srv.get("/contacts", &token).await.json().await.unwrap();
    assert_eq!(all.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn register_login_and_me() {
    let srv = TestServer::spawn().await;
    let (_, user) = srv.register("Sam@CareOps.test", "staff").await;
    assert_eq!(user["email"], "sam@careops.test");
    assert!(user.get("password_hash").is_none());

    let res = srv
        .client
        .post(srv.url("/auth/login"))
        .json(&json!({"email": "sam@careops.test", "password": "wrong-password"}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = srv
        .client
        .post(srv.url("/auth/login"))
        .json(&json!({"email": "sam@careops.test", "password": "correct-horse"}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["token_type"], "bearer");
    let token = body["access_token"].as_str().unwrap();

    let me: Value = srv.get("/auth/me", token).await.json().await.unwrap();
    assert_eq!(me["id"], user["id"]);
    assert_eq!(me["role"], "staff");
}

#[tokio::test]
async fn duplicate_email_is_a_conflict() {
    let srv = TestServer::spawn().await;
    srv.register("taken@careops.test", "customer").await;

    let res = srv
        .client
        .post(srv.url("/auth/register"))
        .json(&json!({
            "email": "TAKEN@careops.test",
            "password": "another-pass",
            "username": "someone",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn malformed_registration_is_unprocessable() {
    let srv = TestServer::spawn().await;

    let res = srv
        .client
        .post(srv.url("/auth/register"))
        .json(&json!({"email": "no-at-sign", "password": "short", "username": "x"}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn expired_token_is_rejected() {
    let srv = TestServer::spawn().await;
    let (_, user) = srv.register("late@careops.test", "admin").await;

    let claims = json!({
        "sub": "late@careops.test",
        "user_id": user["id"],
        "exp": (Utc::now() - ChronoDuration::minutes(5)).timestamp(),
    });
    let token = jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .expect("failed to encode jwt");

    let res = srv.get("/auth/me", &token).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn booking_round_trip_defaults_to_pending() {
    let srv = TestServer::spawn().await;
    let token = srv.staff_token().await;

    let res = srv.post("/bookings", &token, booking_payload()).await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let created: Value = res.json().await.unwrap();
    assert_eq!(created["status"], "pending");
    assert_eq!(created["duration"], "60 min");

    let id = created["id"].as_str().unwrap();
    let fetched: Value = srv.get(&format!("/bookings/{id}"), &token).await.json().await.unwrap();
    let fields = [
        "customer_name",
        "customer_email",
        "service",
        "date",
        "time",
        "location",
        "notes",
    ];
    for field in fields {
        assert_eq!(fetched[field], booking_payload()[field], "{field}");
    }
    assert_eq!(fetched["assigned_staff_name"], Value::Null);

    let res = srv.get("/bookings/not-a-uuid", &token).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn partial_booking_update_keeps_other_fields() {
    let srv = TestServer::spawn().await;
    let token = srv.staff_token().await;

    let created = srv.create_booking(&token).await;
    assert_eq!(created["updated_at"], Value::Null);
    let id = created["id"].as_str().unwrap();

    let res = srv
        .patch(&format!("/bookings/{id}"), &token, json!({"status": "confirmed"}))
        .await;
    assert_eq!(res.status(), StatusCode::OK);
    let updated: Value = res.json().await.unwrap();

    assert_eq!(updated["status"], "confirmed");
    assert!(updated["updated_at"].is_string());
    for field in ["customer_name", "service", "date", "time", "location", "notes", "created_at"] {
        assert_eq!(updated[field], created[field], "{field}");
    }

    let summary: Value = srv.get("/bookings/stats/summary", &token).await.json().await.unwrap();
    assert_eq!(summary["total"], 1);
    assert_eq!(summary["confirmed"], 1);
    assert_eq!(summary["pending"], 0);
}

#[tokio::test]
async fn assigned_staff_name_is_joined_into_listings() {
    let srv = TestServer::spawn().await;
    let token = srv.staff_token().await;
    let (_, therapist) = srv.register("jordan@careops.test", "staff").await;

    let created = srv.create_booking(&token).await;
    let id = created["id"].as_str().unwrap();
    srv.patch(
        &format!("/bookings/{id}"),
        &token,
        json!({"assigned_staff_id": therapist["id"]}),
    )
    .await;

    let list: Value = srv.get("/bookings?status=pending", &token).await.json().await.unwrap();
    assert_eq!(list.as_array().unwrap().len(), 1);
    assert_eq!(list[0]["assigned_staff_name"], "jordan");

    let list: Value = srv.get("/bookings?from=2026-04-01", &token).await.json().await.unwrap();
    assert!(list.as_array().unwrap().is_empty());

    // An explicit null unassigns; other fields stay.
    let res = srv
        .patch(&format!("/bookings/{id}"), &token, json!({"assigned_staff_id": null}))
        .await;
    assert_eq!(res.status(), StatusCode::OK);
    let updated: Value = res.json().await.unwrap();
    assert_eq!(updated["assigned_staff_id"], Value::Null);
    assert_eq!(updated["notes"], created["notes"]);

    let fetched: Value = srv.get(&format!("/bookings/{id}"), &token).await.json().await.unwrap();
    assert_eq!(fetched["assigned_staff_id"], Value::Null);
    assert_eq!(fetched["assigned_staff_name"], Value::Null);
}

#[tokio::test]
async fn inventory_status_is_derived_on_update() {
    let srv = TestServer::spawn().await;
    let token = srv.staff_token().await;

    let res = srv
        .post(
            "/inventory",
            &token,
            json!({
                "name": "Massage oil",
                "category": "Supplies",
                "available": 40,
                "threshold": 10,
            }),
        )
        .await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let item: Value = res.json().await.unwrap();
    assert_eq!(item["status"], "normal");
    let id = item["id"].as_str().unwrap();

    let updated: Value = srv
        .patch(&format!("/inventory/{id}"), &token, json!({"available": 0, "status": "normal"}))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(updated["status"], "critical");
    assert_eq!(updated["threshold"], 10);

    let alerts: Value = srv.get("/inventory/alerts", &token).await.json().await.unwrap();
    assert_eq!(alerts["count"], 1);
    assert_eq!(alerts["items"][0]["id"], item["id"]);
}

#[tokio::test]
async fn form_progress_with_no_fields_is_a_bad_request() {
    let srv = TestServer::spawn().await;
    let token = srv.staff_token().await;

    let empty: Value = srv
        .post("/forms", &token, json!({"name": "Intake", "customer_name": "Dana"}))
        .await
        .json()
        .await
        .unwrap();
    let res = srv
        .patch(
            &format!("/forms/{}", empty["id"].as_str().unwrap()),
            &token,
            json!({"completed_fields": 1}),
        )
        .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let form: Value = srv
        .post("/forms", &token, json!({"name": "Consent", "customer_name": "Dana", "fields": 4}))
        .await
        .json()
        .await
        .unwrap();
    let (customer, _) = srv.register("dana@careops.test", "customer").await;
    let updated: Value = srv
        .patch(
            &format!("/forms/{}", form["id"].as_str().unwrap()),
            &customer,
            json!({"completed_fields": 3, "progress": 5}),
        )
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(updated["progress"], 75);
}

#[tokio::test]
async fn deleting_staff_deactivates_the_account() {
    let srv = TestServer::spawn().await;
    let token = srv.staff_token().await;

    let res = srv
        .post(
            "/staff",
            &token,
            json!({"email": "riley@careops.test", "username": "riley", "password": "riley-pass-1"}),
        )
        .await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let staff: Value = res.json().await.unwrap();
    assert_eq!(staff["status"], "active");
    assert_eq!(staff["role_title"], "Staff Member");
    let id = staff["id"].as_str().unwrap();

    let res = srv.delete(&format!("/staff/{id}"), &token).await;
    assert_eq!(res.status(), StatusCode::OK);

    let fetched: Value = srv.get(&format!("/staff/{id}"), &token).await.json().await.unwrap();
    assert_eq!(fetched["status"], "inactive");

    let active: Value = srv.get("/staff", &token).await.json().await.unwrap();
    assert!(active.as_array().unwrap().is_empty());
    let everyone: Value = srv.get("/staff?active_only=false", &token).await.json().await.unwrap();
    assert_eq!(everyone.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn revenue_counts_completed_bookings() {
    let srv = TestServer::spawn().await;
    let token = srv.staff_token().await;

    for _ in 0..2 {
        let created = srv.create_booking(&token).await;
        srv.patch(
            &format!("/bookings/{}", created["id"].as_str().unwrap()),
            &token,
            json!({"status": "completed"}),
        )
        .await;
    }
    srv.post("/bookings", &token, booking_payload()).await;

    let revenue: Value = srv.get("/analytics/revenue", &token).await.json().await.unwrap();
    assert_eq!(revenue["total"], 240.0);
    // Fresh bookings land in one of the two buckets depending on the local clock.
    let bucketed =
        revenue["this_month"].as_f64().unwrap() + revenue["last_month"].as_f64().unwrap();
    assert_eq!(bucketed, 240.0);

    let dashboard: Value = srv.get("/analytics/dashboard", &token).await.json().await.unwrap();
    assert_eq!(dashboard["total_bookings"], 3);
    assert_eq!(dashboard["completed_bookings"], 2);
    assert_eq!(dashboard["pending_bookings"], 1);

    let by_status: Value =
        srv.get("/analytics/bookings/by-status", &token).await.json().await.unwrap();
    assert_eq!(by_status, json!({"completed": 2, "pending": 1}));
}

#[tokio::test]
async fn sending_a_message_updates_its_conversation() {
    let srv = TestServer::spawn().await;
    let token = srv.staff_token().await;

    let conversation: Value = srv
        .post("/inbox/conversations", &token, json!({"name": "Dana Whitfield"}))
        .await
        .json()
        .await
        .unwrap();
    let conversation_id = conversation["id"].as_str().unwrap();

    let res = srv
        .post(
            "/inbox/messages",
            &token,
            json!({"conversation_id": conversation_id, "text": "See you Saturday"}),
        )
        .await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let message: Value = res.json().await.unwrap();
    assert_eq!(message["is_me"], true);
    assert_eq!(message["is_read"], false);
    assert_eq!(message["sender_name"], "owner");

    let conversations: Value = srv.get("/inbox/conversations", &token).await.json().await.unwrap();
    assert_eq!(conversations[0]["last_message"], "See you Saturday");
    assert_eq!(conversations[0]["last_message_time"], message["created_at"]);

    let messages: Value = srv
        .get(&format!("/inbox/messages/{conversation_id}"), &token)
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(messages.as_array().unwrap().len(), 1);

    let res = srv
        .post(
            "/inbox/messages",
            &token,
            json!({"conversation_id": uuid::Uuid::now_v7(), "text": "lost"}),
        )
        .await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn cors_preflight_echoes_allowed_origin() {
    let srv = TestServer::spawn().await;

    let res = srv
        .client
        .request(reqwest::Method::OPTIONS, srv.url("/bookings"))
        .header("Origin", ORIGIN)
        .header("Access-Control-Request-Method", "POST")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);
    assert_eq!(res.headers()["access-control-allow-origin"], ORIGIN);
    assert_eq!(res.headers()["access-control-allow-credentials"], "true");

    let res = srv
        .client
        .get(srv.url("/health"))
        .header("Origin", "https://evil.example")
        .send()
        .await
        .unwrap();
    assert!(res.headers().get("access-control-allow-origin").is_none());
}
