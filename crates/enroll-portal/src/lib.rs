//! HTTP portal for the enroll admission service.
//!
//! Exposes an axum [`Router`] with the public intake endpoints, the
//! session gate, and the staff review API, backed by any store that
//! implements both `AdmissionStore` and `IdentityProvider`.

pub mod auth;
pub mod error;
pub mod handlers;
pub mod mail;

pub use error::Error;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Router,
  routing::{get, post},
};
use enroll_core::{
  identity::IdentityProvider, mailer::Mailer, store::AdmissionStore,
  store::PartitionCounts,
};
use serde::Deserialize;
use tokio::sync::watch;
use tower_http::{services::ServeDir, trace::TraceLayer};

use handlers::{
  admissions, announcements, feedback, photos, session, staff, support,
};

// ─── Configuration ───────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
  pub host:       String,
  pub port:       u16,
  /// Public origin used when building photo URLs.
  pub base_url:   String,
  pub store_path: PathBuf,
  pub photo_dir:  PathBuf,
}

// ─── Application state ───────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
#[derive(Clone)]
pub struct AppState<S, M> {
  pub store:  Arc<S>,
  pub mailer: Arc<M>,
  /// Live partition sizes, fed by the store on every applicant mutation.
  pub counts: watch::Receiver<PartitionCounts>,
  pub config: Arc<ServerConfig>,
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build the portal [`Router`].
pub fn router<S, M>(state: AppState<S, M>) -> Router
where
  S: AdmissionStore + IdentityProvider + Clone + Send + Sync + 'static,
  M: Mailer + Clone + Send + Sync + 'static,
{
  let photo_dir = state.config.photo_dir.clone();

  Router::new()
    // Intake
    .route(
      "/api/admissions",
      post(admissions::submit::<S, M>).get(admissions::list::<S, M>),
    )
    .route("/api/admissions/counts", get(admissions::counts::<S, M>))
    .route("/api/admissions/{id}", get(admissions::get_one::<S, M>))
    .route("/api/admissions/{id}/approve", post(admissions::approve::<S, M>))
    .route("/api/admissions/{id}/reject", post(admissions::reject::<S, M>))
    .route("/api/photos", post(photos::upload::<S, M>))
    // Sessions
    .route(
      "/api/session",
      post(session::login::<S, M>).delete(session::logout::<S, M>),
    )
    .route("/api/profile", get(session::profile::<S, M>))
    // Staff
    .route(
      "/api/staff",
      post(staff::register::<S, M>).get(staff::list::<S, M>),
    )
    // Feedback, tickets, announcements
    .route(
      "/api/feedback",
      post(feedback::submit::<S, M>).get(feedback::list::<S, M>),
    )
    .route(
      "/api/tickets",
      post(support::open::<S, M>).get(support::list::<S, M>),
    )
    .route(
      "/api/announcements",
      post(announcements::post_one::<S, M>).get(announcements::list::<S, M>),
    )
    // Stored applicant photos
    .nest_service("/photos", ServeDir::new(photo_dir))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

// ─── Integration tests ───────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
  };
  use enroll_core::{lifecycle, staff::StaffForm};
  use enroll_store_sqlite::SqliteStore;
  use serde_json::{Value, json};
  use tower::ServiceExt as _;

  async fn make_state() -> AppState<SqliteStore, mail::LogMailer> {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let counts = store.watch_counts();
    AppState {
      store:  Arc::new(store),
      mailer: Arc::new(mail::LogMailer),
      counts,
      config: Arc::new(ServerConfig {
        host:       "127.0.0.1".to_string(),
        port:       8080,
        base_url:   "http://localhost:8080".to_string(),
        store_path: PathBuf::from(":memory:"),
        photo_dir:  std::env::temp_dir().join("enroll-test-photos"),
      }),
    }
  }

  /// Seed a staff member straight through the engine and return their
  /// login credential.
  async fn seed_admin(state: &AppState<SqliteStore, mail::LogMailer>) -> (String, String) {
    let profile = StaffForm {
      first_name: "Rakesh".into(),
      last_name: "Sharma".into(),
      email: "admin@example.com".into(),
      phone: "9800000010".into(),
      dob: "1988-03-02".into(),
      gender: "Male".into(),
      blood_group: "B+".into(),
      teaching_class: "Class 12".into(),
      teaching_subject: "Physics".into(),
      designation: "Administrator".into(),
      temp_address: "4 Hill Street".into(),
      ..StaffForm::default()
    }
    .validate()
    .unwrap();

    let registration =
      lifecycle::register_staff(&*state.store, &*state.store, profile)
        .await
        .unwrap();
    ("admin@example.com".to_string(), registration.generated_password)
  }

  fn application_body(email: &str) -> Value {
    json!({
      "first_name": "Ashish",
      "last_name": "Kumar",
      "blood_group": "A+",
      "dob": "2004-05-12",
      "email": email,
      "phone": "9800000000",
      "father_name": "Raj Kumar",
      "father_phone": "9800000001",
      "mother_name": "Sita Kumar",
      "mother_phone": "9800000002",
      "temp_address": "12 Lake Road",
      "class_level": "Class 12",
      "subjects": ["Physics", "Chemistry"],
      "gender": "Male",
      "heard_from": "Google Search",
      "photo_url": "http://localhost:8080/photos/Ashish_2004.jpg"
    })
  }

  async fn request(
    state:  AppState<SqliteStore, mail::LogMailer>,
    method: &str,
    uri:    &str,
    bearer: Option<&str>,
    body:   Option<Value>,
  ) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = bearer {
      builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let req = match body {
      Some(v) => builder
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(v.to_string()))
        .unwrap(),
      None => builder.body(Body::empty()).unwrap(),
    };

    let resp = router(state).oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
      Value::Null
    } else {
      serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
  }

  async fn login(
    state: &AppState<SqliteStore, mail::LogMailer>,
    email: &str,
    password: &str,
    role: &str,
  ) -> (StatusCode, Value) {
    request(
      state.clone(),
      "POST",
      "/api/session",
      None,
      Some(json!({ "email": email, "password": password, "role": role })),
    )
    .await
  }

  // ── Intake ──────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn submit_creates_pending_record() {
    let state = make_state().await;
    let (status, body) = request(
      state,
      "POST",
      "/api/admissions",
      None,
      Some(application_body("a@example.com")),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "Pending");
    assert_eq!(body["email"], "a@example.com");
    assert!(body.get("generated_password").is_none());
  }

  #[tokio::test]
  async fn invalid_form_names_first_missing_field() {
    let state = make_state().await;
    let mut form = application_body("a@example.com");
    form["phone"] = json!("");

    let (status, body) =
      request(state, "POST", "/api/admissions", None, Some(form)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Please fill the phone field.");
  }

  // ── Review API auth ─────────────────────────────────────────────────────

  #[tokio::test]
  async fn review_endpoints_require_staff() {
    let state = make_state().await;

    let (status, _) =
      request(state.clone(), "GET", "/api/admissions", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // A student session is authenticated but not staff.
    let (_, submitted) = request(
      state.clone(),
      "POST",
      "/api/admissions",
      None,
      Some(application_body("s@example.com")),
    )
    .await;
    let id = uuid::Uuid::parse_str(submitted["applicant_id"].as_str().unwrap()).unwrap();
    let outcome = lifecycle::approve(&*state.store, &*state.store, id).await.unwrap();

    let (_, grant) =
      login(&state, "s@example.com", &outcome.generated_password, "student").await;
    let token = grant["token"].as_str().unwrap().to_owned();

    let (status, _) =
      request(state, "GET", "/api/admissions", Some(&token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
  }

  // ── Full lifecycle through the HTTP surface ─────────────────────────────

  #[tokio::test]
  async fn submit_approve_student_login() {
    let state = make_state().await;
    let (admin_email, admin_password) = seed_admin(&state).await;

    let (_, grant) = login(&state, &admin_email, &admin_password, "admin").await;
    assert_eq!(grant["landing"], "/admin");
    let token = grant["token"].as_str().unwrap().to_owned();

    let (_, submitted) = request(
      state.clone(),
      "POST",
      "/api/admissions",
      None,
      Some(application_body("ashish@example.com")),
    )
    .await;
    let id = submitted["applicant_id"].as_str().unwrap().to_owned();

    let (status, outcome) = request(
      state.clone(),
      "POST",
      &format!("/api/admissions/{id}/approve"),
      Some(&token),
      None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(outcome["generated_password"], "ASH2004");
    assert_eq!(outcome["record"]["status"], "approved");

    // The student can now log in with the derived credential.
    let (status, grant) =
      login(&state, "ashish@example.com", "ASH2004", "student").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(grant["landing"], "/student");
    assert_eq!(grant["display_name"], "Ashish Kumar");

    // And a second decision on the same record is a conflict.
    let (status, _) = request(
      state.clone(),
      "POST",
      &format!("/api/admissions/{id}/reject"),
      Some(&token),
      None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    // The counts reflect the move.
    let (_, counts) = request(
      state,
      "GET",
      "/api/admissions/counts",
      Some(&token),
      None,
    )
    .await;
    assert_eq!(counts["approved"], 1);
    assert_eq!(counts["pending"], 0);
  }

  // ── Live counts ─────────────────────────────────────────────────────────

  #[tokio::test]
  async fn parked_counts_request_completes_on_decision() {
    use std::time::Duration;

    let state = make_state().await;
    let (admin_email, admin_password) = seed_admin(&state).await;
    let (_, grant) = login(&state, &admin_email, &admin_password, "admin").await;
    let token = grant["token"].as_str().unwrap().to_owned();

    let (_, submitted) = request(
      state.clone(),
      "POST",
      "/api/admissions",
      None,
      Some(application_body("parked@example.com")),
    )
    .await;
    let id = submitted["applicant_id"].as_str().unwrap().to_owned();

    // Park a wait=true request on the counts channel.
    let waiter = {
      let state = state.clone();
      let token = token.clone();
      tokio::spawn(async move {
        request(
          state,
          "GET",
          "/api/admissions/counts?wait=true",
          Some(&token),
          None,
        )
        .await
      })
    };
    // Let the parked request subscribe before the record moves.
    tokio::time::sleep(Duration::from_millis(100)).await;

    let (status, _) = request(
      state.clone(),
      "POST",
      &format!("/api/admissions/{id}/approve"),
      Some(&token),
      None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // The waiter wakes on the decision, well inside its 25-second window.
    let (status, counts) = tokio::time::timeout(Duration::from_secs(5), waiter)
      .await
      .expect("long-poll did not wake on the decision")
      .unwrap();
    assert_eq!(status, StatusCode::OK);
    assert_eq!(counts["pending"], 0);
    assert_eq!(counts["approved"], 1);
  }

  #[tokio::test]
  async fn valid_credential_wrong_role_is_denied() {
    let state = make_state().await;
    let (admin_email, admin_password) = seed_admin(&state).await;

    let (status, body) =
      login(&state, &admin_email, &admin_password, "student").await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(
      body["error"],
      "Access Denied: This email is not registered as a STUDENT."
    );
  }

  #[tokio::test]
  async fn bad_password_and_unknown_email_read_the_same() {
    let state = make_state().await;
    let (admin_email, _) = seed_admin(&state).await;

    let (status, body) = login(&state, &admin_email, "wrong", "admin").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(
      body["error"],
      "Invalid email or password. Please check your credentials."
    );

    let (status, body2) = login(&state, "nobody@example.com", "wrong", "admin").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], body2["error"]);
  }

  // ── Photos ──────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn oversized_photo_is_rejected() {
    let state = make_state().await;
    let big = vec![0u8; handlers::photos::MAX_PHOTO_BYTES + 1];

    let req = Request::builder()
      .method("POST")
      .uri("/api/photos?first_name=Ashish&dob=2004-05-12&ext=jpg")
      .body(Body::from(big))
      .unwrap();
    let resp = router(state).oneshot(req).await.unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["error"], "Photo size must be less than 200KB.");
  }

  #[tokio::test]
  async fn photo_upload_returns_public_url() {
    let state = make_state().await;

    let req = Request::builder()
      .method("POST")
      .uri("/api/photos?first_name=Ashish&dob=2004-05-12&ext=jpg")
      .body(Body::from(vec![0xFFu8; 1024]))
      .unwrap();
    let resp = router(state).oneshot(req).await.unwrap();

    assert_eq!(resp.status(), StatusCode::CREATED);
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(
      body["photo_url"],
      "http://localhost:8080/photos/Ashish_2004.jpg"
    );
  }

  // ── Feedback and announcements ──────────────────────────────────────────

  #[tokio::test]
  async fn feedback_needs_session_but_listing_is_public() {
    let state = make_state().await;
    let (admin_email, admin_password) = seed_admin(&state).await;

    let entry = json!({
      "name": "Jane Doe",
      "email": "jane@example.com",
      "message": "Great teachers.",
      "rating": null
    });

    let (status, _) =
      request(state.clone(), "POST", "/api/feedback", None, Some(entry.clone())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (_, grant) = login(&state, &admin_email, &admin_password, "admin").await;
    let token = grant["token"].as_str().unwrap().to_owned();

    let (status, posted) =
      request(state.clone(), "POST", "/api/feedback", Some(&token), Some(entry)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(posted["rating"], 5);

    let (status, listed) =
      request(state, "GET", "/api/feedback", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().unwrap().len(), 1);
  }

  #[tokio::test]
  async fn staff_registration_over_http() {
    let state = make_state().await;
    let (admin_email, admin_password) = seed_admin(&state).await;
    let (_, grant) = login(&state, &admin_email, &admin_password, "admin").await;
    let token = grant["token"].as_str().unwrap().to_owned();

    let form = json!({
      "first_name": "Priya",
      "last_name": "Nair",
      "email": "priya@example.com",
      "phone": "9800000020",
      "dob": "1992-07-19",
      "gender": "Female",
      "blood_group": "O+",
      "teaching_class": "Class 11",
      "teaching_subject": "Chemistry",
      "designation": "Faculty",
      "temp_address": "9 River Lane"
    });

    let (status, registration) =
      request(state.clone(), "POST", "/api/staff", Some(&token), Some(form.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(registration["generated_password"], "PRI1992");

    // Registering the same email again is a conflict.
    let (status, body) =
      request(state.clone(), "POST", "/api/staff", Some(&token), Some(form)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Email already exists: priya@example.com");

    // The new staff member can log in as admin right away.
    let (status, _) = login(&state, "priya@example.com", "PRI1992", "admin").await;
    assert_eq!(status, StatusCode::OK);
  }
}
