//! HTTP tests for the bookings routes, backed by the in-memory store.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use async_trait::async_trait;
use http_body_util::BodyExt;
use kavholm_api::{app, auth::issue_token, AppState, AuthConfig};
use kavholm_core::memory::InMemoryStore;
use kavholm_core::models::BookingRecord;
use kavholm_core::{Booking, BookingRepository, BookingService, Listing, RepoError};
use serde_json::{json, Value};
use tower::ServiceExt;

const SECRET: &str = "test-secret";

struct TestApp {
    router: Router,
    store: Arc<InMemoryStore>,
    lebron_listing: Listing,
    jlo_listing: Listing,
}

/// Two users, one listing each; jlo holds two bookings on lebron's listing.
async fn seeded_app() -> TestApp {
    let store = Arc::new(InMemoryStore::new());
    let lebron = store.add_user("lebron").await;
    let jlo = store.add_user("jlo").await;
    store.add_user("serena").await;
    let lebron_listing = store.add_listing(lebron.id, 100).await;
    let jlo_listing = store.add_listing(jlo.id, 80).await;

    let state = AppState::from_store(
        store.clone(),
        AuthConfig {
            secret: SECRET.to_string(),
            expiration: 3600,
        },
    );
    let router = app(state);

    let test_app = TestApp {
        router,
        store,
        lebron_listing,
        jlo_listing,
    };

    for (start, end) in [("2021-03-05", "2021-03-07"), ("2021-04-01", "2021-04-03")] {
        let res = test_app
            .post(
                &format!("/bookings/listings/{}", test_app.lebron_listing.id),
                "jlo",
                json!({ "newBooking": { "startDate": start, "endDate": end } }),
            )
            .await;
        assert_eq!(res.0, StatusCode::CREATED);
    }

    test_app
}

fn bearer(username: &str) -> String {
    format!("Bearer {}", issue_token(SECRET, username, 3600).unwrap())
}

impl TestApp {
    async fn send(&self, req: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(req).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, body)
    }

    async fn get(&self, uri: &str, username: &str) -> (StatusCode, Value) {
        self.send(
            Request::get(uri)
                .header(header::AUTHORIZATION, bearer(username))
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }

    async fn post(&self, uri: &str, username: &str, body: Value) -> (StatusCode, Value) {
        self.send(
            Request::post(uri)
                .header(header::AUTHORIZATION, bearer(username))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }
}

#[tokio::test]
async fn test_list_own_bookings() {
    let app = seeded_app().await;

    let (status, body) = app.get("/bookings", "jlo").await;
    assert_eq!(status, StatusCode::OK);

    let bookings = body["bookings"].as_array().unwrap();
    assert_eq!(bookings.len(), 2);

    // newest first, so the first one made is last
    let first = &bookings[1];
    assert_eq!(first["startDate"], "2021-03-05");
    assert_eq!(first["endDate"], "2021-03-07");
    assert_eq!(first["paymentMethod"], "card");
    assert_eq!(first["guests"], 1);
    assert_eq!(first["username"], "jlo");
    assert_eq!(first["hostUsername"], "lebron");
    assert_eq!(first["totalCost"], 330);
    assert_eq!(first["listingId"], app.lebron_listing.id);
    assert!(first["userId"].is_number());
    assert!(first["createdAt"].is_string());
    assert_eq!(bookings[0]["startDate"], "2021-04-01");

    let (status, body) = app.get("/bookings", "serena").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["bookings"], json!([]));
}

#[tokio::test]
async fn test_list_bookings_on_owned_listings() {
    let app = seeded_app().await;

    let (status, body) = app.get("/bookings/listings", "lebron").await;
    assert_eq!(status, StatusCode::OK);

    let bookings = body["bookings"].as_array().unwrap();
    assert_eq!(bookings.len(), 2);
    assert!(bookings.iter().all(|b| b["hostUsername"] == "lebron"));
    assert!(bookings.iter().all(|b| b["username"] == "jlo"));

    // jlo owns a listing nobody booked
    let (_, body) = app.get("/bookings/listings", "jlo").await;
    assert_eq!(body["bookings"], json!([]));
}

#[tokio::test]
async fn test_create_booking() {
    let app = seeded_app().await;

    let (status, body) = app
        .post(
            &format!("/bookings/listings/{}", app.lebron_listing.id),
            "serena",
            json!({ "newBooking": {
                "startDate": "2021-07-05T00:00:00.000Z",
                "endDate": "2021-07-06T00:00:00.000Z",
                "guests": 1
            }}),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED);
    let booking = &body["booking"];
    assert_eq!(booking["startDate"], "2021-07-05");
    assert_eq!(booking["endDate"], "2021-07-06");
    assert_eq!(booking["totalCost"], 220);
    assert_eq!(booking["paymentMethod"], "card");
    assert_eq!(booking["username"], "serena");
    assert_eq!(booking["hostUsername"], "lebron");
}

#[tokio::test]
async fn test_cannot_book_own_listing() {
    let app = seeded_app().await;

    let (status, body) = app
        .post(
            &format!("/bookings/listings/{}", app.lebron_listing.id),
            "lebron",
            json!({ "newBooking": { "startDate": "2021-07-05", "endDate": "2021-07-06" } }),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_create_booking_missing_dates() {
    let app = seeded_app().await;
    let uri = format!("/bookings/listings/{}", app.jlo_listing.id);

    let (status, body) = app
        .post(&uri, "lebron", json!({ "newBooking": { "endDate": "2021-07-06" } }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing startDate in newBooking.");

    let (status, body) = app
        .post(&uri, "lebron", json!({ "newBooking": { "startDate": "2021-07-06" } }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing endDate in newBooking.");

    let (status, body) = app.post(&uri, "lebron", json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing startDate in newBooking.");
}

#[tokio::test]
async fn test_create_booking_unknown_listing() {
    let app = seeded_app().await;

    let (status, _) = app
        .post(
            "/bookings/listings/9999",
            "jlo",
            json!({ "newBooking": { "startDate": "2021-07-05", "endDate": "2021-07-06" } }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_fetch_booking_by_id() {
    let app = seeded_app().await;
    let (_, body) = app.get("/bookings", "jlo").await;
    let id = body["bookings"][0]["id"].as_i64().unwrap();
    let uri = format!("/bookings/{}", id);

    let (status, body) = app.get(&uri, "jlo").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["booking"]["id"], id);

    let (status, _) = app.get(&uri, "lebron").await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app.get(&uri, "serena").await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app.get("/bookings/9999", "jlo").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "No booking found with that id.");
}

#[tokio::test]
async fn test_host_username_follows_renames() {
    let app = seeded_app().await;
    assert!(app.store.rename_user("lebron", "king_james").await);

    let (_, body) = app.get("/bookings", "jlo").await;
    let bookings = body["bookings"].as_array().unwrap();
    assert!(bookings.iter().all(|b| b["hostUsername"] == "king_james"));
}

#[tokio::test]
async fn test_requires_authentication() {
    let app = seeded_app().await;

    for uri in ["/bookings", "/bookings/listings", "/bookings/1"] {
        let (status, _) = app
            .send(Request::get(uri).body(Body::empty()).unwrap())
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{}", uri);
    }

    let (status, _) = app
        .send(
            Request::get("/bookings")
                .header(header::AUTHORIZATION, "Bearer not-a-jwt")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .send(
            Request::post(format!("/bookings/listings/{}", app.lebron_listing.id))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{}"))
                .unwrap(),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_health_is_public() {
    let app = seeded_app().await;
    let (status, body) = app
        .send(Request::get("/health").body(Body::empty()).unwrap())
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ping"], "pong");
}

/// Booking storage that fails every call.
struct BrokenBookings;

#[async_trait]
impl BookingRepository for BrokenBookings {
    async fn fetch_booking(&self, _id: i64) -> Result<Option<Booking>, RepoError> {
        Err("relation \"bookings\" does not exist".into())
    }

    async fn list_bookings_by_creator(&self, _username: &str) -> Result<Vec<Booking>, RepoError> {
        Err("relation \"bookings\" does not exist".into())
    }

    async fn list_bookings_by_host(&self, _username: &str) -> Result<Vec<Booking>, RepoError> {
        Err("relation \"bookings\" does not exist".into())
    }

    async fn insert_booking(&self, _record: &BookingRecord) -> Result<Booking, RepoError> {
        Err("relation \"bookings\" does not exist".into())
    }
}

#[tokio::test]
async fn test_storage_failure_is_500_without_details() {
    let store = Arc::new(InMemoryStore::new());
    let lebron = store.add_user("lebron").await;
    store.add_user("jlo").await;
    let listing = store.add_listing(lebron.id, 100).await;

    let state = AppState {
        bookings: BookingService::new(Arc::new(BrokenBookings), store.clone()),
        users: store.clone(),
        listings: store.clone(),
        auth: AuthConfig {
            secret: SECRET.to_string(),
            expiration: 3600,
        },
    };
    let test_app = TestApp {
        router: app(state),
        store,
        jlo_listing: listing.clone(),
        lebron_listing: listing,
    };

    let (status, body) = test_app.get("/bookings", "jlo").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "Internal Server Error" }));

    let (status, body) = test_app
        .post(
            &format!("/bookings/listings/{}", test_app.lebron_listing.id),
            "jlo",
            json!({ "newBooking": { "startDate": "2021-07-05", "endDate": "2021-07-06" } }),
        )
        .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "Internal Server Error" }));
}
