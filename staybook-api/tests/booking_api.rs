use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::{json, Value};
use staybook_api::{app, middleware::UserClaims, AppState, AuthConfig};
use staybook_core::models::{Enrollment, Room, Ticket, TicketStatus, TicketType};
use staybook_core::{BookingService, InMemoryStore};
use staybook_shared::{pii::Masked, BookingEvent};
use tokio::sync::broadcast;
use tower::ServiceExt;

const SECRET: &str = "test-secret";

fn token_for(sub: &str) -> String {
    let claims = UserClaims {
        sub: sub.to_string(),
        exp: (chrono::Utc::now().timestamp() + 3600) as usize,
    };
    encode(&Header::default(), &claims, &EncodingKey::from_secret(SECRET.as_bytes())).unwrap()
}

fn room(id: i32, capacity: i32) -> Room {
    Room { id, name: format!("{}0{}", id, id), capacity, hotel_id: 1 }
}

async fn seed_user(store: &InMemoryStore, user_id: i32, status: TicketStatus, is_remote: bool, includes_hotel: bool) {
    store
        .insert_enrollment(Enrollment {
            id: user_id,
            user_id,
            name: format!("Attendee {}", user_id),
            cpf: Masked::new("12345678901".to_string()),
            phone: Masked::new("21999999999".to_string()),
            address: None,
        })
        .await;
    store
        .insert_ticket(Ticket {
            id: user_id,
            enrollment_id: user_id,
            status,
            ticket_type: TicketType {
                id: 1,
                name: "In person + hotel".to_string(),
                price: 600,
                is_remote,
                includes_hotel,
            },
        })
        .await;
}

struct TestApp {
    router: Router,
    store: Arc<InMemoryStore>,
    events: broadcast::Receiver<BookingEvent>,
}

/// Rooms: 1 (capacity 1), 2 (capacity 1), 3 (capacity 2).
/// Users 1-3 hold eligible tickets, user 4 only a reserved one.
async fn setup() -> TestApp {
    let store = Arc::new(InMemoryStore::new());
    store.insert_room(room(1, 1)).await;
    store.insert_room(room(2, 1)).await;
    store.insert_room(room(3, 2)).await;
    for user_id in 1..=3 {
        seed_user(&store, user_id, TicketStatus::Paid, false, true).await;
    }
    seed_user(&store, 4, TicketStatus::Reserved, false, true).await;

    let (events_tx, events) = broadcast::channel(16);
    let state = AppState {
        bookings: BookingService::from_store(store.clone()),
        events: events_tx,
        auth: AuthConfig { secret: SECRET.to_string() },
    };

    TestApp { router: app(state), store, events }
}

async fn send(app: &TestApp, method: Method, uri: &str, user_id: Option<i32>, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(user_id) = user_id {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token_for(&user_id.to_string())));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

#[tokio::test]
async fn test_requests_without_valid_token_are_401() {
    let app = setup().await;

    let (status, _) = send(&app, Method::GET, "/booking", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let request = Request::builder()
        .uri("/booking")
        .header(header::AUTHORIZATION, "Bearer not-a-jwt")
        .body(Body::empty())
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let request = Request::builder()
        .uri("/booking")
        .header(header::AUTHORIZATION, format!("Bearer {}", token_for("guest-abc")))
        .body(Body::empty())
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, Method::POST, "/booking", None, Some(json!({ "roomId": 1 }))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_get_booking_without_booking_is_404() {
    let app = setup().await;
    let (status, body) = send(&app, Method::GET, "/booking", Some(1), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_create_then_get_booking() {
    let mut app = setup().await;

    let (status, body) = send(&app, Method::POST, "/booking", Some(1), Some(json!({ "roomId": 3 }))).await;
    assert_eq!(status, StatusCode::OK);
    let booking_id = body["bookingId"].as_i64().unwrap();

    let (status, body) = send(&app, Method::GET, "/booking", Some(1), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"].as_i64().unwrap(), booking_id);
    assert_eq!(body["room"]["id"], 3);
    assert_eq!(body["room"]["capacity"], 2);
    assert_eq!(body["room"]["hotelId"], 1);

    match app.events.try_recv().unwrap() {
        BookingEvent::BookingCreated(event) => {
            assert_eq!(i64::from(event.booking_id), booking_id);
            assert_eq!(event.user_id, 1);
            assert_eq!(event.room_id, 3);
        }
        other => panic!("unexpected event: {:?}", other),
    }
}

#[tokio::test]
async fn test_create_booking_rejections() {
    let app = setup().await;

    // room 1 has capacity 1
    let (status, _) = send(&app, Method::POST, "/booking", Some(1), Some(json!({ "roomId": 1 }))).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&app, Method::POST, "/booking", Some(2), Some(json!({ "roomId": 1 }))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // second booking for the same user, in a room with space
    let (status, _) = send(&app, Method::POST, "/booking", Some(1), Some(json!({ "roomId": 3 }))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // reserved ticket
    let (status, _) = send(&app, Method::POST, "/booking", Some(4), Some(json!({ "roomId": 3 }))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // no enrollment at all
    let (status, _) = send(&app, Method::POST, "/booking", Some(99), Some(json!({ "roomId": 3 }))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // unknown room
    let (status, _) = send(&app, Method::POST, "/booking", Some(2), Some(json!({ "roomId": 42 }))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // invalid room id
    let (status, _) = send(&app, Method::POST, "/booking", Some(2), Some(json!({ "roomId": 0 }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert_eq!(app.store.booking_count().await, 1);
}

#[tokio::test]
async fn test_update_booking_moves_room() {
    let mut app = setup().await;

    let (_, body) = send(&app, Method::POST, "/booking", Some(1), Some(json!({ "roomId": 1 }))).await;
    let booking_id = body["bookingId"].as_i64().unwrap();
    let _ = app.events.try_recv();

    let uri = format!("/booking/{}", booking_id);
    let (status, body) = send(&app, Method::PUT, &uri, Some(1), Some(json!({ "roomId": 2 }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["bookingId"].as_i64().unwrap(), booking_id);

    let (_, body) = send(&app, Method::GET, "/booking", Some(1), None).await;
    assert_eq!(body["room"]["id"], 2);

    // room 1 is free again
    let (status, _) = send(&app, Method::POST, "/booking", Some(2), Some(json!({ "roomId": 1 }))).await;
    assert_eq!(status, StatusCode::OK);

    match app.events.try_recv().unwrap() {
        BookingEvent::BookingRoomChanged(event) => {
            assert_eq!(event.from_room_id, 1);
            assert_eq!(event.to_room_id, 2);
        }
        other => panic!("unexpected event: {:?}", other),
    }
}

#[tokio::test]
async fn test_update_booking_rejections() {
    let app = setup().await;

    let (_, body) = send(&app, Method::POST, "/booking", Some(1), Some(json!({ "roomId": 3 }))).await;
    let booking_id = body["bookingId"].as_i64().unwrap();
    send(&app, Method::POST, "/booking", Some(2), Some(json!({ "roomId": 1 }))).await;
    let uri = format!("/booking/{}", booking_id);

    // same room, even though it still has space
    let (status, _) = send(&app, Method::PUT, &uri, Some(1), Some(json!({ "roomId": 3 }))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // not the owner
    let (status, _) = send(&app, Method::PUT, &uri, Some(3), Some(json!({ "roomId": 2 }))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // target room full
    let (status, _) = send(&app, Method::PUT, &uri, Some(1), Some(json!({ "roomId": 1 }))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // target room missing
    let (status, _) = send(&app, Method::PUT, &uri, Some(1), Some(json!({ "roomId": 42 }))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // booking missing
    let (status, _) = send(&app, Method::PUT, "/booking/999", Some(1), Some(json!({ "roomId": 2 }))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = send(&app, Method::GET, "/booking", Some(1), None).await;
    assert_eq!(body["room"]["id"], 3);
}
