//! API integration tests
//!
//! These run against a live server with a seeded staff account
//! (admin@example.com / admin).

use reqwest::Client;
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:8080/api/v1";

/// Helper to get a staff bearer token
async fn get_staff_token(client: &Client) -> String {
    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "email": "admin@example.com",
            "password": "admin"
        }))
        .send()
        .await
        .expect("Failed to send login request");

    let body: Value = response.json().await.expect("Failed to parse login response");
    body["token"].as_str().expect("No token in response").to_string()
}

/// Helper to register a fresh user and return their bearer token
async fn register_and_login(client: &Client) -> String {
    let email = format!(
        "reader-{}@example.com",
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    );

    let response = client
        .post(format!("{}/users", BASE_URL))
        .json(&json!({
            "email": email,
            "password": "reader-password",
            "first_name": "Test",
            "last_name": "Reader"
        }))
        .send()
        .await
        .expect("Failed to send register request");
    assert_eq!(response.status(), 201);

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "email": email,
            "password": "reader-password"
        }))
        .send()
        .await
        .expect("Failed to send login request");
    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse login response");
    body["token"].as_str().expect("No token in response").to_string()
}

/// Helper to create a book with the given inventory, returns its ID
async fn create_book(client: &Client, staff_token: &str, inventory: i64) -> i64 {
    let suffix = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();

    let response = client
        .post(format!("{}/books", BASE_URL))
        .header("Authorization", format!("Bearer {}", staff_token))
        .json(&json!({
            "title": format!("Test Book {}", suffix),
            "author": "Test Author",
            "cover": "Hard",
            "inventory": inventory,
            "daily_fee": "1.50"
        }))
        .send()
        .await
        .expect("Failed to send create book request");
    assert_eq!(response.status(), 201);

    let body: Value = response.json().await.expect("Failed to parse book response");
    body["id"].as_i64().expect("No book id in response")
}

/// Helper to borrow a book, returns the raw response
async fn borrow_book(client: &Client, token: &str, book_id: i64, days: i64) -> reqwest::Response {
    let expected = chrono::Utc::now().date_naive() + chrono::Duration::days(days);

    client
        .post(format!("{}/borrowings", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "book_id": book_id,
            "expected_return_date": expected.to_string()
        }))
        .send()
        .await
        .expect("Failed to send borrow request")
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_health_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_login_invalid_credentials() {
    let client = Client::new();

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "email": "admin@example.com",
            "password": "wrong"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_list_books_is_public() {
    let client = Client::new();

    let response = client
        .get(format!("{}/books", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["items"].is_array());
    assert!(body["total"].is_number());
}

#[tokio::test]
#[ignore]
async fn test_create_book_requires_staff() {
    let client = Client::new();
    let reader_token = register_and_login(&client).await;

    let response = client
        .post(format!("{}/books", BASE_URL))
        .header("Authorization", format!("Bearer {}", reader_token))
        .json(&json!({
            "title": "Forbidden Book",
            "author": "Nobody",
            "cover": "Soft",
            "inventory": 1,
            "daily_fee": "0.50"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 403);
}

#[tokio::test]
#[ignore]
async fn test_borrowing_rejects_past_expected_return_date() {
    let client = Client::new();
    let staff_token = get_staff_token(&client).await;
    let reader_token = register_and_login(&client).await;
    let book_id = create_book(&client, &staff_token, 1).await;

    let response = borrow_book(&client, &reader_token, book_id, -5).await;
    assert_eq!(response.status(), 400);

    // Inventory untouched by the rejected borrow
    let book: Value = client
        .get(format!("{}/books/{}", BASE_URL, book_id))
        .send()
        .await
        .expect("Failed to fetch book")
        .json()
        .await
        .expect("Failed to parse book");
    assert_eq!(book["inventory"], 1);
}

#[tokio::test]
#[ignore]
async fn test_inventory_exhaustion_rejects_third_borrow() {
    let client = Client::new();
    let staff_token = get_staff_token(&client).await;
    let reader_token = register_and_login(&client).await;
    let book_id = create_book(&client, &staff_token, 2).await;

    let first = borrow_book(&client, &reader_token, book_id, 14).await;
    assert_eq!(first.status(), 201);
    let second = borrow_book(&client, &reader_token, book_id, 14).await;
    assert_eq!(second.status(), 201);

    let third = borrow_book(&client, &reader_token, book_id, 14).await;
    assert_eq!(third.status(), 409);

    let book: Value = client
        .get(format!("{}/books/{}", BASE_URL, book_id))
        .send()
        .await
        .expect("Failed to fetch book")
        .json()
        .await
        .expect("Failed to parse book");
    assert_eq!(book["inventory"], 0);
}

#[tokio::test]
#[ignore]
async fn test_return_restores_inventory_and_rejects_second_return() {
    let client = Client::new();
    let staff_token = get_staff_token(&client).await;
    let reader_token = register_and_login(&client).await;
    let book_id = create_book(&client, &staff_token, 1).await;

    let borrow: Value = borrow_book(&client, &reader_token, book_id, 14)
        .await
        .json()
        .await
        .expect("Failed to parse borrowing");
    let borrowing_id = borrow["id"].as_i64().expect("No borrowing id");
    assert_eq!(borrow["is_active"], true);

    let response = client
        .post(format!("{}/borrowings/{}/return", BASE_URL, borrowing_id))
        .header("Authorization", format!("Bearer {}", reader_token))
        .send()
        .await
        .expect("Failed to send return request");
    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse return response");
    assert_eq!(body["status"], "returned");
    assert_eq!(body["borrowing"]["is_active"], false);

    let book: Value = client
        .get(format!("{}/books/{}", BASE_URL, book_id))
        .send()
        .await
        .expect("Failed to fetch book")
        .json()
        .await
        .expect("Failed to parse book");
    assert_eq!(book["inventory"], 1);

    // Second return is rejected and changes nothing
    let response = client
        .post(format!("{}/borrowings/{}/return", BASE_URL, borrowing_id))
        .header("Authorization", format!("Bearer {}", reader_token))
        .send()
        .await
        .expect("Failed to send return request");
    assert_eq!(response.status(), 409);

    let book: Value = client
        .get(format!("{}/books/{}", BASE_URL, book_id))
        .send()
        .await
        .expect("Failed to fetch book")
        .json()
        .await
        .expect("Failed to parse book");
    assert_eq!(book["inventory"], 1);
}

#[tokio::test]
#[ignore]
async fn test_non_staff_sees_only_own_borrowings() {
    let client = Client::new();
    let staff_token = get_staff_token(&client).await;
    let reader_a = register_and_login(&client).await;
    let reader_b = register_and_login(&client).await;
    let book_id = create_book(&client, &staff_token, 1).await;

    let borrow: Value = borrow_book(&client, &reader_a, book_id, 7)
        .await
        .json()
        .await
        .expect("Failed to parse borrowing");
    let borrowing_id = borrow["id"].as_i64().expect("No borrowing id");

    // Another reader cannot see it
    let response = client
        .get(format!("{}/borrowings/{}", BASE_URL, borrowing_id))
        .header("Authorization", format!("Bearer {}", reader_b))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 404);

    // Staff can
    let response = client
        .get(format!("{}/borrowings/{}", BASE_URL, borrowing_id))
        .header("Authorization", format!("Bearer {}", staff_token))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
}
