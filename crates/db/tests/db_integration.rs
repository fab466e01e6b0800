//! Database integration tests.
//!
//! These tests require a running `PostgreSQL` instance.
//! Run with: `cargo test --test db_integration -- --ignored`
//!
//! Environment variables:
//!   `TEST_DB_HOST` (default: localhost)
//!   `TEST_DB_PORT` (default: 5433)
//!   `TEST_DB_USER` (default: `aduan_test`)
//!   `TEST_DB_PASSWORD` (default: `aduan_test`)
//!   `TEST_DB_NAME` (default: `aduan_test`)

#![allow(clippy::unwrap_used, clippy::expect_used)]

use aduan_db::entities::complaint::{self, ComplaintCategory, ComplaintStatus, Priority};
use aduan_db::entities::{feedback, user};
use aduan_db::repositories::{ComplaintRepository, FeedbackRepository, UserRepository};
use aduan_db::test_utils::{TestDatabase, TestDbConfig};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, Set};

async fn seed_student(repo: &UserRepository, id: &str) -> user::Model {
    repo.create(user::ActiveModel {
        id: Set(id.to_string()),
        name: Set("Aminah".to_string()),
        email: Set(format!("{id}@pelajar.edu.my")),
        password_hash: Set("hash".to_string()),
        role: Set(user::UserRole::Student),
        student_number: Set(Some("S2001".to_string())),
        registered_at: Set(Utc::now().into()),
    })
    .await
    .unwrap()
}

fn complaint_for(student: &user::Model, id: &str) -> complaint::ActiveModel {
    let now = Utc::now();
    complaint::ActiveModel {
        id: Set(id.to_string()),
        student_id: Set(student.id.clone()),
        student_name: Set(student.name.clone()),
        student_email: Set(student.email.clone()),
        category: Set(ComplaintCategory::Hostel),
        title: Set("Paip bocor".to_string()),
        description: Set("Paip di bilik air tingkat 2 bocor".to_string()),
        attachment_key: Set(None),
        attachment_name: Set(None),
        attachment_type: Set(None),
        attachment_size: Set(None),
        status: Set(ComplaintStatus::New),
        priority: Set(Priority::Low),
        admin_notes: Set(None),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_database_connection() {
    let result = TestDatabase::new().await;
    assert!(result.is_ok(), "Failed to connect: {:?}", result.err());
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_complaint_round_trip_and_filter() {
    let db = TestDatabase::create_unique().await.expect("Failed to create");
    let conn = db.connection();

    let users = UserRepository::new(conn.clone());
    let complaints = ComplaintRepository::new(conn.clone());

    let student = seed_student(&users, "student1").await;
    let created = complaints
        .create(complaint_for(&student, "ADU01TEST"))
        .await
        .unwrap();

    let fetched = complaints.get_by_id("ADU01TEST").await.unwrap();
    assert_eq!(fetched, created);
    assert_eq!(fetched.status, ComplaintStatus::New);

    let hostel = complaints
        .find_filtered(None, Some(ComplaintCategory::Hostel), None)
        .await
        .unwrap();
    assert_eq!(hostel.len(), 1);

    let academic = complaints
        .find_filtered(None, Some(ComplaintCategory::Academic), None)
        .await
        .unwrap();
    assert!(academic.is_empty());

    drop(complaints);
    drop(users);
    drop(conn);
    db.drop_database().await.unwrap();
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_deleting_complaint_removes_feedback() {
    let db = TestDatabase::create_unique().await.expect("Failed to create");
    let conn = db.connection();

    let users = UserRepository::new(conn.clone());
    let complaints = ComplaintRepository::new(conn.clone());
    let feedback_repo = FeedbackRepository::new(conn.clone());

    let student = seed_student(&users, "student2").await;
    complaints
        .create(complaint_for(&student, "ADU02TEST"))
        .await
        .unwrap();

    feedback::ActiveModel {
        id: Set("fb1".to_string()),
        complaint_id: Set("ADU02TEST".to_string()),
        student_id: Set(student.id.clone()),
        body: Set("Terima kasih".to_string()),
        created_at: Set(Utc::now().into()),
    }
    .insert(conn.as_ref())
    .await
    .unwrap();

    assert!(complaints.delete("ADU02TEST").await.unwrap());
    assert!(
        feedback_repo
            .find_by_complaint("ADU02TEST")
            .await
            .unwrap()
            .is_empty()
    );
    assert!(!complaints.delete("ADU02TEST").await.unwrap());

    drop(feedback_repo);
    drop(complaints);
    drop(users);
    drop(conn);
    db.drop_database().await.unwrap();
}

#[test]
fn test_config_from_env() {
    let config = TestDbConfig::default();
    assert!(!config.host.is_empty());
    assert!(config.port > 0);
    assert!(!config.username.is_empty());
    assert!(!config.database.is_empty());
}
