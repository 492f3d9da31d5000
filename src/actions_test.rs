use std::sync::Arc;

use super::*;
use crate::notice::NoticeLevel;
use crate::session::SessionStore;
use crate::storage::MemoryStorage;

fn complete_form() -> ReviewForm {
    ReviewForm {
        assignment_id: "1".to_owned(),
        review_id: "r1".to_owned(),
        feedback: "Clear structure, weak tests.".to_owned(),
        rating: 3,
    }
}

/// Client pointed at a port nothing listens on.
fn unreachable_client() -> ApiClient {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    let session = Arc::new(SessionStore::open(MemoryStorage::new()).unwrap());
    ApiClient::new(&format!("http://127.0.0.1:{port}/api"), session).unwrap()
}

#[test]
fn complete_form_builds_submission() {
    let submission = complete_form().submission().unwrap();
    assert_eq!(submission.review_id, "r1");
    assert_eq!(submission.rating, 3);
}

#[test]
fn unrated_form_is_incomplete() {
    let form = ReviewForm { rating: 0, ..complete_form() };
    assert_eq!(form.submission().unwrap_err(), Notice::warning("Please complete all fields."));
}

#[test]
fn blank_feedback_is_incomplete() {
    let form = ReviewForm { feedback: "   ".to_owned(), ..complete_form() };
    assert_eq!(form.submission().unwrap_err().level, NoticeLevel::Warning);
}

#[test]
fn feedback_is_sent_as_typed() {
    let form = ReviewForm { feedback: "  Needs more tests.\n".to_owned(), ..complete_form() };
    assert_eq!(form.submission().unwrap().feedback, "  Needs more tests.\n");
}

#[test]
fn missing_review_is_incomplete() {
    let form = ReviewForm { review_id: String::new(), ..complete_form() };
    assert!(form.submission().is_err());
}

#[test]
fn rating_above_five_is_rejected() {
    let form = ReviewForm { rating: 6, ..complete_form() };
    assert_eq!(form.submission().unwrap_err(), Notice::warning(RATING_RANGE_MESSAGE));
}

#[tokio::test]
async fn blank_message_is_ignored() {
    assert_eq!(send_message(&unreachable_client(), "  \n ").await, None);
}

#[tokio::test]
async fn unreachable_backend_yields_generic_message_failure() {
    let notice = send_message(&unreachable_client(), "hello").await.unwrap();
    assert_eq!(notice, Notice::error("Failed to send message."));
}

#[tokio::test]
async fn unreachable_backend_yields_generic_upload_failure() {
    let notice = upload_file(&unreachable_client(), "essay.pdf", b"%PDF".to_vec()).await;
    assert_eq!(notice, Notice::error("Failed to upload file."));
}

#[tokio::test]
async fn unreachable_backend_yields_generic_review_failure() {
    let notice = submit_review(&unreachable_client(), &complete_form()).await;
    assert_eq!(notice, Notice::error("Failed to submit review."));
}

#[tokio::test]
async fn incomplete_review_warns_without_request() {
    let notice = submit_review(&unreachable_client(), &ReviewForm::default()).await;
    assert_eq!(notice.level, NoticeLevel::Warning);
}

#[tokio::test]
async fn unreachable_backend_yields_generic_fetch_failure() {
    let err = fetch_reviews(&unreachable_client(), "1").await.unwrap_err();
    assert_eq!(err, Notice::error("Failed to fetch reviews."));
}
