//! Collaboration and review actions.
//!
//! Each action sends one request and reports the result as a [`Notice`].
//! Failures are logged with their detail and surfaced only as the generic
//! message a view would toast; nothing is retried or propagated.

#[cfg(test)]
#[path = "actions_test.rs"]
mod actions_test;

use crate::net::api::ApiClient;
use crate::net::types::{ReviewSubmission, ReviewSummary};
use crate::notice::Notice;

pub const INCOMPLETE_REVIEW_MESSAGE: &str = "Please complete all fields.";
pub const RATING_RANGE_MESSAGE: &str = "Rating must be between 1 and 5.";
pub const MAX_RATING: u8 = 5;

/// Post a chat message. Blank messages are ignored: no request, no notice.
pub async fn send_message(api: &ApiClient, message: &str) -> Option<Notice> {
    if message.trim().is_empty() {
        return None;
    }
    match api.post_message(message).await {
        Ok(()) => Some(Notice::success("Message sent!")),
        Err(e) => {
            tracing::error!(error = %e, "failed to send message");
            Some(Notice::error("Failed to send message."))
        }
    }
}

/// Upload one file to the collaboration workspace.
pub async fn upload_file(api: &ApiClient, file_name: &str, contents: Vec<u8>) -> Notice {
    let size = contents.len();
    match api.upload_file(file_name, contents).await {
        Ok(()) => {
            tracing::info!(file_name, size, "file uploaded");
            Notice::success("File uploaded!")
        }
        Err(e) => {
            tracing::error!(error = %e, file_name, "failed to upload file");
            Notice::error("Failed to upload file.")
        }
    }
}

/// List the reviews available for an assignment.
///
/// # Errors
///
/// Returns the notice to show when the listing cannot be fetched.
pub async fn fetch_reviews(api: &ApiClient, assignment_id: &str) -> Result<Vec<ReviewSummary>, Notice> {
    api.fetch_reviews(assignment_id).await.map_err(|e| {
        tracing::error!(error = %e, assignment_id, "failed to fetch reviews");
        Notice::error("Failed to fetch reviews.")
    })
}

/// Review form as filled in by the user. A rating of 0 means "not rated".
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReviewForm {
    pub assignment_id: String,
    pub review_id: String,
    pub feedback: String,
    pub rating: u8,
}

impl ReviewForm {
    /// # Errors
    ///
    /// Returns a warning notice if a field is missing or the rating is out of range.
    pub fn submission(&self) -> Result<ReviewSubmission, Notice> {
        let assignment_id = self.assignment_id.trim();
        let review_id = self.review_id.trim();
        let feedback = self.feedback.trim();
        if assignment_id.is_empty() || review_id.is_empty() || feedback.is_empty() || self.rating == 0 {
            return Err(Notice::warning(INCOMPLETE_REVIEW_MESSAGE));
        }
        if self.rating > MAX_RATING {
            return Err(Notice::warning(RATING_RANGE_MESSAGE));
        }
        Ok(ReviewSubmission {
            assignment_id: assignment_id.to_owned(),
            review_id: review_id.to_owned(),
            feedback: self.feedback.clone(),
            rating: self.rating,
        })
    }
}

/// Validate and submit a review.
pub async fn submit_review(api: &ApiClient, form: &ReviewForm) -> Notice {
    let submission = match form.submission() {
        Ok(submission) => submission,
        Err(warning) => return warning,
    };
    match api.submit_review(&submission).await {
        Ok(()) => Notice::success("Review submitted successfully!"),
        Err(e) => {
            tracing::error!(error = %e, assignment_id = %submission.assignment_id, "failed to submit review");
            Notice::error("Failed to submit review.")
        }
    }
}
