use http::StatusCode;
use paywise_auth::{AuthenticatedClient, format_http_error};
use rust_decimal::Decimal;

use crate::category::guess_category;
use crate::error::{ApiError, read_session_json};
use crate::models::{
    Category, CategoryDetection, DetectCategoryRequest, DetectionSource, Expense, ExpenseFilter,
    ExpensePayload, ExpenseSummary, Group,
};

/// `expenses/*` endpoints. Obtained from
/// [`PayWiseClient::expenses`](crate::PayWiseClient::expenses).
pub struct ExpensesApi<'a> {
    client: &'a AuthenticatedClient,
}

impl<'a> ExpensesApi<'a> {
    pub(crate) fn new(client: &'a AuthenticatedClient) -> Self {
        Self { client }
    }

    /// # Errors
    ///
    /// [`ApiError::SessionExpired`], [`ApiError::Rejected`] or a transport error.
    pub async fn categories(&self) -> Result<Vec<Category>, ApiError> {
        read_session_json(self.client.get("expenses/categories/").await?).await
    }

    /// Groups the signed-in user is a member of.
    ///
    /// # Errors
    ///
    /// [`ApiError::SessionExpired`], [`ApiError::Rejected`] or a transport error.
    pub async fn groups(&self) -> Result<Vec<Group>, ApiError> {
        read_session_json(self.client.get("expenses/groups/").await?).await
    }

    /// # Errors
    ///
    /// [`ApiError::SessionExpired`], [`ApiError::Rejected`] or a transport error.
    pub async fn expenses(&self, filter: &ExpenseFilter) -> Result<Vec<Expense>, ApiError> {
        let mut url = self.client.endpoint("expenses/expenses/")?;
        filter.apply(&mut url);
        read_session_json(self.client.get(url.as_str()).await?).await
    }

    /// # Errors
    ///
    /// [`ApiError::SessionExpired`], [`ApiError::Rejected`] or a transport error.
    pub async fn summary(&self) -> Result<ExpenseSummary, ApiError> {
        read_session_json(self.client.get("expenses/expenses/summary/").await?).await
    }

    /// # Errors
    ///
    /// [`ApiError::Rejected`] carries the server's validation errors.
    pub async fn create_expense(&self, payload: &ExpensePayload) -> Result<Expense, ApiError> {
        read_session_json(self.client.post("expenses/expenses/", payload).await?).await
    }

    /// `PATCH` the expense; a 404 is retried once as `PUT` on the same URL.
    ///
    /// # Errors
    ///
    /// [`ApiError::Rejected`] carries the server's validation errors.
    pub async fn update_expense(
        &self,
        id: i64,
        payload: &ExpensePayload,
    ) -> Result<Expense, ApiError> {
        let path = format!("expenses/expenses/{id}/");
        let mut response = self.client.patch(&path, payload).await?;
        if response.status() == StatusCode::NOT_FOUND {
            tracing::debug!(id, "PATCH returned 404, retrying as PUT");
            response = self.client.put(&path, payload).await?;
        }
        read_session_json(response).await
    }

    /// Ask the server to classify an expense. Never fails: any error or
    /// non-2xx answer falls back to [`guess_category`].
    pub async fn detect_category(&self, description: &str, amount: Decimal) -> CategoryDetection {
        let request = DetectCategoryRequest {
            description,
            amount,
        };
        let outcome = match self
            .client
            .post("expenses/expenses/detect_category/", &request)
            .await
        {
            Ok(response) if response.status().is_success() => {
                response.json::<CategoryDetection>().await
            }
            Ok(response) => {
                tracing::debug!(status = %response.status(), "category detection unavailable");
                return keyword_detection(description);
            }
            Err(e) => Err(e),
        };

        match outcome {
            Ok(detection) => detection,
            Err(e) => {
                tracing::warn!("{}", format_http_error(&e, "category detection"));
                keyword_detection(description)
            }
        }
    }
}

fn keyword_detection(description: &str) -> CategoryDetection {
    CategoryDetection {
        category: guess_category(description).name().to_owned(),
        confidence: None,
        reasoning: None,
        source: DetectionSource::Keywords,
    }
}
