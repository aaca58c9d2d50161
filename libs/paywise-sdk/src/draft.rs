use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;

use crate::error::ApiError;
use crate::models::{Category, Expense, ExpensePayload, Group};

/// Descriptions longer than this many characters trigger category detection.
pub const DETECTION_MIN_CHARS: usize = 3;

/// In-progress state of the add/edit expense form.
///
/// All fields are kept as entered; parsing and name resolution happen in
/// [`to_payload`](Self::to_payload).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpenseDraft {
    pub description: String,
    pub amount: String,
    pub date: NaiveDate,
    pub category: String,
    pub group: String,
    pub detected_category: String,
}

impl Default for ExpenseDraft {
    fn default() -> Self {
        Self::for_date(Utc::now().date_naive())
    }
}

impl ExpenseDraft {
    /// Empty draft dated today (UTC).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn for_date(date: NaiveDate) -> Self {
        Self {
            description: String::new(),
            amount: String::new(),
            date,
            category: String::new(),
            group: String::new(),
            detected_category: String::new(),
        }
    }

    /// Draft pre-filled from an existing expense, for editing.
    #[must_use]
    pub fn from_expense(expense: &Expense) -> Self {
        let category_name = expense
            .category
            .as_ref()
            .map(|c| c.name.clone())
            .filter(|n| !n.is_empty());
        let ai_category = expense
            .ai_detected_category
            .clone()
            .filter(|n| !n.is_empty());

        Self {
            description: expense.description.clone(),
            amount: expense.amount.to_string(),
            date: expense.date,
            category: category_name
                .clone()
                .or_else(|| ai_category.clone())
                .unwrap_or_default(),
            group: expense.group_name().unwrap_or_default().to_owned(),
            detected_category: ai_category.or(category_name).unwrap_or_default(),
        }
    }

    /// Update the description. Returns `true` when it is long enough for
    /// category detection to run.
    pub fn set_description(&mut self, description: impl Into<String>) -> bool {
        self.description = description.into();
        self.description.chars().count() > DETECTION_MIN_CHARS
    }

    /// Record a detection result as both the detected and the chosen category.
    pub fn apply_detection(&mut self, category: impl Into<String>) {
        let category = category.into();
        self.category.clone_from(&category);
        self.detected_category = category;
    }

    /// Amount sent along with a detection request; unparseable input is zero.
    #[must_use]
    pub fn detection_amount(&self) -> Decimal {
        self.amount.trim().parse().unwrap_or_default()
    }

    /// Build the request body.
    ///
    /// `category_id` and `group_id` are looked up by exact name and omitted
    /// when nothing matches.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidAmount`] if the amount is not a number.
    pub fn to_payload(
        &self,
        categories: &[Category],
        groups: &[Group],
    ) -> Result<ExpensePayload, ApiError> {
        let amount: Decimal = self
            .amount
            .trim()
            .parse()
            .map_err(|_| ApiError::InvalidAmount(self.amount.clone()))?;

        Ok(ExpensePayload {
            description: self.description.clone(),
            amount,
            date: self.date,
            category_id: categories
                .iter()
                .find(|c| c.name == self.category)
                .map(|c| c.id),
            group_id: groups.iter().find(|g| g.name == self.group).map(|g| g.id),
            notes: format!("AI detected category: {}", self.detected_category),
        })
    }

    /// Back to an empty draft dated today.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
