//! Wire types of the PayWise REST API.
//!
//! Only the fields the client reads are typed. Everything else the server
//! sends is kept in `extra` and serialized back unchanged.

use chrono::NaiveDate;
use paywise_auth::UserProfile;
use paywise_utils::SecretString;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use url::Url;

/// Expense category, e.g. `{ "id": 1, "name": "Food", "icon": "...", "color": "#FF6B6B" }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub id: i64,
    pub name: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Category or group as nested inside an expense.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedRef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub name: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub id: i64,
    #[serde(default)]
    pub description: String,
    pub amount: Decimal,
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<NamedRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<NamedRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_detected_category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paid_by: Option<Payer>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Expense {
    /// Category name, else the AI-detected category, else `"Other"`.
    #[must_use]
    pub fn category_label(&self) -> &str {
        self.category
            .as_ref()
            .map(|c| c.name.as_str())
            .filter(|n| !n.is_empty())
            .or_else(|| self.ai_detected_category.as_deref().filter(|n| !n.is_empty()))
            .unwrap_or("Other")
    }

    #[must_use]
    pub fn group_name(&self) -> Option<&str> {
        self.group.as_ref().map(|g| g.name.as_str())
    }

    /// Payer's first name, else email, else `"You"`.
    #[must_use]
    pub fn payer_label(&self) -> &str {
        let payer = self.paid_by.as_ref();
        payer
            .and_then(|p| p.first_name.as_deref())
            .filter(|n| !n.is_empty())
            .or_else(|| payer.and_then(|p| p.email.as_deref()).filter(|e| !e.is_empty()))
            .unwrap_or("You")
    }
}

/// `GET expenses/expenses/summary/`. Missing or null numbers read as zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExpenseSummary {
    #[serde(default, deserialize_with = "zero_if_null")]
    pub total_expenses: Decimal,
    #[serde(default, deserialize_with = "zero_if_null")]
    pub month_expenses: Decimal,
    #[serde(default, deserialize_with = "zero_if_null")]
    pub total_count: u64,
    #[serde(default, deserialize_with = "zero_if_null")]
    pub owed_amount: Decimal,
    #[serde(default, deserialize_with = "zero_if_null")]
    pub category_breakdown: Vec<CategoryBreakdown>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryBreakdown {
    /// `null` for expenses without a category.
    #[serde(rename = "category__name", default)]
    pub category_name: Option<String>,
    #[serde(default, deserialize_with = "zero_if_null")]
    pub total: Decimal,
    #[serde(default, deserialize_with = "zero_if_null")]
    pub count: u64,
}

fn zero_if_null<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Where a [`CategoryDetection`] came from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DetectionSource {
    /// `POST expenses/expenses/detect_category/`
    #[default]
    Server,
    /// Local keyword guesser, used when the server call failed.
    Keywords,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryDetection {
    pub category: String,
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub reasoning: Option<String>,
    #[serde(skip)]
    pub source: DetectionSource,
}

#[derive(Debug, Serialize)]
pub(crate) struct DetectCategoryRequest<'a> {
    pub(crate) description: &'a str,
    #[serde(with = "rust_decimal::serde::float")]
    pub(crate) amount: Decimal,
}

/// Query filters of `GET expenses/expenses/`. Category and group match by
/// name; dates are inclusive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpenseFilter {
    pub category: Option<String>,
    pub group: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl ExpenseFilter {
    /// Append the set filters as query parameters.
    pub(crate) fn apply(&self, url: &mut Url) {
        if *self == Self::default() {
            return;
        }
        let mut query = url.query_pairs_mut();
        if let Some(category) = &self.category {
            query.append_pair("category", category);
        }
        if let Some(group) = &self.group {
            query.append_pair("group", group);
        }
        if let Some(date) = self.start_date {
            query.append_pair("start_date", &date.to_string());
        }
        if let Some(date) = self.end_date {
            query.append_pair("end_date", &date.to_string());
        }
    }
}

/// Body of `POST expenses/expenses/` and `PATCH`/`PUT expenses/expenses/{id}/`.
///
/// `paid_by_id` is never sent; the server defaults it to the caller.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExpensePayload {
    pub description: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_id: Option<i64>,
    pub notes: String,
}

#[derive(Serialize)]
pub(crate) struct LoginRequest<'a> {
    pub(crate) email: &'a str,
    pub(crate) password: &'a SecretString,
}

/// Body of `POST auth/register/`.
#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password: SecretString,
    pub confirm_password: SecretString,
    pub agree_to_terms: bool,
}

/// Success body of login and registration.
#[derive(Debug, Deserialize)]
pub(crate) struct AuthResponse {
    #[serde(default)]
    pub(crate) message: Option<String>,
    pub(crate) user: UserProfile,
    pub(crate) tokens: TokenPair,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TokenPair {
    pub(crate) refresh: SecretString,
    pub(crate) access: SecretString,
}

#[derive(Serialize)]
pub(crate) struct LogoutRequest<'a> {
    pub(crate) refresh: &'a SecretString,
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use serde_json::json;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn expense_keeps_unknown_fields() {
        let raw = json!({
            "id": 4,
            "description": "Dinner at Toit",
            "amount": "1250.50",
            "date": "2026-03-14",
            "category": {"id": 1, "name": "Food", "icon": "x"},
            "group": null,
            "is_split": true,
            "splits": [{"user": 2, "amount": "625.25"}]
        });
        let expense: Expense = serde_json::from_value(raw).unwrap();
        assert_eq!(expense.amount, dec("1250.50"));
        assert_eq!(expense.category_label(), "Food");
        assert_eq!(expense.category.as_ref().unwrap().extra["icon"], "x");
        assert!(expense.group.is_none());
        assert_eq!(expense.extra["is_split"], true);

        let back = serde_json::to_value(&expense).unwrap();
        assert_eq!(back["splits"][0]["amount"], "625.25");
    }

    #[test]
    fn labels_fall_back() {
        let expense: Expense = serde_json::from_value(json!({
            "id": 1,
            "amount": 10,
            "date": "2026-01-01",
            "ai_detected_category": "Transport",
            "paid_by": {"email": "ravi@paywise.in"}
        }))
        .unwrap();
        assert_eq!(expense.category_label(), "Transport");
        assert_eq!(expense.payer_label(), "ravi@paywise.in");

        let bare: Expense =
            serde_json::from_value(json!({"id": 2, "amount": "1", "date": "2026-01-01"}))
                .unwrap();
        assert_eq!(bare.category_label(), "Other");
        assert_eq!(bare.payer_label(), "You");
        assert_eq!(bare.group_name(), None);
    }

    #[test]
    fn summary_defaults_missing_and_null_numbers() {
        let summary: ExpenseSummary = serde_json::from_value(json!({
            "total_expenses": 1520.75,
            "month_expenses": null,
            "category_breakdown": [
                {"category__name": "Food", "total": "1200.00", "count": 3},
                {"category__name": null, "total": 320.75, "count": 1}
            ]
        }))
        .unwrap();
        assert_eq!(summary.total_expenses, dec("1520.75"));
        assert_eq!(summary.month_expenses, Decimal::ZERO);
        assert_eq!(summary.total_count, 0);
        assert_eq!(summary.owed_amount, Decimal::ZERO);
        assert_eq!(summary.category_breakdown[1].category_name, None);
        assert_eq!(summary.category_breakdown[0].total, dec("1200"));
    }

    #[test]
    fn payload_omits_unresolved_ids() {
        let payload = ExpensePayload {
            description: "Fuel".to_owned(),
            amount: dec("1999.5"),
            date: NaiveDate::from_ymd_opt(2026, 2, 1).unwrap(),
            category_id: Some(3),
            group_id: None,
            notes: "AI detected category: Transport".to_owned(),
        };
        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            json!({
                "description": "Fuel",
                "amount": 1999.5,
                "date": "2026-02-01",
                "category_id": 3,
                "notes": "AI detected category: Transport"
            })
        );
    }

    #[test]
    fn filter_builds_query() {
        let mut url = Url::parse("http://127.0.0.1:8000/api/expenses/expenses/").unwrap();
        ExpenseFilter {
            category: Some("Food".to_owned()),
            group: Some("Goa Trip".to_owned()),
            start_date: NaiveDate::from_ymd_opt(2026, 1, 1),
            end_date: None,
        }
        .apply(&mut url);
        assert_eq!(url.query(), Some("category=Food&group=Goa+Trip&start_date=2026-01-01"));

        let mut plain = Url::parse("http://127.0.0.1:8000/api/expenses/expenses/").unwrap();
        ExpenseFilter::default().apply(&mut plain);
        assert_eq!(plain.query(), None);
    }
}
