use std::io::Write;

use clap::Args;
use paywise_sdk::PayWiseClient;
use rust_decimal::Decimal;

use crate::output;

/// Summary totals, per-category breakdown and the user's groups.
pub async fn dashboard(client: &PayWiseClient, out: &mut impl Write) -> anyhow::Result<()> {
    let api = client.expenses();
    let summary = api.summary().await?;
    let groups = api.groups().await?;
    // icons only; the seeded set covers the common names
    let categories = api.categories().await.unwrap_or_else(|e| {
        tracing::debug!(error = %e, "categories unavailable, using built-in icons");
        Vec::new()
    });

    if let Some(user) = client.auth().current_user().await? {
        writeln!(out, "Hi, {}!", user.display_name())?;
        writeln!(out)?;
    }
    output::summary(out, &summary, &categories)?;
    writeln!(out)?;
    writeln!(out, "Groups")?;
    output::groups(out, &groups)?;
    Ok(())
}

pub async fn categories(client: &PayWiseClient, out: &mut impl Write) -> anyhow::Result<()> {
    let categories = client.expenses().categories().await?;
    output::categories(out, &categories)?;
    Ok(())
}

pub async fn groups(client: &PayWiseClient, out: &mut impl Write) -> anyhow::Result<()> {
    let groups = client.expenses().groups().await?;
    output::groups(out, &groups)?;
    Ok(())
}

#[derive(Args)]
pub struct DetectArgs {
    description: String,
    #[arg(short = 'a', long, default_value_t = Decimal::ZERO)]
    amount: Decimal,
}

impl DetectArgs {
    pub async fn run(&self, client: &PayWiseClient, out: &mut impl Write) -> anyhow::Result<()> {
        let detection = client
            .expenses()
            .detect_category(&self.description, self.amount)
            .await;
        output::detection(out, &detection)?;
        Ok(())
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::commands::tests::{client, signed_in};
    use httpmock::prelude::*;
    use serde_json::json;

    #[tokio::test]
    async fn dashboard_survives_missing_categories() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/api/expenses/expenses/summary/");
            then.status(200).json_body(json!({
                "total_expenses": "2500.00",
                "month_expenses": "400.00",
                "total_count": 5,
                "owed_amount": null,
                "category_breakdown": [{"category__name": "Travel", "total": "2100.00", "count": 2}]
            }));
        });
        server.mock(|when, then| {
            when.method(GET).path("/api/expenses/groups/");
            then.status(200).json_body(json!([{"id": 9, "name": "Goa Trip"}]));
        });
        server.mock(|when, then| {
            when.method(GET).path("/api/expenses/categories/");
            then.status(500);
        });

        let mut out = Vec::new();
        dashboard(&client(&server, signed_in()), &mut out)
            .await
            .unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("\u{20b9}2,500"));
        assert!(text.contains("Travel"));
        assert!(text.contains("Goa Trip"));
    }

    #[tokio::test]
    async fn detect_prints_fallback() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST)
                .path("/api/expenses/expenses/detect_category/");
            then.status(502);
        });

        let mut out = Vec::new();
        DetectArgs {
            description: "Pharmacy run".to_owned(),
            amount: Decimal::ZERO,
        }
        .run(&client(&server, signed_in()), &mut out)
        .await
        .unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "Healthcare (keywords)\n");
    }
}
