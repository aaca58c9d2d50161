use std::io::Write;

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Args, Subcommand};
use paywise_sdk::{ExpenseDraft, ExpenseFilter, ExpensePayload, ExpensesApi, PayWiseClient};

use crate::output;

#[derive(Args)]
pub struct ExpensesArgs {
    #[command(subcommand)]
    command: ExpensesCommand,
}

#[derive(Subcommand)]
enum ExpensesCommand {
    /// List expenses, optionally filtered.
    List(ListArgs),
    /// Record a new expense; the category is detected from the description.
    Add(FormArgs),
    /// Replace an existing expense.
    Edit {
        id: i64,
        #[command(flatten)]
        form: FormArgs,
    },
}

#[derive(Args)]
struct ListArgs {
    #[arg(long)]
    category: Option<String>,
    #[arg(long)]
    group: Option<String>,
    /// Earliest date, YYYY-MM-DD.
    #[arg(long)]
    from: Option<NaiveDate>,
    /// Latest date, YYYY-MM-DD.
    #[arg(long)]
    to: Option<NaiveDate>,
}

#[derive(Args)]
struct FormArgs {
    #[arg(short = 'd', long)]
    description: String,
    #[arg(short = 'a', long)]
    amount: String,
    /// Defaults to today.
    #[arg(long)]
    date: Option<NaiveDate>,
    /// Group name.
    #[arg(short = 'g', long)]
    group: Option<String>,
    /// Skip detection and use this category.
    #[arg(long)]
    category: Option<String>,
}

impl ExpensesArgs {
    pub async fn run(&self, client: &PayWiseClient, out: &mut impl Write) -> anyhow::Result<()> {
        let api = client.expenses();
        match &self.command {
            ExpensesCommand::List(args) => {
                let filter = ExpenseFilter {
                    category: args.category.clone(),
                    group: args.group.clone(),
                    start_date: args.from,
                    end_date: args.to,
                };
                let expenses = api.expenses(&filter).await?;
                output::expenses(out, &expenses, &[])?;
            }
            ExpensesCommand::Add(form) => {
                let payload = form.submit(&api).await?;
                let created = api
                    .create_expense(&payload)
                    .await
                    .context("could not save expense")?;
                write!(out, "Added ")?;
                output::expense_line(out, &created, &[])?;
            }
            ExpensesCommand::Edit { id, form } => {
                let payload = form.submit(&api).await?;
                let updated = api
                    .update_expense(*id, &payload)
                    .await
                    .with_context(|| format!("could not update expense #{id}"))?;
                write!(out, "Updated ")?;
                output::expense_line(out, &updated, &[])?;
            }
        }
        Ok(())
    }
}

impl FormArgs {
    /// Fill in the category, resolve names to ids and build the request body.
    async fn submit(&self, api: &ExpensesApi<'_>) -> anyhow::Result<ExpensePayload> {
        let mut draft = match self.date {
            Some(date) => ExpenseDraft::for_date(date),
            None => ExpenseDraft::new(),
        };
        let detectable = draft.set_description(self.description.trim());
        draft.amount.clone_from(&self.amount);
        draft.group = self.group.clone().unwrap_or_default();

        match &self.category {
            Some(category) => draft.category.clone_from(category),
            None if detectable => {
                let detection = api
                    .detect_category(&draft.description, draft.detection_amount())
                    .await;
                tracing::info!(category = %detection.category, "category detected");
                draft.apply_detection(detection.category);
            }
            None => {}
        }

        let categories = api.categories().await?;
        let groups = match &self.group {
            Some(name) => {
                let groups = api.groups().await?;
                anyhow::ensure!(
                    groups.iter().any(|g| g.name == *name),
                    "no group named '{name}'"
                );
                groups
            }
            None => Vec::new(),
        };

        Ok(draft.to_payload(&categories, &groups)?)
    }
}
