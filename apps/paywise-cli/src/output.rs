//! Plain-text rendering of API results.

use std::io::{self, Write};

use paywise_auth::UserProfile;
use paywise_sdk::{
    Category, CategoryDetection, DetectionSource, Expense, ExpenseSummary, Group, category_icon,
    format_inr,
};

pub fn user(out: &mut impl Write, user: &UserProfile) -> io::Result<()> {
    let full_name = match user.last_name.as_deref() {
        Some(last) if !last.is_empty() => format!("{} {last}", user.display_name()),
        _ => user.display_name().to_owned(),
    };
    writeln!(out, "{full_name} <{}> (id {})", user.email, user.id)
}

pub fn summary(
    out: &mut impl Write,
    summary: &ExpenseSummary,
    categories: &[Category],
) -> io::Result<()> {
    writeln!(out, "Total expenses  {}", format_inr(summary.total_expenses))?;
    writeln!(out, "This month      {}", format_inr(summary.month_expenses))?;
    writeln!(out, "Expenses        {}", summary.total_count)?;
    writeln!(out, "You are owed    {}", format_inr(summary.owed_amount))?;

    if summary.category_breakdown.is_empty() {
        return Ok(());
    }
    writeln!(out)?;
    writeln!(out, "By category")?;
    for row in &summary.category_breakdown {
        let name = row.category_name.as_deref().unwrap_or("Other");
        writeln!(
            out,
            "  {} {name:<16} {:>14}  ({})",
            category_icon(name, categories),
            format_inr(row.total),
            row.count
        )?;
    }
    Ok(())
}

pub fn categories(out: &mut impl Write, categories: &[Category]) -> io::Result<()> {
    if categories.is_empty() {
        return writeln!(out, "No categories.");
    }
    for category in categories {
        writeln!(
            out,
            "{:>4}  {} {}",
            category.id,
            category_icon(&category.name, categories),
            category.name
        )?;
    }
    Ok(())
}

pub fn groups(out: &mut impl Write, groups: &[Group]) -> io::Result<()> {
    if groups.is_empty() {
        return writeln!(out, "No groups yet.");
    }
    for group in groups {
        writeln!(out, "{:>4}  {}", group.id, group.name)?;
    }
    Ok(())
}

pub fn expenses(
    out: &mut impl Write,
    expenses: &[Expense],
    categories: &[Category],
) -> io::Result<()> {
    if expenses.is_empty() {
        return writeln!(out, "No expenses found.");
    }
    for expense in expenses {
        expense_line(out, expense, categories)?;
    }
    Ok(())
}

pub fn expense_line(
    out: &mut impl Write,
    expense: &Expense,
    categories: &[Category],
) -> io::Result<()> {
    let label = expense.category_label();
    write!(
        out,
        "#{:<5} {}  {} {:<24} {:>14}  {label}",
        expense.id,
        expense.date,
        category_icon(label, categories),
        expense.description,
        format_inr(expense.amount),
    )?;
    if let Some(group) = expense.group_name() {
        write!(out, " [{group}]")?;
    }
    writeln!(out, "  paid by {}", expense.payer_label())
}

pub fn detection(out: &mut impl Write, detection: &CategoryDetection) -> io::Result<()> {
    let source = match detection.source {
        DetectionSource::Server => "server",
        DetectionSource::Keywords => "keywords",
    };
    match detection.confidence {
        Some(confidence) => writeln!(
            out,
            "{} ({:.0}% confidence, {source})",
            detection.category,
            confidence * 100.0
        )?,
        None => writeln!(out, "{} ({source})", detection.category)?,
    }
    if let Some(reasoning) = detection.reasoning.as_deref() {
        writeln!(out, "  {reasoning}")?;
    }
    Ok(())
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use paywise_sdk::CategoryBreakdown;

    fn render(f: impl FnOnce(&mut Vec<u8>) -> io::Result<()>) -> String {
        let mut buf = Vec::new();
        f(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    fn expense(value: serde_json::Value) -> Expense {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn summary_uses_rupee_grouping() {
        let summary = ExpenseSummary {
            total_expenses: "1234567.5".parse().unwrap(),
            month_expenses: "4520".parse().unwrap(),
            total_count: 12,
            category_breakdown: vec![CategoryBreakdown {
                category_name: Some("Food".to_owned()),
                total: "1250".parse().unwrap(),
                count: 3,
            }],
            ..ExpenseSummary::default()
        };
        let text = render(|out| super::summary(out, &summary, &[]));
        assert!(text.contains("\u{20b9}12,34,567.5"));
        assert!(text.contains("\u{20b9}4,520"));
        assert!(text.contains("By category"));
        assert!(text.contains("Food"));
    }

    #[test]
    fn expense_line_shows_group_and_payer() {
        let e = expense(serde_json::json!({
            "id": 4, "description": "Fuel", "amount": "1999.50", "date": "2026-02-01",
            "group": {"id": 9, "name": "Goa Trip"},
            "paid_by": {"first_name": "Ravi"}
        }));
        let text = render(|out| expense_line(out, &e, &[]));
        assert!(text.starts_with("#4"));
        assert!(text.contains("2026-02-01"));
        assert!(text.contains("\u{20b9}1,999.5"));
        assert!(text.contains("Other"));
        assert!(text.contains("[Goa Trip]"));
        assert!(text.trim_end().ends_with("paid by Ravi"));
    }

    #[test]
    fn empty_lists_say_so() {
        assert_eq!(render(|out| expenses(out, &[], &[])), "No expenses found.\n");
        assert_eq!(render(|out| groups(out, &[])), "No groups yet.\n");
    }

    #[test]
    fn detection_mentions_source() {
        let server = CategoryDetection {
            category: "Transport".to_owned(),
            confidence: Some(0.95),
            reasoning: Some("cab ride".to_owned()),
            source: DetectionSource::Server,
        };
        let text = render(|out| detection(out, &server));
        assert!(text.starts_with("Transport (95% confidence, server)"));
        assert!(text.contains("cab ride"));

        let local = CategoryDetection {
            category: "Bills".to_owned(),
            confidence: None,
            reasoning: None,
            source: DetectionSource::Keywords,
        };
        assert_eq!(render(|out| detection(out, &local)), "Bills (keywords)\n");
    }
}
