use rust_decimal::{Decimal, RoundingStrategy};

const RUPEE: &str = "\u{20b9}";
/// Same cap as the `en-IN` locale formatter.
const MAX_FRACTION_DIGITS: u32 = 3;

/// Format an amount in rupees with Indian digit grouping.
///
/// The last three integer digits form one group and the rest are grouped in
/// pairs: `1234567.5` renders as `₹12,34,567.5`. At most three decimals are
/// kept (rounded half away from zero) and trailing zeros are dropped.
#[must_use]
pub fn format_inr(amount: Decimal) -> String {
    let rounded = amount
        .round_dp_with_strategy(MAX_FRACTION_DIGITS, RoundingStrategy::MidpointAwayFromZero)
        .normalize();
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };

    let digits = rounded.abs().to_string();
    let (int_part, frac_part) = match digits.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (digits.as_str(), None),
    };

    let mut out = format!("{RUPEE}{sign}{}", group_indian(int_part));
    if let Some(frac) = frac_part {
        out.push('.');
        out.push_str(frac);
    }
    out
}

fn group_indian(int_part: &str) -> String {
    if int_part.len() <= 3 {
        return int_part.to_owned();
    }
    let (head, tail) = int_part.split_at(int_part.len() - 3);

    let mut groups: Vec<&str> = Vec::new();
    let mut rest = head;
    while rest.len() > 2 {
        let (front, pair) = rest.split_at(rest.len() - 2);
        groups.push(pair);
        rest = front;
    }
    groups.push(rest);
    groups.reverse();

    format!("{},{tail}", groups.join(","))
}
