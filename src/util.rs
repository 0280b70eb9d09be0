use serde_json::Value;

const SHORT_ID_EDGE: usize = 4;
const SHORT_ID_THRESHOLD: usize = 16;

/// Abbreviates long account keys to `GABC…WXYZ`; short names pass through.
pub fn short_name(id: &str) -> String {
    let looks_like_key = id.len() > SHORT_ID_THRESHOLD
        && id.chars().all(|c| c.is_ascii_alphanumeric())
        && !id.chars().any(|c| c.is_ascii_lowercase());
    if !looks_like_key {
        return id.to_owned();
    }

    format!(
        "{}…{}",
        &id[..SHORT_ID_EDGE],
        &id[id.len() - SHORT_ID_EDGE..]
    )
}

pub fn format_balance(amount: f64) -> String {
    if !amount.is_finite() {
        return amount.to_string();
    }

    let fixed = format!("{:.7}", amount.abs());
    let (whole, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));
    let fraction = fraction.trim_end_matches('0');

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (index, digit) in whole.chars().enumerate() {
        if index > 0 && (whole.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if amount < 0.0 && (whole != "0" || !fraction.is_empty()) {
        "-"
    } else {
        ""
    };
    if fraction.is_empty() {
        format!("{sign}{grouped}")
    } else {
        format!("{sign}{grouped}.{fraction}")
    }
}

pub fn format_attribute(key: &str, value: &Value) -> String {
    match value {
        Value::Null => "–".to_owned(),
        Value::String(text) if key.contains("balance") => text
            .parse::<f64>()
            .map(format_balance)
            .unwrap_or_else(|_| text.clone()),
        Value::String(text) => text.clone(),
        Value::Number(number) if key.contains("balance") => number
            .as_f64()
            .map(format_balance)
            .unwrap_or_else(|| number.to_string()),
        Value::Number(number) => number.to_string(),
        Value::Bool(flag) => flag.to_string(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn long_account_keys_are_abbreviated() {
        let key = "GAHK7EEG2WWHVKDNT4CEQFZGKF2LGDSW2IVM4S5DP42RBW3K6BTODB4A";
        assert_eq!(short_name(key), "GAHK…DB4A");
        assert_eq!(short_name("Stellar Foundation"), "Stellar Foundation");
        assert_eq!(short_name("USDC"), "USDC");
    }

    #[test]
    fn balances_are_grouped_and_trimmed() {
        assert_eq!(format_balance(1234567.5), "1,234,567.5");
        assert_eq!(format_balance(100.0), "100");
        assert_eq!(format_balance(0.0000001), "0.0000001");
        assert_eq!(format_balance(-42.25), "-42.25");
    }

    #[test]
    fn attributes_render_by_kind() {
        assert_eq!(format_attribute("balance", &json!("2500.5000000")), "2,500.5");
        assert_eq!(format_attribute("home_domain", &json!("example.org")), "example.org");
        assert_eq!(format_attribute("parent_level", &json!(3)), "3");
        assert_eq!(format_attribute("memo", &Value::Null), "–");
        assert_eq!(format_attribute("flags", &json!([1, 2])), "[1,2]");
    }
}
