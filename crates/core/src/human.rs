/// Shortest decimal form of a weight, at most two decimals: `5`, `0.75`, `12.3`.
pub fn human_weight(w: f64) -> String {
    let s = format!("{w:.2}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" {
        "0".to_string()
    } else {
        s.to_string()
    }
}

pub fn human_percent(w: f64) -> String {
    format!("{}%", human_weight(w))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_trailing_zeros() {
        assert_eq!(human_weight(5.0), "5");
        assert_eq!(human_weight(0.75), "0.75");
        assert_eq!(human_weight(12.30), "12.3");
        assert_eq!(human_weight(0.1 + 0.2), "0.3");
        assert_eq!(human_weight(100.0), "100");
        assert_eq!(human_weight(0.0), "0");
    }

    #[test]
    fn percent_suffix() {
        assert_eq!(human_percent(5.0), "5%");
        assert_eq!(human_percent(0.3), "0.3%");
    }
}
