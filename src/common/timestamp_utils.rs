use chrono::Local;

/// Current local time rendered with the configured strftime format string.
pub fn current_local_timestamp_str(format_str: &str) -> String {
    Local::now().format(format_str).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_with_the_given_format() {
        let year = current_local_timestamp_str("%Y");
        assert_eq!(year.len(), 4);
        assert!(year.chars().all(|c| c.is_ascii_digit()));
    }
}
