//! Ready-made validators for common Taiwanese storefront inputs.
//!
//! Each returns `None` when the value is acceptable, otherwise the message to
//! show. They can be plugged into [`super::SubmissionValidators`] or used as
//! the validator of a [`super::Condition`].

use std::sync::LazyLock;

use regex::Regex;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid regex"));

static TAIWAN_PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\+886|0)?9\d{8}$").expect("valid regex"));

static TAIWAN_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z][12]\d{8}$").expect("valid regex"));

static SPECIAL_CHAR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"[!@#$%^&*()_+\-=\[\]{};':"\\|,.<>/?]"#).expect("valid regex")
});

/// Area letters in checksum order; a letter's value is its index plus 10.
const ID_LETTERS: &str = "ABCDEFGHJKLMNPQRSTUVXYWZIO";

pub fn email(value: &str) -> Option<String> {
    (!EMAIL_RE.is_match(value)).then(|| "請輸入有效的電子郵件地址".to_string())
}

/// Mobile numbers such as `0912345678` or `+886912345678`; spaces are ignored.
pub fn taiwan_phone(value: &str) -> Option<String> {
    let compact: String = value.chars().filter(|c| !c.is_whitespace()).collect();
    (!TAIWAN_PHONE_RE.is_match(&compact)).then(|| "請輸入有效的台灣手機號碼".to_string())
}

/// National identification number: format first, then the check digit.
pub fn taiwan_id(value: &str) -> Option<String> {
    if !TAIWAN_ID_RE.is_match(value) {
        return Some("請輸入有效的身分證字號格式".to_string());
    }

    let bytes = value.as_bytes();
    let letter_value = ID_LETTERS
        .bytes()
        .position(|letter| letter == bytes[0])
        .map_or(0, |index| index as u32 + 10);
    let digits: Vec<u32> = bytes[1..].iter().map(|b| u32::from(b - b'0')).collect();

    let weighted: u32 = digits[..8]
        .iter()
        .zip((1..=8).rev())
        .map(|(digit, weight)| digit * weight)
        .sum();
    let checksum = letter_value / 10 + (letter_value % 10) * 9 + weighted + digits[8];

    (checksum % 10 != 0).then(|| "身分證字號檢查碼錯誤".to_string())
}

/// Reports the first unmet requirement.
pub fn strong_password(value: &str) -> Option<String> {
    let message = if value.chars().count() < 8 {
        "密碼至少需要 8 個字符"
    } else if !value.chars().any(|c| c.is_ascii_uppercase()) {
        "密碼需要包含至少一個大寫字母"
    } else if !value.chars().any(|c| c.is_ascii_lowercase()) {
        "密碼需要包含至少一個小寫字母"
    } else if !value.chars().any(|c| c.is_ascii_digit()) {
        "密碼需要包含至少一個數字"
    } else if !SPECIAL_CHAR_RE.is_match(value) {
        "密碼需要包含至少一個特殊字符"
    } else {
        return None;
    };
    Some(message.to_string())
}

/// Absolute URL with a scheme.
pub fn url(value: &str) -> Option<String> {
    url::Url::parse(value)
        .err()
        .map(|_| "請輸入有效的 URL".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_addresses() {
        assert_eq!(email("player@example.com"), None);
        assert!(email("player@example").is_some());
        assert!(email("pla yer@example.com").is_some());
        assert_eq!(email("").as_deref(), Some("請輸入有效的電子郵件地址"));
    }

    #[test]
    fn taiwan_phone_numbers() {
        assert_eq!(taiwan_phone("0912345678"), None);
        assert_eq!(taiwan_phone("0912 345 678"), None);
        assert_eq!(taiwan_phone("+886912345678"), None);
        assert_eq!(taiwan_phone("912345678"), None);
        assert_eq!(
            taiwan_phone("0212345678").as_deref(),
            Some("請輸入有效的台灣手機號碼")
        );
    }

    #[test]
    fn taiwan_id_checksum() {
        assert_eq!(taiwan_id("A123456789"), None);
        assert_eq!(
            taiwan_id("A123456788").as_deref(),
            Some("身分證字號檢查碼錯誤")
        );
        assert_eq!(
            taiwan_id("A323456789").as_deref(),
            Some("請輸入有效的身分證字號格式")
        );
        assert_eq!(
            taiwan_id("a123456789").as_deref(),
            Some("請輸入有效的身分證字號格式")
        );
    }

    #[test]
    fn password_reports_first_missing_class() {
        assert_eq!(strong_password("Ab1!").as_deref(), Some("密碼至少需要 8 個字符"));
        assert_eq!(
            strong_password("abcdefg1!").as_deref(),
            Some("密碼需要包含至少一個大寫字母")
        );
        assert_eq!(
            strong_password("ABCDEFG1!").as_deref(),
            Some("密碼需要包含至少一個小寫字母")
        );
        assert_eq!(
            strong_password("Abcdefgh!").as_deref(),
            Some("密碼需要包含至少一個數字")
        );
        assert_eq!(
            strong_password("Abcdefg12").as_deref(),
            Some("密碼需要包含至少一個特殊字符")
        );
        assert_eq!(strong_password("Abcdefg1!"), None);
    }

    #[test]
    fn urls() {
        assert_eq!(url("https://example.com/path?q=1"), None);
        assert_eq!(url("example.com").as_deref(), Some("請輸入有效的 URL"));
    }
}
