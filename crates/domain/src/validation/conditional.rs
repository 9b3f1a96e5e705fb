//! Validation that depends on other fields or on an external lookup.

use std::fmt;
use std::future::Future;

use crate::form_value::{FormValue, FormValueMap};

type Predicate = dyn Fn(Option<&FormValue>) -> bool + Send + Sync;
type Check = dyn Fn(Option<&FormValue>) -> Option<String> + Send + Sync;

/// Runs `validator` on a field only while the field named `depends_on`
/// satisfies `when`.
pub struct Condition {
    pub depends_on: String,
    when: Box<Predicate>,
    validator: Box<Check>,
}

impl Condition {
    pub fn new<W, V>(depends_on: impl Into<String>, when: W, validator: V) -> Self
    where
        W: Fn(Option<&FormValue>) -> bool + Send + Sync + 'static,
        V: Fn(Option<&FormValue>) -> Option<String> + Send + Sync + 'static,
    {
        Self {
            depends_on: depends_on.into(),
            when: Box::new(when),
            validator: Box::new(validator),
        }
    }
}

impl fmt::Debug for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Condition")
            .field("depends_on", &self.depends_on)
            .finish_non_exhaustive()
    }
}

/// First message produced by an active condition, if any.
pub fn validate_conditional(
    value: Option<&FormValue>,
    values: &FormValueMap,
    conditions: &[Condition],
) -> Option<String> {
    conditions
        .iter()
        .filter(|condition| (condition.when)(values.get(&condition.depends_on)))
        .find_map(|condition| (condition.validator)(value))
}

/// Awaits an external check (for example "is this nickname taken?").
///
/// A failing lookup is logged and reported as a generic validation message
/// rather than propagated.
pub async fn validate_async<F, Fut, E>(value: Option<&FormValue>, validator: F) -> Option<String>
where
    F: FnOnce(Option<&FormValue>) -> Fut,
    Fut: Future<Output = Result<Option<String>, E>>,
    E: fmt::Display,
{
    match validator(value).await {
        Ok(message) => message,
        Err(error) => {
            tracing::error!(error = %error, "Async validation failed");
            Some("驗證過程發生錯誤".to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::special;

    fn invoice_conditions() -> Vec<Condition> {
        vec![
            Condition::new(
                "invoice_type",
                |kind| kind.and_then(FormValue::as_str) == Some("company"),
                |value| {
                    let text = value.map(FormValue::to_text).unwrap_or_default();
                    (text.len() != 8).then(|| "統一編號需為 8 碼".to_string())
                },
            ),
            Condition::new(
                "invoice_type",
                |kind| kind.is_some(),
                |value| value.is_none().then(|| "請填寫發票資訊".to_string()),
            ),
        ]
    }

    #[test]
    fn inactive_conditions_are_skipped() {
        let mut values = FormValueMap::new();
        values.insert("invoice_type".into(), FormValue::text("personal"));
        let value = FormValue::text("123");
        assert_eq!(
            validate_conditional(Some(&value), &values, &invoice_conditions()),
            None
        );
    }

    #[test]
    fn first_active_message_wins() {
        let mut values = FormValueMap::new();
        values.insert("invoice_type".into(), FormValue::text("company"));
        assert_eq!(
            validate_conditional(None, &values, &invoice_conditions()).as_deref(),
            Some("統一編號需為 8 碼")
        );
    }

    #[test]
    fn special_validators_plug_in() {
        let conditions = vec![Condition::new(
            "contact",
            |kind| kind.and_then(FormValue::as_str) == Some("email"),
            |value| special::email(&value.map(FormValue::to_text).unwrap_or_default()),
        )];
        let mut values = FormValueMap::new();
        values.insert("contact".into(), FormValue::text("email"));
        let value = FormValue::text("not-an-email");
        assert_eq!(
            validate_conditional(Some(&value), &values, &conditions).as_deref(),
            Some("請輸入有效的電子郵件地址")
        );
    }

    #[tokio::test]
    async fn async_result_is_passed_through() {
        let value = FormValue::text("taken_name");
        let message = validate_async(Some(&value), |value| {
            let taken = value.and_then(FormValue::as_str) == Some("taken_name");
            async move { Ok::<_, String>(taken.then(|| "暱稱已被使用".to_string())) }
        })
        .await;
        assert_eq!(message.as_deref(), Some("暱稱已被使用"));
    }

    #[tokio::test]
    async fn async_failure_becomes_generic_message() {
        let message = validate_async(None, |_| async { Err::<Option<String>, _>("timeout") }).await;
        assert_eq!(message.as_deref(), Some("驗證過程發生錯誤"));
    }
}
