use crate::error::{Error, Result};
use crate::ident::quote_literal;
use crate::schema::RetentionPolicy;

/// `SELECT add_retention_policy('schema.table', INTERVAL 'p')`.
pub fn format_retention_policy(policy: &RetentionPolicy) -> Result<String> {
    if policy.retention_period.trim().is_empty() {
        return Err(Error::InvalidOptions(format!(
            "retention policy for {}.{} has no period",
            policy.schema, policy.table
        )));
    }
    let schema = if policy.schema.is_empty() { "public" } else { &policy.schema };
    Ok(format!(
        "SELECT add_retention_policy({}, INTERVAL {})",
        quote_literal(&format!("{}.{}", schema, policy.table)),
        quote_literal(&policy.retention_period)
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_retention() {
        let p = RetentionPolicy {
            schema: "public".to_string(),
            table: "metrics".to_string(),
            retention_period: "30 days".to_string(),
        };
        assert_eq!(
            format_retention_policy(&p).unwrap(),
            "SELECT add_retention_policy('public.metrics', INTERVAL '30 days')"
        );
    }

    #[test]
    fn empty_period_errs() {
        let p = RetentionPolicy {
            schema: "public".to_string(),
            table: "metrics".to_string(),
            retention_period: "".to_string(),
        };
        assert!(format_retention_policy(&p).is_err());
    }
}
