//! Request field checks shared by the HTTP handlers and the CLI.

use chrono::NaiveDate;

use crate::DomainError;

pub const DEFAULT_PAGE_LIMIT: i64 = 50;
pub const MAX_PAGE_LIMIT: i64 = 200;
/// 일당 상한, KRW.
pub const MAX_DAILY_WAGE: i64 = 100_000_000;

/// Trimmed, non-empty text. `field` is the Korean field label.
pub fn required_text(value: &str, field: &str) -> Result<String, DomainError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DomainError::validation(format!("{field}을(를) 입력해 주세요")));
    }
    Ok(trimmed.to_string())
}

pub fn labor_hours(hours: f64) -> Result<f64, DomainError> {
    if hours.is_finite() && hours > 0.0 && hours <= 24.0 {
        Ok(hours)
    } else {
        Err(DomainError::validation("근무 시간은 0시간 초과 24시간 이하여야 합니다"))
    }
}

pub fn quantity(value: f64) -> Result<f64, DomainError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(DomainError::validation("수량은 0보다 커야 합니다"))
    }
}

pub fn daily_wage(value: i64) -> Result<i64, DomainError> {
    if value <= 0 {
        Err(DomainError::validation("일당은 0보다 커야 합니다"))
    } else if value > MAX_DAILY_WAGE {
        Err(DomainError::validation(format!("일당은 {MAX_DAILY_WAGE}원을 넘을 수 없습니다")))
    } else {
        Ok(value)
    }
}

pub fn tax_rate(value: f64) -> Result<f64, DomainError> {
    if value.is_finite() && (0.0..=100.0).contains(&value) {
        Ok(value)
    } else {
        Err(DomainError::validation("세율은 0에서 100 사이여야 합니다"))
    }
}

pub fn worker_count(value: i32) -> Result<i32, DomainError> {
    if value >= 0 {
        Ok(value)
    } else {
        Err(DomainError::validation("작업 인원은 0명 이상이어야 합니다"))
    }
}

pub fn date_range(start: NaiveDate, end: Option<NaiveDate>) -> Result<(), DomainError> {
    match end {
        Some(end) if end < start => Err(DomainError::validation("종료일은 시작일 이후여야 합니다")),
        _ => Ok(()),
    }
}

pub fn month(value: u32) -> Result<u32, DomainError> {
    if (1..=12).contains(&value) {
        Ok(value)
    } else {
        Err(DomainError::validation("월은 1에서 12 사이여야 합니다"))
    }
}

/// Clamp an optional `limit` query parameter; out-of-range values are rejected.
pub fn page_limit(limit: Option<i64>) -> Result<i64, DomainError> {
    match limit {
        None => Ok(DEFAULT_PAGE_LIMIT),
        Some(n) if (1..=MAX_PAGE_LIMIT).contains(&n) => Ok(n),
        Some(_) => Err(DomainError::validation(format!(
            "limit은 1에서 {MAX_PAGE_LIMIT} 사이여야 합니다"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_is_trimmed_and_required() {
        assert_eq!(required_text("  본관 신축 ", "현장명").unwrap(), "본관 신축");
        let err = required_text("   ", "현장명").unwrap_err();
        assert_eq!(err, DomainError::Validation("현장명을(를) 입력해 주세요".into()));
    }

    #[test]
    fn labor_hours_bounds() {
        assert!(labor_hours(8.0).is_ok());
        assert!(labor_hours(24.0).is_ok());
        assert!(labor_hours(0.0).is_err());
        assert!(labor_hours(24.5).is_err());
        assert!(labor_hours(f64::NAN).is_err());
    }

    #[test]
    fn tax_rate_bounds() {
        assert!(tax_rate(0.0).is_ok());
        assert!(tax_rate(100.0).is_ok());
        assert!(tax_rate(-0.1).is_err());
        assert!(tax_rate(100.1).is_err());
    }

    #[test]
    fn daily_wage_bounds() {
        assert!(daily_wage(1).is_ok());
        assert_eq!(daily_wage(MAX_DAILY_WAGE).unwrap(), MAX_DAILY_WAGE);
        assert!(daily_wage(MAX_DAILY_WAGE + 1).is_err());
        assert!(daily_wage(10_000_000_000_000_000).is_err());
        assert!(daily_wage(0).is_err());
    }

    #[test]
    fn end_date_must_not_precede_start() {
        let start = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        assert!(date_range(start, None).is_ok());
        assert!(date_range(start, Some(start)).is_ok());
        assert!(date_range(start, start.pred_opt()).is_err());
    }

    #[test]
    fn page_limit_defaults_and_bounds() {
        assert_eq!(page_limit(None).unwrap(), DEFAULT_PAGE_LIMIT);
        assert_eq!(page_limit(Some(200)).unwrap(), 200);
        assert!(page_limit(Some(0)).is_err());
        assert!(page_limit(Some(201)).is_err());
    }
}
