use shared_types::{ComputeRequest, TaskType};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmissionError {
    #[error("Please provide valid numeric data")]
    NoNumericData,
}

/// Parse a comma-separated list of numbers, silently skipping tokens that
/// are not numbers. Fails only when nothing usable remains.
pub fn parse_numeric_input(raw: &str) -> Result<Vec<f64>, SubmissionError> {
    let values: Vec<f64> = raw
        .split(',')
        .map(str::trim)
        .filter_map(leading_number)
        .collect();

    if values.is_empty() {
        return Err(SubmissionError::NoNumericData);
    }
    Ok(values)
}

/// Build the request body for `POST /api/ml/compute`
pub fn build_compute_request(
    raw: &str,
    task_type: TaskType,
) -> Result<ComputeRequest, SubmissionError> {
    Ok(ComputeRequest {
        data: parse_numeric_input(raw)?,
        task_type,
    })
}

/// Longest numeric prefix of `token`, so `"3.5kg"` reads as 3.5 the way a
/// browser form would. Only finite values are produced; spellings such as
/// `inf` or `NaN` are skipped.
fn leading_number(token: &str) -> Option<f64> {
    if token.is_empty() {
        return None;
    }
    if let Ok(value) = token.parse::<f64>() {
        return value.is_finite().then_some(value);
    }

    let mut best = None;
    for (idx, ch) in token.char_indices() {
        if !(ch.is_ascii_digit() || matches!(ch, '.' | '-' | '+' | 'e' | 'E')) {
            break;
        }
        match token[..idx + ch.len_utf8()].parse::<f64>() {
            Ok(value) if value.is_finite() => best = Some(value),
            _ => {}
        }
    }
    best
}
