//! Pure arithmetic behind the target planner.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::gpa::{CalculationResult, MAX_GRADE, format_gpa};
use crate::models::PlannedCourse;

/// Lenient number parsing for free-text inputs: reads the longest numeric
/// prefix after leading whitespace, so `"3.5 credits"` is 3.5 and `"abc"` is
/// nothing.
pub fn parse_number(text: &str) -> Option<f64> {
    let s = text.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end += 1;
    }
    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;

    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        digits += frac_end - frac_start;
        if digits > 0 {
            end = frac_end;
        }
    }
    if digits == 0 {
        return None;
    }

    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && matches!(bytes[exp_end], b'+' | b'-') {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    s[..end].parse::<f64>().ok().filter(|v| v.is_finite())
}

pub fn parse_or_zero(text: &str) -> f64 {
    parse_number(text).unwrap_or(0.0)
}

pub fn planned_credits(courses: &[PlannedCourse]) -> f64 {
    courses.iter().map(|c| parse_or_zero(&c.credits)).sum()
}

/// Grade points the upcoming courses must contribute for the cumulative GPA to
/// land exactly on `target`.
pub fn points_needed(current: &CalculationResult, target: f64, next_credits: f64) -> f64 {
    let total_future_credits = current.total_credits + next_credits;
    target * total_future_credits - current.total_points
}

/// `None` when there are no upcoming credits to spread the requirement over.
pub fn required_average(
    current: &CalculationResult,
    target: f64,
    next_credits: f64,
) -> Option<f64> {
    if next_credits == 0.0 {
        return None;
    }
    Some(points_needed(current, target, next_credits) / next_credits)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum TargetOutcome {
    Achievable { required_average: f64 },
    /// No positive grade is needed; the target is met regardless.
    AlreadySecured { required_average: f64 },
    /// Needs more than the top of the scale. The value is kept for display.
    Unreachable { required_average: f64 },
}

impl TargetOutcome {
    pub fn classify(required_average: f64) -> Self {
        if required_average > MAX_GRADE {
            TargetOutcome::Unreachable { required_average }
        } else if required_average <= 0.0 {
            TargetOutcome::AlreadySecured { required_average }
        } else {
            TargetOutcome::Achievable { required_average }
        }
    }

    pub fn required_average(&self) -> f64 {
        match *self {
            TargetOutcome::Achievable { required_average }
            | TargetOutcome::AlreadySecured { required_average }
            | TargetOutcome::Unreachable { required_average } => required_average,
        }
    }

    pub fn is_feasible(&self) -> bool {
        !matches!(self, TargetOutcome::Unreachable { .. })
    }

    pub fn display(&self) -> String {
        match self {
            TargetOutcome::AlreadySecured { .. } => "Pass".to_string(),
            other => format_gpa(other.required_average()),
        }
    }
}

/// One course's required grade: the exact value used in arithmetic and the
/// text shown for editing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequiredGrade {
    pub value: f64,
    pub display: String,
}

impl RequiredGrade {
    /// Auto-assigned share. The display floors at zero, the value does not.
    pub fn auto(value: f64) -> Self {
        // also catches -0.0, which would otherwise render as "-0.00"
        let display = if value <= 0.0 {
            format_gpa(0.0)
        } else {
            format_gpa(value)
        };
        Self { value, display }
    }

    /// User-entered value; the literal text is kept verbatim.
    pub fn pinned(text: &str) -> Self {
        Self {
            value: parse_or_zero(text),
            display: text.to_string(),
        }
    }

    pub fn exceeds_scale(&self) -> bool {
        self.value > MAX_GRADE
    }
}

/// Redistributes the requirement left after the locked courses across the
/// unlocked ones. Locked values are never changed. With no numeric target the
/// values come back untouched.
pub fn recompute(
    current: &CalculationResult,
    target: Option<f64>,
    courses: &[PlannedCourse],
    locked: &BTreeSet<String>,
    values: &BTreeMap<String, RequiredGrade>,
) -> BTreeMap<String, RequiredGrade> {
    let mut next = values.clone();
    let Some(target) = target else {
        return next;
    };

    let next_credits = planned_credits(courses);
    let total_needed = points_needed(current, target, next_credits);

    let (locked_points, locked_credits) = courses
        .iter()
        .filter(|c| locked.contains(&c.id))
        .fold((0.0, 0.0), |(points, credits), c| {
            let grade = values.get(&c.id).map(|g| g.value).unwrap_or(0.0);
            let cr = parse_or_zero(&c.credits);
            (points + grade * cr, credits + cr)
        });

    let remaining_points = total_needed - locked_points;
    let remaining_credits = next_credits - locked_credits;
    if remaining_credits <= 0.0 {
        return next;
    }

    let average_for_others = remaining_points / remaining_credits;
    for course in courses.iter().filter(|c| !locked.contains(&c.id)) {
        next.insert(course.id.clone(), RequiredGrade::auto(average_for_others));
    }
    next
}

#[cfg(test)]
mod tests {
    use super::*;

    fn planned(id: &str, credits: &str) -> PlannedCourse {
        PlannedCourse {
            id: id.to_string(),
            name: String::new(),
            credits: credits.to_string(),
        }
    }

    #[test]
    fn test_parse_number_reads_numeric_prefix() {
        assert_eq!(parse_number("3.5"), Some(3.5));
        assert_eq!(parse_number("  4 "), Some(4.0));
        assert_eq!(parse_number("3.5abc"), Some(3.5));
        assert_eq!(parse_number(".5"), Some(0.5));
        assert_eq!(parse_number("5."), Some(5.0));
        assert_eq!(parse_number("-2"), Some(-2.0));
        assert_eq!(parse_number("1e1"), Some(10.0));
        assert_eq!(parse_number("2e"), Some(2.0));
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_number("abc"), None);
        assert_eq!(parse_number("."), None);
        assert_eq!(parse_number("-"), None);
        assert_eq!(parse_number("inf"), None);
    }

    #[test]
    fn test_planned_credits_treats_garbage_as_zero() {
        let courses = vec![planned("a", "3"), planned("b", ""), planned("c", "x"), planned("d", "1.5")];
        assert_eq!(planned_credits(&courses), 4.5);
    }

    #[test]
    fn test_required_average_unreachable_example() {
        let current = CalculationResult::from_totals(30.0, 105.0);
        let avg = required_average(&current, 3.8, 3.0).expect("Expected a result");

        assert!((avg - 6.8).abs() < 1e-9);
        let outcome = TargetOutcome::classify(avg);
        assert!(!outcome.is_feasible());
        assert_eq!(outcome.display(), "6.80");
    }

    #[test]
    fn test_required_average_needs_credits() {
        let current = CalculationResult::from_totals(30.0, 105.0);
        assert!(required_average(&current, 3.8, 0.0).is_none());
    }

    #[test]
    fn test_feasibility_boundary() {
        assert!(TargetOutcome::classify(4.0).is_feasible());
        assert!(!TargetOutcome::classify(4.0000001).is_feasible());
    }

    #[test]
    fn test_non_positive_requirement_is_already_secured() {
        let outcome = TargetOutcome::classify(0.0);
        assert!(matches!(outcome, TargetOutcome::AlreadySecured { .. }));
        assert_eq!(outcome.display(), "Pass");

        let outcome = TargetOutcome::classify(-1.25);
        assert!(outcome.is_feasible());
        assert_eq!(outcome.required_average(), -1.25);
    }

    #[test]
    fn test_auto_grade_floors_display_only() {
        let grade = RequiredGrade::auto(-0.75);
        assert_eq!(grade.display, "0.00");
        assert_eq!(grade.value, -0.75);

        let grade = RequiredGrade::auto(-0.0);
        assert_eq!(grade.display, "0.00");
    }

    #[test]
    fn test_negative_zero_target_on_empty_record_shows_zero() {
        let current = CalculationResult::default();
        let courses = vec![planned("a", "3"), planned("b", "3")];
        let values = recompute(
            &current,
            parse_number("-0"),
            &courses,
            &BTreeSet::new(),
            &BTreeMap::new(),
        );

        assert_eq!(values["a"].display, "0.00");
        assert_eq!(values["b"].display, "0.00");
    }

    #[test]
    fn test_pinned_grade_keeps_literal_text() {
        let grade = RequiredGrade::pinned("3.");
        assert_eq!(grade.display, "3.");
        assert_eq!(grade.value, 3.0);

        let grade = RequiredGrade::pinned("abc");
        assert_eq!(grade.display, "abc");
        assert_eq!(grade.value, 0.0);
    }

    #[test]
    fn test_recompute_spreads_remainder_over_unlocked() {
        let current = CalculationResult::default();
        let courses = vec![planned("a", "3"), planned("b", "3")];
        let locked: BTreeSet<String> = ["a".to_string()].into_iter().collect();
        let mut values = BTreeMap::new();
        values.insert("a".to_string(), RequiredGrade::pinned("4.00"));
        values.insert("b".to_string(), RequiredGrade::auto(3.5));

        let next = recompute(&current, Some(3.5), &courses, &locked, &values);

        assert_eq!(next["a"].display, "4.00");
        assert!((next["b"].value - 3.0).abs() < 1e-9);
        assert_eq!(next["b"].display, "3.00");
    }

    #[test]
    fn test_recompute_all_locked_is_noop() {
        let current = CalculationResult::default();
        let courses = vec![planned("a", "3")];
        let locked: BTreeSet<String> = ["a".to_string()].into_iter().collect();
        let mut values = BTreeMap::new();
        values.insert("a".to_string(), RequiredGrade::pinned("2"));

        let next = recompute(&current, Some(3.5), &courses, &locked, &values);
        assert_eq!(next, values);
    }

    #[test]
    fn test_recompute_without_target_is_noop() {
        let current = CalculationResult::default();
        let courses = vec![planned("a", "3"), planned("b", "3")];
        let mut values = BTreeMap::new();
        values.insert("a".to_string(), RequiredGrade::auto(1.0));

        let next = recompute(&current, None, &courses, &BTreeSet::new(), &values);
        assert_eq!(next, values);
    }
}
