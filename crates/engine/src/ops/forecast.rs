//! Forecast generation.
//!
//! A forecast is a computed obligation: template `t` applied to pen `p` is
//! due on every date where the pen's age has reached `t.days_old`, until a
//! schedule record for the pair exists. Candidates are re-derived per query
//! and never persisted, which is what keeps overdue items visible day after
//! day instead of disappearing after their due date.

use chrono::{Days, NaiveDate};

use crate::{EngineError, Pen, ResultEngine, TemplateItem};

/// A `(pen, template)` pair whose dose is due on the queried date.
#[derive(Clone, Debug)]
pub(crate) struct DueDose<'a> {
    pub pen: &'a Pen,
    pub template: &'a TemplateItem,
    pub due_date: NaiveDate,
    pub is_overdue: bool,
}

/// Due date of a template dose for a pen.
pub(crate) fn due_date_for(pen: &Pen, template: &TemplateItem) -> ResultEngine<NaiveDate> {
    pen.intake_date
        .checked_add_days(Days::new(template.days_old as u64))
        .ok_or_else(|| {
            EngineError::Validation(format!(
                "due date out of range for template {}",
                template.id
            ))
        })
}

/// All `(pen, template)` pairs due on `date`, overdue pairs included.
///
/// Pens taken in after `date` are not part of the roster as of that date and
/// are skipped. Orphaned templates never appear here: a deleted template is
/// simply absent from `templates`.
pub(crate) fn due_doses<'a>(
    pens: &'a [Pen],
    templates: &'a [TemplateItem],
    date: NaiveDate,
) -> ResultEngine<Vec<DueDose<'a>>> {
    let mut doses = Vec::new();

    for pen in pens {
        if pen.intake_date > date {
            continue;
        }
        let age = pen.age_in_days(date)?;

        for template in templates {
            if age < i64::from(template.days_old) {
                continue;
            }
            doses.push(DueDose {
                pen,
                template,
                due_date: due_date_for(pen, template)?,
                is_overdue: age > i64::from(template.days_old),
            });
        }
    }

    Ok(doses)
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn template(stage: i32, days_old: i32) -> TemplateItem {
        TemplateItem {
            id: Uuid::new_v4(),
            vaccine_id: Uuid::new_v4(),
            vaccine_name: format!("vaccine-{stage}"),
            stage,
            days_old,
            dosage: "2ml".to_string(),
            notes: None,
        }
    }

    #[test]
    fn dose_is_due_exactly_at_threshold() {
        let pens = vec![Pen::new("A1".to_string(), date(2025, 1, 1))];
        let templates = vec![template(1, 7)];

        let doses = due_doses(&pens, &templates, date(2025, 1, 8)).unwrap();
        assert_eq!(doses.len(), 1);
        assert_eq!(doses[0].due_date, date(2025, 1, 8));
        assert!(!doses[0].is_overdue);
    }

    #[test]
    fn dose_is_carried_forward_as_overdue() {
        let pens = vec![Pen::new("A1".to_string(), date(2025, 1, 1))];
        let templates = vec![template(1, 7)];

        let doses = due_doses(&pens, &templates, date(2025, 1, 20)).unwrap();
        assert_eq!(doses.len(), 1);
        assert_eq!(doses[0].due_date, date(2025, 1, 8));
        assert!(doses[0].is_overdue);
    }

    #[test]
    fn young_pen_is_not_due() {
        let pens = vec![Pen::new("A1".to_string(), date(2025, 1, 1))];
        let templates = vec![template(1, 7)];

        let doses = due_doses(&pens, &templates, date(2025, 1, 5)).unwrap();
        assert!(doses.is_empty());
    }

    #[test]
    fn pen_taken_in_after_the_date_is_skipped() {
        let pens = vec![Pen::new("A1".to_string(), date(2025, 6, 1))];
        let templates = vec![template(1, 0)];

        let doses = due_doses(&pens, &templates, date(2025, 1, 8)).unwrap();
        assert!(doses.is_empty());
    }
}
