//! Activity command handlers.

use chrono::NaiveDate;
use tabled::Tabled;

use campus_core::{
    AcademicYear, Activity, ActivityQuery, Command as CoreCommand, CommandResult, Console,
    NewActivity,
};

use crate::cli::{ActivitiesArgs, ActivitiesCommand, GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output;

use super::{unexpected, util};

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct ActivityRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Year")]
    year: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Dates")]
    dates: String,
    #[tabled(rename = "Description")]
    description: String,
}

impl From<&Activity> for ActivityRow {
    fn from(a: &Activity) -> Self {
        Self {
            id: a.id.clone(),
            year: a.year.map_or_else(|| "-".into(), |y| y.label().to_owned()),
            name: a.name.clone(),
            dates: date_range(a.start_date, a.end_date),
            description: a.description.clone(),
        }
    }
}

fn date_range(start: Option<NaiveDate>, end: Option<NaiveDate>) -> String {
    match (start, end) {
        (Some(s), Some(e)) if s == e => s.to_string(),
        (Some(s), Some(e)) => format!("{s} .. {e}"),
        (Some(d), None) | (None, Some(d)) => d.to_string(),
        (None, None) => "-".into(),
    }
}

fn parse_date(field: &str, raw: &str) -> Result<NaiveDate, CliError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|e| CliError::Validation {
        field: field.into(),
        reason: format!("'{raw}' is not a YYYY-MM-DD date: {e}"),
    })
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    console: &Console,
    args: ActivitiesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        ActivitiesCommand::List { search, year } => {
            let query = ActivityQuery {
                search,
                year: year.map(AcademicYear::try_from).transpose()?,
            };
            let groups = console.activities(&query).await?;

            let out = match global.output {
                // Tables and plain output list activities flat, in group order.
                OutputFormat::Table | OutputFormat::Plain => {
                    let flat: Vec<&Activity> =
                        groups.iter().flat_map(|g| g.activities.iter()).collect();
                    output::render_list(
                        &global.output,
                        &flat,
                        |a| ActivityRow::from(*a),
                        |a| a.id.clone(),
                    )
                }
                _ => output::render_single(
                    &global.output,
                    &groups,
                    |_| String::new(),
                    |_| String::new(),
                ),
            };
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ActivitiesCommand::Add {
            name,
            year,
            start,
            end,
            description,
        } => {
            let start_date = parse_date("start", &start)?;
            let end_date = match end {
                Some(ref raw) => parse_date("end", raw)?,
                None => start_date,
            };
            let activity = NewActivity::new(
                name,
                AcademicYear::try_from(year)?,
                start_date,
                end_date,
                description,
            )?;

            match console.execute(CoreCommand::CreateActivity(activity)).await? {
                CommandResult::Created { id } => {
                    if !global.quiet {
                        eprintln!("Activity created{}", id_suffix(id.as_deref()));
                    }
                    Ok(())
                }
                other => Err(unexpected(&other)),
            }
        }

        ActivitiesCommand::Delete { id } => {
            if !util::confirm(&format!("Delete activity {id}?"), global.yes)? {
                return Ok(());
            }
            console
                .execute(CoreCommand::DeleteActivity { id: id.clone() })
                .await?;
            if !global.quiet {
                eprintln!("Activity {id} deleted");
            }
            Ok(())
        }

        ActivitiesCommand::Import { file, show_text } => {
            let (file_name, bytes) = util::read_upload(&file, "file")?;
            let result = console
                .execute(CoreCommand::ImportCalendar { file_name, bytes })
                .await?;
            let CommandResult::CalendarImported(import) = result else {
                return Err(unexpected(&result));
            };

            let out = output::render_single(
                &global.output,
                &import,
                |i| {
                    let mut text = format!("Imported {} activities", i.count);
                    if show_text && !i.text.is_empty() {
                        text.push_str("\n\n");
                        text.push_str(&i.text);
                    }
                    text
                },
                |i| i.count.to_string(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}

fn id_suffix(id: Option<&str>) -> String {
    id.map(|id| format!(" ({id})")).unwrap_or_default()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn single_day_ranges_collapse() {
        let d = NaiveDate::from_ymd_opt(2025, 3, 14).unwrap();
        let e = NaiveDate::from_ymd_opt(2025, 3, 16).unwrap();
        assert_eq!(date_range(Some(d), Some(d)), "2025-03-14");
        assert_eq!(date_range(Some(d), Some(e)), "2025-03-14 .. 2025-03-16");
        assert_eq!(date_range(None, None), "-");
    }

    #[test]
    fn dates_must_be_iso() {
        assert!(parse_date("start", "2025-03-14").is_ok());
        let err = parse_date("start", "14/03/2025").unwrap_err();
        assert!(matches!(err, CliError::Validation { ref field, .. } if field == "start"));
    }
}
