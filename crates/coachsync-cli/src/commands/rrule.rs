use chrono::NaiveDate;
use clap::Subcommand;
use coachsync_core::{
    create_single_day_rrule, parse_rrule, recurrence_for_category, split_series_until,
    week_template_to_rrule, WeekTemplate,
};
use std::path::PathBuf;

use super::{parse_date, print_json, read_json};

#[derive(Subcommand)]
pub enum RruleAction {
    /// One weekly rule per workout category of a week template
    Template {
        /// JSON week template ("-" for stdin)
        #[arg(short, long)]
        template: PathBuf,
        /// Last day of the period (YYYY-MM-DD)
        #[arg(short, long, value_parser = parse_date)]
        until: NaiveDate,
        /// Only this category, falling back to a plain weekly rule
        #[arg(short, long)]
        category: Option<String>,
    },
    /// Weekly rule for a single day
    Single {
        /// Day name, e.g. "Monday"
        #[arg(short, long)]
        day: String,
        #[arg(short, long, value_parser = parse_date)]
        until: NaiveDate,
    },
    /// Parse a rule into its parts
    Parse {
        /// Rule, e.g. "RRULE:FREQ=WEEKLY;BYDAY=MO,WE;UNTIL=20260315"
        rule: String,
    },
    /// End a series the day before a split date
    Split {
        rule: String,
        /// First day of the new series (YYYY-MM-DD)
        #[arg(short, long, value_parser = parse_date)]
        from: NaiveDate,
    },
}

pub fn run(action: RruleAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        RruleAction::Template {
            template,
            until,
            category,
        } => {
            let template: WeekTemplate = read_json(&template)?;
            tracing::debug!(days = template.days.len(), %until, "loaded week template");
            match category {
                Some(category) => {
                    print_json(&recurrence_for_category(&template, until, &category))?;
                }
                None => print_json(&week_template_to_rrule(&template, until))?,
            }
        }
        RruleAction::Single { day, until } => {
            println!("{}", create_single_day_rrule(&day, until)?);
        }
        RruleAction::Parse { rule } => {
            print_json(&parse_rrule(&rule))?;
        }
        RruleAction::Split { rule, from } => {
            println!("{}", split_series_until(&rule, from));
        }
    }
    Ok(())
}
