// deadline.rs
//
// Deadlines are plain strings, either "YYYY-MM-DD" or "YYYY-MM-DD HH:MM",
// interpreted in local time. Date-only deadlines cover their whole day.

use chrono::{DateTime, Duration as Dur, Local, NaiveDate, NaiveDateTime, TimeZone};

enum Parsed {
    Date(NaiveDate),
    DateTime(NaiveDateTime),
}

fn parse_stored(deadline: &str) -> Option<Parsed> {
    if let Ok(dt) = NaiveDateTime::parse_from_str(deadline, "%Y-%m-%d %H:%M") {
        return Some(Parsed::DateTime(dt));
    }
    if let Ok(date) = NaiveDate::parse_from_str(deadline, "%Y-%m-%d") {
        return Some(Parsed::Date(date));
    }
    None
}

/// Countdown label for a deadline. Past deadlines always get the fixed
/// "Overdue" label; otherwise the largest whole unit remaining is shown.
/// Strings that parse as neither format are echoed back as-is.
pub fn format_deadline(deadline: &str, now: DateTime<Local>) -> String {
    match parse_stored(deadline) {
        Some(Parsed::DateTime(dt)) => {
            let Some(dt_local) = Local.from_local_datetime(&dt).single() else {
                return deadline.to_string();
            };
            if dt_local <= now {
                return "Overdue".to_string();
            }
            let remaining = dt_local - now;
            if remaining.num_days() > 0 {
                format!("{}d left", remaining.num_days())
            } else if remaining.num_hours() > 0 {
                format!("{}h left", remaining.num_hours())
            } else {
                format!("{}m left", remaining.num_minutes().max(1))
            }
        }
        Some(Parsed::Date(date)) => {
            let today = now.date_naive();
            if date < today {
                "Overdue".to_string()
            } else if date == today {
                "due today".to_string()
            } else {
                format!("{}d left", (date - today).num_days())
            }
        }
        None => deadline.to_string(),
    }
}

pub fn is_overdue(deadline: &str, now: DateTime<Local>) -> bool {
    format_deadline(deadline, now) == "Overdue"
}

/// Turn user input into a stored deadline string. Accepts the literal
/// formats plus a small relative vocabulary ("tomorrow", "in 3 days", ...).
pub fn parse_deadline(input: &str) -> Result<String, String> {
    let input = input.trim().to_lowercase();
    let now = Local::now();
    let today = now.date_naive();

    if input.is_empty() {
        return Err("Please enter a due date".to_string());
    }

    let words: Vec<&str> = input.split_whitespace().collect();

    let raw_date = match words.as_slice() {
        // rounded up a minute so the stored value is not already past
        ["now"] => Ok((now + Dur::minutes(1)).format("%Y-%m-%d %H:%M").to_string()),

        ["today"] => Ok(today.format("%Y-%m-%d").to_string()),
        ["tomorrow"] | ["tmr"] => Ok((today + Dur::days(1)).format("%Y-%m-%d").to_string()),

        ["week"] | ["next", "week"] => Ok((today + Dur::days(7)).format("%Y-%m-%d").to_string()),
        ["month"] | ["next", "month"] => Ok((today + Dur::days(30)).format("%Y-%m-%d").to_string()),

        // "in X unit" and bare "X unit" patterns
        ["in", num, unit] => parse_offset(num, unit, &now),
        [num, unit] if num.parse::<i64>().is_ok() => parse_offset(num, unit, &now),

        // Date + time (YYYY-MM-DD HH:MM)
        [date_str, time_str] => {
            let combo = format!("{} {}", date_str, time_str);
            NaiveDateTime::parse_from_str(&combo, "%Y-%m-%d %H:%M")
                .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
                .map_err(|_| "Unrecognized due date format".to_string())
        }

        // Full date
        [date_str] => NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
            .map(|d| d.format("%Y-%m-%d").to_string())
            .map_err(|_| "Unrecognized due date format".to_string()),

        _ => Err("Unrecognized due date format".to_string()),
    };

    raw_date.and_then(|date| validate_not_past(&date))
}

fn parse_offset(num: &str, unit: &str, now: &DateTime<Local>) -> Result<String, String> {
    let n: i64 = num
        .parse()
        .map_err(|_| format!("Not a number: {}", num))?;
    if n < 0 {
        return Err("Due date offset cannot be negative".to_string());
    }
    match unit {
        "minute" | "minutes" | "min" | "mins" | "m" => {
            Ok((*now + Dur::minutes(n)).format("%Y-%m-%d %H:%M").to_string())
        }
        "hour" | "hours" | "h" => Ok((*now + Dur::hours(n)).format("%Y-%m-%d %H:%M").to_string()),
        "day" | "days" | "d" => Ok((now.date_naive() + Dur::days(n))
            .format("%Y-%m-%d")
            .to_string()),
        "week" | "weeks" | "w" => Ok((now.date_naive() + Dur::days(7 * n))
            .format("%Y-%m-%d")
            .to_string()),
        _ => Err(format!("Unknown time unit: {}", unit)),
    }
}

fn validate_not_past(date: &str) -> Result<String, String> {
    let now = Local::now();
    if is_overdue(date, now) {
        return Err("Due date is in the past".to_string());
    }
    Ok(date.to_string())
}
