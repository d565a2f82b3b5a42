//! Bookable slots of a veterinarian for a given date.
//!
//! A slot is the "HH:MM" start of a [`consts::SLOT_MINUTES`] window. The weekly
//! template gives the working hours, active appointments remove their start
//! time from the list.

use crate::{api::DomainError, consts, models, repo};
use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Weekday};

/// Minutes since midnight for a "HH:MM" value.
pub fn parse_hhmm(value: &str) -> Option<u32> {
    let (hours, minutes) = value.trim().split_once(':')?;
    let hours = hours.parse::<u32>().ok()?;
    let minutes = minutes.parse::<u32>().ok()?;

    (hours < 24 && minutes < 60).then_some(hours * 60 + minutes)
}

pub fn fmt_hhmm(minute_of_day: u32) -> String {
    format!("{:02}:{:02}", minute_of_day / 60, minute_of_day % 60)
}

pub fn weekday_name(date: NaiveDate) -> &'static str {
    match date.weekday() {
        Weekday::Mon => "monday",
        Weekday::Tue => "tuesday",
        Weekday::Wed => "wednesday",
        Weekday::Thu => "thursday",
        Weekday::Fri => "friday",
        Weekday::Sat => "saturday",
        Weekday::Sun => "sunday",
    }
}

/// Half-open `[date 00:00, next day 00:00)` range.
pub fn day_range(date: NaiveDate) -> (NaiveDateTime, NaiveDateTime) {
    let start = date.and_time(NaiveTime::MIN);
    (start, start + chrono::Duration::days(1))
}

pub fn parse_date(value: &str) -> anyhow::Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), consts::DATE_FORMAT)
        .map_err(|_| DomainError::validation(format!("invalid date {value:?}, expected YYYY-MM-DD")))
}

pub fn parse_time(value: &str) -> anyhow::Result<NaiveTime> {
    NaiveTime::parse_from_str(value.trim(), consts::TIME_FORMAT)
        .map_err(|_| DomainError::validation(format!("invalid time {value:?}, expected HH:MM")))
}

/// Every slot start between the working hours of `date`, ascending.
///
/// Empty when the day is missing from the template, not a working day, has
/// unparseable times or does not end after it starts.
pub fn generate_slots(
    template: &[models::veterinarian::DayAvailability],
    date: NaiveDate,
) -> Vec<String> {
    let day = weekday_name(date);
    let Some(entry) = template
        .iter()
        .find(|entry| entry.day.trim().eq_ignore_ascii_case(day))
    else {
        return Vec::new();
    };

    if !entry.is_working {
        return Vec::new();
    }

    let (Some(start), Some(end)) = (parse_hhmm(&entry.start_time), parse_hhmm(&entry.end_time))
    else {
        return Vec::new();
    };

    (start..end)
        .step_by(consts::SLOT_MINUTES as usize)
        .map(fmt_hhmm)
        .collect()
}

/// Drops the slots whose start matches a booked time. Order is kept.
pub fn remove_booked(slots: Vec<String>, booked: &[String]) -> Vec<String> {
    slots
        .into_iter()
        .filter(|slot| !booked.contains(slot))
        .collect()
}

/// Free slots of `vet` on `date`.
pub async fn available_slots(
    repo: &repo::ImplAppRepo,
    vet: &models::veterinarian::Veterinarian,
    date: NaiveDate,
) -> anyhow::Result<Vec<String>> {
    let slots = generate_slots(&vet.availability, date);
    if slots.is_empty() {
        return Ok(slots);
    }

    let (day_start, next_day) = day_range(date);
    let booked = repo
        .get_booked_slots(day_start, next_day, Some(vet.id))
        .await?
        .into_iter()
        .map(|slot| slot.time)
        .collect::<Vec<String>>();

    Ok(remove_booked(slots, &booked))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::{appointment, veterinarian::DayAvailability},
        repo::MockAppRepo,
    };
    use chrono::Utc;
    use rust_decimal::Decimal;

    // 2030-01-07 is a monday
    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2030, 1, 7).unwrap()
    }

    fn test_vet(availability: Vec<DayAvailability>) -> models::veterinarian::Veterinarian {
        models::veterinarian::Veterinarian {
            id: 9,
            user_id: 2,
            license_number: "LIC".to_string(),
            specializations: vec![],
            years_of_experience: 1,
            consultation_fee: Decimal::ZERO,
            availability,
            rating: 0.0,
            review_count: 0,
            is_available: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_parse_hhmm() {
        assert_eq!(parse_hhmm("09:00"), Some(540));
        assert_eq!(parse_hhmm("9:30"), Some(570));
        assert_eq!(parse_hhmm("24:00"), None);
        assert_eq!(parse_hhmm("nine"), None);
        assert_eq!(fmt_hhmm(570), "09:30");
    }

    #[test]
    fn test_full_working_day_has_sixteen_slots() {
        let slots = generate_slots(&models::veterinarian::default_weekly_availability(), monday());

        assert_eq!(slots.len(), 16);
        assert_eq!(slots.first().map(String::as_str), Some("09:00"));
        assert_eq!(slots.last().map(String::as_str), Some("16:30"));
    }

    #[test]
    fn test_booked_slot_is_removed() {
        let slots = generate_slots(&models::veterinarian::default_weekly_availability(), monday());
        let free = remove_booked(slots, &["10:00".to_string()]);

        assert_eq!(free.len(), 15);
        assert!(!free.contains(&"10:00".to_string()));
        assert_eq!(free[1], "09:30");
        assert_eq!(free[2], "10:30");
    }

    #[test]
    fn test_non_working_or_missing_day_is_empty() {
        let sunday = NaiveDate::from_ymd_opt(2030, 1, 6).unwrap();
        let template = vec![DayAvailability::new("Monday", "09:00", "17:00", false)];

        assert!(generate_slots(&models::veterinarian::default_weekly_availability(), sunday).is_empty());
        assert!(generate_slots(&template, monday()).is_empty());
        assert!(generate_slots(&[], monday()).is_empty());
    }

    #[test]
    fn test_degenerate_hours_are_empty() {
        let same = vec![DayAvailability::new("monday", "09:00", "09:00", true)];
        let reversed = vec![DayAvailability::new("monday", "17:00", "09:00", true)];
        let garbage = vec![DayAvailability::new("monday", "nine", "17:00", true)];

        assert!(generate_slots(&same, monday()).is_empty());
        assert!(generate_slots(&reversed, monday()).is_empty());
        assert!(generate_slots(&garbage, monday()).is_empty());
    }

    #[test]
    fn test_day_is_matched_case_insensitively() {
        let template = vec![DayAvailability::new(" MONDAY ", "08:00", "09:00", true)];

        assert_eq!(generate_slots(&template, monday()), vec!["08:00", "08:30"]);
    }

    #[ntex::test]
    async fn test_available_slots_queries_vet_day() {
        let (day_start, next_day) = day_range(monday());
        let mut mock_repo = MockAppRepo::new();
        mock_repo
            .expect_get_booked_slots()
            .withf(move |from, until, vet_id| {
                *from == day_start && *until == next_day && *vet_id == Some(9)
            })
            .times(1)
            .returning(move |_, _, _| {
                let booked_at = day_start + chrono::Duration::hours(10);
                Ok(vec![appointment::BookedSlot {
                    appointment_id: 1,
                    veterinarian_id: Some(9),
                    appointment_date: booked_at,
                    time: "10:00".to_string(),
                    status: appointment::AppointmentStatus::Scheduled,
                }])
            });
        let mock_repo: repo::ImplAppRepo = Box::new(mock_repo);

        let slots = available_slots(
            &mock_repo,
            &test_vet(models::veterinarian::default_weekly_availability()),
            monday(),
        )
        .await
        .unwrap();

        assert_eq!(slots.len(), 15);
        assert!(!slots.contains(&"10:00".to_string()));
    }

    #[ntex::test]
    async fn test_available_slots_skips_query_on_day_off() {
        let mut mock_repo = MockAppRepo::new();
        mock_repo.expect_get_booked_slots().never();
        let mock_repo: repo::ImplAppRepo = Box::new(mock_repo);
        let saturday = NaiveDate::from_ymd_opt(2030, 1, 5).unwrap();

        let slots = available_slots(
            &mock_repo,
            &test_vet(models::veterinarian::default_weekly_availability()),
            saturday,
        )
        .await
        .unwrap();

        assert!(slots.is_empty());
    }
}
