use crate::models::ImportantItem;
use chrono::NaiveDate;
use serde::Serialize;

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Countdown {
    pub item: ImportantItem,
    pub days_remaining: i64,
}

/// Upcoming important items (today included), soonest first.
pub fn countdowns(items: &[ImportantItem], today: NaiveDate) -> Vec<Countdown> {
    let mut upcoming: Vec<Countdown> = items
        .iter()
        .filter_map(|item| {
            let days_remaining = (item.date - today).num_days();
            (days_remaining >= 0).then(|| Countdown {
                item: item.clone(),
                days_remaining,
            })
        })
        .collect();
    upcoming.sort_by(|a, b| {
        a.days_remaining
            .cmp(&b.days_remaining)
            .then_with(|| a.item.title.cmp(&b.item.title))
    });
    upcoming
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn item(title: &str, date: NaiveDate) -> ImportantItem {
        let stamp = NaiveDate::from_ymd_opt(2026, 1, 1)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        ImportantItem {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            date,
            title: title.to_string(),
            note: None,
            created_at: stamp,
            updated_at: stamp,
        }
    }

    #[test]
    fn past_items_are_dropped_and_upcoming_sorted() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        let items = vec![
            item("Final exam", NaiveDate::from_ymd_opt(2026, 12, 1).unwrap()),
            item("Passport", NaiveDate::from_ymd_opt(2026, 10, 1).unwrap()),
            item("Birthday", today),
            item("Rent", NaiveDate::from_ymd_opt(2026, 11, 1).unwrap()),
        ];
        let upcoming = countdowns(&items, today);

        let titles: Vec<&str> = upcoming.iter().map(|c| c.item.title.as_str()).collect();
        assert_eq!(titles, vec!["Birthday", "Rent", "Final exam"]);
        assert_eq!(upcoming[0].days_remaining, 0);
        assert_eq!(upcoming[1].days_remaining, 13);
    }
}
