//! Collapses runs of identical consecutive class periods into merged cells.

use crate::models::{ClassDay, TimetableEntry};
use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// Period codes in display order. This is not alphabetical: "10" comes
/// after "9", and the lettered evening periods follow.
pub const PERIODS: [&str; 15] = [
    "0", "1", "2", "3", "4", "5", "6", "7", "8", "9", "10", "A", "B", "C", "D",
];

/// Canonical `&'static str` for a period code, if it is one.
pub fn period_code(raw: &str) -> Option<&'static str> {
    PERIODS.iter().copied().find(|period| *period == raw)
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotKey {
    pub weekday: ClassDay,
    pub period: &'static str,
}

impl SlotKey {
    fn of(entry: &TimetableEntry) -> Option<SlotKey> {
        Some(SlotKey {
            weekday: ClassDay::from_code(&entry.weekday)?,
            period: period_code(&entry.period)?,
        })
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct MergedBlock {
    pub entry: TimetableEntry,
    pub span: usize,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct TimetableLayout {
    /// Anchored at the first period of each run.
    pub blocks: HashMap<SlotKey, MergedBlock>,
    /// Periods swallowed by a block above them.
    pub covered: HashSet<SlotKey>,
    /// Slots holding two or more entries; never merged.
    pub conflicts: HashMap<SlotKey, Vec<TimetableEntry>>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TimetableCell {
    Empty {
        weekday: ClassDay,
    },
    Block {
        weekday: ClassDay,
        span: usize,
        entry: TimetableEntry,
    },
    Covered {
        weekday: ClassDay,
    },
    Conflict {
        weekday: ClassDay,
        entries: Vec<TimetableEntry>,
    },
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct TimetableRow {
    pub period: &'static str,
    pub cells: Vec<TimetableCell>,
}

fn same_text(a: &Option<String>, b: &Option<String>) -> bool {
    a.as_deref().unwrap_or("") == b.as_deref().unwrap_or("")
}

/// Two entries describe the same class when course, room, teacher and note match.
pub fn same_class(a: &TimetableEntry, b: &TimetableEntry) -> bool {
    a.course_name == b.course_name
        && same_text(&a.classroom, &b.classroom)
        && same_text(&a.teacher, &b.teacher)
        && same_text(&a.note, &b.note)
}

pub fn merge_timetable(entries: &[TimetableEntry]) -> TimetableLayout {
    let mut slots: HashMap<SlotKey, Vec<&TimetableEntry>> = HashMap::new();
    for entry in entries {
        match SlotKey::of(entry) {
            Some(key) => slots.entry(key).or_default().push(entry),
            None => log::warn!(
                "Skipping timetable entry {} with unknown slot ({}, {})",
                entry.id,
                entry.weekday,
                entry.period
            ),
        }
    }

    // A slot is a merge candidate only when it holds exactly one entry.
    let single = |weekday: ClassDay, index: usize| {
        let key = SlotKey {
            weekday,
            period: PERIODS[index],
        };
        match slots.get(&key).map(Vec::as_slice) {
            Some([only]) => Some(*only),
            _ => None,
        }
    };

    let mut layout = TimetableLayout::default();
    for weekday in ClassDay::ALL {
        let mut index = 0;
        while index < PERIODS.len() {
            let key = SlotKey {
                weekday,
                period: PERIODS[index],
            };
            let Some(anchor) = single(weekday, index) else {
                if let Some(conflicting) = slots.get(&key).filter(|slot| slot.len() > 1) {
                    layout
                        .conflicts
                        .insert(key, conflicting.iter().map(|e| (*e).clone()).collect());
                }
                index += 1;
                continue;
            };

            let mut span = 1;
            while index + span < PERIODS.len() {
                match single(weekday, index + span) {
                    Some(next) if same_class(anchor, next) => span += 1,
                    _ => break,
                }
            }

            for covered in index + 1..index + span {
                layout.covered.insert(SlotKey {
                    weekday,
                    period: PERIODS[covered],
                });
            }
            layout.blocks.insert(
                key,
                MergedBlock {
                    entry: anchor.clone(),
                    span,
                },
            );
            index += span;
        }
    }
    layout
}

impl TimetableLayout {
    /// Display grid: one row per period, one cell per weekday.
    pub fn rows(&self) -> Vec<TimetableRow> {
        PERIODS
            .iter()
            .map(|&period| TimetableRow {
                period,
                cells: ClassDay::ALL
                    .into_iter()
                    .map(|weekday| self.cell(SlotKey { weekday, period }))
                    .collect(),
            })
            .collect()
    }

    fn cell(&self, key: SlotKey) -> TimetableCell {
        let weekday = key.weekday;
        if let Some(block) = self.blocks.get(&key) {
            TimetableCell::Block {
                weekday,
                span: block.span,
                entry: block.entry.clone(),
            }
        } else if self.covered.contains(&key) {
            TimetableCell::Covered { weekday }
        } else if let Some(entries) = self.conflicts.get(&key) {
            TimetableCell::Conflict {
                weekday,
                entries: entries.clone(),
            }
        } else {
            TimetableCell::Empty { weekday }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use uuid::Uuid;

    fn entry(weekday: &str, period: &str, course: &str, classroom: Option<&str>) -> TimetableEntry {
        let stamp = NaiveDate::from_ymd_opt(2025, 9, 1)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap();
        TimetableEntry {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            weekday: weekday.to_string(),
            period: period.to_string(),
            course_name: course.to_string(),
            classroom: classroom.map(str::to_string),
            teacher: None,
            note: None,
            created_at: stamp,
            updated_at: stamp,
        }
    }

    fn key(weekday: ClassDay, period: &'static str) -> SlotKey {
        SlotKey { weekday, period }
    }

    #[test]
    fn identical_run_becomes_one_block() {
        let entries = vec![
            entry("mon", "2", "Calculus", Some("B101")),
            entry("mon", "3", "Calculus", Some("B101")),
            entry("mon", "4", "Calculus", Some("B101")),
            entry("mon", "5", "Physics", Some("B101")),
        ];
        let layout = merge_timetable(&entries);

        assert_eq!(layout.blocks[&key(ClassDay::Mon, "2")].span, 3);
        assert_eq!(layout.blocks[&key(ClassDay::Mon, "5")].span, 1);
        assert_eq!(
            layout.covered,
            HashSet::from([key(ClassDay::Mon, "3"), key(ClassDay::Mon, "4")])
        );
        assert_eq!(layout.blocks.len(), 2);
    }

    #[test]
    fn conflicting_slot_is_never_merged_or_covered() {
        let entries = vec![
            entry("tue", "1", "History", None),
            entry("tue", "2", "History", None),
            entry("tue", "2", "Art", None),
            entry("tue", "3", "History", None),
        ];
        let layout = merge_timetable(&entries);

        assert_eq!(layout.conflicts[&key(ClassDay::Tue, "2")].len(), 2);
        assert!(!layout.covered.contains(&key(ClassDay::Tue, "2")));
        assert!(!layout.blocks.contains_key(&key(ClassDay::Tue, "2")));
        // The conflict splits the History run in two.
        assert_eq!(layout.blocks[&key(ClassDay::Tue, "1")].span, 1);
        assert_eq!(layout.blocks[&key(ClassDay::Tue, "3")].span, 1);
    }

    #[test]
    fn missing_classroom_equals_empty_classroom() {
        let entries = vec![
            entry("wed", "6", "Chemistry", None),
            entry("wed", "7", "Chemistry", Some("")),
        ];
        let layout = merge_timetable(&entries);
        assert_eq!(layout.blocks[&key(ClassDay::Wed, "6")].span, 2);
    }

    #[test]
    fn runs_follow_period_order_not_string_order() {
        let entries = vec![
            entry("thu", "9", "Lab", None),
            entry("thu", "10", "Lab", None),
            entry("thu", "A", "Lab", None),
        ];
        let layout = merge_timetable(&entries);
        assert_eq!(layout.blocks[&key(ClassDay::Thu, "9")].span, 3);
        assert!(layout.covered.contains(&key(ClassDay::Thu, "A")));
    }

    #[test]
    fn gaps_and_other_days_break_runs() {
        let entries = vec![
            entry("fri", "1", "English", None),
            entry("fri", "3", "English", None),
            entry("sat", "1", "English", None),
        ];
        let layout = merge_timetable(&entries);
        assert_eq!(layout.blocks.len(), 3);
        assert!(layout.covered.is_empty());
    }

    #[test]
    fn unknown_slot_codes_are_ignored() {
        let entries = vec![entry("mon", "E", "Ghost", None), entry("xyz", "1", "Ghost", None)];
        let layout = merge_timetable(&entries);
        assert_eq!(layout, TimetableLayout::default());
    }

    #[test]
    fn rows_render_every_slot_once() {
        let entries = vec![
            entry("mon", "0", "Homeroom", None),
            entry("mon", "1", "Homeroom", None),
        ];
        let rows = merge_timetable(&entries).rows();
        assert_eq!(rows.len(), PERIODS.len());
        assert!(rows.iter().all(|row| row.cells.len() == 7));
        assert!(matches!(rows[0].cells[0], TimetableCell::Block { span: 2, .. }));
        assert_eq!(rows[1].cells[0], TimetableCell::Covered { weekday: ClassDay::Mon });
        assert_eq!(rows[0].cells[1], TimetableCell::Empty { weekday: ClassDay::Tue });
    }

    #[test]
    fn merging_is_repeatable() {
        let entries = vec![
            entry("sun", "B", "Seminar", Some("Hall")),
            entry("sun", "C", "Seminar", Some("Hall")),
        ];
        assert_eq!(merge_timetable(&entries), merge_timetable(&entries));
    }
}
