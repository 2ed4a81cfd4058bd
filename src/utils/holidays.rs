use chrono::{Duration, NaiveDate};
use std::collections::{BTreeMap, HashSet};

/// Source of public holidays for a given year
pub trait HolidayCalendar {
    fn holidays(&self, year: i32) -> HashSet<NaiveDate>;
}

/// Brazilian national holidays
#[derive(Debug, Clone, Copy, Default)]
pub struct BrazilHolidays;

/// Year from which 20 November (Consciência Negra) is a national holiday
const BLACK_CONSCIOUSNESS_DAY_FROM: i32 = 2024;

const FIXED_HOLIDAYS: [(u32, u32); 8] = [
    (1, 1),   // Confraternização Universal
    (4, 21),  // Tiradentes
    (5, 1),   // Dia do Trabalhador
    (9, 7),   // Independência
    (10, 12), // Nossa Senhora Aparecida
    (11, 2),  // Finados
    (11, 15), // Proclamação da República
    (12, 25), // Natal
];

impl BrazilHolidays {
    pub fn new() -> Self {
        Self
    }
}

impl HolidayCalendar for BrazilHolidays {
    fn holidays(&self, year: i32) -> HashSet<NaiveDate> {
        let mut dates: HashSet<NaiveDate> = FIXED_HOLIDAYS
            .iter()
            .filter_map(|&(month, day)| NaiveDate::from_ymd_opt(year, month, day))
            .collect();

        if year >= BLACK_CONSCIOUSNESS_DAY_FROM {
            dates.extend(NaiveDate::from_ymd_opt(year, 11, 20));
        }

        if let Some(easter) = easter_sunday(year) {
            dates.insert(easter - Duration::days(2));
        }

        dates
    }
}

/// Fixed set of dates, used where a real calendar is unwanted
#[derive(Debug, Clone, Default)]
pub struct FixedHolidays {
    by_year: BTreeMap<i32, HashSet<NaiveDate>>,
}

impl FixedHolidays {
    pub fn new(dates: impl IntoIterator<Item = NaiveDate>) -> Self {
        use chrono::Datelike;

        let mut by_year: BTreeMap<i32, HashSet<NaiveDate>> = BTreeMap::new();
        for date in dates {
            by_year.entry(date.year()).or_default().insert(date);
        }
        Self { by_year }
    }
}

impl HolidayCalendar for FixedHolidays {
    fn holidays(&self, year: i32) -> HashSet<NaiveDate> {
        self.by_year.get(&year).cloned().unwrap_or_default()
    }
}

/// Easter Sunday in the Gregorian calendar (anonymous computus)
pub fn easter_sunday(year: i32) -> Option<NaiveDate> {
    let a = year.rem_euclid(19);
    let b = year.div_euclid(100);
    let c = year.rem_euclid(100);
    let d = b / 4;
    let e = b % 4;
    let f = (b + 8) / 25;
    let g = (b - f + 1) / 3;
    let h = (19 * a + b - d - g + 15) % 30;
    let i = c / 4;
    let k = c % 4;
    let l = (32 + 2 * e + 2 * i - h - k) % 7;
    let m = (a + 11 * h + 22 * l) / 451;
    let month = (h + l - 7 * m + 114) / 31;
    let day = (h + l - 7 * m + 114) % 31 + 1;

    NaiveDate::from_ymd_opt(year, month as u32, day as u32)
}
