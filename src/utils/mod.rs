pub mod constants;
pub mod holidays;
pub mod numbers;
pub mod progress;

pub use constants::*;
pub use holidays::{BrazilHolidays, FixedHolidays, HolidayCalendar};
pub use numbers::{format_float, is_null_token, parse_decimal, parse_float, parse_hour};
pub use progress::ProgressReporter;
