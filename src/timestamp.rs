use std::fmt;
use std::str;

use chrono::{
	Datelike,
	Local,
	Timelike,
	Utc,
};

/// Wall clock value exchanged with the chip.
///
/// There is no timezone attached; whatever is written is read back
/// verbatim. `Timestamp::default()` is the zero timestamp.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
pub struct Timestamp {
	pub year: u16,
	pub month: u8,
	pub day: u8,
	pub hour: u8,
	pub minute: u8,
	pub second: u8,
}

impl Timestamp {
	pub fn new(year: u16, month: u8, day: u8, hour: u8, minute: u8, second: u8) -> Self {
		Timestamp {
			year,
			month,
			day,
			hour,
			minute,
			second,
		}
	}

	pub fn is_zero(&self) -> bool {
		*self == Timestamp::default()
	}

	/// Current system time in the local timezone
	pub fn local_now() -> crate::AResult<Self> {
		Timestamp::from_datetime(&Local::now())
	}

	/// Current system time in UTC
	pub fn utc_now() -> crate::AResult<Self> {
		Timestamp::from_datetime(&Utc::now())
	}

	pub fn from_datetime<T: Datelike + Timelike>(t: &T) -> crate::AResult<Self> {
		let year = t.year();
		ensure!(year >= 0 && year <= i32::from(std::u16::MAX), "year {} out of range", year);
		// a leap second only shows up in the nanoseconds; `second()` stays below 60
		Ok(Timestamp {
			year: year as u16,
			month: t.month() as u8,
			day: t.day() as u8,
			hour: t.hour() as u8,
			minute: t.minute() as u8,
			second: t.second() as u8,
		})
	}
}

impl fmt::Display for Timestamp {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
			self.year, self.month, self.day,
			self.hour, self.minute, self.second,
		)
	}
}

fn parse_field<T: str::FromStr>(s: &str, name: &str) -> crate::AResult<T> {
	ensure!(!s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()), "invalid {}: {:?}", name, s);
	match s.parse::<T>() {
		Ok(v) => Ok(v),
		Err(_) => bail!("invalid {}: {:?}", name, s),
	}
}

impl str::FromStr for Timestamp {
	type Err = ::failure::Error;

	// YYYY-MM-DD HH:MM:SS, or with a 'T' between date and time
	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let s = s.trim();
		let sep = match s.find(|c: char| c == ' ' || c == 'T') {
			Some(sep) => sep,
			None => bail!("missing time in timestamp {:?} (expected YYYY-MM-DD HH:MM:SS)", s),
		};
		let (date, time) = (&s[..sep], s[sep + 1..].trim_start());

		let date: Vec<&str> = date.split('-').collect();
		ensure!(date.len() == 3, "invalid date {:?} (expected YYYY-MM-DD)", s);
		let time: Vec<&str> = time.split(':').collect();
		ensure!(time.len() == 3, "invalid time {:?} (expected HH:MM:SS)", s);

		let year: u16 = parse_field(date[0], "year")?;
		let month: u8 = parse_field(date[1], "month")?;
		let day: u8 = parse_field(date[2], "day")?;
		let hour: u8 = parse_field(time[0], "hour")?;
		let minute: u8 = parse_field(time[1], "minute")?;
		let second: u8 = parse_field(time[2], "second")?;

		ensure!(month >= 1 && month <= 12, "invalid month: {}", month);
		ensure!(day >= 1 && day <= 31, "invalid day: {}", day);
		ensure!(hour < 24, "invalid hour: {}", hour);
		ensure!(minute < 60, "invalid minute: {}", minute);
		ensure!(second < 60, "invalid second: {}", second);

		Ok(Timestamp::new(year, month, day, hour, minute, second))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use chrono::NaiveDate;

	#[test]
	fn display() {
		let t = Timestamp::new(2024, 8, 5, 21, 0, 0);
		assert_eq!(t.to_string(), "2024-08-05 21:00:00");
		assert_eq!(Timestamp::default().to_string(), "0000-00-00 00:00:00");
	}

	#[test]
	fn parse() {
		let t: Timestamp = "2024-08-05 21:00:00".parse().unwrap();
		assert_eq!(t, Timestamp::new(2024, 8, 5, 21, 0, 0));

		let t: Timestamp = "2099-12-31T23:59:59".parse().unwrap();
		assert_eq!(t, Timestamp::new(2099, 12, 31, 23, 59, 59));
	}

	#[test]
	fn parse_display_agree() {
		let t = Timestamp::new(2031, 1, 9, 7, 5, 3);
		assert_eq!(t.to_string().parse::<Timestamp>().unwrap(), t);
	}

	#[test]
	fn parse_rejects_garbage() {
		assert!("2024-08-05".parse::<Timestamp>().is_err());
		assert!("2024-13-05 10:00:00".parse::<Timestamp>().is_err());
		assert!("2024-08-00 10:00:00".parse::<Timestamp>().is_err());
		assert!("2024-08-05 24:00:00".parse::<Timestamp>().is_err());
		assert!("2024-08-05 10:60:00".parse::<Timestamp>().is_err());
		assert!("2024-08-05 10:00:+1".parse::<Timestamp>().is_err());
		assert!("2024/08/05 10:00:00".parse::<Timestamp>().is_err());
	}

	#[test]
	fn zero() {
		assert!(Timestamp::default().is_zero());
		assert!(!Timestamp::new(2000, 1, 1, 0, 0, 0).is_zero());
	}

	#[test]
	fn from_datetime() {
		let dt = NaiveDate::from_ymd_opt(2024, 8, 5).unwrap().and_hms_opt(21, 0, 7).unwrap();
		assert_eq!(Timestamp::from_datetime(&dt).unwrap(), Timestamp::new(2024, 8, 5, 21, 0, 7));

		// leap second
		let dt = NaiveDate::from_ymd_opt(2016, 12, 31).unwrap().and_hms_milli_opt(23, 59, 59, 1_500).unwrap();
		assert_eq!(Timestamp::from_datetime(&dt).unwrap().second, 59);

		let dt = NaiveDate::from_ymd_opt(-1, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
		assert!(Timestamp::from_datetime(&dt).is_err());
	}

	#[test]
	fn system_time() {
		let t = Timestamp::utc_now().unwrap();
		assert!(t.year >= 2000);
		assert!(t.month >= 1 && t.month <= 12);
		assert!(t.second < 60);
	}
}
