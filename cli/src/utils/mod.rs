use time::Duration;

/// A terminal bell that stands in for the sleigh's jingle
mod bell;
/// Constants used across the CLI
pub mod constants;
/// Logging to stderr
pub mod logger;

pub use self::bell::*;

/// How long ago something happened, e.g. `"2m 05s ago"`.
pub fn describe_age(age: Duration) -> String {
	let seconds = age.whole_seconds();
	match seconds {
		i64::MIN..=0 => "just now".to_string(),
		1..=59 => format!("{}s ago", seconds),
		60..=3599 => format!("{}m {:02}s ago", seconds / 60, seconds % 60),
		_ => format!("{}h {:02}m ago", seconds / 3600, (seconds % 3600) / 60),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn ages_are_rounded_to_a_readable_unit() {
		assert_eq!(describe_age(Duration::seconds(-3)), "just now");
		assert_eq!(describe_age(Duration::milliseconds(400)), "just now");
		assert_eq!(describe_age(Duration::seconds(12)), "12s ago");
		assert_eq!(describe_age(Duration::seconds(125)), "2m 05s ago");
		assert_eq!(describe_age(Duration::seconds(7_260)), "2h 01m ago");
	}
}
