use comfy_table::Table;
use time::{format_description::well_known::Rfc3339, OffsetDateTime};

use crate::{prelude::*, utils::describe_age};

/// Asks the server once for the sleigh's last fix.
pub(super) async fn execute(
	_global_args: GlobalArgs,
	client: ApiClient,
) -> Result<CommandOutput, ApiErrorResponse> {
	let response = client.make_request::<GetLocationEndpoint>(()).await?;
	let text = match &response.fix {
		Some(fix) => fix_table(fix, OffsetDateTime::now_utc()).to_string(),
		None => "Waiting for signal... nothing has been broadcast yet".to_string(),
	};

	CommandOutput {
		text,
		json: serde_json::to_value(&response)
			.map_err(|err| ApiErrorResponse::internal_server_error(err.to_string()))?,
	}
	.into_result()
}

/// Lays a fix out as one row per field.
fn fix_table(fix: &LocationFix, now: OffsetDateTime) -> Table {
	let captured_at = fix
		.timestamp
		.format(&Rfc3339)
		.unwrap_or_else(|_| fix.timestamp.to_string());

	let mut table = Table::new();
	table
		.set_header(["Data", "Value"])
		.add_row(["Latitude".to_string(), fix.lat.to_string()])
		.add_row(["Longitude".to_string(), fix.lng.to_string()])
		.add_row(["Accuracy".to_string(), format!("±{:.0} m", fix.accuracy)])
		.add_row(["Captured At".to_string(), captured_at])
		.add_row(["Age".to_string(), describe_age(fix.age(now))])
		.add_row([
			"Broadcasting".to_string(),
			if fix.active { "Yes" } else { "No" }.to_string(),
		]);
	table
}
