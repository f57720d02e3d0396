use estuary_core::{IsoDate, RateParams};
use time::Date;

use crate::cli::RateArgs;
use crate::error::CliError;

pub fn params(args: &RateArgs) -> Result<RateParams, CliError> {
    let from_date = parse_bound(args.from.as_deref())?;
    let to_date = parse_bound(args.to.as_deref())?;
    Ok(RateParams::new(from_date, to_date)?)
}

fn parse_bound(raw: Option<&str>) -> Result<Option<Date>, CliError> {
    raw.map(|value| {
        IsoDate::parse(value)
            .map(|date| date.to_date())
            .map_err(|error| CliError::Parameter(error.to_string()))
    })
    .transpose()
}
