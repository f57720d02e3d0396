use estuary_core::{Coordinate, WeatherParams};

use crate::cli::WeatherArgs;
use crate::error::CliError;

pub fn params(args: &WeatherArgs) -> Result<WeatherParams, CliError> {
    let position = match (args.lat, args.lon) {
        (Some(lat), Some(lon)) => Some(Coordinate::new(lat, lon)),
        _ => None,
    };
    Ok(WeatherParams::new(args.city.clone(), position)?)
}
