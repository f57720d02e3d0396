use estuary_core::EpidemicParams;

use crate::cli::EpidemicArgs;
use crate::error::CliError;

pub fn params(args: &EpidemicArgs) -> Result<EpidemicParams, CliError> {
    Ok(EpidemicParams::new(&args.region)?)
}
