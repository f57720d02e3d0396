use estuary_core::TickerParams;

use crate::cli::TickerArgs;
use crate::error::CliError;

pub fn params(args: &TickerArgs) -> Result<TickerParams, CliError> {
    Ok(TickerParams::new(
        &args.symbol,
        args.period.as_deref(),
        args.columns.as_deref(),
    )?)
}
