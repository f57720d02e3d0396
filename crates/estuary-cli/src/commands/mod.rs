mod epidemic;
mod rate;
mod ticker;
mod weather;

use estuary_core::{Document, Engine, PipelineRequest, SourceConfig};

use crate::cli::{Cli, Command};
use crate::error::CliError;

pub async fn run(cli: &Cli) -> Result<Document, CliError> {
    let config = SourceConfig::from_env().with_timeout_ms(cli.timeout_ms);
    let engine = Engine::with_reqwest(&config);

    let request = match &cli.command {
        Command::Rate(args) => PipelineRequest::Rate(rate::params(args)?),
        Command::Epidemic(args) => PipelineRequest::Epidemic(epidemic::params(args)?),
        Command::Ticker(args) => PipelineRequest::Ticker(ticker::params(args)?),
        Command::Weather(args) => PipelineRequest::Weather(weather::params(args)?),
    };

    Ok(engine.run(request).await?)
}
