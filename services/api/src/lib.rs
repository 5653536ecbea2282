mod cli;
mod infra;
mod report;
mod routes;
mod server;

use electoral_forecast::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
