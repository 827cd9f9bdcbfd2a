use clap::Parser;
use error_stack::Result;

mod server;

pub use server::StartServerError;

/// Command line options for the retirada backend.
#[derive(Debug, Parser)]
#[command(about = "Utility suite for the retirada backend", version, author)]
pub struct Cli {
    #[clap(subcommand)]
    pub subcommand: Subcommand,
}

impl Cli {
    pub fn run(self) -> Result<(), StartServerError> {
        match self.subcommand {
            Subcommand::Server(args) => self::server::run(args),
        }
    }
}

#[derive(Debug, Parser)]
pub enum Subcommand {
    /// Expose the retirada HTTP API
    Server(self::server::ServerCommand),
}
