pub mod convert;

/// A command that can be executed from the CLI.
pub trait Command {
    /// Runs the command to completion.
    fn handle(self) -> eyre::Result<()>;
}
