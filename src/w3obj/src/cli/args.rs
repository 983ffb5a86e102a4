use clap::{ArgAction, Args, ValueEnum};
use w3obj_modfile::UnknownTypePolicy;

/// Configures the verbosity of the builtin logger.
#[derive(Clone, Copy, Debug, Args)]
pub struct Verbosity {
    /// Configures the log verbosity of w3obj.
    ///
    /// `-v` is Debug, `-vv` is Trace.
    #[clap(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,
}

impl Verbosity {
    /// Configures the global logger based on the settings.
    pub fn setup(self) -> eyre::Result<()> {
        simple_logger::init_with_level(self.log_level())?;
        Ok(())
    }

    fn log_level(self) -> log::Level {
        match self.verbose {
            0 => log::Level::Info,
            1 => log::Level::Debug,
            _ => log::Level::Trace,
        }
    }
}

/// How to decode value types outside the documented ones.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum UnknownTypes {
    /// Keep the value as an opaque 4-byte integer.
    #[default]
    Opaque,
    /// Read an integer only for codes above 100 and a placeholder
    /// string without payload otherwise.
    Placeholder,
    /// Fail on the first unknown type code.
    Reject,
}

impl From<UnknownTypes> for UnknownTypePolicy {
    fn from(v: UnknownTypes) -> Self {
        match v {
            UnknownTypes::Opaque => Self::Opaque,
            UnknownTypes::Placeholder => Self::Placeholder,
            UnknownTypes::Reject => Self::Reject,
        }
    }
}
