mod command;
mod dry_run;

pub use command::CommandShutdown;
pub use dry_run::DryRunShutdown;
