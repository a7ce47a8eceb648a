//! CLI commands

mod batch;
mod changelog;
mod init;
mod release;
mod version;

pub use batch::BatchCommand;
pub use changelog::ChangelogCommand;
pub use init::InitCommand;
pub use release::ReleaseCommand;
pub use version::VersionCommand;
