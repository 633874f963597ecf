mod find_run;
mod print_run;
mod sync_source;
mod validate_git;
mod wait_run;

pub use find_run::FindRun;
pub use print_run::PrintRun;
pub use sync_source::SyncSource;
pub use validate_git::ValidateGitState;
pub use wait_run::WaitRun;
