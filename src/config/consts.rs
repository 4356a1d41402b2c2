/// Build workflows poll every 5 minutes
pub const DEFAULT_BUILD_POLL_INTERVAL_SECONDS: u64 = 300;
/// Maximum build time before a build branch times out (12 hours)
pub const DEFAULT_MAX_BUILD_TIME_MINUTES: u64 = 720;
/// Stop workflows poll every 5 minutes
pub const DEFAULT_STOP_POLL_INTERVAL_SECONDS: u64 = 300;
/// Delete workflows poll every 5 seconds
pub const DEFAULT_DELETE_POLL_INTERVAL_SECONDS: u64 = 5;
/// Poll budget for stop and delete branches
pub const DEFAULT_MAX_POLLS: u32 = 50;
/// Hard wall-clock limit for a whole workflow run
pub const DEFAULT_WORKFLOW_TIMEOUT_HOURS: u64 = 12;
/// Retries of RESOLVE/SUBMIT after a transient provider error
pub const DEFAULT_SUBMIT_RETRY_ATTEMPTS: u32 = 3;
/// Finished submitted runs a runner keeps for status queries
pub const DEFAULT_RETAINED_RUNS: usize = 100;
/// Prefix of every notification subject
pub const DEFAULT_SUBJECT_PREFIX: &str = "Global Custom Labels";
/// Listing page size of the simulated provider (the provider's own maximum)
pub const DEFAULT_SIMULATED_PAGE_SIZE: usize = 50;
/// Describe calls before a simulated job reaches its terminal status
pub const DEFAULT_SIMULATED_POLLS_TO_COMPLETE: u32 = 3;
/// Account id used in simulated resource identifiers
pub const DEFAULT_SIMULATED_ACCOUNT_ID: &str = "000000000000";
