// Command implementations behind the CLI subcommands
//
// Each command takes an already merged AppConfig and returns anyhow::Result so
// the binary only parses arguments and prints outcomes.

pub mod analyze;
pub mod doctor;
pub mod ideas;
pub mod secrets;

pub use analyze::{analyze, analyze_with, build_service, AnalyzeOutcome, AnalyzeRequest};
pub use doctor::{doctor, doctor_with, Check, CheckStatus, DoctorReport};
pub use ideas::list_ideas;
pub use secrets::{set_secret, set_secret_at};
