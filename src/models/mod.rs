pub mod hatim;
pub mod progress;
pub mod stats;
pub mod user;

pub use hatim::Hatim;
pub use progress::{JuzProgress, UserProgress, JUZ_COUNT};
pub use stats::{AdminStats, GlobalStats, PersonalStats};
pub use user::User;
