pub mod clock;
pub mod state;

pub use clock::{Clock, FixedClock, SystemClock};
pub use state::AppState;
