pub mod journal;
pub mod paper;
pub mod settings;

pub use journal::*;
pub use paper::*;
pub use settings::Settings;
