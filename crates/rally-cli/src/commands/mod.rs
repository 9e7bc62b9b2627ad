mod intercept;
mod predict;
mod settings;

pub use intercept::intercept;
pub use predict::predict;
pub use settings::write_settings;
