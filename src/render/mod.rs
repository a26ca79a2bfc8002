mod renderer;
mod scene;
mod transition;

pub use renderer::{Completion, Renderer};
