pub mod components;
pub mod scene;
pub mod systems;
