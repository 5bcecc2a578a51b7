pub mod dialogue;
pub mod scene;
