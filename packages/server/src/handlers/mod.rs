pub mod auth;
pub mod position;
pub mod project;
pub mod skill;
pub mod stack;
pub mod user;
