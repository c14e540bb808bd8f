pub mod choice;
pub mod experience;
pub mod project;
pub mod project_position;
pub mod project_stack;
pub mod skill;
pub mod stack;
pub mod user;
pub mod user_skill;
