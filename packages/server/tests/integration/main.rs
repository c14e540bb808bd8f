mod common;

mod auth;
mod seed;
mod skill;
mod stack;
