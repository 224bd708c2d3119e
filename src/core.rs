pub mod circulation;
pub mod command;
pub mod controller;
pub mod domain;
pub mod events;
pub mod repository;
