pub mod attendance;
pub mod company;
pub mod employee;
pub mod general;
pub mod position;
pub mod rate_card;
pub mod salary;
pub mod team;
pub mod users;
pub mod visitor;
