pub mod health;
pub mod oauth;
pub mod publish;
pub mod repos;
pub mod user;
