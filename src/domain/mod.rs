pub mod ai;
pub mod climbing;
pub mod collision;
pub mod entity;
pub mod geometry;
pub mod jump;
pub mod physics;
pub mod projectile;
pub mod score;
