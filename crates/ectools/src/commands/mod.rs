pub mod launch;
pub mod status;
pub mod terminate;
