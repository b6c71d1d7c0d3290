pub mod example;
pub mod init;
pub mod print;
pub mod serve;
