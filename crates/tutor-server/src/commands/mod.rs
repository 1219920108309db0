pub mod ask;
pub mod init;
pub mod prompt;
pub mod serve;
pub mod submissions;
