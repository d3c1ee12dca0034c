pub mod google;
pub mod s3;
