//! 外部工具

pub mod unsplash;

pub use unsplash::UnsplashClient;
