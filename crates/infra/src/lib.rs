//! Infrastructure layer: user storage, content storage, activity logs.

pub mod activity;
pub mod content;
pub mod directory;
pub mod password;

pub use activity::{
    ActivityLog, AuthEventKind, AuthEventRecord, InMemoryActivityLog, UserEventKind,
    UserEventRecord,
};
pub use content::{
    Article, Comment, ContentStore, InMemoryContentStore, Like, LikeTarget, LikeToggle,
};
pub use directory::{
    DirectoryError, InMemoryUserDirectory, NewUser, PostgresUserDirectory, UserDirectory,
    UserRecord,
};
